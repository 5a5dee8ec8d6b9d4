//! Streaming extraction API: emit page fragments as they complete.
//!
//! ## Why stream?
//!
//! Long documents produce a lot of text. A stream lets callers write each
//! page as soon as the pipeline releases it, show progress, or stop early
//! by dropping the stream, which also stops the page source from decoding
//! further pages.
//!
//! The pipeline is synchronous and pdfium-bound, so it runs on a blocking
//! thread and hands fragments over a bounded channel. Fragments arrive in
//! emission order. A fatal error is yielded as the last item.

use crate::config::ExtractionConfig;
use crate::error::PageStripError;
use crate::output::PageFragment;
use crate::pipeline::Pipeline;
use crate::source;
use std::path::Path;
use std::pin::Pin;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::Stream;
use tracing::{debug, info};

/// A boxed stream of page fragments.
pub type FragmentStream =
    Pin<Box<dyn Stream<Item = Result<PageFragment, PageStripError>> + Send>>;

/// Fragments buffered between the blocking pipeline and the consumer.
const CHANNEL_CAPACITY: usize = 16;

/// Extract a document, streaming page fragments in emission order.
///
/// # Returns
/// - `Ok(FragmentStream)`: a stream of `Result<PageFragment, PageStripError>`
/// - `Err(PageStripError)`: configuration or input error, raised before any
///   page is read
///
/// # Example
/// ```rust,no_run
/// use futures::StreamExt;
/// use pagestrip::{extract_stream, ExtractionConfig};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let mut stream = extract_stream("paper.pdf", &ExtractionConfig::default()).await?;
/// while let Some(fragment) = stream.next().await {
///     print!("{}", fragment?.text);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn extract_stream(
    input: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<FragmentStream, PageStripError> {
    let pipeline = Pipeline::from_config(config)?;
    let resolved = source::resolve_input(input.as_ref())?;
    info!("Starting streaming extraction: {}", resolved.path.display());

    let password = config.password.clone();
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

    tokio::task::spawn_blocking(move || {
        let result = source::with_pages(&resolved, password.as_deref(), |pages| {
            for record in pipeline.run(pages) {
                let item = record.map(PageFragment::from);
                let failed = item.is_err();
                if tx.blocking_send(item).is_err() {
                    debug!("Fragment stream dropped; stopping extraction");
                    return Ok(());
                }
                if failed {
                    return Ok(());
                }
            }
            Ok(())
        });
        // Errors raised while opening the source never reached the channel.
        if let Err(e) = result {
            let _ = tx.blocking_send(Err(e));
        }
    });

    Ok(Box::pin(ReceiverStream::new(rx)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::io::Write;

    fn layout_file(json: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(json.as_bytes()).unwrap();
        tmp
    }

    const THREE_PAGES: &str = r#"{"pages": [
        {"bounding_box": [0, 0, 100, 200],
         "text_blocks": [
            {"bounding_box": [10, 190, 90, 198], "text": "Header"},
            {"bounding_box": [10, 100, 90, 150], "text": "One"},
            {"bounding_box": [45, 5, 55, 12], "text": "1"}]},
        {"bounding_box": [0, 0, 100, 200], "text_blocks": []},
        {"bounding_box": [0, 0, 100, 200],
         "text_blocks": [
            {"bounding_box": [10, 190, 90, 198], "text": "Header"},
            {"bounding_box": [10, 100, 90, 150], "text": "Three"},
            {"bounding_box": [45, 5, 55, 12], "text": "3"}]}
    ]}"#;

    #[tokio::test]
    async fn fragments_arrive_in_page_order() {
        let tmp = layout_file(THREE_PAGES);
        let stream = extract_stream(tmp.path(), &ExtractionConfig::default())
            .await
            .unwrap();
        let fragments: Vec<PageFragment> = stream.map(|f| f.unwrap()).collect().await;
        let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["---1---\nOne\n", "---2---\n", "---3---\nThree\n"]);
    }

    #[tokio::test]
    async fn range_applies_to_the_stream() {
        let tmp = layout_file(THREE_PAGES);
        let config = ExtractionConfig::builder().from_page(2).build().unwrap();
        let stream = extract_stream(tmp.path(), &config).await.unwrap();
        let ids: Vec<usize> = stream.map(|f| f.unwrap().page_id).collect().await;
        assert_eq!(ids, vec![2, 3]);
    }

    #[tokio::test]
    async fn invalid_config_fails_before_streaming() {
        let config = ExtractionConfig {
            from_page: Some(3),
            to_page: Some(2),
            ..ExtractionConfig::default()
        };
        let err = extract_stream("missing.pdf", &config).await.err().unwrap();
        assert!(err.is_configuration_error());
    }

    #[tokio::test]
    async fn malformed_layout_is_yielded_as_an_error() {
        let tmp = layout_file(r#"{"pages": 3}"#);
        let stream = extract_stream(tmp.path(), &ExtractionConfig::default())
            .await
            .unwrap();
        let items: Vec<_> = stream.collect().await;
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(PageStripError::InvalidLayout { .. })));
    }
}
