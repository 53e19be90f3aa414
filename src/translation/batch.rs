/*!
 * Delimiter batching.
 *
 * Providers that keep segment alignment get several cues in one request,
 * joined by the provider's delimiter. The response must split back into
 * exactly as many segments as were sent; anything else is treated as a
 * failed batch and the caller decides whether to retry cue by cue.
 */

use log::debug;
use thiserror::Error;

use crate::errors::{ProviderError, TranslationErrorKind};
use crate::providers::Translator;

/// Why a batched request could not be used
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BatchError {
    #[error("Batch request failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Batch response has {actual} segments, expected {expected}")]
    SegmentMismatch { expected: usize, actual: usize },
}

impl BatchError {
    pub fn kind(&self) -> TranslationErrorKind {
        match self {
            Self::Provider(err) => err.kind(),
            Self::SegmentMismatch { .. } => TranslationErrorKind::MalformedResponse,
        }
    }
}

/// Join segment texts into one request body
pub fn join_segments<S: AsRef<str>>(texts: &[S], delimiter: &str) -> String {
    texts
        .iter()
        .map(|text| text.as_ref())
        .collect::<Vec<_>>()
        .join(delimiter)
}

/// Split a batched response back into `expected` segments.
///
/// Providers tend to trim or reflow whitespace around the delimiter, so the
/// split uses the delimiter's visible part and trims every segment.
pub fn split_segments(response: &str, delimiter: &str, expected: usize) -> Result<Vec<String>, BatchError> {
    let marker = match delimiter.trim() {
        "" => delimiter,
        visible => visible,
    };

    let segments: Vec<String> = if marker.is_empty() {
        vec![response.trim().to_string()]
    } else {
        response
            .split(marker)
            .map(|segment| segment.trim().to_string())
            .collect()
    };

    if segments.len() != expected {
        return Err(BatchError::SegmentMismatch {
            expected,
            actual: segments.len(),
        });
    }
    Ok(segments)
}

/// Send several texts in one delimited request and split the answer
pub async fn translate_joined<S: AsRef<str>>(
    translator: &dyn Translator,
    texts: &[S],
    delimiter: &str,
    source_language: &str,
    target_language: &str,
) -> Result<Vec<String>, BatchError> {
    let body = join_segments(texts, delimiter);
    debug!(
        "Sending batch of {} segments ({} chars) {} -> {}",
        texts.len(),
        body.len(),
        source_language,
        target_language
    );

    let response = translator
        .translate(&body, source_language, target_language)
        .await?;
    split_segments(&response, delimiter, texts.len())
}
