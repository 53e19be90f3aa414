/*!
 * Translation capability used by the scheduler.
 *
 * Concrete HTTP integrations live outside this crate; they plug in by
 * implementing [`Translator`]. Each provider also carries a
 * [`ProviderProfile`] describing how it wants to be paced and batched:
 * - Google / Microsoft: delimiter batching, short delay
 * - DeepL: delimiter batching, slower pacing
 * - DeepL free endpoint: one segment per call
 * - OpenAI-compatible: large delimiter batches, slow pacing
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::app_config::TranslationProvider;
use crate::errors::ProviderError;

pub mod mock;

/// Text placed between segments when several cues share one request
pub const DEFAULT_SEGMENT_DELIMITER: &str = "\n|||\n";

/// Common trait for all translation providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the translation scheduler.
#[async_trait]
pub trait Translator: Send + Sync + Debug {
    /// Translate one piece of text
    ///
    /// # Arguments
    /// * `text` - The text to translate
    /// * `source_language` - Source language tag, or `auto`
    /// * `target_language` - Target language tag
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The translated text or an error
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError>;

    /// Batching and pacing characteristics of this provider
    fn profile(&self) -> ProviderProfile;
}

/// Provider-specific batching and pacing profile
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderProfile {
    /// Cues per scheduler run when the user has not chosen a size
    pub default_batch_size: usize,
    /// Upper bound for a user-chosen batch size
    pub max_batch_size: usize,
    /// Separator used to pack several segments into one request
    pub delimiter: String,
    /// Whether a delimited multi-segment request comes back segment-aligned
    pub supports_batch: bool,
    /// Pause between consecutive requests, in milliseconds
    pub delay_ms: u64,
}

impl ProviderProfile {
    /// Get the tuned profile for a given provider
    pub fn for_provider(provider: TranslationProvider) -> Self {
        match provider {
            TranslationProvider::Google => Self {
                default_batch_size: 4,
                max_batch_size: 10,
                delimiter: DEFAULT_SEGMENT_DELIMITER.to_string(),
                supports_batch: true,
                delay_ms: 100,
            },
            TranslationProvider::Microsoft => Self {
                default_batch_size: 4,
                max_batch_size: 10,
                delimiter: DEFAULT_SEGMENT_DELIMITER.to_string(),
                supports_batch: true,
                delay_ms: 150,
            },
            TranslationProvider::DeepL => Self {
                // Paid API quota is characters per month, keep requests sparse
                default_batch_size: 3,
                max_batch_size: 6,
                delimiter: DEFAULT_SEGMENT_DELIMITER.to_string(),
                supports_batch: true,
                delay_ms: 500,
            },
            TranslationProvider::DeepLFree => Self {
                default_batch_size: 1,
                max_batch_size: 1,
                delimiter: DEFAULT_SEGMENT_DELIMITER.to_string(),
                supports_batch: false,
                delay_ms: 800,
            },
            TranslationProvider::OpenAICompatible => Self {
                default_batch_size: 8,
                max_batch_size: 20,
                delimiter: DEFAULT_SEGMENT_DELIMITER.to_string(),
                supports_batch: true,
                delay_ms: 1000,
            },
        }
    }

    /// Profile for a provider that accepts one segment per call
    pub fn single_segment(delay_ms: u64) -> Self {
        Self {
            default_batch_size: 1,
            max_batch_size: 1,
            delimiter: DEFAULT_SEGMENT_DELIMITER.to_string(),
            supports_batch: false,
            delay_ms,
        }
    }
}
