/*!
 * Translation of subtitle cues while the video plays.
 *
 * It is split into several submodules:
 *
 * - `scheduler`: Paced, single-flight translation runs near the playhead
 * - `batch`: Delimiter batching of several cues into one request
 * - `cache`: In-session reuse of identical lines
 * - `messages`: Localized placeholders for failed cues
 */

// Re-export main types for easier usage
pub use self::batch::BatchError;
pub use self::cache::{CacheStats, TranslationCache};
pub use self::messages::{ErrorMessages, localized_placeholder};
pub use self::scheduler::{BatchReport, SchedulerState, TranslationScheduler};

// Submodules
pub mod batch;
pub mod cache;
pub mod messages;
pub mod scheduler;
