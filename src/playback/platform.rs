/*!
 * Interfaces a streaming-platform adapter provides to the core.
 *
 * Adapters own everything platform specific (DOM lookup, URL discovery,
 * video identity). The core only sees these traits and the events in
 * [`PlatformEvent`].
 */

use std::fmt::Debug;
use std::sync::Arc;

/// HTML media `readyState` values, ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReadyState {
    HaveNothing = 0,
    HaveMetadata = 1,
    HaveCurrentData = 2,
    HaveFutureData = 3,
    HaveEnoughData = 4,
}

impl ReadyState {
    /// Whether the element's clock can be trusted
    pub fn has_current_data(self) -> bool {
        self >= Self::HaveCurrentData
    }
}

/// The platform's video element
pub trait MediaElement: Send + Sync + Debug {
    /// Current playback position in seconds
    fn current_time(&self) -> f64;

    /// Media duration in seconds, when known
    fn duration(&self) -> Option<f64>;

    fn ready_state(&self) -> ReadyState;

    /// Identity of the underlying element; changes when the platform swaps it out
    fn instance_id(&self) -> u64;
}

/// A DOM progress bar exposing `now`/`max` numeric attributes
pub trait ProgressIndicator: Send + Sync + Debug {
    fn value_now(&self) -> Option<f64>;
    fn value_max(&self) -> Option<f64>;
}

/// Platform-specific collaborator feeding the core
pub trait PlatformAdapter: Send + Sync {
    /// Short platform name for logs
    fn name(&self) -> &str;

    fn video_element(&self) -> Option<Arc<dyn MediaElement>>;

    fn current_video_id(&self) -> Option<String>;

    /// The progress bar, if it is currently in the page
    fn progress_bar(&self) -> Option<Arc<dyn ProgressIndicator>> {
        None
    }

    /// Whether the progress bar is a better clock than the media element
    fn supports_progress_bar_tracking(&self) -> bool {
        false
    }
}

/// Subtitle payload discovered by an adapter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubtitleData {
    /// Original-language WebVTT document
    pub vtt_text: String,
    /// Target-language WebVTT document from the platform, if any
    pub target_vtt_text: Option<String>,
    pub video_id: String,
    pub source_language: String,
    pub target_language: String,
    /// Render `target_vtt_text` instead of translating
    pub use_native_target: bool,
    /// Where the subtitles were fetched from, used to suppress duplicate deliveries
    pub url: Option<String>,
}

/// Everything an adapter can tell the core
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    SubtitleDataFound(SubtitleData),
    VideoIdChanged(String),
    /// Native media timing event (`timeupdate`)
    MediaTimeUpdate,
    /// Attribute mutation on the progress bar
    ProgressMutation,
    /// The platform replaced its video element
    VideoElementReplaced,
}
