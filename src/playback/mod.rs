/*!
 * Playback-side collaborators.
 *
 * - `platform`: Traits a streaming-platform adapter implements
 * - `reconciler`: Playback time reconciliation across media clock and progress bar
 * - `simulated`: Hand-driven platform for replay and tests
 */

pub mod platform;
pub mod reconciler;
pub mod simulated;

pub use self::platform::{
    MediaElement, PlatformAdapter, PlatformEvent, ProgressIndicator, ReadyState, SubtitleData,
};
pub use self::reconciler::{PlaybackClock, TimeSourceReconciler, TimeStrategy, TimeUpdate};
