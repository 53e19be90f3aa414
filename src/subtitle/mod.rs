/*!
 * Subtitle data handling.
 *
 * - `cue`: The cue model and its translation state
 * - `vtt`: WebVTT parsing and serialization
 * - `store`: The in-memory cue queue
 * - `resolver`: Selection of the cue pair to render at a given time
 */

pub mod cue;
pub mod resolver;
pub mod store;
pub mod vtt;

pub use self::cue::{Cue, CueKey, CueRole, TranslationState};
pub use self::resolver::{CueResolver, ResolvedCues};
pub use self::store::CueStore;
pub use self::vtt::VttCue;
