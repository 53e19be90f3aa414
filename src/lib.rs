/*!
 * # dualsub - dual-language subtitle synchronization and translation
 *
 * The core of a dual-subtitle overlay for streaming platforms: it ingests
 * the platform's WebVTT tracks, keeps them in sync with playback, translates
 * upcoming cues in the background and hands the original/translated pair to
 * a display.
 *
 * ## Features
 *
 * - Tolerant WebVTT parsing
 * - Time tracking from the media clock or the platform's progress bar
 * - Dual native-track mode pairing independently timed tracks by overlap
 * - Paced, batched translation near the playhead with stale-result protection
 * - Localized placeholders for failed translations
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle`: Cues, WebVTT parsing, the cue store and the cue resolver
 * - `playback`: Platform adapter traits and the time source reconciler
 * - `translation`: Scheduler, batching, cache and error placeholders
 * - `providers`: The translation capability trait and provider profiles
 * - `session`: Per-session state and the video context generation counter
 * - `display`: Display driver interface
 * - `app_controller`: Wires adapter events to the rest of the core
 * - `language_utils`: Language tag utilities
 * - `errors`: Custom error types for the library
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod display;
pub mod errors;
pub mod language_utils;
pub mod playback;
pub mod providers;
pub mod session;
pub mod subtitle;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::{Config, ConfigSource, SharedConfig};
pub use app_controller::SubtitleController;
pub use display::{DisplayController, DisplayDriver, TextDisplay};
pub use playback::{PlatformAdapter, PlatformEvent, SubtitleData, TimeSourceReconciler};
pub use providers::{ProviderProfile, Translator};
pub use session::SubtitleSessionState;
pub use subtitle::{Cue, CueResolver, CueStore, ResolvedCues, TranslationState};
pub use translation::TranslationScheduler;
