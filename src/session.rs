/*!
 * Per-tab subtitle session state.
 *
 * One `SubtitleSessionState` is owned by the controller and shared by
 * reference with the scheduler. It holds the cue store, the active video
 * context and the generation counter that invalidates in-flight
 * translations whenever the context changes.
 */

use log::{debug, info};
use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::subtitle::{Cue, CueKey, CueStore, TranslationState};

/// The video the session is currently bound to
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VideoContext {
    pub video_id: Option<String>,
    /// Bumped on every context change; write-backs from older generations are dropped
    pub generation: u64,
    pub source_language: String,
    pub target_language: String,
}

/// Outcome of writing a translation back into the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteBack {
    Applied,
    /// The video context changed while the request was in flight
    StaleContext,
    /// The cue is gone or no longer pending
    CueMissing,
}

#[derive(Debug, Clone, PartialEq)]
struct Delivery {
    video_id: String,
    url: String,
}

/// Shared mutable state of one subtitle session
#[derive(Debug)]
pub struct SubtitleSessionState {
    // Lock order: context before store
    context: RwLock<VideoContext>,
    store: RwLock<CueStore>,
    last_delivery: Mutex<Option<Delivery>>,
    enabled: AtomicBool,
}

impl SubtitleSessionState {
    pub fn new(enabled: bool) -> Self {
        Self {
            context: RwLock::new(VideoContext::default()),
            store: RwLock::new(CueStore::new()),
            last_delivery: Mutex::new(None),
            enabled: AtomicBool::new(enabled),
        }
    }

    pub fn context(&self) -> VideoContext {
        self.context.read().clone()
    }

    pub fn generation(&self) -> u64 {
        self.context.read().generation
    }

    pub fn current_video_id(&self) -> Option<String> {
        self.context.read().video_id.clone()
    }

    /// Whether `generation` is still the active context
    pub fn is_current(&self, generation: u64) -> bool {
        self.context.read().generation == generation
    }

    /// Switch to another video, pruning the cues of every other video.
    ///
    /// Returns the new generation, or `None` when already on that video.
    pub fn switch_video(&self, video_id: Option<&str>) -> Option<u64> {
        let mut context = self.context.write();
        if context.video_id.as_deref() == video_id {
            return None;
        }

        context.generation += 1;
        context.video_id = video_id.map(str::to_string);
        let pruned = self.store.write().retain_only(video_id);
        *self.last_delivery.lock() = None;

        info!(
            "Video context switched to {} (generation {}), pruned {} cues",
            video_id.unwrap_or("<none>"),
            context.generation,
            pruned
        );
        Some(context.generation)
    }

    /// Start a fresh context for newly delivered subtitles and install their cues.
    ///
    /// Always bumps the generation, even for the same video, so translations
    /// requested for the previous cue set are discarded.
    pub fn begin_context(
        &self,
        video_id: &str,
        source_language: &str,
        target_language: &str,
        cues: Vec<Cue>,
    ) -> u64 {
        let mut context = self.context.write();
        let switching = context.video_id.as_deref() != Some(video_id);

        context.generation += 1;
        context.video_id = Some(video_id.to_string());
        context.source_language = source_language.to_string();
        context.target_language = target_language.to_string();

        let mut store = self.store.write();
        if switching {
            store.retain_only(Some(video_id));
        }
        store.replace_for_video(video_id, cues);

        debug!(
            "Context generation {} for video {} ({} -> {})",
            context.generation, video_id, source_language, target_language
        );
        context.generation
    }

    /// Read access to the cue store
    pub fn store(&self) -> RwLockReadGuard<'_, CueStore> {
        self.store.read()
    }

    /// Write access to the cue store
    pub fn store_mut(&self) -> RwLockWriteGuard<'_, CueStore> {
        self.store.write()
    }

    /// Write a translation outcome if `generation` is still current
    pub fn write_translation(&self, generation: u64, key: &CueKey, state: TranslationState) -> WriteBack {
        let context = self.context.read();
        if context.generation != generation {
            return WriteBack::StaleContext;
        }

        if self.store.write().apply_translation(key, state) {
            WriteBack::Applied
        } else {
            WriteBack::CueMissing
        }
    }

    /// Return the current video's failed cues to pending
    pub fn reset_failed(&self) -> usize {
        let context = self.context.read();
        match context.video_id.as_deref() {
            Some(video_id) => self.store.write().reset_failed(video_id),
            None => 0,
        }
    }

    /// Drop the current video's cues and forget its last delivery
    pub fn prune_current(&self) -> usize {
        let context = self.context.read();
        *self.last_delivery.lock() = None;
        match context.video_id.as_deref() {
            Some(video_id) => self.store.write().prune_video(video_id),
            None => 0,
        }
    }

    /// Whether this exact subtitle URL was already ingested for the video
    pub fn is_duplicate_delivery(&self, video_id: &str, url: Option<&str>) -> bool {
        match (url, self.last_delivery.lock().as_ref()) {
            (Some(url), Some(last)) => last.video_id == video_id && last.url == url,
            _ => false,
        }
    }

    pub fn remember_delivery(&self, video_id: &str, url: Option<&str>) {
        *self.last_delivery.lock() = url.map(|url| Delivery {
            video_id: video_id.to_string(),
            url: url.to_string(),
        });
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }
}

impl Default for SubtitleSessionState {
    fn default() -> Self {
        Self::new(true)
    }
}
