use anyhow::Result;
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::app_config::ConfigSource;
use crate::display::{DisplayController, DisplayDriver};
use crate::errors::SubtitleError;
use crate::language_utils;
use crate::playback::{
    PlatformAdapter, PlatformEvent, SubtitleData, TimeSourceReconciler, TimeStrategy,
};
use crate::providers::Translator;
use crate::session::SubtitleSessionState;
use crate::subtitle::{Cue, CueResolver, ResolvedCues, vtt};
use crate::translation::TranslationScheduler;

// @module: Subtitle controller wiring adapter events to the core

/// Owns one subtitle session and drives it from platform events.
///
/// Background work (translation runs, time source re-selection) is spawned on
/// the tokio runtime the caller is running in. Outside a runtime events are
/// still handled synchronously, but that work is skipped with a warning.
pub struct SubtitleController<D: DisplayDriver> {
    // @field: Platform collaborator
    adapter: Arc<dyn PlatformAdapter>,

    // @field: Settings, read fresh on every event
    config: Arc<dyn ConfigSource>,

    // @field: Cue store and video context
    session: Arc<SubtitleSessionState>,

    // @field: Playback time source
    reconciler: Arc<TimeSourceReconciler>,

    // @field: Background translation
    scheduler: Arc<TranslationScheduler>,

    // @field: Overlay
    display: Mutex<DisplayController<D>>,
}

impl<D: DisplayDriver> SubtitleController<D> {
    // @method: Build a controller and its components
    pub fn new(
        adapter: Arc<dyn PlatformAdapter>,
        translator: Arc<dyn Translator>,
        config: Arc<dyn ConfigSource>,
        driver: D,
    ) -> Self {
        let settings = config.snapshot();
        let session = Arc::new(SubtitleSessionState::new(settings.subtitles_enabled));
        let reconciler = Arc::new(TimeSourceReconciler::new(
            adapter.clone(),
            settings.time_tracking.clone(),
        ));
        let scheduler = Arc::new(TranslationScheduler::new(
            session.clone(),
            translator,
            reconciler.clone(),
            config.clone(),
        ));

        Self {
            adapter,
            config,
            session,
            reconciler,
            scheduler,
            display: Mutex::new(DisplayController::new(driver)),
        }
    }

    pub fn session(&self) -> &Arc<SubtitleSessionState> {
        &self.session
    }

    pub fn scheduler(&self) -> &Arc<TranslationScheduler> {
        &self.scheduler
    }

    pub fn reconciler(&self) -> &Arc<TimeSourceReconciler> {
        &self.reconciler
    }

    /// Frame currently on screen
    pub fn current_frame(&self) -> Option<ResolvedCues> {
        self.display.lock().current().cloned()
    }

    /// Run `f` against the display driver
    pub fn with_driver<R>(&self, f: impl FnOnce(&D) -> R) -> R {
        f(self.display.lock().driver())
    }

    pub fn with_driver_mut<R>(&self, f: impl FnOnce(&mut D) -> R) -> R {
        f(self.display.lock().driver_mut())
    }

    // @method: Bind to the adapter's current video and pick a time source
    pub async fn attach(&self) -> Result<TimeStrategy> {
        if let Some(video_id) = self.adapter.current_video_id() {
            self.on_video_id_change(&video_id)?;
        }
        Ok(self.reconciler.attach().await)
    }

    /// Dispatch one adapter event
    pub fn handle_event(&self, event: PlatformEvent) -> Result<()> {
        match event {
            PlatformEvent::SubtitleDataFound(data) => {
                if let Err(err) = self.on_subtitle_data_found(data) {
                    warn!("Ignoring subtitle data: {}", err);
                }
            }
            PlatformEvent::VideoIdChanged(video_id) => self.on_video_id_change(&video_id)?,
            PlatformEvent::MediaTimeUpdate => {
                if self.reconciler.element_replaced() {
                    self.reattach();
                } else if let Some(update) = self.reconciler.on_media_time_update() {
                    self.on_time_update(update.time)?;
                }
            }
            PlatformEvent::ProgressMutation => {
                if let Some(update) = self.reconciler.on_progress_mutation() {
                    self.on_time_update(update.time)?;
                }
            }
            PlatformEvent::VideoElementReplaced => self.reattach(),
        }
        Ok(())
    }

    fn reattach(&self) {
        info!("{}: video element replaced, re-selecting time source", self.adapter.name());
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No tokio runtime available, keeping the current time source");
            return;
        };
        let reconciler = self.reconciler.clone();
        runtime.spawn(async move {
            reconciler.attach().await;
        });
    }

    // @method: Ingest a subtitle delivery, returning the number of cues stored
    pub fn on_subtitle_data_found(&self, data: SubtitleData) -> Result<usize, SubtitleError> {
        let settings = self.config.snapshot();
        if !self.session.is_enabled() {
            debug!("Subtitles disabled, ignoring delivery for {}", data.video_id);
            return Ok(0);
        }
        if self
            .session
            .is_duplicate_delivery(&data.video_id, data.url.as_deref())
        {
            debug!("Subtitle delivery for {} already processed", data.video_id);
            return Ok(0);
        }

        let expected = self
            .session
            .current_video_id()
            .or_else(|| self.adapter.current_video_id());
        if let Some(expected) = expected.filter(|id| *id != data.video_id) {
            debug!(
                "Ignoring subtitle delivery for {} while {} is playing",
                data.video_id, expected
            );
            return Ok(0);
        }

        let originals = vtt::parse(&data.vtt_text);
        if originals.is_empty() {
            return Err(SubtitleError::NoCues(data.video_id));
        }

        let targets = if data.use_native_target && settings.use_native_subtitles {
            let targets = data
                .target_vtt_text
                .as_deref()
                .map(vtt::parse)
                .unwrap_or_default();
            if targets.is_empty() {
                warn!(
                    "Native target track for {} is missing or empty, translating instead",
                    data.video_id
                );
                None
            } else {
                Some(targets)
            }
        } else {
            None
        };

        let video_id = data.video_id.as_str();
        let native = targets.is_some();
        let mut cues: Vec<Cue> = match &targets {
            Some(_) => originals
                .iter()
                .map(|c| Cue::native_original(video_id, c.start, c.end, c.text.clone()))
                .collect(),
            None => originals
                .iter()
                .map(|c| Cue::pending(video_id, c.start, c.end, c.text.clone()))
                .collect(),
        };
        if let Some(targets) = targets {
            cues.extend(
                targets
                    .into_iter()
                    .map(|c| Cue::native_target(video_id, c.start, c.end, c.text)),
            );
        }

        let source_language = pick_language(&data.source_language, &settings.original_language);
        let target_language = pick_language(&data.target_language, &settings.target_language);
        let count = cues.len();

        let was_current = self.session.current_video_id().as_deref() == Some(video_id);
        let generation = self
            .session
            .begin_context(video_id, &source_language, &target_language, cues);
        self.session.remember_delivery(video_id, data.url.as_deref());
        if !was_current {
            self.clear_display();
        }

        info!(
            "Loaded {} cues for {} ({} -> {}, {}, generation {})",
            count,
            video_id,
            source_language,
            target_language,
            if native { "native tracks" } else { "translating" },
            generation
        );

        if !native {
            self.scheduler.request_run();
        }
        Ok(count)
    }

    // @method: Follow the adapter to another video
    pub fn on_video_id_change(&self, video_id: &str) -> Result<()> {
        if self.session.switch_video(Some(video_id)).is_some() {
            self.display.lock().clear()?;
        }
        Ok(())
    }

    // @method: Render the frame for a playback time and keep translation going
    pub fn on_time_update(&self, time: f64) -> Result<()> {
        if !self.session.is_enabled() {
            return Ok(());
        }

        let settings = self.config.snapshot();
        let Some(video_id) = self.session.current_video_id() else {
            return Ok(());
        };

        let (frame, needs_translation) = {
            let store = self.session.store();
            let frame = CueResolver::new(&store).resolve(&video_id, time, settings.time_offset);
            let pending = store.has_untranslated(&video_id, time + settings.time_offset);
            (frame, pending)
        };

        self.display.lock().render(frame)?;
        if needs_translation {
            self.scheduler.request_run();
        }
        Ok(())
    }

    /// Turn subtitles on or off. Disabling drops the current video's cues.
    pub fn set_enabled(&self, enabled: bool) -> Result<()> {
        if self.session.is_enabled() == enabled {
            return Ok(());
        }

        self.session.set_enabled(enabled);
        if enabled {
            info!("Subtitles enabled");
            self.scheduler.request_run();
        } else {
            let pruned = self.session.prune_current();
            info!("Subtitles disabled, dropped {} cues", pruned);
            self.display.lock().clear()?;
        }
        Ok(())
    }

    /// Give failed cues of the current video another chance
    pub fn retry_failed(&self) -> usize {
        self.scheduler.retry_failed()
    }

    fn clear_display(&self) {
        if let Err(err) = self.display.lock().clear() {
            warn!("Failed to clear subtitle display: {}", err);
        }
    }
}

/// Language from the delivery, falling back to the configured one
fn pick_language(delivered: &str, configured: &str) -> String {
    if delivered.trim().is_empty() {
        language_utils::normalize_tag(configured)
    } else {
        language_utils::normalize_tag(delivered)
    }
}
