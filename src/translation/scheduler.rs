/*!
 * Translation scheduler.
 *
 * Translates the untranslated cues closest to the playhead a few at a time,
 * pacing requests per provider. At most one run is active; asking for a run
 * while one is scheduled or running does nothing, and a run that leaves work
 * behind schedules the next one itself.
 *
 * Every request is tagged with the generation of the video context it was
 * made for. Results that come back after the context changed are dropped.
 */

use log::{debug, error, warn};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{Config, ConfigSource};
use crate::errors::ProviderError;
use crate::playback::PlaybackClock;
use crate::providers::{ProviderProfile, Translator};
use crate::session::{SubtitleSessionState, VideoContext, WriteBack};
use crate::subtitle::{Cue, TranslationState};

use super::batch::{self, BatchError};
use super::cache::TranslationCache;
use super::messages::localized_placeholder;

const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Lifecycle of the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    Idle,
    Scheduled,
    Running,
}

/// What one run did
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    /// Cues that received a translation
    pub translated: usize,
    /// Cues that received a failure placeholder
    pub failed: usize,
    /// Results dropped because the context changed or the cue disappeared
    pub discarded: usize,
    /// Cues answered from the session cache
    pub cache_hits: usize,
    /// Provider requests sent
    pub requests: usize,
    /// Untranslated cues still ahead of the playhead after this run
    pub more_pending: bool,
}

/// Resets the state when a run ends, including on cancellation
struct RunGuard<'a> {
    state: &'a Mutex<SchedulerState>,
    armed: bool,
}

impl RunGuard<'_> {
    /// Hand the run slot to `next` without passing through `Idle`
    fn hand_over(mut self, state: &mut SchedulerState, next: SchedulerState) {
        *state = next;
        self.armed = false;
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.state.lock();
        if *state == SchedulerState::Running {
            *state = SchedulerState::Idle;
        }
    }
}

// Values fixed for the duration of one run
struct RunContext {
    context: VideoContext,
    config: Config,
    profile: ProviderProfile,
    delay: Duration,
}

pub struct TranslationScheduler {
    session: Arc<SubtitleSessionState>,
    translator: Arc<dyn Translator>,
    clock: Arc<dyn PlaybackClock>,
    config: Arc<dyn ConfigSource>,
    cache: TranslationCache,
    state: Mutex<SchedulerState>,
}

impl TranslationScheduler {
    pub fn new(
        session: Arc<SubtitleSessionState>,
        translator: Arc<dyn Translator>,
        clock: Arc<dyn PlaybackClock>,
        config: Arc<dyn ConfigSource>,
    ) -> Self {
        let cache = TranslationCache::new(config.snapshot().translation.cache_enabled);
        Self {
            session,
            translator,
            clock,
            config,
            cache,
            state: Mutex::new(SchedulerState::Idle),
        }
    }

    pub fn state(&self) -> SchedulerState {
        *self.state.lock()
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    /// Schedule a run on the current tokio runtime.
    ///
    /// Returns `false` when a run is already scheduled or running, or when
    /// called outside a runtime.
    pub fn request_run(self: &Arc<Self>) -> bool {
        let mut state = self.state.lock();
        if *state != SchedulerState::Idle {
            debug!("Translation run already {:?}", *state);
            return false;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No tokio runtime available, translation run not scheduled");
            return false;
        };
        *state = SchedulerState::Scheduled;
        drop(state);

        let scheduler = Arc::clone(self);
        runtime.spawn(async move { scheduler.drive().await });
        true
    }

    /// Resolve once no run is scheduled or running
    pub async fn wait_until_idle(&self) {
        while self.state() != SchedulerState::Idle {
            tokio::time::sleep(IDLE_POLL_INTERVAL).await;
        }
    }

    async fn drive(self: Arc<Self>) {
        loop {
            let Some(guard) = self.begin_run() else {
                return;
            };
            let report = self.translate_next_batch().await;

            let continuation = {
                let mut state = self.state.lock();
                let more = report.more_pending || self.has_pending_work();
                if !more || !self.session.is_enabled() {
                    guard.hand_over(&mut state, SchedulerState::Idle);
                    return;
                }
                guard.hand_over(&mut state, SchedulerState::Scheduled);
                self.config.snapshot().translation.continuation_delay()
            };

            tokio::time::sleep(continuation).await;
        }
    }

    fn has_pending_work(&self) -> bool {
        let Some(video_id) = self.session.current_video_id() else {
            return false;
        };
        let time = self.clock.current_time() + self.config.snapshot().time_offset;
        self.session.store().has_untranslated(&video_id, time)
    }

    fn begin_run(&self) -> Option<RunGuard<'_>> {
        let mut state = self.state.lock();
        if *state == SchedulerState::Running {
            return None;
        }
        *state = SchedulerState::Running;
        Some(RunGuard {
            state: &self.state,
            armed: true,
        })
    }

    /// Perform one run now; `None` if a run is already in progress
    pub async fn run_once(&self) -> Option<BatchReport> {
        let _guard = self.begin_run()?;
        Some(self.translate_next_batch().await)
    }

    /// Return the current video's failed cues to pending
    pub fn retry_failed(self: &Arc<Self>) -> usize {
        let reset = self.session.reset_failed();
        if reset > 0 {
            debug!("Retrying {} failed cues", reset);
            self.request_run();
        }
        reset
    }

    async fn translate_next_batch(&self) -> BatchReport {
        let mut report = BatchReport::default();
        if !self.session.is_enabled() {
            return report;
        }

        let config = self.config.snapshot();
        let context = self.session.context();
        let Some(video_id) = context.video_id.clone() else {
            return report;
        };

        let profile = self.translator.profile();
        let batch_size = config.translation.effective_batch_size(&profile);
        let delay = config.translation.effective_request_delay(&profile);
        let time = self.clock.current_time() + config.time_offset;

        let cues = self.session.store().find_untranslated(&video_id, time, batch_size);
        if cues.is_empty() {
            return report;
        }

        let run = RunContext {
            context,
            config,
            profile,
            delay,
        };

        let mut uncached = Vec::with_capacity(cues.len());
        for cue in cues {
            match self.cached_translation(&run, &cue) {
                Some(text) => {
                    report.cache_hits += 1;
                    self.write_back(&run, &cue, TranslationState::translated(text), &mut report);
                }
                None => uncached.push(cue),
            }
        }

        if run.profile.supports_batch && uncached.len() > 1 {
            self.translate_batched(&run, &uncached, &mut report).await;
        } else {
            self.translate_sequentially(&run, &uncached, &mut report).await;
        }

        report.more_pending = self.session.store().has_untranslated(&video_id, time);
        debug!(
            "Translation run for {}: {} translated, {} failed, {} discarded, {} cached, {} requests",
            video_id,
            report.translated,
            report.failed,
            report.discarded,
            report.cache_hits,
            report.requests
        );
        report
    }

    fn cached_translation(&self, run: &RunContext, cue: &Cue) -> Option<String> {
        let original = cue.original.as_deref()?;
        self.cache.get(
            original,
            &run.context.source_language,
            &run.context.target_language,
        )
    }

    async fn translate_batched(&self, run: &RunContext, cues: &[Cue], report: &mut BatchReport) {
        if !self.session.is_current(run.context.generation) {
            report.discarded += cues.len();
            return;
        }

        let texts: Vec<String> = cues
            .iter()
            .map(|cue| cue.original.clone().unwrap_or_default())
            .collect();

        report.requests += 1;
        let result = batch::translate_joined(
            self.translator.as_ref(),
            &texts,
            &run.profile.delimiter,
            &run.context.source_language,
            &run.context.target_language,
        )
        .await;

        match result {
            Ok(translations) => {
                for (cue, text) in cues.iter().zip(translations) {
                    self.complete(run, cue, Ok(text), report);
                }
            }
            Err(err) if run.config.translation.retry_individual_entries => {
                warn!("{}, retrying {} cues individually", err, cues.len());
                tokio::time::sleep(run.delay).await;
                self.translate_sequentially(run, cues, report).await;
            }
            Err(err) => {
                let provider_error = match err {
                    BatchError::Provider(provider_error) => provider_error,
                    mismatch @ BatchError::SegmentMismatch { .. } => {
                        ProviderError::ParseError(mismatch.to_string())
                    }
                };
                for cue in cues {
                    self.complete(run, cue, Err(provider_error.clone()), report);
                }
            }
        }
    }

    async fn translate_sequentially(&self, run: &RunContext, cues: &[Cue], report: &mut BatchReport) {
        for (index, cue) in cues.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(run.delay).await;
            }

            if !self.session.is_current(run.context.generation) {
                debug!("Video context changed, dropping {} queued cues", cues.len() - index);
                report.discarded += cues.len() - index;
                return;
            }

            let Some(original) = cue.original.as_deref() else {
                continue;
            };

            report.requests += 1;
            let result = self
                .translator
                .translate(
                    original,
                    &run.context.source_language,
                    &run.context.target_language,
                )
                .await;
            self.complete(run, cue, result, report);
        }
    }

    fn complete(
        &self,
        run: &RunContext,
        cue: &Cue,
        result: Result<String, ProviderError>,
        report: &mut BatchReport,
    ) {
        let result = result.and_then(|text| match text.trim() {
            "" => Err(ProviderError::EmptyResponse),
            trimmed => Ok(trimmed.to_string()),
        });

        let state = match result {
            Ok(text) => {
                if let Some(original) = cue.original.as_deref() {
                    self.cache.store(
                        original,
                        &run.context.source_language,
                        &run.context.target_language,
                        &text,
                    );
                }
                TranslationState::translated(text)
            }
            Err(err) => {
                let kind = err.kind();
                error!(
                    "Translation failed for cue at {:.3}s: {}",
                    cue.start, err
                );
                TranslationState::Failed {
                    kind,
                    message: localized_placeholder(kind, &run.config.ui_locale),
                }
            }
        };

        self.write_back(run, cue, state, report);
    }

    fn write_back(&self, run: &RunContext, cue: &Cue, state: TranslationState, report: &mut BatchReport) {
        let failed = state.is_failed();
        match self
            .session
            .write_translation(run.context.generation, &cue.key(), state)
        {
            WriteBack::Applied if failed => report.failed += 1,
            WriteBack::Applied => report.translated += 1,
            outcome => {
                debug!(
                    "Discarding translation for cue at {:.3}s: {:?}",
                    cue.start, outcome
                );
                report.discarded += 1;
            }
        }
    }
}
