/*!
 * Playback time reconciliation.
 *
 * Platforms disagree about which clock to trust: some keep the media
 * element's `currentTime` accurate, others only keep their own progress bar
 * in sync with what is on screen. The reconciler picks one strategy per
 * attached video element and turns its raw signals into a single stream of
 * time updates.
 */

use log::{debug, info, warn};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

use crate::app_config::TimeTrackingConfig;

use super::platform::{PlatformAdapter, ProgressIndicator};

/// Source of the playback position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeStrategy {
    /// The media element's own clock
    MediaClock,
    /// A ratio derived from the platform's progress bar
    ProgressIndicator,
}

/// One emitted playback position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeUpdate {
    pub time: f64,
    pub strategy: TimeStrategy,
}

/// Anything that can tell the current playback position
pub trait PlaybackClock: Send + Sync {
    fn current_time(&self) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Tracking {
    Detached,
    Discovering,
    Active(TimeStrategy),
}

#[derive(Debug)]
struct ReconcilerState {
    tracking: Tracking,
    element_id: Option<u64>,
    progress_bar: Option<Arc<dyn ProgressIndicator>>,
    last_emitted: Option<f64>,
    // Bumped on every attach/detach; a discovery loop from an older epoch stops
    epoch: u64,
}

/// Resolves the current playback position from the platform's clocks
pub struct TimeSourceReconciler {
    adapter: Arc<dyn PlatformAdapter>,
    settings: TimeTrackingConfig,
    state: Mutex<ReconcilerState>,
    updates: watch::Sender<Option<TimeUpdate>>,
}

impl TimeSourceReconciler {
    pub fn new(adapter: Arc<dyn PlatformAdapter>, settings: TimeTrackingConfig) -> Self {
        let (updates, _) = watch::channel(None);
        Self {
            adapter,
            settings,
            state: Mutex::new(ReconcilerState {
                tracking: Tracking::Detached,
                element_id: None,
                progress_bar: None,
                last_emitted: None,
                epoch: 0,
            }),
            updates,
        }
    }

    /// Stream of emitted positions
    pub fn subscribe(&self) -> watch::Receiver<Option<TimeUpdate>> {
        self.updates.subscribe()
    }

    /// The active strategy, `None` while detached or still looking for a progress bar
    pub fn strategy(&self) -> Option<TimeStrategy> {
        match self.state.lock().tracking {
            Tracking::Active(strategy) => Some(strategy),
            Tracking::Detached | Tracking::Discovering => None,
        }
    }

    pub fn is_discovering(&self) -> bool {
        self.state.lock().tracking == Tracking::Discovering
    }

    /// Position last emitted by either strategy
    pub fn last_emitted(&self) -> Option<f64> {
        self.state.lock().last_emitted
    }

    /// Select a strategy for the adapter's current video element.
    ///
    /// For platforms with progress-bar tracking this polls for the bar and
    /// falls back to the media clock once the retry budget is spent. Calling
    /// `attach` again (for a replaced element) supersedes an ongoing discovery.
    pub async fn attach(&self) -> TimeStrategy {
        let epoch = {
            let mut state = self.state.lock();
            state.epoch += 1;
            state.element_id = self.adapter.video_element().map(|e| e.instance_id());
            state.progress_bar = None;
            state.last_emitted = None;
            state.tracking = Tracking::Discovering;
            state.epoch
        };

        if !self.adapter.supports_progress_bar_tracking() {
            debug!("{}: using media clock", self.adapter.name());
            return self.activate(epoch, TimeStrategy::MediaClock, None);
        }

        let max_retries = self.settings.max_progress_retries;
        let mut attempt = 0;
        loop {
            if self.state.lock().epoch != epoch {
                debug!("Progress bar discovery superseded");
                return self.strategy().unwrap_or(TimeStrategy::MediaClock);
            }

            if let Some(bar) = self.adapter.progress_bar() {
                info!(
                    "{}: tracking progress bar after {} retries",
                    self.adapter.name(),
                    attempt
                );
                return self.activate(epoch, TimeStrategy::ProgressIndicator, Some(bar));
            }

            if attempt >= max_retries {
                break;
            }
            attempt += 1;
            debug!("Progress bar not found, retry {}/{}", attempt, max_retries);
            tokio::time::sleep(self.settings.progress_poll_interval()).await;
        }

        warn!(
            "{}: progress bar not found after {} retries, falling back to media clock",
            self.adapter.name(),
            max_retries
        );
        self.activate(epoch, TimeStrategy::MediaClock, None)
    }

    fn activate(
        &self,
        epoch: u64,
        strategy: TimeStrategy,
        progress_bar: Option<Arc<dyn ProgressIndicator>>,
    ) -> TimeStrategy {
        let mut state = self.state.lock();
        if state.epoch == epoch {
            state.tracking = Tracking::Active(strategy);
            state.progress_bar = progress_bar;
        }
        strategy
    }

    /// Stop emitting updates until the next `attach`
    pub fn detach(&self) {
        let mut state = self.state.lock();
        state.epoch += 1;
        state.tracking = Tracking::Detached;
        state.progress_bar = None;
        state.element_id = None;
        state.last_emitted = None;
    }

    /// Whether the adapter's video element differs from the attached one
    pub fn element_replaced(&self) -> bool {
        let current = self.adapter.video_element().map(|e| e.instance_id());
        current != self.state.lock().element_id
    }

    /// Handle a native media timing event
    pub fn on_media_time_update(&self) -> Option<TimeUpdate> {
        if self.strategy() != Some(TimeStrategy::MediaClock) {
            return None;
        }

        let element = self.adapter.video_element()?;
        if !element.ready_state().has_current_data() {
            return None;
        }

        let time = element.current_time();
        if !time.is_finite() {
            return None;
        }

        self.emit(TimeStrategy::MediaClock, time)
    }

    /// Handle an attribute mutation on the progress bar
    pub fn on_progress_mutation(&self) -> Option<TimeUpdate> {
        let (bar, last) = {
            let state = self.state.lock();
            if state.tracking != Tracking::Active(TimeStrategy::ProgressIndicator) {
                return None;
            }
            (state.progress_bar.clone()?, state.last_emitted)
        };

        let now = bar.value_now().filter(|v| v.is_finite())?;
        let max = bar.value_max().filter(|v| v.is_finite() && *v > 0.0);
        let duration = self
            .adapter
            .video_element()
            .and_then(|e| e.duration())
            .filter(|d| d.is_finite() && *d > 0.0);

        let calculated = match (max, duration) {
            (Some(max), Some(duration)) => now / max * duration,
            _ => now,
        };

        if let Some(last) = last {
            if (calculated - last).abs() <= self.settings.min_time_delta_secs {
                return None;
            }
        }

        self.emit(TimeStrategy::ProgressIndicator, calculated)
    }

    fn emit(&self, strategy: TimeStrategy, time: f64) -> Option<TimeUpdate> {
        self.state.lock().last_emitted = Some(time);
        let update = TimeUpdate { time, strategy };
        self.updates.send_replace(Some(update));
        Some(update)
    }
}

impl PlaybackClock for TimeSourceReconciler {
    /// Latest progress-derived time when tracking the bar, the media clock otherwise
    fn current_time(&self) -> f64 {
        let (tracking, last) = {
            let state = self.state.lock();
            (state.tracking, state.last_emitted)
        };

        if let (Tracking::Active(TimeStrategy::ProgressIndicator), Some(last)) = (tracking, last) {
            return last;
        }

        self.adapter
            .video_element()
            .map(|e| e.current_time())
            .filter(|t| t.is_finite())
            .or(last)
            .unwrap_or(0.0)
    }
}
