/*!
 * In-process platform used by the CLI replay command and the tests.
 *
 * Every value is set by hand; nothing advances on its own.
 */

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::platform::{MediaElement, PlatformAdapter, ProgressIndicator, ReadyState};

/// A video element with a hand-driven clock
#[derive(Debug)]
pub struct SimulatedVideo {
    instance_id: u64,
    duration: Option<f64>,
    time: Mutex<f64>,
    ready_state: Mutex<ReadyState>,
}

impl SimulatedVideo {
    pub fn new(instance_id: u64, duration: Option<f64>) -> Self {
        Self {
            instance_id,
            duration,
            time: Mutex::new(0.0),
            ready_state: Mutex::new(ReadyState::HaveEnoughData),
        }
    }

    pub fn set_time(&self, time: f64) {
        *self.time.lock() = time;
    }

    pub fn advance(&self, seconds: f64) {
        *self.time.lock() += seconds;
    }

    pub fn set_ready_state(&self, state: ReadyState) {
        *self.ready_state.lock() = state;
    }
}

impl MediaElement for SimulatedVideo {
    fn current_time(&self) -> f64 {
        *self.time.lock()
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn ready_state(&self) -> ReadyState {
        *self.ready_state.lock()
    }

    fn instance_id(&self) -> u64 {
        self.instance_id
    }
}

/// A progress bar whose `now`/`max` attributes are set by hand
#[derive(Debug)]
pub struct SimulatedProgressBar {
    values: Mutex<(Option<f64>, Option<f64>)>,
}

impl SimulatedProgressBar {
    pub fn new(now: f64, max: f64) -> Self {
        Self {
            values: Mutex::new((Some(now), Some(max))),
        }
    }

    pub fn set(&self, now: f64, max: f64) {
        *self.values.lock() = (Some(now), Some(max));
    }

    /// Drop both attributes, as a half-rendered bar would
    pub fn clear(&self) {
        *self.values.lock() = (None, None);
    }
}

impl ProgressIndicator for SimulatedProgressBar {
    fn value_now(&self) -> Option<f64> {
        self.values.lock().0
    }

    fn value_max(&self) -> Option<f64> {
        self.values.lock().1
    }
}

/// Platform adapter backed by the simulated elements above
#[derive(Debug)]
pub struct SimulatedPlatform {
    name: String,
    progress_tracking: bool,
    video: Mutex<Option<Arc<SimulatedVideo>>>,
    video_id: Mutex<Option<String>>,
    progress_bar: Mutex<Option<Arc<SimulatedProgressBar>>>,
    progress_lookups: AtomicUsize,
}

impl SimulatedPlatform {
    pub fn new(name: &str, progress_tracking: bool) -> Self {
        Self {
            name: name.to_string(),
            progress_tracking,
            video: Mutex::new(None),
            video_id: Mutex::new(None),
            progress_bar: Mutex::new(None),
            progress_lookups: AtomicUsize::new(0),
        }
    }

    pub fn set_video(&self, video: Option<Arc<SimulatedVideo>>) {
        *self.video.lock() = video;
    }

    pub fn video(&self) -> Option<Arc<SimulatedVideo>> {
        self.video.lock().clone()
    }

    pub fn set_video_id(&self, video_id: Option<&str>) {
        *self.video_id.lock() = video_id.map(str::to_string);
    }

    pub fn install_progress_bar(&self, bar: Arc<SimulatedProgressBar>) {
        *self.progress_bar.lock() = Some(bar);
    }

    pub fn remove_progress_bar(&self) {
        *self.progress_bar.lock() = None;
    }

    /// How many times the core looked for the progress bar
    pub fn progress_lookups(&self) -> usize {
        self.progress_lookups.load(Ordering::SeqCst)
    }
}

impl PlatformAdapter for SimulatedPlatform {
    fn name(&self) -> &str {
        &self.name
    }

    fn video_element(&self) -> Option<Arc<dyn MediaElement>> {
        self.video
            .lock()
            .clone()
            .map(|video| video as Arc<dyn MediaElement>)
    }

    fn current_video_id(&self) -> Option<String> {
        self.video_id.lock().clone()
    }

    fn progress_bar(&self) -> Option<Arc<dyn ProgressIndicator>> {
        self.progress_lookups.fetch_add(1, Ordering::SeqCst);
        self.progress_bar
            .lock()
            .clone()
            .map(|bar| bar as Arc<dyn ProgressIndicator>)
    }

    fn supports_progress_bar_tracking(&self) -> bool {
        self.progress_tracking
    }
}
