/*!
 * Common test utilities for the dualsub test suite
 */

use anyhow::Result;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::Once;

use dualsub::app_config::Config;
use dualsub::display::DisplayDriver;
use dualsub::playback::PlaybackClock;
use dualsub::playback::simulated::{SimulatedPlatform, SimulatedVideo};
use dualsub::playback::SubtitleData;
use dualsub::providers::ProviderProfile;
use dualsub::providers::mock::MockTranslator;
use dualsub::subtitle::ResolvedCues;
use dualsub::SubtitleController;

static LOGGER: Once = Once::new();

/// Route library logs through env_logger once per test binary
pub fn init_logger() {
    LOGGER.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Original-language track used across the suite
pub const ENGLISH_VTT: &str = "WEBVTT

1
00:00:01.000 --> 00:00:03.000
Hello there.

2
00:00:04.000 --> 00:00:06.000
How are you?

3
00:00:07.000 --> 00:00:09.000
<i>Fine</i>, thanks.
";

/// Native Spanish track with timing that drifts from the English one
pub const SPANISH_VTT: &str = "WEBVTT

00:00:00.900 --> 00:00:02.900
Hola.

00:00:04.200 --> 00:00:06.100
¿Cómo estás?

00:00:06.900 --> 00:00:09.000
Bien, gracias.
";

/// What a display received
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Shown(ResolvedCues),
    Cleared,
}

/// Display driver that records frames in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    frames: Arc<Mutex<Vec<Frame>>>,
}

impl RecordingDisplay {
    pub fn frames(&self) -> Vec<Frame> {
        self.frames.lock().clone()
    }

    /// Texts of the shown frames, in order
    pub fn shown(&self) -> Vec<(String, String)> {
        self.frames
            .lock()
            .iter()
            .filter_map(|frame| match frame {
                Frame::Shown(cues) => Some((cues.original_text.clone(), cues.translated_text.clone())),
                Frame::Cleared => None,
            })
            .collect()
    }
}

impl DisplayDriver for RecordingDisplay {
    fn show(&mut self, frame: &ResolvedCues) -> Result<()> {
        self.frames.lock().push(Frame::Shown(frame.clone()));
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.frames.lock().push(Frame::Cleared);
        Ok(())
    }
}

/// Clock whose time is set by the test
#[derive(Debug, Default)]
pub struct ManualClock(Mutex<f64>);

impl ManualClock {
    pub fn set(&self, time: f64) {
        *self.0.lock() = time;
    }
}

impl PlaybackClock for ManualClock {
    fn current_time(&self) -> f64 {
        *self.0.lock()
    }
}

/// Profile with one segment per request and room for several cues per run
pub fn sequential_profile(batch_size: usize) -> ProviderProfile {
    ProviderProfile {
        default_batch_size: batch_size,
        max_batch_size: batch_size.max(10),
        ..ProviderProfile::single_segment(0)
    }
}

/// Config with no pacing so tests do not wait on request delays
pub fn fast_config() -> Config {
    let mut config = Config::default();
    config.target_language = "fr".to_string();
    config.translation.request_delay_ms = Some(0);
    config.translation.continuation_delay_ms = 0;
    config
}

/// Everything a controller test needs to drive playback
pub struct Harness {
    pub controller: SubtitleController<RecordingDisplay>,
    pub platform: Arc<SimulatedPlatform>,
    pub video: Arc<SimulatedVideo>,
    pub display: RecordingDisplay,
    pub translator: MockTranslator,
}

impl Harness {
    pub fn new(translator: MockTranslator, config: Config) -> Self {
        init_logger();
        let platform = Arc::new(SimulatedPlatform::new("test", false));
        let video = Arc::new(SimulatedVideo::new(1, Some(60.0)));
        platform.set_video(Some(video.clone()));
        platform.set_video_id(Some("v1"));

        let display = RecordingDisplay::default();
        let controller = SubtitleController::new(
            platform.clone(),
            Arc::new(translator.clone()),
            Arc::new(config),
            display.clone(),
        );

        Self {
            controller,
            platform,
            video,
            display,
            translator,
        }
    }

    /// Move the playhead and deliver the media clock event
    pub fn play_to(&self, time: f64) -> Result<()> {
        self.video.set_time(time);
        self.controller
            .handle_event(dualsub::PlatformEvent::MediaTimeUpdate)
    }
}

/// Subtitle delivery for translation mode
pub fn translation_delivery(video_id: &str, vtt_text: &str) -> SubtitleData {
    SubtitleData {
        vtt_text: vtt_text.to_string(),
        target_vtt_text: None,
        video_id: video_id.to_string(),
        source_language: "en".to_string(),
        target_language: "fr".to_string(),
        use_native_target: false,
        url: Some(format!("https://cdn.example/{}/en.vtt", video_id)),
    }
}

/// Subtitle delivery carrying both native tracks
pub fn dual_track_delivery(video_id: &str) -> SubtitleData {
    SubtitleData {
        target_vtt_text: Some(SPANISH_VTT.to_string()),
        target_language: "es".to_string(),
        use_native_target: true,
        ..translation_delivery(video_id, ENGLISH_VTT)
    }
}
