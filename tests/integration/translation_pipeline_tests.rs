/*!
 * Scheduler runs against the mock translator
 */

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use dualsub::app_config::{Config, ConfigSource};
use dualsub::providers::mock::MockTranslator;
use dualsub::providers::ProviderProfile;
use dualsub::session::SubtitleSessionState;
use dualsub::subtitle::{Cue, TranslationState};
use dualsub::translation::{SchedulerState, TranslationScheduler};

use crate::common::{fast_config, init_logger, sequential_profile, ManualClock};

struct Pipeline {
    session: Arc<SubtitleSessionState>,
    clock: Arc<ManualClock>,
    scheduler: Arc<TranslationScheduler>,
    translator: MockTranslator,
}

impl Pipeline {
    fn new(translator: MockTranslator, config: Config) -> Self {
        init_logger();
        let session = Arc::new(SubtitleSessionState::new(true));
        let clock = Arc::new(ManualClock::default());
        let config: Arc<dyn ConfigSource> = Arc::new(config);
        let scheduler = Arc::new(TranslationScheduler::new(
            session.clone(),
            Arc::new(translator.clone()),
            clock.clone(),
            config,
        ));
        Self {
            session,
            clock,
            scheduler,
            translator,
        }
    }

    fn load(&self, video_id: &str, lines: &[&str]) -> u64 {
        let cues = lines
            .iter()
            .enumerate()
            .map(|(i, line)| Cue::pending(video_id, i as f64 * 2.0, i as f64 * 2.0 + 1.5, *line))
            .collect();
        self.session.begin_context(video_id, "en", "fr", cues)
    }

    fn translations(&self, video_id: &str) -> Vec<Option<String>> {
        self.session
            .store()
            .cues_for_video(video_id)
            .map(|cue| cue.translated_text().map(str::to_string))
            .collect()
    }

    fn pending_count(&self, video_id: &str) -> usize {
        self.session
            .store()
            .cues_for_video(video_id)
            .filter(|cue| cue.translation.is_pending())
            .count()
    }
}

fn batching_profile() -> ProviderProfile {
    ProviderProfile {
        delay_ms: 0,
        ..ProviderProfile::for_provider(Default::default())
    }
}

fn batch_size(size: usize) -> Config {
    let mut config = fast_config();
    config.translation.batch_size = Some(size);
    config
}

#[tokio::test]
async fn test_runOnce_withBatchSizeTwo_shouldTranslateFiveCuesInThreeRuns() {
    let pipeline = Pipeline::new(
        MockTranslator::working().with_profile(batching_profile()),
        batch_size(2),
    );
    pipeline.load("v1", &["one", "two", "three", "four", "five"]);

    let mut runs = 0;
    while pipeline.pending_count("v1") > 0 {
        let report = pipeline.scheduler.run_once().await.unwrap();
        runs += 1;
        assert!(report.translated <= 2);
        assert!(runs <= 3, "too many runs");
    }

    assert_eq!(runs, 3);
    assert_eq!(pipeline.translator.request_count(), 3);
    assert_eq!(
        pipeline.translations("v1"),
        ["one", "two", "three", "four", "five"]
            .iter()
            .map(|line| Some(MockTranslator::expected_translation(line, "fr")))
            .collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_runOnce_afterEverythingTranslated_shouldBeNoOp() {
    let pipeline = Pipeline::new(
        MockTranslator::working().with_profile(sequential_profile(5)),
        fast_config(),
    );
    pipeline.load("v1", &["Hello", "World"]);

    let first = pipeline.scheduler.run_once().await.unwrap();
    assert_eq!(first.translated, 2);
    assert!(!first.more_pending);
    let before = pipeline.translations("v1");

    let second = pipeline.scheduler.run_once().await.unwrap();

    assert_eq!(second.requests, 0);
    assert_eq!(second.translated, 0);
    assert_eq!(pipeline.translator.request_count(), 2);
    assert_eq!(pipeline.translations("v1"), before);
}

#[tokio::test]
async fn test_runOnce_withOneFailingCue_shouldIsolateFailure() {
    let pipeline = Pipeline::new(
        MockTranslator::failing_on("broken").with_profile(sequential_profile(5)),
        fast_config(),
    );
    pipeline.load("v1", &["first", "broken line", "third"]);

    let report = pipeline.scheduler.run_once().await.unwrap();

    assert_eq!((report.translated, report.failed), (2, 1));
    assert_eq!(
        pipeline.translations("v1"),
        vec![
            Some("[fr] first".to_string()),
            Some("[Translation request failed]".to_string()),
            Some("[fr] third".to_string()),
        ]
    );

    let store = pipeline.session.store();
    let failed: Vec<_> = store
        .cues_for_video("v1")
        .filter(|cue| cue.translation.is_failed())
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].original.as_deref(), Some("broken line"));
}

#[tokio::test]
async fn test_runOnce_withVideoSwitchMidFlight_shouldDiscardResult() {
    let gate = Arc::new(Semaphore::new(0));
    let pipeline = Pipeline::new(
        MockTranslator::working()
            .with_profile(sequential_profile(1))
            .with_gate(gate.clone()),
        fast_config(),
    );
    pipeline.load("v1", &["Hello"]);

    let scheduler = pipeline.scheduler.clone();
    let in_flight = tokio::spawn(async move { scheduler.run_once().await });
    while pipeline.translator.request_count() == 0 {
        tokio::task::yield_now().await;
    }
    assert_eq!(pipeline.scheduler.state(), SchedulerState::Running);

    pipeline.load("v2", &["Other video"]);
    gate.add_permits(1);
    let report = in_flight.await.unwrap().unwrap();

    assert_eq!(report.translated, 0);
    assert_eq!(report.discarded, 1);
    assert_eq!(pipeline.session.store().cues_for_video("v1").count(), 0);
    assert_eq!(pipeline.translations("v2"), vec![None]);
    assert_eq!(pipeline.scheduler.state(), SchedulerState::Idle);
}

#[tokio::test]
async fn test_runOnce_withReloadOfSameVideo_shouldDiscardOldGeneration() {
    let gate = Arc::new(Semaphore::new(0));
    let pipeline = Pipeline::new(
        MockTranslator::working()
            .with_profile(sequential_profile(1))
            .with_gate(gate.clone()),
        fast_config(),
    );
    let first_generation = pipeline.load("v1", &["Hello"]);

    let scheduler = pipeline.scheduler.clone();
    let in_flight = tokio::spawn(async move { scheduler.run_once().await });
    while pipeline.translator.request_count() == 0 {
        tokio::task::yield_now().await;
    }

    let second_generation = pipeline.load("v1", &["Hello"]);
    gate.add_permits(1);
    let report = in_flight.await.unwrap().unwrap();

    assert!(second_generation > first_generation);
    assert_eq!(report.discarded, 1);
    assert_eq!(pipeline.translations("v1"), vec![None]);
}

#[tokio::test]
async fn test_runOnce_withElapsedCues_shouldStartAtPlayhead() {
    let pipeline = Pipeline::new(
        MockTranslator::working().with_profile(sequential_profile(1)),
        fast_config(),
    );
    pipeline.load("v1", &["zero", "two", "four"]);
    pipeline.clock.set(3.7);

    pipeline.scheduler.run_once().await.unwrap();

    let requests = pipeline.translator.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].text, "four");
    assert_eq!(requests[0].source_language, "en");
    assert_eq!(requests[0].target_language, "fr");
}

#[tokio::test]
async fn test_runOnce_withTimeOffset_shouldUseAdjustedPlayhead() {
    let mut config = fast_config();
    config.time_offset = 2.0;
    let pipeline = Pipeline::new(
        MockTranslator::working().with_profile(sequential_profile(1)),
        config,
    );
    pipeline.load("v1", &["zero", "two", "four"]);
    pipeline.clock.set(1.7);

    pipeline.scheduler.run_once().await.unwrap();

    assert_eq!(pipeline.translator.requests()[0].text, "four");
}

#[tokio::test]
async fn test_runOnce_withRepeatedLine_shouldAnswerFromCache() {
    let pipeline = Pipeline::new(
        MockTranslator::working().with_profile(sequential_profile(1)),
        fast_config(),
    );
    pipeline.load("v1", &["Yes.", "Yes."]);

    pipeline.scheduler.run_once().await.unwrap();
    let second = pipeline.scheduler.run_once().await.unwrap();

    assert_eq!(second.cache_hits, 1);
    assert_eq!(second.translated, 1);
    assert_eq!(second.requests, 0);
    assert_eq!(pipeline.translator.request_count(), 1);
    assert_eq!(pipeline.scheduler.cache().stats().hits, 1);
}

#[tokio::test]
async fn test_runOnce_withMergedBatchResponse_shouldRetryIndividually() {
    let pipeline = Pipeline::new(
        MockTranslator::merged_segments().with_profile(batching_profile()),
        batch_size(3),
    );
    pipeline.load("v1", &["a", "b", "c"]);

    let report = pipeline.scheduler.run_once().await.unwrap();

    // One joined request, then one per cue
    assert_eq!(report.requests, 4);
    assert_eq!(report.translated, 3);
    assert_eq!(
        pipeline.translations("v1"),
        vec![
            Some("[fr] a".to_string()),
            Some("[fr] b".to_string()),
            Some("[fr] c".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_runOnce_withMergedBatchAndNoIndividualRetry_shouldFailEveryCue() {
    let mut config = batch_size(2);
    config.translation.retry_individual_entries = false;
    let pipeline = Pipeline::new(
        MockTranslator::merged_segments().with_profile(batching_profile()),
        config,
    );
    pipeline.load("v1", &["a", "b"]);

    let report = pipeline.scheduler.run_once().await.unwrap();

    assert_eq!((report.requests, report.failed), (1, 2));
    assert_eq!(
        pipeline.translations("v1"),
        vec![Some("[Invalid translation response]".to_string()); 2]
    );
}

#[tokio::test]
async fn test_runOnce_withEmptyResponse_shouldMarkMalformed() {
    let pipeline = Pipeline::new(
        MockTranslator::empty().with_profile(sequential_profile(1)),
        fast_config(),
    );
    pipeline.load("v1", &["Hello"]);

    pipeline.scheduler.run_once().await.unwrap();

    let store = pipeline.session.store();
    let cue = store.cues_for_video("v1").next().unwrap();
    assert!(matches!(
        &cue.translation,
        TranslationState::Failed { kind, .. } if *kind == dualsub::errors::TranslationErrorKind::MalformedResponse
    ));
}

#[tokio::test]
async fn test_runOnce_withSpanishUiLocale_shouldLocalizePlaceholder() {
    let mut config = fast_config();
    config.ui_locale = "es".to_string();
    let pipeline = Pipeline::new(
        MockTranslator::failing_on("Hello").with_profile(sequential_profile(1)),
        config,
    );
    pipeline.load("v1", &["Hello"]);

    pipeline.scheduler.run_once().await.unwrap();

    assert_eq!(
        pipeline.translations("v1"),
        vec![Some("[Error en la solicitud de traducción]".to_string())]
    );
}

#[tokio::test(start_paused = true)]
async fn test_runOnce_withRequestDelay_shouldPaceSequentialRequests() {
    let mut config = fast_config();
    config.translation.request_delay_ms = Some(250);
    let pipeline = Pipeline::new(
        MockTranslator::working().with_profile(sequential_profile(3)),
        config,
    );
    pipeline.load("v1", &["a", "b", "c"]);

    let started = tokio::time::Instant::now();
    pipeline.scheduler.run_once().await.unwrap();

    assert_eq!(started.elapsed(), Duration::from_millis(500));
}

#[tokio::test(start_paused = true)]
async fn test_requestRun_whileScheduled_shouldNotStartSecondRun() {
    let pipeline = Pipeline::new(
        MockTranslator::working().with_profile(sequential_profile(1)),
        fast_config(),
    );
    pipeline.load("v1", &["one", "two", "three"]);

    assert!(pipeline.scheduler.request_run());
    assert!(!pipeline.scheduler.request_run());
    assert_eq!(pipeline.scheduler.state(), SchedulerState::Scheduled);

    // The driver keeps scheduling continuations until nothing is left
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(pipeline.pending_count("v1"), 0);
    assert_eq!(pipeline.translator.request_count(), 3);
    assert_eq!(pipeline.scheduler.state(), SchedulerState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_waitUntilIdle_afterRequestRun_shouldCoverEveryContinuation() {
    let pipeline = Pipeline::new(
        MockTranslator::working().with_profile(sequential_profile(1)),
        fast_config(),
    );
    pipeline.load("v1", &["one", "two", "three", "four"]);

    assert!(pipeline.scheduler.request_run());
    pipeline.scheduler.wait_until_idle().await;

    assert_eq!(pipeline.pending_count("v1"), 0);
    assert_eq!(pipeline.translator.request_count(), 4);
    assert_eq!(pipeline.scheduler.state(), SchedulerState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_retryFailed_shouldResetFailedCuesAndRunAgain() {
    let pipeline = Pipeline::new(
        MockTranslator::intermittent(2).with_profile(sequential_profile(5)),
        fast_config(),
    );
    pipeline.load("v1", &["one", "two"]);

    pipeline.scheduler.run_once().await.unwrap();
    assert_eq!(pipeline.translations("v1")[1].as_deref(), Some("[Translation service error]"));

    assert_eq!(pipeline.scheduler.retry_failed(), 1);
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(pipeline.translations("v1")[1].as_deref(), Some("[fr] two"));
    assert_eq!(pipeline.translator.request_count(), 3);
}

#[tokio::test]
async fn test_runOnce_whenDisabled_shouldDoNothing() {
    let pipeline = Pipeline::new(MockTranslator::working(), fast_config());
    pipeline.load("v1", &["Hello"]);
    pipeline.session.set_enabled(false);

    let report = pipeline.scheduler.run_once().await.unwrap();

    assert_eq!(report.requests, 0);
    assert_eq!(pipeline.pending_count("v1"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_runOnce_calledConcurrently_shouldAllowSingleActiveRun() {
    let pipeline = Pipeline::new(
        MockTranslator::slow(100).with_profile(sequential_profile(5)),
        fast_config(),
    );
    pipeline.load("v1", &["one", "two"]);

    let reports = futures::future::join_all(
        (0..3).map(|_| pipeline.scheduler.run_once()),
    )
    .await;

    assert_eq!(reports.iter().filter(|report| report.is_some()).count(), 1);
    assert_eq!(pipeline.translator.request_count(), 2);
    assert_eq!(pipeline.pending_count("v1"), 0);
}
