use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::errors::ConfigError;
use crate::language_utils;
use crate::providers::ProviderProfile;

/// Session configuration
/// This module handles the user-facing settings the subtitle core consumes:
/// languages, timing offset, translation pacing and time tracking.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Language of the original subtitle track, or `auto`
    #[serde(default = "default_original_language")]
    pub original_language: String,

    /// Language translations are requested in
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Signed offset in seconds added to the playback position before lookup
    #[serde(default)]
    pub time_offset: f64,

    /// Master switch for the overlay
    #[serde(default = "default_true")]
    pub subtitles_enabled: bool,

    /// Prefer a platform-provided target track over machine translation
    #[serde(default = "default_true")]
    pub use_native_subtitles: bool,

    /// Locale used for error placeholders written into cues
    #[serde(default = "default_ui_locale")]
    pub ui_locale: String,

    /// Translation pipeline settings
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Playback time tracking settings
    #[serde(default)]
    pub time_tracking: TimeTrackingConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Google Translate
    #[default]
    Google,
    // @provider: Microsoft Translator
    Microsoft,
    // @provider: DeepL API
    DeepL,
    // @provider: DeepL free web endpoint (single segment per call)
    DeepLFree,
    // @provider: OpenAI-compatible chat completion endpoint
    OpenAICompatible,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Google => "Google Translate",
            Self::Microsoft => "Microsoft Translator",
            Self::DeepL => "DeepL",
            Self::DeepLFree => "DeepL (free)",
            Self::OpenAICompatible => "OpenAI-compatible",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Google => "google".to_string(),
            Self::Microsoft => "microsoft".to_string(),
            Self::DeepL => "deepl".to_string(),
            Self::DeepLFree => "deeplfree".to_string(),
            Self::OpenAICompatible => "openaicompatible".to_string(),
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "google" => Ok(Self::Google),
            "microsoft" => Ok(Self::Microsoft),
            "deepl" => Ok(Self::DeepL),
            "deeplfree" => Ok(Self::DeepLFree),
            "openai" | "openaicompatible" => Ok(Self::OpenAICompatible),
            _ => Err(ConfigError::InvalidValue {
                key: "translation.provider",
                reason: format!("unknown provider '{}'", s),
            }),
        }
    }
}

/// Translation pipeline configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Cues per scheduler run; `None` uses the provider default
    #[serde(default)]
    pub batch_size: Option<usize>,

    /// Delay in milliseconds between consecutive requests; `None` uses the provider default
    #[serde(default)]
    pub request_delay_ms: Option<u64>,

    /// Delay before a scheduler run that found more work starts the next one
    #[serde(default = "default_continuation_delay_ms")]
    pub continuation_delay_ms: u64,

    /// Whether to retry individual cues when a delimited batch request fails
    #[serde(default = "default_true")]
    pub retry_individual_entries: bool,

    /// Reuse translations of identical lines within a session
    #[serde(default = "default_true")]
    pub cache_enabled: bool,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            batch_size: None,
            request_delay_ms: None,
            continuation_delay_ms: default_continuation_delay_ms(),
            retry_individual_entries: true,
            cache_enabled: true,
        }
    }
}

impl TranslationConfig {
    /// Batch size after applying the provider's default and upper bound
    pub fn effective_batch_size(&self, profile: &ProviderProfile) -> usize {
        let max = profile.max_batch_size.max(1);
        self.batch_size
            .unwrap_or(profile.default_batch_size)
            .clamp(1, max)
    }

    /// Inter-request delay after applying the provider's default
    pub fn effective_request_delay(&self, profile: &ProviderProfile) -> Duration {
        Duration::from_millis(self.request_delay_ms.unwrap_or(profile.delay_ms))
    }

    /// Delay between a run that found more work and the next run
    pub fn continuation_delay(&self) -> Duration {
        Duration::from_millis(self.continuation_delay_ms)
    }
}

/// Playback time tracking configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TimeTrackingConfig {
    /// Interval between attempts to locate the progress bar
    #[serde(default = "default_progress_poll_interval_ms")]
    pub progress_poll_interval_ms: u64,

    /// Attempts before falling back to the media clock for good
    #[serde(default = "default_max_progress_retries")]
    pub max_progress_retries: u32,

    /// Progress-derived times closer than this to the last emitted one are dropped
    #[serde(default = "default_min_time_delta_secs")]
    pub min_time_delta_secs: f64,
}

impl Default for TimeTrackingConfig {
    fn default() -> Self {
        Self {
            progress_poll_interval_ms: default_progress_poll_interval_ms(),
            max_progress_retries: default_max_progress_retries(),
            min_time_delta_secs: default_min_time_delta_secs(),
        }
    }
}

impl TimeTrackingConfig {
    pub fn progress_poll_interval(&self) -> Duration {
        Duration::from_millis(self.progress_poll_interval_ms)
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Largest accepted offset between subtitles and video, in seconds
pub const MAX_TIME_OFFSET_SECS: f64 = 600.0;

fn default_original_language() -> String {
    language_utils::AUTO_DETECT.to_string()
}

fn default_target_language() -> String {
    "en".to_string()
}

fn default_ui_locale() -> String {
    "en".to_string()
}

fn default_true() -> bool {
    true
}

fn default_continuation_delay_ms() -> u64 {
    50
}

fn default_progress_poll_interval_ms() -> u64 {
    500
}

fn default_max_progress_retries() -> u32 {
    20
}

fn default_min_time_delta_secs() -> f64 {
    0.1
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), ConfigError> {
        language_utils::validate_language_code(&self.original_language, true)?;
        language_utils::validate_language_code(&self.target_language, false)?;
        if language_utils::language_codes_match(&self.original_language, &self.target_language) {
            return Err(ConfigError::InvalidValue {
                key: "target_language",
                reason: format!("must differ from original_language ({})", self.original_language),
            });
        }

        if !self.time_offset.is_finite() || self.time_offset.abs() > MAX_TIME_OFFSET_SECS {
            return Err(ConfigError::InvalidValue {
                key: "time_offset",
                reason: format!("must be within ±{} seconds", MAX_TIME_OFFSET_SECS),
            });
        }

        if self.translation.batch_size == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "translation.batch_size",
                reason: "must be at least 1".to_string(),
            });
        }

        let delta = self.time_tracking.min_time_delta_secs;
        if !delta.is_finite() || delta < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "time_tracking.min_time_delta_secs",
                reason: "must be a non-negative number".to_string(),
            });
        }

        if self.time_tracking.progress_poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "time_tracking.progress_poll_interval_ms",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Parse a configuration document, filling unspecified keys with defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            original_language: default_original_language(),
            target_language: default_target_language(),
            time_offset: 0.0,
            subtitles_enabled: true,
            use_native_subtitles: true,
            ui_locale: default_ui_locale(),
            translation: TranslationConfig::default(),
            time_tracking: TimeTrackingConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

/// Read access to the current settings.
///
/// Components take a fresh snapshot whenever they need a value so that
/// settings changes apply from the next tick or scheduler run.
pub trait ConfigSource: Send + Sync {
    fn snapshot(&self) -> Config;
}

impl ConfigSource for Config {
    fn snapshot(&self) -> Config {
        self.clone()
    }
}

/// Settings shared between the controller and its components, with change
/// notification.
#[derive(Clone)]
pub struct SharedConfig {
    sender: Arc<watch::Sender<Config>>,
}

impl SharedConfig {
    pub fn new(config: Config) -> Self {
        let (sender, _) = watch::channel(config);
        Self { sender: Arc::new(sender) }
    }

    /// Apply a change; subscribers are notified only when a value actually changed
    pub fn update<F>(&self, change: F) -> Result<(), ConfigError>
    where
        F: FnOnce(&mut Config),
    {
        let mut candidate = self.sender.borrow().clone();
        change(&mut candidate);
        candidate.validate()?;
        self.sender.send_if_modified(|current| {
            if *current == candidate {
                false
            } else {
                *current = candidate;
                true
            }
        });
        Ok(())
    }

    /// Receiver that wakes on every effective change
    pub fn subscribe(&self) -> watch::Receiver<Config> {
        self.sender.subscribe()
    }
}

impl ConfigSource for SharedConfig {
    fn snapshot(&self) -> Config {
        self.sender.borrow().clone()
    }
}
