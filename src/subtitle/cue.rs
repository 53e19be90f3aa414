use serde::Serialize;

use crate::errors::TranslationErrorKind;

// @module: Timed subtitle cues

/// Which track a dual-track cue came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CueRole {
    /// Cue from the original-language track
    Original,
    /// Cue from the platform's target-language track
    Target,
}

/// Translation progress of a single cue
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TranslationState {
    /// Waiting for the scheduler
    Pending,
    /// Translated text, or text from a native target track
    Translated { text: String },
    /// Terminal failure; `message` is the localized placeholder shown instead
    Failed { kind: TranslationErrorKind, message: String },
}

impl TranslationState {
    pub fn translated(text: impl Into<String>) -> Self {
        Self::Translated { text: text.into() }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// A timed subtitle segment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cue {
    // @field: Start time in seconds
    pub start: f64,

    // @field: End time in seconds, inclusive
    pub end: f64,

    // @field: Original-language text
    pub original: Option<String>,

    // @field: Translation state
    pub translation: TranslationState,

    // @field: Video this cue belongs to
    pub video_id: String,

    // @field: Track role in dual-track mode, unset for translation-pipeline cues
    pub cue_role: Option<CueRole>,

    // @field: Translated side comes from a native track rather than a provider
    pub use_native_target: bool,
}

impl Cue {
    /// Translation-pipeline cue waiting to be translated
    pub fn pending(video_id: &str, start: f64, end: f64, original: impl Into<String>) -> Self {
        Self::ordered(Cue {
            start,
            end,
            original: Some(original.into()),
            translation: TranslationState::Pending,
            video_id: video_id.to_string(),
            cue_role: None,
            use_native_target: false,
        })
    }

    /// Original-track cue in dual native-track mode
    pub fn native_original(video_id: &str, start: f64, end: f64, original: impl Into<String>) -> Self {
        Self::ordered(Cue {
            start,
            end,
            original: Some(original.into()),
            translation: TranslationState::Pending,
            video_id: video_id.to_string(),
            cue_role: Some(CueRole::Original),
            use_native_target: true,
        })
    }

    /// Target-track cue in dual native-track mode
    pub fn native_target(video_id: &str, start: f64, end: f64, translated: impl Into<String>) -> Self {
        Self::ordered(Cue {
            start,
            end,
            original: None,
            translation: TranslationState::translated(translated),
            video_id: video_id.to_string(),
            cue_role: Some(CueRole::Target),
            use_native_target: true,
        })
    }

    // Keeps start <= end for callers handing in swapped bounds
    fn ordered(mut cue: Cue) -> Self {
        if cue.end < cue.start {
            std::mem::swap(&mut cue.start, &mut cue.end);
        }
        cue
    }

    /// Whether `time` falls within `[start, end]`
    pub fn is_active_at(&self, time: f64) -> bool {
        self.start <= time && time <= self.end
    }

    /// Length of the intersection of two cue ranges, zero when disjoint
    pub fn overlap_with(&self, other: &Cue) -> f64 {
        (self.end.min(other.end) - self.start.max(other.start)).max(0.0)
    }

    /// Text for the translated side: the translation or the failure placeholder
    pub fn translated_text(&self) -> Option<&str> {
        match &self.translation {
            TranslationState::Pending => None,
            TranslationState::Translated { text } => Some(text),
            TranslationState::Failed { message, .. } => Some(message),
        }
    }

    pub fn has_translated(&self) -> bool {
        self.translated_text().is_some()
    }

    /// Whether the scheduler should pick this cue up
    pub fn needs_translation(&self) -> bool {
        self.original.is_some() && self.translation.is_pending() && !self.use_native_target
    }

    /// Identity used to re-locate the cue after an await
    pub fn key(&self) -> CueKey {
        CueKey {
            video_id: self.video_id.clone(),
            start: self.start,
            original: self.original.clone(),
        }
    }
}

/// `(video, start, original)` triple identifying a cue across suspension points
#[derive(Debug, Clone, PartialEq)]
pub struct CueKey {
    pub video_id: String,
    pub start: f64,
    pub original: Option<String>,
}

impl CueKey {
    pub fn matches(&self, cue: &Cue) -> bool {
        cue.video_id == self.video_id && cue.start == self.start && cue.original == self.original
    }
}
