/*!
 * In-memory cue queue.
 *
 * Holds the cues of every known video in one flat list; all queries are
 * scoped by video id. Overlapping cues are legitimate (dual tracks) and
 * are returned as-is for the resolver to sort out.
 */

use log::debug;
use std::cmp::Ordering;

use super::cue::{Cue, CueKey, TranslationState};

/// Unordered multiset of cues partitioned by video id
#[derive(Debug, Default, Clone)]
pub struct CueStore {
    cues: Vec<Cue>,
}

impl CueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append cues without touching existing ones
    pub fn append(&mut self, cues: impl IntoIterator<Item = Cue>) {
        self.cues.extend(cues);
    }

    /// Drop every cue of `video_id`, then append `cues`
    pub fn replace_for_video(&mut self, video_id: &str, cues: impl IntoIterator<Item = Cue>) {
        let removed = self.prune_video(video_id);
        let before = self.cues.len();
        self.cues.extend(cues);
        debug!(
            "Replaced cues for video {}: removed {}, added {}",
            video_id,
            removed,
            self.cues.len() - before
        );
    }

    /// Remove every cue of a video, returning how many were removed
    pub fn prune_video(&mut self, video_id: &str) -> usize {
        let before = self.cues.len();
        self.cues.retain(|cue| cue.video_id != video_id);
        before - self.cues.len()
    }

    /// Keep only the cues of `video_id`
    pub fn retain_only(&mut self, video_id: Option<&str>) -> usize {
        let before = self.cues.len();
        self.cues.retain(|cue| Some(cue.video_id.as_str()) == video_id);
        before - self.cues.len()
    }

    /// Every cue of the video whose range contains `time`
    pub fn find_active_cues(&self, video_id: &str, time: f64) -> Vec<&Cue> {
        self.cues
            .iter()
            .filter(|cue| cue.video_id == video_id && cue.is_active_at(time))
            .collect()
    }

    /// Cues still waiting for translation that have not fully elapsed at `time`,
    /// earliest first, at most `limit`
    pub fn find_untranslated(&self, video_id: &str, time: f64, limit: usize) -> Vec<Cue> {
        let mut pending: Vec<&Cue> = self
            .cues
            .iter()
            .filter(|cue| cue.video_id == video_id && cue.needs_translation() && cue.end >= time)
            .collect();
        pending.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap_or(Ordering::Equal));
        pending.into_iter().take(limit).cloned().collect()
    }

    /// Whether any cue of the video still waits for translation at `time`
    pub fn has_untranslated(&self, video_id: &str, time: f64) -> bool {
        self.cues
            .iter()
            .any(|cue| cue.video_id == video_id && cue.needs_translation() && cue.end >= time)
    }

    /// Write a translation outcome into the cue identified by `key`.
    ///
    /// Only a cue that is still pending is updated; returns whether a write happened.
    pub fn apply_translation(&mut self, key: &CueKey, state: TranslationState) -> bool {
        match self
            .cues
            .iter_mut()
            .find(|cue| key.matches(cue) && cue.translation.is_pending())
        {
            Some(cue) => {
                cue.translation = state;
                true
            }
            None => false,
        }
    }

    /// Return failed cues of a video to `Pending`, returning how many were reset
    pub fn reset_failed(&mut self, video_id: &str) -> usize {
        let mut reset = 0;
        for cue in self
            .cues
            .iter_mut()
            .filter(|cue| cue.video_id == video_id && cue.translation.is_failed())
        {
            cue.translation = TranslationState::Pending;
            reset += 1;
        }
        reset
    }

    /// All cues of a video in storage order
    pub fn cues_for_video<'a>(&'a self, video_id: &'a str) -> impl Iterator<Item = &'a Cue> + 'a {
        self.cues.iter().filter(move |cue| cue.video_id == video_id)
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }
}
