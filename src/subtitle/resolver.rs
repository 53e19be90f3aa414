/*!
 * Cue selection for rendering.
 *
 * Given a playback time, picks the original/translated text pair to show.
 * In dual native-track mode the two sides come from independently timed
 * tracks, so the translated side is paired with the original by time
 * overlap rather than by position or identity.
 */

use serde::Serialize;

use super::cue::{Cue, CueRole};
use super::store::CueStore;

/// Text to display for one tick. Empty strings mean "clear this side".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedCues {
    pub original_text: String,
    pub translated_text: String,
    pub use_native_target: bool,
}

impl ResolvedCues {
    /// Nothing to show on either side
    pub fn is_empty(&self) -> bool {
        self.original_text.is_empty() && self.translated_text.is_empty()
    }
}

/// Read-only view over a cue store that resolves what to render
pub struct CueResolver<'a> {
    store: &'a CueStore,
}

impl<'a> CueResolver<'a> {
    pub fn new(store: &'a CueStore) -> Self {
        Self { store }
    }

    /// Resolve the cue pair active at `raw_time + time_offset`
    pub fn resolve(&self, video_id: &str, raw_time: f64, time_offset: f64) -> ResolvedCues {
        let adjusted_time = raw_time + time_offset;
        let active = self.store.find_active_cues(video_id, adjusted_time);

        match active.first() {
            None => ResolvedCues::default(),
            Some(_) if active.iter().any(|cue| cue.use_native_target) => resolve_dual_track(&active),
            Some(first) => ResolvedCues {
                original_text: first.original.clone().unwrap_or_default(),
                translated_text: first.translated_text().unwrap_or_default().to_string(),
                use_native_target: false,
            },
        }
    }
}

fn resolve_dual_track(active: &[&Cue]) -> ResolvedCues {
    let original_cue = active
        .iter()
        .copied()
        .find(|cue| cue.cue_role == Some(CueRole::Original))
        .or_else(|| {
            active
                .iter()
                .copied()
                .find(|cue| cue.original.is_some() && !cue.has_translated())
        });

    let is_original = |cue: &Cue| original_cue.is_some_and(|original| std::ptr::eq(original, cue));

    let tagged_targets: Vec<&Cue> = active
        .iter()
        .copied()
        .filter(|cue| cue.cue_role == Some(CueRole::Target) && cue.has_translated())
        .collect();
    let candidates: Vec<&Cue> = if tagged_targets.is_empty() {
        active
            .iter()
            .copied()
            .filter(|cue| cue.has_translated() && !is_original(*cue))
            .collect()
    } else {
        tagged_targets
    };

    let target_cue = match original_cue {
        Some(original) => best_overlap(original, &candidates),
        None => candidates.first().copied(),
    };

    ResolvedCues {
        original_text: original_cue
            .and_then(|cue| cue.original.clone())
            .unwrap_or_default(),
        translated_text: target_cue
            .and_then(|cue| cue.translated_text())
            .unwrap_or_default()
            .to_string(),
        use_native_target: true,
    }
}

/// Candidate with the largest temporal overlap; the first one wins ties
fn best_overlap<'c>(original: &Cue, candidates: &[&'c Cue]) -> Option<&'c Cue> {
    let mut best: Option<(&'c Cue, f64)> = None;
    for &candidate in candidates {
        let overlap = original.overlap_with(candidate);
        match best {
            Some((_, best_score)) if overlap <= best_score => {}
            _ => best = Some((candidate, overlap)),
        }
    }
    best.map(|(cue, _)| cue)
}
