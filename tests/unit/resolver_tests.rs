/*!
 * Tests for cue resolution
 */

use dualsub::subtitle::{Cue, CueResolver, CueStore, TranslationState};

fn store_with(cues: Vec<Cue>) -> CueStore {
    let mut store = CueStore::new();
    store.append(cues);
    store
}

#[test]
fn test_resolve_withDualTracks_shouldPairOriginalWithOverlappingTarget() {
    let store = store_with(vec![
        Cue::native_original("v1", 10.0, 12.0, "original"),
        Cue::native_target("v1", 9.8, 11.9, "near"),
        Cue::native_target("v1", 15.0, 16.0, "far"),
    ]);

    let resolved = CueResolver::new(&store).resolve("v1", 11.0, 0.0);
    assert_eq!(resolved.original_text, "original");
    assert_eq!(resolved.translated_text, "near");
}

#[test]
fn test_resolve_withUntranslatedCue_shouldReturnBlankTranslation() {
    let store = store_with(vec![Cue::pending("v1", 5.0, 7.0, "Hi")]);

    let resolved = CueResolver::new(&store).resolve("v1", 6.0, 0.0);
    assert_eq!(resolved.original_text, "Hi");
    assert_eq!(resolved.translated_text, "");
}

#[test]
fn test_resolve_withTranslatedCue_shouldReturnBothSides() {
    let mut cue = Cue::pending("v1", 5.0, 7.0, "Hi");
    cue.translation = TranslationState::translated("Salut");
    let store = store_with(vec![cue]);

    let resolved = CueResolver::new(&store).resolve("v1", 5.0, 0.0);
    assert_eq!(
        (resolved.original_text.as_str(), resolved.translated_text.as_str()),
        ("Hi", "Salut")
    );
    assert!(!resolved.use_native_target);
}

#[test]
fn test_resolve_withNegativeOffset_shouldLookEarlier() {
    let store = store_with(vec![Cue::pending("v1", 5.0, 7.0, "Hi")]);
    let resolver = CueResolver::new(&store);

    assert!(resolver.resolve("v1", 8.0, 0.0).is_empty());
    assert_eq!(resolver.resolve("v1", 8.0, -1.5).original_text, "Hi");
}

#[test]
fn test_resolve_forOtherVideo_shouldBeEmpty() {
    let store = store_with(vec![Cue::pending("v1", 5.0, 7.0, "Hi")]);
    assert!(CueResolver::new(&store).resolve("v2", 6.0, 0.0).is_empty());
}

#[test]
fn test_resolve_withEqualOverlaps_shouldKeepFirstTarget() {
    let store = store_with(vec![
        Cue::native_original("v1", 10.0, 12.0, "original"),
        Cue::native_target("v1", 10.0, 11.0, "first"),
        Cue::native_target("v1", 11.0, 12.0, "second"),
    ]);

    let resolved = CueResolver::new(&store).resolve("v1", 11.0, 0.0);
    assert_eq!(resolved.translated_text, "first");
}
