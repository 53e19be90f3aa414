/*!
 * Tests for the in-session translation cache
 */

use dualsub::translation::TranslationCache;

#[test]
fn test_get_afterStore_shouldHitIgnoringSurroundingWhitespaceAndLanguageCase() {
    let cache = TranslationCache::new(true);
    cache.store("Hello", "en", "fr", "Bonjour");

    assert_eq!(cache.get("  Hello ", "EN", "Fr").as_deref(), Some("Bonjour"));
    assert_eq!(cache.get("Hello", "en", "de"), None);

    let stats = cache.stats();
    assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
    assert_eq!(stats.hit_rate(), 0.5);
}

#[test]
fn test_disabledCache_shouldNeverStoreOrHit() {
    let cache = TranslationCache::new(false);
    cache.store("Hello", "en", "fr", "Bonjour");

    assert!(cache.get("Hello", "en", "fr").is_none());
    assert!(cache.is_empty());
    assert_eq!(cache.stats().misses, 0);
}

#[test]
fn test_clones_shouldShareEntries() {
    let cache = TranslationCache::default();
    let clone = cache.clone();
    clone.store("Yes.", "en", "es", "Sí.");

    assert_eq!(cache.get("Yes.", "en", "es").as_deref(), Some("Sí."));
    assert_eq!(clone.len(), 1);
    assert_eq!(clone.stats().hits, 1);
}
