/*!
 * Tests for language code helpers
 */

use dualsub::language_utils::{
    get_language_name, is_auto, language_codes_match, normalize_tag, primary_subtag,
    validate_language_code,
};

#[test]
fn test_validateLanguageCode_withCommonCodes_shouldAccept() {
    for code in ["en", "fr", "de", "ja", "zh-CN", "pt-BR", "spa"] {
        assert!(validate_language_code(code, false).is_ok(), "{} should be valid", code);
    }
}

#[test]
fn test_validateLanguageCode_withGarbage_shouldReject() {
    for code in ["", "xx", "english", "en-!!"] {
        assert!(validate_language_code(code, true).is_err(), "{} should be invalid", code);
    }
}

#[test]
fn test_isAuto_shouldIgnoreCaseAndWhitespace() {
    assert!(is_auto(" AUTO "));
    assert!(!is_auto("en"));
}

#[test]
fn test_normalizeTag_shouldCanonicalizeCase() {
    assert_eq!(normalize_tag("EN"), "en");
    assert_eq!(normalize_tag("zh_cn"), "zh-CN");
    assert_eq!(normalize_tag("zh-hant"), "zh-Hant");
    assert_eq!(normalize_tag("fra"), "fr");
}

#[test]
fn test_primarySubtag_shouldDropRegion() {
    assert_eq!(primary_subtag("pt-BR"), "pt");
    assert_eq!(primary_subtag("ger"), "de");
}

#[test]
fn test_languageCodesMatch_shouldCompareLanguagesNotRegions() {
    assert!(language_codes_match("en-US", "eng"));
    assert!(language_codes_match("fre", "fr"));
    assert!(!language_codes_match("en", "fr"));
    assert!(!language_codes_match("auto", "en"));
}

#[test]
fn test_getLanguageName_shouldResolveEnglishName() {
    assert_eq!(get_language_name("fr").as_deref(), Some("French"));
    assert_eq!(get_language_name("auto").as_deref(), Some("Auto-detect"));
    assert_eq!(get_language_name("zz"), None);
}
