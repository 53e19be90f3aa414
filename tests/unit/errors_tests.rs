/*!
 * Tests for error classification and conversion
 */

use dualsub::errors::{ConfigError, ProviderError, SubtitleError, TranslationErrorKind};
use dualsub::translation::localized_placeholder;

#[test]
fn test_providerErrorKind_shouldMapToPlaceholderCategories() {
    let cases = [
        (ProviderError::Timeout("10s".into()), TranslationErrorKind::Request),
        (
            ProviderError::ApiError {
                status_code: 503,
                message: "unavailable".into(),
            },
            TranslationErrorKind::Api,
        ),
        (ProviderError::RateLimitExceeded("slow down".into()), TranslationErrorKind::Api),
        (ProviderError::EmptyResponse, TranslationErrorKind::MalformedResponse),
    ];

    for (error, kind) in cases {
        assert_eq!(error.kind(), kind, "{}", error);
    }
}

#[test]
fn test_localizedPlaceholder_withUnknownLocale_shouldFallBackToEnglish() {
    assert_eq!(
        localized_placeholder(TranslationErrorKind::Request, "xx"),
        "[Translation request failed]"
    );
    assert_eq!(
        localized_placeholder(TranslationErrorKind::MalformedResponse, "en-GB"),
        "[Invalid translation response]"
    );
}

#[test]
fn test_localizedPlaceholder_withRegionalLocale_shouldUseBaseLanguage() {
    assert_eq!(
        localized_placeholder(TranslationErrorKind::Request, "es-MX"),
        "[Error en la solicitud de traducción]"
    );
}

#[test]
fn test_componentErrors_shouldDescribeTheFailure() {
    assert_eq!(
        SubtitleError::NoCues("v1".into()).to_string(),
        "No usable cues in subtitle track for video v1"
    );
    assert_eq!(
        ConfigError::InvalidLanguage("xx".into()).to_string(),
        "Invalid language code: xx"
    );
}
