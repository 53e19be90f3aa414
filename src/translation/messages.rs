/*!
 * Localized placeholders written into cues whose translation failed.
 */

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::errors::TranslationErrorKind;
use crate::language_utils::{normalize_tag, primary_subtag};

/// Placeholder texts for one UI locale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorMessages {
    pub request_failed: &'static str,
    pub service_error: &'static str,
    pub malformed_response: &'static str,
}

const ENGLISH: ErrorMessages = ErrorMessages {
    request_failed: "[Translation request failed]",
    service_error: "[Translation service error]",
    malformed_response: "[Invalid translation response]",
};

static CATALOG: Lazy<HashMap<&'static str, ErrorMessages>> = Lazy::new(|| {
    HashMap::from([
        ("en", ENGLISH),
        (
            "es",
            ErrorMessages {
                request_failed: "[Error en la solicitud de traducción]",
                service_error: "[Error del servicio de traducción]",
                malformed_response: "[Respuesta de traducción no válida]",
            },
        ),
        (
            "fr",
            ErrorMessages {
                request_failed: "[Échec de la demande de traduction]",
                service_error: "[Erreur du service de traduction]",
                malformed_response: "[Réponse de traduction invalide]",
            },
        ),
        (
            "de",
            ErrorMessages {
                request_failed: "[Übersetzungsanfrage fehlgeschlagen]",
                service_error: "[Fehler des Übersetzungsdienstes]",
                malformed_response: "[Ungültige Übersetzungsantwort]",
            },
        ),
        (
            "ja",
            ErrorMessages {
                request_failed: "[翻訳リクエストに失敗しました]",
                service_error: "[翻訳サービスエラー]",
                malformed_response: "[無効な翻訳レスポンス]",
            },
        ),
        (
            "zh-CN",
            ErrorMessages {
                request_failed: "[翻译请求失败]",
                service_error: "[翻译服务错误]",
                malformed_response: "[翻译响应无效]",
            },
        ),
    ])
});

impl ErrorMessages {
    /// Messages for a UI locale: exact tag, then base language, then English.
    ///
    /// A bare `zh` resolves to simplified Chinese.
    pub fn for_locale(locale: &str) -> &'static ErrorMessages {
        let normalized = normalize_tag(locale);
        if let Some(messages) = CATALOG.get(normalized.as_str()) {
            return messages;
        }

        let base = primary_subtag(&normalized);
        let base = if base == "zh" { "zh-CN".to_string() } else { base };
        CATALOG.get(base.as_str()).unwrap_or(&ENGLISH)
    }

    pub fn placeholder(&self, kind: TranslationErrorKind) -> &'static str {
        match kind {
            TranslationErrorKind::Request => self.request_failed,
            TranslationErrorKind::Api => self.service_error,
            TranslationErrorKind::MalformedResponse => self.malformed_response,
        }
    }
}

/// Bracketed placeholder for a failure kind in the given UI locale
pub fn localized_placeholder(kind: TranslationErrorKind, locale: &str) -> String {
    ErrorMessages::for_locale(locale).placeholder(kind).to_string()
}
