use isolang::Language;

use crate::errors::ConfigError;

/// Language utilities for the language tags streaming platforms and
/// translation providers exchange.
///
/// Tags are a primary ISO 639-1 or ISO 639-2 code optionally followed by a
/// region or script subtag (`en`, `fre`, `pt-BR`, `zh_Hans`). The special tag
/// `auto` asks the provider to detect the source language.
pub const AUTO_DETECT: &str = "auto";

/// Whether a tag asks for source language auto-detection
pub fn is_auto(code: &str) -> bool {
    code.trim().eq_ignore_ascii_case(AUTO_DETECT)
}

/// Split a tag into its lowercase primary subtag and optional secondary subtag
fn split_tag(code: &str) -> (String, Option<String>) {
    let trimmed = code.trim();
    let mut parts = trimmed.splitn(2, ['-', '_']);
    let primary = parts.next().unwrap_or_default().to_lowercase();
    let secondary = parts.next().map(str::to_string).filter(|s| !s.is_empty());
    (primary, secondary)
}

/// Map ISO 639-2/B codes to their ISO 639-2/T equivalent
fn bibliographic_to_terminology(code: &str) -> &str {
    match code {
        "fre" => "fra",
        "ger" => "deu",
        "dut" => "nld",
        "gre" => "ell",
        "chi" => "zho",
        "cze" => "ces",
        "ice" => "isl",
        "alb" => "sqi",
        "arm" => "hye",
        "baq" => "eus",
        "bur" => "mya",
        "per" => "fas",
        "geo" => "kat",
        "may" => "msa",
        "mac" => "mkd",
        "rum" => "ron",
        "slo" => "slk",
        "wel" => "cym",
        other => other,
    }
}

fn lookup(primary: &str) -> Option<Language> {
    match primary.len() {
        2 => Language::from_639_1(primary),
        3 => Language::from_639_3(bibliographic_to_terminology(primary)),
        _ => None,
    }
}

/// Validate a language tag. `auto` is accepted only when `allow_auto` is set.
pub fn validate_language_code(code: &str, allow_auto: bool) -> Result<(), ConfigError> {
    if is_auto(code) {
        return if allow_auto {
            Ok(())
        } else {
            Err(ConfigError::InvalidLanguage(code.to_string()))
        };
    }

    let (primary, secondary) = split_tag(code);
    if lookup(&primary).is_none() {
        return Err(ConfigError::InvalidLanguage(code.to_string()));
    }

    // Region (BR, 419) or script (Hans) subtags
    if let Some(sub) = secondary {
        let valid = (2..=4).contains(&sub.len()) && sub.chars().all(|c| c.is_ascii_alphanumeric());
        if !valid {
            return Err(ConfigError::InvalidLanguage(code.to_string()));
        }
    }

    Ok(())
}

/// Lowercase primary subtag in ISO 639-1 form when one exists
pub fn primary_subtag(code: &str) -> String {
    let (primary, _) = split_tag(code);
    match lookup(&primary).and_then(|lang| lang.to_639_1()) {
        Some(part1) => part1.to_string(),
        None => primary,
    }
}

/// Normalize a tag to the `xx` / `xx-YY` / `xx-Script` shape providers expect.
///
/// Unknown tags are returned trimmed but otherwise untouched so a provider can
/// still decide what to do with them.
pub fn normalize_tag(code: &str) -> String {
    if is_auto(code) {
        return AUTO_DETECT.to_string();
    }

    let (primary, secondary) = split_tag(code);
    if lookup(&primary).is_none() {
        return code.trim().to_string();
    }

    let primary = primary_subtag(&primary);
    match secondary {
        Some(sub) if sub.len() == 4 => {
            let mut chars = sub.chars();
            let script: String = chars
                .next()
                .map(|c| c.to_ascii_uppercase())
                .into_iter()
                .chain(chars.map(|c| c.to_ascii_lowercase()))
                .collect();
            format!("{}-{}", primary, script)
        }
        Some(sub) => format!("{}-{}", primary, sub.to_uppercase()),
        None => primary,
    }
}

/// Check if two tags name the same language, ignoring region and script
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    if is_auto(code1) || is_auto(code2) {
        return false;
    }
    let (primary1, _) = split_tag(code1);
    let (primary2, _) = split_tag(code2);
    match (lookup(&primary1), lookup(&primary2)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// English name of the language a tag refers to
pub fn get_language_name(code: &str) -> Option<String> {
    if is_auto(code) {
        return Some("Auto-detect".to_string());
    }
    let (primary, _) = split_tag(code);
    lookup(&primary).map(|lang| lang.to_name().to_string())
}
