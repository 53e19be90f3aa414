use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt::Write;

// @module: WebVTT parsing and serialization

// @const: Blank line between cue blocks (whitespace-only lines count as blank)
static BLOCK_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]*\n").unwrap());

// @const: Line break tags in all their spellings
static BREAK_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<\s*br\s*/?\s*>").unwrap());

// @const: Any other markup tag (<i>, </c.yellow>, <00:01.000>, ...)
static MARKUP_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

// @const: Runs of whitespace
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// A cue as it appears in a WebVTT document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VttCue {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Plain text with markup removed
    pub text: String,
}

/// Parse a WebVTT timestamp into seconds.
///
/// Accepts `HH:MM:SS.mmm`, `MM:SS.mmm` and bare seconds, with either `.` or
/// `,` as decimal separator. Anything unparseable yields `0.0`.
pub fn parse_timestamp(timestamp: &str) -> f64 {
    let normalized = timestamp.trim().replace(',', ".");
    let parts: Vec<&str> = normalized.split(':').collect();
    if parts.len() > 3 || parts.iter().any(|p| p.is_empty()) {
        return 0.0;
    }

    let mut seconds = 0.0;
    for part in &parts {
        match part.parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 => seconds = seconds * 60.0 + value,
            _ => return 0.0,
        }
    }
    seconds
}

/// Format seconds as `HH:MM:SS.mmm`
pub fn format_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1_000;
    let millis = total_ms % 1_000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
}

/// Reduce cue payload lines to display text
fn clean_text(lines: &[&str]) -> String {
    let joined = lines.join(" ");
    let without_breaks = BREAK_TAG.replace_all(&joined, " ");
    let without_tags = MARKUP_TAG.replace_all(&without_breaks, "");
    let decoded = decode_entities(&without_tags);
    WHITESPACE_RUN.replace_all(&decoded, " ").trim().to_string()
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&lrm;", "")
        .replace("&rlm;", "")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Parse one blank-line-delimited block, `None` when it is not a usable cue
fn parse_block(block: &str) -> Option<VttCue> {
    let lines: Vec<&str> = block.lines().collect();
    // An optional identifier line may precede the timing line
    let timing_index = lines.iter().position(|line| line.contains("-->"))?;
    let (start_part, end_part) = lines[timing_index].split_once("-->")?;

    let start = parse_timestamp(start_part);
    // Cue settings (position:10% align:start) follow the end time
    let end = parse_timestamp(end_part.split_whitespace().next().unwrap_or_default());

    if end < start {
        debug!("Skipping cue with end {} before start {}", end, start);
        return None;
    }

    let text = clean_text(&lines[timing_index + 1..]);
    if text.is_empty() {
        return None;
    }

    Some(VttCue { start, end, text })
}

/// Parse a WebVTT document into cues in document order.
///
/// Returns an empty list when the document does not start with `WEBVTT`.
/// Malformed blocks are skipped; the output is not sorted by time.
pub fn parse(vtt_text: &str) -> Vec<VttCue> {
    let trimmed = vtt_text.trim_start_matches('\u{feff}').trim();
    let has_header = trimmed
        .get(..6)
        .is_some_and(|head| head.eq_ignore_ascii_case("WEBVTT"));
    if !has_header {
        debug!("Input is not a WEBVTT document");
        return Vec::new();
    }

    let normalized = trimmed.replace("\r\n", "\n").replace('\r', "\n");
    let cues: Vec<VttCue> = BLOCK_SEPARATOR
        .split(&normalized)
        .filter_map(parse_block)
        .collect();

    debug!("Parsed {} cues from WEBVTT document", cues.len());
    cues
}

// `&` first so the other escapes are not escaped twice
fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Serialize cues as a minimal WEBVTT document
pub fn format_vtt(cues: &[VttCue]) -> String {
    let mut output = String::from("WEBVTT\n\n");
    for (index, cue) in cues.iter().enumerate() {
        let _ = writeln!(output, "{}", index + 1);
        let _ = writeln!(
            output,
            "{} --> {}",
            format_timestamp(cue.start),
            format_timestamp(cue.end)
        );
        let _ = writeln!(output, "{}", escape_text(&cue.text));
        output.push('\n');
    }
    output
}
