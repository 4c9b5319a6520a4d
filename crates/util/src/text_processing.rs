//! # Text Processing Utilities
//!
//! URL detection for raw response bodies and width-aware truncation for
//! table cells.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_width::UnicodeWidthChar;

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:https?|ftp|file)://[-A-Z0-9+&@#/%?=~_|!:,.;]*[-A-Z0-9+&@#/%=~_|]")
        .expect("URL pattern is a valid regex")
});

/// Byte ranges of every URL found in `text`, in order.
///
/// # Example
/// ```rust
/// use senpy_util::text_processing::url_spans;
///
/// let text = "see <http://www.gsi.upm.es/ontologies/marl/ns#Positive> .";
/// let spans = url_spans(text);
/// assert_eq!(&text[spans[0].clone()], "http://www.gsi.upm.es/ontologies/marl/ns#Positive");
/// ```
pub fn url_spans(text: &str) -> Vec<Range<usize>> {
    URL_PATTERN.find_iter(text).map(|found| found.range()).collect()
}

/// Split `text` into alternating plain/URL segments. The flag is `true` for
/// URL segments. Concatenating the segments reproduces `text`.
pub fn split_urls(text: &str) -> Vec<(&str, bool)> {
    let mut segments = Vec::new();
    let mut cursor = 0;
    for span in url_spans(text) {
        if span.start > cursor {
            segments.push((&text[cursor..span.start], false));
        }
        segments.push((&text[span.clone()], true));
        cursor = span.end;
    }
    if cursor < text.len() {
        segments.push((&text[cursor..], false));
    }
    segments
}

/// Cut `text` to at most `max_width` terminal columns, appending `…` when
/// anything was removed.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    let total: usize = text.chars().map(|ch| ch.width().unwrap_or(0)).sum();
    if total <= max_width {
        return text.to_string();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let width = ch.width().unwrap_or(0);
        if used + width + 1 > max_width {
            break;
        }
        out.push(ch);
        used += width;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_urls_round_trips_text() {
        let text = "plugin docs at https://github.com/gsi-upm/senpy and http://senpy.gsi.upm.es, enjoy";
        let segments = split_urls(text);
        let rebuilt: String = segments.iter().map(|(segment, _)| *segment).collect();
        assert_eq!(rebuilt, text);

        let urls: Vec<&str> = segments.iter().filter(|(_, is_url)| *is_url).map(|(s, _)| *s).collect();
        assert_eq!(urls, vec!["https://github.com/gsi-upm/senpy", "http://senpy.gsi.upm.es"]);
    }

    #[test]
    fn text_without_urls_is_one_plain_segment() {
        assert_eq!(split_urls("no links here"), vec![("no links here", false)]);
        assert!(split_urls("").is_empty());
    }

    #[test]
    fn truncate_respects_wide_characters() {
        assert_eq!(truncate_to_width("sentiment140", 20), "sentiment140");
        assert_eq!(truncate_to_width("sentiment140", 6), "senti…");
        assert_eq!(truncate_to_width("感情分析", 5), "感情…");
        assert_eq!(truncate_to_width("abc", 0), "");
    }
}
