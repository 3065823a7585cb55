//! Inline bold splitter: one paragraph's raw text → ordered plain/bold spans.
//!
//! The explanation dialect supports exactly one inline style, `**bold**`.
//! Matching is non-greedy and non-overlapping; everything between matches
//! stays plain. An opening `**` with no closing pair never matches and is
//! emitted verbatim — the pattern requires the closing marker, so a dangling
//! marker degrades to literal text instead of swallowing the rest of the
//! paragraph.

use crate::sink::Span;
use once_cell::sync::Lazy;
use regex::Regex;

static BOLD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());

/// Split paragraph text into plain/bold spans.
///
/// Concatenating the spans' text reproduces `text` with the `**` delimiters
/// removed. Zero matches produce a single plain span; empty plain fragments
/// between adjacent matches are skipped.
pub fn bold_spans(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    for caps in BOLD_RE.captures_iter(text) {
        let m = caps.get(0).unwrap();
        if m.start() > cursor {
            spans.push(Span::plain(&text[cursor..m.start()]));
        }
        spans.push(Span::bold(&caps[1]));
        cursor = m.end();
    }

    if cursor < text.len() {
        spans.push(Span::plain(&text[cursor..]));
    }
    if spans.is_empty() {
        spans.push(Span::plain(text));
    }
    spans
}

/// True when `text` still contains a `**` marker after all well-formed
/// pairs are removed — i.e. an opening marker with no close.
pub fn has_dangling_marker(text: &str) -> bool {
    BOLD_RE.replace_all(text, "").contains("**")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concat(spans: &[Span]) -> String {
        spans.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn no_markers_is_one_plain_span() {
        let spans = bold_spans("just some text");
        assert_eq!(spans, vec![Span::plain("just some text")]);
    }

    #[test]
    fn single_bold_in_the_middle() {
        let spans = bold_spans("the **key** field");
        assert_eq!(
            spans,
            vec![
                Span::plain("the "),
                Span::bold("key"),
                Span::plain(" field"),
            ]
        );
    }

    #[test]
    fn leading_bold_emits_no_empty_plain_span() {
        let spans = bold_spans("**IMPORT** statement");
        assert_eq!(spans[0], Span::bold("IMPORT"));
        assert_eq!(spans.len(), 2);
    }

    #[test]
    fn round_trip_strips_only_delimiters() {
        let input = "a **b** c **d** e";
        let spans = bold_spans(input);
        assert_eq!(concat(&spans), "a b c d e");
        assert_eq!(spans.iter().filter(|s| s.bold).count(), 2);
    }

    #[test]
    fn adjacent_bolds_have_no_plain_between() {
        let spans = bold_spans("**a****b**");
        assert_eq!(spans, vec![Span::bold("a"), Span::bold("b")]);
    }

    #[test]
    fn matching_is_non_greedy() {
        let spans = bold_spans("**a** and **b**");
        assert_eq!(spans[0], Span::bold("a"));
        assert_eq!(spans[2], Span::bold("b"));
    }

    #[test]
    fn dangling_marker_stays_literal() {
        let spans = bold_spans("an unclosed **marker here");
        assert_eq!(spans, vec![Span::plain("an unclosed **marker here")]);
        assert!(has_dangling_marker("an unclosed **marker here"));
    }

    #[test]
    fn well_formed_pairs_are_not_dangling() {
        assert!(!has_dangling_marker("all **good** here"));
        assert!(!has_dangling_marker("no markers at all"));
    }

    #[test]
    fn dangling_after_well_formed_pair() {
        let text = "**ok** then **broken";
        let spans = bold_spans(text);
        assert_eq!(concat(&spans), "ok then **broken");
        assert!(has_dangling_marker(text));
    }
}
