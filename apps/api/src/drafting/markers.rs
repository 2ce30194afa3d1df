//! Delimiter grammar shared by every drafting step.
//!
//! Two tiny wire formats live here:
//!
//! ```text
//! boundary-line  = "--- " label " ---"
//! motivation     = ... "[TRENDS_START]" trends "[TRENDS_END]" ...
//!                  ... "[DRAFT_START]"  draft  "[DRAFT_END]"  ...
//! ```
//!
//! Tokens are matched literally and case-sensitively. There is no fuzzy
//! matching: a misspelled token counts as absent.

pub const TRENDS_START: &str = "[TRENDS_START]";
pub const TRENDS_END: &str = "[TRENDS_END]";
pub const DRAFT_START: &str = "[DRAFT_START]";
pub const DRAFT_END: &str = "[DRAFT_END]";

const BOUNDARY_OPEN: &str = "--- ";
const BOUNDARY_CLOSE: &str = " ---";
const RULE_TOKEN: &str = "---";

/// Formats the boundary line that precedes a section body.
pub fn boundary_line(label: &str) -> String {
    format!("{BOUNDARY_OPEN}{label}{BOUNDARY_CLOSE}")
}

/// Returns the label when `line` has the exact boundary-line shape.
/// Surrounding whitespace on the line itself is tolerated.
pub fn parse_boundary_line(line: &str) -> Option<&str> {
    let label = line
        .trim()
        .strip_prefix(BOUNDARY_OPEN)?
        .strip_suffix(BOUNDARY_CLOSE)?;
    if label.trim().is_empty() {
        None
    } else {
        Some(label)
    }
}

/// Loose rule used when cleaning text for export: any line that starts and
/// ends with `---`, in any language.
pub fn is_rule_line(line: &str) -> bool {
    let line = line.trim();
    line.starts_with(RULE_TOKEN) && line.ends_with(RULE_TOKEN)
}

/// Drops boundary-shaped lines from a section body; they are reserved
/// structural tokens and would corrupt re-partitioning of the draft.
pub fn strip_boundary_lines(body: &str) -> String {
    body.lines()
        .filter(|line| parse_boundary_line(line).is_none())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Result of parsing a Motivation reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotivationReply {
    pub body: String,
    pub trend_note: Option<String>,
}

/// Splits a Motivation reply into its draft body and research note.
///
/// Both region pairs must be complete; otherwise the whole reply (trimmed)
/// becomes the body and no trend note is produced. Never fails.
pub fn parse_motivation(raw: &str) -> MotivationReply {
    match (
        region(raw, TRENDS_START, TRENDS_END),
        region(raw, DRAFT_START, DRAFT_END),
    ) {
        (Some(trends), Some(draft)) => MotivationReply {
            body: draft.trim().to_string(),
            trend_note: Some(trends.trim().to_string()),
        },
        _ => MotivationReply {
            body: raw.trim().to_string(),
            trend_note: None,
        },
    }
}

/// Text between the first `start` token and the first `end` token after it.
fn region<'a>(text: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let from = text.find(start)? + start.len();
    let len = text[from..].find(end)?;
    Some(&text[from..from + len])
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = "Here you go.\n[TRENDS_START]\n<div>Option 1: Edge AI</div>\n[TRENDS_END]\n[DRAFT_START]\n  我一直对医疗数据分析充满兴趣。\n[DRAFT_END]\nThanks!";

    #[test]
    fn test_boundary_line_shape() {
        assert_eq!(boundary_line("Motivation"), "--- Motivation ---");
        assert_eq!(parse_boundary_line("--- 申请动机 ---"), Some("申请动机"));
        assert_eq!(parse_boundary_line("  --- Why School ---\r"), Some("Why School"));
    }

    #[test]
    fn test_non_boundary_lines() {
        assert_eq!(parse_boundary_line("---"), None);
        assert_eq!(parse_boundary_line("---  ---"), None);
        assert_eq!(parse_boundary_line("--Motivation--"), None);
        assert_eq!(parse_boundary_line("---Motivation---"), None);
        assert_eq!(parse_boundary_line("--- Motivation"), None);
    }

    #[test]
    fn test_rule_line_is_looser_than_boundary_line() {
        assert!(is_rule_line("---"));
        assert!(is_rule_line("---Motivation---"));
        assert!(is_rule_line("  --- 职业规划 ---  "));
        assert!(!is_rule_line("--- dangling"));
        assert!(!is_rule_line("A sentence --- with dashes."));
    }

    #[test]
    fn test_strip_boundary_lines_keeps_other_text() {
        let body = "First line\n--- Academic Background ---\nSecond line\n\nThird";
        assert_eq!(strip_boundary_lines(body), "First line\nSecond line\n\nThird");
    }

    #[test]
    fn test_motivation_well_formed_extracts_regions() {
        let reply = parse_motivation(WELL_FORMED);
        assert_eq!(reply.body, "我一直对医疗数据分析充满兴趣。");
        assert_eq!(
            reply.trend_note.as_deref(),
            Some("<div>Option 1: Edge AI</div>")
        );
        assert!(!reply.body.contains("[DRAFT"));
    }

    #[test]
    fn test_motivation_without_tokens_falls_back_to_trimmed_raw() {
        let raw = "\n  A plain paragraph with no markers.  \n";
        let reply = parse_motivation(raw);
        assert_eq!(reply.body, "A plain paragraph with no markers.");
        assert_eq!(reply.trend_note, None);
    }

    #[test]
    fn test_motivation_partial_tokens_fall_back() {
        let raw = "[TRENDS_START] trends only [TRENDS_END] then prose";
        let reply = parse_motivation(raw);
        assert_eq!(reply.body, raw);
        assert_eq!(reply.trend_note, None);

        let unterminated = "[TRENDS_START] a [TRENDS_END] [DRAFT_START] never closed";
        assert_eq!(parse_motivation(unterminated).body, unterminated);
    }

    #[test]
    fn test_motivation_tokens_are_case_sensitive() {
        let raw = "[trends_start]a[trends_end][draft_start]b[draft_end]";
        let reply = parse_motivation(raw);
        assert_eq!(reply.body, raw);
        assert!(reply.trend_note.is_none());
    }
}
