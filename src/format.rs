//! Markdown-lite formatting of bot replies.
//!
//! This is a fixed chain of regex substitutions, not a markdown parser. Each
//! rule runs on the output of the previous one, so the order below is part of
//! the behavior. Applying it twice does not give the same result.

use std::sync::LazyLock;

use regex::Regex;

struct Rule {
    pattern: LazyLock<Regex>,
    replacement: &'static str,
}

macro_rules! rule {
    ($pattern:literal, $replacement:literal) => {
        Rule {
            pattern: LazyLock::new(|| Regex::new($pattern).expect("static pattern")),
            replacement: $replacement,
        }
    };
}

// Runs stop at \r, \n, U+2028 and U+2029. Digits are ASCII only.
static RULES: [Rule; 6] = [
    rule!(r"\*\*([^\r\n\x{2028}\x{2029}]*?)\*\*", "<strong>${1}</strong>"),
    rule!(r"\*([^\r\n\x{2028}\x{2029}]*?)\*", "<em>${1}</em>"),
    rule!(r"([0-9]+\.\s+[^\r\n\x{2028}\x{2029}]*)", "<p>${1}</p>"),
    rule!(r"- ([^\r\n\x{2028}\x{2029}]*)", "<li>${1}</li>"),
    rule!(r"(Confidence: [0-9]+%)", r#"<span class="confidence">${1}</span>"#),
    rule!(r"\n", "<br>"),
];

/// Turn a plain-text bot reply into the markup shown in the chat log.
#[must_use]
pub fn format_bot_response(text: &str) -> String {
    RULES.iter().fold(text.to_owned(), |acc, rule| {
        rule.pattern
            .replace_all(&acc, rule.replacement)
            .into_owned()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_and_italic() {
        assert_eq!(
            format_bot_response("**hi** and *bye*"),
            "<strong>hi</strong> and <em>bye</em>"
        );
    }

    #[test]
    fn test_confidence_highlight() {
        assert_eq!(
            format_bot_response("Confidence: 92%"),
            r#"<span class="confidence">Confidence: 92%</span>"#
        );
    }

    #[test]
    fn test_numbered_line() {
        assert_eq!(format_bot_response("1. Buy AAPL"), "<p>1. Buy AAPL</p>");
    }

    #[test]
    fn test_bullets_and_newlines() {
        assert_eq!(
            format_bot_response("Levels:\n- 100\n- 120"),
            "Levels:<br><li>100</li><br><li>120</li>"
        );
    }

    #[test]
    fn test_rules_apply_in_order() {
        // The numbered rule wraps the already-formatted bold markup.
        assert_eq!(
            format_bot_response("2. **Entry** at 50"),
            "<p>2. <strong>Entry</strong> at 50</p>"
        );
        // The bullet rule sees the confidence text before it is highlighted.
        assert_eq!(
            format_bot_response("- Confidence: 80%"),
            r#"<li><span class="confidence">Confidence: 80%</span></li>"#
        );
    }

    #[test]
    fn test_not_idempotent() {
        let once = format_bot_response("a\nb");
        assert_eq!(once, "a<br>b");
        assert_eq!(format_bot_response(&once), once);
        let confidence = format_bot_response("Confidence: 92%");
        assert_eq!(
            format_bot_response(&confidence),
            r#"<span class="confidence"><span class="confidence">Confidence: 92%</span></span>"#
        );
    }

    #[test]
    fn test_carriage_return_ends_a_line() {
        assert_eq!(format_bot_response("- a\r\nb"), "<li>a</li>\r<br>b");
        assert_eq!(format_bot_response("*a\u{2028}b*"), "*a\u{2028}b*");
    }

    #[test]
    fn test_only_ascii_digits_number_a_line() {
        assert_eq!(format_bot_response("\u{0661}. x"), "\u{0661}. x");
        assert_eq!(
            format_bot_response("Confidence: \u{0667}0%"),
            "Confidence: \u{0667}0%"
        );
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(format_bot_response("hold steady"), "hold steady");
    }
}
