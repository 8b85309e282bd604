use once_cell::sync::Lazy;
use regex::Regex;

use crate::block::Span;

/// Closed marker pairs only; the first alternative that matches wins.
static INLINE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*|\*(.+?)\*|`(.+?)`").unwrap());

/// Split one line of text into styled spans.
///
/// Always returns at least one span. Unterminated markers are left in the
/// surrounding plain text, and concatenating [`Span::raw`] over the result
/// reproduces `text` exactly.
pub fn parse_spans(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut last_end = 0;

    for caps in INLINE_PATTERN.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };

        if whole.start() > last_end {
            spans.push(Span::Plain(text[last_end..whole.start()].to_string()));
        }

        let span = if let Some(bold) = caps.get(1) {
            Span::Bold(bold.as_str().to_string())
        } else if let Some(italic) = caps.get(2) {
            Span::Italic(italic.as_str().to_string())
        } else if let Some(code) = caps.get(3) {
            Span::Code(code.as_str().to_string())
        } else {
            Span::Plain(whole.as_str().to_string())
        };
        spans.push(span);
        last_end = whole.end();
    }

    if last_end < text.len() || spans.is_empty() {
        spans.push(Span::Plain(text[last_end..].to_string()));
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn plain(s: &str) -> Span {
        Span::Plain(s.to_string())
    }

    #[test]
    fn plain_line_is_one_span() {
        assert_eq!(parse_spans("just text"), vec![plain("just text")]);
    }

    #[test]
    fn empty_line_is_one_empty_span() {
        assert_eq!(parse_spans(""), vec![plain("")]);
    }

    #[test]
    fn bold_and_italic() {
        assert_eq!(
            parse_spans("Some **bold** and *italic* text."),
            vec![
                plain("Some "),
                Span::Bold("bold".into()),
                plain(" and "),
                Span::Italic("italic".into()),
                plain(" text."),
            ]
        );
    }

    #[test]
    fn inline_code() {
        assert_eq!(
            parse_spans("run `cargo doc` now"),
            vec![plain("run "), Span::Code("cargo doc".into()), plain(" now")]
        );
    }

    #[test]
    fn markers_at_line_edges() {
        assert_eq!(
            parse_spans("**a***b*"),
            vec![Span::Bold("a".into()), Span::Italic("b".into())]
        );
    }

    #[test]
    fn unterminated_bold_is_literal() {
        assert_eq!(parse_spans("a ** b"), vec![plain("a ** b")]);
    }

    #[test]
    fn unterminated_code_is_literal() {
        assert_eq!(parse_spans("x ` y"), vec![plain("x ` y")]);
    }

    #[test]
    fn markers_do_not_nest() {
        // The bold pair closes at the first `**`, leaving the italic marker inside.
        assert_eq!(
            parse_spans("**a *b* c**"),
            vec![Span::Bold("a *b* c".into())]
        );
        assert_eq!(
            parse_spans("`**not bold**`"),
            vec![Span::Code("**not bold**".into())]
        );
    }

    proptest! {
        #[test]
        fn raw_spans_reconstruct_line(line in "[a-z *`_]{0,40}") {
            let spans = parse_spans(&line);
            prop_assert!(!spans.is_empty());
            let rebuilt: String = spans.iter().map(Span::raw).collect();
            prop_assert_eq!(rebuilt, line);
        }

        #[test]
        fn styled_spans_are_never_empty(line in "[a-z *`]{0,40}") {
            for span in parse_spans(&line) {
                if !matches!(span, Span::Plain(_)) {
                    prop_assert!(!span.text().is_empty());
                }
            }
        }
    }
}
