//! Lightweight markup for assistant answers.
//!
//! Supports `**strong**`, `*emphasis*` and numbered list lines. Rendering is
//! total: anything unrecognized stays literal text.

use regex::Regex;
use std::sync::LazyLock;

/// Strong runs are listed first so `**x**` is never read as two emphasis runs.
static INLINE_MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*[^*]+\*\*|\*[^*]+\*").expect("valid inline regex"));

static ORDERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+\.)\s+(.+)").expect("valid ordered item regex"));

/// A run of text with uniform emphasis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Plain(String),
    Emphasis(String),
    Strong(String),
}

impl Fragment {
    /// The text without markers.
    pub fn text(&self) -> &str {
        match self {
            Self::Plain(t) | Self::Emphasis(t) | Self::Strong(t) => t,
        }
    }
}

/// Shape of one line before inline tokenization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineShape<'a> {
    Blank,
    OrderedItem { marker: &'a str, remainder: &'a str },
    Paragraph { text: &'a str },
}

/// One display line of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedLine {
    /// Vertical gap; carries no text.
    Spacer,
    OrderedItem {
        marker: String,
        fragments: Vec<Fragment>,
    },
    Paragraph(Vec<Fragment>),
}

/// Classifies a single line (without its line terminator).
pub fn classify_line(line: &str) -> LineShape<'_> {
    if let Some(caps) = ORDERED_ITEM.captures(line) {
        if let (Some(marker), Some(remainder)) = (caps.get(1), caps.get(2)) {
            return LineShape::OrderedItem {
                marker: marker.as_str(),
                remainder: remainder.as_str(),
            };
        }
    }
    if line.trim().is_empty() {
        LineShape::Blank
    } else {
        LineShape::Paragraph { text: line }
    }
}

/// Splits a line into plain, emphasis and strong fragments in source order.
///
/// Empty plain runs between adjacent markup are omitted, so an empty line
/// yields no fragments.
pub fn tokenize_inline(line: &str) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    let mut last = 0;

    for m in INLINE_MARKUP.find_iter(line) {
        if m.start() > last {
            fragments.push(Fragment::Plain(line[last..m.start()].to_string()));
        }
        let token = m.as_str();
        if token.starts_with("**") {
            fragments.push(Fragment::Strong(token[2..token.len() - 2].to_string()));
        } else {
            fragments.push(Fragment::Emphasis(token[1..token.len() - 1].to_string()));
        }
        last = m.end();
    }

    if last < line.len() {
        fragments.push(Fragment::Plain(line[last..].to_string()));
    }
    fragments
}

/// Renders a whole message, one entry per input line.
pub fn render_message(content: &str) -> Vec<RenderedLine> {
    content
        .split('\n')
        .map(|line| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            match classify_line(line) {
                LineShape::Blank => RenderedLine::Spacer,
                LineShape::OrderedItem { marker, remainder } => RenderedLine::OrderedItem {
                    marker: marker.to_string(),
                    fragments: tokenize_inline(remainder),
                },
                LineShape::Paragraph { text } => RenderedLine::Paragraph(tokenize_inline(text)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plain(s: &str) -> Fragment {
        Fragment::Plain(s.to_string())
    }

    fn em(s: &str) -> Fragment {
        Fragment::Emphasis(s.to_string())
    }

    fn strong(s: &str) -> Fragment {
        Fragment::Strong(s.to_string())
    }

    #[test]
    fn test_strong() {
        assert_eq!(tokenize_inline("**bold**"), vec![strong("bold")]);
    }

    #[test]
    fn test_emphasis() {
        assert_eq!(tokenize_inline("*em*"), vec![em("em")]);
    }

    #[test]
    fn test_unterminated_marker_is_literal() {
        assert_eq!(tokenize_inline("*unterminated"), vec![plain("*unterminated")]);
        assert_eq!(tokenize_inline("a * b"), vec![plain("a * b")]);
    }

    #[test]
    fn test_empty_line_has_no_fragments() {
        assert!(tokenize_inline("").is_empty());
    }

    #[test]
    fn test_mixed_line_keeps_order() {
        assert_eq!(
            tokenize_inline("The **top 5** artists are *mostly* rock."),
            vec![
                plain("The "),
                strong("top 5"),
                plain(" artists are "),
                em("mostly"),
                plain(" rock."),
            ]
        );
    }

    #[test]
    fn test_adjacent_markup() {
        assert_eq!(tokenize_inline("**a***b*"), vec![strong("a"), em("b")]);
    }

    #[test]
    fn test_empty_markers_stay_literal() {
        assert_eq!(tokenize_inline("****"), vec![plain("****")]);
        assert_eq!(tokenize_inline("**"), vec![plain("**")]);
    }

    #[test]
    fn test_fragment_text() {
        assert_eq!(strong("x").text(), "x");
        assert_eq!(plain("y").text(), "y");
    }

    #[test]
    fn test_classify_ordered_item() {
        assert_eq!(
            classify_line("1. First item"),
            LineShape::OrderedItem {
                marker: "1.",
                remainder: "First item"
            }
        );
        assert_eq!(
            classify_line("12.\tTwelfth"),
            LineShape::OrderedItem {
                marker: "12.",
                remainder: "Twelfth"
            }
        );
        assert_eq!(
            classify_line("1.  "),
            LineShape::OrderedItem {
                marker: "1.",
                remainder: " "
            }
        );
    }

    #[test]
    fn test_classify_not_ordered() {
        assert_eq!(
            classify_line("1.5 million"),
            LineShape::Paragraph { text: "1.5 million" }
        );
        assert_eq!(classify_line("1."), LineShape::Paragraph { text: "1." });
        assert_eq!(classify_line("1. "), LineShape::Paragraph { text: "1. " });
        assert_eq!(
            classify_line(" 1. indented"),
            LineShape::Paragraph { text: " 1. indented" }
        );
    }

    #[test]
    fn test_classify_blank() {
        assert_eq!(classify_line(""), LineShape::Blank);
        assert_eq!(classify_line("   \t"), LineShape::Blank);
    }

    #[test]
    fn test_render_message_keeps_every_line() {
        let rendered = render_message("Here are the **top 2**:\n\n1. Iron Maiden - *$138.60*\n2. U2\n");
        assert_eq!(
            rendered,
            vec![
                RenderedLine::Paragraph(vec![plain("Here are the "), strong("top 2"), plain(":")]),
                RenderedLine::Spacer,
                RenderedLine::OrderedItem {
                    marker: "1.".to_string(),
                    fragments: vec![plain("Iron Maiden - "), em("$138.60")],
                },
                RenderedLine::OrderedItem {
                    marker: "2.".to_string(),
                    fragments: vec![plain("U2")],
                },
                RenderedLine::Spacer,
            ]
        );
    }

    #[test]
    fn test_render_message_strips_carriage_returns() {
        assert_eq!(
            render_message("a\r\n\r\nb"),
            vec![
                RenderedLine::Paragraph(vec![plain("a")]),
                RenderedLine::Spacer,
                RenderedLine::Paragraph(vec![plain("b")]),
            ]
        );
    }

    #[test]
    fn test_render_empty_message_is_single_spacer() {
        assert_eq!(render_message(""), vec![RenderedLine::Spacer]);
    }
}
