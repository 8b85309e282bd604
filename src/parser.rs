use once_cell::sync::Lazy;
use regex::Regex;

use crate::block::{Block, HeadingLevel};
use crate::inline::parse_spans;
use crate::table;

static DIVIDER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*---+\s*$").unwrap());
static HEADING_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,3})\s+(.*)$").unwrap());
static BULLET_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-*]\s+(.*)$").unwrap());
static NUMBERED_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\s+(.*)$").unwrap());

/// Result of classifying the line under the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// `None` for lines that produce nothing (blank lines).
    pub block: Option<Block>,
    /// Lines consumed, always at least one.
    pub consumed: usize,
}

/// A line classification rule: a predicate over the cursor position and the
/// builder run when it matches.
struct Rule {
    matches: fn(&[&str], usize) -> bool,
    build: fn(&[&str], usize) -> Step,
}

/// Evaluated top to bottom, first match wins. The last rule always matches.
static RULES: &[Rule] = &[
    Rule {
        matches: |lines, at| is_divider(lines[at]),
        build: |_, _| single(Block::Divider),
    },
    Rule {
        matches: |lines, at| HEADING_PATTERN.is_match(lines[at]),
        build: build_heading,
    },
    Rule {
        matches: |lines, at| {
            lines
                .get(at + 1)
                .is_some_and(|next| table::is_table_start(lines[at], next))
        },
        build: build_table,
    },
    Rule {
        matches: |lines, at| BULLET_PATTERN.is_match(lines[at]),
        build: |lines, at| {
            let content = parse_spans(capture_rest(&BULLET_PATTERN, lines[at]));
            single(Block::BulletItem { content })
        },
    },
    Rule {
        matches: |lines, at| NUMBERED_PATTERN.is_match(lines[at]),
        build: |lines, at| {
            let content = parse_spans(capture_rest(&NUMBERED_PATTERN, lines[at]));
            single(Block::NumberedItem { content })
        },
    },
    Rule {
        matches: |lines, at| lines[at].starts_with('>'),
        build: build_quote,
    },
    Rule {
        matches: |lines, at| lines[at].trim().is_empty(),
        build: |_, _| Step {
            block: None,
            consumed: 1,
        },
    },
    Rule {
        matches: |_, _| true,
        build: |lines, at| {
            single(Block::Paragraph {
                content: parse_spans(lines[at]),
            })
        },
    },
];

fn single(block: Block) -> Step {
    Step {
        block: Some(block),
        consumed: 1,
    }
}

fn capture_rest<'a>(pattern: &Regex, line: &'a str) -> &'a str {
    pattern
        .captures(line)
        .and_then(|caps| caps.get(caps.len() - 1))
        .map_or("", |m| m.as_str())
}

fn build_heading(lines: &[&str], at: usize) -> Step {
    let line = lines[at];
    let Some(caps) = HEADING_PATTERN.captures(line) else {
        return single(Block::Paragraph {
            content: parse_spans(line),
        });
    };
    let depth = caps.get(1).map_or(1, |m| m.as_str().len());
    let text = caps.get(2).map_or("", |m| m.as_str()).trim();

    match HeadingLevel::from_depth(depth) {
        Some(level) => single(Block::Heading {
            level,
            content: parse_spans(text),
        }),
        None => single(Block::Paragraph {
            content: parse_spans(line),
        }),
    }
}

fn build_table(lines: &[&str], at: usize) -> Step {
    let (table, consumed) = table::parse_table(lines, at);
    Step {
        block: Some(Block::Table(table)),
        consumed,
    }
}

fn build_quote(lines: &[&str], at: usize) -> Step {
    let line = lines[at];
    let text = line.strip_prefix('>').unwrap_or(line);
    let text = text.strip_prefix(' ').unwrap_or(text);
    single(Block::Quote {
        content: parse_spans(text),
    })
}

/// A line of three or more hyphens and nothing else.
pub fn is_divider(line: &str) -> bool {
    DIVIDER_PATTERN.is_match(line)
}

/// Whether `line` starts a block kind that ends a lazily continued table.
pub fn opens_block(line: &str) -> bool {
    is_divider(line)
        || HEADING_PATTERN.is_match(line)
        || BULLET_PATTERN.is_match(line)
        || NUMBERED_PATTERN.is_match(line)
        || line.starts_with('>')
}

/// Classify the line at `cursor` and build at most one block from it.
///
/// Looks ahead at most one line. Never fails: anything unrecognised becomes
/// a paragraph. `cursor` must be less than `lines.len()`.
pub fn parse_step(lines: &[&str], cursor: usize) -> Step {
    let rule = RULES
        .iter()
        .find(|rule| (rule.matches)(lines, cursor))
        .unwrap_or(&RULES[RULES.len() - 1]);
    (rule.build)(lines, cursor)
}

/// Returns the block built at `cursor`, if any, and the advanced cursor.
pub fn parse_next(lines: &[&str], cursor: usize) -> (Option<Block>, usize) {
    if cursor >= lines.len() {
        return (None, lines.len());
    }
    let step = parse_step(lines, cursor);
    (step.block, cursor + step.consumed.max(1))
}

/// Parse markdown text into a list of blocks
pub fn parse(markdown: &str) -> Vec<Block> {
    let lines: Vec<&str> = markdown.lines().collect();
    let mut blocks = Vec::new();
    let mut cursor = 0;

    while cursor < lines.len() {
        let (block, next) = parse_next(&lines, cursor);
        blocks.extend(block);
        cursor = next;
    }

    blocks
}
