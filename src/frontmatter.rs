use serde::Deserialize;
use tracing::{debug, warn};

use crate::block::{Block, HeadingLevel};

/// Page metadata that a document may declare in its YAML frontmatter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PageMeta {
    pub title: Option<String>,
    pub icon: Option<String>,
}

/// Split YAML frontmatter from the beginning of markdown content.
///
/// Frontmatter is a first line of `---` closed by a later `---` line. An
/// unclosed opening line is left in the body, where it parses as a divider.
pub fn split(markdown: &str) -> (Option<&str>, &str) {
    let Some(first_newline) = markdown.find('\n') else {
        return (None, markdown);
    };
    if markdown[..first_newline].trim_end() != "---" {
        return (None, markdown);
    }

    let rest = &markdown[first_newline + 1..];
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return (Some(yaml), body.trim_start_matches(['\r', '\n']));
        }
        offset += line.len();
    }

    (None, markdown)
}

/// Parse frontmatter YAML into page metadata.
///
/// Returns `None` unless the YAML is a mapping, so a divider pair around
/// ordinary text is not mistaken for metadata. A mapping with badly typed
/// fields yields empty metadata.
pub fn parse_meta(yaml: &str) -> Option<PageMeta> {
    let value: serde_yaml::Value = match serde_yaml::from_str(yaml) {
        Ok(value) => value,
        Err(err) => {
            debug!(error = %err, "opening lines are not YAML");
            return None;
        }
    };
    if !value.is_mapping() {
        return None;
    }
    match serde_yaml::from_value::<PageMeta>(value) {
        Ok(meta) => Some(meta),
        Err(err) => {
            warn!(error = %err, "ignoring malformed frontmatter");
            Some(PageMeta::default())
        }
    }
}

/// Remove frontmatter from `markdown` when it holds metadata.
///
/// Anything else is left in the body untouched, where the fences parse as
/// dividers.
pub fn strip(markdown: &str) -> (Option<PageMeta>, &str) {
    match split(markdown) {
        (Some(yaml), body) => match parse_meta(yaml) {
            Some(meta) => (Some(meta), body),
            None => (None, markdown),
        },
        (None, _) => (None, markdown),
    }
}

/// Text of the first level-1 heading, used as a fallback page title.
pub fn first_title(blocks: &[Block]) -> Option<String> {
    blocks.iter().find_map(|block| match block {
        Block::Heading {
            level: HeadingLevel::H1,
            ..
        } => Some(block.plain_text()),
        _ => None,
    })
}
