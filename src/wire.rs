//! Content API payloads.
//!
//! Blocks serialize as `{"object": "block", "type": T, T: {...}}`. Every text
//! content field is cut to [`MAX_TEXT_CHARS`] before it leaves the process.

use serde::Serialize;

use crate::block::{Block, HeadingLevel, Span, Table};

/// Per-field character limit of the content API.
pub const MAX_TEXT_CHARS: usize = 2000;

/// Truncate to at most `max` characters, never splitting a character.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[derive(Debug, Serialize)]
pub struct TextContent<'a> {
    pub content: &'a str,
}

#[derive(Debug, Default, Serialize)]
pub struct Annotations {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub code: bool,
}

/// One element of a rich text array.
#[derive(Debug, Serialize)]
pub struct RichText<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: TextContent<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Annotations>,
}

impl<'a> RichText<'a> {
    pub fn plain(content: &'a str) -> Self {
        RichText {
            kind: "text",
            text: TextContent {
                content: truncate_chars(content, MAX_TEXT_CHARS),
            },
            annotations: None,
        }
    }

    pub fn from_span(span: &'a Span) -> Self {
        let annotations = match span {
            Span::Plain(_) => None,
            Span::Bold(_) => Some(Annotations {
                bold: true,
                ..Annotations::default()
            }),
            Span::Italic(_) => Some(Annotations {
                italic: true,
                ..Annotations::default()
            }),
            Span::Code(_) => Some(Annotations {
                code: true,
                ..Annotations::default()
            }),
        };
        RichText {
            annotations,
            ..RichText::plain(span.text())
        }
    }
}

pub fn rich_text(spans: &[Span]) -> Vec<RichText<'_>> {
    spans.iter().map(RichText::from_span).collect()
}

#[derive(Debug, Serialize)]
pub struct RichTextBody<'a> {
    pub rich_text: Vec<RichText<'a>>,
}

fn text(spans: &[Span]) -> RichTextBody<'_> {
    RichTextBody {
        rich_text: rich_text(spans),
    }
}

#[derive(Debug, Serialize)]
pub struct Empty {}

#[derive(Debug, Serialize)]
pub struct Cells<'a> {
    pub cells: Vec<Vec<RichText<'a>>>,
}

#[derive(Debug, Serialize)]
pub struct TableRowBlock<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub table_row: Cells<'a>,
}

#[derive(Debug, Serialize)]
pub struct TableBody<'a> {
    pub table_width: usize,
    pub has_column_header: bool,
    pub has_row_header: bool,
    pub children: Vec<TableRowBlock<'a>>,
}

impl<'a> TableBody<'a> {
    fn new(table: &'a Table) -> Self {
        let children = table
            .rows
            .iter()
            .map(|row| TableRowBlock {
                kind: "table_row",
                table_row: Cells {
                    cells: row
                        .cells
                        .iter()
                        .map(|cell| vec![RichText::plain(cell)])
                        .collect(),
                },
            })
            .collect();

        TableBody {
            table_width: table.width,
            has_column_header: table.has_header,
            has_row_header: false,
            children,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockBody<'a> {
    #[serde(rename = "heading_1")]
    Heading1 { heading_1: RichTextBody<'a> },
    #[serde(rename = "heading_2")]
    Heading2 { heading_2: RichTextBody<'a> },
    #[serde(rename = "heading_3")]
    Heading3 { heading_3: RichTextBody<'a> },
    Paragraph { paragraph: RichTextBody<'a> },
    BulletedListItem { bulleted_list_item: RichTextBody<'a> },
    NumberedListItem { numbered_list_item: RichTextBody<'a> },
    Quote { quote: RichTextBody<'a> },
    Divider { divider: Empty },
    Table { table: TableBody<'a> },
}

/// A block as sent to the content API.
#[derive(Debug, Serialize)]
pub struct WireBlock<'a> {
    pub object: &'static str,
    #[serde(flatten)]
    pub body: BlockBody<'a>,
}

impl<'a> WireBlock<'a> {
    pub fn new(block: &'a Block) -> Self {
        let body = match block {
            Block::Heading { level, content } => match level {
                HeadingLevel::H1 => BlockBody::Heading1 {
                    heading_1: text(content),
                },
                HeadingLevel::H2 => BlockBody::Heading2 {
                    heading_2: text(content),
                },
                HeadingLevel::H3 => BlockBody::Heading3 {
                    heading_3: text(content),
                },
            },
            Block::Paragraph { content } => BlockBody::Paragraph {
                paragraph: text(content),
            },
            Block::BulletItem { content } => BlockBody::BulletedListItem {
                bulleted_list_item: text(content),
            },
            Block::NumberedItem { content } => BlockBody::NumberedListItem {
                numbered_list_item: text(content),
            },
            Block::Quote { content } => BlockBody::Quote {
                quote: text(content),
            },
            Block::Divider => BlockBody::Divider { divider: Empty {} },
            Block::Table(table) => BlockBody::Table {
                table: TableBody::new(table),
            },
        };

        WireBlock {
            object: "block",
            body,
        }
    }
}

pub fn wire_blocks(blocks: &[Block]) -> Vec<WireBlock<'_>> {
    blocks.iter().map(WireBlock::new).collect()
}

#[derive(Debug, Serialize)]
pub struct ParentRef<'a> {
    pub page_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct Icon<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub emoji: &'a str,
}

#[derive(Debug, Serialize)]
pub struct TitleProperty<'a> {
    pub title: Vec<TitleText<'a>>,
}

#[derive(Debug, Serialize)]
pub struct TitleText<'a> {
    pub text: TextContent<'a>,
}

#[derive(Debug, Serialize)]
pub struct Properties<'a> {
    pub title: TitleProperty<'a>,
}

/// Body of the page creation call.
#[derive(Debug, Serialize)]
pub struct CreatePageRequest<'a> {
    pub parent: ParentRef<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon<'a>>,
    pub properties: Properties<'a>,
    pub children: Vec<WireBlock<'a>>,
}

impl<'a> CreatePageRequest<'a> {
    pub fn new(
        parent_id: &'a str,
        title: &'a str,
        icon: Option<&'a str>,
        children: &'a [Block],
    ) -> Self {
        CreatePageRequest {
            parent: ParentRef { page_id: parent_id },
            icon: icon.map(|emoji| Icon {
                kind: "emoji",
                emoji,
            }),
            properties: Properties {
                title: TitleProperty {
                    title: vec![TitleText {
                        text: TextContent {
                            content: truncate_chars(title, MAX_TEXT_CHARS),
                        },
                    }],
                },
            },
            children: wire_blocks(children),
        }
    }
}

/// Body of the append-children call.
#[derive(Debug, Serialize)]
pub struct AppendChildrenRequest<'a> {
    pub children: Vec<WireBlock<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ArchiveRequest {
    pub archived: bool,
}
