/// Inline text spans with formatting. Spans never nest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Plain(String),
    Bold(String),
    Italic(String),
    Code(String),
}

impl Span {
    /// Visible text, without markers.
    pub fn text(&self) -> &str {
        match self {
            Span::Plain(text) | Span::Bold(text) | Span::Italic(text) | Span::Code(text) => text,
        }
    }

    /// Source text of the span, markers included.
    pub fn raw(&self) -> String {
        match self {
            Span::Plain(text) => text.clone(),
            Span::Bold(text) => format!("**{text}**"),
            Span::Italic(text) => format!("*{text}*"),
            Span::Code(text) => format!("`{text}`"),
        }
    }
}

/// Heading depth. Only three levels are supported by the target API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    pub fn from_depth(depth: usize) -> Option<Self> {
        match depth {
            1 => Some(HeadingLevel::H1),
            2 => Some(HeadingLevel::H2),
            3 => Some(HeadingLevel::H3),
            _ => None,
        }
    }
}

/// One row of plain-text cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub cells: Vec<String>,
}

/// A table whose rows all hold exactly `width` cells. The first row is the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub width: usize,
    pub has_header: bool,
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Build a table from a header and data rows, padding or truncating every
    /// row to the header's width.
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = header.len();
        let rows = std::iter::once(header)
            .chain(rows)
            .map(|cells| TableRow {
                cells: fit_to_width(cells, width),
            })
            .collect();

        Table {
            width,
            has_header: true,
            rows,
        }
    }

    pub fn header(&self) -> Option<&TableRow> {
        self.rows.first()
    }

    pub fn body(&self) -> &[TableRow] {
        self.rows.get(1..).unwrap_or_default()
    }
}

fn fit_to_width(mut cells: Vec<String>, width: usize) -> Vec<String> {
    cells.resize(width, String::new());
    cells
}

/// Block-level elements parsed from Markdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading {
        level: HeadingLevel,
        content: Vec<Span>,
    },
    Paragraph {
        content: Vec<Span>,
    },
    BulletItem {
        content: Vec<Span>,
    },
    NumberedItem {
        content: Vec<Span>,
    },
    Quote {
        content: Vec<Span>,
    },
    Divider,
    Table(Table),
}

impl Block {
    /// Rich text of the block, or `None` for dividers and tables.
    pub fn content(&self) -> Option<&[Span]> {
        match self {
            Block::Heading { content, .. }
            | Block::Paragraph { content }
            | Block::BulletItem { content }
            | Block::NumberedItem { content }
            | Block::Quote { content } => Some(content),
            Block::Divider | Block::Table(_) => None,
        }
    }

    /// Visible text of the block's rich text, concatenated.
    pub fn plain_text(&self) -> String {
        self.content()
            .map(|spans| spans.iter().map(Span::text).collect())
            .unwrap_or_default()
    }
}
