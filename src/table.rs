use once_cell::sync::Lazy;
use regex::Regex;

use crate::block::Table;
use crate::parser;

/// Cells of hyphens, colons and spaces, with optional outer pipes.
static SEPARATOR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\|?\s*:?-+:?\s*(\|\s*:?-+:?\s*)*\|?\s*$").unwrap());

/// True when `header` can open a table whose separator row is `separator`.
pub fn is_table_start(header: &str, separator: &str) -> bool {
    header.contains('|') && is_separator(separator)
}

/// A separator row needs at least one pipe, otherwise `---` would be a divider.
pub fn is_separator(line: &str) -> bool {
    line.contains('|') && SEPARATOR_PATTERN.is_match(line)
}

/// Split a row into trimmed cells, dropping the empty cells produced by an
/// outer leading or trailing pipe.
pub fn split_row(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let trimmed = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('|').unwrap_or(trimmed);
    trimmed.split('|').map(|cell| cell.trim().to_string()).collect()
}

/// Whether a line after the separator still belongs to the table.
///
/// Pipe rows continue it unless they are a divider. A pipe-less line only
/// continues it when it is non-blank and does not open another block.
fn continues_table(line: &str) -> bool {
    if parser::is_divider(line) {
        return false;
    }
    if line.contains('|') {
        return true;
    }
    !line.trim().is_empty() && !parser::opens_block(line)
}

/// Build a table starting at `start`, where `lines[start]` is the header and
/// `lines[start + 1]` a separator already checked with [`is_table_start`].
///
/// Returns the table and the number of lines consumed. The first line that
/// does not continue the table is left for the caller.
pub fn parse_table(lines: &[&str], start: usize) -> (Table, usize) {
    let header = split_row(lines[start]);
    let mut cursor = start + 2;
    let mut rows = Vec::new();

    while let Some(line) = lines.get(cursor) {
        if !continues_table(line) {
            break;
        }
        rows.push(split_row(line));
        cursor += 1;
    }

    (Table::new(header, rows), cursor.min(lines.len()) - start)
}
