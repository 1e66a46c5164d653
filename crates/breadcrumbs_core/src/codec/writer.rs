//! Header/body writer mirroring the parser grammar.

use super::{FrontmatterMap, FrontmatterValue, HEADER_MARKER};
use std::borrow::Cow;

const INDENT_STEP: usize = 2;

/// Composes a document from header data and body text.
///
/// Empty arrays and maps without any emitted child are omitted. The body is
/// normalized with [`normalize_body`] and terminated by exactly one newline
/// when non-empty.
pub fn serialize_document(data: &FrontmatterMap, body: &str) -> String {
    let mut lines = Vec::new();
    write_entries(data, 0, &mut lines);

    let mut out = String::new();
    out.push_str(HEADER_MARKER);
    out.push('\n');
    for line in &lines {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(HEADER_MARKER);
    out.push('\n');

    let body = normalize_body(body);
    if !body.is_empty() {
        out.push_str(&body);
        out.push('\n');
    }
    out
}

/// Strips leading blank lines and all trailing whitespace.
///
/// Indentation on the first non-blank line is preserved.
pub fn normalize_body(body: &str) -> String {
    let leading_len = body.len() - body.trim_start().len();
    let start = match body[..leading_len].rfind('\n') {
        Some(newline) => newline + 1,
        None => 0,
    };
    body[start..].trim_end().to_string()
}

fn write_entries(map: &FrontmatterMap, indent: usize, lines: &mut Vec<String>) {
    let padding = " ".repeat(indent);
    for (key, value) in map.iter() {
        match value {
            FrontmatterValue::Scalar(scalar) => {
                lines.push(format!("{padding}{key}: {}", escape_scalar(scalar)));
            }
            FrontmatterValue::Array(items) => {
                if items.is_empty() {
                    continue;
                }
                lines.push(format!("{padding}{key}:"));
                let item_padding = " ".repeat(indent + INDENT_STEP);
                for item in items {
                    lines.push(format!("{item_padding}- {}", escape_scalar(item)));
                }
            }
            FrontmatterValue::Map(nested) => {
                let mut nested_lines = Vec::new();
                write_entries(nested, indent + INDENT_STEP, &mut nested_lines);
                if nested_lines.is_empty() {
                    continue;
                }
                lines.push(format!("{padding}{key}:"));
                lines.extend(nested_lines);
            }
        }
    }
}

/// Quotes a scalar when the parser would otherwise read it back differently.
pub(crate) fn escape_scalar(value: &str) -> Cow<'_, str> {
    let needs_quotes = value.is_empty()
        || value.contains(':')
        || value.contains('#')
        || value.contains('"')
        || value.contains("- ")
        || value.starts_with('\'')
        || value.starts_with('-')
        || value.trim() != value;
    if !needs_quotes {
        return Cow::Borrowed(value);
    }
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    Cow::Owned(format!("\"{escaped}\""))
}
