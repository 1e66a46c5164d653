//! Recursive-descent header parser over lines with an indentation level.

use super::{FrontmatterError, FrontmatterMap, FrontmatterValue, HEADER_MARKER};

const INDENT_STEP: usize = 2;

/// Parsed document: header value tree plus raw body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontmatterDocument {
    pub data: FrontmatterMap,
    /// Everything after the closing marker line, untouched.
    pub body: String,
}

/// Splits `raw` into header data and body.
///
/// Leading whitespace before the opening marker is ignored. Both marker lines
/// must consist solely of `---` (a trailing `\r` is tolerated).
///
/// # Errors
/// - `MissingHeader` when either marker line is absent.
/// - Any structural header error from the line parser.
pub fn parse_document(raw: &str) -> Result<FrontmatterDocument, FrontmatterError> {
    let source = raw.trim_start();
    let mut segments = source.split_inclusive('\n');

    let opening = segments.next().ok_or(FrontmatterError::MissingHeader)?;
    if strip_line_ending(opening) != HEADER_MARKER || !opening.ends_with('\n') {
        return Err(FrontmatterError::MissingHeader);
    }

    let mut consumed = opening.len();
    let mut header_lines = Vec::new();
    let mut closed = false;
    for segment in segments {
        consumed += segment.len();
        let line = strip_line_ending(segment);
        if line == HEADER_MARKER {
            closed = true;
            break;
        }
        header_lines.push(line);
    }
    if !closed {
        return Err(FrontmatterError::MissingHeader);
    }

    let data = HeaderParser::new(&header_lines).parse()?;
    Ok(FrontmatterDocument {
        data,
        body: source[consumed..].to_string(),
    })
}

struct HeaderParser<'a> {
    lines: &'a [&'a str],
    pos: usize,
}

impl<'a> HeaderParser<'a> {
    fn new(lines: &'a [&'a str]) -> Self {
        Self { lines, pos: 0 }
    }

    fn parse(mut self) -> Result<FrontmatterMap, FrontmatterError> {
        let map = self.parse_entries(0)?;
        // Entries at indent 0 only stop early on a line indented below zero,
        // which cannot happen, so everything has been consumed here.
        debug_assert!(self.peek_content().is_none());
        Ok(map)
    }

    /// Skips blank lines and returns the next content line without consuming it.
    fn peek_content(&mut self) -> Option<&'a str> {
        while let Some(line) = self.lines.get(self.pos) {
            if !line.trim().is_empty() {
                return Some(line);
            }
            self.pos += 1;
        }
        None
    }

    /// 1-based document line of the current position (opening marker is line 1).
    fn line_number(&self) -> usize {
        self.pos + 2
    }

    fn parse_entries(&mut self, indent: usize) -> Result<FrontmatterMap, FrontmatterError> {
        let mut map = FrontmatterMap::new();
        while let Some(line) = self.peek_content() {
            let current = indent_of(line);
            if current < indent {
                break;
            }
            if current > indent {
                return Err(FrontmatterError::InvalidIndentation {
                    line: self.line_number(),
                });
            }

            let trimmed = line.trim();
            if is_list_item(trimmed) {
                return Err(FrontmatterError::ListItemWithoutKey {
                    line: self.line_number(),
                });
            }
            let (key, remainder) = match trimmed.split_once(':') {
                Some((key, remainder)) if !key.trim().is_empty() => (key.trim(), remainder),
                _ => {
                    return Err(FrontmatterError::UnparseableLine {
                        line: self.line_number(),
                        text: trimmed.to_string(),
                    });
                }
            };
            self.pos += 1;

            let value = if !remainder.trim().is_empty() {
                FrontmatterValue::Scalar(parse_scalar(remainder))
            } else {
                match self.peek_content() {
                    Some(next) if is_list_item(next.trim()) => {
                        FrontmatterValue::Array(self.parse_array(indent + INDENT_STEP))
                    }
                    Some(next) if indent_of(next) >= indent + INDENT_STEP => {
                        FrontmatterValue::Map(self.parse_entries(indent + INDENT_STEP)?)
                    }
                    _ => FrontmatterValue::Scalar(String::new()),
                }
            };
            map.insert(key, value);
        }
        Ok(map)
    }

    /// Collects `- value` lines at exactly `indent`.
    ///
    /// Stops at the first line that is not such an item; the caller's entry
    /// loop then reports it if it is misplaced.
    fn parse_array(&mut self, indent: usize) -> Vec<String> {
        let mut values = Vec::new();
        while let Some(line) = self.peek_content() {
            let trimmed = line.trim();
            if indent_of(line) != indent || !is_list_item(trimmed) {
                break;
            }
            values.push(parse_scalar(&trimmed[1..]));
            self.pos += 1;
        }
        values
    }
}

fn strip_line_ending(segment: &str) -> &str {
    let line = segment.strip_suffix('\n').unwrap_or(segment);
    line.strip_suffix('\r').unwrap_or(line)
}

fn indent_of(line: &str) -> usize {
    line.chars().take_while(|ch| ch.is_whitespace()).count()
}

fn is_list_item(trimmed: &str) -> bool {
    trimmed == "-" || trimmed.starts_with("- ")
}

/// Trims and unquotes one scalar.
///
/// Double-quoted values unescape `\"` and `\\`; single-quoted values are taken
/// verbatim.
pub(crate) fn parse_scalar(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.len() >= 2 {
        if trimmed.starts_with('"') && trimmed.ends_with('"') {
            return unescape_double_quoted(&trimmed[1..trimmed.len() - 1]);
        }
        if trimmed.starts_with('\'') && trimmed.ends_with('\'') {
            return trimmed[1..trimmed.len() - 1].to_string();
        }
    }
    trimmed.to_string()
}

fn unescape_double_quoted(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(next @ ('"' | '\\')) => out.push(next),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}
