//! Rendering of inserted values following the document's own indentation

use serde_json::Value;

/// Indentation used when a document gives no hint (matches a freshly created `{}` file)
pub const DEFAULT_INDENT_UNIT: &str = "\t";

/// Guess the document's indentation unit from its first indented line
pub fn detect_indent_unit(text: &str) -> String {
    text.lines()
        .find_map(|line| {
            let trimmed = line.trim_start_matches([' ', '\t']);
            if trimmed.is_empty() || trimmed.len() == line.len() {
                return None;
            }
            let leading = &line[..line.len() - trimmed.len()];
            if leading.starts_with('\t') {
                Some("\t".to_string())
            } else {
                Some(" ".repeat(leading.len()))
            }
        })
        .unwrap_or_else(|| DEFAULT_INDENT_UNIT.to_string())
}

/// Leading whitespace of the line containing byte `offset`
pub fn line_indent(text: &str, offset: usize) -> &str {
    let line_start = line_start(text, offset);
    let line = &text[line_start..];
    let width = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..width.min(offset - line_start)]
}

pub(crate) fn line_start(text: &str, offset: usize) -> usize {
    text[..offset].rfind('\n').map_or(0, |pos| pos + 1)
}

/// End of the line containing byte `offset`, excluding the newline
pub(crate) fn line_end(text: &str, offset: usize) -> usize {
    text[offset..].find('\n').map_or(text.len(), |pos| offset + pos)
}

/// Render `value` as it should appear when its first line is indented by `base`
///
/// Empty containers stay on one line; non-empty ones put each member on its own line.
pub fn render(value: &Value, unit: &str, base: &str) -> String {
    let inner = format!("{base}{unit}");
    match value {
        Value::Array(items) if !items.is_empty() => {
            let body = items
                .iter()
                .map(|item| format!("{inner}{}", render(item, unit, &inner)))
                .collect::<Vec<_>>()
                .join(",\n");
            format!("[\n{body}\n{base}]")
        }
        Value::Object(map) if !map.is_empty() => {
            let body = map
                .iter()
                .map(|(key, item)| format!("{inner}{}", render_member(key, item, unit, &inner)))
                .collect::<Vec<_>>()
                .join(",\n");
            format!("{{\n{body}\n{base}}}")
        }
        scalar => scalar.to_string(),
    }
}

/// Render a `"key": value` object member
pub fn render_member(key: &str, value: &Value, unit: &str, base: &str) -> String {
    format!(
        "{}: {}",
        Value::String(key.to_string()),
        render(value, unit, base)
    )
}
