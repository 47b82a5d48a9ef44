//! Format-preserving edits over JSONC text
//!
//! Each edit touches only the span of the value it targets (or the span where a
//! new member is inserted). Everything else, comments included, is copied through.

use std::ops::Range;

use serde_json::Value;
use tracing::{debug, warn};
use tree_sitter::Node;

use crate::error::Error;
use crate::jsonc::document::{JsoncDocument, elements, is_value, pairs};
use crate::jsonc::format::{
    detect_indent_unit, line_end, line_indent, line_start, render, render_member,
};
use crate::jsonc::path::{JsonEdit, Segment, nest};

/// Apply `edits` in order; each edit sees the text produced by the previous one
pub fn apply(text: &str, edits: &[JsonEdit]) -> Result<String, Error> {
    let unit = detect_indent_unit(text);
    edits.iter().try_fold(text.to_string(), |current, edit| {
        let next = apply_one(&current, edit, &unit)?;
        if next != current {
            debug!("Applied edit at {}", edit.path_display());
        }
        Ok(next)
    })
}

/// A replacement of `range` in the original text
struct Splice {
    range: Range<usize>,
    text: String,
}

fn apply_one(text: &str, edit: &JsonEdit, unit: &str) -> Result<String, Error> {
    let document = JsoncDocument::parse(text)?;

    let Some(root) = document.root_value() else {
        let Some(value) = &edit.value else {
            return Ok(text.to_string());
        };
        let mut out = text.to_string();
        if !out.trim().is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&render(&nest(&edit.path, value.clone()), unit, ""));
        return Ok(out);
    };

    let mut node = root;
    for (depth, segment) in edit.path.iter().enumerate() {
        match document.child(node, segment) {
            Some(child) => node = child,
            None => {
                let Some(value) = &edit.value else {
                    return Ok(text.to_string());
                };
                let splices = insert(&document, node, &edit.path[depth..], value, unit);
                return Ok(splice(text, splices));
            }
        }
    }

    match &edit.value {
        Some(value) => {
            if &document.to_value(node)? == value {
                return Ok(text.to_string());
            }
            let base = line_indent(text, node.start_byte());
            Ok(splice(
                text,
                vec![Splice {
                    range: node.byte_range(),
                    text: render(value, unit, base),
                }],
            ))
        }
        None if edit.path.is_empty() => {
            warn!("Refusing to remove the document root");
            Ok(text.to_string())
        }
        None => Ok(splice(text, remove(text, node))),
    }
}

/// Insert the value for the `remaining` (missing) part of the path under `container`
fn insert(
    document: &JsoncDocument<'_>,
    container: Node<'_>,
    remaining: &[Segment],
    value: &Value,
    unit: &str,
) -> Vec<Splice> {
    let text = document.text();
    let base = line_indent(text, container.start_byte());

    let (members, member) = match (container.kind(), &remaining[0]) {
        ("object", Segment::Key(key)) => (pairs(container), Member::Pair(key)),
        ("array", Segment::Index(_)) => (elements(container), Member::Element),
        _ => {
            // Not a container of the right shape: overwrite it with the nested value
            return vec![Splice {
                range: container.byte_range(),
                text: render(&nest(remaining, value.clone()), unit, base),
            }];
        }
    };
    let nested = nest(&remaining[1..], value.clone());

    if let Some(last) = members.last() {
        if last.start_position().row != container.start_position().row {
            let indent = line_indent(text, last.start_byte());
            return vec![Splice {
                range: last.end_byte()..last.end_byte(),
                text: format!(",\n{indent}{}", member.render(&nested, unit, indent)),
            }];
        }
        return vec![Splice {
            range: last.end_byte()..last.end_byte(),
            text: format!(", {}", member.render(&nested, unit, base)),
        }];
    }

    let indent = format!("{base}{unit}");
    let rendered = format!("\n{indent}{}\n{base}", member.render(&nested, unit, &indent));
    let (Some(open), Some(close)) = (first_token(container), last_token(container)) else {
        return vec![];
    };
    if text[open.end_byte()..close.start_byte()].trim().is_empty() {
        vec![Splice {
            range: open.end_byte()..close.start_byte(),
            text: rendered,
        }]
    } else {
        // Only comments inside: keep them below the new member
        vec![Splice {
            range: open.end_byte()..open.end_byte(),
            text: rendered.trim_end_matches([' ', '\t']).to_string(),
        }]
    }
}

enum Member<'k> {
    Pair(&'k str),
    Element,
}

impl Member<'_> {
    fn render(&self, value: &Value, unit: &str, base: &str) -> String {
        match self {
            Member::Pair(key) => render_member(key, value, unit, base),
            Member::Element => render(value, unit, base),
        }
    }
}

/// Splices deleting the object member or array element holding `value`
fn remove(text: &str, value: Node<'_>) -> Vec<Splice> {
    let target = match value.parent() {
        Some(parent) if parent.kind() == "pair" => parent,
        _ => value,
    };

    let next = next_significant(target);
    let prev = prev_significant(target);

    // A trailing comma before `}` or `]` parses as an ERROR node holding just ","
    if let Some(comma) = next.filter(|node| is_comma(text, *node)) {
        return vec![whole_lines(text, target.start_byte()..comma.end_byte())];
    }
    if let Some(comma) = prev.filter(|node| node.kind() == ",") {
        return vec![
            Splice {
                range: comma.byte_range(),
                text: String::new(),
            },
            whole_lines(text, target.byte_range()),
        ];
    }
    vec![whole_lines(text, target.byte_range())]
}

fn is_comma(text: &str, node: Node<'_>) -> bool {
    node.kind() == "," || (node.is_error() && text[node.byte_range()].trim() == ",")
}

/// Widen a deletion to whole lines when nothing else shares them
fn whole_lines(text: &str, range: Range<usize>) -> Splice {
    let start = line_start(text, range.start);
    let end = line_end(text, range.end);
    let alone = text[start..range.start].trim().is_empty() && text[range.end..end].trim().is_empty();

    let range = if alone {
        start..(end + 1).min(text.len())
    } else {
        range
    };
    Splice {
        range,
        text: String::new(),
    }
}

fn next_significant(node: Node<'_>) -> Option<Node<'_>> {
    let mut sibling = node.next_sibling();
    while let Some(candidate) = sibling {
        if !candidate.is_extra() {
            return Some(candidate);
        }
        sibling = candidate.next_sibling();
    }
    None
}

fn prev_significant(node: Node<'_>) -> Option<Node<'_>> {
    let mut sibling = node.prev_sibling();
    while let Some(candidate) = sibling {
        if !candidate.is_extra() {
            return Some(candidate);
        }
        sibling = candidate.prev_sibling();
    }
    None
}

fn first_token(container: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = container.walk();
    container
        .children(&mut cursor)
        .find(|node| !is_value(*node) && !node.is_extra())
}

fn last_token(container: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = container.walk();
    container
        .children(&mut cursor)
        .filter(|node| !is_value(*node) && !node.is_extra())
        .last()
}

/// Apply non-overlapping splices, back to front so earlier offsets stay valid
fn splice(text: &str, mut splices: Vec<Splice>) -> String {
    splices.sort_by(|a, b| b.range.start.cmp(&a.range.start));
    let mut out = text.to_string();
    for Splice { range, text } in splices {
        out.replace_range(range, &text);
    }
    out
}
