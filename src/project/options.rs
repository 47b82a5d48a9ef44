//! Compiler-option toggles applied when declarations are enabled or disabled
//!
//! Each entry pairs a key path with a function of the direction (`true` when
//! enabling). Entries are evaluated into concrete [`JsonEdit`]s before the
//! document editor runs.

use serde_json::{Value, json};

use crate::error::Error;
use crate::jsonc::{JsonEdit, JsoncDocument, key_path};

/// What one table entry does for a given direction
#[derive(Debug, Clone, PartialEq)]
pub enum OptionChange {
    /// Write the value unconditionally
    Set(Value),
    /// Write the value only if the key is absent
    SetIfMissing(Value),
    /// Append the listed entries to an existing array (exact-match dedup)
    Merge(Vec<Value>),
    /// Delete the key
    Remove,
    /// Leave the key alone
    Keep,
}

pub struct OptionToggle {
    pub path: &'static [&'static str],
    pub compute: fn(bool) -> OptionChange,
}

impl OptionToggle {
    fn evaluate(&self, enabling: bool, document: &JsoncDocument<'_>) -> Result<Option<JsonEdit>, Error> {
        let path = key_path(self.path);
        let edit = match (self.compute)(enabling) {
            OptionChange::Set(value) => Some(JsonEdit::set(path, value)),
            OptionChange::SetIfMissing(value) => match document.find(&path) {
                Some(_) => None,
                None => Some(JsonEdit::set(path, value)),
            },
            OptionChange::Merge(entries) => {
                let mut merged = match document.value_at(&path)? {
                    Some(Value::Array(current)) => current,
                    _ => Vec::new(),
                };
                for entry in entries {
                    if !merged.contains(&entry) {
                        merged.push(entry);
                    }
                }
                Some(JsonEdit::set(path, Value::Array(merged)))
            }
            OptionChange::Remove => Some(JsonEdit::remove(path)),
            OptionChange::Keep => None,
        };
        Ok(edit)
    }
}

/// Relaxations that stay in place after disabling
fn relax(enabling: bool) -> OptionChange {
    if enabling {
        OptionChange::Set(json!(true))
    } else {
        OptionChange::Keep
    }
}

/// `noCheck` turns off full type checking; force it off while declarations are in use
fn full_check(enabling: bool) -> OptionChange {
    if enabling {
        OptionChange::Set(json!(false))
    } else {
        OptionChange::Remove
    }
}

fn minimum_lib(enabling: bool) -> OptionChange {
    if enabling {
        OptionChange::Merge(vec![json!(STANDARD_LIBRARY_LEVEL)])
    } else {
        OptionChange::Keep
    }
}

fn minimum_target(enabling: bool) -> OptionChange {
    if enabling {
        OptionChange::SetIfMissing(json!(STANDARD_LIBRARY_LEVEL))
    } else {
        OptionChange::Keep
    }
}

pub const STANDARD_LIBRARY_LEVEL: &str = "ES2022";

pub const COMPILER_OPTIONS: &[OptionToggle] = &[
    OptionToggle {
        path: &["compilerOptions", "skipLibCheck"],
        compute: relax,
    },
    OptionToggle {
        path: &["compilerOptions", "checkJs"],
        compute: relax,
    },
    OptionToggle {
        path: &["compilerOptions", "noEmit"],
        compute: relax,
    },
    OptionToggle {
        path: &["compilerOptions", "noCheck"],
        compute: full_check,
    },
    OptionToggle {
        path: &["compilerOptions", "lib"],
        compute: minimum_lib,
    },
    OptionToggle {
        path: &["compilerOptions", "target"],
        compute: minimum_target,
    },
    OptionToggle {
        path: &["compilerOptions", "isolatedModules"],
        compute: relax,
    },
];

/// Evaluate `table` for one direction against the current document
pub fn evaluate(
    table: &[OptionToggle],
    enabling: bool,
    document: &JsoncDocument<'_>,
) -> Result<Vec<JsonEdit>, Error> {
    table
        .iter()
        .filter_map(|toggle| toggle.evaluate(enabling, document).transpose())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluate_enabling_sets_every_option() {
        let document = JsoncDocument::parse("{}").unwrap();

        let edits = evaluate(COMPILER_OPTIONS, true, &document).unwrap();

        assert_eq!(
            edits,
            vec![
                JsonEdit::set(key_path(&["compilerOptions", "skipLibCheck"]), json!(true)),
                JsonEdit::set(key_path(&["compilerOptions", "checkJs"]), json!(true)),
                JsonEdit::set(key_path(&["compilerOptions", "noEmit"]), json!(true)),
                JsonEdit::set(key_path(&["compilerOptions", "noCheck"]), json!(false)),
                JsonEdit::set(key_path(&["compilerOptions", "lib"]), json!(["ES2022"])),
                JsonEdit::set(key_path(&["compilerOptions", "target"]), json!("ES2022")),
                JsonEdit::set(key_path(&["compilerOptions", "isolatedModules"]), json!(true)),
            ]
        );
    }

    #[test]
    fn evaluate_disabling_only_restores_full_check() {
        let document = JsoncDocument::parse("{}").unwrap();

        let edits = evaluate(COMPILER_OPTIONS, false, &document).unwrap();

        assert_eq!(
            edits,
            vec![JsonEdit::remove(key_path(&["compilerOptions", "noCheck"]))]
        );
    }

    #[test]
    fn evaluate_merges_lib_and_keeps_existing_target() {
        let document = JsoncDocument::parse(
            r#"{"compilerOptions": {"lib": ["DOM"], "target": "ESNext"}}"#,
        )
        .unwrap();

        let edits = evaluate(COMPILER_OPTIONS, true, &document).unwrap();

        assert!(edits.contains(&JsonEdit::set(
            key_path(&["compilerOptions", "lib"]),
            json!(["DOM", "ES2022"])
        )));
        assert!(
            !edits
                .iter()
                .any(|edit| edit.path == key_path(&["compilerOptions", "target"]))
        );
    }
}
