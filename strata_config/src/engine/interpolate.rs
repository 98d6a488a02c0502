//! In-document interpolation resolution.
//!
//! References take the form `${dotted.path}` for lookups against the
//! document root or `${name:argument}` for registered resolvers. A reference
//! that spans an entire string is replaced by the referenced value with its
//! original type; references embedded in a longer string splice in the
//! scalar's textual form.

use camino::Utf8Path;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

use super::MergeEngine;
use crate::error::{StrataError, interpolation_error};

#[expect(clippy::expect_used, reason = "the pattern is a compile-time constant")]
fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^${}]+)\}").expect("valid reference pattern"))
}

/// Resolve every interpolation reference in `tree` against its own root.
pub(super) fn resolve_tree(
    engine: &MergeEngine,
    path: &Utf8Path,
    tree: Map<String, Value>,
) -> Result<Map<String, Value>, StrataError> {
    let root = Value::Object(tree);
    let resolved = resolve_value(engine, path, &root, &root, &mut Vec::new())?;
    if let Value::Object(map) = resolved {
        Ok(map)
    } else {
        Ok(Map::new())
    }
}

fn resolve_value(
    engine: &MergeEngine,
    path: &Utf8Path,
    root: &Value,
    value: &Value,
    stack: &mut Vec<String>,
) -> Result<Value, StrataError> {
    match value {
        Value::String(text) => resolve_string(engine, path, root, text, stack),
        Value::Array(items) => items
            .iter()
            .map(|item| resolve_value(engine, path, root, item, stack))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => map
            .iter()
            .map(|(key, item)| {
                resolve_value(engine, path, root, item, stack).map(|v| (key.clone(), v))
            })
            .collect::<Result<Map<_, _>, _>>()
            .map(Value::Object),
        other => Ok(other.clone()),
    }
}

fn resolve_string(
    engine: &MergeEngine,
    path: &Utf8Path,
    root: &Value,
    text: &str,
    stack: &mut Vec<String>,
) -> Result<Value, StrataError> {
    if !text.contains("${") {
        return Ok(Value::String(text.to_owned()));
    }
    if let Some(reference) = full_reference(text) {
        return resolve_reference(engine, path, root, reference, stack);
    }
    let mut out = String::new();
    let mut cursor = 0;
    for captures in reference_pattern().captures_iter(text) {
        let Some(whole) = captures.get(0) else { continue };
        let Some(reference) = captures.get(1) else { continue };
        out.push_str(text.get(cursor..whole.start()).unwrap_or_default());
        let resolved = resolve_reference(engine, path, root, reference.as_str(), stack)?;
        out.push_str(&scalar_text(path, reference.as_str(), &resolved)?);
        cursor = whole.end();
    }
    out.push_str(text.get(cursor..).unwrap_or_default());
    Ok(Value::String(out))
}

/// Returns the reference text when the whole string is a single `${...}`.
fn full_reference(text: &str) -> Option<&str> {
    let captures = reference_pattern().captures(text)?;
    let whole = captures.get(0)?;
    if whole.start() == 0 && whole.end() == text.len() {
        captures.get(1).map(|group| group.as_str())
    } else {
        None
    }
}

fn resolve_reference(
    engine: &MergeEngine,
    path: &Utf8Path,
    root: &Value,
    reference: &str,
    stack: &mut Vec<String>,
) -> Result<Value, StrataError> {
    if stack.iter().any(|seen| seen == reference) {
        let mut cycle: Vec<&str> = stack.iter().map(String::as_str).collect();
        cycle.push(reference);
        return Err(interpolation_error(
            path,
            reference,
            format!("circular reference: {}", cycle.join(" -> ")),
        ));
    }
    stack.push(reference.to_owned());
    let resolved = if let Some((name, argument)) = reference.split_once(':') {
        match engine.resolver(name) {
            Some(resolver) => {
                resolver(argument).map_err(|message| interpolation_error(path, reference, message))
            }
            None => Err(interpolation_error(
                path,
                reference,
                format!("no resolver registered for '{name}'"),
            )),
        }
    } else {
        match lookup(root, reference) {
            Some(found) => resolve_value(engine, path, root, found, stack),
            None => Err(interpolation_error(
                path,
                reference,
                "no such key in this document",
            )),
        }
    };
    stack.pop();
    resolved
}

fn lookup<'a>(root: &'a Value, dotted: &str) -> Option<&'a Value> {
    dotted.split('.').try_fold(root, |node, segment| {
        node.as_object().and_then(|map| map.get(segment))
    })
}

fn scalar_text(
    path: &Utf8Path,
    reference: &str,
    value: &Value,
) -> Result<String, StrataError> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Number(number) => Ok(number.to_string()),
        Value::Null => Ok("null".to_owned()),
        Value::Array(_) | Value::Object(_) => Err(interpolation_error(
            path,
            reference,
            "cannot splice a mapping or sequence into a string",
        )),
    }
}
