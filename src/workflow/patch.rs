//! JSON Patch (RFC 6902) application over JSON Pointers (RFC 6901)
//!
//! Operations apply in order against a private copy of the document. The
//! first failing operation aborts the whole patch and the input document is
//! never touched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PatchError, PatchErrorKind};

/// A single patch operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    Add { path: String, value: Value },
    Remove { path: String },
    Replace { path: String, value: Value },
    Move { from: String, path: String },
    Copy { from: String, path: String },
    Test { path: String, value: Value },
}

impl PatchOperation {
    /// Target pointer of the operation
    pub fn path(&self) -> &str {
        match self {
            PatchOperation::Add { path, .. }
            | PatchOperation::Remove { path }
            | PatchOperation::Replace { path, .. }
            | PatchOperation::Move { path, .. }
            | PatchOperation::Copy { path, .. }
            | PatchOperation::Test { path, .. } => path,
        }
    }
}

/// Apply `ops` to a copy of `document` and return the patched copy
pub fn apply_patch(document: &Value, ops: &[PatchOperation]) -> Result<Value, PatchError> {
    let mut doc = document.clone();
    for (index, op) in ops.iter().enumerate() {
        apply_operation(&mut doc, op).map_err(|kind| kind.at(index))?;
    }
    Ok(doc)
}

fn apply_operation(doc: &mut Value, op: &PatchOperation) -> Result<(), PatchErrorKind> {
    match op {
        PatchOperation::Add { path, value } => add(doc, path, value.clone()),
        PatchOperation::Remove { path } => remove(doc, path).map(|_| ()),
        PatchOperation::Replace { path, value } => replace(doc, path, value.clone()),
        PatchOperation::Move { from, path } => {
            if from == path {
                return resolve(doc, from).map(|_| ());
            }
            if path.starts_with(from.as_str()) && path[from.len()..].starts_with('/') {
                return Err(PatchErrorKind::MoveIntoChild {
                    from: from.clone(),
                    pointer: path.clone(),
                });
            }
            let value = remove(doc, from)?;
            add(doc, path, value)
        }
        PatchOperation::Copy { from, path } => {
            let value = resolve(doc, from)?.clone();
            add(doc, path, value)
        }
        PatchOperation::Test { path, value } => {
            if json_equal(resolve(doc, path)?, value) {
                Ok(())
            } else {
                Err(PatchErrorKind::TestFailed {
                    pointer: path.clone(),
                })
            }
        }
    }
}

/// Split a pointer into unescaped reference tokens
pub fn parse_pointer(pointer: &str) -> Result<Vec<String>, PatchErrorKind> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    let rest = pointer
        .strip_prefix('/')
        .ok_or_else(|| PatchErrorKind::InvalidPointer {
            pointer: pointer.to_string(),
        })?;

    rest.split('/')
        .map(|token| unescape(token, pointer))
        .collect()
}

fn unescape(token: &str, pointer: &str) -> Result<String, PatchErrorKind> {
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(c) = chars.next() {
        if c != '~' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            _ => {
                return Err(PatchErrorKind::InvalidPointer {
                    pointer: pointer.to_string(),
                })
            }
        }
    }
    Ok(out)
}

/// Resolve a pointer to the value it references
pub fn resolve<'a>(doc: &'a Value, pointer: &str) -> Result<&'a Value, PatchErrorKind> {
    let mut current = doc;
    for token in parse_pointer(pointer)? {
        current = match current {
            Value::Object(map) => map.get(&token),
            Value::Array(items) => items.get(existing_index(&token, items.len(), pointer)?),
            _ => None,
        }
        .ok_or_else(|| not_found(pointer))?;
    }
    Ok(current)
}

fn resolve_mut<'a>(doc: &'a mut Value, tokens: &[String], pointer: &str) -> Result<&'a mut Value, PatchErrorKind> {
    let mut current = doc;
    for token in tokens {
        current = match current {
            Value::Object(map) => map.get_mut(token),
            Value::Array(items) => {
                let len = items.len();
                items.get_mut(existing_index(token, len, pointer)?)
            }
            _ => None,
        }
        .ok_or_else(|| not_found(pointer))?;
    }
    Ok(current)
}

/// Split into (parent tokens, last token); `None` for the root pointer
fn split_last(pointer: &str) -> Result<Option<(Vec<String>, String)>, PatchErrorKind> {
    let mut tokens = parse_pointer(pointer)?;
    Ok(tokens.pop().map(|last| (tokens, last)))
}

fn add(doc: &mut Value, pointer: &str, value: Value) -> Result<(), PatchErrorKind> {
    let Some((parent, last)) = split_last(pointer)? else {
        *doc = value;
        return Ok(());
    };

    match resolve_mut(doc, &parent, pointer)? {
        Value::Object(map) => {
            map.insert(last, value);
            Ok(())
        }
        Value::Array(items) => {
            if last == "-" {
                items.push(value);
                return Ok(());
            }
            let index = parse_index(&last, pointer)?;
            if index > items.len() {
                return Err(PatchErrorKind::IndexOutOfBounds {
                    pointer: pointer.to_string(),
                });
            }
            items.insert(index, value);
            Ok(())
        }
        _ => Err(not_found(pointer)),
    }
}

fn remove(doc: &mut Value, pointer: &str) -> Result<Value, PatchErrorKind> {
    let (parent, last) = split_last(pointer)?.ok_or(PatchErrorKind::RemoveRoot)?;

    match resolve_mut(doc, &parent, pointer)? {
        Value::Object(map) => map.remove(&last).ok_or_else(|| not_found(pointer)),
        Value::Array(items) => {
            let index = existing_index(&last, items.len(), pointer)?;
            Ok(items.remove(index))
        }
        _ => Err(not_found(pointer)),
    }
}

fn replace(doc: &mut Value, pointer: &str, value: Value) -> Result<(), PatchErrorKind> {
    let tokens = parse_pointer(pointer)?;
    *resolve_mut(doc, &tokens, pointer)? = value;
    Ok(())
}

fn parse_index(token: &str, pointer: &str) -> Result<usize, PatchErrorKind> {
    let invalid = || PatchErrorKind::InvalidIndex {
        pointer: pointer.to_string(),
        token: token.to_string(),
    };
    if token.is_empty()
        || !token.bytes().all(|b| b.is_ascii_digit())
        || (token.len() > 1 && token.starts_with('0'))
    {
        return Err(invalid());
    }
    token.parse().map_err(|_| invalid())
}

/// Index of an element that must already exist
fn existing_index(token: &str, len: usize, pointer: &str) -> Result<usize, PatchErrorKind> {
    if token == "-" {
        return Err(PatchErrorKind::IndexOutOfBounds {
            pointer: pointer.to_string(),
        });
    }
    let index = parse_index(token, pointer)?;
    if index >= len {
        return Err(PatchErrorKind::IndexOutOfBounds {
            pointer: pointer.to_string(),
        });
    }
    Ok(index)
}

fn not_found(pointer: &str) -> PatchErrorKind {
    PatchErrorKind::PathNotFound {
        pointer: pointer.to_string(),
    }
}

/// Structural equality where numbers compare by value (`1 == 1.0`)
fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                return x == y;
            }
            if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                return x == y;
            }
            x.as_f64() == y.as_f64()
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| json_equal(a, b))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).map_or(false, |w| json_equal(v, w)))
        }
        _ => a == b,
    }
}
