//! The patch engine: ordered, transactional application of operations.

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, trace};

use apidef_json_path::{
    resolve, resolve_mut, Aggregate, ParseError, PathEval, PathExpr, PathParser, Selector, Step,
};

use crate::op::{OpKind, PatchOp};
use crate::sanitize::find_unsafe;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PatchError {
    /// The document text is not valid JSON.
    #[error("malformed JSON document")]
    MalformedDocument,
    /// A path expression could not be parsed, or is illegal for its
    /// operation kind.
    #[error("malformed path expression '{path}': {reason}")]
    MalformedPathExpression { path: String, reason: String },
    /// A TEST assertion did not hold.
    #[error("test failed at '{path}'")]
    TestFailed { path: String },
    /// A written value carries script-like markup.
    #[error("unsafe content rejected: {fragment}")]
    UnsafeContent { fragment: String },
    /// The operation record itself is unusable (e.g. a missing value).
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

impl PatchError {
    fn bad_path(path: &str, source: ParseError) -> Self {
        PatchError::MalformedPathExpression {
            path: path.to_string(),
            reason: source.to_string(),
        }
    }
}

/// Apply `ops` in order to `document_text` and return the pretty-printed
/// result.
///
/// The engine works on a private copy parsed from the text; on any error the
/// copy is discarded, so the caller never observes a partially patched
/// document. Operations whose path does not resolve are silent no-ops for
/// ADD/REPLACE/REMOVE; TEST mismatches and unsafe written content abort the
/// whole batch.
pub fn execute(document_text: &str, ops: &[PatchOp]) -> Result<String, PatchError> {
    let mut doc: Value =
        serde_json::from_str(document_text).map_err(|_| PatchError::MalformedDocument)?;

    for op in ops {
        apply(&mut doc, op)?;
    }

    serde_json::to_string_pretty(&doc).map_err(|_| PatchError::MalformedDocument)
}

fn apply(doc: &mut Value, op: &PatchOp) -> Result<(), PatchError> {
    let path =
        PathParser::parse(&op.json_path).map_err(|e| PatchError::bad_path(&op.json_path, e))?;
    trace!(path = %op.json_path, kind = op.operation.as_str(), "applying operation");

    if path.aggregate.is_some() && op.operation != OpKind::Test {
        return Err(PatchError::MalformedPathExpression {
            path: op.json_path.clone(),
            reason: "aggregate calls are only valid in test operations".into(),
        });
    }

    match op.operation {
        OpKind::Add => {
            let value = required_value(op)?;
            screen(value)?;
            apply_write(doc, &path, value, true);
            Ok(())
        }
        OpKind::Replace => {
            let value = required_value(op)?;
            screen(value)?;
            apply_write(doc, &path, value, false);
            Ok(())
        }
        OpKind::Remove => {
            apply_remove(doc, &path);
            Ok(())
        }
        OpKind::Test => apply_test(doc, &path, op),
    }
}

fn required_value<'a>(op: &'a PatchOp) -> Result<&'a Value, PatchError> {
    op.value.as_ref().ok_or_else(|| {
        PatchError::InvalidOperation(format!("'{}' requires a value", op.operation.as_str()))
    })
}

fn screen(value: &Value) -> Result<(), PatchError> {
    match find_unsafe(value) {
        Some(fragment) => Err(PatchError::UnsafeContent {
            fragment: fragment.to_string(),
        }),
        None => Ok(()),
    }
}

/// Shared ADD/REPLACE write path.
///
/// Matched locations are written in place; ADD appends when the target is an
/// array. With zero matches the final segment is upserted onto any object
/// the parent path resolves to, and anything else is a silent no-op.
fn apply_write(doc: &mut Value, path: &PathExpr, value: &Value, append_to_arrays: bool) {
    let locations = PathEval::eval(path, doc);

    if locations.is_empty() {
        upsert_missing_key(doc, path, value);
        return;
    }

    for location in &locations {
        let Some(target) = resolve_mut(doc, location) else {
            continue;
        };
        match target {
            Value::Array(arr) if append_to_arrays => arr.push(value.clone()),
            other => *other = value.clone(),
        }
    }
}

fn upsert_missing_key(doc: &mut Value, path: &PathExpr, value: &Value) {
    let Some((parent, Selector::Name(key))) = path.split_last() else {
        return;
    };
    let key = key.clone();
    let parents = PathEval::eval(&parent, doc);
    if parents.is_empty() {
        debug!("write target does not resolve, skipping");
        return;
    }
    for location in &parents {
        if let Some(Value::Object(map)) = resolve_mut(doc, location) {
            map.insert(key.clone(), value.clone());
        }
    }
}

fn apply_remove(doc: &mut Value, path: &PathExpr) {
    let locations = PathEval::eval(path, doc);
    if locations.is_empty() {
        debug!("remove target does not resolve, skipping");
        return;
    }

    // Within one parent array the evaluator yields ascending indices, so
    // deleting in reverse keeps the remaining locations valid.
    for location in locations.iter().rev() {
        let Some((last, parent_steps)) = location.split_last() else {
            // Removing the document root is not expressible.
            continue;
        };
        let Some(parent) = resolve_mut(doc, parent_steps) else {
            continue;
        };
        match (parent, last) {
            (Value::Object(map), Step::Key(key)) => {
                map.shift_remove(key);
            }
            (Value::Array(arr), Step::Index(idx)) if *idx < arr.len() => {
                arr.remove(*idx);
            }
            _ => {}
        }
    }
}

fn apply_test(doc: &Value, path: &PathExpr, op: &PatchOp) -> Result<(), PatchError> {
    let expected = required_value(op)?;
    let locations = PathEval::eval(path, doc);
    if locations.is_empty() {
        return Err(PatchError::TestFailed {
            path: op.json_path.clone(),
        });
    }

    for location in &locations {
        let Some(actual) = resolve(doc, location) else {
            return Err(PatchError::TestFailed {
                path: op.json_path.clone(),
            });
        };
        let holds = match path.aggregate {
            Some(Aggregate::Length) => match actual {
                Value::Array(arr) => expected.as_f64() == Some(arr.len() as f64),
                _ => false,
            },
            None => actual == expected,
        };
        if !holds {
            debug!(path = %op.json_path, "test assertion failed");
            return Err(PatchError::TestFailed {
                path: op.json_path.clone(),
            });
        }
    }

    Ok(())
}
