//! Patch operation model.
//!
//! On the wire a patch is a JSON array of `{jsonPath, operation, value}`
//! records; `operation` defaults to `replace` when omitted.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The kind of mutation (or assertion) a patch operation performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Add,
    #[default]
    Replace,
    Remove,
    Test,
}

impl OpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Add => "add",
            OpKind::Replace => "replace",
            OpKind::Remove => "remove",
            OpKind::Test => "test",
        }
    }
}

/// A single path-addressed operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchOp {
    /// Path expression selecting the operation's target location(s).
    pub json_path: String,
    #[serde(default)]
    pub operation: OpKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl PatchOp {
    pub fn add(json_path: impl Into<String>, value: Value) -> Self {
        Self {
            json_path: json_path.into(),
            operation: OpKind::Add,
            value: Some(value),
        }
    }

    pub fn replace(json_path: impl Into<String>, value: Value) -> Self {
        Self {
            json_path: json_path.into(),
            operation: OpKind::Replace,
            value: Some(value),
        }
    }

    pub fn remove(json_path: impl Into<String>) -> Self {
        Self {
            json_path: json_path.into(),
            operation: OpKind::Remove,
            value: None,
        }
    }

    pub fn test(json_path: impl Into<String>, value: Value) -> Self {
        Self {
            json_path: json_path.into(),
            operation: OpKind::Test,
            value: Some(value),
        }
    }
}
