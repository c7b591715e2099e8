//! Structural JSON patch engine.
//!
//! Applies an ordered list of path-addressed operations
//! (`add`/`replace`/`remove`/`test`, `replace` by default) to a JSON
//! document supplied as text, and returns the pretty-printed result only if
//! every operation succeeded.
//!
//! Missing branches make mutating operations silent no-ops, so one patch
//! list can be applied best-effort across documents of varying shape. A
//! failed `test` assertion or script-like markup in a written value aborts
//! the batch with no observable effect.
//!
//! # Example
//!
//! ```
//! use apidef_json_patch::{execute, PatchOp};
//! use serde_json::json;
//!
//! let doc = r#"{"proxy": {"groups": [{"name": "default", "backup": true}]}}"#;
//! let ops = [PatchOp::replace(
//!     "$.proxy.groups[?(@.name == 'default')].backup",
//!     json!(false),
//! )];
//! let patched = execute(doc, &ops).unwrap();
//! assert!(patched.contains("\"backup\": false"));
//! ```

mod op;
pub use op::{OpKind, PatchOp};

mod sanitize;
pub use sanitize::find_unsafe;

mod execute;
pub use execute::{execute, PatchError};
