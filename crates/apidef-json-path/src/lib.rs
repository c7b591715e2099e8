//! Path-expression language for addressing locations inside JSON documents.
//!
//! This crate provides the parsing and evaluation half of the structural
//! patch engine: a `$`-rooted expression selects zero or more locations in a
//! document via field access, array indexing, wildcards, and predicate-based
//! element filters, with an optional trailing `length()` aggregate.
//!
//! # Example
//!
//! ```
//! use apidef_json_path::{PathParser, PathEval, resolve};
//! use serde_json::json;
//!
//! let doc = json!({
//!     "proxy": {
//!         "groups": [
//!             {"name": "default-group", "weight": 1},
//!             {"name": "failover", "weight": 2}
//!         ]
//!     }
//! });
//!
//! let path = PathParser::parse("$.proxy.groups[?(@.name == 'failover')].weight").unwrap();
//! let locations = PathEval::eval(&path, &doc);
//! assert_eq!(locations.len(), 1);
//! assert_eq!(resolve(&doc, &locations[0]), Some(&json!(2)));
//! ```

mod types;
pub use types::*;

mod parser;
pub use parser::{ParseError, PathParser};

mod eval;
pub use eval::{resolve, resolve_mut, PathEval};
