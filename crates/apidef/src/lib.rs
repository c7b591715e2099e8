//! API-definition import core.
//!
//! Two independent components over raw JSON definition documents:
//!
//! - [`reconcile_ids`] normalizes entity identity on import: the root
//!   entity, its plans, and its page forest either keep the id of the
//!   logically-same entity already known to the system or receive a
//!   deterministically derived fresh one.
//! - [`execute`] applies an ordered list of path-addressed operations
//!   (add/replace/remove/test) to a document, transactionally and with
//!   content-safety screening.
//!
//! A typical import first reconciles identifiers, then applies
//! administrative patch overrides to the result; the components share no
//! state and can be used separately.

pub use apidef_ids::{
    derive_id, reconcile_ids, ApiRef, EntityRef, IdentityLookup, LookupError, ReconcileError,
};
pub use apidef_json_patch::{execute, find_unsafe, OpKind, PatchError, PatchOp};
pub use apidef_json_path::{resolve, resolve_mut, ParseError, PathEval, PathParser};
