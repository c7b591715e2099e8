//! Identifier reconciliation over an imported definition document.
//!
//! Rewrites the `id` of the root entity, of every plan, and of every page
//! so that re-importing the same logical entity yields stable identifiers,
//! while new or unmatched entities get deterministically derived ones.
//! Page `parentId` links are rewritten consistently: the hierarchy is
//! encoded by reference, not nesting, so ids are computed in a full first
//! pass and parent links rewritten in a second.

use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

use crate::derive::derive_id;
use crate::lookup::{IdentityLookup, LookupError};

#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A lookup collaborator failed for technical reasons.
    #[error("identity lookup failed")]
    Lookup(#[from] LookupError),
}

/// Rewrite the identifiers of `document` within an environment.
///
/// Only `id` and `parentId` fields are touched; every other field, and
/// object key order, passes through unchanged.
pub fn reconcile_ids<L: IdentityLookup>(
    environment_id: &str,
    mut document: Value,
    lookup: &L,
) -> Result<Value, ReconcileError> {
    let original_id = str_field(&document, "id").unwrap_or_default();
    let cross_id = str_field(&document, "crossId").filter(|c| !c.is_empty());

    let (root_id, root_matched) = match cross_id {
        Some(cross) => match lookup.find_api_by_cross_id(environment_id, &cross)? {
            Some(existing) => {
                debug!(cross_id = %cross, id = %existing.id, "root matched existing entity");
                (existing.id, true)
            }
            None => (derive_id(environment_id, &original_id), false),
        },
        // No external reference to match against: the entity is
        // unidentified and its id is rewritten unconditionally.
        None => (derive_id(environment_id, &original_id), false),
    };

    set_str(&mut document, "id", &root_id);

    reconcile_plans(&mut document, &root_id, root_matched, lookup)?;
    reconcile_pages(environment_id, &mut document, &root_id, root_matched, lookup)?;

    Ok(document)
}

fn reconcile_plans<L: IdentityLookup>(
    document: &mut Value,
    root_id: &str,
    root_matched: bool,
    lookup: &L,
) -> Result<(), ReconcileError> {
    // Plans can only be matched against a root that already exists.
    let known = if root_matched {
        known_by_cross_id(lookup.find_plans_by_api(root_id)?)
    } else {
        HashMap::new()
    };

    let Some(plans) = document.get_mut("plans").and_then(Value::as_array_mut) else {
        return Ok(());
    };

    for (index, plan) in plans.iter_mut().enumerate() {
        if !plan.is_object() {
            continue;
        }
        let new_id = child_id(plan, root_id, &known, &format!("plans[{index}]"));
        set_str(plan, "id", &new_id);
    }

    Ok(())
}

fn reconcile_pages<L: IdentityLookup>(
    environment_id: &str,
    document: &mut Value,
    root_id: &str,
    root_matched: bool,
    lookup: &L,
) -> Result<(), ReconcileError> {
    let known = if root_matched {
        known_by_cross_id(lookup.find_pages_by_api(environment_id, root_id)?)
    } else {
        HashMap::new()
    };

    let Some(pages) = document.get_mut("pages").and_then(Value::as_array_mut) else {
        return Ok(());
    };

    // Pass 1: compute every page's new id. A page's own id never depends on
    // its parent's, so one pass completes the old -> new map.
    let mut remapped: HashMap<String, String> = HashMap::new();
    for (index, page) in pages.iter_mut().enumerate() {
        if !page.is_object() {
            continue;
        }
        let original_id = str_field(page, "id").unwrap_or_default();
        let new_id = child_id(page, root_id, &known, &format!("pages[{index}]"));
        if !original_id.is_empty() {
            remapped.insert(original_id, new_id.clone());
        }
        set_str(page, "id", &new_id);
    }
    debug!(pages = remapped.len(), "page ids remapped");

    // Pass 2: rewrite parent links through the completed map. Input order
    // is not topological, which is why this cannot be fused with pass 1.
    for page in pages.iter_mut() {
        let Some(parent_id) = str_field(page, "parentId") else {
            continue;
        };
        if let Some(new_parent) = remapped.get(&parent_id) {
            set_str(page, "parentId", new_parent);
        }
    }

    Ok(())
}

/// The reconciled id of a plan or page.
///
/// An empty incoming id marks an entity that was never persisted: it is
/// always derived fresh (seeded by its array position, the only stable
/// name it has), even when its crossId matches. Otherwise a crossId match
/// preserves the existing id and anything else derives from the original.
fn child_id(
    entity: &Value,
    root_id: &str,
    known: &HashMap<String, String>,
    position: &str,
) -> String {
    let original_id = str_field(entity, "id").unwrap_or_default();
    if original_id.is_empty() {
        return derive_id(root_id, position);
    }

    str_field(entity, "crossId")
        .filter(|c| !c.is_empty())
        .and_then(|c| known.get(&c).cloned())
        .unwrap_or_else(|| derive_id(root_id, &original_id))
}

fn known_by_cross_id(entities: Vec<crate::lookup::EntityRef>) -> HashMap<String, String> {
    entities
        .into_iter()
        .filter_map(|e| e.cross_id.map(|c| (c, e.id)))
        .collect()
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn set_str(value: &mut Value, key: &str, new: &str) {
    if let Value::Object(map) = value {
        map.insert(key.to_string(), Value::String(new.to_string()));
    }
}
