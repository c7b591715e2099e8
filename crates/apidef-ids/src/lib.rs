//! Deterministic identifier derivation and import-time id reconciliation.
//!
//! Importing an API definition twice must not duplicate entities: the
//! reconciler rewrites every identifier in the document either to the id of
//! the logically-same entity already known to the system (matched through
//! its `crossId` external reference) or to a deterministically derived
//! fresh one, preserving the page forest's parent links across the rewrite.
//!
//! The existing-entity question is answered by an [`IdentityLookup`]
//! collaborator supplied by the caller; the reconciler itself performs no
//! I/O and holds no state between calls.

mod derive;
pub use derive::derive_id;

mod lookup;
pub use lookup::{ApiRef, EntityRef, IdentityLookup, LookupError};

mod reconcile;
pub use reconcile::{reconcile_ids, ReconcileError};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    /// In-memory lookup double.
    #[derive(Default)]
    struct FakeLookup {
        api: Option<(String, String, ApiRef)>,
        plans: Vec<EntityRef>,
        pages: Vec<EntityRef>,
        fail: bool,
    }

    impl IdentityLookup for FakeLookup {
        fn find_api_by_cross_id(
            &self,
            environment_id: &str,
            cross_id: &str,
        ) -> Result<Option<ApiRef>, LookupError> {
            if self.fail {
                return Err(LookupError::new("storage unavailable"));
            }
            Ok(self.api.as_ref().and_then(|(env, cross, api)| {
                (env == environment_id && cross == cross_id).then(|| api.clone())
            }))
        }

        fn find_plans_by_api(&self, _api_id: &str) -> Result<Vec<EntityRef>, LookupError> {
            Ok(self.plans.clone())
        }

        fn find_pages_by_api(
            &self,
            _environment_id: &str,
            _api_id: &str,
        ) -> Result<Vec<EntityRef>, LookupError> {
            Ok(self.pages.clone())
        }
    }

    fn reconcile(doc: Value, lookup: &FakeLookup) -> Value {
        reconcile_ids("uat", doc, lookup).unwrap()
    }

    #[test]
    fn unidentified_root_gets_derived_id() {
        let out = reconcile(json!({"id": "my-api-1"}), &FakeLookup::default());
        assert_eq!(out["id"], json!(derive_id("uat", "my-api-1")));
    }

    #[test]
    fn unidentified_root_without_id_is_still_rewritten() {
        let out = reconcile(json!({"name": "nameless"}), &FakeLookup::default());
        assert_eq!(out["id"], json!(derive_id("uat", "")));
        assert_eq!(out["name"], json!("nameless"));
    }

    #[test]
    fn empty_cross_id_is_treated_as_absent() {
        let out = reconcile(json!({"id": "a", "crossId": ""}), &FakeLookup::default());
        assert_eq!(out["id"], json!(derive_id("uat", "a")));
    }

    #[test]
    fn matched_root_keeps_existing_id() {
        let lookup = FakeLookup {
            api: Some((
                "uat".into(),
                "api-cross".into(),
                ApiRef { id: "existing-api-id".into() },
            )),
            ..Default::default()
        };
        let out = reconcile(
            json!({"id": "whatever-the-export-said", "crossId": "api-cross"}),
            &lookup,
        );
        assert_eq!(out["id"], json!("existing-api-id"));
    }

    #[test]
    fn cross_id_match_in_other_environment_does_not_count() {
        let lookup = FakeLookup {
            api: Some((
                "prod".into(),
                "api-cross".into(),
                ApiRef { id: "existing-api-id".into() },
            )),
            ..Default::default()
        };
        let out = reconcile(json!({"id": "a", "crossId": "api-cross"}), &lookup);
        assert_eq!(out["id"], json!(derive_id("uat", "a")));
    }

    #[test]
    fn unmatched_root_derives_all_plans() {
        let out = reconcile(
            json!({
                "id": "my-api-1",
                "plans": [
                    {"id": "plan-1", "crossId": "ignored-without-root-match"},
                    {"id": "plan-2"}
                ]
            }),
            &FakeLookup::default(),
        );
        let root_id = derive_id("uat", "my-api-1");
        assert_eq!(out["plans"][0]["id"], json!(derive_id(&root_id, "plan-1")));
        assert_eq!(out["plans"][1]["id"], json!(derive_id(&root_id, "plan-2")));
    }

    #[test]
    fn matched_plan_keeps_existing_id() {
        let lookup = FakeLookup {
            api: Some((
                "uat".into(),
                "api-cross".into(),
                ApiRef { id: "existing-api-id".into() },
            )),
            plans: vec![EntityRef {
                id: "existing-plan-id".into(),
                cross_id: Some("plan-cross".into()),
            }],
            ..Default::default()
        };
        let out = reconcile(
            json!({
                "id": "x",
                "crossId": "api-cross",
                "plans": [
                    {"id": "incoming-plan-id", "crossId": "plan-cross"},
                    {"id": "unknown-plan-id", "crossId": "no-such-cross"}
                ]
            }),
            &lookup,
        );
        assert_eq!(out["plans"][0]["id"], json!("existing-plan-id"));
        assert_eq!(
            out["plans"][1]["id"],
            json!(derive_id("existing-api-id", "unknown-plan-id"))
        );
    }

    #[test]
    fn blank_plan_id_is_never_preserved() {
        let lookup = FakeLookup {
            api: Some((
                "uat".into(),
                "api-cross".into(),
                ApiRef { id: "existing-api-id".into() },
            )),
            plans: vec![EntityRef {
                id: "existing-plan-id".into(),
                cross_id: Some("plan-cross".into()),
            }],
            ..Default::default()
        };
        let out = reconcile(
            json!({
                "id": "x",
                "crossId": "api-cross",
                "plans": [{"id": "", "crossId": "plan-cross"}]
            }),
            &lookup,
        );
        assert_ne!(out["plans"][0]["id"], json!("existing-plan-id"));
        assert_ne!(out["plans"][0]["id"], json!(""));
    }

    #[test]
    fn two_blank_plan_ids_stay_distinct() {
        let out = reconcile(
            json!({"id": "a", "plans": [{"id": ""}, {"id": ""}]}),
            &FakeLookup::default(),
        );
        assert_ne!(out["plans"][0]["id"], out["plans"][1]["id"]);
    }

    #[test]
    fn page_parent_links_follow_id_rewrites() {
        let out = reconcile(
            json!({
                "id": "a",
                "pages": [
                    // Child listed before its parent: order is not topological.
                    {"id": "child", "parentId": "parent"},
                    {"id": "parent"},
                    {"id": "grandchild", "parentId": "child"}
                ]
            }),
            &FakeLookup::default(),
        );
        let pages = out["pages"].as_array().unwrap();
        assert_eq!(pages[0]["parentId"], pages[1]["id"]);
        assert_eq!(pages[2]["parentId"], pages[0]["id"]);
    }

    #[test]
    fn unknown_parent_reference_passes_through() {
        let out = reconcile(
            json!({"id": "a", "pages": [{"id": "p", "parentId": "not-in-this-import"}]}),
            &FakeLookup::default(),
        );
        assert_eq!(out["pages"][0]["parentId"], json!("not-in-this-import"));
    }

    #[test]
    fn matched_page_keeps_existing_id_and_children_follow() {
        let lookup = FakeLookup {
            api: Some((
                "uat".into(),
                "api-cross".into(),
                ApiRef { id: "existing-api-id".into() },
            )),
            pages: vec![EntityRef {
                id: "existing-page-id".into(),
                cross_id: Some("page-cross".into()),
            }],
            ..Default::default()
        };
        let out = reconcile(
            json!({
                "id": "x",
                "crossId": "api-cross",
                "pages": [
                    {"id": "old-parent", "crossId": "page-cross"},
                    {"id": "old-child", "parentId": "old-parent"}
                ]
            }),
            &lookup,
        );
        assert_eq!(out["pages"][0]["id"], json!("existing-page-id"));
        assert_eq!(out["pages"][1]["parentId"], json!("existing-page-id"));
    }

    #[test]
    fn other_fields_are_untouched() {
        let out = reconcile(
            json!({
                "id": "a",
                "name": "My API",
                "plans": [{"id": "p", "name": "keyless", "security": "KEY_LESS"}]
            }),
            &FakeLookup::default(),
        );
        assert_eq!(out["name"], json!("My API"));
        assert_eq!(out["plans"][0]["name"], json!("keyless"));
        assert_eq!(out["plans"][0]["security"], json!("KEY_LESS"));
    }

    #[test]
    fn lookup_failure_propagates() {
        let lookup = FakeLookup { fail: true, ..Default::default() };
        let err = reconcile_ids("uat", json!({"id": "a", "crossId": "c"}), &lookup).unwrap_err();
        assert!(matches!(err, ReconcileError::Lookup(_)));
    }
}
