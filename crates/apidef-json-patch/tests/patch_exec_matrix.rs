use apidef_json_patch::{execute, OpKind, PatchError, PatchOp};
use serde_json::{json, Value};

fn exec_value(doc: &Value, ops: &[PatchOp]) -> Result<Value, PatchError> {
    let text = serde_json::to_string_pretty(doc).expect("fixture serializes");
    execute(&text, ops).map(|s| serde_json::from_str(&s).expect("engine output parses"))
}

#[test]
fn endpoint_override_via_nested_filters() {
    // A default-operation (replace) record deserialized from the wire form.
    let ops: Vec<PatchOp> = serde_json::from_value(json!([{
        "jsonPath": "$.proxy.groups[?(@.name=='default-group')].endpoints[?(@.name=='default')].backup",
        "value": false
    }]))
    .unwrap();

    let doc = json!({
        "id": "my-api",
        "proxy": {
            "groups": [{
                "name": "default-group",
                "endpoints": [
                    {"name": "default", "target": "https://upstream", "backup": true},
                    {"name": "other", "target": "https://other", "backup": true}
                ]
            }]
        }
    });

    let out = exec_value(&doc, &ops).unwrap();
    assert_eq!(
        out["proxy"]["groups"][0]["endpoints"][0]["backup"],
        json!(false)
    );
    // Everything else is untouched.
    assert_eq!(
        out["proxy"]["groups"][0]["endpoints"][1],
        doc["proxy"]["groups"][0]["endpoints"][1]
    );
    assert_eq!(out["id"], doc["id"]);
}

#[test]
fn noop_remove_then_effective_add() {
    let doc = json!({
        "proxy": {
            "groups": [{"name": "default-group", "endpoints": []}]
        }
    });

    let ops = [
        // Typo'd filter value: resolves to nothing, must not abort.
        PatchOp::remove("$.proxy.groups[?(@.name == 'default-gruop')]"),
        PatchOp::add(
            "$.proxy.groups[?(@.name == 'default-group')].endpoints",
            json!({"name": "default", "target": "https://upstream"}),
        ),
    ];

    let out = exec_value(&doc, &ops).unwrap();
    assert_eq!(out["proxy"]["groups"].as_array().unwrap().len(), 1);
    assert_eq!(
        out["proxy"]["groups"][0]["endpoints"][0]["name"],
        json!("default")
    );
}

#[test]
fn failed_test_leaves_no_partial_effect() {
    let doc = json!({"a": 1, "b": 2});
    let ops = [
        PatchOp::replace("$.a", json!(100)),
        PatchOp::test("$.b", json!(99)),
        PatchOp::replace("$.b", json!(200)),
    ];

    let err = exec_value(&doc, &ops).unwrap_err();
    assert!(matches!(err, PatchError::TestFailed { .. }));

    // Re-running without the failing assertion behaves as if the aborted
    // batch had never run.
    let ops_without_test = [
        PatchOp::replace("$.a", json!(100)),
        PatchOp::replace("$.b", json!(200)),
    ];
    let out = exec_value(&doc, &ops_without_test).unwrap();
    assert_eq!(out, json!({"a": 100, "b": 200}));
}

#[test]
fn unsafe_content_fails_fast() {
    let doc = json!({"description": "clean", "other": "untouched"});
    let ops = [
        PatchOp::replace("$.description", json!("still clean")),
        PatchOp::replace("$.other", json!("<script>document.cookie</script>")),
        // Never reached.
        PatchOp::replace("$.description", json!("after")),
    ];
    let err = exec_value(&doc, &ops).unwrap_err();
    assert_eq!(
        err,
        PatchError::UnsafeContent {
            fragment: "<script>document.cookie</script>".into()
        }
    );
}

#[test]
fn test_between_mutations_expresses_preconditions() {
    let doc = json!({"flows": []});
    let ops = [
        PatchOp::add("$.flows", json!({"name": "quota"})),
        PatchOp::test("$.flows.length()", json!(1)),
        PatchOp::add("$.flows", json!({"name": "rate-limit"})),
        PatchOp::test("$.flows.length()", json!(2)),
    ];
    let out = exec_value(&doc, &ops).unwrap();
    assert_eq!(out["flows"].as_array().unwrap().len(), 2);
}

#[test]
fn replace_applies_to_every_filter_match() {
    let doc = json!({
        "endpoints": [
            {"name": "a", "backup": true},
            {"name": "b", "backup": true},
            {"name": "c", "backup": false}
        ]
    });
    let ops = [PatchOp::replace(
        "$.endpoints[?(@.backup == true)].backup",
        json!(false),
    )];
    let out = exec_value(&doc, &ops).unwrap();
    for endpoint in out["endpoints"].as_array().unwrap() {
        assert_eq!(endpoint["backup"], json!(false));
    }
}

#[test]
fn operation_order_is_significant() {
    let doc = json!({"steps": []});
    let forward = [
        PatchOp::add("$.steps", json!(1)),
        PatchOp::add("$.steps", json!(2)),
    ];
    let reversed = [
        PatchOp::add("$.steps", json!(2)),
        PatchOp::add("$.steps", json!(1)),
    ];
    assert_eq!(
        exec_value(&doc, &forward).unwrap(),
        json!({"steps": [1, 2]})
    );
    assert_eq!(
        exec_value(&doc, &reversed).unwrap(),
        json!({"steps": [2, 1]})
    );
}

#[test]
fn malformed_inputs_surface_immediately() {
    assert_eq!(
        execute("not json at all", &[]).unwrap_err(),
        PatchError::MalformedDocument
    );

    let err = execute(
        "{}",
        &[PatchOp::remove("$.group[?(@.name ==")],
    )
    .unwrap_err();
    assert!(matches!(err, PatchError::MalformedPathExpression { .. }));
}

#[test]
fn wire_kind_parsing_covers_all_operations() {
    let ops: Vec<PatchOp> = serde_json::from_value(json!([
        {"jsonPath": "$.a", "operation": "add", "value": 1},
        {"jsonPath": "$.a", "operation": "replace", "value": 2},
        {"jsonPath": "$.a", "operation": "remove"},
        {"jsonPath": "$.a", "operation": "test", "value": 2}
    ]))
    .unwrap();
    assert_eq!(
        ops.iter().map(|o| o.operation).collect::<Vec<_>>(),
        vec![OpKind::Add, OpKind::Replace, OpKind::Remove, OpKind::Test]
    );
}
