use firestore_seed_core::seed::APP_ID_PLACEHOLDER;
use firestore_seed_core::substitute::{resolve_document_id, substitute, substitute_fields};
use serde_json::json;

const APP_ID: &str = "app-123";

#[test]
fn values_without_the_token_are_returned_unchanged() {
    let cases = vec![
        json!(null),
        json!(true),
        json!(42),
        json!(-1.5),
        json!(""),
        json!("app_id_guid"),
        json!("prefix-APP_ID_GUID"),
        json!("APP_ID_GUID-suffix"),
        json!([1, "two", null, [false]]),
        json!({ "nested": { "deep": ["x", 3] } }),
    ];
    for value in cases {
        assert_eq!(substitute(&value, APP_ID), value, "value changed: {value}");
    }
}

#[test]
fn the_token_itself_becomes_the_identifier() {
    assert_eq!(substitute(&json!(APP_ID_PLACEHOLDER), APP_ID), json!(APP_ID));
}

#[test]
fn tokens_are_replaced_at_any_depth_and_structure_is_kept() {
    let value = json!({
        "owner": "APP_ID_GUID",
        "tags": ["x", "APP_ID_GUID", ["APP_ID_GUID", 7]],
        "meta": { "app": { "id": "APP_ID_GUID", "count": 2 } },
        "label": "APP_ID_GUID is not replaced inside text"
    });
    let expected = json!({
        "owner": "app-123",
        "tags": ["x", "app-123", ["app-123", 7]],
        "meta": { "app": { "id": "app-123", "count": 2 } },
        "label": "APP_ID_GUID is not replaced inside text"
    });
    assert_eq!(substitute(&value, APP_ID), expected);
}

#[test]
fn object_keys_are_not_substituted() {
    let value = json!({ "APP_ID_GUID": "APP_ID_GUID" });
    assert_eq!(substitute(&value, APP_ID), json!({ "APP_ID_GUID": "app-123" }));
}

#[test]
fn substitution_does_not_touch_the_input() {
    let value = json!(["APP_ID_GUID"]);
    let _ = substitute(&value, APP_ID);
    assert_eq!(value, json!(["APP_ID_GUID"]));
}

#[test]
fn field_maps_are_substituted_value_by_value() {
    let fields = json!({ "a": 1, "b": "APP_ID_GUID" });
    let fields = fields.as_object().expect("object").clone();
    let out = substitute_fields(&fields, APP_ID);
    assert_eq!(serde_json::Value::Object(out), json!({ "a": 1, "b": "app-123" }));
}

#[test]
fn document_ids_resolve_only_on_exact_match() {
    assert_eq!(resolve_document_id("APP_ID_GUID", APP_ID), APP_ID);
    assert_eq!(resolve_document_id("u1", APP_ID), "u1");
    assert_eq!(resolve_document_id("APP_ID_GUID_2", APP_ID), "APP_ID_GUID_2");
}
