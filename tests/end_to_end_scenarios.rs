//! End-to-end scenarios S1–S7 from the core specification: literal IDL
//! inputs checked against their expected document shape.

use serde_json::json;
use webidl_ast::api::{parse_and_serialize, ProcessArgs};
use webidl_ast::{parser, serializer};

fn serialize_source(source: &str) -> serde_json::Value {
    let doc = parser::parse(source).expect("source should parse");
    serializer::serialize(&doc)
}

#[test]
fn s1_forward_declaration() {
    let out = serialize_source("interface Foo;");
    assert_eq!(
        out,
        json!({
            "definitions": [
                { "interface": {
                    "name": "Foo",
                    "inherits": null,
                    "partial": false,
                    "extended_attributes": [],
                    "members": [],
                } }
            ]
        })
    );
}

#[test]
fn s2_interface_with_exposed_and_readonly_attribute() {
    let out = serialize_source(
        "[Exposed=Window] interface Bar : Baz { readonly attribute DOMString name; };",
    );
    let interface = &out["definitions"][0]["interface"];
    assert_eq!(interface["name"], "Bar");
    assert_eq!(interface["inherits"], "Baz");
    assert_eq!(interface["partial"], false);
    assert_eq!(
        interface["extended_attributes"][0],
        json!({ "name": "Exposed", "value": { "identifier": "Window" } })
    );
    assert_eq!(
        interface["members"][0],
        json!({ "attribute": {
            "name": "name",
            "type": "DOMString",
            "readonly": true,
            "static": false,
            "stringifier": false,
            "inherit": false,
            "extended_attributes": [],
        } })
    );
}

#[test]
fn s3_dictionary_required_and_default() {
    let out = serialize_source(r#"dictionary D { required long x; DOMString s = "hi"; };"#);
    let members = &out["definitions"][0]["dictionary"]["members"];
    assert_eq!(
        members[0],
        json!({
            "name": "x", "type": "long", "required": true,
            "default_value": null, "extended_attributes": [],
        })
    );
    assert_eq!(
        members[1],
        json!({
            "name": "s", "type": "DOMString", "required": false,
            "default_value": "hi", "extended_attributes": [],
        })
    );
}

#[test]
fn s4_typedef_nullable_union() {
    let out = serialize_source("typedef (long or DOMString)? MaybeLS;");
    assert_eq!(
        out["definitions"][0]["typedef"]["type"],
        json!({ "nullable": { "union": ["long", "DOMString"] } })
    );
}

#[test]
fn s5_operation_with_optional_sequence_default() {
    let out = serialize_source(
        "interface I { undefined f(optional sequence<long> xs = []); };",
    );
    let op = &out["definitions"][0]["interface"]["members"][0]["operation"];
    assert_eq!(op["name"], "f");
    assert_eq!(op["return_type"], "undefined");
    assert_eq!(op["arguments"][0]["name"], "xs");
    assert_eq!(op["arguments"][0]["type"], json!({ "sequence": "long" }));
    assert_eq!(op["arguments"][0]["optional"], true);
    assert_eq!(op["arguments"][0]["default_value"], json!([]));
}

#[test]
fn s6_includes_statement() {
    let out = serialize_source("Document includes NonElementParentNode;");
    assert_eq!(
        out,
        json!({
            "definitions": [
                { "includes": { "interface": "Document", "mixin": "NonElementParentNode" } }
            ]
        })
    );
}

#[test]
fn s7_error_recovery_reports_and_continues() {
    let err = parser::parse("interface A { attribute ; }; interface B {};")
        .expect_err("malformed input should fail the whole parse");
    match err {
        webidl_ast::error::Error::UnexpectedToken { .. } => {}
        other => panic!("expected UnexpectedToken, got {:?}", other),
    }
}

#[test]
fn api_parse_and_serialize_pretty_contains_newlines() {
    let args = ProcessArgs {
        content: "interface Foo;".to_string(),
        source_path: "foo.idl".to_string(),
        pretty: true,
    };
    let out = parse_and_serialize(args).unwrap();
    assert!(out.contains('\n'));
}
