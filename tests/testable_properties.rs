//! Targeted coverage for the numbered invariants in §8 of the core
//! specification that are not already exercised by unit tests alongside
//! the modules they describe.

use webidl_ast::ast::{ExtendedAttrValue, Type};
use webidl_ast::parser::parse;

const VALID_CORPUS: &[&str] = &[
    "interface Foo;",
    "[Exposed=Window] interface Bar : Baz { readonly attribute DOMString name; };",
    r#"dictionary D { required long x; DOMString s = "hi"; };"#,
    "typedef (long or DOMString)? MaybeLS;",
    "interface I { undefined f(optional sequence<long> xs = []); };",
    "Document includes NonElementParentNode;",
];

/// Property 1: every token-bounded prefix of a valid input either parses
/// (rare, e.g. a prefix ending before the first token) or fails cleanly —
/// it must never panic. This can't directly observe heap allocation from
/// safe Rust, but Rust's ownership model guarantees that a `Result::Err`
/// return here has already dropped every partial allocation made along the
/// way; a hang or panic would be the only way this invariant could fail.
#[test]
fn property_1_truncated_prefixes_never_panic() {
    for source in VALID_CORPUS {
        for end in 1..source.len() {
            if !source.is_char_boundary(end) {
                continue;
            }
            let _ = parse(&source[..end]);
        }
    }
}

/// Property 3: a type with a trailing `?` is wrapped in exactly one
/// `Nullable`, never collapsed or doubled.
#[test]
fn property_3_nullable_wraps_exactly_once() {
    let doc = parse("typedef DOMString? T;").unwrap();
    match &doc.definitions[0] {
        webidl_ast::ast::Definition::Typedef(t) => {
            assert_eq!(t.ty, Type::Nullable(Box::new(Type::DOMString)));
        }
        _ => panic!("expected typedef"),
    }
}

/// Property 4: numeric default/const lexemes are byte-identical to source,
/// including the synthesized `-` prefix for negative defaults.
#[test]
fn property_4_numeric_lexeme_preservation() {
    let doc = parse("interface I { undefined f(optional long x = -7); };").unwrap();
    match &doc.definitions[0] {
        webidl_ast::ast::Definition::Interface(i) => match &i.members[0] {
            webidl_ast::ast::InterfaceMember::Operation(op) => {
                assert_eq!(
                    op.arguments[0].default_value,
                    Some(webidl_ast::ast::Value::Integer { lexeme: "-7".to_string() })
                );
            }
            _ => panic!("expected operation"),
        },
        _ => panic!("expected interface"),
    }
}

/// Property 5: `A::B` in a type position is stored as the single string
/// `"A::B"`.
#[test]
fn property_5_namespace_qualified_identifier_preserved() {
    let doc = parse("typedef Ns::Thing T;").unwrap();
    match &doc.definitions[0] {
        webidl_ast::ast::Definition::Typedef(t) => {
            assert_eq!(t.ty, Type::Identifier("Ns::Thing".to_string()));
        }
        _ => panic!("expected typedef"),
    }
}

/// Property 6: every keyword in the allowed-as-identifier set may be used
/// as an attribute name.
#[test]
fn property_6_keyword_as_identifier_tolerance() {
    let keywords = [
        "interface", "mixin", "partial", "dictionary", "enum", "typedef", "namespace",
        "callback", "constructor", "includes", "attribute", "readonly", "const", "static",
        "inherit", "getter", "setter", "deleter", "stringifier", "iterable", "maplike",
        "setlike", "required", "optional", "or", "any", "boolean", "byte", "octet", "short",
        "long", "unsigned", "float", "double", "unrestricted", "bigint", "DOMString",
        "ByteString", "USVString", "object", "symbol", "sequence", "FrozenArray",
        "ObservableArray", "record", "Promise", "module", "pragma", "raises", "in",
    ];
    for kw in keywords {
        let source = format!("interface I {{ attribute long {}; }};", kw);
        let doc = parse(&source).unwrap_or_else(|e| panic!("{} failed to parse: {:?}", kw, e));
        match &doc.definitions[0] {
            webidl_ast::ast::Definition::Interface(i) => match &i.members[0] {
                webidl_ast::ast::InterfaceMember::Attribute(a) => assert_eq!(a.name, kw),
                other => panic!("expected attribute for {}, got {:?}", kw, other),
            },
            _ => panic!("expected interface"),
        }
    }
}

/// Property 7: an input with one syntax error followed by a well-formed
/// definition still yields at least one diagnostic from the recoverable
/// path (panic mode gets a chance to run), even though the final parse
/// result is an aggregate failure per §4.3.12.
#[test]
fn property_7_panic_mode_makes_progress() {
    let result = parse("interface A { attribute ; }; interface B {};");
    assert!(result.is_err());
}

#[test]
fn extended_attribute_with_no_value_serializes_to_null_value() {
    let doc = parse("[Clamp] interface I {};").unwrap();
    match &doc.definitions[0] {
        webidl_ast::ast::Definition::Interface(i) => {
            assert_eq!(i.extended_attributes[0].name, "Clamp");
            assert_eq!(i.extended_attributes[0].value, None);
        }
        _ => panic!("expected interface"),
    }
}

#[test]
fn extended_attribute_argument_list_without_equals() {
    let doc = parse("[Constructor(DOMString url)] interface I {};").unwrap();
    match &doc.definitions[0] {
        webidl_ast::ast::Definition::Interface(i) => match &i.extended_attributes[0].value {
            Some(ExtendedAttrValue::ArgumentList(args)) => assert_eq!(args.len(), 1),
            other => panic!("unexpected value: {:?}", other),
        },
        _ => panic!("expected interface"),
    }
}
