//! Serializes a [`crate::ast::Document`] into the canonical document tree
//! described in §4.4: nested `serde_json::Value` maps and lists whose only
//! primitives are string, integer, float, boolean, null, list, and
//! ordered-key map. The serializer never mutates or aliases the AST it
//! walks (§6.2) and never fails — composing `serde_json::Value` directly
//! cannot error short of allocator exhaustion.

use serde_json::{json, Map, Value as Json};

use crate::ast::*;

/// Serialize a whole document to its canonical JSON document tree
/// (`{ "definitions": [...] }`, §4.4).
pub fn serialize(document: &Document) -> Json {
    let definitions: Vec<Json> = document.definitions.iter().map(serialize_definition).collect();
    json!({ "definitions": definitions })
}

fn tagged(tag: &str, value: Json) -> Json {
    let mut map = Map::new();
    map.insert(tag.to_string(), value);
    Json::Object(map)
}

fn serialize_definition(def: &Definition) -> Json {
    match def {
        Definition::Interface(i) => tagged("interface", serialize_interface(i)),
        Definition::InterfaceMixin(m) => tagged("interface_mixin", serialize_mixin(m)),
        Definition::Dictionary(d) => tagged("dictionary", serialize_dictionary(d)),
        Definition::Enum(e) => tagged("enum", serialize_enum(e)),
        Definition::Typedef(t) => tagged("typedef", serialize_typedef(t)),
        Definition::Callback(c) => tagged("callback", serialize_callback(c)),
        Definition::CallbackInterface(c) => {
            tagged("callback_interface", serialize_callback_interface(c))
        }
        Definition::Namespace(n) => tagged("namespace", serialize_namespace(n)),
        Definition::Includes(inc) => tagged("includes", serialize_includes(inc)),
    }
}

fn serialize_interface(i: &Interface) -> Json {
    json!({
        "name": i.name,
        "inherits": i.inherits,
        "partial": i.partial,
        "extended_attributes": serialize_ext_attrs(&i.extended_attributes),
        "members": i.members.iter().map(serialize_member).collect::<Vec<_>>(),
    })
}

fn serialize_mixin(m: &InterfaceMixin) -> Json {
    json!({
        "name": m.name,
        // Mixins never have a parent (§3.2); kept for key-set parity with
        // the interface/dictionary maps per §4.4.
        "inherits": Json::Null,
        "partial": m.partial,
        "extended_attributes": serialize_ext_attrs(&m.extended_attributes),
        "members": m.members.iter().map(serialize_member).collect::<Vec<_>>(),
    })
}

fn serialize_dictionary(d: &Dictionary) -> Json {
    json!({
        "name": d.name,
        "inherits": d.inherits,
        "partial": d.partial,
        "extended_attributes": serialize_ext_attrs(&d.extended_attributes),
        "members": d.members.iter().map(serialize_dictionary_member).collect::<Vec<_>>(),
    })
}

fn serialize_dictionary_member(m: &DictionaryMember) -> Json {
    json!({
        "name": m.name,
        "type": serialize_type(&m.ty),
        "required": m.required,
        "default_value": m.default_value.as_ref().map(serialize_value),
        "extended_attributes": serialize_ext_attrs(&m.extended_attributes),
    })
}

fn serialize_enum(e: &Enum) -> Json {
    json!({
        "name": e.name,
        "values": e.values,
        "extended_attributes": serialize_ext_attrs(&e.extended_attributes),
    })
}

fn serialize_typedef(t: &Typedef) -> Json {
    json!({
        "name": t.name,
        "type": serialize_type(&t.ty),
        "extended_attributes": serialize_ext_attrs(&t.extended_attributes),
    })
}

fn serialize_callback(c: &Callback) -> Json {
    json!({
        "name": c.name,
        "return_type": serialize_type(&c.return_type),
        "arguments": c.arguments.iter().map(serialize_argument).collect::<Vec<_>>(),
        "extended_attributes": serialize_ext_attrs(&c.extended_attributes),
    })
}

fn serialize_callback_interface(c: &CallbackInterface) -> Json {
    json!({
        "name": c.name,
        "members": c.members.iter().map(serialize_member).collect::<Vec<_>>(),
        "extended_attributes": serialize_ext_attrs(&c.extended_attributes),
    })
}

fn serialize_namespace(n: &Namespace) -> Json {
    json!({
        "name": n.name,
        // Namespaces never have a parent (§3.2); kept for key-set parity
        // with the interface/dictionary maps per §4.4.
        "inherits": Json::Null,
        "partial": n.partial,
        "extended_attributes": serialize_ext_attrs(&n.extended_attributes),
        "members": n.members.iter().map(serialize_member).collect::<Vec<_>>(),
    })
}

fn serialize_includes(inc: &Includes) -> Json {
    json!({
        "interface": inc.interface,
        "mixin": inc.mixin,
    })
}

fn serialize_member(member: &InterfaceMember) -> Json {
    match member {
        InterfaceMember::Attribute(a) => tagged("attribute", serialize_attribute(a)),
        InterfaceMember::Operation(o) => tagged("operation", serialize_operation(o)),
        InterfaceMember::Const(c) => tagged("const", serialize_const(c)),
        InterfaceMember::Constructor(c) => tagged("constructor", serialize_constructor(c)),
        InterfaceMember::Stringifier(s) => tagged("stringifier", serialize_stringifier(s)),
        InterfaceMember::Iterable(it) => tagged("iterable", serialize_iterable(it)),
        InterfaceMember::AsyncIterable(it) => {
            tagged("async_iterable", serialize_async_iterable(it))
        }
        InterfaceMember::Maplike(m) => tagged("maplike", serialize_maplike(m)),
        InterfaceMember::Setlike(s) => tagged("setlike", serialize_setlike(s)),
    }
}

fn serialize_attribute(a: &Attribute) -> Json {
    json!({
        "name": a.name,
        "type": serialize_type(&a.ty),
        "readonly": a.readonly,
        "static": a.static_,
        "stringifier": a.stringifier,
        "inherit": a.inherit,
        "extended_attributes": serialize_ext_attrs(&a.extended_attributes),
    })
}

fn serialize_operation(o: &Operation) -> Json {
    json!({
        "name": o.name,
        "return_type": serialize_type(&o.return_type),
        "arguments": o.arguments.iter().map(serialize_argument).collect::<Vec<_>>(),
        "static": o.static_,
        "special": o.special.map(serialize_special_kind),
        "extended_attributes": serialize_ext_attrs(&o.extended_attributes),
    })
}

fn serialize_special_kind(kind: SpecialKind) -> Json {
    Json::String(
        match kind {
            SpecialKind::Getter => "getter",
            SpecialKind::Setter => "setter",
            SpecialKind::Deleter => "deleter",
            SpecialKind::Stringifier => "stringifier",
        }
        .to_string(),
    )
}

fn serialize_argument(arg: &Argument) -> Json {
    json!({
        "name": arg.name,
        "type": serialize_type(&arg.ty),
        "optional": arg.optional,
        "variadic": arg.variadic,
        "default_value": arg.default_value.as_ref().map(serialize_value),
        "extended_attributes": serialize_ext_attrs(&arg.extended_attributes),
    })
}

fn serialize_constructor(c: &Constructor) -> Json {
    json!({
        "arguments": c.arguments.iter().map(serialize_argument).collect::<Vec<_>>(),
        "extended_attributes": serialize_ext_attrs(&c.extended_attributes),
    })
}

fn serialize_const(c: &Const) -> Json {
    json!({
        "name": c.name,
        "type": serialize_type(&c.ty),
        "value": serialize_value(&c.value),
    })
}

fn serialize_stringifier(s: &Stringifier) -> Json {
    match s {
        Stringifier::Keyword => Json::String("keyword".to_string()),
        Stringifier::Attribute(a) => json!({ "attribute": serialize_attribute(a) }),
        Stringifier::Operation(o) => json!({ "operation": serialize_operation(o) }),
    }
}

fn serialize_iterable(it: &Iterable) -> Json {
    json!({
        "key_type": it.key_type.as_ref().map(serialize_type),
        "value_type": serialize_type(&it.value_type),
    })
}

fn serialize_async_iterable(it: &AsyncIterable) -> Json {
    json!({
        "key_type": it.key_type.as_ref().map(serialize_type),
        "value_type": serialize_type(&it.value_type),
        "arguments": it
            .arguments
            .as_ref()
            .map(|args| args.iter().map(serialize_argument).collect::<Vec<_>>()),
    })
}

fn serialize_maplike(m: &Maplike) -> Json {
    json!({
        "key_type": serialize_type(&m.key_type),
        "value_type": serialize_type(&m.value_type),
        "readonly": m.readonly,
    })
}

fn serialize_setlike(s: &Setlike) -> Json {
    json!({
        "value_type": serialize_type(&s.value_type),
        "readonly": s.readonly,
    })
}

/// Primitive types are encoded as a plain string; composite types as a
/// single-entry map keyed by their constructor (§4.4).
fn serialize_type(ty: &Type) -> Json {
    match ty {
        Type::Any => Json::String("any".to_string()),
        Type::Undefined => Json::String("undefined".to_string()),
        Type::Boolean => Json::String("boolean".to_string()),
        Type::Byte => Json::String("byte".to_string()),
        Type::Octet => Json::String("octet".to_string()),
        Type::Short => Json::String("short".to_string()),
        Type::UnsignedShort => Json::String("unsigned short".to_string()),
        Type::Long => Json::String("long".to_string()),
        Type::UnsignedLong => Json::String("unsigned long".to_string()),
        Type::LongLong => Json::String("long long".to_string()),
        Type::UnsignedLongLong => Json::String("unsigned long long".to_string()),
        Type::Float => Json::String("float".to_string()),
        Type::UnrestrictedFloat => Json::String("unrestricted float".to_string()),
        Type::Double => Json::String("double".to_string()),
        Type::UnrestrictedDouble => Json::String("unrestricted double".to_string()),
        Type::BigInt => Json::String("bigint".to_string()),
        Type::DOMString => Json::String("DOMString".to_string()),
        Type::ByteString => Json::String("ByteString".to_string()),
        Type::USVString => Json::String("USVString".to_string()),
        Type::Object => Json::String("object".to_string()),
        Type::Symbol => Json::String("symbol".to_string()),
        Type::Identifier(name) => json!({ "identifier": name }),
        Type::Sequence(inner) => json!({ "sequence": serialize_type(inner) }),
        Type::FrozenArray(inner) => json!({ "frozen_array": serialize_type(inner) }),
        Type::ObservableArray(inner) => json!({ "observable_array": serialize_type(inner) }),
        Type::Record(key, value) => {
            json!({ "record": [serialize_type(key), serialize_type(value)] })
        }
        Type::Promise(inner) => json!({ "promise": serialize_type(inner) }),
        Type::Nullable(inner) => json!({ "nullable": serialize_type(inner) }),
        Type::Union(members) => {
            json!({ "union": members.iter().map(serialize_type).collect::<Vec<_>>() })
        }
    }
}

/// Integer and float values preserve their original lexeme so `0x0F`,
/// `1.0e3`, and `-42` round-trip without canonicalization (§4.4, §8
/// property 4).
fn serialize_value(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Boolean(b) => Json::Bool(*b),
        Value::Integer { lexeme } => json!({
            "value": parse_integer_lexeme(lexeme),
            "lexeme": lexeme,
        }),
        Value::Float { lexeme } => json!({
            "value": lexeme.parse::<f64>().ok(),
            "lexeme": lexeme,
        }),
        Value::String(s) => Json::String(s.clone()),
        Value::EmptySequence => Json::Array(Vec::new()),
        Value::EmptyDictionary => Json::Object(Map::new()),
        Value::Infinity => Json::String("Infinity".to_string()),
        Value::NegativeInfinity => Json::String("-Infinity".to_string()),
        Value::NaN => Json::String("NaN".to_string()),
    }
}

fn parse_integer_lexeme(lexeme: &str) -> Option<i64> {
    let (negative, rest) = match lexeme.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, lexeme),
    };
    let magnitude = if let Some(hex) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()?
    } else {
        rest.parse::<i64>().ok()?
    };
    Some(if negative { -magnitude } else { magnitude })
}

fn serialize_ext_attrs(attrs: &[ExtendedAttribute]) -> Json {
    Json::Array(attrs.iter().map(serialize_ext_attr).collect())
}

fn serialize_ext_attr(attr: &ExtendedAttribute) -> Json {
    json!({
        "name": attr.name,
        "value": attr.value.as_ref().map(serialize_ext_attr_value),
    })
}

fn serialize_ext_attr_value(value: &ExtendedAttrValue) -> Json {
    match value {
        ExtendedAttrValue::Identifier(id) => json!({ "identifier": id }),
        ExtendedAttrValue::IdentifierList(items) => json!({ "identifier_list": items }),
        ExtendedAttrValue::ArgumentList(args) => {
            json!({ "argument_list": args.iter().map(serialize_argument).collect::<Vec<_>>() })
        }
        ExtendedAttrValue::NamedArgumentList { name, arguments } => json!({
            "named_argument_list": {
                "name": name,
                "arguments": arguments.iter().map(serialize_argument).collect::<Vec<_>>(),
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn forward_declaration_shape() {
        let doc = parse("interface Foo;").unwrap();
        let out = serialize(&doc);
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
    fn mixin_and_namespace_carry_null_inherits_for_key_parity() {
        let doc = parse("interface mixin Mix {}; namespace NS {};").unwrap();
        let out = serialize(&doc);
        assert_eq!(out["definitions"][0]["interface_mixin"]["inherits"], json!(null));
        assert_eq!(out["definitions"][1]["namespace"]["inherits"], json!(null));
    }

    #[test]
    fn includes_shape() {
        let doc = parse("Document includes NonElementParentNode;").unwrap();
        let out = serialize(&doc);
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
    fn nullable_union_typedef_shape() {
        let doc = parse("typedef (long or DOMString)? MaybeLS;").unwrap();
        let out = serialize(&doc);
        let ty = &out["definitions"][0]["typedef"]["type"];
        assert_eq!(
            ty,
            &json!({ "nullable": { "union": ["long", "DOMString"] } })
        );
    }

    #[test]
    fn integer_lexeme_preserved_for_hex_and_negative() {
        let doc = parse("interface I { const long a = 0x0F; const long b = -42; };").unwrap();
        let out = serialize(&doc);
        let members = &out["definitions"][0]["interface"]["members"];
        assert_eq!(
            members[0]["const"]["value"],
            json!({ "value": 15, "lexeme": "0x0F" })
        );
        assert_eq!(
            members[1]["const"]["value"],
            json!({ "value": -42, "lexeme": "-42" })
        );
    }

    #[test]
    fn stringifier_keyword_form_emits_plain_string() {
        let doc = parse("interface I { stringifier; };").unwrap();
        let out = serialize(&doc);
        assert_eq!(
            out["definitions"][0]["interface"]["members"][0]["stringifier"],
            json!("keyword")
        );
    }

    #[test]
    fn empty_sequence_and_dictionary_defaults() {
        let doc = parse(
            "interface I { undefined f(optional sequence<long> xs = [], optional record<DOMString, long> rs = {}); };",
        )
        .unwrap();
        let out = serialize(&doc);
        let args = &out["definitions"][0]["interface"]["members"][0]["operation"]["arguments"];
        assert_eq!(args[0]["default_value"], json!([]));
        assert_eq!(args[1]["default_value"], json!({}));
    }
}
