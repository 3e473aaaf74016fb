//! The Web IDL abstract syntax tree.
//!
//! Every identifier and literal is stored as an owned `String`, decoupling
//! the tree's lifetime from the source buffer and the token stream that
//! produced it (§4.2, §9 "Shared string storage"). Composite nodes own
//! their children through `Box`/`Vec`; there is no manual destructor code
//! because `Drop` is derived for every variant — a node cannot be reachable
//! without its children also being reachable, so nothing here can outlive
//! its owner or leak on an early return.

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub definitions: Vec<Definition>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Interface(Interface),
    InterfaceMixin(InterfaceMixin),
    Dictionary(Dictionary),
    Enum(Enum),
    Typedef(Typedef),
    Callback(Callback),
    CallbackInterface(CallbackInterface),
    Namespace(Namespace),
    Includes(Includes),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Interface {
    pub name: String,
    pub inherits: Option<String>,
    pub members: Vec<InterfaceMember>,
    pub extended_attributes: Vec<ExtendedAttribute>,
    pub partial: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceMixin {
    pub name: String,
    pub members: Vec<InterfaceMember>,
    pub extended_attributes: Vec<ExtendedAttribute>,
    pub partial: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InterfaceMember {
    Attribute(Attribute),
    Operation(Operation),
    Const(Const),
    Constructor(Constructor),
    Stringifier(Stringifier),
    Iterable(Iterable),
    AsyncIterable(AsyncIterable),
    Maplike(Maplike),
    Setlike(Setlike),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub ty: Type,
    pub readonly: bool,
    pub static_: bool,
    pub stringifier: bool,
    pub inherit: bool,
    pub extended_attributes: Vec<ExtendedAttribute>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialKind {
    Getter,
    Setter,
    Deleter,
    Stringifier,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub name: Option<String>,
    pub return_type: Type,
    pub arguments: Vec<Argument>,
    pub static_: bool,
    pub special: Option<SpecialKind>,
    pub extended_attributes: Vec<ExtendedAttribute>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: String,
    pub ty: Type,
    pub optional: bool,
    pub variadic: bool,
    pub default_value: Option<Value>,
    pub extended_attributes: Vec<ExtendedAttribute>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constructor {
    pub arguments: Vec<Argument>,
    pub extended_attributes: Vec<ExtendedAttribute>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Const {
    pub name: String,
    pub ty: Type,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stringifier {
    Keyword,
    Attribute(Box<Attribute>),
    Operation(Box<Operation>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Iterable {
    pub key_type: Option<Type>,
    pub value_type: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AsyncIterable {
    pub key_type: Option<Type>,
    pub value_type: Type,
    pub arguments: Option<Vec<Argument>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Maplike {
    pub key_type: Type,
    pub value_type: Type,
    pub readonly: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Setlike {
    pub value_type: Type,
    pub readonly: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dictionary {
    pub name: String,
    pub inherits: Option<String>,
    pub members: Vec<DictionaryMember>,
    pub extended_attributes: Vec<ExtendedAttribute>,
    pub partial: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DictionaryMember {
    pub name: String,
    pub ty: Type,
    pub required: bool,
    pub default_value: Option<Value>,
    pub extended_attributes: Vec<ExtendedAttribute>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enum {
    pub name: String,
    pub values: Vec<String>,
    pub extended_attributes: Vec<ExtendedAttribute>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Typedef {
    pub name: String,
    pub ty: Type,
    pub extended_attributes: Vec<ExtendedAttribute>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Callback {
    pub name: String,
    pub return_type: Type,
    pub arguments: Vec<Argument>,
    pub extended_attributes: Vec<ExtendedAttribute>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallbackInterface {
    pub name: String,
    pub members: Vec<InterfaceMember>,
    pub extended_attributes: Vec<ExtendedAttribute>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Namespace {
    pub name: String,
    pub members: Vec<InterfaceMember>,
    pub extended_attributes: Vec<ExtendedAttribute>,
    pub partial: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Includes {
    pub interface: String,
    pub mixin: String,
}

/// A Web IDL type. Composite variants own their inner type through `Box`;
/// `Union` owns its member list through `Vec`. At most one `Nullable` may
/// wrap any given type position (§3.4); implementations must never collapse
/// nested `?` — the grammar itself forbids `??`, so this invariant is
/// enforced by construction, not by a runtime check.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Any,
    Undefined,
    Boolean,
    Byte,
    Octet,
    Short,
    UnsignedShort,
    Long,
    UnsignedLong,
    LongLong,
    UnsignedLongLong,
    Float,
    UnrestrictedFloat,
    Double,
    UnrestrictedDouble,
    BigInt,
    DOMString,
    ByteString,
    USVString,
    Object,
    Symbol,
    Identifier(String),
    Sequence(Box<Type>),
    FrozenArray(Box<Type>),
    ObservableArray(Box<Type>),
    Record(Box<Type>, Box<Type>),
    Promise(Box<Type>),
    Nullable(Box<Type>),
    Union(Vec<Type>),
}

/// A default or const literal value. Integer and float lexemes are
/// preserved verbatim so the serializer can emit the original source form
/// (`0x0F`, `1.0e3`, `-42`) without canonicalizing it (§3.2, §4.2).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer { lexeme: String },
    Float { lexeme: String },
    String(String),
    EmptySequence,
    EmptyDictionary,
    Infinity,
    NegativeInfinity,
    NaN,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtendedAttribute {
    pub name: String,
    pub value: Option<ExtendedAttrValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExtendedAttrValue {
    Identifier(String),
    IdentifierList(Vec<String>),
    ArgumentList(Vec<Argument>),
    NamedArgumentList { name: String, arguments: Vec<Argument> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nullable_wraps_exactly_once() {
        let ty = Type::Nullable(Box::new(Type::DOMString));
        match ty {
            Type::Nullable(inner) => assert_eq!(*inner, Type::DOMString),
            _ => panic!("expected Nullable"),
        }
    }

    #[test]
    fn union_preserves_order() {
        let ty = Type::Union(vec![Type::Long, Type::DOMString, Type::Boolean]);
        match ty {
            Type::Union(members) => {
                assert_eq!(members, vec![Type::Long, Type::DOMString, Type::Boolean]);
            }
            _ => panic!("expected Union"),
        }
    }

    #[test]
    fn document_default_is_empty() {
        let doc = Document::default();
        assert!(doc.definitions.is_empty());
    }
}
