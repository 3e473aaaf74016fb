//! Recursive-descent parser over the token stream produced by [`crate::lexer`].
//!
//! The parser is a state machine with one backtracking mechanism
//! (speculative parse + rollback) and one error-recovery mechanism
//! (panic-mode synchronization at the top-level definition loop). Both are
//! described in §4.3 of the specification this module implements.

use crate::ast::*;
use crate::error::Error;
use crate::lexer::{Cursor, Lexer, Token, TokenKind};

/// Parses a complete Web IDL document.
///
/// Returns either a fully populated [`Document`], or — if one or more
/// definitions were malformed — the *first* error encountered, at its own
/// line and column, even though panic-mode recovery went on to skip past it
/// and kept parsing later definitions (§4.3.11, §7). A lexical error aborts
/// immediately without synchronizing, per §7.
pub fn parse(source: &str) -> Result<Document, Error> {
    let mut parser = Parser::new(source);
    parser.parse_document()
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    previous: Token<'a>,
    current: Token<'a>,
    panic_mode: bool,
}

/// A snapshot of the parser's full backtracking state: the lexer cursor
/// plus the two-token window. Restoration is O(1) and allocates nothing,
/// as required by §9 "Speculative parsing".
struct Snapshot<'a> {
    cursor: Cursor,
    previous: Token<'a>,
    current: Token<'a>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        let mut lexer = Lexer::new(source);
        let first = lexer
            .next_token()
            .unwrap_or(Token { kind: TokenKind::Eof, lexeme: "", line: 1, column: 1 });
        Parser {
            lexer,
            previous: first,
            current: first,
            panic_mode: false,
        }
    }

    // ---- token stream plumbing ----------------------------------------

    fn advance(&mut self) -> Result<(), Error> {
        self.previous = self.current;
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn matches(&mut self, kind: TokenKind) -> Result<bool, Error> {
        if self.check(kind) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<Token<'a>, Error> {
        if self.check(kind) {
            let tok = self.current;
            self.advance()?;
            Ok(tok)
        } else {
            Err(self.error_at_current(message))
        }
    }

    fn error_at_current(&mut self, message: &str) -> Error {
        self.panic_mode = true;
        Error::UnexpectedToken {
            message: message.to_string(),
            line: self.current.line,
            column: self.current.column,
        }
    }

    fn snapshot(&self) -> Snapshot<'a> {
        Snapshot {
            cursor: self.lexer.cursor(),
            previous: self.previous,
            current: self.current,
        }
    }

    fn restore(&mut self, snap: Snapshot<'a>) {
        self.lexer.restore(snap.cursor);
        self.previous = snap.previous;
        self.current = snap.current;
    }

    /// True if `kind` may stand for an identifier in a name-bearing
    /// position, per §4.3.10: every declaration keyword, every type
    /// keyword, and the legacy tokens `in`, `raises`, `pragma`, `module`,
    /// `includes`, `constructor`.
    fn is_identifier_like(kind: TokenKind) -> bool {
        use TokenKind::*;
        matches!(
            kind,
            Identifier
                | Interface
                | Mixin
                | Partial
                | Dictionary
                | Enum
                | Typedef
                | Namespace
                | Callback
                | Constructor
                | Includes
                | Attribute
                | Readonly
                | Const
                | Static
                | Inherit
                | Getter
                | Setter
                | Deleter
                | Stringifier
                | Iterable
                | Async
                | AsyncIterable
                | Maplike
                | Setlike
                | Required
                | Optional
                | Or
                | Any
                | Undefined
                | Boolean
                | Byte
                | Octet
                | Short
                | Long
                | Unsigned
                | Float
                | Double
                | Unrestricted
                | BigInt
                | DOMString
                | ByteString
                | USVString
                | Object
                | Symbol
                | Sequence
                | FrozenArray
                | ObservableArray
                | Record
                | Promise
                | Module
                | Pragma
                | Raises
                | In
        )
    }

    fn consume_identifier_like(&mut self, message: &str) -> Result<String, Error> {
        if Self::is_identifier_like(self.current.kind) {
            let lexeme = self.current.lexeme.to_string();
            self.advance()?;
            Ok(lexeme)
        } else {
            Err(self.error_at_current(message))
        }
    }

    // ---- top-level loop --------------------------------------------------

    fn parse_document(&mut self) -> Result<Document, Error> {
        let mut definitions = Vec::new();
        let mut first_error: Option<Error> = None;
        while !self.check(TokenKind::Eof) {
            match self.parse_top_level() {
                Ok(Some(def)) => definitions.push(def),
                Ok(None) => {}
                Err(err) => {
                    let recoverable = err.is_recoverable() && self.panic_mode;
                    if first_error.is_none() {
                        first_error = Some(err.clone());
                    }
                    if recoverable {
                        self.synchronize()?;
                    } else {
                        return Err(err);
                    }
                }
            }
        }
        if let Some(err) = first_error {
            return Err(err);
        }
        Ok(Document { definitions })
    }

    fn synchronize(&mut self) -> Result<(), Error> {
        self.panic_mode = false;
        while !self.check(TokenKind::Eof) {
            if self.previous.kind == TokenKind::Semicolon && Self::starts_definition(self.current.kind) {
                return Ok(());
            }
            if Self::starts_definition(self.current.kind) {
                return Ok(());
            }
            self.advance()?;
        }
        Ok(())
    }

    fn starts_definition(kind: TokenKind) -> bool {
        use TokenKind::*;
        matches!(
            kind,
            Interface | Dictionary | Enum | Callback | Typedef | Namespace | Partial
        )
    }

    /// One pass through the top-level dispatch order of §4.3.1. Returns
    /// `Ok(None)` for pragmas and module passthrough edge cases that
    /// produce no definition of their own at this recursion depth.
    fn parse_top_level(&mut self) -> Result<Option<Definition>, Error> {
        if self.check(TokenKind::Pragma) {
            self.skip_pragma()?;
            return self.parse_top_level();
        }

        if self.check(TokenKind::Module) {
            return self.parse_module();
        }

        let extended_attributes = self.parse_optional_extended_attributes()?;

        if self.matches(TokenKind::Partial)? {
            return self.parse_partial(extended_attributes).map(Some);
        }

        if self.matches(TokenKind::Callback)? {
            return self.parse_callback(extended_attributes).map(Some);
        }

        if self.check(TokenKind::Interface) {
            return self.parse_interface_or_mixin(extended_attributes, false).map(Some);
        }

        if self.matches(TokenKind::Dictionary)? {
            return self.parse_dictionary(extended_attributes, false).map(Some);
        }

        if self.matches(TokenKind::Enum)? {
            return self.parse_enum(extended_attributes).map(Some);
        }

        if self.matches(TokenKind::Typedef)? {
            return self.parse_typedef(extended_attributes).map(Some);
        }

        if self.matches(TokenKind::Namespace)? {
            return self.parse_namespace(extended_attributes, false).map(Some);
        }

        if self.check(TokenKind::Identifier) {
            if let Some(includes) = self.try_parse_includes()? {
                return Ok(Some(Definition::Includes(includes)));
            }
        }

        Err(self.error_at_current("Expected definition"))
    }

    fn skip_pragma(&mut self) -> Result<(), Error> {
        self.advance()?; // `pragma`
        while !self.check(TokenKind::Semicolon) && !self.check(TokenKind::Eof) {
            self.advance()?;
        }
        if self.check(TokenKind::Semicolon) {
            self.advance()?;
        }
        Ok(())
    }

    /// `module NAME { defs };` — per the open issue in §9, only the first
    /// nested definition is returned; the rest are parsed (so the token
    /// stream stays in sync) but discarded. This is intentional,
    /// reference-preserving behavior, not a bug.
    fn parse_module(&mut self) -> Result<Option<Definition>, Error> {
        self.advance()?; // `module`
        self.consume_identifier_like("Expected module name")?;
        self.consume(TokenKind::LeftBrace, "Expected '{' after module name")?;
        let mut first = None;
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            match self.parse_top_level()? {
                Some(def) => {
                    if first.is_none() {
                        first = Some(def);
                    }
                }
                None => {}
            }
        }
        self.consume(TokenKind::RightBrace, "Expected '}' after module body")?;
        if self.check(TokenKind::Semicolon) {
            self.advance()?;
        }
        Ok(first)
    }

    fn try_parse_includes(&mut self) -> Result<Option<Includes>, Error> {
        let snap = self.snapshot();
        let interface = self.current.lexeme.to_string();
        self.advance()?;
        if self.check(TokenKind::Includes) {
            self.advance()?;
            let mixin = self.consume_identifier_like("Expected mixin name after 'includes'")?;
            self.consume(TokenKind::Semicolon, "Expected ';' after includes statement")?;
            return Ok(Some(Includes { interface, mixin }));
        }
        self.restore(snap);
        Ok(None)
    }

    fn parse_partial(&mut self, ext: Vec<ExtendedAttribute>) -> Result<Definition, Error> {
        if self.check(TokenKind::Interface) {
            return self.parse_interface_or_mixin(ext, true);
        }
        if self.matches(TokenKind::Dictionary)? {
            return self.parse_dictionary(ext, true);
        }
        if self.matches(TokenKind::Namespace)? {
            return self.parse_namespace(ext, true);
        }
        Err(self.error_at_current("Expected 'interface', 'dictionary', or 'namespace' after 'partial'"))
    }

    // ---- interfaces & mixins ----------------------------------------------

    fn parse_interface_or_mixin(
        &mut self,
        ext: Vec<ExtendedAttribute>,
        partial: bool,
    ) -> Result<Definition, Error> {
        self.advance()?; // `interface`
        if self.check(TokenKind::Mixin) {
            self.advance()?;
            return self.parse_mixin_body(ext, partial);
        }
        self.parse_interface_body(ext, partial)
    }

    fn parse_mixin_body(
        &mut self,
        extended_attributes: Vec<ExtendedAttribute>,
        partial: bool,
    ) -> Result<Definition, Error> {
        let name = self.consume_identifier_like("Expected mixin name")?;
        self.consume(TokenKind::LeftBrace, "Expected '{' after mixin name")?;
        let members = self.parse_interface_members()?;
        self.consume(TokenKind::RightBrace, "Expected '}' after mixin body")?;
        self.consume(TokenKind::Semicolon, "Expected ';' after mixin body")?;
        Ok(Definition::InterfaceMixin(InterfaceMixin {
            name,
            members,
            extended_attributes,
            partial,
        }))
    }

    fn parse_interface_body(
        &mut self,
        extended_attributes: Vec<ExtendedAttribute>,
        partial: bool,
    ) -> Result<Definition, Error> {
        let name = self.consume_identifier_like("Expected interface name")?;
        let inherits = self.parse_optional_inheritance()?;

        if self.matches(TokenKind::Semicolon)? {
            return Ok(Definition::Interface(Interface {
                name,
                inherits,
                members: Vec::new(),
                extended_attributes,
                partial,
            }));
        }

        self.consume(TokenKind::LeftBrace, "Expected '{' or ';' after interface name")?;
        let members = self.parse_interface_members()?;
        self.consume(TokenKind::RightBrace, "Expected '}' after interface body")?;
        self.consume(TokenKind::Semicolon, "Expected ';' after interface body")?;
        Ok(Definition::Interface(Interface {
            name,
            inherits,
            members,
            extended_attributes,
            partial,
        }))
    }

    fn parse_optional_inheritance(&mut self) -> Result<Option<String>, Error> {
        if self.matches(TokenKind::Colon)? {
            Ok(Some(self.parse_qualified_identifier()?))
        } else {
            Ok(None)
        }
    }

    fn parse_qualified_identifier(&mut self) -> Result<String, Error> {
        let mut name = self.consume_identifier_like("Expected identifier")?;
        while self.matches(TokenKind::DoubleColon)? {
            name.push_str("::");
            name.push_str(&self.consume_identifier_like("Expected identifier after '::'")?);
        }
        Ok(name)
    }

    // ---- interface (and callback-interface, and namespace) members -------

    fn parse_interface_members(&mut self) -> Result<Vec<InterfaceMember>, Error> {
        let mut members = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            let ext = self.parse_optional_extended_attributes()?;
            members.push(self.parse_interface_member(ext)?);
        }
        Ok(members)
    }

    fn parse_interface_member(
        &mut self,
        ext: Vec<ExtendedAttribute>,
    ) -> Result<InterfaceMember, Error> {
        if self.matches(TokenKind::Constructor)? {
            return self.parse_constructor(ext);
        }

        if self.check(TokenKind::Stringifier) {
            return self.parse_stringifier_member(ext);
        }

        if self.matches(TokenKind::Static)? {
            return self.parse_static_member(ext);
        }

        if self.matches(TokenKind::Iterable)? {
            drop(ext);
            return self.parse_iterable();
        }

        if self.check(TokenKind::Async) {
            drop(ext);
            return self.parse_async_iterable();
        }
        if self.matches(TokenKind::AsyncIterable)? {
            drop(ext);
            return self.parse_async_iterable_body();
        }

        if self.check(TokenKind::Readonly) && self.peek_is_maplike_or_setlike()? {
            return self.parse_maplike_or_setlike(ext, true);
        }
        if self.check(TokenKind::Maplike) || self.check(TokenKind::Setlike) {
            return self.parse_maplike_or_setlike(ext, false);
        }

        if self.matches(TokenKind::Readonly)? {
            let attr = self.parse_attribute_tail(ext, true, false, false)?;
            return Ok(InterfaceMember::Attribute(attr));
        }

        if self.matches(TokenKind::Inherit)? {
            let attr = self.parse_attribute_tail(ext, false, false, true)?;
            return Ok(InterfaceMember::Attribute(attr));
        }

        if self.matches(TokenKind::Attribute)? {
            let attr = self.parse_attribute_rest(ext, false, false, false)?;
            return Ok(InterfaceMember::Attribute(attr));
        }

        if self.matches(TokenKind::Const)? {
            return self.parse_const(ext);
        }

        if matches!(
            self.current.kind,
            TokenKind::Getter | TokenKind::Setter | TokenKind::Deleter
        ) {
            let special = match self.current.kind {
                TokenKind::Getter => SpecialKind::Getter,
                TokenKind::Setter => SpecialKind::Setter,
                TokenKind::Deleter => SpecialKind::Deleter,
                _ => unreachable!(),
            };
            self.advance()?;
            let op = self.parse_operation(ext, false, Some(special))?;
            return Ok(InterfaceMember::Operation(op));
        }

        self.parse_attribute_or_operation(ext)
    }

    fn peek_is_maplike_or_setlike(&mut self) -> Result<bool, Error> {
        let snap = self.snapshot();
        self.advance()?; // `readonly`
        let hit = self.check(TokenKind::Maplike) || self.check(TokenKind::Setlike);
        self.restore(snap);
        Ok(hit)
    }

    fn parse_constructor(&mut self, ext: Vec<ExtendedAttribute>) -> Result<InterfaceMember, Error> {
        self.consume(TokenKind::LeftParen, "Expected '(' after 'constructor'")?;
        let arguments = self.parse_arguments()?;
        self.consume(TokenKind::RightParen, "Expected ')'")?;
        self.consume(TokenKind::Semicolon, "Expected ';' after constructor")?;
        Ok(InterfaceMember::Constructor(Constructor {
            arguments,
            extended_attributes: ext,
        }))
    }

    fn parse_stringifier_member(
        &mut self,
        ext: Vec<ExtendedAttribute>,
    ) -> Result<InterfaceMember, Error> {
        self.advance()?; // `stringifier`
        if self.matches(TokenKind::Semicolon)? {
            drop(ext);
            return Ok(InterfaceMember::Stringifier(Stringifier::Keyword));
        }
        if self.matches(TokenKind::Readonly)? {
            self.consume(TokenKind::Attribute, "Expected 'attribute' after 'readonly'")?;
            let attr = self.parse_attribute_rest(ext, true, false, true)?;
            return Ok(InterfaceMember::Stringifier(Stringifier::Attribute(Box::new(attr))));
        }
        if self.matches(TokenKind::Attribute)? {
            let attr = self.parse_attribute_rest(ext, false, false, true)?;
            return Ok(InterfaceMember::Stringifier(Stringifier::Attribute(Box::new(attr))));
        }
        let op = self.parse_operation(ext, false, Some(SpecialKind::Stringifier))?;
        Ok(InterfaceMember::Stringifier(Stringifier::Operation(Box::new(op))))
    }

    fn parse_static_member(&mut self, ext: Vec<ExtendedAttribute>) -> Result<InterfaceMember, Error> {
        if self.matches(TokenKind::Readonly)? {
            self.consume(TokenKind::Attribute, "Expected 'attribute' after 'readonly'")?;
            let attr = self.parse_attribute_rest(ext, true, true, false)?;
            return Ok(InterfaceMember::Attribute(attr));
        }
        if self.matches(TokenKind::Attribute)? {
            let attr = self.parse_attribute_rest(ext, false, true, false)?;
            return Ok(InterfaceMember::Attribute(attr));
        }
        let op = self.parse_operation(ext, true, None)?;
        Ok(InterfaceMember::Operation(op))
    }

    fn parse_attribute_rest(
        &mut self,
        ext: Vec<ExtendedAttribute>,
        readonly: bool,
        static_: bool,
        stringifier: bool,
    ) -> Result<Attribute, Error> {
        self.parse_attribute_tail_with_flags(ext, readonly, static_, stringifier, false)
    }

    fn parse_attribute_tail(
        &mut self,
        ext: Vec<ExtendedAttribute>,
        readonly: bool,
        static_: bool,
        inherit: bool,
    ) -> Result<Attribute, Error> {
        self.consume(TokenKind::Attribute, "Expected 'attribute'")?;
        self.parse_attribute_tail_with_flags(ext, readonly, static_, false, inherit)
    }

    fn parse_attribute_tail_with_flags(
        &mut self,
        ext: Vec<ExtendedAttribute>,
        readonly: bool,
        static_: bool,
        stringifier: bool,
        inherit: bool,
    ) -> Result<Attribute, Error> {
        let ty = self.parse_type()?;
        let name = self.consume_identifier_like("Expected attribute name")?;
        self.consume(TokenKind::Semicolon, "Expected ';' after attribute")?;
        Ok(Attribute {
            name,
            ty,
            readonly,
            static_,
            stringifier,
            inherit,
            extended_attributes: ext,
        })
    }

    fn parse_iterable(&mut self) -> Result<InterfaceMember, Error> {
        self.consume(TokenKind::LeftAngle, "Expected '<' after 'iterable'")?;
        let first = self.parse_type()?;
        let (key_type, value_type) = if self.matches(TokenKind::Comma)? {
            let value = self.parse_type()?;
            (Some(first), value)
        } else {
            (None, first)
        };
        self.consume(TokenKind::RightAngle, "Expected '>'")?;
        self.consume(TokenKind::Semicolon, "Expected ';' after iterable declaration")?;
        Ok(InterfaceMember::Iterable(Iterable { key_type, value_type }))
    }

    fn parse_async_iterable(&mut self) -> Result<InterfaceMember, Error> {
        self.advance()?; // `async`
        self.consume(TokenKind::Iterable, "Expected 'iterable' after 'async'")?;
        self.parse_async_iterable_body()
    }

    fn parse_async_iterable_body(&mut self) -> Result<InterfaceMember, Error> {
        self.consume(TokenKind::LeftAngle, "Expected '<' after 'async iterable'")?;
        let first = self.parse_type()?;
        let (key_type, value_type) = if self.matches(TokenKind::Comma)? {
            let value = self.parse_type()?;
            (Some(first), value)
        } else {
            (None, first)
        };
        self.consume(TokenKind::RightAngle, "Expected '>'")?;
        let arguments = if self.matches(TokenKind::LeftParen)? {
            let args = self.parse_arguments()?;
            self.consume(TokenKind::RightParen, "Expected ')'")?;
            Some(args)
        } else {
            None
        };
        self.consume(TokenKind::Semicolon, "Expected ';' after async iterable declaration")?;
        Ok(InterfaceMember::AsyncIterable(AsyncIterable {
            key_type,
            value_type,
            arguments,
        }))
    }

    fn parse_maplike_or_setlike(
        &mut self,
        ext: Vec<ExtendedAttribute>,
        readonly: bool,
    ) -> Result<InterfaceMember, Error> {
        drop(ext);
        if readonly {
            self.advance()?; // `readonly`
        }
        let is_map = self.check(TokenKind::Maplike);
        self.advance()?; // `maplike` | `setlike`
        self.consume(TokenKind::LeftAngle, "Expected '<'")?;
        if is_map {
            let key_type = self.parse_type()?;
            self.consume(TokenKind::Comma, "Expected ',' in maplike declaration")?;
            let value_type = self.parse_type()?;
            self.consume(TokenKind::RightAngle, "Expected '>'")?;
            self.consume(TokenKind::Semicolon, "Expected ';' after maplike declaration")?;
            Ok(InterfaceMember::Maplike(Maplike {
                key_type,
                value_type,
                readonly,
            }))
        } else {
            let value_type = self.parse_type()?;
            self.consume(TokenKind::RightAngle, "Expected '>'")?;
            self.consume(TokenKind::Semicolon, "Expected ';' after setlike declaration")?;
            Ok(InterfaceMember::Setlike(Setlike { value_type, readonly }))
        }
    }

    fn parse_const(&mut self, ext: Vec<ExtendedAttribute>) -> Result<InterfaceMember, Error> {
        drop(ext);
        let ty = self.parse_const_type()?;
        let name = self.consume_identifier_like("Expected const name")?;
        self.consume(TokenKind::Equals, "Expected '=' in const declaration")?;
        let value = self.parse_const_value()?;
        self.consume(TokenKind::Semicolon, "Expected ';' after const declaration")?;
        Ok(InterfaceMember::Const(Const { name, ty, value }))
    }

    /// The speculative attribute-vs-operation disambiguation of §4.3.4.
    fn parse_attribute_or_operation(
        &mut self,
        ext: Vec<ExtendedAttribute>,
    ) -> Result<InterfaceMember, Error> {
        let snap = self.snapshot();
        let speculative: Result<Option<Attribute>, Error> = (|| {
            let ty = self.parse_type()?;
            if Self::is_identifier_like(self.current.kind) {
                let name = self.current.lexeme.to_string();
                let name_snap = self.snapshot();
                self.advance()?;
                if self.check(TokenKind::Semicolon) {
                    self.advance()?;
                    return Ok(Some(Attribute {
                        name,
                        ty,
                        readonly: false,
                        static_: false,
                        stringifier: false,
                        inherit: false,
                        extended_attributes: Vec::new(),
                    }));
                }
                self.restore(name_snap);
            }
            Ok(None)
        })();

        match speculative {
            Ok(Some(mut attr)) => {
                attr.extended_attributes = ext;
                Ok(InterfaceMember::Attribute(attr))
            }
            Ok(None) => {
                self.restore(snap);
                let op = self.parse_operation(ext, false, None)?;
                Ok(InterfaceMember::Operation(op))
            }
            Err(_) => {
                self.restore(snap);
                let op = self.parse_operation(ext, false, None)?;
                Ok(InterfaceMember::Operation(op))
            }
        }
    }

    // ---- operations & arguments --------------------------------------------

    fn parse_operation(
        &mut self,
        ext: Vec<ExtendedAttribute>,
        static_: bool,
        special: Option<SpecialKind>,
    ) -> Result<Operation, Error> {
        let return_type = if self.matches(TokenKind::Undefined)? {
            Type::Undefined
        } else {
            self.parse_type()?
        };
        let name = if Self::is_identifier_like(self.current.kind) && !self.check(TokenKind::LeftParen) {
            Some(self.consume_identifier_like("Expected operation name")?)
        } else {
            None
        };
        self.consume(TokenKind::LeftParen, "Expected '('")?;
        let arguments = self.parse_arguments()?;
        self.consume(TokenKind::RightParen, "Expected ')'")?;
        self.skip_optional_raises()?;
        self.consume(TokenKind::Semicolon, "Expected ';' after operation")?;
        Ok(Operation {
            name,
            return_type,
            arguments,
            static_,
            special,
            extended_attributes: ext,
        })
    }

    /// Legacy `raises (exn)` / `raises ((exn, exn))` clause (§4.3.5, §9):
    /// consumed and discarded, no AST node emitted.
    fn skip_optional_raises(&mut self) -> Result<(), Error> {
        if self.matches(TokenKind::Raises)? {
            self.consume(TokenKind::LeftParen, "Expected '(' after 'raises'")?;
            let mut depth = 1;
            while depth > 0 {
                if self.check(TokenKind::Eof) {
                    return Err(self.error_at_current("Expected ')' to close 'raises' clause"));
                }
                if self.check(TokenKind::LeftParen) {
                    depth += 1;
                } else if self.check(TokenKind::RightParen) {
                    depth -= 1;
                }
                self.advance()?;
            }
        }
        Ok(())
    }

    fn parse_arguments(&mut self) -> Result<Vec<Argument>, Error> {
        let mut arguments = Vec::new();
        if self.check(TokenKind::RightParen) {
            return Ok(arguments);
        }
        loop {
            arguments.push(self.parse_argument()?);
            if !self.matches(TokenKind::Comma)? {
                break;
            }
        }
        Ok(arguments)
    }

    fn parse_argument(&mut self) -> Result<Argument, Error> {
        let extended_attributes = self.parse_optional_extended_attributes()?;
        let optional = self.matches(TokenKind::Optional)?;
        // Legacy `in` qualifier: silently accepted and discarded (§4.3.6, §9).
        let _ = self.matches(TokenKind::In)?;
        let ty = self.parse_type()?;
        let variadic = self.matches(TokenKind::Ellipsis)?;
        let name = self.consume_identifier_like("Expected argument name")?;
        let default_value = if self.matches(TokenKind::Equals)? {
            Some(self.parse_default_value()?)
        } else {
            None
        };
        Ok(Argument {
            name,
            ty,
            optional,
            variadic,
            default_value,
            extended_attributes,
        })
    }

    fn parse_default_value(&mut self) -> Result<Value, Error> {
        self.parse_literal_value("default value")
    }

    fn parse_const_value(&mut self) -> Result<Value, Error> {
        self.parse_literal_value("const value")
    }

    fn parse_literal_value(&mut self, what: &str) -> Result<Value, Error> {
        match self.current.kind {
            TokenKind::Null => {
                self.advance()?;
                Ok(Value::Null)
            }
            TokenKind::True => {
                self.advance()?;
                Ok(Value::Boolean(true))
            }
            TokenKind::False => {
                self.advance()?;
                Ok(Value::Boolean(false))
            }
            TokenKind::Infinity => {
                self.advance()?;
                Ok(Value::Infinity)
            }
            TokenKind::NegativeInfinity => {
                self.advance()?;
                Ok(Value::NegativeInfinity)
            }
            TokenKind::NaN => {
                self.advance()?;
                Ok(Value::NaN)
            }
            TokenKind::StringLiteral => {
                let lexeme = self.current.lexeme;
                let inner = &lexeme[1..lexeme.len() - 1];
                self.advance()?;
                Ok(Value::String(inner.to_string()))
            }
            TokenKind::IntegerLiteral => {
                let lexeme = self.current.lexeme.to_string();
                self.advance()?;
                Ok(Value::Integer { lexeme })
            }
            TokenKind::FloatLiteral => {
                let lexeme = self.current.lexeme.to_string();
                self.advance()?;
                Ok(Value::Float { lexeme })
            }
            TokenKind::Minus => {
                self.advance()?;
                match self.current.kind {
                    TokenKind::IntegerLiteral => {
                        let lexeme = format!("-{}", self.current.lexeme);
                        self.advance()?;
                        Ok(Value::Integer { lexeme })
                    }
                    TokenKind::FloatLiteral => {
                        let lexeme = format!("-{}", self.current.lexeme);
                        self.advance()?;
                        Ok(Value::Float { lexeme })
                    }
                    _ => Err(self.error_at_current("Expected number after unary '-'")),
                }
            }
            TokenKind::LeftBracket => {
                self.advance()?;
                self.consume(TokenKind::RightBracket, "Expected ']' for empty sequence")?;
                Ok(Value::EmptySequence)
            }
            TokenKind::LeftBrace => {
                self.advance()?;
                self.consume(TokenKind::RightBrace, "Expected '}' for empty dictionary")?;
                Ok(Value::EmptyDictionary)
            }
            _ => Err(self.error_at_current(&format!("Expected {}", what))),
        }
    }

    // ---- types ---------------------------------------------------------

    fn parse_const_type(&mut self) -> Result<Type, Error> {
        self.parse_non_nullable_non_union_type()
    }

    fn parse_type(&mut self) -> Result<Type, Error> {
        self.skip_type_extended_attributes()?;

        if self.check(TokenKind::LeftParen) {
            let union = self.parse_union_type()?;
            return self.parse_optional_nullable(union);
        }

        let base = self.parse_non_nullable_non_union_type()?;
        self.parse_optional_nullable(base)
    }

    fn skip_type_extended_attributes(&mut self) -> Result<(), Error> {
        if self.check(TokenKind::LeftBracket) {
            let _ = self.parse_extended_attribute_list()?;
        }
        Ok(())
    }

    fn parse_optional_nullable(&mut self, ty: Type) -> Result<Type, Error> {
        if self.matches(TokenKind::Question)? {
            Ok(Type::Nullable(Box::new(ty)))
        } else {
            Ok(ty)
        }
    }

    fn parse_union_type(&mut self) -> Result<Type, Error> {
        self.consume(TokenKind::LeftParen, "Expected '('")?;
        let mut members = vec![self.parse_type()?];
        while self.matches(TokenKind::Or)? {
            members.push(self.parse_type()?);
        }
        self.consume(TokenKind::RightParen, "Expected ')'")?;
        Ok(Type::Union(members))
    }

    fn parse_non_nullable_non_union_type(&mut self) -> Result<Type, Error> {
        use TokenKind::*;
        let ty = match self.current.kind {
            Any => self.simple_type(Type::Any)?,
            Undefined => self.simple_type(Type::Undefined)?,
            Boolean => self.simple_type(Type::Boolean)?,
            Byte => self.simple_type(Type::Byte)?,
            Octet => self.simple_type(Type::Octet)?,
            Short => self.simple_type(Type::Short)?,
            Long => {
                self.advance()?;
                if self.matches(TokenKind::Long)? {
                    Type::LongLong
                } else {
                    Type::Long
                }
            }
            Unsigned => {
                self.advance()?;
                if self.matches(TokenKind::Short)? {
                    Type::UnsignedShort
                } else if self.matches(TokenKind::Long)? {
                    if self.matches(TokenKind::Long)? {
                        Type::UnsignedLongLong
                    } else {
                        Type::UnsignedLong
                    }
                } else {
                    return Err(self.error_at_current("Expected 'short' or 'long' after 'unsigned'"));
                }
            }
            Float => self.simple_type(Type::Float)?,
            Double => self.simple_type(Type::Double)?,
            Unrestricted => {
                self.advance()?;
                if self.matches(TokenKind::Float)? {
                    Type::UnrestrictedFloat
                } else if self.matches(TokenKind::Double)? {
                    Type::UnrestrictedDouble
                } else {
                    return Err(self.error_at_current("Expected 'float' or 'double' after 'unrestricted'"));
                }
            }
            BigInt => self.simple_type(Type::BigInt)?,
            DOMString => self.simple_type(Type::DOMString)?,
            ByteString => self.simple_type(Type::ByteString)?,
            USVString => self.simple_type(Type::USVString)?,
            Object => self.simple_type(Type::Object)?,
            Symbol => self.simple_type(Type::Symbol)?,
            Sequence => {
                self.advance()?;
                self.consume(LeftAngle, "Expected '<' after 'sequence'")?;
                let inner = self.parse_type()?;
                self.consume(RightAngle, "Expected '>' to close 'sequence<...>'")?;
                Type::Sequence(Box::new(inner))
            }
            FrozenArray => {
                self.advance()?;
                self.consume(LeftAngle, "Expected '<' after 'FrozenArray'")?;
                let inner = self.parse_type()?;
                self.consume(RightAngle, "Expected '>' to close 'FrozenArray<...>'")?;
                Type::FrozenArray(Box::new(inner))
            }
            ObservableArray => {
                self.advance()?;
                self.consume(LeftAngle, "Expected '<' after 'ObservableArray'")?;
                let inner = self.parse_type()?;
                self.consume(RightAngle, "Expected '>' to close 'ObservableArray<...>'")?;
                Type::ObservableArray(Box::new(inner))
            }
            Promise => {
                self.advance()?;
                self.consume(LeftAngle, "Expected '<' after 'Promise'")?;
                let inner = self.parse_type()?;
                self.consume(RightAngle, "Expected '>' to close 'Promise<...>'")?;
                Type::Promise(Box::new(inner))
            }
            Record => {
                self.advance()?;
                self.consume(LeftAngle, "Expected '<' after 'record'")?;
                let key = self.parse_type()?;
                self.consume(Comma, "Expected ',' in 'record<K, V>'")?;
                let value = self.parse_type()?;
                self.consume(RightAngle, "Expected '>' to close 'record<...>'")?;
                Type::Record(Box::new(key), Box::new(value))
            }
            _ if Self::is_identifier_like(self.current.kind) => {
                let name = self.parse_qualified_identifier()?;
                Type::Identifier(name)
            }
            _ => return Err(self.error_at_current("Expected type")),
        };
        Ok(ty)
    }

    fn simple_type(&mut self, ty: Type) -> Result<Type, Error> {
        self.advance()?;
        Ok(ty)
    }

    // ---- extended attributes --------------------------------------------

    fn parse_optional_extended_attributes(&mut self) -> Result<Vec<ExtendedAttribute>, Error> {
        if self.check(TokenKind::LeftBracket) {
            self.parse_extended_attribute_list()
        } else {
            Ok(Vec::new())
        }
    }

    fn parse_extended_attribute_list(&mut self) -> Result<Vec<ExtendedAttribute>, Error> {
        self.consume(TokenKind::LeftBracket, "Expected '['")?;
        let mut attrs = Vec::new();
        if !self.check(TokenKind::RightBracket) {
            loop {
                attrs.push(self.parse_extended_attribute()?);
                if !self.matches(TokenKind::Comma)? {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightBracket, "Expected ']'")?;
        Ok(attrs)
    }

    fn parse_extended_attribute(&mut self) -> Result<ExtendedAttribute, Error> {
        let name = self.consume_identifier_like("Expected extended attribute name")?;

        if self.matches(TokenKind::LeftParen)? {
            let args = self.parse_arguments()?;
            self.consume(TokenKind::RightParen, "Expected ')'")?;
            return Ok(ExtendedAttribute {
                name,
                value: Some(ExtendedAttrValue::ArgumentList(args)),
            });
        }

        if !self.matches(TokenKind::Equals)? {
            return Ok(ExtendedAttribute { name, value: None });
        }

        if self.matches(TokenKind::Star)? {
            return Ok(ExtendedAttribute {
                name,
                value: Some(ExtendedAttrValue::Identifier("*".to_string())),
            });
        }

        if self.check(TokenKind::LeftParen) {
            let value = self.parse_paren_extended_attr_value()?;
            return Ok(ExtendedAttribute { name, value: Some(value) });
        }

        // `Name = Ident` or `Name = Ident ( args )` or scalar literal.
        let rhs_name = self.parse_extended_attr_scalar()?;
        if self.matches(TokenKind::LeftParen)? {
            let args = self.parse_arguments()?;
            self.consume(TokenKind::RightParen, "Expected ')'")?;
            return Ok(ExtendedAttribute {
                name,
                value: Some(ExtendedAttrValue::NamedArgumentList {
                    name: rhs_name,
                    arguments: args,
                }),
            });
        }
        Ok(ExtendedAttribute {
            name,
            value: Some(ExtendedAttrValue::Identifier(rhs_name)),
        })
    }

    fn parse_extended_attr_scalar(&mut self) -> Result<String, Error> {
        match self.current.kind {
            TokenKind::StringLiteral => {
                let lexeme = self.current.lexeme;
                let inner = lexeme[1..lexeme.len() - 1].to_string();
                self.advance()?;
                Ok(inner)
            }
            TokenKind::IntegerLiteral | TokenKind::FloatLiteral => {
                let lexeme = self.current.lexeme.to_string();
                self.advance()?;
                Ok(lexeme)
            }
            _ => self.consume_identifier_like("Expected identifier or literal"),
        }
    }

    /// `Name = ( list )` disambiguated from `Name = ( args ) Ident` /
    /// `Name ( args )` by a second speculative lookahead (§4.3.8): if the
    /// first element is an identifier-or-literal directly followed by `,`
    /// or `)`, it is an identifier list; otherwise it is an argument list.
    fn parse_paren_extended_attr_value(&mut self) -> Result<ExtendedAttrValue, Error> {
        let snap = self.snapshot();
        self.advance()?; // `(`

        let looks_like_list = matches!(
            self.current.kind,
            TokenKind::Identifier
                | TokenKind::StringLiteral
                | TokenKind::IntegerLiteral
                | TokenKind::FloatLiteral
        ) && {
            let inner_snap = self.snapshot();
            let consumed = self.parse_extended_attr_scalar().is_ok();
            let followed_by_list_sep =
                consumed && matches!(self.current.kind, TokenKind::Comma | TokenKind::RightParen);
            self.restore(inner_snap);
            followed_by_list_sep
        };

        self.restore(snap);
        self.advance()?; // `(`

        if looks_like_list {
            let mut items = Vec::new();
            if !self.check(TokenKind::RightParen) {
                loop {
                    items.push(self.parse_extended_attr_scalar()?);
                    if !self.matches(TokenKind::Comma)? {
                        break;
                    }
                }
            }
            self.consume(TokenKind::RightParen, "Expected ')'")?;
            return Ok(ExtendedAttrValue::IdentifierList(items));
        }

        let args = self.parse_arguments()?;
        self.consume(TokenKind::RightParen, "Expected ')'")?;
        if Self::is_identifier_like(self.current.kind) {
            let trailing_name = self.consume_identifier_like("Expected identifier")?;
            return Ok(ExtendedAttrValue::NamedArgumentList {
                name: trailing_name,
                arguments: args,
            });
        }
        Ok(ExtendedAttrValue::ArgumentList(args))
    }

    // ---- dictionaries, enums, typedefs, callbacks, namespaces -------------

    fn parse_dictionary(
        &mut self,
        extended_attributes: Vec<ExtendedAttribute>,
        partial: bool,
    ) -> Result<Definition, Error> {
        let name = self.consume_identifier_like("Expected dictionary name")?;
        let inherits = self.parse_optional_inheritance()?;
        self.consume(TokenKind::LeftBrace, "Expected '{' after dictionary name")?;
        let mut members = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            members.push(self.parse_dictionary_member()?);
        }
        self.consume(TokenKind::RightBrace, "Expected '}' after dictionary body")?;
        // Tolerance (§4.3.9): trailing ';' after '}' may be omitted.
        let _ = self.matches(TokenKind::Semicolon)?;
        Ok(Definition::Dictionary(Dictionary {
            name,
            inherits,
            members,
            extended_attributes,
            partial,
        }))
    }

    fn parse_dictionary_member(&mut self) -> Result<DictionaryMember, Error> {
        let extended_attributes = self.parse_optional_extended_attributes()?;
        let required = self.matches(TokenKind::Required)?;
        let ty = self.parse_type()?;
        let name = self.consume_identifier_like("Expected dictionary member name")?;
        let default_value = if self.matches(TokenKind::Equals)? {
            Some(self.parse_default_value()?)
        } else {
            None
        };
        self.consume(TokenKind::Semicolon, "Expected ';' after dictionary member")?;
        Ok(DictionaryMember {
            name,
            ty,
            required,
            default_value,
            extended_attributes,
        })
    }

    fn parse_enum(&mut self, extended_attributes: Vec<ExtendedAttribute>) -> Result<Definition, Error> {
        let name = self.consume_identifier_like("Expected enum name")?;
        self.consume(TokenKind::LeftBrace, "Expected '{' after enum name")?;
        let mut values = Vec::new();
        if !self.check(TokenKind::RightBrace) {
            loop {
                let tok = self.consume(TokenKind::StringLiteral, "Expected enum value string")?;
                let lexeme = tok.lexeme;
                values.push(lexeme[1..lexeme.len() - 1].to_string());
                if !self.matches(TokenKind::Comma)? {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightBrace, "Expected '}' after enum body")?;
        self.consume(TokenKind::Semicolon, "Expected ';' after enum declaration")?;
        Ok(Definition::Enum(Enum {
            name,
            values,
            extended_attributes,
        }))
    }

    fn parse_typedef(&mut self, extended_attributes: Vec<ExtendedAttribute>) -> Result<Definition, Error> {
        let ty = self.parse_type()?;
        let name = self.consume_identifier_like("Expected typedef name")?;
        self.consume(TokenKind::Semicolon, "Expected ';' after typedef")?;
        Ok(Definition::Typedef(Typedef {
            name,
            ty,
            extended_attributes,
        }))
    }

    fn parse_callback(&mut self, extended_attributes: Vec<ExtendedAttribute>) -> Result<Definition, Error> {
        if self.matches(TokenKind::Interface)? {
            let name = self.consume_identifier_like("Expected callback interface name")?;
            self.consume(TokenKind::LeftBrace, "Expected '{' after callback interface name")?;
            let members = self.parse_interface_members()?;
            self.consume(TokenKind::RightBrace, "Expected '}' after callback interface body")?;
            self.consume(TokenKind::Semicolon, "Expected ';' after callback interface body")?;
            return Ok(Definition::CallbackInterface(CallbackInterface {
                name,
                members,
                extended_attributes,
            }));
        }

        let name = self.consume_identifier_like("Expected callback name")?;
        self.consume(TokenKind::Equals, "Expected '=' after callback name")?;
        let return_type = if self.matches(TokenKind::Undefined)? {
            Type::Undefined
        } else {
            self.parse_type()?
        };
        self.consume(TokenKind::LeftParen, "Expected '('")?;
        let arguments = self.parse_arguments()?;
        self.consume(TokenKind::RightParen, "Expected ')'")?;
        self.consume(TokenKind::Semicolon, "Expected ';' after callback declaration")?;
        Ok(Definition::Callback(Callback {
            name,
            return_type,
            arguments,
            extended_attributes,
        }))
    }

    fn parse_namespace(
        &mut self,
        extended_attributes: Vec<ExtendedAttribute>,
        partial: bool,
    ) -> Result<Definition, Error> {
        let name = self.consume_identifier_like("Expected namespace name")?;
        self.consume(TokenKind::LeftBrace, "Expected '{' after namespace name")?;
        let members = self.parse_interface_members()?;
        self.consume(TokenKind::RightBrace, "Expected '}' after namespace body")?;
        self.consume(TokenKind::Semicolon, "Expected ';' after namespace body")?;
        Ok(Definition::Namespace(Namespace {
            name,
            members,
            extended_attributes,
            partial,
        }))
    }
}
