//! Lexical analysis of Web IDL source text.
//!
//! Converts a byte slice into a lazy stream of [`Token`]s. The lexer owns a
//! mutable cursor (byte offset, line, column) that the parser snapshots and
//! restores for speculative, backtracking parses — see [`Lexer::cursor`] and
//! [`Lexer::restore`].
//!
//! Lexemes are borrowed slices of the source buffer; the lexer never
//! allocates a string. Source text is assumed to be ASCII-identifier-safe:
//! classification uses only ASCII predicates, per the Non-goals in the
//! specification this module implements.

use crate::error::Error;

/// The closed set of token kinds recognized by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    IntegerLiteral,
    FloatLiteral,
    StringLiteral,

    // Structural punctuation
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    Comma,
    Semicolon,
    Colon,
    DoubleColon,
    LeftAngle,
    RightAngle,
    Question,
    Equals,
    Minus,
    Ellipsis,
    Star,

    // Declaration / grammar keywords
    Interface,
    Mixin,
    Partial,
    Dictionary,
    Enum,
    Typedef,
    Namespace,
    Callback,
    Constructor,
    Includes,
    Attribute,
    Readonly,
    Const,
    Static,
    Inherit,
    Getter,
    Setter,
    Deleter,
    Stringifier,
    Iterable,
    Async,
    AsyncIterable,
    Maplike,
    Setlike,
    Required,
    Optional,
    Or,
    True,
    False,
    Null,
    NaN,
    Infinity,
    NegativeInfinity,

    // Primitive type keywords
    Any,
    Undefined,
    Boolean,
    Byte,
    Octet,
    Short,
    Long,
    Unsigned,
    Float,
    Double,
    Unrestricted,
    BigInt,
    DOMString,
    ByteString,
    USVString,
    Object,
    Symbol,
    Sequence,
    FrozenArray,
    ObservableArray,
    Record,
    Promise,

    // Legacy keywords
    Module,
    Pragma,
    Raises,
    In,

    Eof,
}

/// A single lexical token: its kind, the borrowed source lexeme, and its
/// 1-based line/column of its first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub lexeme: &'a str,
    pub line: usize,
    pub column: usize,
}

impl<'a> Token<'a> {
    fn new(kind: TokenKind, lexeme: &'a str, line: usize, column: usize) -> Self {
        Token {
            kind,
            lexeme,
            line,
            column,
        }
    }
}

impl<'a> std::fmt::Display for Token<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Token({:?}, {:?}, {}:{})",
            self.kind, self.lexeme, self.line, self.column
        )
    }
}

fn keyword_kind(word: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match word {
        "interface" => Interface,
        "mixin" => Mixin,
        "partial" => Partial,
        "dictionary" => Dictionary,
        "enum" => Enum,
        "typedef" => Typedef,
        "namespace" => Namespace,
        "callback" => Callback,
        "constructor" => Constructor,
        "includes" => Includes,
        "attribute" => Attribute,
        "readonly" => Readonly,
        "const" => Const,
        "static" => Static,
        "inherit" => Inherit,
        "getter" => Getter,
        "setter" => Setter,
        "deleter" => Deleter,
        "stringifier" => Stringifier,
        "iterable" => Iterable,
        "async" => Async,
        "async_iterable" => AsyncIterable,
        "maplike" => Maplike,
        "setlike" => Setlike,
        "required" => Required,
        "optional" => Optional,
        "or" => Or,
        "true" => True,
        "false" => False,
        "null" => Null,
        "NaN" => NaN,
        "Infinity" => Infinity,
        "any" => Any,
        "undefined" => Undefined,
        "boolean" => Boolean,
        "byte" => Byte,
        "octet" => Octet,
        "short" => Short,
        "long" => Long,
        "unsigned" => Unsigned,
        "float" => Float,
        "double" => Double,
        "unrestricted" => Unrestricted,
        "bigint" => BigInt,
        "DOMString" => DOMString,
        "ByteString" => ByteString,
        "USVString" => USVString,
        "object" => Object,
        "symbol" => Symbol,
        "sequence" => Sequence,
        "FrozenArray" => FrozenArray,
        "ObservableArray" => ObservableArray,
        "record" => Record,
        "Promise" => Promise,
        "module" => Module,
        "pragma" => Pragma,
        "raises" => Raises,
        "in" => In,
        _ => return None,
    })
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// An atomic snapshot of the lexer's scanning position, used by the parser
/// to roll back a speculative parse. Restoration is O(1) and allocates
/// nothing.
#[derive(Debug, Clone, Copy)]
pub struct Cursor {
    offset: usize,
    line: usize,
    column: usize,
}

pub struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    offset: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source,
            bytes: source.as_bytes(),
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Snapshot the current scanning position.
    pub fn cursor(&self) -> Cursor {
        Cursor {
            offset: self.offset,
            line: self.line,
            column: self.column,
        }
    }

    /// Restore a previously taken snapshot. Must only be used to rewind,
    /// never to fast-forward.
    pub fn restore(&mut self, cursor: Cursor) {
        self.offset = cursor.offset;
        self.line = cursor.line;
        self.column = cursor.column;
    }

    fn peek_byte(&self) -> Option<u8> {
        self.bytes.get(self.offset).copied()
    }

    fn peek_byte_at(&self, delta: usize) -> Option<u8> {
        self.bytes.get(self.offset + delta).copied()
    }

    fn advance_byte(&mut self) -> Option<u8> {
        let b = self.peek_byte()?;
        self.offset += 1;
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(b)
    }

    fn skip_trivia(&mut self) -> Result<(), Error> {
        loop {
            match self.peek_byte() {
                Some(b) if b == b' ' || b == b'\t' || b == b'\r' || b == b'\n' => {
                    self.advance_byte();
                }
                Some(b'/') if self.peek_byte_at(1) == Some(b'/') => {
                    while let Some(b) = self.peek_byte() {
                        if b == b'\n' {
                            break;
                        }
                        self.advance_byte();
                    }
                }
                Some(b'/') if self.peek_byte_at(1) == Some(b'*') => {
                    let start_line = self.line;
                    let start_column = self.column;
                    self.advance_byte();
                    self.advance_byte();
                    loop {
                        match self.peek_byte() {
                            None => {
                                return Err(Error::UnterminatedComment {
                                    line: start_line,
                                    column: start_column,
                                })
                            }
                            Some(b'*') if self.peek_byte_at(1) == Some(b'/') => {
                                self.advance_byte();
                                self.advance_byte();
                                break;
                            }
                            Some(_) => {
                                self.advance_byte();
                            }
                        }
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn slice_from(&self, start: usize) -> &'a str {
        &self.source[start..self.offset]
    }

    /// Produce the next token, or `Eof` indefinitely past the end of input.
    pub fn next_token(&mut self) -> Result<Token<'a>, Error> {
        self.skip_trivia()?;

        let line = self.line;
        let column = self.column;
        let start = self.offset;

        let b = match self.peek_byte() {
            None => return Ok(Token::new(TokenKind::Eof, "", line, column)),
            Some(b) => b,
        };

        if is_ident_start(b) {
            return Ok(self.lex_identifier_or_keyword(start, line, column));
        }

        if b.is_ascii_digit() {
            return self.lex_number(start, line, column);
        }

        if b == b'"' {
            return self.lex_string(start, line, column);
        }

        match b {
            b':' if self.peek_byte_at(1) == Some(b':') => {
                self.advance_byte();
                self.advance_byte();
                Ok(Token::new(TokenKind::DoubleColon, self.slice_from(start), line, column))
            }
            b'.' if self.peek_byte_at(1) == Some(b'.') && self.peek_byte_at(2) == Some(b'.') => {
                self.advance_byte();
                self.advance_byte();
                self.advance_byte();
                Ok(Token::new(TokenKind::Ellipsis, self.slice_from(start), line, column))
            }
            b'(' => self.single(TokenKind::LeftParen, start, line, column),
            b')' => self.single(TokenKind::RightParen, start, line, column),
            b'[' => self.single(TokenKind::LeftBracket, start, line, column),
            b']' => self.single(TokenKind::RightBracket, start, line, column),
            b'{' => self.single(TokenKind::LeftBrace, start, line, column),
            b'}' => self.single(TokenKind::RightBrace, start, line, column),
            b',' => self.single(TokenKind::Comma, start, line, column),
            b';' => self.single(TokenKind::Semicolon, start, line, column),
            b':' => self.single(TokenKind::Colon, start, line, column),
            b'<' => self.single(TokenKind::LeftAngle, start, line, column),
            b'>' => self.single(TokenKind::RightAngle, start, line, column),
            b'?' => self.single(TokenKind::Question, start, line, column),
            b'=' => self.single(TokenKind::Equals, start, line, column),
            b'*' => self.single(TokenKind::Star, start, line, column),
            b'-' => {
                if self.matches_word_at(self.offset + 1, "Infinity") {
                    self.advance_byte();
                    for _ in 0.."Infinity".len() {
                        self.advance_byte();
                    }
                    Ok(Token::new(
                        TokenKind::NegativeInfinity,
                        self.slice_from(start),
                        line,
                        column,
                    ))
                } else {
                    self.single(TokenKind::Minus, start, line, column)
                }
            }
            other => Err(Error::InvalidCharacter {
                ch: other as char,
                line,
                column,
            }),
        }
    }

    fn matches_word_at(&self, offset: usize, word: &str) -> bool {
        let end = offset + word.len();
        if end > self.bytes.len() {
            return false;
        }
        &self.bytes[offset..end] == word.as_bytes()
    }

    fn single(
        &mut self,
        kind: TokenKind,
        start: usize,
        line: usize,
        column: usize,
    ) -> Result<Token<'a>, Error> {
        self.advance_byte();
        Ok(Token::new(kind, self.slice_from(start), line, column))
    }

    fn lex_identifier_or_keyword(&mut self, start: usize, line: usize, column: usize) -> Token<'a> {
        while let Some(b) = self.peek_byte() {
            if is_ident_continue(b) {
                self.advance_byte();
            } else {
                break;
            }
        }
        let lexeme = self.slice_from(start);
        let kind = keyword_kind(lexeme).unwrap_or(TokenKind::Identifier);
        Token::new(kind, lexeme, line, column)
    }

    fn lex_number(&mut self, start: usize, line: usize, column: usize) -> Result<Token<'a>, Error> {
        // Hexadecimal: 0[xX][0-9A-Fa-f]+
        if self.peek_byte() == Some(b'0')
            && matches!(self.peek_byte_at(1), Some(b'x') | Some(b'X'))
        {
            self.advance_byte();
            self.advance_byte();
            let digits_start = self.offset;
            while let Some(b) = self.peek_byte() {
                if b.is_ascii_hexdigit() {
                    self.advance_byte();
                } else {
                    break;
                }
            }
            if self.offset == digits_start {
                return Err(Error::InvalidNumberLiteral {
                    lexeme: self.slice_from(start).to_string(),
                    line,
                    column,
                });
            }
            return Ok(Token::new(
                TokenKind::IntegerLiteral,
                self.slice_from(start),
                line,
                column,
            ));
        }

        // Integer part (decimal, or octal-tolerant leading-zero run).
        while let Some(b) = self.peek_byte() {
            if b.is_ascii_digit() {
                self.advance_byte();
            } else {
                break;
            }
        }

        let mut is_float = false;

        if self.peek_byte() == Some(b'.') && self.peek_byte_at(1).is_some_and(|b| b.is_ascii_digit())
        {
            is_float = true;
            self.advance_byte();
            while let Some(b) = self.peek_byte() {
                if b.is_ascii_digit() {
                    self.advance_byte();
                } else {
                    break;
                }
            }
        }

        if matches!(self.peek_byte(), Some(b'e') | Some(b'E')) {
            let mut lookahead = 1;
            if matches!(self.peek_byte_at(lookahead), Some(b'+') | Some(b'-')) {
                lookahead += 1;
            }
            if self.peek_byte_at(lookahead).is_some_and(|b| b.is_ascii_digit()) {
                is_float = true;
                for _ in 0..lookahead {
                    self.advance_byte();
                }
                while let Some(b) = self.peek_byte() {
                    if b.is_ascii_digit() {
                        self.advance_byte();
                    } else {
                        break;
                    }
                }
            }
        }

        let kind = if is_float {
            TokenKind::FloatLiteral
        } else {
            TokenKind::IntegerLiteral
        };
        Ok(Token::new(kind, self.slice_from(start), line, column))
    }

    fn lex_string(&mut self, start: usize, line: usize, column: usize) -> Result<Token<'a>, Error> {
        self.advance_byte(); // opening quote
        loop {
            match self.peek_byte() {
                None => {
                    return Err(Error::UnterminatedString { line, column });
                }
                Some(b'"') => {
                    self.advance_byte();
                    break;
                }
                Some(_) => {
                    self.advance_byte();
                }
            }
        }
        Ok(Token::new(
            TokenKind::StringLiteral,
            self.slice_from(start),
            line,
            column,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(src);
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token().unwrap();
            if tok.kind == TokenKind::Eof {
                out.push(TokenKind::Eof);
                break;
            }
            out.push(tok.kind);
        }
        out
    }

    #[test]
    fn lexes_interface_keyword_and_identifier() {
        let k = kinds("interface Foo");
        assert_eq!(k, vec![TokenKind::Interface, TokenKind::Identifier, TokenKind::Eof]);
    }

    #[test]
    fn lexes_double_colon_before_colon() {
        let mut lexer = Lexer::new("Ns::Name");
        let a = lexer.next_token().unwrap();
        let b = lexer.next_token().unwrap();
        let c = lexer.next_token().unwrap();
        assert_eq!(a.kind, TokenKind::Identifier);
        assert_eq!(b.kind, TokenKind::DoubleColon);
        assert_eq!(c.kind, TokenKind::Identifier);
    }

    #[test]
    fn lexes_negative_infinity_as_single_token() {
        let mut lexer = Lexer::new("-Infinity");
        let tok = lexer.next_token().unwrap();
        assert_eq!(tok.kind, TokenKind::NegativeInfinity);
        assert_eq!(tok.lexeme, "-Infinity");
    }

    #[test]
    fn lexes_minus_alone_as_punctuator() {
        let mut lexer = Lexer::new("-42");
        let tok = lexer.next_token().unwrap();
        assert_eq!(tok.kind, TokenKind::Minus);
    }

    #[test]
    fn lexes_hex_integer() {
        let mut lexer = Lexer::new("0x0F");
        let tok = lexer.next_token().unwrap();
        assert_eq!(tok.kind, TokenKind::IntegerLiteral);
        assert_eq!(tok.lexeme, "0x0F");
    }

    #[test]
    fn lexes_float_with_exponent() {
        let mut lexer = Lexer::new("1.0e3");
        let tok = lexer.next_token().unwrap();
        assert_eq!(tok.kind, TokenKind::FloatLiteral);
        assert_eq!(tok.lexeme, "1.0e3");
    }

    #[test]
    fn skips_line_and_block_comments() {
        let k = kinds("// hello\n/* world */ interface");
        assert_eq!(k, vec![TokenKind::Interface, TokenKind::Eof]);
    }

    #[test]
    fn unterminated_block_comment_is_an_error() {
        let mut lexer = Lexer::new("/* oops");
        assert!(matches!(
            lexer.next_token(),
            Err(Error::UnterminatedComment { .. })
        ));
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let mut lexer = Lexer::new("\"oops");
        assert!(matches!(
            lexer.next_token(),
            Err(Error::UnterminatedString { .. })
        ));
    }

    #[test]
    fn invalid_character_is_an_error() {
        let mut lexer = Lexer::new("@");
        assert!(matches!(
            lexer.next_token(),
            Err(Error::InvalidCharacter { .. })
        ));
    }

    #[test]
    fn cursor_round_trips() {
        let mut lexer = Lexer::new("interface Foo");
        let snap = lexer.cursor();
        let first = lexer.next_token().unwrap();
        lexer.restore(snap);
        let replayed = lexer.next_token().unwrap();
        assert_eq!(first, replayed);
    }

    #[test]
    fn eof_is_sticky() {
        let mut lexer = Lexer::new("");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn line_and_column_track_newlines() {
        let mut lexer = Lexer::new("a\nb");
        let a = lexer.next_token().unwrap();
        let b = lexer.next_token().unwrap();
        assert_eq!((a.line, a.column), (1, 1));
        assert_eq!((b.line, b.column), (2, 1));
    }
}
