//! Unified error type for the lexer and parser.
//!
//! Mirrors the error taxonomy in the specification: lexical errors are
//! fatal and unrecoverable; `UnexpectedToken` is recoverable via panic-mode
//! synchronization at the top-level definition loop.

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    UnterminatedComment { line: usize, column: usize },
    UnterminatedString { line: usize, column: usize },
    InvalidCharacter { ch: char, line: usize, column: usize },
    InvalidNumberLiteral { lexeme: String, line: usize, column: usize },
    UnexpectedToken { message: String, line: usize, column: usize },
}

impl Error {
    pub fn line(&self) -> usize {
        match self {
            Error::UnterminatedComment { line, .. }
            | Error::UnterminatedString { line, .. }
            | Error::InvalidCharacter { line, .. }
            | Error::InvalidNumberLiteral { line, .. }
            | Error::UnexpectedToken { line, .. } => *line,
        }
    }

    pub fn column(&self) -> usize {
        match self {
            Error::UnterminatedComment { column, .. }
            | Error::UnterminatedString { column, .. }
            | Error::InvalidCharacter { column, .. }
            | Error::InvalidNumberLiteral { column, .. }
            | Error::UnexpectedToken { column, .. } => *column,
        }
    }

    /// True for errors that panic-mode synchronization may recover from at
    /// the top-level definition loop (§4.3.11 / §7 of the specification).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::UnexpectedToken { .. })
    }

    /// The single-sentence diagnostic message, without position or filename.
    pub fn message(&self) -> String {
        match self {
            Error::UnterminatedComment { .. } => "Unterminated block comment".to_string(),
            Error::UnterminatedString { .. } => "Unterminated string literal".to_string(),
            Error::InvalidCharacter { ch, .. } => format!("Invalid character {:?}", ch),
            Error::InvalidNumberLiteral { lexeme, .. } => {
                format!("Invalid number literal {:?}", lexeme)
            }
            Error::UnexpectedToken { message, .. } => message.clone(),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: error: {}", self.line(), self.column(), self.message())
    }
}

impl std::error::Error for Error {}

/// Renders the single-line diagnostic channel described in §6.4:
/// `<filename>:<line>:<column>: error: <message>`.
pub fn format_diagnostic(filename: &str, error: &Error) -> String {
    format!(
        "{}:{}:{}: error: {}",
        filename,
        error.line(),
        error.column(),
        error.message()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_line_has_expected_shape() {
        let err = Error::UnexpectedToken {
            message: "Expected ')'".to_string(),
            line: 3,
            column: 7,
        };
        assert_eq!(
            format_diagnostic("foo.idl", &err),
            "foo.idl:3:7: error: Expected ')'"
        );
    }

    #[test]
    fn lexical_errors_are_unrecoverable() {
        let err = Error::UnterminatedString { line: 1, column: 1 };
        assert!(!err.is_recoverable());
    }
}
