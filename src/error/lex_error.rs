use crate::ast::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents all diagnostics the lexer can emit.
///
/// None of these stop the scan: the lexer records the diagnostic, produces
/// the best token it can, and keeps going.
pub enum LexError {
    /// A string literal was still open at end of input.
    UnterminatedString {
        /// Where the string started.
        span: Span,
    },
    /// A `#[ ... ]#` comment was never closed.
    UnterminatedComment {
        /// Where the comment started.
        span: Span,
    },
    /// A character that starts no token.
    UnknownCharacter {
        /// The offending character.
        character: char,
        /// Where it was found.
        span:      Span,
    },
    /// A numeric literal ending in a bare decimal point, e.g. `3.`.
    MalformedNumber {
        /// The literal text as scanned.
        literal: String,
        /// Where the number started.
        span:    Span,
    },
    /// A backslash escape the language does not define; the raw character
    /// is kept.
    UnknownEscape {
        /// The escaped character.
        character: char,
        /// Where the escape was found.
        span:      Span,
    },
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnterminatedString { span } => {
                write!(f, "Error at {span}: Unterminated string literal.")
            },
            Self::UnterminatedComment { span } => {
                write!(f, "Error at {span}: Unterminated multi-line comment (missing ']#').")
            },
            Self::UnknownCharacter { character, span } => {
                write!(f, "Error at {span}: Unknown character '{character}'.")
            },
            Self::MalformedNumber { literal, span } => {
                write!(f, "Error at {span}: Malformed number '{literal}': trailing decimal point.")
            },
            Self::UnknownEscape { character, span } => {
                write!(f, "Error at {span}: Unknown escape sequence '\\{character}'.")
            },
        }
    }
}

impl std::error::Error for LexError {}
