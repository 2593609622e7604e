use crate::ast::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents all errors that can occur during parsing.
///
/// The parser records these and keeps going best-effort; a diagnostic never
/// aborts the parse.
pub enum ParseError {
    /// Found an unexpected token while parsing.
    UnexpectedToken {
        /// The token lexeme encountered.
        token: String,
        /// What the parser was expecting, when it can say.
        expected: String,
        /// Where the token was found.
        span: Span,
    },
    /// Reached the end of input unexpectedly.
    UnexpectedEndOfInput {
        /// The last known source position.
        span: Span,
    },
    /// A closing delimiter (`)`, `]`, `::`, or `end`) was expected but not
    /// found.
    MissingDelimiter {
        /// The delimiter that was expected.
        delimiter: &'static str,
        /// Where it was expected.
        span:      Span,
    },
    /// A conditional chain without `:` fallback was used where a value is
    /// required.
    IncompleteChain {
        /// Where the chain started.
        span: Span,
    },
    /// `fixed` and `dynamic` were combined in one declaration.
    FixedDynamicConflict {
        /// Where the declaration started.
        span: Span,
    },
    /// A non-dynamic array was declared without a size or initializer.
    ArrayNeedsInitializer {
        /// The array name.
        name: String,
        /// Where the declaration started.
        span: Span,
    },
    /// A parameter or return type annotation was missing or invalid.
    InvalidType {
        /// What was being annotated.
        context: &'static str,
        /// Where the annotation was expected.
        span:    Span,
    },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedToken { token, expected, span } => {
                write!(f, "Error at {span}: Unexpected token '{token}', expected {expected}.")
            },
            Self::UnexpectedEndOfInput { span } => {
                write!(f, "Error at {span}: Unexpected end of input.")
            },
            Self::MissingDelimiter { delimiter, span } => {
                write!(f, "Error at {span}: Expected '{delimiter}' but none found.")
            },
            Self::IncompleteChain { span } => {
                write!(f,
                       "Error at {span}: Conditional chain without ':' fallback used where a \
                        value is required.")
            },
            Self::FixedDynamicConflict { span } => {
                write!(f, "Error at {span}: 'fixed' and 'dynamic' are mutually exclusive.")
            },
            Self::ArrayNeedsInitializer { name, span } => {
                write!(f,
                       "Error at {span}: Non-dynamic array '{name}' needs a size or an \
                        initializer.")
            },
            Self::InvalidType { context, span } => {
                write!(f, "Error at {span}: Expected a type for {context}.")
            },
        }
    }
}

impl std::error::Error for ParseError {}
