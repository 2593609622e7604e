/// Lexical errors.
///
/// Defines the diagnostics the lexer can emit while scanning source text:
/// unterminated strings and comments, malformed numbers, unknown escapes and
/// characters. Lexing always continues past them.
pub mod lex_error;
/// Parsing errors.
///
/// Defines all error types that can occur while building the syntax tree:
/// missing delimiters, unexpected tokens, invalid declarations, and misuse of
/// conditional chains. Parsing continues best-effort past them.
pub mod parse_error;
/// Runtime errors.
///
/// Contains all error types that can be raised during evaluation. Runtime
/// errors include things like division by zero, type mismatches, invalid
/// ranges, and violations of the `fixed`/`dynamic` binding attributes.
pub mod runtime_error;

pub use lex_error::LexError;
pub use parse_error::ParseError;
pub use runtime_error::RuntimeError;
