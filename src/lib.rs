//! # tusk
//!
//! tusk is a tree-walking interpreter for the Tusk scripting language,
//! a small dynamically-evaluated language with first-class functions,
//! `$`-composition, conditional chains, and universal slicing of strings
//! (by Unicode codepoint) and arrays.
//!
//! The pipeline is strictly one-way: source text is tokenized, parsed into
//! a tree of closed-sum nodes, and evaluated. Diagnostics from every stage
//! carry a line and column and are reported to a sink; evaluation is
//! fail-soft and never unwinds.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

use std::io::Write;

/// Defines the structure of parsed code.
///
/// This module declares the statement and expression enums and related
/// types that represent the syntactic structure of source code as a tree.
/// The tree is built by the parser, immutable afterwards, and traversed by
/// the evaluator.
///
/// # Responsibilities
/// - Defines node types for all language constructs.
/// - Attaches source locations to nodes for error reporting.
/// - Keeps node kinds a closed sum, so dispatch is exhaustive.
pub mod ast;
/// Provides unified error types for lexing, parsing, and evaluation.
///
/// This module defines all diagnostics the pipeline can emit. Every
/// variant carries a source span; none of them abort their stage.
///
/// # Responsibilities
/// - Defines error enums for all failure modes (lexer, parser, evaluator).
/// - Attaches line/column positions and detailed messages.
/// - Supports integration with standard error handling traits.
pub mod error;
/// Orchestrates the entire process of code execution.
///
/// This module ties together lexing, parsing, evaluation, value
/// representations, scoping, the UTF-8 codec, and range handling to
/// provide a complete runtime for Tusk source code.
///
/// # Responsibilities
/// - Coordinates all core components: lexer, parser, evaluator.
/// - Provides the data types flowing between phases.
/// - Manages the flow of diagnostics between phases.
pub mod interpreter;
/// General utilities for safe numeric conversion.
///
/// # Responsibilities
/// - Safely convert between `i64` and `usize` without silent data loss.
pub mod util;

use crate::{
    ast::Program,
    error::{LexError, ParseError},
    interpreter::{
        evaluator::core::Interp,
        lexer::{Lexer, Token},
        parser::Parser,
    },
};

/// Tokenizes a source string.
///
/// # Returns
/// The token stream (terminated by an end-of-file token) together with
/// every lexical diagnostic.
///
/// # Examples
/// ```
/// use tusk::{interpreter::lexer::TokenKind, tokenize};
///
/// let (tokens, diags) = tokenize("echo 1..3");
/// assert!(diags.is_empty());
/// assert!(tokens.iter().any(|t| t.kind == TokenKind::DotDot));
/// ```
#[must_use]
pub fn tokenize(source: &str) -> (Vec<Token>, Vec<LexError>) {
    Lexer::new(source).tokenize()
}

/// Tokenizes and parses a source string.
///
/// # Returns
/// The parsed program plus the lexical and syntactic diagnostics. The
/// program is always produced; after a diagnostic it reflects the parser's
/// best-effort recovery.
#[must_use]
pub fn parse(source: &str) -> (Program, Vec<LexError>, Vec<ParseError>) {
    let (tokens, lex_diags) = tokenize(source);
    let (program, parse_diags) = Parser::new(tokens).parse_program();
    (program, lex_diags, parse_diags)
}

/// Evaluates a source string against caller-supplied output sinks.
///
/// Lexical and syntactic diagnostics are written to `diag` first, then the
/// program runs with `out` as its standard output and `diag` receiving
/// runtime diagnostics.
///
/// # Returns
/// The process exit status: always `0` — diagnosed errors do not alter it.
///
/// # Examples
/// ```
/// let mut out = Vec::new();
/// let mut diag = Vec::new();
///
/// let status = tusk::evaluate_with("echo 2 + 3", &mut out, &mut diag);
///
/// assert_eq!(status, 0);
/// assert_eq!(String::from_utf8(out).unwrap(), "5\n");
/// assert!(diag.is_empty());
/// ```
pub fn evaluate_with(source: &str, out: &mut dyn Write, diag: &mut dyn Write) -> i32 {
    let (program, lex_diags, parse_diags) = parse(source);

    for d in &lex_diags {
        let _ = writeln!(diag, "{d}");
    }
    for d in &parse_diags {
        let _ = writeln!(diag, "{d}");
    }

    let mut interp = Interp::new(out, diag);
    interp.run(&program);

    0
}

/// Evaluates a source string against the process stdout/stderr.
///
/// # Returns
/// The process exit status: always `0` — diagnosed errors do not alter it.
pub fn evaluate(source: &str) -> i32 {
    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    evaluate_with(source, &mut stdout.lock(), &mut stderr.lock())
}
