/// Core expression parsing.
///
/// Contains the parser state, the precedence-climbing expression engine,
/// postfix call/index chains, conditional chains, Elvis and filter layering,
/// lambdas, if-expressions, and range literals.
pub mod core;

/// Statement parsing.
///
/// Implements the statement-driven top level: declarations, assignments,
/// `echo`, loops, function definitions, and program/body assembly.
pub mod statement;

pub use core::Parser;
