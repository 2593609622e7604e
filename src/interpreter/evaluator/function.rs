/// Call dispatch and user-defined function invocation.
///
/// Resolves names to function values, checks arity, reinstates capture
/// snapshots, runs composed pipelines, and applies the `zero` return rule.
pub mod core;

/// Built-in functions receiving evaluated argument values.
pub mod builtin;

/// The name-based `array_push`/`array_pop` built-ins.
///
/// These two inspect their first argument *before* evaluation: it must be
/// the identifier of a dynamic array, which is then mutated in place.
pub mod array_ops;
