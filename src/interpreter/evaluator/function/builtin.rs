use std::io::BufRead;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    ast::Span,
    error::RuntimeError,
    interpreter::{
        evaluator::core::Interp,
        utf8,
        value::{ArrayValue, Value},
    },
    util::num::usize_to_i64,
};

/// Type alias for builtin function handlers.
///
/// A builtin receives the evaluator (for diagnostics, the RNG, and I/O), a
/// slice of evaluated argument values, and the call-site span.
type BuiltinFn = for<'a, 'io> fn(&'a mut Interp<'io>, &[Value], Span) -> Value;

/// Specifies the allowed number of arguments for a builtin.
#[derive(Clone, Copy)]
enum Arity {
    /// The builtin must receive exactly this many arguments.
    Exact(usize),
    /// The builtin accepts any arity listed here.
    OneOf(&'static [usize]),
}

impl Arity {
    /// Tests whether the given argument count satisfies this constraint.
    fn check(self, n: usize) -> bool {
        match self {
            Self::Exact(m) => n == m,
            Self::OneOf(options) => options.contains(&n),
        }
    }

    /// A representative expected count for the arity-mismatch diagnostic.
    const fn expected(self) -> usize {
        match self {
            Self::Exact(m) => m,
            Self::OneOf(options) => {
                if options.is_empty() { 0 } else { options[0] }
            },
        }
    }
}

/// Defines the value-receiving builtins as a lookup table.
///
/// Each entry provides a surface name, an arity specification, and the
/// handler. `array_push`/`array_pop` are not listed: they receive raw
/// argument nodes and dispatch separately.
macro_rules! builtin_functions {
    (
        $(
            $name:literal => {
                arity: $arity:expr,
                func: $func:expr $(,)?
            }
        ),* $(,)?
    ) => {
        struct BuiltinDef {
            name:  &'static str,
            arity: Arity,
            func:  BuiltinFn,
        }
        static BUILTIN_TABLE: &[BuiltinDef] = &[
            $(
                BuiltinDef { name: $name, arity: $arity, func: $func },
            )*
        ];
    };
}

builtin_functions! {
    "str"          => { arity: Arity::Exact(1), func: stringify },
    "len"          => { arity: Arity::Exact(1), func: len },
    "toInt"        => { arity: Arity::Exact(1), func: to_int },
    "toDouble"     => { arity: Arity::Exact(1), func: to_double },
    "typeOf"       => { arity: Arity::Exact(1), func: type_of },
    "input"        => { arity: Arity::Exact(0), func: input },
    "range"        => { arity: Arity::OneOf(&[1, 2, 3]), func: range },
    "randInt"      => { arity: Arity::Exact(2), func: rand_int },
    "randDouble"   => { arity: Arity::Exact(0), func: rand_double },
    "array_length" => { arity: Arity::Exact(1), func: array_length },
    "array_first"  => { arity: Arity::Exact(1), func: array_first },
    "array_last"   => { arity: Arity::Exact(1), func: array_last },
}

/// `true` when `name` is a value-receiving builtin (or one of the
/// name-based array builtins, which dispatch elsewhere).
#[must_use]
pub(crate) fn is_builtin(name: &str) -> bool {
    name == "array_push"
    || name == "array_pop"
    || BUILTIN_TABLE.iter().any(|b| b.name == name)
}

/// Looks up and runs a builtin with already-evaluated arguments.
pub(crate) fn dispatch(interp: &mut Interp<'_>, name: &str, args: &[Value], span: Span) -> Value {
    let Some(def) = BUILTIN_TABLE.iter().find(|b| b.name == name) else {
        return interp.report(RuntimeError::UnknownFunction { name: name.to_string(),
                                                             span });
    };

    if !def.arity.check(args.len()) {
        return interp.report(RuntimeError::ArityMismatch { name:     name.to_string(),
                                                           expected: def.arity.expected(),
                                                           found:    args.len(),
                                                           span, });
    }

    (def.func)(interp, args, span)
}

/// `str(v)` — the stringified rendering of any value.
fn stringify(_: &mut Interp<'_>, args: &[Value], _: Span) -> Value {
    Value::Str(args[0].to_string())
}

/// `len(v)` — codepoint count for strings, cell count for arrays.
fn len(interp: &mut Interp<'_>, args: &[Value], span: Span) -> Value {
    match &args[0] {
        Value::Str(s) => match utf8::decode(s.as_bytes()) {
            Ok(cps) => Value::Int(usize_to_i64(cps.len()).unwrap_or(i64::MAX)),
            Err(e) => interp.report(RuntimeError::InvalidUtf8 { details: e.to_string(),
                                                                span }),
        },
        Value::Array(a) => Value::Int(usize_to_i64(a.len()).unwrap_or(i64::MAX)),
        other => interp.report(RuntimeError::TypeError {
            details: format!("len() supports only strings and arrays, found {}",
                             other.type_name()),
            span,
        }),
    }
}

/// `toInt(v)` — ints pass through, doubles truncate, strings parse.
fn to_int(interp: &mut Interp<'_>, args: &[Value], span: Span) -> Value {
    match &args[0] {
        Value::Int(n) => Value::Int(*n),
        Value::Real(r) => Value::Int(*r as i64),
        Value::Str(s) => match s.trim().parse::<i64>() {
            Ok(n) => Value::Int(n),
            Err(_) => interp.report(RuntimeError::InvalidArgument {
                details: format!("toInt() cannot convert \"{s}\""),
                span,
            }),
        },
        other => interp.report(RuntimeError::TypeError {
            details: format!("toInt() does not support {}", other.type_name()),
            span,
        }),
    }
}

/// `toDouble(v)` — doubles pass through, ints widen, strings parse.
fn to_double(interp: &mut Interp<'_>, args: &[Value], span: Span) -> Value {
    match &args[0] {
        Value::Real(r) => Value::Real(*r),
        Value::Int(n) => Value::Real(*n as f64),
        Value::Str(s) => match s.trim().parse::<f64>() {
            Ok(r) => Value::Real(r),
            Err(_) => interp.report(RuntimeError::InvalidArgument {
                details: format!("toDouble() cannot convert \"{s}\""),
                span,
            }),
        },
        other => interp.report(RuntimeError::TypeError {
            details: format!("toDouble() does not support {}", other.type_name()),
            span,
        }),
    }
}

/// `typeOf(v)` — one of `"int"`, `"double"`, `"string"`, `"func"`,
/// `"array"`.
fn type_of(_: &mut Interp<'_>, args: &[Value], _: Span) -> Value {
    Value::Str(args[0].type_name().to_string())
}

/// `input()` — reads one line from stdin, without its terminator.
///
/// End of input reads as the empty string.
fn input(_: &mut Interp<'_>, _: &[Value], _: Span) -> Value {
    let mut line = String::new();
    let _ = std::io::stdin().lock().read_line(&mut line);

    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }

    Value::Str(line)
}

/// `range(end)`, `range(start, end)`, `range(start, end, step)` — a
/// half-open integer sequence, ascending or descending by `step`.
fn range(interp: &mut Interp<'_>, args: &[Value], span: Span) -> Value {
    let mut bounds = [0_i64, 0, 1];

    for (slot, arg) in bounds.iter_mut().zip(args) {
        let Some(n) = arg.as_int() else {
            return interp.report(RuntimeError::TypeError { details: "range() arguments must \
                                                                     be integers"
                                                                        .to_string(),
                                                           span });
        };
        *slot = n;
    }

    let (start, end, step) = match args.len() {
        1 => (0, bounds[0], 1),
        2 => (bounds[0], bounds[1], 1),
        _ => (bounds[0], bounds[1], bounds[2]),
    };

    if step == 0 {
        return interp.report(RuntimeError::InvalidArgument { details: "range() step must not \
                                                                       be 0"
                                                                          .to_string(),
                                                             span, });
    }

    let mut result = ArrayValue::default();
    let mut current = start;

    while (step > 0 && current < end) || (step < 0 && current > end) {
        result.push(Value::Int(current));
        let Some(next) = current.checked_add(step) else {
            break;
        };
        current = next;
    }

    Value::Array(result)
}

/// `randInt(lo, hi)` — uniform integer in `[lo, hi)`; requires `lo < hi`.
fn rand_int(interp: &mut Interp<'_>, args: &[Value], span: Span) -> Value {
    let (Some(lo), Some(hi)) = (args[0].as_int(), args[1].as_int()) else {
        return interp.report(RuntimeError::TypeError { details: "randInt() arguments must be \
                                                                 integers"
                                                                    .to_string(),
                                                       span });
    };

    if lo >= hi {
        return interp.report(RuntimeError::InvalidArgument {
            details: format!("randInt() requires lo < hi, found {lo} and {hi}"),
            span,
        });
    }

    let rng = interp.rng.get_or_insert_with(StdRng::from_entropy);
    Value::Int(rng.gen_range(lo..hi))
}

/// `randDouble()` — uniform double in `[0, 1)`.
fn rand_double(interp: &mut Interp<'_>, _: &[Value], _: Span) -> Value {
    let rng = interp.rng.get_or_insert_with(StdRng::from_entropy);
    Value::Real(rng.r#gen::<f64>())
}

/// `array_length(v)` — the cell count of an array value.
fn array_length(interp: &mut Interp<'_>, args: &[Value], span: Span) -> Value {
    match &args[0] {
        Value::Array(a) => Value::Int(usize_to_i64(a.len()).unwrap_or(i64::MAX)),
        other => interp.report(RuntimeError::TypeError {
            details: format!("array_length() supports only arrays, found {}",
                             other.type_name()),
            span,
        }),
    }
}

/// `array_first(v)` — the first element of a non-empty array.
fn array_first(interp: &mut Interp<'_>, args: &[Value], span: Span) -> Value {
    match &args[0] {
        Value::Array(a) => match a.elements.first() {
            Some(cell) => cell.borrow().clone(),
            None => interp.report(RuntimeError::InvalidArgument {
                details: "array_first() on an empty array".to_string(),
                span,
            }),
        },
        other => interp.report(RuntimeError::TypeError {
            details: format!("array_first() supports only arrays, found {}",
                             other.type_name()),
            span,
        }),
    }
}

/// `array_last(v)` — the last element of a non-empty array.
fn array_last(interp: &mut Interp<'_>, args: &[Value], span: Span) -> Value {
    match &args[0] {
        Value::Array(a) => match a.elements.last() {
            Some(cell) => cell.borrow().clone(),
            None => interp.report(RuntimeError::InvalidArgument {
                details: "array_last() on an empty array".to_string(),
                span,
            }),
        },
        other => interp.report(RuntimeError::TypeError {
            details: format!("array_last() supports only arrays, found {}",
                             other.type_name()),
            span,
        }),
    }
}
