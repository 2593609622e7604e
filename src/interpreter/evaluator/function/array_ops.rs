use crate::{
    ast::{Expr, Span},
    error::RuntimeError,
    interpreter::{evaluator::core::Interp, value::Value},
};

/// `array_push(name, v)` — appends `v` to the dynamic array bound to
/// `name`.
///
/// The first argument must be an identifier, not an expression: the push
/// mutates the binding in place through its shared cells.
pub(crate) fn array_push(interp: &mut Interp<'_>, args: &[Expr], span: Span) -> Value {
    if args.len() != 2 {
        return interp.report(RuntimeError::ArityMismatch { name:     "array_push".to_string(),
                                                           expected: 2,
                                                           found:    args.len(),
                                                           span, });
    }

    let Some(name) = resolve_dynamic_array(interp, &args[0], "array_push", span) else {
        return Value::Int(0);
    };

    let value = interp.eval_expr(&args[1]);

    for scope in interp.scopes.iter_mut().rev() {
        if let Some(sv) = scope.vars.get_mut(&name) {
            if let Value::Array(array) = &mut sv.value {
                array.push(value);
            }
            break;
        }
    }

    Value::Int(0)
}

/// `array_pop(name)` — removes and returns the last element of the
/// dynamic array bound to `name`.
pub(crate) fn array_pop(interp: &mut Interp<'_>, args: &[Expr], span: Span) -> Value {
    if args.len() != 1 {
        return interp.report(RuntimeError::ArityMismatch { name:     "array_pop".to_string(),
                                                           expected: 1,
                                                           found:    args.len(),
                                                           span, });
    }

    let Some(name) = resolve_dynamic_array(interp, &args[0], "array_pop", span) else {
        return Value::Int(0);
    };

    let mut popped = None;
    for scope in interp.scopes.iter_mut().rev() {
        if let Some(sv) = scope.vars.get_mut(&name) {
            if let Value::Array(array) = &mut sv.value {
                popped = array.elements.pop().map(|cell| cell.borrow().clone());
            }
            break;
        }
    }

    match popped {
        Some(value) => value,
        None => interp.report(RuntimeError::InvalidArgument {
            details: format!("array_pop() on empty array '{name}'"),
            span,
        }),
    }
}

/// Validates the name argument shared by both array builtins.
///
/// Diagnoses a non-identifier argument, an undefined name, a non-array
/// binding, and a non-dynamic array.
fn resolve_dynamic_array(interp: &mut Interp<'_>,
                         arg: &Expr,
                         builtin: &str,
                         span: Span)
                         -> Option<String> {
    let Expr::Identifier { name, .. } = arg else {
        interp.report(RuntimeError::TypeError {
            details: format!("{builtin}() takes an array name, not an expression"),
            span,
        });
        return None;
    };

    let flags = interp.find_var(name)
                      .map(|sv| (sv.value.is_array(), sv.dynamic));

    let Some((is_array, dynamic)) = flags else {
        interp.report(RuntimeError::InvalidArgument {
            details: format!("array '{name}' is not defined"),
            span,
        });
        return None;
    };

    if !is_array {
        interp.report(RuntimeError::TypeError { details: format!("'{name}' is not an array"),
                                                span });
        return None;
    }

    if !dynamic {
        interp.report(RuntimeError::ImmutableArray { name: name.clone(),
                                                     span });
        return None;
    }

    Some(name.clone())
}
