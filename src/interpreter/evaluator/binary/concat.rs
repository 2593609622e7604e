use std::rc::Rc;

use crate::{
    ast::Span,
    error::RuntimeError,
    interpreter::{
        evaluator::core::Interp,
        value::{ArrayValue, FunctionValue, Value},
    },
};

impl Interp<'_> {
    /// Evaluates the `$` operator, overloaded by operand kinds.
    ///
    /// - string `$` string: byte concatenation.
    /// - array `$` array: a new array whose cells copy both inputs.
    /// - function `$` function: a composed function, left-to-right
    ///   pipeline order (`(f $ g)(x) = g(f(x))`). Both must be unary.
    /// - two ints or two doubles demand an explicit `str(...)` conversion.
    pub(crate) fn eval_concat(&mut self, left: Value, right: Value, span: Span) -> Value {
        match (left, right) {
            (Value::Str(l), Value::Str(r)) => Value::Str(l + &r),
            (Value::Array(l), Value::Array(r)) => {
                let mut out = ArrayValue { elements:
                                               Vec::with_capacity(l.len() + r.len()), };
                out.elements.extend(l.copy_cells().elements);
                out.elements.extend(r.copy_cells().elements);
                Value::Array(out)
            },
            (Value::Function(f), Value::Function(g)) => self.compose(&f, &g, span),
            (Value::Int(_), Value::Int(_)) => {
                self.report(RuntimeError::TypeError {
                    details: "'$' does not concatenate ints directly; convert explicitly, e.g. \
                              str(1) $ str(2)"
                                 .to_string(),
                    span,
                })
            },
            (Value::Real(_), Value::Real(_)) => {
                self.report(RuntimeError::TypeError {
                    details: "'$' does not concatenate doubles directly; convert explicitly, \
                              e.g. str(1.5) $ str(2.5)"
                                 .to_string(),
                    span,
                })
            },
            (left, right) => {
                self.report(RuntimeError::TypeError {
                    details: format!("'$' requires matching concatenable operands (string, \
                                      array, or function), found {} and {}",
                                     left.type_name(),
                                     right.type_name()),
                    span,
                })
            },
        }
    }

    /// Builds the composed function for `f $ g`.
    ///
    /// Both operands must take exactly one parameter. The composed value
    /// stores the two snapshots; its own body is never evaluated.
    fn compose(&mut self,
               f: &Rc<FunctionValue>,
               g: &Rc<FunctionValue>,
               span: Span)
               -> Value {
        if f.params.len() != 1 {
            return self.report(RuntimeError::TypeError {
                details: format!("composition requires unary functions (left operand takes {} \
                                  parameters)",
                                 f.params.len()),
                span,
            });
        }
        if g.params.len() != 1 {
            return self.report(RuntimeError::TypeError {
                details: format!("composition requires unary functions (right operand takes {} \
                                  parameters)",
                                 g.params.len()),
                span,
            });
        }

        let composed = FunctionValue { params:      f.params.clone(),
                                       body:        f.body.clone(),
                                       return_type: g.return_type.clone(),
                                       captured:    std::collections::HashMap::new(),
                                       composed:    vec![f.clone(), g.clone()], };

        Value::Function(Rc::new(composed))
    }
}
