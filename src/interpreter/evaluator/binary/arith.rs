use crate::{
    ast::{BinaryOperator, Span},
    error::RuntimeError,
    interpreter::{evaluator::core::Interp, value::Value},
};

impl Interp<'_> {
    /// Evaluates the arithmetic operators `+ - * / % **`.
    ///
    /// Integer pairs stay integer, except `**` which always produces a
    /// double. Mixing with a double promotes both sides. `%` requires two
    /// integers. Division or modulo by zero is diagnosed and yields `0`.
    pub(crate) fn eval_arith(&mut self,
                             op: BinaryOperator,
                             left: &Value,
                             right: &Value,
                             span: Span)
                             -> Value {
        use BinaryOperator::{Add, Div, Mod, Mul, Sub};

        if let (Value::Int(l), Value::Int(r)) = (left, right) {
            let (l, r) = (*l, *r);
            return match op {
                Add => Value::Int(l.wrapping_add(r)),
                Sub => Value::Int(l.wrapping_sub(r)),
                Mul => Value::Int(l.wrapping_mul(r)),
                Div => {
                    if r == 0 {
                        self.report(RuntimeError::DivisionByZero { span })
                    } else {
                        Value::Int(l.wrapping_div(r))
                    }
                },
                Mod => {
                    if r == 0 {
                        self.report(RuntimeError::ModuloByZero { span })
                    } else {
                        Value::Int(l.wrapping_rem(r))
                    }
                },
                // int ** int promotes to double.
                _ => Value::Real((l as f64).powf(r as f64)),
            };
        }

        let (Some(l), Some(r)) = (left.as_numeric(), right.as_numeric()) else {
            return self.report(RuntimeError::TypeError {
                details: format!("operator '{op}' is not defined for {} and {}",
                                 left.type_name(),
                                 right.type_name()),
                span,
            });
        };

        match op {
            Add => Value::Real(l + r),
            Sub => Value::Real(l - r),
            Mul => Value::Real(l * r),
            Div => {
                if r == 0.0 {
                    self.report(RuntimeError::DivisionByZero { span })
                } else {
                    Value::Real(l / r)
                }
            },
            Mod => {
                self.report(RuntimeError::TypeError { details: "modulo (%) requires two \
                                                                integers"
                                                                          .to_string(),
                                                      span })
            },
            _ => Value::Real(l.powf(r)),
        }
    }

    /// Evaluates the bitwise operators `& | ^ << >>` on integer pairs.
    ///
    /// Shift counts must lie in `0..64`.
    pub(crate) fn eval_bitwise(&mut self,
                               op: BinaryOperator,
                               left: &Value,
                               right: &Value,
                               span: Span)
                               -> Value {
        use BinaryOperator::{BitAnd, BitOr, BitXor, Shl};

        let (Value::Int(l), Value::Int(r)) = (left, right) else {
            return self.report(RuntimeError::TypeError {
                details: format!("operator '{op}' requires two integers, found {} and {}",
                                 left.type_name(),
                                 right.type_name()),
                span,
            });
        };
        let (l, r) = (*l, *r);

        match op {
            BitAnd => Value::Int(l & r),
            BitOr => Value::Int(l | r),
            BitXor => Value::Int(l ^ r),
            _ => {
                let Ok(shift) = u32::try_from(r) else {
                    return self.report(RuntimeError::InvalidArgument {
                        details: format!("shift count {r} is out of range"),
                        span,
                    });
                };
                if shift >= 64 {
                    return self.report(RuntimeError::InvalidArgument {
                        details: format!("shift count {r} is out of range"),
                        span,
                    });
                }

                if matches!(op, Shl) {
                    Value::Int(l.wrapping_shl(shift))
                } else {
                    Value::Int(l.wrapping_shr(shift))
                }
            },
        }
    }
}
