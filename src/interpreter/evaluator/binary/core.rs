use crate::{
    ast::{BinaryOperator, Expr, Span},
    error::RuntimeError,
    interpreter::{
        evaluator::core::Interp,
        range::normalize_range,
        utf8,
        value::Value,
    },
};

impl Interp<'_> {
    /// Evaluates a binary operator expression.
    ///
    /// The one special shape is `left $ <range>`: the range is evaluated
    /// against `left` itself, effectively `left $ left[range]`, and an
    /// invalid range aborts the whole operation with a diagnostic.
    pub(crate) fn eval_binary_expr(&mut self,
                                   op: BinaryOperator,
                                   lhs: &Expr,
                                   rhs: &Expr,
                                   span: Span)
                                   -> Value {
        if matches!(op, BinaryOperator::Concat)
           && let Expr::Range { start, end, .. } = rhs
        {
            return self.eval_concat_range(lhs, start.as_deref(), end.as_deref(), span);
        }

        let left = self.eval_expr(lhs);
        let right = self.eval_expr(rhs);
        self.eval_binary(op, left, right, span)
    }

    /// Applies a binary operator to two evaluated operands.
    pub(crate) fn eval_binary(&mut self,
                              op: BinaryOperator,
                              left: Value,
                              right: Value,
                              span: Span)
                              -> Value {
        use BinaryOperator::{
            Add, BitAnd, BitOr, BitXor, Concat, Div, Equal, Greater, GreaterEqual, Less,
            LessEqual, Mod, Mul, NotEqual, Pow, Shl, Shr, Sub,
        };

        match op {
            Add | Sub | Mul | Div | Mod | Pow => self.eval_arith(op, &left, &right, span),
            Less | LessEqual | Greater | GreaterEqual => {
                self.eval_comparison(op, &left, &right, span)
            },
            Equal => Value::Int(i64::from(left.to_string() == right.to_string())),
            NotEqual => Value::Int(i64::from(left.to_string() != right.to_string())),
            BitAnd | BitOr | BitXor | Shl | Shr => self.eval_bitwise(op, &left, &right, span),
            Concat => self.eval_concat(left, right, span),
        }
    }

    /// Evaluates `left $ <range>`: slice `left` by the range, then
    /// concatenate. The range must fully validate against `left`.
    fn eval_concat_range(&mut self,
                         lhs: &Expr,
                         start: Option<&Expr>,
                         end: Option<&Expr>,
                         span: Span)
                         -> Value {
        let left = self.eval_expr(lhs);
        let Some(bounds) = self.eval_range_bounds(start, end, span) else {
            return Value::Int(0);
        };

        let right = match &left {
            Value::Str(s) => {
                let cps = match utf8::decode(s.as_bytes()) {
                    Ok(cps) => cps,
                    Err(e) => {
                        return self.report(RuntimeError::InvalidUtf8 { details: e.to_string(),
                                                                       span });
                    },
                };
                let Some((from, to)) = normalize_range(cps.len(), &bounds) else {
                    return self.report(RuntimeError::InvalidRange { target: "string",
                                                                    span });
                };
                let bytes = utf8::encode(&cps[from..=to]);
                Value::Str(String::from_utf8(bytes).unwrap_or_default())
            },
            Value::Array(a) => {
                let Some((from, to)) = normalize_range(a.len(), &bounds) else {
                    return self.report(RuntimeError::InvalidRange { target: "array",
                                                                    span });
                };
                let copied: Vec<Value> = a.elements[from..=to].iter()
                                                              .map(|cell| cell.borrow().clone())
                                                              .collect();
                Value::Array(copied.into_iter().collect())
            },
            other => {
                return self.report(RuntimeError::TypeError {
                    details: format!("a range after '$' applies only to strings and arrays, \
                                      found {}",
                                     other.type_name()),
                    span,
                });
            },
        };

        self.eval_concat(left, right, span)
    }
}
