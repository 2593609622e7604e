use crate::{
    ast::{Expr, Span},
    error::RuntimeError,
    interpreter::{
        evaluator::core::Interp,
        range::{RangeBounds, normalize_index, normalize_range},
        utf8,
        value::{ArrayValue, Value},
    },
};

impl Interp<'_> {
    /// Evaluates `expr[index]` / `expr[range]`.
    ///
    /// Strings are indexed by Unicode codepoint, arrays by cell. A single
    /// index returns the element value (a copy, not a reference); a range
    /// returns a new string or a new array with copied cells. Failures are
    /// diagnosed and yield the neutral empty string / empty array / `0`.
    pub(crate) fn eval_index(&mut self, target: &Expr, index: &Expr, span: Span) -> Value {
        let target = self.eval_expr(target);

        if let Expr::Range { start, end, .. } = index {
            let Some(bounds) = self.eval_range_bounds(start.as_deref(), end.as_deref(), span)
            else {
                return Value::Int(0);
            };
            return self.slice_value(&target, &bounds, span);
        }

        let index_value = self.eval_expr(index);
        let Some(index) = index_value.as_int() else {
            return self.report(RuntimeError::TypeError { details: "index must be an integer"
                                                                      .to_string(),
                                                         span });
        };

        match target {
            Value::Str(s) => {
                let cps = match utf8::decode(s.as_bytes()) {
                    Ok(cps) => cps,
                    Err(e) => {
                        return self.report_with(RuntimeError::InvalidUtf8 { details:
                                                                                e.to_string(),
                                                                            span },
                                                Value::Str(String::new()));
                    },
                };

                let Some(normalized) = normalize_index(index, cps.len()) else {
                    return self.report_with(RuntimeError::IndexOutOfBounds { index,
                                                                             len: cps.len(),
                                                                             span },
                                            Value::Str(String::new()));
                };

                let bytes = utf8::encode(&cps[normalized..=normalized]);
                Value::Str(String::from_utf8(bytes).unwrap_or_default())
            },
            Value::Array(a) => {
                let Some(normalized) = normalize_index(index, a.len()) else {
                    return self.report(RuntimeError::IndexOutOfBounds { index,
                                                                        len: a.len(),
                                                                        span });
                };
                a.elements[normalized].borrow().clone()
            },
            other => {
                self.report(RuntimeError::TypeError {
                    details: format!("value of type {} is not indexable (array or string \
                                      required)",
                                     other.type_name()),
                    span,
                })
            },
        }
    }

    /// Evaluates the bound expressions of a range into [`RangeBounds`].
    ///
    /// # Returns
    /// `None` when a bound is present but not an integer (already
    /// diagnosed).
    pub(crate) fn eval_range_bounds(&mut self,
                                    start: Option<&Expr>,
                                    end: Option<&Expr>,
                                    span: Span)
                                    -> Option<RangeBounds> {
        let start = match start {
            Some(expr) => {
                let value = self.eval_expr(expr);
                match value.as_int() {
                    Some(n) => Some(n),
                    None => {
                        self.report(RuntimeError::TypeError { details: "range start must be an \
                                                                        integer"
                                                                                  .to_string(),
                                                              span });
                        return None;
                    },
                }
            },
            None => None,
        };

        let end = match end {
            Some(expr) => {
                let value = self.eval_expr(expr);
                match value.as_int() {
                    Some(n) => Some(n),
                    None => {
                        self.report(RuntimeError::TypeError { details: "range end must be an \
                                                                        integer"
                                                                                  .to_string(),
                                                              span });
                        return None;
                    },
                }
            },
            None => None,
        };

        Some(RangeBounds { start, end })
    }

    /// Slices a string or array value by normalized range.
    ///
    /// Slices are copies: string slices re-encode the selected codepoints,
    /// array slices copy each selected cell's value into a fresh cell.
    /// Slicing an empty collection yields the empty result without a
    /// diagnostic.
    pub(crate) fn slice_value(&mut self, target: &Value, bounds: &RangeBounds, span: Span) -> Value {
        match target {
            Value::Str(s) => {
                let cps = match utf8::decode(s.as_bytes()) {
                    Ok(cps) => cps,
                    Err(e) => {
                        return self.report_with(RuntimeError::InvalidUtf8 { details:
                                                                                e.to_string(),
                                                                            span },
                                                Value::Str(String::new()));
                    },
                };

                if cps.is_empty() {
                    return Value::Str(String::new());
                }

                let Some((from, to)) = normalize_range(cps.len(), bounds) else {
                    return self.report_with(RuntimeError::InvalidRange { target: "string",
                                                                         span },
                                            Value::Str(String::new()));
                };

                let bytes = utf8::encode(&cps[from..=to]);
                Value::Str(String::from_utf8(bytes).unwrap_or_default())
            },
            Value::Array(a) => {
                if a.is_empty() {
                    return Value::Array(ArrayValue::default());
                }

                let Some((from, to)) = normalize_range(a.len(), bounds) else {
                    return self.report_with(RuntimeError::InvalidRange { target: "array",
                                                                         span },
                                            Value::Array(ArrayValue::default()));
                };

                let copied: Vec<Value> = a.elements[from..=to].iter()
                                                              .map(|cell| cell.borrow().clone())
                                                              .collect();
                Value::Array(copied.into_iter().collect())
            },
            other => {
                self.report(RuntimeError::TypeError {
                    details: format!("slicing applies only to strings and arrays, found {}",
                                     other.type_name()),
                    span,
                })
            },
        }
    }
}
