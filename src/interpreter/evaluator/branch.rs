use crate::{
    ast::{Body, CondArm, Expr, Span},
    error::RuntimeError,
    interpreter::{
        evaluator::core::Interp,
        scope::StoredVar,
        value::{ArrayValue, Value},
    },
};

impl Interp<'_> {
    /// Evaluates a conditional chain.
    ///
    /// Arms are tried in order; the first truthy condition yields its
    /// expression. When none matches, the fallback is evaluated if
    /// present. A chain without fallback yields `0`, which is diagnosed
    /// when `needs_value` is set (expression position) and silent in
    /// statement position.
    pub(crate) fn eval_cond_chain(&mut self,
                                  arms: &[CondArm],
                                  fallback: Option<&Expr>,
                                  span: Span,
                                  needs_value: bool)
                                  -> Value {
        for arm in arms {
            if self.eval_expr(&arm.cond).is_truthy() {
                return self.eval_expr(&arm.value);
            }
        }

        match fallback {
            Some(expr) => self.eval_expr(expr),
            None if needs_value => self.report(RuntimeError::IncompleteChain { span }),
            None => Value::Int(0),
        }
    }

    /// Evaluates an `if`/`elif`/`else` expression.
    ///
    /// Branch bodies run in the enclosing scope; with no matching branch
    /// and no `else`, the expression yields `0`.
    pub(crate) fn eval_if_expr(&mut self,
                               arms: &[(Expr, Body)],
                               else_body: Option<&Body>)
                               -> Value {
        for (cond, body) in arms {
            if self.eval_expr(cond).is_truthy() {
                return self.eval_body(body);
            }
        }

        match else_body {
            Some(body) => self.eval_body(body),
            None => Value::Int(0),
        }
    }

    /// Evaluates the filter `arr => cond`.
    ///
    /// For each element a scope is pushed with `x` bound (fixed) to the
    /// element's value; elements whose condition is truthy are kept, in
    /// order. The result shares cells with the source array.
    pub(crate) fn eval_filter(&mut self, array: &Expr, cond: &Expr, span: Span) -> Value {
        let source = self.eval_expr(array);
        let Value::Array(source) = source else {
            return self.report(RuntimeError::TypeError {
                details: format!("filter (=>) applies only to arrays, found {}",
                                 source.type_name()),
                span,
            });
        };

        let mut result = ArrayValue::default();

        for cell in &source.elements {
            self.push_scope();
            if let Some(scope) = self.scopes.last_mut() {
                scope.vars.insert("x".to_string(),
                                  StoredVar { value:   cell.borrow().clone(),
                                              dynamic: false,
                                              fixed:   true, });
            }

            let keep = self.eval_expr(cond).is_truthy();
            self.pop_scope();

            if keep {
                result.elements.push(cell.clone());
            }
        }

        Value::Array(result)
    }
}
