use crate::{
    ast::{Body, Expr, Span},
    error::RuntimeError,
    interpreter::{evaluator::core::Interp, value::Value},
};

impl Interp<'_> {
    /// Evaluates `while (cond) [-> var] body`.
    ///
    /// The body runs in the enclosing scope. With a `-> var` clause the
    /// variable is read after every iteration and its final reading is the
    /// loop's value; without one the loop yields `0`.
    pub(crate) fn eval_while(&mut self, cond: &Expr, ret_var: Option<&str>, body: &Body) -> Value {
        let mut last = Value::Int(0);

        while self.eval_expr(cond).is_truthy() {
            self.eval_body(body);

            if let Some(name) = ret_var {
                last = self.lookup(name).unwrap_or(Value::Int(0));
            }
        }

        if ret_var.is_some() { last } else { Value::Int(0) }
    }

    /// Evaluates `for var in collection [-> var] body`.
    ///
    /// The collection must be an array. The iterator variable is
    /// (re)defined in the enclosing scope on every iteration and stays
    /// visible after the loop.
    pub(crate) fn eval_for_in(&mut self,
                              var: &str,
                              coll: &Expr,
                              ret_var: Option<&str>,
                              body: &Body,
                              span: Span)
                              -> Value {
        let collection = self.eval_expr(coll);
        let Value::Array(array) = collection else {
            return self.report(RuntimeError::TypeError {
                details: format!("for-in requires an array, found {}",
                                 collection.type_name()),
                span,
            });
        };

        let mut last = Value::Int(0);

        for cell in &array.elements {
            let element = cell.borrow().clone();
            self.define_var(var, element, false, false);

            self.eval_body(body);

            if let Some(name) = ret_var {
                last = self.lookup(name).unwrap_or(Value::Int(0));
            }
        }

        if ret_var.is_some() { last } else { Value::Int(0) }
    }
}
