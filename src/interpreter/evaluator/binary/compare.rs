use crate::{
    ast::{BinaryOperator, Span},
    error::RuntimeError,
    interpreter::{evaluator::core::Interp, value::Value},
};

impl Interp<'_> {
    /// Evaluates the ordering comparisons `< <= > >=`.
    ///
    /// Both operands must be numeric; the result is integer `1` or `0`.
    pub(crate) fn eval_comparison(&mut self,
                                  op: BinaryOperator,
                                  left: &Value,
                                  right: &Value,
                                  span: Span)
                                  -> Value {
        let Some(l) = left.as_numeric() else {
            return self.report(RuntimeError::TypeError {
                details: format!("left operand of '{op}' is not numeric ({})",
                                 left.type_name()),
                span,
            });
        };
        let Some(r) = right.as_numeric() else {
            return self.report(RuntimeError::TypeError {
                details: format!("right operand of '{op}' is not numeric ({})",
                                 right.type_name()),
                span,
            });
        };

        let result = match op {
            BinaryOperator::Less => l < r,
            BinaryOperator::LessEqual => l <= r,
            BinaryOperator::Greater => l > r,
            _ => l >= r,
        };

        Value::Int(i64::from(result))
    }
}
