use crate::{
    ast::{Span, UnaryOperator},
    error::RuntimeError,
    interpreter::{evaluator::core::Interp, value::Value},
};

impl Interp<'_> {
    /// Applies a prefix unary operator to an evaluated operand.
    ///
    /// `-` negates numbers, `!` inverts truthiness, `~` is bitwise NOT on
    /// integers. Anything else is a diagnosed type error yielding `0`.
    pub(crate) fn eval_unary(&mut self, op: UnaryOperator, value: &Value, span: Span) -> Value {
        match op {
            UnaryOperator::Negate => match value {
                Value::Int(n) => Value::Int(n.wrapping_neg()),
                Value::Real(r) => Value::Real(-r),
                other => {
                    self.report(RuntimeError::TypeError { details: format!("unary '{op}' is not \
                                                                            defined for {}",
                                                                           other.type_name()),
                                                          span })
                },
            },
            UnaryOperator::Not => Value::Int(i64::from(!value.is_truthy())),
            UnaryOperator::BitNot => match value {
                Value::Int(n) => Value::Int(!n),
                other => {
                    self.report(RuntimeError::TypeError { details: format!("unary '{op}' \
                                                                            requires an \
                                                                            integer, found {}",
                                                                           other.type_name()),
                                                          span })
                },
            },
        }
    }
}
