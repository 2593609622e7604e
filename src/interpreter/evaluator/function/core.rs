use crate::{
    ast::{Expr, Span, TypeSpec},
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::Interp,
            function::{array_ops, builtin},
        },
        value::{FunctionValue, Value},
    },
};

impl Interp<'_> {
    /// Evaluates a call with an identifier head.
    ///
    /// Resolution order: user functions and function-valued variables via
    /// name lookup, then the built-in table, then a diagnosed unknown
    /// function. `array_push`/`array_pop` receive their argument nodes
    /// unevaluated.
    pub(crate) fn eval_call(&mut self, name: &str, args: &[Expr], span: Span) -> Value {
        if let Some(Value::Function(func)) = self.lookup(name) {
            let arg_values: Vec<Value> = args.iter().map(|a| self.eval_expr(a)).collect();
            return self.call_function(&func, arg_values, name, span);
        }

        match name {
            "array_push" => array_ops::array_push(self, args, span),
            "array_pop" => array_ops::array_pop(self, args, span),
            _ if builtin::is_builtin(name) => {
                let arg_values: Vec<Value> = args.iter().map(|a| self.eval_expr(a)).collect();
                builtin::dispatch(self, name, &arg_values, span)
            },
            _ => {
                self.report(RuntimeError::UnknownFunction { name: name.to_string(),
                                                            span })
            },
        }
    }

    /// Evaluates a call on an arbitrary callee expression,
    /// e.g. `(doubler $ addFive)(10)`.
    pub(crate) fn eval_call_expr(&mut self, callee: &Expr, args: &[Expr], span: Span) -> Value {
        let callee_value = self.eval_expr(callee);

        let Value::Function(func) = callee_value else {
            return self.report(RuntimeError::TypeError {
                details: format!("called expression is not a function ({})",
                                 callee_value.type_name()),
                span,
            });
        };

        let arg_values: Vec<Value> = args.iter().map(|a| self.eval_expr(a)).collect();
        self.call_function(&func, arg_values, "<expression>", span)
    }

    /// Invokes a function value with already-evaluated arguments.
    ///
    /// Arity is checked first. A composed value threads `args[0]` through
    /// its stages, each stage invoked through this same path (so nested
    /// compositions work). A plain value runs in a fresh scope: captures
    /// reinstated, parameters bound on top, body evaluated. A declared
    /// `zero` return type discards the body's value.
    pub(crate) fn call_function(&mut self,
                                func: &FunctionValue,
                                args: Vec<Value>,
                                name: &str,
                                span: Span)
                                -> Value {
        if args.len() != func.params.len() {
            return self.report(RuntimeError::ArityMismatch { name: name.to_string(),
                                                             expected: func.params.len(),
                                                             found: args.len(),
                                                             span });
        }

        if !func.composed.is_empty() {
            let mut running = args.into_iter().next().unwrap_or(Value::Int(0));

            for stage in &func.composed {
                running = self.call_function(stage, vec![running], name, span);
            }

            return running;
        }

        self.push_scope();

        for (captured_name, value) in &func.captured {
            self.define_var(captured_name, value.clone(), false, false);
        }
        for (param, value) in func.params.iter().zip(args) {
            self.define_var(param, value, false, false);
        }

        let result = self.eval_body(&func.body);
        self.pop_scope();

        if matches!(func.return_type, TypeSpec::Zero) {
            Value::Int(0)
        } else {
            result
        }
    }
}
