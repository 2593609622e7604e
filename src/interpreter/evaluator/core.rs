use std::{collections::HashMap, io::Write, rc::Rc};

use rand::rngs::StdRng;

use crate::{
    ast::{Body, Expr, FunctionDef, LiteralValue, LogicalOperator, Program, Span, Stmt},
    error::RuntimeError,
    interpreter::{
        range::normalize_index,
        scope::{Scope, StoredVar},
        value::{ArrayValue, FunctionValue, Value},
    },
};

/// The tree-walking evaluator.
///
/// Owns the scope stack (the bottom frame is the global scope), the global
/// function table, the lazily seeded random generator, and the two output
/// sinks. Evaluation is strictly sequential; the only I/O is `echo`/value
/// printing on `out`, `input()` on stdin, and diagnostics on `diag`.
///
/// Errors are fail-soft: the offending operation reports to `diag` and
/// yields a neutral value, and evaluation continues.
pub struct Interp<'io> {
    pub(crate) scopes:    Vec<Scope>,
    pub(crate) functions: HashMap<String, Rc<FunctionDef>>,
    pub(crate) rng:       Option<StdRng>,
    pub(crate) out:       &'io mut dyn Write,
    pub(crate) diag:      &'io mut dyn Write,
}

impl<'io> Interp<'io> {
    /// Creates an evaluator writing program output to `out` and
    /// diagnostics to `diag`.
    pub fn new(out: &'io mut dyn Write, diag: &'io mut dyn Write) -> Self {
        Self { scopes: vec![Scope::new()],
               functions: HashMap::new(),
               rng: None,
               out,
               diag }
    }

    /// Runs a parsed program to completion.
    ///
    /// # Returns
    /// The value of the last value-producing top-level statement, `0` when
    /// there is none.
    pub fn run(&mut self, program: &Program) -> Value {
        self.eval_body(&program.body)
    }

    /// Reports a runtime error to the diagnostic sink and yields the
    /// neutral integer `0`.
    pub(crate) fn report(&mut self, error: RuntimeError) -> Value {
        let _ = writeln!(self.diag, "{error}");
        Value::Int(0)
    }

    /// Reports a runtime error and yields a caller-chosen neutral value
    /// (empty string/array for indexing failures).
    pub(crate) fn report_with(&mut self, error: RuntimeError, neutral: Value) -> Value {
        let _ = writeln!(self.diag, "{error}");
        neutral
    }

    /// Evaluates a statement sequence.
    ///
    /// The body's value is that of the last statement which produced one;
    /// declarations and definitions are transparent.
    pub(crate) fn eval_body(&mut self, body: &Body) -> Value {
        let mut last = None;

        for stmt in &body.stmts {
            if let Some(value) = self.eval_stmt(stmt) {
                last = Some(value);
            }
        }

        last.unwrap_or(Value::Int(0))
    }

    /// Evaluates a single statement.
    ///
    /// # Returns
    /// `Some(value)` for statements that produce one (`echo`, assignments,
    /// expressions, loops), `None` for declarations and definitions.
    pub(crate) fn eval_stmt(&mut self, stmt: &Stmt) -> Option<Value> {
        match stmt {
            Stmt::VarDecl { name,
                            fixed,
                            dynamic,
                            init,
                            .. } => {
                let value = match init {
                    Some(expr) => self.eval_expr(expr),
                    None => Value::Int(0),
                };
                self.define_var(name, value, *dynamic, *fixed);
                None
            },
            Stmt::ArrayDecl { name,
                              fixed,
                              dynamic,
                              size,
                              init,
                              .. } => {
                let mut array = match size {
                    Some(n) => ArrayValue::zeroed(*n),
                    None => ArrayValue::default(),
                };

                if let Some(init) = init {
                    array.elements.clear();
                    for element in &init.elements {
                        self.append_init(&mut array, element);
                    }
                }

                self.define_var(name, Value::Array(array), *dynamic, *fixed);
                None
            },
            Stmt::ArrayAssign { name,
                                index,
                                value,
                                span, } => {
                self.eval_array_assign(name, index, value, *span);
                None
            },
            Stmt::Assign { name, value, span } => {
                let value = self.eval_expr(value);
                self.assign_var(name, value.clone(), *span);
                Some(value)
            },
            Stmt::ExprStmt(expr) => {
                let value = match expr {
                    // A bare chain may be incomplete; it yields 0 then.
                    Expr::CondChain { arms, fallback, span } => {
                        self.eval_cond_chain(arms, fallback.as_deref(), *span, false)
                    },
                    other => self.eval_expr(other),
                };
                Some(value)
            },
            Stmt::Echo { value, .. } => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr),
                    None => Value::Str(String::new()),
                };
                let _ = writeln!(self.out, "{value}");
                Some(value)
            },
            Stmt::FunctionDef(def) => {
                if self.scopes.len() == 1 {
                    self.functions.insert(def.name.clone(), def.clone());
                } else if let Some(scope) = self.scopes.last_mut() {
                    scope.functions.insert(def.name.clone(), def.clone());
                }
                None
            },
            Stmt::While { cond,
                          ret_var,
                          body,
                          .. } => Some(self.eval_while(cond, ret_var.as_deref(), body)),
            Stmt::ForIn { var,
                          coll,
                          ret_var,
                          body,
                          span, } => {
                Some(self.eval_for_in(var, coll, ret_var.as_deref(), body, *span))
            },
        }
    }

    /// Evaluates an expression in a value-requiring context.
    pub(crate) fn eval_expr(&mut self, expr: &Expr) -> Value {
        match expr {
            Expr::Literal { value, .. } => match value {
                LiteralValue::Integer(n) => Value::Int(*n),
                LiteralValue::Real(r) => Value::Real(*r),
                LiteralValue::Str(s) => Value::Str(s.clone()),
            },
            Expr::Identifier { name, .. } => self.lookup(name).unwrap_or(Value::Int(0)),
            Expr::Lambda { def, .. } => Value::Function(Rc::new(self.materialize(def))),
            Expr::Unary { op, operand, span } => {
                let value = self.eval_expr(operand);
                self.eval_unary(*op, &value, *span)
            },
            Expr::Binary { op, lhs, rhs, span } => self.eval_binary_expr(*op, lhs, rhs, *span),
            Expr::Logical { op, lhs, rhs, .. } => {
                let left = self.eval_expr(lhs).is_truthy();
                let right = self.eval_expr(rhs).is_truthy();
                let result = match op {
                    LogicalOperator::And => left && right,
                    LogicalOperator::Or => left || right,
                };
                Value::Int(i64::from(result))
            },
            Expr::CommaList { items, .. } => {
                let mut last = Value::Int(0);
                for item in items {
                    last = self.eval_expr(item);
                }
                last
            },
            Expr::Range { span, .. } => {
                self.report(RuntimeError::TypeError { details: "a range cannot be evaluated \
                                                                directly (it needs a target)"
                                                                           .to_string(),
                                                      span:    *span, })
            },
            Expr::CondChain { arms, fallback, span } => {
                self.eval_cond_chain(arms, fallback.as_deref(), *span, true)
            },
            Expr::Elvis { lhs, rhs, .. } => {
                let left = self.eval_expr(lhs);
                if left.is_truthy() {
                    left
                } else {
                    self.eval_expr(rhs)
                }
            },
            Expr::Filter { array, cond, span } => self.eval_filter(array, cond, *span),
            Expr::If { arms, else_body, .. } => self.eval_if_expr(arms, else_body.as_ref()),
            Expr::Call { name, args, span } => self.eval_call(name, args, *span),
            Expr::CallExpr { callee, args, span } => self.eval_call_expr(callee, args, *span),
            Expr::Index { target, index, span } => self.eval_index(target, index, *span),
        }
    }

    /// Appends one initializer expression to an array under construction.
    ///
    /// Comma lists are flattened in place, and array-valued elements
    /// splice their cells (sharing them with the source).
    fn append_init(&mut self, array: &mut ArrayValue, expr: &Expr) {
        if let Expr::CommaList { items, .. } = expr {
            for item in items {
                self.append_init(array, item);
            }
            return;
        }

        match self.eval_expr(expr) {
            Value::Array(a) => array.elements.extend(a.elements.iter().cloned()),
            other => array.push(other),
        }
    }

    /// Evaluates `arr[index] = value`.
    ///
    /// The target must be an existing dynamic array and the index an
    /// in-range integer (negative counts from the end). The write goes
    /// through the shared cell, so every alias observes it.
    fn eval_array_assign(&mut self, name: &str, index: &Expr, value: &Expr, span: Span) {
        let (found, dynamic, array) = match self.find_var(name) {
            None => (false, false, None),
            Some(sv) => (true, sv.dynamic, sv.value.as_array().cloned()),
        };

        if !found {
            self.report(RuntimeError::UnknownVariable { name: name.to_string(),
                                                        span });
            return;
        }
        if !dynamic {
            self.report(RuntimeError::ImmutableArray { name: name.to_string(),
                                                       span });
            return;
        }
        let Some(array) = array else {
            self.report(RuntimeError::TypeError { details: format!("'{name}' is not an array"),
                                                  span });
            return;
        };

        if matches!(index, Expr::Range { .. }) {
            self.report(RuntimeError::TypeError { details: "array index must be an integer"
                                                               .to_string(),
                                                  span });
            return;
        }

        let index_value = self.eval_expr(index);
        let Some(index) = index_value.as_int() else {
            self.report(RuntimeError::TypeError { details: "array index must be an integer"
                                                               .to_string(),
                                                  span });
            return;
        };

        let Some(normalized) = normalize_index(index, array.len()) else {
            self.report(RuntimeError::IndexOutOfBounds { index,
                                                         len: array.len(),
                                                         span });
            return;
        };

        let cell = array.elements[normalized].clone();
        let value = self.eval_expr(value);
        *cell.borrow_mut() = value;
    }

    /// Pushes a fresh innermost scope.
    pub(crate) fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    /// Pops the innermost scope; the global frame is never popped.
    pub(crate) fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Defines a variable in the current (innermost) scope
    /// unconditionally, shadowing any outer binding of the same name.
    pub(crate) fn define_var(&mut self, name: &str, value: Value, dynamic: bool, fixed: bool) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.vars.insert(name.to_string(),
                              StoredVar { value, dynamic, fixed });
        }
    }

    /// Finds the nearest binding of `name`, walking the scope stack from
    /// the innermost frame outward.
    pub(crate) fn find_var(&self, name: &str) -> Option<&StoredVar> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.vars.get(name))
    }

    /// Rebinds an existing variable.
    ///
    /// Diagnoses assignment to an undefined name, to a `fixed` binding
    /// (with a dedicated message when the bound value is a function), and
    /// to a non-dynamic array. On any diagnostic the binding is left
    /// unchanged.
    pub(crate) fn assign_var(&mut self, name: &str, value: Value, span: Span) {
        let Some(frame) = self.scopes
                              .iter()
                              .rposition(|scope| scope.vars.contains_key(name))
        else {
            self.report(RuntimeError::UnknownVariable { name: name.to_string(),
                                                        span });
            return;
        };

        let (fixed, is_function, immutable_array) = match self.scopes[frame].vars.get(name) {
            Some(sv) => (sv.fixed, sv.value.is_function(), sv.value.is_array() && !sv.dynamic),
            None => return,
        };

        if fixed {
            if is_function {
                self.report(RuntimeError::FunctionReassignment { name: name.to_string(),
                                                                 span });
            } else {
                self.report(RuntimeError::FixedReassignment { name: name.to_string(),
                                                              span });
            }
            return;
        }

        if immutable_array {
            self.report(RuntimeError::ImmutableArray { name: name.to_string(),
                                                       span });
            return;
        }

        if let Some(sv) = self.scopes[frame].vars.get_mut(name) {
            sv.value = value;
        }
    }

    /// Resolves a name to a value.
    ///
    /// Lookup order: variables (innermost scope outward), then scope-local
    /// function tables, then the global function table. Function hits are
    /// materialized into function values with a capture snapshot taken
    /// right now.
    pub(crate) fn lookup(&self, name: &str) -> Option<Value> {
        for scope in self.scopes.iter().rev() {
            if let Some(sv) = scope.vars.get(name) {
                return Some(sv.value.clone());
            }
        }

        for scope in self.scopes.iter().rev() {
            if let Some(def) = scope.functions.get(name) {
                return Some(Value::Function(Rc::new(self.materialize(def))));
            }
        }

        self.functions
            .get(name)
            .map(|def| Value::Function(Rc::new(self.materialize(def))))
    }

    /// Turns a definition into a function value, snapshotting the
    /// currently visible variables.
    pub(crate) fn materialize(&self, def: &FunctionDef) -> FunctionValue {
        FunctionValue { params:      def.params.iter().map(|p| p.name.clone()).collect(),
                        body:        def.body.clone(),
                        return_type: def.return_type.clone(),
                        captured:    self.capture_snapshot(),
                        composed:    Vec::new(), }
    }

    /// Snapshots every visible variable by value, nearest scope wins.
    ///
    /// Scalars are copied; arrays keep their cell identity, so later
    /// element mutations remain visible through the capture.
    pub(crate) fn capture_snapshot(&self) -> HashMap<String, Value> {
        let mut captured = HashMap::new();

        for scope in self.scopes.iter().rev() {
            for (name, sv) in &scope.vars {
                captured.entry(name.clone())
                        .or_insert_with(|| sv.value.clone());
            }
        }

        captured
    }
}
