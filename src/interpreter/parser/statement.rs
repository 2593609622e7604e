use std::rc::Rc;

use crate::{
    ast::{ArrayInit, Body, Expr, FunctionDef, Param, Program, Span, Stmt, TypeSpec},
    error::ParseError,
    interpreter::{lexer::TokenKind, parser::Parser},
};

impl Parser {
    /// Parses the whole token stream into a program.
    ///
    /// Newlines between statements are consumed here; inside statements the
    /// continuation rules of the expression parser decide. Parsing never
    /// aborts: the collected diagnostics are returned next to the tree.
    #[must_use]
    pub fn parse_program(mut self) -> (Program, Vec<ParseError>) {
        let mut body = Body::default();

        while !self.at_eof() {
            self.skip_newlines();
            if self.at_eof() {
                break;
            }

            let before = self.pos;
            if let Some(stmt) = self.parse_statement() {
                body.stmts.push(stmt);
            }
            if self.pos == before {
                self.advance();
            }

            self.skip_newlines();
        }

        (Program { body }, self.diagnostics)
    }

    /// Parses a single statement.
    ///
    /// Attempted in order: function definition / lambda statement, `echo`,
    /// `while`, `for`, array-element assignment, plain assignment,
    /// declarations (with `fixed`/`dynamic` attributes), and finally an
    /// expression statement.
    pub(crate) fn parse_statement(&mut self) -> Option<Stmt> {
        match self.kind() {
            TokenKind::Def => {
                // `def name(...)` is a definition; `def(...)` is a lambda
                // in expression position.
                if matches!(self.tokens.get(self.pos + 1).map(|t| &t.kind),
                            Some(TokenKind::Identifier(_)))
                {
                    return self.parse_function_def();
                }
                let expr = self.parse_expression_stmt();
                return Some(Stmt::ExprStmt(expr));
            },
            TokenKind::Echo => {
                let span = self.span();
                self.advance();

                if self.check(&TokenKind::NewLine) || self.at_eof() {
                    return Some(Stmt::Echo { value: None, span });
                }

                let value = self.parse_expression();
                return Some(Stmt::Echo { value: Some(value),
                                         span });
            },
            TokenKind::While => return self.parse_while(),
            TokenKind::For => return self.parse_for_in(),
            _ => {},
        }

        // arr[index] = value
        if matches!(self.kind(), TokenKind::Identifier(_))
           && matches!(self.tokens.get(self.pos + 1).map(|t| &t.kind),
                       Some(TokenKind::LBracket))
           && let Some(stmt) = self.parse_array_assign()
        {
            return Some(stmt);
        }

        // name = value
        if let TokenKind::Identifier(name) = self.kind().clone()
           && matches!(self.tokens.get(self.pos + 1).map(|t| &t.kind),
                       Some(TokenKind::Assign))
        {
            let span = self.span();
            self.advance();
            self.advance();
            self.skip_continuation_newlines();
            let value = self.parse_expression();
            return Some(Stmt::Assign { name, value, span });
        }

        let decl_span = self.span();
        let fixed = self.match_kind(&TokenKind::Fixed);
        let dynamic = self.match_kind(&TokenKind::Dynamic);

        if fixed && dynamic {
            self.diagnose(ParseError::FixedDynamicConflict { span: decl_span });
            return None;
        }

        if self.check(&TokenKind::Less) {
            return self.parse_function_var_decl(decl_span);
        }

        if matches!(self.kind(),
                    TokenKind::KwInt | TokenKind::KwDouble | TokenKind::KwString
                    | TokenKind::KwZero)
        {
            return self.parse_declaration(fixed, dynamic, decl_span);
        }

        if fixed || dynamic {
            self.unexpected("a type after 'fixed'/'dynamic'");
            return None;
        }

        let expr = self.parse_expression_stmt();
        Some(Stmt::ExprStmt(expr))
    }

    /// Parses `arr[index] = value`, rolling back when the `=` is absent
    /// (the input is then an ordinary index expression).
    fn parse_array_assign(&mut self) -> Option<Stmt> {
        let saved = self.pos;
        let saved_diags = self.diagnostics.len();

        let span = self.span();
        let TokenKind::Identifier(name) = self.kind().clone() else {
            return None;
        };
        self.advance();
        self.advance();

        let index = self.parse_index_or_range();

        if !self.match_kind(&TokenKind::Assign) {
            self.pos = saved;
            self.diagnostics.truncate(saved_diags);
            return None;
        }

        self.skip_continuation_newlines();
        let value = self.parse_expression();

        Some(Stmt::ArrayAssign { name,
                                 index,
                                 value,
                                 span })
    }

    /// Parses `while (cond) [-> var] body`.
    fn parse_while(&mut self) -> Option<Stmt> {
        let span = self.span();
        self.advance();

        if !self.match_kind(&TokenKind::LParen) {
            self.diagnose(ParseError::MissingDelimiter { delimiter: "(",
                                                         span:      self.span(), });
            return None;
        }

        let cond = self.parse_expression();

        if !self.match_kind(&TokenKind::RParen) {
            self.diagnose(ParseError::MissingDelimiter { delimiter: ")",
                                                         span:      self.span(), });
            return None;
        }

        let ret_var = self.parse_return_clause()?;
        let body = self.parse_loop_body()?;

        Some(Stmt::While { cond,
                           ret_var,
                           body,
                           span })
    }

    /// Parses `for var in collection [-> var] body`.
    fn parse_for_in(&mut self) -> Option<Stmt> {
        let span = self.span();
        self.advance();

        let TokenKind::Identifier(var) = self.kind().clone() else {
            self.unexpected("an iterator variable after 'for'");
            return None;
        };
        self.advance();

        if !self.match_kind(&TokenKind::In) {
            self.unexpected("'in'");
            return None;
        }

        let coll = self.parse_expression();
        let ret_var = self.parse_return_clause()?;
        let body = self.parse_loop_body()?;

        Some(Stmt::ForIn { var,
                           coll,
                           ret_var,
                           body,
                           span })
    }

    /// Parses an optional `-> var` loop-result clause.
    ///
    /// Wrapped in `Option<Option<_>>`: the outer layer reports a parse
    /// failure, the inner one the clause's presence.
    fn parse_return_clause(&mut self) -> Option<Option<String>> {
        if !self.match_kind(&TokenKind::Arrow) {
            return Some(None);
        }

        let TokenKind::Identifier(name) = self.kind().clone() else {
            self.unexpected("a variable name after '->'");
            return None;
        };
        self.advance();
        Some(Some(name))
    }

    /// Parses a loop body: a `:: ... end` block or a single inline
    /// statement.
    fn parse_loop_body(&mut self) -> Option<Body> {
        if self.match_kind(&TokenKind::DoubleColon) {
            self.skip_newlines();
            let body = self.parse_block_until(&[TokenKind::End]);
            if !self.match_kind(&TokenKind::End) {
                self.diagnose(ParseError::MissingDelimiter { delimiter: "end",
                                                             span:      self.span(), });
            }
            return Some(body);
        }

        let stmt = self.parse_statement()?;
        Some(Body { stmts: vec![stmt] })
    }

    /// Parses statements until one of `stops`, `end`-consumption left to
    /// the caller. Newlines between statements are skipped.
    pub(crate) fn parse_block_until(&mut self, stops: &[TokenKind]) -> Body {
        let mut body = Body::default();

        loop {
            self.skip_newlines();
            if self.at_eof() || stops.iter().any(|k| self.check(k)) {
                break;
            }

            let before = self.pos;
            if let Some(stmt) = self.parse_statement() {
                body.stmts.push(stmt);
            }
            if self.pos == before {
                self.advance();
            }
        }

        body
    }

    /// Parses `<(types)> name = lambda` — a function-typed variable.
    ///
    /// Function variables are always `fixed`.
    fn parse_function_var_decl(&mut self, span: Span) -> Option<Stmt> {
        let Some(signature) = self.parse_signature_type() else {
            return None;
        };

        let TokenKind::Identifier(name) = self.kind().clone() else {
            self.unexpected("a variable name after the function type");
            return None;
        };
        self.advance();

        if !self.match_kind(&TokenKind::Assign) {
            self.unexpected("'=' (function variables must be initialized)");
            return None;
        }

        let init = self.parse_expression();

        Some(Stmt::VarDecl { name,
                             ty: signature,
                             fixed: true,
                             dynamic: false,
                             init: Some(init),
                             span })
    }

    /// Parses a scalar or array declaration after its `fixed`/`dynamic`
    /// attributes; the cursor is on the type keyword.
    fn parse_declaration(&mut self, fixed: bool, dynamic: bool, span: Span) -> Option<Stmt> {
        let ty = match self.kind() {
            TokenKind::KwDouble => TypeSpec::Double,
            TokenKind::KwString => TypeSpec::Str,
            // `zero` is not a value type; declarations fall back to int.
            _ => TypeSpec::Int,
        };
        self.advance();

        let TokenKind::Identifier(name) = self.kind().clone() else {
            self.unexpected("a variable name");
            return None;
        };
        self.advance();

        if self.match_kind(&TokenKind::LBracket) {
            return self.parse_array_decl(name, ty, fixed, dynamic, span);
        }

        let init = if self.match_kind(&TokenKind::Assign) {
            self.skip_continuation_newlines();
            Some(self.parse_expression())
        } else {
            None
        };

        Some(Stmt::VarDecl { name,
                             ty,
                             fixed,
                             dynamic,
                             init,
                             span })
    }

    /// Parses the array part of a declaration; the cursor is right after
    /// `[`.
    fn parse_array_decl(&mut self,
                        name: String,
                        elem_ty: TypeSpec,
                        fixed: bool,
                        dynamic: bool,
                        span: Span)
                        -> Option<Stmt> {
        // Static size: int a[10]
        if let TokenKind::Integer(size) = *self.kind() {
            self.advance();
            if !self.match_kind(&TokenKind::RBracket) {
                self.diagnose(ParseError::MissingDelimiter { delimiter: "]",
                                                             span:      self.span(), });
            }

            let size = crate::util::num::i64_to_usize(size).unwrap_or(0);
            return Some(Stmt::ArrayDecl { name,
                                          elem_ty,
                                          fixed,
                                          dynamic,
                                          size: Some(size),
                                          init: None,
                                          span });
        }

        if !self.match_kind(&TokenKind::RBracket) {
            self.unexpected("']' or an array size");
            return None;
        }

        if !dynamic && !self.check(&TokenKind::Assign) {
            self.diagnose(ParseError::ArrayNeedsInitializer { name, span });
            return None;
        }

        let init = if self.match_kind(&TokenKind::Assign) {
            self.skip_continuation_newlines();

            if starts_expression(self.kind()) {
                Some(self.parse_array_initializer())
            } else {
                Some(ArrayInit::default())
            }
        } else {
            None
        };

        Some(Stmt::ArrayDecl { name,
                               elem_ty,
                               fixed,
                               dynamic,
                               size: None,
                               init,
                               span })
    }

    /// Parses a comma-separated array initializer.
    ///
    /// The expression parser already folds commas into a list; the loop
    /// here only fires for trailing pieces after a value-context reparse.
    fn parse_array_initializer(&mut self) -> ArrayInit {
        let mut elements = vec![self.parse_expression()];

        while self.match_kind(&TokenKind::Comma) {
            self.skip_continuation_newlines();
            elements.push(self.parse_expression());
        }

        ArrayInit { elements }
    }

    /// Parses `def name(p: T, ...) -> T :: body end`.
    fn parse_function_def(&mut self) -> Option<Stmt> {
        let span = self.span();
        self.advance();

        let TokenKind::Identifier(name) = self.kind().clone() else {
            self.unexpected("a function name after 'def'");
            return None;
        };
        self.advance();

        if !self.match_kind(&TokenKind::LParen) {
            self.diagnose(ParseError::MissingDelimiter { delimiter: "(",
                                                         span:      self.span(), });
            return None;
        }

        let params = self.parse_params()?;

        if !self.match_kind(&TokenKind::Arrow) {
            self.unexpected("'->' before the return type");
            return None;
        }

        let return_type = self.parse_return_type()?;

        if !self.match_kind(&TokenKind::DoubleColon) {
            self.diagnose(ParseError::MissingDelimiter { delimiter: "::",
                                                         span:      self.span(), });
            return None;
        }

        self.skip_newlines();
        let body = self.parse_block_until(&[TokenKind::End]);
        if !self.match_kind(&TokenKind::End) {
            self.diagnose(ParseError::MissingDelimiter { delimiter: "end",
                                                         span:      self.span(), });
            return None;
        }

        Some(Stmt::FunctionDef(Rc::new(FunctionDef { name,
                                                     params,
                                                     return_type,
                                                     body: Rc::new(body),
                                                     span })))
    }

    /// Parses `def(p: T, ...) -> T expr-or-block` in expression position.
    pub(crate) fn parse_lambda(&mut self) -> Expr {
        let span = self.span();
        self.advance();

        if !self.match_kind(&TokenKind::LParen) {
            self.diagnose(ParseError::MissingDelimiter { delimiter: "(",
                                                         span:      self.span(), });
            return Expr::Literal { value: 0.into(),
                                   span };
        }

        let Some(params) = self.parse_params() else {
            return Expr::Literal { value: 0.into(),
                                   span };
        };

        if !self.match_kind(&TokenKind::Arrow) {
            self.unexpected("'->' before the lambda return type");
            return Expr::Literal { value: 0.into(),
                                   span };
        }

        let return_type = match self.kind() {
            TokenKind::KwInt => TypeSpec::Int,
            TokenKind::KwDouble => TypeSpec::Double,
            TokenKind::KwString => TypeSpec::Str,
            TokenKind::KwZero => TypeSpec::Zero,
            _ => {
                self.diagnose(ParseError::InvalidType { context: "the lambda return",
                                                        span:    self.span(), });
                return Expr::Literal { value: 0.into(),
                                       span };
            },
        };
        self.advance();

        let body = if self.match_kind(&TokenKind::DoubleColon) {
            self.skip_newlines();
            let body = self.parse_block_until(&[TokenKind::End]);
            if !self.match_kind(&TokenKind::End) {
                self.diagnose(ParseError::MissingDelimiter { delimiter: "end",
                                                             span:      self.span(), });
            }
            body
        } else {
            let expr = self.parse_expression();
            Body { stmts: vec![Stmt::ExprStmt(expr)] }
        };

        let def = FunctionDef { name: "<anonymous>".to_string(),
                                params,
                                return_type,
                                body: Rc::new(body),
                                span };

        Expr::Lambda { def: Rc::new(def),
                       span }
    }

    /// Parses a `name: type` parameter list up to and including the
    /// closing `)`.
    fn parse_params(&mut self) -> Option<Vec<Param>> {
        let mut params = Vec::new();

        if self.match_kind(&TokenKind::RParen) {
            return Some(params);
        }

        loop {
            let TokenKind::Identifier(name) = self.kind().clone() else {
                self.unexpected("a parameter name");
                return None;
            };
            self.advance();

            if !self.match_kind(&TokenKind::Colon) {
                self.unexpected("':' after the parameter name");
                return None;
            }

            let ty = self.parse_param_type()?;
            params.push(Param { name, ty });

            if !self.match_kind(&TokenKind::Comma) {
                break;
            }
        }

        if !self.match_kind(&TokenKind::RParen) {
            self.diagnose(ParseError::MissingDelimiter { delimiter: ")",
                                                         span:      self.span(), });
            return None;
        }

        Some(params)
    }

    /// Parses a parameter type: `int`, `double`, `string`, or a function
    /// signature `<(types)>`.
    fn parse_param_type(&mut self) -> Option<TypeSpec> {
        match self.kind() {
            TokenKind::KwInt => {
                self.advance();
                Some(TypeSpec::Int)
            },
            TokenKind::KwDouble => {
                self.advance();
                Some(TypeSpec::Double)
            },
            TokenKind::KwString => {
                self.advance();
                Some(TypeSpec::Str)
            },
            TokenKind::Less => self.parse_signature_type(),
            _ => {
                self.diagnose(ParseError::InvalidType { context: "the parameter",
                                                        span:    self.span(), });
                None
            },
        }
    }

    /// Parses a return type: any parameter type plus `zero` and function
    /// signatures.
    fn parse_return_type(&mut self) -> Option<TypeSpec> {
        if self.check(&TokenKind::KwZero) {
            self.advance();
            return Some(TypeSpec::Zero);
        }
        if self.check(&TokenKind::Less) {
            return self.parse_signature_type();
        }
        match self.kind() {
            TokenKind::KwInt => {
                self.advance();
                Some(TypeSpec::Int)
            },
            TokenKind::KwDouble => {
                self.advance();
                Some(TypeSpec::Double)
            },
            TokenKind::KwString => {
                self.advance();
                Some(TypeSpec::Str)
            },
            _ => {
                self.diagnose(ParseError::InvalidType { context: "the return",
                                                        span:    self.span(), });
                None
            },
        }
    }

    /// Parses a function signature `<(type, type, ...)>`.
    fn parse_signature_type(&mut self) -> Option<TypeSpec> {
        if !self.match_kind(&TokenKind::Less) {
            self.unexpected("'<'");
            return None;
        }
        if !self.match_kind(&TokenKind::LParen) {
            self.diagnose(ParseError::MissingDelimiter { delimiter: "(",
                                                         span:      self.span(), });
            return None;
        }

        let mut types = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let ty = match self.kind() {
                    TokenKind::KwInt => TypeSpec::Int,
                    TokenKind::KwDouble => TypeSpec::Double,
                    TokenKind::KwString => TypeSpec::Str,
                    _ => {
                        self.diagnose(ParseError::InvalidType { context:
                                                                    "the function signature",
                                                                span:    self.span(), });
                        return None;
                    },
                };
                self.advance();
                types.push(ty);

                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
            }
        }

        if !self.match_kind(&TokenKind::RParen) {
            self.diagnose(ParseError::MissingDelimiter { delimiter: ")",
                                                         span:      self.span(), });
            return None;
        }
        if !self.match_kind(&TokenKind::Greater) {
            self.diagnose(ParseError::MissingDelimiter { delimiter: ">",
                                                         span:      self.span(), });
            return None;
        }

        Some(TypeSpec::Signature(types))
    }
}

/// Decides whether a token can start an array-initializer expression.
///
/// Anything else after `name[] =` means an intentionally empty array.
const fn starts_expression(kind: &TokenKind) -> bool {
    matches!(kind,
             TokenKind::Integer(_)
             | TokenKind::Real(_)
             | TokenKind::Str(_)
             | TokenKind::Identifier(_)
             | TokenKind::LParen
             | TokenKind::LBracket
             | TokenKind::Minus)
}
