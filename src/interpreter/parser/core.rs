use crate::{
    ast::{BinaryOperator, Body, CondArm, Expr, LiteralValue, LogicalOperator, Span, Stmt,
          UnaryOperator},
    error::ParseError,
    interpreter::lexer::{Token, TokenKind},
};

/// The hand-written parser.
///
/// Statement-driven at the top level, precedence-climbing for expressions.
/// The parser never aborts: diagnostics are collected and parsing resumes
/// best-effort, substituting a literal `0` where an expression is required.
///
/// Backtracking (assignment lookahead, array-assignment lookahead, range
/// detection) works through saved cursor positions; speculative diagnostics
/// are rolled back together with the cursor.
pub struct Parser {
    pub(crate) tokens:      Vec<Token>,
    pub(crate) pos:         usize,
    pub(crate) diagnostics: Vec<ParseError>,
}

impl Parser {
    /// Creates a parser over a token stream.
    ///
    /// The stream is expected to end with [`TokenKind::Eof`], as produced
    /// by the lexer.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens,
               pos: 0,
               diagnostics: Vec::new() }
    }

    pub(crate) fn peek(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .unwrap_or_else(|| self.tokens.last().expect("token stream ends with Eof"))
    }

    pub(crate) fn kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    pub(crate) fn span(&self) -> Span {
        self.peek().span
    }

    pub(crate) fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        *self.kind() == *kind
    }

    pub(crate) fn match_kind(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            return true;
        }
        false
    }

    pub(crate) fn at_eof(&self) -> bool {
        matches!(self.kind(), TokenKind::Eof)
    }

    pub(crate) fn diagnose(&mut self, error: ParseError) {
        self.diagnostics.push(error);
    }

    pub(crate) fn unexpected(&mut self, expected: &str) {
        let token = self.peek().lexeme.clone();
        let span = self.span();
        self.diagnose(ParseError::UnexpectedToken { token,
                                                    expected: expected.to_string(),
                                                    span });
    }

    fn literal_zero(&self) -> Expr {
        Expr::Literal { value: LiteralValue::Integer(0),
                        span:  self.span(), }
    }

    /// Decides whether the token before the cursor leaves the expression
    /// open, so that a following newline is a continuation rather than a
    /// statement terminator.
    pub(crate) fn is_expression_open(&self) -> bool {
        if self.pos == 0 {
            return false;
        }

        matches!(self.tokens[self.pos - 1].kind,
                 TokenKind::Plus
                 | TokenKind::Minus
                 | TokenKind::Star
                 | TokenKind::Slash
                 | TokenKind::Percent
                 | TokenKind::Pow
                 | TokenKind::Concat
                 | TokenKind::And
                 | TokenKind::Or
                 | TokenKind::Ampersand
                 | TokenKind::Pipe
                 | TokenKind::Caret
                 | TokenKind::ShiftLeft
                 | TokenKind::ShiftRight
                 | TokenKind::EqualEqual
                 | TokenKind::BangEqual
                 | TokenKind::Greater
                 | TokenKind::GreaterEqual
                 | TokenKind::Less
                 | TokenKind::LessEqual
                 | TokenKind::Elvis
                 | TokenKind::FatArrow
                 | TokenKind::Assign
                 | TokenKind::LParen
                 | TokenKind::LBracket
                 | TokenKind::DoubleQuestion
                 | TokenKind::Question)
    }

    /// Skips newlines while the previous token leaves the expression open.
    pub(crate) fn skip_continuation_newlines(&mut self) {
        if !self.is_expression_open() {
            return;
        }
        while self.check(&TokenKind::NewLine) {
            self.advance();
        }
    }

    /// Skips every newline at the cursor unconditionally.
    pub(crate) fn skip_newlines(&mut self) {
        while self.check(&TokenKind::NewLine) {
            self.advance();
        }
    }

    /// Parses a full expression in a value-requiring context.
    ///
    /// Layering: conditional chain, then Elvis, then filter. A conditional
    /// chain without fallback is diagnosed here; use
    /// [`Self::parse_expression_stmt`] for bare statement positions where
    /// such chains are legal.
    pub fn parse_expression(&mut self) -> Expr {
        let expr = self.parse_expression_stmt();
        if expr.is_incomplete_chain() {
            self.diagnose(ParseError::IncompleteChain { span: expr.span() });
        }
        expr
    }

    /// Parses a full expression without the incomplete-chain diagnostic.
    pub fn parse_expression_stmt(&mut self) -> Expr {
        self.skip_continuation_newlines();
        let expr = self.parse_cond_chain();
        let expr = self.parse_elvis_chain(expr);
        self.parse_filter_chain(expr)
    }

    /// Parses a conditional chain:
    /// `cond ? expr (?? cond ? expr)* ( : fallback )?`.
    ///
    /// Newlines between chain pieces are skipped unconditionally, which is
    /// what allows the multi-line chain layout.
    fn parse_cond_chain(&mut self) -> Expr {
        let span = self.span();
        let (first_cond, first_value) = self.parse_simple_cond();

        self.skip_newlines();

        if !self.check(&TokenKind::DoubleQuestion) && !self.check(&TokenKind::Colon) {
            return match first_value {
                Some(value) => Expr::CondChain { arms: vec![CondArm { cond: first_cond,
                                                                      value }],
                                                 fallback: None,
                                                 span },
                None => first_cond,
            };
        }

        let mut arms = Vec::new();
        if let Some(value) = first_value {
            arms.push(CondArm { cond: first_cond,
                                value });
        }

        while self.match_kind(&TokenKind::DoubleQuestion) {
            self.skip_newlines();
            let (cond, value) = self.parse_simple_cond();
            if let Some(value) = value {
                arms.push(CondArm { cond, value });
            }
            self.skip_newlines();
        }

        let fallback = if self.match_kind(&TokenKind::Colon) {
            self.skip_newlines();
            Some(Box::new(self.parse_cond_chain()))
        } else {
            None
        };

        Expr::CondChain { arms, fallback, span }
    }

    /// Parses one `cond ? value` piece.
    ///
    /// # Returns
    /// The condition and, when a `?` followed, the arm value.
    fn parse_simple_cond(&mut self) -> (Expr, Option<Expr>) {
        let cond = self.parse_base_expression(0);

        if !self.match_kind(&TokenKind::Question) {
            return (cond, None);
        }

        self.skip_continuation_newlines();
        let value = self.parse_base_expression(0);
        (cond, Some(value))
    }

    /// Folds trailing `?:` operators onto `left`, left-associatively.
    fn parse_elvis_chain(&mut self, mut left: Expr) -> Expr {
        while self.check(&TokenKind::Elvis) {
            let span = self.span();
            self.advance();
            self.skip_continuation_newlines();
            let right = self.parse_cond_chain();
            left = Expr::Elvis { lhs: Box::new(left),
                                 rhs: Box::new(right),
                                 span };
        }
        left
    }

    /// Folds trailing `=>` filters onto `left`, left-associatively.
    fn parse_filter_chain(&mut self, mut left: Expr) -> Expr {
        while self.check(&TokenKind::FatArrow) {
            let span = self.span();
            self.advance();
            self.skip_continuation_newlines();
            let cond = self.parse_cond_chain();
            left = Expr::Filter { array: Box::new(left),
                                  cond:  Box::new(cond),
                                  span, };
        }
        left
    }

    /// The precedence-climbing expression core.
    ///
    /// Applies postfix call/index operators greedily, then folds binary
    /// operators at or above `min_prec`. `**` re-enters at its own level
    /// for right-associativity; every other operator re-enters one level
    /// higher. Comma (level 0) folds into a flat [`Expr::CommaList`].
    pub(crate) fn parse_base_expression(&mut self, min_prec: u8) -> Expr {
        self.skip_continuation_newlines();
        let mut left = self.parse_unary();

        loop {
            self.skip_continuation_newlines();

            match self.kind() {
                TokenKind::LParen => {
                    left = self.finish_call(left);
                    continue;
                },
                TokenKind::LBracket => {
                    left = self.finish_index(left);
                    continue;
                },
                TokenKind::Question
                | TokenKind::DoubleQuestion
                | TokenKind::Colon
                | TokenKind::FatArrow
                | TokenKind::Elvis => break,
                _ => {},
            }

            let Some(prec) = precedence_of(self.kind()) else {
                break;
            };
            if prec < min_prec {
                break;
            }

            let op_kind = self.kind().clone();
            let op_span = self.span();
            self.advance();
            self.skip_continuation_newlines();

            // Slice shorthand: e $[r] desugars to e $ e[r].
            if matches!(op_kind, TokenKind::Concat) && self.check(&TokenKind::LBracket) {
                let bracket_span = self.span();
                self.advance();
                let index = self.parse_index_or_range();
                let access = Expr::Index { target: Box::new(left.clone()),
                                           index:  Box::new(index),
                                           span:   bracket_span, };
                left = Expr::Binary { op:   BinaryOperator::Concat,
                                      lhs:  Box::new(left),
                                      rhs:  Box::new(access),
                                      span: op_span, };
                continue;
            }

            let next_prec = if matches!(op_kind, TokenKind::Pow) {
                prec
            } else {
                prec + 1
            };
            let right = self.parse_base_expression(next_prec);

            if matches!(op_kind, TokenKind::Comma) {
                left = match left {
                    Expr::CommaList { mut items, span } => {
                        items.push(right);
                        Expr::CommaList { items, span }
                    },
                    other => Expr::CommaList { items: vec![other, right],
                                               span:  op_span, },
                };
                continue;
            }

            left = match logical_op_of(&op_kind) {
                Some(op) => Expr::Logical { op,
                                            lhs: Box::new(left),
                                            rhs: Box::new(right),
                                            span: op_span },
                None => {
                    let op = binary_op_of(&op_kind).expect("operator has a precedence");
                    Expr::Binary { op,
                                   lhs: Box::new(left),
                                   rhs: Box::new(right),
                                   span: op_span }
                },
            };
        }

        left
    }

    /// Parses prefix unary operators, then a primary with its postfix
    /// chain. Postfix binds tighter than prefix: `-a[0]` negates the
    /// element.
    fn parse_unary(&mut self) -> Expr {
        self.skip_continuation_newlines();

        let op = match self.kind() {
            TokenKind::Minus => Some(UnaryOperator::Negate),
            TokenKind::Not => Some(UnaryOperator::Not),
            TokenKind::Tilde => Some(UnaryOperator::BitNot),
            _ => None,
        };

        if let Some(op) = op {
            let span = self.span();
            self.advance();
            self.skip_continuation_newlines();
            let operand = self.parse_unary();
            return Expr::Unary { op,
                                 operand: Box::new(operand),
                                 span };
        }

        let primary = self.parse_primary();
        self.parse_postfix(primary)
    }

    /// Applies call and index postfix operators greedily:
    /// `f()(10)`, `a[0][1]`, `(f $ g)(x)`.
    fn parse_postfix(&mut self, mut expr: Expr) -> Expr {
        loop {
            match self.kind() {
                TokenKind::LParen => expr = self.finish_call(expr),
                TokenKind::LBracket => expr = self.finish_index(expr),
                _ => return expr,
            }
        }
    }

    /// Parses the argument list of a call; the cursor is on `(`.
    ///
    /// An identifier head becomes [`Expr::Call`], any other callee
    /// [`Expr::CallExpr`].
    fn finish_call(&mut self, callee: Expr) -> Expr {
        let span = self.span();
        self.advance();
        self.skip_continuation_newlines();

        let mut args = Vec::new();
        while !self.check(&TokenKind::RParen) && !self.at_eof() {
            args.push(self.parse_base_expression(1));
            if !self.match_kind(&TokenKind::Comma) {
                break;
            }
            self.skip_continuation_newlines();
        }

        if !self.match_kind(&TokenKind::RParen) {
            self.diagnose(ParseError::MissingDelimiter { delimiter: ")",
                                                         span:      self.span(), });
        }

        match callee {
            Expr::Identifier { name, span: id_span } => Expr::Call { name,
                                                                     args,
                                                                     span: id_span },
            other => Expr::CallExpr { callee: Box::new(other),
                                      args,
                                      span },
        }
    }

    /// Parses an index or slice; the cursor is on `[`.
    fn finish_index(&mut self, target: Expr) -> Expr {
        let span = self.span();
        self.advance();
        let index = self.parse_index_or_range();
        Expr::Index { target: Box::new(target),
                      index:  Box::new(index),
                      span, }
    }

    /// Parses the inside of `[...]` as either a range or a single index,
    /// consuming the closing bracket.
    pub(crate) fn parse_index_or_range(&mut self) -> Expr {
        let saved = self.pos;
        let saved_diags = self.diagnostics.len();

        self.skip_continuation_newlines();
        if let Some(range) = self.try_parse_range() {
            return range;
        }

        self.pos = saved;
        self.diagnostics.truncate(saved_diags);

        self.skip_continuation_newlines();
        let index = self.parse_base_expression(1);
        if !self.match_kind(&TokenKind::RBracket) {
            self.diagnose(ParseError::MissingDelimiter { delimiter: "]",
                                                         span:      self.span(), });
        }
        index
    }

    /// Tries to parse a range form after `[`: `[..]`, `[..b]`, `[a..]`,
    /// `[a..b]`. Consumes through the closing bracket on success, leaves
    /// the cursor for the caller to roll back otherwise.
    pub(crate) fn try_parse_range(&mut self) -> Option<Expr> {
        let span = self.span();

        if self.match_kind(&TokenKind::DotDot) {
            self.skip_continuation_newlines();

            if self.match_kind(&TokenKind::RBracket) {
                return Some(Expr::Range { start: None,
                                          end:   None,
                                          span, });
            }

            let end = self.parse_expression();
            if !self.match_kind(&TokenKind::RBracket) {
                self.diagnose(ParseError::MissingDelimiter { delimiter: "]",
                                                             span:      self.span(), });
            }
            return Some(Expr::Range { start: None,
                                      end:   Some(Box::new(end)),
                                      span, });
        }

        let saved = self.pos;
        let saved_diags = self.diagnostics.len();
        let start = self.parse_expression();

        if self.match_kind(&TokenKind::DotDot) {
            self.skip_continuation_newlines();

            if self.match_kind(&TokenKind::RBracket) {
                return Some(Expr::Range { start: Some(Box::new(start)),
                                          end:   None,
                                          span, });
            }

            let end = self.parse_expression();
            if !self.match_kind(&TokenKind::RBracket) {
                self.diagnose(ParseError::MissingDelimiter { delimiter: "]",
                                                             span:      self.span(), });
            }
            return Some(Expr::Range { start: Some(Box::new(start)),
                                      end:   Some(Box::new(end)),
                                      span, });
        }

        self.pos = saved;
        self.diagnostics.truncate(saved_diags);
        None
    }

    /// Parses a primary expression: literals, identifiers, lambdas,
    /// if-expressions, standalone ranges, and parenthesized expressions.
    fn parse_primary(&mut self) -> Expr {
        self.skip_continuation_newlines();
        let span = self.span();

        match self.kind().clone() {
            TokenKind::If => self.parse_if_expr(),
            TokenKind::Def => self.parse_lambda(),
            TokenKind::Identifier(name) => {
                self.advance();
                Expr::Identifier { name, span }
            },
            TokenKind::Integer(value) => {
                self.advance();
                Expr::Literal { value: LiteralValue::Integer(value),
                                span }
            },
            TokenKind::Real(value) => {
                self.advance();
                Expr::Literal { value: LiteralValue::Real(value),
                                span }
            },
            TokenKind::Str(value) => {
                self.advance();
                Expr::Literal { value: LiteralValue::Str(value),
                                span }
            },
            TokenKind::LBracket => {
                self.advance();
                self.skip_continuation_newlines();
                match self.try_parse_range() {
                    Some(range) => range,
                    None => {
                        self.unexpected("a range after '['");
                        self.literal_zero()
                    },
                }
            },
            TokenKind::LParen => {
                self.advance();
                self.skip_continuation_newlines();
                let expr = self.parse_expression();
                self.skip_continuation_newlines();
                if !self.match_kind(&TokenKind::RParen) {
                    self.diagnose(ParseError::MissingDelimiter { delimiter: ")",
                                                                 span:      self.span(), });
                }
                expr
            },
            TokenKind::NewLine => {
                self.advance();
                self.skip_continuation_newlines();
                self.literal_zero()
            },
            TokenKind::Eof | TokenKind::Assign => self.literal_zero(),
            _ => {
                self.unexpected("an expression");
                self.advance();
                self.literal_zero()
            },
        }
    }

    /// Parses `if cond :: body [elif cond :: body]* [else :: body] [end]`.
    ///
    /// The form is multi-line exactly when the token right after the first
    /// `::` is a newline; only then is a closing `end` required.
    fn parse_if_expr(&mut self) -> Expr {
        let span = self.span();
        self.advance();

        self.skip_continuation_newlines();
        let cond = self.parse_expression();

        if !self.match_kind(&TokenKind::DoubleColon) {
            self.diagnose(ParseError::MissingDelimiter { delimiter: "::",
                                                         span:      self.span(), });
            return self.literal_zero();
        }

        let multiline = self.check(&TokenKind::NewLine);
        if multiline {
            self.advance();
            self.skip_newlines();
        }

        let then_body = if multiline {
            self.parse_block_until(&[TokenKind::Elif, TokenKind::Else, TokenKind::End])
        } else {
            self.inline_branch_body()
        };

        let mut arms = vec![(cond, then_body)];

        while self.check(&TokenKind::Elif) {
            self.advance();
            self.skip_continuation_newlines();
            let elif_cond = self.parse_expression();

            if !self.match_kind(&TokenKind::DoubleColon) {
                self.diagnose(ParseError::MissingDelimiter { delimiter: "::",
                                                             span:      self.span(), });
                return self.literal_zero();
            }

            let elif_multiline = self.check(&TokenKind::NewLine);
            if elif_multiline {
                self.advance();
                self.skip_newlines();
            }

            let body = if elif_multiline {
                self.parse_block_until(&[TokenKind::Elif, TokenKind::Else, TokenKind::End])
            } else {
                self.inline_branch_body()
            };

            arms.push((elif_cond, body));
        }

        let else_body = if self.check(&TokenKind::Else) {
            self.advance();
            self.skip_continuation_newlines();

            if !self.match_kind(&TokenKind::DoubleColon) {
                self.diagnose(ParseError::MissingDelimiter { delimiter: "::",
                                                             span:      self.span(), });
                return self.literal_zero();
            }

            let else_multiline = self.check(&TokenKind::NewLine);
            if else_multiline {
                self.advance();
                self.skip_newlines();
            }

            if else_multiline {
                Some(self.parse_block_until(&[TokenKind::End]))
            } else {
                Some(self.inline_branch_body())
            }
        } else {
            None
        };

        if multiline && !self.match_kind(&TokenKind::End) {
            self.diagnose(ParseError::MissingDelimiter { delimiter: "end",
                                                         span:      self.span(), });
        }

        Expr::If { arms,
                   else_body,
                   multiline,
                   span }
    }

    /// Wraps a single inline-branch expression into a one-statement body.
    fn inline_branch_body(&mut self) -> Body {
        let expr = self.parse_expression();
        Body { stmts: vec![Stmt::ExprStmt(expr)] }
    }
}

/// Binding power of an infix operator token; `None` for non-operators.
///
/// Levels follow the language's 14-step table, comma lowest.
#[must_use]
pub(crate) fn precedence_of(kind: &TokenKind) -> Option<u8> {
    let prec = match kind {
        TokenKind::FatArrow => 14,
        TokenKind::Pow => 13,
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => 12,
        TokenKind::Plus | TokenKind::Minus => 11,
        TokenKind::Concat => 10,
        TokenKind::ShiftLeft | TokenKind::ShiftRight => 9,
        TokenKind::Less
        | TokenKind::LessEqual
        | TokenKind::Greater
        | TokenKind::GreaterEqual => 8,
        TokenKind::EqualEqual | TokenKind::BangEqual => 7,
        TokenKind::Ampersand => 6,
        TokenKind::Caret => 5,
        TokenKind::Pipe => 4,
        TokenKind::And => 3,
        TokenKind::Or => 2,
        TokenKind::Elvis => 1,
        TokenKind::Comma => 0,
        _ => return None,
    };
    Some(prec)
}

/// Maps an operator token to its binary operator, when it is one.
#[must_use]
pub(crate) const fn binary_op_of(kind: &TokenKind) -> Option<BinaryOperator> {
    let op = match kind {
        TokenKind::Plus => BinaryOperator::Add,
        TokenKind::Minus => BinaryOperator::Sub,
        TokenKind::Star => BinaryOperator::Mul,
        TokenKind::Slash => BinaryOperator::Div,
        TokenKind::Percent => BinaryOperator::Mod,
        TokenKind::Pow => BinaryOperator::Pow,
        TokenKind::Concat => BinaryOperator::Concat,
        TokenKind::ShiftLeft => BinaryOperator::Shl,
        TokenKind::ShiftRight => BinaryOperator::Shr,
        TokenKind::Less => BinaryOperator::Less,
        TokenKind::LessEqual => BinaryOperator::LessEqual,
        TokenKind::Greater => BinaryOperator::Greater,
        TokenKind::GreaterEqual => BinaryOperator::GreaterEqual,
        TokenKind::EqualEqual => BinaryOperator::Equal,
        TokenKind::BangEqual => BinaryOperator::NotEqual,
        TokenKind::Ampersand => BinaryOperator::BitAnd,
        TokenKind::Caret => BinaryOperator::BitXor,
        TokenKind::Pipe => BinaryOperator::BitOr,
        _ => return None,
    };
    Some(op)
}

/// Maps an operator token to its logical operator, when it is one.
#[must_use]
pub(crate) const fn logical_op_of(kind: &TokenKind) -> Option<LogicalOperator> {
    match kind {
        TokenKind::And => Some(LogicalOperator::And),
        TokenKind::Or => Some(LogicalOperator::Or),
        _ => None,
    }
}
