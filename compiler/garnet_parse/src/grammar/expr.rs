//! Argument-level expressions.
//!
//! A Pratt loop over the table in `operators.rs`, with assignment, the
//! ternary and ranges handled inline since they are not plain binary
//! calls. Prefix operators live in `parse_unary`.

use garnet_ir::{CallOp, Name, NodeId, NodeKind, Span, Token, TokenKind, TokenValue};

use super::operators::{binary_op, Assoc};
use super::{Mode, Prec};
use crate::builder::named_captures;
use crate::recovery::{TokenSet, VALUE_START};
use crate::scope::VarRole;
use crate::{PResult, ParseContext, ParseError, Parser};

impl Parser<'_> {
    /// `arg`: operators binding at least as tight as `min`.
    pub(crate) fn parse_arg(&mut self, ctx: ParseContext, min: Prec, mode: Mode) -> PResult<NodeId> {
        self.nested(|p| {
            let start = p.peek_span().start;
            let lhs = p.parse_unary(ctx, mode)?;
            p.parse_arg_rest(ctx, lhs, start, min, mode)
        })
    }

    /// Continue an argument whose leftmost operand is already built.
    pub(crate) fn parse_arg_rest(
        &mut self,
        ctx: ParseContext,
        mut lhs: NodeId,
        start: u32,
        min: Prec,
        mode: Mode,
    ) -> PResult<NodeId> {
        loop {
            let kind = self.peek_kind();
            match kind {
                TokenKind::Assign | TokenKind::OpAssign
                    if min <= Prec::Assign && self.is_assignable(lhs) =>
                {
                    return self.parse_assignment(ctx, lhs, start, mode);
                }
                TokenKind::Question if min <= Prec::Ternary => {
                    lhs = self.parse_ternary(ctx, lhs, start)?;
                }
                TokenKind::Dot2 | TokenKind::Dot3 if min <= Prec::Range => {
                    self.bump();
                    let high = if self.at_any(VALUE_START) {
                        Some(self.parse_arg(ctx, Prec::OrOp, Mode::empty())?)
                    } else {
                        None
                    };
                    let span = self.span_from(start);
                    lhs = self.alloc(
                        NodeKind::Range {
                            low: Some(lhs),
                            high,
                            exclusive: kind == TokenKind::Dot3,
                        },
                        span,
                    );
                    if self.at(TokenKind::Dot2) || self.at(TokenKind::Dot3) {
                        return Err(self.unexpected(TokenSet::new()));
                    }
                }
                _ => {
                    let Some((prec, assoc)) = binary_op(kind) else {
                        break;
                    };
                    if prec < min {
                        break;
                    }
                    let op = self.bump();
                    let rhs_min = match assoc {
                        Assoc::Right => prec,
                        Assoc::Left | Assoc::NonAssoc => prec.next(),
                    };
                    let rhs = self.parse_arg(ctx, rhs_min, Mode::empty())?;
                    lhs = self.build_binary(&op, lhs, rhs, start);
                    if assoc == Assoc::NonAssoc
                        && binary_op(self.peek_kind()).is_some_and(|(next, _)| next == prec)
                    {
                        return Err(self.unexpected(TokenSet::new()));
                    }
                }
            }
        }
        Ok(lhs)
    }

    fn build_binary(&mut self, op: &Token, lhs: NodeId, rhs: NodeId, start: u32) -> NodeId {
        let span = self.span_from(start);
        match op.kind {
            TokenKind::AndOp => self.alloc(NodeKind::And { left: lhs, right: rhs }, span),
            TokenKind::OrOp => self.alloc(NodeKind::Or { left: lhs, right: rhs }, span),
            TokenKind::Match => {
                if let NodeKind::Regex { source, .. } = self.node(lhs) {
                    let captures = named_captures(source);
                    if !captures.is_empty() {
                        let mut names = Vec::with_capacity(captures.len());
                        for capture in &captures {
                            let name = self.intern(capture);
                            self.declare_var(name, VarRole::NamedCapture, span);
                            names.push(name);
                        }
                        return self.alloc(
                            NodeKind::MatchWithLvasgn {
                                regex: lhs,
                                value: rhs,
                                names,
                            },
                            span,
                        );
                    }
                }
                self.binary_call(lhs, "=~", rhs, span)
            }
            kind => {
                let method = kind.operator_method_name().unwrap_or("");
                self.binary_call(lhs, method, rhs, span)
            }
        }
    }

    fn binary_call(&mut self, lhs: NodeId, method: &str, rhs: NodeId, span: Span) -> NodeId {
        let name = self.intern(method);
        self.alloc(
            NodeKind::Call {
                receiver: Some(lhs),
                name,
                args: vec![rhs],
                block: None,
                op: CallOp::Dot,
            },
            span,
        )
    }

    /// Method call with no arguments on `receiver`, as unary operators are.
    fn unary_call(&mut self, receiver: NodeId, method: &str, start: u32) -> NodeId {
        let name = self.intern(method);
        let span = self.span_from(start);
        self.alloc(
            NodeKind::Call {
                receiver: Some(receiver),
                name,
                args: Vec::new(),
                block: None,
                op: CallOp::Dot,
            },
            span,
        )
    }

    /// `cond ? a : b`
    fn parse_ternary(&mut self, ctx: ParseContext, cond: NodeId, start: u32) -> PResult<NodeId> {
        self.bump();
        let then_body = self.parse_arg(ctx, Prec::Lowest, Mode::empty())?;
        self.skip_newlines();
        if self.at(TokenKind::Label) {
            // `a ? b:c` scans `b:` as a label; nothing else is valid here.
            return Err(self.unexpected(TokenSet::single(TokenKind::Colon)));
        }
        self.expect(TokenKind::Colon)?;
        self.skip_newlines();
        let else_body = self.parse_arg(ctx, Prec::Ternary, Mode::empty())?;
        let span = self.span_from(start);
        Ok(self.alloc(
            NodeKind::If {
                cond,
                then_body: Some(then_body),
                else_body: Some(else_body),
            },
            span,
        ))
    }

    /// `lhs = rhs` or `lhs op= rhs`; `lhs` has been checked assignable.
    fn parse_assignment(
        &mut self,
        ctx: ParseContext,
        lhs: NodeId,
        start: u32,
        mode: Mode,
    ) -> PResult<NodeId> {
        let op = self.bump();
        let target = self.assign_target(ctx, lhs);
        let lhs_span = self.node_span(lhs);
        if op.kind == TokenKind::Assign {
            let value = self.parse_assign_rhs(ctx, mode)?;
            let span = self.span_from(start);
            return Ok(self.target_node(target, Some(value), span));
        }
        let Some(op_name) = op.name() else {
            return Err(ParseError::syntax("operator assignment without an operator", op.span));
        };
        let value = self.parse_op_assign_rhs(ctx, mode)?;
        let span = self.span_from(start);
        Ok(self.op_assign_node(target, op_name, value, lhs_span, span))
    }

    /// Right side of `=`. At statement level `a = 1, 2` collects an array.
    fn parse_assign_rhs(&mut self, ctx: ParseContext, mode: Mode) -> PResult<NodeId> {
        let start = self.peek_span().start;
        let stmt = mode.contains(Mode::STMT);
        let mut values = Vec::new();
        let mut splat = false;
        loop {
            if stmt && self.at(TokenKind::Splat) {
                let splat_start = self.bump().span.start;
                let value = self.parse_arg(ctx, Prec::Lowest, Mode::empty())?;
                let span = self.span_from(splat_start);
                values.push(self.alloc(NodeKind::Splat { value: Some(value) }, span));
                splat = true;
            } else {
                let value_mode = if values.is_empty() {
                    mode
                } else {
                    Mode::empty()
                };
                values.push(self.parse_arg(ctx, Prec::Assign, value_mode)?);
            }
            if !stmt || !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let mut value = match values.as_slice() {
            [only] if !splat => *only,
            _ => {
                let span = self.span_from(start);
                self.alloc(NodeKind::Array { elements: values }, span)
            }
        };
        if self.eat(TokenKind::KwRescueMod) {
            let rescue = self.parse_arg(ctx, Prec::Assign, Mode::COMMAND)?;
            let span = self.span_from(start);
            value = self.alloc(NodeKind::RescueMod { body: value, rescue }, span);
        }
        Ok(value)
    }

    fn parse_op_assign_rhs(&mut self, ctx: ParseContext, mode: Mode) -> PResult<NodeId> {
        let start = self.peek_span().start;
        let mut value = self.parse_arg(ctx, Prec::Assign, mode.difference(Mode::STMT))?;
        if self.eat(TokenKind::KwRescueMod) {
            let rescue = self.parse_arg(ctx, Prec::Assign, Mode::COMMAND)?;
            let span = self.span_from(start);
            value = self.alloc(NodeKind::RescueMod { body: value, rescue }, span);
        }
        Ok(value)
    }

    /// Prefix operators, then a primary with its postfix chain.
    pub(crate) fn parse_unary(&mut self, ctx: ParseContext, mode: Mode) -> PResult<NodeId> {
        let start = self.peek_span().start;
        match self.peek_kind() {
            TokenKind::Bang => {
                self.bump();
                let operand = self.nested(|p| p.parse_unary(ctx, mode & Mode::COMMAND))?;
                let span = self.span_from(start);
                Ok(self.alloc(NodeKind::Not(operand), span))
            }
            TokenKind::Tilde | TokenKind::UPlus => {
                let op = self.bump();
                let operand = self.nested(|p| p.parse_unary(ctx, Mode::empty()))?;
                let method = if op.kind == TokenKind::Tilde { "~" } else { "+@" };
                Ok(self.unary_call(operand, method, start))
            }
            TokenKind::UMinus => {
                self.bump();
                let operand = self.parse_arg(ctx, Prec::UnaryMinus, Mode::empty())?;
                Ok(self.unary_call(operand, "-@", start))
            }
            TokenKind::UMinusNum => self.parse_negative_numeric(ctx, mode),
            TokenKind::KwDefined => self.parse_defined(ctx, mode),
            TokenKind::BDot2 | TokenKind::BDot3 => {
                let exclusive = self.bump().kind == TokenKind::BDot3;
                let high = self.parse_arg(ctx, Prec::OrOp, Mode::empty())?;
                let span = self.span_from(start);
                Ok(self.alloc(
                    NodeKind::Range {
                        low: None,
                        high: Some(high),
                        exclusive,
                    },
                    span,
                ))
            }
            _ => self.parse_primary(ctx, mode),
        }
    }

    /// `-2` folds into the literal; `-2 ** 2` is `-(2 ** 2)`.
    fn parse_negative_numeric(&mut self, ctx: ParseContext, mode: Mode) -> PResult<NodeId> {
        let start = self.bump().span.start;
        let token = self.expect(TokenKind::Numeric)?;
        let TokenValue::Number(value) = token.value else {
            return Err(ParseError::syntax("numeric literal without a value", token.span));
        };
        if self.at(TokenKind::Pow) {
            let literal = self.alloc(NodeKind::Numeric(value), token.span);
            self.bump();
            let rhs = self.parse_arg(ctx, Prec::Pow, Mode::empty())?;
            let pow_span = self.span_from(token.span.start);
            let pow = self.binary_call(literal, "**", rhs, pow_span);
            return Ok(self.unary_call(pow, "-@", start));
        }
        let span = self.span_from(start);
        let literal = self.alloc(NodeKind::Numeric(value.negate()), span);
        self.parse_postfix(ctx, literal, start, mode)
    }

    /// `defined?(expr)` or `defined? arg`.
    fn parse_defined(&mut self, ctx: ParseContext, mode: Mode) -> PResult<NodeId> {
        let start = self.bump().span.start;
        let inner = ctx.with(ParseContext::IN_DEFINED);
        if self.eat(TokenKind::LParenCall) {
            self.skip_newlines();
            let operand = self.parse_expr(inner, Mode::COMMAND)?;
            self.skip_newlines();
            self.expect(TokenKind::RParen)?;
            let span = self.span_from(start);
            let node = self.alloc(NodeKind::Defined(operand), span);
            return self.parse_postfix(ctx, node, start, mode);
        }
        let operand = self.parse_arg(inner, Prec::Lowest, Mode::empty())?;
        let span = self.span_from(start);
        Ok(self.alloc(NodeKind::Defined(operand), span))
    }

    /// Declare a local, surfacing the tracker's diagnostic.
    pub(crate) fn declare_var(&mut self, name: Name, role: VarRole, span: Span) {
        let diag = self
            .scopes
            .declare(name, role, span, self.cursor.lexer().interner());
        if let Some(diag) = diag {
            self.push_diagnostic(diag);
        }
    }
}
