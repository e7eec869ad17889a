//! Grammar: statements and the levels above a single argument.
//!
//! Layered the way the language is: a program is a statement list, a
//! statement is an expression with modifiers, an expression is a chain
//! of `and`/`or`/`not` over arguments, and an argument is an operator
//! expression over primaries (see `expr.rs`).

mod call;
mod control;
mod definition;
mod expr;
mod literal;
mod operators;
mod params;
mod pattern;
mod primary;

use bitflags::bitflags;
use garnet_diagnostic::ErrorCode;
use garnet_ir::{NodeId, NodeKind, Span, TokenKind};

use crate::recovery::{TokenSet, STMTS_END, TERMS};
use crate::{PResult, ParseContext, Parser};

pub(crate) use operators::Prec;

bitflags! {
    /// What the position being parsed allows.
    #[derive(Copy, Clone, Eq, PartialEq, Debug)]
    pub(crate) struct Mode: u8 {
        /// Statement level: `a = 1, 2` builds an array.
        const STMT = 1 << 0;
        /// A call without parentheses may start here.
        const COMMAND = 1 << 1;
        /// Such a call may take a `do ... end` block.
        const DO_BLOCK = 1 << 2;
    }
}

impl Parser<'_> {
    /// `program: stmts`; stray closers are reported and skipped.
    pub(crate) fn parse_top_level(&mut self) -> NodeId {
        let mut stmts = Vec::new();
        loop {
            self.parse_stmts_into(ParseContext::NONE, &mut stmts);
            if self.at(TokenKind::Eof) {
                break;
            }
            let err = self.unexpected(TokenSet::single(TokenKind::Eof));
            self.report(err);
            self.bump();
        }
        let span = Span::new(0, self.cursor.prev_end());
        self.alloc(NodeKind::Stmts(stmts), span)
    }

    /// Statements up to a token that closes the enclosing construct.
    pub(crate) fn parse_compstmt(&mut self, ctx: ParseContext) -> Option<NodeId> {
        let mut stmts = Vec::new();
        self.parse_stmts_into(ctx, &mut stmts);
        self.make_body(stmts)
    }

    /// No statements is `None`, one is itself, more become `Stmts`.
    pub(crate) fn make_body(&mut self, stmts: Vec<NodeId>) -> Option<NodeId> {
        match stmts.as_slice() {
            [] => None,
            [only] => Some(*only),
            [first, .., last] => {
                let span = self.node_span(*first).merge(self.node_span(*last));
                Some(self.alloc(NodeKind::Stmts(stmts), span))
            }
        }
    }

    pub(crate) fn parse_stmts_into(&mut self, ctx: ParseContext, stmts: &mut Vec<NodeId>) {
        let first = stmts.len();
        loop {
            self.skip_terms();
            if self.at_any(STMTS_END) {
                break;
            }
            match self.parse_stmt(ctx) {
                Ok(stmt) => stmts.push(stmt),
                Err(err) => {
                    self.report(err);
                    self.synchronize();
                    continue;
                }
            }
            self.expect_stmt_end();
        }
        self.warn_void_statements(&stmts[first..]);
    }

    /// After a statement: a terminator or the end of the list.
    pub(crate) fn expect_stmt_end(&mut self) {
        if !self.at_any(TERMS) && !self.at_any(STMTS_END) {
            let err = self.unexpected(TERMS);
            self.report(err);
            self.synchronize();
        }
    }

    /// `stmt`: an expression statement followed by modifiers.
    pub(crate) fn parse_stmt(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        self.parse_stmt_as(ctx, true)
    }

    /// First statement after `(`: a comma there continues the target
    /// list of the parenthesis itself, as in `(a, b), c = d`.
    pub(crate) fn parse_paren_stmt(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        self.parse_stmt_as(ctx, false)
    }

    fn parse_stmt_as(&mut self, ctx: ParseContext, masgn: bool) -> PResult<NodeId> {
        self.nested(|p| {
            let start = p.peek_span().start;
            let mut node = match p.peek_kind() {
                TokenKind::KwAlias => p.parse_alias()?,
                TokenKind::KwUndef => p.parse_undef()?,
                TokenKind::KwUpperBegin | TokenKind::KwUpperEnd => p.parse_exe_block(ctx)?,
                _ if masgn => p.parse_expr_stmt(ctx)?,
                _ => p.parse_expr(ctx, Mode::STMT | Mode::COMMAND | Mode::DO_BLOCK)?,
            };
            loop {
                let kind = p.peek_kind();
                match kind {
                    TokenKind::KwIfMod
                    | TokenKind::KwUnlessMod
                    | TokenKind::KwWhileMod
                    | TokenKind::KwUntilMod => {
                        p.bump();
                        let cond = p.parse_expr_value(ctx)?;
                        let span = p.span_from(start);
                        let do_while = matches!(p.node(node), NodeKind::Begin { .. });
                        let built = match kind {
                            TokenKind::KwIfMod => NodeKind::If {
                                cond,
                                then_body: Some(node),
                                else_body: None,
                            },
                            TokenKind::KwUnlessMod => NodeKind::If {
                                cond,
                                then_body: None,
                                else_body: Some(node),
                            },
                            TokenKind::KwWhileMod => NodeKind::While {
                                cond,
                                body: Some(node),
                                do_while,
                            },
                            _ => NodeKind::Until {
                                cond,
                                body: Some(node),
                                do_while,
                            },
                        };
                        node = p.alloc(built, span);
                    }
                    TokenKind::KwRescueMod => {
                        p.bump();
                        let rescue = p.parse_expr(ctx, Mode::COMMAND)?;
                        let span = p.span_from(start);
                        node = p.alloc(NodeKind::RescueMod { body: node, rescue }, span);
                    }
                    _ => break,
                }
            }
            Ok(node)
        })
    }

    /// An expression statement, including multiple assignment.
    fn parse_expr_stmt(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        let start = self.peek_span().start;
        if self.at(TokenKind::Splat) {
            return self.parse_masgn(ctx, start, Vec::new());
        }
        let node = self.parse_expr(ctx, Mode::STMT | Mode::COMMAND | Mode::DO_BLOCK)?;
        if self.at(TokenKind::Comma) && self.is_mlhs_item(node) {
            let first = self.mlhs_target(ctx, node);
            self.bump();
            return self.parse_masgn(ctx, start, vec![first]);
        }
        if self.at(TokenKind::Assign) && matches!(self.node(node), NodeKind::Mlhs { .. }) {
            self.bump();
            return self.finish_masgn(ctx, start, node);
        }
        Ok(node)
    }

    /// `mlhs = mrhs`, with the first items already collected.
    fn parse_masgn(
        &mut self,
        ctx: ParseContext,
        start: u32,
        mut items: Vec<NodeId>,
    ) -> PResult<NodeId> {
        loop {
            if self.at(TokenKind::Assign) {
                break;
            }
            items.push(self.parse_mlhs_item(ctx)?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let lhs_span = self.span_from(start);
        let targets = self.alloc(NodeKind::Mlhs { items }, lhs_span);
        self.expect(TokenKind::Assign)?;
        self.finish_masgn(ctx, start, targets)
    }

    fn finish_masgn(&mut self, ctx: ParseContext, start: u32, targets: NodeId) -> PResult<NodeId> {
        let value = self.parse_mrhs(ctx)?;
        let span = self.span_from(start);
        Ok(self.alloc(NodeKind::MultiAsgn { targets, value }, span))
    }

    /// One target of a multiple assignment.
    pub(crate) fn parse_mlhs_item(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        let start = self.peek_span().start;
        match self.peek_kind() {
            TokenKind::Splat | TokenKind::Star => {
                self.bump();
                let value = if self.at_any(VALUE_TARGET_END) {
                    None
                } else {
                    let target = self.parse_primary(ctx, Mode::empty())?;
                    Some(self.mlhs_target(ctx, target))
                };
                let span = self.span_from(start);
                Ok(self.alloc(NodeKind::Splat { value }, span))
            }
            TokenKind::LParen | TokenKind::LParenArg => {
                self.bump();
                let mut items = Vec::new();
                while !self.at(TokenKind::RParen) {
                    items.push(self.nested(|p| p.parse_mlhs_item(ctx))?);
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RParen)?;
                let span = self.span_from(start);
                Ok(self.alloc(NodeKind::Mlhs { items }, span))
            }
            _ => {
                let target = self.parse_primary(ctx, Mode::empty())?;
                Ok(self.mlhs_target(ctx, target))
            }
        }
    }

    /// Right side of a multiple assignment: one value, or several
    /// collected into an array.
    fn parse_mrhs(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        let start = self.peek_span().start;
        let mut values = Vec::new();
        let mut splat = false;
        loop {
            if self.at(TokenKind::Splat) {
                let splat_start = self.bump().span.start;
                let value = self.parse_arg(ctx, Prec::Lowest, Mode::empty())?;
                let span = self.span_from(splat_start);
                values.push(self.alloc(NodeKind::Splat { value: Some(value) }, span));
                splat = true;
            } else {
                let mode = if values.is_empty() {
                    Mode::COMMAND
                } else {
                    Mode::empty()
                };
                values.push(self.parse_arg(ctx, Prec::Lowest, mode)?);
            }
            if !self.eat(TokenKind::Comma) {
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
            let rescue = self.parse_arg(ctx, Prec::Lowest, Mode::COMMAND)?;
            let span = self.span_from(start);
            value = self.alloc(NodeKind::RescueMod { body: value, rescue }, span);
        }
        Ok(value)
    }

    /// `expr`: arguments joined by `and`/`or`, with `not` prefixes.
    pub(crate) fn parse_expr(&mut self, ctx: ParseContext, mode: Mode) -> PResult<NodeId> {
        let start = self.peek_span().start;
        let mut left = self.parse_not_expr(ctx, mode)?;
        loop {
            let is_and = match self.peek_kind() {
                TokenKind::KwAnd => true,
                TokenKind::KwOr => false,
                _ => break,
            };
            self.bump();
            let right = self.parse_not_expr(ctx, mode.difference(Mode::STMT))?;
            let span = self.span_from(start);
            let kind = if is_and {
                NodeKind::And { left, right }
            } else {
                NodeKind::Or { left, right }
            };
            left = self.alloc(kind, span);
        }
        Ok(left)
    }

    /// A condition: an expression that may be a command call.
    pub(crate) fn parse_expr_value(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        self.parse_expr(ctx, Mode::COMMAND)
    }

    fn parse_not_expr(&mut self, ctx: ParseContext, mode: Mode) -> PResult<NodeId> {
        let start = self.peek_span().start;
        if self.eat(TokenKind::KwNot) {
            let operand = self.nested(|p| p.parse_not_expr(ctx, mode.difference(Mode::STMT)))?;
            let span = self.span_from(start);
            return Ok(self.alloc(NodeKind::Not(operand), span));
        }
        let value = self.parse_arg(ctx, Prec::Lowest, mode)?;
        let rightward = match self.peek_kind() {
            TokenKind::Assoc => true,
            TokenKind::KwIn => false,
            _ => return Ok(value),
        };
        self.bump();
        let saved = self.begin_pattern();
        let pattern = self.parse_pattern_top(ctx);
        self.lexer_mut().set_in_kwarg(saved);
        let pattern = pattern?;
        let span = self.span_from(start);
        let kind = if rightward {
            NodeKind::MatchPattern { value, pattern }
        } else {
            NodeKind::MatchPatternP { value, pattern }
        };
        Ok(self.alloc(kind, span))
    }

    /// Body with optional `rescue`, `else` and `ensure` clauses. The
    /// closing keyword is left for the caller.
    pub(crate) fn parse_bodystmt(&mut self, ctx: ParseContext) -> PResult<Option<NodeId>> {
        let start = self.peek_span().start;
        let body = self.parse_compstmt(ctx);
        let mut clauses = Vec::new();
        while self.at(TokenKind::KwRescue) {
            clauses.push(self.parse_rescue_clause(ctx)?);
        }
        let mut result = body;
        if !clauses.is_empty() || self.at(TokenKind::KwElse) {
            let else_span = self.peek_span();
            let else_body = if self.eat(TokenKind::KwElse) {
                if clauses.is_empty() {
                    self.error_at(ErrorCode::E1001, "else without rescue is useless", else_span);
                }
                self.parse_compstmt(ctx)
            } else {
                None
            };
            let span = self.span_from(start);
            result = Some(self.alloc(
                NodeKind::Rescue {
                    body,
                    clauses,
                    else_body,
                },
                span,
            ));
        }
        if self.eat(TokenKind::KwEnsure) {
            let ensure = self.parse_compstmt(ctx);
            let span = self.span_from(start);
            result = Some(self.alloc(
                NodeKind::Ensure {
                    body: result,
                    ensure,
                },
                span,
            ));
        }
        Ok(result)
    }

    fn parse_rescue_clause(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        let start = self.bump().span.start;
        let mut exceptions = Vec::new();
        if !self.at(TokenKind::Assoc) && !self.at(TokenKind::KwThen) && !self.at_any(TERMS) {
            loop {
                if self.at(TokenKind::Splat) {
                    let splat_start = self.bump().span.start;
                    let value = self.parse_arg(ctx, Prec::Lowest, Mode::empty())?;
                    let span = self.span_from(splat_start);
                    exceptions.push(self.alloc(NodeKind::Splat { value: Some(value) }, span));
                } else {
                    exceptions.push(self.parse_arg(ctx, Prec::Lowest, Mode::empty())?);
                }
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        let var = if self.eat(TokenKind::Assoc) {
            let target = self.parse_primary(ctx, Mode::empty())?;
            Some(self.mlhs_target(ctx, target))
        } else {
            None
        };
        self.parse_then()?;
        let body = self.parse_compstmt(ctx.with(ParseContext::IN_RESCUE));
        let span = self.span_from(start);
        Ok(self.alloc(
            NodeKind::RescueClause {
                exceptions,
                var,
                body,
            },
            span,
        ))
    }

    /// `then`, a terminator, or both.
    pub(crate) fn parse_then(&mut self) -> PResult<()> {
        if self.eat(TokenKind::KwThen) {
            return Ok(());
        }
        if self.at_any(TERMS) {
            self.skip_terms();
            self.eat(TokenKind::KwThen);
            return Ok(());
        }
        Err(self.unexpected(TERMS.with(TokenKind::KwThen)))
    }

    /// `do` of a loop condition, or a terminator.
    pub(crate) fn parse_loop_do(&mut self) -> PResult<()> {
        if self.eat(TokenKind::KwDoCond) {
            return Ok(());
        }
        if self.at_any(TERMS) {
            self.skip_terms();
            return Ok(());
        }
        Err(self.unexpected(TERMS.with(TokenKind::KwDoCond)))
    }

    /// `BEGIN { ... }` and `END { ... }`.
    fn parse_exe_block(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        let keyword = self.bump();
        let start = keyword.span.start;
        let pre = keyword.kind == TokenKind::KwUpperBegin;
        if pre && (self.scopes.depth() > 1 || ctx != ParseContext::NONE) {
            self.error_at(
                ErrorCode::E1001,
                "BEGIN is permitted only at toplevel",
                keyword.span,
            );
        }
        if !self.at(TokenKind::LBraceBlock) && !self.at(TokenKind::LBrace) {
            return Err(self.unexpected(TokenSet::single(TokenKind::LBraceBlock)));
        }
        self.bump();
        let body = self.parse_compstmt(ctx);
        self.expect(TokenKind::RBrace)?;
        let span = self.span_from(start);
        let kind = if pre {
            NodeKind::PreExe(body)
        } else {
            NodeKind::PostExe(body)
        };
        Ok(self.alloc(kind, span))
    }
}

/// Tokens after which a `*` in a target list has no name.
const VALUE_TARGET_END: TokenSet = TokenSet::new()
    .with(TokenKind::Comma)
    .with(TokenKind::Assign)
    .with(TokenKind::RParen)
    .with(TokenKind::KwIn)
    .with(TokenKind::Pipe);
