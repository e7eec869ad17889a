//! Compound statements: conditionals, loops, `case` and `begin`.

use garnet_ir::{GuardKind, NodeId, NodeKind, TokenKind};

use super::{Mode, Prec};
use crate::recovery::{TokenSet, TERMS};
use crate::{PResult, ParseContext, ParseError, Parser};

const CASE_BRANCH: TokenSet = TokenSet::new()
    .with(TokenKind::KwWhen)
    .with(TokenKind::KwIn);

impl Parser<'_> {
    /// `if`/`unless` with their `elsif` and `else` branches.
    pub(crate) fn parse_if(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        let keyword = self.bump();
        let start = keyword.span.start;
        let cond = self.parse_expr_value(ctx)?;
        self.parse_then()?;
        let body = self.parse_compstmt(ctx);
        let kind = if keyword.kind == TokenKind::KwUnless {
            let else_body = if self.eat(TokenKind::KwElse) {
                self.parse_compstmt(ctx)
            } else {
                None
            };
            NodeKind::If {
                cond,
                then_body: else_body,
                else_body: body,
            }
        } else {
            NodeKind::If {
                cond,
                then_body: body,
                else_body: self.parse_if_tail(ctx)?,
            }
        };
        self.expect(TokenKind::KwEnd)?;
        let span = self.span_from(start);
        Ok(self.alloc(kind, span))
    }

    /// `elsif ...` chains nest as the else branch; `end` is left for the
    /// outermost `if`.
    fn parse_if_tail(&mut self, ctx: ParseContext) -> PResult<Option<NodeId>> {
        if self.at(TokenKind::KwElsif) {
            return self.nested(|p| {
                let start = p.bump().span.start;
                let cond = p.parse_expr_value(ctx)?;
                p.parse_then()?;
                let then_body = p.parse_compstmt(ctx);
                let else_body = p.parse_if_tail(ctx)?;
                let span = p.span_from(start);
                Ok(Some(p.alloc(
                    NodeKind::If {
                        cond,
                        then_body,
                        else_body,
                    },
                    span,
                )))
            });
        }
        if self.eat(TokenKind::KwElse) {
            return Ok(self.parse_compstmt(ctx));
        }
        Ok(None)
    }

    /// `while cond do body end` and `until cond do body end`.
    pub(crate) fn parse_while(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        let keyword = self.bump();
        let start = keyword.span.start;
        let cond = self.parse_loop_cond(ctx)?;
        self.parse_loop_do()?;
        let body = self.parse_compstmt(ctx.with(ParseContext::IN_LOOP));
        self.expect(TokenKind::KwEnd)?;
        let span = self.span_from(start);
        let kind = if keyword.kind == TokenKind::KwWhile {
            NodeKind::While {
                cond,
                body,
                do_while: false,
            }
        } else {
            NodeKind::Until {
                cond,
                body,
                do_while: false,
            }
        };
        Ok(self.alloc(kind, span))
    }

    /// `for a, b in iter do body end`
    pub(crate) fn parse_for(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        let start = self.bump().span.start;
        let var_start = self.peek_span().start;
        let first = self.parse_mlhs_item(ctx)?;
        let var = if self.at(TokenKind::Comma) {
            let mut items = vec![first];
            while self.eat(TokenKind::Comma) {
                if self.at(TokenKind::KwIn) {
                    break;
                }
                items.push(self.parse_mlhs_item(ctx)?);
            }
            let span = self.span_from(var_start);
            self.alloc(NodeKind::Mlhs { items }, span)
        } else {
            first
        };
        self.expect(TokenKind::KwIn)?;
        let iter = self.parse_loop_cond(ctx)?;
        self.parse_loop_do()?;
        let body = self.parse_compstmt(ctx.with(ParseContext::IN_LOOP));
        self.expect(TokenKind::KwEnd)?;
        let span = self.span_from(start);
        Ok(self.alloc(NodeKind::For { var, iter, body }, span))
    }

    /// Loop condition; a `do` scanned while it is open belongs to the
    /// loop, not to a call inside the condition.
    fn parse_loop_cond(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        self.lexer_mut().cond_push(true);
        let cond = self.parse_expr_value(ctx.with(ParseContext::NO_BLOCK));
        self.lexer_mut().cond_pop();
        cond
    }

    /// `case` with `when` branches, or `case`/`in` pattern matching.
    pub(crate) fn parse_case(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        let keyword = self.bump();
        let start = keyword.span.start;
        let subject = if self.at_any(TERMS) || self.at(TokenKind::KwWhen) {
            None
        } else {
            Some(self.parse_expr_value(ctx)?)
        };
        self.skip_terms();
        match self.peek_kind() {
            TokenKind::KwWhen => {
                let mut whens = Vec::new();
                let mut all_conds = Vec::new();
                while self.at(TokenKind::KwWhen) {
                    whens.push(self.parse_when(ctx, &mut all_conds)?);
                }
                self.warn_duplicate_when(&all_conds);
                let else_body = self.parse_case_else(ctx)?;
                let span = self.span_from(start);
                Ok(self.alloc(
                    NodeKind::Case {
                        subject,
                        whens,
                        else_body,
                    },
                    span,
                ))
            }
            TokenKind::KwIn => {
                let Some(subject) = subject else {
                    let span = self.peek_span();
                    return Err(ParseError::syntax("syntax error, unexpected `in'", span));
                };
                let mut clauses = Vec::new();
                while self.at(TokenKind::KwIn) {
                    clauses.push(self.parse_in_clause(ctx)?);
                }
                let else_body = self.parse_case_else(ctx)?;
                let span = self.span_from(start);
                Ok(self.alloc(
                    NodeKind::CaseMatch {
                        subject,
                        clauses,
                        else_body,
                    },
                    span,
                ))
            }
            _ => Err(self.unexpected(CASE_BRANCH)),
        }
    }

    fn parse_case_else(&mut self, ctx: ParseContext) -> PResult<Option<NodeId>> {
        let else_body = if self.eat(TokenKind::KwElse) {
            self.parse_compstmt(ctx)
        } else {
            None
        };
        self.expect(TokenKind::KwEnd)?;
        Ok(else_body)
    }

    /// `when a, *b then body`. Conditions are also collected into `all`
    /// for the duplicate check across branches.
    fn parse_when(&mut self, ctx: ParseContext, all: &mut Vec<NodeId>) -> PResult<NodeId> {
        let start = self.bump().span.start;
        let mut conds = Vec::new();
        loop {
            let cond = if self.at(TokenKind::Splat) {
                let splat_start = self.bump().span.start;
                let value = self.parse_arg(ctx, Prec::Lowest, Mode::empty())?;
                let span = self.span_from(splat_start);
                self.alloc(NodeKind::Splat { value: Some(value) }, span)
            } else {
                self.parse_arg(ctx, Prec::Lowest, Mode::empty())?
            };
            conds.push(cond);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        all.extend_from_slice(&conds);
        self.parse_then()?;
        let body = self.parse_compstmt(ctx);
        let span = self.span_from(start);
        Ok(self.alloc(NodeKind::When { conds, body }, span))
    }

    /// `in pattern [if guard] then body`
    fn parse_in_clause(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        let start = self.bump().span.start;
        let saved = self.begin_pattern();
        let head = self.parse_in_head(ctx);
        self.lexer_mut().set_in_kwarg(saved);
        let (pattern, guard) = head?;
        let body = self.parse_compstmt(ctx);
        let span = self.span_from(start);
        Ok(self.alloc(
            NodeKind::InClause {
                pattern,
                guard,
                body,
            },
            span,
        ))
    }

    fn parse_in_head(
        &mut self,
        ctx: ParseContext,
    ) -> PResult<(NodeId, Option<(GuardKind, NodeId)>)> {
        let pattern = self.parse_pattern_top(ctx)?;
        let guard = match self.peek_kind() {
            TokenKind::KwIfMod => {
                self.bump();
                Some((GuardKind::If, self.parse_expr_value(ctx)?))
            }
            TokenKind::KwUnlessMod => {
                self.bump();
                Some((GuardKind::Unless, self.parse_expr_value(ctx)?))
            }
            _ => None,
        };
        self.parse_then()?;
        Ok((pattern, guard))
    }

    /// `begin body rescue ... ensure ... end`
    pub(crate) fn parse_begin(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        let start = self.bump().span.start;
        let body = self.parse_bodystmt(ctx)?;
        self.expect(TokenKind::KwEnd)?;
        let span = self.span_from(start);
        Ok(self.alloc(NodeKind::Begin { body }, span))
    }
}
