//! Definitions: `def`, `class`, `module`, `alias` and `undef`.

use garnet_diagnostic::ErrorCode;
use garnet_ir::{ConstScope, Name, NodeId, NodeKind, Token, TokenKind};
use garnet_lexer::LexState;

use super::params::ParamsKind;
use super::{Mode, Prec};
use crate::recovery::{TokenSet, TERMS};
use crate::scope::{Resolution, ScopeKind};
use crate::{PResult, ParseContext, ParseError, Parser};

const RPAREN: TokenSet = TokenSet::single(TokenKind::RParen);

impl Parser<'_> {
    /// `def name(params) body end`, `def recv.name ...` or the endless
    /// `def name(params) = value`.
    pub(crate) fn parse_def(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        let start = self.bump().span.start;
        let first = self.bump();
        let receiver = if matches!(
            first.kind,
            TokenKind::LParen | TokenKind::LParenArg | TokenKind::LParenCall
        ) {
            let expr = self.parse_expr(ctx.without(ParseContext::NO_BLOCK), Mode::COMMAND)?;
            self.expect(TokenKind::RParen)?;
            if !self.at(TokenKind::Dot) {
                return Err(self.unexpected(TokenSet::single(TokenKind::Dot)));
            }
            Some(expr)
        } else if self.at(TokenKind::Dot) {
            Some(self.singleton_receiver(&first)?)
        } else {
            None
        };
        let name_token = if receiver.is_some() {
            self.bump();
            self.set_lex_state(LexState::FNAME);
            self.bump()
        } else {
            first
        };
        let name = self.method_name(&name_token)?;
        self.set_lex_state(LexState::ENDFN | LexState::LABEL);
        tracing::trace!(name = self.text(name), "method definition");
        self.with_scope(ScopeKind::Method, |p| {
            p.nested(|p| p.parse_def_rest(ctx, start, receiver, name))
        })
    }

    fn singleton_receiver(&mut self, token: &Token) -> PResult<NodeId> {
        let kind = match token.kind {
            TokenKind::KwSelf => NodeKind::SelfRef,
            TokenKind::Ident | TokenKind::LocalIdent => {
                let name = self.token_name(token)?;
                if self.scopes.resolve(name) == Resolution::Unresolved {
                    NodeKind::VCall(name)
                } else {
                    self.scopes.mark_used(name);
                    NodeKind::LocalVar(name)
                }
            }
            TokenKind::Const => NodeKind::Const {
                scope: ConstScope::Lexical,
                name: self.token_name(token)?,
            },
            TokenKind::IVar => NodeKind::IVar(self.token_name(token)?),
            TokenKind::CVar => NodeKind::CVar(self.token_name(token)?),
            TokenKind::GVar => NodeKind::GVar(self.token_name(token)?),
            _ => {
                return Err(ParseError::syntax(
                    "cannot define singleton method for literals",
                    token.span,
                ))
            }
        };
        Ok(self.alloc(kind, token.span))
    }

    fn parse_def_rest(
        &mut self,
        ctx: ParseContext,
        start: u32,
        receiver: Option<NodeId>,
        name: Name,
    ) -> PResult<NodeId> {
        let params = match self.peek_kind() {
            TokenKind::LParen | TokenKind::LParenArg | TokenKind::LParenCall => {
                self.bump();
                let saved = self.lexer_mut().set_in_argdef(true);
                let params = if self.at(TokenKind::RParen) {
                    Ok(self.empty_params())
                } else {
                    self.parse_param_list(ctx, ParamsKind::Def, RPAREN)
                };
                self.lexer_mut().set_in_argdef(saved);
                let params = params?;
                self.skip_newlines();
                self.expect(TokenKind::RParen)?;
                self.set_lex_state(LexState::BEG);
                self.lexer_mut().set_command_start(true);
                Some(params)
            }
            TokenKind::Assign => None,
            kind if TERMS.contains(kind) => None,
            _ => {
                let saved_kwarg = self.lexer_mut().set_in_kwarg(true);
                let saved_argdef = self.lexer_mut().set_in_argdef(true);
                let params = self.parse_param_list(ctx, ParamsKind::Def, TERMS);
                self.lexer_mut().set_in_argdef(saved_argdef);
                self.lexer_mut().set_in_kwarg(saved_kwarg);
                Some(params?)
            }
        };
        let body_ctx = ParseContext::IN_DEF;
        let (body, endless) = if self.at(TokenKind::Assign) {
            let eq = self.bump();
            if is_setter_name(self.text(name)) {
                self.error_at(
                    ErrorCode::E1001,
                    "setter method cannot be defined in an endless method definition",
                    eq.span,
                );
            }
            let value_start = self.peek_span().start;
            let mut value = self.parse_arg(body_ctx, Prec::Lowest, Mode::COMMAND)?;
            if self.eat(TokenKind::KwRescueMod) {
                let rescue = self.parse_arg(body_ctx, Prec::Lowest, Mode::COMMAND)?;
                let span = self.span_from(value_start);
                value = self.alloc(NodeKind::RescueMod { body: value, rescue }, span);
            }
            (Some(value), true)
        } else {
            let body = self.parse_bodystmt(body_ctx)?;
            self.expect(TokenKind::KwEnd)?;
            (body, false)
        };
        let span = self.span_from(start);
        Ok(self.alloc(
            NodeKind::Def {
                receiver,
                name,
                params,
                body,
                endless,
            },
            span,
        ))
    }

    /// `class Path < Super ... end` or `class << target ... end`.
    pub(crate) fn parse_class(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        let keyword = self.bump();
        let start = keyword.span.start;
        if self.eat(TokenKind::LShift) {
            let target = self.parse_expr(ctx, Mode::COMMAND)?;
            self.expect_terms()?;
            let body = self.with_scope(ScopeKind::SingletonClass, |p| {
                p.parse_bodystmt(ParseContext::IN_CLASS)
            })?;
            self.expect(TokenKind::KwEnd)?;
            let span = self.span_from(start);
            return Ok(self.alloc(NodeKind::SClass { target, body }, span));
        }
        if ctx.in_def() {
            self.error_at(ErrorCode::E1015, "class definition in method body", keyword.span);
        }
        let path = self.parse_cpath(ctx)?;
        let superclass = if self.eat(TokenKind::Lt) {
            self.set_lex_state(LexState::BEG);
            self.lexer_mut().set_command_start(true);
            let superclass = self.parse_expr(ctx, Mode::COMMAND)?;
            self.expect_terms()?;
            Some(superclass)
        } else {
            self.skip_terms();
            None
        };
        let body = self.with_scope(ScopeKind::Class, |p| p.parse_bodystmt(ParseContext::IN_CLASS))?;
        self.expect(TokenKind::KwEnd)?;
        let span = self.span_from(start);
        Ok(self.alloc(
            NodeKind::Class {
                path,
                superclass,
                body,
            },
            span,
        ))
    }

    /// `module Path ... end`.
    pub(crate) fn parse_module(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        let keyword = self.bump();
        let start = keyword.span.start;
        if ctx.in_def() {
            self.error_at(ErrorCode::E1015, "module definition in method body", keyword.span);
        }
        let path = self.parse_cpath(ctx)?;
        self.skip_terms();
        let body = self.with_scope(ScopeKind::Module, |p| p.parse_bodystmt(ParseContext::IN_CLASS))?;
        self.expect(TokenKind::KwEnd)?;
        let span = self.span_from(start);
        Ok(self.alloc(NodeKind::Module { path, body }, span))
    }

    /// Constant path naming a class or module.
    fn parse_cpath(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        let path = self.parse_primary(ctx, Mode::empty())?;
        if !matches!(self.node(path), NodeKind::Const { .. }) {
            let span = self.node_span(path);
            self.error_at(ErrorCode::E1001, "class/module name must be CONSTANT", span);
        }
        Ok(path)
    }

    /// At least one terminator.
    fn expect_terms(&mut self) -> PResult<()> {
        if !self.at_any(TERMS) {
            return Err(self.unexpected(TERMS));
        }
        self.skip_terms();
        Ok(())
    }

    /// `alias new old` for methods, `alias $new $old` for globals.
    pub(crate) fn parse_alias(&mut self) -> PResult<NodeId> {
        let start = self.bump().span.start;
        if self.at(TokenKind::GVar) {
            let new_token = self.bump();
            let new_name = self.alloc(NodeKind::GVar(self.token_name(&new_token)?), new_token.span);
            let old_token = self.bump();
            let old_kind = match old_token.kind {
                TokenKind::GVar => NodeKind::GVar(self.token_name(&old_token)?),
                TokenKind::BackRef => return self.finish_alias_special(start, new_name, &old_token),
                TokenKind::NthRef => {
                    return Err(ParseError::syntax(
                        "can't make alias for the number variables",
                        old_token.span,
                    ))
                }
                _ => {
                    return Err(ParseError::unexpected(
                        &old_token,
                        TokenSet::single(TokenKind::GVar),
                    ))
                }
            };
            let old_name = self.alloc(old_kind, old_token.span);
            let span = self.span_from(start);
            return Ok(self.alloc(NodeKind::Alias { new_name, old_name }, span));
        }
        let new_name = self.parse_fitem()?;
        self.set_lex_state(LexState::FNAME | LexState::FITEM);
        let old_name = self.parse_fitem()?;
        let span = self.span_from(start);
        Ok(self.alloc(NodeKind::Alias { new_name, old_name }, span))
    }

    fn finish_alias_special(
        &mut self,
        start: u32,
        new_name: NodeId,
        old_token: &Token,
    ) -> PResult<NodeId> {
        let old_name = self.special_var(old_token)?;
        let span = self.span_from(start);
        Ok(self.alloc(NodeKind::Alias { new_name, old_name }, span))
    }

    /// `undef a, :b, +`
    pub(crate) fn parse_undef(&mut self) -> PResult<NodeId> {
        let start = self.bump().span.start;
        let mut names = Vec::new();
        loop {
            names.push(self.parse_fitem()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
            self.set_lex_state(LexState::FNAME | LexState::FITEM);
        }
        let span = self.span_from(start);
        Ok(self.alloc(NodeKind::Undef(names), span))
    }

    /// A method name operand of `alias`/`undef`, as a symbol.
    fn parse_fitem(&mut self) -> PResult<NodeId> {
        match self.peek_kind() {
            TokenKind::SymBeg => self.parse_literal(ParseContext::NONE),
            _ => {
                let token = self.bump();
                let name = self.method_name(&token)?;
                Ok(self.alloc(NodeKind::Sym(name), token.span))
            }
        }
    }
}

/// `name=` but not a comparison operator.
fn is_setter_name(name: &str) -> bool {
    name.ends_with('=') && !matches!(name, "==" | "!=" | "<=" | ">=" | "===")
}
