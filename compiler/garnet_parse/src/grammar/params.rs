//! Parameter lists of methods, blocks and lambdas.

use garnet_diagnostic::ErrorCode;
use garnet_ir::{Name, NodeId, NodeKind, Span, TokenKind};

use super::{Mode, Prec};
use crate::recovery::{TokenSet, VALUE_START};
use crate::scope::{Forwarding, VarRole};
use crate::{PResult, ParseContext, ParseError, Parser};

/// Whose parameters are being parsed.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum ParamsKind {
    Def,
    Block,
    Lambda,
}

/// Position reached in a parameter list. Parameters must appear in this
/// order; required parameters after a rest or optional one are `Post`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug)]
enum Phase {
    Pre,
    Opt,
    Rest,
    Post,
    Kw,
    KwRest,
    Block,
}

impl Phase {
    /// Latest phase that may precede a parameter of this phase.
    fn max_prior(self) -> Phase {
        match self {
            Phase::Pre => Phase::Pre,
            Phase::Opt | Phase::Rest => Phase::Opt,
            Phase::Post => Phase::Post,
            Phase::Kw | Phase::KwRest => Phase::Kw,
            Phase::Block => Phase::KwRest,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Phase::Pre | Phase::Post => "required",
            Phase::Opt => "optional",
            Phase::Rest => "rest",
            Phase::Kw => "keyword",
            Phase::KwRest => "keyword rest",
            Phase::Block => "block",
        }
    }
}

#[derive(Default)]
struct ParamLists {
    required: Vec<NodeId>,
    optional: Vec<NodeId>,
    rest: Option<NodeId>,
    post: Vec<NodeId>,
    keywords: Vec<NodeId>,
    kwrest: Option<NodeId>,
    block: Option<NodeId>,
    block_locals: Vec<NodeId>,
    /// Every parameter in source order.
    written: Vec<NodeId>,
    /// An order error was reported; the tree keeps `written`.
    misordered: bool,
}

impl Parser<'_> {
    /// Parameters up to (not including) a token in `end`.
    pub(crate) fn parse_param_list(
        &mut self,
        ctx: ParseContext,
        kind: ParamsKind,
        end: TokenSet,
    ) -> PResult<NodeId> {
        let start = self.peek_span().start;
        let multiline = end.contains(TokenKind::RParen);
        let mut lists = ParamLists::default();
        let mut phase = Phase::Pre;
        loop {
            if multiline {
                self.skip_newlines();
            }
            if self.at_any(end) {
                if kind == ParamsKind::Block && phase == Phase::Pre && lists.rest.is_none() {
                    // `|a,|` takes the first element only, like `|a, *|`.
                    if !lists.required.is_empty() {
                        let span = self.peek_span();
                        lists.rest = Some(self.alloc(NodeKind::RestArg(None), span));
                    }
                }
                break;
            }
            if kind != ParamsKind::Def && self.at(TokenKind::Semi) {
                self.parse_block_locals(&mut lists)?;
                break;
            }
            let param = self.parse_param(ctx, kind, &mut lists, &mut phase)?;
            lists.written.push(param);
            if !self.eat(TokenKind::Comma) {
                if kind != ParamsKind::Def && self.at(TokenKind::Semi) {
                    self.parse_block_locals(&mut lists)?;
                }
                break;
            }
        }
        let span = self.span_from(start);
        if lists.misordered {
            let mut written = lists.written;
            written.extend(lists.block_locals);
            return Ok(self.alloc(NodeKind::UnorderedParams(written), span));
        }
        Ok(self.alloc(
            NodeKind::Params {
                required: lists.required,
                optional: lists.optional,
                rest: lists.rest,
                post: lists.post,
                keywords: lists.keywords,
                kwrest: lists.kwrest,
                block: lists.block,
                block_locals: lists.block_locals,
            },
            span,
        ))
    }

    fn parse_param(
        &mut self,
        ctx: ParseContext,
        kind: ParamsKind,
        lists: &mut ParamLists,
        phase: &mut Phase,
    ) -> PResult<NodeId> {
        let start = self.peek_span().start;
        match self.peek_kind() {
            TokenKind::Ident | TokenKind::LocalIdent => {
                let token = self.bump();
                let name = self.token_name(&token)?;
                self.declare_var(name, VarRole::Param, token.span);
                if self.at(TokenKind::Assign) {
                    self.advance_phase(lists, phase, Phase::Opt, token.span);
                    self.bump();
                    let default = self.parse_default(ctx, kind, name)?;
                    let span = self.span_from(start);
                    let arg = self.alloc(NodeKind::OptArg { name, default }, span);
                    lists.optional.push(arg);
                    Ok(arg)
                } else {
                    let arg = self.alloc(NodeKind::Arg(name), token.span);
                    self.push_required(lists, phase, arg, token.span);
                    Ok(arg)
                }
            }
            TokenKind::LParen | TokenKind::LParenArg | TokenKind::LParenCall => {
                let arg = self.nested(|p| p.parse_destructure())?;
                let span = self.node_span(arg);
                self.push_required(lists, phase, arg, span);
                Ok(arg)
            }
            TokenKind::Label => {
                let token = self.bump();
                let name = self.token_name(&token)?;
                let name_span = Span::new(token.span.start, token.span.end.saturating_sub(1));
                self.declare_var(name, VarRole::Param, name_span);
                self.advance_phase(lists, phase, Phase::Kw, token.span);
                let default = if self.at_any(VALUE_START) {
                    Some(self.parse_default(ctx, kind, name)?)
                } else {
                    None
                };
                let span = self.span_from(start);
                let arg = self.alloc(NodeKind::KwArg { name, default }, span);
                lists.keywords.push(arg);
                Ok(arg)
            }
            TokenKind::Splat | TokenKind::Star => {
                let op = self.bump();
                self.advance_phase(lists, phase, Phase::Rest, op.span);
                let name = self.opt_param_name(kind, Forwarding::REST)?;
                let span = self.span_from(start);
                let arg = self.alloc(NodeKind::RestArg(name), span);
                lists.rest = Some(arg);
                Ok(arg)
            }
            TokenKind::DSplat | TokenKind::Pow => {
                let op = self.bump();
                self.advance_phase(lists, phase, Phase::KwRest, op.span);
                let arg = if self.eat(TokenKind::KwNil) {
                    let span = self.span_from(start);
                    self.alloc(NodeKind::NoKwArg, span)
                } else {
                    let name = self.opt_param_name(kind, Forwarding::KWREST)?;
                    let span = self.span_from(start);
                    self.alloc(NodeKind::KwRestArg(name), span)
                };
                lists.kwrest = Some(arg);
                Ok(arg)
            }
            TokenKind::BlockAmper | TokenKind::Amper => {
                let op = self.bump();
                self.advance_phase(lists, phase, Phase::Block, op.span);
                let name = self.opt_param_name(kind, Forwarding::BLOCK)?;
                let span = self.span_from(start);
                let arg = self.alloc(NodeKind::BlockArg(name), span);
                lists.block = Some(arg);
                Ok(arg)
            }
            TokenKind::BDot3 | TokenKind::Dot3 if kind == ParamsKind::Def => {
                let dots = self.bump();
                if *phase > Phase::Opt {
                    self.error_at(ErrorCode::E1013, "unexpected ...", dots.span);
                    lists.misordered = true;
                }
                *phase = Phase::Block;
                self.scopes.add_forwarding(
                    Forwarding::ALL | Forwarding::REST | Forwarding::KWREST | Forwarding::BLOCK,
                );
                let arg = self.alloc(NodeKind::ForwardArg, dots.span);
                lists.rest = Some(arg);
                Ok(arg)
            }
            TokenKind::Const | TokenKind::IVar | TokenKind::GVar | TokenKind::CVar => {
                let token = self.bump();
                let what = match token.kind {
                    TokenKind::Const => "a constant",
                    TokenKind::IVar => "an instance variable",
                    TokenKind::GVar => "a global variable",
                    _ => "a class variable",
                };
                self.error_at(
                    ErrorCode::E1020,
                    format!("formal argument cannot be {what}"),
                    token.span,
                );
                let name = self.token_name(&token)?;
                let arg = self.alloc(NodeKind::Arg(name), token.span);
                self.push_required(lists, phase, arg, token.span);
                Ok(arg)
            }
            _ => Err(self.unexpected(TokenSet::single(TokenKind::Ident))),
        }
    }

    /// A required parameter: leading before any optional or rest
    /// parameter, trailing after one.
    fn push_required(&mut self, lists: &mut ParamLists, phase: &mut Phase, arg: NodeId, span: Span) {
        match *phase {
            Phase::Pre => lists.required.push(arg),
            Phase::Opt | Phase::Rest | Phase::Post => {
                *phase = Phase::Post;
                lists.post.push(arg);
            }
            Phase::Kw | Phase::KwRest | Phase::Block => {
                self.error_at(ErrorCode::E1013, "unexpected required argument", span);
                lists.misordered = true;
                lists.post.push(arg);
            }
        }
    }

    fn advance_phase(&mut self, lists: &mut ParamLists, phase: &mut Phase, next: Phase, span: Span) {
        if *phase > next.max_prior() {
            self.error_at(
                ErrorCode::E1013,
                format!("unexpected {} argument", next.describe()),
                span,
            );
            lists.misordered = true;
        }
        *phase = next;
    }

    /// Default value of an optional or keyword parameter. The parameter
    /// itself may not appear in it.
    fn parse_default(&mut self, ctx: ParseContext, kind: ParamsKind, name: Name) -> PResult<NodeId> {
        let saved_arg = self.current_arg.replace(name);
        let saved_argdef = self.lexer_mut().set_in_argdef(false);
        let default = if kind == ParamsKind::Block {
            // `|a = 1 | 2|` would be ambiguous; block defaults are primaries.
            self.parse_unary(ctx, Mode::empty())
        } else {
            self.parse_arg(ctx, Prec::Lowest, Mode::empty())
        };
        self.lexer_mut().set_in_argdef(saved_argdef);
        self.current_arg = saved_arg;
        default
    }

    /// Name after `*`, `**` or `&`. Anonymous method parameters may be
    /// forwarded by the body.
    fn opt_param_name(&mut self, kind: ParamsKind, anonymous: Forwarding) -> PResult<Option<Name>> {
        if self.at(TokenKind::Ident) || self.at(TokenKind::LocalIdent) {
            let token = self.bump();
            let name = self.token_name(&token)?;
            self.declare_var(name, VarRole::Param, token.span);
            return Ok(Some(name));
        }
        if kind == ParamsKind::Def {
            self.scopes.add_forwarding(anonymous);
        }
        Ok(None)
    }

    /// `(a, (b, *c))` as a parameter.
    fn parse_destructure(&mut self) -> PResult<NodeId> {
        let start = self.bump().span.start;
        let mut items = Vec::new();
        loop {
            let item_start = self.peek_span().start;
            let item = match self.peek_kind() {
                TokenKind::Ident | TokenKind::LocalIdent => {
                    let token = self.bump();
                    let name = self.token_name(&token)?;
                    self.declare_var(name, VarRole::Param, token.span);
                    self.alloc(NodeKind::Arg(name), token.span)
                }
                TokenKind::Splat | TokenKind::Star => {
                    self.bump();
                    let name = self.opt_param_name(ParamsKind::Block, Forwarding::empty())?;
                    let span = self.span_from(item_start);
                    self.alloc(NodeKind::RestArg(name), span)
                }
                TokenKind::LParen | TokenKind::LParenArg | TokenKind::LParenCall => {
                    self.nested(|p| p.parse_destructure())?
                }
                _ => return Err(self.unexpected(TokenSet::single(TokenKind::Ident))),
            };
            items.push(item);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        let span = self.span_from(start);
        Ok(self.alloc(NodeKind::MlhsArg { items }, span))
    }

    /// `; x, y` block-local variables.
    fn parse_block_locals(&mut self, lists: &mut ParamLists) -> PResult<()> {
        self.bump();
        loop {
            self.skip_newlines();
            let token = self.bump();
            if !matches!(token.kind, TokenKind::Ident | TokenKind::LocalIdent) {
                return Err(ParseError::unexpected(&token, TokenSet::single(TokenKind::Ident)));
            }
            let name = self.token_name(&token)?;
            self.declare_var(name, VarRole::BlockLocal, token.span);
            lists
                .block_locals
                .push(self.alloc(NodeKind::ShadowArg(name), token.span));
            if !self.eat(TokenKind::Comma) {
                return Ok(());
            }
        }
    }
}
