//! Primaries: literals, variables, identifiers, bracketed forms, lambdas
//! and the keyword expressions that are not blocks of statements.

use garnet_diagnostic::ErrorCode;
use garnet_ir::{CallOp, ConstScope, Name, NodeId, NodeKind, Span, Token, TokenKind, TokenValue};
use garnet_lexer::{is_numbered_param, LexState};

use super::call::CallArgs;
use super::params::ParamsKind;
use super::{Mode, Prec};
use crate::recovery::{TokenSet, COMMAND_ARG_START, VALUE_START};
use crate::scope::{Forwarding, Resolution, ScopeKind};
use crate::{PResult, ParseContext, ParseError, Parser};

impl Parser<'_> {
    /// A primary and its postfix chain.
    pub(crate) fn parse_primary(&mut self, ctx: ParseContext, mode: Mode) -> PResult<NodeId> {
        let start = self.peek_span().start;
        let node = match self.peek_kind() {
            TokenKind::Ident | TokenKind::LocalIdent | TokenKind::FIdent | TokenKind::Const => {
                return self.parse_identifier(ctx, mode);
            }
            TokenKind::Numeric => {
                let token = self.bump();
                let TokenValue::Number(value) = token.value else {
                    return Err(ParseError::syntax("numeric literal without a value", token.span));
                };
                self.alloc(NodeKind::Numeric(value), token.span)
            }
            TokenKind::Char => {
                let token = self.bump();
                let TokenValue::Str(value) = token.value else {
                    return Err(ParseError::syntax("character literal without a value", token.span));
                };
                let frozen = self.frozen_strings();
                self.alloc(NodeKind::Str { value, frozen }, token.span)
            }
            TokenKind::Symbol => {
                let token = self.bump();
                let name = self.token_name(&token)?;
                self.alloc(NodeKind::Sym(name), token.span)
            }
            TokenKind::StringBeg => self.parse_strings(ctx)?,
            TokenKind::XStringBeg
            | TokenKind::RegexpBeg
            | TokenKind::SymBeg
            | TokenKind::WordsBeg
            | TokenKind::QWordsBeg
            | TokenKind::SymbolsBeg
            | TokenKind::QSymbolsBeg => self.parse_literal(ctx)?,
            TokenKind::IVar | TokenKind::CVar | TokenKind::GVar => {
                let token = self.bump();
                let name = self.token_name(&token)?;
                let kind = match token.kind {
                    TokenKind::IVar => NodeKind::IVar(name),
                    TokenKind::CVar => NodeKind::CVar(name),
                    _ => NodeKind::GVar(name),
                };
                self.alloc(kind, token.span)
            }
            TokenKind::NthRef | TokenKind::BackRef => {
                let token = self.bump();
                self.special_var(&token)?
            }
            TokenKind::KwNil => self.keyword_node(NodeKind::Nil),
            TokenKind::KwTrue => self.keyword_node(NodeKind::True),
            TokenKind::KwFalse => self.keyword_node(NodeKind::False),
            TokenKind::KwSelf => self.keyword_node(NodeKind::SelfRef),
            TokenKind::KwFile => self.keyword_node(NodeKind::File),
            TokenKind::KwEncoding => self.keyword_node(NodeKind::Encoding),
            TokenKind::KwLine => {
                let token = self.bump();
                let line = self.line_number(token.span.start);
                self.alloc(NodeKind::Line(line), token.span)
            }
            TokenKind::Colon3 => {
                self.bump();
                let token = self.expect(TokenKind::Const)?;
                return self.parse_const_ref(ctx, mode, ConstScope::TopLevel, &token, start);
            }
            TokenKind::LParen | TokenKind::LParenArg => self.parse_paren(ctx)?,
            TokenKind::LBracket => self.parse_array(ctx)?,
            TokenKind::LBrace => self.parse_hash(ctx)?,
            TokenKind::Arrow => self.parse_lambda(ctx)?,
            TokenKind::KwIf | TokenKind::KwUnless => self.parse_if(ctx)?,
            TokenKind::KwWhile | TokenKind::KwUntil => self.parse_while(ctx)?,
            TokenKind::KwFor => self.parse_for(ctx)?,
            TokenKind::KwCase => self.parse_case(ctx)?,
            TokenKind::KwBegin => self.parse_begin(ctx)?,
            TokenKind::KwDef => self.parse_def(ctx)?,
            TokenKind::KwClass => self.parse_class(ctx)?,
            TokenKind::KwModule => self.parse_module(ctx)?,
            TokenKind::KwReturn | TokenKind::KwBreak | TokenKind::KwNext => {
                return self.parse_jump(ctx);
            }
            TokenKind::KwRedo => self.keyword_node(NodeKind::Redo),
            TokenKind::KwRetry => {
                let span = self.peek_span();
                if !ctx.in_rescue() {
                    self.error_at(ErrorCode::E1014, "Invalid retry without rescue", span);
                }
                self.keyword_node(NodeKind::Retry)
            }
            TokenKind::KwYield => return self.parse_yield(ctx, mode),
            TokenKind::KwSuper => return self.parse_super(ctx, mode),
            TokenKind::KwNot => self.parse_not_call(ctx)?,
            TokenKind::KwDefined => return self.parse_unary(ctx, mode),
            _ => return Err(self.unexpected(TokenSet::new())),
        };
        self.parse_postfix(ctx, node, start, mode)
    }

    fn keyword_node(&mut self, kind: NodeKind) -> NodeId {
        let token = self.bump();
        self.alloc(kind, token.span)
    }

    pub(crate) fn token_name(&self, token: &Token) -> PResult<Name> {
        token
            .name()
            .ok_or_else(|| ParseError::syntax(format!("{} without a name", token.kind), token.span))
    }

    pub(super) fn special_var(&mut self, token: &Token) -> PResult<NodeId> {
        let kind = match token.value {
            TokenValue::NthRef(n) => NodeKind::NthRef(n),
            TokenValue::BackRef(c) => NodeKind::BackRef(c),
            _ => return Err(ParseError::syntax("malformed special variable", token.span)),
        };
        Ok(self.alloc(kind, token.span))
    }

    /// Identifier or constant: a variable, a call with arguments or a
    /// block, or a command call.
    fn parse_identifier(&mut self, ctx: ParseContext, mode: Mode) -> PResult<NodeId> {
        let token = self.bump();
        let start = token.span.start;
        let name = self.token_name(&token)?;
        let next = self.peek_kind();
        if next == TokenKind::LParenCall {
            let args = self.parse_paren_args(ctx)?;
            let block = self.parse_opt_block(ctx, args.block)?;
            let call = self.build_call(None, name, args.args, block, CallOp::Dot, start);
            return self.parse_postfix(ctx, call, start, mode);
        }
        if mode.contains(Mode::COMMAND) && COMMAND_ARG_START.contains(next) {
            return self.parse_command(ctx, mode, Callee::method(None, name, CallOp::Dot), start);
        }
        let takes_block = token.kind != TokenKind::LocalIdent
            && (next == TokenKind::LBraceBlock || (next == TokenKind::KwDo && ctx.allows_block()));
        if takes_block {
            let block = self.parse_opt_block(ctx, None)?;
            let call = self.build_call(None, name, Vec::new(), block, CallOp::Dot, start);
            return self.parse_postfix(ctx, call, start, mode);
        }
        let node = match token.kind {
            TokenKind::Const => {
                return self.parse_const_ref(ctx, mode, ConstScope::Lexical, &token, start);
            }
            TokenKind::LocalIdent => self.local_read(name, token.span),
            TokenKind::FIdent => self.build_call(None, name, Vec::new(), None, CallOp::Dot, start),
            _ => self.alloc(NodeKind::VCall(name), token.span),
        };
        self.parse_postfix(ctx, node, start, mode)
    }

    /// A constant reference, or a call when arguments follow
    /// (`Integer("1")`, `::Kernel.puts`).
    fn parse_const_ref(
        &mut self,
        ctx: ParseContext,
        mode: Mode,
        scope: ConstScope,
        token: &Token,
        start: u32,
    ) -> PResult<NodeId> {
        let name = self.token_name(token)?;
        if scope == ConstScope::TopLevel && self.at(TokenKind::LParenCall) {
            let args = self.parse_paren_args(ctx)?;
            let block = self.parse_opt_block(ctx, args.block)?;
            let call = self.build_call(None, name, args.args, block, CallOp::Dot, start);
            return self.parse_postfix(ctx, call, start, mode);
        }
        let span = self.span_from(start);
        let node = self.alloc(NodeKind::Const { scope, name }, span);
        self.parse_postfix(ctx, node, start, mode)
    }

    /// Read of a name the tracker knows as a local, or of a numbered
    /// block parameter.
    fn local_read(&mut self, name: Name, span: Span) -> NodeId {
        let text = self.text(name);
        if is_numbered_param(text.as_bytes()) && self.scopes.resolve(name) == Resolution::Unresolved {
            let index = text.as_bytes().get(1).map_or(0, |b| b - b'0');
            match self.scopes.numbered_param(index, span) {
                Ok(true) => {}
                Ok(false) => return self.alloc(NodeKind::VCall(name), span),
                Err(diag) => self.push_diagnostic(diag),
            }
            return self.alloc(NodeKind::LocalVar(name), span);
        }
        if self.current_arg == Some(name) {
            let message = format!("circular argument reference - {}", self.text(name));
            self.error_at(ErrorCode::E1006, message, span);
        }
        self.scopes.mark_used(name);
        self.alloc(NodeKind::LocalVar(name), span)
    }

    /// `x:` shorthand value: the local `x` if there is one, else a call.
    pub(crate) fn shorthand_value(&mut self, name: Name, span: Span) -> NodeId {
        if self.scopes.resolve(name) == Resolution::Unresolved {
            self.alloc(NodeKind::VCall(name), span)
        } else {
            self.local_read(name, span)
        }
    }

    /// `(stmts)`, `()` or a parenthesized target list `(a, b)`.
    fn parse_paren(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        let open = self.bump();
        let start = open.span.start;
        let ctx = ctx.without(ParseContext::NO_BLOCK);
        self.skip_terms();
        if self.eat(TokenKind::RParen) {
            self.after_paren(open.kind);
            let span = self.span_from(start);
            return Ok(self.alloc(NodeKind::Nil, span));
        }
        if self.at(TokenKind::Splat) {
            let items_start = self.peek_span().start;
            return self.finish_paren_mlhs(ctx, open.kind, start, items_start, Vec::new());
        }
        let first = self.parse_paren_stmt(ctx)?;
        if self.at(TokenKind::Comma) && self.is_mlhs_item(first) {
            let items_start = self.node_span(first).start;
            let target = self.mlhs_target(ctx, first);
            self.bump();
            return self.finish_paren_mlhs(ctx, open.kind, start, items_start, vec![target]);
        }
        self.finish_paren_stmts(ctx, open.kind, first)
    }

    /// The rest of a parenthesised statement list after its first statement.
    fn finish_paren_stmts(
        &mut self,
        ctx: ParseContext,
        open: TokenKind,
        first: NodeId,
    ) -> PResult<NodeId> {
        let mut stmts = vec![first];
        if !self.at(TokenKind::RParen) {
            self.expect_stmt_end();
            self.parse_stmts_into(ctx, &mut stmts);
        }
        self.skip_newlines();
        self.expect(TokenKind::RParen)?;
        self.after_paren(open);
        Ok(self.make_body(stmts).unwrap_or(first))
    }

    /// `foo (1) {}`: the brace after a spaced paren argument is a block.
    fn after_paren(&mut self, open: TokenKind) {
        if open == TokenKind::LParenArg {
            self.set_lex_state(LexState::ENDARG);
        }
    }

    /// Targets after `(a,`. Either the parenthesis is itself a nested
    /// target list, or `=` follows and the whole assignment sits inside it.
    fn finish_paren_mlhs(
        &mut self,
        ctx: ParseContext,
        open: TokenKind,
        start: u32,
        items_start: u32,
        mut items: Vec<NodeId>,
    ) -> PResult<NodeId> {
        while !self.at(TokenKind::RParen) && !self.at(TokenKind::Assign) {
            items.push(self.parse_mlhs_item(ctx)?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        if self.at(TokenKind::Assign) {
            let lhs_span = self.span_from(items_start);
            let targets = self.alloc(NodeKind::Mlhs { items }, lhs_span);
            self.bump();
            let masgn = self.finish_masgn(ctx, items_start, targets)?;
            return self.finish_paren_stmts(ctx, open, masgn);
        }
        self.expect(TokenKind::RParen)?;
        let span = self.span_from(start);
        Ok(self.alloc(NodeKind::Mlhs { items }, span))
    }

    /// `[a, *b, c: 1]`
    fn parse_array(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        let start = self.bump().span.start;
        let ctx = ctx.without(ParseContext::NO_BLOCK);
        self.skip_newlines();
        let args = if self.at(TokenKind::RBracket) {
            CallArgs::default()
        } else {
            self.parse_call_args(ctx, Some(TokenKind::RBracket))?
        };
        self.skip_newlines();
        self.expect(TokenKind::RBracket)?;
        let span = self.span_from(start);
        if let Some(block) = args.block {
            let block_span = self.node_span(block);
            self.error_at(ErrorCode::E1001, "block argument should not be given", block_span);
        }
        Ok(self.alloc(NodeKind::Array { elements: args.args }, span))
    }

    /// `{ key => value, label: value, **rest }`
    fn parse_hash(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        let start = self.bump().span.start;
        let ctx = ctx.without(ParseContext::NO_BLOCK);
        let mut pairs = Vec::new();
        loop {
            self.skip_newlines();
            if self.at(TokenKind::RBrace) {
                break;
            }
            pairs.push(self.parse_hash_item(ctx)?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.skip_newlines();
        self.expect(TokenKind::RBrace)?;
        self.warn_duplicate_keys(&pairs);
        let span = self.span_from(start);
        Ok(self.alloc(NodeKind::Hash { pairs, braces: true }, span))
    }

    /// One entry of a hash literal or of trailing call arguments.
    pub(crate) fn parse_hash_item(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        let start = self.peek_span().start;
        match self.peek_kind() {
            TokenKind::Label => {
                let label = self.bump();
                let name = self.token_name(&label)?;
                let key = self.alloc(NodeKind::Sym(name), label.span);
                self.finish_label_pair(ctx, key, name, label.span, start)
            }
            TokenKind::DSplat => {
                self.bump();
                let value = if self.at_any(VALUE_START) {
                    Some(self.parse_arg(ctx, Prec::Lowest, Mode::empty())?)
                } else {
                    self.check_anonymous(Forwarding::KWREST, self.span_from(start));
                    None
                };
                let span = self.span_from(start);
                Ok(self.alloc(NodeKind::DoubleSplat { value }, span))
            }
            TokenKind::StringBeg => {
                let (key, label) = self.parse_string_or_label(ctx)?;
                if label {
                    let value = self.parse_arg(ctx, Prec::Lowest, Mode::empty())?;
                    let span = self.span_from(start);
                    return Ok(self.alloc(NodeKind::Pair { key, value }, span));
                }
                let key = self.parse_postfix(ctx, key, start, Mode::empty())?;
                let key = self.parse_arg_rest(ctx, key, start, Prec::Lowest, Mode::empty())?;
                self.finish_assoc_pair(ctx, key, start)
            }
            _ => {
                let key = self.parse_arg(ctx, Prec::Lowest, Mode::empty())?;
                self.finish_assoc_pair(ctx, key, start)
            }
        }
    }

    /// After `label:`: the value, or the shorthand `{x:}`.
    fn finish_label_pair(
        &mut self,
        ctx: ParseContext,
        key: NodeId,
        name: Name,
        label_span: Span,
        start: u32,
    ) -> PResult<NodeId> {
        let value = if self.at_any(VALUE_START) {
            self.parse_arg(ctx, Prec::Lowest, Mode::empty())?
        } else {
            let span = Span::new(label_span.start, label_span.end.saturating_sub(1));
            self.shorthand_value(name, span)
        };
        let span = self.span_from(start);
        Ok(self.alloc(NodeKind::Pair { key, value }, span))
    }

    fn finish_assoc_pair(&mut self, ctx: ParseContext, key: NodeId, start: u32) -> PResult<NodeId> {
        self.expect(TokenKind::Assoc)?;
        let value = self.parse_arg(ctx, Prec::Lowest, Mode::empty())?;
        let span = self.span_from(start);
        Ok(self.alloc(NodeKind::Pair { key, value }, span))
    }

    /// `->(params) { body }` or `-> params do body end`.
    fn parse_lambda(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        let start = self.bump().span.start;
        let saved_lpar = self.lexer_mut().begin_lambda();
        let saved_argdef = self.lexer_mut().set_in_argdef(true);
        self.with_scope(ScopeKind::Lambda, |p| {
            let result = p.parse_lambda_inner(ctx, start, saved_argdef);
            p.lexer_mut().end_lambda(saved_lpar);
            result
        })
    }

    fn parse_lambda_inner(
        &mut self,
        ctx: ParseContext,
        start: u32,
        saved_argdef: bool,
    ) -> PResult<NodeId> {
        let params = match self.peek_kind() {
            TokenKind::LParen | TokenKind::LParenCall | TokenKind::LParenArg => {
                self.bump();
                let params = if self.at(TokenKind::RParen) {
                    Ok(self.empty_params())
                } else {
                    self.parse_param_list(ctx, ParamsKind::Lambda, RPAREN)
                };
                self.lexer_mut().set_in_argdef(saved_argdef);
                let params = params?;
                self.expect(TokenKind::RParen)?;
                self.scopes.set_explicit_params();
                Some(params)
            }
            TokenKind::LambdaBeg | TokenKind::KwDoLambda => {
                self.lexer_mut().set_in_argdef(saved_argdef);
                None
            }
            _ => {
                let params = self.parse_param_list(ctx, ParamsKind::Lambda, LAMBDA_BODY);
                self.lexer_mut().set_in_argdef(saved_argdef);
                let params = params?;
                self.scopes.set_explicit_params();
                Some(params)
            }
        };
        self.lexer_mut().cmdarg_push(false);
        let body = self.parse_lambda_body(ctx);
        self.lexer_mut().cmdarg_pop();
        let body = body?;
        let numbered = self.scopes.numbered_arity();
        let span = self.span_from(start);
        Ok(self.alloc(
            NodeKind::Lambda {
                params,
                body,
                numbered,
            },
            span,
        ))
    }

    fn parse_lambda_body(&mut self, ctx: ParseContext) -> PResult<Option<NodeId>> {
        let inner = ctx.block_body();
        if self.eat(TokenKind::LambdaBeg) {
            let body = self.parse_compstmt(inner);
            self.expect(TokenKind::RBrace)?;
            return Ok(body);
        }
        if self.eat(TokenKind::KwDoLambda) {
            let body = self.parse_bodystmt(inner)?;
            self.expect(TokenKind::KwEnd)?;
            return Ok(body);
        }
        Err(self.unexpected(LAMBDA_BODY))
    }

    /// `return`, `break` and `next`, with an optional value.
    fn parse_jump(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        let keyword = self.bump();
        let start = keyword.span.start;
        if keyword.kind == TokenKind::KwReturn && ctx.in_class() && !ctx.in_def() {
            self.error_at(
                ErrorCode::E1018,
                "Invalid return in class/module body",
                keyword.span,
            );
        }
        let value = if self.at_any(COMMAND_ARG_START) {
            let args_start = self.peek_span().start;
            let args = self.parse_call_args(ctx, None)?;
            let splat = args
                .args
                .iter()
                .any(|arg| matches!(self.node(*arg), NodeKind::Splat { .. }));
            match args.args.as_slice() {
                [only] if !splat => Some(*only),
                _ => {
                    let span = self.span_from(args_start);
                    Some(self.alloc(NodeKind::Array { elements: args.args }, span))
                }
            }
        } else {
            None
        };
        let span = self.span_from(start);
        let kind = match keyword.kind {
            TokenKind::KwReturn => NodeKind::Return(value),
            TokenKind::KwBreak => NodeKind::Break(value),
            _ => NodeKind::Next(value),
        };
        Ok(self.alloc(kind, span))
    }

    /// `yield`, `yield(args)` or `yield args`.
    fn parse_yield(&mut self, ctx: ParseContext, mode: Mode) -> PResult<NodeId> {
        let start = self.bump().span.start;
        let args = if self.at(TokenKind::LParenCall) {
            self.parse_paren_args(ctx)?
        } else if self.at_any(COMMAND_ARG_START) {
            let args = self.parse_command_args(ctx)?;
            let span = self.span_from(start);
            return Ok(self.alloc(NodeKind::Yield { args: args.args }, span));
        } else {
            CallArgs::default()
        };
        if let Some(block) = args.block {
            let block_span = self.node_span(block);
            self.error_at(ErrorCode::E1001, "block argument should not be given", block_span);
        }
        let span = self.span_from(start);
        let node = self.alloc(NodeKind::Yield { args: args.args }, span);
        self.parse_postfix(ctx, node, start, mode)
    }

    /// `super`, `super(args)` or `super args`.
    fn parse_super(&mut self, ctx: ParseContext, mode: Mode) -> PResult<NodeId> {
        let start = self.bump().span.start;
        if self.at(TokenKind::LParenCall) {
            let args = self.parse_paren_args(ctx)?;
            let block = self.parse_opt_block(ctx, args.block)?;
            let span = self.span_from(start);
            let node = self.alloc(
                NodeKind::Super {
                    args: args.args,
                    block,
                },
                span,
            );
            return self.parse_postfix(ctx, node, start, mode);
        }
        if mode.contains(Mode::COMMAND) && self.at_any(COMMAND_ARG_START) {
            return self.parse_command(ctx, mode, Callee::Super, start);
        }
        let block = self.parse_opt_block(ctx, None)?;
        let span = self.span_from(start);
        let node = self.alloc(NodeKind::ZSuper { block }, span);
        self.parse_postfix(ctx, node, start, mode)
    }

    /// `not(expr)` used as a value.
    fn parse_not_call(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        let start = self.bump().span.start;
        if !matches!(
            self.peek_kind(),
            TokenKind::LParen | TokenKind::LParenCall | TokenKind::LParenArg
        ) {
            return Err(self.unexpected(TokenSet::single(TokenKind::LParen)));
        }
        self.bump();
        self.skip_newlines();
        let operand = if self.at(TokenKind::RParen) {
            let span = self.peek_span();
            self.alloc(NodeKind::Nil, span)
        } else {
            self.parse_expr(ctx.without(ParseContext::NO_BLOCK), Mode::COMMAND)?
        };
        self.skip_newlines();
        self.expect(TokenKind::RParen)?;
        let span = self.span_from(start);
        Ok(self.alloc(NodeKind::Not(operand), span))
    }

    /// `Params` with nothing in it, for `||` and `->()`.
    pub(crate) fn empty_params(&mut self) -> NodeId {
        let span = Span::point(self.cursor.prev_end());
        self.alloc(
            NodeKind::Params {
                required: Vec::new(),
                optional: Vec::new(),
                rest: None,
                post: Vec::new(),
                keywords: Vec::new(),
                kwrest: None,
                block: None,
                block_locals: Vec::new(),
            },
            span,
        )
    }
}

/// What a command call invokes.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Callee {
    Method {
        receiver: Option<NodeId>,
        name: Name,
        op: CallOp,
    },
    Super,
}

impl Callee {
    pub(crate) fn method(receiver: Option<NodeId>, name: Name, op: CallOp) -> Self {
        Callee::Method { receiver, name, op }
    }
}

const RPAREN: TokenSet = TokenSet::single(TokenKind::RParen);

const LAMBDA_BODY: TokenSet = TokenSet::new()
    .with(TokenKind::LambdaBeg)
    .with(TokenKind::KwDoLambda);
