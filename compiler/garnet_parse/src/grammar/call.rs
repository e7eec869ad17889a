//! Method calls: postfix chains, argument lists, command calls and blocks.

use garnet_diagnostic::ErrorCode;
use garnet_ir::{CallOp, ConstScope, Name, NodeId, NodeKind, Span, Token, TokenKind};

use super::primary::Callee;
use super::{Mode, Prec};
use crate::recovery::{TokenSet, COMMAND_ARG_START, VALUE_START};
use crate::scope::{Forwarding, ScopeKind};
use crate::{PResult, ParseContext, ParseError, Parser};

/// Arguments of one call. `block` is the `&blk` argument, if any.
#[derive(Clone, Debug, Default)]
pub(crate) struct CallArgs {
    pub(crate) args: Vec<NodeId>,
    pub(crate) block: Option<NodeId>,
}

impl Parser<'_> {
    /// `.m`, `&.m`, `::m`, `::C` and `[i]` after a primary.
    pub(crate) fn parse_postfix(
        &mut self,
        ctx: ParseContext,
        mut node: NodeId,
        start: u32,
        mode: Mode,
    ) -> PResult<NodeId> {
        loop {
            match self.peek_kind() {
                TokenKind::Dot | TokenKind::AndDot => {
                    let op = if self.bump().kind == TokenKind::AndDot {
                        CallOp::SafeNav
                    } else {
                        CallOp::Dot
                    };
                    if self.at(TokenKind::LParenCall) || self.at(TokenKind::LParen) {
                        // `recv.()` is `recv.call()`.
                        let name = self.intern("call");
                        let args = self.parse_paren_args(ctx)?;
                        let block = self.parse_opt_block(ctx, args.block)?;
                        node = self.build_call(Some(node), name, args.args, block, op, start);
                        continue;
                    }
                    let token = self.bump();
                    let name = self.method_name(&token)?;
                    let (call, command) = self.parse_call_rest(ctx, Some(node), name, op, start, mode)?;
                    if command {
                        return Ok(call);
                    }
                    node = call;
                }
                TokenKind::Colon2 => {
                    self.bump();
                    let token = self.bump();
                    let name = self.method_name(&token)?;
                    let call_follows = self.at(TokenKind::LParenCall)
                        || (mode.contains(Mode::COMMAND) && self.at_any(COMMAND_ARG_START));
                    if token.kind == TokenKind::Const && !call_follows {
                        let span = self.span_from(start);
                        node = self.alloc(
                            NodeKind::Const {
                                scope: ConstScope::Scoped(node),
                                name,
                            },
                            span,
                        );
                        continue;
                    }
                    let (call, command) =
                        self.parse_call_rest(ctx, Some(node), name, CallOp::Colon2, start, mode)?;
                    if command {
                        return Ok(call);
                    }
                    node = call;
                }
                TokenKind::LBracketIndex => {
                    self.bump();
                    let inner = ctx.without(ParseContext::NO_BLOCK);
                    self.skip_newlines();
                    let args = if self.at(TokenKind::RBracket) {
                        CallArgs::default()
                    } else {
                        self.parse_call_args(inner, Some(TokenKind::RBracket))?
                    };
                    self.skip_newlines();
                    self.expect(TokenKind::RBracket)?;
                    let name = self.intern("[]");
                    node = self.build_call(Some(node), name, args.args, args.block, CallOp::Dot, start);
                }
                _ => return Ok(node),
            }
        }
    }

    /// Name of a method after `.`, `::` or `def`.
    pub(crate) fn method_name(&mut self, token: &Token) -> PResult<Name> {
        if let Some(name) = token.name() {
            return Ok(name);
        }
        match token.kind.operator_method_name() {
            Some(text) => Ok(self.intern(text)),
            None => Err(ParseError::unexpected(token, TokenSet::single(TokenKind::Ident))),
        }
    }

    /// Arguments and block after a method name. The flag is set when a
    /// command call was parsed, which ends the postfix chain.
    fn parse_call_rest(
        &mut self,
        ctx: ParseContext,
        receiver: Option<NodeId>,
        name: Name,
        op: CallOp,
        start: u32,
        mode: Mode,
    ) -> PResult<(NodeId, bool)> {
        if self.at(TokenKind::LParenCall) {
            let args = self.parse_paren_args(ctx)?;
            let block = self.parse_opt_block(ctx, args.block)?;
            return Ok((self.build_call(receiver, name, args.args, block, op, start), false));
        }
        if mode.contains(Mode::COMMAND) && self.at_any(COMMAND_ARG_START) {
            let call = self.parse_command(ctx, mode, Callee::method(receiver, name, op), start)?;
            return Ok((call, true));
        }
        let block = self.parse_opt_block(ctx, None)?;
        Ok((self.build_call(receiver, name, Vec::new(), block, op, start), false))
    }

    pub(crate) fn build_call(
        &mut self,
        receiver: Option<NodeId>,
        name: Name,
        args: Vec<NodeId>,
        block: Option<NodeId>,
        op: CallOp,
        start: u32,
    ) -> NodeId {
        let span = self.span_from(start);
        self.alloc(
            NodeKind::Call {
                receiver,
                name,
                args,
                block,
                op,
            },
            span,
        )
    }

    /// A call without parentheses: `puts x, y`, `obj.m x do ... end`.
    pub(crate) fn parse_command(
        &mut self,
        ctx: ParseContext,
        mode: Mode,
        callee: Callee,
        start: u32,
    ) -> PResult<NodeId> {
        let args = self.parse_command_args(ctx)?;
        let mut block = args.block;
        if self.at(TokenKind::LBraceArg) {
            let literal = self.parse_block(ctx)?;
            block = self.merge_block(block, Some(literal));
        }
        let mut do_block = false;
        if mode.contains(Mode::DO_BLOCK) && ctx.allows_block() && self.at(TokenKind::KwDoBlock) {
            let literal = self.parse_block(ctx)?;
            block = self.merge_block(block, Some(literal));
            do_block = true;
        }
        let span = self.span_from(start);
        let node = match callee {
            Callee::Method { receiver, name, op } => self.alloc(
                NodeKind::Call {
                    receiver,
                    name,
                    args: args.args,
                    block,
                    op,
                },
                span,
            ),
            Callee::Super => self.alloc(
                NodeKind::Super {
                    args: args.args,
                    block,
                },
                span,
            ),
        };
        if do_block {
            return self.parse_postfix(ctx, node, start, mode);
        }
        Ok(node)
    }

    /// Arguments of a command call, with the scanner's command-argument
    /// stack adjusted around them.
    ///
    /// The first argument token is already buffered when this runs, so a
    /// paren or bracket it opened has pushed its own entry; that entry is
    /// moved above ours. The same holds for a `{` after the arguments.
    pub(crate) fn parse_command_args(&mut self, ctx: ParseContext) -> PResult<CallArgs> {
        let opened = matches!(
            self.peek_kind(),
            TokenKind::LParen
                | TokenKind::LParenArg
                | TokenKind::LParenCall
                | TokenKind::LBracket
                | TokenKind::LBracketIndex
        );
        if opened {
            self.lexer_mut().cmdarg_pop();
        }
        self.lexer_mut().cmdarg_push(true);
        if opened {
            self.lexer_mut().cmdarg_push(false);
        }
        let args = self.parse_call_args(ctx, None);
        let brace = self.at(TokenKind::LBraceArg);
        if brace {
            self.lexer_mut().cmdarg_pop();
        }
        self.lexer_mut().cmdarg_pop();
        if brace {
            self.lexer_mut().cmdarg_push(false);
        }
        args
    }

    /// `(args)` of a call.
    pub(crate) fn parse_paren_args(&mut self, ctx: ParseContext) -> PResult<CallArgs> {
        self.bump();
        let inner = ctx.without(ParseContext::NO_BLOCK);
        self.skip_newlines();
        let args = if self.at(TokenKind::RParen) {
            CallArgs::default()
        } else {
            self.parse_call_args(inner, Some(TokenKind::RParen))?
        };
        self.skip_newlines();
        self.expect(TokenKind::RParen)?;
        Ok(args)
    }

    /// Comma-separated arguments. Trailing `key: value` and `k => v`
    /// pairs are collected into one brace-less hash.
    ///
    /// `closer` is the bracket that ends the list, `None` for a command.
    pub(crate) fn parse_call_args(
        &mut self,
        ctx: ParseContext,
        closer: Option<TokenKind>,
    ) -> PResult<CallArgs> {
        let mut out = CallArgs::default();
        let mut pairs = Vec::new();
        let mut pairs_start = 0;
        loop {
            if let Some(closer) = closer {
                self.skip_newlines();
                if self.at(closer) {
                    break;
                }
            }
            let start = self.peek_span().start;
            if pairs.is_empty() {
                pairs_start = start;
            }
            match self.peek_kind() {
                TokenKind::BlockAmper => {
                    self.bump();
                    let value = if self.at_any(VALUE_START) {
                        Some(self.parse_arg(ctx, Prec::Lowest, Mode::empty())?)
                    } else {
                        self.check_anonymous(Forwarding::BLOCK, self.span_from(start));
                        None
                    };
                    let span = self.span_from(start);
                    out.block = Some(self.alloc(NodeKind::BlockPass { value }, span));
                    break;
                }
                TokenKind::Splat => {
                    self.bump();
                    let value = if self.at_any(VALUE_START) {
                        Some(self.parse_arg(ctx, Prec::Lowest, Mode::empty())?)
                    } else {
                        self.check_anonymous(Forwarding::REST, self.span_from(start));
                        None
                    };
                    self.flush_pairs(&mut out.args, &mut pairs, pairs_start);
                    let span = self.span_from(start);
                    out.args.push(self.alloc(NodeKind::Splat { value }, span));
                }
                TokenKind::Label | TokenKind::DSplat => {
                    pairs.push(self.parse_hash_item(ctx)?);
                }
                TokenKind::BDot3 if closer == Some(TokenKind::RParen) => {
                    let dots = self.bump();
                    if self.at(TokenKind::RParen) {
                        if !self.scopes.forwarding().contains(Forwarding::ALL) {
                            self.error_at(ErrorCode::E1017, "unexpected ...", dots.span);
                        }
                        out.args.push(self.alloc(NodeKind::ForwardedArgs, dots.span));
                        break;
                    }
                    let high = self.parse_arg(ctx, Prec::OrOp, Mode::empty())?;
                    let span = self.span_from(start);
                    let range = self.alloc(
                        NodeKind::Range {
                            low: None,
                            high: Some(high),
                            exclusive: true,
                        },
                        span,
                    );
                    let value = self.parse_arg_rest(ctx, range, start, Prec::Lowest, Mode::empty())?;
                    self.push_arg_or_pair(ctx, &mut out.args, &mut pairs, pairs_start, value, start)?;
                }
                TokenKind::StringBeg => {
                    let (key, label) = self.parse_string_or_label(ctx)?;
                    if label {
                        let value = self.parse_arg(ctx, Prec::Lowest, Mode::empty())?;
                        let span = self.span_from(start);
                        pairs.push(self.alloc(NodeKind::Pair { key, value }, span));
                    } else {
                        let key = self.parse_postfix(ctx, key, start, Mode::empty())?;
                        let value = self.parse_arg_rest(ctx, key, start, Prec::Lowest, Mode::empty())?;
                        self.push_arg_or_pair(ctx, &mut out.args, &mut pairs, pairs_start, value, start)?;
                    }
                }
                _ => {
                    let first = out.args.is_empty() && pairs.is_empty();
                    let mode = if first && closer != Some(TokenKind::RBracket) {
                        Mode::COMMAND
                    } else {
                        Mode::empty()
                    };
                    let value = self.parse_arg(ctx, Prec::Lowest, mode)?;
                    self.push_arg_or_pair(ctx, &mut out.args, &mut pairs, pairs_start, value, start)?;
                }
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.flush_pairs(&mut out.args, &mut pairs, pairs_start);
        Ok(out)
    }

    /// A positional argument, or the key of `key => value`.
    fn push_arg_or_pair(
        &mut self,
        ctx: ParseContext,
        args: &mut Vec<NodeId>,
        pairs: &mut Vec<NodeId>,
        pairs_start: u32,
        value: NodeId,
        start: u32,
    ) -> PResult<()> {
        if self.eat(TokenKind::Assoc) {
            let pair_value = self.parse_arg(ctx, Prec::Lowest, Mode::empty())?;
            let span = self.span_from(start);
            pairs.push(self.alloc(
                NodeKind::Pair {
                    key: value,
                    value: pair_value,
                },
                span,
            ));
        } else {
            self.flush_pairs(args, pairs, pairs_start);
            args.push(value);
        }
        Ok(())
    }

    fn flush_pairs(&mut self, args: &mut Vec<NodeId>, pairs: &mut Vec<NodeId>, start: u32) {
        if pairs.is_empty() {
            return;
        }
        let pairs = std::mem::take(pairs);
        self.warn_duplicate_keys(&pairs);
        let span = match pairs.last() {
            Some(last) => Span::new(start, self.node_span(*last).end),
            None => self.span_from(start),
        };
        args.push(self.alloc(
            NodeKind::Hash {
                pairs,
                braces: false,
            },
            span,
        ));
    }

    /// Anonymous `*`, `**` or `&` argument: the enclosing method must
    /// declare the same anonymous parameter.
    pub(crate) fn check_anonymous(&mut self, flag: Forwarding, span: Span) {
        if self.scopes.forwarding().contains(flag) {
            return;
        }
        let message = if flag == Forwarding::BLOCK {
            "no anonymous block parameter"
        } else if flag == Forwarding::REST {
            "no anonymous rest parameter"
        } else {
            "no anonymous keyword rest parameter"
        };
        self.error_at(ErrorCode::E1017, message, span);
    }

    /// A `{ }` or `do end` block after a call, if one follows.
    pub(crate) fn parse_opt_block(
        &mut self,
        ctx: ParseContext,
        block_pass: Option<NodeId>,
    ) -> PResult<Option<NodeId>> {
        let literal = match self.peek_kind() {
            TokenKind::LBraceBlock => Some(self.parse_block(ctx)?),
            TokenKind::KwDo if ctx.allows_block() => Some(self.parse_block(ctx)?),
            _ => None,
        };
        Ok(self.merge_block(block_pass, literal))
    }

    fn merge_block(&mut self, block_pass: Option<NodeId>, literal: Option<NodeId>) -> Option<NodeId> {
        match (block_pass, literal) {
            (Some(_), Some(literal)) => {
                let span = self.node_span(literal);
                self.error_at(
                    ErrorCode::E1016,
                    "both block arg and actual block given",
                    span,
                );
                Some(literal)
            }
            (pass, literal) => literal.or(pass),
        }
    }

    /// `{ |params| body }` or `do |params| body end`.
    fn parse_block(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        let open = self.bump();
        let is_do = matches!(open.kind, TokenKind::KwDo | TokenKind::KwDoBlock);
        if is_do {
            self.lexer_mut().cmdarg_push(false);
        }
        let result = self.with_scope(ScopeKind::Block, |p| {
            p.nested(|p| p.parse_block_inner(ctx, open.span.start, is_do))
        });
        if is_do {
            self.lexer_mut().cmdarg_pop();
        }
        result
    }

    fn parse_block_inner(&mut self, ctx: ParseContext, start: u32, is_do: bool) -> PResult<NodeId> {
        let params = match self.peek_kind() {
            TokenKind::OrOp => {
                self.bump();
                self.scopes.set_explicit_params();
                Some(self.empty_params())
            }
            TokenKind::Pipe => {
                self.bump();
                let saved = self.lexer_mut().set_in_argdef(true);
                let params = if self.at(TokenKind::Pipe) {
                    Ok(self.empty_params())
                } else {
                    self.parse_param_list(
                        ctx,
                        super::params::ParamsKind::Block,
                        TokenSet::single(TokenKind::Pipe),
                    )
                };
                self.lexer_mut().set_in_argdef(saved);
                let params = params?;
                self.expect(TokenKind::Pipe)?;
                self.scopes.set_explicit_params();
                Some(params)
            }
            _ => None,
        };
        let inner = ctx.block_body();
        let body = if is_do {
            let body = self.parse_bodystmt(inner)?;
            self.expect(TokenKind::KwEnd)?;
            body
        } else {
            let body = self.parse_compstmt(inner);
            self.expect(TokenKind::RBrace)?;
            body
        };
        let numbered = self.scopes.numbered_arity();
        let span = self.span_from(start);
        Ok(self.alloc(
            NodeKind::Block {
                params,
                body,
                numbered,
            },
            span,
        ))
    }
}
