//! Patterns of `case`/`in`, `expr => pat` and `expr in pat`.

use garnet_diagnostic::ErrorCode;
use garnet_ir::{ConstScope, Name, NodeId, NodeKind, Span, TokenKind};
use garnet_lexer::LexState;
use rustc_hash::FxHashSet;

use super::Mode;
use crate::recovery::{TokenSet, TERMS, VALUE_START};
use crate::scope::{Resolution, VarRole};
use crate::{PResult, ParseContext, ParseError, Parser};

/// Tokens after which a top-level pattern list has ended.
const PATTERN_END: TokenSet = TERMS
    .with(TokenKind::KwThen)
    .with(TokenKind::KwIfMod)
    .with(TokenKind::KwUnlessMod)
    .with(TokenKind::KwAnd)
    .with(TokenKind::KwOr)
    .with(TokenKind::RParen)
    .with(TokenKind::Eof);

const HASH_PATTERN_START: TokenSet = TokenSet::new()
    .with(TokenKind::Label)
    .with(TokenKind::DSplat)
    .with(TokenKind::Pow);

/// Items of an array pattern before the node is built.
struct PatternItems {
    items: Vec<NodeId>,
    comma: bool,
}

/// Pairs and rest of a hash pattern before the node is built.
struct HashItems {
    pairs: Vec<NodeId>,
    rest: Option<NodeId>,
}

/// A string literal opening a list where a hash pattern may start.
#[derive(Copy, Clone)]
enum ListHead {
    /// `"key":`, the symbol node of the first key.
    Key(NodeId),
    /// Any other string: the first item of an array list.
    Item(NodeId),
}

impl Parser<'_> {
    /// Prepare the scanner for a pattern and forget the bindings of the
    /// previous one. Returns the `in_kwarg` value to restore.
    pub(crate) fn begin_pattern(&mut self) -> bool {
        self.set_lex_state(LexState::BEG | LexState::LABEL);
        self.lexer_mut().set_command_start(false);
        self.pattern_vars.clear();
        self.lexer_mut().set_in_kwarg(true)
    }

    /// A pattern as written after `in`: brackets and braces may be left
    /// off at this level.
    pub(crate) fn parse_pattern_top(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        let start = self.peek_span().start;
        let head = self.parse_list_head(ctx)?;
        let first_key = match head {
            Some(ListHead::Key(key)) => Some(key),
            _ => None,
        };
        if first_key.is_some() || (head.is_none() && self.at_any(HASH_PATTERN_START)) {
            let hash = self.parse_hash_items(ctx, None, first_key)?;
            let span = self.span_from(start);
            return Ok(self.alloc(
                NodeKind::HashPattern {
                    constant: None,
                    pairs: hash.pairs,
                    rest: hash.rest,
                },
                span,
            ));
        }
        let first_item = match head {
            Some(ListHead::Item(item)) => Some(item),
            _ => None,
        };
        let list = self.parse_array_items(ctx, None, first_item)?;
        let single = match list.items.as_slice() {
            [only] if !list.comma && !matches!(self.node(*only), NodeKind::MatchRest(_)) => Some(*only),
            _ => None,
        };
        match single {
            Some(only) => Ok(only),
            None => Ok(self.build_array_pattern(None, list.items, start)),
        }
    }

    /// `pat | pat ... => name`
    fn parse_pattern(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        self.nested(|p| {
            let start = p.peek_span().start;
            let left = p.parse_pattern_primary(ctx)?;
            p.finish_pattern(start, left, ctx)
        })
    }

    /// Alternatives and `=> name` after the first primary.
    fn finish_pattern(&mut self, start: u32, mut left: NodeId, ctx: ParseContext) -> PResult<NodeId> {
        while self.eat(TokenKind::Pipe) {
            let right = self.parse_pattern_primary(ctx)?;
            let span = self.span_from(start);
            left = self.alloc(NodeKind::MatchAlt { left, right }, span);
        }
        if self.eat(TokenKind::Assoc) {
            let token = self.bump();
            if !matches!(token.kind, TokenKind::Ident | TokenKind::LocalIdent) {
                return Err(ParseError::unexpected(&token, TokenSet::single(TokenKind::Ident)));
            }
            let name = self.token_name(&token)?;
            self.bind_pattern_var(name, token.span);
            let span = self.span_from(start);
            left = self.alloc(NodeKind::MatchAs { pattern: left, name }, span);
        }
        Ok(left)
    }

    /// Whether a leading string is a `"key":` label is only known once
    /// it is closed, so it is read before choosing the list kind.
    fn parse_list_head(&mut self, ctx: ParseContext) -> PResult<Option<ListHead>> {
        if !self.at(TokenKind::StringBeg) {
            return Ok(None);
        }
        let start = self.peek_span().start;
        let (string, label) = self.parse_string_or_label(ctx)?;
        if label {
            return Ok(Some(ListHead::Key(string)));
        }
        let value = self.parse_pattern_range(ctx, string, start)?;
        let item = self.finish_pattern(start, value, ctx)?;
        Ok(Some(ListHead::Item(item)))
    }

    fn parse_pattern_primary(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        let start = self.peek_span().start;
        match self.peek_kind() {
            TokenKind::Ident | TokenKind::LocalIdent => {
                let token = self.bump();
                let name = self.token_name(&token)?;
                self.bind_pattern_var(name, token.span);
                Ok(self.alloc(NodeKind::MatchVar(name), token.span))
            }
            TokenKind::Caret => self.parse_pin(ctx),
            TokenKind::Const | TokenKind::Colon3 => {
                let constant = self.parse_pattern_const()?;
                let closer = match self.peek_kind() {
                    TokenKind::LParenCall => TokenKind::RParen,
                    TokenKind::LBracketIndex => TokenKind::RBracket,
                    _ => return self.parse_pattern_range(ctx, constant, start),
                };
                self.bump();
                self.parse_bracketed_pattern(ctx, Some(constant), closer, start)
            }
            TokenKind::LBracket => {
                self.bump();
                self.parse_bracketed_pattern(ctx, None, TokenKind::RBracket, start)
            }
            TokenKind::LBrace => {
                self.bump();
                let saved = self.lexer_mut().set_in_kwarg(false);
                let hash = self.parse_hash_items(ctx, Some(TokenKind::RBrace), None);
                self.lexer_mut().set_in_kwarg(saved);
                let hash = hash?;
                self.skip_newlines();
                self.expect(TokenKind::RBrace)?;
                let span = self.span_from(start);
                Ok(self.alloc(
                    NodeKind::HashPattern {
                        constant: None,
                        pairs: hash.pairs,
                        rest: hash.rest,
                    },
                    span,
                ))
            }
            TokenKind::LParen | TokenKind::LParenArg => {
                self.bump();
                let pattern = self.parse_pattern(ctx)?;
                self.skip_newlines();
                self.expect(TokenKind::RParen)?;
                Ok(pattern)
            }
            TokenKind::BDot2 | TokenKind::BDot3 => {
                let dots = self.bump();
                let high = self.parse_unary(ctx, Mode::empty())?;
                let span = self.span_from(start);
                Ok(self.alloc(
                    NodeKind::Range {
                        low: None,
                        high: Some(high),
                        exclusive: dots.kind == TokenKind::BDot3,
                    },
                    span,
                ))
            }
            kind if VALUE_START.contains(kind)
                || matches!(kind, TokenKind::UMinusNum | TokenKind::Arrow) =>
            {
                let value = self.parse_unary(ctx, Mode::empty())?;
                self.parse_pattern_range(ctx, value, start)
            }
            _ => Err(self.unexpected(VALUE_START)),
        }
    }

    /// `low..high`, `low..` or just `low`.
    fn parse_pattern_range(
        &mut self,
        ctx: ParseContext,
        low: NodeId,
        start: u32,
    ) -> PResult<NodeId> {
        let exclusive = match self.peek_kind() {
            TokenKind::Dot2 => false,
            TokenKind::Dot3 => true,
            _ => return Ok(low),
        };
        self.bump();
        let high = if self.at_any(VALUE_START) || self.at(TokenKind::UMinusNum) {
            Some(self.parse_unary(ctx, Mode::empty())?)
        } else {
            None
        };
        let span = self.span_from(start);
        Ok(self.alloc(
            NodeKind::Range {
                low: Some(low),
                high,
                exclusive,
            },
            span,
        ))
    }

    /// `[...]`, `Const(...)` or `Const[...]`, opener consumed.
    fn parse_bracketed_pattern(
        &mut self,
        ctx: ParseContext,
        constant: Option<NodeId>,
        closer: TokenKind,
        start: u32,
    ) -> PResult<NodeId> {
        self.skip_newlines();
        let head = if closer == TokenKind::RParen {
            self.parse_list_head(ctx)?
        } else {
            None
        };
        let first_key = match head {
            Some(ListHead::Key(key)) => Some(key),
            _ => None,
        };
        let hash_start = closer == TokenKind::RParen && self.at_any(HASH_PATTERN_START);
        if first_key.is_some() || (head.is_none() && hash_start) {
            let hash = self.parse_hash_items(ctx, Some(closer), first_key)?;
            self.skip_newlines();
            self.expect(closer)?;
            let span = self.span_from(start);
            return Ok(self.alloc(
                NodeKind::HashPattern {
                    constant,
                    pairs: hash.pairs,
                    rest: hash.rest,
                },
                span,
            ));
        }
        let first_item = match head {
            Some(ListHead::Item(item)) => Some(item),
            _ => None,
        };
        let list = self.parse_array_items(ctx, Some(closer), first_item)?;
        self.skip_newlines();
        self.expect(closer)?;
        Ok(self.build_array_pattern(constant, list.items, start))
    }

    /// Comma-separated patterns and rests. Without a closer the list ends
    /// at the first token that cannot continue it; a trailing comma there
    /// stands for an anonymous rest.
    fn parse_array_items(
        &mut self,
        ctx: ParseContext,
        closer: Option<TokenKind>,
        mut first: Option<NodeId>,
    ) -> PResult<PatternItems> {
        let mut items = Vec::new();
        let mut comma = false;
        loop {
            let item = match first.take() {
                Some(item) => item,
                None => {
                    if let Some(closer) = closer {
                        self.skip_newlines();
                        if self.at(closer) {
                            break;
                        }
                    }
                    if self.at(TokenKind::Splat) || self.at(TokenKind::Star) {
                        self.parse_pattern_rest()?
                    } else {
                        self.parse_pattern(ctx)?
                    }
                }
            };
            items.push(item);
            if !self.eat(TokenKind::Comma) {
                break;
            }
            comma = true;
            let trailing = match closer {
                Some(closer) => {
                    self.skip_newlines();
                    self.at(closer)
                }
                None => self.at_any(PATTERN_END),
            };
            if trailing {
                let span = Span::point(self.cursor.prev_end());
                items.push(self.alloc(NodeKind::MatchRest(None), span));
                break;
            }
        }
        Ok(PatternItems { items, comma })
    }

    /// `*name` or `*`.
    fn parse_pattern_rest(&mut self) -> PResult<NodeId> {
        let start = self.bump().span.start;
        let name = if self.at(TokenKind::Ident) || self.at(TokenKind::LocalIdent) {
            let token = self.bump();
            let name = self.token_name(&token)?;
            self.bind_pattern_var(name, token.span);
            Some(name)
        } else {
            None
        };
        let span = self.span_from(start);
        Ok(self.alloc(NodeKind::MatchRest(name), span))
    }

    /// An array pattern, or a find pattern when the items are framed by
    /// two rests.
    fn build_array_pattern(
        &mut self,
        constant: Option<NodeId>,
        items: Vec<NodeId>,
        start: u32,
    ) -> NodeId {
        let span = self.span_from(start);
        let rests: Vec<usize> = items
            .iter()
            .enumerate()
            .filter(|(_, item)| matches!(self.node(**item), NodeKind::MatchRest(_)))
            .map(|(index, _)| index)
            .collect();
        if let ([0, last], [pre_rest, elements @ .., post_rest]) = (rests.as_slice(), items.as_slice()) {
            if *last == items.len() - 1 && !elements.is_empty() {
                let kind = NodeKind::FindPattern {
                    constant,
                    pre_rest: *pre_rest,
                    elements: elements.to_vec(),
                    post_rest: *post_rest,
                };
                return self.alloc(kind, span);
            }
        }
        if let Some(&extra) = rests.get(1).and_then(|&index| items.get(index)) {
            let rest_span = self.node_span(extra);
            self.error_at(ErrorCode::E1001, "syntax error, unexpected *", rest_span);
        }
        self.alloc(
            NodeKind::ArrayPattern {
                constant,
                elements: items,
            },
            span,
        )
    }

    /// `key: pat`, `"key": pat`, `key:` and `**rest` entries. A quoted
    /// first key already read by [`parse_list_head`](Self::parse_list_head)
    /// comes in as `first_key`.
    fn parse_hash_items(
        &mut self,
        ctx: ParseContext,
        closer: Option<TokenKind>,
        mut first_key: Option<NodeId>,
    ) -> PResult<HashItems> {
        let mut pairs = Vec::new();
        let mut rest = None;
        let mut keys: FxHashSet<Name> = FxHashSet::default();
        loop {
            let leading = first_key.take();
            if leading.is_none() {
                if let Some(closer) = closer {
                    self.skip_newlines();
                    if self.at(closer) {
                        break;
                    }
                }
                if rest.is_some() {
                    return Err(self.unexpected(closer.map_or(TERMS, TokenSet::single)));
                }
            }
            let quoted = match leading {
                Some(key) => Some(key),
                None if self.at(TokenKind::StringBeg) => {
                    let (string, label) = self.parse_string_or_label(ctx)?;
                    if !label {
                        let span = self.node_span(string);
                        return Err(ParseError::syntax(
                            "syntax error, unexpected string literal, expecting label",
                            span,
                        ));
                    }
                    Some(string)
                }
                None => None,
            };
            if let Some(string) = quoted {
                let key_span = self.node_span(string);
                let NodeKind::Sym(key) = *self.node(string) else {
                    return Err(ParseError::syntax(
                        "symbol literal with interpolation is not allowed",
                        key_span,
                    ));
                };
                pairs.push(self.parse_pattern_pair(ctx, key, key_span, &mut keys)?);
            } else {
                let start = self.peek_span().start;
                match self.peek_kind() {
                    TokenKind::Label => {
                        let token = self.bump();
                        let key = self.token_name(&token)?;
                        let key_span =
                            Span::new(token.span.start, token.span.end.saturating_sub(1));
                        pairs.push(self.parse_pattern_pair(ctx, key, key_span, &mut keys)?);
                    }
                    TokenKind::DSplat | TokenKind::Pow => {
                        self.bump();
                        let kind = if self.eat(TokenKind::KwNil) {
                            NodeKind::MatchNilRest
                        } else if self.at(TokenKind::Ident) || self.at(TokenKind::LocalIdent) {
                            let token = self.bump();
                            let name = self.token_name(&token)?;
                            self.bind_pattern_var(name, token.span);
                            NodeKind::MatchRest(Some(name))
                        } else {
                            NodeKind::MatchRest(None)
                        };
                        let span = self.span_from(start);
                        rest = Some(self.alloc(kind, span));
                    }
                    _ => return Err(self.unexpected(HASH_PATTERN_START)),
                }
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
            if closer.is_none() && self.at_any(PATTERN_END) {
                break;
            }
        }
        Ok(HashItems { pairs, rest })
    }

    /// The value after a key, or the binding a bare key makes.
    fn parse_pattern_pair(
        &mut self,
        ctx: ParseContext,
        key: Name,
        key_span: Span,
        keys: &mut FxHashSet<Name>,
    ) -> PResult<NodeId> {
        if !keys.insert(key) {
            self.error_at(ErrorCode::E1011, "duplicated key name", key_span);
        }
        let value = if self.at_any(VALUE_START) || self.at_any(PATTERN_VALUE_START) {
            Some(self.parse_pattern(ctx)?)
        } else {
            self.bind_key(key, key_span);
            None
        };
        let span = self.span_from(key_span.start);
        Ok(self.alloc(NodeKind::PatternPair { key, value }, span))
    }

    /// `key:` alone binds a local of the same name.
    fn bind_key(&mut self, key: Name, span: Span) {
        let valid = self
            .text(key)
            .chars()
            .next()
            .is_some_and(|c| c == '_' || c.is_lowercase() || !c.is_ascii());
        if !valid {
            self.error_at(ErrorCode::E1001, "key must be valid as local variables", span);
            return;
        }
        self.bind_pattern_var(key, span);
    }

    /// `^name`, `^@ivar` or `^(expr)`.
    fn parse_pin(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        let start = self.bump().span.start;
        let token = self.bump();
        let pinned = match token.kind {
            TokenKind::Ident | TokenKind::LocalIdent => {
                let name = self.token_name(&token)?;
                if self.scopes.resolve(name) == Resolution::Unresolved {
                    let message = format!("{}: no such local variable", self.text(name));
                    self.error_at(ErrorCode::E1019, message, token.span);
                } else {
                    self.scopes.mark_used(name);
                }
                self.alloc(NodeKind::LocalVar(name), token.span)
            }
            TokenKind::IVar => {
                let name = self.token_name(&token)?;
                self.alloc(NodeKind::IVar(name), token.span)
            }
            TokenKind::CVar => {
                let name = self.token_name(&token)?;
                self.alloc(NodeKind::CVar(name), token.span)
            }
            TokenKind::GVar => {
                let name = self.token_name(&token)?;
                self.alloc(NodeKind::GVar(name), token.span)
            }
            TokenKind::LParen | TokenKind::LParenArg | TokenKind::LParenCall => {
                let expr = self.parse_expr_value(ctx)?;
                self.skip_newlines();
                self.expect(TokenKind::RParen)?;
                expr
            }
            _ => {
                return Err(ParseError::unexpected(
                    &token,
                    TokenSet::single(TokenKind::LocalIdent),
                ))
            }
        };
        let span = self.span_from(start);
        Ok(self.alloc(NodeKind::Pin(pinned), span))
    }

    /// `Const`, `::Const` or `A::B` inside a pattern.
    fn parse_pattern_const(&mut self) -> PResult<NodeId> {
        let start = self.peek_span().start;
        let scope = if self.eat(TokenKind::Colon3) {
            ConstScope::TopLevel
        } else {
            ConstScope::Lexical
        };
        let token = self.expect(TokenKind::Const)?;
        let name = self.token_name(&token)?;
        let span = self.span_from(start);
        let mut node = self.alloc(NodeKind::Const { scope, name }, span);
        while self.eat(TokenKind::Colon2) {
            let token = self.expect(TokenKind::Const)?;
            let name = self.token_name(&token)?;
            let span = self.span_from(start);
            node = self.alloc(
                NodeKind::Const {
                    scope: ConstScope::Scoped(node),
                    name,
                },
                span,
            );
        }
        Ok(node)
    }

    /// Declare a variable bound by the pattern. Names starting with `_`
    /// may repeat.
    fn bind_pattern_var(&mut self, name: Name, span: Span) {
        let repeatable = self.text(name).starts_with('_');
        if !self.pattern_vars.insert(name) && !repeatable {
            self.error_at(ErrorCode::E1010, "duplicated variable name", span);
        }
        self.declare_var(name, VarRole::Local, span);
    }
}

/// Tokens besides values that start the pattern after a `key:`.
const PATTERN_VALUE_START: TokenSet = TokenSet::new()
    .with(TokenKind::Caret)
    .with(TokenKind::Colon3)
    .with(TokenKind::LBracket)
    .with(TokenKind::LBrace)
    .with(TokenKind::LParen)
    .with(TokenKind::LParenArg)
    .with(TokenKind::BDot2)
    .with(TokenKind::BDot3)
    .with(TokenKind::UMinusNum)
    .with(TokenKind::Arrow);
