//! Delimited literals: strings, heredocs, symbols, regexps, backticks and
//! word lists, with their interpolations.

use garnet_ir::{NodeId, NodeKind, RegexOptions, Span, Token, TokenKind, TokenValue};

use crate::builder::{dedent_fragments, Fragment, LiteralKind};
use crate::recovery::TokenSet;
use crate::{PResult, ParseContext, ParseError, Parser};

/// Tokens that close a literal body.
const LITERAL_END: TokenSet = TokenSet::new()
    .with(TokenKind::StringEnd)
    .with(TokenKind::LabelEnd)
    .with(TokenKind::RegexpEnd);

impl Parser<'_> {
    /// One string literal, or several adjacent ones concatenated.
    pub(crate) fn parse_strings(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        let (node, label) = self.parse_string_or_label(ctx)?;
        if label {
            let span = self.node_span(node);
            return Err(ParseError::syntax("syntax error, unexpected label", span));
        }
        Ok(node)
    }

    /// Like [`parse_strings`](Self::parse_strings), but a literal closed by
    /// `":` is a symbol key; the flag reports that.
    pub(crate) fn parse_string_or_label(&mut self, ctx: ParseContext) -> PResult<(NodeId, bool)> {
        let start = self.peek_span().start;
        let mut fragments = Vec::new();
        let mut label = false;
        loop {
            let open = self.bump();
            let (mut groups, close) = self.parse_literal_parts(ctx)?;
            self.finish_heredoc(&open, &close, &mut groups);
            fragments.extend(groups.into_iter().flatten());
            if close.kind == TokenKind::LabelEnd {
                label = true;
                break;
            }
            if !self.at(TokenKind::StringBeg) {
                break;
            }
        }
        let span = self.span_from(start);
        let kind = if label {
            LiteralKind::Sym
        } else {
            LiteralKind::Str
        };
        Ok((self.build_literal(kind, fragments, span), label))
    }

    /// Backticks, regexps, dynamic symbols and word lists.
    pub(crate) fn parse_literal(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        let open = self.bump();
        let start = open.span.start;
        let (mut groups, close) = self.parse_literal_parts(ctx)?;
        self.finish_heredoc(&open, &close, &mut groups);
        let span = self.span_from(start);
        let node = match open.kind {
            TokenKind::WordsBeg | TokenKind::QWordsBeg => {
                self.word_list(groups, LiteralKind::Str, span)
            }
            TokenKind::SymbolsBeg | TokenKind::QSymbolsBeg => {
                self.word_list(groups, LiteralKind::Sym, span)
            }
            kind => {
                let literal = match kind {
                    TokenKind::XStringBeg => LiteralKind::XStr,
                    TokenKind::RegexpBeg => match close.value {
                        TokenValue::RegexpEnd(options) => LiteralKind::Regex(options),
                        _ => LiteralKind::Regex(RegexOptions::empty()),
                    },
                    _ => LiteralKind::Sym,
                };
                let fragments = groups.into_iter().flatten().collect();
                self.build_literal(literal, fragments, span)
            }
        };
        Ok(node)
    }

    /// `%w[a b]`: one element per group, empty groups dropped.
    fn word_list(
        &mut self,
        groups: Vec<Vec<Fragment>>,
        kind: LiteralKind,
        span: Span,
    ) -> NodeId {
        let mut elements = Vec::new();
        for group in groups {
            let Some(word_span) = group_span(self, &group) else {
                continue;
            };
            elements.push(self.build_literal(kind, group, word_span));
        }
        self.alloc(NodeKind::Array { elements }, span)
    }

    /// Body of a literal up to its closing token, split at word
    /// separators. Literals other than word lists yield one group.
    fn parse_literal_parts(&mut self, ctx: ParseContext) -> PResult<(Vec<Vec<Fragment>>, Token)> {
        let mut groups = vec![Vec::new()];
        loop {
            let kind = self.peek_kind();
            let fragment = match kind {
                TokenKind::StringContent => {
                    let token = self.bump();
                    let TokenValue::Str(bytes) = token.value else {
                        continue;
                    };
                    Fragment::Str(bytes, token.span)
                }
                TokenKind::StringDBeg => Fragment::Node(self.parse_interpolation(ctx)?),
                TokenKind::StringDVar => Fragment::Node(self.parse_dvar()?),
                TokenKind::WordSep => {
                    self.bump();
                    if groups.last().is_some_and(|group| !group.is_empty()) {
                        groups.push(Vec::new());
                    }
                    continue;
                }
                _ if LITERAL_END.contains(kind) => return Ok((groups, self.bump())),
                _ => return Err(self.unexpected(TokenSet::single(TokenKind::StringEnd))),
            };
            if let Some(group) = groups.last_mut() {
                group.push(fragment);
            }
        }
    }

    /// `#{ stmts }`. A broken body is skipped up to the closing brace so
    /// the scanner returns to the literal in step.
    fn parse_interpolation(&mut self, ctx: ParseContext) -> PResult<NodeId> {
        let open = self.bump();
        if !self.cursor.suspend_literal() {
            return Err(ParseError::syntax("interpolation nested too deeply", open.span));
        }
        let body = self.parse_compstmt(ctx);
        while !self.at(TokenKind::StringDEnd) {
            if self.at(TokenKind::Eof) {
                return Err(self.unexpected(TokenSet::single(TokenKind::StringDEnd)));
            }
            let err = self.unexpected(TokenSet::single(TokenKind::StringDEnd));
            self.report(err);
            self.synchronize();
            if !self.at(TokenKind::StringDEnd) && !self.at(TokenKind::Eof) {
                self.bump();
            }
        }
        self.bump();
        self.cursor.resume_literal();
        let span = self.span_from(open.span.start);
        Ok(self.alloc(NodeKind::EvStr { body }, span))
    }

    /// `#@ivar`, `#@@cvar` or `#$gvar`.
    fn parse_dvar(&mut self) -> PResult<NodeId> {
        let open = self.bump();
        if !self.cursor.suspend_literal() {
            return Err(ParseError::syntax("interpolation nested too deeply", open.span));
        }
        let var = self.bump();
        self.cursor.resume_literal();
        let node = match var.kind {
            TokenKind::IVar => NodeKind::IVar(self.token_name(&var)?),
            TokenKind::CVar => NodeKind::CVar(self.token_name(&var)?),
            TokenKind::GVar => NodeKind::GVar(self.token_name(&var)?),
            TokenKind::NthRef | TokenKind::BackRef => {
                let node = self.special_var(&var)?;
                let span = self.span_from(open.span.start);
                return Ok(self.alloc(NodeKind::EvStr { body: Some(node) }, span));
            }
            _ => return Err(ParseError::unexpected(&var, TokenSet::single(TokenKind::IVar))),
        };
        let body = self.alloc(node, var.span);
        let span = self.span_from(open.span.start);
        Ok(self.alloc(NodeKind::EvStr { body: Some(body) }, span))
    }

    /// A heredoc body ends on a later line: spans go back to the opener,
    /// and `<<~` bodies lose their common indentation.
    fn finish_heredoc(&mut self, open: &Token, close: &Token, groups: &mut [Vec<Fragment>]) {
        let opener = self
            .cursor
            .lexer()
            .source()
            .get(open.span.start as usize..);
        if !opener.is_some_and(|text| text.starts_with(b"<<")) {
            return;
        }
        if let TokenValue::Dedent(width) = close.value {
            for group in groups.iter_mut() {
                dedent_fragments(group, width);
            }
        }
        self.cursor.set_prev_end(open.span.end);
    }
}

/// Span covering a word's fragments; `None` for an empty word.
fn group_span(parser: &Parser<'_>, group: &[Fragment]) -> Option<Span> {
    let span_of = |fragment: &Fragment| match fragment {
        Fragment::Str(_, span) => *span,
        Fragment::Node(id) => parser.node_span(*id),
    };
    let first = span_of(group.first()?);
    let last = span_of(group.last()?);
    Some(first.merge(last))
}
