//! Shorthands for scanner tests.

use garnet_ir::{NumericValue, StringLookup, Token, TokenKind, TokenValue};

use crate::{tokenize, LexError, TokenStream};

#[track_caller]
pub fn scan(source: &str) -> TokenStream {
    match tokenize(source) {
        Ok(stream) => stream,
        Err(err) => panic!("unexpected lexical error in {source:?}: {err}"),
    }
}

/// Token kinds without the trailing `Eof`.
#[track_caller]
pub fn kinds(source: &str) -> Vec<TokenKind> {
    let stream = scan(source);
    stream
        .tokens
        .iter()
        .map(|t| t.kind)
        .filter(|k| *k != TokenKind::Eof)
        .collect()
}

#[track_caller]
pub fn lex_error(source: &str) -> LexError {
    match tokenize(source) {
        Ok(stream) => panic!("expected a lexical error in {source:?}, got {:?}", stream.tokens),
        Err(err) => err,
    }
}

/// Decoded text of every `StringContent` and `Char` token.
#[track_caller]
pub fn contents(source: &str) -> Vec<Vec<u8>> {
    scan(source)
        .tokens
        .into_iter()
        .filter_map(|t| match t.value {
            TokenValue::Str(bytes) => Some(bytes),
            _ => None,
        })
        .collect()
}

#[track_caller]
pub fn numbers(source: &str) -> Vec<NumericValue> {
    scan(source)
        .tokens
        .into_iter()
        .filter_map(|t| match t.value {
            TokenValue::Number(value) => Some(value),
            _ => None,
        })
        .collect()
}

/// Text of a name-carrying token.
pub fn name_text<'a>(stream: &'a TokenStream, token: &Token) -> &'a str {
    token.name().map_or("", |name| stream.interner.lookup(name))
}
