//! Magic comments.
//!
//! A comment may configure the parse with `key: value` pairs, either as
//! the whole comment or inside an emacs-style `-*- k: v; k2: v2 -*-`
//! block. Keys compare case-insensitively and treat `-` as `_`.
//!
//! Where a key is honoured depends on the key:
//!
//! - `coding`/`encoding`: first line, or second line after a `#!` line.
//!   A vim-style `coding=name` is also accepted there.
//! - `frozen_string_literal`: any comment before the first token.
//! - `shareable_constant_value`: any comment-only line; it applies to the
//!   code that follows.
//! - `warn_indent`, `warn_past_scope`: anywhere.

use garnet_diagnostic::{Diagnostic, ErrorCode};
use garnet_ir::Span;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum SourceEncoding {
    #[default]
    Utf8,
    UsAscii,
    Binary,
}

impl SourceEncoding {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" | "utf-8-unix" | "utf-8-dos" | "utf-8-mac" => {
                Some(SourceEncoding::Utf8)
            }
            "us-ascii" | "ascii" | "ansi_x3.4-1968" | "646" => Some(SourceEncoding::UsAscii),
            "ascii-8bit" | "binary" => Some(SourceEncoding::Binary),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SourceEncoding::Utf8 => "UTF-8",
            SourceEncoding::UsAscii => "US-ASCII",
            SourceEncoding::Binary => "ASCII-8BIT",
        }
    }
}

/// How constant assignments are made shareable.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum ShareablePolicy {
    #[default]
    None,
    Literal,
    ExperimentalEverything,
    ExperimentalCopy,
}

impl ShareablePolicy {
    pub fn from_value(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "none" => Some(ShareablePolicy::None),
            "literal" => Some(ShareablePolicy::Literal),
            "experimental_everything" => Some(ShareablePolicy::ExperimentalEverything),
            "experimental_copy" => Some(ShareablePolicy::ExperimentalCopy),
            _ => None,
        }
    }
}

/// Settings collected from magic comments.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct MagicSettings {
    pub encoding: SourceEncoding,
    /// `None` until a comment sets it; the session default then applies.
    pub frozen_string_literal: Option<bool>,
    pub shareable_constant_value: ShareablePolicy,
    pub warn_indent: bool,
    pub warn_past_scope: bool,
}

/// Where the comment sits, which decides the keys it may set.
#[derive(Copy, Clone, Debug)]
pub struct CommentPosition {
    /// First line, or second line after a shebang.
    pub at_top: bool,
    /// Only whitespace precedes the `#` on its line.
    pub comment_only: bool,
    /// A token was already produced.
    pub token_seen: bool,
}

/// Split a comment body (text after `#`) into `key: value` pairs.
///
/// Returns `None` when the comment is not a magic comment.
pub fn parse_pairs(comment: &[u8]) -> Option<Vec<(String, String)>> {
    if comment.len() <= 7 {
        return None;
    }
    let (body, emacs) = match emacs_block(comment) {
        Some(inner) => (inner, true),
        None => (comment, false),
    };
    let mut pairs = Vec::new();
    let mut i = 0;
    let n = body.len();
    let is_sep = |b: u8| matches!(b, b'\'' | b'"' | b':' | b';');
    while i < n {
        while i < n && (is_sep(body[i]) || body[i].is_ascii_whitespace()) {
            i += 1;
        }
        let key_start = i;
        while i < n && !is_sep(body[i]) && !body[i].is_ascii_whitespace() {
            i += 1;
        }
        let key_end = i;
        while i < n && body[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= n {
            break;
        }
        if body[i] != b':' {
            if !emacs {
                return None;
            }
            continue;
        }
        i += 1;
        while i < n && body[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= n {
            break;
        }
        let value = if body[i] == b'"' {
            i += 1;
            let mut value = Vec::new();
            while i < n && body[i] != b'"' {
                if body[i] == b'\\' && i + 1 < n {
                    i += 1;
                }
                value.push(body[i]);
                i += 1;
            }
            i = (i + 1).min(n);
            value
        } else {
            let value_start = i;
            while i < n && body[i] != b'"' && body[i] != b';' && !body[i].is_ascii_whitespace() {
                i += 1;
            }
            body[value_start..i].to_vec()
        };
        if emacs {
            while i < n && (body[i] == b';' || body[i].is_ascii_whitespace()) {
                i += 1;
            }
        } else {
            while i < n && body[i].is_ascii_whitespace() {
                i += 1;
            }
            if i < n {
                return None;
            }
        }
        let key = String::from_utf8_lossy(&body[key_start..key_end])
            .to_ascii_lowercase()
            .replace('-', "_");
        pairs.push((key, String::from_utf8_lossy(&value).into_owned()));
        if !emacs {
            break;
        }
    }
    Some(pairs)
}

/// Text between the two `-*-` markers.
fn emacs_block(comment: &[u8]) -> Option<&[u8]> {
    let open = memchr::memmem::find(comment, b"-*-")?;
    let rest = &comment[open + 3..];
    let close = memchr::memmem::find(rest, b"-*-")?;
    Some(&rest[..close])
}

/// Vim-style `coding: name` or `coding=name` anywhere in the comment.
pub fn vim_encoding(comment: &[u8]) -> Option<String> {
    let mut from = 0;
    while let Some(found) = memchr::memmem::find(&comment[from..], b"coding") {
        let mut i = from + found + 6;
        from = i;
        if !matches!(comment.get(i), Some(b':' | b'=')) {
            continue;
        }
        i += 1;
        while comment.get(i).is_some_and(u8::is_ascii_whitespace) {
            i += 1;
        }
        let start = i;
        while comment
            .get(i)
            .is_some_and(|&b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            i += 1;
        }
        if i > start {
            return Some(String::from_utf8_lossy(&comment[start..i]).into_owned());
        }
    }
    None
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

impl MagicSettings {
    /// Apply one comment, returning the diagnostics it produces.
    pub fn apply_comment(
        &mut self,
        comment: &[u8],
        position: CommentPosition,
        span: Span,
    ) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let Some(pairs) = parse_pairs(comment) else {
            if position.at_top {
                if let Some(name) = vim_encoding(comment) {
                    self.set_encoding(&name, span, &mut diagnostics);
                }
            }
            return diagnostics;
        };
        for (key, value) in pairs {
            match key.as_str() {
                "coding" | "encoding" => {
                    if position.at_top {
                        self.set_encoding(&value, span, &mut diagnostics);
                    }
                }
                "frozen_string_literal" => {
                    if position.token_seen {
                        diagnostics.push(ignored(span, &key, "after any tokens"));
                    } else if let Some(flag) = parse_bool(&value) {
                        self.frozen_string_literal = Some(flag);
                    } else {
                        diagnostics.push(invalid_value(span, &key, &value));
                    }
                }
                "shareable_constant_value" => {
                    if !position.comment_only {
                        diagnostics.push(ignored(span, &key, "unless in comment-only line"));
                    } else if let Some(policy) = ShareablePolicy::from_value(&value) {
                        tracing::debug!(?policy, "shareable_constant_value changed");
                        self.shareable_constant_value = policy;
                    } else {
                        diagnostics.push(invalid_value(span, &key, &value));
                    }
                }
                "warn_indent" | "warn_past_scope" => match parse_bool(&value) {
                    Some(flag) if key == "warn_indent" => self.warn_indent = flag,
                    Some(flag) => self.warn_past_scope = flag,
                    None => diagnostics.push(invalid_value(span, &key, &value)),
                },
                _ => {}
            }
        }
        diagnostics
    }

    fn set_encoding(&mut self, name: &str, span: Span, diagnostics: &mut Vec<Diagnostic>) {
        match SourceEncoding::from_name(name) {
            Some(encoding) => self.encoding = encoding,
            None => diagnostics.push(
                Diagnostic::error(ErrorCode::E0013)
                    .with_message(format!("unknown encoding name: {name}"))
                    .with_label(span, ""),
            ),
        }
    }
}

fn invalid_value(span: Span, key: &str, value: &str) -> Diagnostic {
    Diagnostic::warning(ErrorCode::W0002)
        .with_message(format!("invalid value for {key}: {value}"))
        .with_label(span, "")
}

fn ignored(span: Span, key: &str, reason: &str) -> Diagnostic {
    Diagnostic::warning(ErrorCode::W0002)
        .with_message(format!("`{key}' is ignored {reason}"))
        .with_label(span, "")
}

#[cfg(test)]
mod tests;
