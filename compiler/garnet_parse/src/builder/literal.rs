//! Folding literal bodies into nodes.
//!
//! The grammar collects a literal's body as [`Fragment`]s: byte runs and
//! interpolated expressions. Adjacent byte runs are merged, `<<~` bodies
//! are dedented, and the result becomes a static node (`Str`, `Sym`,
//! `Regex`, `XStr`) or an interpolated one (`DStr`, `DSym`, `DRegex`,
//! `DXStr`).

use garnet_diagnostic::ErrorCode;
use garnet_ir::{NodeId, NodeKind, RegexOptions, Span};
use garnet_lexer::{dedent_width, SourceEncoding};

use crate::Parser;

/// One piece of a literal body.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Fragment {
    /// Literal bytes.
    Str(Vec<u8>, Span),
    /// An interpolation (`EvStr` node).
    Node(NodeId),
}

/// Merge adjacent byte fragments and drop empty ones.
///
/// Concatenation is associative: folding a list in pieces and then
/// folding the results gives the same list as folding it whole.
pub fn literal_concat(fragments: Vec<Fragment>) -> Vec<Fragment> {
    let mut out: Vec<Fragment> = Vec::with_capacity(fragments.len());
    for fragment in fragments {
        if let Fragment::Str(bytes, span) = &fragment {
            if bytes.is_empty() {
                continue;
            }
            if let Some(Fragment::Str(acc, acc_span)) = out.last_mut() {
                acc.extend_from_slice(bytes);
                *acc_span = acc_span.merge(*span);
                continue;
            }
        }
        out.push(fragment);
    }
    out
}

/// Names of the named groups in a regexp source, in order of first
/// appearance. Only names that are valid local variables are returned.
pub fn named_captures(source: &[u8]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut in_class = false;
    let mut i = 0;
    while i < source.len() {
        match source[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'[' => in_class = true,
            b']' => in_class = false,
            b'(' if !in_class => {
                let close = match source.get(i + 1..i + 3) {
                    Some(b"?<") => Some(b'>'),
                    Some(b"?'") => Some(b'\''),
                    _ => None,
                };
                if let Some(close) = close {
                    let rest = source.get(i + 3..).unwrap_or_default();
                    if let Some(len) = rest.iter().position(|&b| b == close) {
                        let name = &rest[..len];
                        if is_local_name(name) {
                            let name = String::from_utf8_lossy(name).into_owned();
                            if !names.contains(&name) {
                                names.push(name);
                            }
                        }
                    }
                }
            }
            _ => {}
        }
        i += 1;
    }
    names
}

/// Why one byte run of a regexp body does not fit the encoding its
/// options and the source select, if it does not.
///
/// A fixed option (`u`, `e`, `s` or `n`) only accepts non-ASCII bytes
/// written in the same encoding. When the regexp is compiled as UTF-8,
/// escaped bytes above 0x7f must also spell whole characters.
pub(crate) fn regexp_fragment_error(
    body: &[u8],
    options: RegexOptions,
    source: SourceEncoding,
) -> Option<String> {
    let fixed = [
        (RegexOptions::FIXED_UTF8, 'u'),
        (RegexOptions::FIXED_EUC, 'e'),
        (RegexOptions::FIXED_SJIS, 's'),
        (RegexOptions::NO_ENCODING, 'n'),
    ]
    .into_iter()
    .find(|(flag, _)| options.contains(*flag))
    .map(|(_, letter)| letter);
    if let Some(letter) = fixed {
        let same = match letter {
            'u' => source == SourceEncoding::Utf8,
            'n' => source == SourceEncoding::Binary,
            _ => false,
        };
        if !same && !body.is_ascii() {
            return Some(format!(
                "regexp encoding option '{letter}' differs from source encoding '{}'",
                source.name()
            ));
        }
    }
    let utf8 = fixed.map_or(source == SourceEncoding::Utf8, |letter| letter == 'u');
    if utf8 && !escapes_are_utf8(body) {
        return Some(format!(
            "invalid multibyte escape: /{}/",
            String::from_utf8_lossy(body)
        ));
    }
    None
}

/// Consecutive hex and octal escapes above 0x7f form valid UTF-8.
fn escapes_are_utf8(body: &[u8]) -> bool {
    let mut run = Vec::new();
    let mut i = 0;
    while i < body.len() {
        if body[i] == b'\\' {
            let (byte, len) = escaped_byte(&body[i + 1..]);
            i += 1 + len;
            if let Some(byte) = byte.filter(|b| !b.is_ascii()) {
                run.push(byte);
                continue;
            }
        } else {
            i += 1;
        }
        if std::str::from_utf8(&run).is_err() {
            return false;
        }
        run.clear();
    }
    std::str::from_utf8(&run).is_ok()
}

/// Value and length of the escape after a backslash. Only `\xHH` and
/// octal escapes have a byte value.
fn escaped_byte(rest: &[u8]) -> (Option<u8>, usize) {
    let (radix, max, skip) = match rest.first() {
        Some(b'x') => (16, 2, 1),
        Some(b'0'..=b'7') => (8, 3, 0),
        Some(_) => return (None, 1),
        None => return (None, 0),
    };
    let digits: Vec<u32> = rest[skip..]
        .iter()
        .take(max)
        .map_while(|&b| char::from(b).to_digit(radix))
        .collect();
    if digits.is_empty() {
        return (None, skip);
    }
    let value = digits.iter().fold(0, |acc, d| acc * radix + d);
    (u8::try_from(value).ok(), skip + digits.len())
}

fn is_local_name(name: &[u8]) -> bool {
    match name.split_first() {
        Some((&first, rest)) => {
            (first.is_ascii_lowercase() || first == b'_' || !first.is_ascii())
                && rest
                    .iter()
                    .all(|&b| b.is_ascii_alphanumeric() || b == b'_' || !b.is_ascii())
        }
        None => false,
    }
}

/// Strip `width` columns of indentation from every fragment that starts
/// a line of a `<<~` body.
pub(crate) fn dedent_fragments(fragments: &mut [Fragment], width: u32) {
    let mut at_line_start = true;
    for fragment in fragments.iter_mut() {
        match fragment {
            Fragment::Str(bytes, _) => {
                if at_line_start {
                    let strip = dedent_width(bytes, width);
                    bytes.drain(..strip);
                }
                at_line_start = bytes.last() == Some(&b'\n');
            }
            Fragment::Node(_) => at_line_start = false,
        }
    }
}

/// Which node family a literal body folds into.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum LiteralKind {
    Str,
    XStr,
    Sym,
    Regex(RegexOptions),
}

impl Parser<'_> {
    /// Whether new string literals are frozen.
    pub(crate) fn frozen_strings(&self) -> bool {
        self.cursor
            .lexer()
            .magic()
            .frozen_string_literal
            .unwrap_or(self.config.frozen_string_literal)
    }

    /// Fold a literal body into one node.
    pub(crate) fn build_literal(
        &mut self,
        kind: LiteralKind,
        fragments: Vec<Fragment>,
        span: Span,
    ) -> NodeId {
        let mut fragments = literal_concat(fragments);
        if let LiteralKind::Regex(options) = kind {
            self.check_regexp_fragments(&fragments, options);
        }
        let static_bytes = match fragments.as_mut_slice() {
            [] => Some(Vec::new()),
            [Fragment::Str(bytes, _)] => Some(std::mem::take(bytes)),
            _ => None,
        };
        let node = match static_bytes {
            Some(value) => match kind {
                LiteralKind::Str => NodeKind::Str {
                    value,
                    frozen: self.frozen_strings(),
                },
                LiteralKind::XStr => NodeKind::XStr { value },
                LiteralKind::Sym => {
                    let text = String::from_utf8_lossy(&value);
                    NodeKind::Sym(self.intern(&text))
                }
                LiteralKind::Regex(options) => NodeKind::Regex {
                    source: value,
                    options,
                },
            },
            None => {
                let parts = self.fragment_nodes(fragments);
                match kind {
                    LiteralKind::Str => NodeKind::DStr { parts },
                    LiteralKind::XStr => NodeKind::DXStr { parts },
                    LiteralKind::Sym => NodeKind::DSym { parts },
                    LiteralKind::Regex(options) => NodeKind::DRegex { parts, options },
                }
            }
        };
        self.alloc(node, span)
    }

    /// Every byte run of a regexp, interpolated or not, must fit its
    /// encoding.
    fn check_regexp_fragments(&mut self, fragments: &[Fragment], options: RegexOptions) {
        let source = self.cursor.lexer().magic().encoding;
        for fragment in fragments {
            if let Fragment::Str(bytes, span) = fragment {
                if let Some(message) = regexp_fragment_error(bytes, options, source) {
                    self.error_at(ErrorCode::E1021, message, *span);
                }
            }
        }
    }

    /// Parts of an interpolated literal: byte runs become plain strings.
    fn fragment_nodes(&mut self, fragments: Vec<Fragment>) -> Vec<NodeId> {
        fragments
            .into_iter()
            .map(|fragment| match fragment {
                Fragment::Str(value, span) => self.alloc(
                    NodeKind::Str {
                        value,
                        frozen: false,
                    },
                    span,
                ),
                Fragment::Node(id) => id,
            })
            .collect()
    }
}
