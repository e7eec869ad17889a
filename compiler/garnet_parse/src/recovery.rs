//! Error recovery for the parser.
//!
//! Provides token sets and the statement-boundary synchronization that
//! lets one pass report several independent syntax errors. Sets are
//! bitsets over `TokenKind` discriminants with O(1) membership tests.

use garnet_ir::TokenKind;

use crate::Parser;

// TokenSet is two u128 words; every discriminant index must be < 256.
const _: () = assert!(
    TokenKind::ALL.len() <= 256,
    "TokenSet uses two u128 words; all discriminant indices must be < 256"
);

/// Most expected tokens listed in a syntax error message.
pub const MAX_EXPECTED: usize = 4;

/// A set of token kinds.
///
/// Bit `i` of `lo` (or bit `i - 128` of `hi`) is set when the kind with
/// discriminant index `i` is a member.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TokenSet {
    lo: u128,
    hi: u128,
}

impl TokenSet {
    /// Create an empty token set.
    #[inline]
    pub const fn new() -> Self {
        TokenSet { lo: 0, hi: 0 }
    }

    /// Create a token set containing a single token kind.
    #[inline]
    pub const fn single(kind: TokenKind) -> Self {
        Self::new().with(kind)
    }

    /// Add a token kind to this set (builder pattern for const contexts).
    #[inline]
    #[must_use]
    pub const fn with(self, kind: TokenKind) -> Self {
        let idx = kind.discriminant_index();
        if idx < 128 {
            TokenSet {
                lo: self.lo | (1u128 << idx),
                hi: self.hi,
            }
        } else {
            TokenSet {
                lo: self.lo,
                hi: self.hi | (1u128 << (idx - 128)),
            }
        }
    }

    /// Union of two token sets.
    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        TokenSet {
            lo: self.lo | other.lo,
            hi: self.hi | other.hi,
        }
    }

    #[inline]
    pub const fn contains(&self, kind: TokenKind) -> bool {
        let idx = kind.discriminant_index();
        if idx < 128 {
            (self.lo & (1u128 << idx)) != 0
        } else {
            (self.hi & (1u128 << (idx - 128))) != 0
        }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.lo == 0 && self.hi == 0
    }

    #[inline]
    pub const fn count(&self) -> u32 {
        self.lo.count_ones() + self.hi.count_ones()
    }

    /// Members in discriminant order.
    pub fn iter(&self) -> impl Iterator<Item = TokenKind> + '_ {
        TokenKind::ALL
            .iter()
            .copied()
            .filter(move |kind| self.contains(*kind))
    }

    /// The "expecting" part of a syntax error, e.g. "`end' or ';'".
    ///
    /// `None` for an empty set or one too large to be useful.
    pub fn format_expected(&self) -> Option<String> {
        let count = self.count() as usize;
        if count == 0 || count > MAX_EXPECTED {
            return None;
        }
        let names: Vec<&'static str> = self.iter().map(TokenKind::display_name).collect();
        Some(names.join(" or "))
    }
}

// Pre-defined token sets, computed at compile time.

/// Tokens that end a statement list.
pub const STMTS_END: TokenSet = TokenSet::new()
    .with(TokenKind::KwEnd)
    .with(TokenKind::RBrace)
    .with(TokenKind::RParen)
    .with(TokenKind::KwElse)
    .with(TokenKind::KwElsif)
    .with(TokenKind::KwWhen)
    .with(TokenKind::KwIn)
    .with(TokenKind::KwRescue)
    .with(TokenKind::KwEnsure)
    .with(TokenKind::StringDEnd)
    .with(TokenKind::Eof);

/// Statement terminators.
pub const TERMS: TokenSet = TokenSet::new()
    .with(TokenKind::Newline)
    .with(TokenKind::Semi);

/// Where recovery stops skipping when no construct is open.
pub const STMT_BOUNDARY: TokenSet = TERMS
    .with(TokenKind::KwEnd)
    .with(TokenKind::RBrace)
    .with(TokenKind::StringDEnd)
    .with(TokenKind::Eof);

/// Tokens opening a construct closed by `end`.
pub const END_OPENERS: TokenSet = TokenSet::new()
    .with(TokenKind::KwClass)
    .with(TokenKind::KwModule)
    .with(TokenKind::KwDef)
    .with(TokenKind::KwBegin)
    .with(TokenKind::KwIf)
    .with(TokenKind::KwUnless)
    .with(TokenKind::KwWhile)
    .with(TokenKind::KwUntil)
    .with(TokenKind::KwCase)
    .with(TokenKind::KwFor)
    .with(TokenKind::KwDo)
    .with(TokenKind::KwDoBlock)
    .with(TokenKind::KwDoLambda);

/// Tokens opening a construct closed by `}`.
pub const BRACE_OPENERS: TokenSet = TokenSet::new()
    .with(TokenKind::LBrace)
    .with(TokenKind::LBraceBlock)
    .with(TokenKind::LBraceArg)
    .with(TokenKind::LambdaBeg);

/// Tokens that may begin a value expression.
pub const VALUE_START: TokenSet = TokenSet::new()
    .with(TokenKind::Ident)
    .with(TokenKind::LocalIdent)
    .with(TokenKind::FIdent)
    .with(TokenKind::Const)
    .with(TokenKind::IVar)
    .with(TokenKind::CVar)
    .with(TokenKind::GVar)
    .with(TokenKind::NthRef)
    .with(TokenKind::BackRef)
    .with(TokenKind::Numeric)
    .with(TokenKind::Char)
    .with(TokenKind::Symbol)
    .with(TokenKind::StringBeg)
    .with(TokenKind::XStringBeg)
    .with(TokenKind::RegexpBeg)
    .with(TokenKind::SymBeg)
    .with(TokenKind::WordsBeg)
    .with(TokenKind::QWordsBeg)
    .with(TokenKind::SymbolsBeg)
    .with(TokenKind::QSymbolsBeg)
    .with(TokenKind::KwClass)
    .with(TokenKind::KwModule)
    .with(TokenKind::KwDef)
    .with(TokenKind::KwBegin)
    .with(TokenKind::KwIf)
    .with(TokenKind::KwUnless)
    .with(TokenKind::KwWhile)
    .with(TokenKind::KwUntil)
    .with(TokenKind::KwCase)
    .with(TokenKind::KwFor)
    .with(TokenKind::KwYield)
    .with(TokenKind::KwSuper)
    .with(TokenKind::KwSelf)
    .with(TokenKind::KwNil)
    .with(TokenKind::KwTrue)
    .with(TokenKind::KwFalse)
    .with(TokenKind::KwNot)
    .with(TokenKind::KwDefined)
    .with(TokenKind::KwLine)
    .with(TokenKind::KwFile)
    .with(TokenKind::KwEncoding)
    .with(TokenKind::UPlus)
    .with(TokenKind::UMinus)
    .with(TokenKind::UMinusNum)
    .with(TokenKind::Bang)
    .with(TokenKind::Tilde)
    .with(TokenKind::Colon3)
    .with(TokenKind::BDot2)
    .with(TokenKind::BDot3)
    .with(TokenKind::Arrow)
    .with(TokenKind::LParen)
    .with(TokenKind::LParenArg)
    .with(TokenKind::LBracket)
    .with(TokenKind::LBrace);

/// Tokens that begin the first argument of a command call
/// (`puts x`, `foo *a`, `bar &blk`).
pub const COMMAND_ARG_START: TokenSet = VALUE_START
    .with(TokenKind::Label)
    .with(TokenKind::Splat)
    .with(TokenKind::DSplat)
    .with(TokenKind::BlockAmper);

impl Parser<'_> {
    /// Skip to the next statement boundary that is not inside a construct
    /// opened while skipping. Interpolations met on the way are entered
    /// and left so the scanner stays in step with the source.
    pub(crate) fn synchronize(&mut self) {
        let mut depth: u32 = 0;
        let mut interpolations: u32 = 0;
        loop {
            let kind = self.peek_kind();
            match kind {
                TokenKind::Eof => return,
                TokenKind::StringDEnd if interpolations > 0 => {
                    self.bump();
                    self.cursor.resume_literal();
                    interpolations -= 1;
                    continue;
                }
                TokenKind::StringDEnd => return,
                _ if depth == 0 && interpolations == 0 && STMT_BOUNDARY.contains(kind) => return,
                _ => {}
            }
            self.bump();
            match kind {
                TokenKind::StringDBeg => {
                    if !self.cursor.suspend_literal() {
                        return;
                    }
                    interpolations += 1;
                }
                TokenKind::StringDVar => {
                    if !self.cursor.suspend_literal() {
                        return;
                    }
                    self.bump();
                    self.cursor.resume_literal();
                }
                TokenKind::KwEnd | TokenKind::RBrace => depth = depth.saturating_sub(1),
                _ if END_OPENERS.contains(kind) || BRACE_OPENERS.contains(kind) => depth += 1,
                _ => {}
            }
        }
    }
}
