//! Binary operator precedence table.
//!
//! Levels run from loosest to tightest. The Pratt loop in `expr.rs`
//! compares levels with `Ord`; one table maps each binary token to its
//! level and associativity.

use garnet_ir::TokenKind;

/// Binding power of an argument-level operator.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub(crate) enum Prec {
    Lowest,
    /// `=` and `op=`
    Assign,
    /// `? :`
    Ternary,
    /// `..` `...`
    Range,
    /// `||`
    OrOp,
    /// `&&`
    AndOp,
    /// `<=>` `==` `===` `!=` `=~` `!~`
    Equality,
    /// `<` `<=` `>` `>=`
    Comparison,
    /// `|` `^`
    BitOr,
    /// `&`
    BitAnd,
    /// `<<` `>>`
    Shift,
    /// `+` `-`
    Additive,
    /// `*` `/` `%`
    Multiplicative,
    /// unary minus
    UnaryMinus,
    /// `**`
    Pow,
    /// `!` `~` unary plus
    Unary,
}

impl Prec {
    /// The next tighter level.
    pub(crate) const fn next(self) -> Prec {
        match self {
            Prec::Lowest => Prec::Assign,
            Prec::Assign => Prec::Ternary,
            Prec::Ternary => Prec::Range,
            Prec::Range => Prec::OrOp,
            Prec::OrOp => Prec::AndOp,
            Prec::AndOp => Prec::Equality,
            Prec::Equality => Prec::Comparison,
            Prec::Comparison => Prec::BitOr,
            Prec::BitOr => Prec::BitAnd,
            Prec::BitAnd => Prec::Shift,
            Prec::Shift => Prec::Additive,
            Prec::Additive => Prec::Multiplicative,
            Prec::Multiplicative => Prec::UnaryMinus,
            Prec::UnaryMinus => Prec::Pow,
            Prec::Pow | Prec::Unary => Prec::Unary,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub(crate) enum Assoc {
    Left,
    Right,
    /// `a == b == c` is a syntax error.
    NonAssoc,
}

/// Level and associativity of a binary operator token.
pub(crate) const fn binary_op(kind: TokenKind) -> Option<(Prec, Assoc)> {
    Some(match kind {
        TokenKind::OrOp => (Prec::OrOp, Assoc::Left),
        TokenKind::AndOp => (Prec::AndOp, Assoc::Left),
        TokenKind::Cmp
        | TokenKind::Eq
        | TokenKind::Eqq
        | TokenKind::Neq
        | TokenKind::Match
        | TokenKind::NMatch => (Prec::Equality, Assoc::NonAssoc),
        TokenKind::Lt | TokenKind::Le | TokenKind::Gt | TokenKind::Ge => {
            (Prec::Comparison, Assoc::Left)
        }
        TokenKind::Pipe | TokenKind::Caret => (Prec::BitOr, Assoc::Left),
        TokenKind::Amper => (Prec::BitAnd, Assoc::Left),
        TokenKind::LShift | TokenKind::RShift => (Prec::Shift, Assoc::Left),
        TokenKind::Plus | TokenKind::Minus => (Prec::Additive, Assoc::Left),
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => {
            (Prec::Multiplicative, Assoc::Left)
        }
        TokenKind::Pow => (Prec::Pow, Assoc::Right),
        _ => return None,
    })
}

#[cfg(test)]
mod tests;
