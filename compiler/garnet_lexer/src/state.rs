//! Lexer state flags and the `cond`/`cmdarg` bit stacks.

use bitflags::bitflags;

bitflags! {
    /// Where in an expression the scanner stands.
    ///
    /// The grammar is ambiguous at the token level; the state recorded
    /// after each token decides how the next operator is read.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct LexState: u16 {
        /// Ignore newline, `+`/`-` are a sign.
        const BEG = 1 << 0;
        /// Newline significant, `+`/`-` are operators.
        const END = 1 << 1;
        /// Closing parenthesis of a command argument.
        const ENDARG = 1 << 2;
        /// Just after a method name in a definition.
        const ENDFN = 1 << 3;
        /// Newline significant, `+`/`-` depend on following space.
        const ARG = 1 << 4;
        /// Like `ARG` for the first argument of a command.
        const CMDARG = 1 << 5;
        /// After `return`/`break`/`next`/`rescue`.
        const MID = 1 << 6;
        /// A method name is expected, keywords become names.
        const FNAME = 1 << 7;
        /// Right after `.` or `&.`.
        const DOT = 1 << 8;
        /// After `class`: `<<` opens a singleton class.
        const CLASS = 1 << 9;
        /// A label is allowed.
        const LABEL = 1 << 10;
        /// A label was just scanned.
        const LABELED = 1 << 11;
        /// A symbol may follow (`alias`/`undef`).
        const FITEM = 1 << 12;

        const BEG_ANY = Self::BEG.bits() | Self::MID.bits() | Self::CLASS.bits();
        const ARG_ANY = Self::ARG.bits() | Self::CMDARG.bits();
        const END_ANY = Self::END.bits() | Self::ENDARG.bits() | Self::ENDFN.bits();
    }
}

impl LexState {
    /// Any of `flags` set.
    #[inline]
    pub fn any(self, flags: LexState) -> bool {
        self.intersects(flags)
    }

    /// All of `flags` set.
    #[inline]
    pub fn has_all(self, flags: LexState) -> bool {
        self.contains(flags)
    }
}

/// Fixed-depth stack of bits, as used for `cond` and `cmdarg` tracking.
///
/// Pushing beyond 64 levels drops the oldest bit, which matches how deep
/// nesting loses precision rather than failing.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct BitStack(u64);

impl BitStack {
    #[inline]
    pub fn push(&mut self, bit: bool) {
        self.0 = (self.0 << 1) | u64::from(bit);
    }

    #[inline]
    pub fn pop(&mut self) {
        self.0 >>= 1;
    }

    /// Top bit.
    #[inline]
    pub fn top(self) -> bool {
        self.0 & 1 == 1
    }

    /// Replace the top bit.
    #[inline]
    pub fn set_top(&mut self, bit: bool) {
        self.0 = (self.0 & !1) | u64::from(bit);
    }

    #[inline]
    pub fn bits(self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests;
