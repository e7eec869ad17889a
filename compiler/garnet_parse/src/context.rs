//! Parse context flags for context-sensitive rules.
//!
//! The flags travel down the recursive descent by value. A construct that
//! opens a new region (a method body, a loop, a rescue clause) passes a
//! modified copy to its children and never mutates the caller's copy.

/// Context flags for parsing.
///
/// Multiple flags can be combined using bitwise OR.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ParseContext(u16);

impl ParseContext {
    /// No special context.
    pub const NONE: Self = Self(0);

    /// Inside a method body.
    /// Constant assignment and `class`/`module` definitions are errors.
    pub const IN_DEF: Self = Self(1 << 0);

    /// Directly inside a class or module body.
    /// `return` is an error.
    pub const IN_CLASS: Self = Self(1 << 1);

    /// Inside the operand of `defined?`.
    pub const IN_DEFINED: Self = Self(1 << 2);

    /// Inside a block or lambda body.
    pub const IN_BLOCK: Self = Self(1 << 3);

    /// Inside a `while`, `until` or `for` body.
    pub const IN_LOOP: Self = Self(1 << 4);

    /// Inside a `rescue` clause body; makes `retry` valid.
    pub const IN_RESCUE: Self = Self(1 << 5);

    /// A trailing `do` belongs to the enclosing loop, not to a call.
    pub const NO_BLOCK: Self = Self(1 << 6);

    /// Create a new context with no flags set.
    #[inline]
    pub const fn new() -> Self {
        Self::NONE
    }

    /// Check if a flag is set.
    #[inline]
    pub const fn has(self, flag: Self) -> bool {
        (self.0 & flag.0) != 0
    }

    /// Add a flag to the context.
    #[inline]
    #[must_use]
    pub const fn with(self, flag: Self) -> Self {
        Self(self.0 | flag.0)
    }

    /// Remove a flag from the context.
    #[inline]
    #[must_use]
    pub const fn without(self, flag: Self) -> Self {
        Self(self.0 & !flag.0)
    }

    /// Context for a block or lambda body.
    #[inline]
    #[must_use]
    pub const fn block_body(self) -> Self {
        self.with(Self::IN_BLOCK)
            .without(Self::NO_BLOCK)
            .without(Self::IN_CLASS)
    }

    #[inline]
    pub const fn in_def(self) -> bool {
        self.has(Self::IN_DEF)
    }

    #[inline]
    pub const fn in_class(self) -> bool {
        self.has(Self::IN_CLASS)
    }

    #[inline]
    pub const fn in_defined(self) -> bool {
        self.has(Self::IN_DEFINED)
    }

    #[inline]
    pub const fn in_rescue(self) -> bool {
        self.has(Self::IN_RESCUE)
    }

    #[inline]
    pub const fn allows_block(self) -> bool {
        !self.has(Self::NO_BLOCK)
    }
}

#[cfg(test)]
mod tests;
