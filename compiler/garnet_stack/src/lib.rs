//! Stack safety for deeply nested source.
//!
//! Two layers:
//!
//! - [`ensure_sufficient_stack`] grows the native stack on demand so
//!   legitimately deep (but bounded) nesting never overflows.
//! - [`NestingGuard`] bounds the logical depth of parentheses, blocks,
//!   interpolation and heredocs, turning adversarial input into a
//!   "nesting too deep" error instead of unbounded memory growth.
//!
//! # Platform Support
//!
//! - **Native targets**: Uses the `stacker` crate to grow the stack on demand.
//! - **WASM targets**: No-op passthrough (WASM has its own stack management).

/// Minimum stack space to keep available (100KB red zone).
const RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate when growing (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Default limit on nested constructs.
pub const DEFAULT_MAX_NESTING: u32 = 512;

/// Ensure sufficient stack space is available before executing `f`.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version - just call directly (WASM has its own stack management).
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Raised when nesting exceeds the configured limit.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("nesting too deep (limit {limit})")]
pub struct NestingTooDeep {
    pub limit: u32,
}

/// Counter for nested constructs.
///
/// Callers pair every successful [`enter`](Self::enter) with one
/// [`exit`](Self::exit); `exit` saturates at zero.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct NestingGuard {
    depth: u32,
    limit: u32,
}

impl Default for NestingGuard {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_NESTING)
    }
}

impl NestingGuard {
    pub const fn new(limit: u32) -> Self {
        NestingGuard { depth: 0, limit }
    }

    #[inline]
    pub fn enter(&mut self) -> Result<(), NestingTooDeep> {
        if self.depth >= self.limit {
            return Err(NestingTooDeep { limit: self.limit });
        }
        self.depth += 1;
        Ok(())
    }

    #[inline]
    pub fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}

#[cfg(test)]
mod tests;
