//! Garnet IR - core data structures shared by the front-end crates.
//!
//! - Spans for source locations
//! - Interned names
//! - Tokens produced by the scanner
//! - The arena-allocated AST and its S-expression rendering
//!
//! # Design Philosophy
//!
//! - **Intern identifiers**: names are `Name(u32)` handles
//! - **Flatten the tree**: children are `NodeId(u32)` indices, never `Box`
//! - **Tag every node**: each `NodeKind` variant has its own named fields

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod arena;
pub mod ast;
mod interner;
mod name;
pub mod sexp;
mod span;
mod token;

pub use arena::{AstId, NodeArena};
pub use ast::{CallOp, ConstScope, GuardKind, Node, NodeId, NodeKind};
pub use interner::{StringInterner, StringLookup};
pub use name::Name;
pub use span::Span;
pub use token::{NumericValue, RegexOptions, Token, TokenKind, TokenValue};

static_assert_size!(Span, 8);
static_assert_size!(Name, 4);
static_assert_size!(NodeId, 4);
