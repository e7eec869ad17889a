//! Node builder: where the grammar's reductions become AST nodes.
//!
//! The grammar never touches the arena directly. It allocates through an
//! [`AstSink`], chosen when the session starts:
//!
//! - [`TreeSink`]: a plain arena
//! - [`EventSink`]: an arena plus an [`EventListener`] told about every
//!   consumed token and every built node
//!
//! The submodules extend the parser with the semantic side of building:
//! literal folding, assignment targets, shareable constants and the
//! void-context and duplicate-literal warnings.

mod assign;
mod literal;
mod shareable;
mod warnings;

pub use literal::{literal_concat, named_captures, Fragment};
pub(crate) use literal::{dedent_fragments, LiteralKind};
pub use shareable::is_shareable_literal;

use garnet_ir::{Node, NodeArena, NodeId, NodeKind, Span, Token};

/// Receives the parser's output.
pub trait AstSink {
    /// Store a node and return its id.
    fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId;

    /// Called for each token the parser consumes.
    fn on_token(&mut self, token: &Token);

    fn arena(&self) -> &NodeArena;

    fn into_arena(self: Box<Self>) -> NodeArena;
}

/// Observer of a parse, for tooling that wants a token and node stream.
pub trait EventListener {
    fn on_token(&mut self, token: &Token);

    /// Called once per node, children before parents.
    fn on_node(&mut self, node: &Node);
}

/// Builds the tree and nothing else.
#[derive(Debug, Default)]
pub struct TreeSink {
    arena: NodeArena,
}

impl TreeSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AstSink for TreeSink {
    #[inline]
    fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        self.arena.alloc(kind, span)
    }

    #[inline]
    fn on_token(&mut self, _token: &Token) {}

    fn arena(&self) -> &NodeArena {
        &self.arena
    }

    fn into_arena(self: Box<Self>) -> NodeArena {
        self.arena
    }
}

/// Builds the tree and reports each step to a listener.
pub struct EventSink {
    arena: NodeArena,
    listener: Box<dyn EventListener>,
}

impl EventSink {
    pub fn new(listener: Box<dyn EventListener>) -> Self {
        EventSink {
            arena: NodeArena::new(),
            listener,
        }
    }
}

impl AstSink for EventSink {
    fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = self.arena.alloc(kind, span);
        self.listener.on_node(self.arena.get(id));
        id
    }

    fn on_token(&mut self, token: &Token) {
        self.listener.on_token(token);
    }

    fn arena(&self) -> &NodeArena {
        &self.arena
    }

    fn into_arena(self: Box<Self>) -> NodeArena {
        self.arena
    }
}

impl std::fmt::Debug for EventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSink")
            .field("nodes", &self.arena.len())
            .finish_non_exhaustive()
    }
}
