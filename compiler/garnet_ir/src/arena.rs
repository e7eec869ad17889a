//! Arena storage for AST nodes.
//!
//! All nodes of one parse live in a flat `Vec`; children refer to each
//! other through [`NodeId`] indices. Each arena draws a process-unique
//! [`AstId`], so `(AstId, NodeId)` identifies a node across sessions.

use super::ast::{Node, NodeId, NodeKind};
use super::Span;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_AST_ID: AtomicU32 = AtomicU32::new(1);

/// Process-unique identity of one parsed tree.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct AstId(u32);

impl AstId {
    fn fresh() -> Self {
        AstId(NEXT_AST_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Contiguous storage for the nodes of one tree.
#[derive(Clone, Debug)]
pub struct NodeArena {
    id: AstId,
    nodes: Vec<Node>,
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeArena {
    pub fn new() -> Self {
        NodeArena {
            id: AstId::fresh(),
            nodes: Vec::new(),
        }
    }

    pub fn ast_id(&self) -> AstId {
        self.id
    }

    #[inline]
    pub fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId::from_raw(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(Node { id, span, kind });
        id
    }

    /// # Panics
    /// Panics if `id` was not allocated by this arena.
    #[inline]
    #[track_caller]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    #[track_caller]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    #[inline]
    #[track_caller]
    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }
}

/// Arenas compare by content; the [`AstId`] is identity, not structure.
impl PartialEq for NodeArena {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
    }
}

impl Eq for NodeArena {}

#[cfg(test)]
mod tests;
