//! `shareable_constant_value` policies applied to constant assignments.

use garnet_ir::{CallOp, NodeArena, NodeId, NodeKind};
use garnet_lexer::ShareablePolicy;

use crate::Parser;

/// A value built only from literals: numbers, strings, symbols, `nil`,
/// booleans, ranges of those, and arrays and hashes of those.
pub fn is_shareable_literal(arena: &NodeArena, id: NodeId) -> bool {
    match arena.kind(id) {
        NodeKind::Nil
        | NodeKind::True
        | NodeKind::False
        | NodeKind::Numeric(_)
        | NodeKind::Str { .. }
        | NodeKind::Sym(_)
        | NodeKind::Regex { .. }
        | NodeKind::File
        | NodeKind::Line(_)
        | NodeKind::Encoding => true,
        NodeKind::Range { low, high, .. } => [low, high]
            .into_iter()
            .flatten()
            .all(|end| is_shareable_literal(arena, *end)),
        NodeKind::Array { elements } => elements.iter().all(|e| is_shareable_literal(arena, *e)),
        NodeKind::Hash { pairs, .. } => pairs.iter().all(|pair| match arena.kind(*pair) {
            NodeKind::Pair { key, value } => {
                is_shareable_literal(arena, *key) && is_shareable_literal(arena, *value)
            }
            _ => false,
        }),
        _ => false,
    }
}

impl Parser<'_> {
    /// Wrap the right side of a constant assignment per the active policy.
    pub(crate) fn shareable_value(&mut self, value: NodeId) -> NodeId {
        let policy = self.cursor.lexer().magic().shareable_constant_value;
        if policy == ShareablePolicy::None {
            return value;
        }
        if is_shareable_literal(self.sink.arena(), value) {
            return self.freeze_literal(value);
        }
        let span = self.node_span(value);
        let kind = match policy {
            ShareablePolicy::Literal => NodeKind::EnsureShareable(value),
            ShareablePolicy::ExperimentalCopy => NodeKind::MakeShareable { value, copy: true },
            ShareablePolicy::ExperimentalEverything | ShareablePolicy::None => {
                NodeKind::MakeShareable { value, copy: false }
            }
        };
        tracing::trace!(?policy, "constant value made shareable");
        self.alloc(kind, span)
    }

    /// Deep-freeze a literal: strings become frozen literals, arrays and
    /// hashes get `.freeze`.
    fn freeze_literal(&mut self, id: NodeId) -> NodeId {
        let span = self.node_span(id);
        match self.node(id).clone() {
            NodeKind::Str {
                value,
                frozen: false,
            } => self.alloc(NodeKind::Str { value, frozen: true }, span),
            NodeKind::Array { elements } => {
                let frozen: Vec<NodeId> = elements.iter().map(|e| self.freeze_literal(*e)).collect();
                let array = if frozen == elements {
                    id
                } else {
                    self.alloc(NodeKind::Array { elements: frozen }, span)
                };
                self.freeze_call(array)
            }
            NodeKind::Hash { pairs, braces } => {
                let mut frozen = Vec::with_capacity(pairs.len());
                for pair in &pairs {
                    let pair_span = self.node_span(*pair);
                    frozen.push(match self.node(*pair).clone() {
                        NodeKind::Pair { key, value } => {
                            let key = self.freeze_literal(key);
                            let value = self.freeze_literal(value);
                            self.alloc(NodeKind::Pair { key, value }, pair_span)
                        }
                        _ => *pair,
                    });
                }
                let hash = self.alloc(NodeKind::Hash { pairs: frozen, braces }, span);
                self.freeze_call(hash)
            }
            _ => id,
        }
    }

    fn freeze_call(&mut self, receiver: NodeId) -> NodeId {
        let span = self.node_span(receiver);
        let name = self.intern("freeze");
        self.alloc(
            NodeKind::Call {
                receiver: Some(receiver),
                name,
                args: Vec::new(),
                block: None,
                op: CallOp::Dot,
            },
            span,
        )
    }
}
