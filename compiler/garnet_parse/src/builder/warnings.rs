//! Warnings found while building: void context, unreachable statements
//! and duplicated literals.

use garnet_diagnostic::ErrorCode;
use garnet_ir::{Name, NodeId, NodeKind, NumericValue};
use rustc_hash::FxHashMap;

use crate::Parser;

/// A literal compared by value.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
enum LiteralKey {
    Numeric(NumericValue),
    Str(Vec<u8>),
    Sym(Name),
    Nil,
    True,
    False,
}

impl Parser<'_> {
    /// Statements before the last one whose value is thrown away, and
    /// statements after a jump.
    pub(crate) fn warn_void_statements(&mut self, stmts: &[NodeId]) {
        let Some((_, init)) = stmts.split_last() else {
            return;
        };
        for &stmt in init {
            let what = match self.node(stmt) {
                NodeKind::Const { .. } => Some("a constant"),
                NodeKind::SelfRef => Some("self"),
                kind if kind.is_variable_read() => Some("a variable"),
                kind if kind.is_static_literal() => Some("a literal"),
                _ => None,
            };
            if let Some(what) = what {
                let span = self.node_span(stmt);
                self.warn_at(
                    ErrorCode::W1003,
                    format!("possibly useless use of {what} in void context"),
                    span,
                );
            }
        }
        for pair in stmts.windows(2) {
            if let [jump, next] = *pair {
                if self.node(jump).is_jump() {
                    let span = self.node_span(next);
                    self.warn_at(ErrorCode::W1005, "statement not reached", span);
                    break;
                }
            }
        }
    }

    /// Literal `when` conditions that repeat an earlier one.
    pub(crate) fn warn_duplicate_when(&mut self, conds: &[NodeId]) {
        let mut seen: FxHashMap<LiteralKey, u32> = FxHashMap::default();
        for &cond in conds {
            let Some(key) = self.literal_key(cond) else {
                continue;
            };
            let span = self.node_span(cond);
            let line = self.line_number(span.start);
            if let Some(&first) = seen.get(&key) {
                self.warn_at(
                    ErrorCode::W1004,
                    format!(
                        "`when' clause on line {line} duplicates `when' clause on line {first} and is ignored"
                    ),
                    span,
                );
            } else {
                seen.insert(key, line);
            }
        }
    }

    /// Literal keys that repeat in one hash literal.
    pub(crate) fn warn_duplicate_keys(&mut self, pairs: &[NodeId]) {
        let mut seen: FxHashMap<LiteralKey, NodeId> = FxHashMap::default();
        for &pair in pairs {
            let NodeKind::Pair { key, .. } = *self.node(pair) else {
                continue;
            };
            let Some(literal) = self.literal_key(key) else {
                continue;
            };
            if let Some(earlier) = seen.insert(literal, key) {
                let shown = self.show_key(earlier);
                let line = self.line_number(self.node_span(key).start);
                let span = self.node_span(earlier);
                self.warn_at(
                    ErrorCode::W1006,
                    format!("key {shown} is duplicated and overwritten on line {line}"),
                    span,
                );
            }
        }
    }

    fn literal_key(&self, id: NodeId) -> Option<LiteralKey> {
        Some(match self.node(id) {
            NodeKind::Numeric(value) => LiteralKey::Numeric(value.clone()),
            NodeKind::Str { value, .. } => LiteralKey::Str(value.clone()),
            NodeKind::Sym(name) => LiteralKey::Sym(*name),
            NodeKind::Nil => LiteralKey::Nil,
            NodeKind::True => LiteralKey::True,
            NodeKind::False => LiteralKey::False,
            _ => return None,
        })
    }

    fn show_key(&self, id: NodeId) -> String {
        match self.node(id) {
            NodeKind::Numeric(value) => value.to_string(),
            NodeKind::Str { value, .. } => format!("{:?}", String::from_utf8_lossy(value)),
            NodeKind::Sym(name) => format!(":{}", self.text(*name)),
            NodeKind::Nil => "nil".to_string(),
            NodeKind::True => "true".to_string(),
            _ => "false".to_string(),
        }
    }
}
