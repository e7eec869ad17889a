//! Assignment targets.
//!
//! The grammar parses the left side of `=` as an ordinary expression and
//! only learns it was a target when the `=` arrives. These helpers
//! reinterpret that expression: locals are declared, attribute and index
//! calls become setter calls, and targets that cannot be assigned are
//! reported while a placeholder keeps the tree whole.

use garnet_diagnostic::ErrorCode;
use garnet_ir::{CallOp, ConstScope, Name, NodeId, NodeKind, Span};
use garnet_lexer::is_numbered_param;

use crate::scope::VarRole;
use crate::{ParseContext, Parser};

/// What an assignment writes to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Target {
    Local(Name),
    IVar(Name),
    CVar(Name),
    GVar(Name),
    Const {
        scope: ConstScope,
        name: Name,
    },
    /// `recv.name = v` or `recv[args] = v`; `name` already ends in `=`.
    Attr {
        receiver: NodeId,
        name: Name,
        args: Vec<NodeId>,
        op: CallOp,
    },
    /// Already a target, e.g. a nested `(a, b)` or a splat.
    Node(NodeId),
    /// Reported; builds an `Error` node.
    Invalid,
}

impl Parser<'_> {
    /// Whether `=` after this expression makes it an assignment.
    pub(crate) fn is_assignable(&self, id: NodeId) -> bool {
        match self.node(id) {
            NodeKind::LocalVar(_)
            | NodeKind::VCall(_)
            | NodeKind::IVar(_)
            | NodeKind::CVar(_)
            | NodeKind::GVar(_)
            | NodeKind::NthRef(_)
            | NodeKind::BackRef(_)
            | NodeKind::Const { .. }
            | NodeKind::Nil
            | NodeKind::SelfRef
            | NodeKind::True
            | NodeKind::False
            | NodeKind::File
            | NodeKind::Line(_)
            | NodeKind::Encoding => true,
            NodeKind::Call {
                receiver: Some(_),
                name,
                args,
                block: None,
                ..
            } => {
                let text = self.text(*name);
                text == "[]" || (args.is_empty() && is_attr_name(text))
            }
            _ => false,
        }
    }

    /// Whether the expression can stand in a multiple-assignment list.
    pub(crate) fn is_mlhs_item(&self, id: NodeId) -> bool {
        matches!(
            self.node(id),
            NodeKind::Mlhs { .. } | NodeKind::Splat { .. }
        ) || self.is_assignable(id)
    }

    /// Reinterpret `lhs` as an assignment target, declaring locals.
    pub(crate) fn assign_target(&mut self, ctx: ParseContext, lhs: NodeId) -> Target {
        let span = self.node_span(lhs);
        let kind = self.node(lhs).clone();
        match kind {
            NodeKind::LocalVar(name) | NodeKind::VCall(name) => {
                if is_numbered_param(self.text(name).as_bytes()) {
                    let message = format!("Can't assign to numbered parameter {}", self.text(name));
                    self.error_at(ErrorCode::E1009, message, span);
                    return Target::Invalid;
                }
                self.declare_var(name, VarRole::Local, span);
                Target::Local(name)
            }
            NodeKind::IVar(name) => Target::IVar(name),
            NodeKind::CVar(name) => Target::CVar(name),
            NodeKind::GVar(name) => Target::GVar(name),
            NodeKind::NthRef(n) => {
                self.error_at(ErrorCode::E1003, format!("Can't set variable ${n}"), span);
                Target::Invalid
            }
            NodeKind::BackRef(c) => {
                let message = format!("Can't set variable ${}", char::from(c));
                self.error_at(ErrorCode::E1003, message, span);
                Target::Invalid
            }
            NodeKind::Const { scope, name } => {
                if ctx.in_def() {
                    self.error_at(ErrorCode::E1005, "dynamic constant assignment", span);
                }
                Target::Const { scope, name }
            }
            NodeKind::Nil => self.invalid_target("Can't assign to nil", span),
            NodeKind::SelfRef => self.invalid_target("Can't change the value of self", span),
            NodeKind::True => self.invalid_target("Can't assign to true", span),
            NodeKind::False => self.invalid_target("Can't assign to false", span),
            NodeKind::File => self.invalid_target("Can't assign to __FILE__", span),
            NodeKind::Line(_) => self.invalid_target("Can't assign to __LINE__", span),
            NodeKind::Encoding => self.invalid_target("Can't assign to __ENCODING__", span),
            NodeKind::Call {
                receiver: Some(receiver),
                name,
                args,
                op,
                ..
            } => {
                let setter = format!("{}=", self.text(name));
                let name = self.intern(&setter);
                Target::Attr {
                    receiver,
                    name,
                    args,
                    op,
                }
            }
            NodeKind::Mlhs { .. } | NodeKind::Splat { .. } => Target::Node(lhs),
            _ => self.invalid_target("Can't assign to this expression", span),
        }
    }

    fn invalid_target(&mut self, message: &str, span: Span) -> Target {
        self.error_at(ErrorCode::E1003, message, span);
        Target::Invalid
    }

    /// Target node for a multiple-assignment list, `for` or `rescue => e`.
    pub(crate) fn mlhs_target(&mut self, ctx: ParseContext, lhs: NodeId) -> NodeId {
        let span = self.node_span(lhs);
        let target = self.assign_target(ctx, lhs);
        self.target_node(target, None, span)
    }

    /// Build the assignment node; `value` is `None` inside `Mlhs` and
    /// under operator assignment.
    pub(crate) fn target_node(&mut self, target: Target, value: Option<NodeId>, span: Span) -> NodeId {
        let kind = match target {
            Target::Local(name) => NodeKind::LocalAsgn { name, value },
            Target::IVar(name) => NodeKind::IVarAsgn { name, value },
            Target::CVar(name) => NodeKind::CVarAsgn { name, value },
            Target::GVar(name) => NodeKind::GVarAsgn { name, value },
            Target::Const { scope, name } => {
                let value = value.map(|v| self.shareable_value(v));
                NodeKind::ConstAsgn { scope, name, value }
            }
            Target::Attr {
                receiver,
                name,
                mut args,
                op,
            } => {
                args.extend(value);
                NodeKind::AttrAsgn {
                    receiver,
                    name,
                    args,
                    op,
                }
            }
            Target::Node(id) => return id,
            Target::Invalid => NodeKind::Error,
        };
        self.alloc(kind, span)
    }

    /// `target op= value`, with `||=` and `&&=` as their own kinds.
    pub(crate) fn op_assign_node(
        &mut self,
        target: Target,
        op: Name,
        value: NodeId,
        target_span: Span,
        span: Span,
    ) -> NodeId {
        let value = if matches!(target, Target::Const { .. }) {
            self.shareable_value(value)
        } else {
            value
        };
        let target = self.target_node(target, None, target_span);
        let kind = match self.text(op) {
            "||" => NodeKind::OrAsgn { target, value },
            "&&" => NodeKind::AndAsgn { target, value },
            _ => NodeKind::OpAsgn { target, op, value },
        };
        self.alloc(kind, span)
    }
}

/// A method name that `recv.name = v` can turn into a setter.
fn is_attr_name(text: &str) -> bool {
    text.chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || !c.is_ascii())
        && !text.ends_with(['?', '!', '='])
}
