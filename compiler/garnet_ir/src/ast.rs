//! Abstract syntax tree.
//!
//! Nodes live in a [`NodeArena`](crate::NodeArena) and refer to each other
//! through [`NodeId`] indices. Every kind has its own named fields.

use super::{Name, NumericValue, RegexOptions, Span};
use std::fmt;

/// Index of a node in its arena.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        NodeId(raw)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// A node with its source span.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Node {
    pub id: NodeId,
    pub span: Span,
    pub kind: NodeKind,
}

/// How a call reaches its receiver.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CallOp {
    /// `recv.m` or a receiverless call.
    Dot,
    /// `recv&.m`
    SafeNav,
    /// `recv::m`
    Colon2,
}

/// Lexical scope prefix of a constant reference.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ConstScope {
    /// `Foo`
    Lexical,
    /// `::Foo`
    TopLevel,
    /// `expr::Foo`
    Scoped(NodeId),
}

/// Guard of an `in` clause: `if` or `unless`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum GuardKind {
    If,
    Unless,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum NodeKind {
    // Literals
    Nil,
    True,
    False,
    SelfRef,
    Numeric(NumericValue),
    Str {
        value: Vec<u8>,
        frozen: bool,
    },
    /// Interpolated string; parts are `Str` and `EvStr` nodes.
    DStr {
        parts: Vec<NodeId>,
    },
    XStr {
        value: Vec<u8>,
    },
    DXStr {
        parts: Vec<NodeId>,
    },
    Sym(Name),
    DSym {
        parts: Vec<NodeId>,
    },
    Regex {
        source: Vec<u8>,
        options: RegexOptions,
    },
    DRegex {
        parts: Vec<NodeId>,
        options: RegexOptions,
    },
    /// `#{...}` or `#@var` inside a literal.
    EvStr {
        body: Option<NodeId>,
    },
    Array {
        elements: Vec<NodeId>,
    },
    Hash {
        pairs: Vec<NodeId>,
        braces: bool,
    },
    Pair {
        key: NodeId,
        value: NodeId,
    },
    Range {
        low: Option<NodeId>,
        high: Option<NodeId>,
        exclusive: bool,
    },
    File,
    Line(u32),
    Encoding,

    // Variables
    LocalVar(Name),
    IVar(Name),
    CVar(Name),
    GVar(Name),
    NthRef(u32),
    BackRef(u8),
    Const {
        scope: ConstScope,
        name: Name,
    },

    // Assignment
    LocalAsgn {
        name: Name,
        value: Option<NodeId>,
    },
    IVarAsgn {
        name: Name,
        value: Option<NodeId>,
    },
    CVarAsgn {
        name: Name,
        value: Option<NodeId>,
    },
    GVarAsgn {
        name: Name,
        value: Option<NodeId>,
    },
    ConstAsgn {
        scope: ConstScope,
        name: Name,
        value: Option<NodeId>,
    },
    /// `recv.name = value` and `recv[args] = value`; `value` is the last argument.
    AttrAsgn {
        receiver: NodeId,
        name: Name,
        args: Vec<NodeId>,
        op: CallOp,
    },
    MultiAsgn {
        targets: NodeId,
        value: NodeId,
    },
    /// Multiple-assignment target list, nested for `(a, b)` groups.
    Mlhs {
        items: Vec<NodeId>,
    },
    OpAsgn {
        target: NodeId,
        op: Name,
        value: NodeId,
    },
    OrAsgn {
        target: NodeId,
        value: NodeId,
    },
    AndAsgn {
        target: NodeId,
        value: NodeId,
    },
    Splat {
        value: Option<NodeId>,
    },
    DoubleSplat {
        value: Option<NodeId>,
    },

    // Calls
    Call {
        receiver: Option<NodeId>,
        name: Name,
        args: Vec<NodeId>,
        block: Option<NodeId>,
        op: CallOp,
    },
    /// Bare identifier that is not a known local: a receiverless, argumentless call.
    VCall(Name),
    BlockPass {
        value: Option<NodeId>,
    },
    /// `...` in an argument list.
    ForwardedArgs,
    Block {
        params: Option<NodeId>,
        body: Option<NodeId>,
        /// Implicit arity from `_1`..`_9`.
        numbered: u8,
    },
    Lambda {
        params: Option<NodeId>,
        body: Option<NodeId>,
        numbered: u8,
    },
    Super {
        args: Vec<NodeId>,
        block: Option<NodeId>,
    },
    /// `super` without arguments or parentheses.
    ZSuper {
        block: Option<NodeId>,
    },
    Yield {
        args: Vec<NodeId>,
    },
    Defined(NodeId),
    And {
        left: NodeId,
        right: NodeId,
    },
    Or {
        left: NodeId,
        right: NodeId,
    },
    Not(NodeId),
    MatchWithLvasgn {
        regex: NodeId,
        value: NodeId,
        names: Vec<Name>,
    },

    // Parameters
    Params {
        required: Vec<NodeId>,
        optional: Vec<NodeId>,
        rest: Option<NodeId>,
        post: Vec<NodeId>,
        keywords: Vec<NodeId>,
        kwrest: Option<NodeId>,
        block: Option<NodeId>,
        block_locals: Vec<NodeId>,
    },
    /// A parameter list with an order error, kept as written.
    UnorderedParams(Vec<NodeId>),
    Arg(Name),
    OptArg {
        name: Name,
        default: NodeId,
    },
    RestArg(Option<Name>),
    KwArg {
        name: Name,
        default: Option<NodeId>,
    },
    KwRestArg(Option<Name>),
    /// `**nil`
    NoKwArg,
    BlockArg(Option<Name>),
    /// `...` in a parameter list.
    ForwardArg,
    /// Destructuring parameter `(a, b)`.
    MlhsArg {
        items: Vec<NodeId>,
    },
    ShadowArg(Name),

    // Control flow
    Stmts(Vec<NodeId>),
    Begin {
        body: Option<NodeId>,
    },
    If {
        cond: NodeId,
        then_body: Option<NodeId>,
        else_body: Option<NodeId>,
    },
    While {
        cond: NodeId,
        body: Option<NodeId>,
        do_while: bool,
    },
    Until {
        cond: NodeId,
        body: Option<NodeId>,
        do_while: bool,
    },
    For {
        var: NodeId,
        iter: NodeId,
        body: Option<NodeId>,
    },
    Case {
        subject: Option<NodeId>,
        whens: Vec<NodeId>,
        else_body: Option<NodeId>,
    },
    When {
        conds: Vec<NodeId>,
        body: Option<NodeId>,
    },
    CaseMatch {
        subject: NodeId,
        clauses: Vec<NodeId>,
        else_body: Option<NodeId>,
    },
    InClause {
        pattern: NodeId,
        guard: Option<(GuardKind, NodeId)>,
        body: Option<NodeId>,
    },
    /// `value => pattern`
    MatchPattern {
        value: NodeId,
        pattern: NodeId,
    },
    /// `value in pattern`
    MatchPatternP {
        value: NodeId,
        pattern: NodeId,
    },
    Rescue {
        body: Option<NodeId>,
        clauses: Vec<NodeId>,
        else_body: Option<NodeId>,
    },
    RescueClause {
        exceptions: Vec<NodeId>,
        var: Option<NodeId>,
        body: Option<NodeId>,
    },
    Ensure {
        body: Option<NodeId>,
        ensure: Option<NodeId>,
    },
    RescueMod {
        body: NodeId,
        rescue: NodeId,
    },
    Return(Option<NodeId>),
    Break(Option<NodeId>),
    Next(Option<NodeId>),
    Redo,
    Retry,

    // Patterns
    ArrayPattern {
        constant: Option<NodeId>,
        elements: Vec<NodeId>,
    },
    FindPattern {
        constant: Option<NodeId>,
        pre_rest: NodeId,
        elements: Vec<NodeId>,
        post_rest: NodeId,
    },
    HashPattern {
        constant: Option<NodeId>,
        pairs: Vec<NodeId>,
        rest: Option<NodeId>,
    },
    /// `key:` or `key: pattern` inside a hash pattern.
    PatternPair {
        key: Name,
        value: Option<NodeId>,
    },
    MatchVar(Name),
    /// `*name` or bare `*` inside array and find patterns, `**name` in hash patterns.
    MatchRest(Option<Name>),
    /// `**nil` in a hash pattern.
    MatchNilRest,
    MatchAlt {
        left: NodeId,
        right: NodeId,
    },
    MatchAs {
        pattern: NodeId,
        name: Name,
    },
    Pin(NodeId),

    // Definitions
    Def {
        receiver: Option<NodeId>,
        name: Name,
        params: Option<NodeId>,
        body: Option<NodeId>,
        endless: bool,
    },
    Class {
        path: NodeId,
        superclass: Option<NodeId>,
        body: Option<NodeId>,
    },
    SClass {
        target: NodeId,
        body: Option<NodeId>,
    },
    Module {
        path: NodeId,
        body: Option<NodeId>,
    },
    Alias {
        new_name: NodeId,
        old_name: NodeId,
    },
    Undef(Vec<NodeId>),
    PreExe(Option<NodeId>),
    PostExe(Option<NodeId>),

    // Shareable constants
    EnsureShareable(NodeId),
    MakeShareable {
        value: NodeId,
        copy: bool,
    },

    /// Placeholder left by syntax error recovery.
    Error,
}

impl NodeKind {
    /// Literal value that is compile-time constant with no interpolation.
    pub fn is_static_literal(&self) -> bool {
        matches!(
            self,
            NodeKind::Nil
                | NodeKind::True
                | NodeKind::False
                | NodeKind::Numeric(_)
                | NodeKind::Str { .. }
                | NodeKind::Sym(_)
                | NodeKind::Regex { .. }
                | NodeKind::File
                | NodeKind::Line(_)
                | NodeKind::Encoding
        )
    }

    /// Node that reads a variable without side effects.
    pub fn is_variable_read(&self) -> bool {
        matches!(
            self,
            NodeKind::LocalVar(_)
                | NodeKind::IVar(_)
                | NodeKind::CVar(_)
                | NodeKind::GVar(_)
                | NodeKind::NthRef(_)
                | NodeKind::BackRef(_)
                | NodeKind::Const { .. }
                | NodeKind::SelfRef
        )
    }

    /// Jump that makes following statements in the same list unreachable.
    pub fn is_jump(&self) -> bool {
        matches!(
            self,
            NodeKind::Return(_)
                | NodeKind::Break(_)
                | NodeKind::Next(_)
                | NodeKind::Redo
                | NodeKind::Retry
        )
    }
}
