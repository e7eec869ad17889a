//! Scope tracker: which names are local variables where.
//!
//! A stack of frames, one per method, class, module, block or lambda body.
//! Block and lambda frames chain to the frame that encloses them; the
//! other kinds are scope gates that hide every outer local. The scanner
//! consults the tracker through [`LocalLookup`] to tell `foo [1]` (index
//! into a local) from `foo [1]` (call with an array argument).

use bitflags::bitflags;
use garnet_diagnostic::{Diagnostic, ErrorCode};
use garnet_ir::{Name, Span, StringLookup};
use garnet_lexer::{is_numbered_param, LocalLookup};
use smallvec::SmallVec;

/// What opened a frame.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ScopeKind {
    TopLevel,
    Method,
    Class,
    Module,
    SingletonClass,
    Block,
    Lambda,
}

impl ScopeKind {
    /// Gates hide the locals of enclosing frames.
    #[inline]
    pub fn is_gate(self) -> bool {
        !matches!(self, ScopeKind::Block | ScopeKind::Lambda)
    }
}

/// How a name enters a frame.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum VarRole {
    /// Method, block or lambda parameter.
    Param,
    /// Assignment target.
    Local,
    /// Block-local variable declared after `;` in `|a; b|`.
    BlockLocal,
    /// Named group of a regexp literal matched with `=~`.
    NamedCapture,
}

/// Where a name resolved.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Resolution {
    /// Declared in the current frame.
    Local,
    /// Declared `depth` block frames out.
    Outer { depth: u32 },
    Unresolved,
}

bitflags! {
    /// Anonymous parameters a method body may forward.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Forwarding: u8 {
        /// `...`
        const ALL = 1 << 0;
        /// `*`
        const REST = 1 << 1;
        /// `**`
        const KWREST = 1 << 2;
        /// `&`
        const BLOCK = 1 << 3;
    }
}

#[derive(Clone, Debug)]
struct VarEntry {
    name: Name,
    span: Span,
    used: bool,
    capture: bool,
}

#[derive(Clone, Debug)]
struct Frame {
    kind: ScopeKind,
    params: SmallVec<[VarEntry; 4]>,
    locals: Vec<VarEntry>,
    numbered_arity: u8,
    /// A nested block already uses numbered parameters.
    has_numbered_sub: bool,
    /// An enclosing block already uses numbered parameters.
    has_numbered_super: bool,
    has_explicit_params: bool,
    forwarding: Forwarding,
}

impl Frame {
    fn new(kind: ScopeKind) -> Self {
        Frame {
            kind,
            params: SmallVec::new(),
            locals: Vec::new(),
            numbered_arity: 0,
            has_numbered_sub: false,
            has_numbered_super: false,
            has_explicit_params: false,
            forwarding: Forwarding::empty(),
        }
    }

    fn entry_mut(&mut self, name: Name) -> Option<&mut VarEntry> {
        self.params
            .iter_mut()
            .chain(self.locals.iter_mut())
            .find(|entry| entry.name == name)
    }

    fn entry(&self, name: Name) -> Option<&VarEntry> {
        self.params
            .iter()
            .chain(self.locals.iter())
            .find(|entry| entry.name == name)
    }

    fn declares(&self, name: Name) -> bool {
        self.entry(name).is_some()
    }
}

/// The frame stack of one parse session.
#[derive(Clone, Debug)]
pub struct ScopeTracker {
    frames: Vec<Frame>,
    warn_unused: bool,
}

impl Default for ScopeTracker {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ScopeTracker {
    /// A tracker holding the top-level frame.
    pub fn new(warn_unused: bool) -> Self {
        ScopeTracker {
            frames: vec![Frame::new(ScopeKind::TopLevel)],
            warn_unused,
        }
    }

    pub fn push_scope(&mut self, kind: ScopeKind) {
        let mut frame = Frame::new(kind);
        if !kind.is_gate() {
            frame.has_numbered_super = self
                .frames
                .last()
                .is_some_and(|outer| !outer.kind.is_gate() && (outer.numbered_arity > 0 || outer.has_numbered_super));
        }
        self.frames.push(frame);
        tracing::trace!(?kind, depth = self.frames.len(), "scope pushed");
    }

    /// Pop the innermost frame, reporting locals that were never read.
    ///
    /// The top-level frame is never popped.
    pub fn pop_scope(&mut self, names: &dyn StringLookup) -> Vec<Diagnostic> {
        if self.frames.len() <= 1 {
            return Vec::new();
        }
        let Some(frame) = self.frames.pop() else {
            return Vec::new();
        };
        tracing::trace!(kind = ?frame.kind, depth = self.frames.len(), "scope popped");
        if !self.warn_unused {
            return Vec::new();
        }
        unused_warnings(&frame, names)
    }

    /// Warnings for the top-level frame at the end of the parse.
    pub fn finish(&mut self, names: &dyn StringLookup) -> Vec<Diagnostic> {
        match self.frames.first() {
            Some(frame) if self.warn_unused => unused_warnings(frame, names),
            _ => Vec::new(),
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn current_kind(&self) -> ScopeKind {
        self.frames.last().map_or(ScopeKind::TopLevel, |frame| frame.kind)
    }

    /// Declare `name` in the innermost frame.
    ///
    /// Returns a diagnostic for duplicated parameters, numbered parameter
    /// names, block parameters shadowing an outer local and named
    /// captures reusing a local that is not itself a capture.
    pub fn declare(
        &mut self,
        name: Name,
        role: VarRole,
        span: Span,
        names: &dyn StringLookup,
    ) -> Option<Diagnostic> {
        let text = names.lookup(name);
        if is_numbered_param(text.as_bytes()) {
            return Some(
                Diagnostic::error(ErrorCode::E1009)
                    .with_message(format!("{text} is reserved for numbered parameter"))
                    .with_label(span, ""),
            );
        }
        let underscore = text.starts_with('_');
        match role {
            VarRole::Local => {
                if self.resolve(name) == Resolution::Unresolved {
                    if let Some(frame) = self.frames.last_mut() {
                        frame.locals.push(VarEntry {
                            name,
                            span,
                            used: false,
                            capture: false,
                        });
                    }
                }
                None
            }
            VarRole::NamedCapture => match self.visible_entry(name) {
                Some(entry) if !entry.capture => Some(
                    Diagnostic::warning(ErrorCode::W1007)
                        .with_message(format!("named capture conflicts a local variable - {text}"))
                        .with_label(span, ""),
                ),
                Some(_) => None,
                None => {
                    if let Some(frame) = self.frames.last_mut() {
                        frame.locals.push(VarEntry {
                            name,
                            span,
                            used: false,
                            capture: true,
                        });
                    }
                    None
                }
            },
            VarRole::Param | VarRole::BlockLocal => {
                let frame_kind = self.current_kind();
                let shadows = !frame_kind.is_gate()
                    && !underscore
                    && matches!(self.resolve(name), Resolution::Outer { .. });
                let frame = self.frames.last_mut()?;
                if let Some(first) = frame.params.iter().find(|entry| entry.name == name) {
                    if underscore {
                        return None;
                    }
                    return Some(
                        Diagnostic::error(ErrorCode::E1004)
                            .with_message("duplicated argument name")
                            .with_label(span, "")
                            .with_secondary_label(first.span, "first declared here"),
                    );
                }
                frame.params.push(VarEntry {
                    name,
                    span,
                    used: true,
                    capture: false,
                });
                shadows.then(|| {
                    Diagnostic::warning(ErrorCode::W1002)
                        .with_message(format!("shadowing outer local variable - {text}"))
                        .with_label(span, "")
                })
            }
        }
    }

    /// Find `name` in the current frame or its block chain.
    pub fn resolve(&self, name: Name) -> Resolution {
        let mut depth = 0;
        for frame in self.frames.iter().rev() {
            if frame.declares(name) {
                return if depth == 0 {
                    Resolution::Local
                } else {
                    Resolution::Outer { depth }
                };
            }
            if frame.kind.is_gate() {
                break;
            }
            depth += 1;
        }
        Resolution::Unresolved
    }

    /// The declaration `name` resolves to, if any.
    fn visible_entry(&self, name: Name) -> Option<&VarEntry> {
        for frame in self.frames.iter().rev() {
            if let Some(entry) = frame.entry(name) {
                return Some(entry);
            }
            if frame.kind.is_gate() {
                break;
            }
        }
        None
    }

    /// Record a read of `name`.
    pub fn mark_used(&mut self, name: Name) {
        for frame in self.frames.iter_mut().rev() {
            let gate = frame.kind.is_gate();
            if let Some(entry) = frame.entry_mut(name) {
                entry.used = true;
                return;
            }
            if gate {
                return;
            }
        }
    }

    /// The innermost block declared `|...|` parameters.
    pub fn set_explicit_params(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            frame.has_explicit_params = true;
        }
    }

    /// Reference to `_index` in the innermost frame.
    ///
    /// `Ok(false)` when the frame is not a block, where `_1` is an
    /// ordinary name.
    pub fn numbered_param(&mut self, index: u8, span: Span) -> Result<bool, Diagnostic> {
        let Some(frame) = self.frames.last() else {
            return Ok(false);
        };
        if frame.kind.is_gate() {
            return Ok(false);
        }
        if frame.has_explicit_params {
            return Err(Diagnostic::error(ErrorCode::E1007)
                .with_message("ordinary parameter is defined")
                .with_label(span, ""));
        }
        if frame.has_numbered_super {
            return Err(Diagnostic::error(ErrorCode::E1008)
                .with_message("numbered parameter is already used in outer block")
                .with_label(span, ""));
        }
        if frame.has_numbered_sub {
            return Err(Diagnostic::error(ErrorCode::E1008)
                .with_message("numbered parameter is already used in inner block")
                .with_label(span, ""));
        }
        let innermost = self.frames.len() - 1;
        for (i, frame) in self.frames.iter_mut().enumerate().rev() {
            if i == innermost {
                frame.numbered_arity = frame.numbered_arity.max(index);
                continue;
            }
            if frame.kind.is_gate() {
                break;
            }
            frame.has_numbered_sub = true;
        }
        Ok(true)
    }

    /// Implicit arity of the innermost block.
    pub fn numbered_arity(&self) -> u8 {
        self.frames.last().map_or(0, |frame| frame.numbered_arity)
    }

    /// Record anonymous parameters of the innermost method frame.
    pub fn add_forwarding(&mut self, flags: Forwarding) {
        if let Some(frame) = self.frames.iter_mut().rev().find(|f| f.kind.is_gate()) {
            frame.forwarding |= flags;
        }
    }

    /// Anonymous parameters visible from the current frame.
    pub fn forwarding(&self) -> Forwarding {
        self.frames
            .iter()
            .rev()
            .find(|f| f.kind.is_gate())
            .filter(|f| f.kind == ScopeKind::Method)
            .map_or(Forwarding::empty(), |f| f.forwarding)
    }
}

impl LocalLookup for ScopeTracker {
    fn is_local(&self, name: Name) -> bool {
        self.resolve(name) != Resolution::Unresolved
    }
}

fn unused_warnings(frame: &Frame, names: &dyn StringLookup) -> Vec<Diagnostic> {
    frame
        .locals
        .iter()
        .filter(|entry| !entry.used)
        .filter_map(|entry| {
            let text = names.lookup(entry.name);
            (!text.starts_with('_')).then(|| {
                Diagnostic::warning(ErrorCode::W1001)
                    .with_message(format!("assigned but unused variable - {text}"))
                    .with_label(entry.span, "")
            })
        })
        .collect()
}

#[cfg(test)]
mod tests;
