//! Diagnostic queue for collecting, deduplicating, and sorting diagnostics.
//!
//! Features:
//! - Syntax error limit so a hopeless parse stops early
//! - Deduplication of syntax errors reported at the same position
//! - Stable ordering by source position on flush

use garnet_ir::Span;

use crate::{Diagnostic, ErrorCode, Severity};

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of syntax errors before the parse aborts (0 = unlimited).
    pub syntax_error_limit: usize,
    /// Drop a syntax error reported at the same offset as the previous one.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            syntax_error_limit: 20,
            deduplicate: true,
        }
    }
}

/// Queue for collecting diagnostics during one parse.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    syntax_error_count: usize,
    /// Offset of the last syntax error (for dedup).
    last_syntax_offset: Option<u32>,
    has_fatal: bool,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            config,
            ..Self::default()
        }
    }

    /// Add a diagnostic. Returns `false` if it was dropped.
    ///
    /// Fatal diagnostics are never dropped, so the abort report itself
    /// always lands.
    pub fn push(&mut self, diag: Diagnostic) -> bool {
        if diag.code.is_syntax_error() && !diag.is_fatal() {
            let offset = diag.primary_span().map(|s| s.start);
            if self.config.deduplicate && offset.is_some() && offset == self.last_syntax_offset {
                return false;
            }
            if self.syntax_limit_reached() {
                return false;
            }
            self.last_syntax_offset = offset;
            self.syntax_error_count += 1;
        }
        if diag.is_error() {
            self.error_count += 1;
        }
        if diag.severity == Severity::Fatal {
            self.has_fatal = true;
        }
        self.diagnostics.push(diag);
        true
    }

    pub fn syntax_limit_reached(&self) -> bool {
        self.config.syntax_error_limit > 0
            && self.syntax_error_count >= self.config.syntax_error_limit
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn syntax_error_count(&self) -> usize {
        self.syntax_error_count
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn has_fatal(&self) -> bool {
        self.has_fatal
    }

    pub fn peek(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Drain all diagnostics, sorted by primary span start.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let mut out: Vec<Diagnostic> = self.diagnostics.drain(..).collect();
        out.sort_by_key(|d| d.primary_span().map_or(0, |s| s.start));
        self.error_count = 0;
        self.syntax_error_count = 0;
        self.last_syntax_offset = None;
        self.has_fatal = false;
        out
    }
}

#[cold]
pub fn too_many_errors(limit: usize, span: Span) -> Diagnostic {
    Diagnostic::fatal(ErrorCode::E1002)
        .with_message(format!("aborting after {limit} syntax errors"))
        .with_label(span, "error limit reached here")
}
