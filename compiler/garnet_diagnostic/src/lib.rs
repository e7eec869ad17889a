//! Diagnostic system for lexical, syntax and semantic reports.
//!
//! Every diagnostic carries:
//! - An error code for searchability
//! - A severity (fatal errors, recoverable errors, warnings)
//! - A message stating what went wrong
//! - A primary span and optional secondary labels
//!
//! Diagnostics are collected in a [`DiagnosticQueue`] and reported after
//! the parse completes. Rendering with line and column goes through a
//! [`LineOffsetTable`](span_utils::LineOffsetTable).

mod diagnostic;
mod error_code;
pub mod queue;
pub mod span_utils;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
