//! Garnet - a Ruby-grammar front-end
//!
//! Turns source text into a tagged-variant tree plus diagnostics. One call
//! is one session: the scanner, scope tracker and node builder live for the
//! duration of the parse and hand their results to [`ParseOutput`].
//!
//! # Architecture
//!
//! ```text
//! LineSource (str, BufRead, closure)
//!     │
//!     ▼
//! garnet_lexer::Lexer ◄──── lexer state, locals ────┐
//!     │                                             │
//!     ▼                                             │
//! garnet_parse::Parser ─────────────────────────────┘
//!     │
//!     ▼
//! AstSink (tree, or tree + EventListener) ──► ParseOutput
//! ```

mod options;
mod output;

pub use options::ParseOptions;
pub use output::ParseOutput;

pub use garnet_diagnostic::{Diagnostic, ErrorCode, Severity};
pub use garnet_ir::{
    Node, NodeArena, NodeId, NodeKind, Span, StringInterner, StringLookup, Token,
};
pub use garnet_lexer::{LineSource, MagicSettings, ReaderLines, ShareablePolicy, StrLines};
pub use garnet_parse::EventListener;

use garnet_lexer::Lexer;
use garnet_parse::{AstSink, EventSink, Parser, TreeSink};
use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call more than once. Enable with `RUST_LOG=garnet_parse=debug`
/// or `RUST_LOG=garnet_lexer=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

/// Parse an in-memory source.
pub fn parse_str(source: &str, options: ParseOptions) -> ParseOutput {
    parse_lines(StrLines::new(source), options)
}

/// Parse a source pulled line by line.
pub fn parse_lines<'src>(source: impl LineSource + 'src, options: ParseOptions) -> ParseOutput {
    let (config, shareable, listener, file_name) = options.into_parts();
    let _span = tracing::debug_span!("parse", file = %file_name).entered();

    let mut lexer = Lexer::with_max_nesting(source, config.max_nesting);
    lexer.magic_mut().shareable_constant_value = shareable;
    let sink: Box<dyn AstSink> = match listener {
        Some(listener) => Box::new(EventSink::new(listener)),
        None => Box::new(TreeSink::new()),
    };
    let program = Parser::new(lexer, config, sink).parse_program();
    ParseOutput::new(program, file_name)
}

#[cfg(test)]
mod tests;
