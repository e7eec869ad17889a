//! Per-session settings.

use garnet_lexer::ShareablePolicy;
use garnet_parse::{EventListener, ParserConfig};
use std::fmt;

/// Settings for one parse. Magic comments in the source override
/// `frozen_string_literal` and `shareable_constant_value`.
pub struct ParseOptions {
    /// Name used when rendering diagnostics.
    pub file_name: String,
    /// Number of the first line.
    pub line_offset: u32,
    pub frozen_string_literal: bool,
    pub shareable_constant_value: ShareablePolicy,
    /// Limit on nested constructs before the parse fails.
    pub max_nesting: u32,
    /// Syntax errors before the parse aborts; 0 means unlimited.
    pub syntax_error_limit: usize,
    pub warn_unused: bool,
    /// Receives every token and node as the parse produces them.
    pub event_listener: Option<Box<dyn EventListener>>,
}

impl ParseOptions {
    pub fn new(file_name: impl Into<String>) -> Self {
        ParseOptions {
            file_name: file_name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_event_listener(mut self, listener: Box<dyn EventListener>) -> Self {
        self.event_listener = Some(listener);
        self
    }

    pub(crate) fn into_parts(
        self,
    ) -> (ParserConfig, ShareablePolicy, Option<Box<dyn EventListener>>, String) {
        let config = ParserConfig {
            frozen_string_literal: self.frozen_string_literal,
            syntax_error_limit: self.syntax_error_limit,
            warn_unused: self.warn_unused,
            line_offset: self.line_offset,
            max_nesting: self.max_nesting,
        };
        (
            config,
            self.shareable_constant_value,
            self.event_listener,
            self.file_name,
        )
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        let config = ParserConfig::default();
        ParseOptions {
            file_name: "-".to_string(),
            line_offset: config.line_offset,
            frozen_string_literal: config.frozen_string_literal,
            shareable_constant_value: ShareablePolicy::default(),
            max_nesting: config.max_nesting,
            syntax_error_limit: config.syntax_error_limit,
            warn_unused: config.warn_unused,
            event_listener: None,
        }
    }
}

impl fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field("file_name", &self.file_name)
            .field("line_offset", &self.line_offset)
            .field("frozen_string_literal", &self.frozen_string_literal)
            .field("shareable_constant_value", &self.shareable_constant_value)
            .field("max_nesting", &self.max_nesting)
            .field("syntax_error_limit", &self.syntax_error_limit)
            .field("warn_unused", &self.warn_unused)
            .field("event_listener", &self.event_listener.is_some())
            .finish()
    }
}
