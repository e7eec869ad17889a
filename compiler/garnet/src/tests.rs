use super::*;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;

#[test]
fn test_default_options_match_parser_defaults() {
    let (config, shareable, listener, file_name) = ParseOptions::default().into_parts();
    assert_eq!(config, garnet_parse::ParserConfig::default());
    assert_eq!(shareable, ShareablePolicy::None);
    assert!(listener.is_none());
    assert_eq!(file_name, "-");
}

#[test]
fn test_options_debug_hides_listener() {
    struct Silent;
    impl EventListener for Silent {
        fn on_token(&mut self, _token: &Token) {}
        fn on_node(&mut self, _node: &Node) {}
    }

    let options = ParseOptions::new("a.rb").with_event_listener(Box::new(Silent));
    let debug = format!("{options:?}");
    assert!(debug.contains("file_name: \"a.rb\""));
    assert!(debug.contains("event_listener: true"));
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
}

#[test]
fn test_options_reach_the_parser() {
    let options = ParseOptions {
        frozen_string_literal: true,
        line_offset: 5,
        ..ParseOptions::default()
    };
    let output = parse_str("\"a\"\n__LINE__", options);
    assert_eq!(
        output.sexp().as_deref(),
        Some(r#"(stmts (str "a" frozen) (__LINE__ 6))"#)
    );
}

#[test]
fn test_shareable_option_is_default_until_a_comment_changes_it() {
    let options = ParseOptions {
        shareable_constant_value: ShareablePolicy::Literal,
        ..ParseOptions::default()
    };
    let output = parse_str("A = foo", options);
    assert_eq!(
        output.sexp().as_deref(),
        Some("(stmts (casgn A (ensure_shareable (vcall foo))))")
    );

    let options = ParseOptions {
        shareable_constant_value: ShareablePolicy::Literal,
        ..ParseOptions::default()
    };
    let output = parse_str("# shareable_constant_value: none\nA = foo", options);
    assert_eq!(output.magic.shareable_constant_value, ShareablePolicy::None);
    assert_eq!(output.sexp().as_deref(), Some("(stmts (casgn A (vcall foo)))"));
}

static SCOPE_EVENTS: AtomicUsize = AtomicUsize::new(0);

/// Counts `scope pushed` events seen on the current thread.
struct ScopeEvents;

struct Message(String);

impl Visit for Message {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: tracing::Subscriber> Layer<S> for ScopeEvents {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut message = Message(String::new());
        event.record(&mut message);
        if message.0 == "scope pushed" {
            SCOPE_EVENTS.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[test]
fn test_each_scope_is_traced_once() {
    let subscriber = tracing_subscriber::registry().with(ScopeEvents);
    let output = tracing::subscriber::with_default(subscriber, || {
        parse_str(
            "class A\n  def m\n    [1].each { |x| x }\n  end\nend",
            ParseOptions::default(),
        )
    });
    assert!(output.is_valid());
    assert_eq!(SCOPE_EVENTS.load(Ordering::Relaxed), 3);
}
