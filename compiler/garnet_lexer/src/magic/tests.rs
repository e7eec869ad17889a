use super::*;
use pretty_assertions::assert_eq;

const TOP: CommentPosition = CommentPosition {
    at_top: true,
    comment_only: true,
    token_seen: false,
};

fn pair(k: &str, v: &str) -> (String, String) {
    (k.to_owned(), v.to_owned())
}

#[test]
fn test_plain_pair() {
    assert_eq!(
        parse_pairs(b" frozen_string_literal: true"),
        Some(vec![pair("frozen_string_literal", "true")])
    );
}

#[test]
fn test_emacs_block_with_several_pairs() {
    assert_eq!(
        parse_pairs(b" -*- coding: utf-8; Frozen-String-Literal: false -*-"),
        Some(vec![pair("coding", "utf-8"), pair("frozen_string_literal", "false")])
    );
}

#[test]
fn test_trailing_text_is_not_magic() {
    assert_eq!(parse_pairs(b" frozen_string_literal: true and more"), None);
    assert_eq!(parse_pairs(b" just a comment"), None);
}

#[test]
fn test_vim_style_encoding() {
    assert_eq!(vim_encoding(b" vim: set fileencoding=utf-8 :"), Some("utf-8".into()));
    assert_eq!(vim_encoding(b" nothing here"), None);
}

#[test]
fn test_apply_settings() {
    let mut magic = MagicSettings::default();
    let diags = magic.apply_comment(b" frozen_string_literal: true", TOP, Span::DUMMY);
    assert!(diags.is_empty());
    assert_eq!(magic.frozen_string_literal, Some(true));

    let diags = magic.apply_comment(b" shareable_constant_value: literal", TOP, Span::DUMMY);
    assert!(diags.is_empty());
    assert_eq!(magic.shareable_constant_value, ShareablePolicy::Literal);
}

#[test]
fn test_invalid_value_warns() {
    let mut magic = MagicSettings::default();
    let diags = magic.apply_comment(b" frozen_string_literal: maybe", TOP, Span::DUMMY);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].message, "invalid value for frozen_string_literal: maybe");
    assert_eq!(magic.frozen_string_literal, None);
}

#[test]
fn test_position_rules() {
    let mut magic = MagicSettings::default();
    let late = CommentPosition {
        at_top: false,
        comment_only: false,
        token_seen: true,
    };
    let diags = magic.apply_comment(b" frozen_string_literal: true", late, Span::DUMMY);
    assert_eq!(diags[0].message, "`frozen_string_literal' is ignored after any tokens");
    let diags = magic.apply_comment(b" coding: us-ascii", late, Span::DUMMY);
    assert!(diags.is_empty());
    assert_eq!(magic.encoding, SourceEncoding::Utf8);
    let diags = magic.apply_comment(b" shareable_constant_value: literal", late, Span::DUMMY);
    assert_eq!(diags.len(), 1);
}

#[test]
fn test_unknown_encoding_is_error() {
    let mut magic = MagicSettings::default();
    let diags = magic.apply_comment(b" -*- coding: klingon -*-", TOP, Span::DUMMY);
    assert_eq!(diags.len(), 1);
    assert!(diags[0].is_error());
    assert!(!diags[0].is_fatal());
}
