//! Reserved word table.
//!
//! Each reserved word carries two grammar symbols: the one used where an
//! expression starts and the one used in modifier position (`x if y`).
//! Only `if`, `unless`, `while`, `until` and `rescue` differ. The state
//! is the lexer state that follows the keyword.

use garnet_ir::TokenKind;

use crate::state::LexState;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Keyword {
    pub value: TokenKind,
    pub modifier: TokenKind,
    pub state: LexState,
}

const fn kw(token: TokenKind, state: LexState) -> Keyword {
    Keyword {
        value: token,
        modifier: token,
        state,
    }
}

const fn kw_mod(token: TokenKind, modifier: TokenKind, state: LexState) -> Keyword {
    Keyword {
        value: token,
        modifier,
        state,
    }
}

const BEG: LexState = LexState::BEG;
const END: LexState = LexState::END;
const MID: LexState = LexState::MID;
const ARG: LexState = LexState::ARG;
const FNAME_FITEM: LexState = LexState::FNAME.union(LexState::FITEM);

/// Look up a reserved word by its exact text.
///
/// Length-bucketed: reserved words are 2 to 12 bytes long.
pub fn lookup(text: &[u8]) -> Option<Keyword> {
    use TokenKind as T;
    let len = text.len();
    if !(2..=12).contains(&len) {
        return None;
    }
    let keyword = match len {
        2 => match text {
            b"do" => kw(T::KwDo, BEG),
            b"if" => kw_mod(T::KwIf, T::KwIfMod, BEG),
            b"in" => kw(T::KwIn, BEG),
            b"or" => kw(T::KwOr, BEG),
            _ => return None,
        },
        3 => match text {
            b"and" => kw(T::KwAnd, BEG),
            b"def" => kw(T::KwDef, LexState::FNAME),
            b"end" => kw(T::KwEnd, END),
            b"END" => kw(T::KwUpperEnd, END),
            b"for" => kw(T::KwFor, BEG),
            b"nil" => kw(T::KwNil, END),
            b"not" => kw(T::KwNot, ARG),
            _ => return None,
        },
        4 => match text {
            b"case" => kw(T::KwCase, BEG),
            b"else" => kw(T::KwElse, BEG),
            b"next" => kw(T::KwNext, MID),
            b"redo" => kw(T::KwRedo, END),
            b"self" => kw(T::KwSelf, END),
            b"then" => kw(T::KwThen, BEG),
            b"true" => kw(T::KwTrue, END),
            b"when" => kw(T::KwWhen, BEG),
            _ => return None,
        },
        5 => match text {
            b"alias" => kw(T::KwAlias, FNAME_FITEM),
            b"begin" => kw(T::KwBegin, BEG),
            b"BEGIN" => kw(T::KwUpperBegin, END),
            b"break" => kw(T::KwBreak, MID),
            b"class" => kw(T::KwClass, LexState::CLASS),
            b"elsif" => kw(T::KwElsif, BEG),
            b"false" => kw(T::KwFalse, END),
            b"retry" => kw(T::KwRetry, END),
            b"super" => kw(T::KwSuper, ARG),
            b"undef" => kw(T::KwUndef, FNAME_FITEM),
            b"until" => kw_mod(T::KwUntil, T::KwUntilMod, BEG),
            b"while" => kw_mod(T::KwWhile, T::KwWhileMod, BEG),
            b"yield" => kw(T::KwYield, ARG),
            _ => return None,
        },
        6 => match text {
            b"ensure" => kw(T::KwEnsure, BEG),
            b"module" => kw(T::KwModule, BEG),
            b"rescue" => kw_mod(T::KwRescue, T::KwRescueMod, MID),
            b"return" => kw(T::KwReturn, MID),
            b"unless" => kw_mod(T::KwUnless, T::KwUnlessMod, BEG),
            _ => return None,
        },
        8 => match text {
            b"defined?" => kw(T::KwDefined, ARG),
            b"__LINE__" => kw(T::KwLine, END),
            b"__FILE__" => kw(T::KwFile, END),
            _ => return None,
        },
        12 => match text {
            b"__ENCODING__" => kw(T::KwEncoding, END),
            _ => return None,
        },
        _ => return None,
    };
    Some(keyword)
}

/// Source text of a keyword token, for keyword-named methods and symbols.
pub fn text_of(kind: TokenKind) -> Option<&'static str> {
    use TokenKind as T;
    Some(match kind {
        T::KwClass => "class",
        T::KwModule => "module",
        T::KwDef => "def",
        T::KwUndef => "undef",
        T::KwBegin => "begin",
        T::KwRescue | T::KwRescueMod => "rescue",
        T::KwEnsure => "ensure",
        T::KwEnd => "end",
        T::KwIf | T::KwIfMod => "if",
        T::KwUnless | T::KwUnlessMod => "unless",
        T::KwThen => "then",
        T::KwElsif => "elsif",
        T::KwElse => "else",
        T::KwCase => "case",
        T::KwWhen => "when",
        T::KwWhile | T::KwWhileMod => "while",
        T::KwUntil | T::KwUntilMod => "until",
        T::KwFor => "for",
        T::KwBreak => "break",
        T::KwNext => "next",
        T::KwRedo => "redo",
        T::KwRetry => "retry",
        T::KwIn => "in",
        T::KwDo | T::KwDoCond | T::KwDoBlock | T::KwDoLambda => "do",
        T::KwReturn => "return",
        T::KwYield => "yield",
        T::KwSuper => "super",
        T::KwSelf => "self",
        T::KwNil => "nil",
        T::KwTrue => "true",
        T::KwFalse => "false",
        T::KwAnd => "and",
        T::KwOr => "or",
        T::KwNot => "not",
        T::KwAlias => "alias",
        T::KwDefined => "defined?",
        T::KwUpperBegin => "BEGIN",
        T::KwUpperEnd => "END",
        T::KwLine => "__LINE__",
        T::KwFile => "__FILE__",
        T::KwEncoding => "__ENCODING__",
        _ => return None,
    })
}
