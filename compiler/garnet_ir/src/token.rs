//! Token types produced by the scanner.
//!
//! `TokenKind` is a plain tag so the parser can build constant
//! `TokenSet`s over it; the semantic payload lives in [`TokenValue`].

use super::{Name, Span};
use bitflags::bitflags;
use std::fmt;

/// A token with its payload and span.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub value: TokenValue,
    pub span: Span,
    /// Whitespace (or a comment) immediately preceded the token.
    pub space_before: bool,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, value: TokenValue, span: Span) -> Self {
        Token {
            kind,
            value,
            span,
            space_before: false,
        }
    }

    #[inline]
    pub fn simple(kind: TokenKind, span: Span) -> Self {
        Token::new(kind, TokenValue::None, span)
    }

    /// Identifier-like payload, if any.
    pub fn name(&self) -> Option<Name> {
        match self.value {
            TokenValue::Name(name) | TokenValue::OpAssign(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if !matches!(self.value, TokenValue::None) {
            write!(f, "({:?})", self.value)?;
        }
        write!(f, " @ {}", self.span)
    }
}

/// Semantic value carried by a token.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum TokenValue {
    #[default]
    None,
    /// Identifier, constant, variable, label or symbol text.
    Name(Name),
    /// Decoded string fragment or character literal.
    Str(Vec<u8>),
    Number(NumericValue),
    RegexpEnd(RegexOptions),
    /// Closing token of a `<<~` heredoc: width of the common indentation.
    Dedent(u32),
    NthRef(u32),
    BackRef(u8),
    /// Operator name of an `op=` token, e.g. `+` for `+=`.
    OpAssign(Name),
}

/// Numeric literal value, folded at scan time.
///
/// Floats are stored as bits so the AST keeps `Eq` and `Hash`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum NumericValue {
    Integer(i64),
    /// Integer that does not fit in 64 bits; digits are in `radix`.
    BigInteger {
        negative: bool,
        radix: u32,
        digits: String,
    },
    Float(u64),
    Rational { numerator: i64, denominator: i64 },
    Imaginary(Box<NumericValue>),
}

impl NumericValue {
    pub fn float(value: f64) -> Self {
        NumericValue::Float(value.to_bits())
    }

    /// Arithmetic negation, used to fold `-1` style literals.
    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            NumericValue::Integer(v) => match v.checked_neg() {
                Some(n) => NumericValue::Integer(n),
                None => NumericValue::BigInteger {
                    negative: false,
                    radix: 10,
                    digits: v.unsigned_abs().to_string(),
                },
            },
            NumericValue::BigInteger {
                negative,
                radix,
                digits,
            } => NumericValue::BigInteger {
                negative: !negative,
                radix,
                digits,
            },
            NumericValue::Float(bits) => NumericValue::float(-f64::from_bits(bits)),
            NumericValue::Rational {
                numerator,
                denominator,
            } => NumericValue::Rational {
                numerator: numerator.saturating_neg(),
                denominator,
            },
            NumericValue::Imaginary(inner) => NumericValue::Imaginary(Box::new(inner.negate())),
        }
    }
}

impl fmt::Display for NumericValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericValue::Integer(v) => write!(f, "{v}"),
            NumericValue::BigInteger {
                negative,
                radix,
                digits,
            } => {
                let sign = if *negative { "-" } else { "" };
                match radix {
                    16 => write!(f, "{sign}0x{digits}"),
                    8 => write!(f, "{sign}0o{digits}"),
                    2 => write!(f, "{sign}0b{digits}"),
                    _ => write!(f, "{sign}{digits}"),
                }
            }
            NumericValue::Float(bits) => write!(f, "{:?}", f64::from_bits(*bits)),
            NumericValue::Rational {
                numerator,
                denominator,
            } => write!(f, "({numerator}/{denominator})"),
            NumericValue::Imaginary(inner) => write!(f, "{inner}i"),
        }
    }
}

bitflags! {
    /// Regexp option letters following the closing delimiter.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct RegexOptions: u16 {
        const IGNORECASE = 1 << 0;
        const EXTENDED = 1 << 1;
        const MULTILINE = 1 << 2;
        const ONCE = 1 << 3;
        const FIXED_EUC = 1 << 4;
        const FIXED_SJIS = 1 << 5;
        const FIXED_UTF8 = 1 << 6;
        const NO_ENCODING = 1 << 7;
    }
}

impl RegexOptions {
    /// Map one option letter, `None` for an unknown letter.
    pub fn from_letter(c: u8) -> Option<Self> {
        Some(match c {
            b'i' => RegexOptions::IGNORECASE,
            b'x' => RegexOptions::EXTENDED,
            b'm' => RegexOptions::MULTILINE,
            b'o' => RegexOptions::ONCE,
            b'e' => RegexOptions::FIXED_EUC,
            b's' => RegexOptions::FIXED_SJIS,
            b'u' => RegexOptions::FIXED_UTF8,
            b'n' => RegexOptions::NO_ENCODING,
            _ => return None,
        })
    }

    /// Option letters in canonical order.
    pub fn letters(self) -> String {
        let mut out = String::new();
        for (flag, c) in [
            (RegexOptions::MULTILINE, 'm'),
            (RegexOptions::IGNORECASE, 'i'),
            (RegexOptions::EXTENDED, 'x'),
            (RegexOptions::ONCE, 'o'),
            (RegexOptions::FIXED_EUC, 'e'),
            (RegexOptions::FIXED_SJIS, 's'),
            (RegexOptions::FIXED_UTF8, 'u'),
            (RegexOptions::NO_ENCODING, 'n'),
        ] {
            if self.contains(flag) {
                out.push(c);
            }
        }
        out
    }

    /// At most one encoding letter may be given.
    pub fn has_conflicting_encoding(self) -> bool {
        let encodings = self
            & (RegexOptions::FIXED_EUC
                | RegexOptions::FIXED_SJIS
                | RegexOptions::FIXED_UTF8
                | RegexOptions::NO_ENCODING);
        encodings.bits().count_ones() > 1
    }
}

macro_rules! token_kinds {
    ($($variant:ident => $display:expr,)*) => {
        /// Token tags.
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
        #[repr(u8)]
        pub enum TokenKind {
            $($variant,)*
        }

        impl TokenKind {
            pub const ALL: &'static [TokenKind] = &[$(TokenKind::$variant,)*];

            /// Human-readable name used in syntax error messages.
            pub const fn display_name(self) -> &'static str {
                match self {
                    $(TokenKind::$variant => $display,)*
                }
            }
        }
    };
}

token_kinds! {
    // Names and simple literals
    Ident => "local variable or method",
    LocalIdent => "local variable",
    FIdent => "method",
    Const => "constant",
    IVar => "instance variable",
    CVar => "class variable",
    GVar => "global variable",
    NthRef => "numbered reference",
    BackRef => "back reference",
    Label => "label",
    Numeric => "numeric literal",
    Char => "character literal",
    Symbol => "symbol literal",

    // Literal engine
    StringBeg => "string literal",
    XStringBeg => "backtick literal",
    RegexpBeg => "regexp literal",
    SymBeg => "symbol literal",
    WordsBeg => "word list",
    QWordsBeg => "verbatim word list",
    SymbolsBeg => "symbol list",
    QSymbolsBeg => "verbatim symbol list",
    StringContent => "literal content",
    StringDBeg => "tSTRING_DBEG",
    StringDVar => "tSTRING_DVAR",
    StringDEnd => "'}'",
    StringEnd => "terminator",
    LabelEnd => "label terminator",
    WordSep => "word separator",
    RegexpEnd => "regexp terminator",

    // Keywords
    KwClass => "`class'",
    KwModule => "`module'",
    KwDef => "`def'",
    KwUndef => "`undef'",
    KwBegin => "`begin'",
    KwRescue => "`rescue'",
    KwEnsure => "`ensure'",
    KwEnd => "`end'",
    KwIf => "`if'",
    KwUnless => "`unless'",
    KwThen => "`then'",
    KwElsif => "`elsif'",
    KwElse => "`else'",
    KwCase => "`case'",
    KwWhen => "`when'",
    KwWhile => "`while'",
    KwUntil => "`until'",
    KwFor => "`for'",
    KwBreak => "`break'",
    KwNext => "`next'",
    KwRedo => "`redo'",
    KwRetry => "`retry'",
    KwIn => "`in'",
    KwDo => "`do'",
    KwDoCond => "`do' for condition",
    KwDoBlock => "`do' for block",
    KwDoLambda => "`do' for lambda",
    KwReturn => "`return'",
    KwYield => "`yield'",
    KwSuper => "`super'",
    KwSelf => "`self'",
    KwNil => "`nil'",
    KwTrue => "`true'",
    KwFalse => "`false'",
    KwAnd => "`and'",
    KwOr => "`or'",
    KwNot => "`not'",
    KwIfMod => "`if' modifier",
    KwUnlessMod => "`unless' modifier",
    KwWhileMod => "`while' modifier",
    KwUntilMod => "`until' modifier",
    KwRescueMod => "`rescue' modifier",
    KwAlias => "`alias'",
    KwDefined => "`defined?'",
    KwUpperBegin => "`BEGIN'",
    KwUpperEnd => "`END'",
    KwLine => "`__LINE__'",
    KwFile => "`__FILE__'",
    KwEncoding => "`__ENCODING__'",

    // Operators
    Plus => "'+'",
    Minus => "'-'",
    Star => "'*'",
    Pow => "**",
    Slash => "'/'",
    Percent => "'%'",
    UPlus => "unary+",
    UMinus => "unary-",
    UMinusNum => "unary- before a number",
    Splat => "*",
    DSplat => "**arg",
    Amper => "'&'",
    BlockAmper => "&",
    Pipe => "'|'",
    Caret => "'^'",
    Tilde => "'~'",
    Bang => "'!'",
    Lt => "'<'",
    Gt => "'>'",
    Le => "<=",
    Ge => ">=",
    Cmp => "<=>",
    Eq => "==",
    Eqq => "===",
    Neq => "!=",
    Match => "=~",
    NMatch => "!~",
    AndOp => "&&",
    OrOp => "||",
    LShift => "<<",
    RShift => ">>",
    Dot => "'.'",
    AndDot => "&.",
    Colon2 => "::",
    Colon3 => ":: at EXPR_BEG",
    Dot2 => "..",
    Dot3 => "...",
    BDot2 => "(..",
    BDot3 => "(...",
    Assoc => "=>",
    Arrow => "->",
    Assign => "'='",
    OpAssign => "operator-assignment",
    Question => "'?'",
    Colon => "':'",
    Comma => "','",
    Semi => "';'",
    Newline => "'\\n'",
    LParen => "'('",
    LParenCall => "'(' for arguments",
    LParenArg => "( arg",
    RParen => "')'",
    LBracket => "'['",
    LBracketIndex => "'[' for index",
    RBracket => "']'",
    Aref => "[]",
    Aset => "[]=",
    LBrace => "'{'",
    LBraceBlock => "'{' for block",
    LBraceArg => "{ arg",
    LambdaBeg => "tLAMBEG",
    RBrace => "'}'",
    Eof => "end-of-input",
}

impl TokenKind {
    /// Bit index used by token sets.
    #[inline]
    pub const fn discriminant_index(self) -> u8 {
        self as u8
    }

    /// Tokens whose text is a reserved word.
    pub fn is_keyword(self) -> bool {
        (TokenKind::KwClass as u8..=TokenKind::KwEncoding as u8).contains(&(self as u8))
    }

    /// Tokens that may name an operator method (`def +`, `alias <=> cmp`).
    pub fn operator_method_name(self) -> Option<&'static str> {
        Some(match self {
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star | TokenKind::Splat => "*",
            TokenKind::Pow | TokenKind::DSplat => "**",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::UPlus => "+@",
            TokenKind::UMinus | TokenKind::UMinusNum => "-@",
            TokenKind::Amper | TokenKind::BlockAmper => "&",
            TokenKind::Pipe => "|",
            TokenKind::Caret => "^",
            TokenKind::Tilde => "~",
            TokenKind::Bang => "!",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Le => "<=",
            TokenKind::Ge => ">=",
            TokenKind::Cmp => "<=>",
            TokenKind::Eq => "==",
            TokenKind::Eqq => "===",
            TokenKind::Neq => "!=",
            TokenKind::Match => "=~",
            TokenKind::NMatch => "!~",
            TokenKind::LShift => "<<",
            TokenKind::RShift => ">>",
            TokenKind::Aref => "[]",
            TokenKind::Aset => "[]=",
            _ => return None,
        })
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
