//! Token definitions.

use std::fmt;

use olangc_util::Span;

/// The kind of a lexed token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A byte the lexer does not recognize.
    Unknown,
    Identifier,
    Number,

    // Keywords.
    Fn,
    Return,
    If,
    Else,
    While,
    Var,

    /// `\n` terminates statements and is therefore a token of its own.
    LineFeed,

    // Punctuators and operators.
    OParen,
    CParen,
    Colon,
    Comma,
    OCurly,
    CCurly,
    Plus,
    Dash,
    Star,
    Slash,
    Percent,
    Tilde,
    Eq,
    EqEq,
    Bang,
    BangEq,
    Lt,
    Gt,
    Le,
    Ge,
    Shl,
    Shr,
    Caret,
    Pipe,
    PipePipe,
    Amp,
    AmpAmp,

    Eof,
}

impl TokenKind {
    /// The fixed name used by `--dump-tokens` and in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Unknown => "unknown",
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::Fn => "fn",
            TokenKind::Return => "return",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::Var => "var",
            TokenKind::LineFeed => "line_feed",
            TokenKind::OParen => "(",
            TokenKind::CParen => ")",
            TokenKind::Colon => ":",
            TokenKind::Comma => "comma",
            TokenKind::OCurly => "{",
            TokenKind::CCurly => "}",
            TokenKind::Plus => "+",
            TokenKind::Dash => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Tilde => "~",
            TokenKind::Eq => "=",
            TokenKind::EqEq => "==",
            TokenKind::Bang => "!",
            TokenKind::BangEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Le => "<=",
            TokenKind::Ge => ">=",
            TokenKind::Shl => "<<",
            TokenKind::Shr => ">>",
            TokenKind::Caret => "^",
            TokenKind::Pipe => "|",
            TokenKind::PipePipe => "||",
            TokenKind::Amp => "&",
            TokenKind::AmpAmp => "&&",
            TokenKind::Eof => "EOF",
        }
    }

    /// True for tokens that can appear as an infix binary operator.
    pub fn is_binary_op(self) -> bool {
        matches!(
            self,
            TokenKind::Plus
                | TokenKind::Dash
                | TokenKind::Star
                | TokenKind::Slash
                | TokenKind::Percent
                | TokenKind::Shl
                | TokenKind::Shr
                | TokenKind::Lt
                | TokenKind::Le
                | TokenKind::Gt
                | TokenKind::Ge
                | TokenKind::EqEq
                | TokenKind::BangEq
                | TokenKind::Amp
                | TokenKind::Caret
                | TokenKind::Pipe
                | TokenKind::AmpAmp
                | TokenKind::PipePipe
        )
    }

    /// Keyword lookup for identifier-shaped lexemes.
    pub fn keyword(text: &str) -> Option<TokenKind> {
        match text {
            "fn" => Some(TokenKind::Fn),
            "return" => Some(TokenKind::Return),
            "if" => Some(TokenKind::If),
            "else" => Some(TokenKind::Else),
            "while" => Some(TokenKind::While),
            "var" => Some(TokenKind::Var),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lexed token: kind, the source text it covers (empty for EOF), and
/// its location.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
    pub span: Span,
}

impl<'src> Token<'src> {
    pub fn new(kind: TokenKind, text: &'src str, span: Span) -> Self {
        Self { kind, text, span }
    }

    /// The text shown inside quotes in diagnostics. Tokens whose text is
    /// invisible (line feeds) or empty (EOF) fall back to the kind name.
    pub fn display_text(&self) -> &str {
        match self.kind {
            TokenKind::LineFeed | TokenKind::Eof => self.kind.as_str(),
            _ => self.text,
        }
    }
}
