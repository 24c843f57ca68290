//! The lexer proper.
//!
//! A single scanning loop produces tokens on demand. Space, tab and
//! carriage return are skipped; `\n` is significant and becomes a
//! [`TokenKind::LineFeed`] token. A `#` starts a comment running to the
//! next line feed (the line feed itself is left to be lexed). Two-byte
//! operators are recognized maximally: `<=` is one token, never `<` `=`.
//! Past the end of the source every call yields an EOF token at the end
//! position.

use olangc_util::Span;

use crate::cursor::Cursor;
use crate::token::{Token, TokenKind};

pub struct Lexer<'src> {
    cursor: Cursor<'src>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    /// Lex the next token, advancing the cursor.
    pub fn next_token(&mut self) -> Token<'src> {
        self.skip_blanks_and_comments();

        let start = self.cursor.offset();
        let row = self.cursor.row();
        let bol = self.cursor.bol();

        let Some(byte) = self.cursor.current() else {
            return self.eof_token();
        };

        let kind = match byte {
            b'a'..=b'z' | b'A'..=b'Z' => self.lex_identifier(),
            b'0'..=b'9' => self.lex_number(),
            b'\n' => self.single(TokenKind::LineFeed),
            b'(' => self.single(TokenKind::OParen),
            b')' => self.single(TokenKind::CParen),
            b':' => self.single(TokenKind::Colon),
            b',' => self.single(TokenKind::Comma),
            b'{' => self.single(TokenKind::OCurly),
            b'}' => self.single(TokenKind::CCurly),
            b'+' => self.single(TokenKind::Plus),
            b'-' => self.single(TokenKind::Dash),
            b'*' => self.single(TokenKind::Star),
            b'/' => self.single(TokenKind::Slash),
            b'%' => self.single(TokenKind::Percent),
            b'~' => self.single(TokenKind::Tilde),
            b'^' => self.single(TokenKind::Caret),
            b'=' => self.one_or_two(b'=', TokenKind::Eq, TokenKind::EqEq),
            b'!' => self.one_or_two(b'=', TokenKind::Bang, TokenKind::BangEq),
            b'&' => self.one_or_two(b'&', TokenKind::Amp, TokenKind::AmpAmp),
            b'|' => self.one_or_two(b'|', TokenKind::Pipe, TokenKind::PipePipe),
            b'<' => self.angle(TokenKind::Lt, TokenKind::Le, TokenKind::Shl),
            b'>' => self.angle(TokenKind::Gt, TokenKind::Ge, TokenKind::Shr),
            _ => self.single(TokenKind::Unknown),
        };

        let text = self.cursor.slice_from(start);
        let span = Span::new(start, self.cursor.offset(), row + 1, (start - bol + 1) as u32);
        Token::new(kind, text, span)
    }

    /// One-token lookahead without advancing.
    pub fn peek(&mut self) -> Token<'src> {
        self.lookahead(1)
    }

    /// n-token lookahead without advancing, by cursor save/restore.
    pub fn lookahead(&mut self, n: usize) -> Token<'src> {
        let saved = self.cursor.snapshot();
        let mut token = self.next_token();
        for _ in 1..n {
            token = self.next_token();
        }
        self.cursor.restore(saved);
        token
    }

    /// The full source line a token sits on, without the trailing line
    /// feed. Derived from the token's column, so it needs no rescan state.
    pub fn line_of(&self, token: &Token<'_>) -> &'src str {
        let source = self.cursor.source();
        let bol = token.span.start - (token.span.column.max(1) as usize - 1);
        let rest = &source[bol..];
        match rest.find('\n') {
            Some(eol) => &rest[..eol],
            None => rest,
        }
    }

    fn skip_blanks_and_comments(&mut self) {
        loop {
            match self.cursor.current() {
                Some(b' ' | b'\t' | b'\r') => self.cursor.advance(),
                Some(b'#') => {
                    // Consume to the next line feed; the line feed itself
                    // is still a token.
                    while let Some(byte) = self.cursor.current() {
                        if byte == b'\n' {
                            break;
                        }
                        self.cursor.advance();
                    }
                }
                _ => return,
            }
        }
    }

    fn lex_identifier(&mut self) -> TokenKind {
        let start = self.cursor.offset();
        while let Some(byte) = self.cursor.current() {
            if !byte.is_ascii_alphanumeric() {
                break;
            }
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(start);
        TokenKind::keyword(text).unwrap_or(TokenKind::Identifier)
    }

    fn lex_number(&mut self) -> TokenKind {
        while let Some(byte) = self.cursor.current() {
            if !byte.is_ascii_digit() {
                break;
            }
            self.cursor.advance();
        }
        TokenKind::Number
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.cursor.advance();
        kind
    }

    /// `=`-style dispatch: `short` unless the next byte is `follow`.
    fn one_or_two(&mut self, follow: u8, short: TokenKind, long: TokenKind) -> TokenKind {
        self.cursor.advance();
        if self.cursor.current() == Some(follow) {
            self.cursor.advance();
            long
        } else {
            short
        }
    }

    /// `<` and `>` each have three outcomes: bare, `=`-suffixed, doubled.
    fn angle(&mut self, bare: TokenKind, eq: TokenKind, doubled: TokenKind) -> TokenKind {
        let first = self.cursor.current();
        self.cursor.advance();
        match self.cursor.current() {
            Some(b'=') => {
                self.cursor.advance();
                eq
            }
            second if second == first => {
                self.cursor.advance();
                doubled
            }
            _ => bare,
        }
    }

    fn eof_token(&self) -> Token<'src> {
        let offset = self.cursor.offset();
        let span = Span::new(
            offset,
            offset,
            self.cursor.row() + 1,
            (offset - self.cursor.bol() + 1) as u32,
        );
        Token::new(TokenKind::Eof, "", span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        let mut kinds = Vec::new();
        loop {
            let token = lexer.next_token();
            let kind = token.kind;
            kinds.push(kind);
            if kind == TokenKind::Eof {
                return kinds;
            }
        }
    }

    #[test]
    fn empty_source_is_one_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn eof_is_idempotent() {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.next_token().kind, TokenKind::Identifier);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        assert_eq!(lexer.peek().kind, TokenKind::Eof);
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            kinds("fn main var x return if else while whiles"),
            vec![
                TokenKind::Fn,
                TokenKind::Identifier,
                TokenKind::Var,
                TokenKind::Identifier,
                TokenKind::Return,
                TokenKind::If,
                TokenKind::Else,
                TokenKind::While,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn maximal_munch_two_byte_operators() {
        let cases = [
            ("==", TokenKind::EqEq),
            ("!=", TokenKind::BangEq),
            ("<=", TokenKind::Le),
            (">=", TokenKind::Ge),
            ("<<", TokenKind::Shl),
            (">>", TokenKind::Shr),
            ("&&", TokenKind::AmpAmp),
            ("||", TokenKind::PipePipe),
        ];
        for (source, expected) in cases {
            assert_eq!(kinds(source), vec![expected, TokenKind::Eof], "{source}");
        }
    }

    #[test]
    fn single_byte_operators_before_other_tokens() {
        assert_eq!(
            kinds("<x =1 !y &z |w"),
            vec![
                TokenKind::Lt,
                TokenKind::Identifier,
                TokenKind::Eq,
                TokenKind::Number,
                TokenKind::Bang,
                TokenKind::Identifier,
                TokenKind::Amp,
                TokenKind::Identifier,
                TokenKind::Pipe,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn line_feed_is_a_token_and_spaces_are_not() {
        assert_eq!(
            kinds("x \t\r\n  y"),
            vec![
                TokenKind::Identifier,
                TokenKind::LineFeed,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn comment_runs_to_line_feed() {
        assert_eq!(
            kinds("x # a comment = != while\ny"),
            vec![
                TokenKind::Identifier,
                TokenKind::LineFeed,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn comment_at_end_of_source() {
        assert_eq!(kinds("# trailing"), vec![TokenKind::Eof]);
    }

    #[test]
    fn unknown_bytes_are_single_tokens() {
        assert_eq!(
            kinds("x;y"),
            vec![
                TokenKind::Identifier,
                TokenKind::Unknown,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn token_texts_slice_the_source() {
        let mut lexer = Lexer::new("fact(n - 1)");
        assert_eq!(lexer.next_token().text, "fact");
        assert_eq!(lexer.next_token().text, "(");
        assert_eq!(lexer.next_token().text, "n");
        assert_eq!(lexer.next_token().text, "-");
        assert_eq!(lexer.next_token().text, "1");
        assert_eq!(lexer.next_token().text, ")");
        assert_eq!(lexer.next_token().text, "");
    }

    #[test]
    fn spans_carry_line_and_column() {
        let mut lexer = Lexer::new("fn main\n  var x");
        let fn_tok = lexer.next_token();
        assert_eq!((fn_tok.span.line, fn_tok.span.column), (1, 1));
        let main_tok = lexer.next_token();
        assert_eq!((main_tok.span.line, main_tok.span.column), (1, 4));
        lexer.next_token(); // line feed
        let var_tok = lexer.next_token();
        assert_eq!((var_tok.span.line, var_tok.span.column), (2, 3));
        let x_tok = lexer.next_token();
        assert_eq!((x_tok.span.line, x_tok.span.column), (2, 7));
    }

    #[test]
    fn peek_and_lookahead_do_not_advance() {
        let mut lexer = Lexer::new("var x : u32");
        assert_eq!(lexer.peek().kind, TokenKind::Var);
        assert_eq!(lexer.lookahead(2).kind, TokenKind::Identifier);
        assert_eq!(lexer.lookahead(3).kind, TokenKind::Colon);
        assert_eq!(lexer.lookahead(4).text, "u32");
        // The stream is untouched.
        assert_eq!(lexer.next_token().kind, TokenKind::Var);
        assert_eq!(lexer.next_token().text, "x");
    }

    #[test]
    fn lookahead_past_end_is_eof() {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.lookahead(10).kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().kind, TokenKind::Identifier);
    }

    #[test]
    fn line_of_returns_the_full_line() {
        let mut lexer = Lexer::new("fn main(): u32 {\nreturn 69\n}");
        let mut token = lexer.next_token();
        while token.text != "69" {
            token = lexer.next_token();
        }
        assert_eq!(lexer.line_of(&token), "return 69");
    }

    #[test]
    fn minimal_program_token_stream() {
        assert_eq!(
            kinds("fn main(): u32 { return 69 }"),
            vec![
                TokenKind::Fn,
                TokenKind::Identifier,
                TokenKind::OParen,
                TokenKind::CParen,
                TokenKind::Colon,
                TokenKind::Identifier,
                TokenKind::OCurly,
                TokenKind::Return,
                TokenKind::Number,
                TokenKind::CCurly,
                TokenKind::Eof,
            ]
        );
    }
}
