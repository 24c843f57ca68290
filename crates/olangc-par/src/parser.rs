//! Parser state and token-level helpers.

use olangc_lex::{Lexer, Token, TokenKind};
use olangc_util::Handler;

use crate::ast::TranslationUnit;

/// Marker for an already-reported syntax error. The diagnostic itself
/// lives in the [`Handler`]; callers just unwind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyntaxError;

pub struct Parser<'src> {
    pub(crate) lexer: Lexer<'src>,
    pub(crate) handler: &'src Handler,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, handler: &'src Handler) -> Self {
        Self {
            lexer: Lexer::new(source),
            handler,
        }
    }

    /// Parse a whole source file.
    pub fn parse(source: &'src str, handler: &'src Handler) -> Result<TranslationUnit, SyntaxError> {
        Parser::new(source, handler).parse_translation_unit()
    }

    /// Consume the next token, requiring it to be of `kind`.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<Token<'src>, SyntaxError> {
        let token = self.lexer.next_token();
        if token.kind != kind {
            return Err(self.unexpected(token, kind.as_str()));
        }
        Ok(token)
    }

    /// Report `got 'X' but expected 'Y'` at the offending token.
    pub(crate) fn unexpected(&self, token: Token<'_>, expected: &str) -> SyntaxError {
        self.handler.syntax_error(
            format!(
                "got '{}' but expected '{}'",
                token.display_text(),
                expected
            ),
            token.span,
        );
        SyntaxError
    }

    /// Skip a run of line feeds. Used around structural tokens where the
    /// grammar is whitespace-permissive.
    pub(crate) fn skip_line_feeds(&mut self) {
        while self.lexer.peek().kind == TokenKind::LineFeed {
            self.lexer.next_token();
        }
    }

    /// Kind of the next token without consuming it.
    pub(crate) fn peek_kind(&mut self) -> TokenKind {
        self.lexer.peek().kind
    }
}
