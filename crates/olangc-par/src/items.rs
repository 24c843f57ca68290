//! Top-level declarations: the translation unit and function definitions.

use olangc_lex::TokenKind;
use olangc_util::Symbol;

use crate::ast::{FnDef, Param, TranslationUnit};
use crate::parser::{Parser, SyntaxError};

impl<'src> Parser<'src> {
    /// translation_unit := { fn_def }
    pub fn parse_translation_unit(&mut self) -> Result<TranslationUnit, SyntaxError> {
        let mut decls = Vec::new();

        self.skip_line_feeds();
        while self.peek_kind() != TokenKind::Eof {
            decls.push(self.parse_fn_def()?);
            self.skip_line_feeds();
        }

        Ok(TranslationUnit { decls })
    }

    /// fn_def := 'fn' ID '(' params ')' ':' type block
    fn parse_fn_def(&mut self) -> Result<FnDef, SyntaxError> {
        let fn_token = self.expect(TokenKind::Fn)?;
        self.skip_line_feeds();

        let name_token = self.expect(TokenKind::Identifier)?;
        self.skip_line_feeds();

        self.expect(TokenKind::OParen)?;
        self.skip_line_feeds();

        let params = self.parse_params()?;
        self.expect(TokenKind::CParen)?;
        self.skip_line_feeds();

        self.expect(TokenKind::Colon)?;
        self.skip_line_feeds();

        let return_type = self.parse_type()?;
        self.skip_line_feeds();

        let body = self.parse_block()?;

        Ok(FnDef {
            name: Symbol::intern(name_token.text),
            params,
            return_type,
            body,
            span: fn_token.span,
            scope: None,
        })
    }

    /// params := [ param { ',' param } ]
    ///
    /// Line feeds may be embedded anywhere in the list; a trailing comma
    /// is not permitted.
    fn parse_params(&mut self) -> Result<Vec<Param>, SyntaxError> {
        let mut params = Vec::new();

        if self.peek_kind() == TokenKind::CParen {
            return Ok(params);
        }

        loop {
            self.skip_line_feeds();
            let name_token = self.expect(TokenKind::Identifier)?;
            self.skip_line_feeds();
            self.expect(TokenKind::Colon)?;
            self.skip_line_feeds();
            let ty = self.parse_type()?;

            params.push(Param {
                name: Symbol::intern(name_token.text),
                ty,
                span: name_token.span,
            });

            self.skip_line_feeds();
            if self.peek_kind() == TokenKind::Comma {
                self.lexer.next_token();
            } else {
                break;
            }
        }

        Ok(params)
    }
}
