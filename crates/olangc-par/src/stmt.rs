//! Blocks and statements.
//!
//! Statements are line-feed terminated; the closing `}` of a block may
//! follow a statement directly. Assignment statements are distinguished
//! from expression statements by two tokens of lookahead (`x =` vs.
//! `x == y`, which the lexer's maximal munch keeps apart).

use olangc_lex::TokenKind;
use olangc_util::Symbol;

use crate::ast::{
    Block, ElseBranch, IfStmt, RefExpr, ReturnStmt, Stmt, VarAssign, VarDef, WhileStmt,
};
use crate::parser::{Parser, SyntaxError};

impl<'src> Parser<'src> {
    /// block := '{' { stmt LF } '}'
    pub(crate) fn parse_block(&mut self) -> Result<Block, SyntaxError> {
        let open = self.expect(TokenKind::OCurly)?;
        self.skip_line_feeds();

        let mut stmts = Vec::new();
        while !matches!(self.peek_kind(), TokenKind::CCurly | TokenKind::Eof) {
            stmts.push(self.parse_stmt()?);

            // A statement ends at a line feed, except directly before the
            // closing brace.
            if self.peek_kind() != TokenKind::CCurly {
                self.expect(TokenKind::LineFeed)?;
                self.skip_line_feeds();
            }
        }

        let close = self.expect(TokenKind::CCurly)?;
        Ok(Block {
            stmts,
            span: open.span.to(close.span),
        })
    }

    fn parse_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        match self.peek_kind() {
            TokenKind::Return => Ok(Stmt::Return(self.parse_return()?)),
            TokenKind::If => Ok(Stmt::If(self.parse_if()?)),
            TokenKind::While => Ok(Stmt::While(self.parse_while()?)),
            TokenKind::Var => Ok(Stmt::VarDef(self.parse_var_def()?)),
            TokenKind::Identifier if self.lexer.lookahead(2).kind == TokenKind::Eq => {
                Ok(Stmt::Assign(self.parse_assign()?))
            }
            _ => Ok(Stmt::Expr(self.parse_expr()?)),
        }
    }

    /// return_stmt := 'return' expr
    fn parse_return(&mut self) -> Result<ReturnStmt, SyntaxError> {
        let return_token = self.expect(TokenKind::Return)?;
        let expr = self.parse_expr()?;
        let span = return_token.span.to(expr.span());
        Ok(ReturnStmt { expr, span })
    }

    /// if_stmt := 'if' expr block [ 'else' ( if_stmt | block ) ]
    fn parse_if(&mut self) -> Result<IfStmt, SyntaxError> {
        let if_token = self.expect(TokenKind::If)?;
        let cond = self.parse_expr()?;
        self.skip_line_feeds();
        let then_block = self.parse_block()?;

        let else_branch = if self.peek_kind() == TokenKind::Else {
            self.lexer.next_token();
            self.skip_line_feeds();
            if self.peek_kind() == TokenKind::If {
                Some(ElseBranch::ElseIf(Box::new(self.parse_if()?)))
            } else {
                Some(ElseBranch::Else(self.parse_block()?))
            }
        } else {
            None
        };

        let span = if_token.span;
        Ok(IfStmt {
            cond,
            then_block,
            else_branch,
            span,
        })
    }

    /// while_stmt := 'while' expr block
    fn parse_while(&mut self) -> Result<WhileStmt, SyntaxError> {
        let while_token = self.expect(TokenKind::While)?;
        let cond = self.parse_expr()?;
        self.skip_line_feeds();
        let body = self.parse_block()?;
        Ok(WhileStmt {
            cond,
            body,
            span: while_token.span,
        })
    }

    /// var_def := 'var' ID ':' type '=' expr
    ///
    /// The initializer is mandatory.
    fn parse_var_def(&mut self) -> Result<VarDef, SyntaxError> {
        let var_token = self.expect(TokenKind::Var)?;
        let name_token = self.expect(TokenKind::Identifier)?;
        self.expect(TokenKind::Colon)?;
        self.skip_line_feeds();
        let ty = self.parse_type()?;
        self.expect(TokenKind::Eq)?;
        self.skip_line_feeds();
        let init = self.parse_expr()?;

        Ok(VarDef {
            name: Symbol::intern(name_token.text),
            ty,
            init,
            span: var_token.span,
            scope: None,
        })
    }

    /// assign_stmt := ID '=' expr
    fn parse_assign(&mut self) -> Result<VarAssign, SyntaxError> {
        let name_token = self.expect(TokenKind::Identifier)?;
        let target = RefExpr {
            name: Symbol::intern(name_token.text),
            span: name_token.span,
            scope: None,
        };
        self.expect(TokenKind::Eq)?;
        self.skip_line_feeds();
        let value = self.parse_expr()?;
        let span = name_token.span.to(value.span());

        Ok(VarAssign {
            target,
            value,
            span,
        })
    }
}
