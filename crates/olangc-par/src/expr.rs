//! Expression parsing: precedence climbing over a factor parser.
//!
//! Precedence levels (low to high), all left-associative:
//!
//! | Level | Operators           |
//! |-------|---------------------|
//! | 1     | `\|\|`              |
//! | 2     | `&&`                |
//! | 3     | `\|`                |
//! | 4     | `^`                 |
//! | 5     | `&`                 |
//! | 6     | `==` `!=`           |
//! | 7     | `<` `<=` `>` `>=`   |
//! | 8     | `<<` `>>`           |
//! | 9     | `+` `-`             |
//! | 10    | `*` `/` `%`         |

use olangc_lex::TokenKind;
use olangc_util::Symbol;

use crate::ast::{BinOp, BinaryExpr, CallExpr, Expr, Literal, RefExpr, UnOp, UnaryExpr};
use crate::parser::{Parser, SyntaxError};

/// Binding powers for precedence climbing. Left-associative operators
/// parse their right-hand side with `power + 1`.
pub mod bp {
    pub const MIN: u8 = 0;
    pub const LOGICAL_OR: u8 = 2;
    pub const LOGICAL_AND: u8 = 4;
    pub const BITWISE_OR: u8 = 6;
    pub const BITWISE_XOR: u8 = 8;
    pub const BITWISE_AND: u8 = 10;
    pub const EQUALITY: u8 = 12;
    pub const COMPARISON: u8 = 14;
    pub const SHIFT: u8 = 16;
    pub const ADDITIVE: u8 = 18;
    pub const MULTIPLICATIVE: u8 = 20;
}

impl<'src> Parser<'src> {
    pub fn parse_expr(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_expr_bp(bp::MIN)
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr, SyntaxError> {
        let mut lhs = self.parse_factor()?;

        while let Some((op, left_bp, right_bp)) = self.peek_infix_op() {
            if left_bp < min_bp {
                break;
            }
            self.lexer.next_token();
            let rhs = self.parse_expr_bp(right_bp)?;
            let span = lhs.span().to(rhs.span());
            lhs = Expr::Binary(BinaryExpr {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            });
        }

        Ok(lhs)
    }

    /// The infix operator at the cursor with its binding powers, if any.
    fn peek_infix_op(&mut self) -> Option<(BinOp, u8, u8)> {
        let (op, power) = match self.lexer.peek().kind {
            TokenKind::PipePipe => (BinOp::Or, bp::LOGICAL_OR),
            TokenKind::AmpAmp => (BinOp::And, bp::LOGICAL_AND),
            TokenKind::Pipe => (BinOp::BitOr, bp::BITWISE_OR),
            TokenKind::Caret => (BinOp::BitXor, bp::BITWISE_XOR),
            TokenKind::Amp => (BinOp::BitAnd, bp::BITWISE_AND),
            TokenKind::EqEq => (BinOp::Eq, bp::EQUALITY),
            TokenKind::BangEq => (BinOp::Ne, bp::EQUALITY),
            TokenKind::Lt => (BinOp::Lt, bp::COMPARISON),
            TokenKind::Le => (BinOp::Le, bp::COMPARISON),
            TokenKind::Gt => (BinOp::Gt, bp::COMPARISON),
            TokenKind::Ge => (BinOp::Ge, bp::COMPARISON),
            TokenKind::Shl => (BinOp::Shl, bp::SHIFT),
            TokenKind::Shr => (BinOp::Shr, bp::SHIFT),
            TokenKind::Plus => (BinOp::Add, bp::ADDITIVE),
            TokenKind::Dash => (BinOp::Sub, bp::ADDITIVE),
            TokenKind::Star => (BinOp::Mul, bp::MULTIPLICATIVE),
            TokenKind::Slash => (BinOp::Div, bp::MULTIPLICATIVE),
            TokenKind::Percent => (BinOp::Rem, bp::MULTIPLICATIVE),
            _ => return None,
        };
        Some((op, power, power + 1))
    }

    /// factor := number | ID | ID '(' args ')' | unary factor | '(' expr ')'
    pub(crate) fn parse_factor(&mut self) -> Result<Expr, SyntaxError> {
        let token = self.lexer.peek();
        match token.kind {
            TokenKind::Number => {
                let token = self.lexer.next_token();
                let Ok(value) = token.text.parse::<u32>() else {
                    self.handler.syntax_error(
                        format!("number '{}' does not fit in u32", token.text),
                        token.span,
                    );
                    return Err(SyntaxError);
                };
                Ok(Expr::Literal(Literal {
                    value,
                    span: token.span,
                }))
            }
            TokenKind::Identifier => {
                let token = self.lexer.next_token();
                let name = Symbol::intern(token.text);
                if self.peek_kind() == TokenKind::OParen {
                    let (args, close_span) = self.parse_call_args()?;
                    Ok(Expr::Call(CallExpr {
                        callee: name,
                        args,
                        span: token.span.to(close_span),
                        scope: None,
                    }))
                } else {
                    Ok(Expr::Ref(RefExpr {
                        name,
                        span: token.span,
                        scope: None,
                    }))
                }
            }
            TokenKind::Plus => self.parse_unary(UnOp::Plus),
            TokenKind::Dash => self.parse_unary(UnOp::Neg),
            TokenKind::Tilde => self.parse_unary(UnOp::BitNot),
            TokenKind::Bang => self.parse_unary(UnOp::Not),
            TokenKind::Amp => self.parse_unary(UnOp::AddrOf),
            TokenKind::Star => self.parse_unary(UnOp::Deref),
            TokenKind::OParen => {
                self.lexer.next_token();
                self.skip_line_feeds();
                let expr = self.parse_expr()?;
                self.skip_line_feeds();
                self.expect(TokenKind::CParen)?;
                Ok(expr)
            }
            _ => {
                let token = self.lexer.next_token();
                Err(self.unexpected(token, "expression"))
            }
        }
    }

    fn parse_unary(&mut self, op: UnOp) -> Result<Expr, SyntaxError> {
        let op_token = self.lexer.next_token();
        let operand = self.parse_factor()?;
        let span = op_token.span.to(operand.span());
        Ok(Expr::Unary(UnaryExpr {
            op,
            operand: Box::new(operand),
            span,
        }))
    }

    /// Call arguments; line feeds may be embedded, trailing commas may
    /// not. Returns the arguments and the closing parenthesis span.
    fn parse_call_args(&mut self) -> Result<(Vec<Expr>, olangc_util::Span), SyntaxError> {
        self.expect(TokenKind::OParen)?;
        self.skip_line_feeds();

        let mut args = Vec::new();
        if self.peek_kind() != TokenKind::CParen {
            loop {
                args.push(self.parse_expr()?);
                self.skip_line_feeds();
                if self.peek_kind() == TokenKind::Comma {
                    self.lexer.next_token();
                    self.skip_line_feeds();
                } else {
                    break;
                }
            }
        }

        let close = self.expect(TokenKind::CParen)?;
        Ok((args, close.span))
    }
}
