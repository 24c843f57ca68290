//! olangc-lex - Lexical analysis.
//!
//! Turns an olang source buffer into a token stream on demand. The lexer
//! is a pure byte-cursor state machine: lookahead saves and restores the
//! cursor instead of buffering tokens, and token texts are slices into
//! the source buffer.

pub mod cursor;
pub mod lexer;
pub mod token;

pub use cursor::{Cursor, CursorSnapshot};
pub use lexer::Lexer;
pub use token::{Token, TokenKind};
