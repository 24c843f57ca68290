//! olangc-par - Syntactic analysis.
//!
//! Recursive descent for declarations and statements, precedence
//! climbing for expressions. The grammar is line-feed sensitive at the
//! statement level: a statement ends at the next line feed, while
//! redundant line feeds around structural tokens are skipped.
//!
//! The parser reports the first mismatched token through the shared
//! [`olangc_util::Handler`] and gives up; no partial AST is produced on
//! error.

pub mod ast;
pub mod expr;
pub mod items;
pub mod parser;
pub mod pretty;
pub mod stmt;
pub mod types;

pub use ast::*;
pub use parser::{Parser, SyntaxError};
pub use types::{PrimKind, Type};
