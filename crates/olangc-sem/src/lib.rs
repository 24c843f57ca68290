//! olangc-sem - Semantic resolution.
//!
//! A single post-parse walk that builds the lexical scope tree, inserts
//! symbols for function, parameter and variable definitions, rewrites
//! named types into their canonical form in place, and attaches a scope
//! to every name-introducing or name-using AST node. Code generation
//! relies on those annotations being complete.

pub mod resolve;
pub mod scope;

pub use resolve::resolve;
pub use scope::{Scope, ScopeTree, SymbolInfo};
