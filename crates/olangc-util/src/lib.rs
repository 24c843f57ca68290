//! olangc-util - Core utilities and foundation types.
//!
//! Everything the compiler stages share lives here: source locations and
//! the source buffer ([`Span`], [`SourceFile`]), diagnostics ([`Handler`],
//! [`Diagnostic`]), the bump arena ([`Arena`]), interned identifiers
//! ([`Symbol`]), and typed-index vectors ([`IndexVec`], [`Idx`]).

pub mod arena;
pub mod diagnostic;
pub mod index_vec;
pub mod span;
pub mod symbol;

pub use arena::Arena;
pub use diagnostic::{render_diagnostic, Diagnostic, Handler, Level};
pub use index_vec::{Idx, IndexVec};
pub use span::{SourceFile, Span};
pub use symbol::Symbol;

// Re-export the hash map flavor used across the compiler.
pub use rustc_hash::FxHashMap;

// Typed handles into the semantic tables. Every compiler stage names
// scopes and symbols, so the handle types live here rather than in
// olangc-sem; the parser stores them as unresolved back-indices and the
// resolver fills them in.
crate::define_idx!(ScopeId);
crate::define_idx!(SymbolId);
