//! The lexical scope tree and symbol table.
//!
//! Scopes form a tree rooted at the translation unit: the root holds the
//! function symbols, each function owns a scope for its parameters, and
//! every block pushes a further child. Both scopes and symbols live in
//! flat vectors addressed by [`ScopeId`]/[`SymbolId`]; the AST stores
//! those ids as back-references, and symbol identity (for the codegen
//! offset table) is id equality.
//!
//! Bindings are insertion-ordered so stack-frame layout and any debug
//! output are deterministic.

use indexmap::IndexMap;

use olangc_par::Type;
use olangc_util::{IndexVec, ScopeId, Symbol, SymbolId};

/// A name/type pair introduced by a definition.
#[derive(Clone, Debug)]
pub struct SymbolInfo {
    pub name: Symbol,
    pub ty: Type,
}

/// One lexical naming context.
#[derive(Debug)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    bindings: IndexMap<Symbol, SymbolId>,
    children: Vec<ScopeId>,
}

/// All scopes and symbols of one translation unit.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: IndexVec<ScopeId, Scope>,
    symbols: IndexVec<SymbolId, SymbolInfo>,
}

impl ScopeTree {
    /// Create a tree containing only the root scope.
    pub fn new() -> Self {
        let mut scopes = IndexVec::new();
        scopes.push(Scope {
            parent: None,
            bindings: IndexMap::new(),
            children: Vec::new(),
        });
        Self {
            scopes,
            symbols: IndexVec::new(),
        }
    }

    /// The translation-unit root scope.
    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Create a child scope under `parent`.
    pub fn push_scope(&mut self, parent: ScopeId) -> ScopeId {
        let child = self.scopes.push(Scope {
            parent: Some(parent),
            bindings: IndexMap::new(),
            children: Vec::new(),
        });
        self.scopes[parent].children.push(child);
        child
    }

    /// Bind `name` in `scope`, creating a fresh symbol. A rebinding of
    /// the same name replaces the visible binding but keeps the old
    /// symbol alive for anything already holding its id.
    pub fn insert(&mut self, scope: ScopeId, name: Symbol, ty: Type) -> SymbolId {
        let symbol = self.symbols.push(SymbolInfo { name, ty });
        self.scopes[scope].bindings.insert(name, symbol);
        symbol
    }

    /// Look `name` up in `scope` only.
    pub fn lookup_local(&self, scope: ScopeId, name: Symbol) -> Option<SymbolId> {
        self.scopes[scope].bindings.get(&name).copied()
    }

    /// Look `name` up in `scope` and its ancestors.
    pub fn lookup(&self, scope: ScopeId, name: Symbol) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(scope) = current {
            if let Some(symbol) = self.lookup_local(scope, name) {
                return Some(symbol);
            }
            current = self.scopes[scope].parent;
        }
        None
    }

    pub fn symbol(&self, id: SymbolId) -> &SymbolInfo {
        &self.symbols[id]
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope].parent
    }

    pub fn children(&self, scope: ScopeId) -> &[ScopeId] {
        &self.scopes[scope].children
    }

    /// Symbols bound in `scope`, in insertion order.
    pub fn local_symbols(&self, scope: ScopeId) -> impl Iterator<Item = SymbolId> + '_ {
        self.scopes[scope].bindings.values().copied()
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}
