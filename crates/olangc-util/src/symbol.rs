//! Interned identifiers.
//!
//! A [`Symbol`] is a 4-byte handle into a global string table, so name
//! comparisons across the AST, scope bindings and codegen tables are
//! integer compares. Interned strings are leaked to obtain `'static`
//! references: the table lives for the whole compilation and entries are
//! never removed.
//!
//! The pipeline is strictly single-threaded, so a plain mutex around the
//! table is enough; contention only exists in the test suite.

use std::fmt;
use std::sync::{Mutex, OnceLock};

use rustc_hash::FxHashMap;

/// An interned string.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

#[derive(Default)]
struct Interner {
    names: FxHashMap<&'static str, u32>,
    strings: Vec<&'static str>,
}

impl Interner {
    fn intern(&mut self, string: &str) -> u32 {
        if let Some(&index) = self.names.get(string) {
            return index;
        }
        let interned: &'static str = Box::leak(string.to_owned().into_boxed_str());
        let index = self.strings.len() as u32;
        self.strings.push(interned);
        self.names.insert(interned, index);
        index
    }
}

fn table() -> &'static Mutex<Interner> {
    static TABLE: OnceLock<Mutex<Interner>> = OnceLock::new();
    TABLE.get_or_init(|| Mutex::new(Interner::default()))
}

impl Symbol {
    /// Intern a string, returning its symbol. The same string always maps
    /// to the same symbol.
    pub fn intern(string: &str) -> Symbol {
        let mut table = table().lock().unwrap_or_else(|e| e.into_inner());
        Symbol(table.intern(string))
    }

    /// The string this symbol stands for.
    pub fn as_str(self) -> &'static str {
        let table = table().lock().unwrap_or_else(|e| e.into_inner());
        table.strings[self.0 as usize]
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
