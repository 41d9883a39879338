//! Interned symbols

use std::{
    fmt,
    sync::{Arc, LazyLock},
};

use indexmap::IndexSet;
use parking_lot::RwLock;

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(pub(crate) u32);

static SYMTAB: LazyLock<RwLock<IndexSet<Arc<str>>>> =
    LazyLock::new(|| RwLock::new(IndexSet::new()));

impl Symbol {
    pub fn intern(s: &str) -> Self {
        if let Some(sym) = Self::lookup(s) {
            return sym;
        }
        let mut symtab = SYMTAB.write();
        // Another thread may have interned it between the two locks.
        let (id, _) = symtab.insert_full(Arc::from(s));
        Self(id.try_into().expect("symbol table overflow"))
    }

    /// Find the symbol for `s` without interning it. Keys coming from user
    /// strings go through here so that failed member lookups don't grow the
    /// table.
    pub fn lookup(s: &str) -> Option<Self> {
        let symtab = SYMTAB.read();
        symtab
            .get_index_of(s)
            .map(|id| Self(id.try_into().expect("symbol table overflow")))
    }

    pub fn to_str(self) -> Arc<str> {
        let symtab = SYMTAB.read();
        symtab[self.0 as usize].clone()
    }

    /// Whether the symbol reads like a constant name, i.e. starts with an
    /// uppercase letter.
    pub fn is_constant_like(self) -> bool {
        self.to_str()
            .chars()
            .next()
            .is_some_and(char::is_uppercase)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::intern(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::intern(&s)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.to_str())
    }
}

impl PartialEq<&'_ str> for Symbol {
    fn eq(&self, rhs: &&str) -> bool {
        self.to_str().as_ref() == *rhs
    }
}
