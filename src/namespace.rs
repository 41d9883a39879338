//! Constant tables that named struct kinds are registered into.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::{records::Kind, symbols::Symbol};

/// A named table of kinds, e.g. `Struct`. Kinds registered here are named
/// with the namespace as prefix (`Struct::Point`).
#[derive(Debug)]
pub struct Namespace {
    path: Option<Arc<str>>,
    constants: RwLock<IndexMap<Symbol, Kind>>,
}

impl Namespace {
    pub fn new(path: &str) -> Self {
        Self {
            path: Some(Arc::from(path)),
            constants: RwLock::new(IndexMap::new()),
        }
    }

    /// A namespace whose kinds are named without a prefix.
    pub fn top() -> Self {
        Self {
            path: None,
            constants: RwLock::new(IndexMap::new()),
        }
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// The name a kind bound as `name` in this namespace carries.
    pub fn qualify(&self, name: Symbol) -> String {
        match &self.path {
            Some(path) => format!("{path}::{name}"),
            None => name.to_string(),
        }
    }

    /// Bind `kind` under `name`, returning the kind previously bound there.
    pub fn bind(&self, name: Symbol, kind: Kind) -> Option<Kind> {
        let previous = self.constants.write().insert(name, kind);
        match &previous {
            Some(_) => tracing::warn!(constant = %self.qualify(name), "redefining constant"),
            None => tracing::debug!(constant = %self.qualify(name), "bound struct kind"),
        }
        previous
    }

    pub fn get(&self, name: &str) -> Option<Kind> {
        let name = Symbol::lookup(name)?;
        self.constants.read().get(&name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Bound names, in binding order.
    pub fn constants(&self) -> Vec<Symbol> {
        self.constants.read().keys().copied().collect()
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new("Struct")
    }
}
