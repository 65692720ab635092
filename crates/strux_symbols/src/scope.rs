//! A single level of name bindings

use indexmap::IndexMap;
use thiserror::Error;

use crate::{ScopeId, SymbolId};

/// Invariant violations of the symbol model
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("`{name}` is already bound to {existing} in the scope of {owner}")]
    DuplicateBinding {
        name: String,
        owner: SymbolId,
        existing: SymbolId,
    },
    #[error("{symbol} does not own a scope")]
    NoScope { symbol: SymbolId },
}

/// Bindings owned by exactly one symbol. Iteration follows definition order.
#[derive(Debug, Clone)]
pub struct Scope {
    pub id: ScopeId,
    pub owner: SymbolId,
    names: IndexMap<String, SymbolId>,
}

impl Scope {
    pub fn new(id: ScopeId, owner: SymbolId) -> Self {
        Self {
            id,
            owner,
            names: IndexMap::new(),
        }
    }

    pub fn define(&mut self, name: impl Into<String>, symbol: SymbolId) -> Result<(), SymbolError> {
        let name = name.into();
        if let Some(&existing) = self.names.get(&name) {
            return Err(SymbolError::DuplicateBinding { name, owner: self.owner, existing });
        }
        self.names.insert(name, symbol);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.names.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SymbolId)> {
        self.names.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
