//! Arena of symbols and scopes for one compilation unit

use crate::scope::{Scope, SymbolError};
use crate::symbol::*;

/// Mangled symbol name of a function attached to a type, e.g. `Person.init`
pub fn attached_func_symbol_name(type_name: &str, func_name: &str) -> String {
    format!("{}.{}", type_name, func_name)
}

/// Owns every symbol and scope. Handles index into the two vectors.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    scopes: Vec<Scope>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, kind: SymbolKind, decl: SymbolDecl) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            id,
            kind,
            name: decl.name,
            original_name: decl.original_name,
            package: decl.package,
            flags: decl.flags,
            origin: decl.origin,
            span: decl.span,
            ty: decl.ty,
            owner: decl.owner,
            scope: None,
        });
        id
    }

    // === Factories ===

    pub fn create_variable_symbol(&mut self, decl: SymbolDecl) -> SymbolId {
        self.alloc(SymbolKind::Variable, decl)
    }

    pub fn create_function_symbol(&mut self, decl: SymbolDecl, has_body: bool) -> SymbolId {
        let info = FunctionInfo { has_body, ..FunctionInfo::default() };
        self.alloc(SymbolKind::Function(info), decl)
    }

    pub fn create_invokable_type_symbol(&mut self, decl: SymbolDecl, info: InvokableInfo) -> SymbolId {
        self.alloc(SymbolKind::InvokableType(info), decl)
    }

    pub fn create_type_symbol(&mut self, decl: SymbolDecl) -> SymbolId {
        self.alloc(SymbolKind::Type(TypeSymbolInfo::default()), decl)
    }

    pub fn create_type_definition_symbol(&mut self, decl: SymbolDecl) -> SymbolId {
        self.alloc(SymbolKind::TypeDefinition, decl)
    }

    // === Access ===

    /// Handles are only valid for the table that issued them
    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    pub fn get_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.index()]
    }

    pub fn name(&self, id: SymbolId) -> &str {
        &self.get(id).name
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    // === Scopes ===

    /// Give `owner` a fresh, empty scope. A previous scope stays in the
    /// arena but is no longer reachable from the owner.
    pub fn new_scope(&mut self, owner: SymbolId) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope::new(id, owner));
        self.get_mut(owner).scope = Some(id);
        id
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.index()]
    }

    pub fn scope_of(&self, symbol: SymbolId) -> Result<ScopeId, SymbolError> {
        self.get(symbol).scope.ok_or(SymbolError::NoScope { symbol })
    }

    pub fn define(&mut self, scope: ScopeId, name: impl Into<String>, symbol: SymbolId) -> Result<(), SymbolError> {
        self.scope_mut(scope).define(name, symbol)
    }

    /// Bind `symbol` in the scope owned by `owner`
    pub fn define_in(&mut self, owner: SymbolId, name: impl Into<String>, symbol: SymbolId) -> Result<(), SymbolError> {
        let scope = self.scope_of(owner)?;
        self.define(scope, name, symbol)
    }

    /// Look a name up in `scope`, then outward through the owners' enclosing scopes
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.scope(id);
            if let Some(found) = scope.get(name) {
                return Some(found);
            }
            current = self.get(scope.owner).owner.and_then(|outer| self.get(outer).scope);
        }
        None
    }
}
