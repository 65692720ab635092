use strux_ast::Package;
use strux_symbols::{PackageId, SymbolId};

/// Where synthesis happens: the enclosing package and the symbol owning the
/// current scope. Synthesis assumes exclusive access to the package.
#[derive(Debug)]
pub struct SymbolEnv<'p> {
    pub package: &'p mut Package,
    pub scope_owner: SymbolId,
}

impl<'p> SymbolEnv<'p> {
    pub fn new(package: &'p mut Package, scope_owner: SymbolId) -> Self {
        Self { package, scope_owner }
    }

    pub fn package_id(&self) -> PackageId {
        self.package.id
    }
}
