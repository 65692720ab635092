//! The synthesis pass

use strux_symbols::{PackageId, SymbolId, SymbolTable, TypeId};
use strux_types::{Type, TypeTable};

use crate::config::SynthesisConfig;
use crate::error::SynthesisError;
use crate::names::AnonymousNameProvider;

/// Builds fields, initializers and type definitions into the symbol and
/// type tables of one compilation unit
pub struct Synthesizer<'a> {
    pub symbols: &'a mut SymbolTable,
    pub types: &'a mut TypeTable,
    names: &'a mut dyn AnonymousNameProvider,
    pub(crate) config: SynthesisConfig,
}

impl<'a> Synthesizer<'a> {
    pub fn new(
        symbols: &'a mut SymbolTable,
        types: &'a mut TypeTable,
        names: &'a mut dyn AnonymousNameProvider,
    ) -> Self {
        Self {
            symbols,
            types,
            names,
            config: SynthesisConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SynthesisConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    pub fn next_anonymous_type_name(&mut self, package: PackageId) -> String {
        self.names.next_anonymous_type_name(package)
    }

    pub fn next_intersection_error_detail_name(&mut self, package: PackageId) -> String {
        self.names.next_intersection_error_detail_name(package)
    }

    // === Lookups shared by the pass ===

    pub(crate) fn type_symbol(&self, ty: TypeId) -> Result<SymbolId, SynthesisError> {
        self.types.tsymbol(ty).ok_or(SynthesisError::MissingTypeSymbol { ty })
    }

    pub(crate) fn symbol_type(&self, symbol: SymbolId) -> Result<TypeId, SynthesisError> {
        self.symbols.get(symbol).ty.ok_or(SynthesisError::UntypedSymbol { symbol })
    }

    /// Name of the symbol naming `ty`; empty names count as missing
    pub(crate) fn type_name(&self, ty: TypeId) -> Result<String, SynthesisError> {
        let symbol = self.type_symbol(ty)?;
        let name = self.symbols.name(symbol);
        if name.is_empty() {
            return Err(SynthesisError::MissingName { ty });
        }
        Ok(name.to_string())
    }

    pub(crate) fn expect_record(&self, ty: TypeId) -> Result<(), SynthesisError> {
        match self.types.kind(ty) {
            Type::Record(_) => Ok(()),
            _ => Err(SynthesisError::UnexpectedType { ty, expected: "a record" }),
        }
    }

    pub(crate) fn expect_object(&self, ty: TypeId) -> Result<(), SynthesisError> {
        match self.types.kind(ty) {
            Type::Object(_) => Ok(()),
            _ => Err(SynthesisError::UnexpectedType { ty, expected: "an object" }),
        }
    }
}
