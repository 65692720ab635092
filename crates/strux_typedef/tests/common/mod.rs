//! Shared fixture for synthesis tests

#![allow(dead_code)]

use strux_ast::{Ident, ImportDecl, Package};
use strux_symbols::{Flags, PackageId, Span, SymbolDecl, SymbolId, SymbolTable, TypeId};
use strux_typedef::{AnonymousNames, SymbolEnv, Synthesizer};
use strux_types::{Field, ObjectType, RecordType, Type, TypeTable};
use tracing_subscriber::EnvFilter;

pub const PKG: PackageId = PackageId(0);

/// Route synthesis logs to the test harness. Set `STRUX_LOG=debug` to see them.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("STRUX_LOG").unwrap_or_else(|_| EnvFilter::new("off"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// One compilation unit: tables, a package and its module symbol
pub struct World {
    pub symbols: SymbolTable,
    pub types: TypeTable,
    pub names: AnonymousNames,
    pub package: Package,
    pub module: SymbolId,
}

impl World {
    pub fn new() -> Self {
        init_tracing();
        let mut symbols = SymbolTable::new();
        let module = symbols.create_type_symbol(SymbolDecl::new("app", PKG, Span::default()));
        symbols.new_scope(module);
        Self {
            symbols,
            types: TypeTable::new(),
            names: AnonymousNames::new(),
            package: Package::new(PKG, "app"),
            module,
        }
    }

    pub fn int(&self) -> TypeId {
        self.types.builtins.int
    }

    pub fn string(&self) -> TypeId {
        self.types.builtins.string
    }

    pub fn import(&mut self, alias: &str, unit: &str, package: PackageId) {
        self.package.imports.push(ImportDecl {
            alias: Ident::new(alias, Span::default()),
            comp_unit: Some(unit.to_string()),
            package: Some(package),
            span: Span::default(),
        });
    }

    fn structure(&mut self, name: &str, ty: Type, flags: Flags) -> (TypeId, SymbolId) {
        let ty = self.types.alloc(ty);
        let sym = self.symbols.create_type_symbol(
            SymbolDecl::new(name, PKG, Span::default()).flags(flags).ty(ty).owner(self.module),
        );
        self.symbols.new_scope(sym);
        self.types.set_tsymbol(ty, sym);
        (ty, sym)
    }

    /// Declare a field the way an earlier pass would: symbol, binding and map entry
    pub fn add_field(&mut self, ty: TypeId, name: &str, field_ty: TypeId) -> SymbolId {
        let owner = self.types.tsymbol(ty).expect("structure has a type symbol");
        let field_sym = self.symbols.create_variable_symbol(
            SymbolDecl::new(name, PKG, Span::default()).flags(Flags::PUBLIC).ty(field_ty).owner(owner),
        );
        self.symbols.define_in(owner, name, field_sym).expect("unique field name");
        self.types
            .fields_mut(ty)
            .expect("structure type")
            .insert(name.to_string(), Field::new(name, field_ty, Some(field_sym), Span::default()));
        field_sym
    }

    pub fn record(&mut self, name: &str, fields: &[(&str, TypeId)]) -> TypeId {
        let (ty, _) = self.structure(name, Type::Record(RecordType::default()), Flags::PUBLIC);
        for &(field, field_ty) in fields {
            self.add_field(ty, field, field_ty);
        }
        ty
    }

    pub fn object(&mut self, name: &str, fields: &[(&str, TypeId)]) -> TypeId {
        let (ty, _) = self.structure(name, Type::Object(ObjectType::default()), Flags::PUBLIC | Flags::CLASS);
        for &(field, field_ty) in fields {
            self.add_field(ty, field, field_ty);
        }
        ty
    }

    /// Run `f` with a synthesizer over this world and an environment rooted
    /// at the module symbol
    pub fn synth<R>(&mut self, f: impl FnOnce(&mut Synthesizer<'_>, &mut SymbolEnv<'_>) -> R) -> R {
        let mut env = SymbolEnv::new(&mut self.package, self.module);
        let mut synth = Synthesizer::new(&mut self.symbols, &mut self.types, &mut self.names);
        f(&mut synth, &mut env)
    }
}
