//! Type definition assembly
//!
//! Builds type nodes from already-populated types and registers the
//! resulting definitions into the enclosing package.

use strux_ast::{
    BuiltInRefKind, BuiltInRefTypeNode, ClassDefId, ClassDefinition, ConstrainedTypeNode, ErrorTypeNode, Ident,
    Package, StructureTypeNode, TypeDefId, TypeDefinition, TypeNode, UserDefinedTypeNode, VariableNode,
};
use strux_symbols::{Flags, Origin, PackageId, Span, SymbolDecl, SymbolId, TypeId};
use strux_types::Type;
use tracing::{debug, instrument};

use crate::env::SymbolEnv;
use crate::error::SynthesisError;
use crate::fields::PopulateRequest;
use crate::immutable::InProgress;
use crate::synth::Synthesizer;

/// Type name standing in for the detail record of an intersected error type
/// until a later pass binds the real record
pub const INTERSECTED_ERROR_DETAIL: &str = "$IntersectedErrorDetail$";

/// Outcome of assembling a type definition
#[derive(Debug, Clone)]
pub enum Assembly {
    /// Registered into the environment's package
    Registered(TypeDefId),
    /// Built without an environment, so nothing was registered
    Transient(Box<TypeDefinition>),
}

impl Assembly {
    pub fn is_registered(&self) -> bool {
        matches!(self, Assembly::Registered(_))
    }

    pub fn registered(&self) -> Option<TypeDefId> {
        match self {
            Assembly::Registered(id) => Some(*id),
            Assembly::Transient(_) => None,
        }
    }

    /// The assembled definition, looked up in `package` when registered
    pub fn definition<'a>(&'a self, package: &'a Package) -> &'a TypeDefinition {
        match self {
            Assembly::Registered(id) => package.type_definition(*id),
            Assembly::Transient(def) => def,
        }
    }
}

impl Synthesizer<'_> {
    fn definition_for(&self, ty: TypeId, symbol: SymbolId, type_node: TypeNode) -> TypeDefinition {
        let s = self.symbols.get(symbol);
        TypeDefinition {
            name: Ident::new(s.name.clone(), s.span),
            ty: Some(ty),
            symbol,
            type_node,
            flags: s.flags,
            span: s.span,
        }
    }

    /// Wrap `type_node` in a definition named after `symbol`. The definition is
    /// registered iff `env` is given.
    #[instrument(skip(self, type_node, env), fields(registered = env.is_some()))]
    pub fn add_type_definition(
        &mut self,
        ty: TypeId,
        symbol: SymbolId,
        type_node: TypeNode,
        env: Option<&mut SymbolEnv<'_>>,
    ) -> Result<Assembly, SynthesisError> {
        let definition = self.definition_for(ty, symbol, type_node);
        match env {
            Some(env) => {
                let id = env.package.add_type_definition(definition)?;
                debug!(name = %self.symbols.name(symbol), %symbol, "registered type definition");
                Ok(Assembly::Registered(id))
            }
            None => Ok(Assembly::Transient(Box::new(definition))),
        }
    }

    /// Register a definition under a new type definition symbol copied from
    /// `template`
    pub fn add_synthesized_type_definition(
        &mut self,
        ty: TypeId,
        template: SymbolId,
        type_node: TypeNode,
        env: &mut SymbolEnv<'_>,
    ) -> Result<TypeDefId, SynthesisError> {
        let t = self.symbols.get(template);
        let decl = SymbolDecl::new(t.name.clone(), t.package, t.span)
            .original_name(t.original_name.clone())
            .flags(t.flags)
            .origin(t.origin)
            .maybe_owner(t.owner)
            .ty(ty);
        let symbol = self.symbols.create_type_definition_symbol(decl);
        self.symbols.new_scope(symbol);

        if let Some(tsym) = self.types.tsymbol(ty) {
            if let Some(info) = self.symbols.get_mut(tsym).type_info_mut() {
                info.type_definition = Some(symbol);
            }
        }

        let definition = self.definition_for(ty, symbol, type_node);
        Ok(env.package.add_type_definition(definition)?)
    }

    /// One declaration per field of `ty`, in field order. Fields without a
    /// symbol get a public virtual one of type `pure`.
    pub fn build_field_declarations(
        &mut self,
        ty: TypeId,
        package: PackageId,
    ) -> Result<Vec<VariableNode>, SynthesisError> {
        let fields = self
            .types
            .fields(ty)
            .ok_or(SynthesisError::UnexpectedType { ty, expected: "a structure" })?
            .clone();
        let pure = self.types.builtins.pure;

        let mut decls = Vec::with_capacity(fields.len());
        for field in fields.values() {
            let symbol = match field.symbol {
                Some(symbol) => symbol,
                None => self.symbols.create_variable_symbol(
                    SymbolDecl::new(&field.name, package, field.span)
                        .flags(Flags::PUBLIC)
                        .origin(Origin::Virtual)
                        .ty(pure),
                ),
            };
            decls.push(VariableNode {
                name: Ident::new(self.symbols.name(symbol), field.span),
                ty: field.ty,
                symbol,
                span: field.span,
            });
        }
        Ok(decls)
    }

    pub fn create_record_type_node(
        &mut self,
        ty: TypeId,
        package: PackageId,
        span: Span,
    ) -> Result<StructureTypeNode, SynthesisError> {
        self.expect_record(ty)?;
        let fields = self.build_field_declarations(ty, package)?;
        Ok(StructureTypeNode {
            span,
            ty: Some(ty),
            symbol: self.types.tsymbol(ty),
            fields,
            ..Default::default()
        })
    }

    pub fn create_object_type_node(&mut self, ty: TypeId, span: Span) -> Result<StructureTypeNode, SynthesisError> {
        self.expect_object(ty)?;
        let symbol = self.type_symbol(ty)?;
        let package = self.symbols.get(symbol).package;
        let fields = self.build_field_declarations(ty, package)?;
        Ok(StructureTypeNode {
            span,
            ty: Some(ty),
            symbol: Some(symbol),
            fields,
            ..Default::default()
        })
    }

    /// Register a class definition for the object type of `class_symbol`
    pub fn create_class_definition(
        &mut self,
        span: Span,
        class_symbol: SymbolId,
        env: &mut SymbolEnv<'_>,
    ) -> Result<ClassDefId, SynthesisError> {
        let ty = self.symbol_type(class_symbol)?;
        self.expect_object(ty)?;
        let package = self.symbols.get(class_symbol).package;
        let fields = self.build_field_declarations(ty, package)?;

        let id = env.package.add_class_definition(ClassDefinition { span, ty, symbol: class_symbol, fields })?;
        debug!(class = %self.symbols.name(class_symbol), "registered class definition");
        Ok(id)
    }

    /// Type node for an error type. A map detail becomes `map<$IntersectedErrorDetail$>`
    /// for a later pass to bind; any other detail is referenced by name.
    pub fn build_error_type_node(
        &mut self,
        span: Span,
        error_ty: TypeId,
        env: &SymbolEnv<'_>,
    ) -> Result<TypeNode, SynthesisError> {
        let detail = match self.types.kind(self.types.implied(error_ty)) {
            Type::Error(err) => self.types.implied(err.detail),
            _ => return Err(SynthesisError::UnexpectedType { ty: error_ty, expected: "an error" }),
        };

        let detail_node = if matches!(self.types.kind(detail), Type::Map(_)) {
            debug!(%error_ty, "map error detail deferred to a placeholder");
            let placeholder = UserDefinedTypeNode::new(
                Ident::empty(span),
                Ident::new(INTERSECTED_ERROR_DETAIL, span),
                Some(self.types.builtins.intersected_error_detail),
                span,
            );
            TypeNode::Constrained(ConstrainedTypeNode {
                span,
                base: Box::new(TypeNode::BuiltInRef(BuiltInRefTypeNode { span, kind: BuiltInRefKind::Map })),
                constraint: Box::new(TypeNode::UserDefined(placeholder)),
            })
        } else {
            let named = self
                .types
                .tsymbol(detail)
                .map(|sym| self.symbols.name(sym))
                .filter(|name| !name.is_empty())
                .map(str::to_string);
            let name = match named {
                Some(name) => name,
                None => self.next_intersection_error_detail_name(env.package_id()),
            };
            TypeNode::UserDefined(UserDefinedTypeNode::new(
                Ident::empty(span),
                Ident::new(name, span),
                Some(detail),
                span,
            ))
        };

        Ok(TypeNode::Error(ErrorTypeNode {
            span,
            ty: Some(error_ty),
            detail: Some(Box::new(detail_node)),
        }))
    }

    /// Register an anonymous record type as a sealed public definition of
    /// its own, owned by the environment's scope owner
    #[instrument(skip(self, env))]
    pub fn create_anonymous_record_definition(
        &mut self,
        ty: TypeId,
        span: Span,
        env: &mut SymbolEnv<'_>,
    ) -> Result<TypeDefId, SynthesisError> {
        self.expect_record(ty)?;
        let record_symbol = self.type_symbol(ty)?;
        let (flags, name) = {
            let s = self.symbols.get(record_symbol);
            (s.flags, s.name.clone())
        };
        let owner = env.scope_owner;
        let package = self.symbols.get(owner).package;

        let def_symbol = self.symbols.create_type_definition_symbol(
            SymbolDecl::new(name.clone(), package, span)
                .flags(flags)
                .origin(Origin::Virtual)
                .ty(ty)
                .owner(owner),
        );
        self.symbols.new_scope(def_symbol);
        self.symbols.define_in(def_symbol, name.clone(), def_symbol)?;

        // Fields are rebound below, so the record starts over with an empty scope
        self.symbols.new_scope(record_symbol);
        let record = self.symbols.get_mut(record_symbol);
        record.ty = Some(ty);
        record
            .type_info_mut()
            .ok_or(SynthesisError::UnexpectedSymbol { symbol: record_symbol, expected: "a type" })?
            .type_definition = Some(def_symbol);

        let mut node = StructureTypeNode {
            span,
            ty: Some(ty),
            symbol: Some(record_symbol),
            ..Default::default()
        };
        let mut in_progress = InProgress::default();
        self.populate_fields(None, PopulateRequest {
            node: &mut node,
            target: ty,
            source: ty,
            span,
            env: &mut *env,
            package,
            in_progress: &mut in_progress,
            flags: Flags::REQUIRED,
            immutable: false,
        })?;
        node.fields = self.build_field_declarations(ty, package)?;
        node.sealed = true;
        node.analyzed = true;

        let none = self.types.builtins.none;
        if let Type::Record(record) = &mut self.types.get_mut(ty).ty {
            record.rest_field_type = Some(none);
        }

        let id = env.package.add_type_definition(TypeDefinition {
            name: Ident::new(name, span),
            ty: Some(ty),
            symbol: def_symbol,
            type_node: TypeNode::Record(node),
            flags: Flags::PUBLIC | Flags::ANONYMOUS,
            span,
        })?;
        debug!(%def_symbol, "registered anonymous record definition");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::AnonymousNames;
    use strux_symbols::SymbolTable;
    use strux_types::{ErrorType, Field, FieldMap, MapType, ObjectType, RecordType, TypeTable};

    struct Fixture {
        symbols: SymbolTable,
        types: TypeTable,
        names: AnonymousNames,
        package: Package,
        module: SymbolId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut symbols = SymbolTable::new();
            let module = symbols.create_type_symbol(SymbolDecl::new("app", PackageId(0), Span::default()));
            symbols.new_scope(module);
            Self {
                symbols,
                types: TypeTable::new(),
                names: AnonymousNames::new(),
                package: Package::new(PackageId(0), "app"),
                module,
            }
        }
    }

    #[test]
    fn transient_definition_is_not_registered() {
        let mut fx = Fixture::new();
        let ty = fx.types.alloc(Type::Record(RecordType::default()));
        let sym = fx.symbols.create_type_symbol(SymbolDecl::new("R", PackageId(0), Span::new(3, 9)).ty(ty));
        let mut synth = Synthesizer::new(&mut fx.symbols, &mut fx.types, &mut fx.names);

        let node = TypeNode::Record(StructureTypeNode::default());
        let assembly = synth.add_type_definition(ty, sym, node, None).unwrap();
        assert!(!assembly.is_registered());
        let def = assembly.definition(&fx.package);
        assert_eq!(def.name.name, "R");
        assert_eq!(def.span, Span::new(3, 9));
        assert!(fx.package.type_definitions().is_empty());
    }

    #[test]
    fn synthesized_definition_copies_template() {
        let mut fx = Fixture::new();
        let ty = fx.types.alloc(Type::Record(RecordType::default()));
        let tsym = fx.symbols.create_type_symbol(
            SymbolDecl::new("R", PackageId(0), Span::default())
                .flags(Flags::PUBLIC)
                .origin(Origin::Virtual)
                .owner(fx.module)
                .ty(ty),
        );
        fx.types.set_tsymbol(ty, tsym);
        let mut env = SymbolEnv::new(&mut fx.package, fx.module);
        let mut synth = Synthesizer::new(&mut fx.symbols, &mut fx.types, &mut fx.names);

        let node = TypeNode::Record(StructureTypeNode::default());
        let id = synth.add_synthesized_type_definition(ty, tsym, node, &mut env).unwrap();
        let def_symbol = env.package.type_definition(id).symbol;

        let s = synth.symbols.get(def_symbol);
        assert_ne!(def_symbol, tsym);
        assert_eq!(s.name, "R");
        assert_eq!(s.flags, Flags::PUBLIC);
        assert_eq!(s.origin, Origin::Virtual);
        assert_eq!(s.owner, Some(fx.module));
        assert!(s.scope.is_some());
        let linked = synth.symbols.get(tsym).type_info().and_then(|i| i.type_definition);
        assert_eq!(linked, Some(def_symbol));
    }

    #[test]
    fn missing_field_symbols_are_synthesized() {
        let mut fx = Fixture::new();
        let int = fx.types.builtins.int;
        let pure = fx.types.builtins.pure;
        let mut fields = FieldMap::new();
        fields.insert("x".to_string(), Field::new("x", int, None, Span::default()));
        let ty = fx.types.alloc(Type::Record(RecordType { fields, ..Default::default() }));
        let mut synth = Synthesizer::new(&mut fx.symbols, &mut fx.types, &mut fx.names);

        let decls = synth.build_field_declarations(ty, PackageId(0)).unwrap();
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].ty, int);
        let s = synth.symbols.get(decls[0].symbol);
        assert_eq!(s.name, "x");
        assert_eq!(s.flags, Flags::PUBLIC);
        assert_eq!(s.origin, Origin::Virtual);
        assert_eq!(s.ty, Some(pure));
    }

    #[test]
    fn class_definition_lists_object_fields() {
        let mut fx = Fixture::new();
        let string = fx.types.builtins.string;
        let ty = fx.types.alloc(Type::Object(ObjectType::default()));
        let class = fx.symbols.create_type_symbol(
            SymbolDecl::new("Counter", PackageId(0), Span::default()).flags(Flags::CLASS).ty(ty),
        );
        fx.types.set_tsymbol(ty, class);
        let field_sym = fx.symbols.create_variable_symbol(
            SymbolDecl::new("label", PackageId(0), Span::default()).ty(string).owner(class),
        );
        if let Some(fields) = fx.types.fields_mut(ty) {
            fields.insert("label".to_string(), Field::new("label", string, Some(field_sym), Span::default()));
        }
        let mut env = SymbolEnv::new(&mut fx.package, fx.module);
        let mut synth = Synthesizer::new(&mut fx.symbols, &mut fx.types, &mut fx.names);

        let id = synth.create_class_definition(Span::default(), class, &mut env).unwrap();
        let class_def = env.package.class_definition(id);
        assert_eq!(class_def.fields.len(), 1);
        assert_eq!(class_def.fields[0].symbol, field_sym);

        let err = synth.create_class_definition(Span::default(), class, &mut env).unwrap_err();
        assert!(matches!(err, SynthesisError::Registration(_)));
    }

    #[test]
    fn named_error_detail_is_referenced_directly() {
        let mut fx = Fixture::new();
        let detail = fx.types.alloc(Type::Record(RecordType::default()));
        let detail_sym = fx.symbols.create_type_symbol(SymbolDecl::new("Detail", PackageId(0), Span::default()));
        fx.types.set_tsymbol(detail, detail_sym);
        let err_ty = fx.types.alloc(Type::Error(ErrorType { detail }));
        let env = SymbolEnv::new(&mut fx.package, fx.module);
        let mut synth = Synthesizer::new(&mut fx.symbols, &mut fx.types, &mut fx.names);

        let node = synth.build_error_type_node(Span::default(), err_ty, &env).unwrap();
        let TypeNode::Error(err) = node else { panic!("expected error node") };
        match err.detail.as_deref() {
            Some(TypeNode::UserDefined(u)) => {
                assert_eq!(u.type_name.name, "Detail");
                assert_eq!(u.ty, Some(detail));
            }
            other => panic!("unexpected detail {:?}", other),
        }
    }

    #[test]
    fn anonymous_error_detail_gets_fresh_name() {
        let mut fx = Fixture::new();
        let detail = fx.types.alloc(Type::Record(RecordType::default()));
        let err_ty = fx.types.alloc(Type::Error(ErrorType { detail }));
        let env = SymbolEnv::new(&mut fx.package, fx.module);
        let mut synth = Synthesizer::new(&mut fx.symbols, &mut fx.types, &mut fx.names);

        let first = synth.build_error_type_node(Span::default(), err_ty, &env).unwrap();
        let second = synth.build_error_type_node(Span::default(), err_ty, &env).unwrap();
        let name = |node: &TypeNode| match node {
            TypeNode::Error(ErrorTypeNode { detail: Some(d), .. }) => match d.as_ref() {
                TypeNode::UserDefined(u) => u.type_name.name.clone(),
                _ => String::new(),
            },
            _ => String::new(),
        };
        assert_eq!(name(&first), "$anonIntersectionErrorDetail$_0");
        assert_eq!(name(&second), "$anonIntersectionErrorDetail$_1");
    }

    #[test]
    fn map_error_detail_is_deferred() {
        let mut fx = Fixture::new();
        let anydata = fx.types.builtins.anydata;
        let detail = fx.types.alloc(Type::Map(MapType { constraint: anydata }));
        let err_ty = fx.types.alloc(Type::Error(ErrorType { detail }));
        let env = SymbolEnv::new(&mut fx.package, fx.module);
        let mut synth = Synthesizer::new(&mut fx.symbols, &mut fx.types, &mut fx.names);

        let node = synth.build_error_type_node(Span::new(1, 2), err_ty, &env).unwrap();
        assert!(node.deferred_binding(&*synth.types));
    }

    #[test]
    fn non_error_type_is_rejected() {
        let mut fx = Fixture::new();
        let int = fx.types.builtins.int;
        let env = SymbolEnv::new(&mut fx.package, fx.module);
        let mut synth = Synthesizer::new(&mut fx.symbols, &mut fx.types, &mut fx.names);

        let err = synth.build_error_type_node(Span::default(), int, &env).unwrap_err();
        assert_eq!(err, SynthesisError::UnexpectedType { ty: int, expected: "an error" });
    }
}
