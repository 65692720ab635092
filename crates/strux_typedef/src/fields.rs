//! Field synthesis and structure field population

use strux_ast::{Ident, StructureTypeNode, UserDefinedTypeNode};
use strux_symbols::{Flags, Origin, PackageId, Span, SymbolDecl, SymbolId, TypeId};
use strux_types::{Field, FieldMap, StructureKind, Type};
use tracing::{debug, instrument, trace};

use crate::alias::package_alias;
use crate::env::SymbolEnv;
use crate::error::SynthesisError;
use crate::immutable::{CloneRequest, ImmutableTypeCloner, InProgress};
use crate::synth::Synthesizer;

/// Context for synthesizing one field of a structure
pub struct FieldRequest<'r, 'p> {
    /// Type symbol of the structure receiving the field
    pub structure: SymbolId,
    pub kind: StructureKind,
    pub package: PackageId,
    pub span: Span,
    pub env: &'r mut SymbolEnv<'p>,
    /// Types currently being cloned, shared with the cloner
    pub in_progress: &'r mut InProgress,
    /// Extra flag bits for every synthesized field symbol
    pub flags: Flags,
    pub immutable: bool,
}

/// Context for populating all fields of `target` from `source`
pub struct PopulateRequest<'r, 'p> {
    pub node: &'r mut StructureTypeNode,
    pub target: TypeId,
    pub source: TypeId,
    pub span: Span,
    pub env: &'r mut SymbolEnv<'p>,
    pub package: PackageId,
    pub in_progress: &'r mut InProgress,
    pub flags: Flags,
    pub immutable: bool,
}

impl Synthesizer<'_> {
    /// Build a new field (and field symbol) from `original`, bound in the
    /// scope of `req.structure`
    pub fn synthesize_field(
        &mut self,
        cloner: Option<&mut (dyn ImmutableTypeCloner + '_)>,
        original: &Field,
        req: &mut FieldRequest<'_, '_>,
    ) -> Result<Field, SynthesisError> {
        let field_ty = if req.immutable {
            let cloner = cloner.ok_or(SynthesisError::ClonerRequired)?;
            let owner = req.env.scope_owner;
            cloner.immutable_type(self, CloneRequest {
                span: req.span,
                ty: original.ty,
                env: &mut *req.env,
                package: req.package,
                owner,
                in_progress: &mut *req.in_progress,
            })?
        } else {
            original.ty
        };

        let (orig_flags, orig_span, orig_origin, original_name) = match original.symbol {
            Some(sym) => {
                let s = self.symbols.get(sym);
                (s.flags, s.span, s.origin, s.original_name.clone())
            }
            None => (Flags::empty(), original.span, Origin::Source, original.original_name.clone()),
        };

        let decl = SymbolDecl::new(&original.name, req.package, orig_span)
            .original_name(original_name.clone())
            .flags(orig_flags | req.flags)
            .origin(orig_origin)
            .ty(field_ty)
            .owner(req.structure);

        let referred = self.types.implied(field_ty);
        let entry = self.types.get(referred);
        let invokable = match (&entry.ty, entry.tsymbol) {
            (Type::Invokable(_), Some(tsym)) => self.symbols.get(tsym).invokable().cloned().map(|info| (tsym, info)),
            _ => None,
        };

        let symbol = if let Some((tsym, info)) = invokable {
            let sym = self.symbols.create_function_symbol(decl, false);
            // The function type symbol's flags replace the field's own
            let tsym_flags = self.symbols.get(tsym).flags;
            let s = self.symbols.get_mut(sym);
            if let Some(func) = s.function_mut() {
                func.params = info.params;
                func.rest_param = info.rest_param;
                func.return_type = info.return_type;
            }
            s.flags = tsym_flags;
            sym
        } else if matches!(entry.ty, Type::SemanticError) && req.kind == StructureKind::Record {
            debug!(field = %original.name, "field type failed to resolve, degrading to optional never");
            let never = self.types.builtins.never;
            self.symbols.create_variable_symbol(decl.flags(orig_flags | req.flags | Flags::OPTIONAL).ty(never))
        } else {
            self.symbols.create_variable_symbol(decl)
        };

        let ty = self.symbol_type(symbol)?;
        self.symbols.define_in(req.structure, original.name.clone(), symbol)?;
        trace!(field = %original.name, %symbol, "synthesized field");

        Ok(Field {
            name: original.name.clone(),
            original_name,
            ty,
            symbol: Some(symbol),
            span: original.span,
        })
    }

    /// Rebuild every field of `source` into `target`, in order. For immutable
    /// records the node also gets a reference to the mutable source type.
    #[instrument(skip_all, fields(target = %req.target, source = %req.source, immutable = req.immutable))]
    pub fn populate_fields(
        &mut self,
        mut cloner: Option<&mut (dyn ImmutableTypeCloner + '_)>,
        mut req: PopulateRequest<'_, '_>,
    ) -> Result<(), SynthesisError> {
        let source_kind = self.types.kind(req.source).structure_kind()
            .ok_or(SynthesisError::UnexpectedType { ty: req.source, expected: "a structure" })?;
        let target_kind = self.types.kind(req.target).structure_kind()
            .ok_or(SynthesisError::UnexpectedType { ty: req.target, expected: "a structure" })?;
        let structure = self.type_symbol(req.target)?;
        let source_fields = self.types.fields(req.source).cloned().unwrap_or_default();

        let mut field_req = FieldRequest {
            structure,
            kind: target_kind,
            package: req.package,
            span: req.span,
            env: &mut *req.env,
            in_progress: &mut *req.in_progress,
            flags: req.flags,
            immutable: req.immutable,
        };
        let mut fields = FieldMap::with_capacity(source_fields.len());
        for original in source_fields.values() {
            let field = self.synthesize_field(cloner.as_deref_mut(), original, &mut field_req)?;
            fields.insert(field.name.clone(), field);
        }
        if let Some(target_fields) = self.types.fields_mut(req.target) {
            *target_fields = fields;
        }

        // Objects cannot include the fields of another type
        if source_kind == StructureKind::Object || !req.immutable {
            return Ok(());
        }

        let source_symbol = self.type_symbol(req.source)?;
        let (source_package, source_name) = {
            let s = self.symbols.get(source_symbol);
            (s.package, s.name.clone())
        };
        let alias = package_alias(&*req.env, None, source_package);
        req.node.type_refs.push(UserDefinedTypeNode::new(
            Ident::new(alias, req.span),
            Ident::new(source_name, req.span),
            Some(req.source),
            req.span,
        ));
        Ok(())
    }
}
