//! Immutable (readonly) variants of types

use rustc_hash::FxHashMap;
use strux_ast::{StructureTypeNode, TypeNode};
use strux_symbols::{Flags, Origin, PackageId, Span, SymbolDecl, SymbolId, TypeId};
use strux_types::{MapType, ObjectType, RecordType, StructureKind, Type, TypeEntry};
use tracing::{debug, instrument, trace};

use crate::env::SymbolEnv;
use crate::error::SynthesisError;
use crate::fields::PopulateRequest;
use crate::synth::Synthesizer;

/// Structures whose readonly clone is still being populated, keyed by the
/// original type. Lets self-referencing types resolve to the unfinished clone.
#[derive(Debug, Default)]
pub struct InProgress {
    clones: FxHashMap<TypeId, TypeId>,
}

impl InProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, original: TypeId, clone: TypeId) {
        self.clones.insert(original, clone);
    }

    pub fn get(&self, original: TypeId) -> Option<TypeId> {
        self.clones.get(&original).copied()
    }

    pub fn contains(&self, original: TypeId) -> bool {
        self.clones.contains_key(&original)
    }

    pub fn finish(&mut self, original: TypeId) {
        self.clones.remove(&original);
    }
}

/// One request for the immutable variant of a type
pub struct CloneRequest<'r, 'p> {
    pub span: Span,
    pub ty: TypeId,
    pub env: &'r mut SymbolEnv<'p>,
    pub package: PackageId,
    /// Owner for any symbols the clone needs
    pub owner: SymbolId,
    pub in_progress: &'r mut InProgress,
}

/// Produces the immutable variant of a type
pub trait ImmutableTypeCloner {
    fn immutable_type(
        &mut self,
        synth: &mut Synthesizer<'_>,
        request: CloneRequest<'_, '_>,
    ) -> Result<TypeId, SynthesisError>;
}

/// Clones types into `readonly` variants. Structures get a registered type
/// definition named `(<Name> & readonly)`. Every result is memoized.
#[derive(Debug, Default)]
pub struct ReadonlyCloner {
    cache: FxHashMap<TypeId, TypeId>,
}

impl ReadonlyCloner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone previously produced for `ty`
    pub fn cached(&self, ty: TypeId) -> Option<TypeId> {
        self.cache.get(&ty).copied()
    }

    fn clone_member(
        &mut self,
        synth: &mut Synthesizer<'_>,
        request: &mut CloneRequest<'_, '_>,
        ty: TypeId,
    ) -> Result<TypeId, SynthesisError> {
        self.immutable_type(synth, CloneRequest {
            span: request.span,
            ty,
            env: &mut *request.env,
            package: request.package,
            owner: request.owner,
            in_progress: &mut *request.in_progress,
        })
    }

    fn alloc_readonly(synth: &mut Synthesizer<'_>, original: TypeId, ty: Type) -> TypeId {
        let flags = synth.types.get(original).flags | Flags::READONLY;
        synth.types.alloc_entry(TypeEntry { ty, tsymbol: None, flags })
    }

    fn clone_structure(
        &mut self,
        synth: &mut Synthesizer<'_>,
        request: &mut CloneRequest<'_, '_>,
        original: TypeId,
        kind: StructureKind,
    ) -> Result<TypeId, SynthesisError> {
        let orig_symbol = synth.type_symbol(original)?;
        let (orig_name, orig_flags) = {
            let s = synth.symbols.get(orig_symbol);
            (s.name.clone(), s.flags)
        };
        let name = if orig_name.is_empty() || orig_flags.contains(Flags::ANONYMOUS) {
            synth.next_anonymous_type_name(request.package)
        } else {
            format!("({} & readonly)", orig_name)
        };

        let (shell, sealed, rest) = match synth.types.kind(original) {
            Type::Record(r) => (
                Type::Record(RecordType { sealed: r.sealed, ..Default::default() }),
                r.sealed,
                r.rest_field_type,
            ),
            Type::Object(_) => (Type::Object(ObjectType::default()), false, None),
            Type::Nil | Type::Int | Type::Float | Type::Boolean | Type::String | Type::Any
            | Type::Anydata | Type::Never | Type::None | Type::Union(_) | Type::Error(_)
            | Type::Map(_) | Type::Invokable(_) | Type::Reference(_) | Type::Placeholder(_)
            | Type::SemanticError => {
                return Err(SynthesisError::UnexpectedType { ty: original, expected: "a structure" });
            }
        };
        let clone = Self::alloc_readonly(synth, original, shell);
        let clone_symbol = synth.symbols.create_type_symbol(
            SymbolDecl::new(name.clone(), request.package, request.span)
                .flags(orig_flags | Flags::READONLY)
                .origin(Origin::Virtual)
                .ty(clone)
                .owner(request.owner),
        );
        synth.symbols.new_scope(clone_symbol);
        synth.types.set_tsymbol(clone, clone_symbol);
        debug!(%original, %clone, %name, "cloning structure as readonly");

        request.in_progress.begin(original, clone);
        let filled = self.fill_structure(synth, request, original, clone, clone_symbol, rest);
        request.in_progress.finish(original);
        let mut node = filled?;
        node.sealed = sealed;

        synth.create_structure_init_function(&mut node, &*request.env)?;
        let type_node = match kind {
            StructureKind::Record => TypeNode::Record(node),
            StructureKind::Object => TypeNode::Object(node),
        };
        synth.add_type_definition(clone, clone_symbol, type_node, Some(&mut *request.env))?;
        Ok(clone)
    }

    fn fill_structure(
        &mut self,
        synth: &mut Synthesizer<'_>,
        request: &mut CloneRequest<'_, '_>,
        original: TypeId,
        clone: TypeId,
        clone_symbol: SymbolId,
        rest: Option<TypeId>,
    ) -> Result<StructureTypeNode, SynthesisError> {
        let mut node = StructureTypeNode {
            span: request.span,
            ty: Some(clone),
            symbol: Some(clone_symbol),
            ..Default::default()
        };
        synth.populate_fields(Some(self as &mut dyn ImmutableTypeCloner), PopulateRequest {
            node: &mut node,
            target: clone,
            source: original,
            span: request.span,
            env: &mut *request.env,
            package: request.package,
            in_progress: &mut *request.in_progress,
            flags: Flags::READONLY,
            immutable: true,
        })?;

        if let Some(rest) = rest {
            let rest_clone = self.clone_member(synth, request, rest)?;
            if let Type::Record(record) = &mut synth.types.get_mut(clone).ty {
                record.rest_field_type = Some(rest_clone);
            }
        }
        node.fields = synth.build_field_declarations(clone, request.package)?;
        Ok(node)
    }
}

impl ImmutableTypeCloner for ReadonlyCloner {
    #[instrument(skip_all, fields(ty = %request.ty))]
    fn immutable_type(
        &mut self,
        synth: &mut Synthesizer<'_>,
        mut request: CloneRequest<'_, '_>,
    ) -> Result<TypeId, SynthesisError> {
        let ty = request.ty;
        if let Some(clone) = request.in_progress.get(ty) {
            trace!(%clone, "type is being cloned, using the unfinished clone");
            return Ok(clone);
        }
        if let Some(clone) = self.cached(ty) {
            trace!(%clone, "readonly clone cache hit");
            return Ok(clone);
        }
        if synth.types.is_readonly(ty) {
            return Ok(ty);
        }

        let original = synth.types.implied(ty);
        if original != ty {
            if let Some(clone) = request.in_progress.get(original).or_else(|| self.cached(original)) {
                return Ok(clone);
            }
            if synth.types.is_readonly(original) {
                return Ok(ty);
            }
        }

        let clone = match synth.types.kind(original) {
            Type::Placeholder(_) => {
                return Err(SynthesisError::Collaborator {
                    ty,
                    reason: "the error detail placeholder has no readonly variant".to_string(),
                });
            }
            Type::Record(_) => self.clone_structure(synth, &mut request, original, StructureKind::Record)?,
            Type::Object(_) => self.clone_structure(synth, &mut request, original, StructureKind::Object)?,
            Type::Map(map) => {
                let constraint = map.constraint;
                let constraint = self.clone_member(synth, &mut request, constraint)?;
                Self::alloc_readonly(synth, original, Type::Map(MapType { constraint }))
            }
            Type::Union(members) => {
                let members = members.clone();
                let mut cloned = Vec::with_capacity(members.len());
                for member in members {
                    cloned.push(self.clone_member(synth, &mut request, member)?);
                }
                Self::alloc_readonly(synth, original, Type::Union(cloned))
            }
            Type::Any => Self::alloc_readonly(synth, original, Type::Any),
            Type::Anydata => Self::alloc_readonly(synth, original, Type::Anydata),
            Type::Reference(_) => {
                return Err(SynthesisError::Collaborator {
                    ty,
                    reason: "the type reference does not resolve".to_string(),
                });
            }
            // Inherently immutable kinds
            Type::Nil | Type::Int | Type::Float | Type::Boolean | Type::String | Type::Never
            | Type::None | Type::Error(_) | Type::Invokable(_) | Type::SemanticError => return Ok(ty),
        };

        self.cache.insert(original, clone);
        self.cache.insert(ty, clone);
        Ok(clone)
    }
}
