//! Type representation

use indexmap::IndexMap;
use strux_symbols::{Span, SymbolId, TypeId};

/// Ordered field mapping of a structure. Order is declaration order.
pub type FieldMap = IndexMap<String, Field>;

/// One member of a record or object type
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    /// Name as originally declared, kept for diagnostics
    pub original_name: String,
    pub ty: TypeId,
    /// Field symbol, owned by the structure's type symbol
    pub symbol: Option<SymbolId>,
    pub span: Span,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeId, symbol: Option<SymbolId>, span: Span) -> Self {
        let name = name.into();
        Self {
            original_name: name.clone(),
            name,
            ty,
            symbol,
            span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordType {
    pub fields: FieldMap,
    /// Closed record: no fields beyond the declared ones
    pub sealed: bool,
    /// Type of undeclared fields; `None` until decided
    pub rest_field_type: Option<TypeId>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectType {
    pub fields: FieldMap,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorType {
    pub detail: TypeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapType {
    pub constraint: TypeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvokableType {
    pub params: Vec<TypeId>,
    pub rest: Option<TypeId>,
    pub ret: TypeId,
}

/// A type whose real binding is supplied by a later pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// The anonymous detail record of an intersected error type
    IntersectedErrorDetail,
}

/// Which structural kind a structure type is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureKind {
    Record,
    Object,
}

/// A type in the semantic model
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Nil,
    Int,
    Float,
    Boolean,
    String,
    Any,
    Anydata,
    /// Type with no values
    Never,
    /// Absence of a type, e.g. a record without a rest field
    None,
    Union(Vec<TypeId>),
    Record(RecordType),
    Object(ObjectType),
    Error(ErrorType),
    Map(MapType),
    Invokable(InvokableType),
    /// Named reference to another type
    Reference(TypeId),
    Placeholder(Placeholder),
    /// Sentinel for a type that failed to resolve upstream
    SemanticError,
}

impl Type {
    pub fn structure_kind(&self) -> Option<StructureKind> {
        match self {
            Type::Record(_) => Some(StructureKind::Record),
            Type::Object(_) => Some(StructureKind::Object),
            Type::Nil | Type::Int | Type::Float | Type::Boolean | Type::String | Type::Any
            | Type::Anydata | Type::Never | Type::None | Type::Union(_) | Type::Error(_)
            | Type::Map(_) | Type::Invokable(_) | Type::Reference(_) | Type::Placeholder(_)
            | Type::SemanticError => None,
        }
    }

    pub fn fields(&self) -> Option<&FieldMap> {
        match self {
            Type::Record(r) => Some(&r.fields),
            Type::Object(o) => Some(&o.fields),
            Type::Nil | Type::Int | Type::Float | Type::Boolean | Type::String | Type::Any
            | Type::Anydata | Type::Never | Type::None | Type::Union(_) | Type::Error(_)
            | Type::Map(_) | Type::Invokable(_) | Type::Reference(_) | Type::Placeholder(_)
            | Type::SemanticError => None,
        }
    }

    pub fn fields_mut(&mut self) -> Option<&mut FieldMap> {
        match self {
            Type::Record(r) => Some(&mut r.fields),
            Type::Object(o) => Some(&mut o.fields),
            Type::Nil | Type::Int | Type::Float | Type::Boolean | Type::String | Type::Any
            | Type::Anydata | Type::Never | Type::None | Type::Union(_) | Type::Error(_)
            | Type::Map(_) | Type::Invokable(_) | Type::Reference(_) | Type::Placeholder(_)
            | Type::SemanticError => None,
        }
    }

    /// Values of this type can never be mutated, whatever the flags say
    pub fn is_inherently_immutable(&self) -> bool {
        match self {
            Type::Nil | Type::Int | Type::Float | Type::Boolean | Type::String
            | Type::Never | Type::None | Type::SemanticError | Type::Error(_)
            | Type::Invokable(_) => true,
            Type::Any | Type::Anydata | Type::Union(_) | Type::Record(_) | Type::Object(_)
            | Type::Map(_) | Type::Reference(_) | Type::Placeholder(_) => false,
        }
    }
}
