//! Symbol handles, flags and the symbol record itself

use crate::Span;

/// Handle to a symbol in a [`SymbolTable`](crate::SymbolTable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

/// Handle to a scope in a [`SymbolTable`](crate::SymbolTable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

/// Handle to a type in a `TypeTable`. Declared here so symbols can name
/// their type without depending on the type crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

/// Identity of a compilation package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageId(pub u32);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl ScopeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for SymbolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sym#{}", self.0)
    }
}

impl std::fmt::Display for ScopeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}

impl std::fmt::Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "type#{}", self.0)
    }
}

impl std::fmt::Display for PackageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pkg#{}", self.0)
    }
}

bitflags::bitflags! {
    /// Modifier bits shared by symbols, types and definitions
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Flags: u32 {
        const PUBLIC = 1 << 0;
        const PRIVATE = 1 << 1;
        const REQUIRED = 1 << 2;
        const OPTIONAL = 1 << 3;
        const READONLY = 1 << 4;
        const ATTACHED = 1 << 5;
        const ANONYMOUS = 1 << 6;
        const ISOLATED = 1 << 7;
        const CLASS = 1 << 8;
    }
}

/// Whether the user wrote a symbol or the compiler made it up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Origin {
    #[default]
    Source,
    Virtual,
}

/// Function-specific symbol data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionInfo {
    pub params: Vec<SymbolId>,
    pub rest_param: Option<SymbolId>,
    pub return_type: Option<TypeId>,
    /// Receiver variable of an attached function
    pub receiver: Option<SymbolId>,
    pub has_body: bool,
}

/// Data carried by the type symbol of a function type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvokableInfo {
    pub params: Vec<SymbolId>,
    pub rest_param: Option<SymbolId>,
    pub return_type: Option<TypeId>,
}

/// An initializer attached to a structure type
#[derive(Debug, Clone, PartialEq)]
pub struct AttachedFunction {
    pub name: String,
    pub symbol: SymbolId,
    pub ty: TypeId,
    pub span: Span,
}

/// Data carried by the symbol of a named structural type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeSymbolInfo {
    pub initializer: Option<AttachedFunction>,
    pub type_definition: Option<SymbolId>,
}

/// Kind of symbol
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolKind {
    Variable,
    Function(FunctionInfo),
    InvokableType(InvokableInfo),
    Type(TypeSymbolInfo),
    TypeDefinition,
}

impl SymbolKind {
    pub fn describe(&self) -> &'static str {
        match self {
            SymbolKind::Variable => "variable",
            SymbolKind::Function(_) => "function",
            SymbolKind::InvokableType(_) => "function type",
            SymbolKind::Type(_) => "type",
            SymbolKind::TypeDefinition => "type definition",
        }
    }
}

/// A named entity in the semantic model
#[derive(Debug, Clone)]
pub struct Symbol {
    pub id: SymbolId,
    pub kind: SymbolKind,
    pub name: String,
    /// Name as written before any renaming, kept for diagnostics
    pub original_name: String,
    pub package: PackageId,
    pub flags: Flags,
    pub origin: Origin,
    pub span: Span,
    pub ty: Option<TypeId>,
    /// Enclosing symbol
    pub owner: Option<SymbolId>,
    /// Naming context introduced by this symbol (functions, types, definitions)
    pub scope: Option<ScopeId>,
}

impl Symbol {
    pub fn function(&self) -> Option<&FunctionInfo> {
        match &self.kind {
            SymbolKind::Function(info) => Some(info),
            _ => None,
        }
    }

    pub fn function_mut(&mut self) -> Option<&mut FunctionInfo> {
        match &mut self.kind {
            SymbolKind::Function(info) => Some(info),
            _ => None,
        }
    }

    pub fn invokable(&self) -> Option<&InvokableInfo> {
        match &self.kind {
            SymbolKind::InvokableType(info) => Some(info),
            _ => None,
        }
    }

    pub fn type_info(&self) -> Option<&TypeSymbolInfo> {
        match &self.kind {
            SymbolKind::Type(info) => Some(info),
            _ => None,
        }
    }

    pub fn type_info_mut(&mut self) -> Option<&mut TypeSymbolInfo> {
        match &mut self.kind {
            SymbolKind::Type(info) => Some(info),
            _ => None,
        }
    }
}

/// Header fields common to every symbol, used by the table factories
#[derive(Debug, Clone)]
pub struct SymbolDecl {
    pub name: String,
    pub original_name: String,
    pub package: PackageId,
    pub flags: Flags,
    pub origin: Origin,
    pub span: Span,
    pub ty: Option<TypeId>,
    pub owner: Option<SymbolId>,
}

impl SymbolDecl {
    pub fn new(name: impl Into<String>, package: PackageId, span: Span) -> Self {
        let name = name.into();
        Self {
            original_name: name.clone(),
            name,
            package,
            flags: Flags::empty(),
            origin: Origin::Source,
            span,
            ty: None,
            owner: None,
        }
    }

    pub fn original_name(mut self, original_name: impl Into<String>) -> Self {
        self.original_name = original_name.into();
        self
    }

    pub fn flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    pub fn origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    pub fn ty(mut self, ty: TypeId) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn maybe_ty(mut self, ty: Option<TypeId>) -> Self {
        self.ty = ty;
        self
    }

    pub fn owner(mut self, owner: SymbolId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn maybe_owner(mut self, owner: Option<SymbolId>) -> Self {
        self.owner = owner;
        self
    }
}
