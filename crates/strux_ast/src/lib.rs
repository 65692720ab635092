//! Tree nodes produced by type definition synthesis
//!
//! Nodes start as empty shells and are filled in by the synthesis pass.
//! Unlike parser output they already carry resolved types and symbols.

use strux_symbols::{Flags, PackageId, Span, SymbolId, SymbolTable, TypeId};
use strux_types::{Placeholder, Type, TypeTable};
use thiserror::Error;

/// An identifier with its location
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self { name: name.into(), span }
    }

    /// The empty identifier, e.g. a package alias in the current module
    pub fn empty(span: Span) -> Self {
        Self::new(String::new(), span)
    }
}

/// A variable declaration; used for fields and receivers
#[derive(Debug, Clone)]
pub struct VariableNode {
    pub name: Ident,
    pub ty: TypeId,
    pub symbol: SymbolId,
    pub span: Span,
}

/// A synthesized function, e.g. a structure initializer
#[derive(Debug, Clone)]
pub struct FunctionNode {
    pub name: Ident,
    pub symbol: SymbolId,
    /// Invokable type of the function
    pub ty: TypeId,
    pub receiver: Option<VariableNode>,
    pub return_type: TypeId,
    pub flags: Flags,
    pub attached: bool,
    pub span: Span,
}

/// Record or object type node
#[derive(Debug, Clone, Default)]
pub struct StructureTypeNode {
    pub span: Span,
    pub ty: Option<TypeId>,
    pub symbol: Option<SymbolId>,
    pub fields: Vec<VariableNode>,
    /// Types whose fields this structure includes
    pub type_refs: Vec<UserDefinedTypeNode>,
    pub init_function: Option<Box<FunctionNode>>,
    pub sealed: bool,
    pub analyzed: bool,
}

/// Error type node; the detail is usually a reference to a record
#[derive(Debug, Clone, Default)]
pub struct ErrorTypeNode {
    pub span: Span,
    pub ty: Option<TypeId>,
    pub detail: Option<Box<TypeNode>>,
}

/// Reference to a named type, optionally qualified by a package alias
#[derive(Debug, Clone)]
pub struct UserDefinedTypeNode {
    pub span: Span,
    pub pkg_alias: Ident,
    pub type_name: Ident,
    pub ty: Option<TypeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltInRefKind {
    Map,
}

#[derive(Debug, Clone)]
pub struct BuiltInRefTypeNode {
    pub span: Span,
    pub kind: BuiltInRefKind,
}

/// `base<constraint>`, e.g. `map<T>`
#[derive(Debug, Clone)]
pub struct ConstrainedTypeNode {
    pub span: Span,
    pub base: Box<TypeNode>,
    pub constraint: Box<TypeNode>,
}

#[derive(Debug, Clone)]
pub enum TypeNode {
    Record(StructureTypeNode),
    Object(StructureTypeNode),
    Error(ErrorTypeNode),
    UserDefined(UserDefinedTypeNode),
    Constrained(ConstrainedTypeNode),
    BuiltInRef(BuiltInRefTypeNode),
}

impl TypeNode {
    pub fn span(&self) -> Span {
        match self {
            TypeNode::Record(s) | TypeNode::Object(s) => s.span,
            TypeNode::Error(e) => e.span,
            TypeNode::UserDefined(u) => u.span,
            TypeNode::Constrained(c) => c.span,
            TypeNode::BuiltInRef(b) => b.span,
        }
    }

    pub fn structure(&self) -> Option<&StructureTypeNode> {
        match self {
            TypeNode::Record(s) | TypeNode::Object(s) => Some(s),
            _ => None,
        }
    }

    pub fn structure_mut(&mut self) -> Option<&mut StructureTypeNode> {
        match self {
            TypeNode::Record(s) | TypeNode::Object(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this node still references a type awaiting substitution
    pub fn deferred_binding(&self, types: &TypeTable) -> bool {
        match self {
            TypeNode::UserDefined(u) => u.is_placeholder(types),
            TypeNode::Constrained(c) => c.base.deferred_binding(types) || c.constraint.deferred_binding(types),
            TypeNode::Error(e) => e.detail.as_ref().is_some_and(|d| d.deferred_binding(types)),
            TypeNode::Record(s) | TypeNode::Object(s) => s.type_refs.iter().any(|r| r.is_placeholder(types)),
            TypeNode::BuiltInRef(_) => false,
        }
    }

    pub fn pretty_print(&self, indent: usize, symbols: &SymbolTable, types: &TypeTable) -> String {
        let ind = "  ".repeat(indent);
        match self {
            TypeNode::Record(s) | TypeNode::Object(s) => {
                let kind = if matches!(self, TypeNode::Record(_)) { "Record" } else { "Object" };
                let sealed = if s.sealed { " sealed" } else { "" };
                let mut out = format!("{}{}{}\n", ind, kind, sealed);
                for r in &s.type_refs {
                    out.push_str(&format!("{}  *{}\n", ind, r.qualified_name()));
                }
                for f in &s.fields {
                    out.push_str(&format!("{}  {}: {}\n", ind, f.name.name, types.display(f.ty, symbols)));
                }
                if let Some(init) = &s.init_function {
                    out.push_str(&format!("{}  init {}\n", ind, init.name.name));
                }
                out
            }
            TypeNode::Error(e) => {
                let mut out = format!("{}Error\n", ind);
                if let Some(detail) = &e.detail {
                    out.push_str(&detail.pretty_print(indent + 1, symbols, types));
                }
                out
            }
            TypeNode::UserDefined(u) => format!("{}Ref {}\n", ind, u.qualified_name()),
            TypeNode::Constrained(c) => {
                let mut out = format!("{}Constrained\n", ind);
                out.push_str(&c.base.pretty_print(indent + 1, symbols, types));
                out.push_str(&c.constraint.pretty_print(indent + 1, symbols, types));
                out
            }
            TypeNode::BuiltInRef(b) => format!("{}{:?}\n", ind, b.kind),
        }
    }
}

impl UserDefinedTypeNode {
    pub fn new(pkg_alias: Ident, type_name: Ident, ty: Option<TypeId>, span: Span) -> Self {
        Self { span, pkg_alias, type_name, ty }
    }

    pub fn qualified_name(&self) -> String {
        if self.pkg_alias.name.is_empty() {
            self.type_name.name.clone()
        } else {
            format!("{}:{}", self.pkg_alias.name, self.type_name.name)
        }
    }

    pub fn is_placeholder(&self, types: &TypeTable) -> bool {
        self.ty.is_some_and(|ty| matches!(types.kind(ty), Type::Placeholder(_)))
    }
}

impl ErrorTypeNode {
    /// Substitute the real detail record for the intersected-error-detail
    /// placeholder. Returns false if there was no placeholder to replace.
    pub fn bind_detail(&mut self, types: &TypeTable, detail: TypeId, name: &str) -> bool {
        let Some(node) = self.detail.as_deref_mut() else {
            return false;
        };
        let TypeNode::Constrained(constrained) = node else {
            return false;
        };
        let TypeNode::UserDefined(target) = constrained.constraint.as_mut() else {
            return false;
        };
        let pending = target.ty.is_some_and(|ty| {
            matches!(types.kind(ty), Type::Placeholder(Placeholder::IntersectedErrorDetail))
        });
        if !pending {
            return false;
        }
        target.type_name.name = name.to_string();
        target.ty = Some(detail);
        true
    }
}

/// A named type registered in a package
#[derive(Debug, Clone)]
pub struct TypeDefinition {
    pub name: Ident,
    pub ty: Option<TypeId>,
    pub symbol: SymbolId,
    pub type_node: TypeNode,
    pub flags: Flags,
    pub span: Span,
}

/// A class registered in a package
#[derive(Debug, Clone)]
pub struct ClassDefinition {
    pub span: Span,
    pub ty: TypeId,
    pub symbol: SymbolId,
    pub fields: Vec<VariableNode>,
}

/// Import declaration after module resolution
#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub alias: Ident,
    /// Compilation unit (source file) that declared the import
    pub comp_unit: Option<String>,
    /// Package the import resolved to; `None` if resolution failed
    pub package: Option<PackageId>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeDefId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassDefId(pub u32);

/// Errors when registering definitions into a package
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("type definition `{name}` ({symbol}) is already registered in {package}")]
    DuplicateTypeDefinition {
        name: String,
        symbol: SymbolId,
        package: PackageId,
    },
    #[error("class definition for {symbol} is already registered in {package}")]
    DuplicateClassDefinition { symbol: SymbolId, package: PackageId },
}

/// A package being compiled: its imports and the definitions registered so far
#[derive(Debug, Clone)]
pub struct Package {
    pub id: PackageId,
    pub name: String,
    pub imports: Vec<ImportDecl>,
    type_definitions: Vec<TypeDefinition>,
    class_definitions: Vec<ClassDefinition>,
}

impl Package {
    pub fn new(id: PackageId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            imports: Vec::new(),
            type_definitions: Vec::new(),
            class_definitions: Vec::new(),
        }
    }

    pub fn add_type_definition(&mut self, definition: TypeDefinition) -> Result<TypeDefId, RegistrationError> {
        if self.type_definitions.iter().any(|d| d.symbol == definition.symbol) {
            return Err(RegistrationError::DuplicateTypeDefinition {
                name: definition.name.name,
                symbol: definition.symbol,
                package: self.id,
            });
        }
        let id = TypeDefId(self.type_definitions.len() as u32);
        self.type_definitions.push(definition);
        Ok(id)
    }

    pub fn add_class_definition(&mut self, definition: ClassDefinition) -> Result<ClassDefId, RegistrationError> {
        if self.class_definitions.iter().any(|d| d.symbol == definition.symbol) {
            return Err(RegistrationError::DuplicateClassDefinition {
                symbol: definition.symbol,
                package: self.id,
            });
        }
        let id = ClassDefId(self.class_definitions.len() as u32);
        self.class_definitions.push(definition);
        Ok(id)
    }

    pub fn type_definition(&self, id: TypeDefId) -> &TypeDefinition {
        &self.type_definitions[id.0 as usize]
    }

    pub fn type_definitions(&self) -> &[TypeDefinition] {
        &self.type_definitions
    }

    pub fn find_type_definition(&self, name: &str) -> Option<&TypeDefinition> {
        self.type_definitions.iter().find(|d| d.name.name == name)
    }

    pub fn class_definition(&self, id: ClassDefId) -> &ClassDefinition {
        &self.class_definitions[id.0 as usize]
    }

    pub fn class_definitions(&self) -> &[ClassDefinition] {
        &self.class_definitions
    }

    pub fn pretty_print(&self, symbols: &SymbolTable, types: &TypeTable) -> String {
        let mut out = String::new();

        out.push_str(&format!("=== Package {} ({}) ===\n\n", self.name, self.id));

        out.push_str("--- Imports ---\n");
        for i in &self.imports {
            let target = i.package.map(|p| p.to_string()).unwrap_or_else(|| "?".to_string());
            out.push_str(&format!("  {} -> {}\n", i.alias.name, target));
        }
        out.push('\n');

        out.push_str("--- Type Definitions ---\n");
        for d in &self.type_definitions {
            let flags = if d.flags.is_empty() { String::new() } else { format!(" {:?}", d.flags) };
            out.push_str(&format!("  type {} ({}){}\n", d.name.name, d.symbol, flags));
            out.push_str(&d.type_node.pretty_print(2, symbols, types));
        }
        out.push('\n');

        out.push_str("--- Class Definitions ---\n");
        for c in &self.class_definitions {
            out.push_str(&format!("  class {} ({})\n", symbols.name(c.symbol), c.symbol));
            for f in &c.fields {
                out.push_str(&format!("    {}: {}\n", f.name.name, types.display(f.ty, symbols)));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strux_symbols::SymbolDecl;

    fn definition(symbol: SymbolId, name: &str) -> TypeDefinition {
        TypeDefinition {
            name: Ident::new(name, Span::default()),
            ty: None,
            symbol,
            type_node: TypeNode::Record(StructureTypeNode::default()),
            flags: Flags::empty(),
            span: Span::default(),
        }
    }

    #[test]
    fn registers_each_symbol_once() {
        let mut symbols = SymbolTable::new();
        let sym = symbols.create_type_definition_symbol(SymbolDecl::new("R", PackageId(1), Span::default()));
        let mut package = Package::new(PackageId(1), "app");

        let id = package.add_type_definition(definition(sym, "R")).unwrap();
        assert_eq!(package.type_definition(id).name.name, "R");

        let err = package.add_type_definition(definition(sym, "R")).unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateTypeDefinition { symbol, .. } if symbol == sym));
        assert_eq!(package.type_definitions().len(), 1);
    }

    #[test]
    fn bind_detail_replaces_placeholder_only() {
        let types = TypeTable::new();
        let span = Span::default();
        let constraint = UserDefinedTypeNode::new(
            Ident::empty(span),
            Ident::new("$IntersectedErrorDetail$", span),
            Some(types.builtins.intersected_error_detail),
            span,
        );
        let mut node = ErrorTypeNode {
            span,
            ty: None,
            detail: Some(Box::new(TypeNode::Constrained(ConstrainedTypeNode {
                span,
                base: Box::new(TypeNode::BuiltInRef(BuiltInRefTypeNode { span, kind: BuiltInRefKind::Map })),
                constraint: Box::new(TypeNode::UserDefined(constraint)),
            }))),
        };
        assert!(TypeNode::Error(node.clone()).deferred_binding(&types));

        let detail = types.builtins.map_anydata;
        assert!(node.bind_detail(&types, detail, "$anonIntersectionErrorDetail$_0"));
        assert!(!TypeNode::Error(node.clone()).deferred_binding(&types));
        // Already bound
        assert!(!node.bind_detail(&types, detail, "Other"));
    }

    #[test]
    fn qualified_name_omits_empty_alias() {
        let span = Span::default();
        let local = UserDefinedTypeNode::new(Ident::empty(span), Ident::new("R", span), None, span);
        let foreign = UserDefinedTypeNode::new(Ident::new("lib", span), Ident::new("R", span), None, span);
        assert_eq!(local.qualified_name(), "R");
        assert_eq!(foreign.qualified_name(), "lib:R");
    }
}
