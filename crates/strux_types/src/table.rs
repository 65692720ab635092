//! Type arena

use strux_symbols::{Flags, SymbolId, SymbolTable, TypeId};

use crate::types::*;

/// A type plus the bookkeeping every type carries
#[derive(Debug, Clone, PartialEq)]
pub struct TypeEntry {
    pub ty: Type,
    /// Symbol naming this type, if any
    pub tsymbol: Option<SymbolId>,
    pub flags: Flags,
}

/// Types every table starts with
#[derive(Debug, Clone, Copy)]
pub struct Builtins {
    pub nil: TypeId,
    pub int: TypeId,
    pub float: TypeId,
    pub boolean: TypeId,
    pub string: TypeId,
    pub any: TypeId,
    pub anydata: TypeId,
    pub never: TypeId,
    pub none: TypeId,
    pub semantic_error: TypeId,
    /// `map<anydata>`, the detail of the plain `error` type
    pub map_anydata: TypeId,
    pub error: TypeId,
    /// `anydata|error`
    pub pure: TypeId,
    pub intersected_error_detail: TypeId,
}

/// Owns all types of a compilation
#[derive(Debug)]
pub struct TypeTable {
    entries: Vec<TypeEntry>,
    pub builtins: Builtins,
}

impl TypeTable {
    pub fn new() -> Self {
        let mut entries = Vec::new();
        let mut push = |ty: Type| {
            let id = TypeId(entries.len() as u32);
            entries.push(TypeEntry { ty, tsymbol: None, flags: Flags::empty() });
            id
        };
        let nil = push(Type::Nil);
        let int = push(Type::Int);
        let float = push(Type::Float);
        let boolean = push(Type::Boolean);
        let string = push(Type::String);
        let any = push(Type::Any);
        let anydata = push(Type::Anydata);
        let never = push(Type::Never);
        let none = push(Type::None);
        let semantic_error = push(Type::SemanticError);
        let map_anydata = push(Type::Map(MapType { constraint: anydata }));
        let error = push(Type::Error(ErrorType { detail: map_anydata }));
        let pure = push(Type::Union(vec![anydata, error]));
        let intersected_error_detail = push(Type::Placeholder(Placeholder::IntersectedErrorDetail));

        Self {
            entries,
            builtins: Builtins {
                nil, int, float, boolean, string, any, anydata, never, none,
                semantic_error, map_anydata, error, pure, intersected_error_detail,
            },
        }
    }

    pub fn alloc(&mut self, ty: Type) -> TypeId {
        self.alloc_entry(TypeEntry { ty, tsymbol: None, flags: Flags::empty() })
    }

    pub fn alloc_entry(&mut self, entry: TypeEntry) -> TypeId {
        let id = TypeId(self.entries.len() as u32);
        self.entries.push(entry);
        id
    }

    pub fn get(&self, id: TypeId) -> &TypeEntry {
        &self.entries[id.index()]
    }

    pub fn get_mut(&mut self, id: TypeId) -> &mut TypeEntry {
        &mut self.entries[id.index()]
    }

    pub fn kind(&self, id: TypeId) -> &Type {
        &self.get(id).ty
    }

    pub fn tsymbol(&self, id: TypeId) -> Option<SymbolId> {
        self.get(id).tsymbol
    }

    pub fn set_tsymbol(&mut self, id: TypeId, symbol: SymbolId) {
        self.get_mut(id).tsymbol = Some(symbol);
    }

    pub fn fields(&self, id: TypeId) -> Option<&FieldMap> {
        self.kind(id).fields()
    }

    pub fn fields_mut(&mut self, id: TypeId) -> Option<&mut FieldMap> {
        self.get_mut(id).ty.fields_mut()
    }

    pub fn is_readonly(&self, id: TypeId) -> bool {
        let entry = self.get(id);
        entry.flags.contains(Flags::READONLY) || entry.ty.is_inherently_immutable()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Follow references down to the type that decides behaviour
    pub fn implied(&self, id: TypeId) -> TypeId {
        let mut current = id;
        // A reference chain longer than the table is a cycle
        for _ in 0..self.entries.len() {
            match self.kind(current) {
                Type::Reference(referred) => current = *referred,
                _ => return current,
            }
        }
        current
    }

    /// Pretty print a type. A type met again while it is still being printed
    /// shows as `...`.
    pub fn display(&self, id: TypeId, symbols: &SymbolTable) -> String {
        self.display_inner(id, symbols, &mut Vec::new())
    }

    fn display_inner(&self, id: TypeId, symbols: &SymbolTable, visiting: &mut Vec<TypeId>) -> String {
        let entry = self.get(id);
        if let Some(sym) = entry.tsymbol {
            let name = symbols.name(sym);
            if !name.is_empty() && !matches!(entry.ty, Type::Invokable(_)) {
                return name.to_string();
            }
        }
        if visiting.contains(&id) {
            return "...".to_string();
        }
        visiting.push(id);
        let mut show = |ty: TypeId| self.display_inner(ty, symbols, visiting);
        let text = match &entry.ty {
            Type::Nil => "()".to_string(),
            Type::Int => "int".to_string(),
            Type::Float => "float".to_string(),
            Type::Boolean => "boolean".to_string(),
            Type::String => "string".to_string(),
            Type::Any => "any".to_string(),
            Type::Anydata => "anydata".to_string(),
            Type::Never => "never".to_string(),
            Type::None => "<none>".to_string(),
            Type::SemanticError => "<semantic error>".to_string(),
            Type::Union(members) => {
                let parts: Vec<_> = members.iter().map(|t| show(*t)).collect();
                parts.join("|")
            }
            Type::Record(r) => {
                let (open, close) = if r.sealed { ("{|", "|}") } else { ("{", "}") };
                let fields: Vec<_> = r.fields.values()
                    .map(|f| format!("{}: {};", f.name, show(f.ty)))
                    .collect();
                format!("record {} {} {}", open, fields.join(" "), close)
            }
            Type::Object(o) => {
                let fields: Vec<_> = o.fields.values()
                    .map(|f| format!("{}: {};", f.name, show(f.ty)))
                    .collect();
                format!("object {{ {} }}", fields.join(" "))
            }
            Type::Error(e) => format!("error<{}>", show(e.detail)),
            Type::Map(m) => format!("map<{}>", show(m.constraint)),
            Type::Invokable(f) => {
                let mut params: Vec<_> = f.params.iter().map(|t| show(*t)).collect();
                if let Some(rest) = f.rest {
                    params.push(format!("{}...", show(rest)));
                }
                let ret = show(f.ret);
                format!("function({}) returns {}", params.join(", "), ret)
            }
            Type::Reference(referred) => show(*referred),
            Type::Placeholder(Placeholder::IntersectedErrorDetail) => "<error detail>".to_string(),
        };
        visiting.pop();
        text
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strux_symbols::{PackageId, Span, SymbolDecl};

    #[test]
    fn builtins_are_distinct() {
        let table = TypeTable::new();
        let b = table.builtins;
        assert_ne!(b.nil, b.never);
        assert_ne!(b.never, b.semantic_error);
        assert!(matches!(table.kind(b.intersected_error_detail), Type::Placeholder(Placeholder::IntersectedErrorDetail)));
    }

    #[test]
    fn implied_follows_references() {
        let mut table = TypeTable::new();
        let int = table.builtins.int;
        let a = table.alloc(Type::Reference(int));
        let b = table.alloc(Type::Reference(a));
        assert_eq!(table.implied(b), int);
        assert_eq!(table.implied(int), int);
    }

    #[test]
    fn implied_stops_on_reference_cycle() {
        let mut table = TypeTable::new();
        let a = table.alloc(Type::Nil);
        let b = table.alloc(Type::Reference(a));
        table.get_mut(a).ty = Type::Reference(b);
        // Terminates; which end it lands on does not matter
        let landed = table.implied(a);
        assert!(landed == a || landed == b);
    }

    #[test]
    fn display_prefers_symbol_name() {
        let mut symbols = SymbolTable::new();
        let mut table = TypeTable::new();
        let int = table.builtins.int;
        let mut fields = FieldMap::new();
        fields.insert("a".to_string(), Field::new("a", int, None, Span::default()));
        let record = table.alloc(Type::Record(RecordType { fields, sealed: true, rest_field_type: None }));
        assert_eq!(table.display(record, &symbols), "record {| a: int; |}");

        let sym = symbols.create_type_symbol(SymbolDecl::new("R", PackageId(0), Span::default()));
        table.set_tsymbol(record, sym);
        assert_eq!(table.display(record, &symbols), "R");
    }

    #[test]
    fn display_cuts_self_reference() {
        let symbols = SymbolTable::new();
        let mut table = TypeTable::new();
        let int = table.builtins.int;
        let record = table.alloc(Type::Record(RecordType::default()));
        let union = table.alloc(Type::Union(vec![int, record]));
        if let Some(fields) = table.fields_mut(record) {
            fields.insert("next".to_string(), Field::new("next", union, None, Span::default()));
        }
        assert_eq!(table.display(record, &symbols), "record { next: int|...; }");
        assert_eq!(table.display(union, &symbols), "int|record { next: ...; }");

        let a = table.alloc(Type::Nil);
        let b = table.alloc(Type::Reference(a));
        table.get_mut(a).ty = Type::Reference(b);
        assert_eq!(table.display(a, &symbols), "...");
    }

    #[test]
    fn readonly_covers_flags_and_simple_types() {
        let mut table = TypeTable::new();
        assert!(table.is_readonly(table.builtins.string));
        let map = table.alloc(Type::Map(MapType { constraint: table.builtins.int }));
        assert!(!table.is_readonly(map));
        table.get_mut(map).flags |= Flags::READONLY;
        assert!(table.is_readonly(map));
    }
}
