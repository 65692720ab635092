use strux_symbols::PackageId;

use crate::env::SymbolEnv;

/// Alias under which `target` is imported, or `""` when no import names it.
///
/// Imports are scanned in declaration order and the first match wins. When
/// `comp_unit` is given, only imports declared in that compilation unit count.
pub fn package_alias(env: &SymbolEnv<'_>, comp_unit: Option<&str>, target: PackageId) -> String {
    env.package
        .imports
        .iter()
        .filter(|import| comp_unit.is_none_or(|unit| import.comp_unit.as_deref() == Some(unit)))
        .find(|import| import.package == Some(target))
        .map(|import| import.alias.name.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use strux_ast::{Ident, ImportDecl, Package};
    use strux_symbols::{Span, SymbolId};

    fn import(alias: &str, unit: &str, package: Option<u32>) -> ImportDecl {
        ImportDecl {
            alias: Ident::new(alias, Span::default()),
            comp_unit: Some(unit.to_string()),
            package: package.map(PackageId),
            span: Span::default(),
        }
    }

    #[test]
    fn same_package_has_no_alias() {
        let mut package = Package::new(PackageId(0), "app");
        package.imports.push(import("io", "main.bal", Some(3)));
        let env = SymbolEnv::new(&mut package, SymbolId(0));

        assert_eq!(package_alias(&env, None, PackageId(0)), "");
        assert_eq!(package_alias(&env, None, PackageId(3)), "io");
    }

    #[test]
    fn first_import_wins() {
        let mut package = Package::new(PackageId(0), "app");
        package.imports.push(import("first", "a.bal", Some(7)));
        package.imports.push(import("second", "a.bal", Some(7)));
        let env = SymbolEnv::new(&mut package, SymbolId(0));

        assert_eq!(package_alias(&env, None, PackageId(7)), "first");
    }

    #[test]
    fn comp_unit_filters_imports() {
        let mut package = Package::new(PackageId(0), "app");
        package.imports.push(import("x", "a.bal", Some(7)));
        package.imports.push(import("y", "b.bal", Some(7)));
        package.imports.push(import("broken", "b.bal", None));
        let env = SymbolEnv::new(&mut package, SymbolId(0));

        assert_eq!(package_alias(&env, Some("b.bal"), PackageId(7)), "y");
        assert_eq!(package_alias(&env, Some("c.bal"), PackageId(7)), "");
    }
}
