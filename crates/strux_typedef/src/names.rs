//! Names for anonymous types

use rustc_hash::FxHashMap;
use strux_symbols::PackageId;

/// Hands out names for types the user never named. Names must be unique
/// within a package.
pub trait AnonymousNameProvider {
    fn next_anonymous_type_name(&mut self, package: PackageId) -> String;

    fn next_intersection_error_detail_name(&mut self, package: PackageId) -> String;
}

const ANON_TYPE: &str = "$anonType$";
const ANON_ERROR_DETAIL: &str = "$anonIntersectionErrorDetail$";

/// Counter-based provider, one counter per package and name family
#[derive(Debug, Default)]
pub struct AnonymousNames {
    types: FxHashMap<PackageId, u32>,
    error_details: FxHashMap<PackageId, u32>,
}

impl AnonymousNames {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(counters: &mut FxHashMap<PackageId, u32>, package: PackageId, prefix: &str) -> String {
        let counter = counters.entry(package).or_insert(0);
        let name = format!("{}_{}", prefix, counter);
        *counter += 1;
        name
    }
}

impl AnonymousNameProvider for AnonymousNames {
    fn next_anonymous_type_name(&mut self, package: PackageId) -> String {
        Self::next(&mut self.types, package, ANON_TYPE)
    }

    fn next_intersection_error_detail_name(&mut self, package: PackageId) -> String {
        Self::next(&mut self.error_details, package, ANON_ERROR_DETAIL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_per_package() {
        let mut names = AnonymousNames::new();
        assert_eq!(names.next_anonymous_type_name(PackageId(0)), "$anonType$_0");
        assert_eq!(names.next_anonymous_type_name(PackageId(0)), "$anonType$_1");
        assert_eq!(names.next_anonymous_type_name(PackageId(1)), "$anonType$_0");
        assert_eq!(
            names.next_intersection_error_detail_name(PackageId(0)),
            "$anonIntersectionErrorDetail$_0"
        );
    }
}
