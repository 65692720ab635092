//! Type model for structural types
//!
//! Types are interned in a [`TypeTable`] and shared by handle: several
//! structures may point at the same field type without copying it.

mod types;
mod table;

pub use types::*;
pub use table::{Builtins, TypeEntry, TypeTable};
pub use strux_symbols::TypeId;
