//! Symbols and scopes for the semantic model
//!
//! Every entity the compiler knows by name is a [`Symbol`] living in a
//! [`SymbolTable`] arena. Symbols refer to each other (owner, receiver,
//! parameters) and to their [`Scope`] through copyable handles, so the
//! owner <-> scope cycle never turns into an ownership cycle.

mod span;
mod symbol;
mod scope;
mod table;

pub use span::Span;
pub use symbol::*;
pub use scope::{Scope, SymbolError};
pub use table::{SymbolTable, attached_func_symbol_name};
