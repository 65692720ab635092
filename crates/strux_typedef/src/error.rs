//! Synthesis errors
//!
//! Everything here except [`SynthesisError::Collaborator`] is an internal
//! compiler fault: upstream passes are expected to make these impossible.
//! User-facing problems were already reported before synthesis runs.

use strux_ast::RegistrationError;
use strux_symbols::{SymbolError, SymbolId, TypeId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisError {
    #[error(transparent)]
    Symbol(#[from] SymbolError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error("{ty} has no type symbol")]
    MissingTypeSymbol { ty: TypeId },

    #[error("cannot mangle a member name for {ty}: the type is unnamed")]
    MissingName { ty: TypeId },

    #[error("{ty} is not {expected} type")]
    UnexpectedType { ty: TypeId, expected: &'static str },

    #[error("{symbol} is not {expected} symbol")]
    UnexpectedSymbol { symbol: SymbolId, expected: &'static str },

    #[error("{symbol} has no type")]
    UntypedSymbol { symbol: SymbolId },

    #[error("type node is missing its {what}")]
    IncompleteNode { what: &'static str },

    #[error("immutable field synthesis requested without a type cloner")]
    ClonerRequired,

    #[error("immutable type cloning failed for {ty}: {reason}")]
    Collaborator { ty: TypeId, reason: String },
}

impl SynthesisError {
    /// True for invariant violations, false for failures reported by a collaborator
    pub fn is_internal(&self) -> bool {
        !matches!(self, SynthesisError::Collaborator { .. })
    }
}
