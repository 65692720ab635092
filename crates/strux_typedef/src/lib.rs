//! Type definition synthesis
//!
//! Turns an already-shaped structural type (record, object, error) into a
//! registered type definition:
//! 1. Synthesizing one field symbol per field, bound in the structure's scope
//! 2. Synthesizing the implicit `init` function
//! 3. Building the type node and registering the definition in its package
//!
//! Immutable variants go through an [`ImmutableTypeCloner`], which calls
//! back into field population for the clone.

mod alias;
mod assemble;
mod config;
mod env;
mod error;
mod fields;
mod immutable;
mod init;
mod names;
mod synth;

pub use alias::package_alias;
pub use assemble::{Assembly, INTERSECTED_ERROR_DETAIL};
pub use config::SynthesisConfig;
pub use env::SymbolEnv;
pub use error::SynthesisError;
pub use fields::{FieldRequest, PopulateRequest};
pub use immutable::{CloneRequest, ImmutableTypeCloner, InProgress, ReadonlyCloner};
pub use names::{AnonymousNameProvider, AnonymousNames};
pub use synth::Synthesizer;
