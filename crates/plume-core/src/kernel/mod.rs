//! # Plume Core Kernel
//!
//! Shared foundations for the rest of `plume-core`: the crate-wide error type
//! and the constants that name the well-known modules the registry knows about.
//!
//! - **Constants**: application identity plus the names, paths and mime data of
//!   the built-in, internal and extra-runtime modules (see [`constants`]).
//! - **Error Handling**: the crate-level [`Error`](error::Error) wrapping the
//!   plugin system and configuration errors, and the [`Result`] alias.
pub mod constants;
pub mod error;

pub use error::{Error, Result};
