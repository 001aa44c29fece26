//!
//! # Arch21 Internal Utilities Crate
//!
//! Shared helpers for the architecture-model crates:
//! serialization formats and file IO, enumerated-string normalization,
//! dependency ordering, and error-reporting helpers.
//!

pub mod ser;
pub use ser::*;

pub mod error;
pub use error::*;

pub mod context;
pub use context::*;

pub mod dep_order;
pub use dep_order::*;

pub mod enumstr;
pub use enumstr::*;
