//! Common types shared by every message: identifiers and error types

pub mod errors;
pub mod identifiers;
