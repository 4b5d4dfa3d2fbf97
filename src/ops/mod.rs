//! High-level operations.
//!
//! This module contains the implementation of safelvgl commands.

pub mod generate;

pub use generate::{generate_facade, parse_surface, GenerateOptions, GenerateResult, ENTRY_HEADER};
