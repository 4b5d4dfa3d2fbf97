//! safelvgl - A thread-safety facade generator for LVGL
//!
//! This crate provides the core library functionality for safelvgl:
//! parsing the toolkit's public declarations, emitting lock-forwarding
//! wrappers, and assembling the facade header and source files.

pub mod assemble;
pub mod emit;
pub mod ops;
pub mod parser;
pub mod runtime;
pub mod util;

pub use assemble::{Assembler, GenerationContext, TemplateEngine};
pub use emit::{NamingScheme, WrapperEmitter};
pub use parser::{HeaderParser, Param, ParsedSurface, Signature, Skip, SkipReason, TypeRef};
pub use runtime::FacadeLock;
