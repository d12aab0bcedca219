//! STYLEGEN - style property code generator library
//!
//! Re-exports all modules for use by the binary target.

// Spec model and type mapping
pub mod color;
pub mod defaults;
pub mod error;
pub mod spec;
pub mod types;

// Generation
pub mod codegen;
pub mod shaders;

// Property evaluation runtime
pub mod runtime;

// App modules
pub mod cli;
pub mod config;

// Re-export commonly used types
pub use codegen::{Generator, GenerationReport};
pub use codegen::writer::ArtifactWriter;
pub use error::{ExpressionError, ShaderError, SpecError, TypeError};
pub use spec::{StyleSpec, parse_spec, parse_spec_str};
pub use types::TypeMapper;
