//! CSS-Modules compile and link pipeline: rewrites per-file class
//! selectors into globally unique tokens and links the resulting
//! object artifacts into one bundle plus per-source class maps.

pub mod artifact;
pub mod ast;
pub mod compiler;
pub mod emitter;
pub mod error;
pub mod linker;
pub mod parser;
pub mod selector;
pub mod token;

pub use artifact::ObjectArtifact;
pub use compiler::compile;
pub use error::{Error, Result};
pub use linker::{link, LinkedOutput};
