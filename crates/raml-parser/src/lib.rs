#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]

//! # raml-parser
//!
//! Resolves a RAML document into a single in-memory tree.
//!
//! The pipeline runs in a fixed order: decode the root file, splice in
//! every `!include`, apply traits (`is:`), apply resource types (`type:`),
//! then replace embedded schema strings with parsed schema fragments.
//! The result is wrapped in an [`ApiDefinition`] with typed accessors.
//!
//! ```no_run
//! use raml_parser::Parser;
//!
//! let mut parser = Parser::new();
//! let api = parser.parse("api/root.raml")?;
//! for resource in api.resources() {
//!     println!("{}", resource.path());
//! }
//! # Ok::<(), raml_parser::Error>(())
//! ```

pub mod cache;
pub mod config;
pub mod decoder;
pub mod include;
pub mod inherit;
pub mod model;
pub mod parser;
pub mod template;

pub use cache::IncludeCache;
pub use config::ParserConfig;
pub use decoder::{DocumentDecoder, YamlDecoder};
pub use include::{INCLUDE_MARKER, IncludeResolver};
pub use inherit::{DefinitionKind, DefinitionTable};
pub use model::{ApiDefinition, ParameterType, QueryParameter, Resource};
pub use parser::Parser;

use thiserror::Error;

/// Errors that can occur while resolving a document
#[derive(Error, Debug)]
pub enum Error {
    #[error("File does not exist: {path}")]
    FileNotFound { path: String },

    #[error("Document appears to be empty: {path}")]
    EmptyDocument { path: String },

    #[error("Extension \"{extension}\" not supported (yet)")]
    UnsupportedExtension { extension: String },

    #[error(transparent)]
    Schema(#[from] raml_schema::Error),

    #[error("\"{value}\" is not a valid type")]
    InvalidType { value: String },

    #[error("Decode error in {path}: {message}")]
    Decode { path: String, message: String },

    #[error("Circular include: {file}")]
    CircularInclude { file: String },

    #[error("Circular {kind} reference: {name}")]
    CircularDefinition { kind: DefinitionKind, name: String },

    #[error(transparent)]
    Tree(#[from] raml_ir::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    pub fn empty_document(path: impl Into<String>) -> Self {
        Self::EmptyDocument { path: path.into() }
    }

    pub fn unsupported_extension(extension: impl Into<String>) -> Self {
        Self::UnsupportedExtension {
            extension: extension.into(),
        }
    }

    pub fn invalid_type(value: impl Into<String>) -> Self {
        Self::InvalidType {
            value: value.into(),
        }
    }

    pub fn decode(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn circular(kind: DefinitionKind, name: impl Into<String>) -> Self {
        Self::CircularDefinition {
            kind,
            name: name.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
