#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]

//! # raml-schema
//!
//! Pluggable parsers for schemas embedded in or included by a RAML document.
//!
//! Each plugin implements [`SchemaParser`]; a [`SchemaParserRegistry`] keeps
//! them in registration order and hands out the first one that claims a file
//! or an inline fragment. The built-in [`JsonSchemaParser`] parses JSON and
//! dereferences `$ref` pointers, including references to sibling files.

pub mod json;
pub mod registry;

pub use json::JsonSchemaParser;
pub use registry::{SchemaParser, SchemaParserRegistry};

use thiserror::Error;

/// Errors that can occur when parsing schemas
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid schema in {path}: {message}")]
    InvalidSchema { path: String, message: String },

    #[error("Unresolved schema reference '{reference}' (base: {base})")]
    UnresolvedReference { reference: String, base: String },
}

impl Error {
    /// Build an invalid-schema error for the given source path.
    pub fn invalid_schema(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Build an unresolved-reference error.
    pub fn unresolved(reference: impl Into<String>, base: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            reference: reference.into(),
            base: base.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
