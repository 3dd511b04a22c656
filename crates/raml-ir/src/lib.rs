#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]

//! # raml-ir
//!
//! Generic document tree and traversal APIs for RAML resolution.
//!
//! Every stage of the resolution pipeline (inclusion, trait and resource-type
//! inheritance, schema parsing) reads and rebuilds the same closed tree type,
//! [`Node`]. The filesystem accessor lives here as well so that the resolver
//! and the schema plugins share one view of the files a document references.

/// Filesystem accessor used for includes and schema references.
pub mod fs;
/// Core tree node model.
pub mod node;
/// Cursor navigation and leaf walkers.
pub mod traversal;

/// Filesystem implementations.
pub use fs::{FileSystem, LocalFileSystem, MemoryFileSystem};
/// Node primitives for tree structure and scalar typing.
pub use node::{Float, Map, Node, Scalar, SchemaFragment, merge_value};
/// Traversal entry points.
pub use traversal::{Cursor, for_each_leaf, try_for_each_leaf_mut};

use thiserror::Error;

/// Errors that can occur when navigating the tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Node not found at path: {path}")]
    NodeNotFound { path: String },

    #[error("Type mismatch at '{path}': expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },
}

impl Error {
    /// Build a node-not-found error with path context.
    pub fn node_not_found(path: impl Into<String>) -> Self {
        Self::NodeNotFound { path: path.into() }
    }

    /// Build a type-mismatch error with path context.
    pub fn type_mismatch(
        path: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            path: path.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Crate-local result type for tree operations.
pub type Result<T> = std::result::Result<T, Error>;
