//! Error types for the scene codec
//!
//! Decoding separates two failure classes so callers can tell a stream that
//! was cut short ([`TruncatedInputError`]) from a stream that is garbage
//! ([`FormatError`]). Encoding failures ([`EncodeError`]) mean the in-memory
//! tree breaks one of the container invariants.

use std::path::PathBuf;
use thiserror::Error;

use crate::node::NodePath;

/// The buffer ended before a length field was satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Truncated input at byte {offset}: needed {needed} bytes, {available} available")]
pub struct TruncatedInputError {
    /// Absolute offset of the read that failed
    pub offset: usize,
    /// Bytes the read required
    pub needed: usize,
    /// Bytes that were left
    pub available: usize,
}

/// Structural corruption in an encoded scene
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// First six bytes are not `FULHAX`
    #[error("Invalid magic bytes: {found:?}")]
    BadMagic { found: Vec<u8> },

    /// The document does not start with a Root node
    #[error("Expected a Root node at the top of the document, found kind {kind}")]
    RootExpected { kind: u16 },

    /// A node consumed fewer bytes than its envelope declared
    #[error("Node of kind {kind} at byte {offset} declares {declared} bytes but consumed {consumed}")]
    SizeMismatch {
        kind: u16,
        offset: usize,
        declared: u32,
        consumed: usize,
    },

    /// A read ran past the region its enclosing node declared
    #[error("Node of kind {kind} at byte {offset} overruns its declared size ({source})")]
    Overrun {
        kind: u16,
        offset: usize,
        source: TruncatedInputError,
    },

    /// Bytes left over after the Root node
    #[error("{remaining} trailing bytes after the root node")]
    TrailingBytes { remaining: usize },

    /// Nesting exceeds the configured depth limit
    #[error("Node at byte {offset} exceeds the maximum nesting depth of {max_depth}")]
    TooDeep { offset: usize, max_depth: u32 },

    /// String length prefix exceeds the configured maximum
    #[error("String at byte {offset} is {len} bytes long (max {max})")]
    StringTooLong { offset: usize, len: u32, max: u32 },

    /// String bytes are not UTF-8
    #[error("String at byte {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: usize },

    /// Vertex length outside 1..=4
    #[error("Vertex array at byte {offset} has vertex length {vert_length} (expected 1-4)")]
    InvalidVertexLength { offset: usize, vert_length: u8 },

    /// Face side count other than 3 or 4
    #[error("Index array at byte {offset} has {sides} sides per face (expected 3 or 4)")]
    InvalidSides { offset: usize, sides: u8 },

    /// A Mesh without an IndexArray child
    #[error("Mesh at byte {offset} has no index array")]
    MissingIndexArray { offset: usize },

    /// A Mesh with more than one IndexArray child
    #[error("Mesh at byte {offset} has {count} index arrays")]
    MultipleIndexArrays { offset: usize, count: usize },

    /// Mesh payload disagrees with its VertexArray children
    #[error("Mesh at byte {offset} declares {declared} vertex arrays but has {found}")]
    VertexArrayCountMismatch {
        offset: usize,
        declared: u32,
        found: usize,
    },

    /// Object payload disagrees with its Mesh children
    #[error("Object at byte {offset} declares {declared} meshes but has {found}")]
    MeshCountMismatch {
        offset: usize,
        declared: u32,
        found: usize,
    },
}

/// Errors raised while decoding
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    #[error("{0}")]
    Truncated(#[from] TruncatedInputError),
}

impl DecodeError {
    /// Whether the input was cut short rather than corrupt
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::Truncated(_))
    }

    /// Whether the input is structurally invalid
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format(_))
    }
}

/// The tree violates a container invariant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("Top-level node at {path} is not a Root")]
    RootExpected { path: NodePath },

    #[error("Mesh at {path} has no index array")]
    MissingIndexArray { path: NodePath },

    #[error("Mesh at {path} has {count} index arrays (expected exactly one)")]
    MultipleIndexArrays { path: NodePath, count: usize },

    #[error("Object at {path} has {materials} materials for {meshes} meshes")]
    MaterialCountMismatch {
        path: NodePath,
        materials: usize,
        meshes: usize,
    },

    #[error("Vertex array at {path} declares {num_elements} x {vert_length} floats but holds {floats}")]
    VertexDataMismatch {
        path: NodePath,
        num_elements: u32,
        vert_length: u8,
        floats: usize,
    },

    #[error("Vertex array at {path} has vertex length {vert_length} (expected 1-4)")]
    InvalidVertexLength { path: NodePath, vert_length: u8 },

    #[error("Index array at {path} has {sides} sides per face (expected 3 or 4)")]
    InvalidSides { path: NodePath, sides: u8 },

    #[error("Index array at {path} declares {num_faces} x {sides} indices but holds {indices}")]
    IndexDataMismatch {
        path: NodePath,
        num_faces: u32,
        sides: u8,
        indices: usize,
    },

    #[error("String at {path} is {len} bytes long (max {max})")]
    StringTooLong { path: NodePath, len: usize, max: u32 },

    #[error("Node at {path} has {count} children (max {})", u16::MAX)]
    TooManyChildren { path: NodePath, count: usize },

    #[error("Node at {path} does not fit a 32-bit size field")]
    NodeTooLarge { path: NodePath },

    #[error("Node at {path} exceeds the maximum nesting depth of {max_depth}")]
    TooDeep { path: NodePath, max_depth: u32 },

    #[error("Unknown node at {path} carries parsed children")]
    UnknownWithChildren { path: NodePath },

    #[error("Unknown node at {path} uses kind {kind}, which is a known node kind")]
    UnknownWithKnownKind { path: NodePath, kind: u16 },
}

/// Errors from configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid codec configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors from the file-level scene helpers
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Scene file {path} is {size} bytes (max {max})")]
    FileTooLarge { path: PathBuf, size: u64, max: u64 },
}

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

pub type EncodeResult<T> = std::result::Result<T, EncodeError>;

/// Result type for file-level scene operations
pub type Result<T> = std::result::Result<T, SceneError>;
