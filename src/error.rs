//! Error Types for the sscdf Format
//!
//! One typed variant per failure mode in the format's taxonomy:
//! version errors, metadata validation errors, write conflicts,
//! native export/import failures, and container substrate errors.
//! Every error is surfaced synchronously to the immediate caller;
//! nothing is downgraded to a warning.

use std::io;
use thiserror::Error;

/// Errors produced while reading or writing sscdf containers
#[derive(Error, Debug)]
pub enum SscdfError {
    /// Metadata has no version field
    #[error("missing version attribute in metadata")]
    VersionMissing,

    /// Version field does not parse as "major.minor" integers
    #[error("malformed version string: {0:?}")]
    VersionMalformed(String),

    /// Version is newer than this reader supports
    #[error("incompatible version {0}: reader only handles version <= 1.0")]
    VersionIncompatible(String),

    /// Metadata is missing a required field
    #[error("metadata is missing required field: {0}")]
    FieldMissing(&'static str),

    /// Storage format name not in the registry
    #[error("unknown storage format: {0:?}")]
    UnknownFormat(String),

    /// Shape field is not a sequence of non-negative integers
    #[error("shape must be a sequence of non-negative integers, found {0}")]
    ShapeType(String),

    /// data_types field is not a map of role name to dtype name
    #[error("data_types must be a map of role name to dtype name, found {0}")]
    DataTypesType(String),

    /// data_types lacks an entry for a structural role required by the format
    #[error("data_types is missing an entry for {0}")]
    DataTypeMissing(String),

    /// Unrecognized dtype name in metadata
    #[error("unknown dtype name: {0:?}")]
    UnknownDType(String),

    /// Shape has a rank no tensor class corresponds to
    #[error("invalid shape: {0:?}")]
    InvalidShape(Vec<u64>),

    /// Second unnamed write into the same container
    #[error("primary tensor has already been written; additional tensors require a name")]
    PrimaryAlreadyWritten,

    /// Named write reusing an existing name
    #[error("a tensor named {0:?} already exists")]
    DuplicateName(String),

    /// Read of a secondary name that is not in the container
    #[error("no tensor named {0:?} in this container")]
    NameNotFound(String),

    /// Object group has no metadata attribute
    #[error("missing \"metadata\" attribute for {0}")]
    MetadataMissing(String),

    /// A declared array variable is absent from the object's group
    #[error("missing array variable {0:?}")]
    ArrayMissing(String),

    /// Tensor definition rejected by the native library
    #[error("invalid tensor definition: {0}")]
    InvalidTensor(String),

    /// Native export rejected the requested format/object combination
    #[error("native export failed: {0}")]
    ExportFailed(String),

    /// Native import rejected the shape/format/array combination
    #[error("native import failed: {0}")]
    ImportFailed(String),

    /// Metadata attribute is not valid JSON
    #[error("metadata JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File is not an sscdf container
    #[error("not an sscdf container (bad magic number)")]
    BadMagic,

    /// Container payload failed its checksum
    #[error("container checksum mismatch (file is corrupt or truncated)")]
    ChecksumMismatch,

    /// Container binary encoding is newer than this reader supports
    #[error("unsupported container encoding version: {0}")]
    UnsupportedEncoding(u8),

    /// Container payload failed to encode or decode
    #[error("container encoding error: {0}")]
    Encoding(String),

    /// Underlying I/O failure, propagated unchanged
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for sscdf operations
pub type Result<T> = std::result::Result<T, SscdfError>;
