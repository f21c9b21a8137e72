//! # sscdf
//!
//! A container format for persisting sparse and dense tensor data
//! (matrices, vectors, scalars) with exact structural fidelity: value
//! dtype, iso-valued compression, empty and degenerate shapes, and sort
//! order all survive a round trip.
//!
//! ## Pipeline
//!
//! ```text
//! Write path:
//!   Tensor
//!       ↓
//!   [Deconstructor]     → normalized format + metadata + component arrays
//!       ↓
//!   [Container Adapter] → metadata attribute + typed array variables
//!       ↓
//!   [Dataset Substrate] → magic | version | bincode payload | crc32
//!
//! Read path: the same layers, inverted, with metadata validation
//! between the adapter and the constructor.
//! ```
//!
//! One container holds exactly one unnamed *primary* tensor and any
//! number of uniquely named *secondary* tensors. All slots are
//! write-once; the format defines no update or delete.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sscdf::{Array, Matrix, Tensor};
//!
//! let m = Matrix::from_entries(
//!     6, 6,
//!     vec![0, 3, 4, 4],
//!     vec![1, 4, 2, 3],
//!     Array::Float64(vec![1.0, 2.0, -3.0, 4.0]),
//! )?;
//! sscdf::write("graph", &Tensor::Matrix(m), Some("adjacency"))?;
//! let back = sscdf::read("graph")?;
//! ```

pub mod array;
pub mod container;
pub mod dataset;
pub mod dtype;
pub mod error;
pub mod format;
pub mod highlevel;
pub mod metadata;
pub mod tensor;

pub use array::{Array, ScalarValue};
pub use container::{apply_default_extension, Reader, WriteOptions, Writer, EXTENSION};
pub use dataset::Compression;
pub use dtype::DType;
pub use error::{Result, SscdfError};
pub use format::{Class, NativeFormat, StorageFormat};
pub use highlevel::{construct, deconstruct, Deconstructed, ValueRepr};
pub use metadata::{Metadata, FORMAT_VERSION};
pub use tensor::{Matrix, Scalar, Tensor, Vector};

use std::path::Path;

/// Write `tensor` as the primary object of a new container at `path`.
///
/// The `.sscdf` extension is appended when the path has none.
pub fn write(path: impl AsRef<Path>, tensor: &Tensor, comment: Option<&str>) -> Result<()> {
    let options = WriteOptions {
        comment: comment.map(str::to_string),
        ..WriteOptions::default()
    };
    let mut writer = Writer::create(path)?;
    writer.write_with(tensor, &options)?;
    writer.close()
}

/// Write `tensor` as a named secondary object of a new container at
/// `path`, optionally forcing a target storage variant
pub fn write_named(
    path: impl AsRef<Path>,
    tensor: &Tensor,
    name: &str,
    comment: Option<&str>,
    format: Option<NativeFormat>,
) -> Result<()> {
    let options = WriteOptions {
        comment: comment.map(str::to_string),
        format,
        ..WriteOptions::default()
    };
    let mut writer = Writer::create(path)?;
    writer.write_named_with(tensor, name, &options)?;
    writer.close()
}

/// Read the primary tensor from the container at `path`
pub fn read(path: impl AsRef<Path>) -> Result<Tensor> {
    Reader::open(path)?.read(None)
}

/// Read the named secondary tensor from the container at `path`
pub fn read_named(path: impl AsRef<Path>, name: &str) -> Result<Tensor> {
    Reader::open(path)?.read(Some(name))
}

/// Parse and validate the metadata of the primary (`None`) or a named
/// secondary tensor without reconstructing it
pub fn info(path: impl AsRef<Path>, name: Option<&str>) -> Result<Metadata> {
    Reader::open(path)?.info(name)
}

/// Names of all secondary tensors in the container at `path`
pub fn list_secondary(path: impl AsRef<Path>) -> Result<Vec<String>> {
    Ok(Reader::open(path)?.names())
}
