//! Native Tensor Objects
//!
//! In-crate realization of the sparse library the format serializes:
//! scalars, vectors, and matrices with per-variant export/import
//! operations. Entries are held canonically as sorted coordinates, so any
//! storage variant can be produced on export and normalized on import.
//!
//! Equality on these types is structural (shape, nonzero pattern, dtype,
//! values); the storage variant hint and object name are not part of it,
//! matching the format's round-trip guarantee.

pub mod matrix;
pub mod scalar;
pub mod vector;

pub use matrix::Matrix;
pub use scalar::Scalar;
pub use vector::Vector;

use std::collections::BTreeMap;

use crate::array::Array;
use crate::dtype::DType;
use crate::format::Class;

/// Result of a native export: structural components by native name, the
/// value array, and the object's shape, dtype, and iso flag.
#[derive(Debug, Clone)]
pub struct Export {
    /// Structural arrays keyed by native component name
    /// (`indptr`, `col_indices`, `rows`, ...)
    pub components: BTreeMap<&'static str, Vec<u64>>,
    /// Stored values in component order
    pub values: Array,
    /// True when every stored entry shares one value
    pub is_iso: bool,
    /// Object dimensions
    pub shape: Vec<u64>,
    /// Value element type
    pub dtype: DType,
}

/// Any tensor object the format can persist
#[derive(Debug, Clone, PartialEq)]
pub enum Tensor {
    Scalar(Scalar),
    Vector(Vector),
    Matrix(Matrix),
}

impl Tensor {
    /// Logical class of this object
    pub fn class(&self) -> Class {
        match self {
            Tensor::Scalar(_) => Class::Scalar,
            Tensor::Vector(_) => Class::Vector,
            Tensor::Matrix(_) => Class::Matrix,
        }
    }

    /// Object dimensions: empty for scalar, `[size]`, or `[nrows, ncols]`
    pub fn shape(&self) -> Vec<u64> {
        match self {
            Tensor::Scalar(_) => vec![],
            Tensor::Vector(v) => vec![v.size()],
            Tensor::Matrix(m) => vec![m.nrows(), m.ncols()],
        }
    }

    /// Value element type
    pub fn dtype(&self) -> DType {
        match self {
            Tensor::Scalar(s) => s.dtype(),
            Tensor::Vector(v) => v.dtype(),
            Tensor::Matrix(m) => m.dtype(),
        }
    }

    /// Object name, if one was attached
    pub fn name(&self) -> Option<&str> {
        match self {
            Tensor::Scalar(s) => s.name(),
            Tensor::Vector(v) => v.name(),
            Tensor::Matrix(m) => m.name(),
        }
    }
}

impl From<Scalar> for Tensor {
    fn from(s: Scalar) -> Self {
        Tensor::Scalar(s)
    }
}

impl From<Vector> for Tensor {
    fn from(v: Vector) -> Self {
        Tensor::Vector(v)
    }
}

impl From<Matrix> for Tensor {
    fn from(m: Matrix) -> Self {
        Tensor::Matrix(m)
    }
}
