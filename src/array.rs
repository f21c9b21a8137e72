//! Typed One-Dimensional Arrays
//!
//! `Array` is the exchange type between the native tensor library and the
//! container substrate: one fixed-length vector of a single element type.
//! Structural role arrays (pointers, indices) are always `UInt64`; the
//! `values` array carries the tensor's real dtype.
//!
//! `ScalarValue` is the single-value companion used for scalar tensors and
//! for iso-valued objects, where one value stands in for the whole array.

use serde::{Deserialize, Serialize};

use crate::dtype::DType;
use crate::error::{Result, SscdfError};

/// A one-dimensional array of a single element type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Array {
    Bool(Vec<bool>),
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    UInt8(Vec<u8>),
    UInt16(Vec<u16>),
    UInt32(Vec<u32>),
    UInt64(Vec<u64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

/// A single stored value, typed loosely the way JSON types it.
///
/// Used for metadata `iso_value` entries and scalar tensors. The declared
/// dtype in `data_types["values"]` fixes the concrete element type; this
/// enum only preserves the value through the JSON round trip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
}

macro_rules! with_vec {
    ($self:expr, $v:ident => $body:expr) => {
        match $self {
            Array::Bool($v) => $body,
            Array::Int8($v) => $body,
            Array::Int16($v) => $body,
            Array::Int32($v) => $body,
            Array::Int64($v) => $body,
            Array::UInt8($v) => $body,
            Array::UInt16($v) => $body,
            Array::UInt32($v) => $body,
            Array::UInt64($v) => $body,
            Array::Float32($v) => $body,
            Array::Float64($v) => $body,
        }
    };
}

macro_rules! map_vec {
    ($self:expr, $v:ident => $body:expr) => {
        match $self {
            Array::Bool($v) => Array::Bool($body),
            Array::Int8($v) => Array::Int8($body),
            Array::Int16($v) => Array::Int16($body),
            Array::Int32($v) => Array::Int32($body),
            Array::Int64($v) => Array::Int64($body),
            Array::UInt8($v) => Array::UInt8($body),
            Array::UInt16($v) => Array::UInt16($body),
            Array::UInt32($v) => Array::UInt32($body),
            Array::UInt64($v) => Array::UInt64($body),
            Array::Float32($v) => Array::Float32($body),
            Array::Float64($v) => Array::Float64($body),
        }
    };
}

impl Array {
    /// Element type of this array
    pub fn dtype(&self) -> DType {
        match self {
            Array::Bool(_) => DType::Bool,
            Array::Int8(_) => DType::Int8,
            Array::Int16(_) => DType::Int16,
            Array::Int32(_) => DType::Int32,
            Array::Int64(_) => DType::Int64,
            Array::UInt8(_) => DType::UInt8,
            Array::UInt16(_) => DType::UInt16,
            Array::UInt32(_) => DType::UInt32,
            Array::UInt64(_) => DType::UInt64,
            Array::Float32(_) => DType::Float32,
            Array::Float64(_) => DType::Float64,
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        with_vec!(self, v => v.len())
    }

    /// True when the array has no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Allocate an empty array of the given dtype
    pub fn empty(dtype: DType) -> Self {
        match dtype {
            DType::Bool => Array::Bool(Vec::new()),
            DType::Int8 => Array::Int8(Vec::new()),
            DType::Int16 => Array::Int16(Vec::new()),
            DType::Int32 => Array::Int32(Vec::new()),
            DType::Int64 => Array::Int64(Vec::new()),
            DType::UInt8 => Array::UInt8(Vec::new()),
            DType::UInt16 => Array::UInt16(Vec::new()),
            DType::UInt32 => Array::UInt32(Vec::new()),
            DType::UInt64 => Array::UInt64(Vec::new()),
            DType::Float32 => Array::Float32(Vec::new()),
            DType::Float64 => Array::Float64(Vec::new()),
        }
    }

    /// Reorder elements by the given index permutation.
    ///
    /// Every entry of `order` must be a valid index into the array.
    pub fn gather(&self, order: &[usize]) -> Array {
        map_vec!(self, v => order.iter().map(|&i| v[i].clone()).collect())
    }

    /// First element, loosely typed, or `None` when empty
    pub fn first(&self) -> Option<ScalarValue> {
        match self {
            Array::Bool(v) => v.first().map(|&x| ScalarValue::Bool(x)),
            Array::Int8(v) => v.first().map(|&x| ScalarValue::Int(i64::from(x))),
            Array::Int16(v) => v.first().map(|&x| ScalarValue::Int(i64::from(x))),
            Array::Int32(v) => v.first().map(|&x| ScalarValue::Int(i64::from(x))),
            Array::Int64(v) => v.first().map(|&x| ScalarValue::Int(x)),
            Array::UInt8(v) => v.first().map(|&x| ScalarValue::UInt(u64::from(x))),
            Array::UInt16(v) => v.first().map(|&x| ScalarValue::UInt(u64::from(x))),
            Array::UInt32(v) => v.first().map(|&x| ScalarValue::UInt(u64::from(x))),
            Array::UInt64(v) => v.first().map(|&x| ScalarValue::UInt(x)),
            Array::Float32(v) => v.first().map(|&x| ScalarValue::Float(f64::from(x))),
            Array::Float64(v) => v.first().map(|&x| ScalarValue::Float(x)),
        }
    }

    /// True when every element equals the first (vacuously false when empty).
    ///
    /// This is the iso-value detection used on export.
    pub fn all_equal(&self) -> bool {
        !self.is_empty() && with_vec!(self, v => v.windows(2).all(|w| w[0] == w[1]))
    }

    /// Build an array of `n` copies of `value`, coerced to `dtype`
    pub fn splat(dtype: DType, value: ScalarValue, n: usize) -> Self {
        match dtype {
            DType::Bool => Array::Bool(vec![value.to_bool(); n]),
            DType::Int8 => Array::Int8(vec![value.to_i64() as i8; n]),
            DType::Int16 => Array::Int16(vec![value.to_i64() as i16; n]),
            DType::Int32 => Array::Int32(vec![value.to_i64() as i32; n]),
            DType::Int64 => Array::Int64(vec![value.to_i64(); n]),
            DType::UInt8 => Array::UInt8(vec![value.to_u64() as u8; n]),
            DType::UInt16 => Array::UInt16(vec![value.to_u64() as u16; n]),
            DType::UInt32 => Array::UInt32(vec![value.to_u64() as u32; n]),
            DType::UInt64 => Array::UInt64(vec![value.to_u64(); n]),
            DType::Float32 => Array::Float32(vec![value.to_f64() as f32; n]),
            DType::Float64 => Array::Float64(vec![value.to_f64(); n]),
        }
    }

    /// Build a one-element array of `value` coerced to `dtype`
    pub fn singleton(dtype: DType, value: ScalarValue) -> Self {
        Self::splat(dtype, value, 1)
    }

    /// View as a `u64` slice, available only for `UInt64` arrays
    pub fn as_u64s(&self) -> Result<&[u64]> {
        match self {
            Array::UInt64(v) => Ok(v),
            other => Err(SscdfError::ImportFailed(format!(
                "expected a uint64 structural array, found {}",
                other.dtype()
            ))),
        }
    }
}

impl From<Vec<u64>> for Array {
    fn from(v: Vec<u64>) -> Self {
        Array::UInt64(v)
    }
}

impl ScalarValue {
    pub fn to_bool(self) -> bool {
        match self {
            ScalarValue::Bool(b) => b,
            ScalarValue::Int(x) => x != 0,
            ScalarValue::UInt(x) => x != 0,
            ScalarValue::Float(x) => x != 0.0,
        }
    }

    pub fn to_i64(self) -> i64 {
        match self {
            ScalarValue::Bool(b) => i64::from(b),
            ScalarValue::Int(x) => x,
            ScalarValue::UInt(x) => x as i64,
            ScalarValue::Float(x) => x as i64,
        }
    }

    pub fn to_u64(self) -> u64 {
        match self {
            ScalarValue::Bool(b) => u64::from(b),
            ScalarValue::Int(x) => x as u64,
            ScalarValue::UInt(x) => x,
            ScalarValue::Float(x) => x as u64,
        }
    }

    pub fn to_f64(self) -> f64 {
        match self {
            ScalarValue::Bool(b) => f64::from(u8::from(b)),
            ScalarValue::Int(x) => x as f64,
            ScalarValue::UInt(x) => x as f64,
            ScalarValue::Float(x) => x,
        }
    }
}
