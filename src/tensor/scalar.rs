//! Scalar Objects
//!
//! A scalar is a zero-dimensional tensor: a dtype plus at most one stored
//! value. An empty scalar keeps its dtype, which the format preserves.

use crate::array::ScalarValue;
use crate::dtype::DType;

/// A typed scalar, possibly empty
#[derive(Debug, Clone)]
pub struct Scalar {
    dtype: DType,
    value: Option<ScalarValue>,
    name: Option<String>,
}

impl Scalar {
    /// A scalar holding one value
    pub fn new(dtype: DType, value: ScalarValue) -> Self {
        Scalar {
            dtype,
            value: Some(value),
            name: None,
        }
    }

    /// An empty scalar of the given dtype
    pub fn new_empty(dtype: DType) -> Self {
        Scalar {
            dtype,
            value: None,
            name: None,
        }
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn value(&self) -> Option<ScalarValue> {
        self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Attach a name to this object
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        // Names are labels, not content
        self.dtype == other.dtype && self.value == other.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_scalar_keeps_dtype() {
        let s = Scalar::new_empty(DType::Int32);
        assert!(s.is_empty());
        assert_eq!(s.dtype(), DType::Int32);
    }

    #[test]
    fn test_equality_ignores_name() {
        let a = Scalar::new(DType::Float64, ScalarValue::Float(5.0));
        let b = a.clone().with_name("five");
        assert_eq!(a, b);
        assert_ne!(a, Scalar::new_empty(DType::Float64));
    }
}
