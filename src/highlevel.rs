//! Tensor Deconstruction and Construction
//!
//! The translation layer between native tensor objects and the normalized
//! on-disk schema. `deconstruct` exports an object through the registry's
//! canonical variant and emits a metadata record plus named component
//! arrays; `construct` validates a record, reassembles the native import
//! call, and rebuilds the object.
//!
//! The iso-value rule lives here as an explicit sum type: a value array is
//! either stored [`ValueRepr::Explicit`]ly or collapsed to one
//! [`ValueRepr::Uniform`] scalar carried in metadata.

use std::collections::BTreeMap;

use crate::array::{Array, ScalarValue};
use crate::error::{Result, SscdfError};
use crate::format::{Class, NativeFormat, StorageFormat};
use crate::metadata::{Metadata, VALUES_ROLE};
use crate::tensor::{Export, Matrix, Scalar, Tensor, Vector};

/// Variable name for a non-empty scalar's stored value
pub const SCALAR_VALUE_ROLE: &str = "value";

/// How an object's stored values are represented on disk
#[derive(Debug, Clone, PartialEq)]
pub enum ValueRepr {
    /// One value per stored entry, persisted as a `values` array
    Explicit(Array),
    /// Every stored entry shares this value; no array is persisted
    Uniform(ScalarValue),
}

impl ValueRepr {
    /// Classify an export's value array
    pub fn from_export(values: Array, is_iso: bool) -> Result<Self> {
        if !is_iso {
            return Ok(ValueRepr::Explicit(values));
        }
        let value = values
            .first()
            .ok_or_else(|| SscdfError::ExportFailed("iso export with no stored value".into()))?;
        Ok(ValueRepr::Uniform(value))
    }
}

/// A tensor reduced to its storable pieces
#[derive(Debug, Clone, PartialEq)]
pub struct Deconstructed {
    /// Metadata record, with `iso_value` set for uniform values
    pub metadata: Metadata,
    /// Arrays to persist, keyed by role name. Structural roles are
    /// `uint64`; an explicit value array appears under `values`
    /// (`value` for scalars). Iso-valued objects store no value array.
    pub arrays: BTreeMap<String, Array>,
}

/// Deconstruct a native tensor into metadata and component arrays.
///
/// `format` overrides the object's current storage variant; it must belong
/// to the object's class. Export always sorts, so structural arrays come
/// out ascending per segment and the round trip is deterministic.
pub fn deconstruct(tensor: &Tensor, format: Option<NativeFormat>) -> Result<Deconstructed> {
    if let Some(requested) = format {
        if requested.class() != tensor.class() {
            return Err(SscdfError::ExportFailed(format!(
                "format {} does not store a {:?}",
                requested.name(),
                tensor.class()
            )));
        }
    }
    match tensor {
        Tensor::Scalar(s) => deconstruct_scalar(s),
        Tensor::Vector(v) => {
            let native = format.unwrap_or_else(|| v.format());
            let normalized = native.normalized();
            from_export(normalized, v.export(normalized.native(), true)?)
        }
        Tensor::Matrix(m) => {
            let native = format.unwrap_or_else(|| m.format());
            let normalized = native.normalized();
            from_export(normalized, m.export(normalized.native(), true)?)
        }
    }
}

fn deconstruct_scalar(s: &Scalar) -> Result<Deconstructed> {
    let format = if s.is_empty() {
        StorageFormat::ScalarEmpty
    } else {
        StorageFormat::Scalar
    };
    let mut data_types = BTreeMap::new();
    data_types.insert(VALUES_ROLE.to_string(), s.dtype());
    let mut arrays = BTreeMap::new();
    if let Some(value) = s.value() {
        arrays.insert(
            SCALAR_VALUE_ROLE.to_string(),
            Array::singleton(s.dtype(), value),
        );
    }
    Ok(Deconstructed {
        metadata: Metadata::new(format, vec![], data_types),
        arrays,
    })
}

fn from_export(format: StorageFormat, exp: Export) -> Result<Deconstructed> {
    let mut components = exp.components;
    let mut data_types = BTreeMap::new();
    let mut arrays = BTreeMap::new();
    for binding in format.role_bindings() {
        let component = components.remove(binding.native).ok_or_else(|| {
            SscdfError::ExportFailed(format!("export produced no {:?} component", binding.native))
        })?;
        data_types.insert(binding.role.to_string(), crate::dtype::DType::UInt64);
        arrays.insert(binding.role.to_string(), Array::from(component));
    }
    // The value dtype is recorded even when the array itself collapses
    // to a single iso value.
    data_types.insert(VALUES_ROLE.to_string(), exp.dtype);

    let mut metadata = Metadata::new(format, exp.shape, data_types);
    match ValueRepr::from_export(exp.values, exp.is_iso)? {
        ValueRepr::Uniform(value) => metadata.iso_value = Some(value),
        ValueRepr::Explicit(values) => {
            arrays.insert(VALUES_ROLE.to_string(), values);
        }
    }
    Ok(Deconstructed { metadata, arrays })
}

/// Construct a native tensor from a validated metadata record and its
/// component arrays, re-expanding an iso value where declared.
pub fn construct(
    metadata: &Metadata,
    arrays: &BTreeMap<String, Array>,
    name: Option<&str>,
) -> Result<Tensor> {
    metadata.validate()?;
    let tensor = match metadata.shape.len() {
        0 => construct_scalar(metadata, arrays)?,
        1 => {
            check_class(metadata, Class::Vector)?;
            let components = structural_components(metadata, arrays)?;
            let dtype = metadata.values_dtype()?;
            let (values, is_iso) = resolve_values(metadata, arrays)?;
            Tensor::Vector(Vector::import(
                metadata.format.native(),
                metadata.shape[0],
                &components,
                values,
                dtype,
                is_iso,
                true,
            )?)
        }
        2 => {
            check_class(metadata, Class::Matrix)?;
            let components = structural_components(metadata, arrays)?;
            let dtype = metadata.values_dtype()?;
            let (values, is_iso) = resolve_values(metadata, arrays)?;
            Tensor::Matrix(Matrix::import(
                metadata.format.native(),
                metadata.shape[0],
                metadata.shape[1],
                &components,
                values,
                dtype,
                is_iso,
                true,
                true,
            )?)
        }
        _ => return Err(SscdfError::InvalidShape(metadata.shape.clone())),
    };
    Ok(match (tensor, name) {
        (Tensor::Scalar(s), Some(name)) => Tensor::Scalar(s.with_name(name)),
        (Tensor::Vector(v), Some(name)) => Tensor::Vector(v.with_name(name)),
        (Tensor::Matrix(m), Some(name)) => Tensor::Matrix(m.with_name(name)),
        (tensor, None) => tensor,
    })
}

fn construct_scalar(metadata: &Metadata, arrays: &BTreeMap<String, Array>) -> Result<Tensor> {
    let dtype = metadata.values_dtype()?;
    match metadata.format {
        StorageFormat::ScalarEmpty => Ok(Tensor::Scalar(Scalar::new_empty(dtype))),
        StorageFormat::Scalar => {
            let array = arrays
                .get(SCALAR_VALUE_ROLE)
                .ok_or_else(|| SscdfError::ArrayMissing(SCALAR_VALUE_ROLE.to_string()))?;
            if array.dtype() != dtype {
                return Err(SscdfError::ImportFailed(format!(
                    "scalar value is {}, metadata declares {dtype}",
                    array.dtype()
                )));
            }
            let value = array
                .first()
                .ok_or_else(|| SscdfError::ImportFailed("scalar value array is empty".into()))?;
            Ok(Tensor::Scalar(Scalar::new(dtype, value)))
        }
        other => Err(SscdfError::ImportFailed(format!(
            "format {} does not store a scalar",
            other.name()
        ))),
    }
}

fn check_class(metadata: &Metadata, expected: Class) -> Result<()> {
    if metadata.format.class() != expected {
        return Err(SscdfError::ImportFailed(format!(
            "format {} does not store a {expected:?} (shape {:?})",
            metadata.format.name(),
            metadata.shape
        )));
    }
    Ok(())
}

/// Pull each structural role out of the fetched arrays, renamed to the
/// native component name the importer expects
fn structural_components(
    metadata: &Metadata,
    arrays: &BTreeMap<String, Array>,
) -> Result<BTreeMap<String, Vec<u64>>> {
    let mut components = BTreeMap::new();
    for binding in metadata.format.role_bindings() {
        let array = arrays
            .get(binding.role)
            .ok_or_else(|| SscdfError::ArrayMissing(binding.role.to_string()))?;
        components.insert(binding.native.to_string(), array.as_u64s()?.to_vec());
    }
    Ok(components)
}

/// Resolve the value representation declared by the metadata: a synthetic
/// iso singleton cast to the declared dtype, or the explicit array
fn resolve_values(metadata: &Metadata, arrays: &BTreeMap<String, Array>) -> Result<(Array, bool)> {
    let dtype = metadata.values_dtype()?;
    match metadata.iso_value {
        Some(value) => Ok((Array::singleton(dtype, value), true)),
        None => {
            let values = arrays
                .get(VALUES_ROLE)
                .ok_or_else(|| SscdfError::ArrayMissing(VALUES_ROLE.to_string()))?;
            Ok((values.clone(), false))
        }
    }
}
