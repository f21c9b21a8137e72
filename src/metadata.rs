//! Metadata Record and Codec
//!
//! Every stored object carries one JSON metadata attribute describing its
//! format, shape, and per-role dtypes:
//!
//! ```json
//! {"version":"1.0","format":"CSR","shape":[6,6],
//!  "data_types":{"pointers_0":"uint64","indices_1":"uint64","values":"float64"},
//!  "iso_value":1.0,"comment":"optional free text"}
//! ```
//!
//! Validation is pure and total: it performs no I/O and surfaces every
//! defect as a typed error, checked in a fixed order so callers get the
//! most fundamental problem first (version before fields, fields before
//! format, format before roles).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::array::ScalarValue;
use crate::dtype::DType;
use crate::error::{Result, SscdfError};
use crate::format::StorageFormat;

/// Format version written by this implementation
pub const FORMAT_VERSION: &str = "1.0";

/// Highest `(major, minor)` version this reader accepts
pub const SUPPORTED_VERSION: (u64, u64) = (1, 0);

/// Structural role name reserved for the value array
pub const VALUES_ROLE: &str = "values";

/// Metadata record for one stored tensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Format version as "major.minor"
    pub version: String,
    /// Normalized storage format
    pub format: StorageFormat,
    /// Dimensions: empty for scalar, `[size]` for vector, `[nrows, ncols]` for matrix
    pub shape: Vec<u64>,
    /// Declared element type per role name. Structural roles are always
    /// `uint64`; the `values` entry carries the real value dtype and is
    /// present even for iso-valued objects.
    pub data_types: BTreeMap<String, DType>,
    /// Single shared value for iso-valued objects. When present, no
    /// `values` array is stored at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iso_value: Option<ScalarValue>,
    /// Caller-supplied free text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Metadata {
    /// Build a record at the current format version
    pub fn new(format: StorageFormat, shape: Vec<u64>, data_types: BTreeMap<String, DType>) -> Self {
        Metadata {
            version: FORMAT_VERSION.to_string(),
            format,
            shape,
            data_types,
            iso_value: None,
            comment: None,
        }
    }

    /// Declared dtype of the value array
    pub fn values_dtype(&self) -> Result<DType> {
        self.data_types
            .get(VALUES_ROLE)
            .copied()
            .ok_or_else(|| SscdfError::DataTypeMissing(VALUES_ROLE.to_string()))
    }

    /// Serialize to the attribute string stored in the container
    pub fn to_attribute(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse and validate an attribute string.
    ///
    /// Validation runs against the raw JSON before the typed record is
    /// built, so malformed input yields the format's own typed errors
    /// rather than generic decoding failures.
    pub fn from_attribute(s: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(s)?;
        validate_value(&value)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Re-check an already-typed record.
    ///
    /// Covers the constraints the type system cannot: version
    /// compatibility and role completeness.
    pub fn validate(&self) -> Result<()> {
        check_version(&self.version)?;
        for binding in self.format.role_bindings() {
            if !self.data_types.contains_key(binding.role) {
                return Err(SscdfError::DataTypeMissing(binding.role.to_string()));
            }
        }
        Ok(())
    }
}

/// Parse a "major.minor" version string
pub fn parse_version(s: &str) -> Result<(u64, u64)> {
    let malformed = || SscdfError::VersionMalformed(s.to_string());
    let (major, minor) = s.split_once('.').ok_or_else(malformed)?;
    let major = major.parse().map_err(|_| malformed())?;
    let minor = minor.parse().map_err(|_| malformed())?;
    Ok((major, minor))
}

fn check_version(s: &str) -> Result<()> {
    if parse_version(s)? > SUPPORTED_VERSION {
        return Err(SscdfError::VersionIncompatible(s.to_string()));
    }
    Ok(())
}

/// Validate a raw JSON metadata object, in order: version present and
/// well-formed, version supported, required fields present, format
/// recognized, shape well-typed, data_types complete for the format.
pub fn validate_value(value: &Value) -> Result<()> {
    let version = value.get("version").ok_or(SscdfError::VersionMissing)?;
    let version = version
        .as_str()
        .ok_or_else(|| SscdfError::VersionMalformed(version.to_string()))?;
    check_version(version)?;

    for field in ["format", "shape", "data_types"] {
        if value.get(field).is_none() {
            return Err(SscdfError::FieldMissing(field));
        }
    }

    let format = &value["format"];
    let format = format
        .as_str()
        .ok_or_else(|| SscdfError::UnknownFormat(format.to_string()))?;
    let format = StorageFormat::parse(format)?;

    let shape = &value["shape"];
    let elements = shape
        .as_array()
        .ok_or_else(|| SscdfError::ShapeType(shape.to_string()))?;
    if !elements.iter().all(Value::is_u64) {
        return Err(SscdfError::ShapeType(shape.to_string()));
    }

    let data_types = &value["data_types"];
    let entries = data_types
        .as_object()
        .ok_or_else(|| SscdfError::DataTypesType(data_types.to_string()))?;
    for binding in format.role_bindings() {
        if !entries.contains_key(binding.role) {
            return Err(SscdfError::DataTypeMissing(binding.role.to_string()));
        }
    }
    for (role, dtype) in entries {
        let name = dtype
            .as_str()
            .ok_or_else(|| SscdfError::UnknownDType(dtype.to_string()))?;
        name.parse::<DType>()
            .map_err(|_| SscdfError::UnknownDType(format!("{name} (role {role})")))?;
    }
    Ok(())
}
