//! Sparse Vector Objects
//!
//! Entries are held as a sorted index list plus a parallel value array.
//! Export always produces the structural `sparse` variant; bitmap and full
//! are storage hints that normalize to it.

use std::collections::BTreeMap;

use crate::array::Array;
use crate::dtype::DType;
use crate::error::{Result, SscdfError};
use crate::format::{Class, NativeFormat};
use crate::tensor::Export;

/// A sparse vector of fixed size
#[derive(Debug, Clone)]
pub struct Vector {
    size: u64,
    indices: Vec<u64>,
    values: Array,
    format: NativeFormat,
    name: Option<String>,
}

impl Vector {
    /// Build a vector from (index, value) entries.
    ///
    /// Entries may arrive in any order; they are sorted by index. Duplicate
    /// or out-of-range indices are rejected.
    pub fn from_entries(size: u64, indices: Vec<u64>, values: Array) -> Result<Self> {
        if indices.len() != values.len() {
            return Err(SscdfError::InvalidTensor(format!(
                "{} indices but {} values",
                indices.len(),
                values.len()
            )));
        }
        let (indices, values) = sort_entries(size, indices, values)?;
        Ok(Vector {
            size,
            indices,
            values,
            format: NativeFormat::Sparse,
            name: None,
        })
    }

    /// An empty vector of the given size and dtype
    pub fn new(size: u64, dtype: DType) -> Self {
        Vector {
            size,
            indices: Vec::new(),
            values: Array::empty(dtype),
            format: NativeFormat::Sparse,
            name: None,
        }
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn nvals(&self) -> u64 {
        self.indices.len() as u64
    }

    pub fn dtype(&self) -> DType {
        self.values.dtype()
    }

    /// Current native storage variant
    pub fn format(&self) -> NativeFormat {
        self.format
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Attach a name to this object
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Change the storage variant hint
    pub fn with_format(mut self, format: NativeFormat) -> Result<Self> {
        if format.class() != Class::Vector {
            return Err(SscdfError::InvalidTensor(format!(
                "{} is not a vector storage variant",
                format.name()
            )));
        }
        self.format = format;
        Ok(self)
    }

    /// Export structural components for the requested variant.
    ///
    /// Entries are held sorted, so output is sorted whether or not `sort`
    /// is requested. Only the structural `sparse` variant can be exported;
    /// bitmap and full vectors are exported via their normalized form.
    pub fn export(&self, format: NativeFormat, _sort: bool) -> Result<Export> {
        if format != NativeFormat::Sparse {
            return Err(SscdfError::ExportFailed(format!(
                "vector export supports the sparse variant, not {}",
                format.name()
            )));
        }
        let mut components = BTreeMap::new();
        components.insert("indices", self.indices.clone());
        Ok(Export {
            components,
            is_iso: self.values.all_equal(),
            values: self.values.clone(),
            shape: vec![self.size],
            dtype: self.values.dtype(),
        })
    }

    /// Import a vector from structural components.
    ///
    /// With `is_iso`, `values` holds the single shared value and is
    /// expanded to one entry per index.
    pub fn import(
        format: NativeFormat,
        size: u64,
        components: &BTreeMap<String, Vec<u64>>,
        values: Array,
        dtype: DType,
        is_iso: bool,
        _sorted_index: bool,
    ) -> Result<Self> {
        if format != NativeFormat::Sparse {
            return Err(SscdfError::ImportFailed(format!(
                "vector import supports the sparse variant, not {}",
                format.name()
            )));
        }
        let indices = component(components, "indices")?.clone();
        let values = expand_values(values, dtype, is_iso, indices.len())?;
        let (indices, values) = sort_entries(size, indices, values)?;
        Ok(Vector {
            size,
            indices,
            values,
            format: NativeFormat::Sparse,
            name: None,
        })
    }
}

impl PartialEq for Vector {
    fn eq(&self, other: &Self) -> bool {
        // Storage variant and name are not content
        self.size == other.size && self.indices == other.indices && self.values == other.values
    }
}

/// Fetch a structural component or fail with the native library's error
pub(crate) fn component<'a>(
    components: &'a BTreeMap<String, Vec<u64>>,
    name: &str,
) -> Result<&'a Vec<u64>> {
    components
        .get(name)
        .ok_or_else(|| SscdfError::ImportFailed(format!("missing component {name:?}")))
}

/// Check the value array against the declared dtype and expand an
/// iso singleton to `nvals` entries
pub(crate) fn expand_values(
    values: Array,
    dtype: DType,
    is_iso: bool,
    nvals: usize,
) -> Result<Array> {
    if values.dtype() != dtype {
        return Err(SscdfError::ImportFailed(format!(
            "values array is {}, metadata declares {dtype}",
            values.dtype()
        )));
    }
    if is_iso {
        let value = values
            .first()
            .ok_or_else(|| SscdfError::ImportFailed("iso object with no stored value".into()))?;
        return Ok(Array::splat(dtype, value, nvals));
    }
    if values.len() != nvals {
        return Err(SscdfError::ImportFailed(format!(
            "{nvals} stored entries but {} values",
            values.len()
        )));
    }
    Ok(values)
}

fn sort_entries(size: u64, indices: Vec<u64>, values: Array) -> Result<(Vec<u64>, Array)> {
    if let Some(&idx) = indices.iter().find(|&&i| i >= size) {
        return Err(SscdfError::InvalidTensor(format!(
            "index {idx} out of range for size {size}"
        )));
    }
    let mut order: Vec<usize> = (0..indices.len()).collect();
    order.sort_by_key(|&i| indices[i]);
    let sorted: Vec<u64> = order.iter().map(|&i| indices[i]).collect();
    if sorted.windows(2).any(|w| w[0] == w[1]) {
        return Err(SscdfError::InvalidTensor("duplicate index".into()));
    }
    let values = values.gather(&order);
    Ok((sorted, values))
}
