//! Sparse Matrix Objects
//!
//! Entries are held canonically as row-major sorted coordinates. Export
//! derives any structural variant from the coordinates: compressed row or
//! column (pointer array sized to the full dimension), doubly-compressed
//! hypersparse (explicit list of non-empty segments), or plain coordinate
//! pairs in either orientation. Import inverts each variant back to
//! coordinates and re-canonicalizes.

use std::collections::BTreeMap;

use crate::array::Array;
use crate::dtype::DType;
use crate::error::{Result, SscdfError};
use crate::format::{Class, NativeFormat};
use crate::tensor::vector::{component, expand_values};
use crate::tensor::Export;

/// A sparse matrix of fixed dimensions
#[derive(Debug, Clone)]
pub struct Matrix {
    nrows: u64,
    ncols: u64,
    rows: Vec<u64>,
    cols: Vec<u64>,
    values: Array,
    format: NativeFormat,
    name: Option<String>,
}

impl Matrix {
    /// Build a matrix from (row, col, value) entries.
    ///
    /// Entries may arrive in any order; they are sorted row-major.
    /// Duplicate or out-of-range coordinates are rejected.
    pub fn from_entries(
        nrows: u64,
        ncols: u64,
        rows: Vec<u64>,
        cols: Vec<u64>,
        values: Array,
    ) -> Result<Self> {
        if rows.len() != cols.len() || rows.len() != values.len() {
            return Err(SscdfError::InvalidTensor(format!(
                "{} rows, {} cols, {} values",
                rows.len(),
                cols.len(),
                values.len()
            )));
        }
        if let Some(&r) = rows.iter().find(|&&r| r >= nrows) {
            return Err(SscdfError::InvalidTensor(format!(
                "row {r} out of range for nrows {nrows}"
            )));
        }
        if let Some(&c) = cols.iter().find(|&&c| c >= ncols) {
            return Err(SscdfError::InvalidTensor(format!(
                "column {c} out of range for ncols {ncols}"
            )));
        }
        let order = sorted_order(&rows, &cols, false);
        let rows: Vec<u64> = order.iter().map(|&i| rows[i]).collect();
        let cols: Vec<u64> = order.iter().map(|&i| cols[i]).collect();
        if rows
            .windows(2)
            .zip(cols.windows(2))
            .any(|(r, c)| r[0] == r[1] && c[0] == c[1])
        {
            return Err(SscdfError::InvalidTensor("duplicate coordinate".into()));
        }
        let values = values.gather(&order);
        Ok(Matrix {
            nrows,
            ncols,
            rows,
            cols,
            values,
            format: NativeFormat::Csr,
            name: None,
        })
    }

    /// An empty matrix of the given dimensions and dtype
    pub fn new(nrows: u64, ncols: u64, dtype: DType) -> Self {
        Matrix {
            nrows,
            ncols,
            rows: Vec::new(),
            cols: Vec::new(),
            values: Array::empty(dtype),
            format: NativeFormat::Csr,
            name: None,
        }
    }

    pub fn nrows(&self) -> u64 {
        self.nrows
    }

    pub fn ncols(&self) -> u64 {
        self.ncols
    }

    pub fn nvals(&self) -> u64 {
        self.rows.len() as u64
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
        if format.class() != Class::Matrix {
            return Err(SscdfError::InvalidTensor(format!(
                "{} is not a matrix storage variant",
                format.name()
            )));
        }
        self.format = format;
        Ok(self)
    }

    /// Export structural components for the requested variant.
    ///
    /// Entries are held sorted, so structural arrays come out sorted per
    /// segment whether or not `sort` is requested. Bitmap and full
    /// variants carry no structure and are exported via their normalized
    /// compressed form.
    pub fn export(&self, format: NativeFormat, _sort: bool) -> Result<Export> {
        let mut components = BTreeMap::new();
        let values;
        match format {
            NativeFormat::Csr => {
                components.insert("indptr", full_pointers(&self.rows, self.nrows));
                components.insert("col_indices", self.cols.clone());
                values = self.values.clone();
            }
            NativeFormat::HyperCsr => {
                let (segs, indptr) = hyper_pointers(&self.rows);
                components.insert("rows", segs);
                components.insert("indptr", indptr);
                components.insert("col_indices", self.cols.clone());
                values = self.values.clone();
            }
            NativeFormat::CooR => {
                components.insert("rows", self.rows.clone());
                components.insert("cols", self.cols.clone());
                values = self.values.clone();
            }
            NativeFormat::Csc | NativeFormat::HyperCsc | NativeFormat::CooC => {
                let order = sorted_order(&self.rows, &self.cols, true);
                let rows: Vec<u64> = order.iter().map(|&i| self.rows[i]).collect();
                let cols: Vec<u64> = order.iter().map(|&i| self.cols[i]).collect();
                values = self.values.gather(&order);
                match format {
                    NativeFormat::Csc => {
                        components.insert("indptr", full_pointers(&cols, self.ncols));
                        components.insert("row_indices", rows);
                    }
                    NativeFormat::HyperCsc => {
                        let (segs, indptr) = hyper_pointers(&cols);
                        components.insert("cols", segs);
                        components.insert("indptr", indptr);
                        components.insert("row_indices", rows);
                    }
                    _ => {
                        components.insert("rows", rows);
                        components.insert("cols", cols);
                    }
                }
            }
            other => {
                return Err(SscdfError::ExportFailed(format!(
                    "matrix export supports structural variants, not {}",
                    other.name()
                )));
            }
        }
        Ok(Export {
            components,
            is_iso: values.all_equal(),
            values,
            shape: vec![self.nrows, self.ncols],
            dtype: self.values.dtype(),
        })
    }

    /// Import a matrix from structural components.
    ///
    /// With `is_iso`, `values` holds the single shared value and is
    /// expanded to one entry per coordinate.
    #[allow(clippy::too_many_arguments)]
    pub fn import(
        format: NativeFormat,
        nrows: u64,
        ncols: u64,
        components: &BTreeMap<String, Vec<u64>>,
        values: Array,
        dtype: DType,
        is_iso: bool,
        _sorted_rows: bool,
        _sorted_cols: bool,
    ) -> Result<Self> {
        let (rows, cols) = match format {
            NativeFormat::Csr => {
                let indptr = component(components, "indptr")?;
                let rows = expand_full_pointers(indptr, nrows)?;
                (rows, component(components, "col_indices")?.clone())
            }
            NativeFormat::Csc => {
                let indptr = component(components, "indptr")?;
                let cols = expand_full_pointers(indptr, ncols)?;
                (component(components, "row_indices")?.clone(), cols)
            }
            NativeFormat::HyperCsr => {
                let segs = component(components, "rows")?;
                let indptr = component(components, "indptr")?;
                let rows = expand_hyper_pointers(indptr, segs)?;
                (rows, component(components, "col_indices")?.clone())
            }
            NativeFormat::HyperCsc => {
                let segs = component(components, "cols")?;
                let indptr = component(components, "indptr")?;
                let cols = expand_hyper_pointers(indptr, segs)?;
                (component(components, "row_indices")?.clone(), cols)
            }
            NativeFormat::CooR | NativeFormat::CooC => (
                component(components, "rows")?.clone(),
                component(components, "cols")?.clone(),
            ),
            other => {
                return Err(SscdfError::ImportFailed(format!(
                    "matrix import supports structural variants, not {}",
                    other.name()
                )));
            }
        };
        if rows.len() != cols.len() {
            return Err(SscdfError::ImportFailed(format!(
                "{} row indices but {} column indices",
                rows.len(),
                cols.len()
            )));
        }
        let values = expand_values(values, dtype, is_iso, rows.len())?;
        let mut matrix = Matrix::from_entries(nrows, ncols, rows, cols, values)
            .map_err(|e| SscdfError::ImportFailed(e.to_string()))?;
        matrix.format = format;
        Ok(matrix)
    }
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        // Storage variant and name are not content
        self.nrows == other.nrows
            && self.ncols == other.ncols
            && self.rows == other.rows
            && self.cols == other.cols
            && self.values == other.values
    }
}

/// Permutation ordering entries row-major, or column-major when `by_col`
fn sorted_order(rows: &[u64], cols: &[u64], by_col: bool) -> Vec<usize> {
    let mut order: Vec<usize> = (0..rows.len()).collect();
    if by_col {
        order.sort_by_key(|&i| (cols[i], rows[i]));
    } else {
        order.sort_by_key(|&i| (rows[i], cols[i]));
    }
    order
}

/// Pointer array sized to the full dimension, from sorted segment ids
fn full_pointers(segments: &[u64], nsegs: u64) -> Vec<u64> {
    let mut indptr = vec![0u64; nsegs as usize + 1];
    for &seg in segments {
        indptr[seg as usize + 1] += 1;
    }
    for i in 1..indptr.len() {
        indptr[i] += indptr[i - 1];
    }
    indptr
}

/// Hypersparse compression: explicit non-empty segment list plus a pointer
/// array sized to that list
fn hyper_pointers(segments: &[u64]) -> (Vec<u64>, Vec<u64>) {
    let mut segs: Vec<u64> = Vec::new();
    let mut indptr: Vec<u64> = Vec::new();
    for (i, &seg) in segments.iter().enumerate() {
        if segs.last() != Some(&seg) {
            segs.push(seg);
            indptr.push(i as u64);
        }
    }
    indptr.push(segments.len() as u64);
    (segs, indptr)
}

/// Per-entry segment ordinals from a pointer array
fn pointer_ordinals(indptr: &[u64]) -> Result<Vec<usize>> {
    if indptr.first() != Some(&0) {
        return Err(SscdfError::ImportFailed(
            "pointer array must start at 0".into(),
        ));
    }
    if indptr.windows(2).any(|w| w[0] > w[1]) {
        return Err(SscdfError::ImportFailed(
            "pointer array must be non-decreasing".into(),
        ));
    }
    let mut ordinals = Vec::new();
    for (seg, w) in indptr.windows(2).enumerate() {
        ordinals.extend(std::iter::repeat(seg).take((w[1] - w[0]) as usize));
    }
    Ok(ordinals)
}

fn expand_full_pointers(indptr: &[u64], nsegs: u64) -> Result<Vec<u64>> {
    if indptr.len() as u64 != nsegs + 1 {
        return Err(SscdfError::ImportFailed(format!(
            "pointer array has {} entries, expected {}",
            indptr.len(),
            nsegs + 1
        )));
    }
    Ok(pointer_ordinals(indptr)?
        .into_iter()
        .map(|seg| seg as u64)
        .collect())
}

fn expand_hyper_pointers(indptr: &[u64], segs: &[u64]) -> Result<Vec<u64>> {
    if indptr.len() != segs.len() + 1 {
        return Err(SscdfError::ImportFailed(format!(
            "pointer array has {} entries for {} segments",
            indptr.len(),
            segs.len()
        )));
    }
    pointer_ordinals(indptr)?
        .into_iter()
        .map(|seg| {
            segs.get(seg).copied().ok_or_else(|| {
                SscdfError::ImportFailed("segment list shorter than pointer array".into())
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Matrix {
        Matrix::from_entries(
            6,
            6,
            vec![0, 3, 4, 4],
            vec![1, 4, 2, 3],
            Array::Float64(vec![1.0, 2.0, -3.0, 4.0]),
        )
        .unwrap()
    }

    #[test]
    fn test_csr_export() {
        let exp = sample().export(NativeFormat::Csr, true).unwrap();
        assert_eq!(exp.components["indptr"], vec![0, 1, 1, 1, 2, 4, 4]);
        assert_eq!(exp.components["col_indices"], vec![1, 4, 2, 3]);
        assert_eq!(exp.values, Array::Float64(vec![1.0, 2.0, -3.0, 4.0]));
        assert_eq!(exp.shape, vec![6, 6]);
        assert!(!exp.is_iso);
    }

    #[test]
    fn test_csc_export_reorders_values() {
        let exp = sample().export(NativeFormat::Csc, true).unwrap();
        assert_eq!(exp.components["indptr"], vec![0, 0, 1, 2, 3, 4, 4]);
        assert_eq!(exp.components["row_indices"], vec![0, 4, 4, 3]);
        assert_eq!(exp.values, Array::Float64(vec![1.0, -3.0, 4.0, 2.0]));
    }

    #[test]
    fn test_hypercsr_export_lists_nonempty_rows() {
        let exp = sample().export(NativeFormat::HyperCsr, true).unwrap();
        assert_eq!(exp.components["rows"], vec![0, 3, 4]);
        assert_eq!(exp.components["indptr"], vec![0, 1, 2, 4]);
        assert_eq!(exp.components["col_indices"], vec![1, 4, 2, 3]);
    }

    #[test]
    fn test_cooc_export_is_column_major() {
        let exp = sample().export(NativeFormat::CooC, true).unwrap();
        assert_eq!(exp.components["cols"], vec![1, 2, 3, 4]);
        assert_eq!(exp.components["rows"], vec![0, 4, 4, 3]);
    }

    #[test]
    fn test_import_inverts_export() {
        let m = sample();
        for format in [
            NativeFormat::Csr,
            NativeFormat::Csc,
            NativeFormat::HyperCsr,
            NativeFormat::HyperCsc,
            NativeFormat::CooR,
            NativeFormat::CooC,
        ] {
            let exp = m.export(format, true).unwrap();
            let components: BTreeMap<String, Vec<u64>> = exp
                .components
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect();
            let back = Matrix::import(
                format,
                6,
                6,
                &components,
                exp.values,
                exp.dtype,
                exp.is_iso,
                true,
                true,
            )
            .unwrap();
            assert_eq!(back, m, "round trip through {}", format.name());
        }
    }

    #[test]
    fn test_empty_matrix_export() {
        let m = Matrix::new(5, 7, DType::Int32);
        let exp = m.export(NativeFormat::Csr, true).unwrap();
        assert_eq!(exp.components["indptr"], vec![0; 6]);
        assert!(exp.components["col_indices"].is_empty());
        assert!(!exp.is_iso);
    }

    #[test]
    fn test_bad_pointer_array_rejected() {
        let mut components = BTreeMap::new();
        components.insert("indptr".to_string(), vec![0, 2, 1]);
        components.insert("col_indices".to_string(), vec![0, 1]);
        let err = Matrix::import(
            NativeFormat::Csr,
            2,
            2,
            &components,
            Array::Int32(vec![1, 2]),
            DType::Int32,
            false,
            true,
            true,
        )
        .unwrap_err();
        assert!(matches!(err, SscdfError::ImportFailed(_)));
    }

    #[test]
    fn test_bitmap_variant_cannot_export_structurally() {
        let err = sample().export(NativeFormat::BitmapR, true).unwrap_err();
        assert!(matches!(err, SscdfError::ExportFailed(_)));
    }
}
