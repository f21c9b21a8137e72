//! Storage Format Registry
//!
//! Two closed enums cover the translation layer's two vocabularies:
//!
//! - [`NativeFormat`]: the sparse library's storage variants, as its
//!   export/import operations name them (`csr`, `hypercsc`, `bitmapr`, ...).
//! - [`StorageFormat`]: the normalized on-disk format names written into
//!   metadata (`CSR`, `DCSC`, `VEC`, ...). Bitmap and full variants fold
//!   onto their compressed structural cousins; hypersparse variants get the
//!   doubly-compressed names.
//!
//! Every format carries a fixed ordered set of structural roles, each bound
//! to the component name the native library uses for it. Exhaustive matches
//! force any new format to be wired into class, normalization, and role
//! bindings at the same time.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SscdfError;

/// Logical class of a tensor object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    Scalar,
    Vector,
    Matrix,
}

impl Class {
    /// Shape rank for this class
    pub fn rank(self) -> usize {
        match self {
            Class::Scalar => 0,
            Class::Vector => 1,
            Class::Matrix => 2,
        }
    }

    /// Size field names, in shape order.
    ///
    /// Only the legacy self-describing-attributes schema stores these as
    /// named variables; the normalized schema derives them from `shape`.
    pub fn size_fields(self) -> &'static [&'static str] {
        match self {
            Class::Scalar => &[],
            Class::Vector => &["size"],
            Class::Matrix => &["nrows", "ncols"],
        }
    }
}

/// A structural role and the native-library component name bound to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleBinding {
    /// Normalized role name, also the on-disk variable name
    pub role: &'static str,
    /// Component name in the native export/import interface
    pub native: &'static str,
}

const fn bind(role: &'static str, native: &'static str) -> RoleBinding {
    RoleBinding { role, native }
}

/// Storage variants of the native sparse library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeFormat {
    Scalar,
    ScalarEmpty,
    Sparse,
    Bitmap,
    Full,
    Csr,
    Csc,
    HyperCsr,
    HyperCsc,
    BitmapR,
    BitmapC,
    FullR,
    FullC,
    CooR,
    CooC,
}

impl NativeFormat {
    /// Native library name for this variant
    pub fn name(self) -> &'static str {
        match self {
            NativeFormat::Scalar => "scalar",
            NativeFormat::ScalarEmpty => "scalar_empty",
            NativeFormat::Sparse => "sparse",
            NativeFormat::Bitmap => "bitmap",
            NativeFormat::Full => "full",
            NativeFormat::Csr => "csr",
            NativeFormat::Csc => "csc",
            NativeFormat::HyperCsr => "hypercsr",
            NativeFormat::HyperCsc => "hypercsc",
            NativeFormat::BitmapR => "bitmapr",
            NativeFormat::BitmapC => "bitmapc",
            NativeFormat::FullR => "fullr",
            NativeFormat::FullC => "fullc",
            NativeFormat::CooR => "coor",
            NativeFormat::CooC => "cooc",
        }
    }

    /// Logical class this variant stores
    pub fn class(self) -> Class {
        match self {
            NativeFormat::Scalar | NativeFormat::ScalarEmpty => Class::Scalar,
            NativeFormat::Sparse | NativeFormat::Bitmap | NativeFormat::Full => Class::Vector,
            NativeFormat::Csr
            | NativeFormat::Csc
            | NativeFormat::HyperCsr
            | NativeFormat::HyperCsc
            | NativeFormat::BitmapR
            | NativeFormat::BitmapC
            | NativeFormat::FullR
            | NativeFormat::FullC
            | NativeFormat::CooR
            | NativeFormat::CooC => Class::Matrix,
        }
    }

    /// Canonical on-disk format this variant normalizes to.
    ///
    /// Bitmap and full variants have no compressed structure of their own,
    /// so they persist as `CSR`/`CSC`/`VEC`; the exact native variant is not
    /// preserved through a round trip, only the logical content.
    pub fn normalized(self) -> StorageFormat {
        match self {
            NativeFormat::Scalar => StorageFormat::Scalar,
            NativeFormat::ScalarEmpty => StorageFormat::ScalarEmpty,
            NativeFormat::Sparse | NativeFormat::Bitmap | NativeFormat::Full => StorageFormat::Vec,
            NativeFormat::Csr | NativeFormat::BitmapR | NativeFormat::FullR => StorageFormat::Csr,
            NativeFormat::Csc | NativeFormat::BitmapC | NativeFormat::FullC => StorageFormat::Csc,
            NativeFormat::HyperCsr => StorageFormat::Dcsr,
            NativeFormat::HyperCsc => StorageFormat::Dcsc,
            NativeFormat::CooR => StorageFormat::CooR,
            NativeFormat::CooC => StorageFormat::CooC,
        }
    }
}

/// Normalized on-disk storage format names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageFormat {
    Scalar,
    ScalarEmpty,
    Vec,
    Csr,
    Csc,
    Dcsr,
    Dcsc,
    CooR,
    CooC,
}

/// All normalized formats, in metadata-name order
pub const ALL_FORMATS: [StorageFormat; 9] = [
    StorageFormat::Scalar,
    StorageFormat::ScalarEmpty,
    StorageFormat::Vec,
    StorageFormat::Csr,
    StorageFormat::Csc,
    StorageFormat::Dcsr,
    StorageFormat::Dcsc,
    StorageFormat::CooR,
    StorageFormat::CooC,
];

impl StorageFormat {
    /// Metadata name for this format
    pub fn name(self) -> &'static str {
        match self {
            StorageFormat::Scalar => "SCALAR",
            StorageFormat::ScalarEmpty => "SCALAR_EMPTY",
            StorageFormat::Vec => "VEC",
            StorageFormat::Csr => "CSR",
            StorageFormat::Csc => "CSC",
            StorageFormat::Dcsr => "DCSR",
            StorageFormat::Dcsc => "DCSC",
            StorageFormat::CooR => "COOR",
            StorageFormat::CooC => "COOC",
        }
    }

    /// Case-insensitive lookup by metadata name.
    ///
    /// `"COO"` is accepted as an alias for the row-major coordinate format.
    pub fn parse(s: &str) -> Result<Self, SscdfError> {
        let upper = s.to_ascii_uppercase();
        if upper == "COO" {
            return Ok(StorageFormat::CooR);
        }
        ALL_FORMATS
            .into_iter()
            .find(|f| f.name() == upper)
            .ok_or_else(|| SscdfError::UnknownFormat(s.to_string()))
    }

    /// Logical class this format stores
    pub fn class(self) -> Class {
        match self {
            StorageFormat::Scalar | StorageFormat::ScalarEmpty => Class::Scalar,
            StorageFormat::Vec => Class::Vector,
            StorageFormat::Csr
            | StorageFormat::Csc
            | StorageFormat::Dcsr
            | StorageFormat::Dcsc
            | StorageFormat::CooR
            | StorageFormat::CooC => Class::Matrix,
        }
    }

    /// The specific native variant used to export or import this format.
    ///
    /// Normalized formats only exist in pre-sorted compressed form, so this
    /// is always the fully structural variant, never bitmap or full.
    pub fn native(self) -> NativeFormat {
        match self {
            StorageFormat::Scalar => NativeFormat::Scalar,
            StorageFormat::ScalarEmpty => NativeFormat::ScalarEmpty,
            StorageFormat::Vec => NativeFormat::Sparse,
            StorageFormat::Csr => NativeFormat::Csr,
            StorageFormat::Csc => NativeFormat::Csc,
            StorageFormat::Dcsr => NativeFormat::HyperCsr,
            StorageFormat::Dcsc => NativeFormat::HyperCsc,
            StorageFormat::CooR => NativeFormat::CooR,
            StorageFormat::CooC => NativeFormat::CooC,
        }
    }

    /// Structural roles this format requires, in storage order, each bound
    /// to its native component name. The `values` array is not a structural
    /// role; it is governed by the iso-value rule instead.
    pub fn role_bindings(self) -> &'static [RoleBinding] {
        match self {
            StorageFormat::Scalar | StorageFormat::ScalarEmpty => &[],
            StorageFormat::Vec => const { &[bind("indices_0", "indices")] },
            StorageFormat::Csr => const {
                &[
                    bind("pointers_0", "indptr"),
                    bind("indices_1", "col_indices"),
                ]
            },
            StorageFormat::Csc => const {
                &[
                    bind("pointers_0", "indptr"),
                    bind("indices_1", "row_indices"),
                ]
            },
            StorageFormat::Dcsr => const {
                &[
                    bind("indices_0", "rows"),
                    bind("pointers_0", "indptr"),
                    bind("indices_1", "col_indices"),
                ]
            },
            StorageFormat::Dcsc => const {
                &[
                    bind("indices_0", "cols"),
                    bind("pointers_0", "indptr"),
                    bind("indices_1", "row_indices"),
                ]
            },
            StorageFormat::CooR => {
                const { &[bind("indices_0", "rows"), bind("indices_1", "cols")] }
            }
            StorageFormat::CooC => {
                const { &[bind("indices_0", "cols"), bind("indices_1", "rows")] }
            }
        }
    }
}

impl Serialize for StorageFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for StorageFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        StorageFormat::parse(&s).map_err(|_| D::Error::custom(format!("unknown format: {s:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(StorageFormat::parse("csr").unwrap(), StorageFormat::Csr);
        assert_eq!(StorageFormat::parse("DCSC").unwrap(), StorageFormat::Dcsc);
        assert_eq!(StorageFormat::parse("coo").unwrap(), StorageFormat::CooR);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(matches!(
            StorageFormat::parse("invalid"),
            Err(SscdfError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_name_parse_roundtrip() {
        for fmt in ALL_FORMATS {
            assert_eq!(StorageFormat::parse(fmt.name()).unwrap(), fmt);
        }
    }

    #[test]
    fn test_bitmap_and_full_normalize_to_compressed() {
        assert_eq!(NativeFormat::BitmapR.normalized(), StorageFormat::Csr);
        assert_eq!(NativeFormat::FullC.normalized(), StorageFormat::Csc);
        assert_eq!(NativeFormat::Bitmap.normalized(), StorageFormat::Vec);
        assert_eq!(NativeFormat::HyperCsr.normalized(), StorageFormat::Dcsr);
    }

    #[test]
    fn test_role_bindings_match_format() {
        let roles: Vec<&str> = StorageFormat::Dcsc
            .role_bindings()
            .iter()
            .map(|b| b.role)
            .collect();
        assert_eq!(roles, vec!["indices_0", "pointers_0", "indices_1"]);
        assert!(StorageFormat::ScalarEmpty.role_bindings().is_empty());
    }

    #[test]
    fn test_class_rank_and_size_fields() {
        assert_eq!(Class::Matrix.size_fields(), &["nrows", "ncols"]);
        assert_eq!(Class::Scalar.size_fields(), &[] as &[&str]);
        assert_eq!(StorageFormat::Vec.class().rank(), 1);
    }

    #[test]
    fn test_normalized_native_is_structural() {
        for fmt in ALL_FORMATS {
            let native = fmt.native();
            assert_eq!(native.normalized(), fmt);
            assert_eq!(native.class(), fmt.class());
        }
    }
}
