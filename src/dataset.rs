//! Container Substrate
//!
//! A small hierarchical array store in the shape the format needs: nested
//! named groups, per-group string attributes, and typed one-dimensional
//! array variables with optional per-variable compression.
//!
//! ## File Encoding
//!
//! ```text
//! magic "SSCD" (4) | encoding version u8 | payload (bincode) | crc32 of payload (4, LE)
//! ```
//!
//! The payload is the bincode encoding of the root [`Group`]. Each
//! variable's array is bincode-encoded and optionally zstd-compressed
//! independently, so a reader can check declared dtype and length against
//! the decoded data. Writes are buffered in memory and only durable once
//! the dataset is serialized and flushed by its owner.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::array::Array;
use crate::dtype::DType;
use crate::error::{Result, SscdfError};

const MAGIC: &[u8; 4] = b"SSCD";
const ENCODING_VERSION: u8 = 1;
const HEADER_LEN: usize = MAGIC.len() + 1;
const TRAILER_LEN: usize = 4;

/// Compression applied to one variable's payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Compression {
    #[default]
    None,
    Zstd,
}

/// A typed one-dimensional array variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    dtype: DType,
    len: u64,
    compression: Compression,
    payload: Vec<u8>,
}

impl Variable {
    /// Encode an array, compressing its payload if requested
    pub fn encode(array: &Array, compression: Compression) -> Result<Self> {
        let raw = bincode::serialize(array).map_err(|e| SscdfError::Encoding(e.to_string()))?;
        let payload = match compression {
            Compression::None => raw,
            Compression::Zstd => zstd::stream::encode_all(raw.as_slice(), 0)?,
        };
        Ok(Variable {
            dtype: array.dtype(),
            len: array.len() as u64,
            compression,
            payload,
        })
    }

    /// Decode the stored array, checking it against the declared dtype
    /// and length
    pub fn decode(&self) -> Result<Array> {
        let raw = match self.compression {
            Compression::None => self.payload.clone(),
            Compression::Zstd => zstd::stream::decode_all(self.payload.as_slice())?,
        };
        let array: Array =
            bincode::deserialize(&raw).map_err(|e| SscdfError::Encoding(e.to_string()))?;
        if array.dtype() != self.dtype || array.len() as u64 != self.len {
            return Err(SscdfError::Encoding(format!(
                "variable declares {} x{}, payload holds {} x{}",
                self.dtype,
                self.len,
                array.dtype(),
                array.len()
            )));
        }
        Ok(array)
    }

    /// Declared element type
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Declared element count
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// One namespace: attributes, variables, and nested groups
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    attrs: BTreeMap<String, String>,
    variables: BTreeMap<String, Variable>,
    groups: BTreeMap<String, Group>,
}

impl Group {
    /// Set a string attribute, replacing any previous value
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(key.into(), value.into());
    }

    /// Fetch a string attribute
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// Store a variable under a fresh name
    pub fn create_variable(&mut self, name: impl Into<String>, variable: Variable) -> Result<()> {
        let name = name.into();
        if self.variables.contains_key(&name) {
            return Err(SscdfError::DuplicateName(name));
        }
        self.variables.insert(name, variable);
        Ok(())
    }

    /// Fetch a variable by name
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// Create a nested group under a fresh name, returning it for writing
    pub fn create_group(&mut self, name: impl Into<String>) -> Result<&mut Group> {
        let name = name.into();
        if self.groups.contains_key(&name) {
            return Err(SscdfError::DuplicateName(name));
        }
        Ok(self.groups.entry(name).or_default())
    }

    /// Fetch a nested group by name
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    /// Names of all nested groups, in sorted order
    pub fn group_names(&self) -> Vec<String> {
        self.groups.keys().cloned().collect()
    }
}

/// An open container: one root group tree, serialized as a whole
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// The root namespace
    pub root: Group,
}

impl Dataset {
    /// A new empty dataset
    pub fn new() -> Self {
        Dataset::default()
    }

    /// Serialize to the container byte encoding
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let payload =
            bincode::serialize(&self.root).map_err(|e| SscdfError::Encoding(e.to_string()))?;
        let mut out = Vec::with_capacity(HEADER_LEN + payload.len() + TRAILER_LEN);
        out.extend_from_slice(MAGIC);
        out.push(ENCODING_VERSION);
        let checksum = crc32fast::hash(&payload);
        out.extend_from_slice(&payload);
        out.extend_from_slice(&checksum.to_le_bytes());
        Ok(out)
    }

    /// Deserialize from the container byte encoding, verifying magic,
    /// encoding version, and checksum
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN + TRAILER_LEN || &bytes[..MAGIC.len()] != MAGIC {
            return Err(SscdfError::BadMagic);
        }
        let version = bytes[MAGIC.len()];
        if version > ENCODING_VERSION {
            return Err(SscdfError::UnsupportedEncoding(version));
        }
        let payload = &bytes[HEADER_LEN..bytes.len() - TRAILER_LEN];
        let mut trailer = [0u8; TRAILER_LEN];
        trailer.copy_from_slice(&bytes[bytes.len() - TRAILER_LEN..]);
        if crc32fast::hash(payload) != u32::from_le_bytes(trailer) {
            return Err(SscdfError::ChecksumMismatch);
        }
        let root =
            bincode::deserialize(payload).map_err(|e| SscdfError::Encoding(e.to_string()))?;
        Ok(Dataset { root })
    }

    /// Flush the dataset to a file
    pub fn write_to_path(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    /// Open a dataset from a file
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::from_bytes(&fs::read(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        let mut ds = Dataset::new();
        ds.root.set_attr("metadata", "{}");
        let values = Array::Float64(vec![1.0, 2.0, 3.0]);
        ds.root
            .create_variable("values", Variable::encode(&values, Compression::None).unwrap())
            .unwrap();
        let grp = ds.root.create_group("extra").unwrap();
        grp.set_attr("metadata", "{\"x\":1}");
        ds
    }

    #[test]
    fn test_bytes_roundtrip() {
        let ds = sample();
        let bytes = ds.to_bytes().unwrap();
        let back = Dataset::from_bytes(&bytes).unwrap();
        assert_eq!(back.root, ds.root);
        assert_eq!(back.root.group_names(), vec!["extra"]);
        assert_eq!(back.root.attr("metadata"), Some("{}"));
    }

    #[test]
    fn test_variable_roundtrip_compressed() {
        let values = Array::UInt64((0..1000).map(|i| i % 7).collect());
        let var = Variable::encode(&values, Compression::Zstd).unwrap();
        assert_eq!(var.dtype(), DType::UInt64);
        assert_eq!(var.len(), 1000);
        assert_eq!(var.decode().unwrap(), values);
    }

    #[test]
    fn test_bad_magic_rejected() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes[0] = b'X';
        assert!(matches!(
            Dataset::from_bytes(&bytes),
            Err(SscdfError::BadMagic)
        ));
    }

    #[test]
    fn test_corrupt_payload_rejected() {
        let mut bytes = sample().to_bytes().unwrap();
        let mid = bytes.len() / 2;
        bytes[mid] ^= 0xff;
        assert!(matches!(
            Dataset::from_bytes(&bytes),
            Err(SscdfError::ChecksumMismatch)
        ));
    }

    #[test]
    fn test_newer_encoding_rejected() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes[4] = 9;
        assert!(matches!(
            Dataset::from_bytes(&bytes),
            Err(SscdfError::UnsupportedEncoding(9))
        ));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut ds = sample();
        assert!(matches!(
            ds.root.create_group("extra"),
            Err(SscdfError::DuplicateName(_))
        ));
        let values = Array::Bool(vec![true]);
        let var = Variable::encode(&values, Compression::None).unwrap();
        assert!(matches!(
            ds.root.create_variable("values", var),
            Err(SscdfError::DuplicateName(_))
        ));
    }
}
