//! Container Adapter
//!
//! Orchestrates one-primary-plus-many-named-secondary tensor storage
//! inside a single dataset. The unnamed primary lives in the root group;
//! each named secondary gets its own nested group. Both slots are
//! write-once: a second unnamed write or a reused name fails and leaves
//! the container in its prior state.
//!
//! Writes are buffered in the in-memory dataset and only durable once the
//! writer is explicitly closed (path target) or finished (buffer target).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::array::Array;
use crate::dataset::{Compression, Dataset, Group, Variable};
use crate::error::{Result, SscdfError};
use crate::format::NativeFormat;
use crate::highlevel::{construct, deconstruct, Deconstructed, SCALAR_VALUE_ROLE};
use crate::metadata::{Metadata, VALUES_ROLE};
use crate::tensor::Tensor;

/// File extension appended to extension-less paths
pub const EXTENSION: &str = "sscdf";

const METADATA_ATTR: &str = "metadata";
const PRIMARY_LABEL: &str = "primary object";

/// Append the `.sscdf` extension when the path has none.
///
/// Pure path rewriting; no filesystem access.
pub fn apply_default_extension(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(EXTENSION)
    }
}

/// Resolve a read path: an extension-less path falls back to its
/// `.sscdf`-suffixed sibling when only the sibling exists on disk.
fn resolve_read_path(path: &Path) -> PathBuf {
    if path.extension().is_none() && !path.exists() {
        let with_ext = apply_default_extension(path);
        if with_ext.exists() {
            return with_ext;
        }
    }
    path.to_path_buf()
}

/// Per-write options for one stored tensor
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Free-text comment attached to the object's metadata
    pub comment: Option<String>,
    /// Target storage variant; defaults to the object's current variant
    pub format: Option<NativeFormat>,
    /// Compression for this object's array variables
    pub compression: Compression,
}

impl WriteOptions {
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn format(mut self, format: NativeFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }
}

enum WriteTarget {
    Path(PathBuf),
    Buffer,
}

/// Write-mode container handle
pub struct Writer {
    dataset: Dataset,
    target: WriteTarget,
    primary_written: bool,
}

impl Writer {
    /// Create a container at `path`, appending the `.sscdf` extension if
    /// the path has none. Nothing is written until [`Writer::close`].
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = apply_default_extension(path.as_ref());
        debug!(path = %path.display(), "creating sscdf container");
        Ok(Writer {
            dataset: Dataset::new(),
            target: WriteTarget::Path(path),
            primary_written: false,
        })
    }

    /// Create a container that serializes to an in-memory buffer,
    /// yielded by [`Writer::finish`]
    pub fn in_memory() -> Self {
        Writer {
            dataset: Dataset::new(),
            target: WriteTarget::Buffer,
            primary_written: false,
        }
    }

    /// Write the primary (unnamed) tensor. Fails with a write conflict if
    /// the primary slot is already filled.
    pub fn write(&mut self, tensor: &Tensor) -> Result<()> {
        self.write_with(tensor, &WriteOptions::default())
    }

    /// Write the primary tensor with options
    pub fn write_with(&mut self, tensor: &Tensor, options: &WriteOptions) -> Result<()> {
        if self.primary_written {
            return Err(SscdfError::PrimaryAlreadyWritten);
        }
        let dec = deconstruct_with(tensor, options)?;
        store_tensor(&mut self.dataset.root, &dec, options.compression)?;
        self.primary_written = true;
        debug!("wrote primary tensor");
        Ok(())
    }

    /// Write a named secondary tensor. Fails with a write conflict if the
    /// name is already taken.
    pub fn write_named(&mut self, tensor: &Tensor, name: &str) -> Result<()> {
        self.write_named_with(tensor, name, &WriteOptions::default())
    }

    /// Write a named secondary tensor with options
    pub fn write_named_with(
        &mut self,
        tensor: &Tensor,
        name: &str,
        options: &WriteOptions,
    ) -> Result<()> {
        // Deconstruct before claiming the name, so a failure leaves the
        // container untouched
        let dec = deconstruct_with(tensor, options)?;
        let group = self.dataset.root.create_group(name)?;
        store_tensor(group, &dec, options.compression)?;
        debug!(name, "wrote secondary tensor");
        Ok(())
    }

    /// Flush the container to its file target
    pub fn close(self) -> Result<()> {
        match self.target {
            WriteTarget::Path(path) => {
                debug!(path = %path.display(), "closing sscdf container");
                self.dataset.write_to_path(&path)
            }
            WriteTarget::Buffer => Err(SscdfError::Encoding(
                "in-memory container must be finished, not closed".into(),
            )),
        }
    }

    /// Serialize an in-memory container and yield its bytes
    pub fn finish(self) -> Result<Vec<u8>> {
        match self.target {
            WriteTarget::Buffer => self.dataset.to_bytes(),
            WriteTarget::Path(_) => Err(SscdfError::Encoding(
                "file-backed container must be closed, not finished".into(),
            )),
        }
    }
}

fn deconstruct_with(tensor: &Tensor, options: &WriteOptions) -> Result<Deconstructed> {
    let mut dec = deconstruct(tensor, options.format)?;
    dec.metadata.comment = options.comment.clone();
    Ok(dec)
}

fn store_tensor(group: &mut Group, dec: &Deconstructed, compression: Compression) -> Result<()> {
    group.set_attr(METADATA_ATTR, dec.metadata.to_attribute()?);
    for (role, array) in &dec.arrays {
        trace!(role, len = array.len(), "storing array variable");
        group.create_variable(role.clone(), Variable::encode(array, compression)?)?;
    }
    Ok(())
}

/// Read-mode container handle
pub struct Reader {
    dataset: Dataset,
}

impl Reader {
    /// Open a container file. An extension-less path falls back to its
    /// `.sscdf`-suffixed sibling when only the sibling exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = resolve_read_path(path.as_ref());
        debug!(path = %path.display(), "opening sscdf container");
        Ok(Reader {
            dataset: Dataset::open_path(&path)?,
        })
    }

    /// Open a container from its serialized bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Reader {
            dataset: Dataset::from_bytes(bytes)?,
        })
    }

    fn object_group(&self, name: Option<&str>) -> Result<(&Group, String)> {
        match name {
            None => Ok((&self.dataset.root, PRIMARY_LABEL.to_string())),
            Some(name) => {
                let group = self
                    .dataset
                    .root
                    .group(name)
                    .ok_or_else(|| SscdfError::NameNotFound(name.to_string()))?;
                Ok((group, name.to_string()))
            }
        }
    }

    /// Parse and validate the metadata of the primary (`None`) or a named
    /// secondary tensor
    pub fn info(&self, name: Option<&str>) -> Result<Metadata> {
        let (group, label) = self.object_group(name)?;
        let attr = group
            .attr(METADATA_ATTR)
            .ok_or(SscdfError::MetadataMissing(label))?;
        Metadata::from_attribute(attr)
    }

    /// Names of all secondary tensors, in sorted order
    pub fn names(&self) -> Vec<String> {
        self.dataset.root.group_names()
    }

    /// Read and reconstruct the primary (`None`) or a named secondary
    /// tensor
    pub fn read(&self, name: Option<&str>) -> Result<Tensor> {
        let (group, _) = self.object_group(name)?;
        let metadata = self.info(name)?;
        let mut arrays = BTreeMap::new();
        for binding in metadata.format.role_bindings() {
            arrays.insert(binding.role.to_string(), fetch_array(group, binding.role)?);
        }
        if metadata.iso_value.is_none() {
            // Scalars store a singleton under "value"; everything else
            // stores the full array under "values".
            for role in [VALUES_ROLE, SCALAR_VALUE_ROLE] {
                if group.variable(role).is_some() {
                    arrays.insert(role.to_string(), fetch_array(group, role)?);
                }
            }
        }
        trace!(name = name.unwrap_or(PRIMARY_LABEL), "reconstructing tensor");
        construct(&metadata, &arrays, name)
    }
}

fn fetch_array(group: &Group, role: &str) -> Result<Array> {
    group
        .variable(role)
        .ok_or_else(|| SscdfError::ArrayMissing(role.to_string()))?
        .decode()
}
