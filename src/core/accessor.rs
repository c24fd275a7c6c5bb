//! Schema-bound, case-insensitive access to one storage group.

use std::collections::BTreeMap;
use std::fmt;

use crate::core::schema::{canonical_key, EntityKind, FieldClass, SchemaDescriptor};
use crate::core::session::Link;
use crate::core::traits::{join_path, DatasetInfo, NodeKind};
use crate::core::{Array, Value};
use crate::util::{Error, Result};

/// Generic field access over one group, bound to a [`SchemaDescriptor`].
///
/// Lookups canonicalise the key, classify it against the schema and read
/// from the dataset or attribute namespace accordingly. An in-schema field
/// that storage lacks is reported as [`Error::MandatoryFieldMissing`] or
/// [`Error::OptionalFieldMissing`]; a name outside the schema is
/// [`Error::UnknownField`].
#[derive(Clone)]
pub struct FieldAccessor {
    schema: &'static SchemaDescriptor,
    link: Link,
}

impl FieldAccessor {
    pub(crate) fn new(kind: EntityKind, link: Link) -> Self {
        Self { schema: SchemaDescriptor::for_kind(kind), link }
    }

    #[inline]
    pub fn schema(&self) -> &'static SchemaDescriptor {
        self.schema
    }

    #[inline]
    pub(crate) fn link(&self) -> &Link {
        &self.link
    }

    /// Absolute path of the group.
    pub fn path(&self) -> &str {
        self.link.path()
    }

    /// Group name (last path component).
    pub fn name(&self) -> &str {
        self.link.name()
    }

    pub fn is_mandatory(&self, name: &str) -> bool {
        self.schema.is_mandatory(name)
    }

    pub fn is_optional(&self, name: &str) -> bool {
        self.schema.is_optional(name)
    }

    /// Canonical key and schema class of `name`.
    pub fn classify(&self, name: &str) -> Result<(String, FieldClass)> {
        let key = canonical_key(name)?;
        match self.schema.classify(&key) {
            Some(class) => Ok((key, class)),
            None => Err(Error::UnknownField(key)),
        }
    }

    /// Read and decode a field.
    pub fn get(&self, name: &str) -> Result<Value> {
        let (key, class) = self.classify(name)?;
        self.read(&key, class).map(Array::decode)
    }

    /// Read a field without the scalar reduction.
    pub fn get_raw(&self, name: &str) -> Result<Array> {
        let (key, class) = self.classify(name)?;
        self.read(&key, class)
    }

    /// Dtype and shape of an in-schema dataset, without reading it.
    pub fn dataset_info(&self, name: &str) -> Result<DatasetInfo> {
        let (key, class) = self.dataset_field(name)?;
        let session = self.link.session()?;
        session
            .storage()
            .dataset_info(&join_path(self.path(), &key))
            .map_err(|e| absent(e, &key, class))
    }

    /// One hyperslab of an in-schema dataset along `axis`.
    pub fn read_lane(&self, name: &str, axis: usize, index: usize) -> Result<Array> {
        let (key, class) = self.dataset_field(name)?;
        let session = self.link.session()?;
        session
            .storage()
            .read_dataset_lane(&join_path(self.path(), &key), axis, index)
            .map_err(|e| absent(e, &key, class))
    }

    /// True if an in-schema field is present in storage.
    pub fn contains(&self, name: &str) -> Result<bool> {
        let (key, class) = self.classify(name)?;
        let session = self.link.session()?;
        let storage = session.storage();
        if class.is_dataset() {
            storage.exists(&join_path(self.path(), &key))
        } else {
            Ok(storage.attribute_names(self.path())?.iter().any(|n| *n == key))
        }
    }

    /// Names of every dataset and attribute present, datasets first.
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut keys = self.dataset_names()?;
        let session = self.link.session()?;
        keys.extend(session.storage().attribute_names(self.path())?);
        Ok(keys)
    }

    /// Number of datasets and attributes present.
    pub fn len(&self) -> Result<usize> {
        self.keys().map(|k| k.len())
    }

    /// Present attributes that are not part of the schema, keyed as stored.
    pub fn user_attributes(&self) -> Result<BTreeMap<String, Value>> {
        let session = self.link.session()?;
        let storage = session.storage();
        let mut out = BTreeMap::new();
        for name in storage.attribute_names(self.path())? {
            if self.schema.has_attribute(&name) {
                continue;
            }
            let value = storage.read_attribute(self.path(), &name)?.decode();
            out.insert(name, value);
        }
        Ok(out)
    }

    /// Present datasets that are not part of the schema, keyed as stored.
    pub fn user_datasets(&self) -> Result<BTreeMap<String, Value>> {
        let session = self.link.session()?;
        let storage = session.storage();
        let mut out = BTreeMap::new();
        for name in self.dataset_names()? {
            if self.schema.has_dataset(&name) {
                continue;
            }
            let value = storage.read_dataset(&join_path(self.path(), &name))?.decode();
            out.insert(name, value);
        }
        Ok(out)
    }

    fn dataset_names(&self) -> Result<Vec<String>> {
        let session = self.link.session()?;
        let storage = session.storage();
        let mut names = Vec::new();
        for name in storage.member_names(self.path())? {
            if storage.node_kind(&join_path(self.path(), &name))? == NodeKind::Dataset {
                names.push(name);
            }
        }
        Ok(names)
    }

    fn dataset_field(&self, name: &str) -> Result<(String, FieldClass)> {
        let (key, class) = self.classify(name)?;
        if !class.is_dataset() {
            return Err(Error::Unsupported(format!("{} is an attribute, not a dataset", key)));
        }
        Ok((key, class))
    }

    /// Read a classified field from its namespace.
    pub(crate) fn read(&self, key: &str, class: FieldClass) -> Result<Array> {
        let session = self.link.session()?;
        let storage = session.storage();
        tracing::trace!("read {}:{}", self.path(), key);
        let result = if class.is_dataset() {
            storage.read_dataset(&join_path(self.path(), key))
        } else {
            storage.read_attribute(self.path(), key)
        };
        result.map_err(|e| absent(e, key, class))
    }
}

/// Map storage "not found" onto the schema-level missing-field errors.
fn absent(e: Error, key: &str, class: FieldClass) -> Error {
    match e {
        Error::NotFound(_) if class.is_mandatory() => Error::MandatoryFieldMissing(key.to_string()),
        Error::NotFound(_) => Error::OptionalFieldMissing(key.to_string()),
        other => other,
    }
}

impl fmt::Debug for FieldAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldAccessor")
            .field("kind", &self.schema.kind())
            .field("path", &self.path())
            .finish()
    }
}

impl PartialEq for FieldAccessor {
    fn eq(&self, other: &Self) -> bool {
        self.schema.kind() == other.schema.kind() && self.link == other.link
    }
}
