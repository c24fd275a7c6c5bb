//! MFMC entities: probes, focal laws and sequences.
//!
//! Each entity wraps a [`FieldAccessor`] and layers kind-specific decoding
//! over it. Decoders live in a per-kind table keyed by canonical field name;
//! names without a decoder fall through to the generic accessor.

mod law;
mod probe;
mod sequence;

pub use law::Law;
pub use probe::{ElementShape, Probe};
pub use sequence::{DateAndTime, FilterType, Sequence};

use std::collections::{BTreeMap, HashMap};

use crate::core::{canonical_key, Array, EntityKind, FieldAccessor, Value};
use crate::util::{Error, Result};

/// A decoded entity field.
#[derive(Clone, Debug, PartialEq)]
pub enum Field {
    /// Generic decoded value.
    Value(Value),
    ElementShapes(Vec<ElementShape>),
    DeadElements(Vec<bool>),
    /// Resolved probe references, in stored order.
    Probes(Vec<Probe>),
    /// Resolved law references, in stored order.
    Laws(Vec<Law>),
    FilterType(FilterType),
    DateAndTime(DateAndTime),
}

impl Field {
    /// The generic value, if this field has no specialised decoding.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// Decode function for one field of entity `E`.
pub type Decoder<E> = fn(&E) -> Result<Field>;

/// Common behaviour of schema-bound entities.
pub trait Entity: Sized + 'static {
    /// Kind tag and schema of this entity.
    const KIND: EntityKind;

    /// The underlying generic accessor.
    fn accessor(&self) -> &FieldAccessor;

    /// Specialised decoders, keyed by canonical field name.
    fn decoders() -> &'static HashMap<&'static str, Decoder<Self>>;

    /// Look up a field, case-insensitively.
    ///
    /// Specialised decoders take precedence over the generic path. Errors
    /// are those of [`FieldAccessor::get`].
    fn get(&self, name: &str) -> Result<Field> {
        let key = canonical_key(name)?;
        if let Some(decode) = Self::decoders().get(key.as_str()) {
            return decode(self);
        }
        self.accessor().get(&key).map(Field::Value)
    }

    /// Generic decoded value, bypassing specialised decoders.
    fn value(&self, name: &str) -> Result<Value> {
        self.accessor().get(name)
    }

    fn name(&self) -> &str {
        self.accessor().name()
    }

    fn path(&self) -> &str {
        self.accessor().path()
    }

    fn is_mandatory(&self, name: &str) -> bool {
        self.accessor().is_mandatory(name)
    }

    fn is_optional(&self, name: &str) -> bool {
        self.accessor().is_optional(name)
    }

    fn contains(&self, name: &str) -> Result<bool> {
        self.accessor().contains(name)
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.accessor().keys()
    }

    fn user_attributes(&self) -> Result<BTreeMap<String, Value>> {
        self.accessor().user_attributes()
    }

    fn user_datasets(&self) -> Result<BTreeMap<String, Value>> {
        self.accessor().user_datasets()
    }
}

/// Convert a stored index dataset into positions within `0..count`.
pub(crate) fn reference_indices(raw: &Array, field: &str, count: usize) -> Result<Vec<usize>> {
    let values = raw.to_i64_vec().map_err(|e| Error::decode(field, e.to_string()))?;
    values
        .into_iter()
        .map(|v| {
            usize::try_from(v)
                .ok()
                .filter(|&i| i < count)
                .ok_or_else(|| {
                    Error::decode(field, format!("reference {} outside 0..{}", v, count))
                })
        })
        .collect()
}

/// Resolve a dataset of probe indices against the file's probe catalog.
pub(crate) fn resolve_probes(accessor: &FieldAccessor, field: &str) -> Result<Vec<Probe>> {
    let raw = accessor.get_raw(field)?;
    let session = accessor.link().session()?;
    let catalog = session.probe_catalog()?;
    let indices = reference_indices(&raw, field, catalog.len())?;
    Ok(indices
        .into_iter()
        .map(|i| Probe::from_link(accessor.link().sibling(catalog[i].1.clone())))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_indices() {
        let raw = Array::from(vec![0i64, 2, 1]);
        assert_eq!(reference_indices(&raw, "TRANSMIT_LAW", 3).unwrap(), vec![0, 2, 1]);
        assert!(matches!(
            reference_indices(&raw, "TRANSMIT_LAW", 2),
            Err(Error::Decode { field, .. }) if field == "TRANSMIT_LAW"
        ));
        let negative = Array::from(vec![-1i64]);
        assert!(reference_indices(&negative, "PROBE", 4).is_err());
        let text = Array::text("0");
        assert!(matches!(reference_indices(&text, "PROBE", 4), Err(Error::Decode { .. })));
    }

    #[test]
    fn test_field_as_value() {
        let f = Field::Value(Value::Int(3));
        assert_eq!(f.as_value(), Some(&Value::Int(3)));
        assert_eq!(Field::DeadElements(vec![true]).into_value(), None);
    }
}
