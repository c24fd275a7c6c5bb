//! Field taxonomy of each MFMC entity kind.
//!
//! Every entity kind has four disjoint name sets: mandatory datasets,
//! mandatory attributes, optional datasets and optional attributes. Names are
//! canonical upper case. The descriptors are built once per process and
//! shared read-only by every open file.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use crate::util::{Error, Result};

/// The schema-bearing entity kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Probe,
    Law,
    Sequence,
}

impl EntityKind {
    /// Value of the `TYPE` attribute tagging groups of this kind.
    pub const fn type_tag(self) -> &'static str {
        match self {
            Self::Probe => "PROBE",
            Self::Law => "LAW",
            Self::Sequence => "SEQUENCE",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_tag())
    }
}

/// Where a field lives and whether it must be present.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldClass {
    MandatoryDataset,
    MandatoryAttribute,
    OptionalDataset,
    OptionalAttribute,
}

impl FieldClass {
    #[inline]
    pub const fn is_mandatory(self) -> bool {
        matches!(self, Self::MandatoryDataset | Self::MandatoryAttribute)
    }

    #[inline]
    pub const fn is_dataset(self) -> bool {
        matches!(self, Self::MandatoryDataset | Self::OptionalDataset)
    }
}

/// Immutable per-kind field taxonomy with constant-time classification.
#[derive(Debug)]
pub struct SchemaDescriptor {
    kind: EntityKind,
    mandatory_datasets: &'static [&'static str],
    mandatory_attributes: &'static [&'static str],
    optional_datasets: &'static [&'static str],
    optional_attributes: &'static [&'static str],
    table: HashMap<&'static str, FieldClass>,
}

const PROBE_MANDATORY_DATASETS: &[&str] =
    &["ELEMENT_POSITION", "ELEMENT_MINOR", "ELEMENT_MAJOR", "ELEMENT_SHAPE"];
const PROBE_MANDATORY_ATTRIBUTES: &[&str] = &["TYPE", "CENTRE_FREQUENCY"];
const PROBE_OPTIONAL_DATASETS: &[&str] =
    &["ELEMENT_RADIUS_OF_CURVATURE", "ELEMENT_AXIS_OF_CURVATURE", "DEAD_ELEMENT"];
const PROBE_OPTIONAL_ATTRIBUTES: &[&str] = &[
    "WEDGE_SURFACE_POINT",
    "WEDGE_SURFACE_NORMAL",
    "BANDWIDTH",
    "PROBE_MANUFACTURER",
    "PROBE_SERIAL_NUMBER",
    "PROBE_TAG",
    "WEDGE_MANUFACTURER",
    "WEDGE_SERIAL_NUMBER",
    "WEDGE_TAG",
];

const LAW_MANDATORY_DATASETS: &[&str] = &["PROBE", "ELEMENT"];
const LAW_MANDATORY_ATTRIBUTES: &[&str] = &["TYPE"];
const LAW_OPTIONAL_DATASETS: &[&str] = &["DELAY", "WEIGHTING"];
const LAW_OPTIONAL_ATTRIBUTES: &[&str] = &[];

const SEQUENCE_MANDATORY_DATASETS: &[&str] = &[
    "MFMC_DATA",
    "PROBE_PLACEMENT_INDEX",
    "PROBE_POSITION",
    "PROBE_X_DIRECTION",
    "PROBE_Y_DIRECTION",
    "TRANSMIT_LAW",
    "RECEIVE_LAW",
    "PROBE_LIST",
];
const SEQUENCE_MANDATORY_ATTRIBUTES: &[&str] =
    &["TYPE", "TIME_STEP", "START_TIME", "SPECIMEN_VELOCITY"];
const SEQUENCE_OPTIONAL_DATASETS: &[&str] = &["MFMC_DATA_IM", "DAC_CURVE"];
const SEQUENCE_OPTIONAL_ATTRIBUTES: &[&str] = &[
    "WEDGE_VELOCITY",
    "TAG",
    "RECEIVER_AMPLIFIER_GAIN",
    "FILTER_TYPE",
    "FILTER_PARAMETERS",
    "FILTER_DESCRIPTION",
    "OPERATOR",
    "DATE_AND_TIME",
];

impl SchemaDescriptor {
    fn new(
        kind: EntityKind,
        mandatory_datasets: &'static [&'static str],
        mandatory_attributes: &'static [&'static str],
        optional_datasets: &'static [&'static str],
        optional_attributes: &'static [&'static str],
    ) -> Self {
        let mut table = HashMap::new();
        let groups = [
            (mandatory_datasets, FieldClass::MandatoryDataset),
            (mandatory_attributes, FieldClass::MandatoryAttribute),
            (optional_datasets, FieldClass::OptionalDataset),
            (optional_attributes, FieldClass::OptionalAttribute),
        ];
        for (names, class) in groups {
            for &name in names {
                let previous = table.insert(name, class);
                debug_assert!(previous.is_none(), "{} listed twice in {} schema", name, kind);
            }
        }
        Self {
            kind,
            mandatory_datasets,
            mandatory_attributes,
            optional_datasets,
            optional_attributes,
            table,
        }
    }

    /// The shared descriptor for an entity kind.
    pub fn for_kind(kind: EntityKind) -> &'static SchemaDescriptor {
        static PROBE: OnceLock<SchemaDescriptor> = OnceLock::new();
        static LAW: OnceLock<SchemaDescriptor> = OnceLock::new();
        static SEQUENCE: OnceLock<SchemaDescriptor> = OnceLock::new();
        match kind {
            EntityKind::Probe => PROBE.get_or_init(|| {
                Self::new(
                    kind,
                    PROBE_MANDATORY_DATASETS,
                    PROBE_MANDATORY_ATTRIBUTES,
                    PROBE_OPTIONAL_DATASETS,
                    PROBE_OPTIONAL_ATTRIBUTES,
                )
            }),
            EntityKind::Law => LAW.get_or_init(|| {
                Self::new(
                    kind,
                    LAW_MANDATORY_DATASETS,
                    LAW_MANDATORY_ATTRIBUTES,
                    LAW_OPTIONAL_DATASETS,
                    LAW_OPTIONAL_ATTRIBUTES,
                )
            }),
            EntityKind::Sequence => SEQUENCE.get_or_init(|| {
                Self::new(
                    kind,
                    SEQUENCE_MANDATORY_DATASETS,
                    SEQUENCE_MANDATORY_ATTRIBUTES,
                    SEQUENCE_OPTIONAL_DATASETS,
                    SEQUENCE_OPTIONAL_ATTRIBUTES,
                )
            }),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn mandatory_datasets(&self) -> &'static [&'static str] {
        self.mandatory_datasets
    }

    pub fn mandatory_attributes(&self) -> &'static [&'static str] {
        self.mandatory_attributes
    }

    pub fn optional_datasets(&self) -> &'static [&'static str] {
        self.optional_datasets
    }

    pub fn optional_attributes(&self) -> &'static [&'static str] {
        self.optional_attributes
    }

    /// Classify an already canonical name.
    #[inline]
    pub fn classify(&self, canonical: &str) -> Option<FieldClass> {
        self.table.get(canonical).copied()
    }

    /// Pure classification, case-insensitive. False for invalid keys.
    pub fn is_mandatory(&self, name: &str) -> bool {
        self.class_of(name).is_some_and(FieldClass::is_mandatory)
    }

    /// Pure classification, case-insensitive. False for invalid keys.
    pub fn is_optional(&self, name: &str) -> bool {
        self.class_of(name).is_some_and(|c| !c.is_mandatory())
    }

    /// Whether a stored dataset name is a schema dataset. Exact match.
    pub fn has_dataset(&self, stored_name: &str) -> bool {
        self.classify(stored_name).is_some_and(FieldClass::is_dataset)
    }

    /// Whether a stored attribute name is a schema attribute. Exact match.
    pub fn has_attribute(&self, stored_name: &str) -> bool {
        self.classify(stored_name).is_some_and(|c| !c.is_dataset())
    }

    fn class_of(&self, name: &str) -> Option<FieldClass> {
        canonical_key(name).ok().and_then(|k| self.classify(&k))
    }

    /// Every name in the schema.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.mandatory_datasets
            .iter()
            .chain(self.mandatory_attributes)
            .chain(self.optional_datasets)
            .chain(self.optional_attributes)
            .copied()
    }
}

/// Canonicalise a field key (ASCII upper case).
///
/// Keys that could not name a field in a group are rejected: empty keys,
/// non-ASCII text, and anything containing a path separator or NUL.
pub fn canonical_key(name: &str) -> Result<String> {
    if name.is_empty() || !name.is_ascii() || name.contains(['/', '\0']) {
        return Err(Error::InvalidKey(name.to_string()));
    }
    Ok(name.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const KINDS: [EntityKind; 3] = [EntityKind::Probe, EntityKind::Law, EntityKind::Sequence];

    #[test]
    fn test_sets_are_disjoint() {
        for kind in KINDS {
            let schema = SchemaDescriptor::for_kind(kind);
            let mut seen = HashSet::new();
            for name in schema.names() {
                assert!(seen.insert(name), "{} duplicated in {}", name, kind);
                assert_eq!(name, name.to_ascii_uppercase());
            }
            assert_eq!(seen.len(), schema.table.len());
        }
    }

    #[test]
    fn test_mandatory_optional_partition() {
        for kind in KINDS {
            let schema = SchemaDescriptor::for_kind(kind);
            for name in schema.names() {
                assert_ne!(schema.is_mandatory(name), schema.is_optional(name));
            }
            assert!(!schema.is_mandatory("NOT_A_FIELD"));
            assert!(!schema.is_optional("NOT_A_FIELD"));
        }
    }

    #[test]
    fn test_case_insensitive_classification() {
        let probe = SchemaDescriptor::for_kind(EntityKind::Probe);
        assert!(probe.is_mandatory("element_shape"));
        assert!(probe.is_mandatory("Element_Shape"));
        assert!(probe.is_optional("dead_element"));
        assert_eq!(probe.classify("CENTRE_FREQUENCY"), Some(FieldClass::MandatoryAttribute));
        assert_eq!(probe.classify("centre_frequency"), None);
    }

    #[test]
    fn test_sequence_schema() {
        let seq = SchemaDescriptor::for_kind(EntityKind::Sequence);
        assert_eq!(seq.classify("MFMC_DATA"), Some(FieldClass::MandatoryDataset));
        assert_eq!(seq.classify("FILTER_TYPE"), Some(FieldClass::OptionalAttribute));
        assert_eq!(seq.classify("DAC_CURVE"), Some(FieldClass::OptionalDataset));
        assert!(seq.has_dataset("MFMC_DATA"));
        assert!(!seq.has_dataset("mfmc_data"));
        assert!(!seq.has_attribute("MFMC_DATA"));
    }

    #[test]
    fn test_law_has_no_optional_attributes() {
        let law = SchemaDescriptor::for_kind(EntityKind::Law);
        assert!(law.optional_attributes().is_empty());
        assert_eq!(law.kind(), EntityKind::Law);
    }

    #[test]
    fn test_canonical_key() {
        assert_eq!(canonical_key("time_step").unwrap(), "TIME_STEP");
        assert!(matches!(canonical_key(""), Err(Error::InvalidKey(_))));
        assert!(matches!(canonical_key("a/b"), Err(Error::InvalidKey(_))));
        assert!(matches!(canonical_key("zeit_schritt\u{00e4}"), Err(Error::InvalidKey(_))));
    }
}
