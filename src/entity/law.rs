//! Focal law entity.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::core::{EntityKind, FieldAccessor, Link};
use crate::entity::{resolve_probes, Decoder, Entity, Field, Probe};
use crate::util::{Error, Result};

pub const PROBE: &str = "PROBE";

/// A transmit or receive configuration over a subset of probe elements.
///
/// Laws live inside a sequence group. `PROBE` and `ELEMENT` are parallel
/// datasets: entry `i` names probe `PROBE[i]`, element `ELEMENT[i]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Law {
    accessor: FieldAccessor,
}

impl Law {
    pub(crate) fn from_link(link: Link) -> Self {
        Self { accessor: FieldAccessor::new(EntityKind::Law, link) }
    }

    /// Probes referenced by this law, in stored order.
    pub fn probes(&self) -> Result<Vec<Probe>> {
        resolve_probes(&self.accessor, PROBE)
    }

    /// Element indices, one per entry of `PROBE`.
    pub fn elements(&self) -> Result<Vec<i64>> {
        let raw = self.accessor.get_raw("ELEMENT")?;
        raw.to_i64_vec().map_err(|e| Error::decode("ELEMENT", e.to_string()))
    }

    /// Per-entry delays in seconds, if stored.
    pub fn delay(&self) -> Result<Vec<f64>> {
        self.floats("DELAY")
    }

    /// Per-entry weightings, if stored.
    pub fn weighting(&self) -> Result<Vec<f64>> {
        self.floats("WEIGHTING")
    }

    fn floats(&self, field: &str) -> Result<Vec<f64>> {
        let raw = self.accessor.get_raw(field)?;
        let values = raw.to_f64().map_err(|e| Error::decode(field, e.to_string()))?;
        Ok(values.iter().copied().collect())
    }
}

impl Entity for Law {
    const KIND: EntityKind = EntityKind::Law;

    fn accessor(&self) -> &FieldAccessor {
        &self.accessor
    }

    fn decoders() -> &'static HashMap<&'static str, Decoder<Self>> {
        static TABLE: OnceLock<HashMap<&'static str, Decoder<Law>>> = OnceLock::new();
        TABLE.get_or_init(|| {
            let mut table: HashMap<&'static str, Decoder<Law>> = HashMap::new();
            table.insert(PROBE, |l| l.probes().map(Field::Probes));
            table
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Array, MemoryStorage, Session};
    use crate::util::DataType;
    use std::sync::Arc;

    fn session() -> Arc<Session> {
        let mut s = MemoryStorage::new("mem");
        s.attr("/PROBE<2>", "TYPE", "PROBE")
            .attr("/PROBE<1>", "TYPE", "PROBE")
            .attr("/SEQUENCE<1>", "TYPE", "SEQUENCE")
            .attr("/SEQUENCE<1>/LAW<1>", "TYPE", "LAW")
            .dataset(
                "/SEQUENCE<1>/LAW<1>/PROBE",
                Array::from_i64(DataType::Int32, &[3], vec![1, 0, 1]).unwrap(),
            )
            .dataset(
                "/SEQUENCE<1>/LAW<1>/ELEMENT",
                Array::from_i64(DataType::Int32, &[3], vec![4, 5, 6]).unwrap(),
            )
            .dataset("/SEQUENCE<1>/LAW<1>/DELAY", vec![0.0, 1.0e-7, 2.0e-7])
            .attr("/SEQUENCE<1>/LAW<2>", "TYPE", "LAW")
            .dataset("/SEQUENCE<1>/LAW<2>/PROBE", vec![2i64]);
        Arc::new(Session::new(Box::new(s), "/".into()))
    }

    #[test]
    fn test_probe_resolution() {
        let s = session();
        let law = Law::from_link(Link::new(&s, "/SEQUENCE<1>/LAW<1>"));
        let probes = law.probes().unwrap();
        let names: Vec<&str> = probes.iter().map(|p| p.name()).collect();
        // Indices refer to the natural-ordered probe catalog.
        assert_eq!(names, vec!["PROBE<2>", "PROBE<1>", "PROBE<2>"]);
        assert_eq!(law.get("probe").unwrap(), Field::Probes(probes));
    }

    #[test]
    fn test_probe_out_of_range() {
        let s = session();
        let law = Law::from_link(Link::new(&s, "/SEQUENCE<1>/LAW<2>"));
        assert!(matches!(law.probes(), Err(Error::Decode { field, .. }) if field == PROBE));
    }

    #[test]
    fn test_fields() {
        let s = session();
        let law = Law::from_link(Link::new(&s, "/SEQUENCE<1>/LAW<1>"));
        assert_eq!(law.elements().unwrap(), vec![4, 5, 6]);
        assert_eq!(law.delay().unwrap().len(), 3);
        assert!(matches!(law.weighting(), Err(Error::OptionalFieldMissing(_))));
        assert!(matches!(law.get("tag"), Err(Error::UnknownField(_))));
    }
}
