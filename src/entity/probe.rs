//! Probe entity.
//!
//! A probe describes a transducer array: element positions, extents, shape
//! and centre frequency. Element vectors are stored as `(n_elements, 3)`
//! datasets in metres.

use std::collections::HashMap;
use std::sync::OnceLock;

use glam::DVec3;

use crate::core::{EntityKind, FieldAccessor, Link};
use crate::entity::{Decoder, Entity, Field};
use crate::util::{Error, Result};

pub const ELEMENT_SHAPE: &str = "ELEMENT_SHAPE";
pub const DEAD_ELEMENT: &str = "DEAD_ELEMENT";

/// Element outline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ElementShape {
    Rectangular = 1,
    Elliptical = 2,
}

impl TryFrom<i64> for ElementShape {
    type Error = Error;

    fn try_from(code: i64) -> Result<Self> {
        match code {
            1 => Ok(Self::Rectangular),
            2 => Ok(Self::Elliptical),
            _ => Err(Error::decode(ELEMENT_SHAPE, format!("unknown element shape code {}", code))),
        }
    }
}

/// A transducer array description.
#[derive(Clone, Debug, PartialEq)]
pub struct Probe {
    accessor: FieldAccessor,
}

impl Probe {
    pub(crate) fn from_link(link: Link) -> Self {
        Self { accessor: FieldAccessor::new(EntityKind::Probe, link) }
    }

    /// Shape of every element.
    pub fn element_shape(&self) -> Result<Vec<ElementShape>> {
        let raw = self.accessor.get_raw(ELEMENT_SHAPE)?;
        raw.to_i64_vec()
            .map_err(|e| Error::decode(ELEMENT_SHAPE, e.to_string()))?
            .into_iter()
            .map(ElementShape::try_from)
            .collect()
    }

    /// Per-element dead flag. Any non-zero value marks a dead element.
    pub fn dead_element(&self) -> Result<Vec<bool>> {
        let raw = self.accessor.get_raw(DEAD_ELEMENT)?;
        let values = raw.to_f64().map_err(|e| Error::decode(DEAD_ELEMENT, e.to_string()))?;
        Ok(values.iter().map(|&v| v != 0.0).collect())
    }

    pub fn centre_frequency(&self) -> Result<f64> {
        let value = self.accessor.get("CENTRE_FREQUENCY")?;
        value
            .as_f64()
            .ok_or_else(|| Error::decode("CENTRE_FREQUENCY", "not a numeric scalar"))
    }

    /// Number of elements, from `ELEMENT_POSITION`.
    pub fn n_elements(&self) -> Result<usize> {
        let info = self.accessor.dataset_info("ELEMENT_POSITION")?;
        Ok(match info.shape.rank() {
            2 => info.shape.size(0).unwrap_or(0),
            _ => 1,
        })
    }

    /// Element centres.
    pub fn element_position(&self) -> Result<Vec<DVec3>> {
        self.vectors("ELEMENT_POSITION")
    }

    /// Element half-extent vectors along the major axis.
    pub fn element_major(&self) -> Result<Vec<DVec3>> {
        self.vectors("ELEMENT_MAJOR")
    }

    /// Element half-extent vectors along the minor axis.
    pub fn element_minor(&self) -> Result<Vec<DVec3>> {
        self.vectors("ELEMENT_MINOR")
    }

    /// Unit vector each element fires along: `major x minor`, normalised.
    ///
    /// Only flat elements are handled; a probe with
    /// `ELEMENT_RADIUS_OF_CURVATURE` fails with [`Error::Unsupported`].
    pub fn ultrasound_direction(&self) -> Result<Vec<DVec3>> {
        if self.accessor.contains("ELEMENT_RADIUS_OF_CURVATURE")? {
            let surface = if self.accessor.contains("ELEMENT_AXIS_OF_CURVATURE")? {
                "cylindrical"
            } else {
                "spherical"
            };
            return Err(Error::Unsupported(format!(
                "ultrasound direction of {} elements",
                surface
            )));
        }
        let major = self.element_major()?;
        let minor = self.element_minor()?;
        if major.len() != minor.len() {
            return Err(Error::decode(
                "ELEMENT_MINOR",
                format!("{} vectors, ELEMENT_MAJOR has {}", minor.len(), major.len()),
            ));
        }
        Ok(major
            .iter()
            .zip(&minor)
            .map(|(a, b)| a.cross(*b).normalize_or_zero())
            .collect())
    }

    /// Rows of an `(n, 3)` dataset, or a single 3-vector.
    fn vectors(&self, field: &str) -> Result<Vec<DVec3>> {
        let raw = self.accessor.get_raw(field)?;
        let data = raw.to_f64().map_err(|e| Error::decode(field, e.to_string()))?;
        let shape = data.shape();
        let well_formed = match shape.len() {
            1 => shape[0] == 3,
            2 => shape[1] == 3,
            _ => false,
        };
        if !well_formed {
            return Err(Error::decode(field, format!("expected (n, 3) vectors, got {:?}", shape)));
        }
        let flat: Vec<f64> = data.iter().copied().collect();
        Ok(flat.chunks_exact(3).map(DVec3::from_slice).collect())
    }
}

impl Entity for Probe {
    const KIND: EntityKind = EntityKind::Probe;

    fn accessor(&self) -> &FieldAccessor {
        &self.accessor
    }

    fn decoders() -> &'static HashMap<&'static str, Decoder<Self>> {
        static TABLE: OnceLock<HashMap<&'static str, Decoder<Probe>>> = OnceLock::new();
        TABLE.get_or_init(|| {
            let mut table: HashMap<&'static str, Decoder<Probe>> = HashMap::new();
            table.insert(ELEMENT_SHAPE, |p| p.element_shape().map(Field::ElementShapes));
            table.insert(DEAD_ELEMENT, |p| p.dead_element().map(Field::DeadElements));
            table
        })
    }
}
