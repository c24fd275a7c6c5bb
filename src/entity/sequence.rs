//! Sequence entity and the numeric views derived from its bulk data.
//!
//! A sequence owns the acquired samples (`MFMC_DATA`, shaped
//! `(frames, ascans, samples)`), the focal laws nested under it, and index
//! datasets tying each acquisition to a transmit and a receive law.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

use crate::ascan::{AScan, AScanIter, Frame, SampleTimes, Velocities};
use crate::core::{Array, ArrayData, Collection, DatasetInfo, EntityKind, FieldAccessor, Link};
use crate::entity::{reference_indices, resolve_probes, Decoder, Entity, Field, Law, Probe};
use crate::util::{DataKind, DataType, Error, Result};

pub const MFMC_DATA: &str = "MFMC_DATA";
pub const TRANSMIT_LAW: &str = "TRANSMIT_LAW";
pub const RECEIVE_LAW: &str = "RECEIVE_LAW";
pub const PROBE_LIST: &str = "PROBE_LIST";
pub const FILTER_TYPE: &str = "FILTER_TYPE";
pub const DATE_AND_TIME: &str = "DATE_AND_TIME";

const FRAME_AXIS: usize = 0;
const ASCAN_AXIS: usize = 1;
const SAMPLE_AXIS: usize = 2;

/// Analogue filter applied before digitisation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FilterType {
    None = 0,
    LowPass = 1,
    HighPass = 2,
    BandPass = 3,
    Other = 4,
}

impl TryFrom<i64> for FilterType {
    type Error = Error;

    fn try_from(code: i64) -> Result<Self> {
        Ok(match code {
            0 => Self::None,
            1 => Self::LowPass,
            2 => Self::HighPass,
            3 => Self::BandPass,
            4 => Self::Other,
            _ => return Err(Error::decode(FILTER_TYPE, format!("unknown filter code {}", code))),
        })
    }
}

/// Acquisition timestamp, with or without a UTC offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateAndTime {
    Zoned(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];
const ZONED_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M%:z"];

impl DateAndTime {
    /// Parse an ISO-8601 calendar timestamp.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self::Zoned(dt));
        }
        for fmt in ZONED_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
                return Ok(Self::Zoned(dt));
            }
        }
        for fmt in NAIVE_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Ok(Self::Naive(dt));
            }
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(Self::Naive)
            .ok_or_else(|| Error::decode(DATE_AND_TIME, format!("{:?} is not an ISO-8601 timestamp", s)))
    }

    /// Wall-clock time as recorded, dropping any offset.
    pub fn naive_local(&self) -> NaiveDateTime {
        match self {
            Self::Zoned(dt) => dt.naive_local(),
            Self::Naive(dt) => *dt,
        }
    }

    pub fn offset(&self) -> Option<FixedOffset> {
        match self {
            Self::Zoned(dt) => Some(*dt.offset()),
            Self::Naive(_) => None,
        }
    }
}

impl fmt::Display for DateAndTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zoned(dt) => write!(f, "{}", dt.to_rfc3339()),
            Self::Naive(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
        }
    }
}

/// One acquisition run.
///
/// Derived values (law catalog, data shape, normalisation divisor, law
/// indices) are computed on first use and cached; the backing store is
/// read-only for the life of the file index.
#[derive(Clone)]
pub struct Sequence {
    accessor: FieldAccessor,
    laws: OnceLock<Collection<Law>>,
    data_info: OnceLock<DatasetInfo>,
    norm_divisor: OnceLock<f64>,
    transmit: OnceLock<Vec<usize>>,
    receive: OnceLock<Vec<usize>>,
}

impl Sequence {
    pub(crate) fn from_link(link: Link) -> Self {
        Self {
            accessor: FieldAccessor::new(EntityKind::Sequence, link),
            laws: OnceLock::new(),
            data_info: OnceLock::new(),
            norm_divisor: OnceLock::new(),
            transmit: OnceLock::new(),
            receive: OnceLock::new(),
        }
    }

    /// Laws nested in this sequence, in natural name order.
    ///
    /// Children without a `LAW` type tag, or whose attributes cannot be
    /// read, are skipped.
    pub fn laws(&self) -> Result<&Collection<Law>> {
        let session = self.accessor.link().session()?;
        if let Some(laws) = self.laws.get() {
            return Ok(laws);
        }
        let children = session.tagged_children(self.accessor.path(), EntityKind::Law.type_tag())?;
        tracing::debug!("{}: {} laws", self.accessor.path(), children.len());
        let link = self.accessor.link();
        let laws = Collection::from_unsorted(
            children
                .into_iter()
                .map(|(name, path)| (name, Law::from_link(link.sibling(path))))
                .collect(),
        );
        Ok(self.laws.get_or_init(|| laws))
    }

    /// Transmit law of every acquisition.
    pub fn transmit_law(&self) -> Result<Vec<Law>> {
        self.resolve_laws(TRANSMIT_LAW)
    }

    /// Receive law of every acquisition.
    pub fn receive_law(&self) -> Result<Vec<Law>> {
        self.resolve_laws(RECEIVE_LAW)
    }

    /// Probes used by this sequence.
    pub fn probe_list(&self) -> Result<Vec<Probe>> {
        resolve_probes(&self.accessor, PROBE_LIST)
    }

    pub fn filter_type(&self) -> Result<FilterType> {
        let raw = self.accessor.get_raw(FILTER_TYPE)?;
        let codes = raw.to_i64_vec().map_err(|e| Error::decode(FILTER_TYPE, e.to_string()))?;
        match codes.as_slice() {
            [code] => FilterType::try_from(*code),
            _ => Err(Error::decode(FILTER_TYPE, format!("expected one code, got {}", codes.len()))),
        }
    }

    pub fn date_and_time(&self) -> Result<DateAndTime> {
        let value = self.accessor.get(DATE_AND_TIME)?;
        match value.as_str() {
            Some(s) => DateAndTime::parse(s),
            None => Err(Error::decode(DATE_AND_TIME, "not a text value")),
        }
    }

    /// Number of frames (first axis of `MFMC_DATA`).
    pub fn n_frames(&self) -> Result<usize> {
        self.data_axis(FRAME_AXIS)
    }

    /// Number of acquisitions per frame (second axis of `MFMC_DATA`).
    pub fn n_ascans(&self) -> Result<usize> {
        self.data_axis(ASCAN_AXIS)
    }

    /// Samples per trace (third axis of `MFMC_DATA`).
    pub fn ascan_length(&self) -> Result<usize> {
        self.data_axis(SAMPLE_AXIS)
    }

    /// Element type of `MFMC_DATA`.
    pub fn data_type(&self) -> Result<DataType> {
        Ok(self.data_info()?.dtype)
    }

    /// Time of every sample relative to the trigger.
    pub fn sample_times(&self) -> Result<SampleTimes> {
        let start = self.scalar("START_TIME")?;
        let step = self.scalar("TIME_STEP")?;
        Ok(SampleTimes::new(start, step, self.ascan_length()?))
    }

    /// Specimen and wedge velocities, `(shear, longitudinal)` pairs.
    pub fn velocities(&self) -> Result<Velocities> {
        let [specimen_shear, specimen_longitudinal] = self.pair("SPECIMEN_VELOCITY")?;
        let (wedge_shear, wedge_longitudinal) = match self.pair("WEDGE_VELOCITY") {
            Ok([s, l]) => (Some(s), Some(l)),
            Err(Error::OptionalFieldMissing(_)) => (None, None),
            Err(e) => return Err(e),
        };
        Ok(Velocities { specimen_shear, specimen_longitudinal, wedge_shear, wedge_longitudinal })
    }

    /// Divisor mapping stored samples into `[-1, 1]`.
    ///
    /// 1.0 for floating-point data; the maximum for unsigned data;
    /// `max(-min, max)` for signed data. Other element types cannot be
    /// normalised.
    pub fn norm_divisor(&self) -> Result<f64> {
        self.ensure_open()?;
        if let Some(&d) = self.norm_divisor.get() {
            return Ok(d);
        }
        let dtype = self.data_type()?;
        let divisor = match dtype.kind() {
            DataKind::Float => 1.0,
            DataKind::Unsigned | DataKind::Signed => {
                let data = self.accessor.get_raw(MFMC_DATA)?;
                match data.integer_extrema() {
                    Some((_, max)) if dtype.kind() == DataKind::Unsigned => max as f64,
                    Some((min, max)) => (-min).max(max) as f64,
                    None => 1.0,
                }
            }
            DataKind::Boolean | DataKind::Complex | DataKind::Text => {
                return Err(Error::decode(
                    MFMC_DATA,
                    format!("no normalisation divisor for {} data", dtype),
                ))
            }
        };
        tracing::debug!("{}: norm divisor {}", self.accessor.path(), divisor);
        Ok(*self.norm_divisor.get_or_init(|| divisor))
    }

    /// The acquisition at `index`, across all frames.
    ///
    /// With `normalise`, samples are converted to float and divided by
    /// [`norm_divisor`](Self::norm_divisor). All-zero integer data has a
    /// zero divisor and is returned unscaled.
    pub fn get_ascan(&self, index: usize, normalise: bool) -> Result<AScan> {
        let count = self.n_ascans()?;
        if index >= count {
            return Err(Error::IndexOutOfRange { index, count });
        }
        let mut data = self.accessor.read_lane(MFMC_DATA, ASCAN_AXIS, index)?;
        if normalise {
            let divisor = self.norm_divisor()?;
            let mut samples = data.to_f64().map_err(|e| Error::decode(MFMC_DATA, e.to_string()))?;
            if divisor != 0.0 {
                samples.mapv_inplace(|v| v / divisor);
            }
            data = Array::new(DataType::Float64, ArrayData::Float(samples))?;
        }
        Ok(AScan {
            index,
            data,
            transmit_law: self.law_at(TRANSMIT_LAW, index)?,
            receive_law: self.law_at(RECEIVE_LAW, index)?,
        })
    }

    /// Every acquisition in index order, not normalised.
    pub fn ascan_iter(&self) -> Result<AScanIter<'_>> {
        Ok(AScanIter::new(self, self.n_ascans()?))
    }

    /// All acquisitions collected in index order.
    pub fn frame(&self, normalise: bool) -> Result<Frame> {
        (0..self.n_ascans()?).map(|i| self.get_ascan(i, normalise)).collect()
    }

    fn data_info(&self) -> Result<&DatasetInfo> {
        self.ensure_open()?;
        if let Some(info) = self.data_info.get() {
            return Ok(info);
        }
        let info = self.accessor.dataset_info(MFMC_DATA)?;
        if info.shape.rank() != 3 {
            return Err(Error::decode(
                MFMC_DATA,
                format!("expected (frames, ascans, samples), got shape {}", info.shape),
            ));
        }
        Ok(self.data_info.get_or_init(|| info))
    }

    /// Cached values must not outlive the file index.
    fn ensure_open(&self) -> Result<()> {
        self.accessor.link().session().map(|_| ())
    }

    fn data_axis(&self, axis: usize) -> Result<usize> {
        let info = self.data_info()?;
        info.shape
            .size(axis)
            .ok_or_else(|| Error::decode(MFMC_DATA, format!("missing axis {}", axis)))
    }

    fn law_indices(&self, field: &str) -> Result<&[usize]> {
        self.ensure_open()?;
        let cell = if field == TRANSMIT_LAW { &self.transmit } else { &self.receive };
        if let Some(indices) = cell.get() {
            return Ok(indices);
        }
        let raw = self.accessor.get_raw(field)?;
        let indices = reference_indices(&raw, field, self.laws()?.len())?;
        Ok(cell.get_or_init(|| indices))
    }

    fn resolve_laws(&self, field: &str) -> Result<Vec<Law>> {
        let laws = self.laws()?;
        self.law_indices(field)?
            .iter()
            .map(|&i| {
                laws.nth(i)
                    .cloned()
                    .ok_or_else(|| Error::decode(field, format!("no law at {}", i)))
            })
            .collect()
    }

    fn law_at(&self, field: &str, index: usize) -> Result<Law> {
        let indices = self.law_indices(field)?;
        let &law = indices.get(index).ok_or_else(|| {
            Error::decode(field, format!("{} entries, acquisition {}", indices.len(), index))
        })?;
        self.laws()?
            .nth(law)
            .cloned()
            .ok_or_else(|| Error::decode(field, format!("no law at {}", law)))
    }

    fn scalar(&self, field: &str) -> Result<f64> {
        self.accessor
            .get(field)?
            .as_f64()
            .ok_or_else(|| Error::decode(field, "not a numeric scalar"))
    }

    fn pair(&self, field: &str) -> Result<[f64; 2]> {
        let raw = self.accessor.get_raw(field)?;
        let values = raw.to_f64().map_err(|e| Error::decode(field, e.to_string()))?;
        match values.as_slice() {
            Some(&[a, b]) => Ok([a, b]),
            _ => Err(Error::decode(field, format!("expected 2 values, got {}", values.len()))),
        }
    }
}

impl Entity for Sequence {
    const KIND: EntityKind = EntityKind::Sequence;

    fn accessor(&self) -> &FieldAccessor {
        &self.accessor
    }

    fn decoders() -> &'static HashMap<&'static str, Decoder<Self>> {
        static TABLE: OnceLock<HashMap<&'static str, Decoder<Sequence>>> = OnceLock::new();
        TABLE.get_or_init(|| {
            let mut table: HashMap<&'static str, Decoder<Sequence>> = HashMap::new();
            table.insert(TRANSMIT_LAW, |s| s.transmit_law().map(Field::Laws));
            table.insert(RECEIVE_LAW, |s| s.receive_law().map(Field::Laws));
            table.insert(PROBE_LIST, |s| s.probe_list().map(Field::Probes));
            table.insert(FILTER_TYPE, |s| s.filter_type().map(Field::FilterType));
            table.insert(DATE_AND_TIME, |s| s.date_and_time().map(Field::DateAndTime));
            table
        })
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence").field("path", &self.accessor.path()).finish()
    }
}

impl PartialEq for Sequence {
    fn eq(&self, other: &Self) -> bool {
        self.accessor == other.accessor
    }
}
