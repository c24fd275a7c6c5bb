//! # MFMC
//!
//! Reader for MFMC (Multi-Frame Matrix Capture) files: HDF5-based
//! recordings of ultrasonic phased-array inspections.
//!
//! A file holds probes (transducer descriptions) and sequences (acquisition
//! runs). Each sequence nests the focal laws it fired with and a bulk
//! `MFMC_DATA` dataset shaped `(frames, ascans, samples)`.
//!
//! ## Modules
//!
//! - [`util`] - Basic types (DataType, Shape, errors, natural ordering)
//! - [`core`] - Storage abstraction, schema registry, field accessor
//! - [`entity`] - Probe, Law and Sequence
//! - [`file`] - [`FileIndex`], the entry point
//! - [`ascan`] - Per-acquisition traces and derived values
//!
//! ## Example
//!
//! ```ignore
//! use mfmc::prelude::*;
//!
//! let file = FileIndex::open("weld.mfmc")?;
//! let seq = &file.sequences()["SEQUENCE<1>"];
//! for ascan in seq.ascan_iter()? {
//!     let ascan = ascan?;
//!     println!("{} -> {}", ascan.transmit_law.name(), ascan.receive_law.name());
//! }
//! ```
//!
//! Field lookup is case-insensitive and schema-checked:
//!
//! ```
//! use mfmc::prelude::*;
//! use mfmc::core::MemoryStorage;
//!
//! let mut store = MemoryStorage::new("fixture");
//! store
//!     .attr("/", "TYPE", "MFMC")
//!     .attr("/", "VERSION", "2.0.0")
//!     .attr("/PROBE<1>", "TYPE", "PROBE")
//!     .attr("/PROBE<1>", "CENTRE_FREQUENCY", 5.0e6);
//!
//! let file = FileIndex::from_storage(store, OpenOptions::default()).unwrap();
//! let probe = &file.probes()["PROBE<1>"];
//! assert_eq!(probe.centre_frequency().unwrap(), 5.0e6);
//! assert!(matches!(probe.get("bandwidth"), Err(Error::OptionalFieldMissing(_))));
//! assert!(matches!(probe.get("colour"), Err(Error::UnknownField(_))));
//! ```

pub mod util;
pub mod core;
pub mod entity;
pub mod file;
pub mod ascan;

// HDF5 backend (optional, enabled with "hdf5" feature)
#[cfg(feature = "hdf5")]
pub mod h5;

// Re-export commonly used types
pub use util::{DataType, Error, Result};
pub use file::{FileIndex, OpenOptions, SUPPORTED_VERSION};
pub use entity::{Entity, Field, Law, Probe, Sequence};
pub use ascan::{AScan, Frame, Velocities};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{DataType, Error, Result};
    pub use crate::core::{Array, Collection, StorageReader, Value};
    pub use crate::entity::{
        DateAndTime, ElementShape, Entity, Field, FilterType, Law, Probe, Sequence,
    };
    pub use crate::file::{FileIndex, OpenOptions};
    pub use crate::ascan::{AScan, Frame, SampleTimes, Velocities};
    #[cfg(feature = "hdf5")]
    pub use crate::h5::Hdf5Storage;
}
