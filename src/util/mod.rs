//! Utility types and functions.
//!
//! This module contains fundamental types used throughout the library:
//! - [`DataType`] - Element type of stored arrays
//! - [`Shape`] - Dimensions of a stored array
//! - [`Error`] / [`Result`] - Error handling
//! - [`natural_cmp`] - Natural ordering of entity names

mod data_type;
mod error;
mod natural;
mod shape;

pub use data_type::*;
pub use error::*;
pub use natural::*;
pub use shape::*;
