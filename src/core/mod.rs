//! Core layer - storage abstraction and schema-bound field access.
//!
//! This module provides:
//! - [`StorageReader`] - Abstract read access to a hierarchical store
//! - [`MemoryStorage`] - In-memory store for fixtures and tests
//! - [`Array`] / [`Value`] - Typed data read from storage
//! - [`SchemaDescriptor`] - Field taxonomy of each entity kind
//! - [`FieldAccessor`] - Case-insensitive field lookup on one group
//! - [`Session`] / [`Link`] - Ownership of the open store
//! - [`Collection`] - Name-keyed entities in natural order

mod accessor;
mod collection;
mod memory;
mod schema;
mod session;
mod traits;
mod value;

pub use accessor::FieldAccessor;
pub use collection::Collection;
pub use memory::MemoryStorage;
pub use schema::{canonical_key, EntityKind, FieldClass, SchemaDescriptor};
pub use session::{Link, Session, TYPE_ATTRIBUTE};
pub use traits::{base_name, join_path, normalize_path, DatasetInfo, NodeKind, StorageReader};
pub use value::{Array, ArrayData, Value};
