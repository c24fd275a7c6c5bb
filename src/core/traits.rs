//! Abstract interface to the hierarchical storage engine.
//!
//! The MFMC layer never touches a file format directly; it reads groups,
//! datasets and attributes through [`StorageReader`]. Paths are absolute,
//! `/`-separated, with `/` naming the root group.

use crate::core::Array;
use crate::util::{DataType, Error, Result, Shape};

/// Kind of a node in the storage tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Group,
    Dataset,
}

/// Element type and shape of a dataset, available without reading data.
#[derive(Clone, Debug, PartialEq)]
pub struct DatasetInfo {
    pub dtype: DataType,
    pub shape: Shape,
}

/// Read-only access to a hierarchical store.
///
/// Implementations report absent nodes and attributes as
/// [`Error::NotFound`], distinct from any other failure.
pub trait StorageReader: Send + Sync {
    /// Display name of the store (usually its path).
    fn name(&self) -> &str;

    /// Kind of the node at `path`.
    fn node_kind(&self, path: &str) -> Result<NodeKind>;

    /// Names of the direct children of a group, in storage order.
    fn member_names(&self, group: &str) -> Result<Vec<String>>;

    /// Names of the attributes attached to a node.
    fn attribute_names(&self, path: &str) -> Result<Vec<String>>;

    /// Read one attribute. Scalars come back as rank-0 arrays.
    fn read_attribute(&self, path: &str, name: &str) -> Result<Array>;

    /// Element type and shape of a dataset.
    fn dataset_info(&self, path: &str) -> Result<DatasetInfo>;

    /// Read a whole dataset.
    fn read_dataset(&self, path: &str) -> Result<Array>;

    /// Read the hyperslab at `index` along `axis`, with that axis removed.
    ///
    /// The default reads the whole dataset and slices it in memory.
    fn read_dataset_lane(&self, path: &str, axis: usize, index: usize) -> Result<Array> {
        self.read_dataset(path)?.index_axis(axis, index)
    }

    /// True if a node exists at `path`.
    fn exists(&self, path: &str) -> Result<bool> {
        match self.node_kind(path) {
            Ok(_) => Ok(true),
            Err(Error::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Join a group path and a child name.
pub fn join_path(group: &str, name: &str) -> String {
    if group.is_empty() || group == "/" {
        format!("/{}", name)
    } else {
        format!("{}/{}", group.trim_end_matches('/'), name)
    }
}

/// Normalise a user supplied group path to absolute form.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// Last component of a path.
pub fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("/", "PROBE<1>"), "/PROBE<1>");
        assert_eq!(join_path("/SEQUENCE<1>", "LAW<3>"), "/SEQUENCE<1>/LAW<3>");
        assert_eq!(join_path("/a/", "b"), "/a/b");
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("scan/"), "/scan");
        assert_eq!(normalize_path("/scan/run1"), "/scan/run1");
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("/SEQUENCE<1>/LAW<3>"), "LAW<3>");
        assert_eq!(base_name("/"), "");
    }
}
