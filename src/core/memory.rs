//! In-memory storage tree.
//!
//! Used for fixtures, tests and tooling that assemble MFMC structures without
//! an HDF5 library. Node and attribute order follow insertion order, like
//! HDF5 link creation order.

use std::collections::{HashMap, HashSet};

use crate::core::traits::{normalize_path, DatasetInfo, NodeKind, StorageReader};
use crate::core::Array;
use crate::util::{Error, Result};

#[derive(Debug, Default)]
struct Node {
    data: Option<Array>,
    members: Vec<String>,
    attrs: Vec<(String, Array)>,
}

impl Node {
    fn kind(&self) -> NodeKind {
        if self.data.is_some() {
            NodeKind::Dataset
        } else {
            NodeKind::Group
        }
    }
}

/// A storage tree held entirely in memory.
///
/// # Example
/// ```
/// use mfmc::core::{MemoryStorage, StorageReader};
///
/// let mut store = MemoryStorage::new("fixture");
/// store.attr("/", "TYPE", "MFMC").group("/PROBE<1>");
/// assert!(store.exists("/PROBE<1>").unwrap());
/// ```
#[derive(Debug)]
pub struct MemoryStorage {
    name: String,
    nodes: HashMap<String, Node>,
    failing: HashSet<String>,
}

impl MemoryStorage {
    /// Create a store containing only the root group.
    pub fn new(name: impl Into<String>) -> Self {
        let mut nodes = HashMap::new();
        nodes.insert("/".to_string(), Node::default());
        Self { name: name.into(), nodes, failing: HashSet::new() }
    }

    /// Create a group, along with any missing parents.
    pub fn group(&mut self, path: &str) -> &mut Self {
        self.ensure_group(&normalize_path(path));
        self
    }

    /// Set an attribute on a node, creating the node as a group if needed.
    pub fn attr(&mut self, path: &str, name: &str, value: impl Into<Array>) -> &mut Self {
        let path = normalize_path(path);
        if !self.nodes.contains_key(&path) {
            self.ensure_group(&path);
        }
        if let Some(node) = self.nodes.get_mut(&path) {
            let value = value.into();
            match node.attrs.iter_mut().find(|(k, _)| k == name) {
                Some((_, v)) => *v = value,
                None => node.attrs.push((name.to_string(), value)),
            }
        }
        self
    }

    /// Store a dataset at `path`, creating parent groups.
    pub fn dataset(&mut self, path: &str, data: impl Into<Array>) -> &mut Self {
        let path = normalize_path(path);
        let (parent, child) = split_parent(&path);
        self.ensure_group(&parent);
        self.link(&parent, child);
        let node = self.nodes.entry(path).or_default();
        node.data = Some(data.into());
        self
    }

    /// Make every attribute read on `path` fail with a storage error.
    pub fn fail_attributes(&mut self, path: &str) -> &mut Self {
        self.failing.insert(normalize_path(path));
        self
    }

    fn ensure_group(&mut self, path: &str) {
        if self.nodes.contains_key(path) {
            return;
        }
        let (parent, child) = split_parent(path);
        self.ensure_group(&parent);
        self.link(&parent, child);
        self.nodes.insert(path.to_string(), Node::default());
    }

    fn link(&mut self, parent: &str, child: &str) {
        if let Some(node) = self.nodes.get_mut(parent) {
            if !node.members.iter().any(|m| m == child) {
                node.members.push(child.to_string());
            }
        }
    }

    fn node(&self, path: &str) -> Result<&Node> {
        let path = normalize_path(path);
        self.nodes.get(&path).ok_or(Error::NotFound(path))
    }

    fn dataset_node(&self, path: &str) -> Result<&Array> {
        self.node(path)?
            .data
            .as_ref()
            .ok_or_else(|| Error::Storage(format!("{} is a group, not a dataset", path)))
    }

    fn check_attr_access(&self, path: &str) -> Result<()> {
        if self.failing.contains(&normalize_path(path)) {
            return Err(Error::Storage(format!("attribute access failed on {}", path)));
        }
        Ok(())
    }
}

fn split_parent(path: &str) -> (String, &str) {
    match path.rfind('/') {
        Some(0) | None => ("/".to_string(), path.trim_start_matches('/')),
        Some(i) => (path[..i].to_string(), &path[i + 1..]),
    }
}

impl StorageReader for MemoryStorage {
    fn name(&self) -> &str {
        &self.name
    }

    fn node_kind(&self, path: &str) -> Result<NodeKind> {
        Ok(self.node(path)?.kind())
    }

    fn member_names(&self, group: &str) -> Result<Vec<String>> {
        let node = self.node(group)?;
        if node.kind() != NodeKind::Group {
            return Err(Error::Storage(format!("{} is not a group", group)));
        }
        Ok(node.members.clone())
    }

    fn attribute_names(&self, path: &str) -> Result<Vec<String>> {
        self.check_attr_access(path)?;
        Ok(self.node(path)?.attrs.iter().map(|(k, _)| k.clone()).collect())
    }

    fn read_attribute(&self, path: &str, name: &str) -> Result<Array> {
        self.check_attr_access(path)?;
        self.node(path)?
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| Error::NotFound(format!("{}@{}", path, name)))
    }

    fn dataset_info(&self, path: &str) -> Result<DatasetInfo> {
        let data = self.dataset_node(path)?;
        Ok(DatasetInfo { dtype: data.dtype(), shape: data.shape() })
    }

    fn read_dataset(&self, path: &str) -> Result<Array> {
        self.dataset_node(path).cloned()
    }

    fn read_dataset_lane(&self, path: &str, axis: usize, index: usize) -> Result<Array> {
        self.dataset_node(path)?.index_axis(axis, index)
    }
}
