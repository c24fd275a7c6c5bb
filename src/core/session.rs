//! Storage ownership and entity links.
//!
//! A [`Session`] owns the open store; it lives inside a
//! [`FileIndex`](crate::FileIndex) behind an `Arc`. Entities hold a [`Link`]:
//! a weak pointer to the session plus a node path. Once the index is closed
//! every link fails with [`Error::HandleClosed`], even while a read that
//! started before the close still holds the session.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use crate::core::traits::{base_name, join_path, NodeKind, StorageReader};
use crate::core::{EntityKind, Value};
use crate::util::{natural_sort_by_name, Error, Result};

/// Name of the attribute tagging every MFMC group with its role.
pub const TYPE_ATTRIBUTE: &str = "TYPE";

/// An open store and the group the index is rooted at.
pub struct Session {
    storage: Box<dyn StorageReader>,
    root: String,
    probe_catalog: OnceLock<Vec<(String, String)>>,
    closed: AtomicBool,
}

impl Session {
    pub(crate) fn new(storage: Box<dyn StorageReader>, root: String) -> Self {
        Self { storage, root, probe_catalog: OnceLock::new(), closed: AtomicBool::new(false) }
    }

    #[inline]
    pub fn storage(&self) -> &dyn StorageReader {
        self.storage.as_ref()
    }

    /// Group the file index enumerates.
    #[inline]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// The `TYPE` tag of a node.
    ///
    /// Returns `Ok(None)` when the attribute is absent or not text.
    pub fn type_tag(&self, path: &str) -> Result<Option<String>> {
        match self.storage.read_attribute(path, TYPE_ATTRIBUTE) {
            Ok(raw) => Ok(match raw.decode() {
                Value::Text(s) => Some(s),
                _ => None,
            }),
            Err(Error::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Direct child groups of `group` whose `TYPE` equals `tag`, as
    /// `(name, path)` pairs in natural order.
    ///
    /// Children without a tag, or whose attributes cannot be read, are
    /// skipped.
    pub fn tagged_children(&self, group: &str, tag: &str) -> Result<Vec<(String, String)>> {
        let mut found = Vec::new();
        for name in self.storage.member_names(group)? {
            let path = join_path(group, &name);
            match self.storage.node_kind(&path) {
                Ok(NodeKind::Group) => {}
                Ok(NodeKind::Dataset) => continue,
                Err(e) => {
                    tracing::debug!("skipping {}: {}", path, e);
                    continue;
                }
            }
            match self.type_tag(&path) {
                Ok(Some(t)) if t == tag => found.push((name, path)),
                Ok(_) => {}
                Err(e) => tracing::debug!("skipping {}: unreadable type tag: {}", path, e),
            }
        }
        natural_sort_by_name(&mut found);
        Ok(found)
    }

    /// Mark the session closed. Links stop resolving immediately.
    pub(crate) fn mark_closed(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Install a probe catalog gathered during the root scan.
    pub(crate) fn seed_probe_catalog(&self, catalog: Vec<(String, String)>) {
        let _ = self.probe_catalog.set(catalog);
    }

    /// Probe groups under the root, in natural order. Scanned once.
    pub fn probe_catalog(&self) -> Result<&[(String, String)]> {
        if let Some(catalog) = self.probe_catalog.get() {
            return Ok(catalog);
        }
        let scanned = self.tagged_children(&self.root, EntityKind::Probe.type_tag())?;
        Ok(self.probe_catalog.get_or_init(|| scanned))
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("storage", &self.storage.name())
            .field("root", &self.root)
            .finish()
    }
}

/// Non-owning reference to a node inside an open session.
#[derive(Clone)]
pub struct Link {
    session: Weak<Session>,
    path: String,
}

impl Link {
    pub(crate) fn new(session: &Arc<Session>, path: impl Into<String>) -> Self {
        Self { session: Arc::downgrade(session), path: path.into() }
    }

    /// The session, while its file index is still open.
    pub(crate) fn session(&self) -> Result<Arc<Session>> {
        match self.session.upgrade() {
            Some(s) if !s.is_closed() => Ok(s),
            _ => Err(Error::HandleClosed),
        }
    }

    /// Absolute node path.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last path component.
    pub fn name(&self) -> &str {
        base_name(&self.path)
    }

    /// Link to another node of the same session.
    pub(crate) fn sibling(&self, path: impl Into<String>) -> Self {
        Self { session: self.session.clone(), path: path.into() }
    }

    pub fn is_alive(&self) -> bool {
        self.session.upgrade().is_some_and(|s| !s.is_closed())
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Link")
            .field("path", &self.path)
            .field("alive", &self.is_alive())
            .finish()
    }
}

impl PartialEq for Link {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.session.ptr_eq(&other.session)
    }
}
