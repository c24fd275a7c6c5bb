//! File index: the entry point for reading an MFMC store.

#[cfg(feature = "hdf5")]
use std::path::Path;
use std::sync::Arc;

use crate::core::{
    join_path, normalize_path, Collection, EntityKind, Link, NodeKind, Session, StorageReader,
    Value, TYPE_ATTRIBUTE,
};
use crate::entity::{Law, Probe, Sequence};
use crate::util::{natural_sort_by_name, Error, Result};

/// `TYPE` of the file root.
pub const MFMC_TYPE: &str = "MFMC";
/// Root attribute holding the format version.
pub const VERSION_ATTRIBUTE: &str = "VERSION";
/// The only format version this reader accepts.
pub const SUPPORTED_VERSION: &str = "2.0.0";

/// Options for opening a file index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenOptions {
    root_group: String,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self { root_group: "/".to_string() }
    }
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group whose children are enumerated (default `/`).
    ///
    /// The `TYPE`/`VERSION` contract is always checked on the file root.
    pub fn root_group(mut self, group: impl AsRef<str>) -> Self {
        self.root_group = normalize_path(group.as_ref());
        self
    }

    pub fn get_root_group(&self) -> &str {
        &self.root_group
    }
}

/// An open MFMC store with its probes and sequences enumerated.
///
/// The index owns the storage. Entities handed out by it hold weak links;
/// once the index is closed or dropped, every entity call fails with
/// [`Error::HandleClosed`].
///
/// # Example
/// ```ignore
/// use mfmc::prelude::*;
///
/// let file = FileIndex::open("scan.mfmc")?;
/// for (name, seq) in file.sequences() {
///     println!("{}: {} ascans", name, seq.n_ascans()?);
/// }
/// ```
#[derive(Debug)]
pub struct FileIndex {
    session: Option<Arc<Session>>,
    name: String,
    root_group: String,
    probes: Collection<Probe>,
    sequences: Collection<Sequence>,
}

impl FileIndex {
    /// Open an HDF5 file with default options.
    #[cfg(feature = "hdf5")]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, OpenOptions::default())
    }

    /// Open an HDF5 file.
    #[cfg(feature = "hdf5")]
    pub fn open_with<P: AsRef<Path>>(path: P, options: OpenOptions) -> Result<Self> {
        let storage = crate::h5::Hdf5Storage::open(path)?;
        Self::from_storage(storage, options)
    }

    /// Build an index over any storage backend.
    pub fn from_storage<S: StorageReader + 'static>(storage: S, options: OpenOptions) -> Result<Self> {
        Self::from_boxed(Box::new(storage), options)
    }

    /// Build an index over a boxed storage backend.
    ///
    /// Validates the root contract, then classifies the children of the
    /// root group. On any failure the storage is released and no index is
    /// returned.
    pub fn from_boxed(storage: Box<dyn StorageReader>, options: OpenOptions) -> Result<Self> {
        validate(storage.as_ref())?;
        let root_group = options.root_group;
        match storage.node_kind(&root_group) {
            Ok(NodeKind::Group) => {}
            Ok(NodeKind::Dataset) => {
                return Err(Error::format(format!("{} is a dataset, not a group", root_group)))
            }
            Err(Error::NotFound(_)) => {
                return Err(Error::format(format!("root group {} not found", root_group)))
            }
            Err(e) => return Err(e),
        }

        let name = storage.name().to_string();
        tracing::debug!("opened {} at {}", name, root_group);
        let session = Arc::new(Session::new(storage, root_group.clone()));
        let (probes, sequences) = scan(&session)?;
        tracing::debug!("{}: {} probes, {} sequences", name, probes.len(), sequences.len());

        Ok(Self { session: Some(session), name, root_group, probes, sequences })
    }

    /// Probes under the root group, in natural name order.
    pub fn probes(&self) -> &Collection<Probe> {
        &self.probes
    }

    /// Sequences under the root group, in natural name order.
    pub fn sequences(&self) -> &Collection<Sequence> {
        &self.sequences
    }

    pub fn probe(&self, name: &str) -> Option<&Probe> {
        self.probes.get(name)
    }

    pub fn sequence(&self, name: &str) -> Option<&Sequence> {
        self.sequences.get(name)
    }

    /// Look up a law by sequence and law name.
    pub fn find_law(&self, sequence: &str, law: &str) -> Result<Law> {
        let seq = self
            .sequence(sequence)
            .ok_or_else(|| Error::NotFound(join_path(&self.root_group, sequence)))?;
        seq.laws()?
            .get(law)
            .cloned()
            .ok_or_else(|| Error::NotFound(join_path(&join_path(&self.root_group, sequence), law)))
    }

    /// Store name, usually the file path.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root_group(&self) -> &str {
        &self.root_group
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Release the storage. Idempotent.
    pub fn close(&mut self) {
        if let Some(session) = self.session.take() {
            session.mark_closed();
            tracing::debug!("closed {}", self.name);
        }
    }
}

impl Drop for FileIndex {
    fn drop(&mut self) {
        self.close();
    }
}

/// Check the root `TYPE` and `VERSION` attributes.
fn validate(storage: &dyn StorageReader) -> Result<()> {
    let tag = root_text(storage, TYPE_ATTRIBUTE)?;
    if tag != MFMC_TYPE {
        return Err(Error::format(format!("root TYPE is {:?}, expected {:?}", tag, MFMC_TYPE)));
    }
    let version = root_text(storage, VERSION_ATTRIBUTE)?;
    if version != SUPPORTED_VERSION {
        return Err(Error::format(format!("unsupported version {:?}", version)));
    }
    Ok(())
}

fn root_text(storage: &dyn StorageReader, name: &str) -> Result<String> {
    let raw = match storage.read_attribute("/", name) {
        Ok(raw) => raw,
        Err(Error::NotFound(_)) => {
            return Err(Error::format(format!("root has no {} attribute", name)))
        }
        Err(e) => return Err(e),
    };
    match raw.decode() {
        Value::Text(s) => Ok(s),
        other => Err(Error::format(format!("root {} is not text: {:?}", name, other))),
    }
}

/// Classify the children of the root group by their `TYPE` tag.
fn scan(session: &Arc<Session>) -> Result<(Collection<Probe>, Collection<Sequence>)> {
    let storage = session.storage();
    let root = session.root();
    let mut probes = Vec::new();
    let mut sequences = Vec::new();

    for name in storage.member_names(root)? {
        let path = join_path(root, &name);
        if !matches!(storage.node_kind(&path), Ok(NodeKind::Group)) {
            continue;
        }
        match session.type_tag(&path) {
            Ok(Some(tag)) if tag == EntityKind::Probe.type_tag() => probes.push((name, path)),
            Ok(Some(tag)) if tag == EntityKind::Sequence.type_tag() => sequences.push((name, path)),
            Ok(Some(tag)) => tracing::warn!("{}: unrecognised TYPE {:?}", path, tag),
            Ok(None) => tracing::debug!("{}: no TYPE, skipped", path),
            Err(e) => tracing::debug!("{}: skipped, {}", path, e),
        }
    }

    natural_sort_by_name(&mut probes);
    session.seed_probe_catalog(probes.clone());

    let probes = probes
        .into_iter()
        .map(|(name, path)| (name, Probe::from_link(Link::new(session, path))))
        .collect();
    let sequences = sequences
        .into_iter()
        .map(|(name, path)| (name, Sequence::from_link(Link::new(session, path))))
        .collect();
    Ok((Collection::from_unsorted(probes), Collection::from_unsorted(sequences)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MemoryStorage;
    use crate::entity::Entity;

    fn base() -> MemoryStorage {
        let mut s = MemoryStorage::new("mem");
        s.attr("/", "TYPE", "MFMC").attr("/", "VERSION", "2.0.0");
        s
    }

    #[test]
    fn test_root_validation() {
        let mut wrong_type = base();
        wrong_type.attr("/", "TYPE", "HDF5");
        assert!(matches!(
            FileIndex::from_storage(wrong_type, OpenOptions::default()),
            Err(Error::FileFormat(_))
        ));

        let mut wrong_version = base();
        wrong_version.attr("/", "VERSION", "2.0");
        assert!(matches!(
            FileIndex::from_storage(wrong_version, OpenOptions::default()),
            Err(Error::FileFormat(_))
        ));

        let bare = MemoryStorage::new("bare");
        assert!(matches!(
            FileIndex::from_storage(bare, OpenOptions::default()),
            Err(Error::FileFormat(_))
        ));
    }

    #[test]
    fn test_classification() {
        let mut s = base();
        s.attr("/PROBE<10>", "TYPE", "PROBE")
            .attr("/SEQUENCE<1>", "TYPE", "SEQUENCE")
            .attr("/PROBE<2>", "TYPE", "PROBE")
            .attr("/notes", "TYPE", "NOTES")
            .group("/untagged")
            .group("/broken")
            .fail_attributes("/broken");
        let file = FileIndex::from_storage(s, OpenOptions::default()).unwrap();
        let probes: Vec<&str> = file.probes().names().collect();
        assert_eq!(probes, vec!["PROBE<2>", "PROBE<10>"]);
        assert_eq!(file.sequences().len(), 1);
        assert_eq!(file.probe("PROBE<2>").map(|p| p.path()), Some("/PROBE<2>"));
    }

    #[test]
    fn test_sub_rooted() {
        let mut s = base();
        s.attr("/run/PROBE<1>", "TYPE", "PROBE").attr("/PROBE<9>", "TYPE", "PROBE");
        let file = FileIndex::from_storage(s, OpenOptions::new().root_group("run/")).unwrap();
        assert_eq!(file.root_group(), "/run");
        let probes: Vec<&str> = file.probes().names().collect();
        assert_eq!(probes, vec!["PROBE<1>"]);

        let missing = FileIndex::from_storage(base(), OpenOptions::new().root_group("/nope"));
        assert!(matches!(missing, Err(Error::FileFormat(_))));
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut s = base();
        s.attr("/PROBE<1>", "TYPE", "PROBE").attr("/PROBE<1>", "CENTRE_FREQUENCY", 5.0e6);
        let mut file = FileIndex::from_storage(s, OpenOptions::default()).unwrap();
        let probe = file.probe("PROBE<1>").cloned().unwrap();
        assert!(probe.get("centre_frequency").is_ok());

        file.close();
        file.close();
        assert!(!file.is_open());
        assert!(matches!(probe.get("centre_frequency"), Err(Error::HandleClosed)));
    }

    #[test]
    fn test_close_with_session_still_held() {
        let mut s = base();
        s.attr("/PROBE<1>", "TYPE", "PROBE").attr("/PROBE<1>", "CENTRE_FREQUENCY", 5.0e6);
        let mut file = FileIndex::from_storage(s, OpenOptions::default()).unwrap();
        let probe = file.probe("PROBE<1>").cloned().unwrap();
        let held = probe.accessor().link().session().unwrap();

        file.close();
        assert!(held.is_closed());
        assert!(matches!(probe.get("centre_frequency"), Err(Error::HandleClosed)));
        assert!(matches!(probe.centre_frequency(), Err(Error::HandleClosed)));
        drop(held);
    }

    #[test]
    fn test_find_law() {
        let mut s = base();
        s.attr("/SEQUENCE<1>", "TYPE", "SEQUENCE")
            .attr("/SEQUENCE<1>/LAW<1>", "TYPE", "LAW");
        let file = FileIndex::from_storage(s, OpenOptions::default()).unwrap();
        assert_eq!(file.find_law("SEQUENCE<1>", "LAW<1>").unwrap().name(), "LAW<1>");
        assert!(matches!(file.find_law("SEQUENCE<1>", "LAW<2>"), Err(Error::NotFound(_))));
        assert!(matches!(file.find_law("SEQUENCE<2>", "LAW<1>"), Err(Error::NotFound(_))));
    }
}
