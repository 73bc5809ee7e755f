//! Persistence layer for LedgerChain

use crate::blockchain::Chain;
use crate::error::Result;
use fs2::FileExt;
use parking_lot::RwLock;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Abstraction for persistence backends.
///
/// `load` never fails: a missing or unreadable medium is an empty chain.
/// `save` replaces the whole chain and must be atomic, so concurrent readers
/// see either the previous or the new content.
pub trait Persistence: Send + Sync {
    fn load(&self) -> Chain;
    fn save(&self, chain: &Chain) -> Result<()>;

    /// Exclusive writer lock across processes sharing the medium. Blocks until
    /// acquired; released when the returned guard drops.
    fn lock(&self) -> Result<StoreLock> {
        Ok(StoreLock::unlocked())
    }
}

/// Writer lock held for the duration of one append.
#[must_use]
#[derive(Debug)]
pub struct StoreLock {
    _file: Option<File>,
}

impl StoreLock {
    pub fn unlocked() -> Self {
        StoreLock { _file: None }
    }
}

/// The chain as one pretty-printed JSON array in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling `<file name>.lock` used for advisory writer locking.
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "blockchain.json".into());
        name.push(".lock");
        self.parent_dir().join(name)
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl Persistence for JsonFileStore {
    fn load(&self) -> Chain {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "store.load: no chain file yet");
                return Chain::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "store.load: unreadable, treating as empty");
                return Chain::default();
            }
        };

        match serde_json::from_str::<Chain>(&content) {
            Ok(chain) => {
                debug!(path = %self.path.display(), blocks = chain.len(), "store.load");
                chain
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "store.load: unparseable, treating as empty");
                Chain::default()
            }
        }
    }

    // Temp file in the target directory, fsync, then rename over the target.
    fn save(&self, chain: &Chain) -> Result<()> {
        let dir = self.parent_dir();
        fs::create_dir_all(dir)?;

        let json = serde_json::to_vec_pretty(chain)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;

        debug!(path = %self.path.display(), blocks = chain.len(), "store.save");
        Ok(())
    }

    fn lock(&self) -> Result<StoreLock> {
        fs::create_dir_all(self.parent_dir())?;
        let lock_path = self.lock_path();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;
        file.lock_exclusive()?;
        debug!(path = %lock_path.display(), "store.lock acquired");
        Ok(StoreLock { _file: Some(file) })
    }
}

/// Simple in-memory persistence implementation useful for tests and ephemeral runs.
#[derive(Clone, Default)]
pub struct InMemoryPersistence {
    chain: Arc<RwLock<Chain>>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Persistence for InMemoryPersistence {
    fn load(&self) -> Chain {
        self.chain.read().clone()
    }

    fn save(&self, chain: &Chain) -> Result<()> {
        *self.chain.write() = chain.clone();
        Ok(())
    }
}
