//! File-backed [`Storage`] implementation.

use std::{
    collections::BTreeMap,
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use common::operations::{By, Delete, Insert, Select};
use derive_more::{Display, Error as StdError, From};
use tokio::{fs, sync::Mutex};
use tracerr::Traced;

use crate::infra::storage;

use super::{Entry, Key, Storage};

/// File-backed [`Storage`].
///
/// Entries are kept as a single JSON object, which is replaced atomically on
/// every write. Clones share the same lock, so operations of a single process
/// never interleave.
#[derive(Clone, Debug)]
pub struct File {
    /// Path to the JSON file.
    path: Arc<PathBuf>,

    /// Lock serializing read-modify-write cycles.
    lock: Arc<Mutex<()>>,
}

/// Contents of a [`File`].
type Entries = BTreeMap<String, String>;

impl File {
    /// Creates a new [`File`] storage located at the provided `path`.
    ///
    /// The file is created lazily on the first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Returns the path of this [`File`].
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all the [`Entries`] of this [`File`].
    async fn load(&self) -> Result<Entries, Traced<storage::Error>> {
        let contents = match fs::read_to_string(self.path()).await {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(Entries::new());
            }
            Err(e) => {
                return Err(tracerr::map_from(tracerr::new!(Error::Io(e))));
            }
        };
        if contents.trim().is_empty() {
            return Ok(Entries::new());
        }
        serde_json::from_str(&contents)
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }

    /// Replaces the contents of this [`File`] with the provided `entries`.
    async fn store(
        &self,
        entries: &Entries,
    ) -> Result<(), Traced<storage::Error>> {
        let contents = serde_json::to_vec_pretty(entries)
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;

        if let Some(dir) = self.path().parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)
                    .await
                    .map_err(tracerr::from_and_wrap!(=> Error))
                    .map_err(tracerr::map_from)?;
            }
        }

        let mut tmp = self.path().as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, contents)
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt as _;

            fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600))
                .await
                .map_err(tracerr::from_and_wrap!(=> Error))
                .map_err(tracerr::map_from)?;
        }
        fs::rename(&tmp, self.path())
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl Storage<Select<By<Option<String>, Key>>> for File {
    type Ok = Option<String>;
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<String>, Key>>,
    ) -> Result<Self::Ok, Self::Err> {
        let _guard = self.lock.lock().await;

        Ok(self
            .load()
            .await
            .map_err(tracerr::wrap!())?
            .remove(by.inner().as_ref()))
    }
}

impl Storage<Insert<Entry>> for File {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Insert(entry): Insert<Entry>,
    ) -> Result<Self::Ok, Self::Err> {
        let _guard = self.lock.lock().await;

        let mut entries = self.load().await.map_err(tracerr::wrap!())?;
        if entries.get(entry.key.as_ref()) == Some(&entry.value) {
            return Ok(());
        }
        drop(entries.insert(entry.key.to_string(), entry.value));
        self.store(&entries).await.map_err(tracerr::wrap!())
    }
}

impl Storage<Delete<Key>> for File {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Delete(key): Delete<Key>,
    ) -> Result<Self::Ok, Self::Err> {
        let _guard = self.lock.lock().await;

        let mut entries = self.load().await.map_err(tracerr::wrap!())?;
        if entries.remove(key.as_ref()).is_none() {
            return Ok(());
        }
        self.store(&entries).await.map_err(tracerr::wrap!())
    }
}

/// [`File`] storage error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// I/O error.
    #[display("I/O operation failed: {_0}")]
    Io(io::Error),

    /// Contents of the [`File`] are not a valid JSON object of strings.
    #[display("Corrupted storage file: {_0}")]
    Corrupted(serde_json::Error),
}
