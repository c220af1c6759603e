use std::{collections::HashMap, hash::Hash, io::ErrorKind, marker::PhantomData, path::{Path, PathBuf}, sync::Arc};
use chrono::Utc;
use serde_json::Value;
use tokio::{fs, sync::RwLock};
use tracing::{debug, warn};

use crate::errors::ServiceError;

/// Generic JSON file-backed key-value map store.
///
/// The whole map lives in one JSON document. Every operation reads the file,
/// and every mutation rewrites it entirely. Mutations hold the write guard for
/// the full read-modify-write sequence, so concurrent writers cannot drop each
/// other's updates; readers hold the read guard and never see a partial write.
///
/// Entries are decoded one by one. An entry that is valid JSON but does not
/// decode as `V` is hidden from callers and written back unchanged. A document
/// that does not parse at all reads as empty, and is copied aside before the
/// first mutation overwrites it.
pub struct JsonMapStore<K, V> {
    lock: RwLock<()>,
    file_path: PathBuf,
    _entries: PhantomData<fn() -> (K, V)>,
}

/// One read of the backing document.
struct Snapshot<K, V> {
    entries: HashMap<K, V>,
    undecodable: HashMap<K, Value>,
    /// The file exists but could not be read or parsed.
    corrupt: bool,
}

impl<K, V> Snapshot<K, V> {
    fn empty(corrupt: bool) -> Self {
        Self { entries: HashMap::new(), undecodable: HashMap::new(), corrupt }
    }
}

impl<K, V> JsonMapStore<K, V>
where
    K: Eq + Hash + serde::Serialize + serde::de::DeserializeOwned + Clone + std::fmt::Display,
    V: serde::Serialize + serde::de::DeserializeOwned + Clone,
{
    /// Initialize the store from a path. Creates parent directories and the
    /// file with an empty map if missing.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(ServiceError::storage)?;
            }
        }

        let store = Self { lock: RwLock::new(()), file_path, _entries: PhantomData };
        if fs::metadata(&store.file_path).await.is_err() {
            store.persist(&HashMap::new(), &HashMap::new()).await?;
        }
        Ok(Arc::new(store))
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Read the full map. Unreadable or unparsable files yield an empty map.
    pub async fn read_all(&self) -> HashMap<K, V> {
        let _guard = self.lock.read().await;
        self.load().await.entries
    }

    /// Replace the persisted map entirely, undecodable entries included.
    pub async fn write_all(&self, map: &HashMap<K, V>) -> Result<(), ServiceError> {
        let _guard = self.lock.write().await;
        self.persist(map, &HashMap::new()).await
    }

    /// List all entries as `(key, value)` pairs.
    pub async fn list(&self) -> Vec<(K, V)> {
        self.read_all().await.into_iter().collect()
    }

    /// Get value by key.
    pub async fn get(&self, key: &K) -> Option<V> {
        self.read_all().await.remove(key)
    }

    /// Run a read-modify-write cycle under the write guard.
    ///
    /// The closure returns its result together with a flag telling whether
    /// the map changed; the file is rewritten only when it did. A closure
    /// error aborts the cycle without touching the file. Writing a key that
    /// holds an undecodable entry is refused.
    pub async fn update_map<F, R>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut HashMap<K, V>) -> Result<(R, bool), ServiceError>,
    {
        let _guard = self.lock.write().await;
        let Snapshot { mut entries, undecodable, corrupt } = self.load().await;
        let (out, changed) = f(&mut entries)?;
        if !changed {
            return Ok(out);
        }
        if let Some(key) = entries.keys().find(|k| undecodable.contains_key(*k)) {
            return Err(ServiceError::Storage(format!("entry {key} is undecodable; refusing to overwrite it")));
        }
        if corrupt {
            self.back_up().await?;
        }
        self.persist(&entries, &undecodable).await?;
        Ok(out)
    }

    /// Return the existing value for `key`, or insert the one built by `make`
    /// and persist. The flag is `true` when a value was inserted.
    pub async fn get_or_insert_with<F>(&self, key: K, make: F) -> Result<(V, bool), ServiceError>
    where
        F: FnOnce() -> V,
    {
        self.update_map(|map| {
            if let Some(existing) = map.get(&key) {
                return Ok(((existing.clone(), false), false));
            }
            let value = make();
            map.insert(key, value.clone());
            Ok(((value, true), true))
        })
        .await
    }

    /// Mutate the value at `key` in place and persist; `None` if absent.
    pub async fn update_entry<F>(&self, key: &K, f: F) -> Result<Option<V>, ServiceError>
    where
        F: FnOnce(&mut V),
    {
        self.update_map(|map| match map.get_mut(key) {
            Some(value) => {
                f(value);
                Ok((Some(value.clone()), true))
            }
            None => Ok((None, false)),
        })
        .await
    }

    async fn load(&self) -> Snapshot<K, V> {
        let bytes = match fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.file_path.display(), "data file missing; starting empty");
                return Snapshot::empty(false);
            }
            Err(e) => {
                warn!(path = %self.file_path.display(), error = %e, "data file unreadable; treating as empty");
                return Snapshot::empty(true);
            }
        };
        let raw: HashMap<K, Value> = match serde_json::from_slice(&bytes) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %self.file_path.display(), error = %e, "data file is not valid JSON; treating as empty");
                return Snapshot::empty(true);
            }
        };

        let mut snapshot = Snapshot::empty(false);
        for (key, value) in raw {
            match serde_json::from_value::<V>(value.clone()) {
                Ok(v) => {
                    snapshot.entries.insert(key, v);
                }
                Err(e) => {
                    warn!(path = %self.file_path.display(), %key, error = %e, "skipping undecodable entry");
                    snapshot.undecodable.insert(key, value);
                }
            }
        }
        snapshot
    }

    /// Copy the current file next to itself before it gets overwritten.
    async fn back_up(&self) -> Result<PathBuf, ServiceError> {
        let mut name = self.file_path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(format!(".corrupt-{}", Utc::now().format("%Y%m%dT%H%M%S%.3fZ")));
        let backup = self.file_path.with_file_name(name);
        fs::copy(&self.file_path, &backup).await.map_err(ServiceError::storage)?;
        warn!(path = %self.file_path.display(), backup = %backup.display(), "corrupt data file backed up before rewrite");
        Ok(backup)
    }

    async fn persist(&self, entries: &HashMap<K, V>, undecodable: &HashMap<K, Value>) -> Result<(), ServiceError> {
        let mut doc = undecodable.clone();
        for (key, value) in entries {
            doc.insert(key.clone(), serde_json::to_value(value).map_err(ServiceError::storage)?);
        }
        let data = serde_json::to_vec_pretty(&doc).map_err(ServiceError::storage)?;
        fs::write(&self.file_path, data).await.map_err(ServiceError::storage)?;
        Ok(())
    }
}
