//! Single-slot persistence for the last successfully fetched snapshot.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use crate::{error::CacheError, model::WeatherSnapshot};

/// Fixed key of the cache slot; the file name is derived from it.
pub const WEATHER_RESPONSE_KEY: &str = "weather_response_data";

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    /// Store the slot inside `dir`. The directory is created on first save.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { path: dir.as_ref().join(format!("{WEATHER_RESPONSE_KEY}.json")) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the slot with `snapshot`. Readers see either the previous
    /// record or the new one, never a partial write.
    pub fn save(&self, snapshot: &WeatherSnapshot) -> Result<(), CacheError> {
        let json = serde_json::to_vec(snapshot)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|source| CacheError::Io { path: parent.to_path_buf(), source })?;
        }

        let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp = self.path.with_extension(format!("json.{}-{seq}.tmp", std::process::id()));
        fs::write(&tmp, &json).map_err(|source| CacheError::Io { path: tmp.clone(), source })?;

        if let Err(source) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(CacheError::Io { path: self.path.clone(), source });
        }

        tracing::debug!(path = %self.path.display(), bytes = json.len(), "weather snapshot cached");
        Ok(())
    }

    /// The cached snapshot, if one was written and still decodes.
    pub fn load(&self) -> Option<WeatherSnapshot> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cannot read weather cache");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "ignoring corrupt weather cache"
                );
                None
            }
        }
    }

    /// Drop the cached record. Clearing an empty slot is not an error.
    pub fn clear(&self) -> Result<(), CacheError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CacheError::Io { path: self.path.clone(), source }),
        }
    }
}
