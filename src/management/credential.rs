use std::{io::ErrorKind, path::PathBuf};

use crate::{Error, Res, types::Credential};

/// Flat JSON file holding the single cached [`Credential`].
///
/// Default location is `<data_local_dir>/genrecli/cache/token.json`, see
/// [`default_token_cache_path`](crate::config::default_token_cache_path).
/// Fields other tools wrote into the file survive a rewrite.
#[derive(Debug, Clone)]
pub struct CredentialCache {
    path: PathBuf,
}

impl CredentialCache {
    /// Points the cache at `path`. Nothing is read or created until
    /// [`load`](Self::load) or [`persist`](Self::persist) runs.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Reads the cached credential.
    ///
    /// A missing file is "no credential" (`Ok(None)`), not an error.
    ///
    /// # Errors
    ///
    /// - [`Error::CorruptCache`] naming the file when it is not a valid
    ///   credential record
    /// - [`Error::Io`] for any other read failure
    pub async fn load(&self) -> Res<Option<Credential>> {
        let content = match async_fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let credential = serde_json::from_str(&content).map_err(|e| Error::CorruptCache {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Some(credential))
    }

    /// Rewrites the whole file, creating missing parent directories.
    ///
    /// No locking, concurrent runs may race.
    pub async fn persist(&self, credential: &Credential) -> Res<()> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(credential)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }
}
