//! Durable local [`Session`] storage.

use std::{io, path::PathBuf};

use derive_more::{Display, Error as StdError, From};
use service::domain::Session;
use tokio::fs;
use tracerr::Traced;
use tracing as log;

/// File keeping the current [`Session`] between runs.
#[derive(Clone, Debug)]
pub struct SessionFile {
    /// Path of this [`SessionFile`].
    path: PathBuf,
}

impl SessionFile {
    /// Creates a new [`SessionFile`] at the provided path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads the stored [`Session`], if any.
    ///
    /// # Errors
    ///
    /// If the file cannot be read, or doesn't contain a [`Session`].
    pub async fn load(&self) -> Result<Option<Session>, Traced<StorageError>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(tracerr::new!(StorageError::from(e)));
            }
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(tracerr::from_and_wrap!(=> StorageError))
    }

    /// Stores the provided [`Session`], replacing the previous one.
    ///
    /// # Errors
    ///
    /// If the file cannot be written.
    pub async fn save(
        &self,
        session: &Session,
    ) -> Result<(), Traced<StorageError>> {
        let dir = self.path.parent().filter(|d| !d.as_os_str().is_empty());
        if let Some(dir) = dir {
            fs::create_dir_all(dir)
                .await
                .map_err(tracerr::from_and_wrap!(=> StorageError))?;
        }
        let json = serde_json::to_vec(session)
            .map_err(tracerr::from_and_wrap!(=> StorageError))?;
        fs::write(&self.path, json)
            .await
            .map_err(tracerr::from_and_wrap!(=> StorageError))?;

        log::debug!(path = %self.path.display(), "`Session` stored");

        Ok(())
    }

    /// Removes the stored [`Session`], if any.
    ///
    /// # Errors
    ///
    /// If the file exists but cannot be removed.
    pub async fn clear(&self) -> Result<(), Traced<StorageError>> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                log::debug!(path = %self.path.display(), "`Session` cleared");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(tracerr::new!(StorageError::from(e))),
        }
    }
}

/// Error of [`SessionFile`] operations.
#[derive(Debug, Display, From, StdError)]
pub enum StorageError {
    /// Failed to access the file.
    #[display("I/O failed: {_0}")]
    Io(io::Error),

    /// File contents are not a [`Session`].
    #[display("Malformed `Session`: {_0}")]
    Json(serde_json::Error),
}
