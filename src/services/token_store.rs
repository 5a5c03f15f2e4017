// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage for the single bearer token of the signed-in user.
//!
//! Only the auth session writes the token and only logout clears it;
//! every other service just reads it before an authorized call.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use serde::{Deserialize, Serialize};

use crate::models::AccessToken;

/// Errors raised by a persistent token store.
#[derive(Debug, thiserror::Error)]
pub enum TokenStoreError {
    #[error("failed to access token file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode token file: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Opaque secret store holding at most one token.
pub trait TokenStore: Send + Sync {
    fn get(&self) -> Option<AccessToken>;
    fn set(&self, token: &AccessToken) -> Result<(), TokenStoreError>;
    fn clear(&self) -> Result<(), TokenStoreError>;
}

/// Token store that lives for the process only.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<AccessToken>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: AccessToken) -> Self {
        Self {
            token: RwLock::new(Some(token)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<AccessToken> {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set(&self, token: &AccessToken) -> Result<(), TokenStoreError> {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        Ok(())
    }
}

/// On-disk shape of the token file.
#[derive(Serialize, Deserialize)]
struct TokenFile {
    access_token: AccessToken,
}

/// Token store backed by a JSON file with owner-only permissions.
///
/// The token is cached in memory after the first read so lookups before
/// every request don't hit the disk.
pub struct FileTokenStore {
    path: PathBuf,
    cached: Mutex<Option<Option<AccessToken>>>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Option<AccessToken> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read token file");
                return None;
            }
        };

        match serde_json::from_str::<TokenFile>(&content) {
            Ok(file) => Some(file.access_token),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring corrupt token file");
                None
            }
        }
    }

    fn io_error(&self, source: std::io::Error) -> TokenStoreError {
        TokenStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<AccessToken> {
        let mut cached = crate::lock(&self.cached);
        cached.get_or_insert_with(|| self.load()).clone()
    }

    fn set(&self, token: &AccessToken) -> Result<(), TokenStoreError> {
        let mut cached = crate::lock(&self.cached);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_string_pretty(&TokenFile {
            access_token: token.clone(),
        })?;
        write_private(&self.path, json.as_bytes()).map_err(|e| self.io_error(e))?;

        *cached = Some(Some(token.clone()));
        tracing::debug!(path = %self.path.display(), "Token saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        let mut cached = crate::lock(&self.cached);
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Token file removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(self.io_error(e)),
        }
        *cached = Some(None);
        Ok(())
    }
}

/// Write `contents` to a file only the owner can read (0600 on Unix).
///
/// A new file is created with that mode; an existing one is narrowed
/// before it is truncated and rewritten.
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(false);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    set_file_permissions(&file)?;
    file.set_len(0)?;
    file.write_all(contents)?;
    file.sync_all()
}

/// Set restrictive file permissions (0600 on Unix).
fn set_file_permissions(file: &File) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }

    #[cfg(not(unix))]
    {
        let _ = file;
    }

    Ok(())
}
