// Allow dead code: Infrastructure methods for future use
#![allow(dead_code)]

//! Token and profile persistence across the two storage lifetimes.
//!
//! A login writes its token (and profile, when one came back) into exactly
//! one bucket: the durable one when the user asked to stay signed in, the
//! ephemeral one otherwise. Logout cannot know which bucket the login
//! used, so it sweeps both. Storage trouble is logged and swallowed - a
//! degraded local write must not break the flow that triggered it.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::Profile;

/// Storage key for the session token.
pub const TOKEN_KEY: &str = "token";
/// Storage key for the serialized profile.
pub const MEMBER_KEY: &str = "member";

/// Which storage lifetime a login writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageLifetime {
    /// Survives restarts - the "stay signed in" bucket.
    Durable,
    /// Lives for the current process only.
    Ephemeral,
}

/// Key/value capability implemented by each bucket.
///
/// The flows only ever see this trait, so tests substitute in-memory
/// buckets for both lifetimes.
pub trait KeyValueStore {
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;
    fn get_item(&self, key: &str) -> Option<String>;
    fn remove_item(&mut self, key: &str) -> Result<()>;
}

/// Process-lifetime bucket backed by a plain map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_item(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// On-disk document backing a `FileStore`.
#[derive(Debug, Serialize, Deserialize)]
struct StoredBucket {
    saved_at: DateTime<Utc>,
    values: HashMap<String, String>,
}

/// Durable bucket persisted write-through to a JSON file.
pub struct FileStore {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl FileStore {
    /// Open the bucket at `path`, loading any existing contents.
    /// An unreadable file starts the bucket empty rather than failing.
    pub fn open(path: PathBuf) -> Self {
        let values = match Self::load(&path) {
            Ok(values) => values,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read session file, starting empty");
                HashMap::new()
            }
        };
        Self { path, values }
    }

    fn load(path: &Path) -> Result<HashMap<String, String>> {
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let contents = fs::read_to_string(path).context("Failed to read session file")?;
        let stored: StoredBucket =
            serde_json::from_str(&contents).context("Failed to parse session file")?;
        Ok(stored.values)
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let stored = StoredBucket {
            saved_at: Utc::now(),
            values: self.values.clone(),
        };
        let contents = serde_json::to_string_pretty(&stored)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn get_item(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        if self.values.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}

/// The two lifetime buckets behind one facade.
pub struct SessionStore {
    durable: Box<dyn KeyValueStore>,
    ephemeral: Box<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(durable: Box<dyn KeyValueStore>, ephemeral: Box<dyn KeyValueStore>) -> Self {
        Self { durable, ephemeral }
    }

    /// Write the token (and profile, when present) into the bucket named
    /// by `lifetime`. The other bucket is left alone.
    pub fn save(&mut self, lifetime: StorageLifetime, token: &str, profile: Option<&Profile>) {
        let bucket = self.bucket_mut(lifetime);
        if let Err(e) = bucket.set_item(TOKEN_KEY, token) {
            warn!(error = %e, "Failed to store session token");
        }
        if let Some(profile) = profile {
            match serde_json::to_string(profile) {
                Ok(json) => {
                    if let Err(e) = bucket.set_item(MEMBER_KEY, &json) {
                        warn!(error = %e, "Failed to store member profile");
                    }
                }
                Err(e) => warn!(error = %e, "Failed to serialize member profile"),
            }
        }
    }

    /// Remove the token and profile from both buckets unconditionally.
    pub fn clear(&mut self) {
        for lifetime in [StorageLifetime::Durable, StorageLifetime::Ephemeral] {
            let bucket = self.bucket_mut(lifetime);
            for key in [TOKEN_KEY, MEMBER_KEY] {
                if let Err(e) = bucket.remove_item(key) {
                    warn!(key, ?lifetime, error = %e, "Failed to clear session key");
                }
            }
        }
    }

    /// Which bucket currently holds a token, durable first.
    pub fn read_lifetime(&self) -> Option<StorageLifetime> {
        if self.durable.get_item(TOKEN_KEY).is_some() {
            Some(StorageLifetime::Durable)
        } else if self.ephemeral.get_item(TOKEN_KEY).is_some() {
            Some(StorageLifetime::Ephemeral)
        } else {
            None
        }
    }

    /// The stored token, if any bucket holds one.
    pub fn token(&self) -> Option<String> {
        self.read_lifetime()
            .and_then(|lifetime| self.bucket(lifetime).get_item(TOKEN_KEY))
    }

    /// The stored profile accompanying the token, if any.
    pub fn profile(&self) -> Option<Profile> {
        let lifetime = self.read_lifetime()?;
        let json = self.bucket(lifetime).get_item(MEMBER_KEY)?;
        match serde_json::from_str(&json) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(error = %e, "Failed to parse stored member profile");
                None
            }
        }
    }

    pub fn bucket(&self, lifetime: StorageLifetime) -> &dyn KeyValueStore {
        match lifetime {
            StorageLifetime::Durable => self.durable.as_ref(),
            StorageLifetime::Ephemeral => self.ephemeral.as_ref(),
        }
    }

    fn bucket_mut(&mut self, lifetime: StorageLifetime) -> &mut dyn KeyValueStore {
        match lifetime {
            StorageLifetime::Durable => self.durable.as_mut(),
            StorageLifetime::Ephemeral => self.ephemeral.as_mut(),
        }
    }
}
