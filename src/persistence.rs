use thiserror::Error;

use crate::codec::{self, CodecError};
use crate::models::TodoState;
use crate::storage::{BlobStore, StorageError};

/// Key the document is stored under unless configured otherwise
pub const DEFAULT_STORAGE_KEY: &str = "todoState";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to encode document: {0}")]
    Encode(#[from] CodecError),
    #[error("Failed to write document: {0}")]
    Storage(#[from] StorageError),
}

/// Port through which the store loads and saves its document.
///
/// `load` never fails: a missing, unreadable or corrupt document is `None`.
pub trait PersistenceGateway {
    fn load(&mut self) -> Option<TodoState>;
    fn save(&mut self, state: &TodoState) -> Result<(), PersistenceError>;
}

impl<G: PersistenceGateway + ?Sized> PersistenceGateway for Box<G> {
    fn load(&mut self) -> Option<TodoState> {
        (**self).load()
    }

    fn save(&mut self, state: &TodoState) -> Result<(), PersistenceError> {
        (**self).save(state)
    }
}

/// Gateway storing the encoded document under one key of a `BlobStore`
pub struct BlobGateway<S: BlobStore> {
    store: S,
    key: String,
}

impl<S: BlobStore> BlobGateway<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(store: S, key: &str) -> Self {
        Self {
            store,
            key: key.to_string(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Drop the stored document so the next load falls back to the seed
    pub fn clear(&mut self) -> Result<(), PersistenceError> {
        self.store.remove(&self.key)?;
        Ok(())
    }
}

impl<S: BlobStore> PersistenceGateway for BlobGateway<S> {
    fn load(&mut self) -> Option<TodoState> {
        let blob = match self.store.get(&self.key) {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                log::debug!("no document stored under '{}'", self.key);
                return None;
            }
            Err(e) => {
                log::warn!("failed to read document '{}': {}", self.key, e);
                return None;
            }
        };

        match codec::decode(&blob) {
            Ok(state) => Some(state),
            Err(e) => {
                log::warn!("ignoring corrupt document '{}': {}", self.key, e);
                None
            }
        }
    }

    fn save(&mut self, state: &TodoState) -> Result<(), PersistenceError> {
        let blob = codec::encode(state)?;
        self.store.set(&self.key, &blob)?;
        Ok(())
    }
}
