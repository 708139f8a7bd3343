use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;

const URL_PREFIX: &str = "blob:pixpress/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlobHandle(pub u64);

impl BlobHandle {
    /// Addressable form of the handle, e.g. `blob:pixpress/3`.
    pub fn url(&self) -> String {
        format!("{URL_PREFIX}{}", self.0)
    }
}

impl fmt::Display for BlobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

#[derive(Default)]
struct BlobTable {
    last_id: u64,
    blobs: HashMap<u64, Bytes>,
}

/// Registry of result bytes shared between the engine thread and the app.
///
/// Bytes stay alive until their handle is revoked.
#[derive(Clone, Default)]
pub struct BlobStore {
    inner: Arc<Mutex<BlobTable>>,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, BlobTable> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, bytes: Bytes) -> BlobHandle {
        let mut table = self.table();
        table.last_id += 1;
        let id = table.last_id;
        table.blobs.insert(id, bytes);
        BlobHandle(id)
    }

    pub fn get(&self, handle: BlobHandle) -> Option<Bytes> {
        self.table().blobs.get(&handle.0).cloned()
    }

    /// Releases the bytes behind `handle`. Returns false if already gone.
    pub fn revoke(&self, handle: BlobHandle) -> bool {
        self.table().blobs.remove(&handle.0).is_some()
    }

    pub fn len(&self) -> usize {
        self.table().blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for BlobStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobStore").field("len", &self.len()).finish()
    }
}
