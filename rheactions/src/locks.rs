//! One async lock per drive.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rhedrives::DriveId;
use tokio::sync::OwnedMutexGuard;

/// Registry of per-drive locks.
///
/// Locks are created on first use and never dropped: the set of drives on
/// a machine is tiny and stable. Clones share the registry.
#[derive(Clone, Default)]
pub struct DriveLocks {
    inner: Arc<Mutex<HashMap<DriveId, Arc<tokio::sync::Mutex<()>>>>>,
}

impl DriveLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for `device`, waiting if a conflicting operation
    /// holds it. The guard keeps the drive exclusive until dropped.
    pub async fn lock(&self, device: &DriveId) -> OwnedMutexGuard<()> {
        let mutex = {
            let mut map = self.inner.lock().unwrap();
            map.entry(device.clone())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };
        mutex.lock_owned().await
    }

    /// Non-blocking variant, `None` when the drive is busy.
    pub fn try_lock(&self, device: &DriveId) -> Option<OwnedMutexGuard<()>> {
        let mutex = {
            let mut map = self.inner.lock().unwrap();
            map.entry(device.clone())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };
        mutex.try_lock_owned().ok()
    }
}
