//! Observable rip state.
//!
//! A rip is dispatched fire-and-forget, so its outcome cannot travel back
//! on the HTTP response that started it. Instead every worker publishes
//! into a per-drive `watch` channel held here; the UI polls the snapshot
//! and tests await the channel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rhedrives::DriveId;
use serde::Serialize;
use tokio::sync::watch;

/// Where a drive's rip currently stands.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RipStatus {
    Idle,
    Running { track: u32, total: u32 },
    Done { tracks: u32, output_dir: String },
    Failed { error: String },
}

impl RipStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, RipStatus::Running { .. })
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, RipStatus::Done { .. } | RipStatus::Failed { .. })
    }
}

/// Per-drive rip status channels.
#[derive(Clone, Default)]
pub struct RipRegistry {
    inner: Arc<Mutex<HashMap<DriveId, watch::Sender<RipStatus>>>>,
}

impl RipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn sender(&self, device: &DriveId) -> watch::Sender<RipStatus> {
        let mut map = self.inner.lock().unwrap();
        map.entry(device.clone())
            .or_insert_with(|| watch::channel(RipStatus::Idle).0)
            .clone()
    }

    /// Publishes `status` for `device`.
    pub fn publish(&self, device: &DriveId, status: RipStatus) {
        // send_replace: publishing must work with or without subscribers
        self.sender(device).send_replace(status);
    }

    /// Atomically claims `device` for a new rip.
    ///
    /// Publishes `Running {0, 0}` and returns `true` unless a rip is
    /// already running; the map lock makes concurrent claims exclusive.
    pub fn try_begin(&self, device: &DriveId) -> bool {
        let mut map = self.inner.lock().unwrap();
        let tx = map
            .entry(device.clone())
            .or_insert_with(|| watch::channel(RipStatus::Idle).0);
        if tx.borrow().is_running() {
            return false;
        }
        tx.send_replace(RipStatus::Running { track: 0, total: 0 });
        true
    }

    pub fn subscribe(&self, device: &DriveId) -> watch::Receiver<RipStatus> {
        self.sender(device).subscribe()
    }

    pub fn status(&self, device: &DriveId) -> RipStatus {
        self.sender(device).borrow().clone()
    }

    /// Snapshot of every drive that ever ripped, for the status endpoint.
    pub fn snapshot(&self) -> HashMap<String, RipStatus> {
        let map = self.inner.lock().unwrap();
        map.iter()
            .map(|(id, tx)| (id.to_string(), tx.borrow().clone()))
            .collect()
    }
}

/// Handle returned by a rip dispatch.
///
/// Dropping it detaches from the rip without cancelling it.
#[derive(Debug)]
pub struct RipHandle {
    pub device: DriveId,
    rx: watch::Receiver<RipStatus>,
}

impl RipHandle {
    pub(crate) fn new(device: DriveId, rx: watch::Receiver<RipStatus>) -> Self {
        Self { device, rx }
    }

    pub fn status(&self) -> RipStatus {
        self.rx.borrow().clone()
    }

    /// Waits until the rip settles (done or failed) and returns that state.
    pub async fn finished(&mut self) -> RipStatus {
        loop {
            if self.rx.borrow().is_settled() {
                return self.rx.borrow().clone();
            }
            if self.rx.changed().await.is_err() {
                // Sender gone: last seen value is all there is
                return self.rx.borrow().clone();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_drive_reads_idle() {
        let registry = RipRegistry::new();
        assert_eq!(registry.status(&DriveId::from("/dev/sr0")), RipStatus::Idle);
    }

    #[test]
    fn publish_then_status_round_trips() {
        let registry = RipRegistry::new();
        let id = DriveId::from("/dev/sr0");

        registry.publish(&id, RipStatus::Running { track: 2, total: 12 });
        assert_eq!(
            registry.status(&id),
            RipStatus::Running { track: 2, total: 12 }
        );

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot["/dev/sr0"].is_running());
    }

    #[tokio::test]
    async fn handle_sees_terminal_state() {
        let registry = RipRegistry::new();
        let id = DriveId::from("/dev/sr0");
        let mut handle = RipHandle::new(id.clone(), registry.subscribe(&id));

        registry.publish(
            &id,
            RipStatus::Done {
                tracks: 12,
                output_dir: "/tmp/out".to_string(),
            },
        );

        let status = handle.finished().await;
        assert_eq!(
            status,
            RipStatus::Done {
                tracks: 12,
                output_dir: "/tmp/out".to_string()
            }
        );
    }
}
