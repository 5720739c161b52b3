//! Tray control through the system `eject` binary.

use std::time::Duration;

use rheutils::cmd;
use tracing::info;

use crate::discovery::Discovery;
use crate::errors::DriveError;
use crate::model::{DiscDriveScope, DriveId};

/// Opening a tray is fast; closing one can wait for the disc to settle.
const EJECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Tray operations, scoped like every other disc operation.
#[derive(Clone, Debug)]
pub struct DiscDrives {
    discovery: Discovery,
    eject_bin: String,
}

impl DiscDrives {
    pub fn new(discovery: Discovery) -> Self {
        Self {
            discovery,
            eject_bin: "eject".to_string(),
        }
    }

    pub fn new_configured() -> Self {
        Self::new(Discovery::new_configured())
    }

    /// Substitutes the eject binary (tests point this at a script).
    pub fn with_eject_bin(mut self, bin: impl Into<String>) -> Self {
        self.eject_bin = bin.into();
        self
    }

    /// Opens the tray of every drive in `scope`, in discovery order.
    ///
    /// A single-drive scope targets exactly the named drive and fails if it
    /// does not exist.
    pub async fn eject(&self, scope: DiscDriveScope) -> Result<(), DriveError> {
        for drive in self.discovery.resolve(scope).await? {
            self.run_eject(&drive.device, &[drive.device.as_str()]).await?;
            info!("ejected {}", drive.device);
        }
        Ok(())
    }

    /// Closes the tray (`eject -t`) of every drive in `scope`.
    pub async fn close_tray(&self, scope: DiscDriveScope) -> Result<(), DriveError> {
        for drive in self.discovery.resolve(scope).await? {
            self.run_eject(&drive.device, &["-t", drive.device.as_str()])
                .await?;
            info!("closed tray of {}", drive.device);
        }
        Ok(())
    }

    async fn run_eject(&self, device: &DriveId, args: &[&str]) -> Result<(), DriveError> {
        let out = cmd::run(&self.eject_bin, args, EJECT_TIMEOUT).await?;
        if !out.success() {
            return Err(DriveError::Eject {
                device: device.clone(),
                message: out.stderr.trim().to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::Discovery;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    /// Drives layer whose eject binary logs its arguments.
    fn fixture(dir: &TempDir) -> (DiscDrives, std::path::PathBuf) {
        let info_path = dir.path().join("info");
        fs::write(
            &info_path,
            "drive name:\t\tsr1\tsr0\nCan open tray:\t\t1\t1\n",
        )
        .unwrap();

        let log_path = dir.path().join("eject.log");
        let script = dir.path().join("fake-eject");
        fs::write(
            &script,
            format!("#!/bin/sh\necho \"$@\" >> {}\n", log_path.display()),
        )
        .unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let discovery = Discovery::new(info_path, "/dev", "false");
        (
            DiscDrives::new(discovery).with_eject_bin(script.to_string_lossy()),
            log_path,
        )
    }

    fn logged(log_path: &std::path::Path) -> Vec<String> {
        fs::read_to_string(log_path)
            .unwrap_or_default()
            .lines()
            .map(|l| l.to_string())
            .collect()
    }

    #[tokio::test]
    async fn single_drive_eject_targets_only_that_drive() {
        let dir = TempDir::new().unwrap();
        let (drives, log_path) = fixture(&dir);

        drives
            .eject(DiscDriveScope::single("/dev/sr1"))
            .await
            .unwrap();
        assert_eq!(logged(&log_path), vec!["/dev/sr1"]);
    }

    #[tokio::test]
    async fn all_drives_ejects_each_in_order() {
        let dir = TempDir::new().unwrap();
        let (drives, log_path) = fixture(&dir);

        drives.eject(DiscDriveScope::AllDrives).await.unwrap();
        assert_eq!(logged(&log_path), vec!["/dev/sr0", "/dev/sr1"]);
    }

    #[tokio::test]
    async fn close_tray_passes_the_t_flag() {
        let dir = TempDir::new().unwrap();
        let (drives, log_path) = fixture(&dir);

        drives
            .close_tray(DiscDriveScope::single("/dev/sr0"))
            .await
            .unwrap();
        assert_eq!(logged(&log_path), vec!["-t /dev/sr0"]);
    }

    #[tokio::test]
    async fn unknown_drive_is_rejected_before_any_eject() {
        let dir = TempDir::new().unwrap();
        let (drives, log_path) = fixture(&dir);

        let err = drives
            .eject(DiscDriveScope::single("/dev/sr9"))
            .await
            .unwrap_err();
        assert!(matches!(err, DriveError::UnknownDrive(_)));
        assert!(logged(&log_path).is_empty());
    }
}
