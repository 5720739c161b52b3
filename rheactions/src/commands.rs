//! Backend seam for everything the engine does to a physical drive.
//!
//! The engine never shells out directly: it goes through [`DriveCommands`],
//! whose production implementation delegates to `rhedrives` and cdparanoia.
//! Tests substitute a scripted implementation.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use rheconfig::get_config;
use rhedrives::{probe, DiscDriveScope, DiscDrives, DiscToc, Discovery, DriveError, DriveId, DriveInfo};
use rheutils::cmd;

/// Per-track rips of a scratched disc can take a while.
const RIP_TRACK_TIMEOUT: Duration = Duration::from_secs(900);

#[async_trait]
pub trait DriveCommands: Send + Sync {
    /// Drives selected by `scope`, discovery order.
    async fn resolve_drives(&self, scope: &DiscDriveScope) -> Result<Vec<DriveInfo>, DriveError>;

    /// Audio table of contents of the disc in `device`, `None` if no disc.
    async fn query_toc(&self, device: &DriveId) -> Result<Option<DiscToc>, DriveError>;

    /// Rips one track of `device` into `dest`.
    async fn rip_track(&self, device: &DriveId, track: u32, dest: &Path) -> Result<(), DriveError>;

    /// Opens the tray of `device`.
    async fn eject(&self, device: &DriveId) -> Result<(), DriveError>;
}

/// Production backend: kernel discovery + cdparanoia + the eject binary.
#[derive(Clone, Debug)]
pub struct SystemDriveCommands {
    discovery: Discovery,
    drives: DiscDrives,
    paranoia_bin: String,
}

impl SystemDriveCommands {
    pub fn new(discovery: Discovery, drives: DiscDrives, paranoia_bin: impl Into<String>) -> Self {
        Self {
            discovery,
            drives,
            paranoia_bin: paranoia_bin.into(),
        }
    }

    pub fn new_configured() -> Self {
        let discovery = Discovery::new_configured();
        let drives = DiscDrives::new(discovery.clone());
        Self::new(discovery, drives, get_config().get_rip_paranoia_bin())
    }
}

#[async_trait]
impl DriveCommands for SystemDriveCommands {
    async fn resolve_drives(&self, scope: &DiscDriveScope) -> Result<Vec<DriveInfo>, DriveError> {
        self.discovery.resolve(scope.clone()).await
    }

    async fn query_toc(&self, device: &DriveId) -> Result<Option<DiscToc>, DriveError> {
        probe::query_toc(&self.paranoia_bin, device).await
    }

    async fn rip_track(&self, device: &DriveId, track: u32, dest: &Path) -> Result<(), DriveError> {
        let track_arg = track.to_string();
        let dest_arg = dest.to_string_lossy().into_owned();
        let out = cmd::run(
            &self.paranoia_bin,
            &["-d", device.as_str(), &track_arg, &dest_arg],
            RIP_TRACK_TIMEOUT,
        )
        .await?;

        if !out.success() {
            return Err(DriveError::Probe {
                device: device.clone(),
                message: format!("cdparanoia failed on track {}: {}", track, out.stderr.trim()),
            });
        }
        Ok(())
    }

    async fn eject(&self, device: &DriveId) -> Result<(), DriveError> {
        self.drives.eject(DiscDriveScope::SingleDrive(device.clone())).await
    }
}
