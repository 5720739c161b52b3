//! Drive discovery from the kernel cdrom info table.

use std::path::{Path, PathBuf};

use rheconfig::get_config;
use tracing::{debug, warn};

use crate::errors::DriveError;
use crate::info::parse_info_table;
use crate::model::{DiscDriveScope, DriveId, DriveInfo};
use crate::probe;

/// Per-request drive discovery.
///
/// Reads the kernel table on every call so that hotplugged USB drives show
/// up without any daemon-side cache.
#[derive(Clone, Debug)]
pub struct Discovery {
    info_path: PathBuf,
    dev_dir: PathBuf,
    paranoia_bin: String,
    sysfs_block: PathBuf,
}

impl Discovery {
    pub fn new(info_path: impl Into<PathBuf>, dev_dir: impl Into<PathBuf>, paranoia_bin: impl Into<String>) -> Self {
        Self {
            info_path: info_path.into(),
            dev_dir: dev_dir.into(),
            paranoia_bin: paranoia_bin.into(),
            sysfs_block: PathBuf::from("/sys/block"),
        }
    }

    pub fn new_configured() -> Self {
        let config = get_config();
        Self::new(
            config.get_drives_info_path(),
            config.get_drives_dev_dir(),
            config.get_rip_paranoia_bin(),
        )
    }

    /// Lists the drives selected by `scope`, in kernel registration order.
    ///
    /// A machine with no optical drive yields an empty list, not an error:
    /// the kernel table is simply absent or empty there.
    pub async fn get_drive_info(&self, scope: DiscDriveScope) -> Result<Vec<DriveInfo>, DriveError> {
        let content = match tokio::fs::read_to_string(&self.info_path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("no cdrom info table at {}", self.info_path.display());
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        let table = parse_info_table(&content)?;
        let mut drives = Vec::new();

        for (index, name) in table.names.iter().enumerate() {
            let device = DriveId::from(
                self.dev_dir.join(name).to_string_lossy().into_owned(),
            );
            if !scope.matches(&device) {
                continue;
            }

            let media = probe::media_state(&self.paranoia_bin, &device).await;

            drives.push(DriveInfo {
                device,
                name: name.clone(),
                model: self.read_model(name).await,
                can_open_tray: table.capability("can open tray", index),
                can_close_tray: table.capability("can close tray", index),
                can_play_audio: table.capability("can play audio", index),
                media,
            });
        }

        if drives.is_empty() {
            if let DiscDriveScope::SingleDrive(id) = &scope {
                warn!("drive {} not present in cdrom info table", id);
            }
        }

        Ok(drives)
    }

    /// Resolves `scope` to drive infos, failing on a named drive that does
    /// not exist. Used by callers that need the drive rather than a listing.
    pub async fn resolve(&self, scope: DiscDriveScope) -> Result<Vec<DriveInfo>, DriveError> {
        let drives = self.get_drive_info(scope.clone()).await?;
        match &scope {
            DiscDriveScope::SingleDrive(id) if drives.is_empty() => {
                Err(DriveError::UnknownDrive(id.clone()))
            }
            _ => Ok(drives),
        }
    }

    /// Vendor/model string from sysfs (`/sys/block/sr0/device/{vendor,model}`).
    async fn read_model(&self, name: &str) -> Option<String> {
        let device_dir = self.sysfs_block.join(name).join("device");
        let vendor = read_sysfs_field(&device_dir.join("vendor")).await;
        let model = read_sysfs_field(&device_dir.join("model")).await;
        match (vendor, model) {
            (Some(v), Some(m)) => Some(format!("{} {}", v, m)),
            (None, Some(m)) => Some(m),
            (Some(v), None) => Some(v),
            (None, None) => None,
        }
    }

    #[cfg(test)]
    fn with_sysfs_block(mut self, dir: impl Into<PathBuf>) -> Self {
        self.sysfs_block = dir.into();
        self
    }
}

async fn read_sysfs_field(path: &Path) -> Option<String> {
    let raw = tokio::fs::read_to_string(path).await.ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MediaState;
    use std::fs;
    use tempfile::TempDir;

    const INFO: &str = "\
drive name:\t\tsr1\tsr0
Can close tray:\t\t1\t1
Can open tray:\t\t1\t1
Can play audio:\t\t0\t1
";

    fn fixture(dir: &TempDir) -> Discovery {
        let info_path = dir.path().join("info");
        fs::write(&info_path, INFO).unwrap();

        // sysfs model for sr0 only
        let sys = dir.path().join("sys");
        fs::create_dir_all(sys.join("sr0/device")).unwrap();
        fs::write(sys.join("sr0/device/vendor"), "ASUS    \n").unwrap();
        fs::write(sys.join("sr0/device/model"), "DRW-24D5MT\n").unwrap();

        // paranoia binary that always reports no disc
        Discovery::new(info_path, "/dev", "false").with_sysfs_block(sys)
    }

    #[tokio::test]
    async fn missing_info_table_means_no_drives() {
        let dir = TempDir::new().unwrap();
        let discovery = Discovery::new(dir.path().join("absent"), "/dev", "false");
        let drives = discovery
            .get_drive_info(DiscDriveScope::AllDrives)
            .await
            .unwrap();
        assert!(drives.is_empty());
    }

    #[tokio::test]
    async fn lists_all_drives_in_registration_order() {
        let dir = TempDir::new().unwrap();
        let discovery = fixture(&dir);
        let drives = discovery
            .get_drive_info(DiscDriveScope::AllDrives)
            .await
            .unwrap();

        assert_eq!(drives.len(), 2);
        assert_eq!(drives[0].device.as_str(), "/dev/sr0");
        assert_eq!(drives[0].name, "sr0");
        assert!(drives[0].can_play_audio);
        assert_eq!(drives[0].model.as_deref(), Some("ASUS DRW-24D5MT"));
        assert_eq!(drives[1].device.as_str(), "/dev/sr1");
        assert!(!drives[1].can_play_audio);
        assert_eq!(drives[1].model, None);
    }

    #[tokio::test]
    async fn single_drive_scope_filters_the_listing() {
        let dir = TempDir::new().unwrap();
        let discovery = fixture(&dir);
        let drives = discovery
            .get_drive_info(DiscDriveScope::single("/dev/sr1"))
            .await
            .unwrap();

        assert_eq!(drives.len(), 1);
        assert_eq!(drives[0].device.as_str(), "/dev/sr1");
    }

    #[tokio::test]
    async fn resolve_rejects_unknown_single_drive() {
        let dir = TempDir::new().unwrap();
        let discovery = fixture(&dir);
        let err = discovery
            .resolve(DiscDriveScope::single("/dev/sr9"))
            .await
            .unwrap_err();
        assert!(matches!(err, DriveError::UnknownDrive(_)));
    }

    #[tokio::test]
    async fn probe_failure_degrades_to_unknown_media() {
        let dir = TempDir::new().unwrap();
        let discovery = fixture(&dir);
        let drives = discovery
            .get_drive_info(DiscDriveScope::single("/dev/sr0"))
            .await
            .unwrap();
        // "false" exits nonzero without a no-disc message
        assert_eq!(drives[0].media, MediaState::Unknown);
    }
}
