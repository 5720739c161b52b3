use serde::Serialize;

/// Device path of an optical drive, e.g. `/dev/sr0`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, utoipa::ToSchema)]
pub struct DriveId(pub String);

impl DriveId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DriveId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DriveId {
    fn from(s: &str) -> Self {
        DriveId(s.to_string())
    }
}

impl From<String> for DriveId {
    fn from(s: String) -> Self {
        DriveId(s)
    }
}

/// Drive selector for disc operations: one named drive, or every drive.
///
/// Matched exhaustively at every use site; a play action only ever accepts
/// a scope resolving to exactly one drive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiscDriveScope {
    AllDrives,
    SingleDrive(DriveId),
}

impl DiscDriveScope {
    pub fn single(device: impl Into<DriveId>) -> Self {
        DiscDriveScope::SingleDrive(device.into())
    }

    /// The single drive this scope names, if any.
    pub fn device(&self) -> Option<&DriveId> {
        match self {
            DiscDriveScope::AllDrives => None,
            DiscDriveScope::SingleDrive(id) => Some(id),
        }
    }

    pub fn matches(&self, id: &DriveId) -> bool {
        match self {
            DiscDriveScope::AllDrives => true,
            DiscDriveScope::SingleDrive(scoped) => scoped == id,
        }
    }
}

impl std::fmt::Display for DiscDriveScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscDriveScope::AllDrives => f.write_str("all drives"),
            DiscDriveScope::SingleDrive(id) => write!(f, "drive {}", id),
        }
    }
}

/// What the drive currently holds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaState {
    NoDisc,
    AudioDisc { tracks: u32 },
    DataDisc,
    Unknown,
}

/// One discovered optical drive.
#[derive(Clone, Debug, Serialize, utoipa::ToSchema)]
pub struct DriveInfo {
    /// Device path (`/dev/sr0`)
    pub device: DriveId,
    /// Kernel drive name (`sr0`)
    pub name: String,
    /// Vendor/model string from sysfs, when available
    pub model: Option<String>,
    pub can_open_tray: bool,
    pub can_close_tray: bool,
    pub can_play_audio: bool,
    pub media: MediaState,
}

/// One audio track entry from a disc's table of contents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub track: u32,
    /// Length in CD sectors (1/75 s)
    pub sectors: u64,
    /// Start offset in CD sectors
    pub begin: u64,
}

/// Audio table of contents of an inserted disc.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiscToc {
    pub entries: Vec<TocEntry>,
    pub total_sectors: u64,
}

impl DiscToc {
    pub fn track_count(&self) -> u32 {
        self.entries.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_matches_single_drive_only() {
        let scope = DiscDriveScope::single("/dev/sr0");
        assert!(scope.matches(&DriveId::from("/dev/sr0")));
        assert!(!scope.matches(&DriveId::from("/dev/sr1")));
        assert_eq!(scope.device().unwrap().as_str(), "/dev/sr0");
    }

    #[test]
    fn all_drives_matches_everything_and_names_none() {
        let scope = DiscDriveScope::AllDrives;
        assert!(scope.matches(&DriveId::from("/dev/sr0")));
        assert!(scope.matches(&DriveId::from("/dev/sr9")));
        assert!(scope.device().is_none());
    }
}
