use rhedrives::{DriveError, DriveId};
use rhelyrion::LyrionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ActionError {
    #[error(transparent)]
    Drive(#[from] DriveError),
    #[error(transparent)]
    Lyrion(#[from] LyrionError),
    #[error("scope '{0}' selects no drive")]
    NoDrive(String),
    #[error("scope '{0}' is ambiguous: this action targets exactly one drive")]
    AmbiguousScope(String),
    #[error("no audio disc in {0}")]
    NoAudioDisc(DriveId),
    #[error("a rip is already running on {0}")]
    RipInProgress(DriveId),
    #[error("rip worker failed on {device}: {message}")]
    Worker { device: DriveId, message: String },
}
