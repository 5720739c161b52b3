use crate::model::DriveId;
use rheutils::cmd::CmdError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriveError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed cdrom info table: {0}")]
    InfoFormat(String),
    #[error("no such drive: {0}")]
    UnknownDrive(DriveId),
    #[error("failed to probe {device}: {message}")]
    Probe { device: DriveId, message: String },
    #[error("eject failed on {device}: {message}")]
    Eject { device: DriveId, message: String },
    #[error(transparent)]
    Command(#[from] CmdError),
}
