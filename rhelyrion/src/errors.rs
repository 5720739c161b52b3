use thiserror::Error;

#[derive(Error, Debug)]
pub enum LyrionError {
    #[error("cannot reach Lyrion server at {addr}: {source}")]
    Connect {
        addr: String,
        source: std::io::Error,
    },
    #[error("Lyrion server at {addr} did not answer within {timeout_secs}s")]
    Timeout { addr: String, timeout_secs: u64 },
    #[error("malformed CLI response: {0}")]
    Protocol(String),
    #[error("invalid player MAC '{0}'")]
    BadMac(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
