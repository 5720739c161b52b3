//! Exécution de commandes externes avec timeout.
//!
//! La couche lecteurs optiques pilote des binaires système (`eject`,
//! `cdparanoia`) qui peuvent bloquer longtemps sur un tiroir récalcitrant.
//! Toutes les invocations passent donc par [`run`], qui borne la durée
//! d'exécution et tue le processus en cas de dépassement.

use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

#[derive(Error, Debug)]
pub enum CmdError {
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("'{program}' did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },
    #[error("i/o error while waiting for '{program}': {source}")]
    Wait {
        program: String,
        source: std::io::Error,
    },
}

/// Sortie capturée d'une commande terminée.
#[derive(Debug, Clone)]
pub struct CmdOutput {
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CmdOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Exécute `program` avec `args`, en capturant stdout/stderr.
///
/// Le processus est tué si la durée `timeout` est dépassée
/// (`kill_on_drop`), et l'appel retourne [`CmdError::Timeout`].
pub async fn run(program: &str, args: &[&str], timeout: Duration) -> Result<CmdOutput, CmdError> {
    debug!("running command: {} {}", program, args.join(" "));

    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| CmdError::Spawn {
            program: program.to_string(),
            source,
        })?;

    let output = tokio::time::timeout(timeout, child.wait_with_output())
        .await
        .map_err(|_| CmdError::Timeout {
            program: program.to_string(),
            timeout,
        })?
        .map_err(|source| CmdError::Wait {
            program: program.to_string(),
            source,
        })?;

    Ok(CmdOutput {
        status: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
