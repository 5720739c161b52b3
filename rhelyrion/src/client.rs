//! One-shot CLI requests over TCP.

use std::time::Duration;

use rheconfig::get_config;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::errors::LyrionError;
use crate::player::Player;
use crate::protocol;

/// Client for the Lyrion CLI protocol.
///
/// Each request opens its own connection; the CLI port accepts that usage
/// and it keeps the client free of connection state to supervise.
#[derive(Clone, Debug)]
pub struct CliClient {
    host: String,
    port: u16,
    timeout: Duration,
}

impl CliClient {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    pub fn new_configured() -> Self {
        let config = get_config();
        Self::new(
            config.get_lyrion_host(),
            config.get_lyrion_cli_port(),
            Duration::from_secs(config.get_lyrion_timeout_secs()),
        )
    }

    fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Sends one request line and returns the decoded response fields,
    /// with the echoed request stripped.
    pub async fn request(&self, fields: &[&str]) -> Result<Vec<String>, LyrionError> {
        let addr = self.addr();
        let timeout_err = || LyrionError::Timeout {
            addr: addr.clone(),
            timeout_secs: self.timeout.as_secs(),
        };

        let stream = timeout(self.timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| timeout_err())?
            .map_err(|source| LyrionError::Connect {
                addr: addr.clone(),
                source,
            })?;

        let (read_half, mut write_half) = stream.into_split();
        let line = protocol::encode_request(fields);
        debug!("lyrion request: {}", line.trim_end());

        timeout(self.timeout, write_half.write_all(line.as_bytes()))
            .await
            .map_err(|_| timeout_err())??;

        let mut reader = BufReader::new(read_half);
        let mut response = String::new();
        let n = timeout(self.timeout, reader.read_line(&mut response))
            .await
            .map_err(|_| timeout_err())??;
        if n == 0 {
            return Err(LyrionError::Protocol(
                "connection closed before any response".to_string(),
            ));
        }

        let decoded = protocol::decode_fields(response.trim_end());
        Ok(protocol::strip_echo(&decoded, fields).to_vec())
    }

    /// Sends a command addressed to one player (`<mac> <command...>`).
    pub async fn player_request(
        &self,
        player: &Player,
        command: &[&str],
    ) -> Result<Vec<String>, LyrionError> {
        let mut fields = Vec::with_capacity(command.len() + 1);
        fields.push(player.mac());
        fields.extend_from_slice(command);
        self.request(&fields).await
    }

    // Player commands used by the action layer.

    pub async fn power(&self, player: &Player, on: bool) -> Result<(), LyrionError> {
        self.player_request(player, &["power", if on { "1" } else { "0" }])
            .await?;
        Ok(())
    }

    pub async fn playlist_clear(&self, player: &Player) -> Result<(), LyrionError> {
        self.player_request(player, &["playlist", "clear"]).await?;
        Ok(())
    }

    pub async fn playlist_play(&self, player: &Player, url: &str) -> Result<(), LyrionError> {
        self.player_request(player, &["playlist", "play", url])
            .await?;
        Ok(())
    }

    pub async fn stop(&self, player: &Player) -> Result<(), LyrionError> {
        self.player_request(player, &["stop"]).await?;
        Ok(())
    }
}
