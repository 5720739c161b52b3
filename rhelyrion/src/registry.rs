//! Registry of the players currently known to the Lyrion server.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::client::CliClient;
use crate::errors::LyrionError;
use crate::protocol::tag_value;

/// A reachable player endpoint as reported by the server.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct PlayerConnection {
    /// MAC identifier, the CLI's player id
    pub mac: String,
    pub name: String,
    /// IP address without the ephemeral port the server appends
    pub ip: String,
    pub model: String,
    pub connected: bool,
}

/// Snapshot of known players, refreshed in the background.
///
/// `get_all` never fails: when the server is unreachable the snapshot is
/// simply empty (or stale until the next successful refresh).
#[derive(Clone)]
pub struct PlayerRegistry {
    client: CliClient,
    players: Arc<RwLock<Vec<PlayerConnection>>>,
}

impl PlayerRegistry {
    pub fn new(client: CliClient) -> Self {
        Self {
            client,
            players: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Current snapshot, in server listing order.
    pub async fn get_all(&self) -> Vec<PlayerConnection> {
        self.players.read().await.clone()
    }

    /// One refresh round-trip against the server.
    pub async fn refresh(&self) -> Result<usize, LyrionError> {
        let fields = self.client.request(&["players", "0", "100"]).await?;
        let players = parse_players(&fields);
        let count = players.len();
        debug!("lyrion reports {} player(s)", count);
        *self.players.write().await = players;
        Ok(count)
    }

    /// Spawns the periodic refresh loop. An unreachable server only logs;
    /// the loop keeps polling.
    pub fn spawn_refresh_task(&self, interval: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(err) = registry.refresh().await {
                    warn!("player refresh failed: {}", err);
                }
            }
        })
    }
}

/// Parses the result fields of a `players 0 N` query.
///
/// Players are delimited by their `playerindex` tag; `playerid` alone also
/// opens a new record, some server versions omit the index.
fn parse_players(fields: &[String]) -> Vec<PlayerConnection> {
    let mut players: Vec<PlayerConnection> = Vec::new();
    let mut current: Option<PlayerConnection> = None;

    for field in fields {
        let Some((tag, value)) = tag_value(field) else {
            continue;
        };
        match tag {
            "playerindex" => {
                if let Some(done) = current.take() {
                    players.push(done);
                }
                current = Some(PlayerConnection::default());
            }
            "playerid" => {
                match current {
                    Some(ref mut p) if p.mac.is_empty() => p.mac = value.to_lowercase(),
                    _ => {
                        if let Some(done) = current.take() {
                            players.push(done);
                        }
                        current = Some(PlayerConnection {
                            mac: value.to_lowercase(),
                            ..Default::default()
                        });
                    }
                }
            }
            "name" => {
                if let Some(ref mut p) = current {
                    p.name = value.to_string();
                }
            }
            "ip" => {
                if let Some(ref mut p) = current {
                    // "192.168.1.40:41234" -> "192.168.1.40"
                    p.ip = value.rsplit_once(':').map(|(ip, _)| ip).unwrap_or(value).to_string();
                }
            }
            "model" | "modelname" => {
                if let Some(ref mut p) = current {
                    if p.model.is_empty() {
                        p.model = value.to_string();
                    }
                }
            }
            "connected" => {
                if let Some(ref mut p) = current {
                    p.connected = value == "1";
                }
            }
            _ => {}
        }
    }

    if let Some(done) = current.take() {
        players.push(done);
    }
    // A record without an id is echo noise, not a player
    players.retain(|p| !p.mac.is_empty());
    players
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_two_players() {
        let players = parse_players(&fields(&[
            "count:2",
            "playerindex:0",
            "playerid:00:04:20:aa:bb:cc",
            "ip:192.168.1.40:41234",
            "name:Kitchen Radio",
            "model:squeezelite",
            "connected:1",
            "playerindex:1",
            "playerid:00:04:20:dd:ee:ff",
            "ip:192.168.1.41:52000",
            "name:Bedroom",
            "model:boom",
            "connected:0",
        ]));

        assert_eq!(players.len(), 2);
        assert_eq!(players[0].mac, "00:04:20:aa:bb:cc");
        assert_eq!(players[0].name, "Kitchen Radio");
        assert_eq!(players[0].ip, "192.168.1.40");
        assert_eq!(players[0].model, "squeezelite");
        assert!(players[0].connected);
        assert_eq!(players[1].mac, "00:04:20:dd:ee:ff");
        assert!(!players[1].connected);
    }

    #[test]
    fn playerid_without_index_still_delimits() {
        let players = parse_players(&fields(&[
            "count:2",
            "playerid:00:04:20:aa:bb:cc",
            "name:One",
            "playerid:00:04:20:dd:ee:ff",
            "name:Two",
        ]));
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].name, "One");
        assert_eq!(players[1].name, "Two");
    }

    #[test]
    fn empty_listing_yields_no_players() {
        assert!(parse_players(&fields(&["count:0"])).is_empty());
        assert!(parse_players(&[]).is_empty());
    }

    #[test]
    fn uppercase_macs_are_normalized() {
        let players = parse_players(&fields(&["playerid:00:04:20:AA:BB:CC"]));
        assert_eq!(players[0].mac, "00:04:20:aa:bb:cc");
    }
}
