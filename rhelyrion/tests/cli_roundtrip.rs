//! Round-trip tests against a scripted CLI endpoint.

use std::time::Duration;

use rhelyrion::{CliClient, Player, PlayerRegistry};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

/// Accepts one connection, asserts the request line, answers with `response`.
async fn scripted_server(expected: &'static str, response: &'static str) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        let mut line = String::new();
        BufReader::new(read_half).read_line(&mut line).await.unwrap();
        assert_eq!(line, expected);
        write_half.write_all(response.as_bytes()).await.unwrap();
    });
    port
}

fn client(port: u16) -> CliClient {
    CliClient::new("127.0.0.1", port, Duration::from_secs(2))
}

#[tokio::test]
async fn request_encodes_strips_echo_and_decodes() {
    let port = scripted_server("players 0 100\n", "players 0 100 count%3A0\n").await;

    let fields = client(port).request(&["players", "0", "100"]).await.unwrap();
    assert_eq!(fields, vec!["count:0"]);
}

#[tokio::test]
async fn player_command_is_prefixed_with_the_mac() {
    let port = scripted_server(
        "00%3A04%3A20%3Aaa%3Abb%3Acc playlist play cdplay%3A%2Fdev%2Fsr0\n",
        "00%3A04%3A20%3Aaa%3Abb%3Acc playlist play cdplay%3A%2Fdev%2Fsr0\n",
    )
    .await;

    let player = Player::new("00:04:20:AA:BB:CC").unwrap();
    client(port)
        .playlist_play(&player, "cdplay:/dev/sr0")
        .await
        .unwrap();
}

#[tokio::test]
async fn registry_refresh_replaces_the_snapshot() {
    let port = scripted_server(
        "players 0 100\n",
        "players 0 100 count%3A1 playerindex%3A0 playerid%3A00%3A04%3A20%3Aaa%3Abb%3Acc ip%3A192.168.1.40%3A41234 name%3AKitchen connected%3A1\n",
    )
    .await;

    let registry = PlayerRegistry::new(client(port));
    assert!(registry.get_all().await.is_empty());

    let count = registry.refresh().await.unwrap();
    assert_eq!(count, 1);

    let players = registry.get_all().await;
    assert_eq!(players.len(), 1);
    assert_eq!(players[0].mac, "00:04:20:aa:bb:cc");
    assert_eq!(players[0].name, "Kitchen");
    assert_eq!(players[0].ip, "192.168.1.40");
    assert!(players[0].connected);
}

#[tokio::test]
async fn unreachable_server_is_a_connect_error_and_keeps_snapshot_empty() {
    // Bind-then-drop to get a port nothing listens on
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };

    let registry = PlayerRegistry::new(client(port));
    assert!(registry.refresh().await.is_err());
    assert!(registry.get_all().await.is_empty());
}
