use std::time::Duration;

use rheactions::ActionEngine;
use rhecdui::{CdUiExt, CdUiState};
use rheconfig::get_config;
use rhedrives::{DiscDrives, Discovery};
use rhelyrion::{CliClient, PlayerRegistry};
use rheserver::ServerBuilder;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ========== PHASE 1 : Infrastructure ==========

    let config = get_config();
    let mut server = ServerBuilder::new_configured("RadioHome").build();
    server.init_logging().await;

    info!("🏠 RadioHome instance {}", config.get_instance_id()?);

    // ========== PHASE 2 : Collaborateurs ==========

    info!("💿 Setting up optical drive layer...");
    let discovery = Discovery::new_configured();
    let drives = DiscDrives::new_configured();

    info!(
        "📻 Connecting to Lyrion server at {}:{}...",
        config.get_lyrion_host(),
        config.get_lyrion_cli_port()
    );
    let cli = CliClient::new_configured();
    let players = PlayerRegistry::new(cli.clone());

    // Premier snapshot des players, sans bloquer le démarrage si le serveur dort
    match players.refresh().await {
        Ok(count) => info!("✅ {} player(s) connected", count),
        Err(err) => tracing::warn!("⚠️ Lyrion server not reachable yet: {}", err),
    }
    let _refresh_task =
        players.spawn_refresh_task(Duration::from_secs(config.get_lyrion_refresh_secs()));

    let engine = ActionEngine::new_configured(cli)?;

    // ========== PHASE 3 : API et vue ==========

    info!("🎛️ Registering CD control endpoints...");
    server
        .init_cdui(CdUiState::new(discovery, drives, players, engine))
        .await;
    server.add_redirect("/", "/CDUI").await;

    // ========== PHASE 4 : Démarrage ==========

    server.start().await;
    server.wait().await;

    Ok(())
}
