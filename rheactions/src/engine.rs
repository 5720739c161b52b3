//! The action engine: resolves scopes, holds drive locks, runs sequences.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use rheconfig::get_config;
use rhedrives::{DiscDriveScope, DriveInfo, MediaState};
use rhelyrion::{CliClient, Player};
use tracing::{error, info};

use crate::action::AtomicAction;
use crate::commands::{DriveCommands, SystemDriveCommands};
use crate::errors::ActionError;
use crate::locks::DriveLocks;
use crate::rip::{RipHandle, RipRegistry, RipStatus};

/// Dispatches atomic actions and rip workers over a shared drive backend.
#[derive(Clone)]
pub struct ActionEngine {
    commands: Arc<dyn DriveCommands>,
    cli: CliClient,
    locks: DriveLocks,
    rips: RipRegistry,
    rip_output_dir: PathBuf,
    eject_after_rip: bool,
}

impl ActionEngine {
    pub fn new(
        commands: Arc<dyn DriveCommands>,
        cli: CliClient,
        rip_output_dir: impl Into<PathBuf>,
        eject_after_rip: bool,
    ) -> Self {
        Self {
            commands,
            cli,
            locks: DriveLocks::new(),
            rips: RipRegistry::new(),
            rip_output_dir: rip_output_dir.into(),
            eject_after_rip,
        }
    }

    /// Engine wired to the real drives and the configured Lyrion server.
    pub fn new_configured(cli: CliClient) -> anyhow::Result<Self> {
        let config = get_config();
        Ok(Self::new(
            Arc::new(SystemDriveCommands::new_configured()),
            cli,
            config.get_rip_output_dir()?,
            config.get_rip_eject_after(),
        ))
    }

    pub fn rips(&self) -> &RipRegistry {
        &self.rips
    }

    /// Resolves `scope` to exactly one drive.
    ///
    /// `AllDrives` is accepted only on a single-drive machine; an action
    /// pairs one player with one drive.
    async fn resolve_one(&self, scope: &DiscDriveScope) -> Result<DriveInfo, ActionError> {
        let mut drives = self.commands.resolve_drives(scope).await?;
        match drives.len() {
            0 => Err(ActionError::NoDrive(scope.to_string())),
            1 => Ok(drives.remove(0)),
            _ => Err(ActionError::AmbiguousScope(scope.to_string())),
        }
    }

    /// Runs `action` on behalf of `player`, to completion.
    ///
    /// The call returns only once the whole sequence has settled; the
    /// drive's lock is held throughout.
    pub async fn perform_action(
        &self,
        player: &Player,
        action: AtomicAction,
    ) -> Result<(), ActionError> {
        match action {
            AtomicAction::PlayCd(scope) => self.play_cd(player, scope).await,
        }
    }

    async fn play_cd(&self, player: &Player, scope: DiscDriveScope) -> Result<(), ActionError> {
        let drive = self.resolve_one(&scope).await?;
        let _guard = self.locks.lock(&drive.device).await;

        let toc = self.commands.query_toc(&drive.device).await?;
        let tracks = toc.map(|t| t.track_count()).unwrap_or(0);
        if tracks == 0 {
            return Err(ActionError::NoAudioDisc(drive.device.clone()));
        }

        info!(
            "handing {} ({} track(s)) off to player {}",
            drive.device, tracks, player
        );
        self.cli.power(player, true).await?;
        self.cli.playlist_clear(player).await?;
        self.cli
            .playlist_play(player, &format!("cdplay:{}", drive.device))
            .await?;

        Ok(())
    }

    /// Starts ripping the scoped drive and returns without awaiting it.
    ///
    /// The returned handle (and the engine's [`RipRegistry`]) is the only
    /// way to observe the rip; the worker's failures never propagate to
    /// the caller.
    pub async fn begin_rip(&self, scope: DiscDriveScope) -> Result<RipHandle, ActionError> {
        let drive = self.resolve_one(&scope).await?;
        let device = drive.device.clone();

        if !matches!(drive.media, MediaState::AudioDisc { .. } | MediaState::Unknown) {
            return Err(ActionError::NoAudioDisc(device));
        }
        // Claim the drive's rip slot before the dispatching request returns
        if !self.rips.try_begin(&device) {
            return Err(ActionError::RipInProgress(device));
        }

        let engine = self.clone();
        let worker_drive = drive.clone();
        tokio::spawn(async move {
            let device = worker_drive.device.clone();
            match engine.rip_worker(worker_drive).await {
                Ok((tracks, output_dir)) => {
                    info!("rip of {} finished: {} track(s)", device, tracks);
                    engine
                        .rips
                        .publish(&device, RipStatus::Done { tracks, output_dir });
                }
                Err(err) => {
                    error!("rip of {} failed: {}", device, err);
                    engine.rips.publish(
                        &device,
                        RipStatus::Failed {
                            error: err.to_string(),
                        },
                    );
                }
            }
        });

        Ok(RipHandle::new(device.clone(), self.rips.subscribe(&device)))
    }

    /// The detached rip worker. Holds the drive lock for the whole rip.
    async fn rip_worker(&self, drive: DriveInfo) -> Result<(u32, String), ActionError> {
        let device = drive.device.clone();
        let _guard = self.locks.lock(&device).await;

        let toc = self
            .commands
            .query_toc(&device)
            .await?
            .ok_or_else(|| ActionError::NoAudioDisc(device.clone()))?;
        let total = toc.track_count();
        if total == 0 {
            return Err(ActionError::NoAudioDisc(device.clone()));
        }

        let session_dir = self
            .rip_output_dir
            .join(format!("{}-{}", Local::now().format("%Y%m%d-%H%M%S"), drive.name));
        tokio::fs::create_dir_all(&session_dir)
            .await
            .map_err(|e| ActionError::Worker {
                device: device.clone(),
                message: format!("cannot create {}: {}", session_dir.display(), e),
            })?;

        for entry in &toc.entries {
            self.rips.publish(
                &device,
                RipStatus::Running {
                    track: entry.track,
                    total,
                },
            );
            let dest = session_dir.join(format!("track{:02}.wav", entry.track));
            self.commands.rip_track(&device, entry.track, &dest).await?;
        }

        if self.eject_after_rip {
            if let Err(err) = self.commands.eject(&device).await {
                // The audio is on disk; a stuck tray is not a failed rip
                error!("post-rip eject of {} failed: {}", device, err);
            }
        }

        Ok((total, session_dir.to_string_lossy().into_owned()))
    }
}
