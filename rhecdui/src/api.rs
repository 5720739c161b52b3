//! Axum handlers for the CDUI endpoints.

use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rheactions::{ActionEngine, AtomicAction, RipStatus};
use rhedrives::{DiscDriveScope, DiscDrives, Discovery};
use rhelyrion::{Player, PlayerRegistry};
use rust_embed::RustEmbed;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::info;

use crate::model::CDsModel;

/// Static view assets, compiled into the binary.
#[derive(RustEmbed, Clone)]
#[folder = "webapp/"]
struct Webapp;

/// Everything the CDUI handlers need, shared per request.
#[derive(Clone)]
pub struct CdUiState {
    pub discovery: Discovery,
    pub drives: DiscDrives,
    pub players: PlayerRegistry,
    pub engine: ActionEngine,
}

impl CdUiState {
    pub fn new(
        discovery: Discovery,
        drives: DiscDrives,
        players: PlayerRegistry,
        engine: ActionEngine,
    ) -> Self {
        Self {
            discovery,
            drives,
            players,
            engine,
        }
    }
}

/// Erreur API : tout échec d'un collaborateur remonte tel quel en 500.
#[derive(Debug)]
pub struct ApiError(anyhow::Error);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": self.0.to_string()
            })),
        )
            .into_response()
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct PlayCdForm {
    pub device: String,
    pub mac: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct DriveForm {
    pub device: String,
}

/// The embedded HTML view; it binds itself to `/CDUI/Index`.
async fn view() -> Response {
    match Webapp::get("index.html") {
        Some(file) => Html(file.data.into_owned()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// GET /CDUI/Index - drives and players listing
#[utoipa::path(
    get,
    path = "/CDUI/Index",
    tag = "cdui",
    responses(
        (status = 200, description = "Current drives and player connections", body = CDsModel)
    )
)]
async fn index(State(state): State<CdUiState>) -> Result<Json<CDsModel>, ApiError> {
    let cds = state
        .discovery
        .get_drive_info(DiscDriveScope::AllDrives)
        .await?;
    let players = state.players.get_all().await;
    Ok(Json(CDsModel { cds, players }))
}

/// POST /CDUI/PlayCD - play the disc in `device` on player `mac`
#[utoipa::path(
    post,
    path = "/CDUI/PlayCD",
    tag = "cdui",
    request_body(content = PlayCdForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Play sequence completed"),
        (status = 500, description = "Play sequence failed")
    )
)]
async fn play_cd(
    State(state): State<CdUiState>,
    Form(form): Form<PlayCdForm>,
) -> Result<StatusCode, ApiError> {
    let player = Player::new(&form.mac)?;
    info!("play CD request: {} on {}", form.device, player);
    state
        .engine
        .perform_action(
            &player,
            AtomicAction::play_cd(DiscDriveScope::single(form.device)),
        )
        .await?;
    Ok(StatusCode::OK)
}

/// POST /CDUI/RipCD - dispatch a rip of `device`
///
/// Answers as soon as the rip worker is started; `/CDUI/RipStatus` is the
/// only place its outcome shows up.
#[utoipa::path(
    post,
    path = "/CDUI/RipCD",
    tag = "cdui",
    request_body(content = DriveForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Rip dispatched"),
        (status = 500, description = "Rip could not be dispatched")
    )
)]
async fn rip_cd(
    State(state): State<CdUiState>,
    Form(form): Form<DriveForm>,
) -> Result<StatusCode, ApiError> {
    info!("rip CD request: {}", form.device);
    state
        .engine
        .begin_rip(DiscDriveScope::single(form.device))
        .await?;
    Ok(StatusCode::OK)
}

/// POST /CDUI/EjectCD - eject `device`
#[utoipa::path(
    post,
    path = "/CDUI/EjectCD",
    tag = "cdui",
    request_body(content = DriveForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Tray opened"),
        (status = 500, description = "Eject failed")
    )
)]
async fn eject_cd(
    State(state): State<CdUiState>,
    Form(form): Form<DriveForm>,
) -> Result<StatusCode, ApiError> {
    info!("eject request: {}", form.device);
    state
        .drives
        .eject(DiscDriveScope::single(form.device))
        .await?;
    Ok(StatusCode::OK)
}

/// GET /CDUI/RipStatus - per-drive rip state
#[utoipa::path(
    get,
    path = "/CDUI/RipStatus",
    tag = "cdui",
    responses(
        (status = 200, description = "Rip status per drive")
    )
)]
async fn rip_status(State(state): State<CdUiState>) -> Json<HashMap<String, RipStatus>> {
    Json(state.engine.rips().snapshot())
}

/// Builds the CDUI router, to be nested under `/CDUI`.
pub fn create_cdui_router(state: CdUiState) -> Router {
    Router::new()
        .route("/", get(view))
        .route("/Index", get(index))
        .route("/PlayCD", post(play_cd))
        .route("/RipCD", post(rip_cd))
        .route("/EjectCD", post(eject_cd))
        .route("/RipStatus", get(rip_status))
        .with_state(state)
}

/// OpenAPI description of the CDUI surface.
#[derive(utoipa::OpenApi)]
#[openapi(
    paths(index, play_cd, rip_cd, eject_cd, rip_status),
    components(schemas(CDsModel, PlayCdForm, DriveForm, RipStatus))
)]
pub struct CdUiApiDoc;
