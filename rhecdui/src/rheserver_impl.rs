//! Implémentation du trait [`CdUiExt`] pour `rheserver::Server`.
//!
//! `rhecdui` étend `rheserver::Server` sans que `rheserver` ne le
//! connaisse ; c'est le pattern d'extension utilisé par les crates de
//! l'écosystème RadioHome.

use rheserver::Server;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{create_cdui_router, CdUiApiDoc, CdUiState};

/// Trait d'extension ajoutant les endpoints CDUI au serveur.
pub trait CdUiExt {
    /// Enregistre la vue et l'API CDUI :
    ///
    /// - `/CDUI` et ses endpoints (voir la doc de crate)
    /// - `/swagger-ui/cdui` et `/api-docs/cdui.json`
    fn init_cdui(&mut self, state: CdUiState) -> impl std::future::Future<Output = ()> + Send;
}

impl CdUiExt for Server {
    async fn init_cdui(&mut self, state: CdUiState) {
        self.add_router("/CDUI", create_cdui_router(state)).await;

        let swagger =
            SwaggerUi::new("/swagger-ui/cdui").url("/api-docs/cdui.json", CdUiApiDoc::openapi());
        self.add_router("/", swagger.into()).await;

        info!("✅ CDUI registered at /CDUI");
        info!("   Swagger UI available at /swagger-ui/cdui");
    }
}
