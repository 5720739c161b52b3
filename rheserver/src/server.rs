//! Serveur HTTP principal.
//!
//! [`Server`] encapsule un `axum::Router` derrière un `Arc<RwLock<_>>` :
//! les crates métier ajoutent leurs routes pendant la phase de démarrage,
//! puis [`Server::start`] fige le router et sert les requêtes jusqu'à
//! réception de Ctrl+C.

use crate::logs::{init_logging, log_dump, log_setup_get, log_setup_post, log_sse, LogState};
use axum::handler::Handler;
use axum::response::Redirect;
use axum::routing::get;
use axum::Router;
use rheconfig::get_config;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{signal, sync::RwLock, task::JoinHandle};
use tracing::info;
use utoipa_swagger_ui::SwaggerUi;

/// Info serveur sérialisable
#[derive(Clone, Serialize, utoipa::ToSchema)]
pub struct ServerInfo {
    pub name: String,
    pub base_url: String,
    pub http_port: u16,
}

/// Serveur principal
pub struct Server {
    name: String,
    base_url: String,
    http_port: u16,
    router: Arc<RwLock<Router>>,
    join_handle: Option<JoinHandle<()>>,
    log_state: Option<LogState>,
}

impl Server {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>, http_port: u16) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            http_port,
            router: Arc::new(RwLock::new(Router::new())),
            join_handle: None,
            log_state: None,
        }
    }

    /// Fusionne `route` à la racine ou la neste sous `path`.
    async fn mount(&self, path: &str, route: Router) {
        let mut r = self.router.write().await;
        *r = if path == "/" {
            std::mem::take(&mut *r).merge(route)
        } else {
            std::mem::take(&mut *r).nest(path, route)
        };
    }

    /// Ajoute un handler GET avec état.
    pub async fn add_handler_with_state<H, T, S>(&mut self, path: &str, handler: H, state: S)
    where
        H: Handler<T, S> + Clone + 'static,
        T: 'static,
        S: Clone + Send + Sync + 'static,
    {
        let route = Router::new().route("/", get(handler)).with_state(state);
        self.mount(path, route).await;
    }

    /// Ajoute un sous-router au serveur.
    pub async fn add_router(&mut self, path: &str, sub_router: Router) {
        if path == "/" {
            self.mount("/", sub_router).await;
        } else {
            let normalized = format!("/{}", path.trim_start_matches('/'));
            self.mount(&normalized, sub_router).await;
        }
    }

    /// Ajoute une redirection permanente (308).
    pub async fn add_redirect(&mut self, from: &str, to: &str) {
        let target = to.to_string();
        let handler = get(move || async move { Redirect::permanent(&target) });
        self.mount(from, Router::new().route("/", handler)).await;
    }

    /// Enregistre une API documentée.
    ///
    /// Le router est nesté sous `/api/<name>` ; la documentation Swagger est
    /// servie sous `/swagger-ui/<name>` et la spécification OpenAPI sous
    /// `/api-docs/<name>.json`.
    pub async fn add_openapi(
        &mut self,
        api_router: Router,
        openapi: utoipa::openapi::OpenApi,
        name: &str,
    ) {
        let swagger_path: &'static str =
            Box::leak(format!("/swagger-ui/{}", name).into_boxed_str());
        let json_path: &'static str = Box::leak(format!("/api-docs/{}.json", name).into_boxed_str());
        let swagger = SwaggerUi::new(swagger_path).url(json_path, openapi);

        let nested = Router::new().nest(&format!("/api/{}", name), api_router);

        let mut r = self.router.write().await;
        *r = std::mem::take(&mut *r).merge(nested).merge(swagger);
    }

    /// Démarre le serveur HTTP et installe la gestion de Ctrl+C.
    pub async fn start(&mut self) {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.http_port));
        info!(
            "Server {} listening on {} (base URL http://{}:{})",
            self.name, addr, self.base_url, self.http_port
        );

        let router = self.router.clone();
        let server_task = tokio::spawn(async move {
            let r = router.read().await.clone();
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .expect("failed to bind HTTP listener");
            axum::serve(listener, r.into_make_service())
                .await
                .expect("HTTP server failed");
        });

        let shutdown_task = tokio::spawn(async move {
            signal::ctrl_c().await.expect("failed to listen for ctrl_c");
            info!("Ctrl+C reçu, arrêt gracieux");
        });

        self.join_handle = Some(tokio::spawn(async move {
            tokio::select! {
                _ = server_task => {},
                _ = shutdown_task => {},
            }
        }));
    }

    /// Attend la fin du serveur.
    pub async fn wait(&mut self) {
        if let Some(h) = self.join_handle.take() {
            let _ = h.await;
        }
    }

    pub fn info(&self) -> ServerInfo {
        ServerInfo {
            name: self.name.clone(),
            base_url: self.base_url.clone(),
            http_port: self.http_port,
        }
    }

    /// Initialise le système de logging et enregistre les routes associées :
    /// `/log-dump`, `/log-sse` et `/api/log_setup` (GET/POST).
    pub async fn init_logging(&mut self) {
        let log_state = init_logging();

        self.add_handler_with_state("/log-sse", log_sse, log_state.clone())
            .await;
        self.add_handler_with_state("/log-dump", log_dump, log_state.clone())
            .await;

        let setup = Router::new()
            .route("/", get(log_setup_get).post(log_setup_post))
            .with_state(log_state.clone());
        self.add_router("/api/log_setup", setup).await;

        self.log_state = Some(log_state);
    }
}

/// Builder pattern
pub struct ServerBuilder {
    name: String,
    base_url: String,
    http_port: u16,
}

impl ServerBuilder {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>, http_port: u16) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            http_port,
        }
    }

    /// Builder initialisé depuis la configuration globale.
    pub fn new_configured(name: impl Into<String>) -> Self {
        let config = get_config();
        Self {
            name: name.into(),
            base_url: config.get_base_url(),
            http_port: config.get_http_port(),
        }
    }

    pub fn build(self) -> Server {
        Server::new(self.name, self.base_url, self.http_port)
    }
}
