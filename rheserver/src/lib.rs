//! # rheserver - Serveur web de RadioHome
//!
//! Abstraction de haut niveau au-dessus d'Axum pour les services RadioHome :
//!
//! - 🚀 Enregistrement simple de handlers et de sous-routers
//! - 🔀 Redirections permanentes
//! - 📚 Documentation OpenAPI/Swagger par API enregistrée
//! - 📡 Logs en mémoire avec dump REST et flux SSE
//! - ⚡ Arrêt gracieux sur Ctrl+C
//!
//! Les crates métier étendent [`Server`] via des traits d'extension
//! (pattern `*Ext`), sans que `rheserver` ne les connaisse.

pub mod logs;
pub mod server;

pub use logs::LogState;
pub use server::{Server, ServerBuilder, ServerInfo};
