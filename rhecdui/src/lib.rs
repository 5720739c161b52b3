//! CD/disc control endpoints for RadioHome.
//!
//! The HTTP surface mirrors the historical CDUI controller:
//!
//! - `GET  /CDUI` : embedded HTML view
//! - `GET  /CDUI/Index` : drives + players listing ([`CDsModel`])
//! - `POST /CDUI/PlayCD` : play the disc in `device` on player `mac`,
//!   answered once the whole play sequence has settled
//! - `POST /CDUI/RipCD` : dispatch a rip of `device`, answered
//!   immediately; progress is read from `/CDUI/RipStatus`
//! - `POST /CDUI/EjectCD` : eject `device`, answered after the tray opened
//! - `GET  /CDUI/RipStatus` : per-drive rip state
//!
//! Registration on the server goes through the [`CdUiExt`] extension
//! trait, following the `*Ext` pattern of the other workspace crates.

pub mod api;
mod model;
mod rheserver_impl;

pub use api::{create_cdui_router, CdUiState};
pub use model::CDsModel;
pub use rheserver_impl::CdUiExt;
