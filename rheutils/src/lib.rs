/// Utilitaires partagés de l'écosystème RadioHome.
///
/// - [`guess_local_ip`] : détecte l'adresse IP locale utilisée pour les
///   connexions sortantes (sert à construire la base URL par défaut).
/// - [`cmd`] : exécution de commandes externes avec timeout, utilisée par la
///   couche lecteurs optiques (`eject`, `cdparanoia`).
mod ip_utils;

pub mod cmd;

pub use ip_utils::guess_local_ip;
