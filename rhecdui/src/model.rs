use rhedrives::DriveInfo;
use rhelyrion::PlayerConnection;
use serde::Serialize;

/// Listing served to the CD view: the machine's drives and the players
/// currently known to the Lyrion server.
///
/// Built fresh on every request and handed straight to the response;
/// nothing here is cached or persisted. Both lists keep their source
/// order (drive registration order, server listing order).
#[derive(Clone, Debug, Serialize, utoipa::ToSchema)]
pub struct CDsModel {
    pub cds: Vec<DriveInfo>,
    pub players: Vec<PlayerConnection>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_model_serializes_to_two_empty_lists() {
        let model = CDsModel {
            cds: Vec::new(),
            players: Vec::new(),
        };
        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json, serde_json::json!({ "cds": [], "players": [] }));
    }
}
