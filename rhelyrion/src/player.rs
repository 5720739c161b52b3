use crate::errors::LyrionError;
use serde::Serialize;

/// Handle on a Lyrion player, identified by its MAC address.
///
/// The MAC is validated and normalized to lowercase at construction, so a
/// `Player` always carries a well-formed identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Player {
    mac: String,
}

impl Player {
    pub fn new(mac: &str) -> Result<Self, LyrionError> {
        let normalized = mac.trim().to_lowercase();
        if !is_valid_mac(&normalized) {
            return Err(LyrionError::BadMac(mac.to_string()));
        }
        Ok(Player { mac: normalized })
    }

    pub fn mac(&self) -> &str {
        &self.mac
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.mac)
    }
}

fn is_valid_mac(mac: &str) -> bool {
    let octets: Vec<&str> = mac.split(':').collect();
    octets.len() == 6
        && octets
            .iter()
            .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_and_normalizes_a_valid_mac() {
        let player = Player::new("00:04:20:AA:BB:CC").unwrap();
        assert_eq!(player.mac(), "00:04:20:aa:bb:cc");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let player = Player::new("  00:04:20:aa:bb:cc\n").unwrap();
        assert_eq!(player.mac(), "00:04:20:aa:bb:cc");
    }

    #[test]
    fn rejects_malformed_macs() {
        for bad in [
            "",
            "kitchen",
            "00:04:20:aa:bb",
            "00:04:20:aa:bb:cc:dd",
            "00:04:20:aa:bb:cg",
            "0004.20aa.bbcc",
        ] {
            assert!(
                matches!(Player::new(bad), Err(LyrionError::BadMac(_))),
                "should reject {:?}",
                bad
            );
        }
    }
}
