//! Games reachable through the portal account

use std::fmt;

use serde::{Deserialize, Serialize};

/// A game linked to a portal account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Game {
    /// Genshin Impact
    #[serde(rename = "hk4e_global")]
    GenshinImpact,
    /// Honkai Impact 3rd
    #[serde(rename = "bh3_global")]
    HonkaiImpact,
    /// Honkai: Star Rail
    #[serde(rename = "hkrpg_global")]
    HonkaiStarRail,
}

impl Game {
    /// The `game_biz` identifier the API uses for this game
    pub fn biz(&self) -> &'static str {
        match self {
            Game::GenshinImpact => "hk4e_global",
            Game::HonkaiImpact => "bh3_global",
            Game::HonkaiStarRail => "hkrpg_global",
        }
    }

    /// Activity id of the game's daily check-in event
    pub fn daily_act_id(&self) -> &'static str {
        match self {
            Game::GenshinImpact => "e202102251931481",
            Game::HonkaiImpact => "e202110291205111",
            Game::HonkaiStarRail => "e202303301540311",
        }
    }

    /// The `biz` tag daily rewards are reported under
    pub fn daily_biz(&self) -> &'static str {
        match self {
            Game::GenshinImpact | Game::HonkaiImpact => "hk4e",
            Game::HonkaiStarRail => "hkrpg",
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.biz())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_biz_identifiers() {
        assert_eq!(Game::GenshinImpact.biz(), "hk4e_global");
        assert_eq!(Game::HonkaiImpact.biz(), "bh3_global");
        assert_eq!(Game::HonkaiStarRail.biz(), "hkrpg_global");
    }

    #[test]
    fn test_serde_uses_biz_tag() {
        let json = serde_json::to_string(&Game::HonkaiStarRail).unwrap();
        assert_eq!(json, "\"hkrpg_global\"");
    }
}
