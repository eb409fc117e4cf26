//! Endpoint URLs for the portal API

use crate::game::Game;

/// Community/forum API host
pub const BBS_API: &str = "https://bbs-api-os.hoyolab.com";
/// Account-binding API host
pub const ACCOUNT_API: &str = "https://api-account-os.hoyolab.com";
/// Genshin Impact event API host
pub const HK4E_API: &str = "https://sg-hk4e-api.hoyolab.com";
/// Shared event API host for the other games
pub const PUBLIC_API: &str = "https://sg-public-api.hoyolab.com";

/// Games linked to the account cookie
pub fn user_games_list() -> String {
    format!("{ACCOUNT_API}/account/binding/api/getUserGameRolesByCookieToken")
}

/// Record card summary for the account
pub fn game_record_card() -> String {
    format!("{BBS_API}/game_record/card/wapi/getGameRecordCard")
}

/// Daily check-in host and event path for a game
fn daily_event(game: Game) -> (&'static str, &'static str) {
    match game {
        Game::GenshinImpact => (HK4E_API, "event/sol"),
        Game::HonkaiImpact => (PUBLIC_API, "event/mani"),
        Game::HonkaiStarRail => (PUBLIC_API, "event/luna/os"),
    }
}

/// Daily check-in status
pub fn daily_info(game: Game) -> String {
    let (host, event) = daily_event(game);
    format!("{host}/{event}/info?act_id={}", game.daily_act_id())
}

/// Daily check-in monthly reward list
pub fn daily_rewards(game: Game) -> String {
    let (host, event) = daily_event(game);
    format!("{host}/{event}/home?act_id={}", game.daily_act_id())
}

/// Daily check-in claim endpoint
pub fn daily_claim(game: Game) -> String {
    let (host, event) = daily_event(game);
    format!("{host}/{event}/sign?act_id={}", game.daily_act_id())
}

/// Gift-code redemption endpoint
pub fn redeem_claim(game: Game) -> String {
    let host = match game {
        Game::GenshinImpact => HK4E_API,
        Game::HonkaiImpact | Game::HonkaiStarRail => PUBLIC_API,
    };
    format!("{host}/common/apicdkey/api/webExchangeCdkey")
}

/// Genshin Impact real-time notes record endpoint
pub fn genshin_daily_note() -> String {
    format!("{BBS_API}/game_record/genshin/api/dailyNote")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_routes_carry_act_id() {
        assert_eq!(
            daily_info(Game::GenshinImpact),
            "https://sg-hk4e-api.hoyolab.com/event/sol/info?act_id=e202102251931481"
        );
        assert_eq!(
            daily_claim(Game::HonkaiStarRail),
            "https://sg-public-api.hoyolab.com/event/luna/os/sign?act_id=e202303301540311"
        );
        assert_eq!(
            daily_rewards(Game::HonkaiImpact),
            "https://sg-public-api.hoyolab.com/event/mani/home?act_id=e202110291205111"
        );
    }

    #[test]
    fn test_account_routes() {
        assert!(user_games_list().starts_with(ACCOUNT_API));
        assert!(game_record_card().starts_with(BBS_API));
        assert!(redeem_claim(Game::GenshinImpact).starts_with(HK4E_API));
    }
}
