//! Genshin Impact game client

use std::fmt;

use hoyo_http::{Error, HttpClient, Language, Method, Result, DEFAULT_TTL_SECONDS};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::account::Hoyolab;
use crate::cookie::Cookie;
use crate::daily::DailyModule;
use crate::game::Game;
use crate::map_data;
use crate::redeem::RedeemModule;
use crate::routes;

/// Referer the game-event endpoints expect
const ACT_REFERER: &str = "https://act.hoyolab.com";

/// Genshin Impact server regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenshinRegion {
    /// America
    #[serde(rename = "os_usa")]
    Usa,
    /// Europe
    #[serde(rename = "os_euro")]
    Europe,
    /// Asia
    #[serde(rename = "os_asia")]
    Asia,
    /// Taiwan, Hong Kong and Macao
    #[serde(rename = "os_cht")]
    ChinaTaiwan,
}

impl GenshinRegion {
    /// The server identifier the API expects
    pub fn as_str(&self) -> &'static str {
        match self {
            GenshinRegion::Usa => "os_usa",
            GenshinRegion::Europe => "os_euro",
            GenshinRegion::Asia => "os_asia",
            GenshinRegion::ChinaTaiwan => "os_cht",
        }
    }

    /// Derive the region from a UID; the leading digit encodes the server.
    pub fn from_uid(uid: u64) -> Result<Self> {
        match uid.to_string().chars().next() {
            Some('6') => Ok(GenshinRegion::Usa),
            Some('7') => Ok(GenshinRegion::Europe),
            Some('8') => Ok(GenshinRegion::Asia),
            Some('9') => Ok(GenshinRegion::ChinaTaiwan),
            _ => Err(Error::api(format!("given UID {uid} is invalid"))),
        }
    }
}

impl fmt::Display for GenshinRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One running expedition on the real-time notes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Expedition {
    /// Icon of the dispatched character
    pub avatar_side_icon: String,
    /// `Ongoing` or `Finished`
    pub status: String,
    /// Seconds until the expedition finishes
    pub remained_time: String,
}

/// Real-time notes: resin, commissions, expeditions and realm currency
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyNote {
    /// Current original resin
    pub current_resin: u32,
    /// Resin cap
    pub max_resin: u32,
    /// Seconds until resin is full
    pub resin_recovery_time: String,
    /// Daily commissions finished
    pub finished_task_num: u32,
    /// Daily commissions available
    pub total_task_num: u32,
    /// Whether the extra commission reward was collected
    pub is_extra_task_reward_received: bool,
    /// Remaining weekly boss resin discounts
    pub remain_resin_discount_num: u32,
    /// Weekly boss resin discount cap
    pub resin_discount_num_limit: u32,
    /// Expeditions currently dispatched
    pub current_expedition_num: u32,
    /// Expedition slots
    pub max_expedition_num: u32,
    /// The dispatched expeditions
    pub expeditions: Vec<Expedition>,
    /// Current realm currency
    pub current_home_coin: u32,
    /// Realm currency cap
    pub max_home_coin: u32,
    /// Seconds until realm currency is full
    pub home_coin_recovery_time: String,
}

/// Client for one Genshin Impact account
pub struct Genshin {
    request: HttpClient,
    lang: Language,
    region: GenshinRegion,
    uid: u64,
}

impl Genshin {
    /// Create a client from a cookie string.
    ///
    /// When `uid` is not given, the highest-level Genshin account linked to
    /// the portal account is looked up — which requires `cookie_token_v2`.
    pub async fn create(cookie: &str, lang: Option<Language>, uid: Option<u64>) -> Result<Self> {
        let parsed = Cookie::parse(cookie)?;
        let lang = lang.or(parsed.mi18n_lang).unwrap_or_default();

        let uid = match uid {
            Some(uid) => uid,
            None => {
                let mut hoyolab = Hoyolab::with_cookie(parsed.clone(), Some(lang))?;
                let account = hoyolab.game_account(Game::GenshinImpact).await?;
                account
                    .game_uid
                    .parse()
                    .map_err(|_| Error::api(format!("given UID {} is invalid", account.game_uid)))?
            }
        };
        let region = GenshinRegion::from_uid(uid)?;

        debug!("Genshin client for uid {uid} on {region}");

        let mut request = HttpClient::new()?
            .with_cookie(&parsed.to_cookie_string())?
            .with_lang(lang);
        request.set_referer(ACT_REFERER);

        Ok(Self {
            request,
            lang,
            region,
            uid,
        })
    }

    /// The account UID this client reads
    pub fn uid(&self) -> u64 {
        self.uid
    }

    /// The server region derived from the UID
    pub fn region(&self) -> GenshinRegion {
        self.region
    }

    /// Daily check-in operations
    pub fn daily(&mut self) -> DailyModule<'_> {
        DailyModule::new(
            &mut self.request,
            self.lang,
            Game::GenshinImpact,
            Some(self.region.as_str().to_string()),
        )
    }

    /// Gift-code redemption
    pub fn redeem(&mut self) -> RedeemModule<'_> {
        RedeemModule::new(
            &mut self.request,
            self.lang,
            Game::GenshinImpact,
            Some(self.region.as_str().to_string()),
            Some(self.uid),
        )
    }

    /// Real-time notes for the account. Requires request signing.
    pub async fn daily_note(&mut self) -> Result<DailyNote> {
        self.request
            .set_query_params([
                ("server", json!(self.region.as_str())),
                ("role_id", json!(self.uid.to_string())),
            ])
            .set_ds(true);

        let result = self
            .request
            .send(&routes::genshin_daily_note(), Method::GET, DEFAULT_TTL_SECONDS)
            .await?;

        map_data(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_region_from_uid() {
        assert_eq!(
            GenshinRegion::from_uid(600000001).unwrap(),
            GenshinRegion::Usa
        );
        assert_eq!(
            GenshinRegion::from_uid(700000001).unwrap(),
            GenshinRegion::Europe
        );
        assert_eq!(
            GenshinRegion::from_uid(800000001).unwrap(),
            GenshinRegion::Asia
        );
        assert_eq!(
            GenshinRegion::from_uid(900000001).unwrap(),
            GenshinRegion::ChinaTaiwan
        );
    }

    #[test]
    fn test_region_from_invalid_uid() {
        assert!(GenshinRegion::from_uid(100000001).is_err());
        assert!(GenshinRegion::from_uid(0).is_err());
    }

    #[test]
    fn test_daily_note_decodes_permissively() {
        let note: DailyNote = serde_json::from_value(json!({
            "current_resin": 159,
            "max_resin": 160,
            "resin_recovery_time": "480",
            "finished_task_num": 4,
            "total_task_num": 4,
            "is_extra_task_reward_received": true,
            "expeditions": [
                {"avatar_side_icon": "https://example.com/fischl.png", "status": "Finished", "remained_time": "0"},
            ],
            "transformer": {"obtained": true},
        }))
        .unwrap();

        assert_eq!(note.current_resin, 159);
        assert_eq!(note.expeditions.len(), 1);
        assert_eq!(note.expeditions[0].status, "Finished");
        // Omitted on the wire, defaulted
        assert_eq!(note.current_home_coin, 0);
    }
}
