//! Portal account client

use hoyo_http::{Error, HttpClient, Language, Method, Result, DEFAULT_TTL_SECONDS};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::cookie::Cookie;
use crate::game::Game;
use crate::map_data;
use crate::routes;

/// A game linked to a portal account
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameAccount {
    /// Business identifier of the game
    pub game_biz: String,
    /// Server region the account plays on
    pub region: String,
    /// In-game account id
    pub game_uid: String,
    /// In-game nickname
    pub nickname: String,
    /// Adventure/trailblaze/captain level
    pub level: u32,
    /// Whether this account is the chosen one for the game
    pub is_chosen: bool,
    /// Human-readable region name
    pub region_name: String,
    /// Whether the account is on an official server
    pub is_official: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GameAccountList {
    list: Vec<GameAccount>,
}

/// One statistic entry on a record card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordCardEntry {
    /// Statistic name
    pub name: String,
    /// Statistic kind discriminator
    #[serde(rename = "type")]
    pub kind: u32,
    /// Rendered value
    pub value: String,
}

/// Record card of one game on the account
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRecordCard {
    /// Whether the account has a role in this game
    pub has_role: bool,
    /// Numeric game id
    pub game_id: u32,
    /// In-game account id
    pub game_role_id: String,
    /// In-game nickname
    pub nickname: String,
    /// Server region
    pub region: String,
    /// Account level
    pub level: u32,
    /// Card background image URL
    pub background_image: String,
    /// Whether the card is publicly visible
    pub is_public: bool,
    /// Headline statistics
    pub data: Vec<RecordCardEntry>,
    /// Human-readable region name
    pub region_name: String,
    /// Link to the full record page
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GameRecordCardList {
    list: Vec<GameRecordCard>,
}

/// Client for the account-level portal endpoints.
///
/// Owns one request engine; account calls borrow it exclusively, so clones
/// of the parsed cookie can be handed to per-game clients without sharing
/// transport state.
pub struct Hoyolab {
    cookie: Cookie,
    request: HttpClient,
    lang: Language,
}

impl Hoyolab {
    /// Create a client from a browser cookie string.
    ///
    /// The response language falls back to the cookie's `mi18nLang`, then
    /// English.
    pub fn new(cookie: &str) -> Result<Self> {
        Self::with_cookie(Cookie::parse(cookie)?, None)
    }

    /// Create a client from an already-parsed cookie
    pub fn with_cookie(cookie: Cookie, lang: Option<Language>) -> Result<Self> {
        let lang = lang.or(cookie.mi18n_lang).unwrap_or_default();
        let request = HttpClient::new()?
            .with_cookie(&cookie.to_cookie_string())?
            .with_lang(lang);

        Ok(Self {
            cookie,
            request,
            lang,
        })
    }

    /// The parsed cookie this client authenticates with
    pub fn cookie(&self) -> &Cookie {
        &self.cookie
    }

    /// The response language in use
    pub fn lang(&self) -> Language {
        self.lang
    }

    /// List the game accounts linked to this portal account, optionally
    /// restricted to one game.
    ///
    /// Requires `cookie_token_v2`, which the account-binding API insists on.
    pub async fn games_list(&mut self, game: Option<Game>) -> Result<Vec<GameAccount>> {
        if self.cookie.cookie_token_v2.is_none() {
            return Err(Error::api(
                "cookie_token_v2 must be set on the cookie to access this API",
            ));
        }

        if let Some(game) = game {
            self.request.set_query_params([("game_biz", json!(game.biz()))]);
        }

        let lang_key = self.cookie.mi18n_lang.unwrap_or(self.lang);
        self.request.set_query_params([
            ("uid", json!(self.cookie.ltuid)),
            ("sLangKey", json!(lang_key.as_str())),
        ]);

        let result = self
            .request
            .send(&routes::user_games_list(), Method::GET, DEFAULT_TTL_SECONDS)
            .await?;

        let accounts: GameAccountList = map_data(&result)?;
        debug!("Fetched {} linked game account(s)", accounts.list.len());

        Ok(accounts.list)
    }

    /// The highest-level account for `game`.
    pub async fn game_account(&mut self, game: Game) -> Result<GameAccount> {
        let accounts = self.games_list(Some(game)).await?;

        accounts
            .into_iter()
            .max_by_key(|account| account.level)
            .ok_or_else(|| Error::api("there is no game account on this portal account"))
    }

    /// Record cards for every game on the account
    pub async fn game_record_card(&mut self) -> Result<Vec<GameRecordCard>> {
        let uid = self
            .cookie
            .account_id
            .or(self.cookie.account_id_v2)
            .unwrap_or(self.cookie.ltuid);
        self.request.set_query_params([("uid", json!(uid))]);

        let result = self
            .request
            .send(&routes::game_record_card(), Method::GET, DEFAULT_TTL_SECONDS)
            .await?;

        let cards: GameRecordCardList = map_data(&result)?;
        Ok(cards.list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_game_account_decodes_permissively() {
        // Unknown fields are ignored, missing ones default
        let account: GameAccount = serde_json::from_value(json!({
            "game_biz": "hk4e_global",
            "region": "os_euro",
            "game_uid": "700000001",
            "nickname": "Traveler",
            "level": 60,
            "is_chosen": false,
            "region_name": "Europe",
            "is_official": true,
            "some_future_field": {"nested": true},
        }))
        .unwrap();

        assert_eq!(account.level, 60);
        assert_eq!(account.region, "os_euro");

        let sparse: GameAccount = serde_json::from_value(json!({"level": 1})).unwrap();
        assert_eq!(sparse.game_biz, "");
        assert_eq!(sparse.level, 1);
    }

    #[test]
    fn test_record_card_entry_maps_reserved_word() {
        let entry: RecordCardEntry = serde_json::from_value(json!({
            "name": "Days Active",
            "type": 1,
            "value": "365",
        }))
        .unwrap();

        assert_eq!(entry.kind, 1);
        assert_eq!(entry.value, "365");
    }

    #[test]
    fn test_games_list_requires_cookie_token_v2() {
        let cookie = Cookie::parse("ltoken=token; ltuid=42").unwrap();
        let mut client = Hoyolab::with_cookie(cookie, None).unwrap();

        let error = tokio_block_on(client.games_list(None)).unwrap_err();
        assert!(error.to_string().contains("cookie_token_v2"));
    }

    #[test]
    fn test_lang_prefers_cookie_language() {
        let cookie = Cookie::parse("ltoken=token; ltuid=42; mi18nLang=ko-kr").unwrap();
        let client = Hoyolab::with_cookie(cookie, None).unwrap();
        assert_eq!(client.lang(), Language::Korean);

        let cookie = Cookie::parse("ltoken=token; ltuid=42; mi18nLang=ko-kr").unwrap();
        let client = Hoyolab::with_cookie(cookie, Some(Language::German)).unwrap();
        assert_eq!(client.lang(), Language::German);
    }

    fn tokio_block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("test runtime")
            .block_on(future)
    }
}
