//! Gift-code redemption module

use hoyo_http::{ApiResponse, Error, HttpClient, Language, Method, Result};
use serde_json::json;
use tracing::debug;

use crate::game::Game;
use crate::routes;

/// Code redemption for one game, borrowing the engine per call
pub struct RedeemModule<'a> {
    request: &'a mut HttpClient,
    lang: Language,
    game: Game,
    region: Option<String>,
    uid: Option<u64>,
}

impl<'a> RedeemModule<'a> {
    /// Attach the module to an engine for one game and account
    pub fn new(
        request: &'a mut HttpClient,
        lang: Language,
        game: Game,
        region: Option<String>,
        uid: Option<u64>,
    ) -> Self {
        Self {
            request,
            lang,
            game,
            region,
            uid,
        }
    }

    /// Redeem a gift code for the configured account.
    ///
    /// The raw envelope is returned — the redemption endpoint communicates
    /// everything (invalid code, already used, cooldown) through
    /// `retcode`/`message`, and callers usually want to surface those
    /// verbatim. Responses are never cached: redeeming is a mutation.
    pub async fn claim(&mut self, code: &str) -> Result<ApiResponse> {
        let (Some(region), Some(uid)) = (self.region.as_deref(), self.uid) else {
            return Err(Error::api("uid or region is missing or failed to be filled"));
        };

        // Replacement characters sneak in when codes are copied from chat
        let sanitized: String = code.chars().filter(|&c| c != '\u{FFFD}').collect();
        let lang_short = self.lang.as_str().split('-').next().unwrap_or_default();

        self.request.set_query_params([
            ("uid", json!(uid.to_string())),
            ("region", json!(region)),
            ("game_biz", json!(self.game.biz())),
            ("cdkey", json!(sanitized)),
            ("lang", json!(lang_short)),
            ("sLangKey", json!(self.lang.as_str())),
        ]);

        let result = self
            .request
            .send(&routes::redeem_claim(self.game), Method::GET, 0)
            .await?;

        debug!(
            "Redeem for {} returned retcode {}",
            self.game, result.response.retcode
        );

        Ok(result.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_claim_requires_uid_and_region() {
        let mut request = HttpClient::new().unwrap();
        let mut module = RedeemModule::new(
            &mut request,
            Language::English,
            Game::GenshinImpact,
            None,
            None,
        );

        let error = module.claim("GENSHINGIFT").await.unwrap_err();
        assert!(error.to_string().contains("uid or region"));
    }
}
