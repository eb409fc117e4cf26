//! Daily check-in module
//!
//! Every game shares the same check-in event shape: an info endpoint with
//! the current month's progress, a reward list, and a sign endpoint that
//! claims today's reward. The API frequently omits fields depending on game
//! and event version, so decoding is permissive and the gaps are filled the
//! way the portal web client fills them.

use chrono::{Datelike, Local, NaiveDate, TimeZone};
use hoyo_http::{Error, HttpClient, Language, Method, Result, DEFAULT_TTL_SECONDS};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::game::Game;
use crate::map_data;
use crate::routes;

/// Retcode the sign endpoint returns when today was already claimed
const ALREADY_CLAIMED_RETCODE: i64 = -5003;

/// Current state of the month's check-in
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyInfo {
    /// Days signed this month
    pub total_sign_day: u32,
    /// Today's date as reported by the server
    pub today: String,
    /// Whether today's reward was already claimed
    pub is_sign: bool,
    /// Whether this is the first binding of the account
    pub first_bind: bool,
    /// Whether the account is subscribed to the event
    pub is_sub: bool,
    /// Server region, back-filled from the client's region when empty
    pub region: String,
    /// Whether today is the last day of the month; computed from the local
    /// calendar when the API omits it
    pub month_last_day: Option<bool>,
    /// Days missed this month
    pub sign_cnt_missed: u32,
    /// Short-event sign day counter
    pub short_sign_day: u32,
}

/// One reward on the monthly list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyAward {
    /// Reward icon URL
    pub icon: String,
    /// Reward item name
    pub name: String,
    /// Reward quantity
    pub cnt: u32,
}

/// The monthly reward list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyRewards {
    /// Month the list is for
    pub month: u32,
    /// Whether re-signing missed days is available
    pub resign: bool,
    /// Server time as epoch seconds, back-filled with local time when absent
    pub now: String,
    /// Business tag of the event, derived from the game
    pub biz: String,
    /// Rewards for each day of the month
    pub awards: Vec<DailyAward>,
}

/// A single day's reward picked off the monthly list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReward {
    /// Month the reward belongs to
    pub month: u32,
    /// Server time as epoch seconds
    pub now: String,
    /// Business tag of the event
    pub biz: String,
    /// Whether re-signing is available
    pub resign: bool,
    /// The reward itself
    pub award: DailyAward,
}

/// Outcome of a claim attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyClaim {
    /// Upstream status message
    pub status: String,
    /// Zero on success, the upstream retcode otherwise
    pub code: i64,
    /// Today's reward, when the claim succeeded or was already done
    pub reward: Option<DailyReward>,
    /// Check-in state after the attempt
    pub info: DailyInfo,
}

/// Daily check-in operations for one game, borrowing the engine per call
pub struct DailyModule<'a> {
    request: &'a mut HttpClient,
    lang: Language,
    game: Game,
    region: Option<String>,
}

impl<'a> DailyModule<'a> {
    /// Attach the module to an engine for one game.
    ///
    /// `region` back-fills the info response when the API leaves it empty.
    pub fn new(
        request: &'a mut HttpClient,
        lang: Language,
        game: Game,
        region: Option<String>,
    ) -> Self {
        Self {
            request,
            lang,
            game,
            region,
        }
    }

    /// Current check-in state for this month
    pub async fn info(&mut self) -> Result<DailyInfo> {
        self.request
            .set_query_params([("lang", json!(self.lang.as_str()))])
            .set_lang(self.lang);

        let result = self
            .request
            .send(&routes::daily_info(self.game), Method::GET, DEFAULT_TTL_SECONDS)
            .await?;

        let mut info: DailyInfo = map_data(&result)?;

        let today = Local::now().date_naive();
        if info.month_last_day.is_none() {
            info.month_last_day = Some(today.day() == days_in_month(today));
        }
        if info.region.is_empty() {
            if let Some(region) = &self.region {
                info.region.clone_from(region);
            }
        }

        Ok(info)
    }

    /// The monthly reward list
    pub async fn rewards(&mut self) -> Result<DailyRewards> {
        self.request
            .set_query_params([("lang", json!(self.lang.as_str()))])
            .set_lang(self.lang);

        let result = self
            .request
            .send(
                &routes::daily_rewards(self.game),
                Method::GET,
                DEFAULT_TTL_SECONDS,
            )
            .await?;

        let mut rewards: DailyRewards = map_data(&result)?;
        if rewards.now.is_empty() {
            rewards.now = Local::now().timestamp().to_string();
        }
        rewards.biz = self.game.daily_biz().to_string();

        Ok(rewards)
    }

    /// The reward for `day` of the current month, or for today when `None`.
    pub async fn reward(&mut self, day: Option<u32>) -> Result<DailyReward> {
        let rewards = self.rewards().await?;

        let today = Local::now().date_naive();
        let day = day.unwrap_or_else(|| {
            rewards
                .now
                .parse::<i64>()
                .ok()
                .and_then(|secs| Local.timestamp_opt(secs, 0).single())
                .map_or_else(|| today.day(), |server_now| server_now.day())
        });

        let award = (day >= 1 && day <= days_in_month(today))
            .then(|| rewards.awards.get(day as usize - 1).cloned())
            .flatten()
            .ok_or_else(|| Error::api(format!("{day} is not a valid date in this month")))?;

        Ok(DailyReward {
            month: rewards.month,
            now: rewards.now,
            biz: rewards.biz,
            resign: rewards.resign,
            award,
        })
    }

    /// Claim today's reward.
    ///
    /// Resolves to an already-claimed result for retcode `-5003` instead of
    /// failing, mirroring the portal web client.
    pub async fn claim(&mut self) -> Result<DailyClaim> {
        self.request
            .set_query_params([("lang", json!(self.lang.as_str()))])
            .set_lang(self.lang);

        let result = self
            .request
            .send(&routes::daily_claim(self.game), Method::POST, 0)
            .await?;

        let envelope = result.response;
        debug!(
            "Daily claim for {} returned retcode {}",
            self.game, envelope.retcode
        );

        let info = self.info().await?;
        let reward = self.reward(None).await?;

        if envelope.retcode == ALREADY_CLAIMED_RETCODE {
            return Ok(DailyClaim {
                status: envelope.message,
                code: ALREADY_CLAIMED_RETCODE,
                reward: Some(reward),
                info,
            });
        }

        let claimed = envelope.retcode == 0
            && envelope
                .data
                .as_ref()
                .and_then(|data| data.get("code"))
                .and_then(Value::as_str)
                .is_some_and(|code| code.eq_ignore_ascii_case("ok"));

        if claimed {
            Ok(DailyClaim {
                status: envelope.message,
                code: 0,
                reward: Some(reward),
                info,
            })
        } else {
            Ok(DailyClaim {
                status: envelope.message,
                code: envelope.retcode,
                reward: None,
                info,
            })
        }
    }
}

/// Number of days in the month `date` falls in
fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = (date.year(), date.month());
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };

    first_of_next
        .and_then(|first| first.pred_opt())
        .map_or(31, |last| last.day())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_days_in_month() {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();

        assert_eq!(days_in_month(date(2026, 1, 15)), 31);
        assert_eq!(days_in_month(date(2026, 2, 1)), 28);
        assert_eq!(days_in_month(date(2024, 2, 29)), 29);
        assert_eq!(days_in_month(date(2026, 12, 31)), 31);
    }

    #[test]
    fn test_daily_info_decodes_with_missing_fields() {
        let info: DailyInfo = serde_json::from_value(json!({
            "total_sign_day": 12,
            "today": "2026-08-06",
            "is_sign": true,
            "is_sub": false,
            "region": "",
        }))
        .unwrap();

        assert_eq!(info.total_sign_day, 12);
        assert!(!info.first_bind);
        assert_eq!(info.month_last_day, None);
        assert_eq!(info.sign_cnt_missed, 0);
    }

    #[test]
    fn test_daily_rewards_decode() {
        let rewards: DailyRewards = serde_json::from_value(json!({
            "month": 8,
            "awards": [
                {"icon": "https://example.com/primo.png", "name": "Primogem", "cnt": 60},
                {"icon": "https://example.com/mora.png", "name": "Mora", "cnt": 10000},
            ],
        }))
        .unwrap();

        assert_eq!(rewards.month, 8);
        assert_eq!(rewards.awards.len(), 2);
        assert_eq!(rewards.awards[1].cnt, 10000);
        // Back-filled by the module, absent on the wire
        assert_eq!(rewards.now, "");
        assert_eq!(rewards.biz, "");
    }
}
