//! HoYoLab portal API client
//!
//! Cookie-authenticated access to the portal's account endpoints, the daily
//! check-in event, gift-code redemption and game records, built on the
//! [`hoyo_http`] request engine (signing, retries, response caching) and its
//! single shared error type.
//!
//! # Example
//!
//! ```no_run
//! use hoyolab::{Genshin, Language};
//!
//! # async fn example() -> hoyolab::Result<()> {
//! let mut genshin = Genshin::create(
//!     "ltoken=...; ltuid=...",
//!     Some(Language::English),
//!     Some(800000001),
//! )
//! .await?;
//!
//! let note = genshin.daily_note().await?;
//! println!("resin: {}/{}", note.current_resin, note.max_resin);
//!
//! let claim = genshin.daily().claim().await?;
//! println!("check-in: {} ({})", claim.status, claim.code);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod account;
mod cookie;
mod daily;
mod game;
mod genshin;
mod redeem;
pub mod routes;

pub use account::{GameAccount, GameRecordCard, Hoyolab, RecordCardEntry};
pub use cookie::Cookie;
pub use daily::{DailyAward, DailyClaim, DailyInfo, DailyModule, DailyReward, DailyRewards};
pub use game::Game;
pub use genshin::{DailyNote, Expedition, Genshin, GenshinRegion};
pub use redeem::RedeemModule;

pub use hoyo_http::{
    ApiResponse, Diagnostics, Error, HttpClient, Language, Method, ResponseStatus, Result,
    ServerResponse,
};

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Fallback message for business failures where the API sent none
const EMPTY_MESSAGE_FALLBACK: &str =
    "failed to retrieve data, double-check the provided UID and region";

/// Map a successful exchange onto a typed payload.
///
/// Anything other than retcode 0 with a payload becomes the domain error,
/// carrying the upstream message (or a generic fallback) and the full
/// request/response diagnostics.
pub(crate) fn map_data<T: DeserializeOwned>(result: &ServerResponse) -> Result<T> {
    let envelope = &result.response;

    if !envelope.is_success() || envelope.data.is_none() {
        let message = if envelope.message.is_empty() {
            EMPTY_MESSAGE_FALLBACK.to_string()
        } else {
            envelope.message.clone()
        };
        return Err(Error::api_with_diagnostics(
            message,
            envelope.retcode,
            result.to_diagnostics(),
        ));
    }

    let data = envelope.data.clone().unwrap_or(Value::Null);
    Ok(serde_json::from_value(data)?)
}
