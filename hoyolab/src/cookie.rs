//! Session cookie parsing and serialization
//!
//! Authentication against the portal is cookie-based: users copy the cookie
//! string out of a logged-in browser session. Only the keys the API cares
//! about are kept; everything else in the string is ignored.

use std::str::FromStr;

use hoyo_http::{Error, Language, Result};
use percent_encoding::percent_decode_str;

/// The cookie keys the portal API recognizes
const KNOWN_KEYS: [&str; 7] = [
    "ltoken",
    "ltuid",
    "account_id",
    "cookie_token",
    "account_id_v2",
    "cookie_token_v2",
    "mi18nLang",
];

/// Parsed session cookie.
///
/// `ltoken` and `ltuid` are mandatory; the v1/v2 account ids back-fill each
/// other when only one is present, matching what the portal web client does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cookie {
    /// Login token
    pub ltoken: String,
    /// Account id the login token belongs to
    pub ltuid: u64,
    /// Legacy account id, defaulted from `ltuid` when absent
    pub account_id: Option<u64>,
    /// Legacy cookie token
    pub cookie_token: Option<String>,
    /// v2 account id, defaulted from `account_id`/`ltuid` when absent
    pub account_id_v2: Option<u64>,
    /// v2 cookie token, required by a few account-level endpoints
    pub cookie_token_v2: Option<String>,
    /// Language stored in the portal session
    pub mi18n_lang: Option<Language>,
}

impl Cookie {
    /// Parse a browser cookie string.
    ///
    /// Unknown keys are skipped, values are percent-decoded, and the numeric
    /// account ids are required to parse as integers to count as present.
    pub fn parse(cookie_string: &str) -> Result<Self> {
        let mut cookie = Self::default();
        let mut ltuid = None;

        for pair in cookie_string.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let key = parts.next().unwrap_or_default();
            if !KNOWN_KEYS.contains(&key) {
                continue;
            }

            let value = decode_value(parts.next().unwrap_or_default());
            match key {
                "ltoken" => cookie.ltoken = value,
                "ltuid" => ltuid = value.parse().ok(),
                "account_id" => cookie.account_id = value.parse().ok(),
                "cookie_token" => cookie.cookie_token = Some(value),
                "account_id_v2" => cookie.account_id_v2 = value.parse().ok(),
                "cookie_token_v2" => cookie.cookie_token_v2 = Some(value),
                "mi18nLang" => cookie.mi18n_lang = Some(Language::parse(&value)),
                _ => {}
            }
        }

        // The v1 ids back-fill each other; v2 falls back to whichever exists
        match (ltuid, cookie.account_id) {
            (Some(id), None) => {
                cookie.account_id = Some(id);
            }
            (None, Some(id)) => {
                ltuid = Some(id);
            }
            _ => {}
        }
        if cookie.account_id_v2.is_none() {
            cookie.account_id_v2 = cookie.account_id.or(ltuid);
        }

        match (ltuid, cookie.ltoken.is_empty()) {
            (Some(ltuid), false) => {
                cookie.ltuid = ltuid;
                Ok(cookie)
            }
            _ => Err(Error::api(
                "cookie string must contain the ltuid and ltoken keys",
            )),
        }
    }

    /// Serialize back to a wire cookie string, emitting only present fields.
    pub fn to_cookie_string(&self) -> String {
        let mut pairs = vec![
            format!("ltoken={}", self.ltoken),
            format!("ltuid={}", self.ltuid),
        ];

        if let Some(account_id) = self.account_id {
            pairs.push(format!("account_id={account_id}"));
        }
        if let Some(cookie_token) = &self.cookie_token {
            pairs.push(format!("cookie_token={cookie_token}"));
        }
        if let Some(account_id_v2) = self.account_id_v2 {
            pairs.push(format!("account_id_v2={account_id_v2}"));
        }
        if let Some(cookie_token_v2) = &self.cookie_token_v2 {
            pairs.push(format!("cookie_token_v2={cookie_token_v2}"));
        }
        if let Some(lang) = self.mi18n_lang {
            pairs.push(format!("mi18nLang={lang}"));
        }

        pairs.join("; ")
    }
}

impl FromStr for Cookie {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Cookie::parse(s)
    }
}

fn decode_value(raw: &str) -> String {
    percent_decode_str(raw.trim())
        .decode_utf8_lossy()
        .trim_end_matches(';')
        .trim()
        .to_string()
}
