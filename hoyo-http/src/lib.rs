//! HTTP request engine for the HoYoLab web API
//!
//! This crate implements the execution core every portal module dispatches
//! through:
//!
//! - A chainable request builder accumulating query parameters, body fields
//!   and headers, authenticated by a session cookie string
//! - Dynamic secret (`DS` header) signing for the endpoints that require it
//! - Manual `content-encoding` handling (gzip, deflate, brotli) and strict
//!   JSON envelope parsing
//! - Bounded fixed-delay retries for transient upstream codes, including
//!   HTTP 429 rate limiting
//! - A memory-sized response cache keyed by the request fingerprint
//!
//! # Example
//!
//! ```no_run
//! use hoyo_http::{HttpClient, Method};
//! use serde_json::json;
//!
//! # async fn example() -> hoyo_http::Result<()> {
//! let mut client = HttpClient::new()?
//!     .with_cookie("ltoken=...; ltuid=...")?;
//!
//! let result = client
//!     .set_query_params([("uid", json!(700000001))])
//!     .send(
//!         "https://bbs-api-os.hoyolab.com/game_record/card/wapi/getGameRecordCard",
//!         Method::GET,
//!         60,
//!     )
//!     .await?;
//!
//! if result.response.is_success() {
//!     println!("{:?}", result.response.data);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod client;
mod decode;
mod ds;
mod error;
mod lang;
mod response;

pub use client::{HttpClient, DEFAULT_TTL_SECONDS};
pub use ds::generate_ds;
pub use error::{Error, Result};
pub use lang::Language;
pub use response::{ApiResponse, Diagnostics, ResponseStatus, ServerResponse};

pub use reqwest::Method;
