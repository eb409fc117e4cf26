//! HTTP request engine for the HoYoLab web API

use std::collections::BTreeMap;
use std::time::Duration;

use hoyo_cache::MemoryCache;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use serde_json::{Map, Value};
use tokio::time::sleep;
use tracing::{debug, trace, warn};
use url::Url;

use crate::decode;
use crate::ds::generate_ds;
use crate::error::{Error, Result};
use crate::lang::Language;
use crate::response::{ApiResponse, Diagnostics, ResponseStatus, ServerResponse};

/// Default maximum number of retries after the initial attempt
const DEFAULT_MAX_RETRIES: u32 = 120;

/// Default delay between retry attempts
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Default number of seconds a successful response stays cached
pub const DEFAULT_TTL_SECONDS: i64 = 60;

/// Upstream business codes that indicate a transient condition worth retrying
const TRANSIENT_RETCODES: [i64; 4] = [-1004, -2016, -500004, 429];

/// Message of the synthetic envelope built for HTTP 429 responses
const RATE_LIMITED_MESSAGE: &str = "Too Many Request";

/// Browser user agent the portal web client identifies as
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/112.0.0.0 Safari/537.36 Edg/112.0.1722.46";

/// Request engine accumulating per-call state and dispatching signed,
/// cached, retried exchanges against the portal API.
///
/// Configuration methods (`set_*`) mutate the pending request and chain;
/// [`HttpClient::send`] consumes the pending query parameters and body,
/// which are cleared once the exchange completes. Because `send` borrows the
/// engine mutably, one configure-and-send cycle must finish before the next
/// begins on a given instance — the compiler enforces the single-writer
/// discipline the API's state model requires.
pub struct HttpClient {
    client: Client,
    params: BTreeMap<String, Value>,
    body: Map<String, Value>,
    headers: HeaderMap,
    sign_request: bool,
    retries: u32,
    max_retries: u32,
    retry_delay: Duration,
    cache: MemoryCache<ServerResponse>,
}

impl HttpClient {
    /// Create an engine with the portal's default header set and a
    /// memory-sized response cache.
    pub fn new() -> Result<Self> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            params: BTreeMap::new(),
            body: Map::new(),
            headers: default_headers(Language::default()),
            sign_request: false,
            retries: 1,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            cache: MemoryCache::new(),
        })
    }

    /// Attach a pre-serialized cookie string used to authenticate every
    /// request made through this engine.
    pub fn with_cookie(mut self, cookie: &str) -> Result<Self> {
        self.headers
            .insert(header::COOKIE, HeaderValue::from_str(cookie)?);
        Ok(self)
    }

    /// Set the response language for every request made through this engine
    pub fn with_lang(mut self, lang: Language) -> Self {
        self.set_lang(lang);
        self
    }

    /// Set the maximum number of retries for transient upstream codes.
    ///
    /// Default is 120, giving 121 attempts in total including the first.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the fixed delay between retry attempts (default 1 second)
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Replace the derived response-cache capacity with an explicit one
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = MemoryCache::with_capacity(capacity);
        self
    }

    /// Shallow-merge query parameters into the pending request
    pub fn set_query_params<I, K>(&mut self, params: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        for (key, value) in params {
            self.params.insert(key.into(), value);
        }
        self
    }

    /// Shallow-merge body fields into the pending request.
    ///
    /// The body is serialized as JSON and sent only for POST.
    pub fn set_body<I, K>(&mut self, body: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        for (key, value) in body {
            self.body.insert(key.into(), value);
        }
        self
    }

    /// Set the `Referer` and `Origin` headers to the same URL
    pub fn set_referer(&mut self, url: &str) -> &mut Self {
        if let Ok(value) = HeaderValue::from_str(url) {
            self.headers.insert(header::REFERER, value.clone());
            self.headers.insert(header::ORIGIN, value);
        }
        self
    }

    /// Set the response language header
    pub fn set_lang(&mut self, lang: Language) -> &mut Self {
        self.headers
            .insert("x-rpc-language", HeaderValue::from_static(lang.as_str()));
        self
    }

    /// Toggle whether a fresh dynamic secret is attached at dispatch.
    ///
    /// The flag is not reset after a request; endpoints that require
    /// signing set it per call.
    pub fn set_ds(&mut self, flag: bool) -> &mut Self {
        self.sign_request = flag;
        self
    }

    /// `send` with GET and the default TTL
    pub async fn get(&mut self, url: &str) -> Result<ServerResponse> {
        self.send(url, Method::GET, DEFAULT_TTL_SECONDS).await
    }

    /// `send` with POST and the default TTL
    pub async fn post(&mut self, url: &str) -> Result<ServerResponse> {
        self.send(url, Method::POST, DEFAULT_TTL_SECONDS).await
    }

    /// Execute the pending request against `url`.
    ///
    /// A live cached result for the same request shape is returned without
    /// touching the network or the pending state. Otherwise the exchange is
    /// dispatched, retried on transient upstream codes, recorded in the
    /// cache for `ttl_seconds` (a TTL below one second disables caching),
    /// and the pending query parameters and body are cleared.
    pub async fn send(
        &mut self,
        url: &str,
        method: Method,
        ttl_seconds: i64,
    ) -> Result<ServerResponse> {
        let fingerprint = self.fingerprint(url, &method);

        if let Some(cached) = self.cache.get(&fingerprint) {
            debug!("Cache hit for {method} {url}");
            return Ok(cached.clone());
        }

        let result = self.dispatch_with_retry(url, &method).await;

        // Per-call state must not leak into the next request sharing this
        // engine, whether the exchange succeeded or failed.
        self.retries = 1;
        self.params.clear();
        self.body = Map::new();

        let response = result?;
        self.cache.insert(fingerprint, response.clone(), ttl_seconds);

        Ok(response)
    }

    /// Dispatch the exchange, retrying transient upstream codes with a
    /// fixed delay while the retry budget lasts.
    async fn dispatch_with_retry(&mut self, url: &str, method: &Method) -> Result<ServerResponse> {
        loop {
            if self.sign_request {
                if let Ok(value) = HeaderValue::from_str(&generate_ds()) {
                    self.headers.insert("ds", value);
                }
            }

            let exchanged = self.exchange(url, method).await?;
            let retcode = exchanged.response.retcode;

            if TRANSIENT_RETCODES.contains(&retcode) {
                if self.retries <= self.max_retries {
                    self.retries += 1;
                    debug!(
                        "Transient retcode {retcode} from {url} (attempt {}), retrying in {:?}",
                        self.retries - 1,
                        self.retry_delay
                    );
                    sleep(self.retry_delay).await;
                    continue;
                }

                // Budget exhausted: the last transient envelope is handed
                // back as a normal result for the caller to act on.
                warn!("Retry budget exhausted for {url}, returning retcode {retcode}");
            }

            return Ok(exchanged);
        }
    }

    /// One network round trip: merge query parameters, send, decompress,
    /// classify the status, and parse the envelope.
    async fn exchange(&self, url: &str, method: &Method) -> Result<ServerResponse> {
        let mut target = Url::parse(url)?;
        if !self.params.is_empty() {
            let mut query = target.query_pairs_mut();
            for (key, value) in &self.params {
                query.append_pair(key, &render_query_value(value));
            }
        }

        trace!("{method} {target}");

        let mut request = self
            .client
            .request(method.clone(), target)
            .headers(self.headers.clone());
        if *method == Method::POST {
            request = request.body(serde_json::to_vec(&self.body)?);
        }

        let response = request.send().await?;

        let status = response.status();
        let status_message = status
            .canonical_reason()
            .unwrap_or_default()
            .to_string();
        let response_headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|text| (name.to_string(), text.to_string()))
            })
            .collect();

        let raw = response.bytes().await?;
        let decoded = decode::decompress(
            &raw,
            response_headers.get("content-encoding").map(String::as_str),
        )?;

        let envelope = if status == StatusCode::TOO_MANY_REQUESTS {
            // Rate limiting is a retryable business condition rather than a
            // hard error; the body is irrelevant and may not even be JSON.
            ApiResponse {
                retcode: 429,
                message: RATE_LIMITED_MESSAGE.to_string(),
                data: None,
            }
        } else if status.is_client_error() || status.is_server_error() {
            let text = String::from_utf8_lossy(&decoded).into_owned();
            let message = if status_message.is_empty() {
                text.clone()
            } else {
                status_message.clone()
            };
            return Err(Error::UpstreamStatus {
                code: status.as_u16(),
                message,
                diagnostics: Box::new(self.request_diagnostics(Some(Value::String(text)))),
            });
        } else {
            let content_type = response_headers
                .get("content-type")
                .map(String::as_str)
                .unwrap_or_default();
            if !content_type.starts_with("application/json") {
                return Err(Error::NonJsonContentType {
                    content_type: content_type.to_string(),
                });
            }

            let parsed: Value = serde_json::from_slice(&decoded)?;
            ApiResponse::from_json(&parsed)
        };

        Ok(ServerResponse {
            response: envelope,
            status: ResponseStatus {
                code: status.as_u16(),
                message: status_message,
            },
            headers: response_headers,
            body: self.body.clone(),
            params: self.params.clone(),
        })
    }

    /// Stable cache key for the pending request shape
    fn fingerprint(&self, url: &str, method: &Method) -> String {
        let canonical = serde_json::json!([url, method.as_str(), self.body, self.params]);
        format!("{:x}", md5::compute(canonical.to_string()))
    }

    /// Snapshot of everything queued to be sent, for error context
    fn request_diagnostics(&self, response: Option<Value>) -> Diagnostics {
        Diagnostics {
            response,
            body: self.body.clone(),
            params: self.params.clone(),
            headers: self
                .headers
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|text| (name.to_string(), text.to_string()))
                })
                .collect(),
        }
    }
}

/// The fixed header set the portal web client sends
fn default_headers(lang: Language) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::ACCEPT_ENCODING,
        HeaderValue::from_static("gzip, deflate, br"),
    );
    headers.insert(
        "sec-ch-ua",
        HeaderValue::from_static(
            "\"Chromium\";v=\"112\", \"Microsoft Edge\";v=\"112\", \"Not:A-Brand\";v=\"99\"",
        ),
    );
    headers.insert("sec-ch-ua-mobile", HeaderValue::from_static("?0"));
    headers.insert("sec-ch-ua-platform", HeaderValue::from_static("\"Windows\""));
    headers.insert("sec-fetch-dest", HeaderValue::from_static("empty"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("cors"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("same-site"));
    headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
    headers.insert("x-rpc-app_version", HeaderValue::from_static("1.5.0"));
    headers.insert("x-rpc-client_type", HeaderValue::from_static("5"));
    headers.insert(
        "x-rpc-language",
        HeaderValue::from_static(lang.as_str()),
    );
    headers
}

/// Render a query value the way the portal expects: strings verbatim,
/// scalars stringified, arrays comma-joined, null empty.
fn render_query_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(render_query_value)
            .collect::<Vec<_>>()
            .join(","),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_headers() {
        let headers = default_headers(Language::default());

        assert_eq!(
            headers.get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(
            headers.get(header::ACCEPT_ENCODING).unwrap(),
            "gzip, deflate, br"
        );
        assert_eq!(headers.get("x-rpc-client_type").unwrap(), "5");
        assert_eq!(headers.get("x-rpc-language").unwrap(), "en-us");
        assert!(headers.get(header::COOKIE).is_none());
    }

    #[test]
    fn test_config_methods_chain() {
        let mut client = HttpClient::new().unwrap();

        client
            .set_query_params([("uid", json!(700000001))])
            .set_body([("act_id", json!("e202102251931481"))])
            .set_referer("https://act.hoyolab.com")
            .set_lang(Language::Indonesian)
            .set_ds(true);

        assert_eq!(client.params.get("uid"), Some(&json!(700000001)));
        assert_eq!(client.body.get("act_id"), Some(&json!("e202102251931481")));
        assert_eq!(
            client.headers.get(header::REFERER).unwrap(),
            "https://act.hoyolab.com"
        );
        assert_eq!(
            client.headers.get(header::ORIGIN).unwrap(),
            "https://act.hoyolab.com"
        );
        assert_eq!(client.headers.get("x-rpc-language").unwrap(), "id-id");
        assert!(client.sign_request);
    }

    #[test]
    fn test_query_params_merge_not_replace() {
        let mut client = HttpClient::new().unwrap();
        client.set_query_params([("uid", json!(1))]);
        client.set_query_params([("region", json!("os_usa")), ("uid", json!(2))]);

        assert_eq!(client.params.get("uid"), Some(&json!(2)));
        assert_eq!(client.params.get("region"), Some(&json!("os_usa")));
    }

    #[test]
    fn test_cookie_header() {
        let client = HttpClient::new()
            .unwrap()
            .with_cookie("ltoken=token; ltuid=123")
            .unwrap();

        assert_eq!(
            client.headers.get(header::COOKIE).unwrap(),
            "ltoken=token; ltuid=123"
        );
    }

    #[test]
    fn test_fingerprint_is_stable_and_input_sensitive() {
        let mut client = HttpClient::new().unwrap();
        client.set_query_params([("uid", json!(1))]);

        let first = client.fingerprint("https://example.com/a", &Method::GET);
        let again = client.fingerprint("https://example.com/a", &Method::GET);
        assert_eq!(first, again);
        assert_eq!(first.len(), 32);

        let other_url = client.fingerprint("https://example.com/b", &Method::GET);
        assert_ne!(first, other_url);

        let other_method = client.fingerprint("https://example.com/a", &Method::POST);
        assert_ne!(first, other_method);

        client.set_query_params([("uid", json!(2))]);
        let other_params = client.fingerprint("https://example.com/a", &Method::GET);
        assert_ne!(first, other_params);
    }

    #[test]
    fn test_render_query_value() {
        assert_eq!(render_query_value(&json!("text")), "text");
        assert_eq!(render_query_value(&json!(42)), "42");
        assert_eq!(render_query_value(&json!(true)), "true");
        assert_eq!(render_query_value(&json!(["a", "b"])), "a,b");
        assert_eq!(render_query_value(&json!(null)), "");
    }
}
