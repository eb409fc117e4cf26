//! Response envelope and diagnostic shapes

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The normalized `{retcode, message, data}` envelope every API endpoint
/// returns.
///
/// A `retcode` of zero is the only success signal; every other value is a
/// business-level failure the caller decides how to surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// Upstream business code, `-1` when the field was missing
    pub retcode: i64,
    /// Upstream message, empty when the field was missing
    pub message: String,
    /// Endpoint payload, `None` for missing or JSON null
    pub data: Option<Value>,
}

impl ApiResponse {
    /// Build the envelope from a parsed body, defaulting missing fields.
    pub fn from_json(value: &Value) -> Self {
        Self {
            retcode: value.get("retcode").and_then(Value::as_i64).unwrap_or(-1),
            message: value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            data: value
                .get("data")
                .filter(|data| !data.is_null())
                .cloned(),
        }
    }

    /// Whether the envelope signals success
    pub fn is_success(&self) -> bool {
        self.retcode == 0
    }
}

/// HTTP status line of one exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseStatus {
    /// Status code
    pub code: u16,
    /// Canonical status text, empty for nonstandard codes
    pub message: String,
}

/// Full record of one network round trip.
///
/// Kept whole — including what was sent — so a later failure can be reported
/// with complete context, and cached verbatim for identical requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerResponse {
    /// The normalized response envelope
    pub response: ApiResponse,
    /// HTTP status of the exchange
    pub status: ResponseStatus,
    /// Response headers, lossily stringified
    pub headers: BTreeMap<String, String>,
    /// The JSON body that was sent (empty for GET)
    pub body: Map<String, Value>,
    /// The query parameters that were sent
    pub params: BTreeMap<String, Value>,
}

impl ServerResponse {
    /// Bundle this exchange into error diagnostics for a business failure
    pub fn to_diagnostics(&self) -> Diagnostics {
        Diagnostics {
            response: serde_json::to_value(&self.response).ok(),
            body: self.body.clone(),
            params: self.params.clone(),
            headers: self.headers.clone(),
        }
    }
}

/// Request/response context attached to errors.
///
/// Carries everything needed to reconstruct what was sent and what came
/// back, so callers can tell apart e.g. an invalid UID from a rate limit.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    /// The parsed envelope, or the raw response text when no envelope exists
    pub response: Option<Value>,
    /// The JSON body that was sent
    pub body: Map<String, Value>,
    /// The query parameters that were sent
    pub params: BTreeMap<String, Value>,
    /// The request headers that were sent
    pub headers: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_from_complete_body() {
        let parsed = ApiResponse::from_json(&json!({
            "retcode": 0,
            "message": "OK",
            "data": {"list": []},
        }));

        assert_eq!(parsed.retcode, 0);
        assert_eq!(parsed.message, "OK");
        assert_eq!(parsed.data, Some(json!({"list": []})));
        assert!(parsed.is_success());
    }

    #[test]
    fn test_envelope_defaults_for_missing_fields() {
        let parsed = ApiResponse::from_json(&json!({}));

        assert_eq!(parsed.retcode, -1);
        assert_eq!(parsed.message, "");
        assert_eq!(parsed.data, None);
        assert!(!parsed.is_success());
    }

    #[test]
    fn test_envelope_null_data_is_none() {
        let parsed = ApiResponse::from_json(&json!({
            "retcode": 0,
            "message": "",
            "data": null,
        }));

        assert_eq!(parsed.data, None);
    }
}
