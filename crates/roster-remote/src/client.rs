//! REST client for the hosted students table.
//!
//! Speaks the PostgREST dialect served under `<project>/rest/v1/<table>`.

use reqwest::Url;
use reqwest::blocking::{Client, ClientBuilder, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_RANGE, HeaderMap, HeaderValue};
use roster_core::{RemoteError, RosterBackend};
use roster_model::{RecordId, StampedPatch, StudentRecord};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::{ConfigError, ConnectionConfig};

/// User agent string for API requests.
const USER_AGENT_VALUE: &str = concat!("roster-dashboard/", env!("CARGO_PKG_VERSION"));

/// Column the roster is ordered by.
const ORDER_COLUMN: &str = "student_id";

/// Handle to one configured table. Create once, reuse for every request.
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    table_url: Url,
}

impl RestClient {
    /// Validates `config` and builds the HTTP client.
    ///
    /// No request is made; run the connection test separately.
    pub fn new(config: &ConnectionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Self::build(config, Client::builder())
    }

    /// Builds the client without validating the project URL.
    fn build(config: &ConnectionConfig, builder: ClientBuilder) -> Result<Self, ConfigError> {
        let table_url = table_url(&config.url, &config.table)?;

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.anon_key).map_err(|_| ConfigError::InvalidKey)?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.anon_key))
            .map_err(|_| ConfigError::InvalidKey)?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = builder
            .default_headers(headers)
            .user_agent(USER_AGENT_VALUE)
            .timeout(config.timeout())
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        Ok(Self { client, table_url })
    }

    pub fn table_url(&self) -> &Url {
        &self.table_url
    }

    fn url_with(&self, params: &[(&str, &str)]) -> Url {
        let mut url = self.table_url.clone();
        url.query_pairs_mut().extend_pairs(params);
        url
    }
}

impl RosterBackend for RestClient {
    fn count(&self) -> Result<usize, RemoteError> {
        let url = self.url_with(&[("select", "*"), ("limit", "1")]);
        debug!(url = %url, "counting rows");
        let response = self
            .client
            .get(url)
            .header("Prefer", "count=exact")
            .send()
            .map_err(transport_error)?;
        let response = check_status(response)?;
        response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_content_range)
            .ok_or_else(|| {
                RemoteError::http(
                    response.status().as_u16(),
                    "response did not include a row count",
                )
            })
    }

    fn select_all(&self) -> Result<Vec<StudentRecord>, RemoteError> {
        let order = format!("{ORDER_COLUMN}.asc");
        let url = self.url_with(&[("select", "*"), ("order", order.as_str())]);
        debug!(url = %url, "selecting roster");
        let response = self.client.get(url).send().map_err(transport_error)?;
        decode(check_status(response)?)
    }

    fn update(
        &self,
        id: &RecordId,
        patch: &StampedPatch,
    ) -> Result<Vec<StudentRecord>, RemoteError> {
        let filter = format!("eq.{id}");
        let url = self.url_with(&[("id", filter.as_str())]);
        debug!(url = %url, "updating record");
        let body = serde_json::to_vec(patch)
            .map_err(|e| RemoteError::transport(format!("failed to encode update: {e}")))?;
        let response = self
            .client
            .patch(url)
            .header("Prefer", "return=representation")
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(transport_error)?;
        decode(check_status(response)?)
    }
}

/// Builds `<base>/rest/v1/<table>`.
pub fn table_url(base: &str, table: &str) -> Result<Url, ConfigError> {
    let base = base.trim_end_matches('/');
    let mut url = Url::parse(base).map_err(|_| ConfigError::InvalidUrl(base.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| ConfigError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(["rest", "v1", table]);
    Ok(url)
}

/// Reads the total from a `Content-Range` header such as `0-24/310` or `*/0`.
pub fn parse_content_range(value: &str) -> Option<usize> {
    let (_, total) = value.trim().rsplit_once('/')?;
    total.parse().ok()
}

/// JSON error body returned by the service and its gateway.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default, alias = "msg", alias = "error_description")]
    message: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    details: Option<serde_json::Value>,
    #[serde(default)]
    hint: Option<String>,
}

/// Turns a non-success response body into a [`RemoteError`].
///
/// Falls back to the raw body, then to the status text, when the body is not
/// the usual JSON error shape.
pub fn remote_error(status: u16, body: &str) -> RemoteError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = match parsed.message {
        Some(message) if !message.is_empty() => match &parsed.details {
            Some(serde_json::Value::String(details)) if !details.is_empty() => {
                format!("{message} ({details})")
            }
            _ => message,
        },
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => format!("request failed with status {status}"),
    };
    let mut error = RemoteError::http(status, message);
    match parsed.code {
        Some(serde_json::Value::String(code)) => error = error.with_code(code),
        Some(serde_json::Value::Number(code)) => error = error.with_code(code.to_string()),
        _ => {}
    }
    if let Some(hint) = parsed.hint {
        error = error.with_hint(hint);
    }
    error
}

fn check_status(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(remote_error(status.as_u16(), &body))
}

fn decode<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
    let status = response.status().as_u16();
    let body = response.text().map_err(transport_error)?;
    serde_json::from_str(&body)
        .map_err(|e| RemoteError::http(status, format!("unexpected response body: {e}")))
}

fn transport_error(error: reqwest::Error) -> RemoteError {
    if error.is_timeout() {
        RemoteError::transport(format!("request timed out: {error}"))
    } else if error.is_connect() {
        RemoteError::transport(format!("failed to connect: {error}"))
    } else {
        RemoteError::transport(error.to_string())
    }
}
