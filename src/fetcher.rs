//! HTTP fetching with a browser-like header set.
//!
//! [`HttpFetcher`] is built once by the caller and passed to the extractor;
//! there is no process-wide client. Bodies are decoded with the charset the
//! server declares, or with a detected encoding when the declaration is
//! missing or names an unknown label.

use crate::config::HttpSettings;
use crate::error::ExtractError;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, instrument, warn};
use url::Url;

/// Shared client for strategies that work on downloaded HTML.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

/// A downloaded body that has not been decoded yet.
#[derive(Debug, Clone)]
pub struct RawPage {
    pub final_url: Url,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl HttpFetcher {
    pub fn new(settings: &HttpSettings) -> Result<Self, ExtractError> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .default_headers(header_map(&settings.headers)?)
            .timeout(settings.timeout())
            .build()
            .map_err(|e| ExtractError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// GET `url` with the default headers and decode the body.
    pub async fn fetch(&self, url: &Url) -> Result<String, ExtractError> {
        Ok(self.fetch_raw(url, HeaderMap::new()).await?.decode())
    }

    /// GET `url`; `headers` replace the defaults of the same name.
    #[instrument(level = "debug", skip_all, fields(%url))]
    pub async fn fetch_raw(&self, url: &Url, headers: HeaderMap) -> Result<RawPage, ExtractError> {
        ensure_http(url)?;
        let t0 = Instant::now();

        let response = self
            .client
            .get(url.clone())
            .headers(headers)
            .send()
            .await
            .map_err(|e| ExtractError::fetch(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Non-success response");
            return Err(ExtractError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ExtractError::fetch(url.as_str(), e))?
            .to_vec();

        debug!(
            bytes = bytes.len(),
            elapsed_ms = t0.elapsed().as_millis(),
            content_type = content_type.as_deref().unwrap_or(""),
            "Fetched page"
        );

        Ok(RawPage {
            final_url,
            content_type,
            bytes,
        })
    }
}

impl RawPage {
    /// Decode using the declared charset, falling back to detection.
    pub fn decode(&self) -> String {
        decode_body(&self.bytes, self.content_type.as_deref())
    }

    /// Decode as UTF-8 regardless of what the server declared.
    pub fn decode_utf8(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Reject anything that is not plain HTTP(S).
pub fn ensure_http(url: &Url) -> Result<(), ExtractError> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ExtractError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme {other:?}"),
        }),
    }
}

/// Parse and scheme-check a caller-supplied URL.
pub fn parse_http_url(raw: &str) -> Result<Url, ExtractError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ExtractError::InvalidUrl {
            url: raw.to_string(),
            reason: "empty URL".to_string(),
        });
    }
    let url = Url::parse(trimmed).map_err(|e| ExtractError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    ensure_http(&url)?;
    Ok(url)
}

/// Convert a name/value table into request headers.
pub fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, ExtractError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ExtractError::Config(format!("bad header name {name:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ExtractError::Config(format!("bad header value {value:?}: {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}

fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(encoding) = content_type
        .and_then(extract_charset)
        .and_then(|label| encoding_rs::Encoding::for_label(label.as_bytes()))
    {
        let (decoded, _, _) = encoding.decode(body);
        return decoded.into_owned();
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let part = part.trim();
        let (key, value) = part.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (!value.is_empty()).then(|| value.to_string())
        } else {
            None
        }
    })
}
