//! Page fetching from URLs, files, and stdin.
//!
//! [`fetch_url`] retrieves one page without following redirects and runs the
//! extractor over it. The outcome always carries the request URL and the
//! caller's opaque `meta` value, plus either the extracted data, the
//! redirect target, or an error message.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;

use crate::extract::{DocumentResult, ExtractConfig};
use crate::{OgmetaError, Result};

/// Product token sent in the User-Agent header.
pub const USER_AGENT_PRODUCT: &str = concat!("ogmeta/", env!("CARGO_PKG_VERSION"));

/// Accept header sent with every page request.
pub const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// HTTP client configuration for fetching web pages.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Prefix placed in front of the ogmeta product token in the User-Agent.
    pub user_agent: Option<String>,
    /// Settings for extracting fetched pages.
    pub extract: ExtractConfig,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout: 8, user_agent: None, extract: ExtractConfig::default() }
    }
}

impl FetchConfig {
    /// The full User-Agent header value.
    pub fn user_agent_header(&self) -> String {
        format!("{} {}", self.user_agent.as_deref().unwrap_or_default(), USER_AGENT_PRODUCT)
            .trim()
            .to_string()
    }
}

/// What became of one fetched URL.
#[derive(Debug, Clone, Serialize)]
pub struct FetchResult {
    pub url: String,
    /// Caller-supplied value echoed back untouched.
    pub meta: serde_json::Value,
    /// Absolute redirect target when the server answered 3xx with a Location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<DocumentResult>,
}

/// A fetch result paired with its error message, if any.
#[derive(Debug, Clone, Serialize)]
pub struct FetchOutcome {
    pub err: Option<String>,
    pub result: FetchResult,
}

impl FetchOutcome {
    pub fn is_ok(&self) -> bool {
        self.err.is_none()
    }
}

#[cfg(feature = "fetch")]
mod http {
    use std::collections::HashMap;
    use std::time::Duration;

    use reqwest::header::{ACCEPT, HeaderMap, LOCATION, USER_AGENT};
    use reqwest::{Client, redirect};
    use url::Url;

    use super::*;
    use crate::extract::extract_with_config;
    use crate::value::resolve_url;

    /// Builds a client that never follows redirects.
    pub fn build_client(config: &FetchConfig) -> Result<Client> {
        Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .redirect(redirect::Policy::none())
            .build()
            .map_err(OgmetaError::HttpError)
    }

    /// Fetches `url` and extracts its metadata.
    ///
    /// Failures never escape as `Err`: they are reported in
    /// [`FetchOutcome::err`] so batch callers can keep going.
    pub async fn fetch_url(url: &str, meta: serde_json::Value, config: &FetchConfig) -> FetchOutcome {
        match build_client(config) {
            Ok(client) => fetch_with_client(&client, url, meta, config).await,
            Err(e) => FetchOutcome {
                err: Some(e.to_string()),
                result: FetchResult { url: url.to_string(), meta, redirect: None, data: None },
            },
        }
    }

    /// Fetches `url` with an existing client.
    pub async fn fetch_with_client(
        client: &Client, url: &str, meta: serde_json::Value, config: &FetchConfig,
    ) -> FetchOutcome {
        let mut result = FetchResult { url: url.to_string(), meta, redirect: None, data: None };

        let err = match fetch_into(client, url, config, &mut result).await {
            Ok(()) => None,
            Err(e) => {
                tracing::debug!(url, error = %e, "fetch failed");
                Some(e.to_string())
            }
        };

        FetchOutcome { err, result }
    }

    async fn fetch_into(client: &Client, url: &str, config: &FetchConfig, result: &mut FetchResult) -> Result<()> {
        let parsed_url = Url::parse(url).map_err(|e| OgmetaError::InvalidUrl(e.to_string()))?;

        let response = client
            .get(parsed_url)
            .header(USER_AGENT, config.user_agent_header())
            .header(ACCEPT, ACCEPT_HTML)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OgmetaError::Timeout { timeout: config.timeout }
                } else {
                    OgmetaError::HttpError(e)
                }
            })?;

        let status = response.status().as_u16();
        if status > 299 {
            let location = response.headers().get(LOCATION).and_then(|value| value.to_str().ok());
            if status < 400
                && let Some(location) = location
            {
                result.redirect = Some(resolve_url(url, location).unwrap_or_else(|| location.to_string()));
                return Ok(());
            }
            return Err(OgmetaError::InvalidResponse { status });
        }

        let headers = header_map(response.headers());
        let body = response.text().await?;

        // Parsing is CPU-bound; keep it off the async workers.
        let (page_url, extract_config) = (url.to_string(), config.extract.clone());
        let data = tokio::task::spawn_blocking(move || {
            extract_with_config(&page_url, &body, Some(&headers), &extract_config)
        })
        .await
        .map_err(|e| OgmetaError::HtmlParseError(format!("extraction task failed: {}", e)))??;

        result.data = Some(data);
        Ok(())
    }

    /// Lower-cased header names to their values; non-UTF-8 values are dropped.
    fn header_map(headers: &HeaderMap) -> HashMap<String, String> {
        headers
            .iter()
            .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
            .collect()
    }
}

#[cfg(feature = "fetch")]
pub use http::{build_client, fetch_url, fetch_with_client};

/// Reads HTML content from a local file.
///
/// Callers should validate and sanitize the path when accepting user input.
pub fn fetch_file(path: &str) -> Result<String> {
    let path_buf = PathBuf::from(path);
    fs::read_to_string(&path_buf).map_err(OgmetaError::from)
}

/// Reads HTML content from standard input.
///
/// This function reads all available input from stdin until EOF.
pub fn fetch_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(OgmetaError::from)?;

    Ok(buffer)
}

#[cfg(all(test, feature = "fetch"))]
mod tests {
    use super::*;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<html><head>
        <meta property="og:title" content="The Rock">
        <meta property="og:image" content="/rock.jpg">
    </head></html>"#;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout, 8);
        assert_eq!(config.user_agent_header(), USER_AGENT_PRODUCT);
    }

    #[test]
    fn test_product_token_format() {
        assert_eq!(USER_AGENT_PRODUCT, format!("ogmeta/{}", env!("CARGO_PKG_VERSION")));
        assert!(!USER_AGENT_PRODUCT.contains(' '));
    }

    #[test]
    fn test_custom_user_agent_prefix() {
        let config = FetchConfig { user_agent: Some("Test/1.0".to_string()), ..Default::default() };
        assert_eq!(config.user_agent_header(), format!("Test/1.0 {}", USER_AGENT_PRODUCT));
    }

    #[test]
    fn test_fetch_file_not_found() {
        let result = fetch_file("/nonexistent/path/file.html");
        assert!(matches!(result, Err(OgmetaError::WriteError(_))));
    }

    #[tokio::test]
    async fn test_fetch_url_invalid() {
        let outcome = fetch_url("not-a-url", serde_json::Value::Null, &FetchConfig::default()).await;
        assert!(outcome.err.unwrap().starts_with("Invalid URL"));
        assert!(outcome.result.data.is_none());
    }

    #[tokio::test]
    async fn test_fetch_extracts_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header_exists("accept"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-frame-options", "DENY")
                    .set_body_string(PAGE),
            )
            .mount(&server)
            .await;

        let url = format!("{}/page", server.uri());
        let meta = serde_json::json!({"id": 7});
        let outcome = fetch_url(&url, meta.clone(), &FetchConfig::default()).await;

        assert!(outcome.is_ok());
        assert_eq!(outcome.result.meta, meta);
        let data = outcome.result.data.unwrap();
        let image = data.og["image"][0].value.as_ref().unwrap();
        assert_eq!(image.as_str(), Some(format!("{}/rock.jpg", server.uri()).as_str()));
        assert_eq!(data.headers.unwrap()["x-frame-options"], "DENY");
    }

    #[tokio::test]
    async fn test_fetch_sends_user_agent() {
        let server = MockServer::start().await;
        let expected = format!("Test/1.0 {}", USER_AGENT_PRODUCT);
        Mock::given(method("GET"))
            .and(header("user-agent", expected.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .expect(1)
            .mount(&server)
            .await;

        let config = FetchConfig { user_agent: Some("Test/1.0".to_string()), ..Default::default() };
        let outcome = fetch_url(&server.uri(), serde_json::Value::Null, &config).await;
        assert!(outcome.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_reports_redirect() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(301).insert_header("location", "/moved"))
            .mount(&server)
            .await;

        let url = format!("{}/old", server.uri());
        let outcome = fetch_url(&url, serde_json::Value::Null, &FetchConfig::default()).await;

        assert!(outcome.is_ok());
        assert_eq!(outcome.result.redirect, Some(format!("{}/moved", server.uri())));
        assert!(outcome.result.data.is_none());
    }

    #[tokio::test]
    async fn test_fetch_rejects_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let outcome = fetch_url(&server.uri(), serde_json::Value::Null, &FetchConfig::default()).await;
        assert_eq!(outcome.err.as_deref(), Some("Invalid response. Code 404"));
    }

    #[tokio::test]
    async fn test_redirect_without_location_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(302))
            .mount(&server)
            .await;

        let outcome = fetch_url(&server.uri(), serde_json::Value::Null, &FetchConfig::default()).await;
        assert_eq!(outcome.err.as_deref(), Some("Invalid response. Code 302"));
        assert!(outcome.result.redirect.is_none());
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = FetchOutcome {
            err: None,
            result: FetchResult {
                url: "http://example.com/".to_string(),
                meta: serde_json::json!({}),
                redirect: Some("http://example.com/new".to_string()),
                data: None,
            },
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert!(json["err"].is_null());
        assert_eq!(json["result"]["redirect"], "http://example.com/new");
        assert!(json["result"].get("data").is_none());
    }
}
