//! Senpy analysis service client.
//!
//! This crate provides a lightweight client for the service's HTTP API. It
//! focuses on:
//!
//! - Constructing an HTTP client with sensible defaults
//! - Validating the configured base URL
//! - Typed access to the metadata endpoints (plugins, datasets, parameter
//!   help)
//! - A raw [`SenpyClient::fetch`] for analysis/evaluation URLs, whose bodies
//!   may be JSON-LD, Turtle or N-Triples
//!
//! # Example
//!
//! ```ignore
//! use senpy_api::{PluginQuery, SenpyClient};
//!
//! async fn list() -> Result<(), senpy_api::ApiError> {
//!     let client = SenpyClient::new("http://localhost:5000")?;
//!     for plugin in client.plugins(&PluginQuery::verbose()).await? {
//!         println!("{}", plugin.name);
//!     }
//!     Ok(())
//! }
//! ```

use std::env;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode, Url, header};
use senpy_types::{
    CatalogSnapshot, Dataset, DatasetList, HelpResponse, ParameterSchema, Plugin, PluginList, ServiceResponse,
};
use senpy_util::http::{JsonParseError, parse_response_json_strict, status_error_message, truncate_response_preview};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

const ACCEPT_HEADER: &str = "application/ld+json, application/json;q=0.9, */*;q=0.5";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while talking to the service.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid service URL '{base}': {reason}")]
    InvalidBaseUrl { base: String, reason: String },
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    /// No response at all (DNS, refused connection, reset)
    #[error("could not reach {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered HTTP {status}: {message}")]
    Status { url: String, status: u16, message: String },
    #[error("{url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: JsonParseError,
    },
    #[error("{url} returned an unexpected document: {source}")]
    Shape {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Whether the failure happened before any response arrived.
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network { .. })
    }
}

/// Filters for `GET /api/plugins/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginQuery {
    /// Ask for full plugin descriptions, including `extra_params`
    pub verbose: bool,
    pub plugin_type: Option<String>,
}

impl PluginQuery {
    pub fn verbose() -> Self {
        Self {
            verbose: true,
            plugin_type: None,
        }
    }
}

#[derive(Debug, Clone)]
/// Thin wrapper around a configured `reqwest::Client` for the senpy API.
pub struct SenpyClient {
    base_url: Url,
    pub http: Client,
    pub user_agent: String,
}

impl SenpyClient {
    /// Build a client for the service rooted at `base_url`.
    ///
    /// The URL must be absolute `http` or `https` with a host. Any path is
    /// kept as a prefix, so `http://host/senpy` talks to
    /// `http://host/senpy/api/...`.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = validate_base_url(base_url)?;

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static(ACCEPT_HEADER));

        let http = Client::builder()
            .default_headers(default_headers)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            base_url,
            http,
            user_agent: format!("senpy-console/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
        })
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Build a GET/POST/... request for a path relative to the base URL.
    pub fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url(), path);
        debug!(%url, "building request");

        self.http.request(method, url).header(header::USER_AGENT, &self.user_agent)
    }

    /// `GET /api/plugins/`
    pub async fn plugins(&self, query: &PluginQuery) -> Result<Vec<Plugin>, ApiError> {
        let mut url = self.endpoint(&["api", "plugins", ""]);
        {
            let mut pairs = url.query_pairs_mut();
            if query.verbose {
                pairs.append_pair("verbose", "1");
            }
            if let Some(plugin_type) = query.plugin_type.as_deref() {
                pairs.append_pair("plugin_type", plugin_type);
            }
        }
        let list: PluginList = self.get_json(url).await?;
        Ok(list.plugins)
    }

    /// `GET /api/plugins/default`
    pub async fn default_plugin(&self) -> Result<Plugin, ApiError> {
        self.get_json(self.endpoint(&["api", "plugins", "default"])).await
    }

    /// `GET /api/datasets/`
    pub async fn datasets(&self) -> Result<Vec<Dataset>, ApiError> {
        let list: DatasetList = self.get_json(self.endpoint(&["api", "datasets", ""])).await?;
        Ok(list.datasets)
    }

    /// `GET /api/<plugin>?help=true[&verbose=B]`
    pub async fn plugin_parameters(&self, plugin: &str, verbose: Option<bool>) -> Result<ParameterSchema, ApiError> {
        let mut url = self.endpoint(&["api", plugin]);
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("help", "true");
            if let Some(verbose) = verbose {
                pairs.append_pair("verbose", if verbose { "true" } else { "false" });
            }
        }
        let help: HelpResponse = self.get_json(url).await?;
        Ok(help.valid_parameters)
    }

    /// `GET /api?help=true`: the parameters every analysis accepts.
    pub async fn basic_parameters(&self) -> Result<ParameterSchema, ApiError> {
        let mut url = self.endpoint(&["api"]);
        url.query_pairs_mut().append_pair("help", "true");
        let help: HelpResponse = self.get_json(url).await?;
        Ok(help.valid_parameters)
    }

    /// Load everything the UI needs at startup.
    ///
    /// Only the plugin list is mandatory. A missing default plugin, dataset
    /// listing (the service may run without evaluation support) or basic
    /// parameter help degrades to empty values with a warning.
    pub async fn catalog(&self) -> Result<CatalogSnapshot, ApiError> {
        let plugins = self.plugins(&PluginQuery::verbose()).await?;

        let default_plugin = self
            .default_plugin()
            .await
            .inspect_err(|error| warn!(%error, "no default plugin"))
            .ok();
        let datasets = self
            .datasets()
            .await
            .inspect_err(|error| warn!(%error, "dataset listing unavailable"))
            .unwrap_or_default();
        let basic_parameters = self
            .basic_parameters()
            .await
            .inspect_err(|error| warn!(%error, "basic parameter help unavailable"))
            .unwrap_or_default();

        Ok(CatalogSnapshot {
            plugins,
            default_plugin,
            datasets,
            basic_parameters,
        })
    }

    /// Perform a single GET against an absolute URL and return the body as-is.
    ///
    /// Any HTTP status counts as a response; only transport failures are
    /// errors.
    pub async fn fetch(&self, url: &str) -> Result<ServiceResponse, ApiError> {
        debug!(%url, "fetching");
        let response = self
            .http
            .get(url)
            .header(header::USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|source| ApiError::Network {
                url: url.to_string(),
                source,
            })?;

        let status_code = response.status().as_u16();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(|source| ApiError::Network {
            url: url.to_string(),
            source,
        })?;
        debug!(%url, status_code, body_len = body.len(), "fetch completed");

        Ok(ServiceResponse {
            status_code,
            content_type,
            body,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let url_text = url.to_string();
        let response = self.fetch(&url_text).await?;
        let status = StatusCode::from_u16(response.status_code).ok();

        if !response.is_success() {
            let message = status_error_message(response.status_code)
                .unwrap_or_else(|| truncate_response_preview(&response.body, 200));
            return Err(ApiError::Status {
                url: url_text,
                status: response.status_code,
                message,
            });
        }

        // Decoded straight from the text so schema maps keep server order.
        serde_json::from_str::<T>(&response.body).map_err(|source| {
            if source.is_data() {
                return ApiError::Shape { url: url_text.clone(), source };
            }
            match parse_response_json_strict(&response.body, status) {
                Err(decode) => ApiError::Decode {
                    url: url_text.clone(),
                    source: decode,
                },
                Ok(_) => ApiError::Shape { url: url_text.clone(), source },
            }
        })
    }
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - must parse as an absolute URL
/// - scheme must be `http` or `https`
/// - a host is required
fn validate_base_url(base: &str) -> Result<Url, ApiError> {
    let invalid = |reason: String| ApiError::InvalidBaseUrl {
        base: base.to_string(),
        reason,
    };
    let parsed = Url::parse(base.trim()).map_err(|error| invalid(error.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("scheme must be http or https, got '{}'", parsed.scheme())));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid("a host is required".to_string()));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_accepts_http_and_https_hosts() {
        assert!(validate_base_url("http://localhost:5000").is_ok());
        assert!(validate_base_url("https://senpy.gsi.upm.es/").is_ok());
    }

    #[test]
    fn base_url_rejects_other_schemes_and_garbage() {
        assert!(matches!(validate_base_url("ftp://senpy.example"), Err(ApiError::InvalidBaseUrl { .. })));
        assert!(matches!(validate_base_url("senpy.example"), Err(ApiError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn endpoints_keep_base_path_prefix() {
        let client = SenpyClient::new("http://host:5000/senpy/").expect("client");
        assert_eq!(client.base_url(), "http://host:5000/senpy");
        assert_eq!(
            client.endpoint(&["api", "plugins", ""]).as_str(),
            "http://host:5000/senpy/api/plugins/"
        );

        let client = SenpyClient::new("http://host:5000").expect("client");
        assert_eq!(client.endpoint(&["api", "sentiment140"]).as_str(), "http://host:5000/api/sentiment140");
    }
}
