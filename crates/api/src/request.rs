//! Turns an [`EndpointConfig`] into a concrete GET request.

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use resttable_types::{EndpointConfig, FetchError};
use url::Url;

/// A fully resolved request, ready to hand to an [`crate::HttpTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
}

/// Build the GET request described by `config`.
///
/// - Header and param entries with an empty key or value are skipped.
/// - Params are appended to any query already present on the URL, form-encoded.
/// - With no params the configured URL string is used verbatim.
///
/// # Errors
/// Returns [`FetchError::InvalidConfig`] when the URL is not an absolute URL
/// or a header name/value is not a legal HTTP token. Nothing touches the
/// network before this succeeds.
pub fn build_request(config: &EndpointConfig) -> Result<HttpRequest, FetchError> {
    let mut parsed = Url::parse(&config.url).map_err(|_| FetchError::invalid_url())?;

    let mut headers = HeaderMap::new();
    for pair in config.active_headers() {
        let name = HeaderName::from_bytes(pair.key.as_bytes())
            .map_err(|_| FetchError::InvalidConfig(format!("Invalid header name '{}'", pair.key)))?;
        let value = HeaderValue::from_str(&pair.value)
            .map_err(|_| FetchError::InvalidConfig(format!("Invalid value for header '{}'", pair.key)))?;
        headers.append(name, value);
    }

    let mut params = config.active_params().peekable();
    let url = if params.peek().is_none() {
        config.url.clone()
    } else {
        {
            let mut query = parsed.query_pairs_mut();
            for pair in params {
                query.append_pair(&pair.key, &pair.value);
            }
        }
        parsed.to_string()
    };

    Ok(HttpRequest {
        method: Method::GET,
        url,
        headers,
    })
}
