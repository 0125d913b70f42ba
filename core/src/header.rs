//! Common headers stamped onto every outgoing request.

use http::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::warn;

use crate::config::ClientConfig;

/// Hook run on each request after it is built and before it is sent.
///
/// Implementations must be idempotent.
pub trait HeaderPolicy: Send + Sync {
    fn apply(&self, config: &ClientConfig, headers: &mut HeaderMap);
}

impl<F> HeaderPolicy for F
where
    F: Fn(&ClientConfig, &mut HeaderMap) + Send + Sync,
{
    fn apply(&self, config: &ClientConfig, headers: &mut HeaderMap) {
        self(config, headers)
    }
}

/// JSON content type unless one is already set, plus bearer authorization
/// from the configured API token.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHeaders;

impl HeaderPolicy for DefaultHeaders {
    fn apply(&self, config: &ClientConfig, headers: &mut HeaderMap) {
        if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        let Some(token) = config.api_token.as_deref().filter(|t| !t.is_empty()) else {
            return;
        };
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => warn!("api token is not a valid header value; authorization header not set"),
        }
    }
}
