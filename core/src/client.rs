//! Authenticated dispatch of requests built against a [`ClientConfig`].
//!
//! # Design
//! `Client` owns the configuration, a [`Transport`] and a [`HeaderPolicy`].
//! Every operation is a single linear pass:
//!
//! ```text
//! build (+ header policy) -> send -> classify status -> decode -> resolve
//! ```
//!
//! Resource methods (see the `api` module) only produce the request
//! descriptor through a `build_*` method; `execute` runs the remaining
//! stages and folds their outcomes with [`resolve`]. There are no retries.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::decode::decode_response;
use crate::error::{ApiError, ConstructionError, Error, TransportError};
use crate::header::{DefaultHeaders, HeaderPolicy};
use crate::http::{Request, RequestBuilder, Response};
use crate::resolve::resolve;
use crate::transport::{Transport, UreqTransport};

/// Client for the provisioning API.
///
/// `&Client` can be shared across threads. Changing the configuration
/// takes `&mut Client`, so it never changes under an in-flight request.
pub struct Client {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    headers: Arc<dyn HeaderPolicy>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Client over a `ureq` transport using the configured timeout.
    pub fn new(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(config, transport)
    }

    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        Self {
            config,
            transport: Arc::new(transport),
            headers: Arc::new(DefaultHeaders),
        }
    }

    /// Replace the [`DefaultHeaders`] policy.
    pub fn with_header_policy(mut self, policy: impl HeaderPolicy + 'static) -> Self {
        self.headers = Arc::new(policy);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ClientConfig {
        &mut self.config
    }

    pub fn set_api_token(&mut self, token: impl Into<String>) {
        self.config.set_api_token(token);
    }

    pub fn set_org_name(&mut self, name: impl Into<String>) {
        self.config.set_org_name(name);
    }

    pub fn set_group_name(&mut self, name: impl Into<String>) {
        self.config.set_group_name(name);
    }

    /// Finish `builder` and stamp the common headers onto the result.
    pub fn prepare(&self, builder: RequestBuilder) -> Result<Request, ConstructionError> {
        let mut request = builder.build()?;
        self.headers.apply(&self.config, &mut request.headers);
        Ok(request)
    }

    /// Hand `request` to the transport as-is.
    pub fn send(&self, request: Request) -> Result<Response, TransportError> {
        self.transport.execute(request)
    }

    /// Send `request`, check the status and decode the body into `T`.
    pub fn send_and_decode<T: DeserializeOwned>(&self, request: Request) -> Result<T, Error> {
        self.execute(Ok(request))
    }

    /// Run a whole operation from the outcome of its build step.
    pub fn execute<T: DeserializeOwned>(
        &self,
        built: Result<Request, ConstructionError>,
    ) -> Result<T, Error> {
        let request = match built {
            Ok(request) => request,
            Err(e) => return resolve(None, Some(e), None, None),
        };
        let response = match self.dispatch(request) {
            Ok(response) => response,
            Err(e) => return resolve(None, None, Some(e), None),
        };
        match decode_response(response) {
            Ok(value) => resolve(Some(value), None, None, None),
            Err(e) => resolve(None, None, None, Some(e)),
        }
    }

    /// Like [`Client::execute`] for operations whose success body is not needed.
    /// The body is still drained before returning.
    pub fn execute_empty(&self, built: Result<Request, ConstructionError>) -> Result<(), Error> {
        let request = match built {
            Ok(request) => request,
            Err(e) => return resolve(None, Some(e), None, None),
        };
        let response = match self.dispatch(request) {
            Ok(response) => response,
            Err(e) => return resolve(None, None, Some(e), None),
        };
        match response.bytes() {
            Ok(_) => resolve(Some(()), None, None, None),
            Err(e) => resolve(None, None, None, Some(e.into())),
        }
    }

    /// Send `request` and turn a failure status into an error.
    fn dispatch(&self, request: Request) -> Result<Response, Error> {
        let method = request.method.clone();
        let uri = request.uri.clone();
        let response = self.send(request)?;
        if response.is_success() {
            return Ok(response);
        }

        let status = response.status;
        // An unreadable error body is treated like a malformed one.
        let body = match response.bytes() {
            Ok(body) => body,
            Err(e) => {
                debug!(%method, %uri, %status, error = %e, "failed to read error body");
                Default::default()
            }
        };
        let err = match ApiError::from_body(status, &body) {
            Some(api) => Error::Api(api),
            None => Error::Transport(TransportError::Status { status }),
        };
        warn!(%method, %uri, %status, error = %err, "request failed");
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use http::header::{AUTHORIZATION, CONTENT_TYPE};
    use http::{HeaderMap, HeaderValue, Method, StatusCode};

    use super::*;
    use crate::error::DecodeError;
    use crate::types::Jwt;

    /// Answers every request with a fixed status and body and remembers
    /// what it was sent.
    struct Canned {
        status: StatusCode,
        body: &'static str,
        seen: Mutex<Vec<(Method, String, HeaderMap)>>,
    }

    impl Canned {
        fn new(status: StatusCode, body: &'static str) -> Arc<Self> {
            Arc::new(Self {
                status,
                body,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl Transport for Arc<Canned> {
        fn execute(&self, request: Request) -> Result<Response, TransportError> {
            self.seen
                .lock()
                .unwrap()
                .push((request.method, request.uri.to_string(), request.headers));
            Ok(Response::from_bytes(self.status, self.body))
        }
    }

    fn client(transport: &Arc<Canned>) -> Client {
        let config = ClientConfig::new()
            .with_base_url("http://localhost:3000/v1")
            .with_api_token("tok")
            .with_org_name("acme");
        Client::with_transport(config, Arc::clone(transport))
    }

    fn get(client: &Client, path: &str) -> Result<Request, ConstructionError> {
        client.prepare(Request::builder(Method::GET, client.config().url(path)))
    }

    #[test]
    fn success_decodes_body() {
        let transport = Canned::new(StatusCode::OK, r#"{"jwt":"abc123"}"#);
        let c = client(&transport);
        let jwt: Jwt = c.execute(get(&c, "/token")).unwrap();
        assert_eq!(jwt.jwt, "abc123");
    }

    #[test]
    fn prepare_applies_header_policy() {
        let transport = Canned::new(StatusCode::OK, r#"{"jwt":""}"#);
        let c = client(&transport);
        let _: Jwt = c.execute(get(&c, "/token")).unwrap();

        let seen = transport.seen.lock().unwrap();
        let (method, uri, headers) = &seen[0];
        assert_eq!(method, Method::GET);
        assert_eq!(uri, "http://localhost:3000/v1/token");
        assert_eq!(headers[AUTHORIZATION], "Bearer tok");
        assert_eq!(headers[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn custom_header_policy_replaces_default() {
        let transport = Canned::new(StatusCode::OK, r#"{"jwt":""}"#);
        let c = client(&transport).with_header_policy(|config: &ClientConfig, headers: &mut HeaderMap| {
            headers.insert("x-org", HeaderValue::from_str(&config.org_name).unwrap());
        });
        let _: Jwt = c.execute(get(&c, "/token")).unwrap();

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].2["x-org"], "acme");
        assert!(!seen[0].2.contains_key(AUTHORIZATION));
    }

    #[test]
    fn construction_failure_never_reaches_transport() {
        let transport = Canned::new(StatusCode::OK, "{}");
        let c = client(&transport);
        let built = c.prepare(Request::builder(Method::GET, "relative/path"));
        let err = c.execute::<Jwt>(built).unwrap_err();
        assert!(err.is_construction());
        assert!(transport.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn error_envelope_becomes_api_error() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::NOT_FOUND, StatusCode::INTERNAL_SERVER_ERROR] {
            let transport = Canned::new(status, r#"{"error":{"message":"nope","code":7}}"#);
            let c = client(&transport);
            let err = c.execute::<Jwt>(get(&c, "/token")).unwrap_err();
            let api = err.api_error().expect("api error");
            assert_eq!(api.status, status);
            assert_eq!(api.message, "nope");
        }
    }

    #[test]
    fn unparseable_error_body_becomes_status_error() {
        let transport = Canned::new(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        let c = client(&transport);
        let err = c.execute::<Jwt>(get(&c, "/token")).unwrap_err();
        assert!(matches!(
            err,
            Error::Transport(TransportError::Status { status }) if status == StatusCode::BAD_GATEWAY
        ));
    }

    #[test]
    fn unreadable_error_body_becomes_status_error() {
        struct Broken;

        impl std::io::Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"))
            }
        }

        struct Resetting;

        impl Transport for Resetting {
            fn execute(&self, _: Request) -> Result<Response, TransportError> {
                Ok(Response::new(StatusCode::INTERNAL_SERVER_ERROR, HeaderMap::new(), Broken))
            }
        }

        let c = Client::with_transport(
            ClientConfig::new().with_base_url("http://localhost:3000/v1"),
            Resetting,
        );
        let err = c.execute::<Jwt>(get(&c, "/token")).unwrap_err();
        assert!(matches!(
            err,
            Error::Transport(TransportError::Status { status }) if status == StatusCode::INTERNAL_SERVER_ERROR
        ));
    }

    #[test]
    fn malformed_success_body_is_decode_error() {
        let transport = Canned::new(StatusCode::OK, r#"{"jwt":"abc""#);
        let c = client(&transport);
        let err = c.execute::<Jwt>(get(&c, "/token")).unwrap_err();
        assert!(matches!(err, Error::Decode(DecodeError::Json(_))));
    }

    #[test]
    fn execute_empty_checks_status() {
        let transport = Canned::new(StatusCode::OK, "");
        let c = client(&transport);
        c.execute_empty(get(&c, "/rotate")).unwrap();

        let transport = Canned::new(StatusCode::FORBIDDEN, "");
        let c = client(&transport);
        let err = c.execute_empty(get(&c, "/rotate")).unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
    }

    #[test]
    fn setters_change_later_requests() {
        let transport = Canned::new(StatusCode::OK, r#"{"jwt":""}"#);
        let mut c = client(&transport);
        c.set_api_token("rotated");
        let _: Jwt = c.execute(get(&c, "/token")).unwrap();
        assert_eq!(transport.seen.lock().unwrap()[0].2[AUTHORIZATION], "Bearer rotated");
    }
}
