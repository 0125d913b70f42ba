//! Executes requests over the network.
//!
//! # Design
//! [`Transport`] is the seam between the pipeline and the HTTP stack. The
//! default [`UreqTransport`] wraps a blocking `ureq::Agent` configured to
//! return 4xx/5xx responses as data, leaving status interpretation to
//! [`crate::Client`]. Each call is a single attempt.

use std::io::Read;
use std::time::Duration;

use tracing::debug;

use crate::error::TransportError;
use crate::http::{Body, Request, Response};

pub trait Transport: Send + Sync {
    fn execute(&self, request: Request) -> Result<Response, TransportError>;
}

/// `ureq`-backed implementation of [`Transport`].
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Create a transport whose requests time out after `timeout` unless
    /// they carry their own deadline.
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }

    fn run<S: ureq::AsSendBody>(
        &self,
        request: http::Request<S>,
        timeout: Option<Duration>,
    ) -> Result<Response, TransportError> {
        let request = match timeout {
            Some(timeout) => self
                .agent
                .configure_request(request)
                .timeout_global(Some(timeout))
                .build(),
            None => request,
        };
        let response = self.agent.run(request).map_err(map_ureq_error)?;
        let (parts, body) = response.into_parts();
        Ok(Response::new(parts.status, parts.headers, body.into_reader()))
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: Request) -> Result<Response, TransportError> {
        let Request {
            method,
            uri,
            headers,
            body,
            timeout,
        } = request;
        debug!(%method, %uri, "sending request");

        let mut builder = http::Request::builder().method(method).uri(uri);
        if let Some(map) = builder.headers_mut() {
            *map = headers;
        }

        match body {
            Body::Empty => self.run(builder.body(()).map_err(other)?, timeout),
            Body::Bytes(bytes) => self.run(builder.body(bytes.to_vec()).map_err(other)?, timeout),
            Body::Stream(mut reader) => {
                let reader: &mut dyn Read = &mut reader;
                let body = ureq::SendBody::from_reader(reader);
                self.run(builder.body(body).map_err(other)?, timeout)
            }
        }
    }
}

fn other(e: http::Error) -> TransportError {
    TransportError::Other(Box::new(e))
}

fn map_ureq_error(e: ureq::Error) -> TransportError {
    match e {
        ureq::Error::Timeout(_) => TransportError::Timeout,
        ureq::Error::HostNotFound | ureq::Error::ConnectionFailed | ureq::Error::Io(_) => {
            TransportError::Connection(Box::new(e))
        }
        e => TransportError::Other(Box::new(e)),
    }
}
