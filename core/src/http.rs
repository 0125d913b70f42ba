//! Request and response values exchanged with the transport.
//!
//! # Design
//! A [`Request`] is a plain descriptor: method, absolute URI, headers, body
//! and an optional deadline. Resource code builds one per operation through
//! [`RequestBuilder`], which records the first construction failure (bad
//! URI, bad header, unserializable body) and reports it from `build()`, so
//! call sites chain freely and check once.
//!
//! A [`Response`] owns its body reader. Reading it consumes the response,
//! and dropping the response closes the reader, so every exit path releases
//! the connection.

use std::fmt;
use std::io::{Cursor, Read};
use std::time::Duration;

use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::{Method, StatusCode, Uri};
use serde::Serialize;

use crate::error::ConstructionError;

/// Outgoing request body.
#[derive(Default)]
pub enum Body {
    #[default]
    Empty,
    /// Buffered payload, typically serialized JSON.
    Bytes(Bytes),
    /// Sent as-is without re-encoding (raw dump uploads).
    Stream(Box<dyn Read + Send + 'static>),
}

impl Body {
    /// Marshal `value` to JSON.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ConstructionError> {
        Ok(Body::Bytes(Bytes::from(serde_json::to_vec(value)?)))
    }

    pub fn stream(reader: impl Read + Send + 'static) -> Self {
        Body::Stream(Box::new(reader))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty)
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Empty => write!(f, "Body::Empty"),
            Body::Bytes(bytes) => f.debug_tuple("Body::Bytes").field(&bytes.len()).finish(),
            Body::Stream(_) => write!(f, "Body::Stream(..)"),
        }
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Bytes(Bytes::from(bytes))
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::Bytes(Bytes::from(s))
    }
}

/// An HTTP request described as plain data.
#[derive(Debug)]
pub struct Request {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Body,
    /// Deadline for the whole exchange; the transport default applies when unset.
    pub timeout: Option<Duration>,
}

impl Request {
    pub fn builder(method: Method, url: impl AsRef<str>) -> RequestBuilder {
        RequestBuilder::new(method, url.as_ref())
    }

    /// Build a request in one call, merging `headers` onto it.
    pub fn build(
        method: Method,
        url: &str,
        body: Body,
        headers: HeaderMap,
    ) -> Result<Request, ConstructionError> {
        Request::builder(method, url).body(body).headers(headers).build()
    }
}

/// Fluent builder for [`Request`]; errors are deferred to [`RequestBuilder::build`].
#[derive(Debug)]
pub struct RequestBuilder {
    inner: Result<Request, ConstructionError>,
}

impl RequestBuilder {
    fn new(method: Method, url: &str) -> Self {
        let inner = url
            .parse::<Uri>()
            .map_err(|source| ConstructionError::InvalidUri {
                uri: url.to_string(),
                source,
            })
            .and_then(|uri| {
                if uri.scheme().is_none() || uri.host().is_none() {
                    return Err(ConstructionError::RelativeUri(url.to_string()));
                }
                Ok(Request {
                    method,
                    uri,
                    headers: HeaderMap::new(),
                    body: Body::Empty,
                    timeout: None,
                })
            });
        Self { inner }
    }

    fn map(self, f: impl FnOnce(Request) -> Result<Request, ConstructionError>) -> Self {
        Self {
            inner: self.inner.and_then(f),
        }
    }

    /// Set a header, replacing any previous value under the same name.
    pub fn header<K, V>(self, key: K, value: V) -> Self
    where
        K: TryInto<HeaderName>,
        V: TryInto<HeaderValue>,
        K::Error: fmt::Display,
        V::Error: fmt::Display,
    {
        self.map(|mut req| {
            let key = key
                .try_into()
                .map_err(|e| ConstructionError::InvalidHeader(format!("invalid header name: {e}")))?;
            let value = value
                .try_into()
                .map_err(|e| ConstructionError::InvalidHeader(format!("invalid header value: {e}")))?;
            req.headers.insert(key, value);
            Ok(req)
        })
    }

    /// Merge `headers` onto the request; later values win.
    pub fn headers(self, headers: HeaderMap) -> Self {
        self.map(|mut req| {
            let mut last = None;
            for (name, value) in headers {
                // `None` names repeat the previous one (multi-valued header).
                let name = match name {
                    Some(name) => {
                        req.headers.remove(&name);
                        last = Some(name.clone());
                        name
                    }
                    None => match &last {
                        Some(name) => name.clone(),
                        None => continue,
                    },
                };
                req.headers.append(name, value);
            }
            Ok(req)
        })
    }

    pub fn body(self, body: impl Into<Body>) -> Self {
        let body = body.into();
        self.map(|mut req| {
            req.body = body;
            Ok(req)
        })
    }

    /// Marshal `value` to JSON and use it as the body.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Self {
        let body = Body::json(value);
        self.map(|mut req| {
            req.body = body?;
            Ok(req)
        })
    }

    /// Send `reader` as the body, unmodified.
    pub fn stream(self, reader: impl Read + Send + 'static) -> Self {
        self.body(Body::stream(reader))
    }

    pub fn timeout(self, timeout: Duration) -> Self {
        self.map(|mut req| {
            req.timeout = Some(timeout);
            Ok(req)
        })
    }

    pub fn build(self) -> Result<Request, ConstructionError> {
        self.inner
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// An HTTP response with an unread body.
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    body: Box<dyn Read + Send + 'static>,
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl Response {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Read + Send + 'static) -> Self {
        Self {
            status,
            headers,
            body: Box::new(body),
        }
    }

    /// A response whose body is already in memory.
    pub fn from_bytes(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self::new(status, HeaderMap::new(), Cursor::new(body.into()))
    }

    /// Success range is 200..=399; anything else is a failed operation.
    pub fn is_success(&self) -> bool {
        (200..400).contains(&self.status.as_u16())
    }

    /// Read the body to the end. The reader is dropped on return, error or not.
    pub fn bytes(mut self) -> std::io::Result<Bytes> {
        let mut buf = Vec::new();
        self.body.read_to_end(&mut buf)?;
        Ok(Bytes::from(buf))
    }
}
