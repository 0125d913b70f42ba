//! Synchronous typed client for a database-provisioning REST API.
//!
//! # Overview
//! Every operation runs the same pipeline: a [`RequestBuilder`] produces a
//! [`Request`], the client's [`HeaderPolicy`] stamps the common headers,
//! a [`Transport`] performs the round-trip, the status is classified and
//! the body decoded into a typed value. [`resolve`] folds the outcome of
//! each stage into a single `Result` whose [`Error`] says which stage failed.
//!
//! # Design
//! - Blocking I/O on the caller's thread; nothing is retried.
//! - `build_*` methods expose the request descriptor of every resource
//!   operation, so requests can be inspected or dispatched by hand.
//! - Server-reported failures ([`ApiError`]) are kept apart from network
//!   failures ([`TransportError`]).
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

mod api;
pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod header;
pub mod http;
pub mod resolve;
pub mod transport;
pub mod types;

pub use client::Client;
pub use config::ClientConfig;
pub use decode::{decode_bytes, decode_response};
pub use error::{ApiError, ConstructionError, DecodeError, Error, ErrorCode, TransportError};
pub use header::{DefaultHeaders, HeaderPolicy};
pub use crate::http::{Body, Request, RequestBuilder, Response};
pub use resolve::resolve;
pub use transport::{Transport, UreqTransport};
pub use types::{
    ApiToken, AuditLog, AuditLogs, Authorization, ClosestRegion, CreateDatabase, Database,
    DatabaseList, DatabaseResponse, DatabaseUsage, DbInstance, DbInstanceList, DbInstanceResponse,
    DbSeed, DbUsage, DeletedDatabase, DeletedMember, DumpUpload, Group, GroupList, GroupResponse,
    Invite, InviteList, Jwt, Locations, Member, Org, OrgUpdate, Pagination, RevokedToken, Token,
    TokenList, TokenOptions, TokenValidation, UsagePeriod, UsageReport,
};
