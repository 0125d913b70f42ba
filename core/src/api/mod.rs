//! Resource operations of the provisioning API.
//!
//! # Design
//! Each operation is a pair of methods on [`crate::Client`]: a public
//! `build_*` method that produces the request descriptor (header policy
//! already applied) and an executing method that runs it through
//! [`crate::Client::execute`]. Organization and group names come from the
//! client configuration unless passed explicitly.

mod databases;
mod groups;
mod locations;
mod logs;
mod organizations;
mod tokens;
