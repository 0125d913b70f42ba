use std::io::Read;

use http::header::{HeaderValue, CONTENT_TYPE};
use http::Method;

use crate::client::Client;
use crate::config::segment;
use crate::error::{ConstructionError, Error};
use crate::http::Request;
use crate::types::{
    CreateDatabase, DatabaseList, DatabaseResponse, DatabaseUsage, DbInstanceList,
    DbInstanceResponse, DeletedDatabase, DumpUpload, Jwt, TokenOptions, UsagePeriod,
};

impl Client {
    pub fn build_list_databases(&self) -> Result<Request, ConstructionError> {
        self.prepare(Request::builder(Method::GET, self.config().org_url("/databases")))
    }

    pub fn list_databases(&self) -> Result<DatabaseList, Error> {
        self.execute(self.build_list_databases())
    }

    pub fn build_get_database(&self, name: &str) -> Result<Request, ConstructionError> {
        let name = segment(name);
        let url = self.config().org_url(&format!("/databases/{name}"));
        self.prepare(Request::builder(Method::GET, url))
    }

    pub fn get_database(&self, name: &str) -> Result<DatabaseResponse, Error> {
        self.execute(self.build_get_database(name))
    }

    pub fn build_create_database(&self, input: &CreateDatabase) -> Result<Request, ConstructionError> {
        let url = self.config().org_url("/databases");
        self.prepare(Request::builder(Method::POST, url).json(input))
    }

    pub fn create_database(&self, input: &CreateDatabase) -> Result<DatabaseResponse, Error> {
        self.execute(self.build_create_database(input))
    }

    pub fn build_delete_database(&self, name: &str) -> Result<Request, ConstructionError> {
        let name = segment(name);
        let url = self.config().org_url(&format!("/databases/{name}"));
        self.prepare(Request::builder(Method::DELETE, url))
    }

    pub fn delete_database(&self, name: &str) -> Result<DeletedDatabase, Error> {
        self.execute(self.build_delete_database(name))
    }

    pub fn build_create_database_token(
        &self,
        name: &str,
        options: &TokenOptions,
    ) -> Result<Request, ConstructionError> {
        let name = segment(name);
        let url = self
            .config()
            .org_url(&format!("/databases/{name}/auth/tokens{}", options.query()));
        self.prepare(Request::builder(Method::POST, url))
    }

    /// Mint a token scoped to database `name`.
    pub fn create_database_token(&self, name: &str, options: &TokenOptions) -> Result<Jwt, Error> {
        self.execute(self.build_create_database_token(name, options))
    }

    pub fn build_invalidate_database_tokens(&self, name: &str) -> Result<Request, ConstructionError> {
        let name = segment(name);
        let url = self.config().org_url(&format!("/databases/{name}/auth/rotate"));
        self.prepare(Request::builder(Method::POST, url))
    }

    /// Revoke every token minted for database `name`.
    pub fn invalidate_database_tokens(&self, name: &str) -> Result<(), Error> {
        self.execute_empty(self.build_invalidate_database_tokens(name))
    }

    pub fn build_list_database_instances(&self, name: &str) -> Result<Request, ConstructionError> {
        let name = segment(name);
        let url = self.config().org_url(&format!("/databases/{name}/instances"));
        self.prepare(Request::builder(Method::GET, url))
    }

    pub fn list_database_instances(&self, name: &str) -> Result<DbInstanceList, Error> {
        self.execute(self.build_list_database_instances(name))
    }

    pub fn build_get_database_instance(
        &self,
        name: &str,
        instance: &str,
    ) -> Result<Request, ConstructionError> {
        let (name, instance) = (segment(name), segment(instance));
        let url = self
            .config()
            .org_url(&format!("/databases/{name}/instances/{instance}"));
        self.prepare(Request::builder(Method::GET, url))
    }

    pub fn get_database_instance(
        &self,
        name: &str,
        instance: &str,
    ) -> Result<DbInstanceResponse, Error> {
        self.execute(self.build_get_database_instance(name, instance))
    }

    pub fn build_database_usage(
        &self,
        name: &str,
        period: &UsagePeriod,
    ) -> Result<Request, ConstructionError> {
        let name = segment(name);
        let url = self
            .config()
            .org_url(&format!("/databases/{name}/usage{}", period.query()));
        self.prepare(Request::builder(Method::GET, url))
    }

    /// Rows read, rows written and storage of database `name` over `period`.
    pub fn database_usage(&self, name: &str, period: &UsagePeriod) -> Result<DatabaseUsage, Error> {
        self.execute(self.build_database_usage(name, period))
    }

    /// The dump is streamed to the server without being buffered.
    pub fn build_upload_dump(
        &self,
        dump: impl Read + Send + 'static,
    ) -> Result<Request, ConstructionError> {
        let url = self.config().org_url("/databases/dumps");
        let builder = Request::builder(Method::POST, url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"))
            .stream(dump);
        self.prepare(builder)
    }

    /// Upload a SQL dump for seeding a new database with [`crate::DbSeed::Dump`].
    pub fn upload_dump(&self, dump: impl Read + Send + 'static) -> Result<DumpUpload, Error> {
        self.execute(self.build_upload_dump(dump))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::api::testing::{assert_request, client, json_body};
    use crate::http::Body;
    use crate::types::Authorization;

    #[test]
    fn list_and_get_use_org_paths() {
        let c = client();
        let req = c.build_list_databases().unwrap();
        assert_request(&req, Method::GET, "http://localhost:3000/v1/organizations/acme/databases");
        assert!(req.body.is_empty());

        let req = c.build_get_database("db1").unwrap();
        assert_request(&req, Method::GET, "http://localhost:3000/v1/organizations/acme/databases/db1");
    }

    #[test]
    fn create_serializes_payload() {
        let req = client()
            .build_create_database(&CreateDatabase::new("db1", "default"))
            .unwrap();
        assert_request(&req, Method::POST, "http://localhost:3000/v1/organizations/acme/databases");
        assert_eq!(req.headers[CONTENT_TYPE], "application/json");
        assert_eq!(json_body(&req), serde_json::json!({"name": "db1", "group": "default"}));
    }

    #[test]
    fn token_options_become_query() {
        let options = TokenOptions::new()
            .expiration("1d")
            .authorization(Authorization::FullAccess);
        let req = client().build_create_database_token("db1", &options).unwrap();
        assert_request(
            &req,
            Method::POST,
            "http://localhost:3000/v1/organizations/acme/databases/db1/auth/tokens?expiration=1d&authorization=full-access",
        );
    }

    #[test]
    fn names_are_encoded_as_one_segment() {
        let req = client().build_delete_database("my db").unwrap();
        assert_request(&req, Method::DELETE, "http://localhost:3000/v1/organizations/acme/databases/my%20db");

        let req = client()
            .build_create_database_token("../../../auth/api-tokens", &TokenOptions::new())
            .unwrap();
        assert_request(
            &req,
            Method::POST,
            "http://localhost:3000/v1/organizations/acme/databases/..%2F..%2F..%2Fauth%2Fapi-tokens/auth/tokens",
        );
    }

    #[test]
    fn token_query_values_are_encoded() {
        let options = TokenOptions::new()
            .expiration("1d&authorization=full-access")
            .authorization(Authorization::ReadOnly);
        let req = client().build_create_database_token("db1", &options).unwrap();
        assert_eq!(
            req.uri.query(),
            Some("expiration=1d%26authorization%3Dfull-access&authorization=read-only")
        );
    }

    #[test]
    fn instance_paths() {
        let c = client();
        let req = c.build_list_database_instances("db1").unwrap();
        assert_request(
            &req,
            Method::GET,
            "http://localhost:3000/v1/organizations/acme/databases/db1/instances",
        );

        let req = c.build_get_database_instance("db1", "ams").unwrap();
        assert_request(
            &req,
            Method::GET,
            "http://localhost:3000/v1/organizations/acme/databases/db1/instances/ams",
        );
        assert!(req.body.is_empty());
    }

    #[test]
    fn usage_carries_period() {
        let c = client();
        let req = c.build_database_usage("db1", &UsagePeriod::new()).unwrap();
        assert_request(&req, Method::GET, "http://localhost:3000/v1/organizations/acme/databases/db1/usage");

        let period = UsagePeriod::new().from("2024-01-01T00:00:00Z").to("2024-02-01T00:00:00Z");
        let req = c.build_database_usage("db1", &period).unwrap();
        assert_eq!(
            req.uri.query(),
            Some("from=2024-01-01T00%3A00%3A00Z&to=2024-02-01T00%3A00%3A00Z")
        );
    }

    #[test]
    fn invalidate_tokens_posts_rotate() {
        let req = client().build_invalidate_database_tokens("db1").unwrap();
        assert_request(
            &req,
            Method::POST,
            "http://localhost:3000/v1/organizations/acme/databases/db1/auth/rotate",
        );
        assert_eq!(req.headers[http::header::AUTHORIZATION], "Bearer tok");
    }

    #[test]
    fn dump_upload_streams_octets() {
        let req = client()
            .build_upload_dump(Cursor::new(b"CREATE TABLE t(x);".to_vec()))
            .unwrap();
        assert_request(&req, Method::POST, "http://localhost:3000/v1/organizations/acme/databases/dumps");
        assert_eq!(req.headers[CONTENT_TYPE], "application/octet-stream");
        assert!(matches!(req.body, Body::Stream(_)));
    }

    #[test]
    fn unreachable_server_is_a_transport_error() {
        let err = client().list_databases().unwrap_err();
        assert!(err.is_transport());
    }
}
