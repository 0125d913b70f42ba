use http::Method;

use crate::client::Client;
use crate::config::segment;
use crate::error::{ConstructionError, Error};
use crate::http::Request;
use crate::types::{ApiToken, RevokedToken, TokenList, TokenValidation};

impl Client {
    pub fn build_create_token(&self, name: &str) -> Result<Request, ConstructionError> {
        let name = segment(name);
        let url = self.config().url(&format!("/auth/api-tokens/{name}"));
        self.prepare(Request::builder(Method::POST, url))
    }

    /// Mint a platform API token called `name`.
    pub fn create_token(&self, name: &str) -> Result<ApiToken, Error> {
        self.execute(self.build_create_token(name))
    }

    pub fn build_validate_token(&self) -> Result<Request, ConstructionError> {
        self.prepare(Request::builder(Method::GET, self.config().url("/auth/validate")))
    }

    /// Check the configured API token and report when it expires.
    pub fn validate_token(&self) -> Result<TokenValidation, Error> {
        self.execute(self.build_validate_token())
    }

    pub fn build_list_tokens(&self) -> Result<Request, ConstructionError> {
        self.prepare(Request::builder(Method::GET, self.config().url("/auth/api-tokens")))
    }

    pub fn list_tokens(&self) -> Result<TokenList, Error> {
        self.execute(self.build_list_tokens())
    }

    pub fn build_revoke_token(&self, name: &str) -> Result<Request, ConstructionError> {
        let name = segment(name);
        let url = self.config().url(&format!("/auth/api-tokens/{name}"));
        self.prepare(Request::builder(Method::DELETE, url))
    }

    pub fn revoke_token(&self, name: &str) -> Result<RevokedToken, Error> {
        self.execute(self.build_revoke_token(name))
    }
}
