use http::Method;

use crate::client::Client;
use crate::config::segment;
use crate::error::{ConstructionError, Error};
use crate::http::Request;
use crate::types::{Group, GroupList, GroupResponse, GroupTransfer, Jwt, NewGroup, TokenOptions};

impl Client {
    pub fn build_list_groups(&self) -> Result<Request, ConstructionError> {
        self.prepare(Request::builder(Method::GET, self.config().org_url("/groups")))
    }

    pub fn list_groups(&self) -> Result<GroupList, Error> {
        self.execute(self.build_list_groups())
    }

    pub fn build_get_group(&self, name: &str) -> Result<Request, ConstructionError> {
        let name = segment(name);
        let url = self.config().org_url(&format!("/groups/{name}"));
        self.prepare(Request::builder(Method::GET, url))
    }

    pub fn get_group(&self, name: &str) -> Result<GroupResponse, Error> {
        self.execute(self.build_get_group(name))
    }

    /// Create the configured group with `location` as its primary region.
    pub fn build_create_group(&self, location: &str) -> Result<Request, ConstructionError> {
        let body = NewGroup {
            name: &self.config().group_name,
            location,
        };
        let url = self.config().org_url("/groups");
        self.prepare(Request::builder(Method::POST, url).json(&body))
    }

    pub fn create_group(&self, location: &str) -> Result<GroupResponse, Error> {
        self.execute(self.build_create_group(location))
    }

    pub fn build_delete_group(&self, name: &str) -> Result<Request, ConstructionError> {
        let name = segment(name);
        let url = self.config().org_url(&format!("/groups/{name}"));
        self.prepare(Request::builder(Method::DELETE, url))
    }

    pub fn delete_group(&self, name: &str) -> Result<GroupResponse, Error> {
        self.execute(self.build_delete_group(name))
    }

    pub fn build_add_location(&self, location: &str) -> Result<Request, ConstructionError> {
        let location = segment(location);
        let url = self.config().group_url(&format!("/locations/{location}"));
        self.prepare(Request::builder(Method::POST, url))
    }

    /// Replicate the configured group to `location`.
    pub fn add_location(&self, location: &str) -> Result<GroupResponse, Error> {
        self.execute(self.build_add_location(location))
    }

    pub fn build_remove_location(&self, location: &str) -> Result<Request, ConstructionError> {
        let location = segment(location);
        let url = self.config().group_url(&format!("/locations/{location}"));
        self.prepare(Request::builder(Method::DELETE, url))
    }

    pub fn remove_location(&self, location: &str) -> Result<GroupResponse, Error> {
        self.execute(self.build_remove_location(location))
    }

    pub fn build_transfer_group(&self, organization: &str) -> Result<Request, ConstructionError> {
        let url = self.config().group_url("/transfer");
        self.prepare(Request::builder(Method::POST, url).json(&GroupTransfer { organization }))
    }

    /// Move the configured group to another organization.
    pub fn transfer_group(&self, organization: &str) -> Result<Group, Error> {
        self.execute(self.build_transfer_group(organization))
    }

    pub fn build_create_group_token(&self, options: &TokenOptions) -> Result<Request, ConstructionError> {
        let url = self
            .config()
            .group_url(&format!("/auth/tokens{}", options.query()));
        self.prepare(Request::builder(Method::POST, url))
    }

    /// Mint a token valid for every database in the configured group.
    pub fn create_group_token(&self, options: &TokenOptions) -> Result<Jwt, Error> {
        self.execute(self.build_create_group_token(options))
    }

    pub fn build_invalidate_group_tokens(&self) -> Result<Request, ConstructionError> {
        self.prepare(Request::builder(Method::POST, self.config().group_url("/auth/rotate")))
    }

    /// Rotate the group's signing keys, invalidating every token minted so far.
    pub fn invalidate_group_tokens(&self) -> Result<(), Error> {
        self.execute_empty(self.build_invalidate_group_tokens())
    }

    pub fn build_update_group_version(&self) -> Result<Request, ConstructionError> {
        self.prepare(Request::builder(Method::POST, self.config().group_url("/update")))
    }

    pub fn update_group_version(&self) -> Result<(), Error> {
        self.execute_empty(self.build_update_group_version())
    }
}
