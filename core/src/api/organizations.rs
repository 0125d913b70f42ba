use http::Method;

use crate::client::Client;
use crate::config::segment;
use crate::error::{ConstructionError, Error};
use crate::http::Request;
use crate::types::{DeletedMember, Invite, InviteList, Member, NewInvite, NewMember, Org, OrgUpdate};

impl Client {
    pub fn build_list_organizations(&self) -> Result<Request, ConstructionError> {
        self.prepare(Request::builder(Method::GET, self.config().url("/organizations")))
    }

    pub fn list_organizations(&self) -> Result<Vec<Org>, Error> {
        self.execute(self.build_list_organizations())
    }

    /// The full organization record is sent back with `update` applied.
    pub fn build_update_organization(
        &self,
        org: &Org,
        update: &OrgUpdate,
    ) -> Result<Request, ConstructionError> {
        let url = self.config().url(&format!("/organizations/{}", segment(&org.name)));
        self.prepare(Request::builder(Method::PATCH, url).json(&update.apply(org)))
    }

    pub fn update_organization(&self, org: &Org, update: &OrgUpdate) -> Result<Org, Error> {
        self.execute(self.build_update_organization(org, update))
    }

    pub fn build_list_members(&self) -> Result<Request, ConstructionError> {
        self.prepare(Request::builder(Method::GET, self.config().org_url("/members")))
    }

    pub fn list_members(&self) -> Result<Vec<Member>, Error> {
        self.execute(self.build_list_members())
    }

    pub fn build_add_member(&self, username: &str, role: &str) -> Result<Request, ConstructionError> {
        let url = self.config().org_url("/members");
        self.prepare(Request::builder(Method::POST, url).json(&NewMember { username, role }))
    }

    pub fn add_member(&self, username: &str, role: &str) -> Result<Member, Error> {
        self.execute(self.build_add_member(username, role))
    }

    pub fn build_delete_member(&self, username: &str) -> Result<Request, ConstructionError> {
        let username = segment(username);
        let url = self.config().org_url(&format!("/members/{username}"));
        self.prepare(Request::builder(Method::DELETE, url))
    }

    pub fn delete_member(&self, username: &str) -> Result<DeletedMember, Error> {
        self.execute(self.build_delete_member(username))
    }

    pub fn build_list_invites(&self) -> Result<Request, ConstructionError> {
        self.prepare(Request::builder(Method::GET, self.config().org_url("/invites")))
    }

    pub fn list_invites(&self) -> Result<InviteList, Error> {
        self.execute(self.build_list_invites())
    }

    pub fn build_create_invite(&self, email: &str, role: &str) -> Result<Request, ConstructionError> {
        let url = self.config().org_url("/invites");
        self.prepare(Request::builder(Method::POST, url).json(&NewInvite { email, role }))
    }

    /// Invite `email` to the configured organization.
    pub fn create_invite(&self, email: &str, role: &str) -> Result<Invite, Error> {
        self.execute(self.build_create_invite(email, role))
    }
}
