use http::Method;

use crate::client::Client;
use crate::error::{ConstructionError, Error};
use crate::http::Request;
use crate::types::{ClosestRegion, Locations};

impl Client {
    pub fn build_list_locations(&self) -> Result<Request, ConstructionError> {
        self.prepare(Request::builder(Method::GET, self.config().url("/locations")))
    }

    pub fn list_locations(&self) -> Result<Locations, Error> {
        self.execute(self.build_list_locations())
    }

    /// Ask the region-discovery service, not the main API.
    pub fn build_closest_location(&self) -> Result<Request, ConstructionError> {
        self.prepare(Request::builder(Method::GET, &self.config().region_url))
    }

    pub fn closest_location(&self) -> Result<ClosestRegion, Error> {
        self.execute(self.build_closest_location())
    }
}
