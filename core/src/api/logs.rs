use http::Method;

use crate::client::Client;
use crate::error::{ConstructionError, Error};
use crate::http::Request;
use crate::types::AuditLogs;

impl Client {
    pub fn build_audit_logs(&self) -> Result<Request, ConstructionError> {
        self.prepare(Request::builder(Method::GET, self.config().org_url("/audit-logs")))
    }

    /// First page of the configured organization's audit logs.
    pub fn audit_logs(&self) -> Result<AuditLogs, Error> {
        self.execute(self.build_audit_logs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{assert_request, client};

    #[test]
    fn audit_log_path() {
        let req = client().build_audit_logs().unwrap();
        assert_request(&req, Method::GET, "http://localhost:3000/v1/organizations/acme/audit-logs");
    }
}
