//! Full lifecycle test against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives the client over real
//! HTTP through the default `ureq` transport. Validates that request
//! building, header policy, status classification and decoding work
//! end-to-end with the actual server.

use std::io::Cursor;
use std::net::SocketAddr;
use std::time::Duration;

use dbpu_core::{
    Authorization, Client, ClientConfig, CreateDatabase, Error, ErrorCode, TokenOptions,
    TransportError, UsagePeriod,
};
use http::StatusCode;

/// Bind a random port and serve the mock API on a background thread.
fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn client(addr: SocketAddr, token: &str) -> Client {
    Client::new(
        ClientConfig::new()
            .with_base_url(format!("http://{addr}/v1"))
            .with_region_url(format!("http://{addr}/region"))
            .with_api_token(token)
            .with_org_name("acme")
            .with_group_name("default")
            .with_timeout(Duration::from_secs(5)),
    )
}

#[test]
fn database_lifecycle() {
    let addr = start_server();
    let client = client(addr, mock_server::API_TOKEN);

    // Step 1: list — should be empty.
    let databases = client.list_databases().unwrap();
    assert!(databases.databases.is_empty(), "expected empty list");

    // Step 2: create a database.
    let created = client
        .create_database(&CreateDatabase::new("db1", "default"))
        .unwrap();
    assert_eq!(created.database.name, "db1");
    assert_eq!(created.database.group, "default");
    assert_eq!(created.database.primary_region, mock_server::PRIMARY_REGION);
    assert!(!created.database.id.is_empty());

    // Step 3: creating it again conflicts with a structured error.
    let err = client
        .create_database(&CreateDatabase::new("db1", "default"))
        .unwrap_err();
    let api = err.api_error().expect("conflict should carry an error envelope");
    assert_eq!(api.status, StatusCode::CONFLICT);
    assert_eq!(api.message, "database already exists, db1");
    assert_eq!(api.code, Some(ErrorCode::Text("conflict".into())));
    assert_eq!(api.param.as_deref(), Some("name"));

    // Step 4: get it back.
    let fetched = client.get_database("db1").unwrap();
    assert_eq!(fetched.database, created.database);

    // Step 5: mint a read-only token.
    let options = TokenOptions::new()
        .expiration("1d")
        .authorization(Authorization::ReadOnly);
    let jwt = client.create_database_token("db1", &options).unwrap();
    assert_eq!(jwt.jwt, "db1.read-only.1d");

    // Step 6: one primary instance, with usage totals.
    let instances = client.list_database_instances("db1").unwrap();
    assert_eq!(instances.instances.len(), 1);
    let instance = client.get_database_instance("db1", mock_server::PRIMARY_REGION).unwrap();
    assert_eq!(instance.instance, instances.instances[0]);
    assert_eq!(instance.instance.kind, "primary");
    let usage = client.database_usage("db1", &UsagePeriod::new()).unwrap();
    assert_eq!(usage.database.uuid, created.database.id);
    assert_eq!(usage.database.total.storage_bytes, 4096);
    client.invalidate_database_tokens("db1").unwrap();

    // Step 7: list shows it.
    let databases = client.list_databases().unwrap();
    assert_eq!(databases.databases.len(), 1);

    // Step 8: delete.
    let deleted = client.delete_database("db1").unwrap();
    assert_eq!(deleted.database, "db1");

    // Step 9: get after delete is a 404 api error.
    let err = client.get_database("db1").unwrap_err();
    assert!(err.is_api());
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(err.api_error().unwrap().code, Some(ErrorCode::Int(404)));
}

#[test]
fn groups_and_locations() {
    let addr = start_server();
    let client = client(addr, mock_server::API_TOKEN);

    let groups = client.list_groups().unwrap();
    assert_eq!(groups.groups.len(), 1);
    assert_eq!(groups.groups[0].name, "default");

    let group = client.get_group("default").unwrap();
    assert_eq!(group.group.primary_region, mock_server::PRIMARY_REGION);

    client.invalidate_group_tokens().unwrap();

    let locations = client.list_locations().unwrap();
    assert!(locations.locations.contains_key("ams"));

    let closest = client.closest_location().unwrap();
    assert_eq!(closest.server, mock_server::PRIMARY_REGION);
}

#[test]
fn dump_upload_streams_body() {
    let addr = start_server();
    let client = client(addr, mock_server::API_TOKEN);

    let dump = b"CREATE TABLE t(x);".to_vec();
    let len = dump.len();
    let upload = client.upload_dump(Cursor::new(dump)).unwrap();
    assert_eq!(upload.dump_url, format!("file:///dumps/{len}.sql"));
}

#[test]
fn token_validation_and_rejection() {
    let addr = start_server();

    let validation = client(addr, mock_server::API_TOKEN).validate_token().unwrap();
    assert_eq!(validation.exp, -1);

    let err = client(addr, "wrong").validate_token().unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert!(err.is_api());
}

#[test]
fn failure_without_envelope_keeps_status() {
    let addr = start_server();
    let err = client(addr, mock_server::API_TOKEN).audit_logs().unwrap_err();
    assert!(matches!(
        err,
        Error::Transport(TransportError::Status { status }) if status == StatusCode::SERVICE_UNAVAILABLE
    ));
}

#[test]
fn connection_refused_is_a_transport_error() {
    // Bind and drop to get a port with nothing listening.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();

    let err = client(addr, mock_server::API_TOKEN).list_databases().unwrap_err();
    assert!(err.is_transport(), "got {err:?}");
    assert!(err.api_error().is_none());
    assert_eq!(err.status(), None);
}
