use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use dyndns_core::directory::DirectoryOperation;
use dyndns_core::{MemoryDirectory, RecordType, UpdateConfig, UpdateService};
use dyndnsd::{AppState, Credentials, create_router};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

const ZONE: &str = "example.com";
const HOST: &str = "home.example.com";

fn app_with(config: UpdateConfig) -> (Router, MemoryDirectory) {
    let directory = MemoryDirectory::new(ZONE);
    let service = UpdateService::new(Arc::new(directory.clone()), config).unwrap();
    let state = AppState::new(service, Credentials::new("router", "s3cret"));
    (create_router(state), directory)
}

fn app() -> (Router, MemoryDirectory) {
    app_with(UpdateConfig::new(ZONE))
}

fn authed(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(
            header::AUTHORIZATION,
            format!("Basic {}", STANDARD.encode("router:s3cret")),
        )
        .body(Body::empty())
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

async fn contents(directory: &MemoryDirectory, record_type: RecordType) -> Vec<String> {
    directory
        .records()
        .await
        .into_iter()
        .filter(|r| r.record_type == record_type && r.name == HOST)
        .map(|r| r.content)
        .collect()
}

#[tokio::test]
async fn test_missing_credentials_returns_401() {
    let (app, directory) = app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nic/update?hostname=home.example.com&myip=192.0.2.1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Basic realm=\"dyndns\""
    );
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"Unauthorized");
    assert_eq!(directory.call_count().await, 0);
}

#[tokio::test]
async fn test_wrong_password_returns_401() {
    let (app, directory) = app();

    let request = Request::builder()
        .uri("/nic/update?hostname=home.example.com&myip=192.0.2.1")
        .header(
            header::AUTHORIZATION,
            format!("Basic {}", STANDARD.encode("router:guess")),
        )
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, "Unauthorized");
    assert_eq!(directory.call_count().await, 0);
}

#[tokio::test]
async fn test_unknown_route_requires_auth() {
    let (app, _directory) = app();

    let request = Request::builder()
        .uri("/admin")
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_dual_stack_update_returns_200() {
    let (app, directory) = app();

    let (status, body) = send(
        app,
        authed("/nic/update?hostname=home.example.com&myip=192.0.2.1,2001:db8::1"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Record(s) updated");
    assert_eq!(contents(&directory, RecordType::A).await, vec!["192.0.2.1"]);
    assert_eq!(contents(&directory, RecordType::Aaaa).await, vec!["2001:db8::1"]);
}

#[tokio::test]
async fn test_percent_encoded_list_is_decoded() {
    let (app, directory) = app();
    directory.seed(RecordType::Aaaa, HOST, "2001:db8::9").await;

    let (status, _) = send(
        app,
        authed("/nic/update?hostname=home.example.com&myip=198.51.100.7%2C"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(contents(&directory, RecordType::A).await, vec!["198.51.100.7"]);
    assert!(contents(&directory, RecordType::Aaaa).await.is_empty());
}

#[tokio::test]
async fn test_missing_fields_return_400() {
    for uri in [
        "/nic/update",
        "/nic/update?hostname=home.example.com",
        "/nic/update?myip=192.0.2.1",
        "/nic/update?hostname=&myip=192.0.2.1",
    ] {
        let (app, directory) = app();
        let (status, body) = send(app, authed(uri)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body, "Missing hostname or IP address");
        assert_eq!(directory.call_count().await, 0);
    }
}

#[tokio::test]
async fn test_malformed_hostname_returns_400() {
    for hostname in ["home.example.com.", "home..example.com", "-home.example.com"] {
        let (app, directory) = app();
        let uri = format!("/nic/update?hostname={}&myip=192.0.2.1", hostname);
        let (status, body) = send(app, authed(&uri)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", hostname);
        assert_eq!(body, "Invalid hostname");
        assert_eq!(directory.call_count().await, 0);
    }
}

#[tokio::test]
async fn test_invalid_address_returns_400() {
    let (app, directory) = app();

    let (status, body) = send(
        app,
        authed("/nic/update?hostname=home.example.com&myip=not-an-ip"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid IPv4/6 address");
    assert_eq!(directory.call_count().await, 0);
}

#[tokio::test]
async fn test_disallowed_hostname_returns_403() {
    let (app, directory) =
        app_with(UpdateConfig::new(ZONE).with_allowed_hostnames(["nas.example.com"]));

    let (status, body) = send(
        app,
        authed("/nic/update?hostname=home.example.com&myip=192.0.2.1"),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, "Forbidden: This hostname is not allowed");
    assert_eq!(directory.call_count().await, 0);
}

#[tokio::test]
async fn test_unmanaged_hostname_returns_404() {
    let (app, _directory) = app_with(UpdateConfig::new(ZONE).with_create_missing(false));

    let (status, body) = send(
        app,
        authed("/nic/update?hostname=home.example.com&myip=192.0.2.1"),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Hostname not managed");
}

#[tokio::test]
async fn test_directory_failures_return_500_by_stage() {
    for (operation, expected) in [
        (DirectoryOperation::ResolveZone, "Error fetching zone ID"),
        (DirectoryOperation::List, "Error fetching DNS records"),
        (DirectoryOperation::Create, "Error updating the record"),
    ] {
        let (app, directory) = app();
        directory.fail_on(operation).await;

        let (status, body) = send(
            app,
            authed("/nic/update?hostname=home.example.com&myip=192.0.2.1"),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, expected, "{:?}", operation);
    }
}

#[tokio::test]
async fn test_unknown_zone_returns_500() {
    let directory = MemoryDirectory::new(ZONE);
    let service =
        UpdateService::new(Arc::new(directory.clone()), UpdateConfig::new("example.org")).unwrap();
    let app = create_router(AppState::new(service, Credentials::new("router", "s3cret")));

    let (status, body) = send(
        app,
        authed("/nic/update?hostname=home.example.org&myip=192.0.2.1"),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Error fetching zone ID");
}
