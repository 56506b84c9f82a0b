use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use municipal_fleet::config::EnvironmentConfig;
use municipal_fleet::models::Collection;
use municipal_fleet::repositories::InMemoryCollectionClient;
use municipal_fleet::routes::create_app_router;
use municipal_fleet::services::JwtService;
use municipal_fleet::state::AppState;
use municipal_fleet::storage::LocalBlobStore;

const PASSWORD: &str = "secret-password";

fn row(value: Value) -> serde_json::Map<String, Value> {
    value.as_object().cloned().unwrap()
}

fn user_row(email: &str, role: &str) -> serde_json::Map<String, Value> {
    row(json!({
        "id": Uuid::new_v4(),
        "email": email,
        "full_name": email.split('@').next().unwrap(),
        "role": role,
        "password_hash": bcrypt::hash(PASSWORD, 4).unwrap(),
    }))
}

async fn create_test_app() -> Router {
    let config = EnvironmentConfig::from_lookup(|key| match key {
        "STORE_BACKEND" => Some("memory".to_string()),
        "ENVIRONMENT" => Some("test".to_string()),
        "JWT_SECRET" => Some("test-secret".to_string()),
        _ => None,
    })
    .unwrap();

    let store = InMemoryCollectionClient::new();
    store
        .seed(
            Collection::Users,
            vec![
                user_row("admin@fleet.test", "admin"),
                user_row("staff@fleet.test", "staff"),
            ],
        )
        .await;
    let vehicles = (1..=25)
        .map(|i| {
            row(json!({
                "id": Uuid::new_v4(),
                "registration_number": format!("CA {}", i),
                "make": if i <= 3 { "Scania" } else { "Toyota" },
                "vin": format!("1HGCM82633A{:06}", i),
                "status": "active",
            }))
        })
        .collect();
    store.seed(Collection::Vehicles, vehicles).await;

    let jwt = JwtService::new(&config.jwt_secret, config.jwt_expiration);
    let blob_root = std::env::temp_dir().join(format!("fleet-api-{}", Uuid::new_v4()));
    let blobs = Arc::new(LocalBlobStore::new(blob_root, jwt.clone()));

    create_app_router(AppState::new(Arc::new(store), blobs, jwt, config))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>, axum::http::HeaderMap) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec(), headers)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn send_json(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn login(app: &Router, email: &str) -> String {
    let (status, body, _) = send(
        app,
        send_json(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": email, "password": PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app().await;
    let (status, body, _) = send(&app, get("/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_login_with_wrong_password_is_rejected() {
    let app = create_test_app().await;
    let (status, _, _) = send(
        &app,
        send_json(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "admin@fleet.test", "password": "nope" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_collections_require_session() {
    let app = create_test_app().await;
    let (status, _, _) = send(&app, get("/api/vehicles", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(&app, get("/api/vehicles", Some("not-a-token"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_navigation_for_role() {
    let app = create_test_app().await;
    let token = login(&app, "staff@fleet.test").await;
    let (status, body, _) = send(&app, get("/api/auth/me", Some(&token))).await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["data"]["user"]["role"], "staff");
    assert!(body["data"]["user"].get("password_hash").is_none());
    let keys: Vec<&str> = body["data"]["navigation"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["key"].as_str().unwrap())
        .collect();
    assert!(keys.contains(&"vehicles"));
    assert!(!keys.contains(&"users"));
}

#[tokio::test]
async fn test_list_pages_and_search() {
    let app = create_test_app().await;
    let token = login(&app, "admin@fleet.test").await;

    let (status, body, _) = send(&app, get("/api/vehicles", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 10);
    assert_eq!(body["data"]["page_count"], 3);
    assert_eq!(body["data"]["summary"]["total_vehicles"], 25.0);

    let (_, body, _) = send(
        &app,
        get("/api/vehicles?search=scania&page=3", Some(&token)),
    )
    .await;
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["data"]["page"], 1);
    assert_eq!(body["data"]["filtered_count"], 3);
}

#[tokio::test]
async fn test_invalid_query_parameter_is_bad_request() {
    let app = create_test_app().await;
    let token = login(&app, "admin@fleet.test").await;
    let (status, _, _) = send(&app, get("/api/vehicles?page=abc", Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_csv_export_is_attachment() {
    let app = create_test_app().await;
    let token = login(&app, "admin@fleet.test").await;
    let (status, body, headers) = send(&app, get("/api/vehicles/export", Some(&token))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("vehicles_"));

    let csv = String::from_utf8(body).unwrap();
    assert_eq!(csv.lines().count(), 26);
}

#[tokio::test]
async fn test_create_validation_error_is_bad_request() {
    let app = create_test_app().await;
    let token = login(&app, "admin@fleet.test").await;
    let (status, body, _) = send(
        &app,
        send_json("POST", "/api/vehicles", Some(&token), json!({ "make": "Ford" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_create_then_fetch_vehicle() {
    let app = create_test_app().await;
    let token = login(&app, "staff@fleet.test").await;
    let (status, body, _) = send(
        &app,
        send_json(
            "POST",
            "/api/vehicles",
            Some(&token),
            json!({ "registration_number": "CA 999", "make": "Ford" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["data"]["status"], "active");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body, _) = send(&app, get(&format!("/api/vehicles/{}", id), Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["data"]["registration_number"], "CA 999");
}

#[tokio::test]
async fn test_staff_cannot_delete_or_view_users() {
    let app = create_test_app().await;
    let token = login(&app, "staff@fleet.test").await;

    let (_, body, _) = send(&app, get("/api/vehicles?page_size=1", Some(&token))).await;
    let body: Value = serde_json::from_slice(&body).unwrap();
    let id = body["data"]["items"][0]["id"].as_str().unwrap().to_string();

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/vehicles/{}", id))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = send(&app, get("/api/users", Some(&token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_document_upload_and_signed_download() {
    let app = create_test_app().await;
    let token = login(&app, "admin@fleet.test").await;
    let (status, body, _) = send(
        &app,
        send_json(
            "POST",
            "/api/documents/upload",
            Some(&token),
            json!({
                "title": "Insurance 2026",
                "document_type": "insurance",
                "expiry_date": "2026-12-31",
                "file_name": "poliza.pdf",
                "content_base64": "aGVsbG8gZmxlZXQ=",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["data"]["document"]["title"], "Insurance 2026");
    let url = body["data"]["download"]["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/files/"));

    // La descarga no necesita sesión
    let (status, bytes, headers) = send(&app, get(&url, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"hello fleet");
    assert!(headers[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("poliza.pdf"));

    let (status, _, _) = send(&app, get("/files/forged-token", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_staff_list_and_export_omit_vin() {
    let app = create_test_app().await;
    let token = login(&app, "staff@fleet.test").await;

    let (status, body, _) = send(&app, get("/api/vehicles", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    let first = &body["data"]["items"][0];
    assert!(first.get("registration_number").is_some());
    assert!(first.get("vin").is_none());

    let (_, body, _) = send(
        &app,
        get("/api/vehicles?search=1HGCM82633A", Some(&token)),
    )
    .await;
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["data"]["filtered_count"], 0);

    let (status, body, _) = send(&app, get("/api/vehicles/export", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let csv = String::from_utf8(body).unwrap();
    assert!(!csv.lines().next().unwrap().contains("vin"));
    assert!(!csv.contains("1HGCM82633A"));
}

#[tokio::test]
async fn test_update_can_clear_optional_field() {
    let app = create_test_app().await;
    let token = login(&app, "admin@fleet.test").await;
    let (_, body, _) = send(
        &app,
        send_json(
            "POST",
            "/api/vehicles",
            Some(&token),
            json!({ "registration_number": "CA 500", "make": "Ford", "department": "Roads" }),
        ),
    )
    .await;
    let body: Value = serde_json::from_slice(&body).unwrap();
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body, _) = send(
        &app,
        send_json(
            "PUT",
            &format!("/api/vehicles/{}", id),
            Some(&token),
            json!({ "department": null }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert!(body["data"]["department"].is_null());
    assert_eq!(body["data"]["make"], "Ford");

    let (status, _, _) = send(
        &app,
        send_json(
            "PUT",
            &format!("/api/vehicles/{}", id),
            Some(&token),
            json!({ "registration_number": null }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generic_document_create_ignores_file_path() {
    let app = create_test_app().await;
    let token = login(&app, "admin@fleet.test").await;
    let (status, body, _) = send(
        &app,
        send_json(
            "POST",
            "/api/documents",
            Some(&token),
            json!({
                "title": "Borrowed",
                "document_type": "insurance",
                "file_path": "documents/someone-else.pdf",
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
}
