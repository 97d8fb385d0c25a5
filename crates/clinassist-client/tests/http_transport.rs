use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use clinassist_client::{ApiClient, ApiRequest, ClientError, HttpTransport, Transport};
use serde_json::{Value, json};

async fn spawn_backend() -> String {
    let app = Router::new()
        .route(
            "/patients/{id}",
            get(|Path(id): Path<i64>, headers: HeaderMap| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                if id == 404 {
                    return Err(StatusCode::NOT_FOUND);
                }
                Ok(Json(json!({"id": id, "authorization": auth})))
            }),
        )
        .route(
            "/patients/search",
            get(
                |Query(params): Query<std::collections::HashMap<String, String>>| async move {
                    Json(json!({"q": params.get("q"), "page": params.get("page")}))
                },
            ),
        )
        .route(
            "/auth/refresh",
            post(|headers: HeaderMap| async move {
                let token = headers
                    .get("x-refresh-token")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                Json(json!({"refreshToken": token}))
            }),
        )
        .route(
            "/patients",
            post(|Json(body): Json<Value>| async move {
                (StatusCode::CREATED, Json(json!({"id": 1, "echo": body})))
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(base: &str) -> ApiClient {
    let transport = HttpTransport::new(base, Duration::from_secs(5)).unwrap();
    ApiClient::new(std::sync::Arc::new(transport))
}

#[tokio::test]
async fn sends_bearer_over_http() {
    let base = spawn_backend().await;
    let api = client(&base);
    api.set_token(Some("tok-1".into()));

    let body: Value = api.get("/patients/12", &[]).await.unwrap();

    assert_eq!(body["id"], 12);
    assert_eq!(body["authorization"], "Bearer tok-1");
}

#[tokio::test]
async fn encodes_query_string() {
    let base = spawn_backend().await;
    let api = client(&base);

    let body: Value = api
        .get(
            "/patients/search",
            &[("q", "dupont marie".to_string()), ("page", "2".to_string())],
        )
        .await
        .unwrap();

    assert_eq!(body["q"], "dupont marie");
    assert_eq!(body["page"], "2");
}

#[tokio::test]
async fn forwards_custom_headers() {
    let base = spawn_backend().await;
    let transport = HttpTransport::new(&base, Duration::from_secs(5)).unwrap();

    let response = transport
        .send(ApiRequest::post("/auth/refresh").header("X-Refresh-Token", "r-9"))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    let body: Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(body["refreshToken"], "r-9");
}

#[tokio::test]
async fn posts_json_body() {
    let base = spawn_backend().await;
    let api = client(&base);

    let body: Value = api
        .post("/patients", &json!({"firstName": "Lea"}))
        .await
        .unwrap();

    assert_eq!(body["echo"]["firstName"], "Lea");
}

#[tokio::test]
async fn missing_resource_is_not_found() {
    let base = spawn_backend().await;
    let api = client(&base);

    let err = api.get::<Value>("/patients/404", &[]).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_ignored() {
    let base = spawn_backend().await;
    let transport = HttpTransport::new(&format!("{base}/"), Duration::from_secs(5)).unwrap();
    assert_eq!(transport.base_url(), base);
}

#[tokio::test]
async fn unreachable_backend_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = client(&format!("http://{addr}"));
    let err = api.get::<Value>("/patients/1", &[]).await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
}
