// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceExt;
use workout_atlas::config::Config;
use workout_atlas::db::MemoryStore;
use workout_atlas::routes::create_router;
use workout_atlas::services::{
    event_loop, GoogleGeocoder, SessionController, ViewRenderer, WorkoutRepository,
};
use workout_atlas::AppState;

/// Create a test app backed by `store`, with geocoding disabled.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(store: MemoryStore) -> (Router, Arc<AppState>) {
    let geocoder = GoogleGeocoder::new(None, "http://127.0.0.1:9").unwrap();
    create_test_app_with_geocoder(store, geocoder)
}

/// Create a test app with a specific geocoder.
#[allow(dead_code)]
pub fn create_test_app_with_geocoder(
    store: MemoryStore,
    geocoder: GoogleGeocoder,
) -> (Router, Arc<AppState>) {
    let config = Config::default();
    let controller = SessionController::new(WorkoutRepository::new(store), ViewRenderer::new())
        .with_zoom(config.map_zoom);
    let (session, _join) = event_loop::spawn(controller, geocoder);

    let state = Arc::new(AppState { config, session });

    (create_router(state.clone()), state)
}

/// Send a request and return the status and JSON body (`Null` if empty).
#[allow(dead_code)]
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[allow(dead_code)]
pub fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[allow(dead_code)]
pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Report the initial position so map clicks are accepted.
#[allow(dead_code)]
pub async fn init_map(app: &Router) {
    let (status, _) = send(
        app,
        json_request(
            "POST",
            "/api/position",
            serde_json::json!({"lat": 48.85, "lng": 2.35}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

/// Start a local stand-in for the geocoding API that always answers with
/// `status` and `body`. Returns its URL.
#[allow(dead_code)]
pub async fn spawn_fake_geocoder(status: StatusCode, body: &'static str) -> String {
    let app = Router::new().route(
        "/geocode/json",
        get(move || async move {
            (
                status,
                [(header::CONTENT_TYPE, "application/json")],
                body,
            )
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/geocode/json", addr)
}

/// Stand-in geocoding API that echoes the `latlng` and `key` query values.
#[allow(dead_code)]
pub async fn spawn_echo_geocoder() -> String {
    let app = Router::new().route(
        "/geocode/json",
        get(
            |axum::extract::Query(params): axum::extract::Query<
                std::collections::HashMap<String, String>,
            >| async move {
                let latlng = params.get("latlng").cloned().unwrap_or_default();
                let key = params.get("key").cloned().unwrap_or_default();
                Json(serde_json::json!({
                    "results": [{"formatted_address": format!("{} via {}", latlng, key)}],
                    "status": "OK"
                }))
            },
        ),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/geocode/json", addr)
}

/// Stand-in geocoding API that accepts requests and never answers.
#[allow(dead_code)]
pub async fn spawn_stalled_geocoder() -> String {
    let app = Router::new().route(
        "/geocode/json",
        get(|| async {
            std::future::pending::<()>().await;
            StatusCode::OK
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/geocode/json", addr)
}
