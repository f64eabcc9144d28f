//! Integration tests for the entity endpoints.
//!
//! Router tests drive the app in-process through `tower::ServiceExt`; the
//! HTTP tests bind a real listener on an ephemeral port.

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use paddock_server::config::Config;
use paddock_server::{app, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_app() -> Router {
    app(AppState::new(Config::default()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

// ============================================================================
// Router Tests
// ============================================================================

#[cfg(test)]
mod router_tests {
    use super::*;

    #[tokio::test]
    async fn test_health() {
        let app = test_app();
        let (status, body) = send(&app, Method::GET, "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["records"], 0);
        assert_eq!(body["kinds"], json!({}));
    }

    #[tokio::test]
    async fn test_health_reports_store_counts() {
        let app = app(AppState::new(Config::default().with_fail_kinds(["sale"])));
        for species in ["Broiler", "Catfish"] {
            let draft = json!({"species": species});
            send(&app, Method::POST, "/entities/batch", Some(draft)).await;
        }
        send(&app, Method::POST, "/entities/customer", Some(json!({"name": "Ade"}))).await;

        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["records"], 3);
        assert_eq!(body["kinds"], json!({"batch": 2, "customer": 1}));
        assert_eq!(body["failing_kinds"], json!(["sale"]));
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let app = test_app();

        let (status, created) = send(
            &app,
            Method::POST,
            "/entities/batch",
            Some(json!({"species": "Catfish", "status": "active", "quantity": 500})),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().unwrap();
        assert!(id.starts_with("batch_"));
        assert!(!paddock_engine::is_temp_id(id));
        assert_eq!(created["species"], "Catfish");
        assert!(created["createdAt"].is_string());

        let (status, listed) = send(&app, Method::GET, "/entities/batch", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed, json!([created]));
    }

    #[tokio::test]
    async fn test_get_update_delete() {
        let app = test_app();
        let (_, created) = send(
            &app,
            Method::POST,
            "/entities/customer",
            Some(json!({"name": "Ade Farms"})),
        )
        .await;
        let uri = format!("/entities/customer/{}", created["id"].as_str().unwrap());

        let (status, fetched) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);

        let (status, updated) = send(
            &app,
            Method::PATCH,
            &uri,
            Some(json!({"phone": "0801", "id": "ignored"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["id"], created["id"]);
        assert_eq!(updated["name"], "Ade Farms");
        assert_eq!(updated["phone"], "0801");

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not found");
    }

    #[tokio::test]
    async fn test_temporary_id_rejected() {
        let app = test_app();
        let temp = paddock_engine::generate_entity_temp_id("batch");
        let uri = format!("/entities/batch/{}", temp);

        for method in [Method::GET, Method::DELETE] {
            let (status, body) = send(&app, method, &uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "temporary id");
            assert_eq!(body["details"], temp.as_str());
        }

        let (status, _) = send(&app, Method::PATCH, &uri, Some(json!({"status": "sold"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_kind_and_body() {
        let app = test_app();

        let (status, body) = send(&app, Method::GET, "/entities/Batch", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid entity kind");

        let (status, _) = send(&app, Method::POST, "/entities/batch", Some(json!("Broiler"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, listed) = send(&app, Method::GET, "/entities/batch", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed, json!([]));
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let app = app(AppState::new(Config::default().with_fail_kinds(["sale"])));

        let (status, body) =
            send(&app, Method::POST, "/entities/sale", Some(json!({"total": 45}))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["details"], "sale");

        let (status, _) = send(&app, Method::GET, "/entities/sale", None).await;
        assert_eq!(status, StatusCode::OK);
    }
}

// ============================================================================
// HTTP Tests
// ============================================================================

#[cfg(test)]
mod http_tests {
    use super::*;

    async fn spawn_server() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, test_app()).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_round_trip_over_http() {
        let base = spawn_server().await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{}/entities/inventory", base))
            .json(&json!({"item": "Feed", "unit": "kg", "quantity": 25}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        let created: Value = response.json().await.unwrap();

        let listed: Vec<Value> = client
            .get(format!("{}/entities/inventory", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(listed, vec![created]);
    }

    #[tokio::test]
    async fn test_cors_headers() {
        let base = spawn_server().await;
        let response = reqwest::Client::new()
            .get(format!("{}/health", base))
            .header("origin", "http://localhost:5173")
            .send()
            .await
            .unwrap();

        assert!(response
            .headers()
            .contains_key("access-control-allow-origin"));
    }
}
