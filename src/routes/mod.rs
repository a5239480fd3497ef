pub mod products;

use axum::Router;

use crate::error::AppError;
use crate::state::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(products::routes())
        .fallback(unknown_route)
        .method_not_allowed_fallback(method_not_allowed)
}

// Known path, wrong verb: 405 with the uniform JSON error body instead
// of axum's empty default.
async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

async fn unknown_route() -> AppError {
    AppError::not_found("Route not found")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Metrics;
    use crate::store::MemoryProductStore;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        let state = AppState::new(Arc::new(MemoryProductStore::new()), Metrics::new());
        create_router().with_state(state)
    }

    fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder().method(method).uri(uri);
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn unsupported_method_returns_405_with_error_body() {
        let app = app();
        let (status, body) = send(&app, request(Method::PATCH, "/products", None)).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"], "Method not allowed");
    }

    #[tokio::test]
    async fn unknown_path_returns_404_with_error_body() {
        let app = app();
        let (status, body) = send(&app, request(Method::GET, "/inventory", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Route not found");
    }

    #[tokio::test]
    async fn crud_flow_over_http() {
        let app = app();

        // create
        let payload = json!({
            "product_id": "p1",
            "name": "Aspirin",
            "price": 9.90,
            "stock": 100
        });
        let (status, body) = send(&app, request(Method::POST, "/products", Some(payload))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["product_id"], "p1");
        assert!(body["message"].is_string());

        // get
        let (status, body) = send(&app, request(Method::GET, "/products/p1", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Aspirin");
        assert_eq!(body["active"], true);
        assert_eq!(body["stock"], 100);
        assert!(body["created_at"].is_string());
        assert!(body.get("updated_at").is_none());

        // partial update
        let (status, body) = send(
            &app,
            request(Method::PUT, "/products/p1", Some(json!({ "stock": 50 }))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["product"]["stock"], 50);
        assert!((body["product"]["price"].as_f64().unwrap() - 9.90).abs() < 1e-9);
        assert!(body["product"]["updated_at"].is_string());

        // delete, then the record is gone
        let (status, _) = send(&app, request(Method::DELETE, "/products/p1", None)).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = send(&app, request(Method::GET, "/products/p1", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Product not found");
    }

    #[tokio::test]
    async fn list_reports_count_and_token() {
        let app = app();
        for i in 0..3 {
            let payload = json!({
                "product_id": format!("p{i}"),
                "name": format!("product {i}"),
                "price": 1.0,
                "stock": 1
            });
            send(&app, request(Method::POST, "/products", Some(payload))).await;
        }

        let (status, body) = send(&app, request(Method::GET, "/products?limit=2", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert_eq!(body["products"].as_array().unwrap().len(), 2);
        assert!(body["lastKey"].is_string());

        let token = body["lastKey"].as_str().unwrap();
        let uri = format!(
            "/products?limit=2&lastKey={}",
            url_escape(token)
        );
        let (status, body) = send(&app, request(Method::GET, &uri, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["lastKey"], Value::Null);
    }

    #[tokio::test]
    async fn update_with_empty_body_is_rejected() {
        let app = app();
        let payload = json!({
            "product_id": "p1",
            "name": "Aspirin",
            "price": 9.90,
            "stock": 100
        });
        send(&app, request(Method::POST, "/products", Some(payload))).await;

        let (status, body) = send(
            &app,
            request(Method::PUT, "/products/p1", Some(json!({}))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Nothing to update");
    }

    // Minimal percent-encoding for the token's JSON characters.
    fn url_escape(raw: &str) -> String {
        raw.replace('%', "%25")
            .replace('"', "%22")
            .replace('{', "%7B")
            .replace('}', "%7D")
            .replace(':', "%3A")
            .replace(' ', "%20")
    }
}
