use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::state::AppState;
use crate::{auth, predict};

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(auth::router())
        .merge(predict::router())
        .route("/health", get(health))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr = config.bind_addr()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::json;
    use tower::ServiceExt;

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, req).await
    }

    fn app_with_state() -> (Router, AppState) {
        let state = AppState::fake();
        (build_app(state.clone()), state)
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (app, _) = app_with_state();
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn signup_then_signin_round_trip() {
        let (app, _) = app_with_state();
        let (status, body) = post_json(
            &app,
            "/signup",
            json!({"email": "ann@x.io", "password": "pw-1", "name": "Ann", "role": "doctor"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "User registered successfully"}));

        let (status, body) = post_json(
            &app,
            "/signin",
            json!({"email": "ann@x.io", "password": "pw-1", "role": "doctor"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"message": "Sign in successful", "name": "Ann", "role": "doctor"})
        );
    }

    #[tokio::test]
    async fn signup_missing_or_mistyped_field_is_400_and_stores_nothing() {
        let (app, state) = app_with_state();
        let bodies = [
            json!({"email": "ann@x.io", "password": "pw-1", "name": "Ann"}),
            json!({"email": "ann@x.io", "password": "pw-1", "name": "Ann", "role": 5}),
            json!({"email": "ann@x.io", "password": {"v": 1}, "name": "Ann", "role": "patient"}),
        ];
        for body in bodies {
            let (status, res) = post_json(&app, "/signup", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(res, json!({"error": "Missing fields"}));
        }
        assert!(state.users.find_by_email("ann@x.io").await.is_none());
    }

    #[tokio::test]
    async fn duplicate_signup_is_409_and_keeps_first() {
        let (app, state) = app_with_state();
        let first = json!({"email": "ann@x.io", "password": "first", "name": "Ann", "role": "patient"});
        let second = json!({"email": "ann@x.io", "password": "second", "name": "Impostor", "role": "doctor"});

        assert_eq!(post_json(&app, "/signup", first).await.0, StatusCode::OK);
        let (status, body) = post_json(&app, "/signup", second).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body, json!({"error": "User already exists"}));

        let stored = state.users.find_by_email("ann@x.io").await.unwrap();
        assert_eq!(stored.name, "Ann");
        assert_eq!(stored.role, "patient");

        let (status, _) = post_json(
            &app,
            "/signin",
            json!({"email": "ann@x.io", "password": "first", "role": "patient"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn signin_failures_share_one_response() {
        let (app, _) = app_with_state();
        post_json(
            &app,
            "/signup",
            json!({"email": "ann@x.io", "password": "pw-1", "name": "Ann", "role": "patient"}),
        )
        .await;

        let attempts = [
            json!({"email": "ann@x.io", "password": "pw-1", "role": "doctor"}),
            json!({"email": "ann@x.io", "password": "nope", "role": "patient"}),
            json!({"email": "nobody@x.io", "password": "pw-1", "role": "patient"}),
            json!({"password": "pw-1", "role": "patient"}),
            json!({"email": "ann@x.io", "password": 1234, "role": "patient"}),
        ];
        for attempt in attempts {
            let (status, body) = post_json(&app, "/signin", attempt).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body, json!({"error": "Invalid credentials"}));
        }
    }

    #[tokio::test]
    async fn predict_is_deterministic_and_bounded() {
        let (app, state) = app_with_state();
        let (status, first) = post_json(&app, "/predict", json!({"text": "fever and cough"})).await;
        assert_eq!(status, StatusCode::OK);
        let (_, second) = post_json(&app, "/predict", json!({"text": "fever and cough"})).await;
        assert_eq!(first, second);

        let disease = first["disease"].as_str().unwrap();
        assert!(state.predictor.classes().iter().any(|c| c == disease));
        let confidence = first["confidence"].as_f64().unwrap();
        assert!((0.0..=100.0).contains(&confidence));
    }

    #[tokio::test]
    async fn predict_without_text_is_400() {
        let (app, _) = app_with_state();
        for body in [json!({}), json!({"text": 42}), json!({"text": null})] {
            let (status, res) = post_json(&app, "/predict", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(res["error"].is_string());
        }
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let (app, _) = app_with_state();
        for uri in ["/signup", "/signin", "/predict"] {
            let req = Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"email\": "))
                .unwrap();
            let (status, body) = send(&app, req).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert!(body["error"].is_string());
        }
    }

    #[tokio::test]
    async fn missing_content_type_is_400() {
        let (app, _) = app_with_state();
        let req = Request::builder()
            .method("POST")
            .uri("/predict")
            .body(Body::from(r#"{"text": "fever"}"#))
            .unwrap();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
