//! Smoke tests de la superficie HTTP
//!
//! Verifican el contrato de enrutamiento sin base de datos: health check,
//! manejo de rutas desconocidas y el envelope de error que comparten todos
//! los endpoints protegidos.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    middleware::{from_fn, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app();
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["service"], "despacho-tracking");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_ruta_desconocida_devuelve_404() {
    let app = create_test_app();
    let response = app
        .oneshot(
            Request::get("/api/no-existe")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_endpoint_protegido_sin_token_devuelve_401() {
    let app = create_test_app();
    let response = app
        .oneshot(
            Request::post("/api/despachos")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_endpoint_protegido_con_token_pasa_el_middleware() {
    let app = create_test_app();
    let response = app
        .oneshot(
            Request::post("/api/despachos")
                .header(header::AUTHORIZATION, "Bearer token-de-prueba")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

// App de test con la misma estructura del router real: endpoints públicos y
// subtree protegido por un middleware de Bearer token
fn create_test_app() -> Router {
    let publico = Router::new().route(
        "/health",
        get(|| async {
            Json(json!({
                "service": "despacho-tracking",
                "status": "healthy",
            }))
        }),
    );

    let protegido = Router::new()
        .route("/api/despachos", post(|| async { Json(json!({"success": true})) }))
        .layer(from_fn(require_bearer));

    publico.merge(protegido)
}

async fn require_bearer(request: Request<Body>, next: Next) -> Response {
    let autorizado = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("Bearer "))
        .unwrap_or(false);

    if !autorizado {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "Unauthorized",
                "message": "Token de autorización requerido",
                "code": "UNAUTHORIZED",
            })),
        )
            .into_response();
    }

    next.run(request).await
}
