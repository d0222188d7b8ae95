//! Routers de la API
//!
//! Este módulo arma el router principal: endpoints públicos (health, login,
//! catálogos) y endpoints protegidos por el middleware JWT.

pub mod auth_routes;
pub mod catalogo_routes;
pub mod despacho_routes;
pub mod empresa_routes;
pub mod ruta_routes;

use axum::{middleware::from_fn_with_state, routing::get, Json, Router};
use serde_json::json;

use crate::middleware::auth::auth_middleware;
use crate::middleware::cors::cors_layer;
use crate::state::AppState;

/// Crear el router principal de la API
pub fn create_api_router(state: AppState) -> Router {
    let publico = Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth_routes::create_auth_router())
        .nest("/api/catalogo", catalogo_routes::create_catalogo_router());

    let protegido = Router::new()
        .nest("/api/despachos", despacho_routes::create_despacho_router())
        .nest("/api/rutas", ruta_routes::create_ruta_router())
        .nest("/api/empresas", empresa_routes::create_empresa_router())
        .layer(from_fn_with_state(state.clone(), auth_middleware));

    publico
        .merge(protegido)
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}

/// Health check del servicio
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "service": "despacho-tracking",
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
