//! Rutas de catálogos
//!
//! Metadata del dominio (motivos, estados y su presentación) para las capas
//! de UI. Endpoints públicos de sólo lectura.

use axum::{routing::get, Json, Router};

use crate::models::catalogo::{self, EstadoDisplay, MotivoDisplay};
use crate::state::AppState;

pub fn create_catalogo_router() -> Router<AppState> {
    Router::new()
        .route("/motivos-no-entrega", get(listar_motivos))
        .route("/estados-despacho", get(listar_estados_despacho))
        .route("/estados-ruta", get(listar_estados_ruta))
}

pub async fn listar_motivos() -> Json<Vec<MotivoDisplay>> {
    Json(catalogo::motivos_no_entrega())
}

pub async fn listar_estados_despacho() -> Json<Vec<EstadoDisplay>> {
    Json(catalogo::estados_despacho())
}

pub async fn listar_estados_ruta() -> Json<Vec<EstadoDisplay>> {
    Json(catalogo::estados_ruta())
}
