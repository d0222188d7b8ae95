//! Rutas de empresas de reparto

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::empresa_controller::EmpresaController;
use crate::dto::empresa_dto::{ApiResponse, CrearEmpresaRequest, EmpresaResponse};
use crate::middleware::auth::{exigir_rol, AuthenticatedUser};
use crate::models::usuario::Rol;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_empresa_router() -> Router<AppState> {
    Router::new()
        .route("/", post(crear_empresa).get(listar_empresas))
        .route("/:id", get(obtener_empresa))
}

async fn crear_empresa(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CrearEmpresaRequest>,
) -> Result<Json<ApiResponse<EmpresaResponse>>, AppError> {
    exigir_rol(&user, &[Rol::Admin])?;
    let controller = EmpresaController::new(state.pool.clone());
    let response = controller.crear(request).await?;
    Ok(Json(response))
}

async fn obtener_empresa(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EmpresaResponse>, AppError> {
    let controller = EmpresaController::new(state.pool.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}

async fn listar_empresas(
    State(state): State<AppState>,
) -> Result<Json<Vec<EmpresaResponse>>, AppError> {
    let controller = EmpresaController::new(state.pool.clone());
    let response = controller.list().await?;
    Ok(Json(response))
}
