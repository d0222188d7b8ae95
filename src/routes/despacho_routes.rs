//! Rutas de despachos
//!
//! Lectura/alta vía controller; las transiciones de estado pasan por la
//! máquina de estados de despachos.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::despacho_controller::DespachoController;
use crate::dto::despacho_dto::{
    CrearDespachoRequest, DespachoFilters, DespachoResponse, RegistrarEntregaRequest,
    RegistrarNoEntregaRequest,
};
use crate::dto::empresa_dto::ApiResponse;
use crate::middleware::auth::{exigir_rol, AuthenticatedUser};
use crate::models::usuario::Rol;
use crate::repositories::despacho_repository::ResultadoLiberacion;
use crate::services::despacho_state_service::DespachoStateService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_despacho_router() -> Router<AppState> {
    Router::new()
        .route("/", post(crear_despacho).get(listar_despachos))
        .route("/:id", get(obtener_despacho))
        .route("/:id/entrega", post(registrar_entrega))
        .route("/:id/no-entrega", post(registrar_no_entrega))
        .route("/:id/liberar", post(liberar_despacho))
        .route("/:id/cancelar", post(cancelar_despacho))
}

async fn crear_despacho(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CrearDespachoRequest>,
) -> Result<Json<ApiResponse<DespachoResponse>>, AppError> {
    exigir_rol(&user, &[Rol::Admin, Rol::AdminBodega, Rol::SubBodega])?;
    let controller = DespachoController::new(state.pool.clone());
    let response = controller.crear(request).await?;
    Ok(Json(response))
}

async fn obtener_despacho(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DespachoResponse>, AppError> {
    let controller = DespachoController::new(state.pool.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}

async fn listar_despachos(
    State(state): State<AppState>,
    Query(filters): Query<DespachoFilters>,
) -> Result<Json<Vec<DespachoResponse>>, AppError> {
    let controller = DespachoController::new(state.pool.clone());
    let response = controller.list(filters).await?;
    Ok(Json(response))
}

async fn registrar_entrega(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<RegistrarEntregaRequest>,
) -> Result<Json<ApiResponse<DespachoResponse>>, AppError> {
    exigir_rol(&user, &[Rol::Chofer, Rol::Admin, Rol::AdminBodega])?;
    let service = DespachoStateService::new(state.pool.clone());
    let despacho = service.marcar_entregado(id, request, &user.username).await?;
    Ok(Json(ApiResponse::success_with_message(
        DespachoResponse::from(despacho),
        "Entrega registrada exitosamente".to_string(),
    )))
}

async fn registrar_no_entrega(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<RegistrarNoEntregaRequest>,
) -> Result<Json<ApiResponse<DespachoResponse>>, AppError> {
    exigir_rol(&user, &[Rol::Chofer, Rol::Admin, Rol::AdminBodega])?;
    let service = DespachoStateService::new(state.pool.clone());
    let despacho = service
        .marcar_no_entregado(id, request, &user.username)
        .await?;
    Ok(Json(ApiResponse::success_with_message(
        DespachoResponse::from(despacho),
        "No entrega registrada".to_string(),
    )))
}

async fn liberar_despacho(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DespachoResponse>>, AppError> {
    exigir_rol(&user, &[Rol::Admin, Rol::AdminBodega, Rol::SubBodega])?;
    let service = DespachoStateService::new(state.pool.clone());
    let resultado = service.liberar(id, &user.username).await?;

    let despacho = DespachoController::new(state.pool.clone())
        .get_by_id(id)
        .await?;
    let mensaje = match resultado {
        ResultadoLiberacion::Liberado => "Despacho liberado al pool de pendientes",
        ResultadoLiberacion::YaPendiente => "El despacho ya estaba pendiente",
    };
    Ok(Json(ApiResponse::success_with_message(
        despacho,
        mensaje.to_string(),
    )))
}

async fn cancelar_despacho(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DespachoResponse>>, AppError> {
    exigir_rol(&user, &[Rol::Admin, Rol::AdminBodega])?;
    let service = DespachoStateService::new(state.pool.clone());
    let despacho = service.cancelar(id, &user.username).await?;
    Ok(Json(ApiResponse::success_with_message(
        DespachoResponse::from(despacho),
        "Despacho cancelado".to_string(),
    )))
}
