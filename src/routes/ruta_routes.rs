//! Rutas del recurso Ruta
//!
//! Ciclo de vida completo: crear, iniciar, finalizar, cancelar y
//! reconciliar (empresas externas).

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::despacho_controller::DespachoController;
use crate::dto::empresa_dto::ApiResponse;
use crate::dto::reconciliacion_dto::{ReconciliacionResponse, ReconciliarRutaRequest};
use crate::dto::ruta_dto::{
    CancelarRutaResponse, CrearRutaRequest, IniciarRutaRequest, RutaDetalleResponse, RutaFilters,
    RutaResponse,
};
use crate::middleware::auth::{exigir_rol, AuthenticatedUser};
use crate::models::usuario::Rol;
use crate::repositories::ruta_repository::RutaRepository;
use crate::services::reconciliacion_service::ReconciliacionService;
use crate::services::ruta_lifecycle_service::RutaLifecycleService;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_ruta_router() -> Router<AppState> {
    Router::new()
        .route("/", post(crear_ruta).get(listar_rutas))
        .route("/:id", get(obtener_ruta))
        .route("/:id/iniciar", post(iniciar_ruta))
        .route("/:id/finalizar", post(finalizar_ruta))
        .route("/:id/cancelar", post(cancelar_ruta))
        .route("/:id/reconciliar", post(reconciliar_ruta))
}

async fn crear_ruta(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CrearRutaRequest>,
) -> Result<Json<ApiResponse<RutaDetalleResponse>>, AppError> {
    exigir_rol(&user, &[Rol::Admin, Rol::AdminBodega, Rol::SubBodega])?;
    let service = RutaLifecycleService::new(state.pool.clone());
    let ruta = service.crear(request, &user.username).await?;

    let despachos = DespachoController::new(state.pool.clone())
        .list_by_ruta(ruta.id)
        .await?;

    Ok(Json(ApiResponse::success_with_message(
        RutaDetalleResponse {
            ruta: RutaResponse::from(ruta),
            despachos,
        },
        "Ruta creada exitosamente".to_string(),
    )))
}

async fn obtener_ruta(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RutaDetalleResponse>, AppError> {
    let ruta = RutaLifecycleService::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Ruta '{}' no encontrada", id)))?;

    let despachos = DespachoController::new(state.pool.clone())
        .list_by_ruta(ruta.id)
        .await?;

    Ok(Json(RutaDetalleResponse {
        ruta: RutaResponse::from(ruta),
        despachos,
    }))
}

async fn listar_rutas(
    State(state): State<AppState>,
    Query(filters): Query<RutaFilters>,
) -> Result<Json<Vec<RutaResponse>>, AppError> {
    let rutas = RutaRepository::new(state.pool.clone()).list(&filters).await?;
    Ok(Json(rutas.into_iter().map(RutaResponse::from).collect()))
}

async fn iniciar_ruta(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<IniciarRutaRequest>,
) -> Result<Json<ApiResponse<RutaResponse>>, AppError> {
    exigir_rol(&user, &[Rol::Chofer, Rol::Admin, Rol::AdminBodega])?;
    let service = RutaLifecycleService::new(state.pool.clone());
    let ruta = service.iniciar(id, request, &user.username).await?;
    Ok(Json(ApiResponse::success_with_message(
        RutaResponse::from(ruta),
        "Ruta iniciada".to_string(),
    )))
}

async fn finalizar_ruta(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RutaResponse>>, AppError> {
    exigir_rol(&user, &[Rol::Chofer, Rol::Admin, Rol::AdminBodega])?;
    let service = RutaLifecycleService::new(state.pool.clone());
    let ruta = service.finalizar(id, &user.username).await?;
    Ok(Json(ApiResponse::success_with_message(
        RutaResponse::from(ruta),
        "Ruta finalizada".to_string(),
    )))
}

async fn cancelar_ruta(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CancelarRutaResponse>>, AppError> {
    exigir_rol(&user, &[Rol::Admin, Rol::AdminBodega, Rol::SubBodega])?;
    let service = RutaLifecycleService::new(state.pool.clone());
    let (ruta, despachos_liberados) = service.cancelar(id, &user.username).await?;
    Ok(Json(ApiResponse::success_with_message(
        CancelarRutaResponse {
            ruta: RutaResponse::from(ruta),
            despachos_liberados,
        },
        "Ruta cancelada".to_string(),
    )))
}

async fn reconciliar_ruta(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReconciliarRutaRequest>,
) -> Result<Json<ApiResponse<ReconciliacionResponse>>, AppError> {
    exigir_rol(&user, &[Rol::Admin, Rol::AdminBodega, Rol::SubBodega])?;
    let service = ReconciliacionService::new(state.pool.clone());
    let resultado = service.reconciliar(id, request, &user.username).await?;
    Ok(Json(ApiResponse::success_with_message(
        ReconciliacionResponse {
            ruta: RutaResponse::from(resultado.ruta),
            despachos_liberados: resultado.despachos_liberados,
            ruta_finalizada: resultado.ruta_finalizada,
            documentos_asignados: resultado.documentos_asignados,
        },
        "Ruta reconciliada".to_string(),
    )))
}
