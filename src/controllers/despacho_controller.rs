//! Controller de Despachos
//!
//! Lado de lectura y alta administrativa. Las transiciones de estado viven
//! en los services, no aquí.

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::despacho_dto::{CrearDespachoRequest, DespachoFilters, DespachoResponse};
use crate::dto::empresa_dto::ApiResponse;
use crate::repositories::despacho_repository::DespachoRepository;
use crate::utils::errors::AppError;

pub struct DespachoController {
    repository: DespachoRepository,
}

impl DespachoController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: DespachoRepository::new(pool),
        }
    }

    /// Alta de despacho: el punto donde la sincronización de pedidos
    /// deposita los registros. Nacen en estado `pendiente`.
    pub async fn crear(
        &self,
        request: CrearDespachoRequest,
    ) -> Result<ApiResponse<DespachoResponse>, AppError> {
        request.validate()?;

        let despacho = self
            .repository
            .create(
                request.folio,
                request.cliente_nombre,
                request.cliente_codigo,
                request.direccion,
                request.comentarios,
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            DespachoResponse::from(despacho),
            "Despacho registrado exitosamente".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<DespachoResponse, AppError> {
        let despacho = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Despacho '{}' no encontrado", id)))?;

        Ok(DespachoResponse::from(despacho))
    }

    pub async fn list(&self, filters: DespachoFilters) -> Result<Vec<DespachoResponse>, AppError> {
        let despachos = self.repository.list(&filters).await?;

        Ok(despachos.into_iter().map(DespachoResponse::from).collect())
    }

    /// Despachos de una ruta en su orden de visita
    pub async fn list_by_ruta(&self, ruta_id: Uuid) -> Result<Vec<DespachoResponse>, AppError> {
        let despachos = self.repository.find_by_ruta(ruta_id).await?;

        Ok(despachos.into_iter().map(DespachoResponse::from).collect())
    }
}
