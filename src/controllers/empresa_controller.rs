//! Controller de Empresas de Reparto

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::empresa_dto::{ApiResponse, CrearEmpresaRequest, EmpresaResponse};
use crate::repositories::empresa_repository::EmpresaRepository;
use crate::utils::errors::AppError;

pub struct EmpresaController {
    repository: EmpresaRepository,
}

impl EmpresaController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: EmpresaRepository::new(pool),
        }
    }

    pub async fn crear(
        &self,
        request: CrearEmpresaRequest,
    ) -> Result<ApiResponse<EmpresaResponse>, AppError> {
        request.validate()?;

        if self.repository.rut_exists(&request.rut).await? {
            return Err(AppError::Conflict(format!(
                "Ya existe una empresa con RUT '{}'",
                request.rut
            )));
        }

        if let Some(slug) = request.slug.as_deref() {
            if self.repository.slug_exists(slug).await? {
                return Err(AppError::Conflict(format!(
                    "Ya existe una empresa con slug '{}'",
                    slug
                )));
            }
        }

        let empresa = self
            .repository
            .create(
                request.rut,
                request.razon_social,
                request.usuario,
                request.telefono,
                request.email,
                request.slug,
                request.flota_propia,
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            EmpresaResponse::from(empresa),
            "Empresa registrada exitosamente".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<EmpresaResponse, AppError> {
        let empresa = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Empresa '{}' no encontrada", id)))?;

        Ok(EmpresaResponse::from(empresa))
    }

    pub async fn list(&self) -> Result<Vec<EmpresaResponse>, AppError> {
        let empresas = self.repository.list().await?;

        Ok(empresas.into_iter().map(EmpresaResponse::from).collect())
    }
}
