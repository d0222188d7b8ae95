//! Máquina de estados de Despacho
//!
//! Transiciones del ciclo de vida de un despacho y registro de evidencia.
//! Cada operación verifica el estado actual dentro del alcance de la
//! mutación: los UPDATE condicionados del repositorio garantizan que dos
//! confirmaciones concurrentes sobre el mismo despacho terminan con
//! exactamente un ganador y un error de estado para el perdedor.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::despacho_dto::{RegistrarEntregaRequest, RegistrarNoEntregaRequest};
use crate::models::despacho::Despacho;
use crate::repositories::despacho_repository::{DespachoRepository, ResultadoLiberacion};
use crate::utils::errors::{invalid_state_error, AppError};

pub struct DespachoStateService {
    pool: PgPool,
    repository: DespachoRepository,
}

impl DespachoStateService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: DespachoRepository::new(pool.clone()),
            pool,
        }
    }

    /// Confirmar la entrega de un despacho asignado
    pub async fn marcar_entregado(
        &self,
        despacho_id: Uuid,
        request: RegistrarEntregaRequest,
        actor: &str,
    ) -> Result<Despacho, AppError> {
        request.validate()?;

        let actualizado = self
            .repository
            .marcar_entregado(
                despacho_id,
                request.receptor_rut,
                request.receptor_nombre,
                request.receptor_apellido,
                request.foto,
                request.firma,
                request.documento_externo,
                actor,
            )
            .await?;

        match actualizado {
            Some(despacho) => {
                info!(
                    "📦 Despacho {} entregado (folio {}) por {}",
                    despacho.id, despacho.folio, actor
                );
                Ok(despacho)
            }
            None => Err(self.diagnosticar(despacho_id, "marcar entregado").await?),
        }
    }

    /// Registrar la no entrega de un despacho asignado
    pub async fn marcar_no_entregado(
        &self,
        despacho_id: Uuid,
        request: RegistrarNoEntregaRequest,
        actor: &str,
    ) -> Result<Despacho, AppError> {
        request.validate()?;

        let actualizado = self
            .repository
            .marcar_no_entregado(
                despacho_id,
                request.motivo,
                request.observacion,
                request.foto,
                actor,
            )
            .await?;

        match actualizado {
            Some(despacho) => {
                info!(
                    "📦 Despacho {} no entregado: {} (por {})",
                    despacho.id,
                    despacho
                        .motivo_no_entrega
                        .map(|m| m.as_str())
                        .unwrap_or("sin motivo"),
                    actor
                );
                Ok(despacho)
            }
            None => Err(self.diagnosticar(despacho_id, "marcar no entregado").await?),
        }
    }

    /// Cancelación administrativa: detiene el despacho de forma definitiva
    pub async fn cancelar(&self, despacho_id: Uuid, actor: &str) -> Result<Despacho, AppError> {
        let actualizado = self.repository.cancelar(despacho_id, actor).await?;

        match actualizado {
            Some(despacho) => {
                info!("🚫 Despacho {} cancelado por {}", despacho.id, actor);
                Ok(despacho)
            }
            None => Err(self.diagnosticar(despacho_id, "cancelar").await?),
        }
    }

    /// Liberar un despacho: vuelve al pool de pendientes, desvinculado de su
    /// ruta. Idempotente sobre despachos ya pendientes.
    pub async fn liberar(
        &self,
        despacho_id: Uuid,
        actor: &str,
    ) -> Result<ResultadoLiberacion, AppError> {
        let mut tx = self.pool.begin().await?;
        let resultado = DespachoRepository::liberar(&mut tx, despacho_id, actor).await?;
        tx.commit().await?;

        if resultado == ResultadoLiberacion::Liberado {
            info!("🔓 Despacho {} liberado por {}", despacho_id, actor);
        }
        Ok(resultado)
    }

    /// Distinguir entre despacho inexistente y transición inválida cuando un
    /// UPDATE condicionado no afectó filas
    async fn diagnosticar(
        &self,
        despacho_id: Uuid,
        operacion: &str,
    ) -> Result<AppError, AppError> {
        match self.repository.find_by_id(despacho_id).await? {
            None => Ok(AppError::NotFound(format!(
                "Despacho '{}' no encontrado",
                despacho_id
            ))),
            Some(despacho) => Ok(invalid_state_error(
                "despacho",
                despacho.estado.as_str(),
                operacion,
            )),
        }
    }
}
