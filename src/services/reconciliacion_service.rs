//! Servicio de Reconciliación
//!
//! Las empresas externas informan resultados fuera de banda (teléfono,
//! correo, portal) en lugar de confirmar parada por parada desde la app del
//! chofer. Este servicio permite reconciliar una ruta contra esa
//! información: liberar despachos reportados como no entregables y cerrar la
//! ruta con la semántica relajada (sin exigir que todos los despachos estén
//! en estado terminal).
//!
//! La operación es idempotente: repetir la misma reconciliación no produce
//! errores ni dobles liberaciones.

use sqlx::PgPool;
use std::collections::HashSet;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::reconciliacion_dto::ReconciliarRutaRequest;
use crate::models::ruta::{EstadoRuta, Ruta};
use crate::repositories::despacho_repository::{DespachoRepository, ResultadoLiberacion};
use crate::repositories::empresa_repository::EmpresaRepository;
use crate::repositories::ruta_repository::RutaRepository;
use crate::utils::errors::{invalid_state_error, AppError};

/// La finalización por reconciliación acepta cualquier estado no terminal,
/// a diferencia de la finalización estricta del ciclo de vida, que sólo
/// acepta `iniciada` y exige despachos terminales.
fn permite_finalizacion_relajada(estado: EstadoRuta) -> bool {
    !estado.es_terminal()
}

/// Resultado de una reconciliación
#[derive(Debug)]
pub struct Reconciliacion {
    pub ruta: Ruta,
    pub despachos_liberados: u64,
    pub ruta_finalizada: bool,
    pub documentos_asignados: u64,
}

pub struct ReconciliacionService {
    pool: PgPool,
    empresa_repository: EmpresaRepository,
}

impl ReconciliacionService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            empresa_repository: EmpresaRepository::new(pool.clone()),
            pool,
        }
    }

    pub async fn reconciliar(
        &self,
        ruta_id: Uuid,
        request: ReconciliarRutaRequest,
        actor: &str,
    ) -> Result<Reconciliacion, AppError> {
        request.validate()?;

        let mut tx = self.pool.begin().await?;

        let ruta = RutaRepository::find_by_id_for_update(&mut tx, ruta_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ruta '{}' no encontrada", ruta_id)))?;

        let empresa = self
            .empresa_repository
            .find_by_id(ruta.empresa_reparto)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Empresa de reparto '{}' no encontrada",
                    ruta.empresa_reparto
                ))
            })?;

        // La reconciliación no puede usarse para saltarse la confirmación
        // del chofer en flotas propias
        if !empresa.usa_reconciliacion() {
            return Err(AppError::Forbidden(format!(
                "La ruta '{}' pertenece a una empresa de flota propia; \
                 los resultados se registran desde la app del chofer",
                ruta.numero
            )));
        }

        let a_liberar: HashSet<Uuid> = request.despachos_a_liberar.iter().copied().collect();
        let mut despachos_liberados: u64 = 0;
        for despacho_id in &a_liberar {
            match DespachoRepository::liberar(&mut tx, *despacho_id, actor).await? {
                ResultadoLiberacion::Liberado => despachos_liberados += 1,
                ResultadoLiberacion::YaPendiente => {}
            }
        }

        let mut ruta_finalizada = false;
        let mut documentos_asignados: u64 = 0;
        let mut ruta_final = ruta;

        if request.finalizar_ruta {
            let estado_previo = ruta_final.estado;
            if estado_previo == EstadoRuta::Finalizada {
                // ya cerrada por una reconciliación anterior
            } else if !permite_finalizacion_relajada(estado_previo) {
                return Err(invalid_state_error(
                    "ruta",
                    estado_previo.as_str(),
                    "finalizar por reconciliación",
                ));
            } else {
                ruta_final = RutaRepository::finalizar_relajado(&mut tx, ruta_id, actor)
                    .await?
                    .ok_or_else(|| {
                        invalid_state_error(
                            "ruta",
                            estado_previo.as_str(),
                            "finalizar por reconciliación",
                        )
                    })?;
                ruta_finalizada = true;
            }

            if let Some(documento) = request.documento_externo.as_deref() {
                documentos_asignados = DespachoRepository::asignar_documento_externo(
                    &mut tx, ruta_id, documento, actor,
                )
                .await?;
            }
        }

        tx.commit().await?;

        info!(
            "🔄 Ruta {} reconciliada: {} liberados, finalizada={}, documentos={} (por {})",
            ruta_final.numero, despachos_liberados, ruta_finalizada, documentos_asignados, actor
        );

        Ok(Reconciliacion {
            ruta: ruta_final,
            despachos_liberados,
            ruta_finalizada,
            documentos_asignados,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Las dos vías de finalización divergen a propósito: la reconciliación
    /// cierra rutas que la finalización estricta rechazaría.
    #[test]
    fn test_finalizacion_relajada_diverge_de_la_estricta() {
        assert!(permite_finalizacion_relajada(EstadoRuta::Pendiente));
        assert!(!EstadoRuta::Pendiente.permite_finalizacion());

        assert!(permite_finalizacion_relajada(EstadoRuta::Pausada));
        assert!(!EstadoRuta::Pausada.permite_finalizacion());

        // coinciden en iniciada y en los estados terminales
        assert!(permite_finalizacion_relajada(EstadoRuta::Iniciada));
        assert!(EstadoRuta::Iniciada.permite_finalizacion());
        assert!(!permite_finalizacion_relajada(EstadoRuta::Finalizada));
        assert!(!permite_finalizacion_relajada(EstadoRuta::Cancelada));
    }
}
