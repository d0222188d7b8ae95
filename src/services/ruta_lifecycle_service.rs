//! Ciclo de vida de Ruta
//!
//! Crear, iniciar, finalizar y cancelar rutas. Este servicio es el dueño del
//! invariante entre ruta y despachos: la vinculación al crear y la
//! liberación al cancelar ocurren dentro de la misma transacción que el
//! cambio de estado de la ruta, de modo que ningún lector puede observar una
//! ruta cancelada con despachos todavía asignados ni una liberación parcial.

use chrono::{Datelike, Utc};
use sqlx::PgPool;
use std::collections::HashSet;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::dto::ruta_dto::{CrearRutaRequest, IniciarRutaRequest};
use crate::models::despacho::Despacho;
use crate::models::empresa_reparto::EmpresaReparto;
use crate::models::ruta::{formatear_numero_ruta, Ruta};
use crate::repositories::despacho_repository::DespachoRepository;
use crate::repositories::empresa_repository::EmpresaRepository;
use crate::repositories::ruta_repository::RutaRepository;
use crate::utils::errors::{
    despachos_no_disponibles_error, invalid_state_error, AppError,
};

/// Ids solicitados que no pueden asignarse: no existen, no están pendientes
/// o ya pertenecen a otra ruta
fn despachos_no_disponibles(solicitados: &[Uuid], encontrados: &[Despacho]) -> Vec<Uuid> {
    let disponibles: HashSet<Uuid> = encontrados
        .iter()
        .filter(|d| d.esta_disponible())
        .map(|d| d.id)
        .collect();

    solicitados
        .iter()
        .filter(|id| !disponibles.contains(*id))
        .copied()
        .collect()
}

/// Reglas de chofer según el tipo de empresa. Devuelve el flag efectivo de
/// chofer externo.
fn resolver_chofer(
    empresa: &EmpresaReparto,
    chofer: Option<&str>,
    es_chofer_externo: bool,
) -> Result<bool, AppError> {
    if empresa.flota_propia {
        match chofer {
            Some(c) if !c.trim().is_empty() => Ok(es_chofer_externo),
            _ => Err(AppError::Validation(
                "El chofer es requerido para empresas de flota propia".to_string(),
            )),
        }
    } else {
        // empresa externa: el chofer es opcional y el flag se fuerza
        Ok(true)
    }
}

pub struct RutaLifecycleService {
    pool: PgPool,
    ruta_repository: RutaRepository,
    empresa_repository: EmpresaRepository,
}

impl RutaLifecycleService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            ruta_repository: RutaRepository::new(pool.clone()),
            empresa_repository: EmpresaRepository::new(pool.clone()),
            pool,
        }
    }

    /// Crear una ruta a partir de un lote de despachos disponibles.
    ///
    /// La numeración, la inserción y la vinculación de despachos son una
    /// sola unidad atómica: el contador mensual se incrementa dentro de la
    /// misma transacción que inserta la ruta.
    pub async fn crear(
        &self,
        request: CrearRutaRequest,
        creado_por: &str,
    ) -> Result<Ruta, AppError> {
        request.validate()?;

        let unicos: HashSet<Uuid> = request.despachos.iter().copied().collect();
        if unicos.len() != request.despachos.len() {
            return Err(AppError::Validation(
                "La lista de despachos contiene ids duplicados".to_string(),
            ));
        }

        let empresa = self
            .empresa_repository
            .find_by_id(request.empresa_reparto)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Empresa de reparto '{}' no encontrada",
                    request.empresa_reparto
                ))
            })?;

        let es_chofer_externo = resolver_chofer(
            &empresa,
            request.chofer.as_deref(),
            request.es_chofer_externo,
        )?;

        let mut tx = self.pool.begin().await?;

        let encontrados =
            DespachoRepository::find_by_ids_for_update(&mut tx, &request.despachos).await?;
        let conflictivos = despachos_no_disponibles(&request.despachos, &encontrados);
        if !conflictivos.is_empty() {
            warn!(
                "⚠️ Creación de ruta rechazada: {} despachos no disponibles",
                conflictivos.len()
            );
            return Err(despachos_no_disponibles_error(&conflictivos));
        }

        let ahora = Utc::now();
        let secuencia = RutaRepository::siguiente_numero_mensual(
            &mut tx,
            ahora.year() as i16,
            ahora.month() as i16,
        )
        .await?;
        let numero = formatear_numero_ruta(ahora, secuencia);

        let ruta = RutaRepository::insertar(
            &mut tx,
            Uuid::new_v4(),
            &numero,
            empresa.id,
            request.chofer.as_deref(),
            es_chofer_externo,
            creado_por,
        )
        .await?;

        for (posicion, despacho_id) in request.despachos.iter().enumerate() {
            let asignado = DespachoRepository::asignar_a_ruta(
                &mut tx,
                *despacho_id,
                ruta.id,
                empresa.id,
                posicion as i32 + 1,
                creado_por,
            )
            .await?;

            if !asignado {
                return Err(despachos_no_disponibles_error(&[*despacho_id]));
            }
        }

        tx.commit().await?;

        info!(
            "🚚 Ruta {} creada con {} despachos para empresa {} (por {})",
            numero,
            request.despachos.len(),
            empresa.razon_social,
            creado_por
        );
        Ok(ruta)
    }

    /// Iniciar la ruta: registra patente y, para rutas externas, el nombre
    /// del chofer
    pub async fn iniciar(
        &self,
        ruta_id: Uuid,
        request: IniciarRutaRequest,
        actor: &str,
    ) -> Result<Ruta, AppError> {
        request.validate()?;

        let mut tx = self.pool.begin().await?;

        let ruta = RutaRepository::find_by_id_for_update(&mut tx, ruta_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ruta '{}' no encontrada", ruta_id)))?;

        if !ruta.estado.permite_inicio() {
            return Err(invalid_state_error("ruta", ruta.estado.as_str(), "iniciar"));
        }

        if ruta.es_chofer_externo {
            let nombre = request
                .nombre_chofer_externo
                .as_deref()
                .or(ruta.nombre_chofer_externo.as_deref())
                .unwrap_or("");
            if nombre.trim().is_empty() {
                return Err(AppError::Validation(
                    "El nombre del chofer externo es requerido para iniciar la ruta".to_string(),
                ));
            }
        }

        let iniciada = RutaRepository::iniciar(
            &mut tx,
            ruta_id,
            request.patente.trim(),
            request.nombre_chofer_externo.as_deref(),
            actor,
        )
        .await?
        .ok_or_else(|| invalid_state_error("ruta", ruta.estado.as_str(), "iniciar"))?;

        tx.commit().await?;

        info!(
            "▶️ Ruta {} iniciada con patente {} (por {})",
            iniciada.numero,
            iniciada.patente.as_deref().unwrap_or("-"),
            actor
        );
        Ok(iniciada)
    }

    /// Finalización estricta: exige que todos los despachos de la ruta estén
    /// en un estado terminal
    pub async fn finalizar(&self, ruta_id: Uuid, actor: &str) -> Result<Ruta, AppError> {
        let mut tx = self.pool.begin().await?;

        let ruta = RutaRepository::find_by_id_for_update(&mut tx, ruta_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ruta '{}' no encontrada", ruta_id)))?;

        if !ruta.estado.permite_finalizacion() {
            return Err(invalid_state_error(
                "ruta",
                ruta.estado.as_str(),
                "finalizar",
            ));
        }

        let pendientes = DespachoRepository::contar_no_terminales(&mut tx, ruta_id).await?;
        if pendientes > 0 {
            return Err(AppError::Precondition(format!(
                "La ruta '{}' tiene {} despachos sin resultado registrado",
                ruta.numero, pendientes
            )));
        }

        let finalizada = RutaRepository::finalizar(&mut tx, ruta_id, actor)
            .await?
            .ok_or_else(|| invalid_state_error("ruta", ruta.estado.as_str(), "finalizar"))?;

        tx.commit().await?;

        info!("🏁 Ruta {} finalizada (por {})", finalizada.numero, actor);
        Ok(finalizada)
    }

    /// Cancelar la ruta liberando los despachos no entregados.
    ///
    /// La liberación en bloque y el cambio de estado de la ruta comparten la
    /// transacción; devuelve la cantidad de despachos liberados.
    pub async fn cancelar(&self, ruta_id: Uuid, actor: &str) -> Result<(Ruta, u64), AppError> {
        let mut tx = self.pool.begin().await?;

        let ruta = RutaRepository::find_by_id_for_update(&mut tx, ruta_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ruta '{}' no encontrada", ruta_id)))?;

        if !ruta.estado.permite_cancelacion() {
            return Err(invalid_state_error("ruta", ruta.estado.as_str(), "cancelar"));
        }

        let liberados =
            DespachoRepository::liberar_no_entregados_de_ruta(&mut tx, ruta_id, actor).await?;

        let cancelada = RutaRepository::cancelar(&mut tx, ruta_id, actor)
            .await?
            .ok_or_else(|| invalid_state_error("ruta", ruta.estado.as_str(), "cancelar"))?;

        tx.commit().await?;

        info!(
            "🚫 Ruta {} cancelada, {} despachos liberados (por {})",
            cancelada.numero, liberados, actor
        );
        Ok((cancelada, liberados))
    }

    pub async fn find_by_id(&self, ruta_id: Uuid) -> Result<Option<Ruta>, AppError> {
        self.ruta_repository.find_by_id(ruta_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::despacho::EstadoDespacho;
    use chrono::Utc;

    fn despacho(id: Uuid, estado: EstadoDespacho, ruta: Option<Uuid>) -> Despacho {
        Despacho {
            id,
            folio: "F-100".to_string(),
            cliente_nombre: "Cliente".to_string(),
            cliente_codigo: None,
            direccion: "Calle Larga 45".to_string(),
            comentarios: None,
            estado,
            ruta_asignada: ruta,
            empresa_reparto: None,
            posicion_ruta: None,
            receptor_rut: None,
            receptor_nombre: None,
            receptor_apellido: None,
            foto_entrega: None,
            firma_entrega: None,
            documento_externo: None,
            fecha_entrega: None,
            motivo_no_entrega: None,
            observacion_no_entrega: None,
            foto_no_entrega: None,
            fecha_no_entrega: None,
            actualizado_por: None,
            fecha_creacion: Utc::now(),
        }
    }

    fn empresa(flota_propia: bool) -> EmpresaReparto {
        EmpresaReparto {
            id: Uuid::new_v4(),
            rut: "76000000-5".to_string(),
            razon_social: "Empresa Test".to_string(),
            usuario: None,
            telefono: None,
            email: None,
            slug: None,
            flota_propia,
            fecha_creacion: Utc::now(),
        }
    }

    #[test]
    fn test_todos_disponibles() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let encontrados = vec![
            despacho(a, EstadoDespacho::Pendiente, None),
            despacho(b, EstadoDespacho::Pendiente, None),
        ];
        assert!(despachos_no_disponibles(&[a, b], &encontrados).is_empty());
    }

    #[test]
    fn test_despacho_inexistente_es_conflictivo() {
        let a = Uuid::new_v4();
        let fantasma = Uuid::new_v4();
        let encontrados = vec![despacho(a, EstadoDespacho::Pendiente, None)];
        assert_eq!(
            despachos_no_disponibles(&[a, fantasma], &encontrados),
            vec![fantasma]
        );
    }

    #[test]
    fn test_despacho_ya_asignado_es_conflictivo() {
        let a = Uuid::new_v4();
        let ocupado = Uuid::new_v4();
        let encontrados = vec![
            despacho(a, EstadoDespacho::Pendiente, None),
            despacho(ocupado, EstadoDespacho::Asignado, Some(Uuid::new_v4())),
        ];
        assert_eq!(
            despachos_no_disponibles(&[a, ocupado], &encontrados),
            vec![ocupado]
        );
    }

    #[test]
    fn test_despacho_pendiente_pero_vinculado_es_conflictivo() {
        let raro = Uuid::new_v4();
        let encontrados = vec![despacho(raro, EstadoDespacho::Pendiente, Some(Uuid::new_v4()))];
        assert_eq!(despachos_no_disponibles(&[raro], &encontrados), vec![raro]);
    }

    #[test]
    fn test_flota_propia_exige_chofer() {
        let propia = empresa(true);
        assert!(resolver_chofer(&propia, None, false).is_err());
        assert!(resolver_chofer(&propia, Some("  "), false).is_err());
        assert_eq!(resolver_chofer(&propia, Some("jperez"), false).unwrap(), false);
    }

    #[test]
    fn test_empresa_externa_fuerza_chofer_externo() {
        let externa = empresa(false);
        // sin chofer y sin flag: igual queda marcado como externo
        assert_eq!(resolver_chofer(&externa, None, false).unwrap(), true);
        assert_eq!(resolver_chofer(&externa, Some("contratista"), false).unwrap(), true);
    }
}
