//! DTOs de Despacho
//!
//! Requests de confirmación de entrega/no entrega y proyección de lectura
//! con la evidencia anidada.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::despacho::{Despacho, EstadoDespacho, MotivoNoEntrega};

/// Request para registrar un despacho
///
/// Punto de entrada administrativo donde el proceso externo de sincronización
/// de pedidos deposita los registros.
#[derive(Debug, Deserialize, Validate)]
pub struct CrearDespachoRequest {
    #[validate(length(min = 1, max = 50))]
    pub folio: String,

    #[validate(length(min = 2, max = 150))]
    pub cliente_nombre: String,

    #[validate(length(max = 50))]
    pub cliente_codigo: Option<String>,

    #[validate(length(min = 5, max = 500))]
    pub direccion: String,

    #[validate(length(max = 1000))]
    pub comentarios: Option<String>,
}

/// Request para confirmar la entrega de un despacho
#[derive(Debug, Deserialize, Validate)]
pub struct RegistrarEntregaRequest {
    #[validate(custom = "crate::utils::validation::validate_rut")]
    pub receptor_rut: String,

    #[validate(length(min = 1, max = 100))]
    pub receptor_nombre: String,

    #[validate(length(min = 1, max = 100))]
    pub receptor_apellido: String,

    /// Foto de la entrega, payload opaco en base64
    #[validate(custom = "crate::utils::validation::validate_evidencia_payload")]
    pub foto: String,

    /// Firma del receptor, payload opaco en base64
    #[validate(custom = "crate::utils::validation::validate_evidencia_payload")]
    pub firma: Option<String>,

    #[validate(length(max = 100))]
    pub documento_externo: Option<String>,
}

/// Request para registrar la no entrega de un despacho
#[derive(Debug, Deserialize, Validate)]
pub struct RegistrarNoEntregaRequest {
    pub motivo: MotivoNoEntrega,

    #[validate(length(max = 1000))]
    pub observacion: Option<String>,

    /// Foto de evidencia, payload opaco en base64
    #[validate(custom = "crate::utils::validation::validate_evidencia_payload")]
    pub foto: String,
}

/// Evidencia de entrega en la proyección de lectura
#[derive(Debug, Serialize)]
pub struct EvidenciaEntregaResponse {
    pub receptor_rut: Option<String>,
    pub receptor_nombre: Option<String>,
    pub receptor_apellido: Option<String>,
    pub foto: Option<String>,
    pub firma: Option<String>,
    pub documento_externo: Option<String>,
    pub fecha_entrega: DateTime<Utc>,
}

/// Evidencia de no entrega en la proyección de lectura
#[derive(Debug, Serialize)]
pub struct EvidenciaNoEntregaResponse {
    pub motivo: MotivoNoEntrega,
    pub observacion: Option<String>,
    pub foto: Option<String>,
    pub fecha: DateTime<Utc>,
}

/// Response de despacho para la API
#[derive(Debug, Serialize)]
pub struct DespachoResponse {
    pub id: Uuid,
    pub folio: String,
    pub cliente_nombre: String,
    pub cliente_codigo: Option<String>,
    pub direccion: String,
    pub comentarios: Option<String>,
    pub estado: EstadoDespacho,
    pub ruta_asignada: Option<Uuid>,
    pub empresa_reparto: Option<Uuid>,
    pub posicion_ruta: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entrega: Option<EvidenciaEntregaResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_entrega: Option<EvidenciaNoEntregaResponse>,
    pub fecha_creacion: DateTime<Utc>,
}

impl From<Despacho> for DespachoResponse {
    fn from(despacho: Despacho) -> Self {
        // La evidencia se conserva tras una liberación; se proyecta siempre
        // que exista, aunque el estado haya vuelto a pendiente
        let entrega = despacho.fecha_entrega.map(|fecha| EvidenciaEntregaResponse {
            receptor_rut: despacho.receptor_rut.clone(),
            receptor_nombre: despacho.receptor_nombre.clone(),
            receptor_apellido: despacho.receptor_apellido.clone(),
            foto: despacho.foto_entrega.clone(),
            firma: despacho.firma_entrega.clone(),
            documento_externo: despacho.documento_externo.clone(),
            fecha_entrega: fecha,
        });

        let no_entrega = match (despacho.motivo_no_entrega, despacho.fecha_no_entrega) {
            (Some(motivo), Some(fecha)) => Some(EvidenciaNoEntregaResponse {
                motivo,
                observacion: despacho.observacion_no_entrega.clone(),
                foto: despacho.foto_no_entrega.clone(),
                fecha,
            }),
            _ => None,
        };

        Self {
            id: despacho.id,
            folio: despacho.folio,
            cliente_nombre: despacho.cliente_nombre,
            cliente_codigo: despacho.cliente_codigo,
            direccion: despacho.direccion,
            comentarios: despacho.comentarios,
            estado: despacho.estado,
            ruta_asignada: despacho.ruta_asignada,
            empresa_reparto: despacho.empresa_reparto,
            posicion_ruta: despacho.posicion_ruta,
            entrega,
            no_entrega,
            fecha_creacion: despacho.fecha_creacion,
        }
    }
}

/// Filtros para búsqueda de despachos
#[derive(Debug, Deserialize)]
pub struct DespachoFilters {
    pub estado: Option<EstadoDespacho>,
    pub ruta: Option<Uuid>,
    pub empresa: Option<Uuid>,
    /// true = sólo despachos pendientes sin ruta asignada
    pub disponibles: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
