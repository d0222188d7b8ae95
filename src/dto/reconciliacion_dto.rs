//! DTOs de Reconciliación
//!
//! Las empresas externas informan resultados fuera de banda; el personal de
//! bodega reconcilia la ruta contra esa información en una sola operación.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dto::ruta_dto::RutaResponse;

/// Request para reconciliar una ruta de empresa externa
#[derive(Debug, Deserialize, Validate)]
pub struct ReconciliarRutaRequest {
    /// Despachos reportados como no entregables, vuelven al pool
    #[serde(default)]
    pub despachos_a_liberar: Vec<Uuid>,

    /// Cierre relajado: no exige que todos los despachos estén en estado
    /// terminal
    #[serde(default)]
    pub finalizar_ruta: bool,

    /// Referencia del documento del transportista (guía, orden de compra)
    #[validate(length(min = 1, max = 100))]
    pub documento_externo: Option<String>,
}

/// Response de reconciliación
#[derive(Debug, Serialize)]
pub struct ReconciliacionResponse {
    pub ruta: RutaResponse,
    pub despachos_liberados: u64,
    pub ruta_finalizada: bool,
    /// Despachos aún vinculados que recibieron el documento externo
    pub documentos_asignados: u64,
}
