//! DTOs de Ruta

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dto::despacho_dto::DespachoResponse;
use crate::models::ruta::{EstadoRuta, Ruta};

/// Request para crear una ruta a partir de despachos disponibles
#[derive(Debug, Deserialize, Validate)]
pub struct CrearRutaRequest {
    pub empresa_reparto: Uuid,

    /// Username del chofer; obligatorio para empresas de flota propia
    pub chofer: Option<String>,

    #[validate(length(min = 1))]
    pub despachos: Vec<Uuid>,

    /// Forzado a true cuando la empresa es externa
    #[serde(default)]
    pub es_chofer_externo: bool,
}

/// Request para iniciar una ruta
#[derive(Debug, Deserialize, Validate)]
pub struct IniciarRutaRequest {
    #[validate(custom = "crate::utils::validation::validate_patente")]
    pub patente: String,

    /// Nombre a mostrar del chofer; obligatorio cuando la ruta es externa
    #[validate(length(min = 2, max = 150))]
    pub nombre_chofer_externo: Option<String>,
}

/// Response de ruta para la API
#[derive(Debug, Serialize)]
pub struct RutaResponse {
    pub id: Uuid,
    pub numero: String,
    pub empresa_reparto: Uuid,
    pub chofer: Option<String>,
    pub nombre_chofer_externo: Option<String>,
    pub patente: Option<String>,
    pub es_chofer_externo: bool,
    pub estado: EstadoRuta,
    pub creado_por: String,
    pub fecha_creacion: DateTime<Utc>,
    pub fecha_inicio: Option<DateTime<Utc>>,
    pub fecha_fin: Option<DateTime<Utc>>,
}

impl From<Ruta> for RutaResponse {
    fn from(ruta: Ruta) -> Self {
        Self {
            id: ruta.id,
            numero: ruta.numero,
            empresa_reparto: ruta.empresa_reparto,
            chofer: ruta.chofer,
            nombre_chofer_externo: ruta.nombre_chofer_externo,
            patente: ruta.patente,
            es_chofer_externo: ruta.es_chofer_externo,
            estado: ruta.estado,
            creado_por: ruta.creado_por,
            fecha_creacion: ruta.fecha_creacion,
            fecha_inicio: ruta.fecha_inicio,
            fecha_fin: ruta.fecha_fin,
        }
    }
}

/// Response de detalle de ruta con sus despachos en orden
#[derive(Debug, Serialize)]
pub struct RutaDetalleResponse {
    #[serde(flatten)]
    pub ruta: RutaResponse,
    pub despachos: Vec<DespachoResponse>,
}

/// Response de cancelación de ruta
#[derive(Debug, Serialize)]
pub struct CancelarRutaResponse {
    pub ruta: RutaResponse,
    /// Despachos devueltos al pool de pendientes
    pub despachos_liberados: u64,
}

/// Filtros para búsqueda de rutas
#[derive(Debug, Deserialize)]
pub struct RutaFilters {
    pub estado: Option<EstadoRuta>,
    pub chofer: Option<String>,
    pub empresa: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
