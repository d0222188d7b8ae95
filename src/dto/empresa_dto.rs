//! DTOs de Empresa de Reparto y respuesta genérica de la API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::empresa_reparto::EmpresaReparto;

// Response genérica
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            message: Some(message),
            data: Some(data),
        }
    }
}

/// Request para registrar una empresa de reparto
#[derive(Debug, Deserialize, Validate)]
pub struct CrearEmpresaRequest {
    #[validate(custom = "crate::utils::validation::validate_rut")]
    pub rut: String,

    #[validate(length(min = 3, max = 150))]
    pub razon_social: String,

    pub usuario: Option<String>,

    pub telefono: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(min = 3, max = 80))]
    pub slug: Option<String>,

    /// true = flota propia; false = empresa externa (reconciliación)
    #[serde(default)]
    pub flota_propia: bool,
}

/// Response de empresa para la API
#[derive(Debug, Serialize)]
pub struct EmpresaResponse {
    pub id: Uuid,
    pub rut: String,
    pub razon_social: String,
    pub usuario: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub slug: Option<String>,
    pub flota_propia: bool,
    pub fecha_creacion: DateTime<Utc>,
}

impl From<EmpresaReparto> for EmpresaResponse {
    fn from(empresa: EmpresaReparto) -> Self {
        Self {
            id: empresa.id,
            rut: empresa.rut,
            razon_social: empresa.razon_social,
            usuario: empresa.usuario,
            telefono: empresa.telefono,
            email: empresa.email,
            slug: empresa.slug,
            flota_propia: empresa.flota_propia,
            fecha_creacion: empresa.fecha_creacion,
        }
    }
}
