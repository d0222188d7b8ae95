//! Modelo de Empresa de Reparto
//!
//! Distingue empresas de flota propia (choferes internos con flujo completo
//! de confirmación) de empresas externas (flujo de reconciliación sin
//! confirmación por parada).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Empresa de reparto - mapea exactamente a la tabla empresas_reparto
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmpresaReparto {
    pub id: Uuid,
    pub rut: String,
    pub razon_social: String,
    /// Cuenta de usuario vinculada, si la empresa opera con la app
    pub usuario: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub slug: Option<String>,
    /// true = flota propia (choferes internos); false = empresa externa
    pub flota_propia: bool,
    pub fecha_creacion: DateTime<Utc>,
}

impl EmpresaReparto {
    /// Las empresas externas se reconcilian en bloque; las de flota propia
    /// exigen confirmación del chofer por despacho
    pub fn usa_reconciliacion(&self) -> bool {
        !self.flota_propia
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empresa(flota_propia: bool) -> EmpresaReparto {
        EmpresaReparto {
            id: Uuid::new_v4(),
            rut: "76543210-K".to_string(),
            razon_social: "Transportes del Sur SpA".to_string(),
            usuario: None,
            telefono: None,
            email: None,
            slug: Some("transportes-del-sur".to_string()),
            flota_propia,
            fecha_creacion: Utc::now(),
        }
    }

    #[test]
    fn test_solo_empresas_externas_usan_reconciliacion() {
        assert!(empresa(false).usa_reconciliacion());
        assert!(!empresa(true).usa_reconciliacion());
    }
}
