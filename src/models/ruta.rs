//! Modelo de Ruta
//!
//! Este módulo contiene el struct Ruta, sus estados y el formato del número
//! de ruta. Mapea exactamente al schema PostgreSQL con primary key 'id'.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Prefijo del número de ruta
pub const PREFIJO_NUMERO_RUTA: char = 'R';

/// Estado de la ruta - mapea al ENUM estado_ruta
///
/// `pausada` es un estado de reposo válido reservado para un flujo de
/// pausa/reanudación que hoy no tiene endpoint público.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "estado_ruta", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EstadoRuta {
    Pendiente,
    Iniciada,
    Pausada,
    Finalizada,
    Cancelada,
}

impl EstadoRuta {
    pub fn es_terminal(&self) -> bool {
        matches!(self, EstadoRuta::Finalizada | EstadoRuta::Cancelada)
    }

    pub fn permite_inicio(&self) -> bool {
        *self == EstadoRuta::Pendiente
    }

    pub fn permite_finalizacion(&self) -> bool {
        *self == EstadoRuta::Iniciada
    }

    pub fn permite_pausa(&self) -> bool {
        *self == EstadoRuta::Iniciada
    }

    pub fn permite_cancelacion(&self) -> bool {
        !self.es_terminal()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoRuta::Pendiente => "pendiente",
            EstadoRuta::Iniciada => "iniciada",
            EstadoRuta::Pausada => "pausada",
            EstadoRuta::Finalizada => "finalizada",
            EstadoRuta::Cancelada => "cancelada",
        }
    }
}

impl std::fmt::Display for EstadoRuta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ruta principal - mapea exactamente a la tabla rutas
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ruta {
    pub id: Uuid,
    /// Número legible secuencial, formato `R<YY><MM><NNNN>`
    pub numero: String,
    pub empresa_reparto: Uuid,
    /// Username del chofer; ausente en rutas de empresas externas
    pub chofer: Option<String>,
    pub nombre_chofer_externo: Option<String>,
    /// Patente del vehículo, registrada al iniciar la ruta
    pub patente: Option<String>,
    pub es_chofer_externo: bool,
    pub estado: EstadoRuta,
    pub creado_por: String,
    pub actualizado_por: Option<String>,
    pub fecha_creacion: DateTime<Utc>,
    pub fecha_inicio: Option<DateTime<Utc>>,
    pub fecha_fin: Option<DateTime<Utc>>,
}

/// Formatear el número de ruta a partir de la fecha y la secuencia mensual
pub fn formatear_numero_ruta(fecha: DateTime<Utc>, secuencia: i32) -> String {
    format!(
        "{}{:02}{:02}{:04}",
        PREFIJO_NUMERO_RUTA,
        fecha.year() % 100,
        fecha.month(),
        secuencia
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_estados_terminales() {
        assert!(!EstadoRuta::Pendiente.es_terminal());
        assert!(!EstadoRuta::Iniciada.es_terminal());
        assert!(!EstadoRuta::Pausada.es_terminal());
        assert!(EstadoRuta::Finalizada.es_terminal());
        assert!(EstadoRuta::Cancelada.es_terminal());
    }

    #[test]
    fn test_transiciones_de_inicio_y_fin() {
        assert!(EstadoRuta::Pendiente.permite_inicio());
        assert!(!EstadoRuta::Iniciada.permite_inicio());

        assert!(EstadoRuta::Iniciada.permite_finalizacion());
        assert!(!EstadoRuta::Pendiente.permite_finalizacion());
        assert!(!EstadoRuta::Pausada.permite_finalizacion());
    }

    #[test]
    fn test_pausada_es_estado_valido_y_cancelable() {
        // reservado: se puede pausar desde iniciada y cancelar desde pausada
        assert!(EstadoRuta::Iniciada.permite_pausa());
        assert!(EstadoRuta::Pausada.permite_cancelacion());
    }

    #[test]
    fn test_cancelacion_desde_cualquier_estado_no_terminal() {
        assert!(EstadoRuta::Pendiente.permite_cancelacion());
        assert!(EstadoRuta::Iniciada.permite_cancelacion());
        assert!(EstadoRuta::Pausada.permite_cancelacion());
        assert!(!EstadoRuta::Finalizada.permite_cancelacion());
        assert!(!EstadoRuta::Cancelada.permite_cancelacion());
    }

    #[test]
    fn test_formato_numero_ruta() {
        let fecha = Utc.with_ymd_and_hms(2025, 8, 7, 12, 0, 0).unwrap();
        assert_eq!(formatear_numero_ruta(fecha, 1), "R25080001");
        assert_eq!(formatear_numero_ruta(fecha, 432), "R25080432");

        let enero = Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(formatear_numero_ruta(enero, 17), "R26010017");
    }

    #[test]
    fn test_numero_ruta_pasa_validacion_de_formato() {
        let fecha = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap();
        let numero = formatear_numero_ruta(fecha, 9999);
        assert!(crate::utils::validation::validate_numero_ruta(&numero).is_ok());
    }
}
