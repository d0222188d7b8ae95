//! Modelo de Despacho
//!
//! Este módulo contiene el struct Despacho, sus estados y la tabla de
//! transiciones del ciclo de vida. Mapea exactamente al schema PostgreSQL
//! con primary key 'id'.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado del despacho - mapea al ENUM estado_despacho
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "estado_despacho", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EstadoDespacho {
    Pendiente,
    Asignado,
    Entregado,
    NoEntregado,
    Cancelado,
}

impl EstadoDespacho {
    /// Estados desde los cuales no hay más transiciones hacia adelante
    pub fn es_terminal(&self) -> bool {
        matches!(
            self,
            EstadoDespacho::Entregado | EstadoDespacho::NoEntregado | EstadoDespacho::Cancelado
        )
    }

    /// Sólo un despacho asignado puede confirmarse (entrega o no entrega)
    pub fn permite_confirmacion(&self) -> bool {
        *self == EstadoDespacho::Asignado
    }

    /// La liberación devuelve el despacho a `pendiente`. Es la única
    /// transición hacia atrás permitida y nunca aplica sobre un despacho
    /// cancelado ni sobre uno que ya está disponible.
    pub fn permite_liberacion(&self) -> bool {
        !matches!(self, EstadoDespacho::Pendiente | EstadoDespacho::Cancelado)
    }

    /// Cancelación administrativa: sólo antes de confirmar el resultado
    pub fn permite_cancelacion(&self) -> bool {
        matches!(self, EstadoDespacho::Pendiente | EstadoDespacho::Asignado)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoDespacho::Pendiente => "pendiente",
            EstadoDespacho::Asignado => "asignado",
            EstadoDespacho::Entregado => "entregado",
            EstadoDespacho::NoEntregado => "no_entregado",
            EstadoDespacho::Cancelado => "cancelado",
        }
    }
}

impl std::fmt::Display for EstadoDespacho {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Motivo de no entrega - enumeración cerrada, mapea al ENUM motivo_no_entrega
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "motivo_no_entrega")]
pub enum MotivoNoEntrega {
    #[sqlx(rename = "Cliente ausente")]
    #[serde(rename = "Cliente ausente")]
    ClienteAusente,
    #[sqlx(rename = "Dirección incorrecta")]
    #[serde(rename = "Dirección incorrecta")]
    DireccionIncorrecta,
    #[sqlx(rename = "Sin acceso / cerrado")]
    #[serde(rename = "Sin acceso / cerrado")]
    SinAcceso,
    #[sqlx(rename = "Rechazado por cliente")]
    #[serde(rename = "Rechazado por cliente")]
    RechazadoPorCliente,
    #[sqlx(rename = "Horario no coincide")]
    #[serde(rename = "Horario no coincide")]
    HorarioNoCoincide,
    #[sqlx(rename = "Otro")]
    #[serde(rename = "Otro")]
    Otro,
}

impl MotivoNoEntrega {
    pub const TODOS: [MotivoNoEntrega; 6] = [
        MotivoNoEntrega::ClienteAusente,
        MotivoNoEntrega::DireccionIncorrecta,
        MotivoNoEntrega::SinAcceso,
        MotivoNoEntrega::RechazadoPorCliente,
        MotivoNoEntrega::HorarioNoCoincide,
        MotivoNoEntrega::Otro,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MotivoNoEntrega::ClienteAusente => "Cliente ausente",
            MotivoNoEntrega::DireccionIncorrecta => "Dirección incorrecta",
            MotivoNoEntrega::SinAcceso => "Sin acceso / cerrado",
            MotivoNoEntrega::RechazadoPorCliente => "Rechazado por cliente",
            MotivoNoEntrega::HorarioNoCoincide => "Horario no coincide",
            MotivoNoEntrega::Otro => "Otro",
        }
    }
}

/// Despacho principal - mapea exactamente a la tabla despachos
///
/// La evidencia de entrega y de no entrega vive en columnas anulables de la
/// misma fila; la liberación conserva la evidencia para auditoría aunque el
/// estado vuelva a `pendiente`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Despacho {
    pub id: Uuid,
    pub folio: String,
    pub cliente_nombre: String,
    pub cliente_codigo: Option<String>,
    pub direccion: String,
    pub comentarios: Option<String>,
    pub estado: EstadoDespacho,

    // Vínculo con la ruta (FK estricta; la entidad completa sólo se resuelve
    // en proyecciones de lectura)
    pub ruta_asignada: Option<Uuid>,
    pub empresa_reparto: Option<Uuid>,
    pub posicion_ruta: Option<i32>,

    // Evidencia de entrega
    pub receptor_rut: Option<String>,
    pub receptor_nombre: Option<String>,
    pub receptor_apellido: Option<String>,
    pub foto_entrega: Option<String>,
    pub firma_entrega: Option<String>,
    pub documento_externo: Option<String>,
    pub fecha_entrega: Option<DateTime<Utc>>,

    // Evidencia de no entrega
    pub motivo_no_entrega: Option<MotivoNoEntrega>,
    pub observacion_no_entrega: Option<String>,
    pub foto_no_entrega: Option<String>,
    pub fecha_no_entrega: Option<DateTime<Utc>>,

    pub actualizado_por: Option<String>,
    pub fecha_creacion: DateTime<Utc>,
}

impl Despacho {
    /// Un despacho está disponible para ruteo cuando está pendiente y no
    /// pertenece a ninguna ruta
    pub fn esta_disponible(&self) -> bool {
        self.estado == EstadoDespacho::Pendiente && self.ruta_asignada.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estados_terminales() {
        assert!(!EstadoDespacho::Pendiente.es_terminal());
        assert!(!EstadoDespacho::Asignado.es_terminal());
        assert!(EstadoDespacho::Entregado.es_terminal());
        assert!(EstadoDespacho::NoEntregado.es_terminal());
        assert!(EstadoDespacho::Cancelado.es_terminal());
    }

    #[test]
    fn test_solo_asignado_permite_confirmacion() {
        assert!(EstadoDespacho::Asignado.permite_confirmacion());
        assert!(!EstadoDespacho::Pendiente.permite_confirmacion());
        assert!(!EstadoDespacho::Entregado.permite_confirmacion());
        assert!(!EstadoDespacho::NoEntregado.permite_confirmacion());
        assert!(!EstadoDespacho::Cancelado.permite_confirmacion());
    }

    #[test]
    fn test_liberacion_excluye_pendiente_y_cancelado() {
        assert!(EstadoDespacho::Asignado.permite_liberacion());
        assert!(EstadoDespacho::Entregado.permite_liberacion());
        assert!(EstadoDespacho::NoEntregado.permite_liberacion());
        assert!(!EstadoDespacho::Pendiente.permite_liberacion());
        assert!(!EstadoDespacho::Cancelado.permite_liberacion());
    }

    #[test]
    fn test_cancelacion_solo_antes_de_confirmar() {
        assert!(EstadoDespacho::Pendiente.permite_cancelacion());
        assert!(EstadoDespacho::Asignado.permite_cancelacion());
        assert!(!EstadoDespacho::Entregado.permite_cancelacion());
        assert!(!EstadoDespacho::NoEntregado.permite_cancelacion());
        assert!(!EstadoDespacho::Cancelado.permite_cancelacion());
    }

    #[test]
    fn test_motivos_serializan_con_etiqueta_exacta() {
        let json = serde_json::to_string(&MotivoNoEntrega::SinAcceso).unwrap();
        assert_eq!(json, "\"Sin acceso / cerrado\"");

        let motivo: MotivoNoEntrega =
            serde_json::from_str("\"Cliente ausente\"").unwrap();
        assert_eq!(motivo, MotivoNoEntrega::ClienteAusente);
    }

    #[test]
    fn test_motivos_enumeracion_cerrada() {
        assert_eq!(MotivoNoEntrega::TODOS.len(), 6);
        assert!(serde_json::from_str::<MotivoNoEntrega>("\"Se me olvidó\"").is_err());
    }

    fn despacho_base(estado: EstadoDespacho, ruta: Option<Uuid>) -> Despacho {
        Despacho {
            id: Uuid::new_v4(),
            folio: "F-0001".to_string(),
            cliente_nombre: "Comercial Andes".to_string(),
            cliente_codigo: None,
            direccion: "Av. Providencia 1234, Santiago".to_string(),
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

    #[test]
    fn test_disponibilidad() {
        assert!(despacho_base(EstadoDespacho::Pendiente, None).esta_disponible());
        assert!(!despacho_base(EstadoDespacho::Asignado, Some(Uuid::new_v4())).esta_disponible());
        // pendiente pero aún vinculado a una ruta no es disponible
        assert!(!despacho_base(EstadoDespacho::Pendiente, Some(Uuid::new_v4())).esta_disponible());
    }
}
