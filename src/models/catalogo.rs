//! Catálogos del dominio
//!
//! Enumeraciones y mapeos estado → presentación (etiqueta y color de badge)
//! en un único lugar, expuestos como metadata para que cualquier capa de
//! presentación los consuma sin duplicar tablas.

use serde::Serialize;

use crate::models::despacho::{EstadoDespacho, MotivoNoEntrega};
use crate::models::ruta::EstadoRuta;

/// Presentación de un estado para las capas de UI
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EstadoDisplay {
    pub valor: &'static str,
    pub etiqueta: &'static str,
    pub color: &'static str,
}

/// Presentación de un motivo de no entrega
#[derive(Debug, Clone, Serialize)]
pub struct MotivoDisplay {
    pub valor: MotivoNoEntrega,
    pub etiqueta: &'static str,
}

pub fn estados_despacho() -> Vec<EstadoDisplay> {
    vec![
        EstadoDisplay {
            valor: EstadoDespacho::Pendiente.as_str(),
            etiqueta: "Pendiente",
            color: "secondary",
        },
        EstadoDisplay {
            valor: EstadoDespacho::Asignado.as_str(),
            etiqueta: "Asignado",
            color: "info",
        },
        EstadoDisplay {
            valor: EstadoDespacho::Entregado.as_str(),
            etiqueta: "Entregado",
            color: "success",
        },
        EstadoDisplay {
            valor: EstadoDespacho::NoEntregado.as_str(),
            etiqueta: "No entregado",
            color: "warning",
        },
        EstadoDisplay {
            valor: EstadoDespacho::Cancelado.as_str(),
            etiqueta: "Cancelado",
            color: "danger",
        },
    ]
}

pub fn estados_ruta() -> Vec<EstadoDisplay> {
    vec![
        EstadoDisplay {
            valor: EstadoRuta::Pendiente.as_str(),
            etiqueta: "Pendiente",
            color: "secondary",
        },
        EstadoDisplay {
            valor: EstadoRuta::Iniciada.as_str(),
            etiqueta: "En ruta",
            color: "primary",
        },
        EstadoDisplay {
            valor: EstadoRuta::Pausada.as_str(),
            etiqueta: "Pausada",
            color: "warning",
        },
        EstadoDisplay {
            valor: EstadoRuta::Finalizada.as_str(),
            etiqueta: "Finalizada",
            color: "success",
        },
        EstadoDisplay {
            valor: EstadoRuta::Cancelada.as_str(),
            etiqueta: "Cancelada",
            color: "danger",
        },
    ]
}

pub fn motivos_no_entrega() -> Vec<MotivoDisplay> {
    MotivoNoEntrega::TODOS
        .iter()
        .map(|motivo| MotivoDisplay {
            valor: *motivo,
            etiqueta: motivo.as_str(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogo_cubre_todos_los_estados_de_despacho() {
        let valores: Vec<&str> = estados_despacho().iter().map(|e| e.valor).collect();
        assert_eq!(
            valores,
            vec!["pendiente", "asignado", "entregado", "no_entregado", "cancelado"]
        );
    }

    #[test]
    fn test_catalogo_cubre_todos_los_estados_de_ruta() {
        let valores: Vec<&str> = estados_ruta().iter().map(|e| e.valor).collect();
        assert_eq!(
            valores,
            vec!["pendiente", "iniciada", "pausada", "finalizada", "cancelada"]
        );
    }

    #[test]
    fn test_catalogo_de_motivos_completo() {
        let motivos = motivos_no_entrega();
        assert_eq!(motivos.len(), MotivoNoEntrega::TODOS.len());
        assert!(motivos
            .iter()
            .any(|m| m.etiqueta == "Sin acceso / cerrado"));
    }
}
