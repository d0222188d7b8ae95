//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL con las convenciones estándar.

pub mod catalogo;
pub mod despacho;
pub mod empresa_reparto;
pub mod ruta;
pub mod usuario;
