//! Repositorios de acceso a datos
//!
//! Cada repositorio encapsula las consultas SQL de una entidad. Las
//! operaciones que participan en transacciones multi-entidad se exponen como
//! funciones asociadas que reciben la transacción.

pub mod despacho_repository;
pub mod empresa_repository;
pub mod ruta_repository;
pub mod usuario_repository;
