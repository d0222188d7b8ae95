//! Services module
//!
//! Este módulo contiene la lógica de negocio de la aplicación: la máquina de
//! estados de despachos, el ciclo de vida de rutas, la reconciliación de
//! empresas externas y la autenticación.

pub mod auth_service;
pub mod despacho_state_service;
pub mod reconciliacion_service;
pub mod ruta_lifecycle_service;
