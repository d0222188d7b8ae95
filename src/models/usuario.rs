//! Modelo de Usuario
//!
//! Usuarios del sistema y sus roles. El backend registra el actor en cada
//! operación mutadora; la política de quién puede invocar cada operación es
//! una verificación delgada en la capa de rutas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Roles del sistema
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Rol {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "adminBodega")]
    AdminBodega,
    #[serde(rename = "subBodega")]
    SubBodega,
    #[serde(rename = "chofer")]
    Chofer,
}

impl Rol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rol::Admin => "admin",
            Rol::AdminBodega => "adminBodega",
            Rol::SubBodega => "subBodega",
            Rol::Chofer => "chofer",
        }
    }

    pub fn parse(value: &str) -> Option<Rol> {
        match value {
            "admin" => Some(Rol::Admin),
            "adminBodega" => Some(Rol::AdminBodega),
            "subBodega" => Some(Rol::SubBodega),
            "chofer" => Some(Rol::Chofer),
            _ => None,
        }
    }
}

/// Usuario - mapea exactamente a la tabla usuarios
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Usuario {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub nombre_completo: String,
    /// Roles como text[]; se interpretan con [`Rol::parse`]
    pub roles: Vec<String>,
    pub activo: bool,
    pub fecha_creacion: DateTime<Utc>,
}

impl Usuario {
    pub fn roles_parseados(&self) -> Vec<Rol> {
        self.roles.iter().filter_map(|r| Rol::parse(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rol_round_trip() {
        for rol in [Rol::Admin, Rol::AdminBodega, Rol::SubBodega, Rol::Chofer] {
            assert_eq!(Rol::parse(rol.as_str()), Some(rol));
        }
        assert_eq!(Rol::parse("superusuario"), None);
    }

    #[test]
    fn test_roles_desconocidos_se_descartan() {
        let usuario = Usuario {
            id: Uuid::new_v4(),
            username: "jperez".to_string(),
            password_hash: "$2b$12$hash".to_string(),
            nombre_completo: "Juan Pérez".to_string(),
            roles: vec!["chofer".to_string(), "legacy".to_string()],
            activo: true,
            fecha_creacion: Utc::now(),
        };
        assert_eq!(usuario.roles_parseados(), vec![Rol::Chofer]);
    }
}
