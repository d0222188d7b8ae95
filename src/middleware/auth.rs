//! Middleware de autenticación JWT
//!
//! Extrae y valida el token Bearer, e inyecta el usuario autenticado en las
//! extensions de la request. Los roles viajan en los claims del token; la
//! política de acceso se aplica con [`exigir_rol`] en cada handler.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::models::usuario::Rol;
use crate::services::auth_service::verificar_token;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Usuario autenticado que se inyecta en las requests
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
    pub roles: Vec<Rol>,
}

impl AuthenticatedUser {
    pub fn tiene_rol(&self, rol: Rol) -> bool {
        self.roles.contains(&rol)
    }
}

/// Verificar que el usuario tenga alguno de los roles permitidos
pub fn exigir_rol(user: &AuthenticatedUser, permitidos: &[Rol]) -> Result<(), AppError> {
    if permitidos.iter().any(|rol| user.tiene_rol(*rol)) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "El usuario '{}' no tiene permisos para esta operación",
            user.username
        )))
    }
}

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|auth_str| auth_str.to_str().ok())
        .and_then(|auth_str| auth_str.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Token de autorización requerido".to_string()))?;

    let claims = verificar_token(auth_header, &state.config.jwt_secret)?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("ID de usuario inválido".to_string()))?;

    let authenticated_user = AuthenticatedUser {
        user_id,
        username: claims.username,
        roles: claims.roles.iter().filter_map(|r| Rol::parse(r)).collect(),
    };

    request.extensions_mut().insert(authenticated_user);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usuario(roles: Vec<Rol>) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: Uuid::new_v4(),
            username: "jperez".to_string(),
            roles,
        }
    }

    #[test]
    fn test_exigir_rol_acepta_cualquier_rol_permitido() {
        let user = usuario(vec![Rol::Chofer]);
        assert!(exigir_rol(&user, &[Rol::Admin, Rol::Chofer]).is_ok());
    }

    #[test]
    fn test_exigir_rol_rechaza_sin_roles() {
        let user = usuario(vec![]);
        assert!(matches!(
            exigir_rol(&user, &[Rol::Admin]),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_exigir_rol_rechaza_rol_no_permitido() {
        let user = usuario(vec![Rol::Chofer]);
        assert!(exigir_rol(&user, &[Rol::Admin, Rol::AdminBodega]).is_err());
    }
}
