//! Servicio de autenticación
//!
//! Login con bcrypt y emisión/verificación de tokens JWT. Los roles viajan
//! en los claims; la capa de rutas aplica la política sobre ellos.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;

use crate::config::environment::EnvironmentConfig;
use crate::dto::auth_dto::{LoginRequest, LoginResponse};
use crate::models::usuario::Usuario;
use crate::repositories::usuario_repository::UsuarioRepository;
use crate::utils::errors::AppError;

/// Claims del JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub username: String,
    pub roles: Vec<String>,
    pub exp: usize,
    pub iat: usize,
}

pub struct AuthService {
    repository: UsuarioRepository,
    config: EnvironmentConfig,
}

impl AuthService {
    pub fn new(pool: PgPool, config: EnvironmentConfig) -> Self {
        Self {
            repository: UsuarioRepository::new(pool),
            config,
        }
    }

    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        let usuario = self
            .repository
            .find_by_username(&request.username)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Credenciales inválidas".to_string()))?;

        let valido = bcrypt::verify(&request.password, &usuario.password_hash)
            .map_err(|e| AppError::Internal(format!("Error verificando credenciales: {}", e)))?;

        if !valido {
            return Err(AppError::Unauthorized("Credenciales inválidas".to_string()));
        }

        let token = generar_token(&usuario, &self.config)?;

        info!("🔑 Login exitoso de {}", usuario.username);
        Ok(LoginResponse {
            token,
            username: usuario.username,
            nombre_completo: usuario.nombre_completo,
            roles: usuario.roles,
        })
    }
}

/// Emitir un token JWT para un usuario
pub fn generar_token(usuario: &Usuario, config: &EnvironmentConfig) -> Result<String, AppError> {
    let ahora = Utc::now();
    let expira = ahora + chrono::Duration::hours(config.jwt_expiration_hours as i64);

    let claims = Claims {
        sub: usuario.id.to_string(),
        username: usuario.username.clone(),
        roles: usuario.roles.clone(),
        exp: expira.timestamp() as usize,
        iat: ahora.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_ref()),
    )
    .map_err(|e| AppError::Internal(format!("Error generando JWT: {}", e)))
}

/// Decodificar y validar un token JWT
pub fn verificar_token(token: &str, jwt_secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized("Token inválido".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn config_de_prueba() -> EnvironmentConfig {
        EnvironmentConfig {
            environment: "test".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            jwt_secret: "secreto-de-prueba".to_string(),
            jwt_expiration_hours: 8,
            cors_origins: vec![],
        }
    }

    fn usuario_de_prueba() -> Usuario {
        Usuario {
            id: Uuid::new_v4(),
            username: "mgonzalez".to_string(),
            password_hash: String::new(),
            nombre_completo: "María González".to_string(),
            roles: vec!["adminBodega".to_string()],
            activo: true,
            fecha_creacion: Utc::now(),
        }
    }

    #[test]
    fn test_token_round_trip() {
        let config = config_de_prueba();
        let usuario = usuario_de_prueba();

        let token = generar_token(&usuario, &config).unwrap();
        let claims = verificar_token(&token, &config.jwt_secret).unwrap();

        assert_eq!(claims.sub, usuario.id.to_string());
        assert_eq!(claims.username, "mgonzalez");
        assert_eq!(claims.roles, vec!["adminBodega".to_string()]);
    }

    #[test]
    fn test_token_con_secreto_incorrecto_es_rechazado() {
        let config = config_de_prueba();
        let token = generar_token(&usuario_de_prueba(), &config).unwrap();

        assert!(verificar_token(&token, "otro-secreto").is_err());
    }

    #[test]
    fn test_token_malformado_es_rechazado() {
        assert!(verificar_token("no.es.jwt", "secreto-de-prueba").is_err());
    }
}
