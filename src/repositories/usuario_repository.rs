//! Repositorio de Usuarios

use sqlx::PgPool;

use crate::models::usuario::Usuario;
use crate::utils::errors::AppError;

pub struct UsuarioRepository {
    pool: PgPool,
}

impl UsuarioRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<Usuario>, AppError> {
        let usuario = sqlx::query_as::<_, Usuario>(
            "SELECT * FROM usuarios WHERE username = $1 AND activo = TRUE",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(usuario)
    }
}
