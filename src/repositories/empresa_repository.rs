//! Repositorio de Empresas de Reparto

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::empresa_reparto::EmpresaReparto;
use crate::utils::errors::AppError;

pub struct EmpresaRepository {
    pool: PgPool,
}

impl EmpresaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        rut: String,
        razon_social: String,
        usuario: Option<String>,
        telefono: Option<String>,
        email: Option<String>,
        slug: Option<String>,
        flota_propia: bool,
    ) -> Result<EmpresaReparto, AppError> {
        let empresa = sqlx::query_as::<_, EmpresaReparto>(
            r#"
            INSERT INTO empresas_reparto (id, rut, razon_social, usuario, telefono, email, slug, flota_propia, fecha_creacion)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(rut)
        .bind(razon_social)
        .bind(usuario)
        .bind(telefono)
        .bind(email)
        .bind(slug)
        .bind(flota_propia)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(empresa)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<EmpresaReparto>, AppError> {
        let empresa =
            sqlx::query_as::<_, EmpresaReparto>("SELECT * FROM empresas_reparto WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(empresa)
    }

    pub async fn list(&self) -> Result<Vec<EmpresaReparto>, AppError> {
        let empresas = sqlx::query_as::<_, EmpresaReparto>(
            "SELECT * FROM empresas_reparto ORDER BY razon_social ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(empresas)
    }

    pub async fn rut_exists(&self, rut: &str) -> Result<bool, AppError> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM empresas_reparto WHERE rut = $1)")
                .bind(rut)
                .fetch_one(&self.pool)
                .await?;

        Ok(result.0)
    }

    pub async fn slug_exists(&self, slug: &str) -> Result<bool, AppError> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM empresas_reparto WHERE slug = $1)")
                .bind(slug)
                .fetch_one(&self.pool)
                .await?;

        Ok(result.0)
    }
}
