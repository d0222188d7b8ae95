//! Repositorio de Rutas
//!
//! Acceso a datos de rutas y del contador mensual de numeración. Las
//! transiciones de estado usan UPDATE condicionado al estado actual, igual
//! que el repositorio de despachos.

use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::dto::ruta_dto::RutaFilters;
use crate::models::ruta::Ruta;
use crate::utils::errors::AppError;

pub struct RutaRepository {
    pool: PgPool,
}

impl RutaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Ruta>, AppError> {
        let ruta = sqlx::query_as::<_, Ruta>("SELECT * FROM rutas WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(ruta)
    }

    pub async fn list(&self, filters: &RutaFilters) -> Result<Vec<Ruta>, AppError> {
        let rutas = sqlx::query_as::<_, Ruta>(
            r#"
            SELECT * FROM rutas
            WHERE ($1::estado_ruta IS NULL OR estado = $1)
              AND ($2::text IS NULL OR chofer = $2)
              AND ($3::uuid IS NULL OR empresa_reparto = $3)
            ORDER BY fecha_creacion DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(filters.estado)
        .bind(filters.chofer.as_deref())
        .bind(filters.empresa)
        .bind(filters.limit.unwrap_or(100))
        .bind(filters.offset.unwrap_or(0))
        .fetch_all(&self.pool)
        .await?;

        Ok(rutas)
    }

    /// Cargar y bloquear una ruta dentro de una transacción
    pub async fn find_by_id_for_update(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Option<Ruta>, AppError> {
        let ruta = sqlx::query_as::<_, Ruta>("SELECT * FROM rutas WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(ruta)
    }

    /// Incremento atómico del contador mensual de numeración de rutas.
    ///
    /// El upsert toma el lock de la fila (año, mes) hasta el commit, de modo
    /// que dos creaciones concurrentes en el mismo mes nunca obtienen la
    /// misma secuencia.
    pub async fn siguiente_numero_mensual(
        tx: &mut Transaction<'_, Postgres>,
        anio: i16,
        mes: i16,
    ) -> Result<i32, AppError> {
        let (valor,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO contadores_ruta (anio, mes, valor)
            VALUES ($1, $2, 1)
            ON CONFLICT (anio, mes)
            DO UPDATE SET valor = contadores_ruta.valor + 1
            RETURNING valor
            "#,
        )
        .bind(anio)
        .bind(mes)
        .fetch_one(&mut **tx)
        .await?;

        Ok(valor)
    }

    /// Insertar una ruta nueva en estado `pendiente`
    pub async fn insertar(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        numero: &str,
        empresa_reparto: Uuid,
        chofer: Option<&str>,
        es_chofer_externo: bool,
        creado_por: &str,
    ) -> Result<Ruta, AppError> {
        let ruta = sqlx::query_as::<_, Ruta>(
            r#"
            INSERT INTO rutas (id, numero, empresa_reparto, chofer, es_chofer_externo, estado, creado_por, fecha_creacion)
            VALUES ($1, $2, $3, $4, $5, 'pendiente', $6, $7)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(numero)
        .bind(empresa_reparto)
        .bind(chofer)
        .bind(es_chofer_externo)
        .bind(creado_por)
        .bind(Utc::now())
        .fetch_one(&mut **tx)
        .await?;

        Ok(ruta)
    }

    /// Iniciar la ruta. Devuelve None si ya no estaba `pendiente`.
    pub async fn iniciar(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        patente: &str,
        nombre_chofer_externo: Option<&str>,
        actor: &str,
    ) -> Result<Option<Ruta>, AppError> {
        let ruta = sqlx::query_as::<_, Ruta>(
            r#"
            UPDATE rutas
            SET estado = 'iniciada',
                patente = $2,
                nombre_chofer_externo = COALESCE($3, nombre_chofer_externo),
                fecha_inicio = $4,
                actualizado_por = $5
            WHERE id = $1 AND estado = 'pendiente'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patente)
        .bind(nombre_chofer_externo)
        .bind(Utc::now())
        .bind(actor)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(ruta)
    }

    /// Finalización estricta: sólo desde `iniciada`. Devuelve None si el
    /// estado ya no lo permitía.
    pub async fn finalizar(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        actor: &str,
    ) -> Result<Option<Ruta>, AppError> {
        let ruta = sqlx::query_as::<_, Ruta>(
            r#"
            UPDATE rutas
            SET estado = 'finalizada', fecha_fin = $2, actualizado_por = $3
            WHERE id = $1 AND estado = 'iniciada'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .bind(actor)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(ruta)
    }

    /// Finalización relajada de la reconciliación: desde cualquier estado no
    /// terminal, sin exigir despachos terminales.
    pub async fn finalizar_relajado(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        actor: &str,
    ) -> Result<Option<Ruta>, AppError> {
        let ruta = sqlx::query_as::<_, Ruta>(
            r#"
            UPDATE rutas
            SET estado = 'finalizada', fecha_fin = $2, actualizado_por = $3
            WHERE id = $1 AND estado IN ('pendiente', 'iniciada', 'pausada')
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .bind(actor)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(ruta)
    }

    /// Cancelar la ruta. Devuelve None si ya estaba en un estado terminal.
    pub async fn cancelar(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        actor: &str,
    ) -> Result<Option<Ruta>, AppError> {
        let ruta = sqlx::query_as::<_, Ruta>(
            r#"
            UPDATE rutas
            SET estado = 'cancelada', actualizado_por = $2
            WHERE id = $1 AND estado IN ('pendiente', 'iniciada', 'pausada')
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(actor)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(ruta)
    }
}
