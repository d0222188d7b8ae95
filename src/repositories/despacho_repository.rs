//! Repositorio de Despachos
//!
//! Acceso a datos de despachos. Las mutaciones de estado usan UPDATE
//! condicionado al estado actual: la fila sólo cambia si el despacho sigue
//! en el estado esperado al momento de ejecutar la sentencia, de modo que de
//! dos operaciones concurrentes sobre el mismo despacho exactamente una gana.

use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::dto::despacho_dto::DespachoFilters;
use crate::models::despacho::{Despacho, EstadoDespacho, MotivoNoEntrega};
use crate::utils::errors::AppError;

/// Resultado de una liberación individual
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultadoLiberacion {
    /// El despacho volvió a `pendiente` y quedó desvinculado
    Liberado,
    /// Ya estaba `pendiente`; la operación es idempotente
    YaPendiente,
}

pub struct DespachoRepository {
    pool: PgPool,
}

impl DespachoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        folio: String,
        cliente_nombre: String,
        cliente_codigo: Option<String>,
        direccion: String,
        comentarios: Option<String>,
    ) -> Result<Despacho, AppError> {
        let despacho = sqlx::query_as::<_, Despacho>(
            r#"
            INSERT INTO despachos (id, folio, cliente_nombre, cliente_codigo, direccion, comentarios, estado, fecha_creacion)
            VALUES ($1, $2, $3, $4, $5, $6, 'pendiente', $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(folio)
        .bind(cliente_nombre)
        .bind(cliente_codigo)
        .bind(direccion)
        .bind(comentarios)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(despacho)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Despacho>, AppError> {
        let despacho = sqlx::query_as::<_, Despacho>("SELECT * FROM despachos WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(despacho)
    }

    pub async fn list(&self, filters: &DespachoFilters) -> Result<Vec<Despacho>, AppError> {
        let despachos = sqlx::query_as::<_, Despacho>(
            r#"
            SELECT * FROM despachos
            WHERE ($1::estado_despacho IS NULL OR estado = $1)
              AND ($2::uuid IS NULL OR ruta_asignada = $2)
              AND ($3::uuid IS NULL OR empresa_reparto = $3)
              AND (NOT $4 OR (estado = 'pendiente' AND ruta_asignada IS NULL))
            ORDER BY fecha_creacion DESC
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(filters.estado)
        .bind(filters.ruta)
        .bind(filters.empresa)
        .bind(filters.disponibles.unwrap_or(false))
        .bind(filters.limit.unwrap_or(100))
        .bind(filters.offset.unwrap_or(0))
        .fetch_all(&self.pool)
        .await?;

        Ok(despachos)
    }

    /// Despachos de una ruta en su orden de visita
    pub async fn find_by_ruta(&self, ruta_id: Uuid) -> Result<Vec<Despacho>, AppError> {
        let despachos = sqlx::query_as::<_, Despacho>(
            r#"
            SELECT * FROM despachos
            WHERE ruta_asignada = $1
            ORDER BY posicion_ruta ASC NULLS LAST, fecha_creacion ASC
            "#,
        )
        .bind(ruta_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(despachos)
    }

    /// Confirmar entrega. Devuelve None si el despacho no estaba `asignado`
    /// al momento de la mutación.
    pub async fn marcar_entregado(
        &self,
        id: Uuid,
        receptor_rut: String,
        receptor_nombre: String,
        receptor_apellido: String,
        foto: String,
        firma: Option<String>,
        documento_externo: Option<String>,
        actor: &str,
    ) -> Result<Option<Despacho>, AppError> {
        let despacho = sqlx::query_as::<_, Despacho>(
            r#"
            UPDATE despachos
            SET estado = 'entregado',
                receptor_rut = $2,
                receptor_nombre = $3,
                receptor_apellido = $4,
                foto_entrega = $5,
                firma_entrega = $6,
                documento_externo = COALESCE($7, documento_externo),
                fecha_entrega = $8,
                actualizado_por = $9
            WHERE id = $1 AND estado = 'asignado'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(receptor_rut)
        .bind(receptor_nombre)
        .bind(receptor_apellido)
        .bind(foto)
        .bind(firma)
        .bind(documento_externo)
        .bind(Utc::now())
        .bind(actor)
        .fetch_optional(&self.pool)
        .await?;

        Ok(despacho)
    }

    /// Registrar no entrega. Devuelve None si el despacho no estaba
    /// `asignado` al momento de la mutación.
    pub async fn marcar_no_entregado(
        &self,
        id: Uuid,
        motivo: MotivoNoEntrega,
        observacion: Option<String>,
        foto: String,
        actor: &str,
    ) -> Result<Option<Despacho>, AppError> {
        let despacho = sqlx::query_as::<_, Despacho>(
            r#"
            UPDATE despachos
            SET estado = 'no_entregado',
                motivo_no_entrega = $2,
                observacion_no_entrega = $3,
                foto_no_entrega = $4,
                fecha_no_entrega = $5,
                actualizado_por = $6
            WHERE id = $1 AND estado = 'asignado'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(motivo)
        .bind(observacion)
        .bind(foto)
        .bind(Utc::now())
        .bind(actor)
        .fetch_optional(&self.pool)
        .await?;

        Ok(despacho)
    }

    /// Cancelación administrativa. Devuelve None si el despacho ya no
    /// permitía cancelarse.
    pub async fn cancelar(&self, id: Uuid, actor: &str) -> Result<Option<Despacho>, AppError> {
        let despacho = sqlx::query_as::<_, Despacho>(
            r#"
            UPDATE despachos
            SET estado = 'cancelado', actualizado_por = $2
            WHERE id = $1 AND estado IN ('pendiente', 'asignado')
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(actor)
        .fetch_optional(&self.pool)
        .await?;

        Ok(despacho)
    }

    /// Cargar y bloquear despachos dentro de una transacción
    pub async fn find_by_ids_for_update(
        tx: &mut Transaction<'_, Postgres>,
        ids: &[Uuid],
    ) -> Result<Vec<Despacho>, AppError> {
        let despachos = sqlx::query_as::<_, Despacho>(
            "SELECT * FROM despachos WHERE id = ANY($1) FOR UPDATE",
        )
        .bind(ids)
        .fetch_all(&mut **tx)
        .await?;

        Ok(despachos)
    }

    /// Vincular un despacho disponible a una ruta
    pub async fn asignar_a_ruta(
        tx: &mut Transaction<'_, Postgres>,
        despacho_id: Uuid,
        ruta_id: Uuid,
        empresa_id: Uuid,
        posicion: i32,
        actor: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE despachos
            SET estado = 'asignado',
                ruta_asignada = $2,
                empresa_reparto = $3,
                posicion_ruta = $4,
                actualizado_por = $5
            WHERE id = $1 AND estado = 'pendiente' AND ruta_asignada IS NULL
            "#,
        )
        .bind(despacho_id)
        .bind(ruta_id)
        .bind(empresa_id)
        .bind(posicion)
        .bind(actor)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Liberar un despacho: vuelve a `pendiente` y queda desvinculado.
    /// La evidencia registrada se conserva para auditoría.
    pub async fn liberar(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        actor: &str,
    ) -> Result<ResultadoLiberacion, AppError> {
        let despacho = sqlx::query_as::<_, Despacho>(
            "SELECT * FROM despachos WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Despacho '{}' no encontrado", id))
        })?;

        if despacho.estado == EstadoDespacho::Pendiente {
            return Ok(ResultadoLiberacion::YaPendiente);
        }

        if !despacho.estado.permite_liberacion() {
            return Err(AppError::InvalidState(format!(
                "Despacho '{}' no puede liberarse desde el estado '{}'",
                id, despacho.estado
            )));
        }

        sqlx::query(
            r#"
            UPDATE despachos
            SET estado = 'pendiente',
                ruta_asignada = NULL,
                empresa_reparto = NULL,
                posicion_ruta = NULL,
                actualizado_por = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(actor)
        .execute(&mut **tx)
        .await?;

        Ok(ResultadoLiberacion::Liberado)
    }

    /// Liberar en bloque todos los despachos no entregados de una ruta.
    /// Una sola sentencia dentro de la transacción de cancelación: o se
    /// liberan todos o no se libera ninguno.
    pub async fn liberar_no_entregados_de_ruta(
        tx: &mut Transaction<'_, Postgres>,
        ruta_id: Uuid,
        actor: &str,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE despachos
            SET estado = 'pendiente',
                ruta_asignada = NULL,
                empresa_reparto = NULL,
                posicion_ruta = NULL,
                actualizado_por = $2
            WHERE ruta_asignada = $1 AND estado IN ('asignado', 'no_entregado')
            "#,
        )
        .bind(ruta_id)
        .bind(actor)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected())
    }

    /// Registrar el documento externo en los despachos aún vinculados a la
    /// ruta que no tengan uno
    pub async fn asignar_documento_externo(
        tx: &mut Transaction<'_, Postgres>,
        ruta_id: Uuid,
        documento: &str,
        actor: &str,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE despachos
            SET documento_externo = $2, actualizado_por = $3
            WHERE ruta_asignada = $1 AND documento_externo IS NULL
            "#,
        )
        .bind(ruta_id)
        .bind(documento)
        .bind(actor)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected())
    }

    /// Cantidad de despachos de la ruta que todavía no están en un estado
    /// terminal
    pub async fn contar_no_terminales(
        tx: &mut Transaction<'_, Postgres>,
        ruta_id: Uuid,
    ) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM despachos
            WHERE ruta_asignada = $1
              AND estado NOT IN ('entregado', 'no_entregado', 'cancelado')
            "#,
        )
        .bind(ruta_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(count)
    }
}
