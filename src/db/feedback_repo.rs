// src/db/feedback_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite};

use crate::{
    common::error::AppError,
    models::chatbot::{Calificacion, CalificacionConSesion, NotificacionMesero, NotificacionPendiente},
};

#[derive(Clone, Default)]
pub struct FeedbackRepository;

impl FeedbackRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Calificaciones
    // ---

    pub async fn get_calificacion<'e, E>(
        &self,
        executor: E,
        sesion_id: i64,
        categoria: &str,
    ) -> Result<Option<Calificacion>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let calificacion = sqlx::query_as::<_, Calificacion>(
            "SELECT * FROM chatbot_calificaciones WHERE sesion_id = ? AND categoria = ?",
        )
        .bind(sesion_id)
        .bind(categoria)
        .fetch_optional(executor)
        .await?;
        Ok(calificacion)
    }

    /// UPSERT atômico: a segunda calificação da mesma (sessão, categoria)
    /// sobrescreve a primeira, sem janela para duplicatas.
    pub async fn upsert_calificacion<'e, E>(
        &self,
        executor: E,
        sesion_id: i64,
        estrellas: i64,
        categoria: &str,
        ahora: DateTime<Utc>,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO chatbot_calificaciones (sesion_id, estrellas, categoria, fecha_calificacion)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (sesion_id, categoria)
            DO UPDATE SET
                estrellas = excluded.estrellas,
                fecha_calificacion = excluded.fecha_calificacion
            RETURNING id
            "#,
        )
        .bind(sesion_id)
        .bind(estrellas)
        .bind(categoria)
        .bind(ahora)
        .fetch_one(executor)
        .await?;
        Ok(id)
    }

    pub async fn list_calificaciones_de_sesion<'e, E>(
        &self,
        executor: E,
        sesion_id: i64,
    ) -> Result<Vec<Calificacion>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let calificaciones = sqlx::query_as::<_, Calificacion>(
            "SELECT * FROM chatbot_calificaciones WHERE sesion_id = ? ORDER BY categoria",
        )
        .bind(sesion_id)
        .fetch_all(executor)
        .await?;
        Ok(calificaciones)
    }

    pub async fn list_calificaciones_recientes<'e, E>(
        &self,
        executor: E,
        limit: i64,
    ) -> Result<Vec<CalificacionConSesion>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let calificaciones = sqlx::query_as::<_, CalificacionConSesion>(
            r#"
            SELECT c.id, c.sesion_id, s.mesa, s.nombre_cliente AS cliente,
                   c.estrellas, c.categoria, c.fecha_calificacion
              FROM chatbot_calificaciones c
              JOIN chatbot_sesiones s ON s.id = c.sesion_id
             ORDER BY c.fecha_calificacion DESC
             LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(executor)
        .await?;
        Ok(calificaciones)
    }

    // ---
    // Comentarios
    // ---

    pub async fn insert_comentario<'e, E>(
        &self,
        executor: E,
        sesion_id: i64,
        texto_comentario: &str,
        tipo: &str,
        ahora: DateTime<Utc>,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let resultado = sqlx::query(
            r#"
            INSERT INTO chatbot_comentarios (sesion_id, texto_comentario, tipo, fecha_comentario)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(sesion_id)
        .bind(texto_comentario)
        .bind(tipo)
        .bind(ahora)
        .execute(executor)
        .await?;
        Ok(resultado.last_insert_rowid())
    }

    // ---
    // Notificaciones al personal
    // ---

    pub async fn insert_notificacion<'e, E>(
        &self,
        executor: E,
        sesion_id: i64,
        tipo_notificacion: &str,
        mensaje: Option<&str>,
        prioridad: &str,
        ahora: DateTime<Utc>,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let resultado = sqlx::query(
            r#"
            INSERT INTO chatbot_notificaciones
                (sesion_id, tipo_notificacion, mensaje, prioridad, fecha_notificacion)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(sesion_id)
        .bind(tipo_notificacion)
        .bind(mensaje)
        .bind(prioridad)
        .bind(ahora)
        .execute(executor)
        .await?;
        Ok(resultado.last_insert_rowid())
    }

    pub async fn get_notificacion<'e, E>(
        &self,
        executor: E,
        id: i64,
    ) -> Result<Option<NotificacionMesero>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let notificacion = sqlx::query_as::<_, NotificacionMesero>(
            "SELECT * FROM chatbot_notificaciones WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(notificacion)
    }

    /// Pendentes, urgentes primeiro e dentro da urgência as mais antigas.
    pub async fn list_notificaciones_pendientes<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<NotificacionPendiente>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let notificaciones = sqlx::query_as::<_, NotificacionPendiente>(
            r#"
            SELECT n.id, n.sesion_id, s.mesa, s.nombre_cliente AS cliente,
                   n.tipo_notificacion, n.mensaje, n.prioridad, n.fecha_notificacion
              FROM chatbot_notificaciones n
              JOIN chatbot_sesiones s ON s.id = n.sesion_id
             WHERE n.atendida = 0
             ORDER BY CASE n.prioridad
                          WHEN 'urgente' THEN 0
                          WHEN 'alta' THEN 1
                          WHEN 'normal' THEN 2
                          ELSE 3
                      END,
                      n.fecha_notificacion ASC
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(notificaciones)
    }

    /// Transição de mão única. O `atendida = 0` no WHERE garante que uma
    /// notificação só é atendida uma vez, mesmo com dois cliques simultâneos.
    pub async fn atender_notificacion<'e, E>(
        &self,
        executor: E,
        id: i64,
        atendida_por: &str,
        ahora: DateTime<Utc>,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let resultado = sqlx::query(
            r#"
            UPDATE chatbot_notificaciones
               SET atendida = 1, atendida_por = ?, fecha_atencion = ?
             WHERE id = ? AND atendida = 0
            "#,
        )
        .bind(atendida_por)
        .bind(ahora)
        .bind(id)
        .execute(executor)
        .await?;
        Ok(resultado.rows_affected())
    }
}
