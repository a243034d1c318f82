// src/db/sesion_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite};

use crate::{common::error::AppError, models::chatbot::Sesion};

#[derive(Clone, Default)]
pub struct SesionRepository;

impl SesionRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn get_sesion<'e, E>(&self, executor: E, id: i64) -> Result<Option<Sesion>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sesion = sqlx::query_as::<_, Sesion>("SELECT * FROM chatbot_sesiones WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(sesion)
    }

    /// A sessão ativa da mesa, se houver. O fluxo de início reutiliza essa
    /// linha em vez de abrir uma segunda sessão para a mesma mesa.
    pub async fn get_sesion_activa_por_mesa<'e, E>(
        &self,
        executor: E,
        mesa: &str,
    ) -> Result<Option<Sesion>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sesion = sqlx::query_as::<_, Sesion>(
            "SELECT * FROM chatbot_sesiones WHERE mesa = ? AND activa = 1 ORDER BY id DESC",
        )
        .bind(mesa)
        .fetch_optional(executor)
        .await?;
        Ok(sesion)
    }

    pub async fn insert_sesion<'e, E>(
        &self,
        executor: E,
        mesa: &str,
        nombre_cliente: Option<&str>,
        dispositivo: Option<&str>,
        ip_cliente: Option<&str>,
        ahora: DateTime<Utc>,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let resultado = sqlx::query(
            r#"
            INSERT INTO chatbot_sesiones
                (mesa, nombre_cliente, fecha_inicio, fecha_ultimo_acceso, dispositivo, ip_cliente)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(mesa)
        .bind(nombre_cliente)
        .bind(ahora)
        .bind(ahora)
        .bind(dispositivo)
        .bind(ip_cliente)
        .execute(executor)
        .await?;
        Ok(resultado.last_insert_rowid())
    }

    /// Renova a janela de inatividade; opcionalmente atualiza o nome do cliente.
    pub async fn touch_sesion<'e, E>(
        &self,
        executor: E,
        id: i64,
        nombre_cliente: Option<&str>,
        ahora: DateTime<Utc>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            UPDATE chatbot_sesiones
               SET fecha_ultimo_acceso = ?,
                   nombre_cliente = COALESCE(?, nombre_cliente)
             WHERE id = ?
            "#,
        )
        .bind(ahora)
        .bind(nombre_cliente)
        .bind(id)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Fechamento manual: marca inativa e registra o último acesso.
    pub async fn cerrar_sesion<'e, E>(
        &self,
        executor: E,
        id: i64,
        ahora: DateTime<Utc>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            "UPDATE chatbot_sesiones SET activa = 0, fecha_ultimo_acceso = ? WHERE id = ?",
        )
        .bind(ahora)
        .bind(id)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Expiração por timeout: só derruba a flag, preservando o timestamp da
    /// última atividade real do cliente.
    pub async fn expirar_sesion<'e, E>(&self, executor: E, id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query("UPDATE chatbot_sesiones SET activa = 0 WHERE id = ?")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn list_sesiones_activas<'e, E>(&self, executor: E) -> Result<Vec<Sesion>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sesiones = sqlx::query_as::<_, Sesion>(
            "SELECT * FROM chatbot_sesiones WHERE activa = 1 ORDER BY fecha_inicio DESC",
        )
        .fetch_all(executor)
        .await?;
        Ok(sesiones)
    }
}
