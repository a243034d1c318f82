// src/db/configuracion_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite};

use crate::{common::error::AppError, models::configuracion::ConfiguracionChatbot};

#[derive(Clone, Default)]
pub struct ConfiguracionRepository;

impl ConfiguracionRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn get<'e, E>(
        &self,
        executor: E,
        clave: &str,
    ) -> Result<Option<ConfiguracionChatbot>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let config = sqlx::query_as::<_, ConfiguracionChatbot>(
            "SELECT * FROM chatbot_configuracion WHERE clave = ?",
        )
        .bind(clave)
        .fetch_optional(executor)
        .await?;
        Ok(config)
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<ConfiguracionChatbot>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let configs = sqlx::query_as::<_, ConfiguracionChatbot>(
            "SELECT * FROM chatbot_configuracion ORDER BY clave",
        )
        .fetch_all(executor)
        .await?;
        Ok(configs)
    }

    /// UPSERT (Insert or Update) pela clave.
    pub async fn upsert<'e, E>(
        &self,
        executor: E,
        clave: &str,
        valor: &str,
        tipo: &str,
        descripcion: Option<&str>,
        ahora: DateTime<Utc>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO chatbot_configuracion (clave, valor, tipo, descripcion, fecha_modificacion)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (clave)
            DO UPDATE SET
                valor = excluded.valor,
                tipo = excluded.tipo,
                fecha_modificacion = excluded.fecha_modificacion
            "#,
        )
        .bind(clave)
        .bind(valor)
        .bind(tipo)
        .bind(descripcion)
        .bind(ahora)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Grava só se a clave ainda não existir (seed dos defaults).
    pub async fn insert_si_ausente<'e, E>(
        &self,
        executor: E,
        clave: &str,
        valor: &str,
        tipo: &str,
        descripcion: &str,
        ahora: DateTime<Utc>,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let resultado = sqlx::query(
            r#"
            INSERT INTO chatbot_configuracion (clave, valor, tipo, descripcion, fecha_modificacion)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (clave) DO NOTHING
            "#,
        )
        .bind(clave)
        .bind(valor)
        .bind(tipo)
        .bind(descripcion)
        .bind(ahora)
        .execute(executor)
        .await?;
        Ok(resultado.rows_affected() > 0)
    }
}
