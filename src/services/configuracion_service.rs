// src/services/configuracion_service.rs

use std::collections::BTreeMap;

use chrono::Utc;
use sqlx::{Acquire, Executor, Sqlite};

use crate::{common::error::AppError, db::ConfiguracionRepository};

/// Tudo que o staff ajusta sem deploy mora na tabela `chatbot_configuracion`.
/// Este serviço é a única porta de entrada para ela: os handlers recebem o
/// serviço injetado pelo `AppState` em vez de consultar a tabela por conta.
#[derive(Clone)]
pub struct ConfiguracionService {
    repo: ConfiguracionRepository,
}

/// Valores semeados na primeira subida (e recriados se alguém apagar a linha).
const DEFAULTS: &[(&str, &str, &str, &str)] = &[
    ("saludo_manana", "Buenos días", "string", "Saludo para horas de la mañana (6:00 - 11:59)"),
    ("saludo_tarde", "Buenas tardes", "string", "Saludo para horas de la tarde (12:00 - 17:59)"),
    ("saludo_noche", "Buenas noches", "string", "Saludo para horas de la noche (18:00 - 5:59)"),
    ("sesion_timeout_minutos", "10", "integer", "Minutos de inactividad antes de cerrar la sesión"),
    ("notificaciones_habilitadas", "true", "boolean", "Habilitar notificaciones al personal"),
    ("tema_activo", "eterials_clasico", "string", "Tema actualmente activo en el chatbot"),
    ("fondo_tipo", "predeterminado", "string", "Tipo del fondo aplicado (predeterminado/personalizado)"),
    ("fondo_valor", "", "string", "Identificador o URL del fondo aplicado"),
];

pub const TIMEOUT_SESION_DEFAULT_MINUTOS: i64 = 10;

impl ConfiguracionService {
    pub fn new(repo: ConfiguracionRepository) -> Self {
        Self { repo }
    }

    /// Semeia as claves default que ainda não existirem. Retorna quantas criou.
    pub async fn inicializar_defaults<'a, A>(&self, conn: A) -> Result<usize, AppError>
    where
        A: Acquire<'a, Database = Sqlite>,
    {
        let mut tx = conn.begin().await?;
        let ahora = Utc::now();
        let mut creadas = 0;
        for (clave, valor, tipo, descripcion) in DEFAULTS {
            if self
                .repo
                .insert_si_ausente(&mut *tx, clave, valor, tipo, descripcion, ahora)
                .await?
            {
                creadas += 1;
            }
        }
        tx.commit().await?;
        Ok(creadas)
    }

    pub async fn get_valor<'e, E>(&self, executor: E, clave: &str) -> Result<Option<String>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        Ok(self.repo.get(executor, clave).await?.map(|c| c.valor))
    }

    pub async fn get_i64<'e, E>(&self, executor: E, clave: &str, default: i64) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let valor = self.repo.get(executor, clave).await?;
        Ok(valor
            .and_then(|c| c.valor.trim().parse::<i64>().ok())
            .unwrap_or(default))
    }

    /// Timeout de inatividade das sessões do chatbot, em minutos.
    pub async fn timeout_sesion_minutos<'e, E>(&self, executor: E) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        self.get_i64(executor, "sesion_timeout_minutos", TIMEOUT_SESION_DEFAULT_MINUTOS)
            .await
    }

    pub async fn set<'e, E>(
        &self,
        executor: E,
        clave: &str,
        valor: &str,
        tipo: &str,
        descripcion: Option<&str>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let clave = clave.trim();
        if clave.is_empty() {
            return Err(AppError::InvalidInput("La clave es requerida".into()));
        }
        self.repo
            .upsert(executor, clave, valor, tipo, descripcion, Utc::now())
            .await
    }

    /// Mapa clave → valor completo, para o endpoint público de configuração.
    pub async fn mapa<'e, E>(&self, executor: E) -> Result<BTreeMap<String, String>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let filas = self.repo.list(executor).await?;
        Ok(filas.into_iter().map(|c| (c.clave, c.valor)).collect())
    }

    /// Saudação conforme a hora local do restaurante.
    pub async fn saludo<'e, E>(&self, executor: E, hora: u32) -> Result<String, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let (clave, fallback) = match hora {
            6..=11 => ("saludo_manana", "Buenos días"),
            12..=17 => ("saludo_tarde", "Buenas tardes"),
            _ => ("saludo_noche", "Buenas noches"),
        };
        Ok(self
            .get_valor(executor, clave)
            .await?
            .unwrap_or_else(|| fallback.to_string()))
    }

    /// Aplica um fondo ao chatbot (grava tipo + valor numa transação só).
    pub async fn aplicar_fondo<'a, A>(
        &self,
        conn: A,
        tipo: &str,
        valor: &str,
    ) -> Result<(), AppError>
    where
        A: Acquire<'a, Database = Sqlite>,
    {
        if valor.trim().is_empty() {
            return Err(AppError::InvalidInput("Se requiere el valor del fondo".into()));
        }
        let mut tx = conn.begin().await?;
        let ahora = Utc::now();
        self.repo
            .upsert(&mut *tx, "fondo_tipo", tipo, "string", None, ahora)
            .await?;
        self.repo
            .upsert(&mut *tx, "fondo_valor", valor, "string", None, ahora)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::pool_de_prueba;

    #[tokio::test]
    async fn defaults_se_crean_una_sola_vez() {
        let pool = pool_de_prueba().await;
        let service = ConfiguracionService::new(ConfiguracionRepository::new());

        let creadas = service.inicializar_defaults(&pool).await.unwrap();
        assert_eq!(creadas, DEFAULTS.len());

        // Segunda chamada não duplica nada.
        let creadas = service.inicializar_defaults(&pool).await.unwrap();
        assert_eq!(creadas, 0);

        let timeout = service.timeout_sesion_minutos(&pool).await.unwrap();
        assert_eq!(timeout, 10);
    }

    #[tokio::test]
    async fn set_sobrescribe_y_mapa_refleja() {
        let pool = pool_de_prueba().await;
        let service = ConfiguracionService::new(ConfiguracionRepository::new());
        service.inicializar_defaults(&pool).await.unwrap();

        service
            .set(&pool, "sesion_timeout_minutos", "25", "integer", None)
            .await
            .unwrap();

        assert_eq!(service.timeout_sesion_minutos(&pool).await.unwrap(), 25);
        let mapa = service.mapa(&pool).await.unwrap();
        assert_eq!(mapa.get("sesion_timeout_minutos").map(String::as_str), Some("25"));
    }

    #[tokio::test]
    async fn saludo_por_franja_horaria() {
        let pool = pool_de_prueba().await;
        let service = ConfiguracionService::new(ConfiguracionRepository::new());
        service.inicializar_defaults(&pool).await.unwrap();

        assert_eq!(service.saludo(&pool, 8).await.unwrap(), "Buenos días");
        assert_eq!(service.saludo(&pool, 14).await.unwrap(), "Buenas tardes");
        assert_eq!(service.saludo(&pool, 23).await.unwrap(), "Buenas noches");
        assert_eq!(service.saludo(&pool, 2).await.unwrap(), "Buenas noches");
    }
}
