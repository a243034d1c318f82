// src/config.rs

use std::{env, str::FromStr, time::Duration};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::{
    db::{CatalogoRepository, ConfiguracionRepository, FeedbackRepository, SesionRepository},
    services::{CatalogoService, ConfiguracionService, FeedbackService, SesionService},
};

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub catalogo_service: CatalogoService,
    pub sesion_service: SesionService,
    pub feedback_service: FeedbackService,
    pub configuracion_service: ConfiguracionService,
}

impl AppState {
    // Carrega o ambiente, abre a pool e monta o estado.
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        // O banco padrão é o menu.db do lado do binário, como sempre foi.
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:menu.db".to_string());

        // `foreign_keys` precisa ser ligado por conexão no SQLite; sem isso
        // as FKs do schema viram decoração.
        let options = SqliteConnectOptions::from_str(&database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let db_pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(options)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(db_pool))
    }

    /// Monta o gráfico de dependências sobre uma pool já existente.
    /// Os testes usam isto direto com a pool em memória.
    pub fn with_pool(db_pool: SqlitePool) -> Self {
        let sesion_repo = SesionRepository::new();
        let catalogo_service = CatalogoService::new(CatalogoRepository::new());
        let sesion_service = SesionService::new(sesion_repo.clone());
        let feedback_service = FeedbackService::new(FeedbackRepository::new(), sesion_repo);
        let configuracion_service = ConfiguracionService::new(ConfiguracionRepository::new());

        Self {
            db_pool,
            catalogo_service,
            sesion_service,
            feedback_service,
            configuracion_service,
        }
    }
}

/// Porta de escuta (env `PORT`, default 3000).
pub fn puerto() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000)
}
