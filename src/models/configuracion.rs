// src/models/configuracion.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// Linha da tabela chave/valor `chatbot_configuracion`: saudações, timeout
/// de sessão, tema e fondo ativos. Tudo que o staff pode ajustar sem deploy.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ConfiguracionChatbot {
    pub id: i64,
    pub clave: String,
    pub valor: String,
    pub tipo: String,
    pub descripcion: Option<String>,
    pub fecha_modificacion: DateTime<Utc>,
}
