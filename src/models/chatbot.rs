// src/models/chatbot.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// Sessão de uma mesa no chatbot. No máximo uma sessão `activa` por mesa;
/// a inatividade além do timeout configurado encerra a sessão.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Sesion {
    pub id: i64,
    pub mesa: String,
    pub nombre_cliente: Option<String>,
    pub fecha_inicio: DateTime<Utc>,
    pub fecha_ultimo_acceso: DateTime<Utc>,
    pub dispositivo: Option<String>,
    pub ip_cliente: Option<String>,
    pub activa: bool,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Calificacion {
    pub id: i64,
    pub sesion_id: i64,
    pub estrellas: i64,
    pub categoria: String,
    pub fecha_calificacion: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Comentario {
    pub id: i64,
    pub sesion_id: i64,
    pub texto_comentario: String,
    pub tipo: String,
    pub fecha_comentario: DateTime<Utc>,
    pub moderado: bool,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct NotificacionMesero {
    pub id: i64,
    pub sesion_id: i64,
    pub tipo_notificacion: String,
    pub mensaje: Option<String>,
    pub prioridad: String,
    pub fecha_notificacion: DateTime<Utc>,
    pub atendida: bool,
    pub atendida_por: Option<String>,
    pub fecha_atencion: Option<DateTime<Utc>>,
}

// --- Vistas para o dashboard do staff ---

/// Calificação com os dados da sessão já resolvidos (JOIN).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct CalificacionConSesion {
    pub id: i64,
    pub sesion_id: i64,
    pub mesa: String,
    pub cliente: Option<String>,
    pub estrellas: i64,
    pub categoria: String,
    pub fecha_calificacion: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct NotificacionPendiente {
    pub id: i64,
    pub sesion_id: i64,
    pub mesa: String,
    pub cliente: Option<String>,
    pub tipo_notificacion: String,
    pub mensaje: Option<String>,
    pub prioridad: String,
    pub fecha_notificacion: DateTime<Utc>,
}

/// Linha do painel "mesas ativas": tempos já calculados no servidor.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SesionActivaResumen {
    pub id: i64,
    pub mesa: String,
    pub cliente: String,
    pub inicio: DateTime<Utc>,
    pub ultimo_acceso: DateTime<Utc>,
    pub minutos_activa: i64,
    pub minutos_inactiva: i64,
    pub dispositivo: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EstadisticasCalificaciones {
    pub total: i64,
    pub promedio: f64,
    pub excelentes: i64,
    pub necesitan_atencion: i64,
}
