// src/handlers/staff.rs
//
// Dashboard do personal: mesas ativas e fila de notificações.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::{common::error::AppError, config::AppState};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AtenderNotificacionPayload {
    #[schema(example = "Carla")]
    pub atendida_por: Option<String>,
}

// GET /api/chatbot/sesiones/activas
#[utoipa::path(
    get,
    path = "/api/chatbot/sesiones/activas",
    tag = "Staff",
    responses((status = 200, description = "Mesas con sesión abierta"))
)]
pub async fn sesiones_activas(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let sesiones = app_state
        .sesion_service
        .sesiones_activas(&app_state.db_pool, Utc::now())
        .await?;
    Ok(Json(json!({
        "success": true,
        "total": sesiones.len(),
        "sesiones": sesiones,
    })))
}

// GET /api/chatbot/notificaciones/pendientes
#[utoipa::path(
    get,
    path = "/api/chatbot/notificaciones/pendientes",
    tag = "Staff",
    responses((status = 200, description = "Notificaciones sin atender, urgentes primero"))
)]
pub async fn notificaciones_pendientes(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let notificaciones = app_state
        .feedback_service
        .notificaciones_pendientes(&app_state.db_pool)
        .await?;
    Ok(Json(json!({
        "success": true,
        "total": notificaciones.len(),
        "notificaciones": notificaciones,
    })))
}

// POST /api/chatbot/notificacion/{id}/atender
#[utoipa::path(
    post,
    path = "/api/chatbot/notificacion/{id}/atender",
    tag = "Staff",
    request_body = AtenderNotificacionPayload,
    params(("id" = i64, Path, description = "ID de la notificación")),
    responses(
        (status = 200, description = "Notificación marcada como atendida"),
        (status = 404, description = "Notificación no encontrada"),
        (status = 409, description = "Ya estaba atendida")
    )
)]
pub async fn atender_notificacion(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AtenderNotificacionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let atendida_por = payload.atendida_por;
    app_state
        .feedback_service
        .atender_notificacion(&app_state.db_pool, id, atendida_por)
        .await?;
    Ok(Json(json!({
        "success": true,
        "mensaje": format!("Notificación {id} marcada como atendida"),
    })))
}
