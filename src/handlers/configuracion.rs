// src/handlers/configuracion.rs

use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use validator::Validate;

use crate::{common::error::AppError, config::AppState};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GuardarConfiguracionPayload {
    #[validate(
        required(message = "La clave es requerida"),
        length(min = 1, message = "La clave es requerida")
    )]
    #[schema(example = "sesion_timeout_minutos")]
    pub clave: Option<String>,

    #[validate(required(message = "El valor es requerido"))]
    #[schema(example = "15")]
    pub valor: Option<String>,

    #[schema(example = "integer")]
    pub tipo: Option<String>,
    pub descripcion: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AplicarFondoPayload {
    #[schema(example = "personalizado")]
    pub tipo: Option<String>,

    #[validate(
        required(message = "Se requiere el valor del fondo"),
        length(min = 1, message = "Se requiere el valor del fondo")
    )]
    #[schema(example = "/static/fondos/noche.webp")]
    pub valor: Option<String>,
}

// GET /api/chatbot/configuracion
#[utoipa::path(
    get,
    path = "/api/chatbot/configuracion",
    tag = "Configuración",
    responses((status = 200, description = "Mapa clave → valor completo"))
)]
pub async fn obtener_configuracion(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let configuracion = app_state
        .configuracion_service
        .mapa(&app_state.db_pool)
        .await?;
    Ok(Json(json!({ "success": true, "configuracion": configuracion })))
}

// GET /api/chatbot/configuracion/timeout
//
// O frontend programa o timer de logout com os milisegundos daqui.
#[utoipa::path(
    get,
    path = "/api/chatbot/configuracion/timeout",
    tag = "Configuración",
    responses((status = 200, description = "Timeout de inactividad configurado"))
)]
pub async fn obtener_timeout(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let minutos = app_state
        .configuracion_service
        .timeout_sesion_minutos(&app_state.db_pool)
        .await?;
    Ok(Json(json!({
        "success": true,
        "timeout_minutos": minutos,
        "timeout_milisegundos": minutos * 60 * 1000,
        "mensaje": format!(
            "Sesiones se cierran automáticamente después de {minutos} minutos de inactividad"
        ),
    })))
}

// POST /api/chatbot/configuracion
#[utoipa::path(
    post,
    path = "/api/chatbot/configuracion",
    tag = "Configuración",
    request_body = GuardarConfiguracionPayload,
    responses((status = 200, description = "Clave creada o actualizada"))
)]
pub async fn guardar_configuracion(
    State(app_state): State<AppState>,
    Json(payload): Json<GuardarConfiguracionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let clave = payload.clave.unwrap_or_default();
    app_state
        .configuracion_service
        .set(
            &app_state.db_pool,
            &clave,
            &payload.valor.unwrap_or_default(),
            payload.tipo.as_deref().unwrap_or("string"),
            payload.descripcion.as_deref(),
        )
        .await?;
    Ok(Json(json!({
        "success": true,
        "mensaje": format!("Configuración '{clave}' guardada"),
    })))
}

// POST /api/chatbot/fondos/aplicar
#[utoipa::path(
    post,
    path = "/api/chatbot/fondos/aplicar",
    tag = "Configuración",
    request_body = AplicarFondoPayload,
    responses((status = 200, description = "Fondo aplicado al chatbot"))
)]
pub async fn aplicar_fondo(
    State(app_state): State<AppState>,
    Json(payload): Json<AplicarFondoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    app_state
        .configuracion_service
        .aplicar_fondo(
            &app_state.db_pool,
            payload.tipo.as_deref().unwrap_or("predeterminado"),
            &payload.valor.unwrap_or_default(),
        )
        .await?;
    Ok(Json(json!({ "success": true, "mensaje": "Fondo aplicado correctamente" })))
}
