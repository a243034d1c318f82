// src/handlers/chatbot.rs
//
// Endpoints que o próprio cliente (a UI da mesa) consome: ciclo de vida da
// sessão, calificações, comentários e chamada ao personal.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::{error::AppError, parse::opt_i64_flexible},
    config::AppState,
    services::sesion_service::{DatosInicioSesion, ValidacionSesion},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct IniciarSesionPayload {
    #[validate(
        required(message = "Se requiere la mesa"),
        length(min = 1, message = "Se requiere la mesa")
    )]
    #[schema(example = "5")]
    pub mesa: Option<String>,

    pub nombre_cliente: Option<String>,
    pub dispositivo: Option<String>,
    pub ip_cliente: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CalificacionPayload {
    #[validate(required(message = "Se requiere sesion_id"))]
    #[serde(default, deserialize_with = "opt_i64_flexible")]
    #[schema(value_type = Option<i64>)]
    pub sesion_id: Option<i64>,

    #[validate(
        required(message = "Se requieren estrellas entre 1 y 5"),
        range(min = 1, max = 5, message = "Se requieren estrellas entre 1 y 5")
    )]
    #[serde(default, deserialize_with = "opt_i64_flexible")]
    #[schema(value_type = Option<i64>, example = 5)]
    pub estrellas: Option<i64>,

    #[schema(example = "servicio")]
    pub categoria: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ComentarioPayload {
    #[validate(required(message = "Se requiere sesion_id"))]
    #[serde(default, deserialize_with = "opt_i64_flexible")]
    #[schema(value_type = Option<i64>)]
    pub sesion_id: Option<i64>,

    #[validate(
        required(message = "Se requiere texto_comentario"),
        length(min = 1, message = "Se requiere texto_comentario")
    )]
    pub texto_comentario: Option<String>,

    #[schema(example = "sugerencia")]
    pub tipo: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NotificacionMeseroPayload {
    #[validate(required(message = "Se requiere sesion_id"))]
    #[serde(default, deserialize_with = "opt_i64_flexible")]
    #[schema(value_type = Option<i64>)]
    pub sesion_id: Option<i64>,

    #[schema(example = "llamar_mesero")]
    pub tipo_notificacion: Option<String>,
    pub mensaje: Option<String>,
    #[schema(example = "normal")]
    pub prioridad: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CalificacionesQuery {
    pub sesion_id: Option<i64>,
    pub limit: Option<i64>,
}

// POST /api/chatbot/sesion/iniciar
#[utoipa::path(
    post,
    path = "/api/chatbot/sesion/iniciar",
    tag = "Chatbot",
    request_body = IniciarSesionPayload,
    responses((status = 200, description = "Sesión nueva o reutilizada para la mesa"))
)]
pub async fn iniciar_sesion(
    State(app_state): State<AppState>,
    Json(payload): Json<IniciarSesionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let datos = DatosInicioSesion {
        mesa: payload.mesa.unwrap_or_default(),
        nombre_cliente: payload.nombre_cliente,
        dispositivo: payload.dispositivo,
        ip_cliente: payload.ip_cliente,
    };
    let (sesion, reutilizada) = app_state
        .sesion_service
        .iniciar(&app_state.db_pool, datos)
        .await?;

    Ok(Json(json!({
        "success": true,
        "sesion_id": sesion.id,
        "reutilizada": reutilizada,
        "mensaje": format!("Sesión iniciada para mesa {}", sesion.mesa),
    })))
}

// GET /api/chatbot/sesion/{id}
#[utoipa::path(
    get,
    path = "/api/chatbot/sesion/{id}",
    tag = "Chatbot",
    params(("id" = i64, Path, description = "ID de la sesión")),
    responses(
        (status = 200, description = "Datos de la sesión"),
        (status = 404, description = "Sesión no encontrada")
    )
)]
pub async fn obtener_sesion(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let sesion = app_state.sesion_service.obtener(&app_state.db_pool, id).await?;
    Ok(Json(json!({ "success": true, "sesion": sesion })))
}

// POST /api/chatbot/sesion/{id}/actividad
#[utoipa::path(
    post,
    path = "/api/chatbot/sesion/{id}/actividad",
    tag = "Chatbot",
    params(("id" = i64, Path, description = "ID de la sesión")),
    responses(
        (status = 200, description = "Ventana de inactividad renovada"),
        (status = 400, description = "Sesión ya cerrada"),
        (status = 404, description = "Sesión no encontrada")
    )
)]
pub async fn actualizar_actividad(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let sesion = app_state
        .sesion_service
        .actualizar_actividad(&app_state.db_pool, id)
        .await?;
    Ok(Json(json!({
        "success": true,
        "sesion_id": sesion.id,
        "ultima_actividad": sesion.fecha_ultimo_acceso,
    })))
}

// GET /api/chatbot/sesion/{id}/validar
//
// A leitura que o frontend faz em loop. Se o timeout venceu, a sessão é
// expirada aqui e reportada como inválida; o cliente volta para a tela
// inicial.
#[utoipa::path(
    get,
    path = "/api/chatbot/sesion/{id}/validar",
    tag = "Chatbot",
    params(("id" = i64, Path, description = "ID de la sesión")),
    responses(
        (status = 200, description = "Resultado de la validación"),
        (status = 404, description = "Sesión no encontrada")
    )
)]
pub async fn validar_sesion(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let timeout = app_state
        .configuracion_service
        .timeout_sesion_minutos(&app_state.db_pool)
        .await?;
    let resultado = app_state
        .sesion_service
        .validar(&app_state.db_pool, id, timeout)
        .await?;

    let body = match resultado {
        ValidacionSesion::Valida { tiempo_restante_segundos } => json!({
            "success": true,
            "valida": true,
            "tiempo_restante_segundos": tiempo_restante_segundos,
        }),
        ValidacionSesion::Invalida { razon } => json!({
            "success": true,
            "valida": false,
            "razon": razon,
        }),
    };
    Ok(Json(body))
}

// POST /api/chatbot/sesion/{id}/cerrar
#[utoipa::path(
    post,
    path = "/api/chatbot/sesion/{id}/cerrar",
    tag = "Chatbot",
    params(("id" = i64, Path, description = "ID de la sesión")),
    responses(
        (status = 200, description = "Sesión cerrada"),
        (status = 404, description = "Sesión no encontrada")
    )
)]
pub async fn cerrar_sesion(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.sesion_service.cerrar(&app_state.db_pool, id).await?;
    Ok(Json(json!({
        "success": true,
        "sesion_id": id,
        "mensaje": "Sesión cerrada correctamente",
    })))
}

// POST /api/chatbot/calificacion
#[utoipa::path(
    post,
    path = "/api/chatbot/calificacion",
    tag = "Chatbot",
    request_body = CalificacionPayload,
    responses(
        (status = 200, description = "Calificación creada o sobrescrita"),
        (status = 400, description = "Estrellas fuera de rango o sesión inactiva"),
        (status = 404, description = "Sesión no encontrada")
    )
)]
pub async fn guardar_calificacion(
    State(app_state): State<AppState>,
    Json(payload): Json<CalificacionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let estrellas = payload.estrellas.unwrap_or_default();
    let (calificacion_id, accion) = app_state
        .feedback_service
        .calificar(
            &app_state.db_pool,
            payload.sesion_id.unwrap_or_default(),
            estrellas,
            payload.categoria,
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "accion": accion,
        "calificacion_id": calificacion_id,
        "mensaje": format!("Calificación de {estrellas} estrellas guardada"),
    })))
}

// GET /api/chatbot/calificaciones
//
// Com `sesion_id`, devolve as calificações daquela sessão; sem ele, o resumo
// recente com estatísticas para o dashboard.
#[utoipa::path(
    get,
    path = "/api/chatbot/calificaciones",
    tag = "Chatbot",
    params(
        ("sesion_id" = Option<i64>, Query, description = "Solo las de esta sesión"),
        ("limit" = Option<i64>, Query, description = "Máximo de filas (default 50)")
    ),
    responses((status = 200, description = "Calificaciones"))
)]
pub async fn obtener_calificaciones(
    State(app_state): State<AppState>,
    Query(query): Query<CalificacionesQuery>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(sesion_id) = query.sesion_id {
        let calificaciones = app_state
            .feedback_service
            .calificaciones_de_sesion(&app_state.db_pool, sesion_id)
            .await?;
        return Ok(Json(json!({
            "success": true,
            "sesion_id": sesion_id,
            "calificaciones": calificaciones,
        })));
    }

    let limit = query.limit.filter(|l| *l > 0).unwrap_or(50);
    let (calificaciones, estadisticas) = app_state
        .feedback_service
        .calificaciones_recientes(&app_state.db_pool, limit)
        .await?;
    Ok(Json(json!({
        "success": true,
        "calificaciones": calificaciones,
        "estadisticas": estadisticas,
    })))
}

// POST /api/chatbot/comentario
#[utoipa::path(
    post,
    path = "/api/chatbot/comentario",
    tag = "Chatbot",
    request_body = ComentarioPayload,
    responses(
        (status = 200, description = "Comentario guardado"),
        (status = 404, description = "Sesión no encontrada")
    )
)]
pub async fn guardar_comentario(
    State(app_state): State<AppState>,
    Json(payload): Json<ComentarioPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let comentario_id = app_state
        .feedback_service
        .comentar(
            &app_state.db_pool,
            payload.sesion_id.unwrap_or_default(),
            payload.texto_comentario.as_deref().unwrap_or_default(),
            payload.tipo,
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "comentario_id": comentario_id,
        "mensaje": "Comentario guardado correctamente",
    })))
}

// POST /api/chatbot/notificacion/mesero
#[utoipa::path(
    post,
    path = "/api/chatbot/notificacion/mesero",
    tag = "Chatbot",
    request_body = NotificacionMeseroPayload,
    responses(
        (status = 200, description = "Notificación enviada al personal"),
        (status = 404, description = "Sesión no encontrada")
    )
)]
pub async fn llamar_mesero(
    State(app_state): State<AppState>,
    Json(payload): Json<NotificacionMeseroPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (notificacion_id, mesa) = app_state
        .feedback_service
        .llamar_mesero(
            &app_state.db_pool,
            payload.sesion_id.unwrap_or_default(),
            payload.tipo_notificacion,
            payload.mensaje,
            payload.prioridad,
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "notificacion_id": notificacion_id,
        "mensaje": format!("Notificación enviada - Mesa {mesa}"),
    })))
}

// GET /api/chatbot/saludo
#[utoipa::path(
    get,
    path = "/api/chatbot/saludo",
    tag = "Chatbot",
    responses((status = 200, description = "Saludo según la hora del restaurante"))
)]
pub async fn obtener_saludo(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    use chrono::Timelike;
    let hora = chrono::Local::now().hour();
    let saludo = app_state
        .configuracion_service
        .saludo(&app_state.db_pool, hora)
        .await?;
    Ok(Json(json!({ "success": true, "saludo": saludo, "hora": hora })))
}
