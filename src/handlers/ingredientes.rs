// src/handlers/ingredientes.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        parse::{opt_bool_flexible, opt_f64_flexible},
    },
    config::AppState,
    services::catalogo_service::IngredientePatch,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CrearIngredientePayload {
    #[validate(
        required(message = "El nombre es requerido"),
        length(min = 1, message = "El nombre es requerido")
    )]
    pub nombre: Option<String>,

    pub codigo: Option<String>,
    // Cantidad é texto livre ("2 tazas", "al gusto"...), não um número.
    pub cantidad: Option<String>,
    pub unidad: Option<String>,

    #[validate(range(min = 0.0, message = "El costo no puede ser negativo"))]
    #[serde(default, deserialize_with = "opt_f64_flexible")]
    #[schema(value_type = Option<f64>)]
    pub costo: Option<f64>,

    #[serde(default, deserialize_with = "opt_bool_flexible")]
    #[schema(value_type = Option<bool>)]
    pub obligatorio: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ActualizarIngredientePayload {
    #[validate(length(min = 1, message = "El nombre es requerido"))]
    pub nombre: Option<String>,
    pub codigo: Option<String>,
    pub cantidad: Option<String>,
    pub unidad: Option<String>,

    #[validate(range(min = 0.0, message = "El costo no puede ser negativo"))]
    #[serde(default, deserialize_with = "opt_f64_flexible")]
    #[schema(value_type = Option<f64>)]
    pub costo: Option<f64>,

    #[serde(default, deserialize_with = "opt_bool_flexible")]
    #[schema(value_type = Option<bool>)]
    pub obligatorio: Option<bool>,

    #[serde(default, deserialize_with = "opt_bool_flexible")]
    #[schema(value_type = Option<bool>)]
    pub activo: Option<bool>,
}

// GET /menu-admin/api/productos/{id}/ingredientes
#[utoipa::path(
    get,
    path = "/menu-admin/api/productos/{id}/ingredientes",
    tag = "Ingredientes",
    params(("id" = i64, Path, description = "ID del producto dueño")),
    responses(
        (status = 200, description = "Ingredientes del producto"),
        (status = 404, description = "Producto no encontrado")
    )
)]
pub async fn listar_ingredientes(
    State(app_state): State<AppState>,
    Path(producto_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let ingredientes = app_state
        .catalogo_service
        .listar_ingredientes(&app_state.db_pool, producto_id)
        .await?;
    Ok(Json(json!({
        "success": true,
        "total": ingredientes.len(),
        "ingredientes": ingredientes,
    })))
}

// POST /menu-admin/api/productos/{id}/ingredientes
#[utoipa::path(
    post,
    path = "/menu-admin/api/productos/{id}/ingredientes",
    tag = "Ingredientes",
    request_body = CrearIngredientePayload,
    params(("id" = i64, Path, description = "ID del producto dueño")),
    responses(
        (status = 201, description = "Ingrediente agregado"),
        (status = 404, description = "Producto no encontrado")
    )
)]
pub async fn crear_ingrediente(
    State(app_state): State<AppState>,
    Path(producto_id): Path<i64>,
    Json(payload): Json<CrearIngredientePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let ingrediente = app_state
        .catalogo_service
        .crear_ingrediente(
            &app_state.db_pool,
            producto_id,
            &payload.nombre.unwrap_or_default(),
            payload.codigo,
            payload.cantidad,
            payload.unidad,
            payload.costo.unwrap_or(0.0),
            payload.obligatorio.unwrap_or(true),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "mensaje": format!("Ingrediente \"{}\" agregado", ingrediente.nombre),
            "ingrediente": ingrediente,
        })),
    ))
}

// PUT /menu-admin/api/ingredientes/{id}
#[utoipa::path(
    put,
    path = "/menu-admin/api/ingredientes/{id}",
    tag = "Ingredientes",
    request_body = ActualizarIngredientePayload,
    params(("id" = i64, Path, description = "ID del ingrediente")),
    responses(
        (status = 200, description = "Ingrediente actualizado"),
        (status = 404, description = "Ingrediente no encontrado")
    )
)]
pub async fn actualizar_ingrediente(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ActualizarIngredientePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let patch = IngredientePatch {
        codigo: payload.codigo,
        nombre: payload.nombre,
        cantidad: payload.cantidad,
        unidad: payload.unidad,
        costo: payload.costo,
        obligatorio: payload.obligatorio,
        activo: payload.activo,
    };
    let ingrediente = app_state
        .catalogo_service
        .actualizar_ingrediente(&app_state.db_pool, id, patch)
        .await?;
    Ok(Json(json!({ "success": true, "ingrediente": ingrediente })))
}

// DELETE /menu-admin/api/ingredientes/{id}
#[utoipa::path(
    delete,
    path = "/menu-admin/api/ingredientes/{id}",
    tag = "Ingredientes",
    params(("id" = i64, Path, description = "ID del ingrediente")),
    responses(
        (status = 200, description = "Ingrediente eliminado"),
        (status = 404, description = "Ingrediente no encontrado")
    )
)]
pub async fn eliminar_ingrediente(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let ingrediente = app_state
        .catalogo_service
        .eliminar_ingrediente(&app_state.db_pool, id)
        .await?;
    Ok(Json(json!({
        "success": true,
        "mensaje": format!("Ingrediente \"{}\" eliminado", ingrediente.nombre),
    })))
}
