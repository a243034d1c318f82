// src/handlers/subcategorias.rs

use axum::{
    extract::{Path, Query, State},
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
        parse::{opt_bool_flexible, opt_i64_flexible},
    },
    config::AppState,
    services::catalogo_service::SubcategoriaPatch,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CrearSubcategoriaPayload {
    #[validate(
        required(message = "El nombre es requerido"),
        length(min = 1, message = "El nombre es requerido")
    )]
    pub nombre: Option<String>,

    #[validate(required(message = "El campo 'categoria_id' es obligatorio."))]
    #[serde(default, deserialize_with = "opt_i64_flexible")]
    #[schema(value_type = Option<i64>)]
    pub categoria_id: Option<i64>,

    pub descripcion: Option<String>,
    pub tipo: Option<String>,
    pub icono: Option<String>,
    pub codigo: Option<String>,

    #[serde(default, deserialize_with = "opt_i64_flexible")]
    #[schema(value_type = Option<i64>)]
    pub orden: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ActualizarSubcategoriaPayload {
    #[validate(length(min = 1, message = "El nombre es requerido"))]
    pub nombre: Option<String>,

    #[serde(default, deserialize_with = "opt_i64_flexible")]
    #[schema(value_type = Option<i64>)]
    pub categoria_id: Option<i64>,

    pub descripcion: Option<String>,
    pub tipo: Option<String>,
    pub icono: Option<String>,
    pub codigo: Option<String>,

    #[serde(default, deserialize_with = "opt_i64_flexible")]
    #[schema(value_type = Option<i64>)]
    pub orden: Option<i64>,

    #[serde(default, deserialize_with = "opt_bool_flexible")]
    #[schema(value_type = Option<bool>)]
    pub activa: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ListarSubcategoriasQuery {
    pub categoria_id: Option<i64>,
}

// GET /menu-admin/api/subcategorias
#[utoipa::path(
    get,
    path = "/menu-admin/api/subcategorias",
    tag = "Subcategorías",
    params(("categoria_id" = Option<i64>, Query, description = "Filtrar por categoría padre")),
    responses((status = 200, description = "Subcategorías activas"))
)]
pub async fn listar_subcategorias(
    State(app_state): State<AppState>,
    Query(query): Query<ListarSubcategoriasQuery>,
) -> Result<impl IntoResponse, AppError> {
    let subcategorias = app_state
        .catalogo_service
        .listar_subcategorias(&app_state.db_pool, query.categoria_id)
        .await?;
    Ok(Json(json!({
        "success": true,
        "total": subcategorias.len(),
        "subcategorias": subcategorias,
    })))
}

// POST /menu-admin/api/subcategorias
#[utoipa::path(
    post,
    path = "/menu-admin/api/subcategorias",
    tag = "Subcategorías",
    request_body = CrearSubcategoriaPayload,
    responses(
        (status = 201, description = "Subcategoría creada"),
        (status = 404, description = "Categoría padre inexistente")
    )
)]
pub async fn crear_subcategoria(
    State(app_state): State<AppState>,
    Json(payload): Json<CrearSubcategoriaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let subcategoria = app_state
        .catalogo_service
        .crear_subcategoria(
            &app_state.db_pool,
            &payload.nombre.unwrap_or_default(),
            payload.descripcion,
            payload.categoria_id.unwrap_or_default(),
            payload.tipo,
            payload.icono,
            payload.codigo,
            payload.orden.unwrap_or(0),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "mensaje": format!("Subcategoría \"{}\" creada exitosamente", subcategoria.nombre),
            "subcategoria": subcategoria,
        })),
    ))
}

// GET /menu-admin/api/subcategorias/{id}
#[utoipa::path(
    get,
    path = "/menu-admin/api/subcategorias/{id}",
    tag = "Subcategorías",
    params(("id" = i64, Path, description = "ID de la subcategoría")),
    responses(
        (status = 200, description = "Subcategoría encontrada"),
        (status = 404, description = "Subcategoría no encontrada")
    )
)]
pub async fn obtener_subcategoria(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let subcategoria = app_state
        .catalogo_service
        .obtener_subcategoria(&app_state.db_pool, id)
        .await?;
    Ok(Json(json!({ "success": true, "subcategoria": subcategoria })))
}

// PUT /menu-admin/api/subcategorias/{id}
#[utoipa::path(
    put,
    path = "/menu-admin/api/subcategorias/{id}",
    tag = "Subcategorías",
    request_body = ActualizarSubcategoriaPayload,
    params(("id" = i64, Path, description = "ID de la subcategoría")),
    responses(
        (status = 200, description = "Subcategoría actualizada"),
        (status = 404, description = "Subcategoría no encontrada")
    )
)]
pub async fn actualizar_subcategoria(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ActualizarSubcategoriaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let patch = SubcategoriaPatch {
        nombre: payload.nombre,
        descripcion: payload.descripcion,
        categoria_id: payload.categoria_id,
        tipo: payload.tipo,
        icono: payload.icono,
        codigo: payload.codigo,
        orden: payload.orden,
        activa: payload.activa,
    };
    let subcategoria = app_state
        .catalogo_service
        .actualizar_subcategoria(&app_state.db_pool, id, patch)
        .await?;
    Ok(Json(json!({ "success": true, "subcategoria": subcategoria })))
}

// DELETE /menu-admin/api/subcategorias/{id}
#[utoipa::path(
    delete,
    path = "/menu-admin/api/subcategorias/{id}",
    tag = "Subcategorías",
    params(("id" = i64, Path, description = "ID de la subcategoría")),
    responses(
        (status = 200, description = "Subcategoría eliminada"),
        (status = 400, description = "Tiene productos asociados"),
        (status = 404, description = "Subcategoría no encontrada")
    )
)]
pub async fn eliminar_subcategoria(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let subcategoria = app_state
        .catalogo_service
        .eliminar_subcategoria(&app_state.db_pool, id)
        .await?;
    Ok(Json(json!({
        "success": true,
        "mensaje": format!("Subcategoría \"{}\" eliminada correctamente", subcategoria.nombre),
    })))
}
