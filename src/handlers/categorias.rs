// src/handlers/categorias.rs

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
    services::{catalogo_service::CategoriaPatch, iconos},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CrearCategoriaPayload {
    #[validate(
        required(message = "El nombre es requerido"),
        length(min = 1, message = "El nombre es requerido")
    )]
    #[schema(example = "Bebidas")]
    pub nombre: Option<String>,

    pub descripcion: Option<String>,
    // Se não vier, o ícone é detectado pelo nome.
    pub icono: Option<String>,
    pub codigo: Option<String>,

    #[serde(default, deserialize_with = "opt_i64_flexible")]
    #[schema(value_type = Option<i64>)]
    pub orden: Option<i64>,

    #[serde(default, deserialize_with = "opt_bool_flexible")]
    #[schema(value_type = Option<bool>)]
    pub activa: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ActualizarCategoriaPayload {
    #[validate(length(min = 1, message = "El nombre es requerido"))]
    pub nombre: Option<String>,
    pub descripcion: Option<String>,
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
pub struct EliminarCategoriaQuery {
    pub forzar: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PrevisualizarIconoQuery {
    pub nombre: Option<String>,
}

// GET /menu-admin/api/categorias
#[utoipa::path(
    get,
    path = "/menu-admin/api/categorias",
    tag = "Categorías",
    responses((status = 200, description = "Categorías activas"))
)]
pub async fn listar_categorias(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let categorias = app_state
        .catalogo_service
        .listar_categorias(&app_state.db_pool)
        .await?;
    Ok(Json(json!({
        "success": true,
        "total": categorias.len(),
        "categorias": categorias,
    })))
}

// POST /menu-admin/api/categorias
#[utoipa::path(
    post,
    path = "/menu-admin/api/categorias",
    tag = "Categorías",
    request_body = CrearCategoriaPayload,
    responses(
        (status = 201, description = "Categoría creada con icono y código automáticos"),
        (status = 409, description = "Código ya en uso")
    )
)]
pub async fn crear_categoria(
    State(app_state): State<AppState>,
    Json(payload): Json<CrearCategoriaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let nombre = payload.nombre.unwrap_or_default();

    let creada = app_state
        .catalogo_service
        .crear_categoria(
            &app_state.db_pool,
            &nombre,
            payload.descripcion,
            payload.icono,
            payload.codigo,
            payload.orden.unwrap_or(0),
            payload.activa.unwrap_or(true),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "mensaje": format!("Categoría \"{}\" creada exitosamente", creada.categoria.titulo),
            "categoria": creada.categoria,
            "icono_detectado": creada.icono_detectado,
            "codigo_generado": creada.codigo_generado,
        })),
    ))
}

// GET /menu-admin/api/categorias/{id}
#[utoipa::path(
    get,
    path = "/menu-admin/api/categorias/{id}",
    tag = "Categorías",
    params(("id" = i64, Path, description = "ID de la categoría")),
    responses(
        (status = 200, description = "Categoría encontrada"),
        (status = 404, description = "Categoría no encontrada")
    )
)]
pub async fn obtener_categoria(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let categoria = app_state
        .catalogo_service
        .obtener_categoria(&app_state.db_pool, id)
        .await?;
    Ok(Json(json!({ "success": true, "categoria": categoria })))
}

// PUT /menu-admin/api/categorias/{id}
#[utoipa::path(
    put,
    path = "/menu-admin/api/categorias/{id}",
    tag = "Categorías",
    request_body = ActualizarCategoriaPayload,
    params(("id" = i64, Path, description = "ID de la categoría")),
    responses(
        (status = 200, description = "Categoría actualizada"),
        (status = 404, description = "Categoría no encontrada")
    )
)]
pub async fn actualizar_categoria(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ActualizarCategoriaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let patch = CategoriaPatch {
        nombre: payload.nombre,
        descripcion: payload.descripcion,
        icono: payload.icono,
        codigo: payload.codigo,
        orden: payload.orden,
        activa: payload.activa,
    };
    let categoria = app_state
        .catalogo_service
        .actualizar_categoria(&app_state.db_pool, id, patch)
        .await?;
    Ok(Json(json!({ "success": true, "categoria": categoria })))
}

// DELETE /menu-admin/api/categorias/{id}?forzar=true
//
// Sem `forzar`, a eliminação é estrita (recusa com `detalles` quando há
// dependências). Com `forzar=true`, cai no modo cascata: subcategorias fora,
// produtos desvinculados.
#[utoipa::path(
    delete,
    path = "/menu-admin/api/categorias/{id}",
    tag = "Categorías",
    params(
        ("id" = i64, Path, description = "ID de la categoría"),
        ("forzar" = Option<String>, Query, description = "true = eliminación en cascada")
    ),
    responses(
        (status = 200, description = "Categoría eliminada"),
        (status = 400, description = "Tiene productos/subcategorías y no se forzó"),
        (status = 404, description = "Categoría no encontrada")
    )
)]
pub async fn eliminar_categoria(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<EliminarCategoriaQuery>,
) -> Result<impl IntoResponse, AppError> {
    let forzar = query
        .forzar
        .as_deref()
        .map(|f| f.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    if forzar {
        let (categoria, productos, subcategorias) = app_state
            .catalogo_service
            .eliminar_categoria_en_cascada(&app_state.db_pool, id)
            .await?;
        Ok(Json(json!({
            "success": true,
            "mensaje": format!(
                "Categoría \"{}\" eliminada correctamente ({subcategorias} subcategorías \
                 eliminadas y {productos} productos reasignados)",
                categoria.titulo
            ),
            "productos_desvinculados": productos,
            "subcategorias_eliminadas": subcategorias,
        })))
    } else {
        let categoria = app_state
            .catalogo_service
            .eliminar_categoria_estricta(&app_state.db_pool, id)
            .await?;
        Ok(Json(json!({
            "success": true,
            "mensaje": format!("Categoría \"{}\" eliminada correctamente", categoria.titulo),
        })))
    }
}

// GET /menu-admin/api/categorias/previsualizar-icono?nombre=...
#[utoipa::path(
    get,
    path = "/menu-admin/api/categorias/previsualizar-icono",
    tag = "Categorías",
    params(("nombre" = String, Query, description = "Nombre a previsualizar")),
    responses((status = 200, description = "Icono y código sugeridos"))
)]
pub async fn previsualizar_icono(
    Query(query): Query<PrevisualizarIconoQuery>,
) -> Result<impl IntoResponse, AppError> {
    let nombre = query
        .nombre
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Nombre requerido".into()))?;

    let icono = iconos::detectar_icono_categoria(nombre);
    let codigo = iconos::generar_codigo(nombre);
    Ok(Json(json!({
        "success": true,
        "nombre": nombre,
        "icono_sugerido": icono,
        "codigo_sugerido": codigo,
        "preview": format!("{nombre} → {icono}"),
    })))
}

// GET /menu-admin/api/categorias/{id}/subcategorias
#[utoipa::path(
    get,
    path = "/menu-admin/api/categorias/{id}/subcategorias",
    tag = "Categorías",
    params(("id" = i64, Path, description = "ID de la categoría")),
    responses((status = 200, description = "Subcategorías activas de la categoría"))
)]
pub async fn listar_subcategorias_de_categoria(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    // 404 explícito se a categoria não existe, em vez de lista vazia.
    app_state
        .catalogo_service
        .obtener_categoria(&app_state.db_pool, id)
        .await?;
    let subcategorias = app_state
        .catalogo_service
        .listar_subcategorias(&app_state.db_pool, Some(id))
        .await?;
    Ok(Json(json!({
        "success": true,
        "total": subcategorias.len(),
        "subcategorias": subcategorias,
    })))
}
