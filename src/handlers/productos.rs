// src/handlers/productos.rs

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
        parse::{opt_bool_flexible, opt_f64_flexible, opt_i64_flexible},
    },
    config::AppState,
    models::catalogo::{NuevoProducto, TipoProducto},
    services::catalogo_service::ProductoPatch,
};

// ---
// Payload: crear producto
// ---
// O formulário do admin manda precio como string e ids como string vazia;
// as coerções de `common::parse` normalizam isso antes do validator.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CrearProductoPayload {
    #[validate(
        required(message = "Faltan datos requeridos: nombre"),
        length(min = 1, message = "El nombre del producto no puede estar vacío")
    )]
    pub nombre: Option<String>,

    #[validate(
        required(message = "Faltan datos requeridos: precio"),
        range(exclusive_min = 0.0, message = "El precio debe ser mayor a 0")
    )]
    #[serde(default, deserialize_with = "opt_f64_flexible")]
    #[schema(value_type = Option<f64>, example = 6.0)]
    pub precio: Option<f64>,

    pub codigo: Option<String>,
    pub descripcion: Option<String>,

    #[serde(default, deserialize_with = "opt_i64_flexible")]
    #[schema(value_type = Option<i64>)]
    pub categoria_id: Option<i64>,

    #[serde(default, deserialize_with = "opt_i64_flexible")]
    #[schema(value_type = Option<i64>)]
    pub subcategoria_id: Option<i64>,

    pub imagen_url: Option<String>,
    pub tiempo_preparacion: Option<String>,
    pub instrucciones_preparacion: Option<String>,
    pub notas_cocina: Option<String>,

    #[serde(default, deserialize_with = "opt_bool_flexible")]
    #[schema(value_type = Option<bool>)]
    pub disponible: Option<bool>,

    pub tipo_producto: Option<TipoProducto>,
}

// ---
// Payload: actualizar producto (todos os campos opcionais)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ActualizarProductoPayload {
    #[validate(length(min = 1, message = "El nombre del producto no puede estar vacío"))]
    pub nombre: Option<String>,

    #[validate(range(min = 0.0, message = "El precio no puede ser negativo"))]
    #[serde(default, deserialize_with = "opt_f64_flexible")]
    #[schema(value_type = Option<f64>)]
    pub precio: Option<f64>,

    pub codigo: Option<String>,
    pub descripcion: Option<String>,

    #[serde(default, deserialize_with = "opt_i64_flexible")]
    #[schema(value_type = Option<i64>)]
    pub categoria_id: Option<i64>,

    #[serde(default, deserialize_with = "opt_i64_flexible")]
    #[schema(value_type = Option<i64>)]
    pub subcategoria_id: Option<i64>,

    pub imagen_url: Option<String>,
    pub tiempo_preparacion: Option<String>,
    pub instrucciones_preparacion: Option<String>,
    pub notas_cocina: Option<String>,

    #[serde(default, deserialize_with = "opt_bool_flexible")]
    #[schema(value_type = Option<bool>)]
    pub disponible: Option<bool>,

    #[serde(default, deserialize_with = "opt_bool_flexible")]
    #[schema(value_type = Option<bool>)]
    pub activo: Option<bool>,

    pub tipo_producto: Option<TipoProducto>,
}

#[derive(Debug, Deserialize)]
pub struct ListarProductosQuery {
    pub categoria_id: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// GET /menu-admin/api/productos
#[utoipa::path(
    get,
    path = "/menu-admin/api/productos",
    tag = "Productos",
    params(
        ("categoria_id" = Option<i64>, Query, description = "Filtrar por categoría"),
        ("limit" = Option<i64>, Query, description = "Máximo de filas"),
        ("offset" = Option<i64>, Query, description = "Filas a saltar")
    ),
    responses((status = 200, description = "Lista de productos"))
)]
pub async fn listar_productos(
    State(app_state): State<AppState>,
    Query(query): Query<ListarProductosQuery>,
) -> Result<impl IntoResponse, AppError> {
    let productos = app_state
        .catalogo_service
        .listar_productos(&app_state.db_pool, query.categoria_id, query.limit, query.offset)
        .await?;

    Ok(Json(json!({
        "success": true,
        "total": productos.len(),
        "productos": productos,
    })))
}

// GET /menu-admin/api/productos/{id}
#[utoipa::path(
    get,
    path = "/menu-admin/api/productos/{id}",
    tag = "Productos",
    params(("id" = i64, Path, description = "ID del producto")),
    responses(
        (status = 200, description = "Producto encontrado"),
        (status = 404, description = "Producto no encontrado")
    )
)]
pub async fn obtener_producto(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let producto = app_state
        .catalogo_service
        .obtener_producto(&app_state.db_pool, id)
        .await?;
    Ok(Json(json!({ "success": true, "producto": producto })))
}

// POST /menu-admin/api/productos
#[utoipa::path(
    post,
    path = "/menu-admin/api/productos",
    tag = "Productos",
    request_body = CrearProductoPayload,
    responses(
        (status = 201, description = "Producto creado"),
        (status = 400, description = "Datos inválidos"),
        (status = 409, description = "Nombre duplicado")
    )
)]
pub async fn crear_producto(
    State(app_state): State<AppState>,
    Json(payload): Json<CrearProductoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let nuevo = NuevoProducto {
        codigo: payload.codigo,
        nombre: payload.nombre.unwrap_or_default(),
        descripcion: payload.descripcion,
        precio: payload.precio.unwrap_or_default(),
        categoria_id: payload.categoria_id,
        subcategoria_id: payload.subcategoria_id,
        imagen_url: payload.imagen_url,
        tiempo_preparacion: payload.tiempo_preparacion,
        instrucciones_preparacion: payload.instrucciones_preparacion,
        notas_cocina: payload.notas_cocina,
        disponible: payload.disponible.unwrap_or(true),
        tipo_producto: payload.tipo_producto.unwrap_or_default(),
    };

    let producto = app_state
        .catalogo_service
        .crear_producto(&app_state.db_pool, nuevo)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "mensaje": "Producto creado exitosamente",
            "producto_id": producto.id,
            "producto": producto,
        })),
    ))
}

// PUT /menu-admin/api/productos/{id}
#[utoipa::path(
    put,
    path = "/menu-admin/api/productos/{id}",
    tag = "Productos",
    request_body = ActualizarProductoPayload,
    params(("id" = i64, Path, description = "ID del producto")),
    responses(
        (status = 200, description = "Producto actualizado"),
        (status = 404, description = "Producto no encontrado"),
        (status = 409, description = "Nombre duplicado")
    )
)]
pub async fn actualizar_producto(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ActualizarProductoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let patch = ProductoPatch {
        codigo: payload.codigo,
        nombre: payload.nombre,
        descripcion: payload.descripcion,
        precio: payload.precio,
        categoria_id: payload.categoria_id,
        subcategoria_id: payload.subcategoria_id,
        imagen_url: payload.imagen_url,
        tiempo_preparacion: payload.tiempo_preparacion,
        instrucciones_preparacion: payload.instrucciones_preparacion,
        notas_cocina: payload.notas_cocina,
        disponible: payload.disponible,
        activo: payload.activo,
        tipo_producto: payload.tipo_producto,
    };

    let producto = app_state
        .catalogo_service
        .actualizar_producto(&app_state.db_pool, id, patch)
        .await?;

    Ok(Json(json!({
        "success": true,
        "mensaje": "Producto actualizado correctamente",
        "producto": producto,
    })))
}

// DELETE /menu-admin/api/productos/{id}
#[utoipa::path(
    delete,
    path = "/menu-admin/api/productos/{id}",
    tag = "Productos",
    params(("id" = i64, Path, description = "ID del producto")),
    responses(
        (status = 200, description = "Producto eliminado (con sus ingredientes)"),
        (status = 404, description = "Producto no encontrado")
    )
)]
pub async fn eliminar_producto(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let (producto, ingredientes) = app_state
        .catalogo_service
        .eliminar_producto(&app_state.db_pool, id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "mensaje": format!("Producto \"{}\" eliminado correctamente", producto.nombre),
        "producto_eliminado": {
            "id": producto.id,
            "nombre": producto.nombre,
            "codigo": producto.codigo,
        },
        "ingredientes_eliminados": ingredientes,
    })))
}

// GET /menu-admin/api/productos/estadisticas
#[utoipa::path(
    get,
    path = "/menu-admin/api/productos/estadisticas",
    tag = "Productos",
    responses((status = 200, description = "Métricas generales de productos"))
)]
pub async fn estadisticas_productos(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let stats = app_state
        .catalogo_service
        .estadisticas(&app_state.db_pool)
        .await?;
    Ok(Json(json!({
        "success": true,
        "total": stats.total,
        "disponibles": stats.disponibles,
        "no_disponibles": stats.no_disponibles,
        "por_categoria": stats.por_categoria,
    })))
}

// GET /menu-admin/api/menu-completo
#[utoipa::path(
    get,
    path = "/menu-admin/api/menu-completo",
    tag = "Productos",
    responses((status = 200, description = "Menú organizado por categorías"))
)]
pub async fn menu_completo(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let menu = app_state
        .catalogo_service
        .menu_completo(&app_state.db_pool)
        .await?;
    Ok(Json(json!({ "success": true, "menu": menu })))
}

// GET /menu-admin/api/recetas
#[utoipa::path(
    get,
    path = "/menu-admin/api/recetas",
    tag = "Productos",
    responses((status = 200, description = "Productos preparados con sus ingredientes"))
)]
pub async fn listar_recetas(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let recetas = app_state.catalogo_service.recetas(&app_state.db_pool).await?;
    Ok(Json(json!({
        "success": true,
        "total": recetas.len(),
        "recetas": recetas,
    })))
}
