// src/models/catalogo.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// --- 1. Categorias ---
// A coluna histórica chama `titulo`, mas o frontend inteiro fala `nombre`;
// o rename fica no serde para o SQL continuar 1:1 com o schema.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Categoria {
    pub id: i64,
    pub codigo: Option<String>,
    #[serde(rename = "nombre")]
    pub titulo: String,
    pub descripcion: Option<String>,
    pub icono: Option<String>,
    pub orden: i64,
    pub activa: bool,
}

// --- 2. Subcategorias ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Subcategoria {
    pub id: i64,
    pub codigo: Option<String>,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub categoria_id: i64,
    pub tipo: Option<String>,
    pub icono: String,
    pub orden: i64,
    pub activa: bool,
    // Preenchido pelas queries com JOIN; inserts/updates não gravam isso.
    #[sqlx(default)]
    pub categoria_nombre: Option<String>,
}

// --- 3. Productos ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TipoProducto {
    #[default]
    Simple,
    // Produto de cozinha, com receita (ingredientes + instruções).
    Preparado,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Producto {
    pub id: i64,
    pub codigo: Option<String>,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub precio: f64,
    pub categoria_id: Option<i64>,
    pub subcategoria_id: Option<i64>,
    pub imagen_url: Option<String>,
    pub tiempo_preparacion: Option<String>,
    pub instrucciones_preparacion: Option<String>,
    pub notas_cocina: Option<String>,
    pub disponible: bool,
    pub activo: bool,
    pub tipo_producto: TipoProducto,
    pub fecha_creacion: DateTime<Utc>,
    pub fecha_actualizacion: DateTime<Utc>,
    #[sqlx(default)]
    pub categoria_nombre: Option<String>,
    #[sqlx(default)]
    pub subcategoria_nombre: Option<String>,
}

/// Dados de criação de um produto, depois de coerções e validação de entrada.
/// O serviço deriva `nombre_normalizado` e os timestamps na hora de gravar.
#[derive(Debug, Clone)]
pub struct NuevoProducto {
    pub codigo: Option<String>,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub precio: f64,
    pub categoria_id: Option<i64>,
    pub subcategoria_id: Option<i64>,
    pub imagen_url: Option<String>,
    pub tiempo_preparacion: Option<String>,
    pub instrucciones_preparacion: Option<String>,
    pub notas_cocina: Option<String>,
    pub disponible: bool,
    pub tipo_producto: TipoProducto,
}

// --- 4. Ingredientes ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Ingrediente {
    pub id: i64,
    pub codigo: Option<String>,
    pub producto_id: i64,
    pub nombre: String,
    pub cantidad: Option<String>,
    pub unidad: Option<String>,
    pub costo: f64,
    pub obligatorio: bool,
    pub activo: bool,
}

// --- 5. Vistas compostas ---

/// Uma categoria com seus produtos visíveis, para o menu do cliente.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoriaConProductos {
    pub categoria: Categoria,
    pub productos: Vec<Producto>,
}

/// Produto `preparado` com a receita completa, para o painel da cozinha.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Receta {
    pub producto: Producto,
    pub ingredientes: Vec<Ingrediente>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ConteoPorCategoria {
    pub nombre: String,
    pub cantidad: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EstadisticasProductos {
    pub total: i64,
    pub disponibles: i64,
    pub no_disponibles: i64,
    pub por_categoria: Vec<ConteoPorCategoria>,
}
