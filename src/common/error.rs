use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro central, com `thiserror` para melhor ergonomia.
// Cada variante sabe virar uma resposta HTTP em `into_response`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Validações manuais (patches, coerções) que não passam pelo `validator`.
    #[error("{0}")]
    InvalidInput(String),

    #[error("Producto no encontrado")]
    ProductoNotFound,

    #[error("Categoría no encontrada")]
    CategoriaNotFound,

    #[error("Subcategoría no encontrada")]
    SubcategoriaNotFound,

    #[error("Ingrediente no encontrado")]
    IngredienteNotFound,

    #[error("Sesión no encontrada")]
    SesionNotFound,

    #[error("Notificación no encontrada")]
    NotificacionNotFound,

    // A UNIQUE de `productos.nombre_normalizado` disparou: já existe um
    // produto com esse nome (ignorando caixa e espaços nas pontas).
    #[error("Producto duplicado: {nombre}")]
    ProductoNombreDuplicado { nombre: String, existente_id: i64 },

    #[error("Código duplicado: {0}")]
    CodigoDuplicado(String),

    #[error("Categoría con dependencias: {titulo}")]
    CategoriaConDependencias {
        titulo: String,
        productos: i64,
        subcategorias: i64,
    },

    #[error("Subcategoría con dependencias: {nombre}")]
    SubcategoriaConDependencias { nombre: String, productos: i64 },

    #[error("Sesión inactiva")]
    SesionInactiva,

    #[error("Notificación ya atendida")]
    NotificacionYaAtendida,

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            // Retorna todos os detalhes da validação, campo por campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = json!({
                    "success": false,
                    "error": "Uno o más campos son inválidos.",
                    "details": details,
                });
                (StatusCode::BAD_REQUEST, body)
            }

            AppError::InvalidInput(mensaje) => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "error": mensaje }),
            ),

            AppError::ProductoNotFound
            | AppError::CategoriaNotFound
            | AppError::SubcategoriaNotFound
            | AppError::IngredienteNotFound
            | AppError::SesionNotFound
            | AppError::NotificacionNotFound => {
                let body = json!({ "success": false, "error": self.to_string() });
                (StatusCode::NOT_FOUND, body)
            }

            AppError::ProductoNombreDuplicado { nombre, existente_id } => {
                let body = json!({
                    "success": false,
                    "error": format!(
                        "Ya existe un producto con el nombre \"{nombre}\". \
                         Los productos deben tener nombres únicos."
                    ),
                    "conflicto": "nombre_duplicado",
                    "producto_existente": existente_id,
                });
                (StatusCode::CONFLICT, body)
            }

            AppError::CodigoDuplicado(codigo) => {
                let body = json!({
                    "success": false,
                    "error": format!("El código \"{codigo}\" ya está en uso."),
                });
                (StatusCode::CONFLICT, body)
            }

            // O frontend espera 400 + `detalles` aqui (não 409); ele monta a
            // mensagem de confirmação da eliminação forzada com esses números.
            AppError::CategoriaConDependencias { titulo, productos, subcategorias } => {
                let body = json!({
                    "success": false,
                    "error": format!(
                        "La categoría \"{titulo}\" tiene {productos} producto(s) y \
                         {subcategorias} subcategoría(s) asociada(s)."
                    ),
                    "detalles": {
                        "productos": productos,
                        "subcategorias": subcategorias,
                    },
                    "sugerencia": "Puedes reasignar estos elementos, eliminarlos primero, \
                                   o usar la eliminación forzada (?forzar=true).",
                });
                (StatusCode::BAD_REQUEST, body)
            }

            AppError::SubcategoriaConDependencias { nombre, productos } => {
                let body = json!({
                    "success": false,
                    "error": format!(
                        "La subcategoría \"{nombre}\" tiene {productos} producto(s) asociado(s)."
                    ),
                    "detalles": { "productos": productos },
                });
                (StatusCode::BAD_REQUEST, body)
            }

            AppError::SesionInactiva => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "error": "La sesión ya no está activa" }),
            ),

            AppError::NotificacionYaAtendida => (
                StatusCode::CONFLICT,
                json!({ "success": false, "error": "La notificación ya fue atendida" }),
            ),

            // Todos os outros viram 500. O detalhe fica no log do servidor;
            // o cliente recebe só uma mensagem genérica.
            ref e => {
                tracing::error!("Erro interno do servidor: {e:?}");
                let body = json!({
                    "success": false,
                    "error": "Ocurrió un error inesperado en el servidor.",
                });
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
        };

        (status, Json(body)).into_response()
    }
}
