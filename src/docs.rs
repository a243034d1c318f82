// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Productos ---
        handlers::productos::listar_productos,
        handlers::productos::obtener_producto,
        handlers::productos::crear_producto,
        handlers::productos::actualizar_producto,
        handlers::productos::eliminar_producto,
        handlers::productos::estadisticas_productos,
        handlers::productos::menu_completo,
        handlers::productos::listar_recetas,

        // --- Categorías ---
        handlers::categorias::listar_categorias,
        handlers::categorias::crear_categoria,
        handlers::categorias::obtener_categoria,
        handlers::categorias::actualizar_categoria,
        handlers::categorias::eliminar_categoria,
        handlers::categorias::previsualizar_icono,
        handlers::categorias::listar_subcategorias_de_categoria,

        // --- Subcategorías ---
        handlers::subcategorias::listar_subcategorias,
        handlers::subcategorias::crear_subcategoria,
        handlers::subcategorias::obtener_subcategoria,
        handlers::subcategorias::actualizar_subcategoria,
        handlers::subcategorias::eliminar_subcategoria,

        // --- Ingredientes ---
        handlers::ingredientes::listar_ingredientes,
        handlers::ingredientes::crear_ingrediente,
        handlers::ingredientes::actualizar_ingrediente,
        handlers::ingredientes::eliminar_ingrediente,

        // --- Chatbot ---
        handlers::chatbot::iniciar_sesion,
        handlers::chatbot::obtener_sesion,
        handlers::chatbot::actualizar_actividad,
        handlers::chatbot::validar_sesion,
        handlers::chatbot::cerrar_sesion,
        handlers::chatbot::guardar_calificacion,
        handlers::chatbot::obtener_calificaciones,
        handlers::chatbot::guardar_comentario,
        handlers::chatbot::llamar_mesero,
        handlers::chatbot::obtener_saludo,

        // --- Staff ---
        handlers::staff::sesiones_activas,
        handlers::staff::notificaciones_pendientes,
        handlers::staff::atender_notificacion,

        // --- Configuración ---
        handlers::configuracion::obtener_configuracion,
        handlers::configuracion::obtener_timeout,
        handlers::configuracion::guardar_configuracion,
        handlers::configuracion::aplicar_fondo,
    ),
    components(
        schemas(
            // --- Catálogo ---
            models::catalogo::Categoria,
            models::catalogo::Subcategoria,
            models::catalogo::Producto,
            models::catalogo::Ingrediente,
            models::catalogo::TipoProducto,
            models::catalogo::CategoriaConProductos,
            models::catalogo::Receta,
            models::catalogo::ConteoPorCategoria,
            models::catalogo::EstadisticasProductos,

            // --- Chatbot ---
            models::chatbot::Sesion,
            models::chatbot::Calificacion,
            models::chatbot::Comentario,
            models::chatbot::NotificacionMesero,
            models::chatbot::CalificacionConSesion,
            models::chatbot::NotificacionPendiente,
            models::chatbot::SesionActivaResumen,
            models::chatbot::EstadisticasCalificaciones,

            // --- Configuración ---
            models::configuracion::ConfiguracionChatbot,

            // --- Payloads ---
            handlers::productos::CrearProductoPayload,
            handlers::productos::ActualizarProductoPayload,
            handlers::categorias::CrearCategoriaPayload,
            handlers::categorias::ActualizarCategoriaPayload,
            handlers::subcategorias::CrearSubcategoriaPayload,
            handlers::subcategorias::ActualizarSubcategoriaPayload,
            handlers::ingredientes::CrearIngredientePayload,
            handlers::ingredientes::ActualizarIngredientePayload,
            handlers::chatbot::IniciarSesionPayload,
            handlers::chatbot::CalificacionPayload,
            handlers::chatbot::ComentarioPayload,
            handlers::chatbot::NotificacionMeseroPayload,
            handlers::staff::AtenderNotificacionPayload,
            handlers::configuracion::GuardarConfiguracionPayload,
            handlers::configuracion::AplicarFondoPayload,
        )
    ),
    tags(
        (name = "Productos", description = "CRUD de productos del menú"),
        (name = "Categorías", description = "Categorías con iconos y códigos automáticos"),
        (name = "Subcategorías", description = "Subcategorías de una categoría padre"),
        (name = "Ingredientes", description = "Recetas: ingredientes de cada producto"),
        (name = "Chatbot", description = "Sesiones de mesa y feedback de clientes"),
        (name = "Staff", description = "Dashboard del personal"),
        (name = "Configuración", description = "Configuración dinámica del chatbot")
    )
)]
pub struct ApiDoc;
