// src/main.rs

use axum::{
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod models;
mod services;

#[cfg(test)]
mod api_tests;
#[cfg(test)]
mod test_support;

use crate::config::AppState;

/// Monta o router completo. Separado do `main` para os testes poderem
/// disparar requests direto no `Router`, sem subir servidor.
fn app(app_state: AppState) -> Router {
    // Admin do menu: catálogo completo (produtos, categorias, receitas)
    let menu_admin_routes = Router::new()
        .route("/productos"
               ,post(handlers::productos::crear_producto)
               .get(handlers::productos::listar_productos)
        )
        .route("/productos/estadisticas"
               ,get(handlers::productos::estadisticas_productos)
        )
        .route("/productos/{id}"
               ,get(handlers::productos::obtener_producto)
               .put(handlers::productos::actualizar_producto)
               .delete(handlers::productos::eliminar_producto)
        )
        .route("/productos/{id}/ingredientes"
               ,get(handlers::ingredientes::listar_ingredientes)
               .post(handlers::ingredientes::crear_ingrediente)
        )
        .route("/ingredientes/{id}"
               ,put(handlers::ingredientes::actualizar_ingrediente)
               .delete(handlers::ingredientes::eliminar_ingrediente)
        )
        .route("/categorias"
               ,post(handlers::categorias::crear_categoria)
               .get(handlers::categorias::listar_categorias)
        )
        .route("/categorias/previsualizar-icono"
               ,get(handlers::categorias::previsualizar_icono)
        )
        .route("/categorias/{id}"
               ,get(handlers::categorias::obtener_categoria)
               .put(handlers::categorias::actualizar_categoria)
               .delete(handlers::categorias::eliminar_categoria)
        )
        .route("/categorias/{id}/subcategorias"
               ,get(handlers::categorias::listar_subcategorias_de_categoria)
        )
        .route("/subcategorias"
               ,post(handlers::subcategorias::crear_subcategoria)
               .get(handlers::subcategorias::listar_subcategorias)
        )
        .route("/subcategorias/{id}"
               ,get(handlers::subcategorias::obtener_subcategoria)
               .put(handlers::subcategorias::actualizar_subcategoria)
               .delete(handlers::subcategorias::eliminar_subcategoria)
        )
        .route("/menu-completo", get(handlers::productos::menu_completo))
        .route("/recetas", get(handlers::productos::listar_recetas));

    // Chatbot das mesas + dashboard do personal
    let chatbot_routes = Router::new()
        .route("/sesion/iniciar", post(handlers::chatbot::iniciar_sesion))
        .route("/sesion/{id}", get(handlers::chatbot::obtener_sesion))
        .route("/sesion/{id}/actividad", post(handlers::chatbot::actualizar_actividad))
        .route("/sesion/{id}/validar", get(handlers::chatbot::validar_sesion))
        .route("/sesion/{id}/cerrar", post(handlers::chatbot::cerrar_sesion))
        .route("/sesiones/activas", get(handlers::staff::sesiones_activas))
        .route("/calificacion", post(handlers::chatbot::guardar_calificacion))
        .route("/calificaciones", get(handlers::chatbot::obtener_calificaciones))
        .route("/comentario", post(handlers::chatbot::guardar_comentario))
        .route("/notificacion/mesero", post(handlers::chatbot::llamar_mesero))
        .route("/notificaciones/pendientes", get(handlers::staff::notificaciones_pendientes))
        .route("/notificacion/{id}/atender", post(handlers::staff::atender_notificacion))
        .route("/saludo", get(handlers::chatbot::obtener_saludo))
        .route("/configuracion"
               ,get(handlers::configuracion::obtener_configuracion)
               .post(handlers::configuracion::guardar_configuracion)
        )
        .route("/configuracion/timeout", get(handlers::configuracion::obtener_timeout))
        .route("/fondos/aplicar", post(handlers::configuracion::aplicar_fondo));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/menu-admin/api", menu_admin_routes)
        .nest("/api/chatbot", chatbot_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Semeia as configurações default do chatbot (saudações, timeout, tema)
    let creadas = app_state
        .configuracion_service
        .inicializar_defaults(&app_state.db_pool)
        .await
        .expect("Falha ao inicializar a configuração do chatbot.");
    tracing::info!("⚙️ Configuração do chatbot pronta ({creadas} claves novas)");

    let app = app(app_state);

    // Inicia o servidor
    let addr = format!("0.0.0.0:{}", config::puerto());
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
