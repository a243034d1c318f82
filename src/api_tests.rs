// src/api_tests.rs
//
// Testes de ponta a ponta no Router: cada request entra pelo axum e sai
// como JSON, igual ao que o frontend recebe.

use axum::body::{to_bytes, Body};
use axum::http::{header::CONTENT_TYPE, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::config::AppState;
use crate::test_support::pool_de_prueba;

async fn app_de_prueba() -> Router {
    let pool = pool_de_prueba().await;
    let state = AppState::with_pool(pool.clone());
    state
        .configuracion_service
        .inicializar_defaults(&pool)
        .await
        .expect("seed de configuração");
    crate::app(state)
}

async fn request(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(valor) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(valor.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request de teste");

    let response = app.clone().oneshot(request).await.expect("resposta do router");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("corpo");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    request(app, Method::GET, uri, None).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    request(app, Method::POST, uri, Some(body)).await
}

#[tokio::test]
async fn health_responde() {
    let app = app_de_prueba().await;
    let (status, _) = get(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn crear_categoria_con_icono_automatico() {
    let app = app_de_prueba().await;

    let (status, body) = post(&app, "/menu-admin/api/categorias", json!({"nombre": "Bebidas"})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["categoria"]["activa"], json!(true));
    assert_eq!(body["categoria"]["nombre"], json!("Bebidas"));
    // Icono auto-assinado: algo relacionado a bebidas, nunca vazio.
    assert_eq!(body["categoria"]["icono"], json!("🍷"));
    assert_eq!(body["icono_detectado"], json!("🍷"));
}

#[tokio::test]
async fn producto_duplicado_devuelve_409() {
    let app = app_de_prueba().await;
    let payload = json!({"nombre": "Capuccino", "precio": "6.00"});

    let (status, body) = post(&app, "/menu-admin/api/productos", payload.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    let primero_id = body["producto_id"].as_i64().unwrap();

    let (status, body) = post(&app, "/menu-admin/api/productos", payload).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap().contains("Capuccino"));
    assert_eq!(body["producto_existente"], json!(primero_id));
}

#[tokio::test]
async fn producto_sin_nombre_o_precio_invalido_devuelve_400() {
    let app = app_de_prueba().await;

    let (status, body) = post(&app, "/menu-admin/api/productos", json!({"precio": 5.0})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));

    let (status, _) = post(
        &app,
        "/menu-admin/api/productos",
        json!({"nombre": "Agua", "precio": 0}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        &app,
        "/menu-admin/api/productos",
        json!({"nombre": "Agua", "precio": -2}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sesion_iniciada_valida_de_inmediato() {
    let app = app_de_prueba().await;

    let (status, body) = post(&app, "/api/chatbot/sesion/iniciar", json!({"mesa": "5"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    let sesion_id = body["sesion_id"].as_i64().unwrap();

    let (status, body) = get(&app, &format!("/api/chatbot/sesion/{sesion_id}/validar")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valida"], json!(true));

    // Mesma mesa de novo: mesma sessão.
    let (_, body) = post(&app, "/api/chatbot/sesion/iniciar", json!({"mesa": "5"})).await;
    assert_eq!(body["sesion_id"].as_i64().unwrap(), sesion_id);
    assert_eq!(body["reutilizada"], json!(true));

    let (status, _) = get(&app, "/api/chatbot/sesion/9999/validar").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn eliminar_categoria_con_dependencias_y_forzado() {
    let app = app_de_prueba().await;

    let (_, body) = post(&app, "/menu-admin/api/categorias", json!({"nombre": "Bebidas"})).await;
    let categoria_id = body["categoria"]["id"].as_i64().unwrap();

    let (_, body) = post(
        &app,
        "/menu-admin/api/subcategorias",
        json!({"nombre": "Vinos", "categoria_id": categoria_id}),
    )
    .await;
    let subcategoria_id = body["subcategoria"]["id"].as_i64().unwrap();

    let mut producto_ids = Vec::new();
    for nombre in ["Malbec", "Rioja"] {
        let (status, body) = post(
            &app,
            "/menu-admin/api/productos",
            json!({
                "nombre": nombre,
                "precio": 20.0,
                "categoria_id": categoria_id,
                "subcategoria_id": subcategoria_id,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        producto_ids.push(body["producto_id"].as_i64().unwrap());
    }

    // Sem forzar: 400 com o detalhe das dependências.
    let (status, body) = request(
        &app,
        Method::DELETE,
        &format!("/menu-admin/api/categorias/{categoria_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detalles"]["productos"], json!(2));
    assert_eq!(body["detalles"]["subcategorias"], json!(1));

    // Com forzar: 200 e os produtos ficam órfãos de categoria.
    let (status, _) = request(
        &app,
        Method::DELETE,
        &format!("/menu-admin/api/categorias/{categoria_id}?forzar=true"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    for id in producto_ids {
        let (status, body) = get(&app, &format!("/menu-admin/api/productos/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["producto"]["categoria_id"], Value::Null);
        assert_eq!(body["producto"]["subcategoria_id"], Value::Null);
    }

    let (status, _) = get(&app, &format!("/menu-admin/api/subcategorias/{subcategoria_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn calificacion_repetida_sobrescribe() {
    let app = app_de_prueba().await;

    let (_, body) = post(&app, "/api/chatbot/sesion/iniciar", json!({"mesa": "3"})).await;
    let sesion_id = body["sesion_id"].as_i64().unwrap();

    let (status, _) = post(
        &app,
        "/api/chatbot/calificacion",
        json!({"sesion_id": sesion_id, "estrellas": 5, "categoria": "servicio"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post(
        &app,
        "/api/chatbot/calificacion",
        json!({"sesion_id": sesion_id, "estrellas": 2, "categoria": "servicio"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["accion"], json!("actualizada"));

    let (_, body) = get(&app, &format!("/api/chatbot/calificaciones?sesion_id={sesion_id}")).await;
    let filas = body["calificaciones"].as_array().unwrap();
    assert_eq!(filas.len(), 1);
    assert_eq!(filas[0]["estrellas"], json!(2));

    // Estrellas fora da faixa: 400.
    let (status, _) = post(
        &app,
        "/api/chatbot/calificacion",
        json!({"sesion_id": sesion_id, "estrellas": 6}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn notificacion_se_atiende_una_sola_vez() {
    let app = app_de_prueba().await;

    let (_, body) = post(&app, "/api/chatbot/sesion/iniciar", json!({"mesa": "8"})).await;
    let sesion_id = body["sesion_id"].as_i64().unwrap();

    let (status, body) = post(
        &app,
        "/api/chatbot/notificacion/mesero",
        json!({"sesion_id": sesion_id, "mensaje": "La cuenta, por favor"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let notificacion_id = body["notificacion_id"].as_i64().unwrap();

    let (_, body) = get(&app, "/api/chatbot/notificaciones/pendientes").await;
    assert_eq!(body["total"], json!(1));
    assert_eq!(body["notificaciones"][0]["mesa"], json!("8"));

    let uri = format!("/api/chatbot/notificacion/{notificacion_id}/atender");
    let (status, _) = post(&app, &uri, json!({"atendida_por": "Carla"})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post(&app, &uri, json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = get(&app, "/api/chatbot/notificaciones/pendientes").await;
    assert_eq!(body["total"], json!(0));
}

#[tokio::test]
async fn configuracion_y_timeout_expuestos() {
    let app = app_de_prueba().await;

    let (status, body) = get(&app, "/api/chatbot/configuracion/timeout").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timeout_minutos"], json!(10));
    assert_eq!(body["timeout_milisegundos"], json!(600000));

    let (status, _) = post(
        &app,
        "/api/chatbot/configuracion",
        json!({"clave": "sesion_timeout_minutos", "valor": "15", "tipo": "integer"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get(&app, "/api/chatbot/configuracion/timeout").await;
    assert_eq!(body["timeout_minutos"], json!(15));

    let (_, body) = get(&app, "/api/chatbot/configuracion").await;
    assert_eq!(body["configuracion"]["tema_activo"], json!("eterials_clasico"));
}
