// src/services/feedback_service.rs

use chrono::Utc;
use sqlx::{Acquire, Executor, Sqlite};

use crate::{
    common::error::AppError,
    db::{FeedbackRepository, SesionRepository},
    models::chatbot::{
        Calificacion, CalificacionConSesion, EstadisticasCalificaciones, NotificacionPendiente,
    },
};

const CATEGORIAS_CALIFICACION: &[&str] = &["servicio", "comida", "ambiente", "general"];
const PRIORIDADES: &[&str] = &["baja", "normal", "alta", "urgente"];

/// Sub-razão do feedback dos clientes: calificações (upsert), comentários e
/// chamadas ao personal (append), tudo amarrado a uma sessão.
#[derive(Clone)]
pub struct FeedbackService {
    repo: FeedbackRepository,
    sesion_repo: SesionRepository,
}

impl FeedbackService {
    pub fn new(repo: FeedbackRepository, sesion_repo: SesionRepository) -> Self {
        Self { repo, sesion_repo }
    }

    /// Registra (ou sobrescreve) a calificação da sessão para uma categoria.
    /// Retorna o id da linha e a ação executada ("creada"/"actualizada").
    pub async fn calificar<'a, A>(
        &self,
        conn: A,
        sesion_id: i64,
        estrellas: i64,
        categoria: Option<String>,
    ) -> Result<(i64, &'static str), AppError>
    where
        A: Acquire<'a, Database = Sqlite>,
    {
        if !(1..=5).contains(&estrellas) {
            return Err(AppError::InvalidInput(
                "Se requieren estrellas entre 1 y 5".into(),
            ));
        }
        let categoria = categoria
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "general".to_string());
        if !CATEGORIAS_CALIFICACION.contains(&categoria.as_str()) {
            return Err(AppError::InvalidInput(format!(
                "Categoría de calificación desconocida: {categoria}"
            )));
        }

        let mut tx = conn.begin().await?;
        let sesion = self
            .sesion_repo
            .get_sesion(&mut *tx, sesion_id)
            .await?
            .ok_or(AppError::SesionNotFound)?;
        if !sesion.activa {
            return Err(AppError::SesionInactiva);
        }

        let existente = self.repo.get_calificacion(&mut *tx, sesion_id, &categoria).await?;
        let accion = if existente.is_some() { "actualizada" } else { "creada" };

        let id = self
            .repo
            .upsert_calificacion(&mut *tx, sesion_id, estrellas, &categoria, Utc::now())
            .await?;
        tx.commit().await?;
        Ok((id, accion))
    }

    pub async fn calificaciones_de_sesion<'e, E>(
        &self,
        executor: E,
        sesion_id: i64,
    ) -> Result<Vec<Calificacion>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        self.repo.list_calificaciones_de_sesion(executor, sesion_id).await
    }

    /// Listagem recente + agregados para o dashboard do staff.
    pub async fn calificaciones_recientes<'e, E>(
        &self,
        executor: E,
        limit: i64,
    ) -> Result<(Vec<CalificacionConSesion>, EstadisticasCalificaciones), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let calificaciones = self.repo.list_calificaciones_recientes(executor, limit).await?;

        let total = calificaciones.len() as i64;
        let suma: i64 = calificaciones.iter().map(|c| c.estrellas).sum();
        let promedio = if total > 0 {
            (suma as f64 / total as f64 * 10.0).round() / 10.0
        } else {
            0.0
        };
        let estadisticas = EstadisticasCalificaciones {
            total,
            promedio,
            excelentes: calificaciones.iter().filter(|c| c.estrellas >= 4).count() as i64,
            necesitan_atencion: calificaciones.iter().filter(|c| c.estrellas <= 2).count() as i64,
        };
        Ok((calificaciones, estadisticas))
    }

    pub async fn comentar<'a, A>(
        &self,
        conn: A,
        sesion_id: i64,
        texto_comentario: &str,
        tipo: Option<String>,
    ) -> Result<i64, AppError>
    where
        A: Acquire<'a, Database = Sqlite>,
    {
        let texto = texto_comentario.trim();
        if texto.is_empty() {
            return Err(AppError::InvalidInput("Se requiere texto_comentario".into()));
        }
        let tipo = tipo
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "general".to_string());

        let mut tx = conn.begin().await?;
        self.sesion_repo
            .get_sesion(&mut *tx, sesion_id)
            .await?
            .ok_or(AppError::SesionNotFound)?;
        let id = self
            .repo
            .insert_comentario(&mut *tx, sesion_id, texto, &tipo, Utc::now())
            .await?;
        tx.commit().await?;
        Ok(id)
    }

    /// Chamada ao personal (mesero). Retorna `(id, mesa)` — a mensagem de
    /// confirmação do frontend mostra a mesa.
    pub async fn llamar_mesero<'a, A>(
        &self,
        conn: A,
        sesion_id: i64,
        tipo_notificacion: Option<String>,
        mensaje: Option<String>,
        prioridad: Option<String>,
    ) -> Result<(i64, String), AppError>
    where
        A: Acquire<'a, Database = Sqlite>,
    {
        let tipo = tipo_notificacion
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "llamar_mesero".to_string());
        let prioridad = prioridad
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| "normal".to_string());
        if !PRIORIDADES.contains(&prioridad.as_str()) {
            return Err(AppError::InvalidInput(format!(
                "Prioridad desconocida: {prioridad}"
            )));
        }

        let mut tx = conn.begin().await?;
        let sesion = self
            .sesion_repo
            .get_sesion(&mut *tx, sesion_id)
            .await?
            .ok_or(AppError::SesionNotFound)?;
        let id = self
            .repo
            .insert_notificacion(
                &mut *tx,
                sesion_id,
                &tipo,
                mensaje.as_deref().map(str::trim).filter(|m| !m.is_empty()),
                &prioridad,
                Utc::now(),
            )
            .await?;
        tx.commit().await?;
        Ok((id, sesion.mesa))
    }

    pub async fn notificaciones_pendientes<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<NotificacionPendiente>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        self.repo.list_notificaciones_pendientes(executor).await
    }

    /// Marca a notificação como atendida. Transição de mão única: repetir
    /// o atendimento é um conflito, não uma sobrescrita silenciosa.
    pub async fn atender_notificacion<'a, A>(
        &self,
        conn: A,
        id: i64,
        atendida_por: Option<String>,
    ) -> Result<(), AppError>
    where
        A: Acquire<'a, Database = Sqlite>,
    {
        let atendida_por = atendida_por
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| "Staff".to_string());

        let mut tx = conn.begin().await?;
        self.repo
            .get_notificacion(&mut *tx, id)
            .await?
            .ok_or(AppError::NotificacionNotFound)?;

        let filas = self
            .repo
            .atender_notificacion(&mut *tx, id, &atendida_por, Utc::now())
            .await?;
        if filas == 0 {
            return Err(AppError::NotificacionYaAtendida);
        }
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{FeedbackRepository, SesionRepository};
    use crate::services::sesion_service::{DatosInicioSesion, SesionService};
    use crate::test_support::pool_de_prueba;
    use sqlx::SqlitePool;

    fn service() -> FeedbackService {
        FeedbackService::new(FeedbackRepository::new(), SesionRepository::new())
    }

    async fn sesion_activa(pool: &SqlitePool, mesa: &str) -> i64 {
        let sesiones = SesionService::new(SesionRepository::new());
        let (sesion, _) = sesiones
            .iniciar(
                pool,
                DatosInicioSesion {
                    mesa: mesa.to_string(),
                    nombre_cliente: None,
                    dispositivo: None,
                    ip_cliente: None,
                },
            )
            .await
            .unwrap();
        sesion.id
    }

    #[tokio::test]
    async fn calificar_dos_veces_sobrescribe() {
        let pool = pool_de_prueba().await;
        let service = service();
        let sesion_id = sesion_activa(&pool, "4").await;

        let (_, accion) = service
            .calificar(&pool, sesion_id, 5, Some("servicio".into()))
            .await
            .unwrap();
        assert_eq!(accion, "creada");

        let (_, accion) = service
            .calificar(&pool, sesion_id, 2, Some("servicio".into()))
            .await
            .unwrap();
        assert_eq!(accion, "actualizada");

        // Exatamente uma linha para o par (sessão, categoria), com o valor
        // da segunda chamada.
        let filas = service.calificaciones_de_sesion(&pool, sesion_id).await.unwrap();
        assert_eq!(filas.len(), 1);
        assert_eq!(filas[0].estrellas, 2);
        assert_eq!(filas[0].categoria, "servicio");

        // Outra categoria convive na mesma sessão.
        service
            .calificar(&pool, sesion_id, 4, Some("comida".into()))
            .await
            .unwrap();
        let filas = service.calificaciones_de_sesion(&pool, sesion_id).await.unwrap();
        assert_eq!(filas.len(), 2);
    }

    #[tokio::test]
    async fn calificar_valida_estrellas_y_sesion() {
        let pool = pool_de_prueba().await;
        let service = service();
        let sesion_id = sesion_activa(&pool, "4").await;

        for estrellas in [0, 6, -1] {
            let err = service.calificar(&pool, sesion_id, estrellas, None).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidInput(_)));
        }

        let err = service.calificar(&pool, 999, 5, None).await.unwrap_err();
        assert!(matches!(err, AppError::SesionNotFound));

        // Sessão fechada não pode calificar.
        SesionService::new(SesionRepository::new())
            .cerrar(&pool, sesion_id)
            .await
            .unwrap();
        let err = service.calificar(&pool, sesion_id, 5, None).await.unwrap_err();
        assert!(matches!(err, AppError::SesionInactiva));
    }

    #[tokio::test]
    async fn estadisticas_de_calificaciones() {
        let pool = pool_de_prueba().await;
        let service = service();
        let s1 = sesion_activa(&pool, "1").await;
        let s2 = sesion_activa(&pool, "2").await;

        service.calificar(&pool, s1, 5, Some("servicio".into())).await.unwrap();
        service.calificar(&pool, s1, 1, Some("comida".into())).await.unwrap();
        service.calificar(&pool, s2, 4, Some("general".into())).await.unwrap();

        let (filas, stats) = service.calificaciones_recientes(&pool, 50).await.unwrap();
        assert_eq!(filas.len(), 3);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.excelentes, 2);
        assert_eq!(stats.necesitan_atencion, 1);
        assert!((stats.promedio - 3.3).abs() < 0.01);
    }

    #[tokio::test]
    async fn comentario_requiere_texto_y_sesion() {
        let pool = pool_de_prueba().await;
        let service = service();
        let sesion_id = sesion_activa(&pool, "8").await;

        let id = service
            .comentar(&pool, sesion_id, "  Excelente servicio!  ", None)
            .await
            .unwrap();
        assert!(id > 0);

        let err = service.comentar(&pool, sesion_id, "   ", None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let err = service.comentar(&pool, 999, "hola", None).await.unwrap_err();
        assert!(matches!(err, AppError::SesionNotFound));
    }

    #[tokio::test]
    async fn notificacion_pendiente_y_atencion_unica() {
        let pool = pool_de_prueba().await;
        let service = service();
        let sesion_id = sesion_activa(&pool, "6").await;

        let (id_normal, mesa) = service
            .llamar_mesero(&pool, sesion_id, None, Some("La cuenta".into()), None)
            .await
            .unwrap();
        assert_eq!(mesa, "6");
        let (id_urgente, _) = service
            .llamar_mesero(&pool, sesion_id, Some("emergencia".into()), None, Some("urgente".into()))
            .await
            .unwrap();

        // Urgente fura a fila mesmo tendo chegado depois.
        let pendientes = service.notificaciones_pendientes(&pool).await.unwrap();
        assert_eq!(pendientes.len(), 2);
        assert_eq!(pendientes[0].id, id_urgente);

        service
            .atender_notificacion(&pool, id_urgente, Some("Carla".into()))
            .await
            .unwrap();
        let pendientes = service.notificaciones_pendientes(&pool).await.unwrap();
        assert_eq!(pendientes.len(), 1);
        assert_eq!(pendientes[0].id, id_normal);

        // Atender de novo é rechaçado, não sobrescrito.
        let err = service
            .atender_notificacion(&pool, id_urgente, Some("Pedro".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotificacionYaAtendida));

        let err = service.atender_notificacion(&pool, 999, None).await.unwrap_err();
        assert!(matches!(err, AppError::NotificacionNotFound));
    }

    #[tokio::test]
    async fn prioridad_desconocida_es_rechazada() {
        let pool = pool_de_prueba().await;
        let service = service();
        let sesion_id = sesion_activa(&pool, "3").await;

        let err = service
            .llamar_mesero(&pool, sesion_id, None, None, Some("altisima".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
