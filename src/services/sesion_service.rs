// src/services/sesion_service.rs

use chrono::{DateTime, Duration, Utc};
use sqlx::{Acquire, Executor, Sqlite};

use crate::{
    common::error::AppError,
    db::SesionRepository,
    models::chatbot::{Sesion, SesionActivaResumen},
};

/// Máquina de estados da sessão de mesa:
/// (sem linha) --iniciar--> activa --expirar/cerrar--> inactiva (terminal).
/// Sessão inativa nunca volta; um novo `iniciar` cria outra linha.
#[derive(Clone)]
pub struct SesionService {
    repo: SesionRepository,
}

#[derive(Debug, Clone)]
pub struct DatosInicioSesion {
    pub mesa: String,
    pub nombre_cliente: Option<String>,
    pub dispositivo: Option<String>,
    pub ip_cliente: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidacionSesion {
    Valida { tiempo_restante_segundos: i64 },
    Invalida { razon: &'static str },
}

/// Consulta pura: a sessão passou do timeout de inatividade?
/// Separada do comando `expirar` de propósito — ler não muda estado.
pub fn sesion_expirada(sesion: &Sesion, timeout_minutos: i64, ahora: DateTime<Utc>) -> bool {
    ahora - sesion.fecha_ultimo_acceso > Duration::minutes(timeout_minutos)
}

fn segundos_restantes(sesion: &Sesion, timeout_minutos: i64, ahora: DateTime<Utc>) -> i64 {
    let limite = sesion.fecha_ultimo_acceso + Duration::minutes(timeout_minutos);
    (limite - ahora).num_seconds().max(0)
}

impl SesionService {
    pub fn new(repo: SesionRepository) -> Self {
        Self { repo }
    }

    /// Inicia (ou retoma) a sessão de uma mesa. Se a mesa já tem sessão
    /// ativa, renova a janela de inatividade e devolve a mesma linha em vez
    /// de abrir uma segunda. Retorna `(sesion, reutilizada)`.
    pub async fn iniciar<'a, A>(
        &self,
        conn: A,
        datos: DatosInicioSesion,
    ) -> Result<(Sesion, bool), AppError>
    where
        A: Acquire<'a, Database = Sqlite>,
    {
        let mesa = datos.mesa.trim().to_string();
        if mesa.is_empty() {
            return Err(AppError::InvalidInput("Se requiere la mesa".into()));
        }
        let nombre = datos
            .nombre_cliente
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());

        let mut tx = conn.begin().await?;
        let ahora = Utc::now();

        let (id, reutilizada) = match self.repo.get_sesion_activa_por_mesa(&mut *tx, &mesa).await? {
            Some(existente) => {
                self.repo.touch_sesion(&mut *tx, existente.id, nombre, ahora).await?;
                (existente.id, true)
            }
            None => {
                let id = self
                    .repo
                    .insert_sesion(
                        &mut *tx,
                        &mesa,
                        nombre,
                        datos.dispositivo.as_deref(),
                        datos.ip_cliente.as_deref(),
                        ahora,
                    )
                    .await?;
                (id, false)
            }
        };

        let sesion = self
            .repo
            .get_sesion(&mut *tx, id)
            .await?
            .ok_or(AppError::SesionNotFound)?;
        tx.commit().await?;
        Ok((sesion, reutilizada))
    }

    pub async fn obtener<'e, E>(&self, executor: E, id: i64) -> Result<Sesion, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        self.repo
            .get_sesion(executor, id)
            .await?
            .ok_or(AppError::SesionNotFound)
    }

    /// Heartbeat do frontend: renova `fecha_ultimo_acceso`.
    pub async fn actualizar_actividad<'a, A>(&self, conn: A, id: i64) -> Result<Sesion, AppError>
    where
        A: Acquire<'a, Database = Sqlite>,
    {
        let mut tx = conn.begin().await?;
        let sesion = self
            .repo
            .get_sesion(&mut *tx, id)
            .await?
            .ok_or(AppError::SesionNotFound)?;
        if !sesion.activa {
            return Err(AppError::SesionInactiva);
        }
        self.repo.touch_sesion(&mut *tx, id, None, Utc::now()).await?;
        let sesion = self
            .repo
            .get_sesion(&mut *tx, id)
            .await?
            .ok_or(AppError::SesionNotFound)?;
        tx.commit().await?;
        Ok(sesion)
    }

    /// Valida a sessão contra o timeout. Uma sessão vencida é expirada aqui
    /// mesmo (o comando `expirar_sesion` roda como efeito da validação) e
    /// reportada como inválida.
    pub async fn validar<'a, A>(
        &self,
        conn: A,
        id: i64,
        timeout_minutos: i64,
    ) -> Result<ValidacionSesion, AppError>
    where
        A: Acquire<'a, Database = Sqlite>,
    {
        let mut tx = conn.begin().await?;
        let sesion = self
            .repo
            .get_sesion(&mut *tx, id)
            .await?
            .ok_or(AppError::SesionNotFound)?;

        let ahora = Utc::now();
        let resultado = if !sesion.activa {
            ValidacionSesion::Invalida { razon: "Sesión inactiva" }
        } else if sesion_expirada(&sesion, timeout_minutos, ahora) {
            self.repo.expirar_sesion(&mut *tx, id).await?;
            ValidacionSesion::Invalida { razon: "Sesión expirada por inactividad" }
        } else {
            ValidacionSesion::Valida {
                tiempo_restante_segundos: segundos_restantes(&sesion, timeout_minutos, ahora),
            }
        };
        tx.commit().await?;
        Ok(resultado)
    }

    /// Fechamento manual (botão "salir" ou staff). Terminal e incondicional.
    pub async fn cerrar<'a, A>(&self, conn: A, id: i64) -> Result<(), AppError>
    where
        A: Acquire<'a, Database = Sqlite>,
    {
        let mut tx = conn.begin().await?;
        self.repo
            .get_sesion(&mut *tx, id)
            .await?
            .ok_or(AppError::SesionNotFound)?;
        self.repo.cerrar_sesion(&mut *tx, id, Utc::now()).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Painel do staff: mesas com sessão aberta e há quanto tempo.
    pub async fn sesiones_activas<'e, E>(
        &self,
        executor: E,
        ahora: DateTime<Utc>,
    ) -> Result<Vec<SesionActivaResumen>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sesiones = self.repo.list_sesiones_activas(executor).await?;
        Ok(sesiones
            .into_iter()
            .map(|s| SesionActivaResumen {
                minutos_activa: (ahora - s.fecha_inicio).num_minutes().max(0),
                minutos_inactiva: (ahora - s.fecha_ultimo_acceso).num_minutes().max(0),
                cliente: s.nombre_cliente.unwrap_or_else(|| "Anónimo".to_string()),
                id: s.id,
                mesa: s.mesa,
                inicio: s.fecha_inicio,
                ultimo_acceso: s.fecha_ultimo_acceso,
                dispositivo: s.dispositivo,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SesionRepository;
    use crate::test_support::pool_de_prueba;

    fn service() -> SesionService {
        SesionService::new(SesionRepository::new())
    }

    fn datos(mesa: &str) -> DatosInicioSesion {
        DatosInicioSesion {
            mesa: mesa.to_string(),
            nombre_cliente: None,
            dispositivo: Some("test-agent".to_string()),
            ip_cliente: Some("127.0.0.1".to_string()),
        }
    }

    /// Força a última atividade da sessão para o passado.
    async fn envejecer(pool: &sqlx::SqlitePool, id: i64, minutos: i64) {
        let pasado = Utc::now() - Duration::minutes(minutos);
        sqlx::query("UPDATE chatbot_sesiones SET fecha_ultimo_acceso = ? WHERE id = ?")
            .bind(pasado)
            .bind(id)
            .execute(pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn iniciar_reutiliza_la_sesion_activa_de_la_mesa() {
        let pool = pool_de_prueba().await;
        let service = service();

        let (primera, reutilizada) = service.iniciar(&pool, datos("5")).await.unwrap();
        assert!(!reutilizada);

        let (segunda, reutilizada) = service.iniciar(&pool, datos("5")).await.unwrap();
        assert!(reutilizada);
        assert_eq!(primera.id, segunda.id);

        // Só existe uma linha ativa para a mesa.
        let activas = service.sesiones_activas(&pool, Utc::now()).await.unwrap();
        assert_eq!(activas.iter().filter(|s| s.mesa == "5").count(), 1);

        // Mesa diferente abre sessão própria.
        let (barra, _) = service.iniciar(&pool, datos("barra")).await.unwrap();
        assert_ne!(barra.id, primera.id);
    }

    #[tokio::test]
    async fn iniciar_actualiza_nombre_sin_borrar_el_anterior() {
        let pool = pool_de_prueba().await;
        let service = service();

        let mut con_nombre = datos("3");
        con_nombre.nombre_cliente = Some("Juan".to_string());
        let (sesion, _) = service.iniciar(&pool, con_nombre).await.unwrap();
        assert_eq!(sesion.nombre_cliente.as_deref(), Some("Juan"));

        // Reentrada sem nome mantém o que já estava.
        let (sesion, _) = service.iniciar(&pool, datos("3")).await.unwrap();
        assert_eq!(sesion.nombre_cliente.as_deref(), Some("Juan"));
    }

    #[tokio::test]
    async fn validar_dentro_del_timeout() {
        let pool = pool_de_prueba().await;
        let service = service();
        let (sesion, _) = service.iniciar(&pool, datos("1")).await.unwrap();

        let resultado = service.validar(&pool, sesion.id, 10).await.unwrap();
        match resultado {
            ValidacionSesion::Valida { tiempo_restante_segundos } => {
                assert!(tiempo_restante_segundos > 0);
                assert!(tiempo_restante_segundos <= 600);
            }
            otro => panic!("esperaba sesión válida, llegó {otro:?}"),
        }
    }

    #[tokio::test]
    async fn validar_expira_la_sesion_vencida() {
        let pool = pool_de_prueba().await;
        let service = service();
        let (sesion, _) = service.iniciar(&pool, datos("7")).await.unwrap();
        envejecer(&pool, sesion.id, 11).await;

        let resultado = service.validar(&pool, sesion.id, 10).await.unwrap();
        assert_eq!(
            resultado,
            ValidacionSesion::Invalida { razon: "Sesión expirada por inactividad" }
        );

        // O efeito colateral ficou gravado: activa = false.
        let sesion = service.obtener(&pool, sesion.id).await.unwrap();
        assert!(!sesion.activa);

        // Um novo início para a mesa cria linha nova, não ressuscita a velha.
        let (nueva, reutilizada) = service.iniciar(&pool, datos("7")).await.unwrap();
        assert!(!reutilizada);
        assert_ne!(nueva.id, sesion.id);
    }

    #[tokio::test]
    async fn heartbeat_renueva_la_ventana() {
        let pool = pool_de_prueba().await;
        let service = service();
        let (sesion, _) = service.iniciar(&pool, datos("2")).await.unwrap();
        envejecer(&pool, sesion.id, 9).await;

        let renovada = service.actualizar_actividad(&pool, sesion.id).await.unwrap();
        assert!(renovada.fecha_ultimo_acceso > sesion.fecha_ultimo_acceso);

        let resultado = service.validar(&pool, sesion.id, 10).await.unwrap();
        assert!(matches!(resultado, ValidacionSesion::Valida { .. }));
    }

    #[tokio::test]
    async fn cerrar_es_terminal() {
        let pool = pool_de_prueba().await;
        let service = service();
        let (sesion, _) = service.iniciar(&pool, datos("9")).await.unwrap();

        service.cerrar(&pool, sesion.id).await.unwrap();

        let resultado = service.validar(&pool, sesion.id, 10).await.unwrap();
        assert_eq!(resultado, ValidacionSesion::Invalida { razon: "Sesión inactiva" });

        // Heartbeat numa sessão fechada é rechaçado.
        let err = service.actualizar_actividad(&pool, sesion.id).await.unwrap_err();
        assert!(matches!(err, AppError::SesionInactiva));
    }

    #[tokio::test]
    async fn operaciones_sobre_sesion_inexistente() {
        let pool = pool_de_prueba().await;
        let service = service();

        assert!(matches!(service.obtener(&pool, 404).await, Err(AppError::SesionNotFound)));
        assert!(matches!(service.validar(&pool, 404, 10).await, Err(AppError::SesionNotFound)));
        assert!(matches!(service.cerrar(&pool, 404).await, Err(AppError::SesionNotFound)));
    }

    #[test]
    fn expiracion_es_una_funcion_pura() {
        let ahora = Utc::now();
        let sesion = Sesion {
            id: 1,
            mesa: "1".into(),
            nombre_cliente: None,
            fecha_inicio: ahora - Duration::minutes(30),
            fecha_ultimo_acceso: ahora - Duration::minutes(11),
            dispositivo: None,
            ip_cliente: None,
            activa: true,
        };
        assert!(sesion_expirada(&sesion, 10, ahora));
        assert!(!sesion_expirada(&sesion, 15, ahora));
    }
}
