pub mod catalogo_repo;
pub use catalogo_repo::CatalogoRepository;
pub mod sesion_repo;
pub use sesion_repo::SesionRepository;
pub mod feedback_repo;
pub use feedback_repo::FeedbackRepository;
pub mod configuracion_repo;
pub use configuracion_repo::ConfiguracionRepository;

/// O SQLite não expõe o nome da constraint violada; a mensagem
/// ("UNIQUE constraint failed: tabla.columna") é o que temos para decidir
/// qual regra de negócio disparou.
pub fn es_violacion_unique(err: &sqlx::Error, columna: &str) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        db_err.is_unique_violation() && db_err.message().contains(columna)
    } else {
        false
    }
}
