pub mod iconos;

pub mod catalogo_service;
pub use catalogo_service::CatalogoService;
pub mod sesion_service;
pub use sesion_service::SesionService;
pub mod feedback_service;
pub use feedback_service::FeedbackService;
pub mod configuracion_service;
pub use configuracion_service::ConfiguracionService;
