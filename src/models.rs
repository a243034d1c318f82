pub mod catalogo;
pub mod chatbot;
pub mod configuracion;
