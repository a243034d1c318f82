pub mod categorias;
pub mod chatbot;
pub mod configuracion;
pub mod ingredientes;
pub mod productos;
pub mod staff;
pub mod subcategorias;
