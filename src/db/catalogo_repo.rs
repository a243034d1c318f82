// src/db/catalogo_repo.rs

use sqlx::{Executor, Sqlite};

use crate::{
    common::error::AppError,
    models::catalogo::{
        Categoria, ConteoPorCategoria, Ingrediente, NuevoProducto, Producto, Subcategoria,
        TipoProducto,
    },
};

// Todas as queries de produto saem com os nomes de categoria/subcategoria já
// resolvidos; o frontend mostra esses campos em todas as listagens.
const SELECT_PRODUCTO: &str = r#"
    SELECT p.*,
           c.titulo AS categoria_nombre,
           s.nombre AS subcategoria_nombre
      FROM productos p
      LEFT JOIN categorias c ON c.id = p.categoria_id
      LEFT JOIN subcategorias s ON s.id = p.subcategoria_id
"#;

const SELECT_SUBCATEGORIA: &str = r#"
    SELECT s.*, c.titulo AS categoria_nombre
      FROM subcategorias s
      JOIN categorias c ON c.id = s.categoria_id
"#;

#[derive(Clone, Default)]
pub struct CatalogoRepository;

impl CatalogoRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Categorias
    // ---

    pub async fn get_categoria<'e, E>(
        &self,
        executor: E,
        id: i64,
    ) -> Result<Option<Categoria>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let categoria = sqlx::query_as::<_, Categoria>("SELECT * FROM categorias WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(categoria)
    }

    pub async fn get_categoria_por_codigo<'e, E>(
        &self,
        executor: E,
        codigo: &str,
    ) -> Result<Option<Categoria>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let categoria =
            sqlx::query_as::<_, Categoria>("SELECT * FROM categorias WHERE codigo = ?")
                .bind(codigo)
                .fetch_optional(executor)
                .await?;
        Ok(categoria)
    }

    pub async fn list_categorias<'e, E>(
        &self,
        executor: E,
        solo_activas: bool,
    ) -> Result<Vec<Categoria>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let categorias = sqlx::query_as::<_, Categoria>(
            "SELECT * FROM categorias WHERE (? = 0 OR activa = 1) ORDER BY orden, titulo",
        )
        .bind(solo_activas)
        .fetch_all(executor)
        .await?;
        Ok(categorias)
    }

    pub async fn insert_categoria<'e, E>(
        &self,
        executor: E,
        codigo: Option<&str>,
        titulo: &str,
        descripcion: Option<&str>,
        icono: &str,
        orden: i64,
        activa: bool,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let resultado = sqlx::query(
            r#"
            INSERT INTO categorias (codigo, titulo, descripcion, icono, orden, activa)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(codigo)
        .bind(titulo)
        .bind(descripcion)
        .bind(icono)
        .bind(orden)
        .bind(activa)
        .execute(executor)
        .await?;
        Ok(resultado.last_insert_rowid())
    }

    pub async fn update_categoria<'e, E>(
        &self,
        executor: E,
        categoria: &Categoria,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            UPDATE categorias
               SET codigo = ?, titulo = ?, descripcion = ?, icono = ?, orden = ?, activa = ?
             WHERE id = ?
            "#,
        )
        .bind(categoria.codigo.as_deref())
        .bind(&categoria.titulo)
        .bind(categoria.descripcion.as_deref())
        .bind(categoria.icono.as_deref())
        .bind(categoria.orden)
        .bind(categoria.activa)
        .bind(categoria.id)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn delete_categoria<'e, E>(&self, executor: E, id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query("DELETE FROM categorias WHERE id = ?")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn count_productos_de_categoria<'e, E>(
        &self,
        executor: E,
        categoria_id: i64,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM productos WHERE categoria_id = ?")
                .bind(categoria_id)
                .fetch_one(executor)
                .await?;
        Ok(total)
    }

    pub async fn count_subcategorias_de_categoria<'e, E>(
        &self,
        executor: E,
        categoria_id: i64,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM subcategorias WHERE categoria_id = ?",
        )
        .bind(categoria_id)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }

    /// Eliminação forzada: as subcategorias caem junto com a categoria.
    pub async fn delete_subcategorias_de_categoria<'e, E>(
        &self,
        executor: E,
        categoria_id: i64,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let resultado = sqlx::query("DELETE FROM subcategorias WHERE categoria_id = ?")
            .bind(categoria_id)
            .execute(executor)
            .await?;
        Ok(resultado.rows_affected())
    }

    /// Eliminação forzada: os produtos sobrevivem, mas ficam sem categoria.
    pub async fn desvincular_productos_de_categoria<'e, E>(
        &self,
        executor: E,
        categoria_id: i64,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let resultado = sqlx::query(
            r#"
            UPDATE productos
               SET categoria_id = NULL, subcategoria_id = NULL
             WHERE categoria_id = ?
            "#,
        )
        .bind(categoria_id)
        .execute(executor)
        .await?;
        Ok(resultado.rows_affected())
    }

    // ---
    // Subcategorias
    // ---

    pub async fn get_subcategoria<'e, E>(
        &self,
        executor: E,
        id: i64,
    ) -> Result<Option<Subcategoria>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("{SELECT_SUBCATEGORIA} WHERE s.id = ?");
        let subcategoria = sqlx::query_as::<_, Subcategoria>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(subcategoria)
    }

    pub async fn get_subcategoria_por_codigo<'e, E>(
        &self,
        executor: E,
        codigo: &str,
    ) -> Result<Option<Subcategoria>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("{SELECT_SUBCATEGORIA} WHERE s.codigo = ?");
        let subcategoria = sqlx::query_as::<_, Subcategoria>(&sql)
            .bind(codigo)
            .fetch_optional(executor)
            .await?;
        Ok(subcategoria)
    }

    pub async fn list_subcategorias<'e, E>(
        &self,
        executor: E,
        categoria_id: Option<i64>,
        solo_activas: bool,
    ) -> Result<Vec<Subcategoria>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!(
            r#"{SELECT_SUBCATEGORIA}
             WHERE (?1 IS NULL OR s.categoria_id = ?1)
               AND (?2 = 0 OR s.activa = 1)
             ORDER BY s.orden, s.nombre"#
        );
        let subcategorias = sqlx::query_as::<_, Subcategoria>(&sql)
            .bind(categoria_id)
            .bind(solo_activas)
            .fetch_all(executor)
            .await?;
        Ok(subcategorias)
    }

    pub async fn insert_subcategoria<'e, E>(
        &self,
        executor: E,
        codigo: Option<&str>,
        nombre: &str,
        descripcion: Option<&str>,
        categoria_id: i64,
        tipo: Option<&str>,
        icono: &str,
        orden: i64,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let resultado = sqlx::query(
            r#"
            INSERT INTO subcategorias (codigo, nombre, descripcion, categoria_id, tipo, icono, orden)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(codigo)
        .bind(nombre)
        .bind(descripcion)
        .bind(categoria_id)
        .bind(tipo)
        .bind(icono)
        .bind(orden)
        .execute(executor)
        .await?;
        Ok(resultado.last_insert_rowid())
    }

    pub async fn update_subcategoria<'e, E>(
        &self,
        executor: E,
        subcategoria: &Subcategoria,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            UPDATE subcategorias
               SET codigo = ?, nombre = ?, descripcion = ?, categoria_id = ?,
                   tipo = ?, icono = ?, orden = ?, activa = ?
             WHERE id = ?
            "#,
        )
        .bind(subcategoria.codigo.as_deref())
        .bind(&subcategoria.nombre)
        .bind(subcategoria.descripcion.as_deref())
        .bind(subcategoria.categoria_id)
        .bind(subcategoria.tipo.as_deref())
        .bind(&subcategoria.icono)
        .bind(subcategoria.orden)
        .bind(subcategoria.activa)
        .bind(subcategoria.id)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn delete_subcategoria<'e, E>(&self, executor: E, id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query("DELETE FROM subcategorias WHERE id = ?")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn count_productos_de_subcategoria<'e, E>(
        &self,
        executor: E,
        subcategoria_id: i64,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM productos WHERE subcategoria_id = ?",
        )
        .bind(subcategoria_id)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }

    // ---
    // Productos
    // ---

    pub async fn get_producto<'e, E>(
        &self,
        executor: E,
        id: i64,
    ) -> Result<Option<Producto>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("{SELECT_PRODUCTO} WHERE p.id = ?");
        let producto = sqlx::query_as::<_, Producto>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(producto)
    }

    pub async fn get_producto_por_nombre_normalizado<'e, E>(
        &self,
        executor: E,
        nombre_normalizado: &str,
    ) -> Result<Option<Producto>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("{SELECT_PRODUCTO} WHERE p.nombre_normalizado = ?");
        let producto = sqlx::query_as::<_, Producto>(&sql)
            .bind(nombre_normalizado)
            .fetch_optional(executor)
            .await?;
        Ok(producto)
    }

    /// Listagem do admin. `limit = -1` significa "sem limite" para o SQLite.
    pub async fn list_productos<'e, E>(
        &self,
        executor: E,
        categoria_id: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Producto>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!(
            r#"{SELECT_PRODUCTO}
             WHERE (?1 IS NULL OR p.categoria_id = ?1)
             ORDER BY p.id
             LIMIT ?2 OFFSET ?3"#
        );
        let productos = sqlx::query_as::<_, Producto>(&sql)
            .bind(categoria_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(executor)
            .await?;
        Ok(productos)
    }

    /// Só o que o cliente pode ver: ativo e disponível.
    pub async fn list_productos_visibles<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<Producto>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!(
            "{SELECT_PRODUCTO} WHERE p.activo = 1 AND p.disponible = 1 ORDER BY p.nombre"
        );
        let productos = sqlx::query_as::<_, Producto>(&sql)
            .fetch_all(executor)
            .await?;
        Ok(productos)
    }

    pub async fn list_productos_preparados<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<Producto>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!(
            "{SELECT_PRODUCTO} WHERE p.tipo_producto = ? AND p.activo = 1 ORDER BY p.nombre"
        );
        let productos = sqlx::query_as::<_, Producto>(&sql)
            .bind(TipoProducto::Preparado)
            .fetch_all(executor)
            .await?;
        Ok(productos)
    }

    pub async fn insert_producto<'e, E>(
        &self,
        executor: E,
        nuevo: &NuevoProducto,
        nombre_normalizado: &str,
        ahora: chrono::DateTime<chrono::Utc>,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let resultado = sqlx::query(
            r#"
            INSERT INTO productos (codigo, nombre, nombre_normalizado, descripcion, precio,
                                   categoria_id, subcategoria_id, imagen_url, tiempo_preparacion,
                                   instrucciones_preparacion, notas_cocina, disponible,
                                   tipo_producto, fecha_creacion, fecha_actualizacion)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(nuevo.codigo.as_deref())
        .bind(&nuevo.nombre)
        .bind(nombre_normalizado)
        .bind(nuevo.descripcion.as_deref())
        .bind(nuevo.precio)
        .bind(nuevo.categoria_id)
        .bind(nuevo.subcategoria_id)
        .bind(nuevo.imagen_url.as_deref())
        .bind(nuevo.tiempo_preparacion.as_deref())
        .bind(nuevo.instrucciones_preparacion.as_deref())
        .bind(nuevo.notas_cocina.as_deref())
        .bind(nuevo.disponible)
        .bind(nuevo.tipo_producto)
        .bind(ahora)
        .bind(ahora)
        .execute(executor)
        .await?;
        Ok(resultado.last_insert_rowid())
    }

    pub async fn update_producto<'e, E>(
        &self,
        executor: E,
        producto: &Producto,
        nombre_normalizado: &str,
        ahora: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            UPDATE productos
               SET codigo = ?, nombre = ?, nombre_normalizado = ?, descripcion = ?, precio = ?,
                   categoria_id = ?, subcategoria_id = ?, imagen_url = ?, tiempo_preparacion = ?,
                   instrucciones_preparacion = ?, notas_cocina = ?, disponible = ?, activo = ?,
                   tipo_producto = ?, fecha_actualizacion = ?
             WHERE id = ?
            "#,
        )
        .bind(producto.codigo.as_deref())
        .bind(&producto.nombre)
        .bind(nombre_normalizado)
        .bind(producto.descripcion.as_deref())
        .bind(producto.precio)
        .bind(producto.categoria_id)
        .bind(producto.subcategoria_id)
        .bind(producto.imagen_url.as_deref())
        .bind(producto.tiempo_preparacion.as_deref())
        .bind(producto.instrucciones_preparacion.as_deref())
        .bind(producto.notas_cocina.as_deref())
        .bind(producto.disponible)
        .bind(producto.activo)
        .bind(producto.tipo_producto)
        .bind(ahora)
        .bind(producto.id)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn delete_producto<'e, E>(&self, executor: E, id: i64) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let resultado = sqlx::query("DELETE FROM productos WHERE id = ?")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(resultado.rows_affected())
    }

    pub async fn delete_ingredientes_de_producto<'e, E>(
        &self,
        executor: E,
        producto_id: i64,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let resultado = sqlx::query("DELETE FROM ingredientes WHERE producto_id = ?")
            .bind(producto_id)
            .execute(executor)
            .await?;
        Ok(resultado.rows_affected())
    }

    pub async fn count_productos<'e, E>(
        &self,
        executor: E,
        solo_disponibles: bool,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM productos WHERE (? = 0 OR disponible = 1)",
        )
        .bind(solo_disponibles)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }

    pub async fn conteo_productos_por_categoria<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<ConteoPorCategoria>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let conteos = sqlx::query_as::<_, ConteoPorCategoria>(
            r#"
            SELECT c.titulo AS nombre, COUNT(p.id) AS cantidad
              FROM categorias c
              LEFT JOIN productos p ON p.categoria_id = c.id
             GROUP BY c.id
             ORDER BY c.titulo
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(conteos)
    }

    // ---
    // Ingredientes
    // ---

    pub async fn get_ingrediente<'e, E>(
        &self,
        executor: E,
        id: i64,
    ) -> Result<Option<Ingrediente>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let ingrediente =
            sqlx::query_as::<_, Ingrediente>("SELECT * FROM ingredientes WHERE id = ?")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(ingrediente)
    }

    pub async fn list_ingredientes_de_producto<'e, E>(
        &self,
        executor: E,
        producto_id: i64,
    ) -> Result<Vec<Ingrediente>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let ingredientes = sqlx::query_as::<_, Ingrediente>(
            "SELECT * FROM ingredientes WHERE producto_id = ? ORDER BY id",
        )
        .bind(producto_id)
        .fetch_all(executor)
        .await?;
        Ok(ingredientes)
    }

    pub async fn insert_ingrediente<'e, E>(
        &self,
        executor: E,
        producto_id: i64,
        codigo: Option<&str>,
        nombre: &str,
        cantidad: Option<&str>,
        unidad: Option<&str>,
        costo: f64,
        obligatorio: bool,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let resultado = sqlx::query(
            r#"
            INSERT INTO ingredientes (producto_id, codigo, nombre, cantidad, unidad, costo, obligatorio)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(producto_id)
        .bind(codigo)
        .bind(nombre)
        .bind(cantidad)
        .bind(unidad)
        .bind(costo)
        .bind(obligatorio)
        .execute(executor)
        .await?;
        Ok(resultado.last_insert_rowid())
    }

    pub async fn update_ingrediente<'e, E>(
        &self,
        executor: E,
        ingrediente: &Ingrediente,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            UPDATE ingredientes
               SET codigo = ?, nombre = ?, cantidad = ?, unidad = ?,
                   costo = ?, obligatorio = ?, activo = ?
             WHERE id = ?
            "#,
        )
        .bind(ingrediente.codigo.as_deref())
        .bind(&ingrediente.nombre)
        .bind(ingrediente.cantidad.as_deref())
        .bind(ingrediente.unidad.as_deref())
        .bind(ingrediente.costo)
        .bind(ingrediente.obligatorio)
        .bind(ingrediente.activo)
        .bind(ingrediente.id)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn delete_ingrediente<'e, E>(&self, executor: E, id: i64) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let resultado = sqlx::query("DELETE FROM ingredientes WHERE id = ?")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(resultado.rows_affected())
    }
}
