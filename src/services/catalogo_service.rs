// src/services/catalogo_service.rs

use chrono::Utc;
use sqlx::{Acquire, Executor, Sqlite, SqliteConnection};

use crate::{
    common::error::AppError,
    db::{es_violacion_unique, CatalogoRepository},
    models::catalogo::{
        Categoria, CategoriaConProductos, EstadisticasProductos, Ingrediente, NuevoProducto,
        Producto, Receta, Subcategoria, TipoProducto,
    },
    services::iconos,
};

/// Regras de negócio do catálogo (categorias, subcategorias, produtos e
/// ingredientes). Toda operação de escrita roda numa transação própria.
#[derive(Clone)]
pub struct CatalogoService {
    repo: CatalogoRepository,
}

/// A forma canônica do nome de produto: minúsculas, sem espaços nas pontas.
/// A UNIQUE de `productos.nombre_normalizado` compara exatamente isto.
pub fn normalizar_nombre(nombre: &str) -> String {
    nombre.trim().to_lowercase()
}

pub struct CategoriaCreada {
    pub categoria: Categoria,
    pub icono_detectado: String,
    pub codigo_generado: String,
}

#[derive(Debug, Default, Clone)]
pub struct CategoriaPatch {
    pub nombre: Option<String>,
    pub descripcion: Option<String>,
    pub icono: Option<String>,
    pub codigo: Option<String>,
    pub orden: Option<i64>,
    pub activa: Option<bool>,
}

#[derive(Debug, Default, Clone)]
pub struct SubcategoriaPatch {
    pub nombre: Option<String>,
    pub descripcion: Option<String>,
    pub categoria_id: Option<i64>,
    pub tipo: Option<String>,
    pub icono: Option<String>,
    pub codigo: Option<String>,
    pub orden: Option<i64>,
    pub activa: Option<bool>,
}

#[derive(Debug, Default, Clone)]
pub struct ProductoPatch {
    pub codigo: Option<String>,
    pub nombre: Option<String>,
    pub descripcion: Option<String>,
    pub precio: Option<f64>,
    pub categoria_id: Option<i64>,
    pub subcategoria_id: Option<i64>,
    pub imagen_url: Option<String>,
    pub tiempo_preparacion: Option<String>,
    pub instrucciones_preparacion: Option<String>,
    pub notas_cocina: Option<String>,
    pub disponible: Option<bool>,
    pub activo: Option<bool>,
    pub tipo_producto: Option<TipoProducto>,
}

#[derive(Debug, Default, Clone)]
pub struct IngredientePatch {
    pub codigo: Option<String>,
    pub nombre: Option<String>,
    pub cantidad: Option<String>,
    pub unidad: Option<String>,
    pub costo: Option<f64>,
    pub obligatorio: Option<bool>,
    pub activo: Option<bool>,
}

impl CatalogoService {
    pub fn new(repo: CatalogoRepository) -> Self {
        Self { repo }
    }

    // ---
    // Categorias
    // ---

    pub async fn crear_categoria<'a, A>(
        &self,
        conn: A,
        nombre: &str,
        descripcion: Option<String>,
        icono: Option<String>,
        codigo: Option<String>,
        orden: i64,
        activa: bool,
    ) -> Result<CategoriaCreada, AppError>
    where
        A: Acquire<'a, Database = Sqlite>,
    {
        let nombre = nombre.trim();
        if nombre.is_empty() {
            return Err(AppError::InvalidInput("El nombre es requerido".into()));
        }

        let icono_detectado = iconos::detectar_icono_categoria(nombre).to_string();
        let icono_final = icono
            .filter(|i| !i.trim().is_empty())
            .unwrap_or_else(|| icono_detectado.clone());

        let mut tx = conn.begin().await?;

        // Código manual tem que estar livre; o automático ganha sufixo até
        // ficar único.
        let codigo_final = match codigo.filter(|c| !c.trim().is_empty()) {
            Some(manual) => {
                let manual = manual.trim().to_uppercase();
                if self.repo.get_categoria_por_codigo(&mut *tx, &manual).await?.is_some() {
                    return Err(AppError::CodigoDuplicado(manual));
                }
                manual
            }
            None => {
                let base = iconos::generar_codigo(nombre);
                self.codigo_unico_categoria(&mut tx, &base).await?
            }
        };

        let id = self
            .repo
            .insert_categoria(
                &mut *tx,
                Some(&codigo_final),
                nombre,
                descripcion.as_deref(),
                &icono_final,
                orden,
                activa,
            )
            .await?;
        let categoria = self
            .repo
            .get_categoria(&mut *tx, id)
            .await?
            .ok_or(AppError::CategoriaNotFound)?;
        tx.commit().await?;

        Ok(CategoriaCreada { categoria, icono_detectado, codigo_generado: codigo_final })
    }

    async fn codigo_unico_categoria(
        &self,
        conn: &mut SqliteConnection,
        base: &str,
    ) -> Result<String, AppError> {
        if self.repo.get_categoria_por_codigo(&mut *conn, base).await?.is_none() {
            return Ok(base.to_string());
        }
        let mut contador = 1;
        loop {
            let candidato = format!("{base}{contador:02}");
            if self.repo.get_categoria_por_codigo(&mut *conn, &candidato).await?.is_none() {
                return Ok(candidato);
            }
            contador += 1;
        }
    }

    async fn codigo_unico_subcategoria(
        &self,
        conn: &mut SqliteConnection,
        base: &str,
    ) -> Result<String, AppError> {
        if self.repo.get_subcategoria_por_codigo(&mut *conn, base).await?.is_none() {
            return Ok(base.to_string());
        }
        let mut contador = 1;
        loop {
            let candidato = format!("{base}{contador:02}");
            if self
                .repo
                .get_subcategoria_por_codigo(&mut *conn, &candidato)
                .await?
                .is_none()
            {
                return Ok(candidato);
            }
            contador += 1;
        }
    }

    pub async fn obtener_categoria<'e, E>(&self, executor: E, id: i64) -> Result<Categoria, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        self.repo
            .get_categoria(executor, id)
            .await?
            .ok_or(AppError::CategoriaNotFound)
    }

    pub async fn listar_categorias<'e, E>(&self, executor: E) -> Result<Vec<Categoria>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        self.repo.list_categorias(executor, true).await
    }

    pub async fn actualizar_categoria<'a, A>(
        &self,
        conn: A,
        id: i64,
        patch: CategoriaPatch,
    ) -> Result<Categoria, AppError>
    where
        A: Acquire<'a, Database = Sqlite>,
    {
        let mut tx = conn.begin().await?;
        let mut categoria = self
            .repo
            .get_categoria(&mut *tx, id)
            .await?
            .ok_or(AppError::CategoriaNotFound)?;

        if let Some(nombre) = patch.nombre {
            let nombre = nombre.trim().to_string();
            if nombre.is_empty() {
                return Err(AppError::InvalidInput("El nombre es requerido".into()));
            }
            categoria.titulo = nombre;
        }
        if let Some(descripcion) = patch.descripcion {
            categoria.descripcion = Some(descripcion);
        }
        if let Some(icono) = patch.icono {
            categoria.icono = Some(icono);
        }
        if let Some(codigo) = patch.codigo {
            categoria.codigo = Some(codigo.trim().to_uppercase());
        }
        if let Some(orden) = patch.orden {
            categoria.orden = orden;
        }
        if let Some(activa) = patch.activa {
            categoria.activa = activa;
        }

        if let Err(e) = self.repo.update_categoria(&mut *tx, &categoria).await {
            if let AppError::DatabaseError(ref db) = e {
                if es_violacion_unique(db, "categorias.codigo") {
                    return Err(AppError::CodigoDuplicado(
                        categoria.codigo.unwrap_or_default(),
                    ));
                }
            }
            return Err(e);
        }
        tx.commit().await?;
        Ok(categoria)
    }

    /// Eliminação estrita: recusa se a categoria ainda tiver produtos ou
    /// subcategorias. Nada é modificado no caso de recusa.
    pub async fn eliminar_categoria_estricta<'a, A>(
        &self,
        conn: A,
        id: i64,
    ) -> Result<Categoria, AppError>
    where
        A: Acquire<'a, Database = Sqlite>,
    {
        let mut tx = conn.begin().await?;
        let categoria = self
            .repo
            .get_categoria(&mut *tx, id)
            .await?
            .ok_or(AppError::CategoriaNotFound)?;

        let productos = self.repo.count_productos_de_categoria(&mut *tx, id).await?;
        let subcategorias = self.repo.count_subcategorias_de_categoria(&mut *tx, id).await?;
        if productos > 0 || subcategorias > 0 {
            return Err(AppError::CategoriaConDependencias {
                titulo: categoria.titulo,
                productos,
                subcategorias,
            });
        }

        self.repo.delete_categoria(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(categoria)
    }

    /// Eliminação em cascata (`?forzar=true`): apaga as subcategorias e
    /// desvincula os produtos (ficam com categoria/subcategoria nulas), tudo
    /// na mesma transação. Retorna `(categoria, produtos desvinculados,
    /// subcategorias eliminadas)`.
    pub async fn eliminar_categoria_en_cascada<'a, A>(
        &self,
        conn: A,
        id: i64,
    ) -> Result<(Categoria, u64, u64), AppError>
    where
        A: Acquire<'a, Database = Sqlite>,
    {
        let mut tx = conn.begin().await?;
        let categoria = self
            .repo
            .get_categoria(&mut *tx, id)
            .await?
            .ok_or(AppError::CategoriaNotFound)?;

        // A ordem importa: primeiro os produtos soltam as referências às
        // subcategorias, depois as subcategorias podem sair.
        let productos = self.repo.desvincular_productos_de_categoria(&mut *tx, id).await?;
        let subcategorias = self.repo.delete_subcategorias_de_categoria(&mut *tx, id).await?;
        self.repo.delete_categoria(&mut *tx, id).await?;
        tx.commit().await?;
        Ok((categoria, productos, subcategorias))
    }

    // ---
    // Subcategorias
    // ---

    pub async fn crear_subcategoria<'a, A>(
        &self,
        conn: A,
        nombre: &str,
        descripcion: Option<String>,
        categoria_id: i64,
        tipo: Option<String>,
        icono: Option<String>,
        codigo: Option<String>,
        orden: i64,
    ) -> Result<Subcategoria, AppError>
    where
        A: Acquire<'a, Database = Sqlite>,
    {
        let nombre = nombre.trim();
        if nombre.is_empty() {
            return Err(AppError::InvalidInput("El nombre es requerido".into()));
        }

        let mut tx = conn.begin().await?;
        self.repo
            .get_categoria(&mut *tx, categoria_id)
            .await?
            .ok_or(AppError::CategoriaNotFound)?;

        let icono_final = icono
            .filter(|i| !i.trim().is_empty())
            .unwrap_or_else(|| iconos::detectar_icono_subcategoria(nombre).to_string());
        let codigo_final = match codigo.filter(|c| !c.trim().is_empty()) {
            Some(manual) => {
                let manual = manual.trim().to_uppercase();
                if self
                    .repo
                    .get_subcategoria_por_codigo(&mut *tx, &manual)
                    .await?
                    .is_some()
                {
                    return Err(AppError::CodigoDuplicado(manual));
                }
                manual
            }
            None => {
                let base = iconos::generar_codigo(nombre);
                self.codigo_unico_subcategoria(&mut tx, &base).await?
            }
        };

        let id = self
            .repo
            .insert_subcategoria(
                &mut *tx,
                Some(&codigo_final),
                nombre,
                descripcion.as_deref(),
                categoria_id,
                tipo.as_deref(),
                &icono_final,
                orden,
            )
            .await?;
        let subcategoria = self
            .repo
            .get_subcategoria(&mut *tx, id)
            .await?
            .ok_or(AppError::SubcategoriaNotFound)?;
        tx.commit().await?;
        Ok(subcategoria)
    }

    pub async fn obtener_subcategoria<'e, E>(
        &self,
        executor: E,
        id: i64,
    ) -> Result<Subcategoria, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        self.repo
            .get_subcategoria(executor, id)
            .await?
            .ok_or(AppError::SubcategoriaNotFound)
    }

    pub async fn listar_subcategorias<'e, E>(
        &self,
        executor: E,
        categoria_id: Option<i64>,
    ) -> Result<Vec<Subcategoria>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        self.repo.list_subcategorias(executor, categoria_id, true).await
    }

    pub async fn actualizar_subcategoria<'a, A>(
        &self,
        conn: A,
        id: i64,
        patch: SubcategoriaPatch,
    ) -> Result<Subcategoria, AppError>
    where
        A: Acquire<'a, Database = Sqlite>,
    {
        let mut tx = conn.begin().await?;
        let mut subcategoria = self
            .repo
            .get_subcategoria(&mut *tx, id)
            .await?
            .ok_or(AppError::SubcategoriaNotFound)?;

        if let Some(nombre) = patch.nombre {
            let nombre = nombre.trim().to_string();
            if nombre.is_empty() {
                return Err(AppError::InvalidInput("El nombre es requerido".into()));
            }
            subcategoria.nombre = nombre;
        }
        if let Some(categoria_id) = patch.categoria_id {
            self.repo
                .get_categoria(&mut *tx, categoria_id)
                .await?
                .ok_or(AppError::CategoriaNotFound)?;
            subcategoria.categoria_id = categoria_id;
        }
        if let Some(descripcion) = patch.descripcion {
            subcategoria.descripcion = Some(descripcion);
        }
        if let Some(tipo) = patch.tipo {
            subcategoria.tipo = Some(tipo);
        }
        if let Some(icono) = patch.icono {
            subcategoria.icono = icono;
        }
        if let Some(codigo) = patch.codigo {
            subcategoria.codigo = Some(codigo.trim().to_uppercase());
        }
        if let Some(orden) = patch.orden {
            subcategoria.orden = orden;
        }
        if let Some(activa) = patch.activa {
            subcategoria.activa = activa;
        }

        if let Err(e) = self.repo.update_subcategoria(&mut *tx, &subcategoria).await {
            if let AppError::DatabaseError(ref db) = e {
                if es_violacion_unique(db, "subcategorias.codigo") {
                    return Err(AppError::CodigoDuplicado(
                        subcategoria.codigo.unwrap_or_default(),
                    ));
                }
            }
            return Err(e);
        }
        let subcategoria = self
            .repo
            .get_subcategoria(&mut *tx, id)
            .await?
            .ok_or(AppError::SubcategoriaNotFound)?;
        tx.commit().await?;
        Ok(subcategoria)
    }

    /// Subcategoria com produtos pendurados nunca sai — sem modo forzado aqui.
    pub async fn eliminar_subcategoria<'a, A>(
        &self,
        conn: A,
        id: i64,
    ) -> Result<Subcategoria, AppError>
    where
        A: Acquire<'a, Database = Sqlite>,
    {
        let mut tx = conn.begin().await?;
        let subcategoria = self
            .repo
            .get_subcategoria(&mut *tx, id)
            .await?
            .ok_or(AppError::SubcategoriaNotFound)?;

        let productos = self.repo.count_productos_de_subcategoria(&mut *tx, id).await?;
        if productos > 0 {
            return Err(AppError::SubcategoriaConDependencias {
                nombre: subcategoria.nombre,
                productos,
            });
        }

        self.repo.delete_subcategoria(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(subcategoria)
    }

    // ---
    // Productos
    // ---

    pub async fn crear_producto<'a, A>(
        &self,
        conn: A,
        mut nuevo: NuevoProducto,
    ) -> Result<Producto, AppError>
    where
        A: Acquire<'a, Database = Sqlite>,
    {
        nuevo.nombre = nuevo.nombre.trim().to_string();
        if nuevo.nombre.is_empty() {
            return Err(AppError::InvalidInput(
                "El nombre del producto no puede estar vacío".into(),
            ));
        }
        if nuevo.precio <= 0.0 {
            return Err(AppError::InvalidInput("El precio debe ser mayor a 0".into()));
        }
        let normalizado = normalizar_nombre(&nuevo.nombre);

        let mut tx = conn.begin().await?;
        if let Some(categoria_id) = nuevo.categoria_id {
            self.repo
                .get_categoria(&mut *tx, categoria_id)
                .await?
                .ok_or(AppError::CategoriaNotFound)?;
        }
        if let Some(subcategoria_id) = nuevo.subcategoria_id {
            self.repo
                .get_subcategoria(&mut *tx, subcategoria_id)
                .await?
                .ok_or(AppError::SubcategoriaNotFound)?;
        }

        // A UNIQUE do banco é quem decide o conflito de nome: nada de
        // SELECT-antes-de-INSERT com janela para corrida.
        let id = match self
            .repo
            .insert_producto(&mut *tx, &nuevo, &normalizado, Utc::now())
            .await
        {
            Ok(id) => id,
            Err(AppError::DatabaseError(ref e)) if es_violacion_unique(e, "nombre_normalizado") => {
                let existente = self
                    .repo
                    .get_producto_por_nombre_normalizado(&mut *tx, &normalizado)
                    .await?;
                return Err(AppError::ProductoNombreDuplicado {
                    nombre: nuevo.nombre,
                    existente_id: existente.map(|p| p.id).unwrap_or_default(),
                });
            }
            Err(AppError::DatabaseError(ref e)) if es_violacion_unique(e, "productos.codigo") => {
                return Err(AppError::CodigoDuplicado(nuevo.codigo.unwrap_or_default()));
            }
            Err(e) => return Err(e),
        };

        let producto = self
            .repo
            .get_producto(&mut *tx, id)
            .await?
            .ok_or(AppError::ProductoNotFound)?;
        tx.commit().await?;
        Ok(producto)
    }

    pub async fn obtener_producto<'e, E>(&self, executor: E, id: i64) -> Result<Producto, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        self.repo
            .get_producto(executor, id)
            .await?
            .ok_or(AppError::ProductoNotFound)
    }

    pub async fn listar_productos<'e, E>(
        &self,
        executor: E,
        categoria_id: Option<i64>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Producto>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        self.repo
            .list_productos(
                executor,
                categoria_id,
                limit.filter(|l| *l > 0).unwrap_or(-1),
                offset.unwrap_or(0).max(0),
            )
            .await
    }

    pub async fn actualizar_producto<'a, A>(
        &self,
        conn: A,
        id: i64,
        patch: ProductoPatch,
    ) -> Result<Producto, AppError>
    where
        A: Acquire<'a, Database = Sqlite>,
    {
        let mut tx = conn.begin().await?;
        let mut producto = self
            .repo
            .get_producto(&mut *tx, id)
            .await?
            .ok_or(AppError::ProductoNotFound)?;

        if let Some(nombre) = patch.nombre {
            let nombre = nombre.trim().to_string();
            if nombre.is_empty() {
                return Err(AppError::InvalidInput(
                    "El nombre del producto no puede estar vacío".into(),
                ));
            }
            producto.nombre = nombre;
        }
        if let Some(precio) = patch.precio {
            // Na atualização zero é aceito (produto "sem preço" temporário).
            if precio < 0.0 {
                return Err(AppError::InvalidInput("El precio no puede ser negativo".into()));
            }
            producto.precio = precio;
        }
        if let Some(categoria_id) = patch.categoria_id {
            self.repo
                .get_categoria(&mut *tx, categoria_id)
                .await?
                .ok_or(AppError::CategoriaNotFound)?;
            producto.categoria_id = Some(categoria_id);
        }
        if let Some(subcategoria_id) = patch.subcategoria_id {
            self.repo
                .get_subcategoria(&mut *tx, subcategoria_id)
                .await?
                .ok_or(AppError::SubcategoriaNotFound)?;
            producto.subcategoria_id = Some(subcategoria_id);
        }
        if let Some(codigo) = patch.codigo {
            producto.codigo = Some(codigo.trim().to_uppercase());
        }
        if let Some(descripcion) = patch.descripcion {
            producto.descripcion = Some(descripcion);
        }
        if let Some(imagen_url) = patch.imagen_url {
            producto.imagen_url = Some(imagen_url);
        }
        if let Some(tiempo) = patch.tiempo_preparacion {
            producto.tiempo_preparacion = Some(tiempo);
        }
        if let Some(instrucciones) = patch.instrucciones_preparacion {
            producto.instrucciones_preparacion = Some(instrucciones);
        }
        if let Some(notas) = patch.notas_cocina {
            producto.notas_cocina = Some(notas);
        }
        if let Some(disponible) = patch.disponible {
            producto.disponible = disponible;
        }
        if let Some(activo) = patch.activo {
            producto.activo = activo;
        }
        if let Some(tipo) = patch.tipo_producto {
            producto.tipo_producto = tipo;
        }

        let normalizado = normalizar_nombre(&producto.nombre);
        // Atualizar a própria linha nunca colide consigo mesma; se a UNIQUE
        // disparar, é outro produto usando o nome.
        if let Err(e) = self
            .repo
            .update_producto(&mut *tx, &producto, &normalizado, Utc::now())
            .await
        {
            if let AppError::DatabaseError(ref db) = e {
                if es_violacion_unique(db, "nombre_normalizado") {
                    let existente = self
                        .repo
                        .get_producto_por_nombre_normalizado(&mut *tx, &normalizado)
                        .await?;
                    return Err(AppError::ProductoNombreDuplicado {
                        nombre: producto.nombre,
                        existente_id: existente.map(|p| p.id).unwrap_or_default(),
                    });
                }
                if es_violacion_unique(db, "productos.codigo") {
                    return Err(AppError::CodigoDuplicado(producto.codigo.unwrap_or_default()));
                }
            }
            return Err(e);
        }

        let producto = self
            .repo
            .get_producto(&mut *tx, id)
            .await?
            .ok_or(AppError::ProductoNotFound)?;
        tx.commit().await?;
        Ok(producto)
    }

    /// Apaga o produto e a receita junto (os ingredientes são dele).
    pub async fn eliminar_producto<'a, A>(
        &self,
        conn: A,
        id: i64,
    ) -> Result<(Producto, u64), AppError>
    where
        A: Acquire<'a, Database = Sqlite>,
    {
        let mut tx = conn.begin().await?;
        let producto = self
            .repo
            .get_producto(&mut *tx, id)
            .await?
            .ok_or(AppError::ProductoNotFound)?;

        let ingredientes = self.repo.delete_ingredientes_de_producto(&mut *tx, id).await?;
        self.repo.delete_producto(&mut *tx, id).await?;
        tx.commit().await?;
        Ok((producto, ingredientes))
    }

    // ---
    // Ingredientes
    // ---

    pub async fn crear_ingrediente<'a, A>(
        &self,
        conn: A,
        producto_id: i64,
        nombre: &str,
        codigo: Option<String>,
        cantidad: Option<String>,
        unidad: Option<String>,
        costo: f64,
        obligatorio: bool,
    ) -> Result<Ingrediente, AppError>
    where
        A: Acquire<'a, Database = Sqlite>,
    {
        let nombre = nombre.trim();
        if nombre.is_empty() {
            return Err(AppError::InvalidInput("El nombre es requerido".into()));
        }
        if costo < 0.0 {
            return Err(AppError::InvalidInput("El costo no puede ser negativo".into()));
        }

        let mut tx = conn.begin().await?;
        self.repo
            .get_producto(&mut *tx, producto_id)
            .await?
            .ok_or(AppError::ProductoNotFound)?;

        let id = self
            .repo
            .insert_ingrediente(
                &mut *tx,
                producto_id,
                codigo.as_deref(),
                nombre,
                cantidad.as_deref(),
                unidad.as_deref(),
                costo,
                obligatorio,
            )
            .await?;
        let ingrediente = self
            .repo
            .get_ingrediente(&mut *tx, id)
            .await?
            .ok_or(AppError::IngredienteNotFound)?;
        tx.commit().await?;
        Ok(ingrediente)
    }

    pub async fn listar_ingredientes<'a, A>(
        &self,
        conn: A,
        producto_id: i64,
    ) -> Result<Vec<Ingrediente>, AppError>
    where
        A: Acquire<'a, Database = Sqlite>,
    {
        let mut conn = conn.acquire().await?;
        self.repo
            .get_producto(&mut *conn, producto_id)
            .await?
            .ok_or(AppError::ProductoNotFound)?;
        self.repo.list_ingredientes_de_producto(&mut *conn, producto_id).await
    }

    pub async fn actualizar_ingrediente<'a, A>(
        &self,
        conn: A,
        id: i64,
        patch: IngredientePatch,
    ) -> Result<Ingrediente, AppError>
    where
        A: Acquire<'a, Database = Sqlite>,
    {
        let mut tx = conn.begin().await?;
        let mut ingrediente = self
            .repo
            .get_ingrediente(&mut *tx, id)
            .await?
            .ok_or(AppError::IngredienteNotFound)?;

        if let Some(nombre) = patch.nombre {
            let nombre = nombre.trim().to_string();
            if nombre.is_empty() {
                return Err(AppError::InvalidInput("El nombre es requerido".into()));
            }
            ingrediente.nombre = nombre;
        }
        if let Some(costo) = patch.costo {
            if costo < 0.0 {
                return Err(AppError::InvalidInput("El costo no puede ser negativo".into()));
            }
            ingrediente.costo = costo;
        }
        if let Some(codigo) = patch.codigo {
            ingrediente.codigo = Some(codigo);
        }
        if let Some(cantidad) = patch.cantidad {
            ingrediente.cantidad = Some(cantidad);
        }
        if let Some(unidad) = patch.unidad {
            ingrediente.unidad = Some(unidad);
        }
        if let Some(obligatorio) = patch.obligatorio {
            ingrediente.obligatorio = obligatorio;
        }
        if let Some(activo) = patch.activo {
            ingrediente.activo = activo;
        }

        self.repo.update_ingrediente(&mut *tx, &ingrediente).await?;
        tx.commit().await?;
        Ok(ingrediente)
    }

    pub async fn eliminar_ingrediente<'a, A>(
        &self,
        conn: A,
        id: i64,
    ) -> Result<Ingrediente, AppError>
    where
        A: Acquire<'a, Database = Sqlite>,
    {
        let mut tx = conn.begin().await?;
        let ingrediente = self
            .repo
            .get_ingrediente(&mut *tx, id)
            .await?
            .ok_or(AppError::IngredienteNotFound)?;
        self.repo.delete_ingrediente(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(ingrediente)
    }

    // ---
    // Vistas agregadas
    // ---

    /// Menu do cliente: categorias ativas com seus produtos visíveis.
    pub async fn menu_completo<'a, A>(&self, conn: A) -> Result<Vec<CategoriaConProductos>, AppError>
    where
        A: Acquire<'a, Database = Sqlite>,
    {
        let mut conn = conn.acquire().await?;
        let categorias = self.repo.list_categorias(&mut *conn, true).await?;
        let mut productos = self.repo.list_productos_visibles(&mut *conn).await?;

        let mut grupos = Vec::with_capacity(categorias.len());
        for categoria in categorias {
            let (del_grupo, resto): (Vec<_>, Vec<_>) = productos
                .into_iter()
                .partition(|p| p.categoria_id == Some(categoria.id));
            productos = resto;
            grupos.push(CategoriaConProductos { categoria, productos: del_grupo });
        }
        Ok(grupos)
    }

    /// Painel da cozinha: produtos `preparado` com a receita completa.
    pub async fn recetas<'a, A>(&self, conn: A) -> Result<Vec<Receta>, AppError>
    where
        A: Acquire<'a, Database = Sqlite>,
    {
        let mut conn = conn.acquire().await?;
        let preparados = self.repo.list_productos_preparados(&mut *conn).await?;

        let mut recetas = Vec::with_capacity(preparados.len());
        for producto in preparados {
            let ingredientes = self
                .repo
                .list_ingredientes_de_producto(&mut *conn, producto.id)
                .await?;
            recetas.push(Receta { producto, ingredientes });
        }
        Ok(recetas)
    }

    pub async fn estadisticas<'a, A>(&self, conn: A) -> Result<EstadisticasProductos, AppError>
    where
        A: Acquire<'a, Database = Sqlite>,
    {
        let mut conn = conn.acquire().await?;
        let total = self.repo.count_productos(&mut *conn, false).await?;
        let disponibles = self.repo.count_productos(&mut *conn, true).await?;
        let por_categoria = self.repo.conteo_productos_por_categoria(&mut *conn).await?;
        Ok(EstadisticasProductos {
            total,
            disponibles,
            no_disponibles: total - disponibles,
            por_categoria,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::CatalogoRepository;
    use crate::test_support::pool_de_prueba;
    use sqlx::SqlitePool;

    fn service() -> CatalogoService {
        CatalogoService::new(CatalogoRepository::new())
    }

    fn nuevo_producto(nombre: &str, precio: f64) -> NuevoProducto {
        NuevoProducto {
            codigo: None,
            nombre: nombre.to_string(),
            descripcion: None,
            precio,
            categoria_id: None,
            subcategoria_id: None,
            imagen_url: None,
            tiempo_preparacion: None,
            instrucciones_preparacion: None,
            notas_cocina: None,
            disponible: true,
            tipo_producto: TipoProducto::Simple,
        }
    }

    async fn categoria(pool: &SqlitePool, nombre: &str) -> Categoria {
        service()
            .crear_categoria(pool, nombre, None, None, None, 0, true)
            .await
            .unwrap()
            .categoria
    }

    #[tokio::test]
    async fn crear_categoria_asigna_icono_y_codigo() {
        let pool = pool_de_prueba().await;
        let creada = service()
            .crear_categoria(&pool, "Bebidas", None, None, None, 0, true)
            .await
            .unwrap();

        assert!(creada.categoria.activa);
        assert_eq!(creada.categoria.icono.as_deref(), Some("🍷"));
        assert_eq!(creada.categoria.codigo.as_deref(), Some("BEBI"));
        assert_eq!(creada.icono_detectado, "🍷");

        // Segunda categoria com o mesmo prefixo ganha sufixo numérico.
        let otra = service()
            .crear_categoria(&pool, "Bebidas calientes", None, None, None, 1, true)
            .await
            .unwrap();
        assert_eq!(otra.categoria.codigo.as_deref(), Some("BECA"));
        let tercera = service()
            .crear_categoria(&pool, "Bebi", None, None, None, 2, true)
            .await
            .unwrap();
        assert_eq!(tercera.categoria.codigo.as_deref(), Some("BEBI01"));
    }

    #[tokio::test]
    async fn icono_manual_gana_al_automatico() {
        let pool = pool_de_prueba().await;
        let creada = service()
            .crear_categoria(&pool, "Postres", None, Some("🎂".into()), None, 0, true)
            .await
            .unwrap();
        assert_eq!(creada.categoria.icono.as_deref(), Some("🎂"));
        assert_eq!(creada.icono_detectado, "🧁");
    }

    #[tokio::test]
    async fn nombre_de_producto_unico_ignorando_caja_y_espacios() {
        let pool = pool_de_prueba().await;
        let service = service();

        let primero = service
            .crear_producto(&pool, nuevo_producto("Capuccino", 6.0))
            .await
            .unwrap();

        let err = service
            .crear_producto(&pool, nuevo_producto("  CAPUCCINO  ", 7.0))
            .await
            .unwrap_err();
        match err {
            AppError::ProductoNombreDuplicado { existente_id, .. } => {
                assert_eq!(existente_id, primero.id);
            }
            otro => panic!("esperaba conflicto de nombre, llegó {otro:?}"),
        }

        // A recusa não deixou lixo para trás.
        let todos = service.listar_productos(&pool, None, None, None).await.unwrap();
        assert_eq!(todos.len(), 1);
    }

    #[tokio::test]
    async fn precio_invalido_en_crear_y_actualizar() {
        let pool = pool_de_prueba().await;
        let service = service();

        for precio in [0.0, -1.0] {
            let err = service
                .crear_producto(&pool, nuevo_producto("Té", precio))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::InvalidInput(_)));
        }

        let producto = service
            .crear_producto(&pool, nuevo_producto("Té", 3.0))
            .await
            .unwrap();

        let err = service
            .actualizar_producto(
                &pool,
                producto.id,
                ProductoPatch { precio: Some(-0.5), ..Default::default() },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        // Zero é aceito na atualização (só a criação exige > 0).
        let actualizado = service
            .actualizar_producto(
                &pool,
                producto.id,
                ProductoPatch { precio: Some(0.0), ..Default::default() },
            )
            .await
            .unwrap();
        assert_eq!(actualizado.precio, 0.0);
    }

    #[tokio::test]
    async fn actualizar_nombre_excluye_al_propio_producto() {
        let pool = pool_de_prueba().await;
        let service = service();

        let cafe = service.crear_producto(&pool, nuevo_producto("Café", 4.0)).await.unwrap();
        let te = service.crear_producto(&pool, nuevo_producto("Té", 3.0)).await.unwrap();

        // Renomear para o nome do outro: conflito.
        let err = service
            .actualizar_producto(
                &pool,
                te.id,
                ProductoPatch { nombre: Some("  café ".into()), ..Default::default() },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ProductoNombreDuplicado { .. }));

        // Renomear para o próprio nome (outra caixa): passa.
        let actualizado = service
            .actualizar_producto(
                &pool,
                cafe.id,
                ProductoPatch { nombre: Some("CAFÉ".into()), ..Default::default() },
            )
            .await
            .unwrap();
        assert_eq!(actualizado.nombre, "CAFÉ");
    }

    #[tokio::test]
    async fn eliminar_categoria_estricta_rechaza_con_dependencias() {
        let pool = pool_de_prueba().await;
        let service = service();
        let bebidas = categoria(&pool, "Bebidas").await;

        let sub = service
            .crear_subcategoria(&pool, "Vinos", None, bebidas.id, None, None, None, 0)
            .await
            .unwrap();
        for (nombre, precio) in [("Malbec", 20.0), ("Rioja", 25.0)] {
            let mut nuevo = nuevo_producto(nombre, precio);
            nuevo.categoria_id = Some(bebidas.id);
            nuevo.subcategoria_id = Some(sub.id);
            service.crear_producto(&pool, nuevo).await.unwrap();
        }

        let err = service.eliminar_categoria_estricta(&pool, bebidas.id).await.unwrap_err();
        match err {
            AppError::CategoriaConDependencias { productos, subcategorias, .. } => {
                assert_eq!(productos, 2);
                assert_eq!(subcategorias, 1);
            }
            otro => panic!("esperaba conflicto de dependencias, llegó {otro:?}"),
        }

        // Nada mudou: a categoria, a subcategoria e os produtos seguem lá.
        assert!(service.obtener_categoria(&pool, bebidas.id).await.is_ok());
        assert!(service.obtener_subcategoria(&pool, sub.id).await.is_ok());
        assert_eq!(
            service
                .listar_productos(&pool, Some(bebidas.id), None, None)
                .await
                .unwrap()
                .len(),
            2
        );
    }

    #[tokio::test]
    async fn eliminar_categoria_en_cascada_desvincula_productos() {
        let pool = pool_de_prueba().await;
        let service = service();
        let bebidas = categoria(&pool, "Bebidas").await;
        let sub = service
            .crear_subcategoria(&pool, "Vinos", None, bebidas.id, None, None, None, 0)
            .await
            .unwrap();

        let mut nuevo = nuevo_producto("Malbec", 20.0);
        nuevo.categoria_id = Some(bebidas.id);
        nuevo.subcategoria_id = Some(sub.id);
        let producto = service.crear_producto(&pool, nuevo).await.unwrap();

        let (_, desvinculados, sub_eliminadas) = service
            .eliminar_categoria_en_cascada(&pool, bebidas.id)
            .await
            .unwrap();
        assert_eq!(desvinculados, 1);
        assert_eq!(sub_eliminadas, 1);

        // O produto sobrevive, órfão de categoria e subcategoria.
        let producto = service.obtener_producto(&pool, producto.id).await.unwrap();
        assert_eq!(producto.categoria_id, None);
        assert_eq!(producto.subcategoria_id, None);

        assert!(matches!(
            service.obtener_categoria(&pool, bebidas.id).await,
            Err(AppError::CategoriaNotFound)
        ));
        assert!(matches!(
            service.obtener_subcategoria(&pool, sub.id).await,
            Err(AppError::SubcategoriaNotFound)
        ));
    }

    #[tokio::test]
    async fn eliminar_subcategoria_con_productos_siempre_rechaza() {
        let pool = pool_de_prueba().await;
        let service = service();
        let bebidas = categoria(&pool, "Bebidas").await;
        let sub = service
            .crear_subcategoria(&pool, "Vinos", None, bebidas.id, None, None, None, 0)
            .await
            .unwrap();

        let mut nuevo = nuevo_producto("Malbec", 20.0);
        nuevo.subcategoria_id = Some(sub.id);
        service.crear_producto(&pool, nuevo).await.unwrap();

        let err = service.eliminar_subcategoria(&pool, sub.id).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::SubcategoriaConDependencias { productos: 1, .. }
        ));
    }

    #[tokio::test]
    async fn subcategoria_exige_categoria_padre() {
        let pool = pool_de_prueba().await;
        let err = service()
            .crear_subcategoria(&pool, "Vinos", None, 999, None, None, None, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CategoriaNotFound));
    }

    #[tokio::test]
    async fn eliminar_producto_arrastra_sus_ingredientes() {
        let pool = pool_de_prueba().await;
        let service = service();

        let mut nuevo = nuevo_producto("Ajiaco", 15.0);
        nuevo.tipo_producto = TipoProducto::Preparado;
        let producto = service.crear_producto(&pool, nuevo).await.unwrap();

        for nombre in ["Pollo", "Papa criolla", "Guascas"] {
            service
                .crear_ingrediente(&pool, producto.id, nombre, None, None, None, 1.0, true)
                .await
                .unwrap();
        }
        assert_eq!(service.listar_ingredientes(&pool, producto.id).await.unwrap().len(), 3);

        let (_, ingredientes) = service.eliminar_producto(&pool, producto.id).await.unwrap();
        assert_eq!(ingredientes, 3);

        let huerfanos =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ingredientes WHERE producto_id = ?")
                .bind(producto.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(huerfanos, 0);
    }

    #[tokio::test]
    async fn ingrediente_exige_producto_existente() {
        let pool = pool_de_prueba().await;
        let err = service()
            .crear_ingrediente(&pool, 999, "Sal", None, None, None, 0.0, true)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ProductoNotFound));
    }

    #[tokio::test]
    async fn listar_productos_filtra_y_pagina() {
        let pool = pool_de_prueba().await;
        let service = service();
        let bebidas = categoria(&pool, "Bebidas").await;
        let postres = categoria(&pool, "Postres").await;

        for (nombre, cat) in [("Café", bebidas.id), ("Té", bebidas.id), ("Flan", postres.id)] {
            let mut nuevo = nuevo_producto(nombre, 5.0);
            nuevo.categoria_id = Some(cat);
            service.crear_producto(&pool, nuevo).await.unwrap();
        }

        let todos = service.listar_productos(&pool, None, None, None).await.unwrap();
        assert_eq!(todos.len(), 3);

        let de_bebidas = service
            .listar_productos(&pool, Some(bebidas.id), None, None)
            .await
            .unwrap();
        assert_eq!(de_bebidas.len(), 2);
        assert!(de_bebidas.iter().all(|p| p.categoria_id == Some(bebidas.id)));
        assert_eq!(de_bebidas[0].categoria_nombre.as_deref(), Some("Bebidas"));

        let pagina = service.listar_productos(&pool, None, Some(2), Some(2)).await.unwrap();
        assert_eq!(pagina.len(), 1);
    }

    #[tokio::test]
    async fn menu_completo_solo_muestra_lo_visible() {
        let pool = pool_de_prueba().await;
        let service = service();
        let bebidas = categoria(&pool, "Bebidas").await;

        let mut visible = nuevo_producto("Café", 4.0);
        visible.categoria_id = Some(bebidas.id);
        service.crear_producto(&pool, visible).await.unwrap();

        let mut agotado = nuevo_producto("Jugo de lulo", 5.0);
        agotado.categoria_id = Some(bebidas.id);
        agotado.disponible = false;
        service.crear_producto(&pool, agotado).await.unwrap();

        let menu = service.menu_completo(&pool).await.unwrap();
        assert_eq!(menu.len(), 1);
        assert_eq!(menu[0].productos.len(), 1);
        assert_eq!(menu[0].productos[0].nombre, "Café");
    }

    #[tokio::test]
    async fn recetas_lista_preparados_con_ingredientes() {
        let pool = pool_de_prueba().await;
        let service = service();

        let mut sopa = nuevo_producto("Ajiaco", 15.0);
        sopa.tipo_producto = TipoProducto::Preparado;
        let sopa = service.crear_producto(&pool, sopa).await.unwrap();
        service
            .crear_ingrediente(&pool, sopa.id, "Pollo", None, Some("500".into()), Some("g".into()), 3.0, true)
            .await
            .unwrap();

        // Produto simples fica fora do painel da cozinha.
        service.crear_producto(&pool, nuevo_producto("Gaseosa", 3.0)).await.unwrap();

        let recetas = service.recetas(&pool).await.unwrap();
        assert_eq!(recetas.len(), 1);
        assert_eq!(recetas[0].producto.nombre, "Ajiaco");
        assert_eq!(recetas[0].ingredientes.len(), 1);
        assert_eq!(recetas[0].ingredientes[0].unidad.as_deref(), Some("g"));
    }

    #[tokio::test]
    async fn estadisticas_cuentan_disponibilidad() {
        let pool = pool_de_prueba().await;
        let service = service();
        let bebidas = categoria(&pool, "Bebidas").await;

        let mut cafe = nuevo_producto("Café", 4.0);
        cafe.categoria_id = Some(bebidas.id);
        service.crear_producto(&pool, cafe).await.unwrap();
        let mut agotado = nuevo_producto("Té", 3.0);
        agotado.disponible = false;
        service.crear_producto(&pool, agotado).await.unwrap();

        let stats = service.estadisticas(&pool).await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.disponibles, 1);
        assert_eq!(stats.no_disponibles, 1);
        assert_eq!(stats.por_categoria.len(), 1);
        assert_eq!(stats.por_categoria[0].cantidad, 1);
    }
}
