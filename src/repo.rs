//! Acceso CRUD plano por entidad. Reemplaza la cadena de clases base
//! genéricas del diseño anterior por un trait chico sin despacho virtual:
//! cada implementación escribe su propio SQL parametrizado.

use crate::db::Database;
use crate::error::AppError;
use crate::models::{Cliente, CompraRegistro, Producto};
use rusqlite::{params, OptionalExtension, Row};

pub trait Repositorio {
    type Entidad;
    type Clave: ?Sized;

    fn obtener(&self, clave: &Self::Clave) -> Result<Option<Self::Entidad>, AppError>;
    fn listar(&self) -> Result<Vec<Self::Entidad>, AppError>;
    fn agregar(&self, entidad: &Self::Entidad) -> Result<(), AppError>;
    fn actualizar(&self, entidad: &Self::Entidad) -> Result<bool, AppError>;
    fn eliminar(&self, clave: &Self::Clave) -> Result<bool, AppError>;
    fn existe(&self, clave: &Self::Clave) -> Result<bool, AppError>;
    fn contar(&self) -> Result<i64, AppError>;
}

// --- Clientes ---

pub struct ClienteRepositorio<'a> {
    pub db: &'a Database,
}

fn fila_a_cliente(row: &Row) -> rusqlite::Result<Cliente> {
    Ok(Cliente {
        rut: row.get(0)?,
        nombre: row.get(1)?,
        direccion: row.get(2)?,
        giro: row.get(3)?,
        deuda: row.get(4)?,
    })
}

impl Repositorio for ClienteRepositorio<'_> {
    type Entidad = Cliente;
    type Clave = str;

    fn obtener(&self, rut: &str) -> Result<Option<Cliente>, AppError> {
        let conn = self.db.conn();
        let cliente = conn
            .query_row(
                "SELECT rut, nombre, direccion, giro, deuda FROM clientes WHERE rut = ?1",
                params![rut],
                fila_a_cliente,
            )
            .optional()?;
        Ok(cliente)
    }

    fn listar(&self) -> Result<Vec<Cliente>, AppError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT rut, nombre, direccion, giro, deuda FROM clientes
             ORDER BY nombre COLLATE NOCASE",
        )?;
        let clientes = stmt
            .query_map([], fila_a_cliente)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(clientes)
    }

    fn agregar(&self, cliente: &Cliente) -> Result<(), AppError> {
        let conn = self.db.conn();
        conn.execute(
            "INSERT INTO clientes (rut, nombre, direccion, giro, deuda)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                cliente.rut,
                cliente.nombre,
                cliente.direccion,
                cliente.giro,
                cliente.deuda,
            ],
        )?;
        Ok(())
    }

    fn actualizar(&self, cliente: &Cliente) -> Result<bool, AppError> {
        let conn = self.db.conn();
        let filas = conn.execute(
            "UPDATE clientes SET nombre = ?1, direccion = ?2, giro = ?3, deuda = ?4
             WHERE rut = ?5",
            params![
                cliente.nombre,
                cliente.direccion,
                cliente.giro,
                cliente.deuda,
                cliente.rut,
            ],
        )?;
        Ok(filas > 0)
    }

    fn eliminar(&self, rut: &str) -> Result<bool, AppError> {
        let conn = self.db.conn();
        let filas = conn.execute("DELETE FROM clientes WHERE rut = ?1", params![rut])?;
        Ok(filas > 0)
    }

    fn existe(&self, rut: &str) -> Result<bool, AppError> {
        let conn = self.db.conn();
        let cantidad: i64 = conn.query_row(
            "SELECT COUNT(*) FROM clientes WHERE rut = ?1",
            params![rut],
            |row| row.get(0),
        )?;
        Ok(cantidad > 0)
    }

    fn contar(&self) -> Result<i64, AppError> {
        let conn = self.db.conn();
        let cantidad: i64 =
            conn.query_row("SELECT COUNT(*) FROM clientes", [], |row| row.get(0))?;
        Ok(cantidad)
    }
}

// --- Productos ---

pub struct ProductoRepositorio<'a> {
    pub db: &'a Database,
}

fn fila_a_producto(row: &Row) -> rusqlite::Result<Producto> {
    Ok(Producto {
        codigo: row.get(0)?,
        nombre: row.get(1)?,
        marca: row.get(2)?,
        categoria: row.get(3)?,
        subcategoria: row.get(4)?,
        unidad_medida: row.get(5)?,
        precio: row.get(6)?,
    })
}

impl Repositorio for ProductoRepositorio<'_> {
    type Entidad = Producto;
    type Clave = str;

    fn obtener(&self, codigo: &str) -> Result<Option<Producto>, AppError> {
        let conn = self.db.conn();
        let producto = conn
            .query_row(
                "SELECT codigo, nombre, marca, categoria, subcategoria, unidad_medida, precio
                 FROM productos WHERE codigo = ?1",
                params![codigo],
                fila_a_producto,
            )
            .optional()?;
        Ok(producto)
    }

    fn listar(&self) -> Result<Vec<Producto>, AppError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(
            "SELECT codigo, nombre, marca, categoria, subcategoria, unidad_medida, precio
             FROM productos ORDER BY nombre",
        )?;
        let productos = stmt
            .query_map([], fila_a_producto)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(productos)
    }

    fn agregar(&self, producto: &Producto) -> Result<(), AppError> {
        let conn = self.db.conn();
        conn.execute(
            "INSERT INTO productos (codigo, nombre, marca, categoria, subcategoria, unidad_medida, precio)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                producto.codigo,
                producto.nombre,
                producto.marca,
                producto.categoria,
                producto.subcategoria,
                producto.unidad_medida,
                producto.precio,
            ],
        )?;
        Ok(())
    }

    fn actualizar(&self, producto: &Producto) -> Result<bool, AppError> {
        let conn = self.db.conn();
        let filas = conn.execute(
            "UPDATE productos SET nombre = ?1, marca = ?2, categoria = ?3,
             subcategoria = ?4, unidad_medida = ?5, precio = ?6
             WHERE codigo = ?7",
            params![
                producto.nombre,
                producto.marca,
                producto.categoria,
                producto.subcategoria,
                producto.unidad_medida,
                producto.precio,
                producto.codigo,
            ],
        )?;
        Ok(filas > 0)
    }

    fn eliminar(&self, codigo: &str) -> Result<bool, AppError> {
        let conn = self.db.conn();
        let filas = conn.execute("DELETE FROM productos WHERE codigo = ?1", params![codigo])?;
        Ok(filas > 0)
    }

    fn existe(&self, codigo: &str) -> Result<bool, AppError> {
        let conn = self.db.conn();
        let cantidad: i64 = conn.query_row(
            "SELECT COUNT(*) FROM productos WHERE codigo = ?1",
            params![codigo],
            |row| row.get(0),
        )?;
        Ok(cantidad > 0)
    }

    fn contar(&self) -> Result<i64, AppError> {
        let conn = self.db.conn();
        let cantidad: i64 =
            conn.query_row("SELECT COUNT(*) FROM productos", [], |row| row.get(0))?;
        Ok(cantidad)
    }
}

// --- Registros de compra ---

pub struct CompraRepositorio<'a> {
    pub db: &'a Database,
}

fn fila_a_compra(row: &Row) -> rusqlite::Result<CompraRegistro> {
    Ok(CompraRegistro {
        id: Some(row.get(0)?),
        fecha_compra: row.get(1)?,
        proveedor: row.get(2)?,
        producto: row.get(3)?,
        cantidad: row.get(4)?,
        precio_unitario: row.get(5)?,
        total: row.get(6)?,
        observaciones: row.get(7)?,
        esta_procesado: row.get::<_, i64>(8)? != 0,
    })
}

const COLUMNAS_COMPRA: &str = "id, fecha_compra, proveedor, producto, cantidad, \
     precio_unitario, total, observaciones, esta_procesado";

impl Repositorio for CompraRepositorio<'_> {
    type Entidad = CompraRegistro;
    type Clave = i64;

    fn obtener(&self, id: &i64) -> Result<Option<CompraRegistro>, AppError> {
        let conn = self.db.conn();
        let compra = conn
            .query_row(
                &format!("SELECT {COLUMNAS_COMPRA} FROM compra_registros WHERE id = ?1"),
                params![id],
                fila_a_compra,
            )
            .optional()?;
        Ok(compra)
    }

    fn listar(&self) -> Result<Vec<CompraRegistro>, AppError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNAS_COMPRA} FROM compra_registros ORDER BY fecha_compra DESC"
        ))?;
        let compras = stmt
            .query_map([], fila_a_compra)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(compras)
    }

    fn agregar(&self, compra: &CompraRegistro) -> Result<(), AppError> {
        let conn = self.db.conn();
        conn.execute(
            "INSERT INTO compra_registros
             (fecha_compra, proveedor, producto, cantidad, precio_unitario, total, observaciones, esta_procesado)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                compra.fecha_compra,
                compra.proveedor,
                compra.producto,
                compra.cantidad,
                compra.precio_unitario,
                compra.total,
                compra.observaciones,
                compra.esta_procesado as i64,
            ],
        )?;
        Ok(())
    }

    fn actualizar(&self, compra: &CompraRegistro) -> Result<bool, AppError> {
        let id = compra
            .id
            .ok_or_else(|| AppError::Validacion("Id requerido para actualizar".into()))?;
        let conn = self.db.conn();
        let filas = conn.execute(
            "UPDATE compra_registros
             SET fecha_compra = ?1, proveedor = ?2, producto = ?3, cantidad = ?4,
                 precio_unitario = ?5, total = ?6, observaciones = ?7, esta_procesado = ?8
             WHERE id = ?9",
            params![
                compra.fecha_compra,
                compra.proveedor,
                compra.producto,
                compra.cantidad,
                compra.precio_unitario,
                compra.total,
                compra.observaciones,
                compra.esta_procesado as i64,
                id,
            ],
        )?;
        Ok(filas > 0)
    }

    fn eliminar(&self, id: &i64) -> Result<bool, AppError> {
        let conn = self.db.conn();
        let filas = conn.execute("DELETE FROM compra_registros WHERE id = ?1", params![id])?;
        Ok(filas > 0)
    }

    fn existe(&self, id: &i64) -> Result<bool, AppError> {
        let conn = self.db.conn();
        let cantidad: i64 = conn.query_row(
            "SELECT COUNT(*) FROM compra_registros WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(cantidad > 0)
    }

    fn contar(&self) -> Result<i64, AppError> {
        let conn = self.db.conn();
        let cantidad: i64 =
            conn.query_row("SELECT COUNT(*) FROM compra_registros", [], |row| row.get(0))?;
        Ok(cantidad)
    }
}
