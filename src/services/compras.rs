//! Registros de compra a proveedores. Una compra nace sin procesar;
//! procesarla la vuelca al inventario, la marca y avanza el correlativo
//! de compras, todo en una transacción.

use crate::db::Database;
use crate::error::AppError;
use crate::models::{CompraRegistro, Proveedor};
use crate::repo::{CompraRepositorio, Repositorio};
use crate::services::{configuracion, inventario};
use rusqlite::{params, OptionalExtension};

pub fn crear_compra(db: &Database, compra: &CompraRegistro) -> Result<(), AppError> {
    if compra.cantidad <= 0.0 || compra.precio_unitario < 0.0 {
        return Err(AppError::Validacion(
            "Cantidad y precio deben ser positivos".into(),
        ));
    }
    CompraRepositorio { db }.agregar(compra)?;
    tracing::info!(proveedor = %compra.proveedor, producto = %compra.producto, "Compra registrada");
    Ok(())
}

pub fn obtener_compra(db: &Database, id: i64) -> Result<Option<CompraRegistro>, AppError> {
    CompraRepositorio { db }.obtener(&id)
}

pub fn listar_compras(db: &Database) -> Result<Vec<CompraRegistro>, AppError> {
    CompraRepositorio { db }.listar()
}

pub fn listar_no_procesadas(db: &Database) -> Result<Vec<CompraRegistro>, AppError> {
    Ok(listar_compras(db)?
        .into_iter()
        .filter(|c| !c.esta_procesado)
        .collect())
}

pub fn actualizar_compra(db: &Database, compra: &CompraRegistro) -> Result<(), AppError> {
    let actualizada = CompraRepositorio { db }.actualizar(compra)?;
    if !actualizada {
        return Err(AppError::Validacion("La compra no existe".into()));
    }
    Ok(())
}

pub fn eliminar_compra(db: &Database, id: i64) -> Result<(), AppError> {
    let eliminada = CompraRepositorio { db }.eliminar(&id)?;
    if !eliminada {
        return Err(AppError::Validacion("La compra no existe".into()));
    }
    Ok(())
}

/// Procesa una compra pendiente: suma la cantidad al inventario del
/// código comprado, la marca como procesada y avanza el correlativo.
pub fn procesar_compra(db: &Database, id: i64) -> Result<(), AppError> {
    let mut guard = db.conn();
    let tx = guard.transaction()?;

    let compra: Option<(String, f64, String, i64)> = tx
        .query_row(
            "SELECT producto, cantidad, fecha_compra, esta_procesado
             FROM compra_registros WHERE id = ?1",
            params![id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .optional()?;

    let (codigo, cantidad, fecha_compra, procesado) =
        compra.ok_or_else(|| AppError::Validacion(format!("No existe la compra {id}")))?;
    if procesado != 0 {
        return Err(AppError::Validacion(format!(
            "La compra {id} ya fue procesada"
        )));
    }

    inventario::agregar_stock_en(&tx, &codigo, cantidad as i64, 0.0, &fecha_compra, None)?;
    tx.execute(
        "UPDATE compra_registros SET esta_procesado = 1 WHERE id = ?1",
        params![id],
    )?;
    configuracion::incrementar_contador(&tx, configuracion::CLAVE_NUMERO_COMPRA)?;
    tx.commit()?;

    tracing::info!(id, codigo = %codigo, cantidad, "Compra procesada");
    Ok(())
}

pub fn crear_proveedor(db: &Database, nombre: &str, vendedor: &str) -> Result<(), AppError> {
    if nombre.trim().is_empty() {
        return Err(AppError::Validacion("El nombre es obligatorio".into()));
    }
    let conn = db.conn();
    conn.execute(
        "INSERT INTO proveedores (nombre, vendedor) VALUES (?1, ?2)",
        params![nombre.trim(), vendedor.trim()],
    )?;
    Ok(())
}

pub fn listar_proveedores(db: &Database) -> Result<Vec<Proveedor>, AppError> {
    let conn = db.conn();
    let mut stmt =
        conn.prepare("SELECT id, nombre, vendedor FROM proveedores ORDER BY nombre")?;
    let proveedores = stmt
        .query_map([], |row| {
            Ok(Proveedor {
                id: Some(row.get(0)?),
                nombre: row.get(1)?,
                vendedor: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(proveedores)
}

/// Vendedores de un proveedor dado (un proveedor puede aparecer con
/// varios vendedores de contacto).
pub fn listar_vendedores(db: &Database, proveedor: &str) -> Result<Vec<String>, AppError> {
    let conn = db.conn();
    let mut stmt = conn.prepare(
        "SELECT DISTINCT vendedor FROM proveedores WHERE nombre = ?1 ORDER BY vendedor",
    )?;
    let vendedores = stmt
        .query_map(params![proveedor], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(vendedores)
}
