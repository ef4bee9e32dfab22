//! Clientes y cuenta corriente. Todo cambio de deuda pasa por
//! [`registrar_movimiento_deuda`]: actualiza el saldo, deja la entrada
//! en el historial y, si es un pago, registra el abono. Nunca se toca
//! `clientes.deuda` por fuera de ese camino.

use crate::db::Database;
use crate::error::AppError;
use crate::models::{Abono, Cliente, Movimiento, TIPO_ABONO, TIPO_CARGO};
use crate::repo::{ClienteRepositorio, Repositorio};
use crate::utils;
use rusqlite::{params, Connection, OptionalExtension};

pub fn crear_cliente(db: &Database, cliente: &Cliente) -> Result<(), AppError> {
    if !utils::validar_rut(&cliente.rut) {
        return Err(AppError::Validacion(format!(
            "RUT inválido: {}",
            cliente.rut
        )));
    }
    if cliente.nombre.trim().is_empty() {
        return Err(AppError::Validacion("El nombre es obligatorio".into()));
    }
    if cliente.deuda < 0.0 {
        return Err(AppError::Validacion(
            "La deuda inicial no puede ser negativa".into(),
        ));
    }

    let repo = ClienteRepositorio { db };
    if repo.existe(&cliente.rut)? {
        return Err(AppError::ClienteDuplicado {
            rut: cliente.rut.clone(),
        });
    }

    repo.agregar(cliente)?;
    tracing::info!(rut = %cliente.rut, "Cliente creado");
    Ok(())
}

pub fn obtener_cliente(db: &Database, rut: &str) -> Result<Cliente, AppError> {
    let repo = ClienteRepositorio { db };
    repo.obtener(rut)?
        .ok_or_else(|| AppError::ClienteNoEncontrado {
            rut: rut.to_string(),
        })
}

pub fn listar_clientes(db: &Database) -> Result<Vec<Cliente>, AppError> {
    ClienteRepositorio { db }.listar()
}

pub fn buscar_clientes(db: &Database, termino: &str) -> Result<Vec<Cliente>, AppError> {
    let conn = db.conn();
    let patron = format!("%{}%", termino.trim());
    let mut stmt = conn.prepare(
        "SELECT rut, nombre, direccion, giro, deuda FROM clientes
         WHERE rut LIKE ?1 OR nombre LIKE ?1
         ORDER BY nombre COLLATE NOCASE LIMIT 30",
    )?;
    let clientes = stmt
        .query_map(params![patron], |row| {
            Ok(Cliente {
                rut: row.get(0)?,
                nombre: row.get(1)?,
                direccion: row.get(2)?,
                giro: row.get(3)?,
                deuda: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(clientes)
}

/// Actualiza los datos de contacto. La deuda no se toca por acá.
pub fn actualizar_cliente(db: &Database, cliente: &Cliente) -> Result<(), AppError> {
    let conn = db.conn();
    let filas = conn.execute(
        "UPDATE clientes SET nombre = ?1, direccion = ?2, giro = ?3 WHERE rut = ?4",
        params![cliente.nombre, cliente.direccion, cliente.giro, cliente.rut],
    )?;
    if filas == 0 {
        return Err(AppError::ClienteNoEncontrado {
            rut: cliente.rut.clone(),
        });
    }
    Ok(())
}

/// Elimina un cliente. Se rechaza si tiene ventas asociadas; el
/// historial de un cliente con movimiento comercial no se borra.
pub fn eliminar_cliente(db: &Database, rut: &str) -> Result<(), AppError> {
    let repo = ClienteRepositorio { db };
    if !repo.existe(rut)? {
        return Err(AppError::ClienteNoEncontrado {
            rut: rut.to_string(),
        });
    }

    let ventas: i64 = {
        let conn = db.conn();
        conn.query_row(
            "SELECT COUNT(*) FROM ventas WHERE rut = ?1",
            params![rut],
            |row| row.get(0),
        )?
    };
    if ventas > 0 {
        return Err(AppError::ClienteConVentas {
            rut: rut.to_string(),
        });
    }

    repo.eliminar(rut)?;
    tracing::info!(rut = %rut, "Cliente eliminado");
    Ok(())
}

/// Aplica un movimiento de deuda dentro de la transacción que reciba.
/// `monto` positivo carga deuda, negativo abona. Devuelve el saldo
/// resultante.
///
/// Reglas:
/// - el cliente debe existir
/// - un abono no puede superar la deuda vigente (tolerancia de $0,01
///   por redondeo de REAL)
/// - todo movimiento queda en `historial_movimientos` con su magnitud
/// - los abonos quedan además en `abonos`
pub(crate) fn registrar_movimiento_deuda(
    tx: &Connection,
    rut: &str,
    monto: f64,
    descripcion: Option<&str>,
) -> Result<f64, AppError> {
    let deuda_actual: f64 = tx
        .query_row(
            "SELECT deuda FROM clientes WHERE rut = ?1",
            params![rut],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| AppError::ClienteNoEncontrado {
            rut: rut.to_string(),
        })?;

    if monto < 0.0 && monto.abs() > deuda_actual + 0.01 {
        return Err(AppError::Validacion(format!(
            "El abono de ${:.0} supera la deuda actual de ${:.0}",
            monto.abs(),
            deuda_actual
        )));
    }

    let nueva_deuda = (deuda_actual + monto).max(0.0);
    tx.execute(
        "UPDATE clientes SET deuda = ?1 WHERE rut = ?2",
        params![nueva_deuda, rut],
    )?;

    let tipo = if monto < 0.0 { TIPO_ABONO } else { TIPO_CARGO };
    let fecha = utils::fecha_hora_actual();
    tx.execute(
        "INSERT INTO historial_movimientos (rut, tipo, monto, fecha)
         VALUES (?1, ?2, ?3, ?4)",
        params![rut, tipo, monto.abs(), fecha],
    )?;

    if monto < 0.0 {
        let descripcion = descripcion
            .map(str::to_string)
            .unwrap_or_else(|| format!("Abono de ${:.0}", monto.abs()));
        tx.execute(
            "INSERT INTO abonos (rut, fecha, monto, descripcion)
             VALUES (?1, ?2, ?3, ?4)",
            params![rut, fecha, monto.abs(), descripcion],
        )?;
    }

    Ok(nueva_deuda)
}

/// Carga o abona deuda de un cliente en una sola transacción.
/// Devuelve el saldo resultante.
pub fn actualizar_deuda(
    db: &Database,
    rut: &str,
    monto: f64,
    descripcion: Option<&str>,
) -> Result<f64, AppError> {
    let mut guard = db.conn();
    let tx = guard.transaction()?;
    let nueva_deuda = registrar_movimiento_deuda(&tx, rut, monto, descripcion)?;
    tx.commit()?;

    tracing::info!(rut = %rut, monto, nueva_deuda, "Deuda actualizada");
    Ok(nueva_deuda)
}

pub fn listar_abonos(db: &Database, rut: &str) -> Result<Vec<Abono>, AppError> {
    let conn = db.conn();
    let mut stmt = conn.prepare(
        "SELECT id, rut, fecha, monto, descripcion FROM abonos
         WHERE rut = ?1 ORDER BY fecha DESC, id DESC",
    )?;
    let abonos = stmt
        .query_map(params![rut], |row| {
            Ok(Abono {
                id: Some(row.get(0)?),
                rut: row.get(1)?,
                fecha: row.get(2)?,
                monto: row.get(3)?,
                descripcion: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(abonos)
}

pub fn listar_movimientos(db: &Database, rut: &str) -> Result<Vec<Movimiento>, AppError> {
    let conn = db.conn();
    let mut stmt = conn.prepare(
        "SELECT id, rut, tipo, monto, fecha FROM historial_movimientos
         WHERE rut = ?1 ORDER BY fecha DESC, id DESC",
    )?;
    let movimientos = stmt
        .query_map(params![rut], |row| {
            Ok(Movimiento {
                id: Some(row.get(0)?),
                rut: row.get(1)?,
                tipo: row.get(2)?,
                monto: row.get(3)?,
                fecha: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(movimientos)
}

/// Suma de deuda de toda la cartera.
pub fn calcular_deuda_total(db: &Database) -> Result<f64, AppError> {
    let conn = db.conn();
    let total: f64 = conn.query_row(
        "SELECT COALESCE(SUM(deuda), 0) FROM clientes",
        [],
        |row| row.get(0),
    )?;
    Ok(total)
}

/// Clientes con deuda vigente, ordenados de mayor a menor.
pub fn listar_deudores(db: &Database) -> Result<Vec<Cliente>, AppError> {
    let conn = db.conn();
    let mut stmt = conn.prepare(
        "SELECT rut, nombre, direccion, giro, deuda FROM clientes
         WHERE deuda > 0 ORDER BY deuda DESC",
    )?;
    let clientes = stmt
        .query_map([], |row| {
            Ok(Cliente {
                rut: row.get(0)?,
                nombre: row.get(1)?,
                direccion: row.get(2)?,
                giro: row.get(3)?,
                deuda: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(clientes)
}
