//! Configuración clave/valor y contadores correlativos. Los contadores
//! se guardan como texto y se incrementan con CAST en SQL; hay un solo
//! proceso escribiendo, así que no se necesita más coordinación.

use crate::db::Database;
use crate::error::AppError;
use rusqlite::{params, Connection, OptionalExtension};

pub const CLAVE_NUMERO_GUIA: &str = "ultimo_numero_guia";
pub const CLAVE_NUMERO_COMPRA: &str = "ultimo_numero_compra";

pub fn obtener(db: &Database, clave: &str) -> Result<Option<String>, AppError> {
    let conn = db.conn();
    let valor = conn
        .query_row(
            "SELECT valor FROM configuracion WHERE clave = ?1",
            params![clave],
            |row| row.get(0),
        )
        .optional()?;
    Ok(valor)
}

pub fn guardar(db: &Database, clave: &str, valor: &str) -> Result<(), AppError> {
    let conn = db.conn();
    conn.execute(
        "INSERT INTO configuracion (clave, valor) VALUES (?1, ?2)
         ON CONFLICT(clave) DO UPDATE SET valor = excluded.valor",
        params![clave, valor],
    )?;
    Ok(())
}

fn leer_contador(conn: &Connection, clave: &str) -> Result<i64, AppError> {
    let valor: i64 = conn
        .query_row(
            "SELECT CAST(valor AS INTEGER) FROM configuracion WHERE clave = ?1",
            params![clave],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| AppError::Configuracion(format!("Falta la clave {clave}")))?;
    Ok(valor)
}

/// Incrementa un contador en la conexión (o transacción) que reciba.
pub(crate) fn incrementar_contador(conn: &Connection, clave: &str) -> Result<i64, AppError> {
    let filas = conn.execute(
        "UPDATE configuracion SET valor = CAST(CAST(valor AS INTEGER) + 1 AS TEXT)
         WHERE clave = ?1",
        params![clave],
    )?;
    if filas == 0 {
        return Err(AppError::Configuracion(format!("Falta la clave {clave}")));
    }
    leer_contador(conn, clave)
}

pub fn ultimo_numero_guia(db: &Database) -> Result<i64, AppError> {
    leer_contador(&db.conn(), CLAVE_NUMERO_GUIA)
}

pub fn incrementar_numero_guia(db: &Database) -> Result<i64, AppError> {
    incrementar_contador(&db.conn(), CLAVE_NUMERO_GUIA)
}

pub fn ultimo_numero_compra(db: &Database) -> Result<i64, AppError> {
    leer_contador(&db.conn(), CLAVE_NUMERO_COMPRA)
}

pub fn siguiente_numero_compra(db: &Database) -> Result<i64, AppError> {
    Ok(ultimo_numero_compra(db)? + 1)
}

pub fn incrementar_numero_compra(db: &Database) -> Result<i64, AppError> {
    incrementar_contador(&db.conn(), CLAVE_NUMERO_COMPRA)
}
