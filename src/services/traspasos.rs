//! Sucursales y traspasos de stock entre ellas. El traspaso deja una
//! fila de auditoría y mueve las existencias de origen a destino en la
//! misma transacción.

use crate::db::Database;
use crate::error::AppError;
use crate::models::{Sucursal, Traspaso};
use crate::utils;
use rusqlite::{params, OptionalExtension};

pub fn crear_sucursal(db: &Database, sucursal: &Sucursal) -> Result<i64, AppError> {
    if sucursal.nombre.trim().is_empty() {
        return Err(AppError::Validacion("El nombre es obligatorio".into()));
    }
    let conn = db.conn();
    conn.execute(
        "INSERT INTO sucursales (nombre, direccion, telefono, email, encargado)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            sucursal.nombre,
            sucursal.direccion,
            sucursal.telefono,
            sucursal.email,
            sucursal.encargado,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn listar_sucursales(db: &Database) -> Result<Vec<Sucursal>, AppError> {
    let conn = db.conn();
    let mut stmt = conn.prepare(
        "SELECT id, nombre, direccion, telefono, email, encargado
         FROM sucursales ORDER BY nombre",
    )?;
    let sucursales = stmt
        .query_map([], |row| {
            Ok(Sucursal {
                id: Some(row.get(0)?),
                nombre: row.get(1)?,
                direccion: row.get(2)?,
                telefono: row.get(3)?,
                email: row.get(4)?,
                encargado: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(sucursales)
}

/// Carga stock directamente en una sucursal (recepción inicial).
pub fn cargar_stock_sucursal(
    db: &Database,
    sucursal_id: i64,
    codigo: &str,
    unidades: i64,
    kilos: f64,
) -> Result<(), AppError> {
    let conn = db.conn();
    conn.execute(
        "INSERT INTO inventario_sucursal (sucursal_id, codigo, unidades, kilos)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(sucursal_id, codigo) DO UPDATE SET
             unidades = unidades + excluded.unidades,
             kilos = kilos + excluded.kilos",
        params![sucursal_id, codigo, unidades, kilos],
    )?;
    Ok(())
}

/// Mueve stock de una sucursal a otra. Si el origen no tiene lo pedido
/// no cambia nada: ni auditoría, ni origen, ni destino.
pub fn realizar_traspaso(
    db: &Database,
    origen_id: i64,
    destino_id: i64,
    codigo: &str,
    unidades: i64,
    kilos: f64,
) -> Result<i64, AppError> {
    if origen_id == destino_id {
        return Err(AppError::Validacion(
            "Origen y destino deben ser distintos".into(),
        ));
    }
    if unidades <= 0 && kilos <= 0.0 {
        return Err(AppError::Validacion(
            "El traspaso debe mover alguna cantidad".into(),
        ));
    }

    let mut guard = db.conn();
    let tx = guard.transaction()?;

    let origen: Option<(i64, f64)> = tx
        .query_row(
            "SELECT unidades, kilos FROM inventario_sucursal
             WHERE sucursal_id = ?1 AND codigo = ?2",
            params![origen_id, codigo],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let (disp_unidades, disp_kilos) = origen.ok_or_else(|| AppError::StockInsuficiente {
        codigo: codigo.to_string(),
    })?;
    if disp_unidades < unidades || disp_kilos < kilos {
        return Err(AppError::StockInsuficiente {
            codigo: codigo.to_string(),
        });
    }

    tx.execute(
        "INSERT INTO traspasos
         (sucursal_origen_id, sucursal_destino_id, codigo, unidades, kilos, fecha_traspaso, estado)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'COMPLETADO')",
        params![
            origen_id,
            destino_id,
            codigo,
            unidades,
            kilos,
            utils::fecha_hora_actual(),
        ],
    )?;
    let traspaso_id = tx.last_insert_rowid();

    tx.execute(
        "UPDATE inventario_sucursal SET unidades = unidades - ?1, kilos = kilos - ?2
         WHERE sucursal_id = ?3 AND codigo = ?4",
        params![unidades, kilos, origen_id, codigo],
    )?;

    tx.execute(
        "INSERT INTO inventario_sucursal (sucursal_id, codigo, unidades, kilos)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(sucursal_id, codigo) DO UPDATE SET
             unidades = unidades + excluded.unidades,
             kilos = kilos + excluded.kilos",
        params![destino_id, codigo, unidades, kilos],
    )?;

    tx.commit()?;
    tracing::info!(
        traspaso_id,
        origen_id,
        destino_id,
        codigo = %codigo,
        unidades,
        kilos,
        "Traspaso completado"
    );
    Ok(traspaso_id)
}

pub fn listar_traspasos(db: &Database) -> Result<Vec<Traspaso>, AppError> {
    let conn = db.conn();
    let mut stmt = conn.prepare(
        "SELECT id, sucursal_origen_id, sucursal_destino_id, codigo, unidades, kilos,
                fecha_traspaso, estado
         FROM traspasos ORDER BY fecha_traspaso DESC, id DESC",
    )?;
    let traspasos = stmt
        .query_map([], |row| {
            Ok(Traspaso {
                id: Some(row.get(0)?),
                sucursal_origen_id: row.get(1)?,
                sucursal_destino_id: row.get(2)?,
                codigo: row.get(3)?,
                unidades: row.get(4)?,
                kilos: row.get(5)?,
                fecha_traspaso: row.get(6)?,
                estado: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(traspasos)
}

/// Stock de un código en una sucursal. Sin fila es (0, 0).
pub fn obtener_stock_sucursal(
    db: &Database,
    sucursal_id: i64,
    codigo: &str,
) -> Result<(i64, f64), AppError> {
    let conn = db.conn();
    let fila = conn
        .query_row(
            "SELECT unidades, kilos FROM inventario_sucursal
             WHERE sucursal_id = ?1 AND codigo = ?2",
            params![sucursal_id, codigo],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    Ok(fila.unwrap_or((0, 0.0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sucursal(nombre: &str) -> Sucursal {
        Sucursal {
            id: None,
            nombre: nombre.to_string(),
            direccion: "Dirección".to_string(),
            telefono: None,
            email: None,
            encargado: None,
        }
    }

    fn preparar(db: &Database) -> (i64, i64) {
        let conn = db.conn();
        conn.execute("INSERT INTO productos (codigo, nombre) VALUES ('P1', 'Pollo')", [])
            .unwrap();
        drop(conn);

        let origen = crear_sucursal(db, &sucursal("Casa matriz")).unwrap();
        let destino = crear_sucursal(db, &sucursal("Sucursal sur")).unwrap();
        cargar_stock_sucursal(db, origen, "P1", 50, 200.0).unwrap();
        (origen, destino)
    }

    #[test]
    fn traspaso_mueve_stock_y_deja_auditoria() {
        let db = Database::en_memoria().unwrap();
        let (origen, destino) = preparar(&db);

        realizar_traspaso(&db, origen, destino, "P1", 20, 80.0).unwrap();

        assert_eq!(obtener_stock_sucursal(&db, origen, "P1").unwrap(), (30, 120.0));
        assert_eq!(obtener_stock_sucursal(&db, destino, "P1").unwrap(), (20, 80.0));

        let traspasos = listar_traspasos(&db).unwrap();
        assert_eq!(traspasos.len(), 1);
        assert_eq!(traspasos[0].estado.as_deref(), Some("COMPLETADO"));
        assert_eq!(traspasos[0].unidades, 20);
    }

    #[test]
    fn traspaso_sin_stock_no_cambia_nada() {
        let db = Database::en_memoria().unwrap();
        let (origen, destino) = preparar(&db);

        let resultado = realizar_traspaso(&db, origen, destino, "P1", 500, 80.0);
        assert!(matches!(
            resultado,
            Err(AppError::StockInsuficiente { .. })
        ));

        assert_eq!(obtener_stock_sucursal(&db, origen, "P1").unwrap(), (50, 200.0));
        assert_eq!(obtener_stock_sucursal(&db, destino, "P1").unwrap(), (0, 0.0));
        assert!(listar_traspasos(&db).unwrap().is_empty());
    }

    #[test]
    fn traspaso_a_la_misma_sucursal_se_rechaza() {
        let db = Database::en_memoria().unwrap();
        let (origen, _) = preparar(&db);
        assert!(matches!(
            realizar_traspaso(&db, origen, origen, "P1", 1, 1.0),
            Err(AppError::Validacion(_))
        ));
    }

    #[test]
    fn traspaso_acumula_en_destino_con_stock_previo() {
        let db = Database::en_memoria().unwrap();
        let (origen, destino) = preparar(&db);
        cargar_stock_sucursal(&db, destino, "P1", 5, 10.0).unwrap();

        realizar_traspaso(&db, origen, destino, "P1", 10, 40.0).unwrap();
        assert_eq!(obtener_stock_sucursal(&db, destino, "P1").unwrap(), (15, 50.0));
    }
}
