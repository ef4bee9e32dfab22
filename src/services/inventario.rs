//! Inventario central: una fila por código, con unidades y kilos. Las
//! entradas suman por upsert; las salidas verifican existencia antes de
//! descontar para que nunca quede stock negativo.

use crate::db::Database;
use crate::error::AppError;
use crate::models::{Inventario, Producto, ProductoConStock};
use rusqlite::{params, Connection, OptionalExtension};

/// Suma stock de un código. Si la fila existe se incrementan unidades y
/// kilos y se refresca la fecha más nueva; si no, se crea con ambas
/// fechas iguales a la de la compra.
pub fn agregar_stock(
    db: &Database,
    codigo: &str,
    unidades: i64,
    kilos: f64,
    fecha_compra: &str,
    fecha_vencimiento: Option<&str>,
) -> Result<(), AppError> {
    if unidades < 0 || kilos < 0.0 {
        return Err(AppError::Validacion(format!(
            "Cantidades negativas para el producto {codigo}"
        )));
    }

    let conn = db.conn();
    agregar_stock_en(&conn, codigo, unidades, kilos, fecha_compra, fecha_vencimiento)
}

pub(crate) fn agregar_stock_en(
    conn: &Connection,
    codigo: &str,
    unidades: i64,
    kilos: f64,
    fecha_compra: &str,
    fecha_vencimiento: Option<&str>,
) -> Result<(), AppError> {
    let nombre: Option<String> = conn
        .query_row(
            "SELECT nombre FROM productos WHERE codigo = ?1",
            params![codigo],
            |row| row.get(0),
        )
        .optional()?;

    conn.execute(
        "INSERT INTO inventario
         (codigo, producto, unidades, kilos, fecha_mas_antigua, fecha_mas_nueva, fecha_vencimiento)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5, ?6)
         ON CONFLICT(codigo) DO UPDATE SET
             unidades = unidades + excluded.unidades,
             kilos = kilos + excluded.kilos,
             fecha_mas_nueva = excluded.fecha_mas_nueva,
             fecha_vencimiento = COALESCE(excluded.fecha_vencimiento, fecha_vencimiento)",
        params![codigo, nombre, unidades, kilos, fecha_compra, fecha_vencimiento],
    )?;
    Ok(())
}

/// Descuenta stock verificando primero que alcance.
pub fn descontar(db: &Database, codigo: &str, unidades: i64, kilos: f64) -> Result<(), AppError> {
    let conn = db.conn();

    let fila: Option<(i64, f64)> = conn
        .query_row(
            "SELECT unidades, kilos FROM inventario WHERE codigo = ?1",
            params![codigo],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let (disp_unidades, disp_kilos) = fila.ok_or_else(|| AppError::StockInsuficiente {
        codigo: codigo.to_string(),
    })?;
    if disp_unidades < unidades || disp_kilos < kilos {
        return Err(AppError::StockInsuficiente {
            codigo: codigo.to_string(),
        });
    }

    conn.execute(
        "UPDATE inventario SET unidades = unidades - ?1, kilos = kilos - ?2
         WHERE codigo = ?3",
        params![unidades, kilos, codigo],
    )?;
    Ok(())
}

/// Ensancha el rango de fechas conocido para un código: la fecha más
/// antigua solo retrocede y la más nueva solo avanza.
pub fn actualizar_fechas(db: &Database, codigo: &str, fecha: &str) -> Result<(), AppError> {
    let conn = db.conn();
    conn.execute(
        "UPDATE inventario SET
             fecha_mas_antigua = CASE
                 WHEN fecha_mas_antigua IS NULL OR ?1 < fecha_mas_antigua THEN ?1
                 ELSE fecha_mas_antigua END,
             fecha_mas_nueva = CASE
                 WHEN fecha_mas_nueva IS NULL OR ?1 > fecha_mas_nueva THEN ?1
                 ELSE fecha_mas_nueva END
         WHERE codigo = ?2",
        params![fecha, codigo],
    )?;
    Ok(())
}

fn fila_a_inventario(row: &rusqlite::Row) -> rusqlite::Result<Inventario> {
    Ok(Inventario {
        id: Some(row.get(0)?),
        codigo: row.get(1)?,
        producto: row.get(2)?,
        unidades: row.get(3)?,
        kilos: row.get(4)?,
        fecha_mas_antigua: row.get(5)?,
        fecha_mas_nueva: row.get(6)?,
        fecha_vencimiento: row.get(7)?,
    })
}

pub fn obtener_por_codigo(db: &Database, codigo: &str) -> Result<Option<Inventario>, AppError> {
    let conn = db.conn();
    let inventario = conn
        .query_row(
            "SELECT id, codigo, producto, unidades, kilos,
                    fecha_mas_antigua, fecha_mas_nueva, fecha_vencimiento
             FROM inventario WHERE codigo = ?1",
            params![codigo],
            fila_a_inventario,
        )
        .optional()?;
    Ok(inventario)
}

pub fn listar(db: &Database) -> Result<Vec<Inventario>, AppError> {
    let conn = db.conn();
    let mut stmt = conn.prepare(
        "SELECT id, codigo, producto, unidades, kilos,
                fecha_mas_antigua, fecha_mas_nueva, fecha_vencimiento
         FROM inventario ORDER BY codigo",
    )?;
    let filas = stmt
        .query_map([], fila_a_inventario)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(filas)
}

/// Inventario unido al catálogo, para las vistas de stock.
pub fn listar_con_producto(db: &Database) -> Result<Vec<ProductoConStock>, AppError> {
    let conn = db.conn();
    let mut stmt = conn.prepare(
        "SELECT p.codigo, p.nombre, p.marca, p.categoria, p.subcategoria,
                p.unidad_medida, p.precio,
                COALESCE(i.unidades, 0), COALESCE(i.kilos, 0),
                i.fecha_mas_antigua, i.fecha_mas_nueva
         FROM productos p
         LEFT JOIN inventario i ON i.codigo = p.codigo
         ORDER BY p.nombre",
    )?;
    let filas = stmt
        .query_map([], |row| {
            Ok(ProductoConStock {
                producto: Producto {
                    codigo: row.get(0)?,
                    nombre: row.get(1)?,
                    marca: row.get(2)?,
                    categoria: row.get(3)?,
                    subcategoria: row.get(4)?,
                    unidad_medida: row.get(5)?,
                    precio: row.get(6)?,
                },
                unidades: row.get(7)?,
                kilos: row.get(8)?,
                fecha_mas_antigua: row.get(9)?,
                fecha_mas_nueva: row.get(10)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(filas)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn con_producto(db: &Database, codigo: &str, nombre: &str) {
        let conn = db.conn();
        conn.execute(
            "INSERT INTO productos (codigo, nombre) VALUES (?1, ?2)",
            params![codigo, nombre],
        )
        .unwrap();
    }

    #[test]
    fn agregar_crea_y_despues_acumula() {
        let db = Database::en_memoria().unwrap();
        con_producto(&db, "P1", "Pollo entero");

        agregar_stock(&db, "P1", 10, 100.0, "2025-01-01", None).unwrap();
        agregar_stock(&db, "P1", 5, 40.0, "2025-01-15", None).unwrap();

        let fila = obtener_por_codigo(&db, "P1").unwrap().unwrap();
        assert_eq!(fila.unidades, 15);
        assert_eq!(fila.kilos, 140.0);
        assert_eq!(fila.producto.as_deref(), Some("Pollo entero"));
        // La fecha antigua queda; la nueva se refresca
        assert_eq!(fila.fecha_mas_antigua.as_deref(), Some("2025-01-01"));
        assert_eq!(fila.fecha_mas_nueva.as_deref(), Some("2025-01-15"));
    }

    #[test]
    fn descontar_exige_stock_suficiente() {
        let db = Database::en_memoria().unwrap();
        con_producto(&db, "P1", "Pollo entero");
        agregar_stock(&db, "P1", 10, 100.0, "2025-01-01", None).unwrap();

        descontar(&db, "P1", 4, 30.0).unwrap();
        let fila = obtener_por_codigo(&db, "P1").unwrap().unwrap();
        assert_eq!(fila.unidades, 6);
        assert_eq!(fila.kilos, 70.0);

        // Más de lo disponible
        assert!(matches!(
            descontar(&db, "P1", 100, 1.0),
            Err(AppError::StockInsuficiente { .. })
        ));
        // Código sin fila
        assert!(matches!(
            descontar(&db, "P9", 1, 1.0),
            Err(AppError::StockInsuficiente { .. })
        ));
    }

    #[test]
    fn actualizar_fechas_solo_ensancha() {
        let db = Database::en_memoria().unwrap();
        con_producto(&db, "P1", "Pollo entero");
        agregar_stock(&db, "P1", 1, 1.0, "2025-03-10", None).unwrap();

        // Una fecha intermedia no mueve nada
        actualizar_fechas(&db, "P1", "2025-03-10").unwrap();
        // Más antigua retrocede la antigua
        actualizar_fechas(&db, "P1", "2025-01-05").unwrap();
        // Más nueva avanza la nueva
        actualizar_fechas(&db, "P1", "2025-06-20").unwrap();

        let fila = obtener_por_codigo(&db, "P1").unwrap().unwrap();
        assert_eq!(fila.fecha_mas_antigua.as_deref(), Some("2025-01-05"));
        assert_eq!(fila.fecha_mas_nueva.as_deref(), Some("2025-06-20"));
    }

    #[test]
    fn listar_con_producto_incluye_sin_stock() {
        let db = Database::en_memoria().unwrap();
        con_producto(&db, "P1", "Pollo entero");
        con_producto(&db, "P2", "Trutro");
        agregar_stock(&db, "P1", 10, 100.0, "2025-01-01", None).unwrap();

        let filas = listar_con_producto(&db).unwrap();
        assert_eq!(filas.len(), 2);
        let sin_stock = filas
            .iter()
            .find(|f| f.producto.codigo == "P2")
            .unwrap();
        assert_eq!(sin_stock.unidades, 0);
        assert_eq!(sin_stock.kilos, 0.0);
    }
}
