//! Ventas por guía. Una guía agrupa varias líneas que se insertan,
//! descuentan inventario y (si es a crédito) cargan deuda en una sola
//! transacción: o entra todo o no entra nada.

use crate::db::Database;
use crate::error::AppError;
use crate::models::{NuevaVenta, ResumenGuia, Venta};
use crate::services::{clientes, configuracion};
use rusqlite::{params, OptionalExtension};

/// Número de guía que corresponde a la próxima venta. El contador se
/// incrementa recién al finalizar; una venta que falla no lo consume.
pub fn siguiente_numero_guia(db: &Database) -> Result<i64, AppError> {
    Ok(configuracion::ultimo_numero_guia(db)? + 1)
}

/// Finaliza una venta: inserta sus líneas, descuenta el inventario,
/// carga la deuda si fue a crédito e incrementa el contador de guías.
/// Devuelve el total de la guía.
pub fn finalizar_venta(db: &Database, venta: &NuevaVenta) -> Result<f64, AppError> {
    if venta.lineas.is_empty() {
        return Err(AppError::Validacion(
            "La venta no tiene líneas".into(),
        ));
    }
    for linea in &venta.lineas {
        if linea.kilos_neto <= 0.0 {
            return Err(AppError::Validacion(format!(
                "Kilos inválidos para el producto {}",
                linea.codigo_producto
            )));
        }
        if linea.total < 0.0 {
            return Err(AppError::Validacion(format!(
                "Total negativo para el producto {}",
                linea.codigo_producto
            )));
        }
    }

    let mut guard = db.conn();
    let tx = guard.transaction()?;

    let existe_cliente: i64 = tx.query_row(
        "SELECT COUNT(*) FROM clientes WHERE rut = ?1",
        params![venta.rut],
        |row| row.get(0),
    )?;
    if existe_cliente == 0 {
        return Err(AppError::ClienteNoEncontrado {
            rut: venta.rut.clone(),
        });
    }

    let mut total_guia = 0.0;
    for linea in &venta.lineas {
        let disponible: f64 = tx
            .query_row(
                "SELECT kilos FROM inventario WHERE codigo = ?1",
                params![linea.codigo_producto],
                |row| row.get(0),
            )
            .optional()?
            .unwrap_or(0.0);
        if disponible < linea.kilos_neto {
            return Err(AppError::StockInsuficiente {
                codigo: linea.codigo_producto.clone(),
            });
        }

        tx.execute(
            "INSERT INTO ventas
             (numero_guia, codigo_producto, descripcion, bandejas, kilos_neto,
              fecha_venta, total, pagado_con_credito, rut)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                venta.numero_guia,
                linea.codigo_producto,
                linea.descripcion,
                linea.bandejas,
                linea.kilos_neto,
                venta.fecha_venta,
                linea.total,
                venta.pagado_con_credito as i64,
                venta.rut,
            ],
        )?;

        tx.execute(
            "UPDATE inventario SET kilos = kilos - ?1 WHERE codigo = ?2",
            params![linea.kilos_neto, linea.codigo_producto],
        )?;

        total_guia += linea.total;
    }

    if venta.pagado_con_credito {
        clientes::registrar_movimiento_deuda(&tx, &venta.rut, total_guia, None)?;
    }

    configuracion::incrementar_contador(&tx, configuracion::CLAVE_NUMERO_GUIA)?;
    tx.commit()?;

    tracing::info!(
        numero_guia = venta.numero_guia,
        rut = %venta.rut,
        total = total_guia,
        credito = venta.pagado_con_credito,
        "Venta finalizada"
    );
    Ok(total_guia)
}

fn fila_a_venta(row: &rusqlite::Row) -> rusqlite::Result<Venta> {
    Ok(Venta {
        numero_guia: row.get(0)?,
        codigo_producto: row.get(1)?,
        descripcion: row.get(2)?,
        bandejas: row.get(3)?,
        kilos_neto: row.get(4)?,
        fecha_venta: row.get(5)?,
        total: row.get(6)?,
        pagado_con_credito: row.get::<_, i64>(7)? != 0,
        rut: row.get(8)?,
    })
}

pub fn listar_ventas_por_cliente(db: &Database, rut: &str) -> Result<Vec<Venta>, AppError> {
    let conn = db.conn();
    let mut stmt = conn.prepare(
        "SELECT numero_guia, codigo_producto, descripcion, bandejas, kilos_neto,
                fecha_venta, total, pagado_con_credito, rut
         FROM ventas WHERE rut = ?1
         ORDER BY numero_guia DESC, codigo_producto",
    )?;
    let ventas = stmt
        .query_map(params![rut], fila_a_venta)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ventas)
}

pub fn listar_lineas_guia(db: &Database, numero_guia: i64) -> Result<Vec<Venta>, AppError> {
    let conn = db.conn();
    let mut stmt = conn.prepare(
        "SELECT numero_guia, codigo_producto, descripcion, bandejas, kilos_neto,
                fecha_venta, total, pagado_con_credito, rut
         FROM ventas WHERE numero_guia = ?1 ORDER BY codigo_producto",
    )?;
    let ventas = stmt
        .query_map(params![numero_guia], fila_a_venta)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ventas)
}

/// Guías agrupadas: una fila por numero_guia con total y cantidad de líneas.
pub fn listar_guias(db: &Database) -> Result<Vec<ResumenGuia>, AppError> {
    let conn = db.conn();
    let mut stmt = conn.prepare(
        "SELECT v.numero_guia, v.rut, c.nombre, MIN(v.fecha_venta),
                SUM(v.total), COUNT(*), MAX(v.pagado_con_credito)
         FROM ventas v
         LEFT JOIN clientes c ON c.rut = v.rut
         GROUP BY v.numero_guia, v.rut
         ORDER BY v.numero_guia DESC",
    )?;
    let guias = stmt
        .query_map([], |row| {
            Ok(ResumenGuia {
                numero_guia: row.get(0)?,
                rut: row.get(1)?,
                cliente_nombre: row.get(2)?,
                fecha_venta: row.get(3)?,
                total: row.get(4)?,
                lineas: row.get(5)?,
                pagado_con_credito: row.get::<_, i64>(6)? != 0,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(guias)
}

/// Paga una guía vendida a crédito: limpia la marca de crédito en sus
/// líneas y abona el total a la deuda del cliente, todo junto.
pub fn pagar_guia(db: &Database, numero_guia: i64) -> Result<f64, AppError> {
    let mut guard = db.conn();
    let tx = guard.transaction()?;

    let pendiente: Option<(String, f64)> = tx
        .query_row(
            "SELECT rut, SUM(total) FROM ventas
             WHERE numero_guia = ?1 AND pagado_con_credito = 1 AND rut IS NOT NULL
             GROUP BY rut",
            params![numero_guia],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let (rut, total) = pendiente.ok_or_else(|| {
        AppError::Validacion(format!(
            "La guía {numero_guia} no tiene crédito pendiente"
        ))
    })?;

    tx.execute(
        "UPDATE ventas SET pagado_con_credito = 0 WHERE numero_guia = ?1",
        params![numero_guia],
    )?;

    let descripcion = format!("Pago guía N° {numero_guia}");
    clientes::registrar_movimiento_deuda(&tx, &rut, -total, Some(&descripcion))?;
    tx.commit()?;

    tracing::info!(numero_guia, rut = %rut, total, "Guía pagada");
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cliente, LineaVenta};
    use crate::services::inventario;

    fn preparar(db: &Database) {
        clientes::crear_cliente(
            db,
            &Cliente {
                rut: "12.345.678-5".to_string(),
                nombre: "Distribuidora Sur".to_string(),
                direccion: "Camino Rural 5".to_string(),
                giro: "Distribución".to_string(),
                deuda: 0.0,
            },
        )
        .unwrap();

        let conn = db.conn();
        conn.execute_batch(
            "INSERT INTO productos (codigo, nombre, precio) VALUES ('P1', 'Pollo entero', 2500);
             INSERT INTO productos (codigo, nombre, precio) VALUES ('P2', 'Trutro', 3200);",
        )
        .unwrap();
        drop(conn);

        inventario::agregar_stock(db, "P1", 10, 100.0, "2025-01-01", None).unwrap();
        inventario::agregar_stock(db, "P2", 5, 50.0, "2025-01-01", None).unwrap();
    }

    fn venta_de_prueba(numero_guia: i64, credito: bool) -> NuevaVenta {
        NuevaVenta {
            numero_guia,
            rut: "12.345.678-5".to_string(),
            fecha_venta: "2025-01-02 10:00:00".to_string(),
            pagado_con_credito: credito,
            lineas: vec![
                LineaVenta {
                    codigo_producto: "P1".to_string(),
                    descripcion: Some("Pollo entero".to_string()),
                    bandejas: 2,
                    kilos_neto: 30.0,
                    total: 75_000.0,
                },
                LineaVenta {
                    codigo_producto: "P2".to_string(),
                    descripcion: Some("Trutro".to_string()),
                    bandejas: 1,
                    kilos_neto: 20.0,
                    total: 64_000.0,
                },
            ],
        }
    }

    fn kilos_de(db: &Database, codigo: &str) -> f64 {
        let conn = db.conn();
        conn.query_row(
            "SELECT kilos FROM inventario WHERE codigo = ?1",
            params![codigo],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn venta_contado_descuenta_stock_sin_tocar_deuda() {
        let db = Database::en_memoria().unwrap();
        preparar(&db);

        let numero = siguiente_numero_guia(&db).unwrap();
        assert_eq!(numero, 1);

        let total = finalizar_venta(&db, &venta_de_prueba(numero, false)).unwrap();
        assert_eq!(total, 139_000.0);
        assert_eq!(kilos_de(&db, "P1"), 70.0);
        assert_eq!(kilos_de(&db, "P2"), 30.0);

        let cliente = clientes::obtener_cliente(&db, "12.345.678-5").unwrap();
        assert_eq!(cliente.deuda, 0.0);

        // El contador avanzó
        assert_eq!(siguiente_numero_guia(&db).unwrap(), 2);

        // Una fila por línea, todas bajo la misma guía
        let lineas = listar_lineas_guia(&db, numero).unwrap();
        assert_eq!(lineas.len(), 2);
        assert!(lineas.iter().all(|v| v.numero_guia == numero));
    }

    #[test]
    fn venta_credito_carga_deuda_por_el_historial() {
        let db = Database::en_memoria().unwrap();
        preparar(&db);

        finalizar_venta(&db, &venta_de_prueba(1, true)).unwrap();

        let cliente = clientes::obtener_cliente(&db, "12.345.678-5").unwrap();
        assert_eq!(cliente.deuda, 139_000.0);

        // El cargo quedó en el historial, no solo en el saldo
        let movimientos = clientes::listar_movimientos(&db, "12.345.678-5").unwrap();
        assert_eq!(movimientos.len(), 1);
        assert_eq!(movimientos[0].tipo, crate::models::TIPO_CARGO);
        assert_eq!(movimientos[0].monto, 139_000.0);
    }

    #[test]
    fn stock_insuficiente_anula_la_venta_completa() {
        let db = Database::en_memoria().unwrap();
        preparar(&db);

        let mut venta = venta_de_prueba(1, true);
        venta.lineas[1].kilos_neto = 500.0; // más de lo que hay de P2

        let resultado = finalizar_venta(&db, &venta);
        assert!(matches!(
            resultado,
            Err(AppError::StockInsuficiente { ref codigo }) if codigo == "P2"
        ));

        // Ni la primera línea ni su descuento quedaron
        assert_eq!(kilos_de(&db, "P1"), 100.0);
        assert_eq!(kilos_de(&db, "P2"), 50.0);
        assert!(listar_lineas_guia(&db, 1).unwrap().is_empty());
        let cliente = clientes::obtener_cliente(&db, "12.345.678-5").unwrap();
        assert_eq!(cliente.deuda, 0.0);
        // El contador tampoco se consumió
        assert_eq!(siguiente_numero_guia(&db).unwrap(), 1);
    }

    #[test]
    fn venta_sin_lineas_se_rechaza() {
        let db = Database::en_memoria().unwrap();
        preparar(&db);

        let mut venta = venta_de_prueba(1, false);
        venta.lineas.clear();
        assert!(matches!(
            finalizar_venta(&db, &venta),
            Err(AppError::Validacion(_))
        ));
    }

    #[test]
    fn pagar_guia_abona_y_limpia_la_marca() {
        let db = Database::en_memoria().unwrap();
        preparar(&db);

        finalizar_venta(&db, &venta_de_prueba(1, true)).unwrap();
        let pagado = pagar_guia(&db, 1).unwrap();
        assert_eq!(pagado, 139_000.0);

        let cliente = clientes::obtener_cliente(&db, "12.345.678-5").unwrap();
        assert_eq!(cliente.deuda, 0.0);
        assert!(listar_lineas_guia(&db, 1)
            .unwrap()
            .iter()
            .all(|v| !v.pagado_con_credito));

        let abonos = clientes::listar_abonos(&db, "12.345.678-5").unwrap();
        assert_eq!(abonos.len(), 1);
        assert_eq!(abonos[0].monto, 139_000.0);

        // Pagarla de nuevo no corresponde
        assert!(matches!(
            pagar_guia(&db, 1),
            Err(AppError::Validacion(_))
        ));
    }

    #[test]
    fn listar_guias_agrupa_por_numero() {
        let db = Database::en_memoria().unwrap();
        preparar(&db);

        finalizar_venta(&db, &venta_de_prueba(1, false)).unwrap();
        finalizar_venta(&db, &venta_de_prueba(2, true)).unwrap();

        let guias = listar_guias(&db).unwrap();
        assert_eq!(guias.len(), 2);
        assert_eq!(guias[0].numero_guia, 2);
        assert!(guias[0].pagado_con_credito);
        assert_eq!(guias[0].lineas, 2);
        assert_eq!(guias[0].total, 139_000.0);
        assert_eq!(guias[0].cliente_nombre.as_deref(), Some("Distribuidora Sur"));
    }
}
