//! Exportación a CSV (separado por punto y coma, con BOM para que
//! Excel en español abra bien los caracteres) y a JSON.

use crate::db::Database;
use crate::error::AppError;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// BOM UTF-8 para que Excel abra correctamente caracteres especiales
const BOM: &[u8] = b"\xEF\xBB\xBF";
/// Separador de columnas (punto y coma para Excel en español)
const SEP: &str = ";";

fn escapar_csv(valor: &str) -> String {
    if valor.contains(';') || valor.contains('"') || valor.contains('\n') {
        format!("\"{}\"", valor.replace('"', "\"\""))
    } else {
        valor.to_string()
    }
}

fn escribir_csv(
    ruta: &Path,
    headers: &[&str],
    filas: &[Vec<String>],
) -> Result<usize, AppError> {
    let mut file = std::fs::File::create(ruta)?;
    file.write_all(BOM)?;
    writeln!(file, "{}", headers.join(SEP))?;

    for fila in filas {
        let linea: Vec<String> = fila.iter().map(|v| escapar_csv(v)).collect();
        writeln!(file, "{}", linea.join(SEP))?;
    }

    Ok(filas.len())
}

/// Exporta las ventas de un rango de fechas. Devuelve la cantidad de
/// líneas exportadas.
pub fn exportar_ventas_csv(
    db: &Database,
    fecha_inicio: &str,
    fecha_fin: &str,
    ruta: &Path,
) -> Result<usize, AppError> {
    let filas: Vec<Vec<String>> = {
        let conn = db.conn();
        let mut stmt = conn.prepare(
            "SELECT v.numero_guia, v.fecha_venta, COALESCE(c.nombre, ''), v.codigo_producto,
             COALESCE(v.descripcion, ''), v.bandejas, v.kilos_neto, v.total,
             CASE WHEN v.pagado_con_credito = 1 THEN 'Si' ELSE 'No' END
             FROM ventas v
             LEFT JOIN clientes c ON v.rut = c.rut
             WHERE date(v.fecha_venta) BETWEEN date(?1) AND date(?2)
             ORDER BY v.numero_guia DESC",
        )?;
        let filas = stmt
            .query_map(rusqlite::params![fecha_inicio, fecha_fin], |row| {
                Ok(vec![
                    row.get::<_, i64>(0)?.to_string(),
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, i64>(5)?.to_string(),
                    format!("{:.2}", row.get::<_, f64>(6)?),
                    format!("{:.2}", row.get::<_, f64>(7)?),
                    row.get::<_, String>(8)?,
                ])
            })?
            .collect::<Result<Vec<_>, _>>()?;
        filas
    };

    let headers = [
        "Guia", "Fecha", "Cliente", "Codigo", "Descripcion",
        "Bandejas", "Kilos", "Total", "Credito",
    ];
    escribir_csv(ruta, &headers, &filas)
}

pub fn exportar_inventario_csv(db: &Database, ruta: &Path) -> Result<usize, AppError> {
    let filas: Vec<Vec<String>> = {
        let conn = db.conn();
        let mut stmt = conn.prepare(
            "SELECT i.codigo, COALESCE(i.producto, ''), i.unidades, i.kilos,
             COALESCE(i.fecha_mas_antigua, ''), COALESCE(i.fecha_mas_nueva, ''),
             COALESCE(i.fecha_vencimiento, '')
             FROM inventario i
             ORDER BY i.codigo",
        )?;
        let filas = stmt
            .query_map([], |row| {
                Ok(vec![
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?.to_string(),
                    format!("{:.2}", row.get::<_, f64>(3)?),
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                ])
            })?
            .collect::<Result<Vec<_>, _>>()?;
        filas
    };

    let headers = [
        "Codigo", "Producto", "Unidades", "Kilos",
        "Fecha Mas Antigua", "Fecha Mas Nueva", "Vencimiento",
    ];
    escribir_csv(ruta, &headers, &filas)
}

/// Exporta la cartera de deudores (clientes con deuda vigente).
pub fn exportar_deudores_csv(db: &Database, ruta: &Path) -> Result<usize, AppError> {
    let filas: Vec<Vec<String>> = {
        let conn = db.conn();
        let mut stmt = conn.prepare(
            "SELECT rut, nombre, direccion, giro, deuda
             FROM clientes WHERE deuda > 0 ORDER BY deuda DESC",
        )?;
        let filas = stmt
            .query_map([], |row| {
                Ok(vec![
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    format!("{:.2}", row.get::<_, f64>(4)?),
                ])
            })?
            .collect::<Result<Vec<_>, _>>()?;
        filas
    };

    let headers = ["RUT", "Nombre", "Direccion", "Giro", "Deuda"];
    escribir_csv(ruta, &headers, &filas)
}

/// Serializa cualquier colección de filas a JSON con formato legible.
pub fn exportar_json<T: Serialize>(filas: &[T], ruta: &Path) -> Result<(), AppError> {
    let contenido = serde_json::to_string_pretty(filas)
        .map_err(|e| AppError::Validacion(format!("Error serializando JSON: {e}")))?;
    std::fs::write(ruta, contenido)?;
    Ok(())
}
