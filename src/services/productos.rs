//! Catálogo de productos e importación masiva desde CSV.

use crate::db::Database;
use crate::error::AppError;
use crate::models::Producto;
use crate::repo::{ProductoRepositorio, Repositorio};
use rusqlite::params;
use std::path::Path;

pub fn crear_producto(db: &Database, producto: &Producto) -> Result<(), AppError> {
    if producto.codigo.trim().is_empty() || producto.nombre.trim().is_empty() {
        return Err(AppError::Validacion(
            "Código y nombre son obligatorios".into(),
        ));
    }

    let repo = ProductoRepositorio { db };
    if repo.existe(&producto.codigo)? {
        return Err(AppError::Validacion(format!(
            "Ya existe un producto con el código {}",
            producto.codigo
        )));
    }
    repo.agregar(producto)?;
    tracing::info!(codigo = %producto.codigo, "Producto creado");
    Ok(())
}

pub fn obtener_producto(db: &Database, codigo: &str) -> Result<Option<Producto>, AppError> {
    ProductoRepositorio { db }.obtener(codigo)
}

pub fn listar_productos(db: &Database) -> Result<Vec<Producto>, AppError> {
    ProductoRepositorio { db }.listar()
}

pub fn actualizar_producto(db: &Database, producto: &Producto) -> Result<(), AppError> {
    let actualizado = ProductoRepositorio { db }.actualizar(producto)?;
    if !actualizado {
        return Err(AppError::Validacion(format!(
            "No existe el producto {}",
            producto.codigo
        )));
    }
    Ok(())
}

pub fn eliminar_producto(db: &Database, codigo: &str) -> Result<(), AppError> {
    let eliminado = ProductoRepositorio { db }.eliminar(codigo)?;
    if !eliminado {
        return Err(AppError::Validacion(format!(
            "No existe el producto {codigo}"
        )));
    }
    Ok(())
}

/// Búsqueda incremental por código o nombre, acotada para el typeahead.
pub fn buscar_productos(db: &Database, termino: &str) -> Result<Vec<Producto>, AppError> {
    let conn = db.conn();
    let patron = format!("%{}%", termino.trim());
    let mut stmt = conn.prepare(
        "SELECT codigo, nombre, marca, categoria, subcategoria, unidad_medida, precio
         FROM productos
         WHERE codigo LIKE ?1 OR nombre LIKE ?1
         ORDER BY nombre LIMIT 30",
    )?;
    let productos = stmt
        .query_map(params![patron], |row| {
            Ok(Producto {
                codigo: row.get(0)?,
                nombre: row.get(1)?,
                marca: row.get(2)?,
                categoria: row.get(3)?,
                subcategoria: row.get(4)?,
                unidad_medida: row.get(5)?,
                precio: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(productos)
}

fn limpiar_campo(campo: &str) -> String {
    campo.trim().trim_matches('"').trim().to_string()
}

/// Importa productos desde un CSV con columnas
/// Codigo,Nombre,Marca,Categoria,SubCategoria,UnidadMedida[,Precio].
/// La primera línea (encabezado) se descarta. Toda la carga ocurre en
/// una transacción: una línea mal formada anula el lote completo.
/// Devuelve la cantidad de productos importados.
pub fn importar_csv(db: &Database, ruta: &Path) -> Result<usize, AppError> {
    let contenido = std::fs::read_to_string(ruta)?;
    importar_csv_desde(db, &contenido)
}

pub fn importar_csv_desde(db: &Database, contenido: &str) -> Result<usize, AppError> {
    let mut guard = db.conn();
    let tx = guard.transaction()?;

    let mut importados = 0usize;
    for (numero, linea) in contenido.lines().enumerate().skip(1) {
        if linea.trim().is_empty() {
            continue;
        }

        let campos: Vec<String> = linea.split(',').map(limpiar_campo).collect();
        if campos.len() < 6 {
            return Err(AppError::Validacion(format!(
                "Línea {}: se esperaban al menos 6 columnas, hay {}",
                numero + 1,
                campos.len()
            )));
        }
        if campos[0].is_empty() || campos[1].is_empty() {
            return Err(AppError::Validacion(format!(
                "Línea {}: código y nombre son obligatorios",
                numero + 1
            )));
        }

        let precio = match campos.get(6) {
            Some(texto) if !texto.is_empty() => texto.parse::<f64>().map_err(|_| {
                AppError::Validacion(format!(
                    "Línea {}: precio inválido: {texto}",
                    numero + 1
                ))
            })?,
            _ => 0.0,
        };

        let opcional = |campo: &String| {
            if campo.is_empty() {
                None
            } else {
                Some(campo.clone())
            }
        };

        tx.execute(
            "INSERT INTO productos (codigo, nombre, marca, categoria, subcategoria, unidad_medida, precio)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(codigo) DO UPDATE SET
                 nombre = excluded.nombre,
                 marca = excluded.marca,
                 categoria = excluded.categoria,
                 subcategoria = excluded.subcategoria,
                 unidad_medida = excluded.unidad_medida,
                 precio = excluded.precio",
            params![
                campos[0],
                campos[1],
                opcional(&campos[2]),
                opcional(&campos[3]),
                opcional(&campos[4]),
                opcional(&campos[5]),
                precio,
            ],
        )?;
        importados += 1;
    }

    tx.commit()?;
    tracing::info!(importados, "Importación CSV terminada");
    Ok(importados)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn producto_prueba(codigo: &str) -> Producto {
        Producto {
            codigo: codigo.to_string(),
            nombre: "Pollo entero".to_string(),
            marca: Some("SERMAC".to_string()),
            categoria: Some("Aves".to_string()),
            subcategoria: None,
            unidad_medida: Some("KG".to_string()),
            precio: 2_500.0,
        }
    }

    #[test]
    fn crud_basico() {
        let db = Database::en_memoria().unwrap();
        crear_producto(&db, &producto_prueba("P1")).unwrap();

        let mut producto = obtener_producto(&db, "P1").unwrap().unwrap();
        assert_eq!(producto.precio, 2_500.0);

        producto.precio = 2_800.0;
        actualizar_producto(&db, &producto).unwrap();
        assert_eq!(
            obtener_producto(&db, "P1").unwrap().unwrap().precio,
            2_800.0
        );

        eliminar_producto(&db, "P1").unwrap();
        assert!(obtener_producto(&db, "P1").unwrap().is_none());
    }

    #[test]
    fn codigo_duplicado_se_rechaza() {
        let db = Database::en_memoria().unwrap();
        crear_producto(&db, &producto_prueba("P1")).unwrap();
        assert!(matches!(
            crear_producto(&db, &producto_prueba("P1")),
            Err(AppError::Validacion(_))
        ));
    }

    #[test]
    fn buscar_por_codigo_o_nombre() {
        let db = Database::en_memoria().unwrap();
        crear_producto(&db, &producto_prueba("P1")).unwrap();
        let mut otro = producto_prueba("T7");
        otro.nombre = "Trutro corto".to_string();
        crear_producto(&db, &otro).unwrap();

        assert_eq!(buscar_productos(&db, "trutro").unwrap().len(), 1);
        assert_eq!(buscar_productos(&db, "P1").unwrap().len(), 1);
        assert!(buscar_productos(&db, "vacuno").unwrap().is_empty());
    }

    #[test]
    fn importar_csv_completo() {
        let db = Database::en_memoria().unwrap();
        let csv = "Codigo,Nombre,Marca,Categoria,SubCategoria,UnidadMedida,Precio\n\
                   P1,Pollo entero,SERMAC,Aves,,KG,2500\n\
                   P2,\"Trutro corto\",SERMAC,Aves,Trutros,KG,3200\n\
                   \n\
                   P3,Alitas,,Aves,,KG\n";

        let importados = importar_csv_desde(&db, csv).unwrap();
        assert_eq!(importados, 3);

        let p2 = obtener_producto(&db, "P2").unwrap().unwrap();
        assert_eq!(p2.nombre, "Trutro corto");
        assert_eq!(p2.precio, 3_200.0);

        // Sin columna de precio queda en 0
        let p3 = obtener_producto(&db, "P3").unwrap().unwrap();
        assert_eq!(p3.precio, 0.0);
        assert!(p3.marca.is_none());
    }

    #[test]
    fn linea_invalida_anula_el_lote() {
        let db = Database::en_memoria().unwrap();
        let csv = "Codigo,Nombre,Marca,Categoria,SubCategoria,UnidadMedida\n\
                   P1,Pollo entero,SERMAC,Aves,,KG\n\
                   P2,Trutro\n";

        let resultado = importar_csv_desde(&db, csv);
        assert!(matches!(resultado, Err(AppError::Validacion(_))));
        // La línea buena tampoco quedó
        assert!(obtener_producto(&db, "P1").unwrap().is_none());
    }

    #[test]
    fn importar_desde_archivo() {
        let db = Database::en_memoria().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let ruta = dir.path().join("productos.csv");
        std::fs::write(
            &ruta,
            "Codigo,Nombre,Marca,Categoria,SubCategoria,UnidadMedida\nP1,Pollo entero,,,,KG\n",
        )
        .unwrap();

        assert_eq!(importar_csv(&db, &ruta).unwrap(), 1);
        assert!(obtener_producto(&db, "P1").unwrap().is_some());
    }
}
