//! Avisos de operación: stock bajo y guías a crédito con mora. El
//! servicio de fondo revisa el stock a intervalo fijo con su propia
//! conexión y entrega los avisos por un canal; no se coordina con las
//! transacciones en curso.

use crate::db::Database;
use crate::error::AppError;
use rusqlite::params;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

/// Días de gracia antes de considerar morosa una guía a crédito.
const DIAS_MORA: f64 = 30.0;

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub enum TipoNotificacion {
    StockBajo,
    PagoPendiente,
}

#[derive(Debug, Serialize, Clone)]
pub struct Notificacion {
    pub tipo: TipoNotificacion,
    pub mensaje: String,
}

/// Códigos de inventario con unidades en o bajo el umbral.
pub fn verificar_stock_bajo(db: &Database, umbral: i64) -> Result<Vec<Notificacion>, AppError> {
    let conn = db.conn();
    let mut stmt = conn.prepare(
        "SELECT codigo, COALESCE(producto, codigo), unidades
         FROM inventario WHERE unidades <= ?1 ORDER BY unidades",
    )?;
    let avisos = stmt
        .query_map(params![umbral], |row| {
            let nombre: String = row.get(1)?;
            let unidades: i64 = row.get(2)?;
            Ok(Notificacion {
                tipo: TipoNotificacion::StockBajo,
                mensaje: format!("Stock bajo: {nombre} ({unidades} unidades)"),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(avisos)
}

/// Guías a crédito sin pagar con más de 30 días.
pub fn verificar_pagos_pendientes(db: &Database) -> Result<Vec<Notificacion>, AppError> {
    let conn = db.conn();
    let mut stmt = conn.prepare(
        "SELECT v.numero_guia, COALESCE(c.nombre, v.rut), SUM(v.total),
                CAST(julianday('now') - julianday(MIN(v.fecha_venta)) AS INTEGER)
         FROM ventas v
         LEFT JOIN clientes c ON c.rut = v.rut
         WHERE v.pagado_con_credito = 1
         GROUP BY v.numero_guia
         HAVING julianday('now') - julianday(MIN(v.fecha_venta)) > ?1
         ORDER BY MIN(v.fecha_venta)",
    )?;
    let avisos = stmt
        .query_map(params![DIAS_MORA], |row| {
            let numero_guia: i64 = row.get(0)?;
            let cliente: String = row.get(1)?;
            let total: f64 = row.get(2)?;
            let dias: i64 = row.get(3)?;
            Ok(Notificacion {
                tipo: TipoNotificacion::PagoPendiente,
                mensaje: format!(
                    "Guía N° {numero_guia} de {cliente} lleva {dias} días impaga (${total:.0})"
                ),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(avisos)
}

/// Revisa el stock en un hilo de fondo a intervalo fijo y entrega los
/// avisos por el canal devuelto en `iniciar`. Se detiene al soltarlo.
pub struct NotificacionService {
    detener: Option<Sender<()>>,
    hilo: Option<JoinHandle<()>>,
}

impl NotificacionService {
    pub fn iniciar(
        ruta_db: PathBuf,
        intervalo: Duration,
        umbral_stock: i64,
    ) -> (Self, Receiver<Notificacion>) {
        let (tx_avisos, rx_avisos) = mpsc::channel();
        let (tx_detener, rx_detener) = mpsc::channel::<()>();

        let hilo = std::thread::spawn(move || loop {
            match Database::abrir(&ruta_db) {
                Ok(db) => match verificar_stock_bajo(&db, umbral_stock) {
                    Ok(avisos) => {
                        for aviso in avisos {
                            if tx_avisos.send(aviso).is_err() {
                                return;
                            }
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "Fallo la revisión de stock"),
                },
                Err(e) => tracing::warn!(error = %e, "No se pudo abrir la base para notificaciones"),
            }

            // Espera el intervalo, o la señal de detención
            match rx_detener.recv_timeout(intervalo) {
                Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => return,
                Err(mpsc::RecvTimeoutError::Timeout) => {}
            }
        });

        (
            NotificacionService {
                detener: Some(tx_detener),
                hilo: Some(hilo),
            },
            rx_avisos,
        )
    }
}

impl Drop for NotificacionService {
    fn drop(&mut self) {
        if let Some(detener) = self.detener.take() {
            let _ = detener.send(());
        }
        if let Some(hilo) = self.hilo.take() {
            let _ = hilo.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::inventario;

    fn con_producto(db: &Database, codigo: &str, nombre: &str) {
        let conn = db.conn();
        conn.execute(
            "INSERT INTO productos (codigo, nombre) VALUES (?1, ?2)",
            params![codigo, nombre],
        )
        .unwrap();
    }

    #[test]
    fn stock_bajo_respeta_el_umbral() {
        let db = Database::en_memoria().unwrap();
        con_producto(&db, "P1", "Pollo entero");
        con_producto(&db, "P2", "Trutro");
        inventario::agregar_stock(&db, "P1", 3, 30.0, "2025-01-01", None).unwrap();
        inventario::agregar_stock(&db, "P2", 50, 500.0, "2025-01-01", None).unwrap();

        let avisos = verificar_stock_bajo(&db, 5).unwrap();
        assert_eq!(avisos.len(), 1);
        assert_eq!(avisos[0].tipo, TipoNotificacion::StockBajo);
        assert!(avisos[0].mensaje.contains("Pollo entero"));
    }

    #[test]
    fn pagos_pendientes_solo_guias_viejas_a_credito() {
        let db = Database::en_memoria().unwrap();
        {
            let conn = db.conn();
            conn.execute_batch(
                "INSERT INTO clientes (rut, nombre, direccion, giro, deuda)
                 VALUES ('12.345.678-5', 'Moroso', 'Calle 1', 'Comercio', 50000);
                 INSERT INTO productos (codigo, nombre) VALUES ('P1', 'Pollo');
                 -- Guía vieja a crédito: debe aparecer
                 INSERT INTO ventas (numero_guia, codigo_producto, kilos_neto, fecha_venta, total, pagado_con_credito, rut)
                 VALUES (1, 'P1', 10, '2020-01-01 10:00:00', 50000, 1, '12.345.678-5');
                 -- Guía vieja al contado: no
                 INSERT INTO ventas (numero_guia, codigo_producto, kilos_neto, fecha_venta, total, pagado_con_credito, rut)
                 VALUES (2, 'P1', 10, '2020-01-01 10:00:00', 30000, 0, '12.345.678-5');
                 -- Guía reciente a crédito: tampoco
                 INSERT INTO ventas (numero_guia, codigo_producto, kilos_neto, fecha_venta, total, pagado_con_credito, rut)
                 VALUES (3, 'P1', 10, datetime('now'), 20000, 1, '12.345.678-5');",
            )
            .unwrap();
        }

        let avisos = verificar_pagos_pendientes(&db).unwrap();
        assert_eq!(avisos.len(), 1);
        assert_eq!(avisos[0].tipo, TipoNotificacion::PagoPendiente);
        assert!(avisos[0].mensaje.contains("Guía N° 1"));
        assert!(avisos[0].mensaje.contains("Moroso"));
    }

    #[test]
    fn el_servicio_avisa_y_se_detiene_al_soltarlo() {
        let dir = tempfile::tempdir().unwrap();
        let ruta = dir.path().join("avisos.db");
        {
            let db = Database::abrir(&ruta).unwrap();
            con_producto(&db, "P1", "Pollo entero");
            inventario::agregar_stock(&db, "P1", 2, 20.0, "2025-01-01", None).unwrap();
        }

        let (servicio, avisos) =
            NotificacionService::iniciar(ruta, Duration::from_millis(50), 5);

        let aviso = avisos.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(aviso.tipo, TipoNotificacion::StockBajo);

        drop(servicio);
        // Tras la detención el canal termina cerrándose
        while avisos.recv_timeout(Duration::from_secs(1)).is_ok() {}
        assert!(avisos.recv().is_err());
    }
}
