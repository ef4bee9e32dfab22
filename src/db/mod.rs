pub mod schema;

use crate::error::AppError;
use crate::settings::Settings;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

pub struct Database {
    pub conn: Mutex<Connection>,
}

impl Database {
    /// Abre (o crea) la base de datos en la ruta configurada en
    /// `appsettings.json`, o en la ruta por defecto.
    pub fn new() -> Result<Self, AppError> {
        let settings = Settings::cargar();
        Self::abrir(&settings.ruta_base_datos())
    }

    pub fn abrir(ruta: &Path) -> Result<Self, AppError> {
        if let Some(padre) = ruta.parent() {
            std::fs::create_dir_all(padre).ok();
        }

        let conn = Connection::open(ruta)?;
        Self::inicializar(conn)
    }

    /// Base de datos en memoria, para pruebas.
    pub fn en_memoria() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory()?;
        Self::inicializar(conn)
    }

    fn inicializar(conn: Connection) -> Result<Self, AppError> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;

        let db = Database {
            conn: Mutex::new(conn),
        };

        db.ejecutar_migraciones()?;
        tracing::info!("Base de datos inicializada correctamente");

        Ok(db)
    }

    /// Toma el lock de la conexión. Si un hilo anterior entró en pánico
    /// con el lock tomado, la conexión sigue siendo utilizable.
    pub fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ejecutar_migraciones(&self) -> Result<(), AppError> {
        let conn = self.conn();
        schema::create_tables(&conn)?;

        // Migraciones incrementales (safe: .ok() ignora si la columna ya existe)
        conn.execute("ALTER TABLE clientes ADD COLUMN deuda REAL DEFAULT 0", [])
            .ok();
        conn.execute("ALTER TABLE productos ADD COLUMN precio REAL DEFAULT 0", [])
            .ok();
        conn.execute(
            "ALTER TABLE ventas ADD COLUMN pagado_con_credito INTEGER DEFAULT 0",
            [],
        )
        .ok();
        conn.execute("ALTER TABLE ventas ADD COLUMN rut TEXT", []).ok();
        conn.execute(
            "ALTER TABLE inventario ADD COLUMN fecha_vencimiento TEXT",
            [],
        )
        .ok();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migraciones_son_idempotentes() {
        let db = Database::en_memoria().unwrap();
        // Una segunda pasada no debe fallar aunque todo exista ya.
        db.ejecutar_migraciones().unwrap();
        let conn = db.conn();
        let tablas: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN
                 ('clientes','productos','inventario','ventas','abonos',
                  'historial_movimientos','compra_registros','configuracion',
                  'sucursales','inventario_sucursal','traspasos')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tablas, 11);
    }

    #[test]
    fn configuracion_viene_sembrada() {
        let db = Database::en_memoria().unwrap();
        let conn = db.conn();
        let valor: String = conn
            .query_row(
                "SELECT valor FROM configuracion WHERE clave = 'ultimo_numero_guia'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(valor, "0");
    }
}
