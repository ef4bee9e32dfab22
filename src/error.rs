use thiserror::Error;

/// Errores de dominio de la aplicación, por encima de los errores del
/// driver SQLite. Las operaciones registran el error y lo propagan; no
/// hay reintentos.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No se encontró el cliente con RUT: {rut}")]
    ClienteNoEncontrado { rut: String },

    #[error("Ya existe un cliente con el RUT: {rut}")]
    ClienteDuplicado { rut: String },

    #[error("No se puede eliminar el cliente con RUT: {rut} porque tiene ventas asociadas")]
    ClienteConVentas { rut: String },

    #[error("Stock insuficiente para el producto {codigo}")]
    StockInsuficiente { codigo: String },

    #[error("{0}")]
    Validacion(String),

    #[error("Error de configuración: {0}")]
    Configuracion(String),

    #[error("Error de base de datos: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Error de E/S: {0}")]
    Io(#[from] std::io::Error),
}
