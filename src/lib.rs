pub mod db;
pub mod error;
pub mod models;
pub mod repo;
pub mod services;
pub mod settings;
pub mod utils;

pub use db::Database;
pub use error::AppError;

/// Inicializa el suscriptor de logs. Llamar una sola vez al arrancar.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}
