use serde::Deserialize;
use std::path::{Path, PathBuf};

const ARCHIVO_CONFIG: &str = "appsettings.json";

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub connection: Connection,
}

#[derive(Debug, Default, Deserialize)]
pub struct Connection {
    pub database_path: Option<String>,
}

impl Settings {
    /// Carga `appsettings.json` del directorio actual. El archivo es
    /// opcional; si no existe o no se puede leer se usan los valores por
    /// defecto.
    pub fn cargar() -> Settings {
        Self::cargar_desde(Path::new(ARCHIVO_CONFIG))
    }

    pub fn cargar_desde(ruta: &Path) -> Settings {
        match std::fs::read_to_string(ruta) {
            Ok(contenido) => serde_json::from_str(&contenido).unwrap_or_else(|e| {
                tracing::warn!("appsettings.json inválido, usando valores por defecto: {e}");
                Settings::default()
            }),
            Err(_) => Settings::default(),
        }
    }

    /// Ruta del archivo de base de datos: la configurada, o la ruta por
    /// defecto en el directorio de datos del usuario.
    pub fn ruta_base_datos(&self) -> PathBuf {
        match &self.connection.database_path {
            Some(ruta) => PathBuf::from(ruta),
            None => ruta_por_defecto(),
        }
    }
}

fn ruta_por_defecto() -> PathBuf {
    let mut ruta = directorio_datos().unwrap_or_else(|| PathBuf::from("."));
    ruta.push("AdminSERMAC.db");
    ruta
}

/// Retorna el directorio de datos de la aplicación
fn directorio_datos() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("LOCALAPPDATA")
            .ok()
            .map(|p| PathBuf::from(p).join("AdminSERMAC"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .ok()
            .map(|p| PathBuf::from(p).join(".admin-sermac"))
    }
}
