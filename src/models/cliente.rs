use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Cliente {
    pub rut: String,
    pub nombre: String,
    pub direccion: String,
    pub giro: String,
    #[serde(default)]
    pub deuda: f64,
}
