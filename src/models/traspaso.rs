use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Sucursal {
    pub id: Option<i64>,
    pub nombre: String,
    pub direccion: String,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub encargado: Option<String>,
}

/// Traspaso de stock entre dos sucursales.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Traspaso {
    pub id: Option<i64>,
    pub sucursal_origen_id: i64,
    pub sucursal_destino_id: i64,
    pub codigo: String,
    pub unidades: i64,
    pub kilos: f64,
    pub fecha_traspaso: Option<String>,
    pub estado: Option<String>,
}
