use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Inventario {
    pub id: Option<i64>,
    pub codigo: String,
    pub producto: Option<String>,
    pub unidades: i64,
    pub kilos: f64,
    pub fecha_mas_antigua: Option<String>,
    pub fecha_mas_nueva: Option<String>,
    pub fecha_vencimiento: Option<String>,
}
