use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Producto {
    pub codigo: String,
    pub nombre: String,
    pub marca: Option<String>,
    pub categoria: Option<String>,
    pub subcategoria: Option<String>,
    pub unidad_medida: Option<String>,
    #[serde(default)]
    pub precio: f64,
}

/// Producto junto con su existencia en inventario (join productos/inventario).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProductoConStock {
    pub producto: Producto,
    pub unidades: i64,
    pub kilos: f64,
    pub fecha_mas_antigua: Option<String>,
    pub fecha_mas_nueva: Option<String>,
}
