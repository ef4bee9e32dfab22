use serde::{Deserialize, Serialize};

/// Línea de venta persistida. La identidad es (numero_guia, codigo_producto).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Venta {
    pub numero_guia: i64,
    pub codigo_producto: String,
    pub descripcion: Option<String>,
    pub bandejas: i64,
    pub kilos_neto: f64,
    pub fecha_venta: String,
    pub total: f64,
    pub pagado_con_credito: bool,
    pub rut: Option<String>,
}

/// Datos de entrada para finalizar una venta.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NuevaVenta {
    pub numero_guia: i64,
    pub rut: String,
    pub fecha_venta: String,
    pub pagado_con_credito: bool,
    pub lineas: Vec<LineaVenta>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LineaVenta {
    pub codigo_producto: String,
    pub descripcion: Option<String>,
    pub bandejas: i64,
    pub kilos_neto: f64,
    pub total: f64,
}

/// Resumen de una guía: todas sus líneas comparten numero_guia.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ResumenGuia {
    pub numero_guia: i64,
    pub rut: Option<String>,
    pub cliente_nombre: Option<String>,
    pub fecha_venta: String,
    pub total: f64,
    pub lineas: i64,
    pub pagado_con_credito: bool,
}
