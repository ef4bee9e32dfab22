use serde::{Deserialize, Serialize};

/// Registro de compra a proveedor. `esta_procesado` indica si ya se
/// agregó al inventario.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CompraRegistro {
    pub id: Option<i64>,
    pub fecha_compra: String,
    pub proveedor: String,
    pub producto: String,
    pub cantidad: f64,
    pub precio_unitario: f64,
    pub total: f64,
    pub observaciones: Option<String>,
    pub esta_procesado: bool,
}

/// Proveedor con su vendedor de contacto.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Proveedor {
    pub id: Option<i64>,
    pub nombre: String,
    pub vendedor: String,
}

impl CompraRegistro {
    pub fn nueva(proveedor: &str, producto: &str, cantidad: f64, precio_unitario: f64) -> Self {
        CompraRegistro {
            id: None,
            fecha_compra: crate::utils::fecha_hora_actual(),
            proveedor: proveedor.to_string(),
            producto: producto.to_string(),
            cantidad,
            precio_unitario,
            total: cantidad * precio_unitario,
            observaciones: None,
            esta_procesado: false,
        }
    }
}
