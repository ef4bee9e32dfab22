use serde::{Deserialize, Serialize};

/// Pago de un cliente contra su deuda pendiente. Solo se inserta, nunca
/// se modifica.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Abono {
    pub id: Option<i64>,
    pub rut: String,
    pub fecha: String,
    pub monto: f64,
    pub descripcion: Option<String>,
}
