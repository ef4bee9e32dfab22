use serde::{Deserialize, Serialize};

pub const TIPO_ABONO: &str = "ABONO";
pub const TIPO_CARGO: &str = "CARGO";

/// Entrada del historial de deuda. `monto` siempre es magnitud positiva;
/// el signo lo da `tipo`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Movimiento {
    pub id: Option<i64>,
    pub rut: String,
    pub tipo: String,
    pub monto: f64,
    pub fecha: String,
}

impl Movimiento {
    /// Monto con signo: los abonos restan, los cargos suman.
    pub fn monto_firmado(&self) -> f64 {
        if self.tipo == TIPO_ABONO {
            -self.monto
        } else {
            self.monto
        }
    }
}
