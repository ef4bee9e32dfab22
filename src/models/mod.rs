pub mod abono;
pub mod cliente;
pub mod compra;
pub mod inventario;
pub mod movimiento;
pub mod producto;
pub mod traspaso;
pub mod venta;

pub use abono::*;
pub use cliente::*;
pub use compra::*;
pub use inventario::*;
pub use movimiento::*;
pub use producto::*;
pub use traspaso::*;
pub use venta::*;
