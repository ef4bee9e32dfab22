pub mod clientes;
pub mod compras;
pub mod configuracion;
pub mod exportar;
pub mod inventario;
pub mod notificaciones;
pub mod productos;
pub mod traspasos;
pub mod ventas;
