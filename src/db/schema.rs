use rusqlite::Connection;

pub fn create_tables(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        -- Clientes (el RUT es la clave primaria)
        CREATE TABLE IF NOT EXISTS clientes (
            rut TEXT PRIMARY KEY,
            nombre TEXT NOT NULL,
            direccion TEXT NOT NULL,
            giro TEXT NOT NULL,
            deuda REAL NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_clientes_nombre ON clientes(nombre);

        -- Catálogo de productos
        CREATE TABLE IF NOT EXISTS productos (
            codigo TEXT PRIMARY KEY,
            nombre TEXT NOT NULL,
            marca TEXT,
            categoria TEXT,
            subcategoria TEXT,
            unidad_medida TEXT,
            precio REAL NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_productos_nombre ON productos(nombre);
        CREATE INDEX IF NOT EXISTS idx_productos_categoria ON productos(categoria);

        -- Inventario central (una fila por código)
        CREATE TABLE IF NOT EXISTS inventario (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            codigo TEXT NOT NULL UNIQUE,
            producto TEXT,
            unidades INTEGER NOT NULL DEFAULT 0,
            kilos REAL NOT NULL DEFAULT 0,
            fecha_mas_antigua TEXT,
            fecha_mas_nueva TEXT,
            fecha_vencimiento TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_inventario_codigo ON inventario(codigo);

        -- Líneas de venta; una guía agrupa varias líneas
        CREATE TABLE IF NOT EXISTS ventas (
            numero_guia INTEGER NOT NULL,
            codigo_producto TEXT NOT NULL,
            descripcion TEXT,
            bandejas INTEGER NOT NULL DEFAULT 0,
            kilos_neto REAL NOT NULL,
            fecha_venta TEXT NOT NULL,
            total REAL NOT NULL DEFAULT 0,
            pagado_con_credito INTEGER NOT NULL DEFAULT 0,
            rut TEXT,
            PRIMARY KEY (numero_guia, codigo_producto),
            FOREIGN KEY (codigo_producto) REFERENCES productos(codigo),
            FOREIGN KEY (rut) REFERENCES clientes(rut)
        );

        CREATE INDEX IF NOT EXISTS idx_ventas_rut ON ventas(rut);
        CREATE INDEX IF NOT EXISTS idx_ventas_fecha ON ventas(fecha_venta);

        -- Abonos: registro de pagos, solo inserciones
        CREATE TABLE IF NOT EXISTS abonos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            rut TEXT NOT NULL,
            fecha TEXT NOT NULL,
            monto REAL NOT NULL,
            descripcion TEXT,
            FOREIGN KEY (rut) REFERENCES clientes(rut)
        );

        CREATE INDEX IF NOT EXISTS idx_abonos_rut ON abonos(rut);

        -- Historial de movimientos de deuda (ABONO / CARGO), solo inserciones
        CREATE TABLE IF NOT EXISTS historial_movimientos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            rut TEXT NOT NULL,
            tipo TEXT NOT NULL,
            monto REAL NOT NULL,
            fecha TEXT NOT NULL,
            FOREIGN KEY (rut) REFERENCES clientes(rut)
        );

        CREATE INDEX IF NOT EXISTS idx_historial_rut ON historial_movimientos(rut);

        -- Registros de compra a proveedores
        CREATE TABLE IF NOT EXISTS compra_registros (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            fecha_compra TEXT NOT NULL,
            proveedor TEXT NOT NULL,
            producto TEXT NOT NULL,
            cantidad REAL NOT NULL,
            precio_unitario REAL NOT NULL,
            total REAL NOT NULL,
            observaciones TEXT,
            esta_procesado INTEGER NOT NULL DEFAULT 0
        );

        -- Proveedores
        CREATE TABLE IF NOT EXISTS proveedores (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nombre TEXT NOT NULL,
            vendedor TEXT NOT NULL
        );

        -- Configuración: contadores de guía y compra
        CREATE TABLE IF NOT EXISTS configuracion (
            clave TEXT PRIMARY KEY,
            valor TEXT NOT NULL
        );

        INSERT OR IGNORE INTO configuracion (clave, valor) VALUES ('ultimo_numero_guia', '0');
        INSERT OR IGNORE INTO configuracion (clave, valor) VALUES ('ultimo_numero_compra', '0');

        -- Sucursales
        CREATE TABLE IF NOT EXISTS sucursales (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nombre TEXT NOT NULL,
            direccion TEXT NOT NULL,
            telefono TEXT,
            email TEXT,
            encargado TEXT
        );

        -- Inventario por sucursal
        CREATE TABLE IF NOT EXISTS inventario_sucursal (
            sucursal_id INTEGER NOT NULL,
            codigo TEXT NOT NULL,
            unidades INTEGER NOT NULL DEFAULT 0,
            kilos REAL NOT NULL DEFAULT 0,
            PRIMARY KEY (sucursal_id, codigo),
            FOREIGN KEY (sucursal_id) REFERENCES sucursales(id),
            FOREIGN KEY (codigo) REFERENCES productos(codigo)
        );

        -- Traspasos entre sucursales
        CREATE TABLE IF NOT EXISTS traspasos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            sucursal_origen_id INTEGER NOT NULL,
            sucursal_destino_id INTEGER NOT NULL,
            codigo TEXT NOT NULL,
            unidades INTEGER NOT NULL,
            kilos REAL NOT NULL,
            fecha_traspaso TEXT NOT NULL,
            estado TEXT NOT NULL,
            FOREIGN KEY (sucursal_origen_id) REFERENCES sucursales(id),
            FOREIGN KEY (sucursal_destino_id) REFERENCES sucursales(id),
            FOREIGN KEY (codigo) REFERENCES productos(codigo)
        );
        ",
    )?;

    Ok(())
}
