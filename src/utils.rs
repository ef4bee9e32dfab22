use chrono::Local;
use regex::Regex;
use std::sync::LazyLock;

static FORMATO_RUT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}\.\d{3}\.\d{3}-[0-9kK]$").unwrap());

/// Fecha y hora local en el formato que se persiste en la base.
pub fn fecha_hora_actual() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Valida un RUT chileno: formato NN.NNN.NNN-D y dígito verificador
/// módulo 11.
pub fn validar_rut(rut: &str) -> bool {
    if !FORMATO_RUT.is_match(rut) {
        return false;
    }

    let limpio: String = rut.chars().filter(|c| *c != '.' && *c != '-').collect();
    let (numero, dv) = limpio.split_at(limpio.len() - 1);
    let dv = dv.chars().next().unwrap_or('0');

    let mut suma: u32 = 0;
    let mut multiplicador: u32 = 2;
    for c in numero.chars().rev() {
        suma += c.to_digit(10).unwrap_or(0) * multiplicador;
        multiplicador = if multiplicador == 7 { 2 } else { multiplicador + 1 };
    }

    let resto = suma % 11;
    let dv_calculado = match 11 - resto {
        11 => '0',
        10 => 'K',
        n => char::from_digit(n, 10).unwrap_or('0'),
    };

    dv.to_ascii_uppercase() == dv_calculado
}
