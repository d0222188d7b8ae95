//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! del dominio: RUT chileno, patentes, payloads de evidencia.

use base64::Engine;
use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;
use validator::ValidationError;

lazy_static! {
    /// Patente chilena: formato antiguo AB1234 o formato nuevo BCDF12
    static ref PATENTE_REGEX: Regex =
        Regex::new(r"^([A-Z]{2}\d{4}|[A-Z]{4}\d{2})$").unwrap();

    /// RUT normalizado: cuerpo numérico + guión + dígito verificador
    static ref RUT_REGEX: Regex = Regex::new(r"^(\d{1,8})-([\dkK])$").unwrap();

    /// Número de ruta: letra + año (2) + mes (2) + secuencia (4)
    static ref NUMERO_RUTA_REGEX: Regex = Regex::new(r"^[A-Z]\d{2}\d{2}\d{4}$").unwrap();
}

/// Validar y convertir string a UUID
pub fn validate_uuid(value: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(value).map_err(|_| {
        let mut error = ValidationError::new("uuid");
        error.add_param("value".into(), &value.to_string());
        error
    })
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Calcular el dígito verificador de un cuerpo de RUT (módulo 11)
fn digito_verificador(cuerpo: &str) -> char {
    let mut suma: u32 = 0;
    let mut factor: u32 = 2;
    for c in cuerpo.chars().rev() {
        suma += c.to_digit(10).unwrap_or(0) * factor;
        factor = if factor == 7 { 2 } else { factor + 1 };
    }
    match 11 - (suma % 11) {
        11 => '0',
        10 => 'K',
        d => std::char::from_digit(d, 10).unwrap(),
    }
}

/// Validar formato y dígito verificador de un RUT chileno
///
/// Acepta el formato normalizado `NNNNNNNN-DV` (sin puntos). Los puntos
/// separadores se eliminan antes de validar.
pub fn validate_rut(value: &str) -> Result<(), ValidationError> {
    let normalizado = value.replace('.', "");
    let captures = RUT_REGEX.captures(&normalizado).ok_or_else(|| {
        let mut error = ValidationError::new("rut");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"NNNNNNNN-DV".to_string());
        error
    })?;

    let cuerpo = captures.get(1).unwrap().as_str();
    let dv = captures
        .get(2)
        .unwrap()
        .as_str()
        .to_uppercase()
        .chars()
        .next()
        .unwrap();

    if digito_verificador(cuerpo) != dv {
        let mut error = ValidationError::new("rut_dv");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de patente chilena
pub fn validate_patente(value: &str) -> Result<(), ValidationError> {
    let limpia = value.replace([' ', '-', '·'], "").to_uppercase();
    if !PATENTE_REGEX.is_match(&limpia) {
        let mut error = ValidationError::new("patente");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"AB1234 o BCDF12".to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un payload de evidencia (foto/firma) sea base64 bien formado
///
/// El contenido no se interpreta; sólo se verifica que el string decodifique.
/// Se acepta el prefijo data-URL que envían los clientes web.
pub fn validate_evidencia_payload(value: &str) -> Result<(), ValidationError> {
    let datos = match value.split_once(";base64,") {
        Some((_, resto)) => resto,
        None => value,
    };
    if datos.trim().is_empty()
        || base64::engine::general_purpose::STANDARD.decode(datos).is_err()
    {
        let mut error = ValidationError::new("evidencia");
        error.add_param("format".into(), &"base64".to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de número de ruta
pub fn validate_numero_ruta(value: &str) -> Result<(), ValidationError> {
    if !NUMERO_RUTA_REGEX.is_match(value) {
        let mut error = ValidationError::new("numero_ruta");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"R<YY><MM><NNNN>".to_string());
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("no-es-uuid").is_err());
    }

    #[test]
    fn test_validate_not_empty() {
        assert!(validate_not_empty("hola").is_ok());
        assert!(validate_not_empty("").is_err());
        assert!(validate_not_empty("   ").is_err());
    }

    #[test]
    fn test_validate_rut_valido() {
        assert!(validate_rut("12345678-5").is_ok());
        assert!(validate_rut("11111111-1").is_ok());
        assert!(validate_rut("12.345.678-5").is_ok());
        // dígito verificador K
        assert!(validate_rut("6-K").is_ok());
        assert!(validate_rut("6-k").is_ok());
    }

    #[test]
    fn test_validate_rut_invalido() {
        assert!(validate_rut("12345678-9").is_err());
        assert!(validate_rut("12345678").is_err());
        assert!(validate_rut("sin-rut").is_err());
        assert!(validate_rut("").is_err());
    }

    #[test]
    fn test_validate_patente() {
        assert!(validate_patente("AB1234").is_ok());
        assert!(validate_patente("ab-1234").is_ok());
        assert!(validate_patente("BCDF12").is_ok());
        assert!(validate_patente("A1").is_err());
        assert!(validate_patente("12345678").is_err());
    }

    #[test]
    fn test_validate_evidencia_payload() {
        let foto = base64::engine::general_purpose::STANDARD.encode(b"jpeg-bytes");
        assert!(validate_evidencia_payload(&foto).is_ok());
        assert!(validate_evidencia_payload(&format!("data:image/jpeg;base64,{}", foto)).is_ok());
        assert!(validate_evidencia_payload("").is_err());
        assert!(validate_evidencia_payload("%%%no-base64%%%").is_err());
    }

    #[test]
    fn test_validate_numero_ruta() {
        assert!(validate_numero_ruta("R25080001").is_ok());
        assert!(validate_numero_ruta("R2508001").is_err());
        assert!(validate_numero_ruta("25080001").is_err());
    }
}
