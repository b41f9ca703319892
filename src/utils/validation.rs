//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! de reservas, coches y búsquedas geográficas.

use chrono::{DateTime, Utc};
use validator::ValidationError;

/// Validar formato de coordenadas GPS (simplificado)
pub fn validate_coordinates(lat: f64, lng: f64) -> Result<(), ValidationError> {
    if !lat.is_finite() || lat < -90.0 || lat > 90.0 {
        let mut error = ValidationError::new("latitude");
        error.add_param("value".into(), &lat);
        error.add_param("range".into(), &"-90.0 to 90.0".to_string());
        return Err(error);
    }

    if !lng.is_finite() || lng < -180.0 || lng > 180.0 {
        let mut error = ValidationError::new("longitude");
        error.add_param("value".into(), &lng);
        error.add_param("range".into(), &"-180.0 to 180.0".to_string());
        return Err(error);
    }

    Ok(())
}

/// Validar que un mes esté en el rango calendario
pub fn validate_month(value: u32) -> Result<(), ValidationError> {
    if value < 1 || value > 12 {
        let mut error = ValidationError::new("month");
        error.add_param("value".into(), &value);
        error.add_param("range".into(), &"1 to 12".to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un año sea razonable para reportes
pub fn validate_year(value: i32) -> Result<(), ValidationError> {
    if value < 2000 || value > 2100 {
        let mut error = ValidationError::new("year");
        error.add_param("value".into(), &value);
        error.add_param("range".into(), &"2000 to 2100".to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que la ventana del viaje no termine antes de empezar
pub fn validate_trip_window(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if end < start {
        let mut error = ValidationError::new("trip_window");
        error.add_param("start_date".into(), &start.to_rfc3339());
        error.add_param("end_date".into(), &end.to_rfc3339());
        return Err(error);
    }
    Ok(())
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

/// Validar formato de email
pub fn validate_email(value: &str) -> Result<(), ValidationError> {
    if !value.contains('@') || !value.contains('.') {
        let mut error = ValidationError::new("email");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de número de chasis
pub fn validate_chassis_number(value: &str) -> Result<(), ValidationError> {
    let clean_chassis = value.replace([' ', '-', '_'], "");
    if clean_chassis.len() < 5 || clean_chassis.len() > 30 {
        let mut error = ValidationError::new("chassis_number");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar parámetros de paginación
pub fn validate_pagination(page: u32, page_size: u32) -> Result<(), ValidationError> {
    if page < 1 {
        let mut error = ValidationError::new("page");
        error.add_param("value".into(), &page);
        return Err(error);
    }

    if page_size < 1 || page_size > 100 {
        let mut error = ValidationError::new("page_size");
        error.add_param("value".into(), &page_size);
        error.add_param("range".into(), &"1 to 100".to_string());
        return Err(error);
    }

    Ok(())
}
