use crate::utils::error::{FieldViolation, FlightError, Result};
use regex::Regex;
use std::fmt::Display;

pub type FieldResult<T> = std::result::Result<T, FieldViolation>;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_exact_length(field_name: &str, value: &str, length: usize) -> FieldResult<()> {
    let actual = value.chars().count();
    if actual != length {
        return Err(FieldViolation::new(
            field_name,
            value,
            format!("must be exactly {} characters, found {}", length, actual),
        ));
    }
    Ok(())
}

pub fn validate_pattern(
    field_name: &str,
    value: &str,
    pattern: &Regex,
    description: &str,
) -> FieldResult<()> {
    if !pattern.is_match(value) {
        return Err(FieldViolation::new(
            field_name,
            value,
            format!("must match {}", description),
        ));
    }
    Ok(())
}

/// Inclusive range check. Values that do not compare (NaN) are rejected.
pub fn validate_range<T: PartialOrd + Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> FieldResult<()> {
    if !(value >= min && value <= max) {
        return Err(FieldViolation::new(
            field_name,
            value.to_string(),
            format!("must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(
    field_name: &str,
    value: &'a Option<T>,
) -> FieldResult<&'a T> {
    value
        .as_ref()
        .ok_or_else(|| FieldViolation::missing(field_name))
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> FieldResult<()> {
    if value.trim().is_empty() {
        return Err(FieldViolation::new(
            field_name,
            value,
            "cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_path(field_name: &str, path: &str) -> FieldResult<()> {
    validate_non_empty_string(field_name, path)?;

    if path.contains('\0') {
        return Err(FieldViolation::new(field_name, path, "path contains null bytes"));
    }

    Ok(())
}

/// Turn a field-level violation into a configuration error.
pub fn config_error(violation: FieldViolation) -> FlightError {
    FlightError::InvalidConfigValueError {
        field: violation.field,
        value: violation.value,
        reason: violation.reason,
    }
}
