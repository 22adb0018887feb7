//! Request validation applied before anything is sent
//!
//! Limits mirror the backend's request schemas, so a bad argument is reported locally with a
//! clear message instead of as a 422 round trip.

use std::ops::RangeInclusive;

use super::error::ApiError;

pub const INSTRUCTION_CHARS: RangeInclusive<usize> = 2..=500;
pub const SIMILAR_INSTRUCTION_CHARS: RangeInclusive<usize> = 3..=2000;
pub const DOCUMENT_QUANTITY: RangeInclusive<u32> = 1..=50;
pub const SIMILAR_QUANTITY: RangeInclusive<u32> = 1..=20;
pub const MIN_PASSWORD_CHARS: usize = 8;
pub const MAX_DISPLAY_NAME_CHARS: usize = 80;

fn check_length<'a>(
    field: &str,
    text: &'a str,
    range: RangeInclusive<usize>,
) -> Result<&'a str, ApiError> {
    let text = text.trim();
    let len = text.chars().count();
    if !range.contains(&len) {
        return Err(ApiError::validation(format!(
            "{} must be between {} and {} characters (got {})",
            field,
            range.start(),
            range.end(),
            len
        )));
    }
    Ok(text)
}

fn check_quantity(quantity: u32, range: RangeInclusive<u32>) -> Result<u32, ApiError> {
    if !range.contains(&quantity) {
        return Err(ApiError::validation(format!(
            "quantity must be between {} and {} (got {})",
            range.start(),
            range.end(),
            quantity
        )));
    }
    Ok(quantity)
}

/// Trimmed refinement instruction
pub fn refinement_instruction(instruction: &str) -> Result<&str, ApiError> {
    check_length("instruction", instruction, INSTRUCTION_CHARS)
}

pub fn similar_instruction(instruction: &str) -> Result<&str, ApiError> {
    check_length("instruction", instruction, SIMILAR_INSTRUCTION_CHARS)
}

pub fn document_quantity(quantity: u32) -> Result<u32, ApiError> {
    check_quantity(quantity, DOCUMENT_QUANTITY)
}

pub fn similar_quantity(quantity: u32) -> Result<u32, ApiError> {
    check_quantity(quantity, SIMILAR_QUANTITY)
}

/// Minimal shape check; the backend does the real address validation
pub fn email(email: &str) -> Result<&str, ApiError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(ApiError::validation(format!("'{}' is not a valid email address", email))),
    }
}

pub fn password(password: &str) -> Result<&str, ApiError> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ApiError::validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_CHARS
        )));
    }
    Ok(password)
}

/// Blank display names are dropped
pub fn display_name(name: Option<&str>) -> Result<Option<&str>, ApiError> {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) if name.chars().count() > MAX_DISPLAY_NAME_CHARS => Err(ApiError::validation(
            format!("display name must be at most {} characters", MAX_DISPLAY_NAME_CHARS),
        )),
        other => Ok(other),
    }
}
