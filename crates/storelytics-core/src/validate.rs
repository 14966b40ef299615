use crate::ValidationError;

/// Normalize a store app identifier.
///
/// Trims surrounding whitespace and strips one optional case-insensitive
/// `id` prefix, then requires 8 to 10 decimal digits directly after it.
///
/// # Errors
///
/// Returns [`ValidationError`] when the input is empty or is not an
/// 8 to 10 digit numeric id after normalization.
pub fn clean_app_id(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("app_id is required"));
    }

    let id = match trimmed.get(..2) {
        Some(prefix) if prefix.eq_ignore_ascii_case("id") => &trimmed[2..],
        _ => trimmed,
    };

    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new(format!(
            "app_id must be numeric, got \"{raw}\""
        )));
    }
    if !(8..=10).contains(&id.len()) {
        return Err(ValidationError::new(format!(
            "app_id must be 8-10 digits, got {} digits",
            id.len()
        )));
    }

    Ok(id.to_string())
}

/// Normalize a storefront country code to two lowercase letters.
///
/// # Errors
///
/// Returns [`ValidationError`] unless the input is exactly two alphabetic
/// characters after trimming.
pub fn validate_country_code(raw: &str) -> Result<String, ValidationError> {
    let code = raw.trim();
    if code.is_empty() {
        return Err(ValidationError::new("country code is required"));
    }
    if code.chars().count() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::new(format!(
            "country code must be 2 letters, got \"{raw}\""
        )));
    }
    Ok(code.to_ascii_lowercase())
}
