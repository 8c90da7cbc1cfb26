use crate::error::ApiError;

/// Validate a username at signup/creation: 3-30 characters, letters, digits,
/// underscores.
pub fn validate_username(username: &str) -> Result<(), ApiError> {
    if username.len() < 3 || username.len() > 30 {
        return Err(ApiError::Validation(
            "Username must be between 3 and 30 characters".to_string(),
        ));
    }

    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ApiError::Validation(
            "Username may only contain letters, digits and underscores".to_string(),
        ));
    }

    Ok(())
}

/// Validate a password at signup/creation.
pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < 6 {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }

    Ok(())
}
