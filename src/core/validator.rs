use serde::Serialize;

use super::password::check_password_input;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

pub struct RegistrationValidator;

impl RegistrationValidator {
    /// Collects every problem with a registration payload. Empty means valid.
    ///
    /// Password strength is not enforced; only bcrypt's input limit is.
    pub fn validate(email: &str, password: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if let Err(message) = validate_email(email) {
            errors.push(ValidationError::new("email", message));
        }

        if let Err(err) = check_password_input(password) {
            errors.push(ValidationError::new("password", &err.to_string()));
        }

        errors
    }
}

/// Pragmatic syntax check: one `@`, sane local part, dotted domain.
/// Says nothing about deliverability.
pub fn validate_email(value: &str) -> Result<(), &'static str> {
    let (local, domain) = match value.split_once('@') {
        Some(parts) => parts,
        None => return Err("Email must contain '@'"),
    };
    if domain.contains('@') {
        return Err("Email must contain exactly one '@'");
    }

    if local.is_empty() || local.len() > 64 {
        return Err("Invalid email local part");
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return Err("Invalid email local part");
    }
    if local.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err("Invalid email local part");
    }

    if domain.is_empty() || domain.len() > 255 {
        return Err("Invalid email domain");
    }
    if !domain.contains('.') {
        return Err("Invalid email domain");
    }
    let labels_ok = domain.split('.').all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_alphanumeric() || c == '-')
    });
    if !labels_ok {
        return Err("Invalid email domain");
    }

    Ok(())
}
