//! Password and email checks run before calling the provider.

use crate::AuthError;

/// Local password rules.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    /// Require upper case, lower case and a digit.
    pub require_mixed: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_mixed: true,
        }
    }
}

impl PasswordPolicy {
    /// Validate password strength.
    pub fn validate(&self, password: &str) -> Result<(), AuthError> {
        if password.chars().count() < self.min_length {
            return Err(AuthError::WeakPassword(format!(
                "Password must be at least {} characters",
                self.min_length
            )));
        }

        if self.require_mixed {
            let has_upper = password.chars().any(|c| c.is_uppercase());
            let has_lower = password.chars().any(|c| c.is_lowercase());
            let has_digit = password.chars().any(|c| c.is_ascii_digit());

            if !has_upper || !has_lower || !has_digit {
                return Err(AuthError::WeakPassword(
                    "Password must contain uppercase, lowercase, and numbers".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Validate a new password typed twice.
    pub fn validate_new(&self, password: &str, confirmation: &str) -> Result<(), AuthError> {
        if password != confirmation {
            return Err(AuthError::PasswordMismatch);
        }
        self.validate(password)
    }
}

/// Trim and check the shape of an email address.
pub fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(email)
    } else {
        Err(AuthError::InvalidEmail(email))
    }
}
