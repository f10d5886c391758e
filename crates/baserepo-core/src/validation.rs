//! Validation helpers bridging `validator` and [`BaseRepoError`].

use crate::BaseRepoError;
use validator::{Validate, ValidationErrors};

/// Extension trait for validation.
pub trait ValidateExt: Validate {
    /// Validates the struct and returns an `InvalidArgument` error on failure.
    fn validate_request(&self) -> Result<(), BaseRepoError> {
        self.validate().map_err(validation_errors_to_error)
    }
}

impl<T: Validate> ValidateExt for T {}

/// Flattens `validator::ValidationErrors` into one `InvalidArgument` message.
///
/// Fields are listed alphabetically so the message is stable.
#[must_use]
pub fn validation_errors_to_error(errors: ValidationErrors) -> BaseRepoError {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let message = fields
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                let detail = error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string);
                format!("{field}: {detail}")
            })
        })
        .collect::<Vec<_>>()
        .join("; ");

    BaseRepoError::InvalidArgument(message)
}

/// Common validation rules.
pub mod rules {
    use validator::ValidationError;

    /// Validates that a resource key is a non-blank token of letters, digits,
    /// `-` or `_`.
    pub fn resource_key(key: &str) -> Result<(), ValidationError> {
        if key.trim().is_empty() {
            return Err(ValidationError::new("resource_key_blank"));
        }
        if !key
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ValidationError::new("resource_key_invalid_characters"));
        }
        Ok(())
    }

    /// Validates that a base URL is absolute and can carry path segments.
    pub fn absolute_url(value: &str) -> Result<(), ValidationError> {
        let url = url::Url::parse(value).map_err(|_| ValidationError::new("url_not_absolute"))?;
        if url.cannot_be_a_base() {
            return Err(ValidationError::new("url_cannot_be_base"));
        }
        Ok(())
    }
}
