//! Shared validation helpers for inbound payloads.
//!
//! Field rules are declared with `validator` derives on the payload types;
//! this module holds the custom rules and flattens `ValidationErrors` into
//! an itemized list of field errors.

use std::borrow::Cow;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use super::money;
use crate::config::is_valid_role;
use crate::errors::{AppError, AppResult, FieldError};

/// Money amount strictly greater than zero and storable.
pub fn positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if !(value.is_sign_positive() && !value.is_zero()) {
        return Err(invalid("positive_amount", "Price must be greater than 0"));
    }
    storable_amount(value)
}

/// Money amount zero or greater and storable.
pub fn non_negative_amount(value: &Decimal) -> Result<(), ValidationError> {
    if !(value.is_zero() || value.is_sign_positive()) {
        return Err(invalid("non_negative_amount", "Amount must not be negative"));
    }
    storable_amount(value)
}

fn storable_amount(value: &Decimal) -> Result<(), ValidationError> {
    if money::in_range(value) {
        Ok(())
    } else {
        Err(invalid("max_amount", "Amount must not exceed 99999999.99"))
    }
}

/// Role name accepted at registration.
pub fn known_role(role: &str) -> Result<(), ValidationError> {
    if is_valid_role(role) {
        Ok(())
    } else {
        Err(invalid("known_role", "Role must be either buyer or admin"))
    }
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Treat `""` (and whitespace) as an absent optional string.
pub fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Run derive-based validation and convert failures to `AppError::InvalidFields`.
pub fn validate<T: Validate>(value: &T) -> AppResult<()> {
    value
        .validate()
        .map_err(|e| AppError::InvalidFields(field_errors(&e)))
}

/// Flatten nested validation errors into `field` / `items[0].price` style paths.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    collect(errors, "", &mut out);
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let name = camel_case(field);
        let path = if prefix.is_empty() {
            name
        } else {
            format!("{}.{}", prefix, name)
        };

        match kind {
            ValidationErrorsKind::Field(errs) => {
                out.extend(errs.iter().map(|e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", path));
                    FieldError::new(path.clone(), message)
                }));
            }
            ValidationErrorsKind::Struct(nested) => collect(nested, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect(nested, &format!("{}[{}]", path, index), out);
                }
            }
        }
    }
}

/// Error keys come from Rust field names; clients see camelCase JSON.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
