//! Request validation from catalog rules.

use serde_json::Value;

use crate::error::AppError;
use crate::repository::Record;
use crate::schema::value::{coerce, is_blank};
use crate::schema::{ColumnInfo, FieldKind, Format, ResolvedEntity};

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a create body. Required columns must be present and non-zero.
    pub fn validate(entity: &ResolvedEntity, body: &Record) -> Result<(), AppError> {
        for col in entity.input_columns() {
            let val = body.get(col.name);
            if col.rule.required && col.kind != FieldKind::Bool && is_blank(col.kind, val) {
                return Err(AppError::InvalidInput(format!("{} is required", col.name)));
            }
            if let Some(v) = val {
                validate_field(col, v)?;
            }
        }
        Ok(())
    }

    /// Validate only the writable fields present in body (for updates). Required is not enforced.
    pub fn validate_partial(entity: &ResolvedEntity, body: &Record) -> Result<(), AppError> {
        for col in entity.writable_columns() {
            if let Some(v) = body.get(col.name) {
                validate_field(col, v)?;
            }
        }
        Ok(())
    }
}

fn validate_field(col: &ColumnInfo, v: &Value) -> Result<(), AppError> {
    coerce(col, v)?;
    let Some(s) = v.as_str().filter(|s| !s.is_empty() && col.kind == FieldKind::Text) else {
        return Ok(());
    };
    if let Some(max) = col.rule.max_length {
        if s.chars().count() > max {
            return Err(AppError::InvalidInput(format!(
                "{} must be at most {} characters",
                col.name, max
            )));
        }
    }
    if let Some(format) = col.rule.format {
        validate_format(col.name, s, format)?;
    }
    if let Some(re) = &col.pattern {
        if !re.is_match(s) {
            return Err(AppError::InvalidInput(format!("{} does not match required pattern", col.name)));
        }
    }
    Ok(())
}

fn validate_format(col: &str, s: &str, format: Format) -> Result<(), AppError> {
    let ok = match format {
        Format::Email => is_email(s),
        Format::Uuid => uuid::Uuid::parse_str(s).is_ok(),
        Format::Url => is_url(s),
    };
    if ok {
        return Ok(());
    }
    let what = match format {
        Format::Email => "email",
        Format::Uuid => "UUID",
        Format::Url => "URL",
    };
    Err(AppError::InvalidInput(format!("{} must be a valid {}", col, what)))
}

fn is_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !s.chars().any(char::is_whitespace)
}

fn is_url(s: &str) -> bool {
    match url::Url::parse(s) {
        Ok(u) => matches!(u.scheme(), "http" | "https") && u.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}
