use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ModelError {
    pub(crate) fn db(e: sea_orm::DbErr) -> Self {
        match unique_violation(&e) {
            Some(detail) => Self::Conflict(detail),
            None => Self::Db(e.to_string()),
        }
    }
}

/// Detail of a unique index violation, if that is what the error is.
pub fn unique_violation(e: &sea_orm::DbErr) -> Option<String> {
    match e.sql_err() {
        Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) => Some(detail),
        _ => None,
    }
}

/// Shared field checks used by several entities.
pub(crate) fn require(value: &str, field: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        return Err(ModelError::Validation(format!("{} required", field)));
    }
    Ok(())
}

pub(crate) fn require_email(value: &str) -> Result<(), ModelError> {
    let v = value.trim();
    match v.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ModelError::Validation("invalid email".into())),
    }
}
