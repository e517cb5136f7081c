//! Service layer providing business-oriented operations on top of models.
//! - Resolves the caller's tenant scope and filters every read and write by it.
//! - Reuses validation and entity definitions in `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod pagination;
pub mod scope;
pub mod auth;
pub mod agency_service;
pub mod agency_point_service;
pub mod user_service;
pub mod travel_service;
pub mod client_service;
pub mod reservation_service;
pub mod stats_service;
pub mod seed;
#[cfg(test)]
pub mod test_support;

/// Trimmed value, or `None` when absent or blank.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
