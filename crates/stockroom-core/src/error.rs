//! # Error Types
//!
//! Domain-specific error types for stockroom-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockroom-core errors (this file)                                     │
//! │  └── CoreError        - Option text that maps to no known variant      │
//! │                                                                         │
//! │  stockroom-feed errors (separate crate)                                │
//! │  └── FeedError        - Config, ingestion, ledger, agent failures      │
//! │                                                                         │
//! │  The aggregators themselves have NO error type: they are total.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Core domain errors.
///
/// Only raised when text coming from outside (config files, screen state)
/// names an option that does not exist. Computations never produce these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Value is not in the allowed set.
    ///
    /// ## When This Occurs
    /// - `report_period = "year"` in the config file
    /// - A stock filter or sort key the inventory screen doesn't offer
    #[error("{field} must be one of: {allowed:?}, got '{value}'")]
    NotAllowed {
        field: String,
        value: String,
        allowed: Vec<String>,
    },
}

impl CoreError {
    /// Builds a [`CoreError::NotAllowed`] from static option names.
    pub fn not_allowed(field: &str, value: &str, allowed: &[&str]) -> Self {
        CoreError::NotAllowed {
            field: field.to_string(),
            value: value.to_string(),
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_allowed_message() {
        let err = CoreError::not_allowed("report_period", "year", &["all", "today"]);
        assert_eq!(
            err.to_string(),
            "report_period must be one of: [\"all\", \"today\"], got 'year'"
        );
    }
}
