//! # Feed Error Types
//!
//! Error types for the record feed, the dashboard agent and the stock ledger.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Feed Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────────┐  ┌─────────────────────┐ │
//! │  │  Configuration  │  │     Ingestion       │  │      Ledger         │ │
//! │  │                 │  │                     │  │                     │ │
//! │  │  InvalidConfig  │  │  MalformedDocument  │  │  UnknownItem        │ │
//! │  │  ConfigLoad...  │  │  Deserialization... │  │  LedgerRejected     │ │
//! │  │  ConfigSave...  │  │  Serialization...   │  │                     │ │
//! │  └─────────────────┘  └─────────────────────┘  └─────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐                                                   │
//! │  │     Agent       │                                                   │
//! │  │                 │                                                   │
//! │  │  ShuttingDown   │                                                   │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The aggregators in stockroom-core never fail, so nothing here describes a
//! metrics error: a bad document is skipped at ingestion and the dashboard is
//! still computed from the rest.

use thiserror::Error;

/// Result type alias for feed operations.
pub type FeedResult<T> = Result<T, FeedError>;

/// Feed error type covering every fallible operation in this crate.
#[derive(Debug, Error)]
pub enum FeedError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid feed configuration.
    #[error("Invalid feed configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Ingestion Errors
    // =========================================================================
    /// A document could not be turned into a record at all.
    #[error("Malformed {collection} document: {reason}")]
    MalformedDocument { collection: String, reason: String },

    /// Failed to parse a JSON snapshot.
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Failed to render JSON output.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    // =========================================================================
    // Ledger Errors
    // =========================================================================
    /// The ledger has no item with this id.
    #[error("Unknown inventory item: {0}")]
    UnknownItem(String),

    /// The remote store refused the stock increment.
    #[error("Stock update rejected for {item_id}: {reason}")]
    LedgerRejected { item_id: String, reason: String },

    // =========================================================================
    // Agent Errors
    // =========================================================================
    /// Dashboard agent is shutting down.
    #[error("Dashboard agent is shutting down")]
    ShuttingDown,
}

impl FeedError {
    /// Shorthand for [`FeedError::MalformedDocument`].
    pub fn malformed(collection: &str, reason: impl Into<String>) -> Self {
        FeedError::MalformedDocument {
            collection: collection.to_string(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            FeedError::DeserializationFailed(err.to_string())
        } else {
            FeedError::SerializationFailed(err.to_string())
        }
    }
}

impl From<std::io::Error> for FeedError {
    fn from(err: std::io::Error) -> Self {
        FeedError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for FeedError {
    fn from(err: toml::de::Error) -> Self {
        FeedError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for FeedError {
    fn from(err: toml::ser::Error) -> Self {
        FeedError::ConfigSaveFailed(err.to_string())
    }
}

impl From<stockroom_core::CoreError> for FeedError {
    fn from(err: stockroom_core::CoreError) -> Self {
        FeedError::InvalidConfig(err.to_string())
    }
}

// =============================================================================
// Error Categorization (for retry logic)
// =============================================================================

impl FeedError {
    /// Returns true if the operation may succeed when tried again.
    ///
    /// Only a rejected ledger write qualifies: the remote store can refuse an
    /// increment transiently. Everything else is deterministic.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FeedError::LedgerRejected { .. })
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            FeedError::InvalidConfig(_)
                | FeedError::ConfigLoadFailed(_)
                | FeedError::ConfigSaveFailed(_)
        )
    }
}
