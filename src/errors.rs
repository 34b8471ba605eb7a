//! Unified error type for `PocketLedger`.
//!
//! Every fallible operation in the crate returns [`Result`]. The web layer maps these
//! variants to HTTP statuses in [`crate::web::error`].

use thiserror::Error;

/// All errors produced by the accessors, aggregators, identity boundary and startup code.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or is inconsistent
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description
        message: String,
    },

    /// User input was rejected before any store call was made
    #[error("{message}")]
    Validation {
        /// Name of the offending field
        field: &'static str,
        /// Message shown to the user
        message: String,
    },

    /// No category with this id exists for the calling owner
    #[error("Category not found: {id}")]
    CategoryNotFound {
        /// Requested category id
        id: i64,
    },

    /// No transaction with this id exists for the calling owner
    #[error("Transaction not found: {id}")]
    TransactionNotFound {
        /// Requested transaction id
        id: i64,
    },

    /// No identity could be resolved where one is required
    #[error("User not authenticated")]
    Unauthenticated,

    /// The identity provider failed or answered unexpectedly
    #[error("Identity provider error: {message}")]
    Identity {
        /// Human-readable description
        message: String,
    },

    /// Money arithmetic left the representable range
    #[error("Arithmetic overflow while computing {context}")]
    Overflow {
        /// What was being computed
        context: &'static str,
    },

    /// The data store rejected or failed a read/write
    #[error("{0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O failure (config file, socket bind)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Required environment variable missing or not unicode
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Builds a [`Error::Validation`] for `field`.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Self::Identity {
            message: value.to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
