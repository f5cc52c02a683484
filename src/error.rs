//! Error types for bullion_rs
//!
//! This module defines domain-specific error types that provide clear,
//! actionable error messages to users.

use thiserror::Error;

/// Validation errors for candidate wallet entries.
///
/// These errors are shown directly to users and should be clear and actionable.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Metal is required")]
    MetalRequired,

    #[error("Invalid weight: {0}")]
    InvalidWeight(f64),

    #[error("Weight must be positive, got {0}")]
    NonPositiveWeight(f64),

    #[error("Quantity must be positive, got {0}")]
    NonPositiveQuantity(u32),

    #[error("Invalid buy price: {0}")]
    InvalidBuyPrice(f64),

    #[error("Buy price cannot be negative, got {0}")]
    NegativeBuyPrice(f64),
}

/// Errors raised at the holdings store boundary.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Invalid entry: {0}")]
    InvalidEntry(#[from] ValidationError),

    #[error("Invalid index: {0}")]
    InvalidIndex(usize),

    #[error("Error reading wallet file: {0}")]
    Read(#[source] std::io::Error),

    #[error("Error writing wallet file: {0}")]
    Write(#[source] std::io::Error),
}

/// Failures inside the spot price resolver. These never escape
/// `resolve_spot_prices`; they only decide which fallback tier answers.
#[derive(Debug, Error)]
pub enum SpotError {
    #[error("Quote request for {metal} failed: {source}")]
    Request {
        metal: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Quote response for {metal} not ok (status {status})")]
    Status { metal: String, status: u16 },

    #[error("No remote quote source for {0}")]
    Unquoted(String),

    #[error("Spot cache error: {0}")]
    Cache(String),
}
