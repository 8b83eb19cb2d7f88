//! Common types and utilities shared across Citenet crates.
//!
//! This crate defines the domain vocabulary of the study — credibility
//! labels, bias ratings, cached Twitter user profiles — together with the
//! loaders for the two external tables every run consumes, the shared error
//! type, and the centralised tracing initialisation. It is intentionally
//! lightweight so that every other crate can depend on it without pulling in
//! HTTP or database machinery.
//!
//! # Overview
//!
//! - [`labels`]: source credibility/bias table ([`Credibility`],
//!   [`SourceLabel`], [`load_label_table`])
//! - [`profiles`]: cached user profile table ([`UserProfile`],
//!   [`ProfileTable`])
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`CitenetError`] and [`Result`]: shared error handling
//!
//! # Examples
//!
//! ```rust
//! use citenet_common::labels::Credibility;
//!
//! assert_eq!(Credibility::from_code(0), Credibility::Reliable);
//! assert_eq!(Credibility::from_code(1), Credibility::Unreliable);
//! assert_eq!(Credibility::from_code(7), Credibility::Unlabeled);
//! ```

pub mod labels;
pub mod observability;
pub mod profiles;

pub use labels::{load_label_table, Credibility, LabelTable, SourceLabel};
pub use profiles::{ProfileTable, PublicMetrics, UserProfile};

/// Error types used across the Citenet workspace.
#[derive(thiserror::Error, Debug)]
pub enum CitenetError {
    /// The label table could not be read or parsed.
    #[error("label table error: {0}")]
    Labels(#[from] csv::Error),

    /// The cached profile table could not be parsed.
    #[error("profile table error: {0}")]
    Profiles(#[from] serde_json::Error),

    /// Underlying filesystem failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenient alias for results that use [`CitenetError`].
pub type Result<T> = std::result::Result<T, CitenetError>;
