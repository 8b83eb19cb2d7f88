//! Twitter/X API integration surface.
//!
//! Submodules provide the HTTP client wrapper, embedded-tweet URL author
//! extraction, the collection loops with their rate-limit cooldown contract,
//! and strongly typed response models.
pub mod client;
pub mod collect;
pub mod extract;
pub mod types;

pub use client::{FollowKind, TwitterApi};
pub use collect::UserCollector;
