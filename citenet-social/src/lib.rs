//! Social network clients and extractors used by Citenet.
//!
//! Only the Twitter/X surface is implemented: embedded-tweet author
//! extraction, typed REST responses, the batch user client, and the
//! rate-limit-aware collectors that flush partial results before cooling
//! down.
pub mod twitter;

pub use twitter::client::TwitterApi;
