//! Twitter/X recent search: HTTP client wrapper and response models.
pub mod client;
pub mod types;

pub use client::{FetchOptions, SearchError, TEXT_COLUMN, TwitterApi};
