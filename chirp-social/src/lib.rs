//! Fetch recent social posts and normalize their text.
//!
//! - [`twitter`]: recent search client and the `fetch` pipeline
//! - [`table`]: the tabular result type shared by fetch and clean
//! - [`clean`]: hashtag/URL/mention/emoji stripping and lowercasing
pub mod clean;
pub mod table;
pub mod twitter;

pub use clean::{clean_column, clean_text};
pub use table::{Cell, Table, TableError};
