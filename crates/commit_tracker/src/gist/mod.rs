//! GitHub Gists: revision history only.

mod client;
mod convert;
mod types;

pub use client::GistFetcher;
pub use convert::{revision_message, revision_record};
pub use types::{GistChangeStatus, GistRevision, GistUser};
