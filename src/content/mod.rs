//! Test content handling
//!
//! Content descriptors point at inline text, a local file or a git checkout.
//! The fetcher materializes local content under the data root and the
//! resolver turns the descriptor into the concrete test plan path.

pub mod fetcher;
pub mod resolver;

pub use fetcher::{ContentFetcher, LocalFetcher};
pub use resolver::{ContentResolver, ResolvedRun};
