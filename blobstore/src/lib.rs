//! Content-addressable artifact store.
//!
//! Uploads are bounded, addressed by the SHA-256 of their bytes and stored
//! at most once per distinct content, whatever the number of concurrent
//! submitters. Retrieval returns the stored bytes and mimetype verbatim.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod storage;
pub mod utils;
