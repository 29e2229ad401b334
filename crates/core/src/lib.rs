//! Functional core for quill.
//!
//! Pure types, traits and functions shared by the storage backends and the
//! HTTP shell. Nothing in this crate performs network or disk I/O.

pub mod blog;
pub mod provider;
pub mod storage;
