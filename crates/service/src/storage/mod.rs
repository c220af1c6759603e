//! Storage abstractions for service layer
//!
//! Reusable file-backed stores for state small enough to live in a single
//! JSON document.

pub mod json_map_store;
