//! Service layer for the livret backend.
//! - Keeps business rules independent of the HTTP framework.
//! - Persists through the `LivretRepository` seam; the default implementation
//!   is a single JSON document on disk.

pub mod errors;
pub mod livret;
pub mod runtime;
pub mod storage;
