//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` to keep binary crates importing
//! `service::runtime::ensure_env` without depending directly on `common`.

use std::path::Path;

/// Ensure the data directory exists; warn on a missing static directory.
pub async fn ensure_env(static_dir: &Path, data_file: &Path) -> anyhow::Result<()> {
    let data_dir = data_file.parent().unwrap_or_else(|| Path::new(""));
    common::env::ensure_env(static_dir, data_dir).await
}
