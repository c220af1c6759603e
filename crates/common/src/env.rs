//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::warn;

/// Ensure the data directory exists; warn when the static assets directory is missing.
pub async fn ensure_env(static_dir: &Path, data_dir: &Path) -> anyhow::Result<()> {
    if tokio::fs::metadata(static_dir).await.is_err() {
        warn!(static_dir = %static_dir.display(), "static assets directory not found; front-end will 404");
    }
    if data_dir.as_os_str().is_empty() {
        return Ok(());
    }
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", data_dir.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ensure_env_creates_data_dir() -> anyhow::Result<()> {
        let root = std::env::temp_dir().join(format!("livret_env_{}", std::process::id()));
        let data = root.join("nested").join("data");
        ensure_env(&root.join("missing-public"), &data).await?;
        assert!(tokio::fs::metadata(&data).await?.is_dir());
        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }
}
