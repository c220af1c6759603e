use std::path::PathBuf;

use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_file: default_data_file(), static_dir: default_static_dir() }
    }
}

/// Shared teacher secret. Compared as plaintext.
#[derive(Clone, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_admin_password")]
    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self { password: default_admin_password() }
    }
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig").field("password", &"***").finish()
    }
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 3000 }
fn default_data_file() -> PathBuf { PathBuf::from("data/livrets.json") }
fn default_static_dir() -> PathBuf { PathBuf::from("public") }
fn default_admin_password() -> String { "prof2024".into() }

fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

/// Like [`load_from_file`], but a missing file yields the defaults. A file
/// that exists and fails to read or parse is still an error.
pub fn load_or_default(path: &str) -> Result<AppConfig> {
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content).map_err(|e| anyhow!("{path}: {e}")),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(anyhow!("{path}: {e}")),
    }
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Defaults, then `config.toml` if present, then environment overrides.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_or_default(&config_path())?;
        cfg.apply_env(|key| std::env::var(key).ok());
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Overlay values from an environment lookup (`HOST`, `PORT`, `ADMIN_PASSWORD`,
    /// `LIVRET_DATA_FILE`, `LIVRET_STATIC_DIR`, `TOKIO_WORKER_THREADS`).
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // host name or IP literal; resolved at bind time
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT").and_then(|p| p.trim().parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Some(w) = lookup("TOKIO_WORKER_THREADS").and_then(|v| v.trim().parse::<usize>().ok()) {
            self.server.worker_threads = Some(w);
        }
        if let Some(path) = lookup("LIVRET_DATA_FILE") {
            self.storage.data_file = PathBuf::from(path);
        }
        if let Some(dir) = lookup("LIVRET_STATIC_DIR") {
            self.storage.static_dir = PathBuf::from(dir);
        }
        if let Some(pw) = lookup("ADMIN_PASSWORD") {
            self.admin.password = pw;
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        if self.storage.data_file.as_os_str().is_empty() {
            return Err(anyhow!("storage.data_file must not be empty"));
        }
        if self.admin.password.is_empty() {
            return Err(anyhow!("admin.password must not be empty"));
        }
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_documented_values() {
        let mut cfg = AppConfig::default();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.admin.password, "prof2024");
        assert_eq!(cfg.storage.data_file, PathBuf::from("data/livrets.json"));
        assert_eq!(cfg.storage.static_dir, PathBuf::from("public"));
        assert_eq!(cfg.server.worker_threads, Some(4));
    }

    #[test]
    fn env_overrides_port_and_secret() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env_of(&[("PORT", "8088"), ("ADMIN_PASSWORD", "s3cret"), ("LIVRET_DATA_FILE", "/tmp/x.json")]));
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.port, 8088);
        assert_eq!(cfg.admin.password, "s3cret");
        assert_eq!(cfg.storage.data_file, PathBuf::from("/tmp/x.json"));
    }

    #[test]
    fn unparsable_port_keeps_previous_value() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env_of(&[("PORT", "not-a-port")]));
        assert_eq!(cfg.server.port, 3000);
    }

    #[test]
    fn empty_admin_password_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env_of(&[("ADMIN_PASSWORD", "")]));
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn toml_file_fills_missing_sections_with_defaults() -> Result<()> {
        let path = std::env::temp_dir().join(format!("livret_cfg_{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[server]\nport = 4000\n\n[admin]\npassword = \"x\"\n")?;
        let cfg = load_from_file(path.to_str().unwrap())?;
        assert_eq!(cfg.server.port, 4000);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.admin.password, "x");
        assert_eq!(cfg.storage.data_file, PathBuf::from("data/livrets.json"));
        let _ = std::fs::remove_file(&path);
        Ok(())
    }

    #[test]
    fn missing_config_file_yields_defaults() -> Result<()> {
        let path = std::env::temp_dir().join(format!("livret_cfg_missing_{}.toml", uuid::Uuid::new_v4()));
        let cfg = load_or_default(path.to_str().unwrap())?;
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.admin.password, "prof2024");
        Ok(())
    }

    #[test]
    fn malformed_config_file_is_an_error() -> Result<()> {
        let path = std::env::temp_dir().join(format!("livret_cfg_bad_{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[admin]\npassword = \"s3cret\"\n\n[server]\nport = \"oops\"\n")?;
        let res = load_or_default(path.to_str().unwrap());
        let _ = std::fs::remove_file(&path);
        let err = res.expect_err("malformed file must not fall back to defaults");
        assert!(err.to_string().contains("livret_cfg_bad_"));
        Ok(())
    }

    #[test]
    fn admin_debug_hides_password() {
        let dbg = format!("{:?}", AdminConfig::default());
        assert!(!dbg.contains("prof2024"));
    }
}
