use crate::client::FASTMAIL_SESSION_URL;
use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const TOKEN_ENV: &str = "MASKMAIL_API_TOKEN";
pub const TIMEOUT_ENV: &str = "MASKMAIL_TIMEOUT";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// API token with the masked email scope
    #[serde(default)]
    pub token: Option<String>,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// JMAP session discovery URL
    #[serde(default = "default_session_url")]
    pub session_url: String,
}

/// Values given on the command line. They win over both the environment and
/// the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub token: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Overrides {
    /// Nothing from the config file would be used
    fn is_complete(&self) -> bool {
        self.token.is_some() && self.timeout_secs.is_some()
    }
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_session_url() -> String {
    FASTMAIL_SESSION_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: None,
            timeout_secs: default_timeout_secs(),
            session_url: default_session_url(),
        }
    }
}

impl Config {
    /// Effective configuration: file, then environment, then `overrides`
    pub fn load(overrides: &Overrides) -> Result<Self> {
        let path = Self::config_path()?;
        Self::resolve(&path, |key| std::env::var(key).ok(), overrides)
    }

    /// Layer the environment and `overrides` on top of the file at `path`
    ///
    /// An unreadable file is only fatal when it still has something to
    /// contribute.
    pub fn resolve<F>(path: &Path, var: F, overrides: &Overrides) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match Self::load_from(path) {
            Ok(config) => config,
            Err(err) if overrides.is_complete() => {
                tracing::warn!(error = %format!("{:#}", err), "ignoring config file");
                Self::default()
            }
            Err(err) => return Err(err),
        };

        config.apply_env(var, overrides)?;

        if let Some(token) = &overrides.token {
            config.token = Some(token.clone());
        }
        if let Some(timeout) = overrides.timeout_secs {
            config.timeout_secs = timeout;
        }
        Ok(config)
    }

    /// Read a config file; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Couldn't read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Allow token and timeout to be overridden by environment variables.
    /// Variables shadowed by `overrides` are not read.
    fn apply_env<F>(&mut self, var: F, overrides: &Overrides) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if overrides.token.is_none() {
            if let Some(token) = var(TOKEN_ENV).filter(|t| !t.is_empty()) {
                self.token = Some(token);
            }
        }

        if overrides.timeout_secs.is_none() {
            if let Some(timeout) = var(TIMEOUT_ENV) {
                self.timeout_secs = timeout.parse().with_context(|| {
                    format!("{} must be a whole number of seconds", TIMEOUT_ENV)
                })?;
            }
        }

        Ok(())
    }

    /// Store `token` in the config file, keeping the other stored values
    pub fn save_token(token: &str) -> Result<()> {
        let config_path = Self::config_path()?;
        if let Some(dir) = config_path.parent() {
            fs::create_dir_all(dir)?;
        }
        Self::save_token_to(&config_path, token)
    }

    pub fn save_token_to(path: &Path, token: &str) -> Result<()> {
        let mut stored = Self::load_from(path)?;
        stored.token = Some(token.to_string());
        stored.save_to(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;

        // Set permissions to 600 (owner read/write only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let base_dirs =
            BaseDirs::new().ok_or_else(|| anyhow!("Cannot determine config directory"))?;
        Ok(base_dirs.config_dir().join("maskmail").join("config.toml"))
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
