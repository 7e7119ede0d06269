//! Configuration Management
//!
//! Named connection profiles stored as JSON under the user config directory.

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable consulted when a profile carries no password
pub const PASSWORD_ENV: &str = "ONTAP_REST_PASSWORD";

fn default_validate_certs() -> bool {
    true
}

/// One cluster connection
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionProfile {
    pub name: String,
    /// Management hostname or IP; may include a scheme and port
    pub hostname: String,
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_validate_certs")]
    pub validate_certs: bool,
}

impl fmt::Debug for ConnectionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionProfile")
            .field("name", &self.name)
            .field("hostname", &self.hostname)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("validate_certs", &self.validate_certs)
            .finish()
    }
}

impl ConnectionProfile {
    /// REST root: `https://<hostname>/api`, or the given scheme when present
    pub fn api_base(&self) -> Result<Url> {
        let hostname = self.hostname.trim().trim_end_matches('/');
        if hostname.is_empty() {
            bail!("profile '{}' has no hostname", self.name);
        }

        let raw = if hostname.contains("://") {
            hostname.to_string()
        } else {
            format!("https://{}", hostname)
        };

        let mut url = Url::parse(&raw)
            .with_context(|| format!("invalid hostname for profile '{}'", self.name))?;
        let trimmed = url.path().trim_end_matches('/').to_string();
        let path = if trimmed.ends_with("/api") {
            trimmed
        } else {
            format!("{}/api", trimmed)
        };
        url.set_path(&path);
        Ok(url)
    }

    /// Profile password, falling back to the environment
    pub fn resolve_password(&self) -> Result<String> {
        self.password
            .clone()
            .or_else(|| std::env::var(PASSWORD_ENV).ok())
            .ok_or_else(|| {
                anyhow!(
                    "no password for profile '{}'; set it in the config or {}",
                    self.name,
                    PASSWORD_ENV
                )
            })
    }
}

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub default_profile: Option<String>,
    #[serde(default)]
    pub profiles: Vec<ConnectionProfile>,
}

impl Config {
    /// Get the config file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ontap-rest").join("config.json"))
    }

    /// Load configuration from the default location; a missing file is an
    /// empty config
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(content)?;
        for (idx, profile) in config.profiles.iter().enumerate() {
            if config.profiles[..idx].iter().any(|p| p.name == profile.name) {
                bail!("duplicate profile name '{}'", profile.name);
            }
        }
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Pick a profile: explicit name > configured default > the only profile
    pub fn profile(&self, name: Option<&str>) -> Result<&ConnectionProfile> {
        let wanted = name.or(self.default_profile.as_deref());

        match wanted {
            Some(wanted) => self
                .profiles
                .iter()
                .find(|p| p.name == wanted)
                .ok_or_else(|| anyhow!("connection profile '{}' not found", wanted)),
            None => match self.profiles.as_slice() {
                [only] => Ok(only),
                [] => bail!("no connection profiles configured"),
                _ => bail!("several connection profiles configured; pick one with --profile"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "default_profile": "lab",
        "profiles": [
            {"name": "lab", "hostname": "10.193.78.222", "username": "admin", "password": "netapp1!"},
            {"name": "dev", "hostname": "http://127.0.0.1:8080", "username": "admin", "validate_certs": false}
        ]
    }"#;

    #[test]
    fn test_parse_and_default_profile() {
        let config = Config::parse(SAMPLE).unwrap();
        let lab = config.profile(None).unwrap();
        assert_eq!(lab.name, "lab");
        assert!(lab.validate_certs);
        assert_eq!(lab.api_base().unwrap().as_str(), "https://10.193.78.222/api");
    }

    #[test]
    fn test_explicit_profile_with_scheme() {
        let config = Config::parse(SAMPLE).unwrap();
        let dev = config.profile(Some("dev")).unwrap();
        assert!(!dev.validate_certs);
        assert_eq!(dev.api_base().unwrap().as_str(), "http://127.0.0.1:8080/api");
        assert!(config.profile(Some("prod")).is_err());
    }

    #[test]
    fn test_api_suffix_not_doubled() {
        let profile = ConnectionProfile {
            name: "p".into(),
            hostname: "https://cluster.example.com/api/".into(),
            username: "admin".into(),
            password: None,
            validate_certs: true,
        };
        assert_eq!(profile.api_base().unwrap().as_str(), "https://cluster.example.com/api");
    }

    #[test]
    fn test_sole_profile_is_used() {
        let config = Config::parse(
            r#"{"profiles": [{"name": "only", "hostname": "h", "username": "u"}]}"#,
        )
        .unwrap();
        assert_eq!(config.profile(None).unwrap().name, "only");
        assert!(Config::default().profile(None).is_err());
    }

    #[test]
    fn test_duplicate_profiles_rejected() {
        let content = r#"{"profiles": [
            {"name": "a", "hostname": "h", "username": "u"},
            {"name": "a", "hostname": "h2", "username": "u"}
        ]}"#;
        assert!(Config::parse(content).is_err());
    }

    #[test]
    fn test_debug_masks_password() {
        let config = Config::parse(SAMPLE).unwrap();
        let rendered = format!("{:?}", config.profile(Some("lab")).unwrap());
        assert!(!rendered.contains("netapp1!"));
        assert!(rendered.contains("***"));
    }
}
