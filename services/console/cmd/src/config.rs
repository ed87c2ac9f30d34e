//! Configuration handling for the relay binary.
//!
//! Reads the YAML configuration file into the console settings and the
//! relay's static configuration plus initial toggle values, then applies
//! environment variable overrides. A missing or unparsable file falls back
//! to defaults with a warning.

use anyhow::Result;
use console_session::{ConsoleConfig, CONSOLE_DEFAULT_IP, CONSOLE_DEFAULT_PORT};
use console_state::{RuntimeFlags, StaticConfig};
use serde::Deserialize;
use std::net::IpAddr;
use std::path::Path;
use tracing::{info, warn};

/// Root configuration file structure.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Admin console settings
    pub console: ConsoleSection,
    /// Static relay settings
    pub relay: StaticConfig,
    /// Initial values for the runtime-toggleable flags
    pub toggles: RuntimeFlags,
}

/// The `console:` section of the configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConsoleSection {
    /// Listener bind address
    pub ip: Option<IpAddr>,
    /// Listener port
    pub port: Option<u16>,
    /// Shared secret; empty or absent disables authentication
    pub password: Option<String>,
    /// Chatty connect/disconnect logging
    pub verbose: bool,
}

impl FileConfig {
    /// Load configuration from file and environment variables.
    pub fn load_from_file<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let mut config = Self::default();

        match std::fs::read_to_string(&config_path) {
            Ok(content) => match serde_yaml::from_str::<FileConfig>(&content) {
                Ok(parsed) => {
                    config = parsed;
                    info!("Loaded configuration from {:?}", config_path.as_ref());
                }
                Err(e) => {
                    warn!(
                        "Failed to parse config file {:?} ({}), using defaults",
                        config_path.as_ref(),
                        e
                    );
                }
            },
            Err(_) => {
                warn!(
                    "Config file {:?} not found, using defaults",
                    config_path.as_ref()
                );
            }
        }

        config.apply_environment_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the console section.
    fn apply_environment_overrides(&mut self) {
        if let Ok(port) = std::env::var("CONSOLE_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.console.port = Some(port);
                info!("Console port overridden by environment: {}", port);
            }
        }

        if let Ok(password) = std::env::var("CONSOLE_PASSWORD") {
            self.console.password = Some(password);
            info!("Console password overridden by environment");
        }
    }

    /// Fold the console section into a [`ConsoleConfig`], applying
    /// command-line overrides last.
    pub fn console_config(
        &self,
        cli_ip: Option<IpAddr>,
        cli_port: Option<u16>,
        cli_password: Option<String>,
    ) -> ConsoleConfig {
        ConsoleConfig {
            bind_ip: cli_ip.or(self.console.ip).unwrap_or(CONSOLE_DEFAULT_IP),
            port: cli_port.or(self.console.port).unwrap_or(CONSOLE_DEFAULT_PORT),
            password: cli_password.or_else(|| self.console.password.clone()),
            verbose: self.console.verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        let console = config.console_config(None, None, None);
        assert_eq!(console.bind_ip, CONSOLE_DEFAULT_IP);
        assert_eq!(console.port, CONSOLE_DEFAULT_PORT);
        assert_eq!(console.password, None);
    }

    #[test]
    fn test_load_from_file() {
        let yaml_content = r#"
console:
  port: 5999
  password: "secret"
  verbose: true

relay:
  listener_port: 3479
  realm: example.org
  relay_addrs:
    - 10.0.0.1
    - 10.0.0.2

toggles:
  stale_nonce: true
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml_content.as_bytes()).unwrap();

        let config = FileConfig::load_from_file(temp_file.path()).unwrap();
        let console = config.console_config(None, None, None);

        assert_eq!(console.port, 5999);
        assert_eq!(console.password.as_deref(), Some("secret"));
        assert!(console.verbose);
        assert_eq!(config.relay.listener_port, 3479);
        assert_eq!(config.relay.realm.as_deref(), Some("example.org"));
        assert_eq!(config.relay.relay_addrs.len(), 2);
        assert_eq!(config.toggles.get("stale-nonce"), Some(true));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = FileConfig::load_from_file("/nonexistent/config.yaml").unwrap();
        assert_eq!(config.relay.listener_port, 3478);
    }

    #[test]
    fn test_cli_overrides_win() {
        let yaml_content = "console:\n  port: 5999\n";
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml_content.as_bytes()).unwrap();

        let config = FileConfig::load_from_file(temp_file.path()).unwrap();
        let console = config.console_config(None, Some(6000), Some("cli-secret".into()));
        assert_eq!(console.port, 6000);
        assert_eq!(console.password.as_deref(), Some("cli-secret"));
    }
}
