//! Configuration Loader
//!
//! Environment-aware configuration loading. Handles config file discovery,
//! environment detection and layering through the `config` crate.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use super::error::ConfigResult;
use super::DispatchConfig;
use crate::messaging::redis_channel::redact_url;

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "TASKER_DISPATCH_CONFIG";

/// Prefix of environment variable overrides, e.g. `TASKER_DISPATCH__REDIS__URL`
pub const ENV_OVERRIDE_PREFIX: &str = "TASKER_DISPATCH";

const DEFAULT_CONFIG_PATH: &str = "config/tasker-dispatch.toml";

/// Loaded, validated configuration and where it came from
#[derive(Debug)]
pub struct ConfigManager {
    config: DispatchConfig,
    environment: String,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment and file auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        let path = env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from_path_with_env(&path, &Self::detect_environment())
    }

    /// Load configuration from a specific file with an explicit environment
    ///
    /// Useful for tests that should not depend on process-wide variables. The
    /// file and its `<stem>.<environment>.toml` sibling are both optional.
    pub fn load_from_path_with_env(
        path: &Path,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        debug!(
            path = %path.display(),
            environment = environment,
            "Loading configuration"
        );

        let defaults = DispatchConfig {
            environment: environment.to_string(),
            ..DispatchConfig::default()
        };

        let config: DispatchConfig = ::config::Config::builder()
            .add_source(::config::Config::try_from(&defaults)?)
            .add_source(::config::File::from(path.to_path_buf()).required(false))
            .add_source(
                ::config::File::from(Self::environment_override_path(path, environment))
                    .required(false),
            )
            .add_source(
                ::config::Environment::with_prefix(ENV_OVERRIDE_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;

        info!(
            environment = %config.environment,
            redis_url = %redact_url(&config.redis.url),
            database_url = %redact_url(&config.database.url),
            bind_address = %config.web.bind_address,
            start_time_grace_ms = config.orchestration.start_time_grace_ms,
            "Configuration loaded successfully"
        );

        Ok(Arc::new(ConfigManager {
            environment: config.environment.clone(),
            config,
            config_path: path.to_path_buf(),
        }))
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Current environment from the usual variables, defaulting to development
    pub fn detect_environment() -> String {
        env::var("TASKER_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
    }

    /// `config/tasker-dispatch.toml` + `test` -> `config/tasker-dispatch.test.toml`
    fn environment_override_path(path: &Path, environment: &str) -> PathBuf {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "tasker-dispatch".to_string());
        path.with_file_name(format!("{stem}.{environment}.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager =
            ConfigManager::load_from_path_with_env(&dir.path().join("absent.toml"), "test")
                .unwrap();

        assert_eq!(manager.environment(), "test");
        assert_eq!(manager.config().orchestration.start_time_grace_ms, 5000);
    }

    #[test]
    fn test_file_and_environment_override_layering() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("tasker-dispatch.toml");
        fs::write(
            &base,
            "[redis]\nurl = \"redis://base:6379\"\n\n[streaming]\noutput_buffer = 8\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("tasker-dispatch.test.toml"),
            "[redis]\nurl = \"redis://test-override:6379\"\n",
        )
        .unwrap();

        let manager = ConfigManager::load_from_path_with_env(&base, "test").unwrap();

        assert_eq!(manager.config_path(), base.as_path());
        assert_eq!(manager.config().redis.url, "redis://test-override:6379");
        assert_eq!(manager.config().streaming.output_buffer, 8);
        assert_eq!(manager.config().database.max_connections, 10);
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("tasker-dispatch.toml");
        fs::write(&base, "[database]\nmax_connections = 0\n").unwrap();

        assert!(ConfigManager::load_from_path_with_env(&base, "test").is_err());
    }

    #[test]
    fn test_environment_override_path() {
        let path = ConfigManager::environment_override_path(
            Path::new("config/tasker-dispatch.toml"),
            "production",
        );
        assert_eq!(path, PathBuf::from("config/tasker-dispatch.production.toml"));
    }
}
