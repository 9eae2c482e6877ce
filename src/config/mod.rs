mod defaults;
mod types;

pub use types::*;

use crate::error::ConfigError;
use defaults::*;
use std::path::Path;

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            service: ServiceConfig::default(),
            poll: PollConfig::default(),
            handle_retry: default_handle_retry(),
            result_retry: default_result_retry(),
            worker_cap: default_worker_cap(),
            launch_delay_ms: default_launch_delay_ms(),
            deadline_sec: default_deadline_sec(),
            personas: PersonaConfig::default(),
            budget: BudgetConfig::default(),
            report_dir: default_report_dir(),
        }
    }
}

impl Config {
    /// Load config from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load from a YAML file if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll.backoff_ms.is_empty() {
            return Err(ConfigError::EmptyBackoffSchedule("poll.backoff_ms"));
        }
        if self.handle_retry.backoff_ms.is_empty() {
            return Err(ConfigError::EmptyBackoffSchedule("handle_retry.backoff_ms"));
        }
        if self.result_retry.backoff_ms.is_empty() {
            return Err(ConfigError::EmptyBackoffSchedule("result_retry.backoff_ms"));
        }
        if self.worker_cap == 0 {
            return Err(ConfigError::ZeroWorkerCap);
        }
        if self.service.concurrency_limit == 0 {
            return Err(ConfigError::ZeroConcurrencyLimit);
        }
        Ok(())
    }

    /// Human-facing URL for a remote session, from the configured template.
    pub fn session_url(&self, session_id: &str) -> String {
        self.service.session_url_template.replace("{id}", session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_poll_schedule_rejected() {
        let mut config = Config::default();
        config.poll.backoff_ms.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyBackoffSchedule("poll.backoff_ms"))
        ));
    }

    #[test]
    fn zero_worker_cap_rejected() {
        let mut config = Config::default();
        config.worker_cap = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroWorkerCap)));
    }

    #[test]
    fn session_url_substitutes_id() {
        let config = Config::default();
        assert_eq!(
            config.session_url("abc-123"),
            "https://finchat.adgo.dev/?session_id=abc-123"
        );
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let yaml = "worker_cap: 5\npoll:\n  backoff_ms: [1000]\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.worker_cap, 5);
        assert_eq!(config.poll.backoff_ms, vec![1000]);
        assert_eq!(config.handle_retry.max_attempts, 5);
        assert_eq!(config.personas.initial, "EB White");
    }
}
