//! Configuration management for Harness-Oxide

use crate::{Error, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable prefix shared by every setting
const ENV_PREFIX: &str = "HARNESS";

/// Harness configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Browser used when a run does not name one
    pub default_browser: String,

    /// Launch browsers without a visible window
    pub headless: bool,

    /// Default element wait in seconds
    pub implicit_wait: f64,

    /// Default page load wait in seconds
    pub page_load_timeout: f64,

    /// Directory screenshots are written to
    pub screenshot_dir: PathBuf,

    /// Capture a screenshot when a test fails
    #[serde(alias = "screenshot_on_failure")]
    pub take_screenshot_on_failure: bool,

    /// Capture a screenshot when a test passes
    #[serde(alias = "screenshot_on_success")]
    pub take_screenshot_on_success: bool,

    /// Total attempts for retried commands (the first attempt counts)
    pub max_retries: u32,

    /// Delay between retried attempts in seconds
    pub retry_delay: f64,

    /// WebDriver endpoint sessions are created against
    pub webdriver_url: String,

    /// Parallel worker bound
    pub max_workers: usize,

    /// Log level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_browser: "chrome".to_string(),
            headless: true,
            implicit_wait: 10.0,
            page_load_timeout: 120.0,
            screenshot_dir: PathBuf::from("screenshots"),
            take_screenshot_on_failure: true,
            take_screenshot_on_success: true,
            max_retries: 3,
            retry_delay: 1.0,
            webdriver_url: "http://localhost:4444".to_string(),
            max_workers: 3,
            log_level: "info".to_string(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(format!("{}_{}", ENV_PREFIX, name)) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::configuration(format!("Invalid {}_{}", ENV_PREFIX, name))),
        Err(_) => Ok(None),
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Some(browser) = parse_var::<String>("DEFAULT_BROWSER")? {
            config.default_browser = browser;
        }

        if let Some(headless) = parse_var("HEADLESS")? {
            config.headless = headless;
        }

        if let Some(wait) = parse_var("IMPLICIT_WAIT")? {
            config.implicit_wait = wait;
        }

        if let Some(timeout) = parse_var("PAGE_LOAD_TIMEOUT")? {
            config.page_load_timeout = timeout;
        }

        if let Some(dir) = parse_var::<String>("SCREENSHOT_DIR")? {
            config.screenshot_dir = PathBuf::from(dir);
        }

        if let Some(on_failure) = parse_var("SCREENSHOT_ON_FAILURE")? {
            config.take_screenshot_on_failure = on_failure;
        }

        if let Some(on_success) = parse_var("SCREENSHOT_ON_SUCCESS")? {
            config.take_screenshot_on_success = on_success;
        }

        if let Some(retries) = parse_var("MAX_RETRIES")? {
            config.max_retries = retries;
        }

        if let Some(delay) = parse_var("RETRY_DELAY")? {
            config.retry_delay = delay;
        }

        if let Some(url) = parse_var::<String>("WEBDRIVER_URL")? {
            config.webdriver_url = url;
        }

        if let Some(workers) = parse_var("MAX_WORKERS")? {
            config.max_workers = workers;
        }

        if let Some(level) = parse_var::<String>("LOG_LEVEL")? {
            config.log_level = level;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::configuration(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Layer defaults, an optional TOML file, and `HARNESS_*` variables
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(
                ::config::File::with_name(path)
                    .format(::config::FileFormat::Toml)
                    .required(false),
            );
        }

        let config: Config = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .try_parsing(true),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| Error::configuration(format!("Failed to load config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("implicit_wait", self.implicit_wait),
            ("page_load_timeout", self.page_load_timeout),
            ("retry_delay", self.retry_delay),
        ] {
            if Duration::try_from_secs_f64(value).is_err() {
                return Err(Error::configuration(format!(
                    "{} must be a non-negative number of seconds, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Default element wait
    pub fn implicit_wait(&self) -> Duration {
        Duration::from_secs_f64(self.implicit_wait)
    }

    /// Default page load wait
    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.page_load_timeout)
    }

    /// Delay between retried attempts
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs_f64(self.retry_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.default_browser, "chrome");
        assert_eq!(config.implicit_wait(), Duration::from_secs(10));
        assert_eq!(config.page_load_timeout(), Duration::from_secs(120));
        assert_eq!(config.retry_delay(), Duration::from_secs(1));
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "implicit_wait = 2.5\nheadless = false\nmax_workers = 8").unwrap();

        let config = Config::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.implicit_wait(), Duration::from_millis(2500));
        assert!(!config.headless);
        assert_eq!(config.max_workers, 8);
        // Unset keys keep their defaults
        assert_eq!(config.default_browser, "chrome");
    }

    #[test]
    fn test_from_file_rejects_negative_wait() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "retry_delay = -1.0").unwrap();

        let result = Config::from_file(file.path().to_str().unwrap());
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_from_file_rejects_out_of_range_wait() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "implicit_wait = 1e20").unwrap();

        let result = Config::from_file(file.path().to_str().unwrap());
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_load_reads_screenshot_switches_from_env() {
        env::set_var("HARNESS_SCREENSHOT_ON_FAILURE", "false");
        env::set_var("HARNESS_SCREENSHOT_ON_SUCCESS", "false");
        let loaded = Config::load(None);
        let from_env = Config::from_env();
        env::remove_var("HARNESS_SCREENSHOT_ON_FAILURE");
        env::remove_var("HARNESS_SCREENSHOT_ON_SUCCESS");

        for config in [loaded.unwrap(), from_env.unwrap()] {
            assert!(!config.take_screenshot_on_failure);
            assert!(!config.take_screenshot_on_success);
        }
    }

    #[test]
    fn test_load_without_file() {
        let config = Config::load(None).unwrap();
        assert!(config.max_workers >= 1);
    }
}
