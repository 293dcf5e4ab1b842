use clap::Parser;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Config file picked up from the working directory when no path is given.
const DEFAULT_CONFIG_FILE: &str = "hydra.yaml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Base URL of the chat backend
    #[arg(long, env = "BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Abort backend requests after this many seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    /// Name shown in the welcome message
    #[arg(long, env = "TRADER_NAME")]
    pub trader_name: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WidgetConfig {
    pub backend: BackendConfig,
    pub timers: TimerConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TimerConfig {
    pub clock_interval_ms: u64,
    pub health_interval_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UiConfig {
    pub trader_name: String,
}

impl BackendConfig {
    /// Request timeout, if one is configured. Requests never time out otherwise.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl TimerConfig {
    #[must_use]
    pub fn clock_interval(&self) -> Duration {
        Duration::from_millis(self.clock_interval_ms.max(1))
    }

    #[must_use]
    pub fn health_interval(&self) -> Duration {
        Duration::from_millis(self.health_interval_ms.max(1))
    }
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig {
                base_url: "http://127.0.0.1:5000".to_string(),
                request_timeout_secs: None,
            },
            timers: TimerConfig {
                clock_interval_ms: 1000,
                health_interval_ms: 5000,
            },
            ui: UiConfig {
                trader_name: "Hydra".to_string(),
            },
        }
    }
}

impl WidgetConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    /// Layer defaults, the config file, `HYDRA_` env vars and CLI flags.
    ///
    /// Priority: CLI flag (or its env var) > `HYDRA_*` env > config file > defaults.
    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("backend.base_url", defaults.backend.base_url)?
            .set_default(
                "timers.clock_interval_ms",
                defaults.timers.clock_interval_ms,
            )?
            .set_default(
                "timers.health_interval_ms",
                defaults.timers.health_interval_ms,
            )?
            .set_default("ui.trader_name", defaults.ui.trader_name)?;

        match cli.config.as_deref() {
            Some(path) => {
                builder = builder.add_source(File::new(path, FileFormat::Yaml).required(true));
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                builder = builder.add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml));
            }
            None => {}
        }

        // E.g. HYDRA_BACKEND__BASE_URL=http://localhost:8080
        builder = builder.add_source(
            Environment::with_prefix("HYDRA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(url) = cli.backend_url {
            builder = builder.set_override("backend.base_url", url)?;
        }
        if let Some(secs) = cli.request_timeout_secs {
            builder = builder.set_override("backend.request_timeout_secs", secs)?;
        }
        if let Some(name) = cli.trader_name {
            builder = builder.set_override("ui.trader_name", name)?;
        }

        let cfg = builder.build()?;
        let loaded: Self = cfg.try_deserialize()?;
        url::Url::parse(&loaded.backend.base_url).map_err(|e| {
            config::ConfigError::Message(format!(
                "invalid backend.base_url {:?}: {e}",
                loaded.backend.base_url
            ))
        })?;
        Ok(loaded)
    }
}
