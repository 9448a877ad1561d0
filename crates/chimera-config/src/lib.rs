//! Layered configuration: built-in defaults, overridden by an optional JSON
//! file, overridden by `CHIMERA_SECTION_KEY` environment variables.

use serde::{Deserialize, Serialize};

/// Root configuration, one field per top-level config section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChimeraConfig {
    #[serde(default)]
    pub nix: NixConfig,
    #[serde(default)]
    pub fleet: FleetConfig,
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub mcp: McpConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub itsm: ItsmConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ChimeraConfig {
    fn default() -> Self {
        Self {
            nix: NixConfig::default(),
            fleet: FleetConfig::default(),
            watch: WatchConfig::default(),
            agent: AgentConfig::default(),
            web: WebConfig::default(),
            mcp: McpConfig::default(),
            telemetry: TelemetryConfig::default(),
            itsm: ItsmConfig::default(),
            notifications: NotificationsConfig::default(),
            log_level: default_log_level(),
        }
    }
}

/// `BuildPort` timeouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NixConfig {
    #[serde(default = "default_build_timeout")]
    pub build_timeout_seconds: u64,
    pub flake_path: Option<String>,
}

impl Default for NixConfig {
    fn default() -> Self {
        Self {
            build_timeout_seconds: default_build_timeout(),
            flake_path: None,
        }
    }
}

/// `RemoteExecutorPort` timeouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetConfig {
    #[serde(default = "default_sync_timeout")]
    pub sync_timeout_seconds: u64,
    #[serde(default = "default_exec_timeout")]
    pub exec_timeout_seconds: u64,
    #[serde(default)]
    pub default_targets: Vec<String>,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            sync_timeout_seconds: default_sync_timeout(),
            exec_timeout_seconds: default_exec_timeout(),
            default_targets: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_watch_interval")]
    pub default_interval_seconds: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            default_interval_seconds: default_watch_interval(),
        }
    }
}

/// Agent Registry heartbeat cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_seconds: u64,
    #[serde(default = "default_drift_interval")]
    pub drift_interval_seconds: u64,
    #[serde(default = "default_true")]
    pub auto_heal_enabled: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_seconds: default_heartbeat_interval(),
            drift_interval_seconds: default_drift_interval(),
            auto_heal_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_web_port")]
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_web_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_mcp_port")]
    pub port: u16,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_mcp_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
    #[serde(default)]
    pub prometheus_enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            prometheus_enabled: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItsmConfig {
    #[serde(default)]
    pub enabled: bool,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default)]
    pub enabled: bool,
    pub webhook_url: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_build_timeout() -> u64 {
    300
}

fn default_sync_timeout() -> u64 {
    600
}

fn default_exec_timeout() -> u64 {
    120
}

fn default_watch_interval() -> u64 {
    30
}

fn default_heartbeat_interval() -> u64 {
    5
}

fn default_drift_interval() -> u64 {
    60
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_web_port() -> u16 {
    8080
}

fn default_mcp_port() -> u16 {
    8090
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ChimeraConfig {
    /// Layer built-in defaults, an optional JSON file, then `CHIMERA_`
    /// environment variables, in that precedence order.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&ChimeraConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("CHIMERA")
                .separator("_")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}
