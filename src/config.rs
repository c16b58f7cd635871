//! 应用配置管理模块
//! 集中管理所有配置项，提供默认值、环境变量覆盖和配置验证

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::telemetry::{ValueRange, DEFAULT_HISTORY_CAPACITY};

pub const DEFAULT_CONFIG_PATH: &str = "vitalshub.toml";

/// 主配置结构
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub mqtt: MqttConfig,
    pub telemetry: TelemetryConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

/// MQTT配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    pub broker: String,
    pub port: u16,
    pub client_id: String,
    pub transport: TransportKind,
    /// Path part of the websocket URL, unused over TCP
    pub ws_path: String,
    pub topics: MqttTopics,
    pub qos: u8,
    pub keep_alive: u16,
    pub reconnect_delay_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Tcp,
    Websocket,
}

/// MQTT主题配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttTopics {
    pub health: String,
    pub temperature: String,
}

/// 数据处理配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub history_capacity: usize,
    /// Decimal places kept for display and history
    pub precision: u32,
    pub policy: PolicyConfig,
}

/// 接收策略配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyConfig {
    AcceptAll,
    HeartRateCeiling {
        max_heart_rate: f64,
    },
    Ranges {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        heart_rate: Option<ValueRange>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        spo2: Option<ValueRange>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        body_temperature: Option<ValueRange>,
    },
}

/// 会话配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub event_channel_capacity: usize,
    /// Seconds between status summaries, 0 disables them
    pub summary_interval_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_for_secs: Option<u64>,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker: "localhost".to_string(),
            port: 1883,
            client_id: "vitalshub_client".to_string(),
            transport: TransportKind::Tcp,
            ws_path: "/mqtt".to_string(),
            topics: MqttTopics::default(),
            qos: 0,
            keep_alive: 60,
            reconnect_delay_ms: 1000,
            username: None,
            password: None,
        }
    }
}

impl Default for MqttTopics {
    fn default() -> Self {
        Self {
            health: "sensor/health".to_string(),
            temperature: "sensor/temperature".to_string(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            precision: 2,
            policy: PolicyConfig::default(),
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        PolicyConfig::AcceptAll
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            event_channel_capacity: 100,
            summary_interval_secs: 10,
            run_for_secs: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl MqttConfig {
    /// Host argument handed to the MQTT client: bare host over TCP, full URL over websocket
    pub fn broker_address(&self) -> String {
        match self.transport {
            TransportKind::Tcp => self.broker.clone(),
            TransportKind::Websocket => format!("ws://{}:{}{}", self.broker, self.port, self.ws_path),
        }
    }
}

impl AppConfig {
    /// 从文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::IoError)?;

        let config: AppConfig = toml::from_str(&content).map_err(ConfigError::ParseError)?;

        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::SerializeError)?;

        std::fs::write(path, content).map_err(ConfigError::IoError)?;

        Ok(())
    }

    /// File if present, defaults otherwise, then `.env`/environment overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = if path.as_ref().exists() {
            Self::load_from_file(&path)?
        } else {
            Self::default()
        };

        dotenv::dotenv().ok(); // 加载 .env 文件
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Applies MQTT_HOST / MQTT_PORT / MQTT_USER / MQTT_PASS / MQTT_TRANSPORT
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("MQTT_HOST") {
            self.mqtt.broker = host;
        }
        if let Some(port) = lookup("MQTT_PORT") {
            self.mqtt.port = port
                .parse::<u16>()
                .map_err(|e| ConfigError::EnvError(format!("MQTT_PORT={}: {}", port, e)))?;
        }
        if let Some(user) = lookup("MQTT_USER") {
            self.mqtt.username = Some(user);
        }
        if let Some(pass) = lookup("MQTT_PASS") {
            self.mqtt.password = Some(pass);
        }
        if let Some(transport) = lookup("MQTT_TRANSPORT") {
            self.mqtt.transport = match transport.to_ascii_lowercase().as_str() {
                "tcp" => TransportKind::Tcp,
                "ws" | "websocket" => TransportKind::Websocket,
                other => return Err(ConfigError::EnvError(format!("MQTT_TRANSPORT={}: unknown transport", other))),
            };
        }
        Ok(())
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mqtt.port == 0 {
            return Err(ConfigError::ValidationError("MQTT port must be positive".to_string()));
        }

        if self.mqtt.qos > 2 {
            return Err(ConfigError::ValidationError("MQTT QoS must be 0, 1 or 2".to_string()));
        }

        let topics = &self.mqtt.topics;
        if topics.health.is_empty() || topics.temperature.is_empty() {
            return Err(ConfigError::ValidationError("Topics must not be empty".to_string()));
        }
        if topics.health == topics.temperature {
            return Err(ConfigError::ValidationError("Health and temperature topics must differ".to_string()));
        }

        if self.telemetry.history_capacity == 0 {
            return Err(ConfigError::ValidationError("History capacity must be positive".to_string()));
        }

        if self.telemetry.precision > 10 {
            return Err(ConfigError::ValidationError("Precision must be at most 10 decimal places".to_string()));
        }

        if let PolicyConfig::Ranges { heart_rate, spo2, body_temperature } = &self.telemetry.policy {
            for range in [heart_rate, spo2, body_temperature].into_iter().flatten() {
                if !(range.min < range.max) {
                    return Err(ConfigError::ValidationError(format!(
                        "Invalid range [{}, {})",
                        range.min, range.max
                    )));
                }
            }
        }

        if self.session.event_channel_capacity == 0 {
            return Err(ConfigError::ValidationError("Event channel capacity must be positive".to_string()));
        }

        Ok(())
    }
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(toml::de::Error),
    #[error("Serialize error: {0}")]
    SerializeError(toml::ser::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Environment error: {0}")]
    EnvError(String),
}
