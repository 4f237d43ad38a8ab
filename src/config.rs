use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::service::ClassifierRules;

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub pairing: PairingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 配对引擎配置 - 启动时加载一次, 之后只读
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairingConfig {
    /// 有序分类规则, 先命中者优先
    pub classifier_rules: ClassifierRules,
    /// 关联备注中的行政警告标记 (忽略大小写)
    pub admin_warning_markers: Vec<String>,
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            classifier_rules: ClassifierRules::default(),
            admin_warning_markers: vec![
                "documento administrativo".to_string(),
                "administrative document".to_string(),
                "documento genérico".to_string(),
                "documento generico".to_string(),
                "generic document".to_string(),
            ],
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            pairing: PairingConfig::default(),
        }
    }
}

impl AppConfig {
    /// 加载配置: 默认值 -> 配置文件 (可选) -> 环境变量 (APP__SERVER__PORT)
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("PAIRING_CONFIG").unwrap_or_else(|_| "config/pairing".to_string());
        Self::load_from(&path)
    }

    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();

        Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("APP").separator("__").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
