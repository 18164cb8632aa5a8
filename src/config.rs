//! Application configuration module / 应用配置模块
//!
//! Manages configuration loaded from config.json: table prefix, SQL dialect,
//! log filter and the initial search settings.
//! Creates default config file on first run / 首次运行时创建默认配置文件

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::search::sql::{Dialect, Schema};
use crate::settings::{SearchSettings, SettingsHandle};

/// Application configuration / 应用配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Database configuration / 数据库配置
    pub database: DatabaseConfig,
    /// Logging configuration / 日志配置
    pub logging: LoggingConfig,
    /// Initial search settings / 初始搜索设置
    pub search: SearchSettings,
}

/// Database configuration / 数据库配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Table prefix of the content repository / 内容库表前缀
    pub table_prefix: String,
    /// SQL dialect used for literal quoting / 字面量转义使用的方言
    pub dialect: Dialect,
}

/// Logging configuration / 日志配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Fallback filter when RUST_LOG is unset / 未设置 RUST_LOG 时使用的过滤器
    pub filter: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            table_prefix: "wp_".to_string(),
            dialect: Dialect::MySql,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "search_everything=info".to_string(),
        }
    }
}

impl AppConfig {
    /// Table schema under the configured prefix / 按配置前缀生成的表结构
    pub fn schema(&self) -> Schema {
        Schema::new(self.database.table_prefix.clone())
    }

    /// Settings handle seeded with the configured search settings / 以配置中的搜索设置初始化
    pub fn settings_handle(&self) -> SettingsHandle {
        SettingsHandle::new(self.search.clone())
    }
}

/// Load configuration from file, or create default if not exists / 加载配置文件，不存在则创建默认配置
pub fn load_config_from(config_path: &Path) -> Result<AppConfig, ConfigError> {
    if config_path.exists() {
        let content = std::fs::read_to_string(config_path)?;
        let config: AppConfig = serde_json::from_str(&content)?;

        if let Err(errors) = config.search.validate() {
            // 加载时不拒绝，仅记录
            tracing::warn!("Configured search settings do not validate: {}", errors);
        }
        tracing::info!("Loaded configuration from {:?}", config_path);
        Ok(config)
    } else {
        let config = AppConfig::default();
        save_config_to(&config, config_path)?;
        tracing::info!("Created default configuration at {:?}", config_path);
        Ok(config)
    }
}

/// Save configuration to file / 保存配置到文件
pub fn save_config_to(config: &AppConfig, config_path: &Path) -> Result<(), ConfigError> {
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(config_path, content)?;
    Ok(())
}
