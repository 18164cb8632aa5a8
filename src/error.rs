//! Error types / 错误类型

use std::collections::BTreeMap;

use thiserror::Error;

use crate::settings::Field;

/// Configuration file errors / 配置文件错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read or write config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Field-scoped validation messages / 按字段收集的校验错误
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("invalid settings: {}", join_messages(.0))]
pub struct ValidationErrors(pub BTreeMap<Field, String>);

fn join_messages(messages: &BTreeMap<Field, String>) -> String {
    messages.values().map(String::as_str).collect::<Vec<_>>().join("; ")
}

impl ValidationErrors {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }
}

/// Settings update errors / 设置更新错误
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
    #[error("settings store failed: {0}")]
    Store(String),
}
