//! Logging setup / 日志初始化

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError};

use crate::config::LoggingConfig;

/// Install the global subscriber / 安装全局日志订阅者
///
/// `RUST_LOG` takes precedence, the configured filter is the fallback.
/// Fails if a global subscriber is already set.
pub fn init(logging: &LoggingConfig) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| logging.filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}
