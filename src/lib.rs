pub mod config;
pub mod error;
pub mod logging;
pub mod search;
pub mod settings;
pub mod utils;

pub use error::{ConfigError, SettingsError, ValidationErrors};
pub use search::{BaseQuery, ComposedQuery, QueryComposer, SearchContext, SearchRequest};
pub use settings::{SearchSettings, SettingsHandle, SettingsStore};
