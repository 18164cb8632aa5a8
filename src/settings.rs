//! Search settings - facet toggles, highlight style and exclusion lists / 搜索设置
//!
//! Settings are validated as a whole and published as an immutable snapshot.
//! A request takes one snapshot and never sees a partially updated configuration.
//! 设置整体校验后以不可变快照发布，请求只会看到完整的一份配置。

use std::collections::BTreeMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{SettingsError, ValidationErrors};

static COLOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(([a-z]+)|(#[0-9a-f]{2,6}))?$").unwrap());
static CSS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(([a-zA-Z-])+ *:[^;]+; *)*$").unwrap());
static ID_LIST_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]+(,\s*[0-9]+)*)?$").unwrap());

/// Search settings / 搜索设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Search tag names / 搜索标签
    pub use_tag_search: bool,
    /// Search category slugs and descriptions / 搜索分类
    pub use_category_search: bool,
    /// Search custom taxonomies / 搜索自定义分类法
    pub use_tax_search: bool,
    /// Search custom fields / 搜索自定义字段
    pub use_metadata_search: bool,
    pub use_excerpt_search: bool,
    pub use_comment_search: bool,
    /// Also match comment authors (needs comment search) / 同时匹配评论作者
    pub use_cmt_authors: bool,
    pub approved_comments_only: bool,
    pub use_authors: bool,
    pub use_page_search: bool,
    /// Skip password protected pages / 跳过密码保护的页面
    pub approved_pages_only: bool,
    pub use_draft_search: bool,
    pub use_attachment_search: bool,
    pub use_highlight: bool,
    /// CSS color name or `#hex`, wins over `highlight_style` / 高亮背景色
    pub highlight_color: String,
    /// Raw CSS declarations, trusted as given / 高亮样式，原样输出
    pub highlight_style: String,
    /// Comma separated document IDs / 逗号分隔的文档ID
    pub exclude_posts_list: String,
    /// Comma separated category IDs / 逗号分隔的分类ID
    pub exclude_categories_list: String,
    /// Registered taxonomy names searched when `use_tax_search` is on / 已注册的分类法名称
    pub custom_taxonomies: Vec<String>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            use_tag_search: false,
            use_category_search: false,
            use_tax_search: false,
            use_metadata_search: false,
            use_excerpt_search: false,
            use_comment_search: false,
            use_cmt_authors: false,
            approved_comments_only: false,
            use_authors: false,
            use_page_search: false,
            approved_pages_only: false,
            use_draft_search: false,
            use_attachment_search: false,
            use_highlight: true,
            highlight_color: "orange".to_string(),
            highlight_style: String::new(),
            exclude_posts_list: String::new(),
            exclude_categories_list: String::new(),
            custom_taxonomies: Vec::new(),
        }
    }
}

/// Validated settings fields / 需要校验的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    HighlightColor,
    HighlightStyle,
    ExcludeCategoriesList,
    ExcludePostsList,
}

impl Field {
    /// Human readable label / 字段显示名
    pub fn label(&self) -> &'static str {
        match self {
            Field::HighlightColor => "Highlight Background Color",
            Field::HighlightStyle => "Full Highlight Style",
            Field::ExcludeCategoriesList => "Exclude Categories",
            Field::ExcludePostsList => "Exclude some post or page IDs",
        }
    }

    fn rule(&self) -> &'static Regex {
        match self {
            Field::HighlightColor => &COLOR_RE,
            Field::HighlightStyle => &CSS_RE,
            Field::ExcludeCategoriesList | Field::ExcludePostsList => &ID_LIST_RE,
        }
    }

    fn message(&self) -> String {
        match self {
            Field::HighlightColor => format!("field {} should be a css color ('red' or '#abc123')", self.label()),
            Field::HighlightStyle => format!("field {} doesn't contain valid css", self.label()),
            Field::ExcludeCategoriesList | Field::ExcludePostsList => {
                format!("incorrect format for field {}", self.label())
            }
        }
    }
}

impl SearchSettings {
    fn value(&self, field: Field) -> &str {
        match field {
            Field::HighlightColor => &self.highlight_color,
            Field::HighlightStyle => &self.highlight_style,
            Field::ExcludeCategoriesList => &self.exclude_categories_list,
            Field::ExcludePostsList => &self.exclude_posts_list,
        }
    }

    /// Validate every rule and collect all failures / 校验全部规则并收集所有失败
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let fields = [
            Field::HighlightColor,
            Field::HighlightStyle,
            Field::ExcludeCategoriesList,
            Field::ExcludePostsList,
        ];

        let errors: BTreeMap<Field, String> = fields
            .into_iter()
            .filter(|f| !f.rule().is_match(self.value(*f).trim()))
            .map(|f| (f, f.message()))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

/// Boundary to the external settings persistence / 外部设置持久化边界
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> Result<Option<SearchSettings>, SettingsError>;
    fn save(&self, settings: &SearchSettings) -> Result<(), SettingsError>;
}

/// In-memory store / 内存存储
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Mutex<Option<SearchSettings>>,
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<Option<SearchSettings>, SettingsError> {
        Ok(self.saved.lock().clone())
    }

    fn save(&self, settings: &SearchSettings) -> Result<(), SettingsError> {
        *self.saved.lock() = Some(settings.clone());
        Ok(())
    }
}

/// Copy-on-write holder of the current settings / 当前设置的写时复制持有者
#[derive(Debug)]
pub struct SettingsHandle {
    current: RwLock<Arc<SearchSettings>>,
}

impl Default for SettingsHandle {
    fn default() -> Self {
        Self::new(SearchSettings::default())
    }
}

impl SettingsHandle {
    pub fn new(settings: SearchSettings) -> Self {
        Self { current: RwLock::new(Arc::new(settings)) }
    }

    /// Load from the store, falling back to defaults / 从存储加载，缺失时使用默认值
    pub fn load(store: &dyn SettingsStore) -> Result<Self, SettingsError> {
        let settings = store.load()?.unwrap_or_default();
        Ok(Self::new(settings))
    }

    /// Snapshot for one request / 单次请求的快照
    pub fn snapshot(&self) -> Arc<SearchSettings> {
        self.current.read().clone()
    }

    /// Swap in a new snapshot / 替换为新快照
    pub fn publish(&self, settings: SearchSettings) -> Arc<SearchSettings> {
        let published = Arc::new(settings);
        *self.current.write() = published.clone();
        published
    }

    /// Validate, persist, then publish / 校验、保存后发布
    ///
    /// Nothing is written or published unless every field passes.
    pub fn apply_form(&self, settings: SearchSettings, store: &dyn SettingsStore) -> Result<Arc<SearchSettings>, SettingsError> {
        if let Err(errors) = settings.validate() {
            tracing::debug!("settings rejected: {}", errors);
            return Err(errors.into());
        }

        store.save(&settings)?;
        let published = self.publish(settings);
        tracing::info!("search settings updated");
        Ok(published)
    }

    /// Restore defaults / 恢复默认设置
    pub fn reset(&self, store: &dyn SettingsStore) -> Result<Arc<SearchSettings>, SettingsError> {
        self.apply_form(SearchSettings::default(), store)
    }
}
