//! Per-request search context / 单次请求的搜索上下文
//!
//! Built once from the request parameters and a settings snapshot.
//! Every builder reads from it, nothing reads ambient state.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::sql::{Dialect, Schema, BUILTIN_TAXONOMIES, NO_MATCH};
use super::tokenizer::{sentence_phrase, tokenize};
use crate::settings::SearchSettings;

/// Raw request parameters / 原始请求参数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    /// Search string as submitted (`s`) / 搜索字符串
    #[serde(rename = "s")]
    pub query: String,
    /// Disable substring matching / 精确匹配
    pub exact: bool,
    /// Treat the whole string as one phrase / 整句搜索
    pub sentence: bool,
    /// Internal suggestion call, composes even without a query / 内部联想请求
    pub suggestion: bool,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), ..Default::default() }
    }

    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    pub fn sentence(mut self, sentence: bool) -> Self {
        self.sentence = sentence;
        self
    }

    pub fn suggestion(mut self, suggestion: bool) -> Self {
        self.suggestion = suggestion;
        self
    }
}

/// How highlighted matches are styled / 高亮样式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HighlightStyle {
    /// Background color / 背景色
    Color(String),
    /// Raw CSS declarations / 原始 CSS
    Style(String),
}

impl HighlightStyle {
    /// Color wins when both are set / 两者都设置时颜色优先
    pub fn from_settings(settings: &SearchSettings) -> Self {
        let color = settings.highlight_color.trim();
        if color.is_empty() {
            HighlightStyle::Style(settings.highlight_style.trim().to_string())
        } else {
            HighlightStyle::Color(color.to_string())
        }
    }
}

/// Searchable facets in registry order / 可搜索的维度，按注册顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    /// Title and content, always on / 标题与正文
    Default,
    Tags,
    /// Categories and custom taxonomies / 分类与自定义分类法
    Categories,
    Metadata,
    Excerpt,
    Comments,
    Authors,
}

/// Immutable per-request context / 不可变的请求上下文
#[derive(Debug, Clone)]
pub struct SearchContext {
    pub query: String,
    pub exact: bool,
    pub sentence: bool,
    pub suggestion: bool,
    /// Tokenized terms in query order / 分词结果
    pub terms: Vec<String>,
    /// Whole query used by the tie-break / 整句短语
    pub phrase: String,
    pub settings: Arc<SearchSettings>,
    pub schema: Schema,
    pub dialect: Dialect,
    pub highlight: HighlightStyle,
}

impl SearchContext {
    pub fn new(request: &SearchRequest, settings: Arc<SearchSettings>, schema: Schema, dialect: Dialect) -> Self {
        let terms = tokenize(&request.query, request.sentence);
        let phrase = sentence_phrase(&request.query);
        let highlight = HighlightStyle::from_settings(&settings);

        tracing::debug!("search terms: {:?}", terms);

        Self {
            query: request.query.clone(),
            exact: request.exact,
            sentence: request.sentence,
            suggestion: request.suggestion,
            terms,
            phrase,
            settings,
            schema,
            dialect,
            highlight,
        }
    }

    /// A non-empty query is present / 存在非空查询
    pub fn has_query(&self) -> bool {
        !self.query.is_empty()
    }

    /// Whether composition runs at all / 是否执行组合
    pub fn is_search(&self) -> bool {
        self.has_query() || self.suggestion
    }

    pub fn is_enabled(&self, facet: Facet) -> bool {
        let s = &self.settings;
        match facet {
            Facet::Default => true,
            Facet::Tags => s.use_tag_search,
            Facet::Categories => s.use_category_search || s.use_tax_search,
            Facet::Metadata => s.use_metadata_search,
            Facet::Excerpt => s.use_excerpt_search,
            Facet::Comments => s.use_comment_search,
            Facet::Authors => s.use_authors,
        }
    }

    /// More than one term and the phrase differs from the first / 需要附加整句匹配
    pub fn needs_tie_break(&self) -> bool {
        self.terms.len() > 1 && self.terms[0] != self.phrase
    }

    /// Quoted LIKE pattern for a value, wildcards unless exact / LIKE 模式字面量
    pub fn pattern(&self, value: &str) -> Option<String> {
        if self.exact {
            self.dialect.quote(value)
        } else {
            self.dialect.quote(&format!("%{}%", value))
        }
    }

    /// `(column LIKE pattern)`, or the no-match predicate / LIKE 条件
    pub fn like(&self, column: &str, value: &str) -> String {
        match self.pattern(value) {
            Some(pattern) => format!("({} LIKE {})", column, pattern),
            None => {
                tracing::warn!("term cannot be quoted for {:?}, matching nothing", self.dialect);
                NO_MATCH.to_string()
            }
        }
    }

    /// Custom taxonomies, built-in ones filtered out / 自定义分类法（去除内置）
    pub fn custom_taxonomies(&self) -> Vec<String> {
        self.settings
            .custom_taxonomies
            .iter()
            .filter(|t| !t.is_empty() && !BUILTIN_TAXONOMIES.contains(&t.as_str()))
            .cloned()
            .collect()
    }

    /// Taxonomies searched by the categories facet / 分类维度搜索的分类法
    pub fn category_taxonomies(&self) -> Vec<String> {
        let mut taxonomies = Vec::new();
        if self.settings.use_category_search {
            taxonomies.push("category".to_string());
        }
        if self.settings.use_tax_search {
            taxonomies.extend(self.custom_taxonomies());
        }
        taxonomies
    }
}
