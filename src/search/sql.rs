//! SQL primitives for clause building / 子句构建用的 SQL 基础设施
//!
//! - Schema: table names behind a configurable prefix / 带前缀的表名
//! - Dialect: literal quoting rules of the target store / 目标存储的字面量转义规则
//! - JoinSpec / JoinSet: joins declared by facets, merged and rendered once / 各维度声明的连接

use serde::{Deserialize, Serialize};

/// Predicate used in place of a term the dialect cannot represent / 无法转义的词退化为永不匹配
pub const NO_MATCH: &str = "(0 = 1)";

/// Taxonomies never searched as custom taxonomies / 不作为自定义分类法搜索的内置分类法
pub const BUILTIN_TAXONOMIES: [&str; 4] = ["post_tag", "category", "nav_menu", "link_category"];

/// SQL dialect of the document store / 文档存储的 SQL 方言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Backslash escapes inside single quotes / 单引号内使用反斜杠转义
    #[default]
    MySql,
    /// Single quotes doubled, backslash is literal / 单引号加倍，反斜杠为普通字符
    Sqlite,
}

impl Dialect {
    /// Quote a value as a string literal, `None` when the dialect cannot hold it
    /// 将值转为字符串字面量，方言无法表示时返回 None
    pub fn quote(&self, value: &str) -> Option<String> {
        let mut out = String::with_capacity(value.len() + 2);
        out.push('\'');
        match self {
            Dialect::MySql => {
                for c in value.chars() {
                    match c {
                        '\0' => out.push_str("\\0"),
                        '\n' => out.push_str("\\n"),
                        '\r' => out.push_str("\\r"),
                        '\\' => out.push_str("\\\\"),
                        '\'' => out.push_str("\\'"),
                        '"' => out.push_str("\\\""),
                        '\u{1a}' => out.push_str("\\Z"),
                        _ => out.push(c),
                    }
                }
            }
            Dialect::Sqlite => {
                if value.contains('\0') {
                    return None;
                }
                for c in value.chars() {
                    if c == '\'' {
                        out.push('\'');
                    }
                    out.push(c);
                }
            }
        }
        out.push('\'');
        Some(out)
    }
}

/// Table names of the content repository / 内容库表名
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Table prefix, e.g. `wp_` / 表前缀
    pub prefix: String,
}

impl Default for Schema {
    fn default() -> Self {
        Self::new("wp_")
    }
}

impl Schema {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    pub fn posts(&self) -> String {
        format!("{}posts", self.prefix)
    }

    pub fn comments(&self) -> String {
        format!("{}comments", self.prefix)
    }

    pub fn users(&self) -> String {
        format!("{}users", self.prefix)
    }

    pub fn postmeta(&self) -> String {
        format!("{}postmeta", self.prefix)
    }

    pub fn terms(&self) -> String {
        format!("{}terms", self.prefix)
    }

    pub fn term_taxonomy(&self) -> String {
        format!("{}term_taxonomy", self.prefix)
    }

    pub fn term_relationships(&self) -> String {
        format!("{}term_relationships", self.prefix)
    }
}

/// One rendered `LEFT JOIN` / 一个 LEFT JOIN
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub relation: String,
    pub alias: String,
    pub condition: String,
}

impl Join {
    fn new(relation: String, alias: &str, condition: String) -> Self {
        Self { relation, alias: alias.to_string(), condition }
    }

    pub fn to_sql(&self) -> String {
        format!(" LEFT JOIN {} AS {} ON ({}) ", self.relation, self.alias, self.condition)
    }
}

/// A join requirement declared by a facet or a filter / 维度或过滤器声明的连接需求
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinSpec {
    /// trel / ttax / tter, restricted to the listed taxonomies / 限定分类法的词项连接
    Terms { taxonomies: Vec<String> },
    /// crel / ctax / cter for category exclusion / 排除分类用的连接
    ExcludedCategories,
    /// cmt
    Comments,
    /// u
    Authors,
    /// m
    Metadata,
}

impl JoinSpec {
    fn alias(&self) -> &'static str {
        match self {
            JoinSpec::Terms { .. } => "ttax",
            JoinSpec::ExcludedCategories => "ctax",
            JoinSpec::Comments => "cmt",
            JoinSpec::Authors => "u",
            JoinSpec::Metadata => "m",
        }
    }

    /// Render into concrete joins / 渲染为具体的连接
    pub fn joins(&self, schema: &Schema, dialect: Dialect) -> Vec<Join> {
        let posts = schema.posts();
        match self {
            JoinSpec::Terms { taxonomies } => {
                let scope: Vec<String> = taxonomies
                    .iter()
                    .filter_map(|t| dialect.quote(t))
                    .map(|t| format!("ttax.taxonomy = {}", t))
                    .collect();
                let scope = if scope.is_empty() {
                    NO_MATCH.to_string()
                } else {
                    format!("({})", scope.join(" OR "))
                };
                vec![
                    Join::new(schema.term_relationships(), "trel", format!("{}.ID = trel.object_id", posts)),
                    Join::new(
                        schema.term_taxonomy(),
                        "ttax",
                        format!("{} AND trel.term_taxonomy_id = ttax.term_taxonomy_id", scope),
                    ),
                    Join::new(schema.terms(), "tter", "ttax.term_id = tter.term_id".to_string()),
                ]
            }
            JoinSpec::ExcludedCategories => vec![
                Join::new(schema.term_relationships(), "crel", format!("{}.ID = crel.object_id", posts)),
                Join::new(
                    schema.term_taxonomy(),
                    "ctax",
                    "ctax.taxonomy = 'category' AND crel.term_taxonomy_id = ctax.term_taxonomy_id".to_string(),
                ),
                Join::new(schema.terms(), "cter", "ctax.term_id = cter.term_id".to_string()),
            ],
            JoinSpec::Comments => vec![Join::new(
                schema.comments(),
                "cmt",
                format!("cmt.comment_post_ID = {}.ID", posts),
            )],
            JoinSpec::Authors => vec![Join::new(
                schema.users(),
                "u",
                format!("{}.post_author = u.ID", posts),
            )],
            JoinSpec::Metadata => vec![Join::new(
                schema.postmeta(),
                "m",
                format!("{}.ID = m.post_id", posts),
            )],
        }
    }
}

/// Ordered, deduplicated set of join requirements / 有序去重的连接集合
///
/// Two `Terms` requirements share one join, their taxonomy lists are merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinSet {
    specs: Vec<JoinSpec>,
}

impl JoinSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, spec: JoinSpec) {
        let Some(pos) = self.specs.iter().position(|s| s.alias() == spec.alias()) else {
            self.specs.push(spec);
            return;
        };
        if let (JoinSpec::Terms { taxonomies }, JoinSpec::Terms { taxonomies: extra }) = (&mut self.specs[pos], spec) {
            for taxonomy in extra {
                if !taxonomies.contains(&taxonomy) {
                    taxonomies.push(taxonomy);
                }
            }
        }
    }

    pub fn extend(&mut self, specs: impl IntoIterator<Item = JoinSpec>) {
        for spec in specs {
            self.add(spec);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn specs(&self) -> &[JoinSpec] {
        &self.specs
    }

    pub fn joins(&self, schema: &Schema, dialect: Dialect) -> Vec<Join> {
        self.specs.iter().flat_map(|s| s.joins(schema, dialect)).collect()
    }

    pub fn to_sql(&self, schema: &Schema, dialect: Dialect) -> String {
        self.joins(schema, dialect).iter().map(Join::to_sql).collect()
    }
}
