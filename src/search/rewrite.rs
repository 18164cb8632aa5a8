//! Predicate rewrites and safety filters / 谓词改写与安全过滤
//!
//! Rewrites widen the base predicate to pages, drafts and attachments.
//! Safety filters always drop revisions and scheduled posts from search results.

use once_cell::sync::Lazy;
use regex::Regex;

use super::context::SearchContext;
use super::sql::Schema;

static LEADING_SELECT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(\s*)SELECT\b").unwrap());
static LEADING_DISTINCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*SELECT\s+DISTINCT\b").unwrap());

/// A textual rewrite of the composed predicate / 对组合谓词的文本改写
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateRewrite {
    /// Pages next to posts, optionally only without password / 同时搜索页面
    Pages { approved_only: bool },
    /// Drafts next to published posts / 同时搜索草稿
    Drafts,
    /// Attachments / 同时搜索附件
    Attachments,
}

impl PredicateRewrite {
    /// Enabled rewrites in application order / 按应用顺序返回启用的改写
    pub fn for_context(ctx: &SearchContext) -> Vec<PredicateRewrite> {
        if !ctx.has_query() {
            return Vec::new();
        }
        let s = &ctx.settings;
        let mut rewrites = Vec::new();
        if s.use_page_search {
            rewrites.push(PredicateRewrite::Pages { approved_only: s.approved_pages_only });
        }
        if s.use_draft_search {
            rewrites.push(PredicateRewrite::Drafts);
        }
        if s.use_attachment_search {
            rewrites.push(PredicateRewrite::Attachments);
        }
        rewrites
    }

    pub fn apply(&self, predicate: &str, schema: &Schema) -> String {
        let posts = schema.posts();
        let published = format!(" AND ({}.post_status = 'publish'", posts);

        let rewritten = match self {
            PredicateRewrite::Pages { approved_only } => {
                let post_only = format!("{}.post_type = 'post'", posts);
                let widened = if *approved_only {
                    format!(
                        "({posts}.post_type = 'post' OR ({posts}.post_type = 'page' AND {posts}.post_password = ''))",
                        posts = posts
                    )
                } else {
                    format!("{}.post_type IN ('post', 'page')", posts)
                };
                predicate.replace(&post_only, &widened)
            }
            PredicateRewrite::Drafts => predicate.replace(
                &published,
                &format!("{} OR {}.post_status = 'draft'", published, posts),
            ),
            PredicateRewrite::Attachments => predicate
                .replace(&published, &format!("{} OR {}.post_type = 'attachment'", published, posts))
                .replace(&format!("AND {}.post_type != 'attachment'", posts), ""),
        };

        tracing::debug!(rewrite = ?self, "rewritten predicate: {}", rewritten);
        rewritten
    }
}

/// Wrap everything after the leading `AND` and append a condition / 包裹原谓词并追加条件
fn wrap_and_append(predicate: &str, condition: &str) -> String {
    let rest = match predicate.find("AND") {
        Some(i) => &predicate[i + 3..],
        None => predicate,
    };
    if rest.trim().is_empty() {
        return format!("AND {}", condition);
    }
    format!("AND ({}) AND {}", rest, condition)
}

/// Drop revisions / 排除修订版本
pub fn exclude_revisions(predicate: &str, schema: &Schema) -> String {
    wrap_and_append(predicate, &format!("{}.post_type != 'revision'", schema.posts()))
}

/// Drop scheduled posts / 排除定时发布的文章
pub fn exclude_future(predicate: &str, schema: &Schema) -> String {
    wrap_and_append(predicate, &format!("{}.post_status != 'future'", schema.posts()))
}

/// Turn the leading `SELECT` into `SELECT DISTINCT` once / 将开头的 SELECT 改为 SELECT DISTINCT
pub fn ensure_distinct(statement: &str) -> String {
    if LEADING_DISTINCT_RE.is_match(statement) {
        return statement.to_string();
    }
    LEADING_SELECT_RE.replace(statement, "${1}SELECT DISTINCT").into_owned()
}
