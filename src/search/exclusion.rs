//! Exclusion filters / 排除过滤器
//!
//! Documents and categories listed in the settings are removed from results.
//! Pages are never removed by the category filter.

use super::context::SearchContext;
use super::sql::JoinSpec;
use crate::utils::coerce_int;

/// Parse a comma separated ID list / 解析逗号分隔的 ID 列表
///
/// Every entry is kept. Entries that are not numbers become 0.
pub fn parse_id_list(list: &str) -> Vec<i64> {
    let list = list.trim();
    if list.is_empty() {
        return Vec::new();
    }
    list.split(',').map(coerce_int).collect()
}

fn render_ids(ids: &[i64]) -> String {
    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(",")
}

/// An exclusion clause appended to the search clause / 追加到搜索子句的排除条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclusion {
    pub clause: String,
    pub joins: Vec<JoinSpec>,
}

/// ` AND ({posts}.ID NOT IN ( ids ))` / 文档排除
pub fn exclude_documents(ctx: &SearchContext) -> Option<Exclusion> {
    if !ctx.has_query() {
        return None;
    }
    let ids = parse_id_list(&ctx.settings.exclude_posts_list);
    if ids.is_empty() {
        return None;
    }

    let clause = format!(" AND ({}.ID NOT IN ( {} ))", ctx.schema.posts(), render_ids(&ids));
    tracing::debug!("document exclusion: {}", clause);
    Some(Exclusion { clause, joins: Vec::new() })
}

/// ` AND ( ctax.term_id NOT IN ( ids ) OR ({posts}.post_type IN ( 'page' )))` / 分类排除
pub fn exclude_categories(ctx: &SearchContext) -> Option<Exclusion> {
    if !ctx.has_query() {
        return None;
    }
    let ids = parse_id_list(&ctx.settings.exclude_categories_list);
    if ids.is_empty() {
        return None;
    }

    let clause = format!(
        " AND ( ctax.term_id NOT IN ( {} ) OR ({}.post_type IN ( 'page' )))",
        render_ids(&ids),
        ctx.schema.posts()
    );
    tracing::debug!("category exclusion: {}", clause);
    Some(Exclusion { clause, joins: vec![JoinSpec::ExcludedCategories] })
}

/// Both filters in application order / 按顺序返回所有排除条件
pub fn exclusions(ctx: &SearchContext) -> Vec<Exclusion> {
    [exclude_documents(ctx), exclude_categories(ctx)].into_iter().flatten().collect()
}
