//! Query composer / 查询组合器
//!
//! Merges the facet fragments, exclusions, rewrites and safety filters into
//! one predicate with its joins. Composition is pure and never fails.
//! 将各维度片段、排除条件、改写和安全过滤合并为一个谓词及其连接。

use serde::{Deserialize, Serialize};

use super::context::SearchContext;
use super::exclusion::exclusions;
use super::facets::{default_facets, FacetBuilder};
use super::rewrite::{ensure_distinct, exclude_future, exclude_revisions, PredicateRewrite};
use super::sql::{Dialect, JoinSet, Schema};

/// Query pieces supplied by the executor / 执行器提供的原始查询片段
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseQuery {
    /// The executor's own search clause / 执行器自带的搜索子句
    pub search: String,
    /// Remaining predicate, e.g. type and status / 其余谓词
    pub where_clause: String,
    /// Joins already present / 已有的连接
    pub join: String,
    pub distinct: bool,
}

impl BaseQuery {
    pub fn new(search: impl Into<String>, where_clause: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            where_clause: where_clause.into(),
            ..Default::default()
        }
    }

    /// Published posts, the usual shape of a front-end search / 已发布文章
    pub fn published_posts(schema: &Schema) -> Self {
        let posts = schema.posts();
        Self::new(
            "",
            format!(" AND {posts}.post_type = 'post' AND ({posts}.post_status = 'publish')"),
        )
    }
}

/// Composition result / 组合结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedQuery {
    /// Search clause after facets and exclusions / 搜索子句
    pub search: String,
    /// Full predicate: search, base predicate, rewrites and safety filters / 完整谓词
    pub where_clause: String,
    /// Base join text / 原有连接
    pub join: String,
    /// Joins declared by facets and filters / 各维度声明的连接
    pub joins: JoinSet,
    pub distinct: bool,
    pub schema: Schema,
    pub dialect: Dialect,
}

impl ComposedQuery {
    fn unchanged(base: &BaseQuery, ctx: &SearchContext) -> Self {
        Self {
            search: base.search.clone(),
            where_clause: format!("{}{}", base.search, base.where_clause),
            join: base.join.clone(),
            joins: JoinSet::new(),
            distinct: base.distinct,
            schema: ctx.schema.clone(),
            dialect: ctx.dialect,
        }
    }

    /// Base joins followed by the declared ones / 原有连接加声明的连接
    pub fn join_sql(&self) -> String {
        format!("{}{}", self.join, self.joins.to_sql(&self.schema, self.dialect))
    }

    /// Full statement over the posts table / 基于文章表的完整语句
    pub fn statement(&self, columns: &str) -> String {
        let sql = format!(
            "SELECT {} FROM {}{} WHERE 1=1 {}",
            columns,
            self.schema.posts(),
            self.join_sql(),
            self.where_clause
        );
        if self.distinct {
            ensure_distinct(&sql)
        } else {
            sql
        }
    }
}

/// Composes search predicates from a facet registry / 基于维度注册表组合搜索谓词
pub struct QueryComposer {
    facets: Vec<Box<dyn FacetBuilder>>,
}

impl Default for QueryComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryComposer {
    pub fn new() -> Self {
        Self::with_facets(default_facets())
    }

    pub fn with_facets(facets: Vec<Box<dyn FacetBuilder>>) -> Self {
        Self { facets }
    }

    pub fn compose(&self, ctx: &SearchContext, base: &BaseQuery) -> ComposedQuery {
        if !ctx.is_search() {
            return ComposedQuery::unchanged(base, ctx);
        }

        let mut joins = JoinSet::new();
        let mut predicates = Vec::new();

        for builder in self.facets.iter().filter(|b| ctx.is_enabled(b.facet())) {
            let fragment = builder.build(ctx);
            if let Some(predicate) = fragment.predicate {
                predicates.push(format!("({})", predicate));
                joins.extend(fragment.joins);
            }
        }

        let mut search = if predicates.is_empty() {
            base.search.clone()
        } else {
            format!(" AND ({}) ", predicates.join(" OR "))
        };

        for exclusion in exclusions(ctx) {
            search.push_str(&exclusion.clause);
            joins.extend(exclusion.joins);
        }

        let mut where_clause = format!("{}{}", search, base.where_clause);
        for rewrite in PredicateRewrite::for_context(ctx) {
            where_clause = rewrite.apply(&where_clause, &ctx.schema);
        }

        if ctx.has_query() {
            where_clause = exclude_revisions(&where_clause, &ctx.schema);
            where_clause = exclude_future(&where_clause, &ctx.schema);
        }

        tracing::debug!("composed where: {}", where_clause);

        ComposedQuery {
            search,
            where_clause,
            join: base.join.clone(),
            joins,
            distinct: base.distinct || ctx.has_query(),
            schema: ctx.schema.clone(),
            dialect: ctx.dialect,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    use super::*;
    use crate::search::context::SearchRequest;
    use crate::search::sql::JoinSpec;
    use crate::settings::SearchSettings;

    fn context(request: SearchRequest, settings: SearchSettings, dialect: Dialect) -> SearchContext {
        SearchContext::new(&request, Arc::new(settings), Schema::default(), dialect)
    }

    #[test]
    fn test_no_query_returns_base_unchanged() {
        let base = BaseQuery::published_posts(&Schema::default());
        let ctx = context(SearchRequest::new(""), SearchSettings::default(), Dialect::MySql);
        let composed = QueryComposer::new().compose(&ctx, &base);

        assert_eq!(composed.search, "");
        assert_eq!(composed.where_clause, base.where_clause);
        assert!(composed.joins.is_empty());
        assert!(!composed.distinct);
    }

    #[test]
    fn test_default_only_composition() {
        let base = BaseQuery::published_posts(&Schema::default());
        let ctx = context(SearchRequest::new("cat"), SearchSettings::default(), Dialect::MySql);
        let composed = QueryComposer::new().compose(&ctx, &base);

        assert_eq!(
            composed.search,
            " AND ((((wp_posts.post_title LIKE '%cat%') OR (wp_posts.post_content LIKE '%cat%')))) "
        );
        assert!(composed.where_clause.ends_with(
            " AND wp_posts.post_type != 'revision') AND wp_posts.post_status != 'future'"
        ));
        assert!(composed.joins.is_empty());
        assert!(composed.distinct);
    }

    #[test]
    fn test_fragments_are_or_combined_with_merged_joins() {
        let mut settings = SearchSettings::default();
        settings.use_tag_search = true;
        settings.use_category_search = true;
        settings.use_authors = true;
        let ctx = context(SearchRequest::new("cat"), settings, Dialect::MySql);
        let composed = QueryComposer::new().compose(&ctx, &BaseQuery::default());

        assert!(composed.search.matches(") OR (").count() >= 3);
        assert_eq!(
            composed.joins.specs(),
            &[
                JoinSpec::Terms { taxonomies: vec!["post_tag".into(), "category".into()] },
                JoinSpec::Authors,
            ]
        );
        assert_eq!(composed.join_sql().matches(" LEFT JOIN ").count(), 4);
    }

    #[test]
    fn test_suggestion_call_composes_without_query() {
        let base = BaseQuery::new(" AND (base)", "");
        let ctx = context(SearchRequest::new("").suggestion(true), SearchSettings::default(), Dialect::MySql);
        let composed = QueryComposer::new().compose(&ctx, &base);

        // 无词可用时保留原搜索子句，且不加安全过滤
        assert_eq!(composed.search, " AND (base)");
        assert_eq!(composed.where_clause, " AND (base)");
        assert!(!composed.distinct);
    }

    #[test]
    fn test_statement_is_distinct() {
        let ctx = context(SearchRequest::new("cat"), SearchSettings::default(), Dialect::MySql);
        let composed = QueryComposer::new().compose(&ctx, &BaseQuery::default());
        assert!(composed.statement("wp_posts.ID").starts_with("SELECT DISTINCT wp_posts.ID FROM wp_posts"));
    }

    const FIXTURE: &[&str] = &[
        "CREATE TABLE wp_posts (ID INTEGER PRIMARY KEY, post_author INTEGER NOT NULL DEFAULT 0, \
         post_title TEXT NOT NULL DEFAULT '', post_content TEXT NOT NULL DEFAULT '', \
         post_excerpt TEXT NOT NULL DEFAULT '', post_status TEXT NOT NULL DEFAULT 'publish', \
         post_type TEXT NOT NULL DEFAULT 'post', post_password TEXT NOT NULL DEFAULT '')",
        "CREATE TABLE wp_comments (comment_ID INTEGER PRIMARY KEY, comment_post_ID INTEGER NOT NULL, \
         comment_author TEXT NOT NULL DEFAULT '', comment_content TEXT NOT NULL DEFAULT '', \
         comment_approved TEXT NOT NULL DEFAULT '1')",
        "CREATE TABLE wp_users (ID INTEGER PRIMARY KEY, display_name TEXT NOT NULL DEFAULT '')",
        "CREATE TABLE wp_postmeta (meta_id INTEGER PRIMARY KEY, post_id INTEGER NOT NULL, meta_value TEXT)",
        "CREATE TABLE wp_terms (term_id INTEGER PRIMARY KEY, name TEXT NOT NULL, slug TEXT NOT NULL)",
        "CREATE TABLE wp_term_taxonomy (term_taxonomy_id INTEGER PRIMARY KEY, term_id INTEGER NOT NULL, \
         taxonomy TEXT NOT NULL, description TEXT NOT NULL DEFAULT '')",
        "CREATE TABLE wp_term_relationships (object_id INTEGER NOT NULL, term_taxonomy_id INTEGER NOT NULL)",
        "INSERT INTO wp_users (ID, display_name) VALUES (1, 'Jane Doe'), (2, 'Bob')",
        "INSERT INTO wp_posts (ID, post_author, post_title, post_content, post_status, post_type, post_password) VALUES \
         (1, 2, 'Hello world', 'first post', 'publish', 'post', ''), \
         (2, 2, 'Other', 'hello there world', 'publish', 'post', ''), \
         (3, 1, 'Cats', 'about cats', 'publish', 'post', ''), \
         (4, 2, 'Hello draft', 'unfinished', 'draft', 'post', ''), \
         (5, 2, 'Hello page', 'static', 'publish', 'page', ''), \
         (6, 2, 'Hello world', 'old copy', 'inherit', 'revision', ''), \
         (7, 2, 'Hello world', 'scheduled', 'future', 'post', ''), \
         (8, 2, 'Hello secret', 'locked', 'publish', 'page', 'pw')",
        "INSERT INTO wp_comments (comment_post_ID, comment_author, comment_content, comment_approved) VALUES \
         (3, 'Ann', 'zebra sighting', '1'), \
         (2, 'Zed', 'zebra pending', '0')",
        "INSERT INTO wp_postmeta (post_id, meta_value) VALUES (2, 'giraffe')",
        "INSERT INTO wp_terms (term_id, name, slug) VALUES (10, 'News', 'news'), (11, 'Misc', 'misc'), (12, 'hello', 'hello')",
        "INSERT INTO wp_term_taxonomy (term_taxonomy_id, term_id, taxonomy, description) VALUES \
         (10, 10, 'category', 'daily news'), (11, 11, 'category', ''), (12, 12, 'post_tag', '')",
        "INSERT INTO wp_term_relationships (object_id, term_taxonomy_id) VALUES (1, 10), (2, 11), (3, 12), (3, 11)",
    ];

    async fn fixture() -> SqlitePool {
        // 内存库每个连接独立，只保留一个连接
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        for statement in FIXTURE {
            sqlx::query(*statement).execute(&pool).await.unwrap();
        }
        pool
    }

    async fn search_ids(pool: &SqlitePool, query: &str, settings: SearchSettings) -> Vec<i64> {
        let ctx = context(SearchRequest::new(query), settings, Dialect::Sqlite);
        let composed = QueryComposer::new().compose(&ctx, &BaseQuery::published_posts(&ctx.schema));
        let sql = format!("{} ORDER BY wp_posts.ID", composed.statement("wp_posts.ID"));
        sqlx::query_scalar::<_, i64>(&sql).fetch_all(pool).await.unwrap()
    }

    #[tokio::test]
    async fn test_default_search_matches_title_or_content() {
        let pool = fixture().await;
        assert_eq!(search_ids(&pool, "hello world", SearchSettings::default()).await, vec![1, 2]);
        assert_eq!(search_ids(&pool, "zzz", SearchSettings::default()).await, Vec::<i64>::new());
    }

    #[tokio::test]
    async fn test_quotes_in_terms_are_harmless() {
        let pool = fixture().await;
        assert_eq!(search_ids(&pool, "it's", SearchSettings::default()).await, Vec::<i64>::new());
        assert_eq!(
            search_ids(&pool, "x'); DROP TABLE wp_posts; --", SearchSettings::default()).await,
            Vec::<i64>::new()
        );
        assert_eq!(search_ids(&pool, "cats", SearchSettings::default()).await, vec![3]);
    }

    #[tokio::test]
    async fn test_tag_search_adds_tagged_posts() {
        let pool = fixture().await;
        let mut settings = SearchSettings::default();
        settings.use_tag_search = true;
        assert_eq!(search_ids(&pool, "hello", settings).await, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_pages_and_drafts_rewrites() {
        let pool = fixture().await;
        let mut settings = SearchSettings::default();
        settings.use_page_search = true;
        settings.use_draft_search = true;
        assert_eq!(search_ids(&pool, "hello", settings.clone()).await, vec![1, 2, 4, 5, 8]);

        settings.approved_pages_only = true;
        assert_eq!(search_ids(&pool, "hello", settings).await, vec![1, 2, 4, 5]);
    }

    #[tokio::test]
    async fn test_comment_search_approved_only() {
        let pool = fixture().await;
        let mut settings = SearchSettings::default();
        settings.use_comment_search = true;
        assert_eq!(search_ids(&pool, "zebra", settings.clone()).await, vec![2, 3]);

        settings.approved_comments_only = true;
        assert_eq!(search_ids(&pool, "zebra", settings.clone()).await, vec![3]);

        settings.use_cmt_authors = true;
        assert_eq!(search_ids(&pool, "zed", settings).await, Vec::<i64>::new());
    }

    #[tokio::test]
    async fn test_author_and_metadata_search() {
        let pool = fixture().await;
        let mut settings = SearchSettings::default();
        settings.use_authors = true;
        settings.use_metadata_search = true;
        assert_eq!(search_ids(&pool, "jane", settings.clone()).await, vec![3]);
        assert_eq!(search_ids(&pool, "giraffe", settings).await, vec![2]);
    }

    #[tokio::test]
    async fn test_category_search_by_description() {
        let pool = fixture().await;
        let mut settings = SearchSettings::default();
        settings.use_category_search = true;
        assert_eq!(search_ids(&pool, "daily", settings).await, vec![1]);
    }

    #[tokio::test]
    async fn test_document_exclusion_is_idempotent() {
        let pool = fixture().await;
        let mut settings = SearchSettings::default();
        settings.exclude_posts_list = "1".to_string();
        let once = search_ids(&pool, "hello", settings.clone()).await;
        assert_eq!(once, vec![2]);

        settings.exclude_posts_list = "1, 1".to_string();
        assert_eq!(search_ids(&pool, "hello", settings.clone()).await, once);

        settings.exclude_posts_list = "1, 99".to_string();
        assert_eq!(search_ids(&pool, "hello", settings).await, once);
    }

    #[tokio::test]
    async fn test_category_exclusion_exempts_pages() {
        let pool = fixture().await;
        let mut settings = SearchSettings::default();
        settings.exclude_categories_list = "10".to_string();
        assert_eq!(search_ids(&pool, "hello", settings.clone()).await, vec![2]);

        settings.use_page_search = true;
        assert_eq!(search_ids(&pool, "hello", settings).await, vec![2, 5, 8]);
    }
}
