//! Facet clause builders / 各搜索维度的子句构建器
//!
//! Each builder turns the context terms into one predicate fragment plus the
//! joins it needs. The composer ORs the fragments together.
//! 每个构建器生成一个谓词片段及其所需连接，由组合器以 OR 合并。

use super::context::{Facet, SearchContext};
use super::sql::{JoinSpec, NO_MATCH};
use crate::utils::slugify;

/// A predicate with its join requirements / 谓词片段及其连接需求
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClauseFragment {
    pub predicate: Option<String>,
    pub joins: Vec<JoinSpec>,
}

impl ClauseFragment {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(predicate: String, joins: Vec<JoinSpec>) -> Self {
        Self { predicate: Some(predicate), joins }
    }

    pub fn is_empty(&self) -> bool {
        self.predicate.is_none()
    }
}

/// Builds the fragment of one facet / 构建单个维度的片段
pub trait FacetBuilder: Send + Sync {
    fn facet(&self) -> Facet;

    fn build(&self, ctx: &SearchContext) -> ClauseFragment;
}

/// Term operator within a facet / 维度内词之间的运算符
#[derive(Debug, Clone, Copy)]
enum Op {
    And,
    Or,
}

impl Op {
    fn as_sql(self) -> &'static str {
        match self {
            Op::And => " AND ",
            Op::Or => " OR ",
        }
    }
}

/// Join one condition per term, then append the whole-phrase alternative
/// 每个词一个条件，必要时追加整句条件
fn match_terms<F>(ctx: &SearchContext, op: Op, cond: F) -> Option<String>
where
    F: Fn(&str) -> String,
{
    if ctx.terms.is_empty() {
        return None;
    }

    let joined = ctx
        .terms
        .iter()
        .map(|term| cond(term))
        .collect::<Vec<_>>()
        .join(op.as_sql());

    if ctx.needs_tie_break() {
        Some(format!("({}) OR {}", joined, cond(&ctx.phrase)))
    } else {
        Some(joined)
    }
}

fn logged(facet: Facet, fragment: ClauseFragment) -> ClauseFragment {
    tracing::debug!(?facet, predicate = ?fragment.predicate, joins = ?fragment.joins, "facet fragment");
    fragment
}

/// Title and content / 标题与正文
pub struct DefaultFacet;

impl FacetBuilder for DefaultFacet {
    fn facet(&self) -> Facet {
        Facet::Default
    }

    fn build(&self, ctx: &SearchContext) -> ClauseFragment {
        let posts = ctx.schema.posts();
        let title = format!("{}.post_title", posts);
        let content = format!("{}.post_content", posts);

        let predicate = match_terms(ctx, Op::And, |term| {
            format!("({} OR {})", ctx.like(&title, term), ctx.like(&content, term))
        });

        match predicate {
            Some(p) => logged(self.facet(), ClauseFragment::new(p, Vec::new())),
            None => ClauseFragment::empty(),
        }
    }
}

/// Tag names / 标签名
pub struct TagFacet;

impl FacetBuilder for TagFacet {
    fn facet(&self) -> Facet {
        Facet::Tags
    }

    fn build(&self, ctx: &SearchContext) -> ClauseFragment {
        match match_terms(ctx, Op::Or, |term| ctx.like("tter.name", term)) {
            Some(p) => logged(
                self.facet(),
                ClauseFragment::new(p, vec![JoinSpec::Terms { taxonomies: vec!["post_tag".to_string()] }]),
            ),
            None => ClauseFragment::empty(),
        }
    }
}

/// Category and custom taxonomy slugs and descriptions / 分类与自定义分类法的 slug 和描述
pub struct CategoryFacet;

impl CategoryFacet {
    fn slug_condition(ctx: &SearchContext, term: &str) -> String {
        if ctx.exact {
            return ctx.like("tter.slug", term);
        }
        let slug = slugify(term);
        if slug.is_empty() {
            // 空 slug 会匹配所有分类
            NO_MATCH.to_string()
        } else {
            ctx.like("tter.slug", &slug)
        }
    }
}

impl FacetBuilder for CategoryFacet {
    fn facet(&self) -> Facet {
        Facet::Categories
    }

    fn build(&self, ctx: &SearchContext) -> ClauseFragment {
        let slug = match_terms(ctx, Op::And, |term| Self::slug_condition(ctx, term));
        let description = match_terms(ctx, Op::And, |term| ctx.like("ttax.description", term));

        match (slug, description) {
            (Some(slug), Some(description)) => logged(
                self.facet(),
                ClauseFragment::new(
                    format!("({}) OR ({})", slug, description),
                    vec![JoinSpec::Terms { taxonomies: ctx.category_taxonomies() }],
                ),
            ),
            _ => ClauseFragment::empty(),
        }
    }
}

/// Custom field values / 自定义字段值
pub struct MetadataFacet;

impl FacetBuilder for MetadataFacet {
    fn facet(&self) -> Facet {
        Facet::Metadata
    }

    fn build(&self, ctx: &SearchContext) -> ClauseFragment {
        match match_terms(ctx, Op::And, |term| ctx.like("m.meta_value", term)) {
            Some(p) => logged(self.facet(), ClauseFragment::new(p, vec![JoinSpec::Metadata])),
            None => ClauseFragment::empty(),
        }
    }
}

/// Post excerpts / 摘要
pub struct ExcerptFacet;

impl FacetBuilder for ExcerptFacet {
    fn facet(&self) -> Facet {
        Facet::Excerpt
    }

    fn build(&self, ctx: &SearchContext) -> ClauseFragment {
        let column = format!("{}.post_excerpt", ctx.schema.posts());
        match match_terms(ctx, Op::And, |term| ctx.like(&column, term)) {
            Some(p) => logged(self.facet(), ClauseFragment::new(p, Vec::new())),
            None => ClauseFragment::empty(),
        }
    }
}

/// Comment content, optionally comment authors / 评论内容，可选评论作者
pub struct CommentFacet;

impl FacetBuilder for CommentFacet {
    fn facet(&self) -> Facet {
        Facet::Comments
    }

    fn build(&self, ctx: &SearchContext) -> ClauseFragment {
        let Some(content) = match_terms(ctx, Op::And, |term| ctx.like("cmt.comment_content", term)) else {
            return ClauseFragment::empty();
        };

        let mut search = content;
        if ctx.settings.use_cmt_authors {
            if let Some(author) = match_terms(ctx, Op::Or, |term| ctx.like("cmt.comment_author", term)) {
                search = format!("({}) OR ({})", search, author);
            }
        }

        if ctx.settings.approved_comments_only {
            search = format!("({}) AND cmt.comment_approved = '1'", search);
        }

        logged(self.facet(), ClauseFragment::new(search, vec![JoinSpec::Comments]))
    }
}

/// Author display names / 作者显示名
pub struct AuthorFacet;

impl FacetBuilder for AuthorFacet {
    fn facet(&self) -> Facet {
        Facet::Authors
    }

    fn build(&self, ctx: &SearchContext) -> ClauseFragment {
        match match_terms(ctx, Op::Or, |term| ctx.like("u.display_name", term)) {
            Some(p) => logged(self.facet(), ClauseFragment::new(p, vec![JoinSpec::Authors])),
            None => ClauseFragment::empty(),
        }
    }
}

/// All builders in registry order / 按注册顺序返回全部构建器
pub fn default_facets() -> Vec<Box<dyn FacetBuilder>> {
    vec![
        Box::new(DefaultFacet),
        Box::new(TagFacet),
        Box::new(CategoryFacet),
        Box::new(MetadataFacet),
        Box::new(ExcerptFacet),
        Box::new(CommentFacet),
        Box::new(AuthorFacet),
    ]
}
