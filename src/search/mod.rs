//! Search module - composes search predicates and highlights results / 搜索模块
//!
//! Architecture principles / 架构原则：
//! - The module only builds predicates and joins, it never executes queries
//! - The executor supplies its base query and runs the composed one
//! - Call direction: Executor → Search (unidirectional) / 调用方向
//!
//! Search features / 搜索特性：
//! - Title and content, tags, categories and custom taxonomies
//! - Custom fields, excerpts, comments and comment authors, post authors
//! - Pages, drafts and attachments via predicate rewrites
//! - Document and category exclusion lists
//! - Keyword highlighting of rendered output

pub mod composer;
pub mod context;
pub mod exclusion;
pub mod facets;
pub mod highlight;
pub mod rewrite;
pub mod sql;
pub mod tokenizer;

pub use composer::{BaseQuery, ComposedQuery, QueryComposer};
pub use context::{Facet, HighlightStyle, SearchContext, SearchRequest};
pub use facets::{ClauseFragment, FacetBuilder};
pub use highlight::{highlight, HighlightTarget, Highlighter};
pub use rewrite::PredicateRewrite;
pub use sql::{Dialect, JoinSet, JoinSpec, Schema};
pub use tokenizer::tokenize;
