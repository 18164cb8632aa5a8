//! Highlight engine / 关键词高亮
//!
//! Wraps every whole token containing a search term in a styled span.
//! Text inside markup tags is left alone.
//!
//! Terms are applied one after another, so a later term may wrap text that an
//! earlier term already wrapped. Highlighting is not idempotent.

use regex::Regex;

use super::context::{Facet, HighlightStyle, SearchContext};

/// Class of spans styled by a background color / 背景色高亮的 class
pub const COLOR_CLASS: &str = "search-everything-highlight-color";
/// Class of spans styled by raw CSS / 自定义样式高亮的 class
pub const STYLE_CLASS: &str = "search-everything-highlight";

/// Where the text comes from / 文本来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightTarget {
    Title,
    Excerpt,
    Content,
    /// Only highlighted when comment search is on / 仅在启用评论搜索时高亮
    Comment,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Whether the text from here on sits inside a tag / 是否位于标签内部
fn inside_tag(rest: &str) -> bool {
    rest.find(|c: char| c == '<' || c == '>')
        .map_or(false, |i| rest[i..].starts_with('>'))
}

fn accepts(text: &str, start: usize, end: usize) -> bool {
    if let Some(prev) = text[..start].chars().next_back() {
        if prev == '<' || is_word_char(prev) {
            return false;
        }
    }
    let rest = &text[end..];
    if rest.chars().next().map_or(false, is_word_char) {
        return false;
    }
    !inside_tag(rest)
}

fn open_tag(style: &HighlightStyle) -> String {
    match style {
        HighlightStyle::Color(color) => format!(r#"<span class="{}" style="background-color:{}">"#, COLOR_CLASS, color),
        // 样式由管理员配置，原样输出
        HighlightStyle::Style(css) => format!(r#"<span class="{}" style="{}">"#, STYLE_CLASS, css),
    }
}

/// Compiled term patterns with their span style / 已编译的词模式与样式
#[derive(Debug, Clone)]
pub struct Highlighter {
    patterns: Vec<Regex>,
    open: String,
    comments: bool,
}

impl Highlighter {
    /// Compile patterns for the given terms / 为给定的词编译模式
    ///
    /// Terms containing `>` and empty terms are skipped.
    pub fn new<S: AsRef<str>>(terms: &[S], style: &HighlightStyle) -> Self {
        let patterns = terms
            .iter()
            .map(|term| -> &str { term.as_ref() })
            .filter(|term| !term.is_empty() && !term.contains('>'))
            .filter_map(|term| {
                let pattern = format!(r"(?i)\pL*{}\pL*", regex::escape(term));
                match Regex::new(&pattern) {
                    Ok(re) => Some(re),
                    Err(e) => {
                        tracing::warn!("skipping highlight term {:?}: {}", term, e);
                        None
                    }
                }
            })
            .collect();

        Self { patterns, open: open_tag(style), comments: false }
    }

    /// Highlighter for a search result page, `None` for admin pages or when nothing is searched
    /// 前台搜索结果页使用，后台或无搜索词时返回 None
    pub fn for_context(ctx: &SearchContext, admin: bool) -> Option<Self> {
        if admin || !ctx.settings.use_highlight || !ctx.has_query() || ctx.terms.is_empty() {
            return None;
        }
        let mut highlighter = Self::new(ctx.terms.as_slice(), &ctx.highlight);
        highlighter.comments = ctx.is_enabled(Facet::Comments);
        Some(highlighter)
    }

    /// Highlight text of a given origin / 按来源高亮文本
    pub fn apply(&self, target: HighlightTarget, text: &str) -> String {
        if target == HighlightTarget::Comment && !self.comments {
            return text.to_string();
        }
        self.highlight(text)
    }

    pub fn highlight(&self, text: &str) -> String {
        self.patterns
            .iter()
            .fold(text.to_string(), |acc, re| self.wrap_matches(re, &acc))
    }

    fn wrap_matches(&self, re: &Regex, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut copied = 0;
        let mut pos = 0;

        while pos <= text.len() {
            let Some(m) = re.find_at(text, pos) else {
                break;
            };

            if m.is_empty() || !accepts(text, m.start(), m.end()) {
                // 从下一个字符重新尝试
                pos = m.start() + text[m.start()..].chars().next().map_or(1, char::len_utf8);
                continue;
            }

            out.push_str(&text[copied..m.start()]);
            out.push_str(&self.open);
            out.push_str(m.as_str());
            out.push_str("</span>");
            copied = m.end();
            pos = m.end();
        }

        out.push_str(&text[copied..]);
        out
    }
}

/// Highlight `terms` in `text` / 在文本中高亮搜索词
pub fn highlight<S: AsRef<str>>(text: &str, terms: &[S], style: &HighlightStyle) -> String {
    Highlighter::new(terms, style).highlight(text)
}
