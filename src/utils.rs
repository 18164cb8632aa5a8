//! String helpers shared by the tokenizer and the clause builders / 分词器与子句构建器共用的字符串工具

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static ENTITY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"&.+?;").unwrap());
static SLUG_INVALID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\p{L}\p{N}\s_-]").unwrap());
static SLUG_SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static SLUG_DASHES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").unwrap());

/// Remove backslash escaping from request input / 去除请求参数中的反斜杠转义
/// `\x` becomes `x`, `\\` becomes `\`, `\0` becomes NUL, a trailing lone backslash is dropped.
pub fn strip_slashes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('\0'),
            Some(next) => out.push(next),
            None => {}
        }
    }

    out
}

/// Coerce a list entry to an integer the way a PHP `(int)` cast does / 按 PHP 整数转换规则解析
/// Leading whitespace and an optional sign are accepted, then the leading digits are read.
/// Anything else yields 0, so `"abc"` is 0 and `"12abc"` is 12.
pub fn coerce_int(entry: &str) -> i64 {
    let s = entry.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    // 溢出时饱和
    let value = digits[..end].parse::<i64>().unwrap_or(if end == 0 { 0 } else { i64::MAX });
    if negative { -value } else { value }
}

/// Build a URL slug from a title / 根据标题生成 slug
/// Markup and entities are stripped, text is lowercased, whitespace and dots become dashes,
/// anything that is not a letter, digit, underscore or dash is removed.
pub fn slugify(title: &str) -> String {
    let text = TAG_RE.replace_all(title, "");
    let text = ENTITY_RE.replace_all(&text, "");
    let text = text.to_lowercase().replace('.', "-");
    let text = SLUG_INVALID_RE.replace_all(&text, "");
    let text = SLUG_SPACE_RE.replace_all(text.trim(), "-");
    let text = SLUG_DASHES_RE.replace_all(&text, "-");

    text.trim_matches('-').to_string()
}
