//! Query tokenizer - splits the raw search string into terms / 查询分词器
//!
//! Supports / 支持：
//! - Double-quoted phrases, an unterminated trailing quote closes at end of input / 双引号短语
//! - Whitespace, comma and plus separated words / 空白、逗号、加号分隔的单词
//! - Sentence mode: the whole string is one term / 整句模式

use crate::utils::strip_slashes;

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == ',' || c == '+'
}

fn trim_term(raw: &str) -> &str {
    raw.trim_matches(|c: char| c == '"' || c == '\'' || c.is_whitespace())
}

/// Tokenize the raw query string / 对原始查询字符串分词
///
/// Terms keep the order in which they appear. Empty terms are never returned.
pub fn tokenize(raw: &str, sentence: bool) -> Vec<String> {
    let unescaped = strip_slashes(raw);

    if sentence {
        let whole = unescaped.trim();
        return if whole.is_empty() { Vec::new() } else { vec![whole.to_string()] };
    }

    let mut terms = Vec::new();
    let mut rest = unescaped.as_str();

    while let Some(c) = rest.chars().next() {
        let run_len = if c == '"' {
            // 未闭合的引号一直延伸到输入末尾
            match rest[1..].find('"') {
                Some(i) => 1 + i + 1,
                None => rest.len(),
            }
        } else if is_separator(c) {
            rest = &rest[c.len_utf8()..];
            continue;
        } else {
            rest.find(|ch: char| is_separator(ch) || ch == '"')
                .unwrap_or(rest.len())
        };

        let term = trim_term(&rest[..run_len]);
        if !term.is_empty() {
            terms.push(term.to_string());
        }
        rest = &rest[run_len..];
    }

    terms
}

/// The whole query as one phrase, used by the sentence tie-break / 整句短语
///
/// `"hello world" extra` becomes `hello world extra`.
pub fn sentence_phrase(raw: &str) -> String {
    strip_slashes(raw).replace('"', "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tokenize_words() {
        assert_eq!(tokenize("hello world", false), vec!["hello", "world"]);
        assert_eq!(tokenize("a,b+c  d", false), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_tokenize_quoted_phrase() {
        assert_eq!(tokenize(r#""hello world" extra"#, false), vec!["hello world", "extra"]);
        assert_eq!(tokenize(r#"one "two three"four"#, false), vec!["one", "two three", "four"]);
    }

    #[test]
    fn test_tokenize_unterminated_quote() {
        assert_eq!(tokenize(r#"alpha "beta gamma"#, false), vec!["alpha", "beta gamma"]);
        assert_eq!(tokenize("\"foo bar\nbaz", false), vec!["foo bar\nbaz"]);
        assert_eq!(tokenize("\"foo\nbar\" baz", false), vec!["foo\nbar", "baz"]);
    }

    #[test]
    fn test_tokenize_escaped_quotes() {
        assert_eq!(tokenize(r#"\"hello world\" extra"#, false), vec!["hello world", "extra"]);
    }

    #[test]
    fn test_tokenize_trims_single_quotes() {
        assert_eq!(tokenize("'quoted' plain", false), vec!["quoted", "plain"]);
    }

    #[test]
    fn test_tokenize_only_separators() {
        assert!(tokenize(r#"  "" , ,  "  "#, false).is_empty());
        assert!(tokenize("", false).is_empty());
    }

    #[test]
    fn test_tokenize_sentence_mode() {
        assert_eq!(tokenize("  hello big world ", true), vec!["hello big world"]);
        assert!(tokenize("   ", true).is_empty());
    }

    #[test]
    fn test_tokenize_unicode() {
        assert_eq!(tokenize("café 中文 ünï", false), vec!["café", "中文", "ünï"]);
    }

    #[test]
    fn test_sentence_phrase() {
        assert_eq!(sentence_phrase(r#""hello world" extra"#), "hello world extra");
        assert_eq!(sentence_phrase("  single "), "single");
    }

    proptest! {
        #[test]
        fn test_tokens_never_empty(raw in "\\PC{0,40}") {
            for term in tokenize(&raw, false) {
                prop_assert!(!term.is_empty());
            }
        }

        #[test]
        fn test_requoting_a_token_is_stable(raw in "[a-zA-Z0-9 ,+\"'éü]{0,40}") {
            for term in tokenize(&raw, false) {
                let requoted = tokenize(&format!("\"{}\"", term), false);
                prop_assert_eq!(requoted, vec![term.clone()]);
            }
        }
    }
}
