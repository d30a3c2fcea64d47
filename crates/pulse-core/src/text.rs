//! Text normalization for raw post bodies.
//!
//! Pure functions: no shared state, deterministic for a given input. Tag and
//! mention extraction run on the *raw* text, before cleaning strips the sigils.

use std::sync::LazyLock;

use regex::Regex;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?\S+|www\S+").expect("valid url regex"));

static NOISE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s!?.,]").expect("valid noise regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\w+)").expect("valid hashtag regex"));

static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(\w+)").expect("valid mention regex"));

/// Strips URL-like substrings and non-word noise from `text`.
///
/// Keeps word characters, whitespace and `! ? . ,`; collapses whitespace runs
/// to a single space and trims both ends. Empty input yields an empty string.
#[must_use]
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let without_urls = URL_RE.replace_all(text, "");
    let without_noise = NOISE_RE.replace_all(&without_urls, "");
    WHITESPACE_RE
        .replace_all(&without_noise, " ")
        .trim()
        .to_string()
}

/// Extracts `#tag` tokens, lower-cased and without the `#`.
///
/// Order of occurrence is preserved and duplicates are kept; callers tally.
#[must_use]
pub fn extract_hashtags(text: &str) -> Vec<String> {
    capture_tokens(&HASHTAG_RE, text)
}

/// Extracts `@user` tokens, lower-cased and without the `@`.
#[must_use]
pub fn extract_mentions(text: &str) -> Vec<String> {
    capture_tokens(&MENTION_RE, text)
}

fn capture_tokens(re: &Regex, text: &str) -> Vec<String> {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_removes_urls() {
        let cleaned = clean_text("Rally tonight https://t.co/abc123 see www.example.com/x you there");
        assert_eq!(cleaned, "Rally tonight see you there");
    }

    #[test]
    fn clean_text_keeps_basic_punctuation() {
        assert_eq!(clean_text("Great rally today! #TVK"), "Great rally today! TVK");
        assert_eq!(clean_text("Really?? Yes, it was."), "Really?? Yes, it was.");
    }

    #[test]
    fn clean_text_drops_symbols_and_collapses_whitespace() {
        assert_eq!(clean_text("  a  &&  b\t\n c  "), "a b c");
        assert_eq!(clean_text("@alice — thanks ❤"), "alice thanks");
    }

    #[test]
    fn clean_text_keeps_non_latin_words() {
        assert_eq!(clean_text("விஜய் rally"), "விஜய் rally");
    }

    #[test]
    fn clean_text_empty_input() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text("   "), "");
    }

    #[test]
    fn hashtags_are_lowercased_in_order_with_duplicates() {
        let tags = extract_hashtags("#TVK rally #Vote2026 and again #tvk");
        assert_eq!(tags, vec!["tvk", "vote2026", "tvk"]);
    }

    #[test]
    fn mentions_are_lowercased_without_sigil() {
        let mentions = extract_mentions("thanks @Alice and @bob_99!");
        assert_eq!(mentions, vec!["alice", "bob_99"]);
    }

    #[test]
    fn bare_sigils_are_ignored() {
        assert!(extract_hashtags("# nothing here").is_empty());
        assert!(extract_mentions("email me @ home").is_empty());
    }
}
