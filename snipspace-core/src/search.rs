//! Title search matching
//!
//! Content lists are searched by title only. A query is split into lowercase
//! whitespace-separated terms and every term has to hit a word of the title.
//! The last term is allowed to match as a prefix so results narrow while the
//! user is still typing.

/// Split text into lowercase search words.
///
/// Words are runs of alphanumeric characters; punctuation separates them.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Whether `title` satisfies the search `query`.
///
/// An empty or whitespace-only query matches every title.
pub fn title_matches(title: &str, query: &str) -> bool {
    let terms = tokenize(query);
    if terms.is_empty() {
        return true;
    }

    let words = tokenize(title);
    let last = terms.len() - 1;

    terms.iter().enumerate().all(|(i, term)| {
        if i == last {
            words.iter().any(|word| word.starts_with(term.as_str()))
        } else {
            words.iter().any(|word| word == term)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_matches_everything() {
        assert!(title_matches("Anything at all", ""));
        assert!(title_matches("", "   "));
    }

    #[test]
    fn test_terms_are_case_insensitive() {
        assert!(title_matches("Parse JSON Config", "json config"));
        assert!(title_matches("parse json config", "JSON"));
    }

    #[test]
    fn test_last_term_matches_prefix() {
        assert!(title_matches("Debounce helper", "deb"));
        assert!(title_matches("Debounce helper", "debounce hel"));
        // Only the final term is a prefix match.
        assert!(!title_matches("Debounce helper", "deb helper"));
    }

    #[test]
    fn test_every_term_must_match() {
        assert!(!title_matches("Binary search", "binary tree"));
        assert!(title_matches("Binary search tree", "tree binary"));
    }

    #[test]
    fn test_punctuation_splits_words() {
        assert_eq!(tokenize("useEffect() - cleanup!"), vec!["useeffect", "cleanup"]);
        assert!(title_matches("async/await basics", "await"));
    }
}
