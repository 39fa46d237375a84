//! List filters, ordering and facet extraction
//!
//! Every content list goes through the same pipeline: keep the records that
//! satisfy a [`ContentFilter`], then order them newest first. Facets are the
//! sorted distinct values offered as filter choices.

use crate::{normalize_optional, title_matches, ContentRecord, Snippet, SpaceId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Equality filters plus a title search applied to a content list.
///
/// Absent fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentFilter {
    pub space_id: Option<SpaceId>,
    pub language: Option<String>,
    pub project: Option<String>,
    pub search: Option<String>,
}

impl ContentFilter {
    /// Filter scoped to a single space.
    pub fn for_space(space_id: SpaceId) -> Self {
        Self {
            space_id: Some(space_id),
            ..Self::default()
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Trim text fields and treat blank values as absent.
    ///
    /// Query strings such as `?language=` arrive as empty strings, which the
    /// list views mean as "all".
    pub fn normalized(self) -> Self {
        Self {
            space_id: self.space_id,
            language: normalize_optional(self.language),
            project: normalize_optional(self.project),
            search: normalize_optional(self.search),
        }
    }

    /// Whether a record passes every constraint of this filter.
    pub fn matches<R: ContentRecord>(&self, record: &R) -> bool {
        if let Some(space_id) = self.space_id {
            if record.space_id() != Some(space_id) {
                return false;
            }
        }

        if let Some(language) = self.language.as_deref() {
            if record.language() != Some(language) {
                return false;
            }
        }

        if let Some(project) = self.project.as_deref() {
            if record.project() != Some(project) {
                return false;
            }
        }

        match self.search.as_deref() {
            Some(query) => title_matches(record.title(), query),
            None => true,
        }
    }

    /// Keep matching records and order them newest first.
    pub fn apply<R: ContentRecord>(&self, records: Vec<R>) -> Vec<R> {
        let mut kept: Vec<R> = records.into_iter().filter(|r| self.matches(r)).collect();
        sort_newest_first(&mut kept);
        kept
    }
}

/// Order records by creation time descending.
///
/// Ties are broken by id descending so the order is total.
pub fn sort_newest_first<R: ContentRecord>(records: &mut [R]) {
    records.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| b.entity_id().cmp(&a.entity_id()))
    });
}

fn collect_facet<'a, I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    values
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct snippet languages, sorted.
pub fn distinct_languages(snippets: &[Snippet]) -> Vec<String> {
    collect_facet(snippets.iter().map(|s| Some(s.language.as_str())))
}

/// Distinct non-blank projects, sorted.
pub fn distinct_projects<R: ContentRecord>(records: &[R]) -> Vec<String> {
    collect_facet(records.iter().map(|r| r.project()))
}

/// Union of two facet lists, de-duplicated and sorted.
pub fn merge_facets(a: Vec<String>, b: Vec<String>) -> Vec<String> {
    collect_facet(a.iter().chain(b.iter()).map(|v| Some(v.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EntityIdType, Note, NoteId, OwnerId, SnippetId};
    use chrono::{Duration, TimeZone, Utc};

    fn snippet(title: &str, language: &str, project: Option<&str>, age_mins: i64) -> Snippet {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).single().unwrap_or_else(Utc::now);
        let at = base - Duration::minutes(age_mins);
        Snippet {
            snippet_id: SnippetId::now_v7(),
            owner_id: OwnerId::new("owner"),
            space_id: None,
            title: title.to_string(),
            code: "x".to_string(),
            language: language.to_string(),
            description: None,
            tags: vec![],
            project: project.map(str::to_string),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_filter_by_language_and_project() {
        let list = vec![
            snippet("a", "rust", Some("cli"), 3),
            snippet("b", "python", Some("cli"), 2),
            snippet("c", "rust", None, 1),
        ];

        let rust = ContentFilter::default().with_language("rust").apply(list.clone());
        assert_eq!(rust.iter().map(|s| s.title.as_str()).collect::<Vec<_>>(), vec!["c", "a"]);

        let cli = ContentFilter::default().with_project("cli").apply(list);
        assert_eq!(cli.iter().map(|s| s.title.as_str()).collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn test_space_filter_excludes_orphans() {
        let space = SpaceId::now_v7();
        let mut inside = snippet("in", "go", None, 0);
        inside.space_id = Some(space);
        let orphan = snippet("out", "go", None, 0);

        let filter = ContentFilter::for_space(space);
        assert!(filter.matches(&inside));
        assert!(!filter.matches(&orphan));
    }

    #[test]
    fn test_language_filter_never_matches_notes() {
        let now = Utc::now();
        let note = Note {
            note_id: NoteId::now_v7(),
            owner_id: OwnerId::new("owner"),
            space_id: None,
            title: "rust notes".to_string(),
            content: "...".to_string(),
            description: None,
            tags: vec![],
            project: None,
            created_at: now,
            updated_at: now,
        };
        assert!(!ContentFilter::default().with_language("rust").matches(&note));
        assert!(ContentFilter::default().with_search("rust").matches(&note));
    }

    #[test]
    fn test_normalized_drops_blank_values() {
        let filter = ContentFilter::default()
            .with_language("  ")
            .with_project(" web ")
            .with_search("")
            .normalized();
        assert_eq!(filter.language, None);
        assert_eq!(filter.project.as_deref(), Some("web"));
        assert_eq!(filter.search, None);
    }

    #[test]
    fn test_sort_ties_break_on_id() {
        let mut a = snippet("a", "rust", None, 0);
        let mut b = snippet("b", "rust", None, 0);
        a.snippet_id = SnippetId::new(uuid::Uuid::from_u128(1));
        b.snippet_id = SnippetId::new(uuid::Uuid::from_u128(2));
        b.created_at = a.created_at;

        let mut list = vec![a, b];
        sort_newest_first(&mut list);
        assert_eq!(list[0].title, "b");
    }

    #[test]
    fn test_facets_are_sorted_and_distinct() {
        let list = vec![
            snippet("a", "rust", Some("web"), 0),
            snippet("b", "Go", Some(""), 0),
            snippet("c", "rust", Some("api"), 0),
            snippet("d", "css", None, 0),
        ];
        assert_eq!(distinct_languages(&list), vec!["Go", "css", "rust"]);
        assert_eq!(distinct_projects(&list), vec!["api", "web"]);
    }

    #[test]
    fn test_merge_facets() {
        let merged = merge_facets(
            vec!["web".to_string(), "api".to_string()],
            vec!["api".to_string(), "cli".to_string(), " ".to_string()],
        );
        assert_eq!(merged, vec!["api", "cli", "web"]);
    }
}
