//! Literal, case-insensitive text matching over task title and description.
//!
//! # Invariants
//! - User text is escaped before compilation; metacharacters match
//!   themselves and never form a pattern.
//! - Matching is Unicode case-insensitive.
//! - Compiled size is bounded, so hostile input cannot grow the automaton.

use crate::model::task::Task;
use regex::{Regex, RegexBuilder};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Longest accepted search term, in characters.
pub const MAX_SEARCH_CHARS: usize = 200;
const COMPILED_SIZE_LIMIT: usize = 1 << 20;

/// Search term rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    TooLong { max_chars: usize },
    Compile(String),
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooLong { max_chars } => {
                write!(f, "search term must be at most {max_chars} characters")
            }
            Self::Compile(message) => write!(f, "search term cannot be used: {message}"),
        }
    }
}

impl Error for SearchError {}

/// Compiled literal substring matcher.
#[derive(Debug, Clone)]
pub struct LiteralSearch {
    term: String,
    matcher: Regex,
}

impl LiteralSearch {
    /// Compiles `term` as literal text.
    ///
    /// Returns `Ok(None)` for an empty term, which means "no search filter".
    pub fn new(term: &str) -> Result<Option<Self>, SearchError> {
        if term.is_empty() {
            return Ok(None);
        }
        if term.chars().count() > MAX_SEARCH_CHARS {
            return Err(SearchError::TooLong {
                max_chars: MAX_SEARCH_CHARS,
            });
        }

        let matcher = RegexBuilder::new(&regex::escape(term))
            .case_insensitive(true)
            .size_limit(COMPILED_SIZE_LIMIT)
            .build()
            .map_err(|err| SearchError::Compile(err.to_string()))?;

        Ok(Some(Self {
            term: term.to_string(),
            matcher,
        }))
    }

    /// Original, unescaped term.
    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }

    /// True when the title or the description contains the term.
    pub fn matches_task(&self, task: &Task) -> bool {
        self.is_match(&task.title)
            || task
                .description
                .as_deref()
                .is_some_and(|description| self.is_match(description))
    }
}

#[cfg(test)]
mod tests {
    use super::{LiteralSearch, SearchError, MAX_SEARCH_CHARS};
    use crate::model::task::Task;
    use uuid::Uuid;

    fn search(term: &str) -> LiteralSearch {
        LiteralSearch::new(term)
            .expect("term should compile")
            .expect("term should be non-empty")
    }

    #[test]
    fn empty_term_means_no_filter() {
        assert!(LiteralSearch::new("").unwrap().is_none());
    }

    #[test]
    fn matching_is_case_insensitive_substring() {
        let milk = search("MiLk");
        assert!(milk.is_match("buy milk today"));
        assert!(milk.is_match("MILKSHAKE"));
        assert!(!milk.is_match("bread"));
    }

    #[test]
    fn metacharacters_are_literal() {
        let dot_star = search(".*");
        assert!(!dot_star.is_match("anything at all"));
        assert!(dot_star.is_match("regex .* inside"));

        let group = search("(a|b)");
        assert!(!group.is_match("a"));
        assert!(group.is_match("pick (a|b) now"));

        let nested = search("(a+)+$");
        assert!(!nested.is_match("aaaaaaaaaaaaaaaaaaaaaaaaaaaa!"));
    }

    #[test]
    fn unicode_case_folding_applies() {
        assert!(search("ÉCOLE").is_match("retour à l'école"));
    }

    #[test]
    fn overlong_term_is_rejected() {
        let term = "x".repeat(MAX_SEARCH_CHARS + 1);
        let err = LiteralSearch::new(&term).expect_err("too long");
        assert_eq!(
            err,
            SearchError::TooLong {
                max_chars: MAX_SEARCH_CHARS
            }
        );
    }

    #[test]
    fn task_match_checks_title_then_description() {
        let owner = Uuid::new_v4();
        let mut task = Task::new(owner, "Weekly report");
        task.description = Some("Send numbers to finance".to_string());

        assert!(search("report").matches_task(&task));
        assert!(search("FINANCE").matches_task(&task));
        assert!(!search("budget").matches_task(&task));

        task.description = None;
        assert!(!search("finance").matches_task(&task));
    }
}
