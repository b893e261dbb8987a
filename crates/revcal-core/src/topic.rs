//! Study topics and the topic catalog.
//!
//! A topic is identified by a string of the form `"<Subject> <range>"`, e.g.
//! `"Gen chem 1-2"`. Its subject is everything except the last
//! whitespace-separated token.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A unit of study content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    /// Create a topic from its identifier. Surrounding whitespace is trimmed.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self(name.trim().to_string())
    }

    /// Full topic identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Subject prefix: all tokens but the last.
    ///
    /// A single-token topic is its own subject.
    pub fn subject(&self) -> &str {
        match self.0.rsplit_once(char::is_whitespace) {
            Some((subject, _)) => subject.trim_end(),
            None => &self.0,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Topic {
    fn from(s: &str) -> Self {
        Topic::new(s)
    }
}

impl From<String> for Topic {
    fn from(s: String) -> Self {
        Topic::new(s)
    }
}

const DEFAULT_CATALOG: &[&str] = &[
    "Gen chem 1-2", "Gen chem 3-4", "Gen chem 5-6", "Gen chem 7-8", "Gen chem 9/12", "Gen chem 10/11",
    "Physics 1-2", "Physics 3-4", "Physics 5-6", "Physics 7", "Physics 8-9", "Physics 10-12",
    "O chem 1-2", "O chem 3-4", "O chem 5-6", "O chem 7-8", "O chem 9-10", "O chem 11-12",
    "Behavioural 1-2", "Behavioural 3-4",
    "Biochem 1-2", "Biochem 3-4", "Biochem 5-6", "Biochem 7-8", "Biochem 9", "Biochem 10/11",
    "Bio 1-2", "Bio 3-4", "Bio 5-6", "Bio 7-8", "Bio 9-10", "Bio 11-12",
];

/// The built-in topic catalog.
pub fn default_catalog() -> Vec<Topic> {
    DEFAULT_CATALOG.iter().map(|s| Topic::new(*s)).collect()
}

/// Drop empty and repeated topics, keeping the first occurrence.
pub fn dedup_topics<I>(topics: I) -> Vec<Topic>
where
    I: IntoIterator<Item = Topic>,
{
    let mut seen = std::collections::HashSet::new();
    topics
        .into_iter()
        .filter(|t| !t.as_str().is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Parse an uploaded topic list.
///
/// Reads one topic per line from the first comma-separated column. A leading
/// `Topic` header line is skipped, as are blank lines and duplicates.
pub fn parse_catalog(text: &str) -> Vec<Topic> {
    let mut lines = text.lines().peekable();

    if let Some(first) = lines.peek() {
        let cell = first.split(',').next().unwrap_or("").trim();
        if cell.eq_ignore_ascii_case("topic") {
            lines.next();
        }
    }

    dedup_topics(lines.map(|line| {
        let cell = line.split(',').next().unwrap_or("");
        Topic::new(cell.trim().trim_matches('"'))
    }))
}

/// Number of distinct subjects among `topics`.
pub fn distinct_subjects(topics: &[Topic]) -> usize {
    topics
        .iter()
        .map(Topic::subject)
        .collect::<std::collections::HashSet<_>>()
        .len()
}
