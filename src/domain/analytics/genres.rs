use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub name: String,
    pub count: u64,
}

/// How often each genre and topic appears among finished books.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreBreakdown {
    pub genres: Vec<TagCount>,
    pub topics: Vec<TagCount>,
}

impl GenreBreakdown {
    /// Orders both lists by count, most frequent first, then by name.
    pub fn new(genres: Vec<TagCount>, topics: Vec<TagCount>) -> Self {
        Self {
            genres: ranked(genres),
            topics: ranked(topics),
        }
    }
}

fn ranked(mut counts: Vec<TagCount>) -> Vec<TagCount> {
    counts.retain(|tag| tag.count > 0 && !tag.name.is_empty());
    counts.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    counts
}
