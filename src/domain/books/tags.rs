//! Genres and topics attached to books.
//!
//! Genres are a small controlled vocabulary and are stored lowercased. Topics
//! are free-form and keep the spelling they were first entered with, but two
//! topics differing only in case are the same topic.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::books::books::Book;

/// Trims, lowercases and de-duplicates genres, dropping blanks.
pub fn normalize_genres(genres: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    genres
        .into_iter()
        .map(|genre| genre.trim().to_lowercase())
        .filter(|genre| !genre.is_empty() && seen.insert(genre.clone()))
        .collect()
}

/// Trims and de-duplicates topics case-insensitively, keeping the first spelling.
pub fn normalize_topics(topics: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    topics
        .into_iter()
        .map(|topic| topic.trim().to_string())
        .filter(|topic| !topic.is_empty() && seen.insert(topic.to_lowercase()))
        .collect()
}

/// Every genre, topic and author used across a library, for autocompletion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookTags {
    pub genres: Vec<String>,
    pub topics: Vec<String>,
    pub authors: Vec<String>,
}

impl BookTags {
    pub fn collect<'a>(books: impl IntoIterator<Item = &'a Book>) -> Self {
        let mut genres = BTreeSet::new();
        let mut authors = BTreeSet::new();
        let mut topics: Vec<String> = Vec::new();
        let mut topic_keys = BTreeSet::new();

        for book in books {
            genres.extend(normalize_genres(book.genres.clone()));
            authors.extend(book.authors.iter().cloned());
            for topic in normalize_topics(book.topics.clone()) {
                if topic_keys.insert(topic.to_lowercase()) {
                    topics.push(topic);
                }
            }
        }
        topics.sort_by_key(|topic| topic.to_lowercase());

        Self {
            genres: genres.into_iter().collect(),
            topics,
            authors: authors.into_iter().collect(),
        }
    }
}
