//! Article input model.

use serde::{Deserialize, Serialize};

/// One published article as supplied by the content source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    /// ISO-8601 publication date
    #[serde(default)]
    pub published: Option<String>,
    /// Rendered HTML body
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Order articles newest first.
///
/// Dates are compared as strings, which orders ISO-8601 timestamps of the
/// same shape correctly. Undated articles follow the dated ones and keep
/// their relative order.
pub fn newest_first(mut articles: Vec<Article>) -> Vec<Article> {
    articles.sort_by(|a, b| match (&a.published, &b.published) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    articles
}
