//! Tag usage across the corpus.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::article::Article;
use crate::layout::WordCloudEntry;

/// How many articles carry a tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub frequency: u32,
}

/// Articles carrying one tag, for the per-tag listing pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPage {
    pub tag: String,
    /// Article ids in corpus order
    pub article_ids: Vec<String>,
}

/// Counts tags, leaving out the tag that marks syndicated articles
#[derive(Debug, Clone)]
pub struct TagAggregator {
    platform_tag: String,
}

impl TagAggregator {
    pub fn new(platform_tag: impl Into<String>) -> Self {
        Self {
            platform_tag: platform_tag.into(),
        }
    }

    /// Count every (article, tag) pair. Sorted by frequency descending, then
    /// by tag ascending.
    pub fn count(&self, articles: &[Article]) -> Vec<TagCount> {
        let mut counts: HashMap<&str, u32> = HashMap::new();

        for tag in articles.iter().flat_map(|a| a.tags.iter()) {
            if *tag == self.platform_tag {
                continue;
            }
            *counts.entry(tag.as_str()).or_insert(0) += 1;
        }

        let mut tag_counts: Vec<TagCount> = counts
            .into_iter()
            .map(|(tag, frequency)| TagCount {
                tag: tag.to_string(),
                frequency,
            })
            .collect();
        tag_counts.sort_by(|a, b| b.frequency.cmp(&a.frequency).then_with(|| a.tag.cmp(&b.tag)));
        tag_counts
    }

    /// Weighted entries for the tag cloud
    pub fn entries(tag_counts: &[TagCount]) -> Vec<WordCloudEntry> {
        tag_counts
            .iter()
            .map(|tc| WordCloudEntry::new(tc.tag.clone(), tc.frequency))
            .collect()
    }
}

/// Every distinct tag in first-seen order with the articles that carry it.
///
/// The platform tag is listed too; only counting excludes it.
pub fn tag_pages(articles: &[Article]) -> Vec<TagPage> {
    let mut pages: Vec<TagPage> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for article in articles {
        for tag in &article.tags {
            let i = *index.entry(tag.as_str()).or_insert_with(|| {
                pages.push(TagPage {
                    tag: tag.clone(),
                    article_ids: Vec::new(),
                });
                pages.len() - 1
            });
            // An article lists a tag once even if it repeats it
            if pages[i].article_ids.last() != Some(&article.id) {
                pages[i].article_ids.push(article.id.clone());
            }
        }
    }

    pages
}
