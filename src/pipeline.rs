//! Full-corpus run producing both word clouds and the tag table.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analyzer::{AnalyzerBuilder, MorphologicalAnalyzer};
use crate::article::{newest_first, Article};
use crate::canonicalizer::WordCounter;
use crate::config::Config;
use crate::error::PipelineError;
use crate::extractor::TextExtractor;
use crate::layout::{CloudLayout, LayoutParams, WordCloudEntry};
use crate::render::SceneRenderer;
use crate::tags::{tag_pages, TagAggregator, TagCount, TagPage};

/// Separates article texts so no token spans two articles
const ARTICLE_SEPARATOR: &str = "\n";

/// A rendered cloud and how many words did not fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudArtifact {
    pub svg: String,
    pub placed: usize,
    pub dropped: usize,
}

/// Everything handed to page generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub tag_cloud: CloudArtifact,
    pub content_cloud: CloudArtifact,
    /// Tags by frequency descending, then name ascending
    pub tag_counts: Vec<TagCount>,
    pub tag_pages: Vec<TagPage>,
    /// Distinct canonical words found in article bodies
    pub content_buckets: usize,
}

/// Runs extraction, counting, layout and rendering over a corpus
pub struct Pipeline {
    extractor: TextExtractor,
    counter: Arc<WordCounter>,
    tags: TagAggregator,
    renderer: SceneRenderer,
    tag_params: LayoutParams,
    content_params: LayoutParams,
}

impl Pipeline {
    pub fn new(
        config: &Config,
        analyzer: Arc<MorphologicalAnalyzer>,
    ) -> Result<Self, PipelineError> {
        Ok(Self {
            extractor: TextExtractor::new(),
            counter: Arc::new(WordCounter::new(analyzer, config.word_filter())),
            tags: TagAggregator::new(config.tags.platform_tag.clone()),
            renderer: SceneRenderer::new(config.render.font_family.clone()),
            tag_params: config.tag_cloud.layout_params(&config.layout)?,
            content_params: config.content_cloud.layout_params(&config.layout)?,
        })
    }

    /// Load the configured dictionary, then assemble the pipeline
    pub async fn build(config: &Config) -> Result<Self, PipelineError> {
        let analyzer = AnalyzerBuilder::new(config.dictionary_source()).build().await?;
        Self::new(config, Arc::new(analyzer))
    }

    /// Plain text of every article, newest first
    pub fn corpus_text(&self, articles: &[Article]) -> String {
        articles
            .iter()
            .map(|article| self.extractor.extract(&article.body))
            .collect::<Vec<_>>()
            .join(ARTICLE_SEPARATOR)
    }

    /// Produce both clouds and the tag table. The two clouds are laid out on
    /// separate blocking threads; either both are returned or neither.
    pub async fn run(&self, articles: Vec<Article>) -> Result<PipelineOutput, PipelineError> {
        let articles = newest_first(articles);
        tracing::info!("Analyzing {} articles", articles.len());

        let text = self.corpus_text(&articles);
        let tag_counts = self.tags.count(&articles);
        let tag_entries = TagAggregator::entries(&tag_counts);

        let content_task = {
            let counter = Arc::clone(&self.counter);
            let renderer = self.renderer.clone();
            let params = self.content_params;
            tokio::task::spawn_blocking(move || content_cloud(&counter, &renderer, params, &text))
        };
        let tag_task = {
            let renderer = self.renderer.clone();
            let params = self.tag_params;
            tokio::task::spawn_blocking(move || cloud(&renderer, params, &tag_entries, "tag"))
        };

        let (content, tag_cloud) = tokio::try_join!(content_task, tag_task)
            .map_err(|e| PipelineError::Task(e.to_string()))?;
        let (content_cloud, content_buckets) = content;

        tracing::info!(
            "Rendered tag cloud ({} words) and content cloud ({} words)",
            tag_cloud.placed,
            content_cloud.placed
        );

        Ok(PipelineOutput {
            tag_cloud,
            content_cloud,
            tag_pages: tag_pages(&articles),
            tag_counts,
            content_buckets,
        })
    }
}

fn content_cloud(
    counter: &WordCounter,
    renderer: &SceneRenderer,
    params: LayoutParams,
    text: &str,
) -> (CloudArtifact, usize) {
    let buckets = counter.count(text);
    let entries = WordCounter::entries(&buckets);
    (cloud(renderer, params, &entries, "content"), buckets.len())
}

fn cloud(
    renderer: &SceneRenderer,
    params: LayoutParams,
    entries: &[WordCloudEntry],
    name: &str,
) -> CloudArtifact {
    let outcome = CloudLayout::run(params, entries);
    if outcome.dropped_count() > 0 {
        tracing::warn!(
            "{} cloud: {} of {} words did not fit the {}x{} canvas",
            name,
            outcome.dropped_count(),
            entries.len(),
            params.width,
            params.height
        );
    }

    CloudArtifact {
        svg: renderer.render(params.width, params.height, &outcome.glyphs),
        placed: outcome.glyphs.len(),
        dropped: outcome.dropped_count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::DictionarySource;
    use crate::error::ConfigError;

    fn article(id: &str, published: &str, body: &str, tags: &[&str]) -> Article {
        Article {
            id: id.to_string(),
            title: None,
            published: Some(published.to_string()),
            body: body.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn corpus() -> Vec<Article> {
        vec![
            article(
                "cats",
                "2019-05-01",
                "<p>猫は可愛い。猫が好き。</p><pre class=\"language-rust\"><code>fn main() {}</code></pre>",
                &["猫", "Qiita"],
            ),
            article("dogs", "2019-06-01", "<p>犬も可愛い。</p>", &["犬", "猫"]),
        ]
    }

    async fn setup_pipeline() -> Pipeline {
        Pipeline::build(&Config::default()).await.unwrap()
    }

    #[tokio::test]
    async fn test_run_produces_both_clouds() {
        let pipeline = setup_pipeline().await;
        let output = pipeline.run(corpus()).await.unwrap();

        assert!(output.tag_cloud.svg.starts_with("<svg"));
        assert!(output.content_cloud.svg.starts_with("<svg"));
        assert!(output.tag_cloud.svg.contains(">猫</text>"));
        assert!(output.content_cloud.svg.contains(">猫</text>"));
        assert!(!output.content_cloud.svg.contains("main"));
        assert!(output.content_buckets >= 2);
    }

    #[tokio::test]
    async fn test_tag_table_excludes_platform_tag() {
        let pipeline = setup_pipeline().await;
        let output = pipeline.run(corpus()).await.unwrap();

        let pairs: Vec<(&str, u32)> = output
            .tag_counts
            .iter()
            .map(|c| (c.tag.as_str(), c.frequency))
            .collect();
        assert_eq!(pairs, vec![("猫", 2), ("犬", 1)]);
        assert!(!output.tag_cloud.svg.contains("Qiita"));
        // Tag pages still list the platform tag
        assert!(output.tag_pages.iter().any(|p| p.tag == "Qiita"));
    }

    #[tokio::test]
    async fn test_tag_pages_follow_newest_first_order() {
        let pipeline = setup_pipeline().await;
        let output = pipeline.run(corpus()).await.unwrap();

        let cat_page = output.tag_pages.iter().find(|p| p.tag == "猫").unwrap();
        assert_eq!(cat_page.article_ids, vec!["dogs", "cats"]);
    }

    #[tokio::test]
    async fn test_corpus_text_separates_articles() {
        let pipeline = setup_pipeline().await;
        let articles = vec![
            article("a", "2020-01-01", "<p>東京</p>", &[]),
            article("b", "2020-01-02", "<p>タワー</p>", &[]),
        ];
        assert_eq!(pipeline.corpus_text(&articles), "東京\nタワー");
    }

    #[tokio::test]
    async fn test_run_is_deterministic() {
        let pipeline = setup_pipeline().await;
        let first = pipeline.run(corpus()).await.unwrap();
        let second = pipeline.run(corpus()).await.unwrap();

        assert_eq!(first.tag_cloud, second.tag_cloud);
        assert_eq!(first.content_cloud, second.content_cloud);
    }

    #[tokio::test]
    async fn test_empty_corpus() {
        let pipeline = setup_pipeline().await;
        let output = pipeline.run(Vec::new()).await.unwrap();

        assert!(output.tag_counts.is_empty());
        assert_eq!(output.tag_cloud.placed, 0);
        assert_eq!(output.content_cloud.placed, 0);
        assert!(output.content_cloud.svg.ends_with("</g></svg>"));
    }

    #[tokio::test]
    async fn test_missing_dictionary_aborts_build() {
        let mut config = Config::default();
        config.tokenizer.dictionary = "/nonexistent/kotoba-cloud/ipadic".to_string();
        assert_eq!(
            config.dictionary_source(),
            DictionarySource::Path("/nonexistent/kotoba-cloud/ipadic".into())
        );

        let result = Pipeline::build(&config).await;
        assert!(matches!(result, Err(PipelineError::TokenizerInit(_))));
    }

    #[tokio::test]
    async fn test_unusable_padding_aborts_build() {
        let mut config = Config::default();
        config.content_cloud.padding = f64::NAN;
        let result = Pipeline::build(&config).await;
        assert!(matches!(
            result,
            Err(PipelineError::Config(ConfigError::InvalidPadding { .. }))
        ));

        let mut config = Config::default();
        config.tag_cloud.padding = -2.0;
        let err = Pipeline::build(&config).await.err().unwrap();
        assert_eq!(err.to_string(), "invalid padding -2 for a 1200x630 canvas");
    }
}
