use std::collections::HashSet;
use std::path::PathBuf;

use lindera::dictionary::load_dictionary;
use lindera::mode::Mode;
use lindera::segmenter::Segmenter;
use lindera::tokenizer::Tokenizer;

use crate::error::TokenizerInitError;

/// URI of the IPADIC dictionary compiled into the binary
pub const EMBEDDED_IPADIC: &str = "embedded://ipadic";

/// Value IPADIC puts in a feature column that has no content
pub const NO_BASIC_FORM: &str = "*";

const EMBEDDED_SCHEME: &str = "embedded://";

/// Where the segmentation dictionary comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictionarySource {
    /// A dictionary bundled with lindera, e.g. `embedded://ipadic`
    Embedded(String),
    /// A pre-built dictionary directory on disk
    Path(PathBuf),
}

impl DictionarySource {
    /// Interpret a configuration value as a dictionary source
    pub fn parse(value: &str) -> Self {
        if value.starts_with(EMBEDDED_SCHEME) {
            DictionarySource::Embedded(value.to_string())
        } else {
            DictionarySource::Path(PathBuf::from(value))
        }
    }

    fn uri(&self) -> String {
        match self {
            DictionarySource::Embedded(uri) => uri.clone(),
            DictionarySource::Path(path) => path.to_string_lossy().into_owned(),
        }
    }
}

impl Default for DictionarySource {
    fn default() -> Self {
        DictionarySource::Embedded(EMBEDDED_IPADIC.to_string())
    }
}

/// One segmented unit of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Morpheme {
    /// Surface form (表層形)
    pub surface: String,
    /// Basic form (基本形), or [`NO_BASIC_FORM`]
    pub basic_form: String,
    /// Part of speech (品詞)
    pub pos: String,
    /// Part of speech subcategory 1 (品詞細分類1)
    pub pos_detail1: String,
}

impl Morpheme {
    /// The basic form, or the surface form when the dictionary has none
    pub fn canonical_surface(&self) -> &str {
        if self.basic_form == NO_BASIC_FORM {
            &self.surface
        } else {
            &self.basic_form
        }
    }

    /// Whether one of `targets` names this morpheme's part of speech, either
    /// bare (`名詞`) or with its first subcategory (`名詞,一般`)
    pub fn matches_pos(&self, targets: &HashSet<String>) -> bool {
        targets.contains(&self.pos)
            || targets.contains(&format!("{},{}", self.pos, self.pos_detail1))
    }
}

/// First phase of analyzer construction: holds the dictionary location
/// until [`AnalyzerBuilder::build`] loads it.
#[derive(Debug, Clone, Default)]
pub struct AnalyzerBuilder {
    source: DictionarySource,
}

impl AnalyzerBuilder {
    pub fn new(source: DictionarySource) -> Self {
        Self { source }
    }

    /// Load the dictionary on the blocking pool.
    pub async fn build(self) -> Result<MorphologicalAnalyzer, TokenizerInitError> {
        tokio::task::spawn_blocking(move || self.build_blocking())
            .await
            .map_err(|e| TokenizerInitError::Interrupted(e.to_string()))?
    }

    /// Load the dictionary on the current thread.
    pub fn build_blocking(self) -> Result<MorphologicalAnalyzer, TokenizerInitError> {
        if let DictionarySource::Path(path) = &self.source {
            if !path.exists() {
                return Err(TokenizerInitError::DictionaryNotFound { path: path.clone() });
            }
        }

        let uri = self.source.uri();
        tracing::info!("Loading dictionary from {}", uri);

        let dictionary =
            load_dictionary(&uri).map_err(|e| TokenizerInitError::DictionaryLoad(e.to_string()))?;
        let segmenter = Segmenter::new(Mode::Normal, dictionary, None);
        let tokenizer = Tokenizer::new(segmenter);

        tracing::debug!("Dictionary {} loaded", uri);
        Ok(MorphologicalAnalyzer { tokenizer })
    }
}

/// Morphological analyzer using Lindera
///
/// Only obtainable through [`AnalyzerBuilder`], so holding one means the
/// dictionary is ready.
pub struct MorphologicalAnalyzer {
    tokenizer: Tokenizer,
}

impl MorphologicalAnalyzer {
    /// Segment text into morphemes in reading order
    pub fn tokenize(&self, text: &str) -> Vec<Morpheme> {
        let mut tokens = match self.tokenizer.tokenize(text) {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!("Tokenization failed: {}", e);
                return Vec::new();
            }
        };

        let mut result = Vec::with_capacity(tokens.len());

        for token in tokens.iter_mut() {
            let surface = token.surface.as_ref().to_string();

            // IPADIC feature columns
            let details = token.details();

            let column = |i: usize| details.get(i).map(|s| s.to_string());

            result.push(Morpheme {
                pos: column(0).unwrap_or_else(|| "*".to_string()),
                pos_detail1: column(1).unwrap_or_else(|| "*".to_string()),
                basic_form: column(6).unwrap_or_else(|| NO_BASIC_FORM.to_string()),
                surface,
            });
        }

        result
    }
}
