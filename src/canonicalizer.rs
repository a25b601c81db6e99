//! Word-frequency counting over a tokenized corpus.
//!
//! Morphemes of the target parts of speech are grouped by their uppercased
//! canonical surface, so that `Rust`, `rust` and `RUST` land in one bucket.
//! Each bucket then picks the observed spelling closest to the key as the
//! text shown in the word cloud.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::analyzer::{Morpheme, MorphologicalAnalyzer};
use crate::layout::WordCloudEntry;

/// Uppercased words that never appear in the content cloud
const STANDARD_EXCLUSIONS: &[&str] = &[
    "よう", "こと", "指定", "時", "追加", "設定", "記事", "用", "情報", "ため", "もの", "これ", "/",
    "(", ")", "&", "+", "複数", "用意", "構成", "配下", "下記", "今回", "確認", "公開", "関連",
    "取得", "作成", "場合", "定義", "方法", "生成", "実行", "表示", "紹介", "資産", "参考", "機能",
    "以下", "更新", "化", "必要", "一部", "側", "実装", "ファイル", "サイト", "イン", "自分",
    "プラグ", "的", "さん", "とき", "の", "系", "便利", "簡単", "使用", "それ", "あれ", "感じ", "1",
    "2", "3", "4", "5", "6", "7", "8", "9", "0", "SETTINGS", "MS", "CONFIG", "://",
];

/// Parts of speech counted when nothing else is configured
pub const DEFAULT_TARGET_POS: &[&str] = &["名詞"];

/// Immutable set of uppercase keys rejected during counting
#[derive(Debug, Clone)]
pub struct ExclusionSet {
    words: HashSet<String>,
}

impl ExclusionSet {
    /// The built-in stopword table
    pub fn standard() -> Self {
        Self {
            words: STANDARD_EXCLUSIONS.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// The built-in table plus additional words, uppercased on the way in
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::standard();
        set.words.extend(extra.into_iter().map(|w| w.as_ref().to_uppercase()));
        set
    }

    pub fn contains(&self, key: &str) -> bool {
        self.words.contains(key)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// All occurrences of one canonical word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordBucket {
    /// Uppercased canonical surface
    pub key: String,
    pub frequency: u32,
    /// Distinct spellings in first-seen order
    pub surface_forms: Vec<String>,
}

impl WordBucket {
    fn new(key: String, surface: &str) -> Self {
        Self {
            key,
            frequency: 1,
            surface_forms: vec![surface.to_string()],
        }
    }

    fn record(&mut self, surface: &str) {
        self.frequency += 1;
        if !self.surface_forms.iter().any(|s| s == surface) {
            self.surface_forms.push(surface.to_string());
        }
    }

    /// The observed spelling with the fewest positional mismatches against
    /// the key. Ties go to the spelling seen first.
    pub fn display_form(&self) -> &str {
        self.surface_forms
            .iter()
            .min_by_key(|form| positional_mismatch(form, &self.key))
            .map(String::as_str)
            .unwrap_or(&self.key)
    }
}

/// Count indices of `observed` whose character differs from the character
/// at the same index of `key`. Indices past the end of `key` count as
/// mismatches; characters of `key` past the end of `observed` are ignored.
///
/// This is not an edit distance: spellings of different length are compared
/// position by position.
pub fn positional_mismatch(observed: &str, key: &str) -> usize {
    let mut key_chars = key.chars();
    observed
        .chars()
        .filter(|c| key_chars.next() != Some(*c))
        .count()
}

/// Part-of-speech filter and stopword table applied before counting
#[derive(Debug, Clone)]
pub struct WordFilter {
    target_pos: HashSet<String>,
    exclusions: ExclusionSet,
}

impl WordFilter {
    /// `target_pos` entries are bare parts of speech (`名詞`) or a part of
    /// speech with its first subcategory (`名詞,一般`)
    pub fn new(target_pos: HashSet<String>, exclusions: ExclusionSet) -> Self {
        Self {
            target_pos,
            exclusions,
        }
    }

    /// Group morphemes into buckets, in order of first appearance
    pub fn bucket(&self, morphemes: &[Morpheme]) -> Vec<WordBucket> {
        let mut buckets: Vec<WordBucket> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for morpheme in morphemes {
            if !morpheme.matches_pos(&self.target_pos) {
                continue;
            }

            let surface = morpheme.canonical_surface();
            let key = surface.to_uppercase();
            if self.exclusions.contains(&key) {
                continue;
            }

            match index.get(&key) {
                Some(&i) => buckets[i].record(surface),
                None => {
                    index.insert(key.clone(), buckets.len());
                    buckets.push(WordBucket::new(key, surface));
                }
            }
        }

        buckets
    }
}

/// Counts content words in a corpus
pub struct WordCounter {
    analyzer: Arc<MorphologicalAnalyzer>,
    filter: WordFilter,
}

impl WordCounter {
    pub fn new(analyzer: Arc<MorphologicalAnalyzer>, filter: WordFilter) -> Self {
        Self { analyzer, filter }
    }

    /// Tokenize the corpus once and bucket its content words
    pub fn count(&self, text: &str) -> Vec<WordBucket> {
        let morphemes = self.analyzer.tokenize(text);
        let buckets = self.filter.bucket(&morphemes);
        tracing::debug!(
            "Counted {} morphemes into {} word buckets",
            morphemes.len(),
            buckets.len()
        );
        buckets
    }

    /// Turn buckets into weighted entries for the layout engine
    pub fn entries(buckets: &[WordBucket]) -> Vec<WordCloudEntry> {
        buckets
            .iter()
            .map(|bucket| WordCloudEntry::new(bucket.display_form(), bucket.frequency))
            .collect()
    }
}
