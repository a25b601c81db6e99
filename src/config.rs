//! Configuration management for kotoba-cloud
//!
//! Handles loading and parsing of the `kotoba-cloud.toml` configuration file.
//! The library types take every layout value explicitly; the defaults below
//! are the only place fallback values live.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::analyzer::{DictionarySource, EMBEDDED_IPADIC};
use crate::canonicalizer::{ExclusionSet, WordFilter, DEFAULT_TARGET_POS};
use crate::error::ConfigError;
use crate::layout::LayoutParams;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tokenizer: TokenizerConfig,

    #[serde(default)]
    pub words: WordsConfig,

    #[serde(default)]
    pub tags: TagsConfig,

    /// Tag cloud canvas and sizing
    #[serde(default = "default_tag_cloud")]
    pub tag_cloud: CloudConfig,

    /// Content keyword cloud canvas and sizing
    #[serde(default = "default_content_cloud")]
    pub content_cloud: CloudConfig,

    #[serde(default)]
    pub layout: LayoutConfig,

    #[serde(default)]
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tokenizer: TokenizerConfig::default(),
            words: WordsConfig::default(),
            tags: TagsConfig::default(),
            tag_cloud: default_tag_cloud(),
            content_cloud: default_content_cloud(),
            layout: LayoutConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

/// Morphological analysis settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenizerConfig {
    /// `embedded://ipadic` or a path to a compiled dictionary
    #[serde(default = "default_dictionary")]
    pub dictionary: String,

    /// Parts of speech counted in the content cloud
    #[serde(default = "default_target_pos")]
    pub target_pos: Vec<String>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            dictionary: default_dictionary(),
            target_pos: default_target_pos(),
        }
    }
}

/// Word counting settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WordsConfig {
    /// Words excluded in addition to the built-in stopwords
    #[serde(default)]
    pub extra_exclusions: Vec<String>,
}

/// Tag counting settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagsConfig {
    /// Tag marking syndicated articles, left out of tag counts
    #[serde(default = "default_platform_tag")]
    pub platform_tag: String,
}

impl Default for TagsConfig {
    fn default() -> Self {
        Self {
            platform_tag: default_platform_tag(),
        }
    }
}

/// One word cloud. All fields are required when the section is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudConfig {
    pub width: u32,
    pub height: u32,
    pub font_size_exponent: f64,
    pub font_size_zoom: f64,
    pub padding: f64,
}

impl CloudConfig {
    /// Layout parameters for this cloud. Padding must be finite, non-negative
    /// and no larger than the longer canvas side.
    pub fn layout_params(&self, layout: &LayoutConfig) -> Result<LayoutParams, ConfigError> {
        let max_padding = f64::from(self.width.max(self.height));
        if !self.padding.is_finite() || self.padding < 0.0 || self.padding > max_padding {
            return Err(ConfigError::InvalidPadding {
                padding: self.padding,
                width: self.width,
                height: self.height,
            });
        }
        if !self.font_size_exponent.is_finite() || !self.font_size_zoom.is_finite() {
            return Err(ConfigError::InvalidFontSize);
        }

        Ok(LayoutParams {
            width: self.width,
            height: self.height,
            font_size_exponent: self.font_size_exponent,
            font_size_zoom: self.font_size_zoom,
            padding: self.padding,
            max_spiral_steps: layout.max_spiral_steps,
        })
    }
}

/// Placement search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Spiral positions tried per word before it is dropped
    #[serde(default = "default_max_spiral_steps")]
    pub max_spiral_steps: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_spiral_steps: default_max_spiral_steps(),
        }
    }
}

/// SVG output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_font_family")]
    pub font_family: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_family: default_font_family(),
        }
    }
}

fn default_dictionary() -> String {
    EMBEDDED_IPADIC.to_string()
}

fn default_target_pos() -> Vec<String> {
    DEFAULT_TARGET_POS.iter().map(|p| p.to_string()).collect()
}

fn default_platform_tag() -> String {
    "Qiita".to_string()
}

fn default_tag_cloud() -> CloudConfig {
    CloudConfig {
        width: 1200,
        height: 630,
        font_size_exponent: 0.8,
        font_size_zoom: 18.0,
        padding: 2.0,
    }
}

fn default_content_cloud() -> CloudConfig {
    CloudConfig {
        width: 1200,
        height: 630,
        font_size_exponent: 0.6,
        font_size_zoom: 3.1,
        padding: 0.2,
    }
}

fn default_max_spiral_steps() -> usize {
    20_000
}

fn default_font_family() -> String {
    "meiryo, sans-serif".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &PathBuf) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Get default config file path
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "kotoba-cloud")
            .map(|dirs| dirs.config_dir().join("kotoba-cloud.toml"))
    }

    /// Load configuration from the working directory or the user config directory
    pub fn load_from_default() -> Self {
        let workspace_path = PathBuf::from("kotoba-cloud.toml");
        if workspace_path.exists() {
            match Self::load(&workspace_path) {
                Ok(config) => return config,
                Err(e) => tracing::warn!("Ignoring {}: {}", workspace_path.display(), e),
            }
        }

        if let Some(default_path) = Self::default_path() {
            if let Ok(config) = Self::load(&default_path) {
                return config;
            }
        }

        Config::default()
    }

    pub fn dictionary_source(&self) -> DictionarySource {
        DictionarySource::parse(&self.tokenizer.dictionary)
    }

    pub fn target_pos(&self) -> HashSet<String> {
        self.tokenizer.target_pos.iter().cloned().collect()
    }

    pub fn exclusions(&self) -> ExclusionSet {
        ExclusionSet::with_extra(&self.words.extra_exclusions)
    }

    pub fn word_filter(&self) -> WordFilter {
        WordFilter::new(self.target_pos(), self.exclusions())
    }
}
