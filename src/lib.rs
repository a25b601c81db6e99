//! kotoba-cloud - word clouds for Japanese blog corpora
//!
//! Extracts prose from rendered articles, counts content words with
//! morphological analysis, counts tags, and renders both as SVG word clouds.

pub mod analyzer;
pub mod article;
pub mod canonicalizer;
pub mod config;
pub mod error;
pub mod extractor;
pub mod layout;
pub mod pipeline;
pub mod render;
pub mod tags;
