use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Errors surfaced while loading a dataset. Kept distinct from "no results",
/// which query operations express as empty vectors.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A configured vocabulary/language.
#[derive(Debug, Clone)]
pub struct Lang {
    pub id: String,
    pub name: String,
    /// Path to the dictionary dataset (`<word> [frequency]` lines). Empty
    /// means the language has no dictionary.
    pub dictionary: String,
    /// Path to the bigram dataset (`<prev> <next> [count]` lines). Empty
    /// means the language has no bigram model.
    pub bigrams: String,
}

pub type LangMap = HashMap<String, Lang>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    #[serde(default)]
    pub lang: HashMap<String, LangConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub default_suggestions: usize,
    #[serde(default)]
    pub max_suggestions: usize,
    #[serde(default)]
    pub default_top_k: usize,
    #[serde(default)]
    pub max_top_k: usize,
    /// Inclusive start of the fuzzy substitution/insertion alphabet as a
    /// Unicode code point. 0 means use the Devanagari default.
    #[serde(default)]
    pub fuzzy_alphabet_start: u32,
    /// Exclusive end of the fuzzy alphabet. 0 means use the default.
    #[serde(default)]
    pub fuzzy_alphabet_end: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LangConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub dictionary: String,
    #[serde(default)]
    pub bigrams: String,
}

/// Autocomplete API response payload.
#[derive(Debug, Serialize)]
pub struct SuggestResults {
    pub language: String,
    pub suggestions: Vec<String>,
}

/// Prediction API response payload.
#[derive(Debug, Serialize)]
pub struct PredictResults {
    pub language: String,
    pub predictions: Vec<String>,
}
