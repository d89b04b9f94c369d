// Language configuration management
use crate::harness::HARNESS_LANGUAGE;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// How one candidate language is run on the execution oracle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageConfig {
    pub name: String,
    /// Language tag understood by the oracle (e.g. `nodejs`)
    pub oracle_language: String,
    /// Runtime version tag understood by the oracle
    pub version_index: String,
    /// Whether submissions in this language can be graded structurally
    #[serde(default)]
    pub harness: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct LanguagesJson {
    languages: Vec<LanguageConfig>,
}

/// Language configuration manager
#[derive(Debug, Clone)]
pub struct LanguageConfigManager {
    configs: HashMap<String, LanguageConfig>,
}

impl LanguageConfigManager {
    /// Load language configurations from languages.json
    pub fn load(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            bail!("Language config file not found: {}", config_path.display());
        }

        let content = fs::read_to_string(config_path)
            .context("Failed to read languages.json")?;

        let languages_json: LanguagesJson = serde_json::from_str(&content)
            .context("Failed to parse languages.json")?;

        Self::from_configs(languages_json.languages)
    }

    pub fn from_configs(languages: Vec<LanguageConfig>) -> Result<Self> {
        if languages.is_empty() {
            bail!("No languages configured");
        }

        let mut configs = HashMap::new();
        let mut graded: Option<String> = None;
        for lang in languages {
            if lang.harness {
                // Harnesses are only ever emitted in one language
                if !lang.name.eq_ignore_ascii_case(HARNESS_LANGUAGE) {
                    bail!(
                        "Language '{}' cannot be graded; only '{}' harnesses exist",
                        lang.name,
                        HARNESS_LANGUAGE
                    );
                }
                if let Some(previous) = graded.replace(lang.name.clone()) {
                    bail!(
                        "Languages '{}' and '{}' are both marked for grading",
                        previous,
                        lang.name
                    );
                }
            }

            let key = lang.name.to_lowercase();
            if configs.insert(key, lang.clone()).is_some() {
                bail!("Language '{}' is configured more than once", lang.name);
            }
        }

        Ok(Self { configs })
    }

    /// Get configuration for a language, matched case-insensitively
    pub fn get_config(&self, language: &str) -> Option<&LanguageConfig> {
        self.configs.get(&language.to_lowercase())
    }

    /// Configuration for a language that supports structured grading
    pub fn harness_config(&self, language: &str) -> Option<&LanguageConfig> {
        self.get_config(language).filter(|c| c.harness)
    }

    /// List all configured languages, sorted
    pub fn list_languages(&self) -> Vec<String> {
        let mut names: Vec<String> = self.configs.keys().cloned().collect();
        names.sort();
        names
    }
}
