//! services/api/src/adapters/retriever.rs
//!
//! An in-memory GeoGebra command catalog that ranks commands against a free-form
//! query. It implements the `CommandRetriever` port from the `core` crate.

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use geogebra_assistant_core::{
    domain::CommandMatch,
    ports::{CommandRetriever, PortResult},
};
use serde::Deserialize;
use tracing::debug;

use crate::error::ApiError;

const BUNDLED_CATALOG: &str = include_str!("../../data/geogebra_commands.json");

const NAME_WEIGHT: usize = 5;
const KEYWORD_WEIGHT: usize = 3;
const MIN_DESCRIPTION_WORD_LEN: usize = 4;
const SIMILARITY_MIDPOINT: f32 = 5.0;

/// A single documented GeoGebra command.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub syntaxes: Vec<String>,
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl CatalogEntry {
    /// The text block handed to the LLM for this command.
    fn render(&self) -> String {
        let syntaxes = self
            .syntaxes
            .iter()
            .map(|s| format!("  {}", s))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "Command: {}\nSyntax:\n{}\nDescription: {}",
            self.name, syntaxes, self.description
        )
    }
}

pub struct CommandCatalogRetriever {
    entries: Vec<CatalogEntry>,
}

impl CommandCatalogRetriever {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn from_json(json: &str) -> Result<Self, ApiError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// The catalog compiled into the binary.
    pub fn bundled() -> Result<Self, ApiError> {
        Self::from_json(BUNDLED_CATALOG)
    }

    pub fn from_file(path: &Path) -> Result<Self, ApiError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn score(entry: &CatalogEntry, query: &QueryTerms) -> usize {
        let mut score = 0;

        if query.words.contains(&entry.name.to_lowercase()) {
            score += NAME_WEIGHT;
        }

        score += entry
            .keywords
            .iter()
            .filter(|keyword| query.matches_keyword(keyword))
            .count()
            * KEYWORD_WEIGHT;

        score += words(&entry.description)
            .into_iter()
            .filter(|word| word.chars().count() >= MIN_DESCRIPTION_WORD_LEN)
            .filter(|word| query.words.contains(word))
            .count();

        score
    }

    /// Scores every entry, highest first with catalog order on ties, dropping non-matches.
    fn ranked(&self, query: &str, top_k: usize) -> Vec<(usize, &CatalogEntry)> {
        let query = QueryTerms::new(query);

        let mut ranked: Vec<(usize, &CatalogEntry)> = self
            .entries
            .iter()
            .map(|entry| (Self::score(entry, &query), entry))
            .filter(|(score, _)| *score > 0)
            .collect();

        // Stable sort keeps catalog order for equal scores.
        ranked.sort_by(|a, b| b.0.cmp(&a.0));
        ranked.truncate(top_k);
        ranked
    }

    /// Returns the best-matching entries, highest score first, catalog order on ties.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<&CatalogEntry> {
        self.ranked(query, top_k)
            .into_iter()
            .map(|(_, entry)| entry)
            .collect()
    }
}

/// A lowercased query split into ordered tokens and a word set.
struct QueryTerms {
    text: String,
    tokens: Vec<String>,
    words: HashSet<String>,
}

impl QueryTerms {
    fn new(query: &str) -> Self {
        let text = query.to_lowercase();
        let tokens = tokenize(&text);
        let words = tokens.iter().cloned().collect();
        Self {
            text,
            tokens,
            words,
        }
    }

    /// ASCII keywords must match whole words (or a run of whole words for phrases);
    /// CJK keywords have no word boundaries and match as substrings.
    fn matches_keyword(&self, keyword: &str) -> bool {
        let keyword = keyword.to_lowercase();
        if !keyword.is_ascii() {
            return self.text.contains(&keyword);
        }

        let phrase = tokenize(&keyword);
        !phrase.is_empty()
            && self
                .tokens
                .windows(phrase.len())
                .any(|window| window == phrase.as_slice())
    }
}

/// Maps an unbounded score onto 0..100; `SIMILARITY_MIDPOINT` lands at 50%.
fn similarity(score: usize) -> f32 {
    let score = score as f32;
    100.0 * score / (score + SIMILARITY_MIDPOINT)
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn words(text: &str) -> HashSet<String> {
    tokenize(text).into_iter().collect()
}

#[async_trait]
impl CommandRetriever for CommandCatalogRetriever {
    async fn related_command_details(
        &self,
        query: &str,
        top_k: usize,
    ) -> PortResult<Vec<String>> {
        let results = self.search(query, top_k);
        debug!(
            matches = results.len(),
            "Retrieved related commands: {:?}",
            results.iter().map(|e| e.name.as_str()).collect::<Vec<_>>()
        );
        Ok(results.into_iter().map(CatalogEntry::render).collect())
    }

    async fn search_commands(&self, query: &str, top_k: usize) -> PortResult<Vec<CommandMatch>> {
        Ok(self
            .ranked(query, top_k)
            .into_iter()
            .map(|(score, entry)| CommandMatch {
                command: entry.name.clone(),
                similarity: similarity(score),
            })
            .collect())
    }
}
