use crate::matcher::KeywordTable;
use log::info;
use once_cell::sync::Lazy;
use serde::{ Deserialize, Serialize };
use std::fs;
use std::path::Path;
use thiserror::Error;

/// A curated reference attached to a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationRecord {
    pub title: String,
    pub url: String,
    pub provider: String,
}

/// One row of a citations file: a pipe-delimited keyword group plus its record.
#[derive(Debug, Clone, Deserialize)]
pub struct CitationEntry {
    pub keywords: String,
    pub title: String,
    pub url: String,
    pub provider: String,
}

#[derive(Debug, Error)]
pub enum CitationError {
    #[error("Failed to read citations file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse citations file '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

fn record(title: &str, url: &str, provider: &str) -> CitationRecord {
    CitationRecord {
        title: title.to_string(),
        url: url.to_string(),
        provider: provider.to_string(),
    }
}

static BUILTIN: Lazy<Vec<(&'static str, CitationRecord)>> = Lazy::new(|| {
    vec![
        (
            "anxiety|anxious|panic|worry|worried|nervous",
            record("Anxiety Disorders", "https://www.nimh.nih.gov/health/topics/anxiety-disorders", "NIMH"),
        ),
        (
            "depression|depressed|hopeless|empty inside|no motivation",
            record("Depression", "https://www.nimh.nih.gov/health/topics/depression", "NIMH"),
        ),
        (
            "stress|stressed|overwhelmed|burnout|burned out",
            record("Stress", "https://www.who.int/news-room/questions-and-answers/item/stress", "WHO"),
        ),
        (
            "sleep|insomnia|can't sleep|nightmare",
            record("Insomnia", "https://www.nhs.uk/mental-health/conditions/insomnia/", "NHS"),
        ),
        (
            "grief|grieving|bereavement|loss of|passed away",
            record("Grief after bereavement or loss", "https://www.nhs.uk/mental-health/feelings-symptoms-behaviours/feelings-and-symptoms/grief-bereavement-loss/", "NHS"),
        ),
        (
            "lonely|loneliness|isolated|no friends",
            record("Loneliness", "https://www.nhs.uk/mental-health/feelings-symptoms-behaviours/feelings-and-symptoms/loneliness-in-adults/", "NHS"),
        ),
        (
            "trauma|ptsd|flashback",
            record("Post-Traumatic Stress Disorder", "https://www.nimh.nih.gov/health/topics/post-traumatic-stress-disorder-ptsd", "NIMH"),
        ),
        (
            "self-esteem|self esteem|worthless|not good enough",
            record("Raising low self-esteem", "https://www.nhs.uk/mental-health/self-help/tips-and-support/raise-low-self-esteem/", "NHS"),
        ),
        (
            "anger|angry|furious",
            record("Get help with anger", "https://www.nhs.uk/mental-health/feelings-symptoms-behaviours/feelings-and-symptoms/anger/", "NHS"),
        ),
    ]
});

/// Topic lookup used to ground answers. Immutable once built.
#[derive(Debug, Clone)]
pub struct CitationTable {
    table: KeywordTable<CitationRecord>,
}

impl CitationTable {
    pub fn builtin() -> Self {
        Self {
            table: KeywordTable::new(BUILTIN.iter().map(|(kw, rec)| (*kw, rec.clone()))),
        }
    }

    pub fn from_entries(entries: Vec<CitationEntry>) -> Self {
        Self {
            table: KeywordTable::new(
                entries.into_iter().map(|e| {
                    (e.keywords, CitationRecord { title: e.title, url: e.url, provider: e.provider })
                })
            ),
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CitationError> {
        let display = path.as_ref().display().to_string();
        let content = fs::read_to_string(&path).map_err(|source| CitationError::Io {
            path: display.clone(),
            source,
        })?;
        let entries: Vec<CitationEntry> = serde_json
            ::from_str(&content)
            .map_err(|source| CitationError::Json { path: display.clone(), source })?;
        info!("Loaded {} citation groups from {}", entries.len(), display);
        Ok(Self::from_entries(entries))
    }

    /// Builtin table unless a citations file is configured.
    pub fn from_optional_path(path: Option<&str>) -> Result<Self, CitationError> {
        match path {
            Some(p) if !p.trim().is_empty() => Self::load(p),
            _ => Ok(Self::builtin()),
        }
    }

    pub fn lookup(&self, text: &str) -> Option<CitationRecord> {
        self.table.find(text).cloned()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Default for CitationTable {
    fn default() -> Self {
        Self::builtin()
    }
}
