// ============================================================================
// CONTENT - the monthly content file and how it is loaded
// ============================================================================

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Security: refuse to parse anything larger than this
const MAX_CONTENT_SIZE: u64 = 20 * 1024 * 1024; // 20 MB

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub days: Vec<Day>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Day {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub day: u32,
    #[serde(default)]
    pub day_of_week: String,
    #[serde(default)]
    pub day_energy: String,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub morning: Option<MorningSlot>,
    #[serde(default)]
    pub afternoon: Option<AfternoonSlot>,
    #[serde(default)]
    pub night: Option<NightSlot>,
    #[serde(default)]
    pub inspirational_story: Option<Story>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MicroAction {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub whose_life: String,
    #[serde(default)]
    pub impact: String,
}

impl MicroAction {
    pub fn is_actionable(&self) -> bool {
        !self.action.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub context: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MorningSlot {
    #[serde(default)]
    pub affirmation: String,
    #[serde(default)]
    pub micro_action: Option<MicroAction>,
    #[serde(default)]
    pub quote: Quote,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AfternoonSlot {
    #[serde(default)]
    pub recentering_question: String,
    #[serde(default)]
    pub micro_action: Option<MicroAction>,
    #[serde(default)]
    pub permission_slip: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NightSlot {
    #[serde(default)]
    pub reflection_question: String,
    #[serde(default)]
    pub micro_action: Option<MicroAction>,
    #[serde(default)]
    pub gratitude_nudge: String,
    #[serde(default)]
    pub release_statement: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Story {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub who_she_is: String,
    #[serde(default)]
    pub story: StoryBody,
}

/// Generated files carry the story either as one string or as paragraphs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoryBody {
    Text(String),
    Paragraphs(Vec<String>),
}

impl Default for StoryBody {
    fn default() -> Self {
        StoryBody::Text(String::new())
    }
}

impl StoryBody {
    /// Always yields at least one (possibly empty) paragraph.
    pub fn paragraphs(&self) -> Vec<String> {
        match self {
            StoryBody::Text(text) => vec![text.clone()],
            StoryBody::Paragraphs(paras) if paras.is_empty() => vec![String::new()],
            StoryBody::Paragraphs(paras) => paras.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("content file not found at {0}")]
    Missing(PathBuf),

    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("content file is {size} bytes, above the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },

    #[error("content file is not valid: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Where the content document comes from.
pub trait ContentSource {
    fn describe(&self) -> String;
    fn fetch(&self) -> Result<String, LoadError>;
}

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ContentSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<String, LoadError> {
        let metadata = fs::metadata(&self.path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => LoadError::Missing(self.path.clone()),
            _ => LoadError::Io {
                path: self.path.clone(),
                source: err,
            },
        })?;

        if metadata.len() > MAX_CONTENT_SIZE {
            return Err(LoadError::TooLarge {
                size: metadata.len(),
                limit: MAX_CONTENT_SIZE,
            });
        }

        fs::read_to_string(&self.path).map_err(|source| LoadError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

pub fn parse_content(raw: &str) -> Result<Content, LoadError> {
    Ok(serde_json::from_str(raw)?)
}

pub fn load_content(source: &dyn ContentSource) -> Result<Content, LoadError> {
    let raw = source.fetch()?;
    let content = parse_content(&raw)?;
    log::info!(
        "event=content_load status=ok source={} days={}",
        source.describe(),
        content.days.len()
    );
    Ok(content)
}
