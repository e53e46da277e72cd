use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Persistence seam for the high score. Read once at startup; written only
/// when a game resolves (win or loss), never on a manual stop.
pub trait ScoreStore {
    fn read(&self) -> u32;
    fn write(&mut self, high_score: u32);
    fn clear(&mut self);

    /// Cosmetic theme name kept in the same records file. Not part of the
    /// scoring contract; `clear` leaves it alone.
    fn theme(&self) -> Option<String> {
        None
    }
    fn set_theme(&mut self, _name: &str) {}
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read records file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse records file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to write records file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode records: {0}")]
    Encode(#[from] toml::ser::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Records {
    #[serde(default)]
    high_score: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    theme: Option<String>,
}

/// TOML-backed records file. Store failures never reach the round engine;
/// they are logged and the game carries on with in-memory values.
pub struct FileScoreStore {
    path: PathBuf,
    records: Records,
}

impl FileScoreStore {
    pub fn open(path: PathBuf) -> Self {
        let records = match Self::load(&path) {
            Ok(records) => records,
            Err(e) => {
                warn!("{e}");
                Records::default()
            }
        };
        Self { path, records }
    }

    pub fn default_path() -> PathBuf {
        match dirs::data_dir() {
            Some(dir) => dir.join("simonsay").join("records.toml"),
            None => PathBuf::from("simonsay-records.toml"),
        }
    }

    fn load(path: &Path) -> Result<Records, StoreError> {
        if !path.exists() {
            return Ok(Records::default());
        }
        let raw = fs::read_to_string(path).map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                    path: self.path.clone(),
                    source,
                })?;
            }
        }
        let raw = toml::to_string(&self.records)?;
        fs::write(&self.path, raw).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self) {
        if let Err(e) = self.persist() {
            warn!("{e}");
        }
    }
}

impl ScoreStore for FileScoreStore {
    fn read(&self) -> u32 {
        self.records.high_score
    }

    fn write(&mut self, high_score: u32) {
        self.records.high_score = high_score;
        self.save();
    }

    fn clear(&mut self) {
        self.records.high_score = 0;
        self.save();
    }

    fn theme(&self) -> Option<String> {
        self.records.theme.clone()
    }

    fn set_theme(&mut self, name: &str) {
        self.records.theme = Some(name.to_string());
        self.save();
    }
}

/// In-memory store for tests.
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    high_score: u32,
    theme: Option<String>,
}

impl ScoreStore for MemoryScoreStore {
    fn read(&self) -> u32 {
        self.high_score
    }

    fn write(&mut self, high_score: u32) {
        self.high_score = high_score;
    }

    fn clear(&mut self) {
        self.high_score = 0;
    }

    fn theme(&self) -> Option<String> {
        self.theme.clone()
    }

    fn set_theme(&mut self, name: &str) {
        self.theme = Some(name.to_string());
    }
}
