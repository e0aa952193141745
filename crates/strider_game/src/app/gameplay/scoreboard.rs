use std::cell::Cell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const SCOREBOARD_FILE_NAME: &str = "scoreboard.json";
const SCOREBOARD_VERSION: u32 = 1;

/// Persistence seam for the single surviving integer. A missing or
/// unreadable value is always "absent", never an error; only writes can
/// fail, and callers treat that as best-effort.
pub(crate) trait HighScoreStore {
    fn load(&self) -> Option<u32>;
    fn store(&self, high_score: u32) -> Result<(), String>;
}

#[derive(Debug, Serialize, Deserialize)]
struct ScoreboardFile {
    save_version: u32,
    high_score: u32,
}

#[derive(Debug)]
pub(crate) struct JsonScoreboard {
    path: PathBuf,
}

impl JsonScoreboard {
    pub(crate) fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(SCOREBOARD_FILE_NAME),
        }
    }

    fn parse(raw: &str) -> Result<ScoreboardFile, String> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        match serde_path_to_error::deserialize::<_, ScoreboardFile>(&mut deserializer) {
            Ok(file) => Ok(file),
            Err(error) => {
                let path = error.path().to_string();
                let source = error.into_inner();
                if path.is_empty() || path == "." {
                    Err(format!("parse scoreboard json: {source}"))
                } else {
                    Err(format!("parse scoreboard json at {path}: {source}"))
                }
            }
        }
    }
}

impl HighScoreStore for JsonScoreboard {
    fn load(&self) -> Option<u32> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "scoreboard_missing");
                return None;
            }
            Err(error) => {
                warn!(path = %self.path.display(), error = %error, "scoreboard_unreadable");
                return None;
            }
        };

        let file = match Self::parse(&raw) {
            Ok(file) => file,
            Err(error) => {
                warn!(path = %self.path.display(), error = error.as_str(), "scoreboard_corrupt");
                return None;
            }
        };
        if file.save_version != SCOREBOARD_VERSION {
            warn!(
                path = %self.path.display(),
                expected = SCOREBOARD_VERSION,
                actual = file.save_version,
                "scoreboard_version_mismatch"
            );
            return None;
        }

        Some(file.high_score)
    }

    fn store(&self, high_score: u32) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|error| format!("create data dir '{}': {error}", parent.display()))?;
        }
        let file = ScoreboardFile {
            save_version: SCOREBOARD_VERSION,
            high_score,
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|error| format!("encode scoreboard json: {error}"))?;
        fs::write(&self.path, json)
            .map_err(|error| format!("write scoreboard '{}': {error}", self.path.display()))?;
        Ok(())
    }
}

/// In-memory store for tests and for running without a writable data dir.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryScoreboard {
    value: Rc<Cell<Option<u32>>>,
}

impl MemoryScoreboard {
    pub(crate) fn new(initial: Option<u32>) -> Self {
        Self {
            value: Rc::new(Cell::new(initial)),
        }
    }
}

impl HighScoreStore for MemoryScoreboard {
    fn load(&self) -> Option<u32> {
        self.value.get()
    }

    fn store(&self, high_score: u32) -> Result<(), String> {
        self.value.set(Some(high_score));
        Ok(())
    }
}
