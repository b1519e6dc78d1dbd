//! File-backed local vote history
//!
//! Stored as `<history_dir>/history.json`:
//!
//! ```json
//! { "voted_pain_points": ["..."], "voted_polls": ["..."] }
//! ```

use board_core::error::{BoardError, Result};
use board_core::identity::{HistoryKey, HistoryLists, VoteHistory};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, warn};

const HISTORY_FILE: &str = "history.json";

/// Vote history persisted to a JSON file in the history directory
#[derive(Debug)]
pub struct FileVoteHistory {
    path: PathBuf,
    lists: RwLock<HistoryLists>,
}

impl FileVoteHistory {
    /// Open the history in `dir`. An unreadable or corrupt file starts an
    /// empty history; the store constraint still prevents double votes.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(HISTORY_FILE);

        let lists = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Ignoring corrupt vote history {:?}: {}", path, e);
                HistoryLists::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HistoryLists::default(),
            Err(e) => {
                warn!("Ignoring unreadable vote history {:?}: {}", path, e);
                HistoryLists::default()
            }
        };

        Ok(Self {
            path,
            lists: RwLock::new(lists),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, lists: &HistoryLists) -> Result<()> {
        let temp_path = self
            .path
            .with_extension(format!("json.{}.tmp", std::process::id()));
        {
            let mut writer = BufWriter::new(fs::File::create(&temp_path)?);
            serde_json::to_writer_pretty(&mut writer, lists)?;
            writer.flush()?;
        }
        fs::rename(&temp_path, &self.path)?;
        debug!("Saved vote history to {:?}", self.path);
        Ok(())
    }
}

impl VoteHistory for FileVoteHistory {
    fn contains(&self, key: HistoryKey, id: &str) -> bool {
        self.lists
            .read()
            .map(|lists| lists.get(key).contains(id))
            .unwrap_or(false)
    }

    fn record(&self, key: HistoryKey, id: &str) -> Result<()> {
        let mut lists = self
            .lists
            .write()
            .map_err(|_| BoardError::Backend("vote history lock poisoned".into()))?;
        if lists.get_mut(key).insert(id.to_string()) {
            self.save(&lists)?;
        }
        Ok(())
    }

    fn ids(&self, key: HistoryKey) -> Vec<String> {
        self.lists
            .read()
            .map(|lists| lists.get(key).iter().cloned().collect())
            .unwrap_or_default()
    }
}
