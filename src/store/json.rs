//! JSON file player store.
//!
//! The file holds a JSON array of rows. Every operation takes an advisory
//! lock on a sidecar `<file>.lock` and reads the file fresh, so several
//! processes can share one store. Writes re-read under the exclusive lock,
//! apply the change and replace the file through a temporary file in the
//! same directory; a crash mid-write leaves the previous snapshot intact.

use anyhow::{Context, Result};
use fd_lock::RwLock;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::{
    check_expected, player_key, upsert_row, PlayerRecord, PlayerStore, PlayerUpdate, StoredPlayer,
};
use crate::rating::SkillRating;

type Rows = BTreeMap<String, StoredPlayer>;

#[derive(Debug)]
pub struct JsonPlayerStore {
    path: PathBuf,
    lock_path: PathBuf,
    default_rating: SkillRating,
}

impl JsonPlayerStore {
    /// Opens the store at `path`, starting empty if the file doesn't exist.
    /// Fails if an existing file can't be parsed.
    pub fn open(path: &Path, default_rating: SkillRating) -> Result<Self> {
        let mut lock_name = OsString::from(path.as_os_str());
        lock_name.push(".lock");

        let store = Self {
            path: path.to_path_buf(),
            lock_path: PathBuf::from(lock_name),
            default_rating,
        };

        let count = store.with_rows(|rows| rows.len())?;
        log::info!("Player store {} opened with {} players", path.display(), count);
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn lock_file(&self) -> Result<RwLock<File>> {
        let dir = self.dir();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create store directory {}", dir.display()))?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&self.lock_path)
            .with_context(|| format!("Failed to open lock file {}", self.lock_path.display()))?;
        Ok(RwLock::new(file))
    }

    /// Reads the current snapshot. Caller holds the lock.
    fn read_rows(&self) -> Result<Rows> {
        if !self.path.exists() {
            return Ok(Rows::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read player store {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(Rows::new());
        }
        let players: Vec<StoredPlayer> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse player store {}", self.path.display()))?;
        Ok(players
            .into_iter()
            .map(|row| (player_key(&row.username), row))
            .collect())
    }

    /// Replaces the file with a full snapshot. Caller holds the exclusive lock.
    fn write_rows(&self, rows: &Rows) -> Result<()> {
        let temp =
            NamedTempFile::new_in(self.dir()).context("Failed to create temporary store file")?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            let players: Vec<&StoredPlayer> = rows.values().collect();
            serde_json::to_writer_pretty(&mut writer, &players)
                .context("Failed to serialize player store")?;
            writer.flush().context("Failed to write player store")?;
        }
        temp.persist(&self.path)
            .with_context(|| format!("Failed to replace player store {}", self.path.display()))?;
        Ok(())
    }

    fn with_rows<T>(&self, read: impl FnOnce(&Rows) -> T) -> Result<T> {
        let lock = self.lock_file()?;
        let _guard = lock.read().context("Failed to lock player store")?;
        let rows = self.read_rows()?;
        Ok(read(&rows))
    }
}

impl PlayerStore for JsonPlayerStore {
    fn get(&self, username: &str) -> Result<Option<PlayerRecord>> {
        let key = player_key(username);
        self.with_rows(|rows| {
            rows.get(&key)
                .map(|row| PlayerRecord::from_stored(row, self.default_rating))
        })
    }

    fn set_many(&self, updates: &[PlayerUpdate]) -> Result<Vec<PlayerRecord>> {
        let mut lock = self.lock_file()?;
        let _guard = lock.write().context("Failed to lock player store")?;
        let mut rows = self.read_rows()?;

        check_expected(updates, |key| rows.get(key), self.default_rating)?;

        let mut records = Vec::with_capacity(updates.len());
        for update in updates {
            let key = player_key(&update.username);
            let row = upsert_row(rows.get(&key), &update.username, update.level, update.rating);
            records.push(PlayerRecord::from_stored(&row, self.default_rating));
            rows.insert(key, row);
        }

        self.write_rows(&rows)?;
        log::debug!("Stored {} players in {}", records.len(), self.path.display());
        Ok(records)
    }

    fn set_verified(&self, username: &str, verified: bool) -> Result<Option<PlayerRecord>> {
        let mut lock = self.lock_file()?;
        let _guard = lock.write().context("Failed to lock player store")?;
        let mut rows = self.read_rows()?;

        let Some(row) = rows.get_mut(&player_key(username)) else {
            return Ok(None);
        };
        row.verified = Some(verified);
        let record = PlayerRecord::from_stored(row, self.default_rating);

        self.write_rows(&rows)?;
        Ok(Some(record))
    }

    fn list_verified(&self) -> Result<Vec<PlayerRecord>> {
        self.with_rows(|rows| {
            rows.values()
                .filter(|row| row.verified.unwrap_or(false))
                .map(|row| PlayerRecord::from_stored(row, self.default_rating))
                .collect()
        })
    }
}
