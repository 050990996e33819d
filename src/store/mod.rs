//! Player record storage.
//!
//! The rating engine only needs get/set by case-insensitive username. Each
//! store applies a `set_many` batch atomically, also against other processes
//! sharing the same store; serializing whole read-compute-write cycles is
//! the engine's job.

pub mod json;
pub mod memory;

pub use json::JsonPlayerStore;
pub use memory::MemoryPlayerStore;

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rating::SkillRating;

/// A player's persistent rating record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub username: String,
    /// Lowercase username, the lookup key
    pub key: String,
    pub level: u32,
    pub rating: SkillRating,
    /// Number of rating updates applied
    pub updates: u32,
    pub updated: DateTime<Utc>,
    pub verified: bool,
    /// Loaded from the store, as opposed to a fresh default
    pub known: bool,
}

impl PlayerRecord {
    /// Default record for a player the store has never seen.
    pub fn fresh(username: &str, rating: SkillRating) -> Self {
        Self {
            username: username.to_string(),
            key: player_key(username),
            level: 0,
            rating,
            updates: 0,
            updated: Utc::now(),
            verified: false,
            known: false,
        }
    }

    /// Builds a record from a raw stored row, filling absent fields.
    pub fn from_stored(stored: &StoredPlayer, default_rating: SkillRating) -> Self {
        let rating = match (stored.rating.mu, stored.rating.sigma) {
            (Some(mu), Some(sigma)) if sigma > 0.0 => SkillRating::new(mu, sigma),
            _ => default_rating,
        };
        Self {
            username: stored.username.clone(),
            key: player_key(&stored.username),
            level: stored.level.unwrap_or(0),
            rating,
            updates: stored.updates.unwrap_or(0),
            updated: stored.updated.unwrap_or_default(),
            verified: stored.verified.unwrap_or(false),
            known: true,
        }
    }

    /// Raw row for writing back to a store.
    pub fn to_stored(&self) -> StoredPlayer {
        StoredPlayer {
            username: self.username.clone(),
            level: Some(self.level),
            rating: StoredRating {
                mu: Some(self.rating.mu),
                sigma: Some(self.rating.sigma),
            },
            updates: Some(self.updates),
            updated: Some(self.updated),
            verified: Some(self.verified),
        }
    }
}

/// Stored rating; either half may be missing in older rows.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredRating {
    #[serde(default)]
    pub mu: Option<f64>,
    #[serde(default)]
    pub sigma: Option<f64>,
}

/// A player row as persisted. Only `username` is required.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredPlayer {
    pub username: String,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub rating: StoredRating,
    #[serde(default)]
    pub updates: Option<u32>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub verified: Option<bool>,
}

/// Lookup key for a username.
pub fn player_key(username: &str) -> String {
    username.to_lowercase()
}

/// What a rating write expects to find in the store.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ExpectedRating {
    /// Write unconditionally
    Any,
    /// The player must not be stored yet
    Absent,
    /// The stored rating must still be this one
    Exactly(SkillRating),
}

/// One rating write.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerUpdate {
    pub username: String,
    pub level: u32,
    pub rating: SkillRating,
    pub expected: ExpectedRating,
}

impl PlayerUpdate {
    pub fn new(username: &str, level: u32, rating: SkillRating) -> Self {
        Self {
            username: username.to_string(),
            level,
            rating,
            expected: ExpectedRating::Any,
        }
    }

    /// Only applies if the stored state still matches `expected`.
    pub fn expecting(mut self, expected: ExpectedRating) -> Self {
        self.expected = expected;
        self
    }
}

/// Persistent player records keyed by case-insensitive username.
pub trait PlayerStore: Send + Sync {
    /// Fetches a player, `None` if never stored.
    fn get(&self, username: &str) -> Result<Option<PlayerRecord>>;

    /// Applies every upsert or none of them. Each one bumps the update
    /// counter and stamps the time. Records come back in input order.
    ///
    /// Fails without writing anything if any update's expectation doesn't
    /// hold against the stored state.
    fn set_many(&self, updates: &[PlayerUpdate]) -> Result<Vec<PlayerRecord>>;

    /// Upserts rating and level for a single player.
    fn set(&self, username: &str, level: u32, rating: SkillRating) -> Result<PlayerRecord> {
        self.set_many(&[PlayerUpdate::new(username, level, rating)])?
            .pop()
            .ok_or_else(|| anyhow!("store returned no record for {}", username))
    }

    /// Sets the verified flag. Never creates a player.
    fn set_verified(&self, username: &str, verified: bool) -> Result<Option<PlayerRecord>>;

    /// All verified players.
    fn list_verified(&self) -> Result<Vec<PlayerRecord>>;
}

/// Checks every expectation of a batch against the rows before any write.
pub(crate) fn check_expected<'a>(
    updates: &[PlayerUpdate],
    current: impl Fn(&str) -> Option<&'a StoredPlayer>,
    default_rating: SkillRating,
) -> Result<()> {
    for update in updates {
        let stored = current(&player_key(&update.username))
            .map(|row| PlayerRecord::from_stored(row, default_rating).rating);
        let holds = match update.expected {
            ExpectedRating::Any => true,
            ExpectedRating::Absent => stored.is_none(),
            ExpectedRating::Exactly(rating) => stored == Some(rating),
        };
        if !holds {
            bail!(
                "Rating of {} changed while this round was being rated; rate it again",
                update.username
            );
        }
    }
    Ok(())
}

/// Applies an upsert to a stored row. Shared by the store implementations.
pub(crate) fn upsert_row(
    existing: Option<&StoredPlayer>,
    username: &str,
    level: u32,
    rating: SkillRating,
) -> StoredPlayer {
    let updates = existing.and_then(|row| row.updates).unwrap_or(0) + 1;
    let verified = existing.and_then(|row| row.verified).unwrap_or(false);
    StoredPlayer {
        username: username.to_string(),
        level: Some(level),
        rating: StoredRating {
            mu: Some(rating.mu),
            sigma: Some(rating.sigma),
        },
        updates: Some(updates),
        updated: Some(Utc::now()),
        verified: Some(verified),
    }
}
