use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::sync::Mutex;

use super::{
    check_expected, player_key, upsert_row, PlayerRecord, PlayerStore, PlayerUpdate, StoredPlayer,
};
use crate::rating::SkillRating;

/// Process-local store. Used for previews and tests.
#[derive(Debug, Default)]
pub struct MemoryPlayerStore {
    rows: Mutex<HashMap<String, StoredPlayer>>,
    default_rating: SkillRating,
}

impl MemoryPlayerStore {
    pub fn new(default_rating: SkillRating) -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            default_rating,
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, StoredPlayer>>> {
        self.rows
            .lock()
            .map_err(|_| anyhow!("player store lock poisoned"))
    }
}

impl PlayerStore for MemoryPlayerStore {
    fn get(&self, username: &str) -> Result<Option<PlayerRecord>> {
        let rows = self.lock()?;
        Ok(rows
            .get(&player_key(username))
            .map(|row| PlayerRecord::from_stored(row, self.default_rating)))
    }

    fn set_many(&self, updates: &[PlayerUpdate]) -> Result<Vec<PlayerRecord>> {
        let mut rows = self.lock()?;
        check_expected(updates, |key| rows.get(key), self.default_rating)?;

        let mut records = Vec::with_capacity(updates.len());
        for update in updates {
            let key = player_key(&update.username);
            let row = upsert_row(rows.get(&key), &update.username, update.level, update.rating);
            records.push(PlayerRecord::from_stored(&row, self.default_rating));
            rows.insert(key, row);
        }
        Ok(records)
    }

    fn set_verified(&self, username: &str, verified: bool) -> Result<Option<PlayerRecord>> {
        let mut rows = self.lock()?;
        Ok(rows.get_mut(&player_key(username)).map(|row| {
            row.verified = Some(verified);
            PlayerRecord::from_stored(row, self.default_rating)
        }))
    }

    fn list_verified(&self) -> Result<Vec<PlayerRecord>> {
        let rows = self.lock()?;
        let mut verified: Vec<PlayerRecord> = rows
            .values()
            .filter(|row| row.verified.unwrap_or(false))
            .map(|row| PlayerRecord::from_stored(row, self.default_rating))
            .collect();
        verified.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(verified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_is_case_insensitive() {
        let store = MemoryPlayerStore::default();
        store.set("Alpha", 12, SkillRating::new(30.0, 5.0)).unwrap();

        let record = store.get("ALPHA").unwrap().unwrap();
        assert_eq!(record.username, "Alpha");
        assert_eq!(record.level, 12);
        assert_eq!(record.updates, 1);
        assert!(store.get("bravo").unwrap().is_none());
    }

    #[test]
    fn test_set_increments_updates() {
        let store = MemoryPlayerStore::default();
        store.set("Alpha", 12, SkillRating::default()).unwrap();
        let record = store.set("alpha", 13, SkillRating::new(26.0, 7.5)).unwrap();
        assert_eq!(record.updates, 2);
        assert_eq!(record.username, "alpha");
        assert_eq!(record.rating, SkillRating::new(26.0, 7.5));
    }

    #[test]
    fn test_set_verified_never_upserts() {
        let store = MemoryPlayerStore::default();
        assert!(store.set_verified("ghost", true).unwrap().is_none());
        assert!(store.get("ghost").unwrap().is_none());

        store.set("Alpha", 1, SkillRating::default()).unwrap();
        store.set("Bravo", 1, SkillRating::default()).unwrap();
        let record = store.set_verified("alpha", true).unwrap().unwrap();
        assert!(record.verified);

        let verified = store.list_verified().unwrap();
        assert_eq!(verified.len(), 1);
        assert_eq!(verified[0].username, "Alpha");

        // later rating updates keep the flag
        let record = store.set("Alpha", 2, SkillRating::default()).unwrap();
        assert!(record.verified);
    }

    #[test]
    fn test_set_many_applies_in_order() {
        let store = MemoryPlayerStore::default();
        let records = store
            .set_many(&[
                PlayerUpdate::new("Alpha", 3, SkillRating::new(26.0, 7.0)),
                PlayerUpdate::new("Bravo", 5, SkillRating::new(24.0, 7.0)),
            ])
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].username, "Bravo");
        assert_eq!(store.get("alpha").unwrap().unwrap().level, 3);
    }
}
