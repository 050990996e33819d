use anyhow::{anyhow, bail, Result};
use chrono::Utc;
use skillratings::trueskill::{trueskill_two_teams, TrueSkillRating};
use skillratings::Outcomes;
use std::sync::Mutex;

use super::types::{RatedPlayer, RatingChange, RatingOutcome, RatingProbability, SkillRating};
use super::{match_quality, trueskill_config, win_probability};
use crate::config::RatingConfig;
use crate::recognition::{MatchRecord, RecognitionPlayer};
use crate::store::{ExpectedRating, PlayerRecord, PlayerStore, PlayerUpdate};

/// Ranks for (red, blue); the higher score gets rank 0, equal scores tie.
pub fn team_ranks(score_red: u32, score_blue: u32) -> [u32; 2] {
    match score_red.cmp(&score_blue) {
        std::cmp::Ordering::Greater => [0, 1],
        std::cmp::Ordering::Less => [1, 0],
        std::cmp::Ordering::Equal => [0, 0],
    }
}

fn red_outcome(ranks: [u32; 2]) -> Outcomes {
    match ranks[0].cmp(&ranks[1]) {
        std::cmp::Ordering::Less => Outcomes::WIN,
        std::cmp::Ordering::Greater => Outcomes::LOSS,
        std::cmp::Ordering::Equal => Outcomes::DRAW,
    }
}

/// Splits a comma separated name list, trimming blanks.
pub fn parse_team_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Computes probabilities and applies TrueSkill updates against a store.
pub struct RatingEngine<S: PlayerStore> {
    store: S,
    config: RatingConfig,
    // held across read-compute-write of a committed update
    commit_lock: Mutex<()>,
}

impl<S: PlayerStore> RatingEngine<S> {
    pub fn new(store: S, config: RatingConfig) -> Self {
        Self {
            store,
            config,
            commit_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &RatingConfig {
        &self.config
    }

    /// Rating given to players with no stored record.
    pub fn initial_rating(&self) -> SkillRating {
        SkillRating::new(self.config.initial_mu, self.config.initial_sigma)
    }

    fn lookup(&self, player: &RecognitionPlayer) -> Result<PlayerRecord> {
        let record = self.store.get(&player.username)?;
        Ok(record.unwrap_or_else(|| {
            let mut fresh = PlayerRecord::fresh(&player.username, self.initial_rating());
            fresh.level = player.level;
            fresh
        }))
    }

    fn lookup_team(&self, players: &[RecognitionPlayer]) -> Result<Vec<PlayerRecord>> {
        players.iter().map(|player| self.lookup(player)).collect()
    }

    /// Win chances and match quality for a recognized round.
    ///
    /// Records come back for every player; the probabilities only count
    /// players that are not flagged partial. Errors if either team has no
    /// such player.
    pub fn compute_probabilities(&self, record: &MatchRecord) -> Result<RatingProbability> {
        let players_red = self.lookup_team(&record.players_red)?;
        let players_blue = self.lookup_team(&record.players_blue)?;

        let red = rated_ratings(&record.players_red, &players_red);
        let blue = rated_ratings(&record.players_blue, &players_blue);
        if red.is_empty() || blue.is_empty() {
            bail!("Both teams need at least one rated player");
        }

        let win_red = win_probability(&red, &blue, &self.config);
        Ok(RatingProbability {
            win_red,
            win_blue: 1.0 - win_red,
            quality: match_quality(&red, &blue, &self.config),
            players_red,
            players_blue,
        })
    }

    /// Rates one round.
    ///
    /// With `commit` the new ratings of non-bot players are written to the
    /// store in a single batch, so a store failure leaves every record as it
    /// was; without it nothing is written and the returned records are
    /// synthesized. Committed updates are serialized engine-wide so two
    /// rounds sharing a player never lose an update.
    pub fn apply_update(&self, record: &MatchRecord, commit: bool) -> Result<RatingOutcome> {
        let _guard = if commit {
            Some(
                self.commit_lock
                    .lock()
                    .map_err(|_| anyhow!("rating commit lock poisoned"))?,
            )
        } else {
            None
        };

        let probability = self.compute_probabilities(record)?;
        let ranks = team_ranks(record.score_red, record.score_blue);

        let red: Vec<TrueSkillRating> = rated_ratings(&record.players_red, &probability.players_red)
            .into_iter()
            .map(TrueSkillRating::from)
            .collect();
        let blue: Vec<TrueSkillRating> = rated_ratings(&record.players_blue, &probability.players_blue)
            .into_iter()
            .map(TrueSkillRating::from)
            .collect();

        let (new_red, new_blue) = trueskill_two_teams(
            &red,
            &blue,
            &red_outcome(ranks),
            &trueskill_config(&self.config),
        );

        let mut players_red = settle_team(&record.players_red, &probability.players_red, new_red)?;
        let mut players_blue = settle_team(&record.players_blue, &probability.players_blue, new_blue)?;
        if commit {
            self.commit(&mut players_red, &mut players_blue)?;
        }

        log::info!(
            "Rated round {}-{} ({} red, {} blue), committed: {}",
            record.score_red,
            record.score_blue,
            players_red.len(),
            players_blue.len(),
            commit
        );

        Ok(RatingOutcome {
            probability,
            ranks,
            players_red,
            players_blue,
            committed: commit,
        })
    }

    /// Writes every rated non-bot player in one batch and swaps in the
    /// stored records.
    fn commit(&self, red: &mut [RatedPlayer], blue: &mut [RatedPlayer]) -> Result<()> {
        let mut pending: Vec<&mut RatedPlayer> = red
            .iter_mut()
            .chain(blue.iter_mut())
            .filter(|rated| !rated.bot && matches!(rated.change, RatingChange::Updated { .. }))
            .collect();
        let updates: Vec<PlayerUpdate> = pending
            .iter()
            .map(|rated| {
                // rated from this rating; a concurrent writer makes the batch fail
                let expected = match rated.change {
                    RatingChange::Updated { old, .. } if rated.record.known => ExpectedRating::Exactly(old),
                    _ => ExpectedRating::Absent,
                };
                PlayerUpdate::new(&rated.record.username, rated.record.level, rated.record.rating)
                    .expecting(expected)
            })
            .collect();
        if updates.is_empty() {
            return Ok(());
        }

        let stored = self.store.set_many(&updates)?;
        if stored.len() != pending.len() {
            bail!("store returned {} records for {} updates", stored.len(), pending.len());
        }
        for (rated, record) in pending.iter_mut().zip(stored) {
            rated.record = record;
        }
        Ok(())
    }

    /// Odds for a hypothetical matchup given as comma separated names.
    pub fn preview_matchup(
        &self,
        red: &str,
        blue: &str,
        max_team_players: usize,
    ) -> Result<RatingProbability> {
        let red = parse_team_list(red);
        let blue = parse_team_list(blue);
        let allowed = 1..=max_team_players;
        if !allowed.contains(&red.len()) || !allowed.contains(&blue.len()) {
            bail!("Both teams must have between 1 and {max_team_players} players");
        }

        let record = MatchRecord {
            players_red: red.iter().map(|name| RecognitionPlayer::named(name)).collect(),
            players_blue: blue.iter().map(|name| RecognitionPlayer::named(name)).collect(),
            ..MatchRecord::default()
        };
        self.compute_probabilities(&record)
    }
}

/// Pairs new ratings back with the roster in recognition order. Records of
/// rated players are synthesized; nothing touches the store here.
fn settle_team(
    players: &[RecognitionPlayer],
    records: &[PlayerRecord],
    new_ratings: Vec<TrueSkillRating>,
) -> Result<Vec<RatedPlayer>> {
    let mut new_ratings = new_ratings.into_iter().map(SkillRating::from);
    let mut settled = Vec::with_capacity(players.len());

    for (player, current) in players.iter().zip(records) {
        if player.partial {
            settled.push(RatedPlayer {
                record: current.clone(),
                change: RatingChange::NotApplicable,
                bot: player.bot,
            });
            continue;
        }

        let new = new_ratings
            .next()
            .ok_or_else(|| anyhow!("missing rating for {}", player.username))?;
        let old = current.rating;
        log::debug!(
            "{}: {:.2} -> {:.2}",
            player.username,
            old.conservative(),
            new.conservative()
        );

        settled.push(RatedPlayer {
            record: PlayerRecord {
                username: player.username.clone(),
                level: player.level,
                rating: new,
                updates: current.updates + 1,
                updated: Utc::now(),
                ..current.clone()
            },
            change: RatingChange::Updated { old, new },
            bot: player.bot,
        });
    }

    Ok(settled)
}

fn rated_ratings(players: &[RecognitionPlayer], records: &[PlayerRecord]) -> Vec<SkillRating> {
    players
        .iter()
        .zip(records)
        .filter(|(player, _)| !player.partial)
        .map(|(_, record)| record.rating)
        .collect()
}
