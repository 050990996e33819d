//! Turns recognized region text into a typed match record.
//!
//! OCR output is noisy. Fields that cannot be read make the round invalid
//! instead of failing; callers check `MatchRecord::round_valid`.

pub mod patterns;

use serde::{Deserialize, Serialize};

use crate::store::player_key;
use patterns::{is_bot, match_player, match_score, match_stats, match_timer};

/// Raw text recognized from each region of one screenshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionTexts {
    pub timer: String,
    pub score_red: String,
    pub score_blue: String,
    pub players_red: String,
    pub players_blue: String,
    pub scoreboard_red: String,
    pub scoreboard_blue: String,
}

/// One scoreboard row.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionPlayer {
    pub username: String,
    pub level: u32,
    pub score: u32,
    pub kills: u32,
    pub deaths: u32,
    pub streak: u32,
    /// Generated NPC account; rated in memory but never stored
    pub bot: bool,
    /// Excluded from this round's rating update
    #[serde(default)]
    pub partial: bool,
}

impl RecognitionPlayer {
    /// A name-only player, as used for matchup previews.
    pub fn named(username: &str) -> Self {
        Self {
            username: username.to_string(),
            ..Self::default()
        }
    }

    /// Kills per death; plain kills when the player never died.
    pub fn kdr(&self) -> f64 {
        if self.deaths > 0 {
            self.kills as f64 / self.deaths as f64
        } else {
            self.kills as f64
        }
    }
}

/// Everything read from one result screenshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Remaining round time in seconds
    pub round_timer: u32,
    pub score_red: u32,
    pub score_blue: u32,
    pub players_red: Vec<RecognitionPlayer>,
    pub players_blue: Vec<RecognitionPlayer>,
    /// Timer, both scores and both rosters were read. The numeric fields
    /// are zero when this is false.
    pub round_valid: bool,
}

impl MatchRecord {
    /// Returns a copy where exactly the players named in `excluded` are
    /// flagged partial. Names match case-insensitively, like store lookups.
    /// The original is left untouched.
    pub fn with_exclusions<S: AsRef<str>>(&self, excluded: &[S]) -> MatchRecord {
        let keys: Vec<String> = excluded.iter().map(|name| player_key(name.as_ref().trim())).collect();
        let flag = |players: &[RecognitionPlayer]| -> Vec<RecognitionPlayer> {
            players
                .iter()
                .map(|player| RecognitionPlayer {
                    partial: keys.contains(&player_key(&player.username)),
                    ..player.clone()
                })
                .collect()
        };
        MatchRecord {
            players_red: flag(&self.players_red),
            players_blue: flag(&self.players_blue),
            ..self.clone()
        }
    }

    /// Usernames currently flagged partial, red team first.
    pub fn partial_usernames(&self) -> Vec<String> {
        self.players_red
            .iter()
            .chain(self.players_blue.iter())
            .filter(|player| player.partial)
            .map(|player| player.username.clone())
            .collect()
    }
}

/// Builds a roster from the player-list text and the matching stat table.
///
/// Rows that don't look like `name(level)` are dropped. Stat lines without
/// any digit are treated as headers and skipped; the remaining stat lines
/// pair with players by position, and a missing or malformed one gives
/// zero stats.
pub fn parse_roster(players_text: &str, stats_text: &str) -> Vec<RecognitionPlayer> {
    let stat_lines: Vec<&str> = stats_text
        .lines()
        .filter(|line| line.chars().any(|c| c.is_ascii_digit()))
        .collect();

    players_text
        .lines()
        .filter_map(match_player)
        .enumerate()
        .map(|(index, (username, level))| {
            let [score, kills, deaths, streak] = stat_lines
                .get(index)
                .and_then(|line| match_stats(line))
                .unwrap_or_default();
            RecognitionPlayer {
                bot: is_bot(&username, level),
                username,
                level,
                score,
                kills,
                deaths,
                streak,
                partial: false,
            }
        })
        .collect()
}

/// Parses all region texts into a match record.
pub fn parse_match(texts: &RegionTexts) -> MatchRecord {
    let timer = match_timer(&texts.timer);
    let score_red = match_score(&texts.score_red);
    let score_blue = match_score(&texts.score_blue);
    let players_red = parse_roster(&texts.players_red, &texts.scoreboard_red);
    let players_blue = parse_roster(&texts.players_blue, &texts.scoreboard_blue);

    let round_valid = timer.is_some()
        && score_red.is_some()
        && score_blue.is_some()
        && !players_red.is_empty()
        && !players_blue.is_empty();

    log::debug!(
        "Parsed match: timer={:?} red={:?} blue={:?} players={}v{} valid={}",
        timer,
        score_red,
        score_blue,
        players_red.len(),
        players_blue.len(),
        round_valid
    );

    let (round_timer, score_red, score_blue) = if round_valid {
        (
            timer.unwrap_or_default(),
            score_red.unwrap_or_default(),
            score_blue.unwrap_or_default(),
        )
    } else {
        (0, 0, 0)
    };

    MatchRecord {
        round_timer,
        score_red,
        score_blue,
        players_red,
        players_blue,
        round_valid,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_texts() -> RegionTexts {
        RegionTexts {
            timer: "0:07".to_string(),
            score_red: "5".to_string(),
            score_blue: "Score: 3".to_string(),
            players_red: "Players\nAlpha (42)\nShadowWolf_1234(15)\n".to_string(),
            players_blue: "Players\nBravo (33)\nCharlie (27)\n".to_string(),
            scoreboard_red: "Score Kills Deaths Streak\n320 12 8 4\n150 3 9 1\n".to_string(),
            scoreboard_blue: "Score Kills Deaths Streak\n410 14 2 6\n90 1 5 0\n".to_string(),
        }
    }

    #[test]
    fn test_parse_full_match() {
        let record = parse_match(&sample_texts());

        assert!(record.round_valid);
        assert_eq!(record.round_timer, 7);
        assert_eq!(record.score_red, 5);
        assert_eq!(record.score_blue, 3);
        assert_eq!(record.players_red.len(), 2);
        assert_eq!(record.players_blue.len(), 2);

        let npc = &record.players_red[1];
        assert_eq!(
            npc,
            &RecognitionPlayer {
                username: "ShadowWolf_1234".to_string(),
                level: 15,
                score: 150,
                kills: 3,
                deaths: 9,
                streak: 1,
                bot: true,
                partial: false,
            }
        );
        assert!(!record.players_red[0].bot);
        assert_eq!(record.players_blue[0].kills, 14);
    }

    #[test]
    fn test_roster_pairs_stats_by_position() {
        let roster = parse_roster("ShadowWolf_1234(15)", "320 12 8 4");
        assert_eq!(roster.len(), 1);
        let player = &roster[0];
        assert_eq!(player.username, "ShadowWolf_1234");
        assert_eq!(player.level, 15);
        assert_eq!(
            [player.score, player.kills, player.deaths, player.streak],
            [320, 12, 8, 4]
        );
        assert!(player.bot);
    }

    #[test]
    fn test_roster_missing_or_malformed_stats_default_to_zero() {
        let roster = parse_roster("Alpha (42)\nBravo (33)\nCharlie (27)", "100 1 2 3\n7 7\n");
        assert_eq!(roster.len(), 3);
        assert_eq!(roster[0].score, 100);
        assert_eq!(
            [roster[1].score, roster[1].kills, roster[1].deaths, roster[1].streak],
            [0, 0, 0, 0]
        );
        assert_eq!(roster[2].score, 0);
    }

    #[test]
    fn test_roster_drops_unmatched_lines() {
        let roster = parse_roster("Header\n\n  Alpha (42)\n###\nBravo(9)", "");
        let names: Vec<&str> = roster.iter().map(|p| p.username.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Bravo"]);
    }

    #[test]
    fn test_invalid_timer_zeroes_fields() {
        let mut texts = sample_texts();
        texts.timer = "abc".to_string();
        let record = parse_match(&texts);
        assert!(!record.round_valid);
        assert_eq!((record.round_timer, record.score_red, record.score_blue), (0, 0, 0));
        // rosters are still reported
        assert_eq!(record.players_red.len(), 2);
    }

    #[test]
    fn test_missing_score_invalidates() {
        let mut texts = sample_texts();
        texts.score_blue = String::new();
        assert!(!parse_match(&texts).round_valid);
    }

    #[test]
    fn test_empty_roster_invalidates() {
        let mut texts = sample_texts();
        texts.players_red = "Players\n".to_string();
        let record = parse_match(&texts);
        assert!(!record.round_valid);
        assert!(record.players_red.is_empty());
    }

    #[test]
    fn test_parse_is_idempotent() {
        let texts = sample_texts();
        let a = serde_json::to_vec(&parse_match(&texts)).unwrap();
        let b = serde_json::to_vec(&parse_match(&texts)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_with_exclusions_returns_new_record() {
        let record = parse_match(&sample_texts());
        let excluded = record.with_exclusions(&["Bravo"]);

        assert!(excluded.players_blue[0].partial);
        assert!(!excluded.players_blue[1].partial);
        assert!(record.partial_usernames().is_empty());
        assert_eq!(excluded.partial_usernames(), vec!["Bravo".to_string()]);

        // re-deriving replaces the previous selection
        let again = excluded.with_exclusions(&["Alpha"]);
        assert_eq!(again.partial_usernames(), vec!["Alpha".to_string()]);
        assert_eq!(again.score_red, record.score_red);
    }

    #[test]
    fn test_with_exclusions_ignores_case() {
        let record = parse_match(&sample_texts());
        let excluded = record.with_exclusions(&["bravo", " CHARLIE "]);
        assert_eq!(
            excluded.partial_usernames(),
            vec!["Bravo".to_string(), "Charlie".to_string()]
        );
    }

    #[test]
    fn test_kdr() {
        let mut player = RecognitionPlayer::named("Alpha");
        player.kills = 9;
        assert!((player.kdr() - 9.0).abs() < 1e-12);
        player.deaths = 3;
        assert!((player.kdr() - 3.0).abs() < 1e-12);
    }
}
