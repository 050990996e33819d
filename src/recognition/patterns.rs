//! Text patterns for each scoreboard field.
//!
//! Each pattern is a named constant with a small matcher returning the
//! captured values, so they can be tested one at a time.

use regex::Regex;
use std::sync::OnceLock;

/// Round timer: `m:ss`, one or two digits on each side.
pub const TIMER_PATTERN: &str = r"(\d{1,2}):(\d{1,2})";

/// Team score: the first run of digits.
pub const SCORE_PATTERN: &str = r"(\d+)";

/// Player list row: `username(level)`. Whitespace or one stray symbol may
/// sit between the name and the bracket, and non-digits may precede the
/// level inside it (e.g. `Name (Lv 12)`).
pub const PLAYER_PATTERN: &str = r"^\s*(\w+)\W?\s*\(\D*(\d+)\D*\)";

/// Stat table row: score, kills, deaths, streak.
pub const STATS_PATTERN: &str = r"^\s*(\d+)\s+(\d+)\s+(\d+)\s+(\d+)\s*$";

/// Generated NPC names: `Word_Word1234`.
pub const BOT_NAME_PATTERN: &str = r"^[A-Za-z0-9]+_[A-Za-z0-9]*[0-9]{4}$";

/// NPC names only count as bots below this level.
pub const BOT_MAX_LEVEL: u32 = 20;

fn compiled(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

fn timer_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    compiled(&RE, TIMER_PATTERN)
}

fn score_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    compiled(&RE, SCORE_PATTERN)
}

fn player_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    compiled(&RE, PLAYER_PATTERN)
}

fn stats_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    compiled(&RE, STATS_PATTERN)
}

fn bot_name_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    compiled(&RE, BOT_NAME_PATTERN)
}

/// Parses the round timer into seconds.
pub fn match_timer(text: &str) -> Option<u32> {
    let caps = timer_regex()?.captures(text)?;
    let minutes: u32 = caps[1].parse().ok()?;
    let seconds: u32 = caps[2].parse().ok()?;
    Some(minutes * 60 + seconds)
}

/// Parses a team score.
pub fn match_score(text: &str) -> Option<u32> {
    let caps = score_regex()?.captures(text)?;
    caps[1].parse().ok()
}

/// Parses one player list row into `(username, level)`.
pub fn match_player(line: &str) -> Option<(String, u32)> {
    let caps = player_regex()?.captures(line)?;
    let level = caps[2].parse().ok()?;
    Some((caps[1].to_string(), level))
}

/// Parses one stat table row into `[score, kills, deaths, streak]`.
pub fn match_stats(line: &str) -> Option<[u32; 4]> {
    let caps = stats_regex()?.captures(line)?;
    let mut stats = [0u32; 4];
    for (i, slot) in stats.iter_mut().enumerate() {
        *slot = caps[i + 1].parse().ok()?;
    }
    Some(stats)
}

/// True for generated NPC accounts: the naming scheme plus a low level.
pub fn is_bot(username: &str, level: u32) -> bool {
    level < BOT_MAX_LEVEL && bot_name_regex().is_some_and(|re| re.is_match(username))
}
