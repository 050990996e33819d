use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::{load_config, AppConfig};
use crate::locate::locate_regions;
use crate::ocr::TesseractRecognizer;
use crate::pipeline::{read_screenshot, ScreenshotStatus};
use crate::rating::{RatingEngine, SkillRating};
use crate::store::{JsonPlayerStore, PlayerStore};
use crate::surface::load_screenshot;

#[derive(Parser, Debug)]
#[command(author, version, about = "Rates Flag Wars rounds from scoreboard screenshots")]
pub struct Cli {
    /// Config file (defaults to config.json next to the executable)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Player store file, overrides the config
    #[arg(short, long, global = true)]
    pub store: Option<PathBuf>,

    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Print the seven scoreboard regions of a screenshot
    Locate { image: PathBuf },
    /// Recognize a screenshot without rating it
    Read { image: PathBuf },
    /// Rate the round shown in a screenshot
    Rate {
        image: PathBuf,
        /// Player who only played part of the round (repeatable)
        #[arg(short, long)]
        exclude: Vec<String>,
        /// Write the new ratings to the store
        #[arg(long)]
        commit: bool,
    },
    /// Win chances for a matchup of comma separated names
    Try { red: String, blue: String },
    /// Show a player's stored record
    Player { username: String },
    /// Mark a player verified
    Verify {
        username: String,
        /// Remove the mark instead
        #[arg(long)]
        revoke: bool,
    },
    /// List verified players
    Verified,
}

pub fn interpret() -> Cli {
    Cli::parse()
}

pub fn execute(cli: &Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_deref());
    if let Some(store) = &cli.store {
        config.store_path = Some(store.clone());
    }

    match &cli.command {
        Command::Locate { image } => handle_locate(image, &config),
        Command::Read { image } => handle_read(image, &config),
        Command::Rate {
            image,
            exclude,
            commit,
        } => handle_rate(image, exclude, *commit, &config),
        Command::Try { red, blue } => handle_try(red, blue, &config),
        Command::Player { username } => handle_player(username, &config),
        Command::Verify { username, revoke } => handle_verify(username, !revoke, &config),
        Command::Verified => handle_verified(&config),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

fn open_store(config: &AppConfig) -> Result<JsonPlayerStore> {
    let rating = &config.rating;
    JsonPlayerStore::open(
        &config.resolved_store_path(),
        SkillRating::new(rating.initial_mu, rating.initial_sigma),
    )
}

fn open_engine(config: &AppConfig) -> Result<RatingEngine<JsonPlayerStore>> {
    Ok(RatingEngine::new(open_store(config)?, config.rating.clone()))
}

fn handle_locate(image: &Path, config: &AppConfig) -> Result<()> {
    let screenshot = load_screenshot(image)?;
    print_json(&locate_regions(&screenshot, &config.locator))
}

fn handle_read(image: &Path, config: &AppConfig) -> Result<()> {
    let screenshot = load_screenshot(image)?;
    let recognizer = TesseractRecognizer::new(&config.ocr)?;
    print_json(&read_screenshot(&screenshot, &recognizer, config)?)
}

fn handle_rate(image: &Path, exclude: &[String], commit: bool, config: &AppConfig) -> Result<()> {
    let screenshot = load_screenshot(image)?;
    let recognizer = TesseractRecognizer::new(&config.ocr)?;
    let report = read_screenshot(&screenshot, &recognizer, config)?;

    let record = match (report.status, &report.record) {
        (ScreenshotStatus::Ready, Some(record)) => record,
        (ScreenshotStatus::TimerTooLong, _) => bail!(
            "Round is still running; take the screenshot with at most {} seconds left",
            config.rules.max_timer_seconds
        ),
        (status, _) => bail!(
            "The image could not be processed. Make sure the round timer, team scores and scoreboard are fully visible. ({})",
            status.code().unwrap_or("ERR_REC_CTX")
        ),
    };

    let engine = open_engine(config)?;
    let outcome = engine.apply_update(&record.with_exclusions(exclude), commit)?;
    print_json(&outcome)
}

fn handle_try(red: &str, blue: &str, config: &AppConfig) -> Result<()> {
    let engine = open_engine(config)?;
    print_json(&engine.preview_matchup(red, blue, config.rules.max_team_players)?)
}

fn no_records(username: &str) -> anyhow::Error {
    anyhow!("No records were found for the player with username {username} (ERR_USR_INV)")
}

fn handle_player(username: &str, config: &AppConfig) -> Result<()> {
    let record = open_store(config)?
        .get(username)?
        .ok_or_else(|| no_records(username))?;
    print_json(&record)
}

fn handle_verify(username: &str, verified: bool, config: &AppConfig) -> Result<()> {
    let record = open_store(config)?
        .set_verified(username, verified)?
        .ok_or_else(|| no_records(username))?;
    print_json(&record)
}

fn handle_verified(config: &AppConfig) -> Result<()> {
    print_json(&open_store(config)?.list_verified()?)
}
