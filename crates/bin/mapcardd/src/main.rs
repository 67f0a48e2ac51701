//! # mapcardd: headless map card runner
//!
//! Composition root that wires the recorder and a map card together.
//!
//! ## Responsibilities
//! - Parse configuration (env vars, config file)
//! - Initialize logging
//! - Initialize the `SQLite` recorder and run migrations, optionally importing
//!   a JSON file of states
//! - Poll the recorder, feed the card, run its history fetches concurrently
//! - Print every rendered view as a JSON line on stdout
//! - Handle shutdown (Ctrl-C)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer. No domain logic belongs here.

mod config;
mod renderer;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing_subscriber::EnvFilter;

use mapcard_adapter_recorder_sqlite_sqlx::{RecorderError, SqliteRecorder};
use mapcard_app::card::MapCard;
use mapcard_app::history_scheduler::FetchOutcome;
use mapcard_app::ports::{Clock, HistoryProvider, MapRenderer};
use mapcard_domain::entity::EntityState;
use mapcard_domain::snapshot::{HubState, StateSnapshot};

use crate::config::{Config, RunnerConfig};
use crate::renderer::JsonLinesRenderer;

type Recorder = Arc<SqliteRecorder>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .with_writer(std::io::stderr)
        .init();

    let recorder: Recorder = Arc::new(SqliteRecorder::connect(config.database_url()).await?);

    if let Some(path) = &config.runner.import {
        import_states(&recorder, path).await?;
    }

    let mut card = MapCard::new(Arc::clone(&recorder), JsonLinesRenderer::stdout());
    card.set_config(&config.card_value()?)?;
    tracing::info!(
        poll_secs = config.runner.poll_secs,
        once = config.runner.once,
        "mapcardd started"
    );

    run(&mut card, &recorder, &config.runner).await?;
    Ok(())
}

async fn import_states(recorder: &SqliteRecorder, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let states: Vec<EntityState> = serde_json::from_str(&content)?;
    for state in &states {
        recorder.record(state).await?;
    }
    tracing::info!(count = states.len(), path = %path.display(), "imported states");
    Ok(())
}

async fn run<R, C>(
    card: &mut MapCard<Recorder, R, C>,
    recorder: &SqliteRecorder,
    runner: &RunnerConfig,
) -> Result<(), RecorderError>
where
    R: MapRenderer,
    C: Clock,
{
    let mut fetches = JoinSet::new();

    if runner.once {
        poll_states(card, recorder).await?;
        cycle(card, &mut fetches);
        while let Some(joined) = fetches.join_next().await {
            settle(card, &mut fetches, joined);
        }
        return Ok(());
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(runner.poll_secs));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(err) = poll_states(card, recorder).await {
                    tracing::warn!(error = %err, "failed to read recorder");
                    continue;
                }
                cycle(card, &mut fetches);
            }
            Some(joined) = fetches.join_next() => {
                settle(card, &mut fetches, joined);
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                break;
            }
        }
    }
    Ok(())
}

/// Fold the recorder's latest states into the hub, keeping the `Arc` of every
/// unchanged entity.
async fn poll_states<H, R, C>(
    card: &mut MapCard<H, R, C>,
    recorder: &SqliteRecorder,
) -> Result<(), RecorderError>
where
    H: HistoryProvider + Clone,
    R: MapRenderer,
    C: Clock,
{
    let fresh = recorder.latest_states().await?;
    let states = match card.hub() {
        Some(hub) => hub.states.refreshed(fresh),
        None => fresh.into_iter().collect::<StateSnapshot>(),
    };
    card.set_hub(HubState::new(states));
    Ok(())
}

fn cycle<R, C>(card: &mut MapCard<Recorder, R, C>, fetches: &mut JoinSet<FetchOutcome>)
where
    R: MapRenderer,
    C: Clock,
{
    let report = card.update();
    if let Some(fetch) = report.fetch {
        fetches.spawn(fetch.run());
    }
}

fn settle<R, C>(
    card: &mut MapCard<Recorder, R, C>,
    fetches: &mut JoinSet<FetchOutcome>,
    joined: Result<FetchOutcome, tokio::task::JoinError>,
) where
    R: MapRenderer,
    C: Clock,
{
    match joined {
        Ok(outcome) => {
            card.apply_history(outcome);
            cycle(card, fetches);
        }
        Err(err) => tracing::error!(error = %err, "history task failed"),
    }
}
