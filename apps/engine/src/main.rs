//! Demo driver: load postings and a profile from JSON files, run one batch,
//! print the shortlist.
//!
//! Usage: `engine <postings.json> <profile.json>`. With `ANTHROPIC_API_KEY`
//! set (or in `.env`), extraction is enriched through the Anthropic provider;
//! without it the engine runs in pure heuristic mode.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use engine::extraction::anthropic::AnthropicProvider;
use engine::{EngineConfig, MatchEngine, Profile, RawPosting};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let (postings_path, profile_path) = match (args.next(), args.next()) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            eprintln!("Usage: engine <postings.json> <profile.json>");
            std::process::exit(2);
        }
    };

    let postings: Vec<RawPosting> = read_json(&postings_path)
        .with_context(|| format!("Failed to load postings from '{postings_path}'"))?;
    let profile: Profile = read_json(&profile_path)
        .with_context(|| format!("Failed to load profile from '{profile_path}'"))?;

    let mut engine = MatchEngine::new(EngineConfig::default())?;
    match std::env::var("ANTHROPIC_API_KEY") {
        Ok(api_key) if !api_key.is_empty() => {
            engine = engine.with_provider(Arc::new(AnthropicProvider::new(api_key)?));
            info!("Enrichment provider enabled (model: {})", engine::extraction::anthropic::MODEL);
        }
        _ => info!("No ANTHROPIC_API_KEY set; running in pure heuristic mode"),
    }

    let outcome = engine.run_batch(&postings, &profile).await?;

    println!(
        "Shortlist ({} of {} postings, {} skipped):",
        outcome.shortlist.len(),
        postings.len(),
        outcome.skipped.len()
    );
    for entry in &outcome.shortlist {
        let posting = &postings[entry.posting_ref.index];
        println!(
            "{:>3}. [{:>3}] {} — {} ({})",
            entry.rank,
            entry.match_result.score,
            posting.title.as_deref().unwrap_or("(untitled)"),
            posting.company.as_deref().unwrap_or("(unknown company)"),
            posting.source_name,
        );
        for line in &entry.match_result.explanation {
            println!("       {line}");
        }
    }

    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
