use anyhow::{bail, Context, Result};
use boardgame_recommender_api::models::{
    Game, Interaction, ModelInfoResponse, TrainingData, TrainingResponse,
};
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::{fs, path::PathBuf, time::Duration};

const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Parser)]
#[command(name = "train_catalog")]
#[command(about = "Train the board game recommender on a JSON catalog")]
struct Args {
    /// Game list, or a full `{games, user_interactions}` payload
    games_path: PathBuf,

    /// Separate JSON list of user interactions
    #[arg(long)]
    interactions: Option<PathBuf>,

    #[arg(long, env = "RECOMMENDER_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Return as soon as training has started
    #[arg(long)]
    background: bool,
}

/// Accepts either a bare array of games or a full training payload.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Games(Vec<Game>),
    Payload(TrainingData),
}

fn load_training_data(args: &Args) -> Result<TrainingData> {
    let raw = fs::read_to_string(&args.games_path)
        .with_context(|| format!("Failed to read {}", args.games_path.display()))?;
    let mut data = match serde_json::from_str::<CatalogFile>(&raw)
        .with_context(|| format!("{} is not a game list", args.games_path.display()))?
    {
        CatalogFile::Games(games) => TrainingData {
            games,
            user_interactions: None,
        },
        CatalogFile::Payload(data) => data,
    };

    if let Some(path) = &args.interactions {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let interactions: Vec<Interaction> = serde_json::from_str(&raw)
            .with_context(|| format!("{} is not an interaction list", path.display()))?;
        data.user_interactions = Some(interactions);
    }

    if data.games.is_empty() {
        bail!("{} contains no games", args.games_path.display());
    }
    data.validate().context("Catalog failed validation")?;

    Ok(data)
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}"));
    pb.set_message(message);
    pb.enable_steady_tick(100);
    pb
}

async fn train(
    client: &reqwest::Client,
    api_url: &str,
    background: bool,
    data: &TrainingData,
) -> Result<TrainingResponse> {
    let endpoint = if background {
        format!("{}/api/admin/train", api_url)
    } else {
        format!("{}/api/admin/games/upload", api_url)
    };

    let response = client
        .post(&endpoint)
        .json(data)
        .send()
        .await
        .with_context(|| format!("Failed to reach {}", endpoint))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        bail!("Training request failed with {}: {}", status, body);
    }

    Ok(response.json().await?)
}

async fn model_info(client: &reqwest::Client, api_url: &str) -> Result<ModelInfoResponse> {
    let response = client
        .get(format!("{}/api/model/info", api_url))
        .send()
        .await?
        .error_for_status()?;
    Ok(response.json().await?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let api_url = args.api_url.trim_end_matches('/').to_string();
    let data = load_training_data(&args)?;

    println!(
        "{} {} games, {} interactions from {}",
        style("Loaded").cyan().bold(),
        data.games.len(),
        data.user_interactions.as_ref().map_or(0, Vec::len),
        args.games_path.display()
    );

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(120))
        .build()?;

    let pb = spinner("Training model...");
    let result = train(&client, &api_url, args.background, &data).await;
    pb.finish_and_clear();
    let trained = result?;

    println!(
        "{} {} ({})",
        style("✓").green().bold(),
        trained.message,
        trained.status
    );

    let info = model_info(&client, &api_url).await?;
    println!("{}", style("Model").cyan().bold());
    println!("  status:      {}", info.status);
    println!("  games:       {}", info.games_count);
    println!("  dimensions:  {}", info.dimensions);
    println!(
        "  vocabulary:  {} categories, {} mechanics",
        info.category_vocabulary, info.mechanic_vocabulary
    );
    if let Some(id) = &info.generation_id {
        println!("  generation:  {}", id);
    }

    Ok(())
}
