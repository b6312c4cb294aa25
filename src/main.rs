mod config;
mod feed;
mod gate;
mod location;
mod models;
mod normalize;
mod store;
mod submit;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use feed::Feed;
use gate::Gate;
use location::{CommandProvider, NoProvider};
use models::Coordinates;
use store::SupabaseClient;
use submit::Submitter;

#[derive(Parser, Debug)]
#[command(name = "tblog", version, about = "Travel Bug photo log client")]
struct Cli {
    #[command(flatten)]
    overrides: config::Args,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Confirm you have the tag by entering the code printed on it
    Unlock { code: String },
    /// Forget the stored unlock
    Lock,
    /// Post a photo of the tag, with an optional note
    Post {
        /// Photo to upload (compressed and stripped of metadata first)
        photo: PathBuf,
        /// Trail name / nickname shown next to the photo
        #[arg(long)]
        nickname: Option<String>,
        /// A short note: where you found it, where it is headed
        #[arg(long)]
        note: Option<String>,
        /// Ask the configured location provider for a GPS fix
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        gps: bool,
        /// Latitude to record with the visit
        #[arg(long, requires = "lon")]
        lat: Option<f64>,
        /// Longitude to record with the visit
        #[arg(long, requires = "lat")]
        lon: Option<f64>,
    },
    /// Show the most recent photos for this tag
    Feed,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = AppConfig::from_env_and_args(cli.overrides)?;

    match cli.command {
        Command::Unlock { code } => unlock(&cfg, &code),
        Command::Lock => lock(&cfg),
        Command::Post {
            photo,
            nickname,
            note,
            gps,
            lat,
            lon,
        } => post(&cfg, &photo, nickname, note, gps, lat.zip(lon)).await,
        Command::Feed => show_feed(&cfg).await,
    }
}

fn unlock(cfg: &AppConfig, code: &str) -> Result<()> {
    let mut gate = Gate::load(cfg.state_file.clone(), &cfg.tracking_code)?;
    if gate.unlock(code)? {
        println!("Unlocked. Thanks for confirming you have the tag.");
        Ok(())
    } else {
        bail!("That code didn't match. Please check the tag.");
    }
}

fn lock(cfg: &AppConfig) -> Result<()> {
    let mut gate = Gate::load(cfg.state_file.clone(), &cfg.tracking_code)?;
    gate.lock()?;
    println!("Locked.");
    Ok(())
}

async fn post(
    cfg: &AppConfig,
    photo: &Path,
    nickname: Option<String>,
    note: Option<String>,
    gps: bool,
    manual_coords: Option<(f64, f64)>,
) -> Result<()> {
    let gate = Gate::load(cfg.state_file.clone(), &cfg.tracking_code)?;
    if !gate.is_unlocked() {
        bail!("Enter the tracking code first: tblog unlock <CODE>");
    }

    let staged = normalize::normalize_file(photo, cfg.max_dimension, cfg.jpeg_quality).await?;
    tracing::info!(
        width = staged.width,
        height = staged.height,
        bytes = staged.bytes.len(),
        "normalized photo"
    );

    let coords = if gps {
        let coords = match &cfg.location_command {
            Some(command) => location::acquire(&CommandProvider::new(command)).await,
            None => location::acquire(&NoProvider).await,
        }
        .context("couldn't get location")?;
        println!("GPS: {:.5}, {:.5}", coords.latitude, coords.longitude);
        Some(coords)
    } else {
        manual_coords.map(|(latitude, longitude)| Coordinates {
            latitude,
            longitude,
        })
    };

    let client = SupabaseClient::new(&cfg.base_url, &cfg.anon_key)?;
    let mut submitter = Submitter::new();
    submitter.form.nickname = nickname.unwrap_or_default();
    submitter.form.message = note.unwrap_or_default();
    submitter.form.coords = coords;
    submitter.form.staged = Some(staged);
    submitter.submit(&client, &gate, cfg).await?;

    println!("Posted. Thanks for moving {} along!", cfg.tag_label);
    println!();

    let mut feed = Feed::new();
    feed.refresh(&client, cfg).await;
    print_feed(&feed, cfg);
    Ok(())
}

async fn show_feed(cfg: &AppConfig) -> Result<()> {
    let client = SupabaseClient::new(&cfg.base_url, &cfg.anon_key)?;
    let mut feed = Feed::new();
    feed.refresh(&client, cfg).await;
    print_feed(&feed, cfg);
    Ok(())
}

fn print_feed(feed: &Feed, cfg: &AppConfig) {
    println!("Travel Bug {} • recent photos", cfg.tag_label);
    if feed.visits.is_empty() {
        println!("No photos yet. Be the first!");
        return;
    }

    let now = Utc::now();
    for visit in &feed.visits {
        let name = visit.nickname.as_deref().unwrap_or("Anon cacher");
        println!();
        println!("{} ({})", name, feed::time_ago(visit.created_at, now));
        if let Some(message) = &visit.message {
            println!("  {}", message);
        }
        if let Some(coords) = visit.location() {
            println!(
                "  https://maps.google.com/?q={},{}",
                coords.latitude, coords.longitude
            );
        }
        println!("  {}", visit.photo_url);
    }
}
