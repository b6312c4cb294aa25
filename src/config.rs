//! Centralized application configuration.
//!
//! The fixed deployment values (tracking code, bucket, table, tag label) are
//! embedded as defaults and overridable through environment variables; the
//! values that differ per machine also have CLI flags. Everything is resolved
//! once at startup into an immutable `AppConfig` that the rest of the program
//! borrows.

use anyhow::{Context, Result, bail};
use std::env;
use std::path::PathBuf;
use url::Url;

const SUPABASE_URL_ENV: &str = "TBLOG_SUPABASE_URL";
const ANON_KEY_ENV: &str = "TBLOG_ANON_KEY";
const TRACKING_CODE_ENV: &str = "TBLOG_TRACKING_CODE";
const BUCKET_ENV: &str = "TBLOG_BUCKET";
const TABLE_ENV: &str = "TBLOG_TABLE";
const TAG_LABEL_ENV: &str = "TBLOG_TAG_LABEL";
const STATE_FILE_ENV: &str = "TBLOG_STATE_FILE";
const LOCATION_COMMAND_ENV: &str = "TBLOG_LOCATION_COMMAND";
const MAX_DIMENSION_ENV: &str = "TBLOG_MAX_DIMENSION";
const JPEG_QUALITY_ENV: &str = "TBLOG_JPEG_QUALITY";

// Do NOT print the tracking code anywhere; the tag label is the display name.
const DEFAULT_TRACKING_CODE: &str = "D98MYP";
const DEFAULT_BUCKET: &str = "tb-tbb2qbe";
const DEFAULT_TABLE: &str = "tb_visits";
const DEFAULT_TAG_LABEL: &str = "TBB2QBE";

const DEFAULT_MAX_DIMENSION: u32 = 1600;
const DEFAULT_JPEG_QUALITY: u8 = 80;
const FEED_LIMIT: u32 = 60;

/// CLI overrides for the per-machine configuration values.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Supabase project URL (overrides TBLOG_SUPABASE_URL)
    #[arg(long)]
    pub supabase_url: Option<String>,

    /// Supabase anon key (overrides TBLOG_ANON_KEY)
    #[arg(long)]
    pub anon_key: Option<String>,

    /// Where the unlock state is kept (overrides TBLOG_STATE_FILE)
    #[arg(long)]
    pub state_file: Option<PathBuf>,

    /// Command that prints {"latitude": .., "longitude": ..} for --gps
    /// (overrides TBLOG_LOCATION_COMMAND)
    #[arg(long)]
    pub location_command: Option<String>,
}

/// Immutable configuration, built once at process start and passed by
/// reference. Never mutated afterwards.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: String,
    pub anon_key: String,
    pub tracking_code: String,
    pub bucket: String,
    pub table: String,
    pub tag_label: String,
    pub max_dimension: u32,
    pub jpeg_quality: u8,
    pub feed_limit: u32,
    pub state_file: PathBuf,
    pub location_command: Option<String>,
}

impl AppConfig {
    /// Merge CLI flags over environment variables over built-in defaults.
    pub fn from_env_and_args(args: Args) -> Result<Self> {
        let base_url = args
            .supabase_url
            .or_else(|| env::var(SUPABASE_URL_ENV).ok())
            .with_context(|| {
                format!("no Supabase URL configured (set {SUPABASE_URL_ENV} or pass --supabase-url)")
            })?;
        let parsed = Url::parse(&base_url)
            .with_context(|| format!("parsing Supabase URL `{}`", base_url))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            bail!("Supabase URL `{}` must use http or https", base_url);
        }

        let anon_key = args
            .anon_key
            .or_else(|| env::var(ANON_KEY_ENV).ok())
            .with_context(|| {
                format!("no Supabase anon key configured (set {ANON_KEY_ENV} or pass --anon-key)")
            })?;

        let tracking_code = env::var(TRACKING_CODE_ENV)
            .unwrap_or_else(|_| DEFAULT_TRACKING_CODE.to_string())
            .trim()
            .to_uppercase();

        let state_file = match args
            .state_file
            .or_else(|| env::var(STATE_FILE_ENV).ok().map(PathBuf::from))
        {
            Some(path) => path,
            None => default_state_file()?,
        };

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
            tracking_code,
            bucket: env::var(BUCKET_ENV).unwrap_or_else(|_| DEFAULT_BUCKET.to_string()),
            table: env::var(TABLE_ENV).unwrap_or_else(|_| DEFAULT_TABLE.to_string()),
            tag_label: env::var(TAG_LABEL_ENV).unwrap_or_else(|_| DEFAULT_TAG_LABEL.to_string()),
            max_dimension: max_dimension(),
            jpeg_quality: jpeg_quality(),
            feed_limit: FEED_LIMIT,
            state_file,
            location_command: args
                .location_command
                .or_else(|| env::var(LOCATION_COMMAND_ENV).ok()),
        })
    }
}

fn default_state_file() -> Result<PathBuf> {
    let dir = dirs::config_dir().context("could not determine a config directory for unlock state")?;
    Ok(dir.join("tblog.json"))
}

fn max_dimension() -> u32 {
    env::var(MAX_DIMENSION_ENV)
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_MAX_DIMENSION)
}

fn jpeg_quality() -> u8 {
    env::var(JPEG_QUALITY_ENV)
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|v| (1..=100).contains(v))
        .unwrap_or(DEFAULT_JPEG_QUALITY)
}
