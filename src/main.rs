use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glimmer_core::{
    CacheStore, Config, Environment, FileCache, HttpClient, Rendered, ReqwestHttpClient, Segment,
    SystemEnvironment,
};
use glimmer_gitlab::{GitLabSegment, GitReader};
use glimmer_weather::WeatherSegment;

#[derive(Debug, Parser)]
#[command(name = "glimmer", version, about = "Shell prompt segments")]
struct Cli {
    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print the rendered segment as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Explain failures on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Open merge requests of the GitLab project in the current directory
    Gitlab,
    /// Current weather
    Weather,
    /// Show the effective configuration and its problems
    Config,
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Config::load().context("Failed to load config"),
    }
}

fn print_rendered(rendered: &Rendered, json: bool, verbose: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rendered)?);
    } else if rendered.enabled {
        for (name, value) in &rendered.fields {
            println!("{}={}", name, value);
        }
    }

    if verbose {
        if let (Some(hint), Some(detail)) = (rendered.hint, rendered.error.as_deref()) {
            eprintln!("{}: {} ({})", rendered.segment, hint, detail);
        } else if !rendered.enabled {
            eprintln!("{}: not applicable here", rendered.segment);
        }
    }
    Ok(())
}

fn print_config(config: &Config, json: bool) -> Result<bool> {
    let validation = config.validate();
    let shown = config.redacted();

    if json {
        let report = serde_json::json!({
            "config": shown,
            "errors": validation.errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "warnings": validation.warnings.iter().map(ToString::to_string).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&shown)?);
        for warning in &validation.warnings {
            println!("warning: {}", warning);
        }
        if !validation.is_valid() {
            println!("error: {}", validation.error_summary());
        }
    }

    Ok(validation.is_valid())
}

#[tokio::main]
async fn main() -> Result<()> {
    glimmer_core::init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    if let Command::Config = cli.command {
        if !print_config(&config, cli.json)? {
            std::process::exit(2);
        }
        return Ok(());
    }

    for warning in config.validate().warnings {
        tracing::warn!("Config warning: {}", warning);
    }

    let env: Arc<dyn Environment> = Arc::new(SystemEnvironment);
    let cache: Arc<dyn CacheStore> = Arc::new(FileCache::open(&config.cache_path));
    let http: Arc<dyn HttpClient> =
        Arc::new(ReqwestHttpClient::new().context("Failed to build HTTP client")?);

    let segment: Box<dyn Segment> = match cli.command {
        Command::Gitlab => Box::new(GitLabSegment::new(
            config.gitlab,
            env,
            Arc::new(GitReader),
            cache,
            http,
        )),
        Command::Weather => Box::new(WeatherSegment::new(config.weather, env, cache, http)),
        Command::Config => return Ok(()),
    };

    tracing::debug!("Rendering {} with template {:?}", segment.id(), segment.template());
    let rendered = segment.render().await;
    print_rendered(&rendered, cli.json, cli.verbose)
}
