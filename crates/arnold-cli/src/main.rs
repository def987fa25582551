//! arnold - terminal chat client for a streaming agent endpoint

mod config;
mod ui;

use std::path::PathBuf;

use anyhow::Context;
use arnold_chat::{Controller, DEFAULT_GREETING};
use arnold_client::HttpAgent;
use arnold_tui::Theme;
use clap::Parser;

use crate::config::Config;

/// arnold - chat with a streaming agent endpoint
#[derive(Parser, Debug)]
#[command(name = "arnold")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Agent endpoint URL
    #[arg(short, long)]
    url: Option<String>,

    /// Extra request header, as name=value (repeatable)
    #[arg(short = 'H', long = "header", value_name = "NAME=VALUE")]
    headers: Vec<String>,

    /// Path to the config file (overrides ARNOLD_CONFIG_PATH)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Greeting shown as the first assistant message
    #[arg(short, long)]
    greeting: Option<String>,

    /// Use the light theme
    #[arg(long)]
    light: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

fn parse_header(raw: &str) -> anyhow::Result<(&str, &str)> {
    raw.split_once('=')
        .map(|(name, value)| (name.trim(), value.trim()))
        .with_context(|| format!("invalid header '{}', expected name=value", raw))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup tracing
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("arnold=debug")
            .with_writer(std::io::stderr)
            .init();
    }

    // Initialize config and exit
    if args.init_config {
        let path = Config::init(args.config.as_deref()).context("failed to create config file")?;
        println!("Config file: {}", path.display());
        println!("\n{}", config::example_config());
        return Ok(());
    }

    let file_config = Config::load(args.config.as_deref());

    let url = args
        .url
        .or(file_config.url)
        .unwrap_or_else(|| config::DEFAULT_URL.to_string());

    let mut agent = HttpAgent::new(&url);
    for (name, value) in &file_config.headers {
        agent = agent
            .with_header(name, value)
            .with_context(|| format!("invalid header '{}' in config", name))?;
    }
    for raw in &args.headers {
        let (name, value) = parse_header(raw)?;
        agent = agent
            .with_header(name, value)
            .with_context(|| format!("invalid header '{}'", raw))?;
    }

    let greeting = args
        .greeting
        .or(file_config.greeting)
        .unwrap_or_else(|| DEFAULT_GREETING.to_string());
    let mut controller = Controller::new(greeting);

    let theme = if args.light || file_config.light.unwrap_or(false) {
        Theme::light()
    } else {
        Theme::dark()
    };

    tracing::info!(url = %url, "starting arnold");

    ui::run_tui(&mut controller, &mut agent, theme).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_value_header() {
        let (name, value) = parse_header("authorization=Bearer abc").unwrap();
        assert_eq!(name, "authorization");
        assert_eq!(value, "Bearer abc");
    }

    #[test]
    fn rejects_header_without_separator() {
        assert!(parse_header("authorization").is_err());
    }

    #[test]
    fn header_value_may_contain_equals() {
        let (name, value) = parse_header("x-token=a=b").unwrap();
        assert_eq!(name, "x-token");
        assert_eq!(value, "a=b");
    }

    #[test]
    fn config_flag_parses_as_path() {
        let args = Args::parse_from(["arnold", "--config", "/tmp/custom.toml"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/custom.toml")));
    }
}
