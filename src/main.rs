//! bumpwright - CLI entry point.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bumpwright::bump::{run_bump, BumpConfig, DEFAULT_TOKEN_BUDGET};
use bumpwright::classify::ClassifyRules;
use bumpwright::llm::{resolve_api_key, HttpTextModel, DEFAULT_API_URL, DEFAULT_MODEL};
use bumpwright::manifest::BumpKind;

/// Classify a change set and bump the matching version manifests.
#[derive(Parser, Debug)]
#[command(name = "bumpwright")]
#[command(about = "Classify a change set and bump the matching version manifests")]
#[command(version)]
struct Cli {
    /// Workspace root (defaults to the current directory)
    #[arg(short = 'C', long, default_value = ".")]
    root: PathBuf,

    /// Skip the model and force this bump kind (major, minor, patch)
    #[arg(long)]
    bump: Option<BumpKind>,

    /// Classify the last N commits instead of the working tree
    #[arg(long, value_name = "N")]
    range: Option<usize>,

    /// Stage and commit the rewritten manifests
    #[arg(long)]
    commit: bool,

    /// Commit message (implies --commit; skips the generated summary)
    #[arg(short = 'm', long = "message", value_name = "MSG")]
    commit_message: Option<String>,

    /// Show what would change without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    yes: bool,

    /// Infrastructure directory, relative to the workspace root
    #[arg(long, default_value = "helm")]
    infra_root: String,

    /// OpenAI-compatible API base URL
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Model name to request
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Approximate token budget for the classification prompt
    #[arg(long, default_value_t = DEFAULT_TOKEN_BUDGET)]
    token_budget: usize,

    /// Verbose logging (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let rules = ClassifyRules::with_infra_root(&cli.infra_root);

    let config = BumpConfig {
        override_bump: cli.bump,
        range: cli.range,
        commit: cli.commit || cli.commit_message.is_some(),
        commit_message: cli.commit_message,
        dry_run: cli.dry_run,
        assume_yes: cli.yes,
        token_budget: cli.token_budget,
    };

    // A missing key must fail before any mutation, so resolve it up front
    // whenever this run could reach the model (classification without
    // --bump, or a generated commit summary without -m).
    let api_key = if config.wants_model() {
        resolve_api_key().context(
            "An API key is required for classification and generated commit \
             messages. Set BUMPWRIGHT_API_KEY or OPENAI_API_KEY, or pass \
             --bump together with -m.",
        )?
    } else {
        String::new()
    };
    let model = HttpTextModel::new(&cli.api_url, &cli.model, api_key);

    let outcome = run_bump(&cli.root, &rules, &model, &config)
        .await
        .context("Bump failed")?;

    if !outcome.is_noop() && !outcome.dry_run {
        if let Some(reasoning) = &outcome.reasoning {
            println!("  Reasoning: {reasoning}");
        }
        println!("✓ Bump complete");
    }

    Ok(())
}

fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
