use anyhow::Context;
use autofill_common::protocol::{Notification, ScanResponse};
use autofill_common::{FillRequest, SiteId, preview_fill};
use autofill_engine::cli::{serve_lines, to_line};
use autofill_engine::config::{AutofillConfig, ClassifierStrategy, ConfigLoader, SortPolicy};
use autofill_engine::dom::Document;
use autofill_engine::{FillTarget, Filler, ScanSession, Scanner};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::path::{Path, PathBuf};
use tokio::io::BufReader;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "autofill", version, about = "Detect and fill job-application form fields")]
struct Args {
    /// Config file (defaults to ./autofill.yaml, then ~/.autofill/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify the form fields of an HTML page
    Scan {
        html: PathBuf,
        /// Page URL, used to pick site-specific selectors
        #[arg(long)]
        url: Option<String>,
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,
        #[arg(long, value_enum)]
        sort: Option<SortArg>,
    },
    /// Scan a page and fill it from a profile
    Fill {
        html: PathBuf,
        /// Profile values keyed by field type (YAML or JSON)
        #[arg(long)]
        profile: PathBuf,
        #[arg(long)]
        url: Option<String>,
        /// Write the filled page here
        #[arg(long)]
        output: Option<PathBuf>,
        /// Show what would be filled without touching the page
        #[arg(long)]
        dry_run: bool,
    },
    /// Identify the site a URL belongs to
    Site { url: String },
    /// Answer JSON requests on stdin, one per line
    Serve {
        html: PathBuf,
        #[arg(long)]
        url: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Catalog,
    Context,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    ConfidenceFirst,
    VisibilityFirst,
}

async fn load_config(path: Option<&Path>) -> anyhow::Result<AutofillConfig> {
    let config = match path {
        Some(path) => ConfigLoader::load_from(path)
            .await
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ConfigLoader::load_default().await?,
    };
    Ok(config)
}

async fn load_page(path: &Path) -> anyhow::Result<Document> {
    let html = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading page {}", path.display()))?;
    Ok(Document::parse(&html))
}

async fn load_profile(path: &Path) -> anyhow::Result<FillRequest> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading profile {}", path.display()))?;
    let is_json = path.extension().is_some_and(|ext| ext == "json");
    let request = if is_json {
        serde_json::from_str(&text)?
    } else {
        serde_yaml::from_str(&text)?
    };
    Ok(request)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries JSON; logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut config = load_config(args.config.as_deref()).await?;
    debug!("Scanner settings: {:?}", config.scanner);

    match args.command {
        Command::Scan {
            html,
            url,
            strategy,
            sort,
        } => {
            if let Some(strategy) = strategy {
                config.scanner.strategy = match strategy {
                    StrategyArg::Catalog => ClassifierStrategy::Catalog,
                    StrategyArg::Context => ClassifierStrategy::Context,
                };
            }
            if let Some(sort) = sort {
                config.scanner.sort_policy = match sort {
                    SortArg::ConfidenceFirst => SortPolicy::ConfidenceFirst,
                    SortArg::VisibilityFirst => SortPolicy::VisibilityFirst,
                };
            }
            let doc = load_page(&html).await?;
            let site = SiteId::identify(url.as_deref().unwrap_or_default());
            let fields = Scanner::from_config(&config)
                .scan(&doc, site)
                .into_iter()
                .map(|d| d.field)
                .collect();
            print_json(&ScanResponse { fields })?;
        }
        Command::Fill {
            html,
            profile,
            url,
            output,
            dry_run,
        } => {
            let mut doc = load_page(&html).await?;
            let request = load_profile(&profile).await?;
            let site = SiteId::identify(url.as_deref().unwrap_or_default());
            let detected = Scanner::from_config(&config).scan(&doc, site);

            if dry_run {
                let fields: Vec<_> = detected.into_iter().map(|d| d.field).collect();
                print_json(&preview_fill(&fields, &request))?;
                return Ok(());
            }

            let targets: Vec<FillTarget> = detected.into_iter().map(FillTarget::from).collect();
            let result = Filler::new(config.filler.clone())
                .fill(&mut doc, &targets, &request)
                .await;
            print_json(&result)?;

            if let Some(output) = output {
                tokio::fs::write(&output, doc.to_html())
                    .await
                    .with_context(|| format!("writing {}", output.display()))?;
            }
        }
        Command::Site { url } => {
            let site = SiteId::identify(&url);
            print_json(&json!({ "site": site, "jobBoard": site.is_job_board() }))?;
        }
        Command::Serve { html, url } => {
            let doc = load_page(&html).await?;
            let notifier = |notification: Notification| {
                if let Some(line) = to_line(&notification) {
                    println!("{}", line);
                }
            };
            let mut session = ScanSession::new(doc, url.unwrap_or_default(), &config, notifier);
            let stdin = BufReader::new(tokio::io::stdin());
            serve_lines(&mut session, stdin, |line| println!("{}", line)).await;
        }
    }

    Ok(())
}
