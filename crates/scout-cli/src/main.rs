use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use scout_core::aggregator::{Aggregation, ResultAggregator};
use scout_core::client::HttpSearchClient;
use scout_core::config::ScoutConfig;
use scout_core::facet::{ActiveFacet, Projection, Section};
use scout_core::session::{RenderFrame, SearchSession, View};
use scout_core::timeline::{Timeline, ViewMode};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "scout",
    about = "Scout: fuzzy search across tasks, projects and users",
    version
)]
struct Cli {
    /// Override api.base_url from config
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one search and print the ranked results
    Search {
        /// Search query
        query: String,
        /// Result facet to show (all, tasks, projects, users)
        #[arg(short, long, default_value = "all")]
        tab: ActiveFacet,
        /// Maximum fuzzy distance, 0.0 (exact) to 1.0 (anything)
        #[arg(long)]
        threshold: Option<f64>,
        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Read search-box values from stdin, one per line, and print each state change
    Interactive {
        /// Initial result facet
        #[arg(short, long, default_value = "all")]
        tab: ActiveFacet,
    },
    /// Show a project's tasks as timeline bars
    Timeline {
        /// Project id
        project_id: i64,
        /// Grid scale (day, week, month)
        #[arg(short, long, default_value = "month")]
        view: ViewMode,
        /// Output raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the resolved configuration
    Config {
        /// Output JSON instead of TOML
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("scout=warn,scout_core=warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    let mut config = ScoutConfig::load(Some(&std::env::current_dir()?)).unwrap_or_else(|e| {
        tracing::warn!("failed to load config, using defaults: {e}");
        ScoutConfig::default_config()
    });
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
        config.validate();
    }

    match cli.command {
        Command::Search {
            query,
            tab,
            threshold,
            json,
        } => cmd_search(&config, &query, tab, threshold, json).await,
        Command::Interactive { tab } => cmd_interactive(&config, tab).await,
        Command::Timeline {
            project_id,
            view,
            json,
        } => cmd_timeline(&config, project_id, view, json).await,
        Command::Config { json } => cmd_config(&config, json),
    }
}

// ---------------------------------------------------------------------------
// search
// ---------------------------------------------------------------------------

async fn cmd_search(
    config: &ScoutConfig,
    query: &str,
    tab: ActiveFacet,
    threshold: Option<f64>,
    json: bool,
) -> Result<()> {
    let mut search = config.search.clone();
    if let Some(t) = threshold {
        if !(0.0..=1.0).contains(&t) {
            anyhow::bail!("--threshold must be between 0.0 and 1.0, got {t}");
        }
        search.threshold = t;
    }

    let client = HttpSearchClient::new(&config.api).context("failed to create search client")?;
    let aggregator = ResultAggregator::new(client, &search);

    match aggregator.aggregate(query).await {
        Aggregation::Idle { .. } => {
            if json {
                println!("null");
            } else {
                println!(
                    "{}",
                    format!(
                        "Query too short: type at least {} characters.",
                        aggregator.min_query_len()
                    )
                    .dimmed()
                );
            }
            Ok(())
        }
        Aggregation::Ready(result) => {
            let projection = Projection::new(&result, tab);
            if json {
                println!("{}", serde_json::to_string_pretty(&projection)?);
            } else {
                print_projection(&projection);
            }
            Ok(())
        }
        Aggregation::Failed(failure) => Err(anyhow::anyhow!("{failure}")),
        Aggregation::Stale { query, .. } => {
            anyhow::bail!("search for '{query}' was superseded")
        }
    }
}

fn print_projection(projection: &Projection) {
    if projection.sections.is_empty() {
        println!("{}", "No results found.".dimmed());
        return;
    }

    for (i, section) in projection.sections.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!(
            "{} {}",
            section.kind().section_title().bold(),
            format!("({})", section.len()).dimmed()
        );
        if section.is_empty() {
            println!("  {}", "No matches.".dimmed());
            continue;
        }
        print_section(section);
    }
}

fn print_section(section: &Section) {
    match section {
        Section::Tasks(matches) => {
            for m in matches {
                let status = m
                    .item
                    .status
                    .map(|s| format!(" [{s}]"))
                    .unwrap_or_default();
                println!(
                    "  {} {:<6} {}{}",
                    format_distance(m.distance),
                    format!("#{}", m.item.id).cyan(),
                    m.item.title,
                    status.dimmed()
                );
            }
        }
        Section::Projects(matches) => {
            for m in matches {
                println!(
                    "  {} {:<6} {}",
                    format_distance(m.distance),
                    format!("#{}", m.item.id).cyan(),
                    m.item.name
                );
            }
        }
        Section::Users(matches) => {
            for m in matches {
                let email = m
                    .item
                    .email
                    .as_deref()
                    .map(|e| format!(" <{e}>"))
                    .unwrap_or_default();
                println!(
                    "  {} {:<6} {}{}",
                    format_distance(m.distance),
                    format!("#{}", m.item.user_id).cyan(),
                    m.item.username,
                    email.dimmed()
                );
            }
        }
    }
}

fn format_distance(distance: f64) -> String {
    let text = format!("{distance:.3}");
    if distance <= 0.05 {
        text.green().to_string()
    } else if distance <= 0.15 {
        text.yellow().to_string()
    } else {
        text.red().to_string()
    }
}

// ---------------------------------------------------------------------------
// interactive
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
enum Line {
    Input(String),
    Tab(Option<ActiveFacet>),
    Retry,
    Quit,
    Unknown(String),
}

fn parse_line(line: &str) -> Line {
    // "::foo" searches for ":foo"
    if let Some(rest) = line.strip_prefix("::") {
        return Line::Input(format!(":{rest}"));
    }
    let Some(command) = line.strip_prefix(':') else {
        return Line::Input(line.to_string());
    };

    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("tab"), None) => Line::Tab(None),
        (Some("tab"), Some(name)) => match name.parse() {
            Ok(facet) => Line::Tab(Some(facet)),
            Err(e) => Line::Unknown(e),
        },
        (Some("retry"), None) => Line::Retry,
        (Some("quit" | "q"), None) => Line::Quit,
        _ => Line::Unknown(format!("unknown command: {line}")),
    }
}

async fn cmd_interactive(config: &ScoutConfig, tab: ActiveFacet) -> Result<()> {
    let client = HttpSearchClient::new(&config.api).context("failed to create search client")?;
    let handle = SearchSession::spawn(client, &config.search);
    handle.set_facet(tab);

    let mut frames = handle.frames();
    let printer = tokio::spawn(async move {
        while frames.changed().await.is_ok() {
            let frame = frames.borrow_and_update().clone();
            print_frame(&frame);
        }
    });

    eprintln!(
        "{}",
        "Type to search. Commands: :tab [all|tasks|projects|users], :retry, :quit".dimmed()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut quit = false;
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Line::Input(text) => handle.input(text),
            Line::Tab(Some(facet)) => handle.set_facet(facet),
            Line::Tab(None) => handle.set_facet(handle.current().facet.next()),
            Line::Retry => handle.retry(),
            Line::Quit => {
                quit = true;
                break;
            }
            Line::Unknown(msg) => eprintln!("{}", msg.yellow()),
        }
    }

    if !quit {
        // stdin closed: let the last value settle and its fetch finish
        drain(&handle.frames(), config.search.debounce(), config.api.timeout()).await;
    }

    handle.shutdown().await;
    printer.await.context("frame printer failed")?;
    Ok(())
}

async fn drain(
    frames: &tokio::sync::watch::Receiver<RenderFrame>,
    quiet: Duration,
    timeout: Duration,
) {
    tokio::time::sleep(quiet + Duration::from_millis(50)).await;
    let mut frames = frames.clone();
    let finished = tokio::time::timeout(
        timeout,
        frames.wait_for(|f| !matches!(f.view, View::Loading { .. })),
    )
    .await;
    if finished.is_err() {
        tracing::warn!("gave up waiting for the last search to finish");
    }
}

fn print_frame(frame: &RenderFrame) {
    let tab = format!("tab: {}", frame.facet);
    match &frame.view {
        View::Idle => println!("{} {}", "[idle]".dimmed(), tab.dimmed()),
        View::Loading { query } => {
            println!("{} {} {}", "[loading]".yellow(), query, tab.dimmed())
        }
        View::Ready(projection) => {
            println!(
                "{} {} {}",
                "[ready]".green(),
                projection.query,
                format!("({} matches, {tab})", projection.total()).dimmed()
            );
            print_projection(projection);
        }
        View::Failed { query, reason } => {
            println!("{} {}: {}", "[failed]".red(), query, reason)
        }
    }
}

// ---------------------------------------------------------------------------
// timeline
// ---------------------------------------------------------------------------

async fn cmd_timeline(
    config: &ScoutConfig,
    project_id: i64,
    view: ViewMode,
    json: bool,
) -> Result<()> {
    let client = HttpSearchClient::new(&config.api).context("failed to create search client")?;
    let tasks = client
        .project_tasks(project_id)
        .await
        .with_context(|| format!("failed to load tasks for project {project_id}"))?;
    tracing::debug!(project_id, count = tasks.len(), "loaded project tasks");

    let timeline = Timeline::new(project_id, &tasks, view, chrono::Utc::now());
    if json {
        println!("{}", serde_json::to_string_pretty(&timeline)?);
    } else {
        print_timeline(&timeline);
    }
    Ok(())
}

fn print_timeline(timeline: &Timeline) {
    println!(
        "{} {}",
        format!("Project #{}", timeline.project_id).bold(),
        format!("({} view)", timeline.view_mode).dimmed()
    );
    for row in &timeline.rows {
        let span = format!(
            "{} to {}",
            row.start.format("%Y-%m-%d"),
            row.end.format("%Y-%m-%d")
        );
        if row.disabled {
            println!("  {:<32} {}", row.name.dimmed(), span.dimmed());
        } else {
            println!(
                "  {:<32} {} {}",
                row.name,
                span.cyan(),
                format!("{:>4.0}%", row.progress).dimmed()
            );
        }
    }
    println!("{}", format!("{} tasks in timeline", timeline.task_count()).dimmed());
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config(config: &ScoutConfig, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
    } else {
        print!("{}", config.to_toml()?);
    }
    Ok(())
}
