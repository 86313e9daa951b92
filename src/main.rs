//! Unread-Scout main entry point
//!
//! Command-line front end for the scrape engine: logs in, lists unread
//! items and fetches item details.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;
use unread_scout::config::{load_config_with_hash, write_default_config, Config};
use unread_scout::output::ChannelSink;
use unread_scout::state::{DetailLookup, Item};
use unread_scout::{Scout, ScoutEvent};

/// Unread-Scout: lists the unread items of a catalog account
///
/// Requests and markers come from the configuration file; `init` writes a
/// default one.
#[derive(Parser, Debug)]
#[command(name = "unread-scout")]
#[command(version = "1.0.0")]
#[command(about = "Streaming scraper for a catalog's unread list", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true, default_value = "unread-scout.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the default configuration file unless one exists
    Init,

    /// Log in and list unread items
    Unread {
        #[command(flatten)]
        credentials: Credentials,

        /// File of item ids to skip, one per line
        #[arg(long, value_name = "FILE")]
        exclude: Option<PathBuf>,

        /// Write an HTML report of the listed items
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Fetch every item's detail into the report
        #[arg(long, requires = "output")]
        with_details: bool,
    },

    /// Log in and print the detail of one item
    Detail {
        #[command(flatten)]
        credentials: Credentials,

        /// Item id
        id: u64,
    },
}

#[derive(clap::Args, Debug)]
struct Credentials {
    /// Account login
    #[arg(long, env = "UNREAD_SCOUT_LOGIN")]
    login: String,

    /// Account password
    #[arg(long, env = "UNREAD_SCOUT_PASSWORD", hide_env_values = true)]
    password: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Init => handle_init(&cli.config),
        Command::Unread {
            credentials,
            exclude,
            output,
            with_details,
        } => {
            let config = load(&cli.config)?;
            let exclude = match exclude {
                Some(path) => read_exclude_file(&path)?,
                None => HashSet::new(),
            };
            handle_unread(config, &credentials, exclude, output.as_deref(), with_details).await
        }
        Command::Detail { credentials, id } => {
            let config = load(&cli.config)?;
            handle_detail(config, &credentials, id).await
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("unread_scout=info,warn"),
            1 => EnvFilter::new("unread_scout=debug,info"),
            2 => EnvFilter::new("unread_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load(path: &Path) -> anyhow::Result<Config> {
    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::debug!("Configuration loaded (hash: {})", hash);
    Ok(config)
}

fn handle_init(path: &Path) -> anyhow::Result<()> {
    if write_default_config(path)? {
        println!("✓ Default configuration written to {}", path.display());
    } else {
        println!("Configuration {} already exists, left unchanged", path.display());
    }
    Ok(())
}

/// Reads a newline separated id list; blank lines and `#` comments are skipped
fn read_exclude_file(path: &Path) -> anyhow::Result<HashSet<u64>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read exclude list {}", path.display()))?;

    let mut ids = HashSet::new();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let id = line.parse::<u64>().with_context(|| {
            format!("{}:{}: '{}' is not an item id", path.display(), number + 1, line)
        })?;
        ids.insert(id);
    }
    tracing::info!("Excluding {} items", ids.len());
    Ok(ids)
}

/// Prints discovered items, and detail texts when asked to
fn spawn_printer(mut events: UnboundedReceiver<ScoutEvent>, print_details: bool) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                ScoutEvent::ItemDiscovered { id, title } => println!("{}\t{}", id, title),
                ScoutEvent::DetailReady { text, .. } if print_details => println!("{}", text),
                _ => {}
            }
        }
    })
}

async fn handle_unread(
    config: Config,
    credentials: &Credentials,
    exclude: HashSet<u64>,
    output: Option<&Path>,
    with_details: bool,
) -> anyhow::Result<()> {
    let (tx, rx) = unbounded_channel();
    let printer = spawn_printer(rx, false);
    let mut scout = Scout::new(config, Arc::new(ChannelSink::new(tx)), Arc::new(exclude));

    scout
        .login(&credentials.login, &credentials.password)
        .await
        .context("Login failed")?;

    scout.start_pagination();
    if scout.drain().await.failed > 0 {
        bail!("Listing the unread items failed");
    }
    let mut items = scout.items();
    tracing::info!("{} unread items listed", items.len());

    if let Some(path) = output {
        if with_details {
            for item in &items {
                if scout.fetch_detail(item.id) == DetailLookup::Fetch {
                    scout.drain().await;
                }
            }
            items = scout.items();
        }
        let report = render_report(scout.config(), &items);
        std::fs::write(path, report)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        println!("✓ Report written to {}", path.display());
    }

    drop(scout);
    printer.await?;
    Ok(())
}

async fn handle_detail(config: Config, credentials: &Credentials, id: u64) -> anyhow::Result<()> {
    let (tx, rx) = unbounded_channel();
    let printer = spawn_printer(rx, true);
    let mut scout = Scout::new(
        config,
        Arc::new(ChannelSink::new(tx)),
        Arc::new(HashSet::<u64>::new()),
    );

    scout
        .login(&credentials.login, &credentials.password)
        .await
        .context("Login failed")?;

    scout.fetch_detail(id);
    let report = scout.drain().await;

    drop(scout);
    printer.await?;
    if report.failed > 0 {
        bail!("Fetching the detail of {} failed", id);
    }
    Ok(())
}

/// One HTML page listing every item, with its detail when loaded
fn render_report(config: &Config, items: &[Item]) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>Unread</title></head><body>\n",
    );

    for item in items {
        match item.detail.as_deref() {
            Some(detail) if !detail.is_empty() => {
                let _ = writeln!(html, "{}", detail);
            }
            _ => {
                let link = config
                    .site
                    .item_url
                    .fill(unread_scout::config::placeholders::ITEM_ID, item.id);
                let _ = writeln!(
                    html,
                    "<p><a href=\"{}\">{}</a></p>",
                    link,
                    escape_html(&item.title)
                );
            }
        }
        html.push_str(&config.render.comment_separator);
        html.push('\n');
    }

    html.push_str("</body></html>\n");
    html
}

/// Escapes text for use inside an HTML element
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
