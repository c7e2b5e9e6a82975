//! Virtual host dispatch CLI.
//!
//! Loads a site table, builds the matcher and resolves request keys
//! (`host[:port][/path]`) against it.
//!
//! ```text
//!   vhosts.toml ──▶ loader ──▶ validation ──▶ compile ──▶ SharedVhosts
//!        ▲                                                   │
//!        │ (watch)                                           ▼
//!   ConfigWatcher ──▶ reloader ──▶ atomic swap        stdin keys ──▶ lookup ──▶ stdout
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};

use vhost_dispatch::config::{build_matcher, load_config, ConfigWatcher, SiteAddress};
use vhost_dispatch::lifecycle::{spawn_reloader, Shutdown};
use vhost_dispatch::observability::init_logging;
use vhost_dispatch::routing::{request_key, split_host_path, SharedVhosts, VhostTrie};
use vhost_dispatch::{SiteConfig, VhostsConfig};

#[derive(Parser)]
#[command(name = "vhost-dispatch")]
#[command(about = "Resolve request keys to virtual host sites", long_about = None)]
struct Cli {
    /// Site table to load.
    #[arg(short, long, default_value = "vhosts.toml")]
    config: PathBuf,

    /// Overrides the configured log level.
    #[arg(long)]
    log_level: Option<String>,

    /// Print results as JSON lines.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and list the normalized keys and hosts
    Check,
    /// Resolve keys given as arguments (or one per stdin line, either
    /// `host/path` or `host path`)
    Match { keys: Vec<String> },
    /// Resolve stdin lines, reloading the configuration when it changes
    Watch,
}

#[derive(Serialize)]
struct MatchOutput<'a> {
    key: &'a str,
    site: Option<&'a str>,
    path: Option<&'a str>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)?;
    if let Some(level) = &cli.log_level {
        config.observability.log_level = level.clone();
    }
    init_logging(&config.observability)?;

    tracing::info!(
        path = ?cli.config,
        sites = config.sites.len(),
        "configuration loaded"
    );

    let vhosts = Arc::new(SharedVhosts::new(build_matcher(&config)));

    match cli.command {
        Commands::Check => {
            let mut out = std::io::stdout().lock();
            print_check(&mut out, &config, &vhosts.load())?;
        }
        Commands::Match { keys } if !keys.is_empty() => {
            let mut out = std::io::stdout().lock();
            for key in &keys {
                print_match(&mut out, &vhosts, key, cli.json)?;
            }
        }
        Commands::Match { .. } => {
            resolve_stdin(&vhosts, cli.json, None).await?;
        }
        Commands::Watch => {
            let shutdown = Shutdown::new();
            let (watcher, updates) = ConfigWatcher::new(&cli.config);
            // Dropping the watcher stops file notifications.
            let _watcher = watcher.run()?;
            let reloader = spawn_reloader(vhosts.clone(), updates, shutdown.subscribe());

            let ctrl_c = shutdown.clone();
            tokio::spawn(async move {
                if let Err(e) = ctrl_c.trigger_on_ctrl_c().await {
                    tracing::error!(error = %e, "failed to install Ctrl+C handler");
                }
            });

            resolve_stdin(&vhosts, cli.json, Some(&shutdown)).await?;
            shutdown.trigger();
            reloader.await?;
        }
    }

    tracing::info!("done");
    Ok(())
}

/// Resolves one key per stdin line until EOF or shutdown.
async fn resolve_stdin(
    vhosts: &SharedVhosts<Arc<SiteConfig>>,
    json: bool,
    shutdown: Option<&Shutdown>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stop = shutdown.map(Shutdown::subscribe);

    loop {
        let line = match stop.as_mut() {
            Some(stop) => tokio::select! {
                line = lines.next_line() => line?,
                _ = stop.recv() => break,
            },
            None => lines.next_line().await?,
        };
        let Some(line) = line else {
            break;
        };
        let Some(key) = line_key(&line) else {
            continue;
        };
        let mut out = std::io::stdout().lock();
        print_match(&mut out, vhosts, &key, json)?;
        out.flush()?;
    }
    Ok(())
}

/// Turns a stdin line into a matcher key.
///
/// A line is either a key already or a `Host` header value followed by the
/// request path.
fn line_key(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match line.split_once(char::is_whitespace) {
        Some((host, path)) => Some(request_key(host, path.trim())),
        None => Some(line.to_string()),
    }
}

/// Lists every key as the matcher stores it, then the registered hosts.
fn print_check(
    out: &mut impl Write,
    config: &VhostsConfig,
    matcher: &VhostTrie<Arc<SiteConfig>>,
) -> Result<(), Box<dyn std::error::Error>> {
    for site in &config.sites {
        for address in &site.addresses {
            for key in address.parse::<SiteAddress>()?.matcher_keys() {
                let (host, path) = split_host_path(&key);
                writeln!(out, "{}{}\t{}", host, path, site.name)?;
            }
        }
    }

    let mut hosts: Vec<&str> = matcher.hosts().collect();
    hosts.sort_unstable();
    writeln!(out, "hosts\t{}", hosts.join(" "))?;
    Ok(())
}

fn print_match(
    out: &mut impl Write,
    vhosts: &SharedVhosts<Arc<SiteConfig>>,
    key: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let matcher = vhosts.load();
    let matched = matcher.lookup(key);
    let output = MatchOutput {
        key,
        site: matched.as_ref().map(|m| m.site.name.as_str()),
        path: matched.as_ref().map(|m| m.path),
    };

    if json {
        writeln!(out, "{}", serde_json::to_string(&output)?)?;
    } else {
        match (output.site, output.path) {
            (Some(site), Some(path)) => writeln!(out, "{}\t{}\t{}", key, site, path)?,
            _ => writeln!(out, "{}\t-\t-", key)?,
        }
    }
    Ok(())
}
