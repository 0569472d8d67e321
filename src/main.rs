//! Commit Timeline - interactive timeline of a repository's commit history
//!
//! # Usage
//! ```bash
//! commit-timeline loc.csv                 # Start server
//! commit-timeline loc.csv --open          # Start and open browser
//! commit-timeline loc.csv --day-start 6   # Wrap the hour axis at 06:00
//! commit-timeline status                  # Check if running
//! commit-timeline kill                    # Stop running instance
//! ```

mod error;
mod models;
mod render;
mod routes;
mod timeline;

use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use axum::Router;
use clap::{Parser, Subcommand};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use timeline::config::{NarrativeConfig, RangeConfig};
use timeline::narrative::NarrativeOrder;
use timeline::scales::Rgb;
use timeline::{TimelineSession, TimelineState, ViewConfig};

/// Commit Timeline - scrub through a repository's history in your browser
#[derive(Parser)]
#[command(name = "commit-timeline")]
#[command(about = "Interactive commit timeline over per-line change records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// CSV of per-line change records (commit,file,line,type,depth,length,author,date,...)
    #[arg(value_name = "DATASET_CSV")]
    dataset: Option<PathBuf>,

    /// Open browser automatically after starting
    #[arg(short, long)]
    open: bool,

    /// Port to run the server on
    #[arg(short, long, default_value = "3002")]
    port: u16,

    /// Base URL commit links point at (`<url>/commit/<id>`)
    #[arg(long, default_value = "https://github.com/vis-society/lab-7")]
    repo_url: String,

    /// Hour placed at the bottom of the y axis; earlier hours wrap past midnight
    #[arg(long, default_value_t = 0.0, value_parser = parse_hour)]
    day_start: f64,

    /// Order of the scroll narrative
    #[arg(long, value_enum, default_value = "oldest-first")]
    narrative_order: NarrativeOrder,

    /// Height of each narrative checkpoint, in pixels
    #[arg(long, default_value_t = 120.0)]
    checkpoint_height: f64,

    /// Lower bound of the range control
    #[arg(long, default_value_t = 0.0)]
    slider_min: f64,

    /// Upper bound of the range control
    #[arg(long, default_value_t = 100.0)]
    slider_max: f64,

    /// Starting range control position (defaults to the full history)
    #[arg(long)]
    slider_value: Option<f64>,

    /// Disable the range control; the narrative is then the only cursor input
    #[arg(long)]
    no_slider: bool,

    /// Mark color at midnight
    #[arg(long, default_value = "#1d3557", value_parser = parse_color)]
    night_color: Rgb,

    /// Mark color at noon
    #[arg(long, default_value = "#f4a259", value_parser = parse_color)]
    day_color: Rgb,
}

#[derive(Subcommand)]
enum Commands {
    /// Check if commit-timeline is currently running
    Status,
    /// Stop the running commit-timeline instance
    Kill,
}

fn parse_color(raw: &str) -> Result<Rgb, String> {
    Rgb::parse(raw).ok_or_else(|| format!("expected #rrggbb, got '{}'", raw))
}

fn parse_hour(raw: &str) -> Result<f64, String> {
    let hour: f64 = raw.parse().map_err(|_| format!("not a number: '{}'", raw))?;
    if (0.0..24.0).contains(&hour) {
        Ok(hour)
    } else {
        Err(format!("hour must be in [0, 24), got {}", hour))
    }
}

impl Cli {
    fn view_config(&self) -> anyhow::Result<ViewConfig> {
        let finite = [self.slider_min, self.slider_max, self.checkpoint_height]
            .into_iter()
            .chain(self.slider_value)
            .all(f64::is_finite);
        if !finite {
            anyhow::bail!("slider bounds, slider value and checkpoint height must be finite");
        }
        if self.slider_min > self.slider_max {
            anyhow::bail!(
                "--slider-min ({}) is greater than --slider-max ({})",
                self.slider_min,
                self.slider_max
            );
        }

        let range = (!self.no_slider).then_some(RangeConfig {
            min: self.slider_min,
            max: self.slider_max,
            initial: self.slider_value,
        });

        Ok(ViewConfig {
            night_color: self.night_color,
            day_color: self.day_color,
            day_start_hour: self.day_start,
            repo_url: self.repo_url.clone(),
            range,
            narrative: NarrativeConfig {
                order: self.narrative_order,
                checkpoint_height: self.checkpoint_height,
                ..NarrativeConfig::default()
            },
            ..ViewConfig::default()
        })
    }
}

/// PID file info stored as JSON
#[derive(serde::Serialize, serde::Deserialize)]
struct PidInfo {
    pid: u32,
    dataset: String,
    port: u16,
}

fn get_pid_file_path() -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push("commit-timeline.pid");
    path
}

fn read_pid_info() -> Option<PidInfo> {
    let path = get_pid_file_path();
    let mut file = fs::File::open(&path).ok()?;
    let mut contents = String::new();
    file.read_to_string(&mut contents).ok()?;
    serde_json::from_str(&contents).ok()
}

fn write_pid_info(info: &PidInfo) -> anyhow::Result<()> {
    let path = get_pid_file_path();
    let mut file = fs::File::create(&path)?;
    file.write_all(serde_json::to_string(info)?.as_bytes())?;
    Ok(())
}

fn remove_pid_file() {
    let _ = fs::remove_file(get_pid_file_path());
}

#[cfg(unix)]
fn is_process_running(pid: u32) -> bool {
    // Signal 0 only checks that the process exists
    unsafe { libc::kill(pid as i32, 0) == 0 }
}

#[cfg(windows)]
fn is_process_running(pid: u32) -> bool {
    use std::process::Command;
    Command::new("tasklist")
        .args(["/FI", &format!("PID eq {}", pid), "/NH"])
        .output()
        .map(|output| String::from_utf8_lossy(&output.stdout).contains(&pid.to_string()))
        .unwrap_or(false)
}

#[cfg(unix)]
fn kill_process(pid: u32) -> bool {
    unsafe { libc::kill(pid as i32, libc::SIGTERM) == 0 }
}

#[cfg(windows)]
fn kill_process(pid: u32) -> bool {
    use std::process::Command;
    Command::new("taskkill")
        .args(["/PID", &pid.to_string(), "/F"])
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

fn handle_status() {
    match read_pid_info() {
        Some(info) if is_process_running(info.pid) => {
            println!("✓ commit-timeline is running");
            println!("  PID:     {}", info.pid);
            println!("  Dataset: {}", info.dataset);
            println!("  URL:     http://127.0.0.1:{}", info.port);
        }
        Some(_) => {
            println!("✗ commit-timeline is not running (stale PID file)");
            remove_pid_file();
        }
        None => println!("✗ commit-timeline is not running"),
    }
}

fn handle_kill() {
    match read_pid_info() {
        Some(info) if is_process_running(info.pid) => {
            if kill_process(info.pid) {
                println!("✓ Stopped commit-timeline (PID {})", info.pid);
                remove_pid_file();
            } else {
                println!("✗ Failed to stop commit-timeline (PID {})", info.pid);
            }
        }
        Some(_) => {
            println!("✗ commit-timeline is not running (stale PID file)");
            remove_pid_file();
        }
        None => println!("✗ commit-timeline is not running"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Status) => {
            handle_status();
            return Ok(());
        }
        Some(Commands::Kill) => {
            handle_kill();
            return Ok(());
        }
        None => {}
    }

    let Some(dataset) = cli.dataset.clone() else {
        eprintln!("Usage: commit-timeline <DATASET_CSV> [--open]");
        eprintln!("       commit-timeline status");
        eprintln!("       commit-timeline kill");
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  commit-timeline loc.csv              # Serve loc.csv");
        eprintln!("  commit-timeline loc.csv -o -p 8080   # Custom port, open browser");
        std::process::exit(1);
    };

    if let Some(info) = read_pid_info() {
        if is_process_running(info.pid) {
            eprintln!("✗ commit-timeline is already running (PID {})", info.pid);
            eprintln!("  Dataset: {}", info.dataset);
            eprintln!("  URL:     http://127.0.0.1:{}", info.port);
            eprintln!();
            eprintln!("Run 'commit-timeline kill' to stop it first.");
            std::process::exit(1);
        } else {
            remove_pid_file();
        }
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = cli.view_config()?;
    let dataset = fs::canonicalize(&dataset).unwrap_or(dataset);
    let dataset_display = dataset.to_string_lossy().to_string();

    // A failed load still starts the server with a placeholder view.
    let session = TimelineSession::open(dataset, config).await;
    let status_line = match session.state() {
        TimelineState::Loaded(controller) => format!(
            "{} commits, {} line records",
            controller.commits().len(),
            session.dataset_info().record_count
        ),
        TimelineState::Unavailable { reason } => format!("unavailable ({})", reason),
    };

    let shared = Arc::new(RwLock::new(session));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(routes::create_router(shared))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = format!("127.0.0.1:{}", cli.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("✗ Failed to bind to port {}: {}", cli.port, e);
            eprintln!("  Try a different port with --port <PORT>");
            std::process::exit(1);
        }
    };

    write_pid_info(&PidInfo {
        pid: std::process::id(),
        dataset: dataset_display.clone(),
        port: cli.port,
    })?;

    let url = format!("http://127.0.0.1:{}", cli.port);
    println!();
    println!("  ┌─────────────────────────────────────────────┐");
    println!("  │               Commit Timeline               │");
    println!("  └─────────────────────────────────────────────┘");
    println!();
    println!("  Dataset:    {}", dataset_display);
    println!("  Loaded:     {}", status_line);
    println!("  Server:     {}", url);
    println!();
    println!("  Commands:");
    println!("    commit-timeline status  - Check if running");
    println!("    commit-timeline kill    - Stop the server");
    println!();
    println!("  Press Ctrl+C to stop");
    println!();

    if cli.open {
        if let Err(e) = open::that(&url) {
            eprintln!("  Warning: Could not open browser: {}", e);
        }
    }

    let shutdown = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
        println!("\n  Shutting down...");
        remove_pid_file();
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_folds_into_view_config() {
        let cli = Cli::parse_from([
            "commit-timeline",
            "loc.csv",
            "--day-start",
            "6",
            "--narrative-order",
            "newest-first",
            "--slider-value",
            "25",
            "--night-color",
            "#000000",
        ]);
        let config = cli.view_config().unwrap();

        assert_eq!(config.day_start_hour, 6.0);
        assert_eq!(config.narrative.order, NarrativeOrder::NewestFirst);
        assert_eq!(config.range.unwrap().initial, Some(25.0));
        assert_eq!(config.night_color, Rgb(0, 0, 0));
        assert_eq!(config.day_color, Rgb(0xf4, 0xa2, 0x59));
        assert_eq!(config.width, 1000.0);
    }

    #[test]
    fn test_cli_rejects_bad_values() {
        assert!(Cli::try_parse_from(["commit-timeline", "x.csv", "--day-start", "24"]).is_err());
        assert!(Cli::try_parse_from(["commit-timeline", "x.csv", "--day-color", "orange"]).is_err());

        let inverted = Cli::parse_from([
            "commit-timeline",
            "x.csv",
            "--slider-min",
            "10",
            "--slider-max",
            "5",
        ]);
        assert!(inverted.view_config().is_err());

        let no_slider = Cli::parse_from(["commit-timeline", "x.csv", "--no-slider"]);
        assert!(no_slider.view_config().unwrap().range.is_none());
    }

    #[test]
    fn test_subcommands_parse() {
        let cli = Cli::parse_from(["commit-timeline", "status"]);
        assert!(matches!(cli.command, Some(Commands::Status)));
    }
}
