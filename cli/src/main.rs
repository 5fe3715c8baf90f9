use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use roster_cli::commands;
use roster_cli::readline;
use roster_cli::state::AppState;
use tokio::sync::RwLock;
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Simulate a menu of value-list masks")]
struct Args {
    /// Menu file, defaults to the user config directory
    menu: Option<PathBuf>,
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    // If ROSTER_LOG_PATH is set, append to that file
    if let Ok(path) = std::env::var("ROSTER_LOG_PATH")
        && let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_ansi(false)
            .with_writer(file)
            .init();
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_logging();

    let args = Args::parse();
    let path = args
        .menu
        .or_else(roster_core::config::default_menu_path)
        .ok_or("no menu file given and no config directory found")?;
    let state = AppState::load(path).map_err(|e| e.to_string())?;
    let state = Arc::new(RwLock::new(state));

    loop {
        let line = readline()?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, Arc::clone(&state)).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                writeln!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(about = "roster commands")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Bring a player online
    Join { name: String },
    Leave { name: String },
    /// Toggle whether VIEWER can see TARGET
    Hide { viewer: String, target: String },
    /// Advance the primary lane
    Tick {
        #[arg(default_value_t = 1)]
        count: u32,
    },
    /// Show every mask as VIEWER sees it
    Render { viewer: String },
    Masks,
    Config,
    Exit,
}

async fn respond(line: &str, state: Arc<RwLock<AppState>>) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "roster".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match &cli.command {
        Some(Commands::Join { name }) => commands::join(name, Arc::clone(&state)).await,
        Some(Commands::Leave { name }) => commands::leave(name, Arc::clone(&state)).await,
        Some(Commands::Hide { viewer, target }) => {
            commands::hide(viewer, target, Arc::clone(&state)).await
        }
        Some(Commands::Tick { count }) => commands::tick(*count, Arc::clone(&state)).await,
        Some(Commands::Render { viewer }) => commands::render(viewer, Arc::clone(&state)).await,
        Some(Commands::Masks) => commands::list_masks(Arc::clone(&state)).await,
        Some(Commands::Config) => commands::show_settings(Arc::clone(&state)).await,
        Some(Commands::Exit) => {
            commands::exit(state).await;
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
