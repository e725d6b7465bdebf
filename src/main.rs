use anyhow::{Context, Result};
use roster_select::config::{Config, DEFAULT_CONFIG_PATH};
use roster_select::tui::{self, state::AppState};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "roster-select.log";

struct Args {
    config_path: PathBuf,
    print_selection: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        print_selection: false,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().context("--config needs a path")?;
                args.config_path = PathBuf::from(path);
            }
            "--print-selection" => args.print_selection = true,
            other => anyhow::bail!("unknown argument: {}", other),
        }
    }
    Ok(args)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args()?;
    let config = Config::load_or_default(&args.config_path)?;

    let log_file = std::fs::File::create(LOG_FILE)
        .with_context(|| format!("Failed to create log file: {}", LOG_FILE))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false)
        .init();

    let model = config.build_model()?;
    tracing::info!(
        sections = ?model.sections(),
        preselected = model.selected_count(),
        "roster loaded"
    );

    let mut state = AppState::new(model, config.reorder.clone())?;
    let source = if args.config_path.exists() {
        args.config_path.display().to_string()
    } else {
        "built-in roster".to_string()
    };
    state.push_log("INFO", format!("loaded {}", source));

    tui::run_tui(&mut state).await?;

    if args.print_selection {
        let json = serde_json::to_string_pretty(&state.model.selected())?;
        println!("{}", json);
    }

    tracing::debug!("shutting down");
    Ok(())
}
