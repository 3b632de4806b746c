// Entry point and interactive terminal flow.
//
// - Locates `dados/sensores_fase2.csv` next to the program and offers to
//   copy a local `.csv` there when it is missing.
// - Option [1] renders the dashboard from scratch: load, normalize, filter,
//   indicators, charts, status distribution and irrigation suggestions.
// - Options [2] and [3] change the period and the charted variables used
//   by the next render.
mod charts;
mod config;
mod dashboard;
mod error;
mod filter;
mod frame;
mod kpi;
mod loader;
mod output;
mod recommend;
mod schema;
mod types;
mod upload;
mod util;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use polars::prelude::DataFrame;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing_subscriber::EnvFilter;

use config::Config;
use dashboard::Selections;
use filter::{date_bounds, DateSelection};

// Choices survive between renders; the data itself is re-read every time.
static APP_STATE: Lazy<Mutex<Selections>> = Lazy::new(|| Mutex::new(Selections::default()));

fn app_state() -> MutexGuard<'static, Selections> {
    APP_STATE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Read a single trimmed line after printing `prompt`; `None` once stdin is closed.
fn read_input(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn read_line(prompt: &str) -> String {
    read_input(prompt).unwrap_or_default()
}

fn print_location(config: &Config) {
    println!("Looking in: {}", config.data_path.display());
    match config.data_dir_listing() {
        Ok(names) => println!("Contents of {}: {:?}\n", config::DATA_DIR_NAME, names),
        Err(e) => eprintln!("Could not list {}: {}\n", config.data_dir.display(), e),
    }
}

/// The expected file is missing: accept a local `.csv` path and copy it in.
///
/// The current run stops either way; the user renders again afterwards.
fn handle_missing_file(config: &Config) {
    let source = read_line(&format!(
        "Path of your {} to upload (blank to cancel): ",
        config::DATA_FILE_NAME
    ));
    if source.is_empty() {
        println!(
            "Error: file not found. Place {} in {} and try again.\n",
            config::DATA_FILE_NAME,
            config.data_dir.display()
        );
        return;
    }
    match upload::store_upload(Path::new(&source), &config.data_path) {
        Ok(bytes) => println!(
            "File saved to {} ({} bytes). Choose [1] to render the dashboard.\n",
            config.data_path.display(),
            util::format_int(bytes)
        ),
        Err(e) => eprintln!("Upload failed: {}\n", e),
    }
}

/// Handle option [1]: run the whole pipeline and print the dashboard.
fn handle_render(config: &Config) {
    print_location(config);
    if !config.data_path.exists() {
        handle_missing_file(config);
        return;
    }
    let selections = app_state().clone();
    match dashboard::run(&config.data_path, &selections, config.preview_rows) {
        Ok((view, report)) => {
            println!(
                "Processing dataset... ({} rows, {} columns, delimiter '{}')",
                util::format_int(report.rows),
                util::format_int(report.columns),
                report.delimiter
            );
            println!();
            println!("{}", output::format_dashboard(&view));
        }
        Err(e) => eprintln!("Failed to load file: {}\n", e),
    }
}

fn load_normalized(config: &Config) -> error::Result<DataFrame> {
    let (df, _) = loader::read_csv_flex(&config.data_path)?;
    schema::normalize(df)
}

/// Handle option [2]: choose the date period for later renders.
fn handle_period(config: &Config) {
    if let Ok(df) = load_normalized(config) {
        match date_bounds(&df) {
            Some((start, end)) => println!("Dates available: {} to {}", start, end),
            None => println!("No valid DATA_COLETA values; the period will not filter rows."),
        }
    }
    let input = read_line("Period as YYYY-MM-DD YYYY-MM-DD (blank = full range): ");
    if input.is_empty() {
        app_state().period = None;
        println!("Period reset to the full range.\n");
        return;
    }
    match DateSelection::parse(&input) {
        Some(selection) => {
            app_state().period = Some(selection);
            if let DateSelection::Single(_) = selection {
                println!("A single date does not filter; give a start and an end date.");
            }
            println!();
        }
        None => println!("Invalid period. Use dates like 2024-01-31.\n"),
    }
}

/// Handle option [3]: choose which measurements get a chart.
fn handle_variables(config: &Config) {
    let df = match load_normalized(config) {
        Ok(df) => df,
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
            return;
        }
    };
    let available = charts::available_variables(&df);
    if available.is_empty() {
        println!("No measurement columns found.\n");
        return;
    }
    for (i, name) in available.iter().enumerate() {
        println!("[{}] {}", i + 1, name);
    }
    let input = read_line("Variables by number, comma separated (blank = default): ");
    if input.is_empty() {
        app_state().variables = None;
        println!("Default variables restored.\n");
        return;
    }
    let mut chosen: Vec<String> = Vec::new();
    for part in input.split(',') {
        let picked = part
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| available.get(i));
        match picked {
            Some(name) if !chosen.iter().any(|c| c == name) => chosen.push(name.to_string()),
            Some(_) => {}
            None => println!("Ignoring unknown choice: {}", part.trim()),
        }
    }
    println!("Charting: {}\n", chosen.join(", "));
    app_state().variables = Some(chosen);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let config = Config::resolve().context("resolving the data directory")?;
    config
        .ensure_data_dir()
        .context("creating the data directory")?;
    config.log_config();

    loop {
        println!("FarmTech Solutions - Dashboard");
        println!("[1] Show dashboard");
        println!("[2] Set period");
        println!("[3] Choose chart variables");
        println!("[0] Exit\n");
        let Some(choice) = read_input("Enter choice: ") else {
            println!();
            break;
        };
        match choice.as_str() {
            "1" => handle_render(&config),
            "2" => handle_period(&config),
            "3" => handle_variables(&config),
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 0, 1, 2 or 3.\n"),
        }
    }
    Ok(())
}
