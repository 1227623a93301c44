use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use ratatui::crossterm::{execute, terminal::SetTitle};
use tracing::{error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, prelude::*};

use expense_tracker::controller::Controller;
use expense_tracker::domain::{TrackerConfig, TrackerError};
use expense_tracker::model::{Model, Status};
use expense_tracker::ui::TrackerUI;

const WINDOW_TITLE: &str = "Expense Invoice Tracker";

/// Enter payments and invoice lines, export them as csv and pdf reports.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Directory the reports are written to
    #[arg(short, long, default_value = ".")]
    output_dir: String,

    /// Width of each table column in cells
    #[arg(long, default_value_t = 16)]
    column_width: u16,

    /// Event poll timeout in milliseconds
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "expense_tracker=trace"
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let result = run();
    ratatui::restore();
    match result {
        Err(e) => {
            error!("Exiting with error: {e:?}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn init_logging(path: &Path, level: &str) -> Result<(), TrackerError> {
    let file = File::create(path)?;
    let filter = EnvFilter::try_new(level).map_err(|e| TrackerError::LoggingSetup(e.to_string()))?;
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| TrackerError::LoggingSetup(e.to_string()))
}

fn run() -> Result<(), TrackerError> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path, &args.log_level)?;
    }

    let output_dir =
        shellexpand::full(&args.output_dir).map_err(|e| TrackerError::Config(e.to_string()))?;
    let cfg = TrackerConfig::default()
        .with_output_dir(output_dir.into_owned())
        .with_column_width(args.column_width)
        .with_event_poll_time(args.poll_ms);
    info!("Starting with {:?}", cfg);

    let mut terminal = ratatui::init();
    execute!(std::io::stdout(), SetTitle(WINDOW_TITLE))?;
    let size = terminal.size()?;

    let mut model = Model::init(&cfg, size.height as usize);
    let mut ui = TrackerUI::new(&cfg);
    let controller = Controller::new(&cfg);

    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(&model, f))?;

        // Handle events and map to a Message
        if let Some(message) = controller.handle_event(&model)? {
            model.update(message)?;
        };
    }
    info!(
        "Closing with {} payments and {} invoice lines",
        model.tables().payments.len(),
        model.tables().invoices.len()
    );

    Ok(())
}
