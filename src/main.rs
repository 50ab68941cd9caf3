use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod controller;
mod domain;
mod engine;
mod inputter;
mod model;
mod source;
mod ui;

use controller::Controller;
use domain::{ColumnSpec, JtvError, ViewConfig};
use model::{Model, Status};
use source::DataSource;

/// A tui based paginated table viewer for JSON record endpoints.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Endpoint returning a JSON array of flat records
    url: String,

    /// Rows per page
    #[arg(long, default_value_t = 5, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    page_size: usize,

    /// Column as HEADER:ACCESSOR, repeatable; derived from the first
    /// record's keys when omitted
    #[arg(short = 'c', long = "column", value_name = "HEADER:ACCESSOR")]
    columns: Vec<String>,

    /// Write logs to this file, filtered by RUST_LOG
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Key event poll interval in milliseconds
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,
}

fn main() -> ExitCode {
    let result = run();
    ratatui::restore();
    match result {
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

// A tui owns the terminal, so logs only go to a file sink when one is given.
fn init_tracing(path: Option<&Path>) -> Result<(), JtvError> {
    let Some(path) = path else { return Ok(()) };
    let file = std::fs::File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run() -> Result<(), JtvError> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;
    info!("Starting jtv against {}", cli.url);

    let columns = cli
        .columns
        .iter()
        .map(|s| s.parse::<ColumnSpec>())
        .collect::<Result<Vec<_>, _>>()?;

    let config = ViewConfig::default()
        .endpoint(cli.url)
        .columns(columns)
        .page_size(cli.page_size)
        .event_poll_time(cli.poll_ms)
        .request_timeout(cli.timeout);

    let mut model = Model::init(&config);
    // One fetch per run, fired at startup and settled over the channel.
    let loader = DataSource::new(&config)?.spawn_fetch();
    let controller = Controller::new(&config);

    let mut terminal = ratatui::init();
    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui::draw(model.get_uidata(), f))?;

        if let Ok(message) = loader.try_recv() {
            model.update(message)?;
        }

        // Handle events and map to a Message
        if let Some(message) = controller.handle_event(&model)? {
            model.update(message)?;
        }
    }
    Ok(())
}
