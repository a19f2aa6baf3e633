mod app;
mod config;
mod data;
mod detail;
mod error;
mod metrics;
mod parser;
mod ranking;
mod ui;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::data::DataLoader;
use crate::ranking::RankLimit;

#[derive(Parser, Debug)]
#[command(name = "stress_dashboard")]
#[command(about = "A TUI dashboard for customer financial stress analytics", long_about = None)]
struct Args {
    /// Directory holding the processed CSV summaries
    #[arg(long, env = "STRESS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Initial number of high-risk customers to list (5-50)
    #[arg(long, default_value_t = RankLimit::DEFAULT)]
    top_n: usize,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    config::init_logging(args.log_file.as_deref())?;

    // Load before touching the terminal: a load failure means no dashboard at all
    let loader = DataLoader::new(config::resolve_data_dir(args.data_dir));
    let data = loader.get().await?;

    // Initialize terminal
    let terminal = ratatui::init();

    let app = app::App::new(data, RankLimit::new(args.top_n));
    let result = app.run(terminal);

    // Restore terminal
    ratatui::restore();

    result
}
