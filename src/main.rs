use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use eframe::egui;
use log::error;

use fuel_dashboard::app::FuelDashboardApp;
use fuel_dashboard::config::{DEFAULT_SHEET, DEFAULT_WORKBOOK};
use fuel_dashboard::state::AppState;
use fuel_dashboard::{Config, DashboardContext, web};

#[derive(Debug, Parser)]
#[command(version, about = "Fuel-consumption dashboard")]
struct Cli {
    /// Spreadsheet (or CSV / JSON / Parquet export) with the fueling records.
    #[arg(long, default_value = DEFAULT_WORKBOOK)]
    workbook: PathBuf,

    /// Sheet holding the records.
    #[arg(long, default_value = DEFAULT_SHEET)]
    sheet: String,

    /// Log at debug level unless RUST_LOG is set.
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Desktop window (default).
    Desktop,
    /// HTTP server with a browser dashboard.
    Serve {
        /// Address to listen on; repeat to listen on several.
        #[arg(long = "bind")]
        bind: Vec<SocketAddr>,
    },
}

impl Cli {
    fn config(&self) -> Config {
        let mut config = Config {
            workbook: self.workbook.clone(),
            sheet: self.sheet.clone(),
            debug: self.debug,
            ..Config::default()
        };
        if let Some(Mode::Serve { bind }) = &self.mode {
            if !bind.is_empty() {
                config.bind = bind.clone();
            }
        }
        config
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config();

    let default_level = if config.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    // Loading is a one-shot startup step; nothing to show without data.
    let ctx = match DashboardContext::load(&config) {
        Ok(ctx) => Arc::new(ctx),
        Err(e) => {
            error!("Failed to load {}: {e}", config.workbook.display());
            return Err(e).context("loading fueling data");
        }
    };

    match cli.mode {
        Some(Mode::Serve { .. }) => run_server(ctx, &config),
        Some(Mode::Desktop) | None => run_desktop(ctx, config),
    }
}

fn run_server(ctx: Arc<DashboardContext>, config: &Config) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting tokio runtime")?;
    runtime.block_on(web::serve(ctx, &config.bind))
}

fn run_desktop(ctx: Arc<DashboardContext>, config: Config) -> Result<()> {
    let mut state = AppState::new(config);
    state.set_context(ctx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Fuel consumption",
        options,
        Box::new(|_cc| Ok(Box::new(FuelDashboardApp::new(state)))),
    )
    .map_err(|e| anyhow!("desktop window failed: {e}"))
}
