use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::refresh::{ControlState, Dashboard, DashboardContext, refresh};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// One dashboard session, independent of rendering.
///
/// The context is shared and read-only; the selections belong to this
/// session alone.
pub struct AppState {
    /// Loaded data (None until a file loads successfully).
    pub context: Option<Arc<DashboardContext>>,

    /// Current drop-down and slider values.
    pub controls: ControlState,

    /// Charts for `controls` (cached, rebuilt on every change).
    pub dashboard: Option<Dashboard>,

    /// Startup parameters, reused when another file is opened.
    pub config: Config,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            context: None,
            controls: ControlState::default(),
            dashboard: None,
            config,
            status_message: None,
        }
    }

    /// Ingest a newly loaded context, reset selections and redraw.
    pub fn set_context(&mut self, context: Arc<DashboardContext>) {
        self.controls = ControlState::initial(&context);
        self.context = Some(context);
        self.status_message = None;
        self.refresh();
    }

    /// Rebuild all four charts from the current selections.
    pub fn refresh(&mut self) {
        self.dashboard = self
            .context
            .as_ref()
            .map(|ctx| refresh(&self.controls, ctx));
    }

    /// Replace the selections; redraws only when something changed.
    pub fn apply_controls(&mut self, controls: ControlState) {
        if controls != self.controls {
            self.controls = controls;
            self.refresh();
        }
    }

    /// Load another file with the configured sheet and exclusions.
    /// On failure the current data stays and the error goes to the status bar.
    pub fn open(&mut self, path: &Path) {
        let config = Config {
            workbook: path.to_path_buf(),
            ..self.config.clone()
        };
        match DashboardContext::load(&config) {
            Ok(context) => {
                log::info!("Loaded {}", context.source);
                self.config = config;
                self.set_context(Arc::new(context));
            }
            Err(e) => {
                log::error!("Failed to load file: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}
