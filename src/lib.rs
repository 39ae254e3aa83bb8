//! Fuel-consumption dashboard for fleet fueling spreadsheets.
//!
//! Loads one sheet, drops excluded cards, splits fuelings by service and
//! draws four linked charts whose content follows the user's selections.

pub mod app;
pub mod charts;
pub mod color;
pub mod config;
pub mod data;
pub mod errors;
pub mod refresh;
pub mod state;
pub mod ui;
pub mod web;

pub use config::Config;
pub use errors::{ConfigurationError, DashboardError, LoadError};
pub use refresh::{ControlState, Dashboard, DashboardContext, ValueRange, refresh};
