//! egui front-end: control panel and chart rendering.

pub mod panels;
pub mod plot;
