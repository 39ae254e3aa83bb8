use chrono::DateTime;
use eframe::egui::{self, Color32, Stroke, Ui};
use egui_plot::{BoxElem, BoxPlot, BoxSpread, Legend, Plot, PlotPoints, Points};

use crate::charts::{BoxPanel, ScatterChart};
use crate::color::SeriesColor;
use crate::state::AppState;

const SCATTER_HEIGHT: f32 = 260.0;
const BOX_HEIGHT: f32 = 300.0;

fn to_color32(c: SeriesColor) -> Color32 {
    Color32::from_rgb(c.r, c.g, c.b)
}

/// Plot x values are seconds since the Unix epoch.
fn format_timestamp(secs: f64) -> String {
    DateTime::from_timestamp(secs as i64, 0)
        .map(|d| d.format("%d/%m/%y %H:%M").to_string())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Render the four charts in the central panel.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(dashboard) = &state.dashboard else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view fuel consumption  (File → Open…)");
        });
        return;
    };

    egui::ScrollArea::vertical().show(ui, |ui: &mut Ui| {
        ui.columns(dashboard.boxplots.panels.len(), |cols| {
            for (col, panel) in cols.iter_mut().zip(&dashboard.boxplots.panels) {
                box_plot(col, panel);
            }
        });
        ui.separator();
        scatter_plot(ui, "by_driver", &dashboard.by_driver);
        scatter_plot(ui, "by_plate", &dashboard.by_plate);
        scatter_plot(ui, "liters_per_hour", &dashboard.liters_per_hour);
    });
}

/// Markers only, one legend entry per plate.
fn scatter_plot(ui: &mut Ui, id: &str, chart: &ScatterChart) {
    ui.strong(chart.title.as_str());
    if chart.is_empty() {
        ui.label("No fuelings match the current selection.");
    }

    Plot::new(id)
        .height(SCATTER_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(chart.x_title.as_str())
        .y_axis_label(chart.y_title.as_str())
        .x_axis_formatter(|mark, _range| format_timestamp(mark.value))
        .label_formatter(|name, value| {
            format!("{name}\n{}\n{:.2}", format_timestamp(value.x), value.y)
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for series in &chart.series {
                let points: PlotPoints = series
                    .points
                    .iter()
                    .map(|p| [p.timestamp.and_utc().timestamp() as f64, p.value])
                    .collect();

                plot_ui.points(
                    Points::new(points)
                        .name(&series.name)
                        .color(to_color32(series.color))
                        .radius(3.0),
                );
            }
        });
}

/// One box over the per-driver means with every mean drawn on top.
fn box_plot(ui: &mut Ui, panel: &BoxPanel) {
    ui.strong(panel.title.as_str());
    let color = to_color32(panel.color);

    Plot::new(("box", panel.title.as_str()))
        .height(BOX_HEIGHT)
        .y_axis_label(panel.axis_title.as_str())
        .show_x(false)
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            if let Some(stats) = panel.stats {
                let elem = BoxElem::new(
                    0.0,
                    BoxSpread::new(
                        stats.lower_whisker,
                        stats.q1,
                        stats.median,
                        stats.q3,
                        stats.upper_whisker,
                    ),
                )
                .box_width(0.5)
                .whisker_width(0.3)
                .fill(color.gamma_multiply(0.3))
                .stroke(Stroke::new(1.5, color));
                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(&panel.axis_title));
            }

            // Spread the drivers sideways so overlapping means stay visible.
            let n = panel.points.len().max(1) as f64;
            let points: PlotPoints = panel
                .points
                .iter()
                .enumerate()
                .filter_map(|(i, p)| {
                    let offset = -0.45 - 0.15 * (i as f64 / n);
                    p.mean.map(|m| [offset, m])
                })
                .collect();
            plot_ui.points(Points::new(points).name("Drivers").color(color).radius(3.0));
        });
}
