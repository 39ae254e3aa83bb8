use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::aggregate::DriverAggregate;
use crate::refresh::{ControlState, ValueRange};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – selection widgets
// ---------------------------------------------------------------------------

/// Render the left control panel. Edits a copy of the selections and hands
/// it back to the state, which redraws when anything changed.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Fuel consumption");
    ui.separator();

    let Some(ctx) = state.context.clone() else {
        ui.label("No data loaded.");
        return;
    };
    let options = &ctx.options;
    let mut controls: ControlState = state.controls.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Gasoline");
            choice(ui, "driver", "Driver", &mut controls.driver, &options.drivers);
            range_slider(
                ui,
                "Km/liter",
                &mut controls.km_range,
                options.range_min,
                options.range_max,
                options.range_step,
            );
            choice(ui, "plate", "Plate", &mut controls.plate, &options.plates);
            ui.label(
                RichText::new("The km/liter range applies to both gasoline charts.")
                    .small()
                    .weak(),
            );
            ui.separator();

            ui.strong("Diesel");
            choice(
                ui,
                "diesel_driver",
                "Driver",
                &mut controls.diesel_driver,
                &options.diesel_drivers,
            );
            range_slider(
                ui,
                "Liters/hour",
                &mut controls.lph_range,
                options.range_min,
                options.range_max,
                options.range_step,
            );
            ui.separator();

            if let Some(dashboard) = &state.dashboard {
                for panel in &dashboard.boxplots.panels {
                    egui::CollapsingHeader::new(RichText::new(&panel.title).strong())
                        .id_salt(&panel.title)
                        .default_open(false)
                        .show(ui, |ui: &mut Ui| {
                            means_table(ui, &panel.axis_title, &panel.points);
                        });
                }
            }
        });

    state.apply_controls(controls);
}

fn choice(ui: &mut Ui, id: &str, label: &str, selected: &mut Option<String>, options: &[String]) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(label);
        egui::ComboBox::from_id_salt(id)
            .selected_text(selected.as_deref().unwrap_or("–"))
            .show_ui(ui, |ui: &mut Ui| {
                for opt in options {
                    ui.selectable_value(selected, Some(opt.clone()), opt.as_str());
                }
            });
    });
}

fn range_slider(ui: &mut Ui, label: &str, range: &mut ValueRange, min: f64, max: f64, step: f64) {
    let (mut lo, mut hi) = (range.lo(), range.hi());
    ui.label(label);
    let lo_changed = ui
        .add(egui::Slider::new(&mut lo, min..=max).step_by(step).text("min"))
        .changed();
    let hi_changed = ui
        .add(egui::Slider::new(&mut hi, min..=max).step_by(step).text("max"))
        .changed();
    if lo_changed || hi_changed {
        // Dragging one handle past the other swaps them.
        *range = ValueRange::new(lo, hi);
    }
}

fn means_table(ui: &mut Ui, metric: &str, points: &[DriverAggregate]) {
    ui.push_id(metric, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::remainder())
            .column(Column::auto())
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Driver");
                });
                header.col(|ui| {
                    ui.strong(metric);
                });
            })
            .body(|mut body| {
                for point in points {
                    body.row(18.0, |mut row| {
                        row.col(|ui| {
                            ui.label(point.driver.as_str());
                        });
                        row.col(|ui| {
                            ui.label(point.mean.map(|m| format!("{m:.2}")).unwrap_or_default());
                        });
                    });
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ctx) = &state.context {
            ui.label(format!(
                "{}: {} rows, {} after cleaning",
                ctx.source,
                ctx.raw_rows,
                ctx.cleaned.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open fueling data")
        .add_filter(
            "Supported files",
            &["xlsx", "xlsm", "xlsb", "xls", "ods", "csv", "json", "parquet", "pq"],
        )
        .add_filter("Spreadsheets", &["xlsx", "xlsm", "xlsb", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}
