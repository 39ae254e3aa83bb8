//! Chart specifications: pure data, independent of the front-end drawing them.
//!
//! The desktop UI turns these into `egui_plot` items; the web front-end ships
//! them as JSON.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::color::{SeriesColor, generate_palette};
use crate::data::aggregate::{DriverAggregate, Metric};
use crate::data::clean::COL_TIMESTAMP;
use crate::data::model::FuelRecord;

// ---------------------------------------------------------------------------
// Scatter charts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

/// One marker-only series; the dashboard uses one per plate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    pub name: String,
    pub color: SeriesColor,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterChart {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub series: Vec<ScatterSeries>,
}

impl ScatterChart {
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }

    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }
}

/// Group `rows` by plate and plot `metric` over time, one series per plate.
///
/// Plates come out sorted; inside a series points keep the order of `rows`.
/// Rows without a plate, a timestamp or a value for `metric` are not drawn.
pub fn scatter_by_plate<'a>(
    title: impl Into<String>,
    rows: impl IntoIterator<Item = &'a FuelRecord>,
    metric: Metric,
) -> ScatterChart {
    let mut groups: BTreeMap<&str, Vec<ChartPoint>> = BTreeMap::new();
    for record in rows {
        let (Some(plate), Some(timestamp), Some(value)) =
            (record.plate.as_deref(), record.timestamp, metric.of(record))
        else {
            continue;
        };
        groups
            .entry(plate)
            .or_default()
            .push(ChartPoint { timestamp, value });
    }

    let palette = generate_palette(groups.len());
    let series = groups
        .into_iter()
        .zip(palette)
        .map(|((plate, points), color)| ScatterSeries {
            name: plate.to_string(),
            color,
            points,
        })
        .collect();

    ScatterChart {
        title: title.into(),
        x_title: COL_TIMESTAMP.to_string(),
        y_title: metric.label().to_string(),
        series,
    }
}

// ---------------------------------------------------------------------------
// Box plots
// ---------------------------------------------------------------------------

/// Five-number summary plus Tukey whiskers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxStats {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Smallest value within `q1 - 1.5 * IQR`.
    pub lower_whisker: f64,
    /// Largest value within `q3 + 1.5 * IQR`.
    pub upper_whisker: f64,
}

impl BoxStats {
    /// Quartiles by linear interpolation between closest ranks.
    pub fn from_values(values: &[f64]) -> Option<BoxStats> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25);
        let q3 = quantile(&sorted, 0.75);
        let iqr = q3 - q1;
        let (lo_fence, hi_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        let lower_whisker = sorted.iter().copied().find(|&v| v >= lo_fence).unwrap_or(q1);
        let upper_whisker = sorted.iter().rev().copied().find(|&v| v <= hi_fence).unwrap_or(q3);

        Some(BoxStats {
            min: sorted[0],
            q1,
            median: quantile(&sorted, 0.5),
            q3,
            max: sorted[sorted.len() - 1],
            lower_whisker,
            upper_whisker,
        })
    }
}

fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// A box drawn over one value per driver, every point overlaid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxPanel {
    pub title: String,
    pub metric: Metric,
    pub axis_title: String,
    pub color: SeriesColor,
    pub stats: Option<BoxStats>,
    pub points: Vec<DriverAggregate>,
}

/// Box panel over per-driver means. Drivers without a mean are left out.
pub fn box_panel(
    title: impl Into<String>,
    aggregates: Vec<DriverAggregate>,
    metric: Metric,
    color: SeriesColor,
) -> BoxPanel {
    let points: Vec<DriverAggregate> = aggregates
        .into_iter()
        .filter(|a| a.mean.is_some())
        .collect();
    let values: Vec<f64> = points.iter().filter_map(|a| a.mean).collect();
    BoxPanel {
        title: title.into(),
        metric,
        axis_title: metric.label().to_string(),
        color,
        stats: BoxStats::from_values(&values),
        points,
    }
}

/// Side-by-side box plots: gasoline km/liter, then diesel liters/hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxPlotChart {
    pub panels: [BoxPanel; 2],
}
