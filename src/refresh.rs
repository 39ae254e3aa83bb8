use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::charts::{BoxPlotChart, ScatterChart, box_panel, scatter_by_plate};
use crate::color::{DIESEL_COLOR, GASOLINE_COLOR};
use crate::config::Config;
use crate::data::aggregate::{Metric, mean_by_driver};
use crate::data::clean::clean;
use crate::data::loader::load_table;
use crate::data::model::{FuelTable, RawTable};
use crate::data::segment::Segments;
use crate::errors::{ConfigurationError, DashboardError};

/// Slider bounds shared by both range controls.
pub const RANGE_MIN: f64 = -20.0;
pub const RANGE_MAX: f64 = 20.0;
pub const RANGE_STEP: f64 = 1.0;

// ---------------------------------------------------------------------------
// ValueRange
// ---------------------------------------------------------------------------

/// Inclusive numeric range. Always `lo <= hi`: reversed bounds are swapped.
/// Serialised as `[lo, hi]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct ValueRange {
    lo: f64,
    hi: f64,
}

impl ValueRange {
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            ValueRange { lo: a, hi: b }
        } else {
            ValueRange { lo: b, hi: a }
        }
    }

    pub fn lo(&self) -> f64 {
        self.lo
    }

    pub fn hi(&self) -> f64 {
        self.hi
    }

    pub fn contains(&self, v: f64) -> bool {
        self.lo <= v && v <= self.hi
    }

    /// `contains`, with a missing value never inside.
    pub fn contains_opt(&self, v: Option<f64>) -> bool {
        v.is_some_and(|v| self.contains(v))
    }
}

impl Default for ValueRange {
    fn default() -> Self {
        ValueRange::new(RANGE_MIN, RANGE_MAX)
    }
}

impl From<[f64; 2]> for ValueRange {
    fn from([a, b]: [f64; 2]) -> Self {
        ValueRange::new(a, b)
    }
}

impl From<ValueRange> for [f64; 2] {
    fn from(r: ValueRange) -> Self {
        [r.lo, r.hi]
    }
}

// ---------------------------------------------------------------------------
// ControlState – one session's selections
// ---------------------------------------------------------------------------

/// Everything the user can pick. A refresh is a pure function of this and
/// the [`DashboardContext`].
///
/// `km_range` filters both the by-driver and the by-plate gasoline charts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlState {
    /// Gasoline driver.
    pub driver: Option<String>,
    pub km_range: ValueRange,
    /// Gasoline plate.
    pub plate: Option<String>,
    /// Driver for the diesel chart, independent of `driver`.
    pub diesel_driver: Option<String>,
    pub lph_range: ValueRange,
}

impl ControlState {
    /// First option of every drop-down and the full slider range.
    pub fn initial(ctx: &DashboardContext) -> Self {
        ControlState {
            driver: ctx.options.drivers.first().cloned(),
            km_range: ValueRange::default(),
            plate: ctx.options.plates.first().cloned(),
            diesel_driver: ctx.options.diesel_drivers.first().cloned(),
            lph_range: ValueRange::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// DashboardContext – read-only data built once at startup
// ---------------------------------------------------------------------------

/// Drop-down choices and slider bounds for the front-ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlOptions {
    pub drivers: Vec<String>,
    pub plates: Vec<String>,
    pub diesel_drivers: Vec<String>,
    pub range_min: f64,
    pub range_max: f64,
    pub range_step: f64,
}

#[derive(Debug, Clone)]
pub struct DashboardContext {
    /// Where the data came from, for display.
    pub source: String,
    /// Rows in the sheet before cleaning.
    pub raw_rows: usize,
    pub cleaned: FuelTable,
    pub segments: Segments,
    pub options: ControlOptions,
}

impl DashboardContext {
    /// Load, clean and segment the configured sheet.
    pub fn load(config: &Config) -> Result<Self, DashboardError> {
        let raw = load_table(&config.workbook, &config.sheet)?;
        let source = format!("{} [{}]", config.workbook.display(), config.sheet);
        Ok(Self::from_raw(source, &raw, config.excluded_prefixes.as_slice())?)
    }

    pub fn from_raw<S: AsRef<str>>(
        source: impl Into<String>,
        raw: &RawTable,
        excluded_prefixes: &[S],
    ) -> Result<Self, ConfigurationError> {
        let cleaned = clean(raw, excluded_prefixes)?;
        let segments = Segments::split(&cleaned);
        let options = ControlOptions {
            drivers: segments.gasoline.unique_drivers(),
            plates: segments.gasoline.unique_plates(),
            diesel_drivers: segments.diesel.unique_drivers(),
            range_min: RANGE_MIN,
            range_max: RANGE_MAX,
            range_step: RANGE_STEP,
        };
        let source = source.into();
        info!(
            "{source}: {} rows, {} after cleaning (gasoline {}, diesel {}, additive {}, other {})",
            raw.len(),
            cleaned.len(),
            segments.gasoline.len(),
            segments.diesel.len(),
            segments.additive.len(),
            segments.unsegmented,
        );
        Ok(DashboardContext {
            source,
            raw_rows: raw.len(),
            cleaned,
            segments,
            options,
        })
    }
}

// ---------------------------------------------------------------------------
// Refresh
// ---------------------------------------------------------------------------

/// The four charts of one refresh. Replaces the previous set wholesale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub boxplots: BoxPlotChart,
    pub by_driver: ScatterChart,
    pub by_plate: ScatterChart,
    pub liters_per_hour: ScatterChart,
}

fn selected(field: Option<&str>, choice: Option<&str>) -> bool {
    matches!((field, choice), (Some(a), Some(b)) if a == b)
}

fn label(choice: Option<&str>) -> &str {
    choice.unwrap_or("(none)")
}

/// Rebuild every chart from the current selections.
///
/// Empty selections give empty charts, never an error.
pub fn refresh(state: &ControlState, ctx: &DashboardContext) -> Dashboard {
    debug!("refresh {state:?}");
    let gasoline = &ctx.segments.gasoline;
    let diesel = &ctx.segments.diesel;
    let driver = state.driver.as_deref();
    let plate = state.plate.as_deref();
    let diesel_driver = state.diesel_driver.as_deref();

    let by_driver = scatter_by_plate(
        format!("Km/liter by plate for {}", label(driver)),
        gasoline.iter().filter(|r| {
            selected(r.driver.as_deref(), driver) && state.km_range.contains_opt(r.km_per_liter)
        }),
        Metric::KmPerLiter,
    );

    let by_plate = scatter_by_plate(
        format!("Km/liter for plate {}", label(plate)),
        gasoline.iter().filter(|r| {
            selected(r.plate.as_deref(), plate) && state.km_range.contains_opt(r.km_per_liter)
        }),
        Metric::KmPerLiter,
    );

    let liters_per_hour = scatter_by_plate(
        format!("Liters/hour by plate for {}", label(diesel_driver)),
        diesel.iter().filter(|r| {
            selected(r.driver.as_deref(), diesel_driver)
                && state.lph_range.contains_opt(r.liters_per_hour)
        }),
        Metric::LitersPerHour,
    );

    let boxplots = BoxPlotChart {
        panels: [
            box_panel(
                "Km/liter, regular gasoline",
                mean_by_driver(gasoline, Metric::KmPerLiter),
                Metric::KmPerLiter,
                GASOLINE_COLOR,
            ),
            box_panel(
                "Liters/hour, diesel",
                mean_by_driver(diesel, Metric::LitersPerHour),
                Metric::LitersPerHour,
                DIESEL_COLOR,
            ),
        ],
    };

    Dashboard {
        boxplots,
        by_driver,
        by_plate,
        liters_per_hour,
    }
}
