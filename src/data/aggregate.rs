use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::clean::{
    COL_HOURS_WORKED, COL_KM_DRIVEN, COL_KM_PER_LITER, COL_LITERS_PER_HOUR, COL_VALUE,
};
use super::model::{FuelRecord, FuelTable};

/// Numeric fields of a fueling record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    Value,
    KmDriven,
    HoursWorked,
    KmPerLiter,
    LitersPerHour,
}

impl Metric {
    pub fn of(self, record: &FuelRecord) -> Option<f64> {
        match self {
            Metric::Value => record.value,
            Metric::KmDriven => record.km_driven,
            Metric::HoursWorked => record.hours_worked,
            Metric::KmPerLiter => record.km_per_liter,
            Metric::LitersPerHour => record.liters_per_hour,
        }
    }

    /// Axis label, as the column is named in the sheet.
    pub fn label(self) -> &'static str {
        match self {
            Metric::Value => COL_VALUE,
            Metric::KmDriven => COL_KM_DRIVEN,
            Metric::HoursWorked => COL_HOURS_WORKED,
            Metric::KmPerLiter => COL_KM_PER_LITER,
            Metric::LitersPerHour => COL_LITERS_PER_HOUR,
        }
    }
}

/// Mean of one metric for one driver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverAggregate {
    pub driver: String,
    /// `None` when every value for this driver is missing.
    pub mean: Option<f64>,
}

/// Group by driver and average `metric`, skipping missing values.
///
/// Rows without a driver are not grouped. Output is ordered by driver name.
pub fn mean_by_driver(table: &FuelTable, metric: Metric) -> Vec<DriverAggregate> {
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for record in table.iter() {
        let Some(driver) = record.driver.as_deref() else {
            continue;
        };
        let acc = groups.entry(driver).or_insert((0.0, 0));
        if let Some(v) = metric.of(record) {
            acc.0 += v;
            acc.1 += 1;
        }
    }

    groups
        .into_iter()
        .map(|(driver, (sum, n))| DriverAggregate {
            driver: driver.to_string(),
            mean: (n > 0).then(|| sum / n as f64),
        })
        .collect()
}
