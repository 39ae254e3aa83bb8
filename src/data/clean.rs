use super::model::{FuelRecord, FuelTable, RawTable};
use crate::errors::ConfigurationError;

/// Card prefixes whose fuelings are kept out of the analysis.
pub const EXCLUDED_CARD_PREFIXES: [&str; 3] = ["COR", "POD", "RET"];

// Source column names, in projection order.
pub const COL_CARD: &str = "Cartao";
pub const COL_PLATE: &str = "Placa";
pub const COL_TIMESTAMP: &str = "Data/Hora";
pub const COL_DRIVER: &str = "Motorista";
pub const COL_SERVICE: &str = "Servico";
pub const COL_VALUE: &str = "Valor";
pub const COL_KM_DRIVEN: &str = "Km Rodados";
pub const COL_HOURS_WORKED: &str = "Horas Trabalhadas";
pub const COL_KM_PER_LITER: &str = "Km/litro";
pub const COL_LITERS_PER_HOUR: &str = "Litros/Hora";

pub const REQUIRED_COLUMNS: [&str; 10] = [
    COL_CARD,
    COL_PLATE,
    COL_TIMESTAMP,
    COL_DRIVER,
    COL_SERVICE,
    COL_VALUE,
    COL_KM_DRIVEN,
    COL_HOURS_WORKED,
    COL_KM_PER_LITER,
    COL_LITERS_PER_HOUR,
];

/// Whether a card id starts with one of the excluded prefixes.
pub fn is_excluded_card<S: AsRef<str>>(card: Option<&str>, prefixes: &[S]) -> bool {
    match card {
        Some(card) => prefixes.iter().any(|p| card.starts_with(p.as_ref())),
        None => false,
    }
}

/// Drop excluded cards and project the sheet onto the ten fueling fields.
///
/// The input table is left untouched. Rows keep their source index in
/// [`FuelRecord::row`].
pub fn clean<S: AsRef<str>>(
    raw: &RawTable,
    excluded_prefixes: &[S],
) -> Result<FuelTable, ConfigurationError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| raw.column_index(c).is_none())
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ConfigurationError::MissingColumns(missing));
    }

    // All present, checked above.
    let idx: Vec<usize> = REQUIRED_COLUMNS
        .iter()
        .filter_map(|c| raw.column_index(c))
        .collect();

    let records = (0..raw.len())
        .filter_map(|row| {
            let cell = |i: usize| raw.cell(row, idx[i]);
            let card = cell(0).as_text();
            if is_excluded_card(card.as_deref(), excluded_prefixes) {
                return None;
            }
            Some(FuelRecord {
                row,
                card,
                plate: cell(1).as_text(),
                timestamp: cell(2).as_datetime(),
                driver: cell(3).as_text(),
                service: cell(4).as_text(),
                value: cell(5).as_f64(),
                km_driven: cell(6).as_f64(),
                hours_worked: cell(7).as_f64(),
                km_per_liter: cell(8).as_f64(),
                liters_per_hour: cell(9).as_f64(),
            })
        })
        .collect();

    Ok(FuelTable::new(records))
}
