use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::data::clean::EXCLUDED_CARD_PREFIXES;

pub const DEFAULT_WORKBOOK: &str = "Comb SUDOESTE (3 Meses).xlsx";
pub const DEFAULT_SHEET: &str = "DADOS";
pub const DEFAULT_PORT: u16 = 8050;

/// Startup parameters. Fixed for the life of the process.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Source spreadsheet (or CSV / JSON / Parquet export of it).
    pub workbook: PathBuf,
    /// Sheet holding the fueling records.
    pub sheet: String,
    /// Card prefixes dropped by the cleaner.
    pub excluded_prefixes: Vec<String>,
    /// Every address the web front-end listens on.
    pub bind: Vec<SocketAddr>,
    /// Log at debug level unless `RUST_LOG` says otherwise.
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workbook: PathBuf::from(DEFAULT_WORKBOOK),
            sheet: DEFAULT_SHEET.to_string(),
            excluded_prefixes: EXCLUDED_CARD_PREFIXES.iter().map(|p| p.to_string()).collect(),
            bind: vec![SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT))],
            debug: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_fleet_export() {
        let config = Config::default();
        assert_eq!(config.sheet, "DADOS");
        assert_eq!(config.excluded_prefixes, vec!["COR", "POD", "RET"]);
        assert_eq!(config.bind, vec!["127.0.0.1:8050".parse::<SocketAddr>().unwrap()]);
    }
}
