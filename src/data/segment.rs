use log::debug;
use serde::Serialize;

use super::model::FuelTable;

/// Service categories the dashboard analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ServiceSegment {
    Gasoline,
    Diesel,
    Additive,
}

impl ServiceSegment {
    /// Exact, case-sensitive match on the `Servico` field. Any other
    /// spelling belongs to no segment.
    pub fn classify(service: &str) -> Option<ServiceSegment> {
        match service {
            "GASOLINA COMUM" => Some(ServiceSegment::Gasoline),
            "DIESEL" | "DIESEL S-10 COMUM" => Some(ServiceSegment::Diesel),
            "Arla 32" => Some(ServiceSegment::Additive),
            _ => None,
        }
    }
}

/// The cleaned table split by service.
#[derive(Debug, Clone, Default)]
pub struct Segments {
    pub gasoline: FuelTable,
    pub diesel: FuelTable,
    pub additive: FuelTable,
    /// Rows whose service matched no segment.
    pub unsegmented: usize,
}

impl Segments {
    pub fn split(table: &FuelTable) -> Self {
        let mut segments = Segments::default();
        for record in table.iter() {
            let target = match record.service.as_deref().and_then(ServiceSegment::classify) {
                Some(ServiceSegment::Gasoline) => &mut segments.gasoline,
                Some(ServiceSegment::Diesel) => &mut segments.diesel,
                Some(ServiceSegment::Additive) => &mut segments.additive,
                None => {
                    segments.unsegmented += 1;
                    continue;
                }
            };
            target.records.push(record.clone());
        }
        if segments.unsegmented > 0 {
            debug!(
                "{} rows matched no service segment",
                segments.unsegmented
            );
        }
        segments
    }

    pub fn get(&self, segment: ServiceSegment) -> &FuelTable {
        match segment {
            ServiceSegment::Gasoline => &self.gasoline,
            ServiceSegment::Diesel => &self.diesel,
            ServiceSegment::Additive => &self.additive,
        }
    }
}
