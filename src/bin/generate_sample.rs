use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use clap::Parser;
use parquet::arrow::ArrowWriter;

use fuel_dashboard::data::clean::REQUIRED_COLUMNS;

/// Write a synthetic fleet fueling table.
#[derive(Debug, Parser)]
struct Args {
    /// Output file; `.parquet` writes Parquet, anything else CSV.
    #[arg(long, default_value = "sample_fuel.csv")]
    output: PathBuf,

    /// Fuelings per vehicle.
    #[arg(long, default_value_t = 30)]
    per_vehicle: usize,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

struct SampleRow {
    card: String,
    plate: String,
    timestamp: NaiveDateTime,
    driver: String,
    service: String,
    value: f64,
    km_driven: Option<f64>,
    hours_worked: Option<f64>,
    km_per_liter: Option<f64>,
    liters_per_hour: Option<f64>,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn generate(rng: &mut SimpleRng, per_vehicle: usize) -> Vec<SampleRow> {
    let cars = [
        ("QRS1A23", ["Ana Souza", "Bruno Lima"]),
        ("QRS4B56", ["Bruno Lima", "Carla Dias"]),
        ("TUV7C89", ["Carla Dias", "Ana Souza"]),
    ];
    let trucks = [
        ("CAM1D11", ["Diego Rocha", "Elias Melo"]),
        ("CAM2E22", ["Elias Melo", "Diego Rocha"]),
    ];
    let start = NaiveDate::from_ymd_opt(2023, 1, 2)
        .and_then(|d| d.and_hms_opt(6, 0, 0))
        .expect("valid start date");

    let mut rows = Vec::new();
    for (v, (plate, drivers)) in cars.iter().enumerate() {
        let mut ts = start + Duration::hours(v as i64 * 3);
        for i in 0..per_vehicle {
            ts += Duration::hours(20 + (rng.next_u64() % 50) as i64);
            let liters = rng.gauss(40.0, 6.0).max(5.0);
            // Odometer typos occasionally produce negative efficiency.
            let kml = if i % 17 == 16 { -rng.gauss(5.0, 2.0) } else { rng.gauss(9.5, 2.0) };
            let service = if i == 7 && v == 0 { "Gasolina Comum" } else { "GASOLINA COMUM" };
            rows.push(SampleRow {
                card: format!("FRT{:04}", 100 + v),
                plate: plate.to_string(),
                timestamp: ts,
                driver: rng.pick(drivers).to_string(),
                service: service.to_string(),
                value: round2(liters * 5.49),
                km_driven: Some(round2(liters * kml)),
                hours_worked: None,
                km_per_liter: Some(round2(kml)),
                liters_per_hour: None,
            });
        }
    }

    for (v, (plate, drivers)) in trucks.iter().enumerate() {
        let mut ts = start + Duration::hours(v as i64 * 5);
        for i in 0..per_vehicle {
            ts += Duration::hours(24 + (rng.next_u64() % 36) as i64);
            let liters = rng.gauss(180.0, 25.0).max(20.0);
            let hours = rng.gauss(14.0, 3.0).max(1.0);
            let service = if i % 2 == 0 { "DIESEL" } else { "DIESEL S-10 COMUM" };
            let driver = rng.pick(drivers).to_string();
            rows.push(SampleRow {
                card: format!("FRT{:04}", 200 + v),
                plate: plate.to_string(),
                timestamp: ts,
                driver: driver.clone(),
                service: service.to_string(),
                value: round2(liters * 5.89),
                km_driven: None,
                hours_worked: Some(round2(hours)),
                km_per_liter: None,
                liters_per_hour: Some(round2(liters / hours)),
            });
            if i % 5 == 0 {
                rows.push(SampleRow {
                    card: format!("FRT{:04}", 200 + v),
                    plate: plate.to_string(),
                    timestamp: ts + Duration::minutes(10),
                    driver,
                    service: "Arla 32".to_string(),
                    value: round2(rng.gauss(20.0, 3.0).max(1.0) * 3.9),
                    km_driven: None,
                    hours_worked: None,
                    km_per_liter: None,
                    liters_per_hour: None,
                });
            }
        }
    }

    // Corporate, pool and reserve cards; the dashboard drops these.
    for (i, prefix) in ["COR", "POD", "RET"].iter().enumerate() {
        rows.push(SampleRow {
            card: format!("{prefix}{:04}", i + 1),
            plate: "ADM0A00".to_string(),
            timestamp: start + Duration::days(i as i64 + 1),
            driver: "Frota Administrativa".to_string(),
            service: "GASOLINA COMUM".to_string(),
            value: 250.0,
            km_driven: Some(400.0),
            hours_worked: None,
            km_per_liter: Some(8.8),
            liters_per_hour: None,
        });
    }

    rows.sort_by_key(|r| r.timestamp);
    rows
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

fn write_csv(path: &Path, rows: &[SampleRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer.write_record(REQUIRED_COLUMNS.iter().chain(["Posto"].iter()))?;
    for r in rows {
        writer.write_record([
            r.card.clone(),
            r.plate.clone(),
            r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            r.driver.clone(),
            r.service.clone(),
            r.value.to_string(),
            fmt_opt(r.km_driven),
            fmt_opt(r.hours_worked),
            fmt_opt(r.km_per_liter),
            fmt_opt(r.liters_per_hour),
            "POSTO SUDOESTE".to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[SampleRow]) -> Result<()> {
    let text = |f: fn(&SampleRow) -> String| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let num = |f: fn(&SampleRow) -> Option<f64>| -> ArrayRef {
        Arc::new(Float64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let columns: Vec<ArrayRef> = vec![
        text(|r| r.card.clone()),
        text(|r| r.plate.clone()),
        text(|r| r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
        text(|r| r.driver.clone()),
        text(|r| r.service.clone()),
        num(|r| Some(r.value)),
        num(|r| r.km_driven),
        num(|r| r.hours_worked),
        num(|r| r.km_per_liter),
        num(|r| r.liters_per_hour),
    ];
    let fields: Vec<Field> = REQUIRED_COLUMNS
        .iter()
        .zip(&columns)
        .map(|(name, col)| Field::new(*name, col.data_type().clone(), true))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng, args.per_vehicle);

    let is_parquet = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet") || e.eq_ignore_ascii_case("pq"));
    if is_parquet {
        write_parquet(&args.output, &rows)?;
    } else {
        write_csv(&args.output, &rows)?;
    }

    println!("Wrote {} fuelings to {}", rows.len(), args.output.display());
    Ok(())
}
