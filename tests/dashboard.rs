mod common;

use std::collections::HashSet;

use common::TestWorkspace;
use fuel_dashboard::charts::ScatterChart;
use fuel_dashboard::{
    Config, ConfigurationError, ControlState, DashboardContext, DashboardError, LoadError,
    ValueRange, refresh,
};

const FLEET: &[&str] = &[
    "C100,AAA1A11,2023-01-02 08:00:00,Alice,GASOLINA COMUM,200,100,,10,",
    "C101,BBB2B22,2023-01-02 09:00:00,Bob,GASOLINA COMUM,210,200,,20,",
    "C100,CCC3C33,2023-01-03 08:00:00,Alice,GASOLINA COMUM,190,120,,12,",
    "COR123,AAA1A11,2023-01-03 10:00:00,Alice,GASOLINA COMUM,180,90,,9,",
    "C102,TRK0T00,2023-01-04 07:00:00,Dan,DIESEL,900,,10,,8",
    "C102,TRK0T00,2023-01-05 07:00:00,Dan,DIESEL S-10 COMUM,950,,12,,6.5",
    "C103,TRK1T11,2023-01-05 09:00:00,Eve,DIESEL,800,,8,,",
    "C102,TRK0T00,2023-01-05 07:10:00,Dan,Arla 32,80,,,,",
    "C104,DDD4D44,2023-01-06 08:00:00,Alice,Gasolina Comum,200,100,,11,",
];

fn load(ws: &TestWorkspace) -> DashboardContext {
    let path = ws.write_fuelings("fleet.csv", FLEET);
    let config = Config {
        workbook: path,
        ..Config::default()
    };
    DashboardContext::load(&config).expect("load fleet")
}

fn controls(driver: &str, km: [f64; 2], plate: &str, diesel: &str, lph: [f64; 2]) -> ControlState {
    ControlState {
        driver: Some(driver.into()),
        km_range: km.into(),
        plate: Some(plate.into()),
        diesel_driver: Some(diesel.into()),
        lph_range: lph.into(),
    }
}

fn series_values(chart: &ScatterChart) -> Vec<(String, Vec<f64>)> {
    chart
        .series
        .iter()
        .map(|s| (s.name.clone(), s.points.iter().map(|p| p.value).collect()))
        .collect()
}

#[test]
fn cleaning_drops_excluded_cards_only() {
    let ws = TestWorkspace::new();
    let ctx = load(&ws);
    assert_eq!(ctx.raw_rows, 9);
    assert_eq!(ctx.cleaned.len(), 8);
    assert!(ctx.cleaned.iter().all(|r| r.card.as_deref() != Some("COR123")));
}

#[test]
fn segments_partition_by_exact_service() {
    let ws = TestWorkspace::new();
    let ctx = load(&ws);
    let s = &ctx.segments;
    assert_eq!((s.gasoline.len(), s.diesel.len(), s.additive.len()), (3, 3, 1));
    // "Gasolina Comum" belongs nowhere.
    assert_eq!(s.unsegmented, 1);

    let rows = |t: &fuel_dashboard::data::model::FuelTable| {
        t.iter().map(|r| r.row).collect::<HashSet<_>>()
    };
    assert!(rows(&s.gasoline).is_disjoint(&rows(&s.diesel)));
    assert!(rows(&s.diesel).is_disjoint(&rows(&s.additive)));
}

#[test]
fn dropdowns_list_values_in_first_seen_order() {
    let ws = TestWorkspace::new();
    let ctx = load(&ws);
    assert_eq!(ctx.options.drivers, vec!["Alice", "Bob"]);
    assert_eq!(ctx.options.plates, vec!["AAA1A11", "BBB2B22", "CCC3C33"]);
    assert_eq!(ctx.options.diesel_drivers, vec!["Dan", "Eve"]);
}

#[test]
fn alice_on_two_plates_gives_two_series() {
    let ws = TestWorkspace::new();
    let ctx = load(&ws);
    let d = refresh(&controls("Alice", [0.0, 20.0], "AAA1A11", "Dan", [0.0, 20.0]), &ctx);
    assert_eq!(
        series_values(&d.by_driver),
        vec![("AAA1A11".to_string(), vec![10.0]), ("CCC3C33".to_string(), vec![12.0])]
    );
    assert_eq!(series_values(&d.by_plate), vec![("AAA1A11".to_string(), vec![10.0])]);
    assert_eq!(
        series_values(&d.liters_per_hour),
        vec![("TRK0T00".to_string(), vec![8.0, 6.5])]
    );
}

#[test]
fn boxplots_average_each_driver_over_whole_segment() {
    let ws = TestWorkspace::new();
    let ctx = load(&ws);
    let d = refresh(&controls("Bob", [-1.0, 0.0], "BBB2B22", "Eve", [0.0, 1.0]), &ctx);

    let gas: Vec<(&str, Option<f64>)> = d.boxplots.panels[0]
        .points
        .iter()
        .map(|p| (p.driver.as_str(), p.mean))
        .collect();
    assert_eq!(gas, vec![("Alice", Some(11.0)), ("Bob", Some(20.0))]);

    // Eve has no liters/hour value, so only Dan is drawn.
    let diesel: Vec<(&str, Option<f64>)> = d.boxplots.panels[1]
        .points
        .iter()
        .map(|p| (p.driver.as_str(), p.mean))
        .collect();
    assert_eq!(diesel, vec![("Dan", Some(7.25))]);
}

#[test]
fn reversed_range_behaves_like_ordered_range() {
    let ws = TestWorkspace::new();
    let ctx = load(&ws);
    let a = refresh(&controls("Alice", [20.0, 0.0], "AAA1A11", "Dan", [20.0, 0.0]), &ctx);
    let b = refresh(&controls("Alice", [0.0, 20.0], "AAA1A11", "Dan", [0.0, 20.0]), &ctx);
    assert_eq!(a, b);
    assert_eq!(ValueRange::new(20.0, 0.0), ValueRange::new(0.0, 20.0));
}

#[test]
fn out_of_range_selection_renders_empty_charts() {
    let ws = TestWorkspace::new();
    let ctx = load(&ws);
    let d = refresh(&controls("Alice", [-20.0, -15.0], "AAA1A11", "Dan", [15.0, 20.0]), &ctx);
    assert!(d.by_driver.is_empty());
    assert!(d.by_plate.is_empty());
    assert!(d.liters_per_hour.is_empty());
    assert_eq!(d.boxplots.panels.len(), 2);
}

#[test]
fn dashboard_serialises_for_the_web_front_end() {
    let ws = TestWorkspace::new();
    let ctx = load(&ws);
    let d = refresh(&ControlState::initial(&ctx), &ctx);
    let json = serde_json::to_value(&d).unwrap();
    assert_eq!(json["by_driver"]["series"][0]["name"], "AAA1A11");
    assert_eq!(
        json["by_driver"]["series"][0]["points"][0]["timestamp"],
        "2023-01-02T08:00:00"
    );
    assert_eq!(json["boxplots"]["panels"][1]["color"], "#ffa500");
}

#[test]
fn json_export_loads_like_csv() {
    let ws = TestWorkspace::new();
    let path = ws.write(
        "fleet.json",
        r#"[
            {"Cartao": "C1", "Placa": "AAA", "Data/Hora": "2023-01-02 08:00:00",
             "Motorista": "Alice", "Servico": "GASOLINA COMUM", "Valor": 200,
             "Km Rodados": 100, "Horas Trabalhadas": null, "Km/litro": 10.5,
             "Litros/Hora": null},
            {"Cartao": "POD7", "Placa": "AAA", "Data/Hora": "2023-01-03 08:00:00",
             "Motorista": "Alice", "Servico": "GASOLINA COMUM", "Valor": 200,
             "Km Rodados": 100, "Horas Trabalhadas": null, "Km/litro": 3,
             "Litros/Hora": null}
        ]"#,
    );
    let ctx = DashboardContext::load(&Config {
        workbook: path,
        ..Config::default()
    })
    .unwrap();
    assert_eq!(ctx.cleaned.len(), 1);
    assert_eq!(ctx.segments.gasoline.records[0].km_per_liter, Some(10.5));
}

#[test]
fn missing_columns_are_a_configuration_error() {
    let ws = TestWorkspace::new();
    let path = ws.write("thin.csv", "Cartao,Placa\nC1,AAA\n");
    let err = DashboardContext::load(&Config {
        workbook: path,
        ..Config::default()
    })
    .unwrap_err();
    match err {
        DashboardError::Configuration(ConfigurationError::MissingColumns(cols)) => {
            assert!(cols.contains(&"Motorista".to_string()));
            assert!(!cols.contains(&"Placa".to_string()));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_source_is_a_load_error() {
    let ws = TestWorkspace::new();
    let err = DashboardContext::load(&Config {
        workbook: ws.path().join("Comb SUDOESTE (3 Meses).xlsx"),
        ..Config::default()
    })
    .unwrap_err();
    assert!(matches!(err, DashboardError::Load(LoadError::NotFound { .. })));
}

#[test]
fn zero_padded_ids_reach_the_dropdowns_intact() {
    let ws = TestWorkspace::new();
    let path = ws.write_fuelings(
        "padded.csv",
        &["000123,0042,2023-01-02 08:00:00,Alice,GASOLINA COMUM,200,100,,10,"],
    );
    let ctx = DashboardContext::load(&Config {
        workbook: path,
        ..Config::default()
    })
    .unwrap();
    assert_eq!(ctx.cleaned.records[0].card.as_deref(), Some("000123"));
    assert_eq!(ctx.options.plates, vec!["0042"]);
}

#[test]
fn workbook_sheet_feeds_the_dashboard() {
    use rust_xlsxwriter::{Format, Workbook};

    let ws = TestWorkspace::new();
    let path = ws.path().join("Comb SUDOESTE (3 Meses).xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("DADOS").unwrap();
    for (col, name) in common::HEADER.split(',').enumerate() {
        sheet.write_string(0, col as u16, name).unwrap();
    }
    let date = Format::new().set_num_format("dd/mm/yyyy hh:mm");
    for (row, (card, kml)) in [("C100", 9.0), ("RET7", 4.0)].iter().enumerate() {
        let row = row as u32 + 1;
        sheet.write_string(row, 0, *card).unwrap();
        sheet.write_string(row, 1, "AAA1A11").unwrap();
        sheet.write_number_with_format(row, 2, 44928.5, &date).unwrap();
        sheet.write_string(row, 3, "Alice").unwrap();
        sheet.write_string(row, 4, "GASOLINA COMUM").unwrap();
        sheet.write_number(row, 5, 200).unwrap();
        sheet.write_number(row, 6, 90).unwrap();
        sheet.write_number(row, 8, *kml).unwrap();
    }
    workbook.save(&path).unwrap();

    let config = Config {
        workbook: path,
        ..Config::default()
    };
    let ctx = DashboardContext::load(&config).unwrap();
    assert_eq!((ctx.raw_rows, ctx.cleaned.len()), (2, 1));
    assert_eq!(ctx.segments.gasoline.len(), 1);

    let d = refresh(&ControlState::initial(&ctx), &ctx);
    let point = &d.by_driver.series[0].points[0];
    assert_eq!(point.value, 9.0);
    assert_eq!(point.timestamp.to_string(), "2023-01-02 12:00:00");

    let err = DashboardContext::load(&Config {
        sheet: "OUTRA".into(),
        ..config
    })
    .unwrap_err();
    assert!(matches!(err, DashboardError::Load(LoadError::MissingSheet { .. })));
}
