//! End-to-end runs of the planner over files on disk.

use std::path::{Path, PathBuf};

use depot_charge_planner::config::{Config, InputConfig, OutputConfig};
use depot_charge_planner::domain::RunParams;
use depot_charge_planner::error::{Error, RangeError, SchemaError};
use depot_charge_planner::pipeline;
use depot_charge_planner::validation::{run_document_schema, validate};
use serde_json::Value;

const SERVICE_RECORDS: &str = "\
newIdVeh,tVeh,mode,jourDep,hDep,hFin,dist,MargeSécurité
2,T,E,45642,2024-12-16T07:00:00,2024-12-16T16:30:00,200,
1,P,E,45643,2024-12-17T06:00:00,2024-12-17T15:00:00,80,5
1,P,E,45642,2024-12-16T06:00:00,2024-12-16T14:00:00,100,5
3,P,T,45644,2024-12-18T06:00:00,2024-12-18T12:00:00,50,
";

const TRUCK_DATA: &str = "\
Projection,Modèle,Capacité max de la batterie (kWh),Conso estimée réelle (kWh/km),Puissance de recharge max (kW)
0,P,500,1.0,400
0,T,1000,1.5,1500
";

const BATTERY_PROFILE: &str = "soc,power\n0,100\n50,200\n100,50\n";

const INFRASTRUCTURE: &str = r#"{
  "sources": [{
    "id": "SRC1",
    "libelle": "Depot",
    "pMax": [800],
    "transformateurs": [{
      "id": "TR1",
      "etat": "online",
      "pMax": 800,
      "chargeurs": [{
        "id": "C1",
        "typeChargeur": "DC-150",
        "pMax": 150.5,
        "prises": [{"id": "P1", "typePrise": "CCS2", "pMax": 150}]
      }]
    }]
  }]
}"#;

struct Fixture {
    dir: tempfile::TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        for (name, contents) in [
            ("records.csv", SERVICE_RECORDS),
            ("trucks.csv", TRUCK_DATA),
            ("profile.csv", BATTERY_PROFILE),
            ("infra.json", INFRASTRUCTURE),
            ("broken.json", "{ \"sources\": ["),
        ] {
            std::fs::write(dir.path().join(name), contents).unwrap();
        }
        std::fs::create_dir(dir.path().join("out")).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn config(&self, infrastructure: Option<&str>) -> Config {
        Config {
            input: InputConfig {
                service_records: self.path("records.csv"),
                truck_data: self.path("trucks.csv"),
                battery_profile: self.path("profile.csv"),
                infrastructure: infrastructure.map(|name| self.path(name)),
                mode: "E".to_string(),
                start: Some("2024-12-10".to_string()),
                end: Some("2025-01-30".to_string()),
            },
            run: RunParams {
                target_soc: 100.0,
                random_seed: Some(1),
                ..Default::default()
            },
            output: OutputConfig {
                path: Some(self.path("out")),
                validate_schema: false,
                enforce_window: false,
            },
        }
    }
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_end_to_end_single_plug_infrastructure() {
    let fixture = Fixture::new();
    let config = fixture.config(Some("infra.json"));

    let doc = pipeline::run(&config).unwrap().unwrap();

    assert_eq!(doc.vehicles.len(), 3);
    assert!(doc.vehicles.iter().all(|v| v.plug_id == "P1"));
    assert!(doc.vehicles.iter().all(|v| v.plug_type == "CCS2"));
    assert!(doc
        .vehicles
        .iter()
        .all(|v| v.charger_models[0].model == "DC-150"));

    let input = read_json(&fixture.path("infra.json"));
    let written = read_json(&fixture.path("out").join("result.json"));
    assert_eq!(written["vehicules"].as_array().unwrap().len(), 3);
    assert_eq!(written["sources"], input["sources"]);
    assert_eq!(
        written["sources"][0]["transformateurs"][0]["chargeurs"][0]["pMax"],
        150.5
    );
}

#[test]
fn test_schema_check_rejects_partial_infrastructure() {
    let fixture = Fixture::new();
    let mut config = fixture.config(Some("infra.json"));
    config.output.validate_schema = true;

    let err = pipeline::run(&config).unwrap_err();
    assert!(matches!(
        err,
        Error::Schema(SchemaError::MissingKey { ref path }) if path == "sources.[0].tranches"
    ));
}

#[test]
fn test_schema_check_passes_without_infrastructure() {
    let fixture = Fixture::new();
    let mut config = fixture.config(None);
    config.output.validate_schema = true;

    pipeline::run(&config).unwrap().unwrap();
    let written = read_json(&fixture.path("out").join("result.json"));
    assert!(validate(&written, run_document_schema()).is_ok());
}

#[test]
fn test_end_to_end_vehicle_fields() {
    let fixture = Fixture::new();
    let doc = pipeline::run(&fixture.config(Some("infra.json")))
        .unwrap()
        .unwrap();

    assert_eq!(doc.configuration.optim_start, "2024-12-13T23:59:59Z");
    assert_eq!(doc.configuration.optim_end, "2024-12-21T00:00:00Z");
    assert_eq!(doc.configuration.degraded_axes, vec![1, 2, 3]);

    let ids: Vec<&str> = doc.vehicles.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, ["1", "1", "2"]);

    let socs: Vec<i64> = doc.vehicles.iter().map(|v| v.soc).collect();
    assert_eq!(socs, [80, 84, 70]);

    let first = &doc.vehicles[0];
    assert_eq!(first.battery_capacity, 500);
    assert_eq!(first.service_duration, 100);
    assert_eq!(first.service_end, "2024-12-16T14:45:00Z");
    assert_eq!(first.service_start, "2024-12-17T05:25:00Z");
    assert_eq!(first.battery_profile[1].y, 400);

    // No next service: finOptim + 1.5 days
    assert_eq!(doc.vehicles[1].service_start, "2024-12-22T12:00:00Z");
    assert_eq!(doc.vehicles[2].service_start, "2024-12-22T12:00:00Z");
    assert_eq!(doc.vehicles[2].battery_profile[1].y, 1500);

    let label: Value = serde_json::from_str(&first.label).unwrap();
    assert_eq!(label["numeroExploitation"], "1");
    assert_eq!(label["MargeSecurite"], "00:15");
    assert_eq!(label["MargePrechauffage"], "00:30");
    assert_eq!(label["Conso"], 1.0);
}

#[test]
fn test_malformed_infrastructure_is_ignored() {
    let fixture = Fixture::new();
    let doc = pipeline::run(&fixture.config(Some("broken.json")))
        .unwrap()
        .unwrap();

    assert!(doc.sources.is_empty());
    let plugs: Vec<&str> = doc.vehicles.iter().map(|v| v.plug_id.as_str()).collect();
    assert_eq!(plugs, ["TR1_CH_1_P1", "TR1_CH_1_P1", "TR1_CH_2_P1"]);
}

#[test]
fn test_enforced_window_rejects_late_start() {
    let fixture = Fixture::new();
    let mut config = fixture.config(None);
    config.output.enforce_window = true;
    config.run.start = Some("2024-12-17".to_string());

    let err = pipeline::run(&config).unwrap_err();
    assert!(matches!(
        err,
        Error::Range(RangeError::StartNotBeforeWindow { .. })
    ));
}

#[test]
fn test_enforced_window_accepts_wide_range() {
    let fixture = Fixture::new();
    let mut config = fixture.config(None);
    config.output.enforce_window = true;
    assert!(pipeline::run(&config).unwrap().is_some());
}

#[test]
fn test_no_matching_rows_writes_empty_document() {
    let fixture = Fixture::new();
    let mut config = fixture.config(None);
    config.input.mode = "X".to_string();

    assert!(pipeline::run(&config).unwrap().is_none());
    let text = std::fs::read_to_string(fixture.path("out").join("result.json")).unwrap();
    assert_eq!(text, "{}");
}

#[test]
fn test_departure_day_filter() {
    let fixture = Fixture::new();
    let mut config = fixture.config(None);
    config.input.mode = String::new();
    config.input.start = Some("2024-12-17".to_string());
    config.input.end = Some("45644".to_string());
    config.run.start = Some("2024-12-01".to_string());
    config.output.path = None;

    let doc = pipeline::run(&config).unwrap().unwrap();
    let ids: Vec<&str> = doc.vehicles.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, ["1", "3"]);
}
