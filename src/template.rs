//! Default run document every mapped record starts from.

use once_cell::sync::Lazy;
use serde_json::json;

use crate::domain::{
    Charger, ChargerModel, Configuration, EfficiencyPoint, HourRange, Plug, Report, RunDocument,
    Sharing, SharingConfig, Source, TariffBand, Transformer, Vehicle, CHARGERS_KEY,
    TRANSFORMERS_KEY,
};

pub const DEFAULT_CHARGER_TYPE: &str = "TypeChargeur_valeur";
pub const DEFAULT_PLUG_TYPE: &str = "CCS COMBO2";

const TRANSFORMER_EFFICIENCY: f64 = 0.9;
const CHARGER_EFFICIENCY: f64 = 0.94;

static DEFAULT_TEMPLATE: Lazy<RunDocument> = Lazy::new(build_default);

/// Independent copy of the default template
pub fn template() -> RunDocument {
    DEFAULT_TEMPLATE.clone()
}

/// Shared read-only view of the default template
pub fn template_ref() -> &'static RunDocument {
    &DEFAULT_TEMPLATE
}

/// Flat efficiency curve sampled every 10% of load
fn flat_efficiency(y: f64) -> Vec<EfficiencyPoint> {
    (1..=10).map(|i| EfficiencyPoint { x: i * 10, y }).collect()
}

fn build_default() -> RunDocument {
    let plug = Plug::default();

    let charger = Charger {
        charger_type: DEFAULT_CHARGER_TYPE.to_string(),
        sharing: Sharing {
            plug_count: 0,
            configs: vec![SharingConfig { shares: vec![100] }],
        },
        efficiency: flat_efficiency(CHARGER_EFFICIENCY),
        plugs: vec![plug],
        ..Default::default()
    };

    let transformer = Transformer {
        efficiency: flat_efficiency(TRANSFORMER_EFFICIENCY),
        chargers: vec![charger],
        ..Default::default()
    };

    let source = Source {
        tariff_bands: vec![TariffBand {
            cost: 0.0,
            hours: vec![HourRange { start: 0, end: 1 }],
            ..Default::default()
        }],
        transformers: vec![transformer],
        ..Default::default()
    };

    let vehicle = Vehicle {
        charger_models: vec![ChargerModel {
            model: DEFAULT_CHARGER_TYPE.to_string(),
        }],
        plug_type: DEFAULT_PLUG_TYPE.to_string(),
        ..Default::default()
    };

    RunDocument {
        id_run: "01234567891011".to_string(),
        optim_choice: String::new(),
        summary: Vec::new(),
        configuration: Configuration {
            efficiency_enabled: "false".to_string(),
            degraded_axes: Vec::new(),
            soc_decrease: 0,
            time_step: 0,
            max_exec_time: 0,
            optim_start: "2000-01-01T00:00:00".to_string(),
            optim_end: "2050-01-01T01:00:00".to_string(),
        },
        report: Report {
            url: "http://example.com".to_string(),
            result_url: "http://example.com/result".to_string(),
        },
        sources: vec![json!(source)],
        vehicles: vec![vehicle],
    }
}

impl RunDocument {
    /// First charger of the first transformer of the first source
    pub fn prototype_charger(&self) -> Option<Charger> {
        let raw = self
            .sources
            .first()?
            .get(TRANSFORMERS_KEY)?
            .get(0)?
            .get(CHARGERS_KEY)?
            .get(0)?;
        serde_json::from_value(raw.clone()).ok()
    }

    pub fn prototype_vehicle(&self) -> Option<&Vehicle> {
        self.vehicles.first()
    }
}
