//! Run document exchanged with the charging optimiser.
//!
//! Field names on the wire follow the optimiser's French vocabulary. The
//! infrastructure structs describe the shape the template and synthesized
//! chargers are built in; sources read from disk stay raw JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunDocument {
    #[serde(rename = "idRun")]
    pub id_run: String,
    #[serde(rename = "choix_optim")]
    pub optim_choice: String,
    #[serde(rename = "synthese")]
    pub summary: Vec<String>,
    pub configuration: Configuration,
    #[serde(rename = "rapport")]
    pub report: Report,
    /// [`Source`] trees, raw so infrastructure files pass through untouched
    pub sources: Vec<Value>,
    #[serde(rename = "vehicules")]
    pub vehicles: Vec<Vehicle>,
}

/// Optimisation window and solver knobs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Boolean carried as the strings `"true"` / `"false"`
    #[serde(rename = "activationRendement")]
    pub efficiency_enabled: String,
    #[serde(rename = "axeOptimDegrade")]
    pub degraded_axes: Vec<i64>,
    #[serde(rename = "diminutionSOC")]
    pub soc_decrease: i64,
    #[serde(rename = "pasDeTemps")]
    pub time_step: i64,
    #[serde(rename = "maximumExecTemps")]
    pub max_exec_time: i64,
    #[serde(rename = "debutOptim")]
    pub optim_start: String,
    #[serde(rename = "finOptim")]
    pub optim_end: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Report {
    pub url: String,
    #[serde(rename = "resultUrl")]
    pub result_url: String,
}

// ============================================================================
// Charging infrastructure: source -> transformer -> charger -> plug
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Source {
    pub id: String,
    #[serde(rename = "libelle")]
    pub label: String,
    #[serde(rename = "pMax")]
    pub p_max: Vec<i64>,
    #[serde(rename = "tranches")]
    pub tariff_bands: Vec<TariffBand>,
    #[serde(rename = "transformateurs")]
    pub transformers: Vec<Transformer>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TariffBand {
    pub id: String,
    #[serde(rename = "cout")]
    pub cost: f64,
    /// `YYYY-MM-DD`
    #[serde(rename = "dateDebut")]
    pub date_start: String,
    #[serde(rename = "dateFin")]
    pub date_end: String,
    #[serde(rename = "heureTranche")]
    pub hours: Vec<HourRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HourRange {
    #[serde(rename = "debut")]
    pub start: i64,
    #[serde(rename = "fin")]
    pub end: i64,
}

/// Load percentage to efficiency ratio
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EfficiencyPoint {
    pub x: i64,
    pub y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transformer {
    pub id: String,
    #[serde(rename = "libelle")]
    pub label: String,
    #[serde(rename = "etat")]
    pub state: String,
    #[serde(rename = "rendement")]
    pub efficiency: Vec<EfficiencyPoint>,
    #[serde(rename = "facteurPuissance")]
    pub power_factor: f64,
    #[serde(rename = "pMax")]
    pub p_max: i64,
    #[serde(rename = "chargeurs")]
    pub chargers: Vec<Charger>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Charger {
    pub id: String,
    #[serde(rename = "libelle")]
    pub label: String,
    #[serde(rename = "etat")]
    pub state: String,
    #[serde(rename = "pMax")]
    pub p_max: i64,
    #[serde(rename = "typeChargeur")]
    pub charger_type: String,
    #[serde(rename = "mutualisation")]
    pub sharing: Sharing,
    #[serde(rename = "rendement")]
    pub efficiency: Vec<EfficiencyPoint>,
    #[serde(rename = "prises")]
    pub plugs: Vec<Plug>,
}

/// How a charger's power is split between its plugs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sharing {
    #[serde(rename = "nombrePrises")]
    pub plug_count: i64,
    #[serde(rename = "configsMutualisation")]
    pub configs: Vec<SharingConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharingConfig {
    #[serde(rename = "configMutualisation")]
    pub shares: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Plug {
    pub id: String,
    #[serde(rename = "libelle")]
    pub label: String,
    #[serde(rename = "etat")]
    pub state: String,
    #[serde(rename = "typePrise")]
    pub plug_type: String,
    #[serde(rename = "pMax")]
    pub p_max: i64,
}

// ============================================================================
// Vehicles
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vehicle {
    pub id: String,
    /// kWh
    #[serde(rename = "capaciteBatterie")]
    pub battery_capacity: i64,
    #[serde(rename = "idPrise")]
    pub plug_id: String,
    /// JSON-encoded [`VehicleLabel`]
    #[serde(rename = "libelle")]
    pub label: String,
    #[serde(rename = "modeBoost")]
    pub boost_mode: i64,
    #[serde(rename = "typeChargeur")]
    pub charger_models: Vec<ChargerModel>,
    #[serde(rename = "typePrise")]
    pub plug_type: String,
    /// Charging power (kW) by SOC
    #[serde(rename = "profilBatterie")]
    pub battery_profile: Vec<CurvePoint>,
    pub soc: i64,
    #[serde(rename = "socCible")]
    pub soc_target: i64,
    #[serde(rename = "dureeService")]
    pub service_duration: i64,
    #[serde(rename = "finService")]
    pub service_end: String,
    #[serde(rename = "debutService")]
    pub service_start: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargerModel {
    #[serde(rename = "modeleChargeur")]
    pub model: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurvePoint {
    pub x: i64,
    pub y: i64,
}

/// Operator-facing summary embedded in [`Vehicle::label`] as a JSON string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleLabel {
    #[serde(rename = "numeroExploitation")]
    pub fleet_number: String,
    #[serde(rename = "debutService")]
    pub service_start: String,
    /// `HH:MM`
    #[serde(rename = "MargeSecurite")]
    pub safety_margin: String,
    /// `HH:MM`
    #[serde(rename = "MargePrechauffage")]
    pub preheat_margin: String,
    /// kWh/km, two decimals
    #[serde(rename = "Conso")]
    pub consumption: f64,
}
