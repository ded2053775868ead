use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::{Map, Value};

use super::time::timestamp_from_value;

/// One raw input row: column name to string or number
pub type RawRow = Map<String, Value>;

/// Column names of the service-record source
pub mod columns {
    pub const VEHICLE_ID: &str = "newIdVeh";
    pub const MODEL: &str = "tVeh";
    pub const MODE: &str = "mode";
    pub const DEPARTURE_DAY: &str = "jourDep";
    pub const DEPARTURE: &str = "hDep";
    pub const ARRIVAL: &str = "hFin";
    pub const DISTANCE: &str = "dist";
    pub const SOC_RETURNED: &str = "soc_retour";
    pub const SOC: &str = "soc";
    pub const SOC_TARGET: &str = "socCible";
    pub const SAFETY_MARGIN: &str = "MargeSécurité";
    pub const NEXT_SERVICE: &str = "Heure Prochain Service";
}

/// Numeric reading of a cell; numbers pass through, text is parsed
pub fn number_from_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Trimmed text of a cell; empty text is treated as absent
pub fn text_from_value(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// A scheduled depot visit as read from the row source
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServiceRecord {
    pub vehicle_id: Option<String>,
    pub model: String,
    pub mode: Option<String>,
    pub departure_day: Option<NaiveDateTime>,
    pub departure: Option<NaiveDateTime>,
    pub arrival: Option<NaiveDateTime>,
    pub distance: Option<f64>,
    pub soc_returned: Option<f64>,
    pub soc: Option<f64>,
    pub soc_target: Option<f64>,
    pub safety_margin_min: Option<f64>,
}

impl ServiceRecord {
    pub fn from_row(row: &RawRow) -> Self {
        let text = |key: &str| row.get(key).and_then(text_from_value);
        let number = |key: &str| row.get(key).and_then(number_from_value);
        let timestamp = |key: &str| row.get(key).and_then(timestamp_from_value);
        // A returned SOC column that is present but unreadable counts as 0
        let number_or_zero =
            |key: &str| row.get(key).map(|v| number_from_value(v).unwrap_or(0.0));

        Self {
            vehicle_id: text(columns::VEHICLE_ID),
            model: text(columns::MODEL).unwrap_or_default(),
            mode: text(columns::MODE),
            departure_day: timestamp(columns::DEPARTURE_DAY),
            departure: timestamp(columns::DEPARTURE),
            arrival: timestamp(columns::ARRIVAL),
            distance: number(columns::DISTANCE),
            soc_returned: number_or_zero(columns::SOC_RETURNED),
            soc: number(columns::SOC),
            soc_target: number(columns::SOC_TARGET),
            safety_margin_min: number(columns::SAFETY_MARGIN),
        }
    }

    /// Departure day used for window bounds, falling back to the departure time
    pub fn observed_day(&self) -> Option<NaiveDateTime> {
        self.departure_day.or(self.departure)
    }
}

/// A service record plus the fields derived by the enricher
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnrichedRecord {
    pub record: ServiceRecord,
    /// Departure of the next service of the same vehicle
    pub next_service_time: Option<NaiveDateTime>,
    /// SOC percentage once this service is done
    pub soc_after: Option<f64>,
}

impl EnrichedRecord {
    /// Read a row that may already carry derived columns
    pub fn from_row(row: &RawRow) -> Self {
        let record = ServiceRecord::from_row(row);
        let next_service_time = row
            .get(columns::NEXT_SERVICE)
            .and_then(timestamp_from_value);
        Self {
            soc_after: record.soc_returned,
            next_service_time,
            record,
        }
    }
}

impl From<ServiceRecord> for EnrichedRecord {
    fn from(record: ServiceRecord) -> Self {
        Self {
            soc_after: record.soc_returned,
            next_service_time: None,
            record,
        }
    }
}
