use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumIter, EnumString};
use validator::{Validate, ValidationError};

use super::record::ServiceRecord;
use super::time::{excel_epoch, excel_serial_to_datetime, parse_iso_datetime};
use crate::error::{Error, Result};

/// Objective requested from the optimiser
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum OptimChoice {
    CoutEnergie,
    LissagePuissance,
    Supervision,
    #[strum(serialize = "LLLP")]
    #[serde(rename = "LLLP")]
    Lllp,
}

/// Run-wide parameters shared by every mapped record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RunParams {
    /// Scenario year used in every lookup key
    pub projection: i64,
    /// SOC (%) each vehicle should reach; also the base of SOC depletion
    #[validate(range(min = 0.0, max = 100.0))]
    pub target_soc: f64,
    #[serde(deserialize_with = "deserialize_minutes")]
    #[validate(range(min = 0))]
    pub safety_margin_min: i64,
    #[serde(deserialize_with = "deserialize_minutes")]
    #[validate(range(min = 0))]
    pub preheat_margin_min: i64,
    pub efficiency_enabled: Option<bool>,
    pub soc_decrease: Option<i64>,
    pub time_step: Option<i64>,
    pub max_exec_time: i64,
    /// Minutes spent loading before the next departure
    pub loading_min: Option<f64>,
    /// Minutes spent unloading after arrival
    pub unloading_min: Option<f64>,
    #[validate(custom(function = "validate_degraded_axes"))]
    pub degraded_axes: Option<Vec<i64>>,
    pub optim_choice: Option<OptimChoice>,
    /// Enables the `finOptim + 1.5 days` service start fallback
    pub default_service_start: Option<String>,
    /// Requested `debutOptim` (ISO text or spreadsheet serial)
    pub start: Option<String>,
    /// Requested `finOptim` (ISO text or spreadsheet serial)
    pub end: Option<String>,
    /// Seeds plug assignment; entropy when unset
    pub random_seed: Option<u64>,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            projection: 0,
            target_soc: 0.0,
            safety_margin_min: 15,
            preheat_margin_min: 30,
            efficiency_enabled: Some(false),
            soc_decrease: Some(5),
            time_step: None,
            max_exec_time: 10,
            loading_min: Some(30.0),
            unloading_min: Some(45.0),
            degraded_axes: None,
            optim_choice: None,
            default_service_start: Some("2050-01-01T23:59:59Z".to_string()),
            start: None,
            end: None,
            random_seed: None,
        }
    }
}

impl RunParams {
    pub fn check(&self) -> Result<()> {
        self.validate()?;
        Ok(())
    }

    /// Parsed `(start, end)` bounds; unparsable text is an error
    pub fn optim_bounds(&self) -> Result<(Option<NaiveDateTime>, Option<NaiveDateTime>)> {
        Ok((
            parse_bound("start", self.start.as_deref())?,
            parse_bound("end", self.end.as_deref())?,
        ))
    }
}

/// ISO text or spreadsheet serial; `None` passes through
pub fn parse_bound(field: &str, value: Option<&str>) -> Result<Option<NaiveDateTime>> {
    let Some(text) = value else {
        return Ok(None);
    };
    parse_iso_datetime(text)
        .or_else(|| text.trim().parse::<f64>().ok().and_then(excel_serial_to_datetime))
        .map(Some)
        .ok_or_else(|| Error::InvalidTimestamp {
            field: field.to_string(),
            value: text.to_string(),
        })
}

fn validate_degraded_axes(axes: &Vec<i64>) -> std::result::Result<(), ValidationError> {
    if axes.iter().all(|a| (1..=3).contains(a)) {
        Ok(())
    } else {
        Err(ValidationError::new("degraded_axes_out_of_range"))
    }
}

/// Minutes given either as an integer or as `HH:MM`
fn deserialize_minutes<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Minutes {
        Number(i64),
        Text(String),
    }

    match Minutes::deserialize(deserializer)? {
        Minutes::Number(n) => Ok(n),
        Minutes::Text(text) => parse_hhmm(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid HH:MM duration: {text}"))),
    }
}

fn parse_hhmm(text: &str) -> Option<i64> {
    let text = text.trim();
    match text.split_once(':') {
        Some((h, m)) => Some(h.trim().parse::<i64>().ok()? * 60 + m.trim().parse::<i64>().ok()?),
        None => text.parse().ok(),
    }
}

/// Earliest and latest departure day seen in the source rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservedWindow {
    pub min: NaiveDateTime,
    pub max: NaiveDateTime,
}

impl Default for ObservedWindow {
    fn default() -> Self {
        Self {
            min: excel_epoch(),
            max: excel_epoch(),
        }
    }
}

impl ObservedWindow {
    pub fn new(min: NaiveDateTime, max: NaiveDateTime) -> Self {
        Self { min, max }
    }

    /// Bounds over every record with a departure day; the spreadsheet epoch
    /// for both ends when none has one.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a ServiceRecord>) -> Self {
        let mut days = records.into_iter().filter_map(ServiceRecord::observed_day);
        let Some(first) = days.next() else {
            return Self::default();
        };
        days.fold(Self::new(first, first), |w, d| Self::new(w.min.min(d), w.max.max(d)))
    }
}
