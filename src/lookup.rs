use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::domain::record::{number_from_value, text_from_value};
use crate::domain::RawRow;

/// Column names of the truck characteristics source
pub mod columns {
    pub const PROJECTION: &str = "Projection";
    pub const MODEL: &str = "Modèle";
    pub const CAPACITY: &str = "Capacité max de la batterie (kWh)";
    pub const CONSUMPTION: &str = "Conso estimée réelle (kWh/km)";
    pub const CHARGING_POWER: &str = "Puissance de recharge max (kW)";
}

/// `(projection, model) -> value` table.
///
/// Models are trimmed on insert and lookup, and compared case-sensitively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupTable {
    entries: HashMap<(i64, String), f64>,
}

impl LookupTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from tabular rows, reading the value from `value_column`.
    ///
    /// Rows with an unparsable projection, an empty model or an unparsable
    /// value are skipped.
    pub fn from_rows(rows: &[RawRow], value_column: &str) -> Self {
        let mut table = Self::new();
        let mut skipped = 0usize;

        for row in rows {
            let projection = row.get(columns::PROJECTION).and_then(projection_from_value);
            let model = row.get(columns::MODEL).and_then(text_from_value);
            let value = row.get(value_column).and_then(number_from_value);

            match (projection, model, value) {
                (Some(p), Some(m), Some(v)) => table.insert(p, &m, v),
                _ => skipped += 1,
            }
        }

        debug!(column = value_column, entries = table.len(), skipped, "built lookup table");
        table
    }

    pub fn insert(&mut self, projection: i64, model: &str, value: f64) {
        self.entries.insert((projection, model.trim().to_string()), value);
    }

    pub fn get(&self, projection: i64, model: &str) -> Option<f64> {
        self.entries
            .get(&(projection, model.trim().to_string()))
            .copied()
    }

    /// Total lookup: absent keys yield `default`
    pub fn get_or(&self, projection: i64, model: &str, default: f64) -> f64 {
        self.get(projection, model).unwrap_or(default)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> FromIterator<((i64, &'a str), f64)> for LookupTable {
    fn from_iter<I: IntoIterator<Item = ((i64, &'a str), f64)>>(iter: I) -> Self {
        let mut table = Self::new();
        for ((projection, model), value) in iter {
            table.insert(projection, model, value);
        }
        table
    }
}

/// Integer projection; integral numbers are accepted, fractional ones are not
fn projection_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.is_finite())
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Per-model truck characteristics used by the enricher and the mapper
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TruckTables {
    /// kWh
    pub capacity: LookupTable,
    /// kWh/km
    pub consumption: LookupTable,
    /// kW
    pub charging_power: LookupTable,
}

impl TruckTables {
    pub fn from_rows(rows: &[RawRow]) -> Self {
        Self {
            capacity: LookupTable::from_rows(rows, columns::CAPACITY),
            consumption: LookupTable::from_rows(rows, columns::CONSUMPTION),
            charging_power: LookupTable::from_rows(rows, columns::CHARGING_POWER),
        }
    }

    pub fn capacity_kwh(&self, projection: i64, model: &str) -> f64 {
        self.capacity.get_or(projection, model, 0.0)
    }

    pub fn consumption_kwh_per_km(&self, projection: i64, model: &str) -> f64 {
        self.consumption.get_or(projection, model, 0.0)
    }

    /// `None` means the battery profile is left unscaled
    pub fn charging_power_kw(&self, projection: i64, model: &str) -> Option<f64> {
        self.charging_power.get(projection, model)
    }
}
