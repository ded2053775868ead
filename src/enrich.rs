//! Derived per-row fields: next service of the same vehicle and SOC after
//! the service.

use chrono::NaiveDateTime;
use itertools::Itertools;
use std::cmp::Ordering;
use tracing::debug;

use crate::domain::{EnrichedRecord, ServiceRecord};
use crate::lookup::TruckTables;

/// Stable sort by (vehicle id, departure), absent values last
pub fn sort_by_vehicle_and_departure(records: &mut [ServiceRecord]) {
    records.sort_by(|a, b| {
        none_last(&a.vehicle_id, &b.vehicle_id).then_with(|| none_last(&a.departure, &b.departure))
    });
}

fn none_last<T: Ord>(a: &Option<T>, b: &Option<T>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Departure of the following row of the same vehicle, for rows already
/// sorted with [`sort_by_vehicle_and_departure`]. Rows without a vehicle id
/// never get one.
pub fn next_service_times(sorted: &[ServiceRecord]) -> Vec<Option<NaiveDateTime>> {
    let mut next = Vec::with_capacity(sorted.len());

    for (vehicle, group) in &sorted.iter().chunk_by(|r| r.vehicle_id.clone()) {
        let group: Vec<&ServiceRecord> = group.collect();
        if vehicle.is_none() {
            next.extend(std::iter::repeat(None).take(group.len()));
            continue;
        }
        next.extend(group.iter().skip(1).map(|r| r.departure));
        next.push(None);
    }

    next
}

/// SOC (%) after the service, starting from `target_soc`.
///
/// Each row starts from the same target; the result of the previous service
/// of the vehicle is not carried over.
pub fn soc_after(record: &ServiceRecord, tables: &TruckTables, projection: i64, target_soc: f64) -> f64 {
    let consumption = tables.consumption_kwh_per_km(projection, &record.model);
    let capacity = tables.capacity_kwh(projection, &record.model);
    let distance = record.distance.unwrap_or(0.0);

    let delta = if capacity != 0.0 {
        consumption * distance / capacity * 100.0
    } else {
        0.0
    };
    (target_soc - delta).max(0.0)
}

/// Sorts rows and fills in next-service time and SOC
#[derive(Debug, Clone, Copy)]
pub struct RowEnricher<'a> {
    tables: &'a TruckTables,
    projection: i64,
    target_soc: f64,
}

impl<'a> RowEnricher<'a> {
    pub fn new(tables: &'a TruckTables, projection: i64, target_soc: f64) -> Self {
        Self {
            tables,
            projection,
            target_soc,
        }
    }

    pub fn enrich(&self, mut records: Vec<ServiceRecord>) -> Vec<EnrichedRecord> {
        sort_by_vehicle_and_departure(&mut records);
        let next = next_service_times(&records);

        let enriched: Vec<EnrichedRecord> = records
            .into_iter()
            .zip(next)
            .map(|(record, next_service_time)| EnrichedRecord {
                soc_after: Some(soc_after(&record, self.tables, self.projection, self.target_soc)),
                next_service_time,
                record,
            })
            .collect();

        debug!(
            rows = enriched.len(),
            projection = self.projection,
            target_soc = self.target_soc,
            "enriched service records"
        );
        enriched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::LookupTable;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 6, 3)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn record(vehicle: &str, model: &str, dist: f64, departure: u32) -> ServiceRecord {
        ServiceRecord {
            vehicle_id: Some(vehicle.to_string()),
            model: model.to_string(),
            distance: Some(dist),
            departure: Some(at(departure)),
            ..Default::default()
        }
    }

    fn tables() -> TruckTables {
        TruckTables {
            capacity: [((0, "P"), 1000.0), ((0, "T"), 1000.0)].into_iter().collect(),
            consumption: [((0, "P"), 1.0), ((0, "T"), 2.0)].into_iter().collect(),
            charging_power: LookupTable::new(),
        }
    }

    #[test]
    fn test_next_service_time_basic() {
        let tables = tables();
        let enricher = RowEnricher::new(&tables, 0, 100.0);
        let out = enricher.enrich(vec![
            record("B", "T", 5.0, 9),
            record("A", "P", 20.0, 12),
            record("A", "P", 10.0, 8),
        ]);

        let ids: Vec<_> = out.iter().map(|e| e.record.vehicle_id.clone().unwrap()).collect();
        assert_eq!(ids, ["A", "A", "B"]);
        assert_eq!(out[0].next_service_time, Some(at(12)));
        assert_eq!(out[1].next_service_time, None);
        assert_eq!(out[2].next_service_time, None);
    }

    #[test]
    fn test_compute_soc_basic() {
        let tables = tables();
        let out = RowEnricher::new(&tables, 0, 100.0).enrich(vec![
            record("A", "P", 10.0, 1),
            record("A", "P", 20.0, 2),
            record("B", "T", 5.0, 1),
        ]);
        let socs: Vec<f64> = out.iter().map(|e| e.soc_after.unwrap()).collect();
        assert_eq!(socs, [99.0, 98.0, 99.0]);
    }

    #[test]
    fn test_soc_without_capacity_keeps_target() {
        let tables = tables();
        let r = record("A", "UNKNOWN", 500.0, 1);
        assert_eq!(soc_after(&r, &tables, 0, 80.0), 80.0);
    }

    #[test]
    fn test_soc_never_negative() {
        let tables = tables();
        let r = record("A", "T", 10_000.0, 1);
        assert_eq!(soc_after(&r, &tables, 0, 50.0), 0.0);
    }

    #[test]
    fn test_rows_without_vehicle_sort_last() {
        let mut anonymous = record("", "P", 1.0, 1);
        anonymous.vehicle_id = None;
        let mut records = vec![anonymous.clone(), record("Z", "P", 1.0, 3), anonymous];
        sort_by_vehicle_and_departure(&mut records);
        assert_eq!(records[0].vehicle_id.as_deref(), Some("Z"));
        assert_eq!(next_service_times(&records), [None, None, None]);
    }

    proptest! {
        #[test]
        fn prop_sorted_and_last_of_group_has_no_next(
            rows in prop::collection::vec((0u8..4, 0u32..24), 0..40)
        ) {
            let tables = tables();
            let records: Vec<ServiceRecord> = rows
                .iter()
                .map(|(v, h)| record(&format!("V{v}"), "P", 1.0, *h))
                .collect();
            let out = RowEnricher::new(&tables, 0, 100.0).enrich(records);

            for pair in out.windows(2) {
                let a = (&pair[0].record.vehicle_id, pair[0].record.departure);
                let b = (&pair[1].record.vehicle_id, pair[1].record.departure);
                prop_assert!(a <= b);
                if pair[0].record.vehicle_id != pair[1].record.vehicle_id {
                    prop_assert_eq!(pair[0].next_service_time, None);
                } else {
                    prop_assert_eq!(pair[0].next_service_time, pair[1].record.departure);
                }
            }
            if let Some(last) = out.last() {
                prop_assert_eq!(last.next_service_time, None);
            }
        }
    }
}
