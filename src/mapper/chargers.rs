use std::collections::HashSet;

use crate::domain::{Charger, Plug, RunDocument, ServiceRecord, Sharing, SharingConfig};
use crate::template::DEFAULT_CHARGER_TYPE;

pub const SYNTHETIC_PLUG_TYPE: &str = "Type Prise";
const ONLINE: &str = "online";

/// One dedicated charger per distinct vehicle, cloned from the template's
/// prototype charger.
///
/// Charger ids use the index of the first row seen for the vehicle; plug ids
/// use the vehicle id. Rows without a vehicle id are skipped.
pub fn build_chargers<'a>(
    records: impl IntoIterator<Item = &'a ServiceRecord>,
    template: &RunDocument,
    charger_pmax: Option<i64>,
    plug_pmax: Option<i64>,
) -> Vec<Charger> {
    let prototype = template.prototype_charger().unwrap_or_default();
    let mut seen = HashSet::new();
    let mut chargers = Vec::new();

    for (idx, record) in records.into_iter().enumerate() {
        let Some(vehicle) = record.vehicle_id.as_deref() else {
            continue;
        };
        if !seen.insert(vehicle.to_string()) {
            continue;
        }

        let name = format!("TR1_CH_{idx}");
        let plug = Plug {
            id: format!("PR_{vehicle}"),
            label: format!("{name}_P1"),
            state: ONLINE.to_string(),
            plug_type: SYNTHETIC_PLUG_TYPE.to_string(),
            p_max: plug_pmax.unwrap_or(0),
        };

        chargers.push(Charger {
            id: name.clone(),
            label: name,
            state: ONLINE.to_string(),
            p_max: charger_pmax.unwrap_or(0),
            charger_type: DEFAULT_CHARGER_TYPE.to_string(),
            sharing: Sharing {
                plug_count: 1,
                configs: vec![SharingConfig { shares: vec![100] }],
            },
            plugs: vec![plug],
            ..prototype.clone()
        });
    }

    chargers
}
