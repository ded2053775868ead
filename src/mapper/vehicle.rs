use chrono::{Duration, NaiveDateTime};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::domain::time::{format_iso_z, minutes_to_hhmm, parse_iso_datetime, shift_minutes};
use crate::domain::{ChargerModel, CurvePoint, EnrichedRecord, Infrastructure, Vehicle, VehicleLabel};
use crate::error::{Error, Result};

use super::MappingContext;

/// Hours added to `finOptim` when a vehicle has no next service
pub const FALLBACK_SERVICE_START_HOURS: i64 = 36;

// ============================================================================
// Battery profile
// ============================================================================

/// Rescale a charging curve so that its peak equals `power` (kW).
///
/// The curve is returned as-is when no power is known or its peak is zero.
pub fn scale_profile(profile: &[CurvePoint], power: Option<f64>) -> Vec<CurvePoint> {
    let max_y = profile.iter().map(|p| p.y).max().unwrap_or(0);
    match power {
        Some(power) if max_y != 0 => {
            let alpha = power / max_y as f64;
            profile
                .iter()
                .map(|p| CurvePoint {
                    x: p.x,
                    y: (alpha * p.y as f64) as i64,
                })
                .collect()
        }
        _ => profile.to_vec(),
    }
}

// ============================================================================
// Plug assignment
// ============================================================================

/// Synthesized plug id used when no infrastructure is described
pub fn synthetic_plug_id(vehicle_id: &str) -> String {
    format!("TR1_CH_{vehicle_id}_P1")
}

/// Pick a plug for the vehicle.
///
/// With an infrastructure, one (charger, plug) pair is drawn uniformly. A
/// non-empty charger type is copied onto the vehicle, and so is the plug
/// type whenever the plug declares one, blank included.
pub fn assign_plug<R: Rng + ?Sized>(
    vehicle: &mut Vehicle,
    infrastructure: Option<&Infrastructure>,
    vehicle_id: Option<&str>,
    rng: &mut R,
) {
    vehicle.plug_id.clear();

    let Some(infrastructure) = infrastructure else {
        if let Some(id) = vehicle_id {
            vehicle.plug_id = synthetic_plug_id(id);
        }
        return;
    };

    let slots = infrastructure.plug_slots();
    let Some(slot) = slots.choose(rng) else {
        debug!("infrastructure has no plug to assign");
        return;
    };

    vehicle.plug_id = slot.plug_id();
    if let Some(charger_type) = slot.charger_type() {
        match vehicle.charger_models.first_mut() {
            Some(model) => model.model = charger_type,
            None => vehicle.charger_models.push(ChargerModel { model: charger_type }),
        }
    }
    if let Some(plug_type) = slot.plug_type() {
        vehicle.plug_type = plug_type;
    }
}

// ============================================================================
// Vehicle block
// ============================================================================

fn truncate(value: f64) -> i64 {
    value.trunc() as i64
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `finOptim + 1.5 days`, or an error when `finOptim` is not a timestamp
fn fallback_service_start(optim_end: &str) -> Result<NaiveDateTime> {
    parse_iso_datetime(optim_end)
        .map(|end| end + Duration::hours(FALLBACK_SERVICE_START_HOURS))
        .ok_or_else(|| Error::InvalidTimestamp {
            field: "finOptim".to_string(),
            value: optim_end.to_string(),
        })
}

/// Fill the vehicle entry for one enriched record.
///
/// `optim_end` is the already computed `finOptim` of the same document.
pub fn build_vehicle<R: Rng + ?Sized>(
    prototype: &Vehicle,
    enriched: &EnrichedRecord,
    ctx: &MappingContext<'_>,
    optim_end: &str,
    rng: &mut R,
) -> Result<Vehicle> {
    let record = &enriched.record;
    let params = ctx.params;
    let projection = params.projection;
    let model = record.model.as_str();
    let vehicle_id = record.vehicle_id.as_deref();

    let mut vehicle = prototype.clone();

    vehicle.battery_capacity = truncate(ctx.tables.capacity_kwh(projection, model));
    assign_plug(&mut vehicle, ctx.infrastructure, vehicle_id, rng);
    vehicle.boost_mode = 0;
    vehicle.battery_profile = scale_profile(
        ctx.battery_profile,
        ctx.tables.charging_power_kw(projection, model),
    );

    vehicle.soc = enriched
        .soc_after
        .or(record.soc)
        .map(truncate)
        .unwrap_or(0);
    vehicle.soc_target = truncate(record.soc_target.unwrap_or(params.target_soc));

    if let Some(distance) = record.distance {
        vehicle.service_duration = truncate(distance);
    }

    // Margins that push a time out of range leave the field empty
    vehicle.service_end = record
        .arrival
        .and_then(|arrival| shift_minutes(arrival, params.unloading_min.unwrap_or(0.0)))
        .map(format_iso_z)
        .unwrap_or_default();

    if let Some(next) = enriched.next_service_time {
        let lead = params.loading_min.unwrap_or(0.0) + record.safety_margin_min.unwrap_or(0.0);
        vehicle.service_start = shift_minutes(next, -lead)
            .map(format_iso_z)
            .unwrap_or_default();
    } else if params.default_service_start.is_some() {
        vehicle.service_start = format_iso_z(fallback_service_start(optim_end)?);
    }

    if let Some(id) = vehicle_id {
        vehicle.id = id.to_string();
    }

    let label = VehicleLabel {
        fleet_number: vehicle_id.unwrap_or_default().to_string(),
        service_start: vehicle.service_start.clone(),
        safety_margin: minutes_to_hhmm(params.safety_margin_min),
        preheat_margin: minutes_to_hhmm(params.preheat_margin_min),
        consumption: round2(ctx.tables.consumption_kwh_per_km(projection, model)),
    };
    vehicle.label = serde_json::to_string(&label)?;

    Ok(vehicle)
}
