//! Maps enriched service records onto run documents.

pub mod chargers;
pub mod configuration;
pub mod vehicle;

pub use chargers::*;
pub use configuration::*;
pub use vehicle::*;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::aggregate::aggregate;
use crate::domain::{CurvePoint, EnrichedRecord, Infrastructure, ObservedWindow, RunDocument, RunParams};
use crate::error::Result;
use crate::lookup::TruckTables;

/// Read-only inputs shared by every record of a batch
#[derive(Debug, Clone, Copy)]
pub struct MappingContext<'a> {
    pub tables: &'a TruckTables,
    /// Base charging curve, before per-model scaling
    pub battery_profile: &'a [CurvePoint],
    pub infrastructure: Option<&'a Infrastructure>,
    pub window: ObservedWindow,
    pub params: &'a RunParams,
}

/// Plug-assignment generator: seeded when a seed is configured
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Map one record to a single-vehicle document.
///
/// The template is cloned, never modified.
pub fn map_record<R: Rng + ?Sized>(
    enriched: &EnrichedRecord,
    template: &RunDocument,
    ctx: &MappingContext<'_>,
    rng: &mut R,
) -> Result<RunDocument> {
    let mut doc = template.clone();

    doc.optim_choice = ctx
        .params
        .optim_choice
        .map(|choice| choice.to_string())
        .unwrap_or_default();
    doc.configuration = build_configuration(&template.configuration, ctx.params, &ctx.window)?;
    doc.sources = ctx
        .infrastructure
        .map(|infra| infra.sources.clone())
        .unwrap_or_default();

    let prototype = template.prototype_vehicle().cloned().unwrap_or_default();
    let vehicle = build_vehicle(
        &prototype,
        enriched,
        ctx,
        &doc.configuration.optim_end,
        rng,
    )?;
    debug!(vehicle = %vehicle.id, plug = %vehicle.plug_id, "mapped record");
    doc.vehicles = vec![vehicle];

    Ok(doc)
}

/// Map and aggregate a batch with an explicit generator.
///
/// Any record failing to map fails the whole batch. Infrastructure sources,
/// when present, replace the aggregated sources.
pub fn map_records_with<R: Rng + ?Sized>(
    records: &[EnrichedRecord],
    template: &RunDocument,
    ctx: &MappingContext<'_>,
    rng: &mut R,
) -> Result<Option<RunDocument>> {
    let documents = records
        .iter()
        .map(|record| map_record(record, template, ctx, &mut *rng))
        .collect::<Result<Vec<_>>>()?;

    let mut merged = aggregate(documents);
    if let (Some(doc), Some(infra)) = (merged.as_mut(), ctx.infrastructure) {
        doc.sources = infra.sources.clone();
    }

    info!(
        records = records.len(),
        vehicles = merged.as_ref().map_or(0, |d| d.vehicles.len()),
        "mapped batch"
    );
    Ok(merged)
}

/// Map and aggregate a batch, drawing plugs from [`seeded_rng`]
pub fn map_records(
    records: &[EnrichedRecord],
    template: &RunDocument,
    ctx: &MappingContext<'_>,
) -> Result<Option<RunDocument>> {
    let mut rng = seeded_rng(ctx.params.random_seed);
    map_records_with(records, template, ctx, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OptimChoice, ServiceRecord};
    use crate::error::Error;
    use crate::template::template;
    use serde_json::json;

    fn enriched(vehicle: &str) -> EnrichedRecord {
        EnrichedRecord::from(ServiceRecord {
            vehicle_id: Some(vehicle.to_string()),
            model: "P".to_string(),
            ..Default::default()
        })
    }

    fn single_plug_infrastructure() -> Infrastructure {
        serde_json::from_value(single_plug_sources()).unwrap()
    }

    fn single_plug_sources() -> serde_json::Value {
        json!({
            "sources": [{
                "id": "SRC",
                "transformateurs": [{
                    "id": "T1",
                    "chargeurs": [{
                        "id": "C1",
                        "typeChargeur": "TypeChargeur_valeur",
                        "prises": [{"id": "P1", "typePrise": "CCS COMBO2"}]
                    }]
                }]
            }]
        })
    }

    fn context<'a>(
        tables: &'a TruckTables,
        params: &'a RunParams,
        infra: Option<&'a Infrastructure>,
    ) -> MappingContext<'a> {
        MappingContext {
            tables,
            battery_profile: &[],
            infrastructure: infra,
            window: ObservedWindow::default(),
            params,
        }
    }

    #[test]
    fn test_map_record_leaves_template_untouched() {
        let tables = TruckTables::default();
        let params = RunParams {
            optim_choice: Some(OptimChoice::LissagePuissance),
            ..Default::default()
        };
        let base = template();
        let doc = map_record(
            &enriched("1"),
            &base,
            &context(&tables, &params, None),
            &mut seeded_rng(Some(1)),
        )
        .unwrap();

        assert_eq!(base, template());
        assert_eq!(doc.optim_choice, "LissagePuissance");
        assert!(doc.sources.is_empty());
        assert_eq!(doc.vehicles.len(), 1);
        assert_eq!(doc.vehicles[0].id, "1");
        assert_eq!(doc.configuration.degraded_axes, vec![1, 2, 3]);
    }

    #[test]
    fn test_map_record_uses_infrastructure_sources() {
        let tables = TruckTables::default();
        let params = RunParams::default();
        let infra = single_plug_infrastructure();
        let doc = map_record(
            &enriched("1"),
            &template(),
            &context(&tables, &params, Some(&infra)),
            &mut seeded_rng(Some(1)),
        )
        .unwrap();
        assert_eq!(doc.sources, infra.sources);
        assert_eq!(doc.vehicles[0].plug_id, "P1");
        assert_eq!(doc.optim_choice, "");
    }

    #[test]
    fn test_map_records_shares_single_plug() {
        let tables = TruckTables::default();
        let params = RunParams {
            random_seed: Some(3),
            ..Default::default()
        };
        let infra = single_plug_infrastructure();
        let records = vec![enriched("1"), enriched("1"), enriched("2")];

        let doc = map_records(&records, &template(), &context(&tables, &params, Some(&infra)))
            .unwrap()
            .unwrap();
        assert_eq!(doc.vehicles.len(), 3);
        assert!(doc.vehicles.iter().all(|v| v.plug_id == "P1"));
        assert_eq!(doc.sources, infra.sources);
    }

    #[test]
    fn test_map_records_passes_partial_sources_through() {
        let tables = TruckTables::default();
        let params = RunParams::default();
        let infra = single_plug_infrastructure();
        let records = vec![enriched("1"), enriched("2")];

        let doc = map_records(&records, &template(), &context(&tables, &params, Some(&infra)))
            .unwrap()
            .unwrap();
        let out = serde_json::to_value(&doc).unwrap();
        assert_eq!(out["sources"], single_plug_sources()["sources"]);
        assert!(out["sources"][0].get("libelle").is_none());
        assert!(doc.vehicles.iter().all(|v| v.plug_id == "P1"));
    }

    #[test]
    fn test_map_records_empty_batch() {
        let tables = TruckTables::default();
        let params = RunParams::default();
        let doc = map_records(&[], &template(), &context(&tables, &params, None)).unwrap();
        assert!(doc.is_none());
    }

    #[test]
    fn test_map_records_fails_whole_batch() {
        let tables = TruckTables::default();
        let params = RunParams {
            start: Some("not a date".to_string()),
            ..Default::default()
        };
        let result = map_records(
            &[enriched("1"), enriched("2")],
            &template(),
            &context(&tables, &params, None),
        );
        assert!(matches!(result, Err(Error::InvalidTimestamp { .. })));
    }
}
