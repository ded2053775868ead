//! End-to-end run: rows on disk to a run document on disk.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::Config;
use crate::domain::{parse_bound, Infrastructure, ObservedWindow, RunDocument, RunParams, ServiceRecord};
use crate::enrich::RowEnricher;
use crate::error::Result;
use crate::mapper::{map_records, MappingContext};
use crate::source::{
    filter_by_departure_day, filter_by_mode, load_battery_profile, load_truck_tables, read_rows,
};
use crate::template::template_ref;
use crate::validation::{run_document_schema, validate, validate_bounds};

pub const DEFAULT_OUTPUT_FILE: &str = "result.json";

/// Run parameters with the input date bounds used as optimisation bounds
/// when none are set explicitly.
pub fn effective_params(config: &Config) -> RunParams {
    let mut params = config.run.clone();
    if params.start.is_none() {
        params.start = config.input.start.clone();
    }
    if params.end.is_none() {
        params.end = config.input.end.clone();
    }
    params
}

/// Build the run document described by `config` and write it out when an
/// output path is configured.
///
/// `None` means no record survived filtering; `{}` is written in that case.
pub fn run(config: &Config) -> Result<Option<RunDocument>> {
    let input = &config.input;
    let params = effective_params(config);

    let rows = read_rows(&input.service_records)?;
    let all_records: Vec<ServiceRecord> = rows.iter().map(ServiceRecord::from_row).collect();
    let window = ObservedWindow::from_records(&all_records);
    info!(rows = rows.len(), observed_min = %window.min, observed_max = %window.max, "read service records");

    let rows = filter_by_mode(rows, input.mode_filter());
    let records: Vec<ServiceRecord> = rows.iter().map(ServiceRecord::from_row).collect();
    let day_start = parse_bound("start", input.start.as_deref())?;
    let day_end = parse_bound("end", input.end.as_deref())?;
    let records = filter_by_departure_day(records, day_start, day_end);

    if records.is_empty() {
        warn!(mode = %input.mode, "no service record left after filtering");
        if let Some(path) = &config.output.path {
            write_output(None, path)?;
        }
        return Ok(None);
    }

    if config.output.enforce_window {
        if let (Some(start), Some(end)) = params.optim_bounds()? {
            validate_bounds(start, end, window.min, window.max)?;
        }
    }

    let tables = load_truck_tables(&input.truck_data)?;
    let profile = load_battery_profile(&input.battery_profile)?;
    let infrastructure = input.infrastructure.as_ref().and_then(Infrastructure::load_lenient);

    let enriched = RowEnricher::new(&tables, params.projection, params.target_soc).enrich(records);
    let ctx = MappingContext {
        tables: &tables,
        battery_profile: &profile,
        infrastructure: infrastructure.as_ref(),
        window,
        params: &params,
    };
    let document = map_records(&enriched, template_ref(), &ctx)?;

    if config.output.validate_schema {
        if let Some(doc) = &document {
            validate(&serde_json::to_value(doc)?, run_document_schema())?;
        }
    }

    if let Some(path) = &config.output.path {
        write_output(document.as_ref(), path)?;
    }

    Ok(document)
}

/// Write the document as pretty JSON; a directory receives `result.json`.
///
/// Returns the path actually written.
pub fn write_output(document: Option<&RunDocument>, path: impl AsRef<Path>) -> Result<PathBuf> {
    let mut path = path.as_ref().to_path_buf();
    if path.is_dir() {
        path.push(DEFAULT_OUTPUT_FILE);
    }

    let text = match document {
        Some(doc) => serde_json::to_string_pretty(doc)?,
        None => "{}".to_string(),
    };
    std::fs::write(&path, text)?;

    info!(path = %path.display(), "wrote run document");
    Ok(path)
}
