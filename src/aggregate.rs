use std::collections::HashSet;

use serde_json::Value;

use crate::domain::{RunDocument, CHARGERS_KEY, TRANSFORMERS_KEY};

/// Chargers under the first source's first transformer, if any
fn first_chargers(doc: &RunDocument) -> Option<&Vec<Value>> {
    doc.sources
        .first()?
        .get(TRANSFORMERS_KEY)?
        .get(0)?
        .get(CHARGERS_KEY)?
        .as_array()
}

/// Non-blank charger id, numbers included
fn charger_id(charger: &Value) -> Option<String> {
    match charger.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Merge single-vehicle documents into one.
///
/// Metadata, configuration and sources come from the first document.
/// Vehicles are concatenated in input order, and the chargers found under
/// every document's first source and transformer are deduplicated by id
/// (first occurrence wins; blank ids are dropped). `None` for no input.
pub fn aggregate(documents: impl IntoIterator<Item = RunDocument>) -> Option<RunDocument> {
    let mut documents = documents.into_iter();
    let mut merged = documents.next()?;

    let mut seen = HashSet::new();
    let mut chargers: Vec<Value> = Vec::new();
    let mut collect = |doc: &RunDocument| {
        for charger in first_chargers(doc).into_iter().flatten() {
            if let Some(id) = charger_id(charger) {
                if seen.insert(id) {
                    chargers.push(charger.clone());
                }
            }
        }
    };

    collect(&merged);
    for doc in documents {
        collect(&doc);
        merged.vehicles.extend(doc.vehicles);
    }

    if let Some(transformer) = merged
        .sources
        .first_mut()
        .and_then(|s| s.get_mut(TRANSFORMERS_KEY))
        .and_then(|t| t.get_mut(0))
        .and_then(Value::as_object_mut)
    {
        transformer.insert(CHARGERS_KEY.to_string(), Value::Array(chargers));
    }

    Some(merged)
}
