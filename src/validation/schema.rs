//! Declarative shape checks over JSON values.
//!
//! A schema is a tree of [`Schema`] nodes: objects require every listed key,
//! lists apply one element schema to every item, kinds check the JSON type,
//! and predicates run an arbitrary check. Walking stops at the first failure.

use itertools::Itertools;
use once_cell::sync::Lazy;
use serde_json::Value;
use strum::Display;

use crate::domain::time::{parse_iso_date, parse_iso_datetime};
use crate::error::SchemaError;

/// JSON value kinds a leaf can require
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Kind {
    Str,
    Int,
    Float,
    Bool,
}

impl Kind {
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Kind::Str => value.is_string(),
            Kind::Int => value.is_i64() || value.is_u64(),
            Kind::Float => value.is_f64(),
            Kind::Bool => value.is_boolean(),
        }
    }
}

pub type Predicate = fn(&Value) -> bool;

#[derive(Debug, Clone)]
pub enum Schema {
    Object(Vec<(&'static str, Schema)>),
    List(Box<Schema>),
    Kinds(&'static [Kind]),
    Predicate(Predicate),
}

impl Schema {
    pub fn object(fields: impl IntoIterator<Item = (&'static str, Schema)>) -> Self {
        Schema::Object(fields.into_iter().collect())
    }

    pub fn list(item: Schema) -> Self {
        Schema::List(Box::new(item))
    }

    pub fn str() -> Self {
        Schema::Kinds(&[Kind::Str])
    }

    pub fn int() -> Self {
        Schema::Kinds(&[Kind::Int])
    }

    /// Integer or float
    pub fn number() -> Self {
        Schema::Kinds(&[Kind::Int, Kind::Float])
    }
}

fn child(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{path}.{segment}")
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "value".to_string()
    } else {
        path.to_string()
    }
}

fn walk(value: &Value, schema: &Schema, path: &str) -> Result<(), SchemaError> {
    match schema {
        Schema::Object(fields) => {
            let Some(object) = value.as_object() else {
                return Err(SchemaError::NotAnObject {
                    path: display_path(path),
                });
            };
            for (key, sub) in fields {
                let key_path = child(path, key);
                let Some(field) = object.get(*key) else {
                    return Err(SchemaError::MissingKey { path: key_path });
                };
                walk(field, sub, &key_path)?;
            }
            Ok(())
        }
        Schema::List(item) => {
            let Some(items) = value.as_array() else {
                return Err(SchemaError::NotAList {
                    path: display_path(path),
                });
            };
            items
                .iter()
                .enumerate()
                .try_for_each(|(idx, v)| walk(v, item, &child(path, &format!("[{idx}]"))))
        }
        Schema::Kinds(kinds) => {
            if kinds.iter().any(|k| k.matches(value)) {
                Ok(())
            } else {
                Err(SchemaError::TypeMismatch {
                    path: display_path(path),
                    expected: kinds.iter().join(" or "),
                })
            }
        }
        Schema::Predicate(check) => {
            if check(value) {
                Ok(())
            } else {
                Err(SchemaError::InvalidValue {
                    path: display_path(path),
                })
            }
        }
    }
}

/// Validate `value` against `schema`, reporting the first mismatch
pub fn validate(value: &Value, schema: &Schema) -> Result<(), SchemaError> {
    walk(value, schema, "")
}

/// ISO 8601 date-time text; the empty string is accepted
pub fn is_iso_datetime(value: &Value) -> bool {
    match value.as_str() {
        Some("") => true,
        Some(text) => parse_iso_datetime(text).is_some(),
        None => false,
    }
}

/// Strict `YYYY-MM-DD` text
pub fn is_iso_date(value: &Value) -> bool {
    value.as_str().and_then(parse_iso_date).is_some()
}

// ============================================================================
// Run document schema
// ============================================================================

static RUN_DOCUMENT_SCHEMA: Lazy<Schema> = Lazy::new(build_run_document_schema);

/// Schema every produced run document must satisfy
pub fn run_document_schema() -> &'static Schema {
    &RUN_DOCUMENT_SCHEMA
}

fn efficiency_curve() -> Schema {
    Schema::list(Schema::object([("x", Schema::int()), ("y", Schema::number())]))
}

fn build_run_document_schema() -> Schema {
    let configuration = Schema::object([
        ("activationRendement", Schema::str()),
        ("axeOptimDegrade", Schema::list(Schema::int())),
        ("diminutionSOC", Schema::int()),
        ("pasDeTemps", Schema::int()),
        ("maximumExecTemps", Schema::int()),
        ("debutOptim", Schema::Predicate(is_iso_datetime)),
        ("finOptim", Schema::Predicate(is_iso_datetime)),
    ]);

    let tariff_band = Schema::object([
        ("id", Schema::str()),
        ("cout", Schema::number()),
        ("dateDebut", Schema::Predicate(is_iso_date)),
        ("dateFin", Schema::Predicate(is_iso_date)),
        (
            "heureTranche",
            Schema::list(Schema::object([("debut", Schema::int()), ("fin", Schema::int())])),
        ),
    ]);

    let plug = Schema::object([
        ("id", Schema::str()),
        ("libelle", Schema::str()),
        ("etat", Schema::str()),
        ("typePrise", Schema::str()),
        ("pMax", Schema::int()),
    ]);

    let charger = Schema::object([
        ("id", Schema::str()),
        ("libelle", Schema::str()),
        ("etat", Schema::str()),
        ("pMax", Schema::int()),
        ("typeChargeur", Schema::str()),
        (
            "mutualisation",
            Schema::object([
                ("nombrePrises", Schema::int()),
                (
                    "configsMutualisation",
                    Schema::list(Schema::object([(
                        "configMutualisation",
                        Schema::list(Schema::int()),
                    )])),
                ),
            ]),
        ),
        ("rendement", efficiency_curve()),
        ("prises", Schema::list(plug)),
    ]);

    let transformer = Schema::object([
        ("id", Schema::str()),
        ("libelle", Schema::str()),
        ("etat", Schema::str()),
        ("rendement", efficiency_curve()),
        ("facteurPuissance", Schema::number()),
        ("pMax", Schema::int()),
        ("chargeurs", Schema::list(charger)),
    ]);

    let source = Schema::object([
        ("id", Schema::str()),
        ("libelle", Schema::str()),
        ("pMax", Schema::list(Schema::int())),
        ("tranches", Schema::list(tariff_band)),
        ("transformateurs", Schema::list(transformer)),
    ]);

    let vehicle = Schema::object([
        ("id", Schema::str()),
        ("capaciteBatterie", Schema::int()),
        ("idPrise", Schema::str()),
        ("libelle", Schema::str()),
        ("modeBoost", Schema::int()),
        (
            "typeChargeur",
            Schema::list(Schema::object([("modeleChargeur", Schema::str())])),
        ),
        ("typePrise", Schema::str()),
        (
            "profilBatterie",
            Schema::list(Schema::object([("x", Schema::int()), ("y", Schema::int())])),
        ),
        ("soc", Schema::int()),
        ("socCible", Schema::int()),
        ("dureeService", Schema::int()),
        ("finService", Schema::Predicate(is_iso_datetime)),
        ("debutService", Schema::Predicate(is_iso_datetime)),
    ]);

    Schema::object([
        ("idRun", Schema::str()),
        ("synthese", Schema::list(Schema::str())),
        ("configuration", configuration),
        (
            "rapport",
            Schema::object([("url", Schema::str()), ("resultUrl", Schema::str())]),
        ),
        ("sources", Schema::list(source)),
        ("vehicules", Schema::list(vehicle)),
    ])
}
