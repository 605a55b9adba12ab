//! Parameter conversion tables.
//!
//! Every endpoint that forwards parameters names an explicit table of
//! `source → target` rules. Keys missing from the table are rejected.

use serde_json::{Map, Number, Value};
use strum::Display;
use thiserror::Error;

/// Query string pairs sent to CMR, in insertion order.
pub type CmrParams = Vec<(String, String)>;

pub type ConversionMap = &'static [ParamRule];

#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
    #[error("Error converting parameter: unknown parameter '{0}'")]
    Unknown(String),

    #[error("Error converting parameter '{name}': {reason}")]
    Invalid { name: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Transform {
    Identity,
    /// Integer of at least 1, from a number or its text.
    PositiveInteger,
    /// `"w,s,e,n"` text into an array of numbers.
    Ordinates,
    /// Array of scalars into `"a,b,c"` text.
    JoinComma,
    /// GeoJSON text into a JSON object.
    GeoJson,
    /// First ring of a GeoJSON polygon into CMR's flat `lon,lat,...` list.
    PolygonRing,
}

#[derive(Debug, Clone, Copy)]
pub struct ParamRule {
    pub source: &'static str,
    pub target: &'static str,
    pub transform: Transform,
}

const fn rule(source: &'static str, target: &'static str, transform: Transform) -> ParamRule {
    ParamRule {
        source,
        target,
        transform,
    }
}

/// Query string of `GET /stac/search` into STAC search parameters.
pub static STAC_QUERY_PARAMS_CONVERSION_MAP: ConversionMap = &[
    rule("limit", "limit", Transform::PositiveInteger),
    rule("page", "page", Transform::PositiveInteger),
    rule("bbox", "bbox", Transform::Ordinates),
    rule("time", "time", Transform::Identity),
    rule("datetime", "time", Transform::Identity),
    rule("collectionId", "collectionId", Transform::Identity),
    rule("collections", "collectionId", Transform::Identity),
    rule("intersects", "intersects", Transform::GeoJson),
];

/// STAC search parameters into CMR granule search parameters.
pub static STAC_SEARCH_PARAMS_CONVERSION_MAP: ConversionMap = &[
    rule("bbox", "bounding_box", Transform::JoinComma),
    rule("time", "temporal", Transform::Identity),
    rule("datetime", "temporal", Transform::Identity),
    rule("intersects", "polygon", Transform::PolygonRing),
    rule("collectionId", "collection_concept_id", Transform::Identity),
    rule("collections", "collection_concept_id", Transform::Identity),
    rule("limit", "page_size", Transform::PositiveInteger),
    rule("page", "page_num", Transform::PositiveInteger),
];

/// Renames and reshapes `params` according to `map`.
pub fn convert_params(
    map: ConversionMap,
    params: &Map<String, Value>,
) -> Result<Map<String, Value>, ParamError> {
    let mut converted = Map::new();
    for (name, value) in params {
        let rule = map
            .iter()
            .find(|r| r.source == name)
            .ok_or_else(|| ParamError::Unknown(name.clone()))?;
        let value = apply(rule.transform, value).map_err(|reason| ParamError::Invalid {
            name: name.clone(),
            reason,
        })?;
        converted.insert(rule.target.to_string(), value);
    }
    Ok(converted)
}

/// Flattens converted parameters into query pairs. Arrays repeat the key.
pub fn to_cmr_params(params: &Map<String, Value>) -> CmrParams {
    let mut pairs = CmrParams::new();
    for (name, value) in params {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    if let Some(text) = scalar_text(item) {
                        pairs.push((name.clone(), text));
                    }
                }
            }
            other => {
                if let Some(text) = scalar_text(other) {
                    pairs.push((name.clone(), text));
                }
            }
        }
    }
    pairs
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

fn apply(transform: Transform, value: &Value) -> Result<Value, String> {
    match transform {
        Transform::Identity => Ok(value.clone()),
        Transform::PositiveInteger => {
            let number = match value {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.trim().parse::<u64>().ok(),
                _ => None,
            };
            number
                .filter(|n| *n > 0)
                .map(Value::from)
                .ok_or_else(|| format!("expected a positive integer, got {}", value))
        }
        Transform::Ordinates => match value {
            Value::String(s) => s
                .split(',')
                .map(|part| parse_number(part.trim()))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Value::Array(items) if items.iter().all(Value::is_number) => Ok(value.clone()),
            other => Err(format!("expected comma separated numbers, got {}", other)),
        },
        Transform::JoinComma => match value {
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Number(n) => Ok(n.to_string()),
                    Value::String(s) => Ok(s.clone()),
                    other => Err(format!("cannot join {}", other)),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(|parts| Value::String(parts.join(","))),
            Value::String(_) => Ok(value.clone()),
            other => Err(format!("expected an array, got {}", other)),
        },
        Transform::GeoJson => match value {
            Value::String(s) => {
                serde_json::from_str::<Value>(s).map_err(|e| format!("invalid GeoJSON: {}", e))
            }
            Value::Object(_) => Ok(value.clone()),
            other => Err(format!("expected GeoJSON, got {}", other)),
        },
        Transform::PolygonRing => {
            let geometry = match value {
                Value::String(s) => serde_json::from_str::<Value>(s)
                    .map_err(|e| format!("invalid GeoJSON: {}", e))?,
                other => other.clone(),
            };
            polygon_ring(&geometry).map(Value::String)
        }
    }
}

fn parse_number(text: &str) -> Result<Value, String> {
    if let Ok(i) = text.parse::<i64>() {
        return Ok(Value::from(i));
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| format!("'{}' is not a number", text))
}

fn polygon_ring(geometry: &Value) -> Result<String, String> {
    let coordinates = geometry
        .get("coordinates")
        .ok_or_else(|| "geometry has no coordinates".to_string())?;
    let ring = match geometry.get("type").and_then(Value::as_str) {
        Some("Polygon") => coordinates.get(0),
        Some("MultiPolygon") => coordinates.get(0).and_then(|p| p.get(0)),
        Some(other) => return Err(format!("unsupported geometry type '{}'", other)),
        None => return Err("geometry has no type".to_string()),
    }
    .and_then(Value::as_array)
    .ok_or_else(|| "polygon has no outer ring".to_string())?;

    let mut ordinates = Vec::with_capacity(ring.len() * 2);
    for position in ring {
        let pair = position
            .as_array()
            .filter(|p| p.len() >= 2)
            .ok_or_else(|| format!("invalid position {}", position))?;
        for ordinate in &pair[..2] {
            match ordinate {
                Value::Number(n) => ordinates.push(n.to_string()),
                other => return Err(format!("invalid ordinate {}", other)),
            }
        }
    }
    Ok(ordinates.join(","))
}
