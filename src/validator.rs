//! STAC schema validation of outgoing documents.

use anyhow::{Result, anyhow};
use jsonschema::{Draft, JSONSchema};
use serde_json::Value;

const CATALOG_SCHEMA: &str = include_str!("../schemas/catalog.json");
const ITEM_COLLECTION_SCHEMA: &str = include_str!("../schemas/item-collection.json");

pub trait Validator: Send + Sync {
    /// Returns the reasons `document` is not valid STAC, empty when it is.
    fn validation_errors(&self, document: &Value) -> Vec<String>;

    fn validate_stac(&self, document: &Value) -> bool {
        self.validation_errors(document).is_empty()
    }
}

/// Validates Catalog and FeatureCollection documents against bundled schemas,
/// picking the schema from the document's `type`.
pub struct SchemaValidator {
    catalog: JSONSchema,
    item_collection: JSONSchema,
}

impl SchemaValidator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            catalog: compile(CATALOG_SCHEMA)?,
            item_collection: compile(ITEM_COLLECTION_SCHEMA)?,
        })
    }
}

fn compile(source: &str) -> Result<JSONSchema> {
    let schema: Value = serde_json::from_str(source)?;
    JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(&schema)
        .map_err(|e| anyhow!("invalid bundled schema: {}", e))
}

impl Validator for SchemaValidator {
    fn validation_errors(&self, document: &Value) -> Vec<String> {
        let schema = match document.get("type").and_then(Value::as_str) {
            Some("Catalog") => &self.catalog,
            Some("FeatureCollection") => &self.item_collection,
            Some(other) => return vec![format!("unsupported STAC type '{}'", other)],
            None => return vec!["document has no type".to_string()],
        };

        match schema.validate(document) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|e| format!("{}: {}", e.instance_path, e))
                .collect(),
        }
    }
}
