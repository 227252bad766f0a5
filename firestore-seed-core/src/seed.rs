//! Typed model of a seed tree.
//!
//! A seed file is parsed once into a [`SeedDocument`]; every structural check
//! happens here, so a malformed source is rejected before any of its
//! documents are written.
//!
//! ```text
//! { "appId"?: string,
//!   "demoApps": { "collections": { <collection>: { <docId>: <body> } } } }
//! ```
//!
//! A body that is a JSON object may carry a reserved `collections` key holding
//! nested collections; any other body (string, number, boolean, array) is
//! stored under the single field `value`.

use serde_json::{Map, Value};
use tracing::debug;

use crate::contract::Fields;
use crate::error::SeedError;

/// Sentinel replaced by the resolved application identifier.
pub const APP_ID_PLACEHOLDER: &str = "APP_ID_GUID";
/// Root key of the seed format.
pub const ROOT_KEY: &str = "demoApps";
/// Reserved document key holding nested collections.
pub const COLLECTIONS_KEY: &str = "collections";
/// Optional root key carrying an embedded application identifier.
pub const APP_ID_KEY: &str = "appId";
/// Field name used to store non-object document bodies.
pub const WRAPPED_VALUE_KEY: &str = "value";

/// Parsed root of one seed source.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedDocument {
    pub app_id: Option<String>,
    pub collections: CollectionMap,
}

/// Collection name to documents, in authoring order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionMap {
    pub collections: Vec<Collection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub name: String,
    pub documents: Vec<Document>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Identifier as written in the seed; may be the placeholder.
    pub raw_id: String,
    pub body: DocumentBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentBody {
    /// An object body: plain fields plus optional nested collections.
    Fields {
        fields: Fields,
        collections: Option<CollectionMap>,
    },
    /// A primitive or array body, stored as `{ "value": .. }`.
    Wrapped(Value),
}

/// Structural problem found while parsing, before the source name is attached.
#[derive(Debug)]
struct ShapeError {
    location: String,
    reason: String,
}

impl ShapeError {
    fn new(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            reason: reason.into(),
        }
    }

    fn into_seed_error(self, source_name: &str) -> SeedError {
        SeedError::MalformedSeed {
            source_name: source_name.to_string(),
            location: self.location,
            reason: self.reason,
        }
    }
}

impl SeedDocument {
    /// Validate and convert a parsed seed tree. `source_name` labels errors.
    pub fn from_value(tree: Value, source_name: &str) -> Result<Self, SeedError> {
        let mut root = match tree {
            Value::Object(map) => map,
            other => {
                return Err(ShapeError::new("<root>", format!("expected an object, found {}", kind(&other)))
                    .into_seed_error(source_name))
            }
        };

        let app_id = match root.remove(APP_ID_KEY) {
            None | Some(Value::Null) => None,
            Some(Value::String(id)) => Some(id),
            Some(other) => {
                return Err(ShapeError::new(APP_ID_KEY, format!("expected a string, found {}", kind(&other)))
                    .into_seed_error(source_name))
            }
        };

        let root_collections = root
            .remove(ROOT_KEY)
            .and_then(|apps| match apps {
                Value::Object(mut apps) => apps.remove(COLLECTIONS_KEY),
                _ => None,
            })
            .ok_or_else(|| {
                ShapeError::new(
                    format!("{ROOT_KEY}.{COLLECTIONS_KEY}"),
                    "seed file missing root demoApps.collections",
                )
                .into_seed_error(source_name)
            })?;

        let root_location = format!("{ROOT_KEY}.{COLLECTIONS_KEY}");
        let collections = match root_collections {
            Value::Object(map) => CollectionMap::from_map(map, "")
                .map_err(|e| e.into_seed_error(source_name))?,
            other => {
                return Err(ShapeError::new(root_location, format!("expected an object, found {}", kind(&other)))
                    .into_seed_error(source_name))
            }
        };

        debug!(
            source = source_name,
            embedded_app_id = app_id.is_some(),
            documents = collections.document_count(),
            "Parsed seed document"
        );

        Ok(Self {
            app_id,
            collections,
        })
    }
}

impl CollectionMap {
    fn from_map(map: Map<String, Value>, parent: &str) -> Result<Self, ShapeError> {
        let mut collections = Vec::with_capacity(map.len());
        for (name, documents) in map {
            let location = join_location(parent, &name);
            check_segment(&name, &location, "collection name")?;
            let documents = match documents {
                Value::Object(documents) => documents,
                other => {
                    return Err(ShapeError::new(
                        location,
                        format!("expected a map of documents, found {}", kind(&other)),
                    ))
                }
            };
            let mut parsed = Vec::with_capacity(documents.len());
            for (raw_id, body) in documents {
                let doc_location = join_location(&location, &raw_id);
                check_segment(&raw_id, &doc_location, "document id")?;
                let body = DocumentBody::from_value(body, &doc_location)?;
                parsed.push(Document { raw_id, body });
            }
            collections.push(Collection {
                name,
                documents: parsed,
            });
        }
        Ok(Self { collections })
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Number of documents in this map and every nested map.
    pub fn document_count(&self) -> usize {
        self.collections
            .iter()
            .flat_map(|c| c.documents.iter())
            .map(|d| 1 + d.body.nested().map_or(0, CollectionMap::document_count))
            .sum()
    }

    /// Every (collection, document) pair at this level.
    pub fn documents(&self) -> impl Iterator<Item = (&Collection, &Document)> {
        self.collections
            .iter()
            .flat_map(|c| c.documents.iter().map(move |d| (c, d)))
    }
}

impl DocumentBody {
    fn from_value(value: Value, location: &str) -> Result<Self, ShapeError> {
        match value {
            Value::Null => Err(ShapeError::new(location, "document body is null")),
            Value::Object(mut fields) => {
                let collections = match fields.shift_remove(COLLECTIONS_KEY) {
                    None | Some(Value::Null) => None,
                    Some(Value::Object(nested)) => Some(CollectionMap::from_map(nested, location)?),
                    Some(other) => {
                        return Err(ShapeError::new(
                            join_location(location, COLLECTIONS_KEY),
                            format!("expected a map of collections, found {}", kind(&other)),
                        ))
                    }
                };
                Ok(DocumentBody::Fields {
                    fields,
                    collections,
                })
            }
            wrapped @ (Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Array(_)) => {
                Ok(DocumentBody::Wrapped(wrapped))
            }
        }
    }

    /// Field payload before substitution, normalized to a map.
    pub fn fields(&self) -> Fields {
        match self {
            DocumentBody::Fields { fields, .. } => fields.clone(),
            DocumentBody::Wrapped(value) => {
                let mut fields = Map::new();
                fields.insert(WRAPPED_VALUE_KEY.to_string(), value.clone());
                fields
            }
        }
    }

    pub fn nested(&self) -> Option<&CollectionMap> {
        match self {
            DocumentBody::Fields { collections, .. } => collections.as_ref(),
            DocumentBody::Wrapped(_) => None,
        }
    }
}

fn check_segment(segment: &str, location: &str, what: &str) -> Result<(), ShapeError> {
    if segment.is_empty() {
        return Err(ShapeError::new(location, format!("{what} is empty")));
    }
    if segment.contains('/') {
        return Err(ShapeError::new(location, format!("{what} '{segment}' contains '/'")));
    }
    Ok(())
}

/// `location` with placeholder document ids replaced by `app_id`, as the
/// importer would address it. Collection names are left alone.
pub fn effective_location(location: &str, app_id: &str) -> String {
    location
        .split('/')
        .enumerate()
        .map(|(i, segment)| {
            if i % 2 == 1 && segment == APP_ID_PLACEHOLDER {
                app_id
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn join_location(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{parent}/{segment}")
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
