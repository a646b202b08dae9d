//! Schema documents: schema definitions stored as JSON or TOML.
//!
//! A document names handlers and middlewares instead of holding them, and
//! describes validators as [`FieldSchema`]s:
//!
//! ```json
//! {
//!   "id": "devices",
//!   "path": "/v1/devices",
//!   "schema": { "type": "object", "properties": { "name": { "type": "string" } } },
//!   "routes": {
//!     "list": "",
//!     "get": ":id",
//!     "post": { "validation": { "type": "object", "properties": {} } }
//!   }
//! }
//! ```
//!
//! Unknown keys are rejected at every level.

use crate::definition::{MiddlewareRef, RouteDefinition, RouteEntry, SchemaCatalog, SchemaDefinition};
use crate::error::{CompileError, CompileResult};
use dynaroute_core::{FieldSchema, Validator};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Serialized form of a [`SchemaDefinition`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SchemaDocument {
    /// Resource id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Model validator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<FieldSchema>,
    /// Default factory name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_factory: Option<String>,
    /// Default factory loader handler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_factory: Option<String>,
    /// Base path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Routes by id.
    #[serde(default)]
    pub routes: IndexMap<String, RouteDocumentEntry>,
    /// Middleware handler names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub middlewares: Vec<String>,
}

/// A route value in a document: a path string, a route object, or null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteDocumentEntry {
    /// A bare path. The empty string means no settings.
    Path(String),
    /// Full route settings.
    Route(RouteDocument),
    /// No settings.
    Empty,
}

/// Serialized form of a [`RouteDefinition`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RouteDocument {
    /// Id override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Operation kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Path suffix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Header validator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_validation: Option<FieldSchema>,
    /// Body validator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldSchema>,
    /// Post-validation handler name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_validation: Option<String>,
    /// Factory loader handler name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_factory: Option<String>,
    /// Main handler name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    /// Post handler name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_handler: Option<String>,
    /// Factory name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_factory: Option<String>,
    /// Factory method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_factory_method: Option<String>,
    /// Middleware handler names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub middlewares: Vec<String>,
}

/// A document holding several named schemas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogDocument {
    /// Schemas by id.
    pub schemas: IndexMap<String, SchemaDocument>,
}

/// Document encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// JSON.
    Json,
    /// TOML.
    Toml,
}

impl DocumentFormat {
    /// Picks the format from a file extension.
    pub fn from_path(path: &Path) -> CompileResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            _ => Err(CompileError::invalid(
                "document",
                format!("unsupported schema document format: {}", path.display()),
            )),
        }
    }

    fn parse<T: DeserializeOwned>(self, content: &str) -> CompileResult<T> {
        match self {
            Self::Json => serde_json::from_str(content)
                .map_err(|e| CompileError::invalid("document", e.to_string())),
            Self::Toml => {
                toml::from_str(content).map_err(|e| CompileError::invalid("document", e.to_string()))
            }
        }
    }
}

fn read_document<T: DeserializeOwned>(path: &Path) -> CompileResult<T> {
    let format = DocumentFormat::from_path(path)?;
    debug!(path = %path.display(), ?format, "Loading schema document");

    let content = fs::read_to_string(path).map_err(|source| CompileError::DocumentRead {
        path: path.to_path_buf(),
        source,
    })?;
    format.parse(&content)
}

impl SchemaDocument {
    /// Parses a JSON document.
    pub fn from_json(json: &str) -> CompileResult<Self> {
        DocumentFormat::Json.parse(json)
    }

    /// Parses a TOML document.
    pub fn from_toml(toml: &str) -> CompileResult<Self> {
        DocumentFormat::Toml.parse(toml)
    }

    /// Reads a document, picking the format from the file extension.
    pub fn from_file(path: impl AsRef<Path>) -> CompileResult<Self> {
        read_document(path.as_ref())
    }

    /// Converts the document into a schema definition.
    ///
    /// Handler and middleware names are kept as names; they are resolved
    /// when a route is compiled.
    #[must_use]
    pub fn into_definition(self) -> SchemaDefinition {
        SchemaDefinition {
            id: self.id,
            model_schema: self.schema.map(validator),
            use_factory: self.use_factory,
            load_factory: self.load_factory,
            path: self.path,
            routes: self
                .routes
                .into_iter()
                .map(|(route_id, entry)| (route_id, entry.into_entry()))
                .collect(),
            middlewares: named(self.middlewares),
        }
    }
}

impl RouteDocumentEntry {
    fn into_entry(self) -> RouteEntry {
        match self {
            Self::Path(path) => RouteEntry::from(path.as_str()),
            Self::Route(route) => RouteEntry::Route(route.into_definition()),
            Self::Empty => RouteEntry::Empty,
        }
    }
}

impl RouteDocument {
    /// Converts the document into route settings.
    #[must_use]
    pub fn into_definition(self) -> RouteDefinition {
        RouteDefinition {
            id: self.id,
            method: self.method,
            path: self.path,
            header_validation: self.header_validation.map(validator),
            validation: self.validation.map(validator),
            post_validation: self.post_validation,
            load_factory: self.load_factory,
            handler: self.handler,
            post_handler: self.post_handler,
            use_factory: self.use_factory,
            use_factory_method: self.use_factory_method,
            middlewares: named(self.middlewares),
        }
    }
}

impl CatalogDocument {
    /// Parses a JSON catalog.
    pub fn from_json(json: &str) -> CompileResult<Self> {
        DocumentFormat::Json.parse(json)
    }

    /// Parses a TOML catalog.
    pub fn from_toml(toml: &str) -> CompileResult<Self> {
        DocumentFormat::Toml.parse(toml)
    }

    /// Reads a catalog, picking the format from the file extension.
    pub fn from_file(path: impl AsRef<Path>) -> CompileResult<Self> {
        read_document(path.as_ref())
    }

    /// Converts every schema of the document.
    #[must_use]
    pub fn into_catalog(self) -> SchemaCatalog {
        self.schemas
            .into_iter()
            .map(|(schema_id, schema)| (schema_id, schema.into_definition()))
            .collect()
    }
}

fn validator(schema: FieldSchema) -> Arc<dyn Validator> {
    Arc::new(schema)
}

fn named(names: Vec<String>) -> Vec<MiddlewareRef> {
    names.into_iter().map(MiddlewareRef::Named).collect()
}
