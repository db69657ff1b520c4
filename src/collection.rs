//! # Collection Details
//!
//! Reads the identity of an Ansible collection (namespace, name and declared
//! dependencies) from a collection checkout.
//!
//! Two metadata formats are understood, looked up in this order:
//!
//! 1. `galaxy.yml`, the source format found in collection repositories.
//! 2. `MANIFEST.json`, the format found in built and installed collections,
//!    where the details live under the `collection_info` object.
//!
//! The first file that exists is used; once found, any problem with it is
//! reported even if the other file exists and would load fine.
//!
//! Validation walks the fixed schema explicitly: `namespace` and `name` must
//! be non-empty strings, `dependencies` is an optional mapping of strings to
//! strings. Failures are reported as a [`FieldError`] naming the offending
//! field and what was wrong with it.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};

/// File name of the collection source metadata.
pub const GALAXY_YML: &str = "galaxy.yml";

/// File name of the built collection metadata.
pub const MANIFEST_JSON: &str = "MANIFEST.json";

/// Identity of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionDetails {
    pub namespace: String,
    pub name: String,
    /// Declared dependencies, collection name to version range.
    pub dependencies: BTreeMap<String, String>,
}

impl CollectionDetails {
    /// The dotted `<namespace>.<name>` form of the collection name.
    pub fn collection_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }

    /// Validate a metadata mapping into collection details.
    ///
    /// Keys other than `namespace`, `name` and `dependencies` are ignored.
    pub fn from_mapping(data: &Mapping) -> std::result::Result<Self, FieldError> {
        let namespace = required_string(data, "namespace")?;
        let name = required_string(data, "name")?;
        let dependencies = match data.get("dependencies") {
            None | Some(Value::Null) => BTreeMap::new(),
            Some(Value::Mapping(deps)) => string_mapping(deps, "dependencies")?,
            Some(other) => {
                return Err(FieldError::new(
                    "dependencies",
                    Violation::WrongType {
                        expected: "mapping",
                        actual: type_name(other),
                    },
                ))
            }
        };

        Ok(Self {
            namespace,
            name,
            dependencies,
        })
    }
}

/// What was wrong with a metadata field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// The field is not present.
    Missing,
    /// The field has the wrong type.
    WrongType {
        expected: &'static str,
        actual: &'static str,
    },
    /// The field is an empty string.
    Empty,
    /// A key of a string mapping is not a string.
    KeyNotString { key: String },
    /// A value of a string mapping is not a string.
    ValueNotString { key: String, value: String },
}

/// A validation failure for a single metadata field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub violation: Violation,
}

impl FieldError {
    fn new(field: &'static str, violation: Violation) -> Self {
        Self { field, violation }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self.field;
        match &self.violation {
            Violation::Missing => write!(f, "{field} is missing"),
            Violation::WrongType { expected, actual } => {
                write!(f, "{field} is not a {expected}, but {actual}")
            }
            Violation::Empty => write!(f, "{field} must not be empty"),
            Violation::KeyNotString { key } => write!(f, "{field} key {key} is not a string"),
            Violation::ValueNotString { key, value } => {
                write!(f, "{field}.{key} value {value} is not a string")
            }
        }
    }
}

impl std::error::Error for FieldError {}

/// Which metadata format a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataKind {
    GalaxyYml,
    ManifestJson,
}

/// Result of looking for collection metadata in a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataSource {
    Found { path: PathBuf, kind: MetadataKind },
    NotFound,
}

/// Find the metadata file to load for the collection in `dir`.
pub fn locate_metadata(dir: &Path) -> MetadataSource {
    let candidates = [
        (GALAXY_YML, MetadataKind::GalaxyYml),
        (MANIFEST_JSON, MetadataKind::ManifestJson),
    ];
    for (file_name, kind) in candidates {
        let path = dir.join(file_name);
        if path.exists() {
            return MetadataSource::Found { path, kind };
        }
    }
    MetadataSource::NotFound
}

/// Load the collection details of the collection checkout in `dir`.
pub fn load_collection_details(dir: &Path) -> Result<CollectionDetails> {
    let (path, kind) = match locate_metadata(dir) {
        MetadataSource::Found { path, kind } => (path, kind),
        MetadataSource::NotFound => {
            return Err(Error::MetadataNotFound {
                dir: dir.to_path_buf(),
            })
        }
    };

    debug!("Loading collection details from {}", path.display());
    let loaded = match kind {
        MetadataKind::GalaxyYml => load_galaxy_yml(&path),
        MetadataKind::ManifestJson => load_manifest_json(&path),
    };
    loaded.map_err(|reason| Error::CollectionDetails { path, reason })
}

fn load_galaxy_yml(path: &Path) -> std::result::Result<CollectionDetails, String> {
    let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let data: Value = serde_yaml::from_str(&content).map_err(|e| e.to_string())?;
    let Value::Mapping(data) = data else {
        return Err(format!("{GALAXY_YML} is not a global mapping"));
    };
    CollectionDetails::from_mapping(&data).map_err(|e| e.to_string())
}

fn load_manifest_json(path: &Path) -> std::result::Result<CollectionDetails, String> {
    let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let data: serde_json::Value = serde_json::from_str(&content).map_err(|e| e.to_string())?;
    let info = match data.get("collection_info") {
        Some(info @ serde_json::Value::Object(_)) => info,
        _ => return Err(format!("Cannot find collection_info in {MANIFEST_JSON}")),
    };
    let info: Value = serde_yaml::to_value(info).map_err(|e| e.to_string())?;
    let Value::Mapping(info) = info else {
        return Err(format!("Cannot find collection_info in {MANIFEST_JSON}"));
    };
    CollectionDetails::from_mapping(&info).map_err(|e| e.to_string())
}

fn required_string(
    data: &Mapping,
    field: &'static str,
) -> std::result::Result<String, FieldError> {
    match data.get(field) {
        None => Err(FieldError::new(field, Violation::Missing)),
        Some(Value::String(value)) if value.is_empty() => {
            Err(FieldError::new(field, Violation::Empty))
        }
        Some(Value::String(value)) => Ok(value.clone()),
        Some(other) => Err(FieldError::new(
            field,
            Violation::WrongType {
                expected: "string",
                actual: type_name(other),
            },
        )),
    }
}

fn string_mapping(
    data: &Mapping,
    field: &'static str,
) -> std::result::Result<BTreeMap<String, String>, FieldError> {
    let mut result = BTreeMap::new();
    for (key, value) in data {
        let Value::String(key) = key else {
            return Err(FieldError::new(
                field,
                Violation::KeyNotString { key: render(key) },
            ));
        };
        let Value::String(value) = value else {
            return Err(FieldError::new(
                field,
                Violation::ValueNotString {
                    key: key.clone(),
                    value: render(value),
                },
            ));
        };
        result.insert(key.clone(), value.clone());
    }
    Ok(result)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Short human-readable rendering of a value for error messages.
fn render(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("{s:?}"),
        other => type_name(other).to_string(),
    }
}
