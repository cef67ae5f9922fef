// Copyright (c) 2025 The Gatekeeper Operator Authors
// SPDX-License-Identifier: MIT

//! Typed access to semi-structured manifest documents.
//!
//! Every asset in the catalog is parsed into a [`ManifestDocument`]: a
//! JSON-like tree addressed by string paths. The override engine only ever
//! touches documents through the typed getters and setters here, which fail
//! with path and asset context instead of panicking on unexpected shapes.
//!
//! Two error shapes are distinguished: a [`FieldError::PathNotFound`] when an
//! expected segment is absent, and a [`FieldError::TypeMismatch`] when a
//! segment exists but has the wrong shape. Callers that mutate a slice of
//! maps obtained from [`ManifestDocument::get_map_slice`] must write the whole
//! slice back with [`ManifestDocument::set_map_slice`]; entries are copies,
//! not references into the tree.

use serde_json::{Map, Value};
use thiserror::Error;

/// A JSON object, as stored in manifest trees.
pub type JsonObject = Map<String, Value>;

/// Structural error while reading or writing a manifest field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// An expected path segment is missing from the document.
    #[error("field '{path}' not found in asset '{asset}'")]
    PathNotFound {
        /// Catalog name of the asset
        asset: String,
        /// Dotted path that was requested
        path: String,
    },

    /// A path segment exists but does not have the expected shape.
    #[error("field '{path}' in asset '{asset}' is not of type {expected}")]
    TypeMismatch {
        /// Catalog name of the asset
        asset: String,
        /// Dotted path that was requested
        path: String,
        /// Human-readable name of the expected shape
        expected: &'static str,
    },

    /// The asset bytes could not be parsed at all.
    #[error("asset '{asset}' is not a well-formed manifest: {reason}")]
    Malformed {
        /// Catalog name of the asset
        asset: String,
        /// Parser message
        reason: String,
    },
}

/// One manifest from the asset catalog, held as a mutable JSON-like tree.
///
/// Identity is the asset's catalog name; it is carried into every error so a
/// failed override names both the field and the document it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestDocument {
    asset: String,
    root: Value,
}

impl ManifestDocument {
    /// Parse YAML bytes into a document.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::Malformed`] if the bytes are not a YAML mapping.
    pub fn from_yaml(asset: &str, yaml: &str) -> Result<Self, FieldError> {
        let root: Value = serde_yaml::from_str(yaml).map_err(|e| FieldError::Malformed {
            asset: asset.to_string(),
            reason: e.to_string(),
        })?;
        if !root.is_object() {
            return Err(FieldError::Malformed {
                asset: asset.to_string(),
                reason: "top-level value is not a mapping".to_string(),
            });
        }
        Ok(Self {
            asset: asset.to_string(),
            root,
        })
    }

    /// Wrap an already-parsed JSON object.
    #[must_use]
    pub fn from_value(asset: &str, root: Value) -> Self {
        Self {
            asset: asset.to_string(),
            root,
        }
    }

    /// Catalog name of this asset.
    #[must_use]
    pub fn asset(&self) -> &str {
        &self.asset
    }

    /// The backing JSON tree.
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.root
    }

    /// Consume the document and return the backing JSON tree.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.root
    }

    /// The document's `kind` field.
    ///
    /// # Errors
    ///
    /// Returns an error if `kind` is absent or not a string.
    pub fn kind(&self) -> Result<String, FieldError> {
        self.get_string(&["kind"])
    }

    /// The document's `metadata.name` field.
    ///
    /// # Errors
    ///
    /// Returns an error if the field is absent or not a string.
    pub fn name(&self) -> Result<String, FieldError> {
        self.get_string(&["metadata", "name"])
    }

    /// The document's `metadata.namespace` field, if present.
    #[must_use]
    pub fn namespace(&self) -> Option<String> {
        self.get(&["metadata", "namespace"])
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Presence query: the value at `path`, or `None` if any segment is
    /// missing or a non-object intermediate is hit.
    #[must_use]
    pub fn get(&self, path: &[&str]) -> Option<&Value> {
        let mut current = &self.root;
        for segment in path {
            current = current.as_object()?.get(*segment)?;
        }
        Some(current)
    }

    /// String value at `path`.
    ///
    /// # Errors
    ///
    /// [`FieldError::PathNotFound`] if absent, [`FieldError::TypeMismatch`]
    /// if present but not a string.
    pub fn get_string(&self, path: &[&str]) -> Result<String, FieldError> {
        let value = self.require(path)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.type_mismatch(path, "string"))
    }

    /// Integer value at `path`.
    ///
    /// # Errors
    ///
    /// [`FieldError::PathNotFound`] if absent, [`FieldError::TypeMismatch`]
    /// if present but not an integer.
    pub fn get_i64(&self, path: &[&str]) -> Result<i64, FieldError> {
        let value = self.require(path)?;
        value
            .as_i64()
            .ok_or_else(|| self.type_mismatch(path, "integer"))
    }

    /// String-slice value at `path`, copied out of the tree.
    ///
    /// # Errors
    ///
    /// [`FieldError::PathNotFound`] if absent, [`FieldError::TypeMismatch`]
    /// if present but not a sequence of strings.
    pub fn get_string_slice(&self, path: &[&str]) -> Result<Vec<String>, FieldError> {
        let value = self.require(path)?;
        let items = value
            .as_array()
            .ok_or_else(|| self.type_mismatch(path, "string sequence"))?;
        items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| self.type_mismatch(path, "string sequence"))
            })
            .collect()
    }

    /// Slice-of-maps value at `path`, copied out of the tree.
    ///
    /// Mutating the returned entries does not touch the document; write the
    /// whole slice back with [`Self::set_map_slice`] after iterating.
    ///
    /// # Errors
    ///
    /// [`FieldError::PathNotFound`] if absent, [`FieldError::TypeMismatch`]
    /// if present but not a sequence of mappings.
    pub fn get_map_slice(&self, path: &[&str]) -> Result<Vec<JsonObject>, FieldError> {
        let value = self.require(path)?;
        let items = value
            .as_array()
            .ok_or_else(|| self.type_mismatch(path, "sequence of mappings"))?;
        items
            .iter()
            .map(|item| {
                item.as_object()
                    .cloned()
                    .ok_or_else(|| self.type_mismatch(path, "sequence of mappings"))
            })
            .collect()
    }

    /// Nested object copy at `path`.
    ///
    /// # Errors
    ///
    /// [`FieldError::PathNotFound`] if absent, [`FieldError::TypeMismatch`]
    /// if present but not a mapping.
    pub fn get_object(&self, path: &[&str]) -> Result<JsonObject, FieldError> {
        let value = self.require(path)?;
        value
            .as_object()
            .cloned()
            .ok_or_else(|| self.type_mismatch(path, "mapping"))
    }

    /// Store `value` at `path`, creating intermediate mappings as needed.
    ///
    /// # Errors
    ///
    /// [`FieldError::TypeMismatch`] if an existing intermediate segment is not
    /// a mapping.
    pub fn set(&mut self, value: Value, path: &[&str]) -> Result<(), FieldError> {
        let asset = self.asset.clone();
        let mut current = &mut self.root;
        for (depth, segment) in path.iter().enumerate() {
            let object = current
                .as_object_mut()
                .ok_or_else(|| FieldError::TypeMismatch {
                    asset: asset.clone(),
                    path: path[..depth].join("."),
                    expected: "mapping",
                })?;
            if depth == path.len() - 1 {
                object.insert((*segment).to_string(), value);
                return Ok(());
            }
            current = object
                .entry((*segment).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
        // Empty path replaces the whole document; the catalog never does this.
        self.root = value;
        Ok(())
    }

    /// Store a string at `path`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::set`].
    pub fn set_string(&mut self, value: &str, path: &[&str]) -> Result<(), FieldError> {
        self.set(Value::String(value.to_string()), path)
    }

    /// Store an integer at `path`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::set`].
    pub fn set_i64(&mut self, value: i64, path: &[&str]) -> Result<(), FieldError> {
        self.set(Value::Number(value.into()), path)
    }

    /// Store a string slice at `path`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::set`].
    pub fn set_string_slice(&mut self, values: &[String], path: &[&str]) -> Result<(), FieldError> {
        let items = values
            .iter()
            .map(|v| Value::String(v.clone()))
            .collect::<Vec<_>>();
        self.set(Value::Array(items), path)
    }

    /// Write a full slice of mappings back at `path`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::set`].
    pub fn set_map_slice(
        &mut self,
        entries: Vec<JsonObject>,
        path: &[&str],
    ) -> Result<(), FieldError> {
        let items = entries.into_iter().map(Value::Object).collect::<Vec<_>>();
        self.set(Value::Array(items), path)
    }

    fn require(&self, path: &[&str]) -> Result<&Value, FieldError> {
        let mut current = &self.root;
        for (depth, segment) in path.iter().enumerate() {
            let object = current
                .as_object()
                .ok_or_else(|| FieldError::TypeMismatch {
                    asset: self.asset.clone(),
                    path: path[..depth].join("."),
                    expected: "mapping",
                })?;
            current = object
                .get(*segment)
                .ok_or_else(|| FieldError::PathNotFound {
                    asset: self.asset.clone(),
                    path: path[..=depth].join("."),
                })?;
        }
        Ok(current)
    }

    fn type_mismatch(&self, path: &[&str], expected: &'static str) -> FieldError {
        FieldError::TypeMismatch {
            asset: self.asset.clone(),
            path: path.join("."),
            expected,
        }
    }
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod manifest_tests;
