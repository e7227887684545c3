//! The outer Source Map v3 JSON record.
//!
//! Serialization goes through serde so the emitted key order is fixed by
//! field declaration order: `version, file?, names, sources, mappings,
//! sourcesContent, sourceRoot?`. Reading goes through an explicit
//! JSON-value walk instead of derive so a missing required key or a
//! mistyped array reports the precise key, not a generic parse failure.
//! Unknown top-level keys are ignored on read and never emitted on write.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{MapError, MapResult};

/// A Source Map v3 envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMapEnvelope {
    /// Source map version (always 3)
    pub version: u8,
    /// Generated file name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Symbol names referenced by the mappings
    pub names: Vec<String>,
    /// Original source file paths
    pub sources: Vec<String>,
    /// Base64 VLQ encoded mappings
    pub mappings: String,
    /// Inline source contents, index-aligned with `sources`; `null` entries
    /// mark sources whose content is not stored
    #[serde(rename = "sourcesContent", default)]
    pub sources_content: Vec<Option<String>>,
    /// Prefix prepended to every source path
    #[serde(rename = "sourceRoot", skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
}

impl SourceMapEnvelope {
    /// An empty version-3 envelope.
    pub fn empty() -> Self {
        Self {
            version: 3,
            file: None,
            names: Vec::new(),
            sources: Vec::new(),
            mappings: String::new(),
            sources_content: Vec::new(),
            source_root: None,
        }
    }

    /// Parse an envelope from a JSON byte buffer.
    ///
    /// # Errors
    ///
    /// [`MapError::Json`] when the buffer is not valid JSON, plus everything
    /// [`SourceMapEnvelope::from_json_value`] reports.
    pub fn from_json(bytes: &[u8]) -> MapResult<Self> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_json_value(value)
    }

    /// Validate and extract an envelope from a parsed JSON value.
    ///
    /// `sources`, `mappings`, and `names` are required; `version` is
    /// accepted only when equal to 3 and an absent `version` is tolerated
    /// with a warning.
    ///
    /// # Errors
    ///
    /// [`MapError::MissingRequiredKey`], [`MapError::NotAnArray`],
    /// [`MapError::UnsupportedVersion`], or [`MapError::Json`] when a value
    /// has the wrong primitive type.
    pub fn from_json_value(value: Value) -> MapResult<Self> {
        let object = value.as_object().ok_or_else(|| MapError::MissingRequiredKey {
            key: "sources".to_string(),
        })?;

        for key in ["sources", "mappings", "names"] {
            if !object.contains_key(key) {
                return Err(MapError::MissingRequiredKey {
                    key: key.to_string(),
                });
            }
        }

        match object.get("version") {
            None => tracing::warn!("source map envelope has no 'version' key, assuming 3"),
            Some(version) => {
                if version.as_u64() != Some(3) {
                    return Err(MapError::UnsupportedVersion {
                        version: version.as_u64().unwrap_or(0),
                    });
                }
            }
        }

        let names = string_array(object, "names")?;
        let sources = string_array(object, "sources")?;
        let mappings: String = serde_json::from_value(object["mappings"].clone())?;

        let sources_content = match object.get("sourcesContent") {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => {
                if !value.is_array() {
                    return Err(MapError::NotAnArray {
                        context: "sourcesContent".to_string(),
                    });
                }
                serde_json::from_value(value.clone())?
            }
        };

        let file: Option<String> = match object.get("file") {
            None | Some(Value::Null) => None,
            Some(value) => serde_json::from_value(value.clone())?,
        };
        let source_root: Option<String> = match object.get("sourceRoot") {
            None | Some(Value::Null) => None,
            Some(value) => serde_json::from_value(value.clone())?,
        };

        Ok(Self {
            version: 3,
            file,
            names,
            sources,
            mappings,
            sources_content,
            source_root,
        })
    }
}

fn string_array(
    object: &serde_json::Map<String, Value>,
    key: &str,
) -> MapResult<Vec<String>> {
    let value = &object[key];
    if !value.is_array() {
        return Err(MapError::NotAnArray {
            context: key.to_string(),
        });
    }
    Ok(serde_json::from_value(value.clone())?)
}

/// Bytes permitted in a `mappings` blob: the VLQ alphabet plus the two
/// separators.
fn is_mappings_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'+' | b'/' | b',' | b';')
}

/// Whole-blob character-set validation run at envelope acceptance.
pub(crate) fn validate_mappings_charset(mappings: &str) -> MapResult<()> {
    if mappings.bytes().all(is_mappings_byte) {
        Ok(())
    } else {
        Err(MapError::InvalidMappingsCharset)
    }
}
