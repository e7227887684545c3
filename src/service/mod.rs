//! # Source-Map Service
//!
//! The envelope-level API: owns the `names`/`sources`/`sourcesContent`
//! arrays and a [`MappingEngine`], joins lookup results with the arrays into
//! resolved positions, concatenates independent maps with correct index
//! offsets, and serializes back to the v3 wire format.
//!
//! ## Components
//!
//! - **Envelope**: the outer JSON record with validated read and
//!   stable-order write
//! - **Service**: construction, position queries, snippet extraction,
//!   concatenation, serialization
//! - **Builder**: programmatic map construction with deduplicating
//!   source/name tables
//!
//! ## Usage
//!
//! ```rust
//! use srcmap::{Bias, SourceMapService};
//!
//! let json = br#"{
//!     "version": 3,
//!     "sources": ["app.ts"],
//!     "names": ["handler"],
//!     "mappings": "AAAAA"
//! }"#;
//! let service = SourceMapService::from_json(json, None).unwrap();
//! let position = service.position_by_generated(1, 1, Bias::Exact).unwrap();
//! assert_eq!(position.source, "app.ts");
//! assert_eq!(position.name.as_deref(), Some("handler"));
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{MapError, MapResult};
use crate::mappings::{Bias, MappingEngine, Segment};

mod builder;
mod envelope;

#[cfg(test)]
mod tests;

pub use builder::SourceMapBuilder;
pub use envelope::SourceMapEnvelope;

use envelope::validate_mappings_charset;

/// A resolved position joining a segment with the envelope arrays
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Symbol name associated with the mapping, when one was recorded
    pub name: Option<String>,
    /// Resolved source file path
    pub source: String,
    pub source_root: Option<String>,
    pub source_index: u32,
    /// Position in the original file (1-based)
    pub original_line: u32,
    pub original_column: u32,
    /// Position in the emitted output (1-based)
    pub generated_line: u32,
    pub generated_column: u32,
}

/// A resolved position plus the full stored content of its source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionWithContent {
    pub position: Position,
    pub content: String,
}

/// A resolved position plus the code lines surrounding it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionWithCode {
    pub position: Position,
    /// The extracted slice of the source content, split on `\n`
    pub code: Vec<String>,
    /// 0-based inclusive start of the slice within the content lines
    pub start_line: u32,
    /// 0-based exclusive end of the slice within the content lines
    pub end_line: u32,
}

/// Bounds for snippet extraction around a resolved position
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SnippetConfig {
    /// Context lines kept before the resolved original line
    pub lines_before: u32,
    /// Context lines kept after the resolved original line
    pub lines_after: u32,
}

impl Default for SnippetConfig {
    fn default() -> Self {
        Self {
            lines_before: 3,
            lines_after: 4,
        }
    }
}

/// Selects a source for original-position queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceQuery {
    /// Numeric index into `sources`
    Index(u32),
    /// Substring match against `sources`; the first containing entry wins
    Path(String),
}

impl From<u32> for SourceQuery {
    fn from(index: u32) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for SourceQuery {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

/// Envelope arrays plus the mapping engine behind one query surface.
///
/// A service instance is immutable after construction except through
/// [`SourceMapService::concat`], and is not safe for concurrent mutation;
/// read-only queries against a non-mutating instance share no state.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMapService {
    file: Option<String>,
    source_root: Option<String>,
    names: Vec<String>,
    sources: Vec<String>,
    sources_content: Vec<Option<String>>,
    engine: MappingEngine,
}

impl SourceMapService {
    /// Build a service from a pre-parsed envelope.
    ///
    /// An explicit `file` overrides the envelope's `file` key.
    ///
    /// # Errors
    ///
    /// [`MapError::UnsupportedVersion`] for a version other than 3,
    /// [`MapError::InvalidMappingsCharset`] when the blob fails the
    /// character-set scan, plus every stream decode error.
    pub fn new(envelope: SourceMapEnvelope, file: Option<&str>) -> MapResult<Self> {
        if envelope.version != 3 {
            return Err(MapError::UnsupportedVersion {
                version: u64::from(envelope.version),
            });
        }
        validate_mappings_charset(&envelope.mappings)?;
        let engine = MappingEngine::from_string(&envelope.mappings, 0, 0)?;

        Ok(Self {
            file: file.map(String::from).or(envelope.file),
            source_root: envelope.source_root,
            names: envelope.names,
            sources: envelope.sources,
            sources_content: envelope.sources_content,
            engine,
        })
    }

    /// Build a service straight from a JSON byte buffer.
    pub fn from_json(bytes: &[u8], file: Option<&str>) -> MapResult<Self> {
        Self::new(SourceMapEnvelope::from_json(bytes)?, file)
    }

    /// Resolve a generated position to its original position.
    ///
    /// Returns `None` for a line outside the map, a bias miss, or a segment
    /// without source attribution.
    pub fn position_by_generated(&self, line: u32, column: u32, bias: Bias) -> Option<Position> {
        let segment = self.engine.get_by_generated(line, column, bias)?;
        self.resolve(segment)
    }

    /// Resolve an original position to its generated position.
    ///
    /// `source` selects the original file by index or by substring; see
    /// [`SourceQuery`].
    ///
    /// # Errors
    ///
    /// [`MapError::SourceNotFound`] when a substring query matches no entry
    /// of `sources`. An out-of-range numeric index is an ordinary miss.
    pub fn position_by_original(
        &self,
        line: u32,
        column: u32,
        source: impl Into<SourceQuery>,
        bias: Bias,
    ) -> MapResult<Option<Position>> {
        let source_index = match source.into() {
            SourceQuery::Index(index) => {
                if index as usize >= self.sources.len() {
                    return Ok(None);
                }
                index
            }
            SourceQuery::Path(query) => self
                .sources
                .iter()
                .position(|source| source.contains(query.as_str()))
                .map(|index| index as u32)
                .ok_or(MapError::SourceNotFound { query })?,
        };

        Ok(self
            .engine
            .get_by_original(source_index, line, column, bias)
            .and_then(|segment| self.resolve(segment)))
    }

    /// Resolve a generated position and attach the full stored content of
    /// the source it maps into. `None` when no content is stored.
    pub fn position_with_content(
        &self,
        line: u32,
        column: u32,
        bias: Bias,
    ) -> Option<PositionWithContent> {
        let position = self.position_by_generated(line, column, bias)?;
        let content = self.source_content(position.source_index as usize)?;
        Some(PositionWithContent {
            content: content.to_string(),
            position,
        })
    }

    /// Resolve a generated position and extract the surrounding code lines.
    ///
    /// The slice is `[max(0, originalLine - linesBefore),
    /// min(lines, originalLine + linesAfter))` over the content split on
    /// `\n`. `None` when no content is stored for the resolved source.
    pub fn position_with_snippet(
        &self,
        line: u32,
        column: u32,
        bias: Bias,
        config: &SnippetConfig,
    ) -> Option<PositionWithCode> {
        let position = self.position_by_generated(line, column, bias)?;
        let content = self.source_content(position.source_index as usize)?;

        let lines: Vec<&str> = content.split('\n').collect();
        let end = lines
            .len()
            .min((position.original_line + config.lines_after) as usize);
        let start = (position.original_line.saturating_sub(config.lines_before) as usize).min(end);
        let code = lines[start..end].iter().map(|line| line.to_string()).collect();

        Some(PositionWithCode {
            position,
            code,
            start_line: start as u32,
            end_line: end as u32,
        })
    }

    /// Append each map's names, sources, contents, and frames behind the
    /// existing ones, with index offsets applied per the concatenation
    /// rules. Maps accumulate in argument order.
    ///
    /// Updates are staged and committed only when every map decodes, so a
    /// failure leaves the service unchanged.
    ///
    /// # Errors
    ///
    /// [`MapError::EmptyConcat`] when called with no maps, plus every
    /// construction error for an individual map.
    pub fn concat(&mut self, maps: &[SourceMapEnvelope]) -> MapResult<()> {
        if maps.is_empty() {
            return Err(MapError::EmptyConcat);
        }

        let mut engine = self.engine.clone();
        let mut names = self.names.clone();
        let mut sources = self.sources.clone();
        let mut sources_content = self.sources_content.clone();

        for map in maps {
            if map.version != 3 {
                return Err(MapError::UnsupportedVersion {
                    version: u64::from(map.version),
                });
            }
            validate_mappings_charset(&map.mappings)?;
            engine.append_string(&map.mappings, names.len() as u32, sources.len() as u32)?;

            names.extend_from_slice(&map.names);
            if !map.sources_content.is_empty() {
                // Align the content array before the appended entries land.
                sources_content.resize(sources.len(), Some(String::new()));
            }
            sources.extend_from_slice(&map.sources);
            sources_content.extend_from_slice(&map.sources_content);
        }

        tracing::debug!(
            appended = maps.len(),
            total_lines = engine.len(),
            total_sources = sources.len(),
            "concatenated source maps"
        );

        self.engine = engine;
        self.names = names;
        self.sources = sources;
        self.sources_content = sources_content;
        Ok(())
    }

    /// Like [`SourceMapService::concat`] but leaves this service untouched
    /// and returns the combined map as a fresh one.
    pub fn concat_new_map(&self, maps: &[SourceMapEnvelope]) -> MapResult<Self> {
        let mut combined = self.clone();
        combined.concat(maps)?;
        Ok(combined)
    }

    /// Serialize back to an envelope; `mappings` is re-encoded from the
    /// current frames.
    pub fn to_envelope(&self) -> SourceMapEnvelope {
        SourceMapEnvelope {
            version: 3,
            file: self.file.clone(),
            names: self.names.clone(),
            sources: self.sources.clone(),
            mappings: self.engine.encode(),
            sources_content: self.sources_content.clone(),
            source_root: self.source_root.clone(),
        }
    }

    /// Serialize to the v3 JSON wire form with the stable key order.
    pub fn to_json(&self) -> MapResult<String> {
        Ok(serde_json::to_string(&self.to_envelope())?)
    }

    /// Render the map as a `data:` URL suitable for inline embedding.
    pub fn to_inline_data_url(&self) -> MapResult<String> {
        use base64::Engine as _;

        let json = self.to_json()?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(json);
        Ok(format!(
            "data:application/json;charset=utf-8;base64,{encoded}"
        ))
    }

    /// The trailing comment line pointing consumers at a source map.
    pub fn source_mapping_url_comment(url: &str) -> String {
        format!("//# sourceMappingURL={url}")
    }

    /// Stored content of one source, when the envelope carries it.
    pub fn source_content(&self, index: usize) -> Option<&str> {
        self.sources_content.get(index)?.as_deref()
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn source_root(&self) -> Option<&str> {
        self.source_root.as_deref()
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn engine(&self) -> &MappingEngine {
        &self.engine
    }

    /// Join a segment with the envelope arrays. Segments without source
    /// attribution, or with indices that point past the arrays, resolve to
    /// `None`.
    fn resolve(&self, segment: &Segment) -> Option<Position> {
        let origin = segment.origin?;
        let source = self.sources.get(origin.source_index as usize)?.clone();
        let name = segment
            .name_index
            .and_then(|index| self.names.get(index as usize))
            .cloned();

        Some(Position {
            name,
            source,
            source_root: self.source_root.clone(),
            source_index: origin.source_index,
            original_line: origin.line,
            original_column: origin.column,
            generated_line: segment.generated_line,
            generated_column: segment.generated_column,
        })
    }
}
