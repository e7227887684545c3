//! Programmatic map construction for code generators.
//!
//! Sources and names are deduplicated through lookup tables so repeated
//! `add_source`/`add_name` calls return stable indices; segments are placed
//! into their frame in generated-column order regardless of insertion order.

use std::collections::HashMap;

use crate::error::{MapError, MapResult};
use crate::mappings::{Frame, MappingEngine, Segment};

use super::SourceMapEnvelope;

/// Incrementally assembles a source map envelope
#[derive(Debug, Default)]
pub struct SourceMapBuilder {
    file: Option<String>,
    source_root: Option<String>,
    sources: Vec<String>,
    sources_content: Vec<Option<String>>,
    names: Vec<String>,
    frames: Vec<Frame>,
    source_lookup: HashMap<String, u32>,
    name_lookup: HashMap<String, u32>,
}

impl SourceMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the generated file name.
    pub fn with_file(mut self, file: &str) -> Self {
        self.file = Some(file.to_string());
        self
    }

    /// Set the source root prefix.
    pub fn with_source_root(mut self, source_root: &str) -> Self {
        self.source_root = Some(source_root.to_string());
        self
    }

    /// Register a source file and return its index; repeated paths reuse
    /// the existing index.
    pub fn add_source(&mut self, path: &str) -> u32 {
        if let Some(&index) = self.source_lookup.get(path) {
            return index;
        }
        let index = self.sources.len() as u32;
        self.sources.push(path.to_string());
        self.sources_content.push(None);
        self.source_lookup.insert(path.to_string(), index);
        index
    }

    /// Store inline content for a registered source.
    pub fn set_source_content(&mut self, index: u32, content: &str) {
        if let Some(entry) = self.sources_content.get_mut(index as usize) {
            *entry = Some(content.to_string());
        }
    }

    /// Register a symbol name and return its index; repeated names reuse
    /// the existing index.
    pub fn add_name(&mut self, name: &str) -> u32 {
        if let Some(&index) = self.name_lookup.get(name) {
            return index;
        }
        let index = self.names.len() as u32;
        self.names.push(name.to_string());
        self.name_lookup.insert(name.to_string(), index);
        index
    }

    /// Add one mapping record.
    ///
    /// The segment's indices must refer to sources and names already
    /// registered with this builder. Frames between the current end of the
    /// map and the segment's generated line are filled in as empty.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidSegmentField`] for a dangling source or name
    /// index.
    pub fn add_segment(&mut self, segment: Segment) -> MapResult<()> {
        if let Some(origin) = segment.origin {
            if origin.source_index as usize >= self.sources.len() {
                return Err(MapError::InvalidSegmentField {
                    field: "sourceIndex",
                    received: i64::from(origin.source_index),
                });
            }
        }
        if let Some(name_index) = segment.name_index {
            if segment.origin.is_none() || name_index as usize >= self.names.len() {
                return Err(MapError::InvalidSegmentField {
                    field: "nameIndex",
                    received: i64::from(name_index),
                });
            }
        }

        let line = segment.generated_line as usize;
        if self.frames.len() < line {
            self.frames.resize(line, Vec::new());
        }

        let frame = &mut self.frames[line - 1];
        let at = frame.partition_point(|s| s.generated_column <= segment.generated_column);
        frame.insert(at, segment);
        Ok(())
    }

    /// Encode the accumulated frames and finish the envelope.
    pub fn build(self) -> SourceMapEnvelope {
        // A content array nobody filled in carries no information.
        let sources_content = if self.sources_content.iter().any(Option::is_some) {
            self.sources_content
        } else {
            Vec::new()
        };

        SourceMapEnvelope {
            version: 3,
            file: self.file,
            names: self.names,
            sources: self.sources,
            mappings: MappingEngine::from_decoded(self.frames).encode(),
            sources_content,
            source_root: self.source_root,
        }
    }
}
