//! The `Metadata` section of a ClassicWorld map.
//!
//! Known extensions are [`MetadataStructure`]s kept in an ordered
//! [`MetadataParsers`] registry. On load each one, in registration order,
//! removes the sub-tree it owns from the working `Metadata` compound; whatever
//! is left over is captured by [`ForeignMeta`]. On save the foreign tags are
//! written back first and each extension's output is appended after them.

pub mod cpe;
pub mod foreign;

pub use cpe::{CpeMetadata, Rgb};
pub use foreign::ForeignMeta;

use crate::error::Result;
use crate::nbt;
use crate::options::ClassicWorldOptions;
use quartz_nbt::NbtCompound;

/// A known, fixed-schema sub-tree of `Metadata`.
pub trait MetadataStructure {
    /// Name of the child of `Metadata` this structure owns.
    fn name(&self) -> &'static str;

    /// Fill typed fields from `metadata`, removing the consumed sub-tree.
    fn read(&mut self, metadata: &mut NbtCompound) -> Result<()>;

    /// Build the owned sub-tree, or `None` when there is nothing to write.
    fn write(&self) -> Option<NbtCompound>;
}

/// Every extension this crate understands.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataParser {
    Cpe(CpeMetadata),
}

impl MetadataStructure for MetadataParser {
    fn name(&self) -> &'static str {
        match self {
            MetadataParser::Cpe(cpe) => cpe.name(),
        }
    }

    fn read(&mut self, metadata: &mut NbtCompound) -> Result<()> {
        match self {
            MetadataParser::Cpe(cpe) => cpe.read(metadata),
        }
    }

    fn write(&self) -> Option<NbtCompound> {
        match self {
            MetadataParser::Cpe(cpe) => cpe.write(),
        }
    }
}

/// Ordered registry of known-extension parsers.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataParsers {
    parsers: Vec<MetadataParser>,
}

impl MetadataParsers {
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// The standard registry: CPE only.
    pub fn with_defaults(options: &ClassicWorldOptions) -> Self {
        let mut parsers = Self::new();
        parsers.register(MetadataParser::Cpe(CpeMetadata::with_weather_policy(
            options.weather_policy,
        )));
        parsers
    }

    /// Append a parser. A parser with the same name replaces the old one in place.
    pub fn register(&mut self, parser: MetadataParser) {
        match self.parsers.iter().position(|p| p.name() == parser.name()) {
            Some(index) => self.parsers[index] = parser,
            None => self.parsers.push(parser),
        }
    }

    pub fn get(&self, name: &str) -> Option<&MetadataParser> {
        self.parsers.iter().find(|p| p.name() == name)
    }

    pub fn cpe(&self) -> Option<&CpeMetadata> {
        self.parsers.iter().find_map(|p| match p {
            MetadataParser::Cpe(cpe) => Some(cpe),
        })
    }

    pub fn cpe_mut(&mut self) -> Option<&mut CpeMetadata> {
        self.parsers.iter_mut().find_map(|p| match p {
            MetadataParser::Cpe(cpe) => Some(cpe),
        })
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.parsers.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    /// Run every parser over `metadata` in registration order.
    pub fn read_all(&mut self, metadata: &mut NbtCompound) -> Result<()> {
        for parser in &mut self.parsers {
            log::debug!("Reading metadata extension {}", parser.name());
            parser.read(metadata)?;
        }
        Ok(())
    }

    /// Append each parser's non-empty output to `metadata`, in registration order.
    ///
    /// A tag already holding a parser's name is replaced by the parser output,
    /// which is always appended after the remaining tags.
    pub fn write_all(&self, metadata: &mut NbtCompound) {
        for parser in &self.parsers {
            match parser.write() {
                Some(tree) => {
                    if let Some(displaced) = nbt::remove(metadata, parser.name()) {
                        log::warn!(
                            "Metadata tag {} ({:?}) is replaced by the {} extension output",
                            parser.name(),
                            displaced,
                            parser.name()
                        );
                    }
                    metadata.insert(parser.name(), tree);
                }
                None => {
                    log::debug!("Metadata extension {} has nothing to write", parser.name());
                }
            }
        }
    }
}

impl Default for MetadataParsers {
    fn default() -> Self {
        Self::with_defaults(&ClassicWorldOptions::default())
    }
}
