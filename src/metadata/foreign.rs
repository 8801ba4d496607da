use quartz_nbt::{NbtCompound, NbtTag};

pub const METADATA: &str = "Metadata";

/// Metadata tags no registered extension claimed, kept verbatim in capture order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForeignMeta {
    tags: Vec<(String, NbtTag)>,
}

impl ForeignMeta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move every tag left in `metadata` into the bag, leaving `metadata` empty.
    pub fn capture(&mut self, metadata: &mut NbtCompound) {
        let remaining = std::mem::replace(metadata, NbtCompound::new());
        self.tags = remaining.into_inner().into_iter().collect();
        if !self.tags.is_empty() {
            log::debug!("Captured {} foreign metadata tags", self.tags.len());
        }
    }

    /// A fresh `Metadata` compound holding the captured tags in capture order.
    pub fn to_nbt(&self) -> NbtCompound {
        let mut metadata = NbtCompound::new();
        for (name, tag) in &self.tags {
            metadata.insert(name.clone(), tag.clone());
        }
        metadata
    }

    pub fn get(&self, name: &str) -> Option<&NbtTag> {
        self.tags.iter().find(|(n, _)| n == name).map(|(_, tag)| tag)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
