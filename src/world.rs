use crate::error::{ClassicWorldError, Result};
use crate::metadata::foreign::METADATA;
use crate::metadata::{CpeMetadata, ForeignMeta, MetadataParsers};
use crate::nbt;
use crate::options::ClassicWorldOptions;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use quartz_nbt::io::Flavor;
use quartz_nbt::{NbtCompound, NbtTag};
use rand::rngs::OsRng;
use rand::RngCore;
use std::io::{BufReader, Read};
use std::path::Path;

pub const ROOT_NAME: &str = "ClassicWorld";
pub const FORMAT_VERSION: u8 = 1;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

// ─── Types ──────────────────────────────────────────────────────────────────

/// Where players appear. Heading and pitch are packed classic angles (256 = full turn).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Spawn {
    pub x: i16,
    pub y: i16,
    pub z: i16,
    pub heading: u8,
    pub pitch: u8,
}

/// The `CreatedBy` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedBy {
    pub service: String,
    pub username: String,
}

/// The `MapGenerator` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapGenerator {
    pub software: String,
    pub generator_name: String,
}

/// A ClassicWorld map.
///
/// Blocks are stored one byte per cell at index `(y * size_z + z) * size_x + x`.
/// Fields are public; nothing is validated on save.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassicWorld {
    pub format_version: u8,
    pub name: String,
    pub uuid: [u8; 16],
    pub size_x: i16,
    pub size_y: i16,
    pub size_z: i16,
    pub created_by: Option<CreatedBy>,
    pub map_generator: Option<MapGenerator>,
    /// Unix seconds.
    pub time_created: i64,
    pub last_accessed: i64,
    pub last_modified: i64,
    pub spawn: Spawn,
    pub blocks: Vec<u8>,
    pub foreign_meta: ForeignMeta,
    pub metadata_parsers: MetadataParsers,
    pub options: ClassicWorldOptions,
}

pub(crate) fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

fn volume(size_x: i16, size_y: i16, size_z: i16) -> usize {
    [size_x, size_y, size_z]
        .iter()
        .map(|&s| s.max(0) as usize)
        .product()
}

fn random_uuid() -> [u8; 16] {
    let mut uuid = [0u8; 16];
    OsRng.fill_bytes(&mut uuid);
    uuid
}

// ─── Construction ───────────────────────────────────────────────────────────

impl ClassicWorld {
    /// A blank map of the given size with a random UUID and all timestamps set to now.
    pub fn new(size_x: i16, size_y: i16, size_z: i16) -> Self {
        Self::with_options(size_x, size_y, size_z, ClassicWorldOptions::default())
    }

    pub fn with_options(
        size_x: i16,
        size_y: i16,
        size_z: i16,
        options: ClassicWorldOptions,
    ) -> Self {
        let now = unix_now();
        ClassicWorld {
            format_version: FORMAT_VERSION,
            name: options
                .missing_name
                .clone()
                .unwrap_or_else(|| crate::options::DEFAULT_MAP_NAME.to_string()),
            uuid: random_uuid(),
            size_x,
            size_y,
            size_z,
            created_by: None,
            map_generator: None,
            time_created: now,
            last_accessed: now,
            last_modified: now,
            spawn: Spawn::default(),
            blocks: vec![0; volume(size_x, size_y, size_z)],
            foreign_meta: ForeignMeta::new(),
            metadata_parsers: MetadataParsers::with_defaults(&options),
            options,
        }
    }

    /// Read and load a map from gzip-compressed (or raw) NBT bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        ClassicWorldReader::from_bytes(data)?.load()
    }

    pub fn from_bytes_with_options(data: &[u8], options: ClassicWorldOptions) -> Result<Self> {
        ClassicWorldReader::from_bytes_with_options(data, options)?.load()
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        ClassicWorldReader::from_path(path)?.load()
    }

    pub fn cpe(&self) -> Option<&CpeMetadata> {
        self.metadata_parsers.cpe()
    }

    pub fn cpe_mut(&mut self) -> Option<&mut CpeMetadata> {
        self.metadata_parsers.cpe_mut()
    }

    // ─── Blocks ─────────────────────────────────────────────────────────────

    pub fn volume(&self) -> usize {
        volume(self.size_x, self.size_y, self.size_z)
    }

    pub fn index(&self, x: usize, y: usize, z: usize) -> Option<usize> {
        let (sx, sy, sz) = (
            self.size_x.max(0) as usize,
            self.size_y.max(0) as usize,
            self.size_z.max(0) as usize,
        );
        if x >= sx || y >= sy || z >= sz {
            return None;
        }
        Some((y * sz + z) * sx + x)
    }

    pub fn get_block(&self, x: usize, y: usize, z: usize) -> Option<u8> {
        self.index(x, y, z).and_then(|i| self.blocks.get(i).copied())
    }

    /// Returns false when the position is outside the map.
    pub fn set_block(&mut self, x: usize, y: usize, z: usize, block: u8) -> bool {
        match self.index(x, y, z).and_then(|i| self.blocks.get_mut(i)) {
            Some(cell) => {
                *cell = block;
                true
            }
            None => false,
        }
    }

    pub fn mark_modified(&mut self) {
        self.last_modified = unix_now();
    }
}

// ─── Import ─────────────────────────────────────────────────────────────────

/// A decoded ClassicWorld document whose root name has been checked but whose
/// fields have not been parsed yet. Extension parsers can be adjusted before
/// [`ClassicWorldReader::load`].
#[derive(Debug, Clone)]
pub struct ClassicWorldReader {
    root: NbtCompound,
    parsers: MetadataParsers,
    options: ClassicWorldOptions,
}

fn decode(data: &[u8]) -> Result<(NbtCompound, String)> {
    let mut reader = BufReader::new(data);
    let (root, name) = if data.starts_with(&GZIP_MAGIC) {
        let mut gz = GzDecoder::new(reader);
        quartz_nbt::io::read_nbt(&mut gz, Flavor::Uncompressed)?
    } else {
        quartz_nbt::io::read_nbt(&mut reader, Flavor::Uncompressed)?
    };
    Ok((root, name))
}

/// Check whether `data` decodes to an NBT document rooted at `ClassicWorld`.
pub fn is_classicworld(data: &[u8]) -> bool {
    matches!(decode(data), Ok((_, name)) if name == ROOT_NAME)
}

fn read_pair(
    root: &NbtCompound,
    compound: &str,
    first: &str,
    second: &str,
) -> Option<(String, String)> {
    let tag = nbt::opt_compound(root, compound)?;
    match (nbt::opt_string(tag, first), nbt::opt_string(tag, second)) {
        (Some(a), Some(b)) => Some((a, b)),
        _ => {
            log::warn!(
                "{} is missing {} or {}, ignoring it",
                compound,
                first,
                second
            );
            None
        }
    }
}

impl ClassicWorldReader {
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ClassicWorldOptions::default())
    }

    pub fn from_bytes_with_options(data: &[u8], options: ClassicWorldOptions) -> Result<Self> {
        let (root, name) = decode(data)?;
        if name != ROOT_NAME {
            return Err(ClassicWorldError::format(format!(
                "Not a valid ClassicWorld file: root tag is '{}', expected '{}'",
                name, ROOT_NAME
            )));
        }
        Ok(ClassicWorldReader {
            root,
            parsers: MetadataParsers::with_defaults(&options),
            options,
        })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_path_with_options(path, ClassicWorldOptions::default())
    }

    pub fn from_path_with_options<P: AsRef<Path>>(
        path: P,
        options: ClassicWorldOptions,
    ) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Reading ClassicWorld map from {}", path.display());
        let mut data = Vec::new();
        std::fs::File::open(path)?.read_to_end(&mut data)?;
        Self::from_bytes_with_options(&data, options)
    }

    pub fn root(&self) -> &NbtCompound {
        &self.root
    }

    pub fn parsers_mut(&mut self) -> &mut MetadataParsers {
        &mut self.parsers
    }

    /// Parse every field, split the metadata and validate the result.
    pub fn load(self) -> Result<ClassicWorld> {
        let ClassicWorldReader {
            mut root,
            mut parsers,
            options,
        } = self;

        let format_version = nbt::opt_i64(&root, "FormatVersion");
        if format_version != Some(i64::from(FORMAT_VERSION)) {
            return Err(ClassicWorldError::format(match format_version {
                Some(v) => format!("Unsupported format version: {}", v),
                None => "FormatVersion not found.".to_string(),
            }));
        }

        let name = nbt::opt_string(&root, "Name").or_else(|| options.missing_name.clone());
        let uuid = match nbt::opt_bytes(&root, "UUID") {
            Some(bytes) => Some(<[u8; 16]>::try_from(bytes.as_slice()).map_err(|_| {
                ClassicWorldError::format(format!("UUID must be 16 bytes, found {}", bytes.len()))
            })?),
            None => None,
        };

        let size_x = nbt::opt_i16(&root, "X").unwrap_or(0);
        let size_y = nbt::opt_i16(&root, "Y").unwrap_or(0);
        let size_z = nbt::opt_i16(&root, "Z").unwrap_or(0);

        let created_by = read_pair(&root, "CreatedBy", "Service", "Username")
            .map(|(service, username)| CreatedBy { service, username });
        let map_generator = read_pair(&root, "MapGenerator", "Software", "MapGeneratorName")
            .map(|(software, generator_name)| MapGenerator {
                software,
                generator_name,
            });

        let time_created = nbt::opt_i64(&root, "TimeCreated").unwrap_or(0);
        let mut last_accessed = nbt::opt_i64(&root, "LastAccessed").unwrap_or(0);
        let last_modified = nbt::opt_i64(&root, "LastModified").unwrap_or(0);

        let spawn_tag = nbt::opt_compound(&root, "Spawn")
            .ok_or_else(|| ClassicWorldError::format("Spawn not found."))?;
        let spawn = Spawn {
            x: nbt::req_i16(spawn_tag, "Spawn", "X")?,
            y: nbt::req_i16(spawn_tag, "Spawn", "Y")?,
            z: nbt::req_i16(spawn_tag, "Spawn", "Z")?,
            heading: nbt::req_u8(spawn_tag, "Spawn", "H")?,
            pitch: nbt::req_u8(spawn_tag, "Spawn", "P")?,
        };

        let blocks = nbt::take_bytes(&mut root, "BlockArray")
            .ok_or_else(|| ClassicWorldError::format("BlockArray not found."))?;

        let mut foreign_meta = ForeignMeta::new();
        if let Some(mut metadata) = nbt::take_compound(&mut root, METADATA) {
            parsers.read_all(&mut metadata)?;
            foreign_meta.capture(&mut metadata);
        }

        if blocks.is_empty() {
            return Err(ClassicWorldError::format("BlockArray not found."));
        }
        if size_x <= 0 || size_y <= 0 || size_z <= 0 {
            return Err(ClassicWorldError::format("Map size not found."));
        }
        let (Some(name), Some(uuid)) = (name, uuid) else {
            return Err(ClassicWorldError::format("Map header information not found."));
        };
        let expected = volume(size_x, size_y, size_z);
        if blocks.len() != expected {
            return Err(ClassicWorldError::format(format!(
                "BlockArray has {} bytes, expected {} for a {}x{}x{} map",
                blocks.len(),
                expected,
                size_x,
                size_y,
                size_z
            )));
        }

        if last_accessed != 0 {
            last_accessed = unix_now();
        }

        log::debug!(
            "Loaded ClassicWorld map '{}' ({}x{}x{}, {} foreign metadata tags)",
            name,
            size_x,
            size_y,
            size_z,
            foreign_meta.len()
        );

        Ok(ClassicWorld {
            format_version: FORMAT_VERSION,
            name,
            uuid,
            size_x,
            size_y,
            size_z,
            created_by,
            map_generator,
            time_created,
            last_accessed,
            last_modified,
            spawn,
            blocks,
            foreign_meta,
            metadata_parsers: parsers,
            options,
        })
    }
}

// ─── Export ─────────────────────────────────────────────────────────────────

impl ClassicWorld {
    /// Assemble the `ClassicWorld` root compound in canonical tag order.
    pub fn to_nbt(&self) -> NbtCompound {
        let mut metadata = self.foreign_meta.to_nbt();
        self.metadata_parsers.write_all(&mut metadata);

        let mut spawn = NbtCompound::new();
        spawn.insert("X", NbtTag::Short(self.spawn.x));
        spawn.insert("Y", NbtTag::Short(self.spawn.y));
        spawn.insert("Z", NbtTag::Short(self.spawn.z));
        spawn.insert("H", NbtTag::Byte(self.spawn.heading as i8));
        spawn.insert("P", NbtTag::Byte(self.spawn.pitch as i8));

        let mut root = NbtCompound::new();
        root.insert("FormatVersion", NbtTag::Byte(FORMAT_VERSION as i8));
        root.insert("Name", NbtTag::String(self.name.clone()));
        root.insert("UUID", nbt::byte_array(&self.uuid));
        root.insert("X", NbtTag::Short(self.size_x));
        root.insert("Y", NbtTag::Short(self.size_y));
        root.insert("Z", NbtTag::Short(self.size_z));
        root.insert("Spawn", spawn);
        root.insert("BlockArray", nbt::byte_array(&self.blocks));
        root.insert(METADATA, metadata);

        if let Some(created_by) = &self.created_by {
            let mut tag = NbtCompound::new();
            tag.insert("Service", NbtTag::String(created_by.service.clone()));
            tag.insert("Username", NbtTag::String(created_by.username.clone()));
            root.insert("CreatedBy", tag);
        }

        if let Some(generator) = &self.map_generator {
            let mut tag = NbtCompound::new();
            tag.insert("Software", NbtTag::String(generator.software.clone()));
            tag.insert(
                "MapGeneratorName",
                NbtTag::String(generator.generator_name.clone()),
            );
            root.insert("MapGenerator", tag);
        }

        for (key, value) in [
            ("TimeCreated", self.time_created),
            ("LastAccessed", self.last_accessed),
            ("LastModified", self.last_modified),
        ] {
            if value != 0 || self.options.write_zero_timestamps {
                root.insert(key, NbtTag::Long(value));
            }
        }

        root
    }

    /// Serialize to gzip-compressed NBT.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let root = self.to_nbt();
        let mut encoder = GzEncoder::new(Vec::new(), self.options.compression());
        quartz_nbt::io::write_nbt(&mut encoder, Some(ROOT_NAME), &root, Flavor::Uncompressed)?;
        Ok(encoder.finish()?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        std::fs::write(path, &bytes)?;
        log::debug!(
            "Saved ClassicWorld map '{}' to {} ({} bytes)",
            self.name,
            path.display(),
            bytes.len()
        );
        Ok(())
    }
}
