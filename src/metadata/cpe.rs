use crate::error::Result;
use crate::metadata::MetadataStructure;
use crate::nbt;
use crate::options::WeatherPolicy;
use quartz_nbt::{NbtCompound, NbtTag};

const CPE: &str = "CPE";
const EXTENSION_VERSION: &str = "ExtensionVersion";

const CLICK_DISTANCE: &str = "ClickDistance";
const CUSTOM_BLOCKS: &str = "CustomBlocks";
const ENV_COLORS: &str = "EnvColors";
const ENV_MAP_APPEARANCE: &str = "EnvMapAppearance";
const ENV_WEATHER_TYPE: &str = "EnvWeatherType";

/// An `EnvColors` channel. Components are shorts on disk; -1 means "client default".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: i16,
    pub g: i16,
    pub b: i16,
}

impl Rgb {
    pub const DEFAULT: Rgb = Rgb {
        r: -1,
        g: -1,
        b: -1,
    };

    pub fn new(r: i16, g: i16, b: i16) -> Self {
        Rgb { r, g, b }
    }

    fn read(colors: &NbtCompound, channel: &str) -> Result<Self> {
        let parent = format!("{}/{}", CPE, ENV_COLORS);
        let tag = nbt::req_compound(colors, &parent, channel)?;
        let path = format!("{}/{}", parent, channel);
        Ok(Rgb {
            r: nbt::req_i16(tag, &path, "R")?,
            g: nbt::req_i16(tag, &path, "G")?,
            b: nbt::req_i16(tag, &path, "B")?,
        })
    }

    fn to_nbt(self) -> NbtCompound {
        let mut tag = NbtCompound::new();
        tag.insert("R", NbtTag::Short(self.r));
        tag.insert("G", NbtTag::Short(self.g));
        tag.insert("B", NbtTag::Short(self.b));
        tag
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Rgb::DEFAULT
    }
}

/// Classic Protocol Extension settings stored under `Metadata/CPE`.
///
/// Each sub-feature has a version marker; 0 means the sub-feature is absent
/// and it is written only when its marker is positive. The weather block has
/// no marker and is governed by [`WeatherPolicy`].
///
/// Loading claims the whole `CPE` compound. Sub-compounds not modelled here,
/// such as `BlockDefinitions` or `EnvMapAspect`, are dropped and are not kept
/// as foreign metadata. Read the raw tree through
/// [`ClassicWorldReader::root`](crate::ClassicWorldReader::root) before
/// loading if they are needed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CpeMetadata {
    pub click_distance_version: i32,
    pub click_distance: i16,

    pub custom_blocks_version: i32,
    pub custom_blocks_level: i16,
    pub custom_blocks_fallback: Vec<u8>,

    pub env_colors_version: i32,
    pub sky_color: Rgb,
    pub cloud_color: Rgb,
    pub fog_color: Rgb,
    pub ambient_color: Rgb,
    pub sunlight_color: Rgb,

    pub env_map_appearance_version: i32,
    pub texture_url: String,
    pub side_block: u8,
    pub edge_block: u8,
    pub side_level: i16,

    pub weather: Option<u8>,
    pub weather_policy: WeatherPolicy,
}

impl CpeMetadata {
    pub fn with_weather_policy(weather_policy: WeatherPolicy) -> Self {
        CpeMetadata {
            weather_policy,
            ..Default::default()
        }
    }

    /// Colors in their on-disk order.
    fn channels(&self) -> [(&'static str, Rgb); 5] {
        [
            ("Sky", self.sky_color),
            ("Cloud", self.cloud_color),
            ("Fog", self.fog_color),
            ("Ambient", self.ambient_color),
            ("Sunlight", self.sunlight_color),
        ]
    }

    fn read_cpe(&mut self, cpe: &NbtCompound) -> Result<()> {
        if let Some((version, tag)) = versioned(cpe, CLICK_DISTANCE) {
            let path = format!("{}/{}", CPE, CLICK_DISTANCE);
            self.click_distance = nbt::req_i16(tag, &path, "Distance")?;
            self.click_distance_version = version;
        }

        if let Some((version, tag)) = versioned(cpe, CUSTOM_BLOCKS) {
            let path = format!("{}/{}", CPE, CUSTOM_BLOCKS);
            self.custom_blocks_level = nbt::req_i16(tag, &path, "SupportLevel")?;
            self.custom_blocks_fallback = nbt::req_bytes(tag, &path, "Fallback")?;
            self.custom_blocks_version = version;
        }

        if let Some((version, tag)) = versioned(cpe, ENV_COLORS) {
            self.sky_color = Rgb::read(tag, "Sky")?;
            self.cloud_color = Rgb::read(tag, "Cloud")?;
            self.fog_color = Rgb::read(tag, "Fog")?;
            self.ambient_color = Rgb::read(tag, "Ambient")?;
            self.sunlight_color = Rgb::read(tag, "Sunlight")?;
            self.env_colors_version = version;
        }

        if let Some((version, tag)) = versioned(cpe, ENV_MAP_APPEARANCE) {
            let path = format!("{}/{}", CPE, ENV_MAP_APPEARANCE);
            self.texture_url = nbt::req_string(tag, &path, "TextureURL")?;
            self.side_block = nbt::req_u8(tag, &path, "SideBlock")?;
            self.edge_block = nbt::req_u8(tag, &path, "EdgeBlock")?;
            self.side_level = nbt::req_i16(tag, &path, "SideLevel")?;
            self.env_map_appearance_version = version;
        }

        if let Some(tag) = nbt::opt_compound(cpe, ENV_WEATHER_TYPE) {
            let path = format!("{}/{}", CPE, ENV_WEATHER_TYPE);
            self.weather = Some(nbt::req_u8(tag, &path, "WeatherType")?);
        }

        Ok(())
    }
}

/// The sub-feature compound `name` and its version marker, if both exist.
fn versioned<'a>(cpe: &'a NbtCompound, name: &str) -> Option<(i32, &'a NbtCompound)> {
    let tag = nbt::opt_compound(cpe, name)?;
    match nbt::opt_i32(tag, EXTENSION_VERSION) {
        Some(version) => Some((version, tag)),
        None => {
            log::warn!("CPE {} has no {}, skipping", name, EXTENSION_VERSION);
            None
        }
    }
}

fn with_version(version: i32) -> NbtCompound {
    let mut tag = NbtCompound::new();
    tag.insert(EXTENSION_VERSION, NbtTag::Int(version));
    tag
}

impl MetadataStructure for CpeMetadata {
    fn name(&self) -> &'static str {
        CPE
    }

    fn read(&mut self, metadata: &mut NbtCompound) -> Result<()> {
        let Some(cpe) = nbt::take_compound(metadata, CPE) else {
            return Ok(());
        };
        self.read_cpe(&cpe)
    }

    fn write(&self) -> Option<NbtCompound> {
        let mut cpe = NbtCompound::new();

        if self.click_distance_version > 0 {
            let mut tag = with_version(self.click_distance_version);
            tag.insert("Distance", NbtTag::Short(self.click_distance));
            cpe.insert(CLICK_DISTANCE, tag);
        }

        if self.custom_blocks_version > 0 {
            let mut tag = with_version(self.custom_blocks_version);
            tag.insert("SupportLevel", NbtTag::Short(self.custom_blocks_level));
            tag.insert("Fallback", nbt::byte_array(&self.custom_blocks_fallback));
            cpe.insert(CUSTOM_BLOCKS, tag);
        }

        if self.env_colors_version > 0 {
            let mut tag = with_version(self.env_colors_version);
            for (channel, color) in self.channels() {
                tag.insert(channel, color.to_nbt());
            }
            cpe.insert(ENV_COLORS, tag);
        }

        if self.env_map_appearance_version > 0 {
            let mut tag = with_version(self.env_map_appearance_version);
            tag.insert("TextureURL", NbtTag::String(self.texture_url.clone()));
            tag.insert("SideBlock", NbtTag::Byte(self.side_block as i8));
            tag.insert("EdgeBlock", NbtTag::Byte(self.edge_block as i8));
            tag.insert("SideLevel", NbtTag::Short(self.side_level));
            cpe.insert(ENV_MAP_APPEARANCE, tag);
        }

        let weather = match self.weather_policy {
            WeatherPolicy::WhenPresent => self.weather,
            WeatherPolicy::Always => Some(self.weather.unwrap_or(0)),
        };
        if let Some(weather) = weather {
            let mut tag = NbtCompound::new();
            tag.insert("WeatherType", NbtTag::Byte(weather as i8));
            cpe.insert(ENV_WEATHER_TYPE, tag);
        }

        if cpe.inner().is_empty() {
            None
        } else {
            Some(cpe)
        }
    }
}
