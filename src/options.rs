use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Name given to maps whose file carries no `Name` tag.
pub const DEFAULT_MAP_NAME: &str = "ClassicWorldMap";

/// When the CPE `EnvWeatherType` block is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherPolicy {
    /// Only when a weather value was loaded or assigned.
    #[default]
    WhenPresent,
    /// On every save, as 0 (sunny) when no value is set.
    Always,
}

/// Load and save policies for ClassicWorld maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassicWorldOptions {
    /// Name used when the file has no `Name` tag. `None` makes a missing name a format error.
    #[serde(default = "default_missing_name")]
    pub missing_name: Option<String>,
    #[serde(default)]
    pub weather_policy: WeatherPolicy,
    /// Write `TimeCreated`/`LastAccessed`/`LastModified` even when they are 0.
    #[serde(default = "default_true")]
    pub write_zero_timestamps: bool,
    /// Gzip level, 0-9.
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,
}

fn default_missing_name() -> Option<String> {
    Some(DEFAULT_MAP_NAME.to_string())
}
fn default_true() -> bool {
    true
}
fn default_compression_level() -> u32 {
    6
}

impl Default for ClassicWorldOptions {
    fn default() -> Self {
        ClassicWorldOptions {
            missing_name: default_missing_name(),
            weather_policy: WeatherPolicy::default(),
            write_zero_timestamps: true,
            compression_level: default_compression_level(),
        }
    }
}

impl ClassicWorldOptions {
    /// Parse options from JSON; absent keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn compression(&self) -> flate2::Compression {
        flate2::Compression::new(self.compression_level.min(9))
    }
}
