//! Reader and writer for ClassicWorld (`.cw`) maps.
//!
//! A ClassicWorld file is a gzip-compressed NBT document rooted at
//! `ClassicWorld`. Known `Metadata` extensions (CPE) are parsed into typed
//! fields; every other metadata tag is carried through a load/save cycle
//! unchanged.
//!
//! ```no_run
//! use classicworld::ClassicWorld;
//!
//! let mut world = ClassicWorld::from_path("main.cw")?;
//! world.name = "Renamed".to_string();
//! if let Some(cpe) = world.cpe_mut() {
//!     cpe.click_distance_version = 1;
//!     cpe.click_distance = 160;
//! }
//! world.save("main.cw")?;
//! # Ok::<(), classicworld::ClassicWorldError>(())
//! ```

pub mod error;
pub mod metadata;
mod nbt;
pub mod options;
pub mod world;

pub use error::{ClassicWorldError, Result};
pub use metadata::{
    CpeMetadata, ForeignMeta, MetadataParser, MetadataParsers, MetadataStructure, Rgb,
};
pub use options::{ClassicWorldOptions, WeatherPolicy};
pub use world::{
    is_classicworld, ClassicWorld, ClassicWorldReader, CreatedBy, MapGenerator, Spawn,
};
