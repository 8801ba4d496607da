use classicworld::{
    ClassicWorld, ClassicWorldReader, CreatedBy, MapGenerator, MetadataParsers, MetadataStructure,
    Rgb, Spawn,
};
use flate2::write::GzEncoder;
use flate2::Compression;
use quartz_nbt::io::Flavor;
use quartz_nbt::{NbtCompound, NbtList, NbtTag};

fn encode(root: &NbtCompound) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    quartz_nbt::io::write_nbt(&mut encoder, Some("ClassicWorld"), root, Flavor::Uncompressed)
        .unwrap();
    encoder.finish().unwrap()
}

fn decode(data: &[u8]) -> NbtCompound {
    let mut gz = flate2::read::GzDecoder::new(data);
    quartz_nbt::io::read_nbt(&mut gz, Flavor::Uncompressed)
        .unwrap()
        .0
}

fn metadata_of(root: &NbtCompound) -> NbtCompound {
    match root.inner().get("Metadata") {
        Some(NbtTag::Compound(metadata)) => metadata.clone(),
        other => panic!("Metadata missing: {:?}", other),
    }
}

/// Foreign tags with some nesting, as a server plugin might write them.
fn foreign_tags() -> Vec<(&'static str, NbtTag)> {
    let mut zone = NbtCompound::new();
    zone.insert("Name", NbtTag::String("spawn".to_string()));
    zone.insert("Min", NbtTag::IntArray(vec![0, 0, 0]));
    zone.insert("Max", NbtTag::IntArray(vec![10, 5, 10]));

    let mut plugin = NbtCompound::new();
    plugin.insert("Version", NbtTag::Byte(3));
    plugin.insert(
        "Zones",
        NbtTag::List(NbtList::from(vec![NbtTag::Compound(zone)])),
    );
    plugin.insert("Motd", NbtTag::String("-hax +fly".to_string()));
    plugin.insert("Heights", NbtTag::LongArray(vec![i64::MIN, 0, i64::MAX]));

    vec![
        ("MCGalaxy", NbtTag::Compound(plugin)),
        ("Seed", NbtTag::Long(-1234567890123)),
        ("Ratio", NbtTag::Double(0.25)),
        ("Raw", NbtTag::ByteArray(vec![-128, 0, 127])),
    ]
}

fn populated_world() -> ClassicWorld {
    let mut world = ClassicWorld::new(8, 4, 6);
    world.name = "Populated".to_string();
    world.created_by = Some(CreatedBy {
        service: "ClassiCube".to_string(),
        username: "builder".to_string(),
    });
    world.map_generator = Some(MapGenerator {
        software: "classicworld-tests".to_string(),
        generator_name: "flat".to_string(),
    });
    world.spawn = Spawn {
        x: 128,
        y: 96,
        z: 160,
        heading: 200,
        pitch: 250,
    };
    for (i, block) in world.blocks.iter_mut().enumerate() {
        *block = (i % 256) as u8;
    }
    world.time_created = 1_400_000_000;
    world.last_modified = 1_500_000_000;

    let cpe = world.cpe_mut().unwrap();
    cpe.click_distance_version = 1;
    cpe.click_distance = 640;
    cpe.custom_blocks_version = 1;
    cpe.custom_blocks_level = 1;
    cpe.custom_blocks_fallback = (0..=255).collect();
    cpe.env_colors_version = 1;
    cpe.sky_color = Rgb::new(153, 204, 255);
    cpe.cloud_color = Rgb::new(255, 255, 255);
    cpe.fog_color = Rgb::DEFAULT;
    cpe.ambient_color = Rgb::new(155, 155, 155);
    cpe.sunlight_color = Rgb::new(255, 250, 240);
    cpe.env_map_appearance_version = 1;
    cpe.texture_url = "http://example.com/terrain.png".to_string();
    cpe.side_block = 7;
    cpe.edge_block = 8;
    cpe.side_level = 2;
    cpe.weather = Some(1);
    world
}

#[test]
fn test_scenario_small_map() {
    let mut world = ClassicWorld::new(2, 2, 2);
    world.name = "T".to_string();

    let bytes = world.to_bytes().unwrap();
    let loaded = ClassicWorld::from_bytes(&bytes).unwrap();

    assert_eq!((loaded.size_x, loaded.size_y, loaded.size_z), (2, 2, 2));
    assert_eq!(loaded.name, "T");
    assert_eq!(loaded.blocks.len(), 8);
    assert_eq!(loaded.format_version, 1);
    assert_eq!(loaded.uuid, world.uuid);
}

#[test]
fn test_roundtrip_preserves_every_field() {
    let world = populated_world();
    let bytes = world.to_bytes().unwrap();
    let mut loaded = ClassicWorld::from_bytes(&bytes).unwrap();

    assert!(loaded.last_accessed >= world.last_accessed);
    loaded.last_accessed = world.last_accessed;
    assert_eq!(loaded, world);
}

#[test]
fn test_last_accessed_touched_only_when_set() {
    let mut world = ClassicWorld::new(1, 1, 1);
    world.last_accessed = 0;
    let loaded = ClassicWorld::from_bytes(&world.to_bytes().unwrap()).unwrap();
    assert_eq!(loaded.last_accessed, 0);

    world.last_accessed = 1000;
    let loaded = ClassicWorld::from_bytes(&world.to_bytes().unwrap()).unwrap();
    assert!(loaded.last_accessed > 1000);
    assert_eq!(loaded.time_created, world.time_created);
}

#[test]
fn test_foreign_tags_survive_two_cycles() {
    let world = ClassicWorld::new(2, 1, 2);
    let mut root = world.to_nbt();
    let mut metadata = NbtCompound::new();
    for (name, tag) in foreign_tags() {
        metadata.insert(name, tag);
    }
    let original = metadata.clone();
    root.insert("Metadata", metadata);

    let first = ClassicWorld::from_bytes(&encode(&root)).unwrap();
    assert_eq!(first.foreign_meta.len(), 4);
    assert!(first.cpe().unwrap().write().is_none());

    let saved = first.to_bytes().unwrap();
    let second = ClassicWorld::from_bytes(&saved).unwrap();
    assert_eq!(second.foreign_meta, first.foreign_meta);

    let resaved = decode(&second.to_bytes().unwrap());
    assert_eq!(metadata_of(&resaved), original);
}

#[test]
fn test_foreign_tags_kept_beside_cpe() {
    let mut world = populated_world();
    let mut root = world.to_nbt();
    let mut metadata = metadata_of(&root);
    for (name, tag) in foreign_tags() {
        metadata.insert(name, tag);
    }
    root.insert("Metadata", metadata);

    let loaded = ClassicWorld::from_bytes(&encode(&root)).unwrap();
    assert_eq!(loaded.foreign_meta.len(), 4);
    assert!(loaded.foreign_meta.get("CPE").is_none());
    assert_eq!(loaded.cpe(), world.cpe());

    let names: Vec<String> = metadata_of(&decode(&loaded.to_bytes().unwrap()))
        .inner()
        .keys()
        .cloned()
        .collect();
    assert_eq!(names, vec!["MCGalaxy", "Seed", "Ratio", "Raw", "CPE"]);

    world.foreign_meta = loaded.foreign_meta.clone();
    assert_eq!(
        metadata_of(&decode(&world.to_bytes().unwrap())),
        metadata_of(&decode(&loaded.to_bytes().unwrap()))
    );
}

#[test]
fn test_cpe_sub_features_toggle_independently() {
    let mut world = ClassicWorld::new(1, 1, 1);
    world.cpe_mut().unwrap().click_distance_version = 1;
    world.cpe_mut().unwrap().click_distance = 100;

    let metadata = metadata_of(&decode(&world.to_bytes().unwrap()));
    let cpe = match metadata.inner().get("CPE") {
        Some(NbtTag::Compound(cpe)) => cpe.clone(),
        other => panic!("CPE missing: {:?}", other),
    };
    let names: Vec<&str> = cpe.inner().keys().map(|k| k.as_str()).collect();
    assert_eq!(names, vec!["ClickDistance"]);

    world.cpe_mut().unwrap().click_distance_version = 0;
    let metadata = metadata_of(&decode(&world.to_bytes().unwrap()));
    assert!(metadata.inner().get("CPE").is_none());
}

#[test]
fn test_cpe_becomes_foreign_without_parser() {
    let world = populated_world();
    let bytes = world.to_bytes().unwrap();

    let mut reader = ClassicWorldReader::from_bytes(&bytes).unwrap();
    *reader.parsers_mut() = MetadataParsers::new();
    let loaded = reader.load().unwrap();

    assert!(loaded.cpe().is_none());
    assert!(loaded.foreign_meta.get("CPE").is_some());
    assert_eq!(
        metadata_of(&decode(&loaded.to_bytes().unwrap())),
        metadata_of(&decode(&bytes))
    );
}

#[test]
fn test_save_and_load_path() {
    let path = std::env::temp_dir().join(format!(
        "classicworld-roundtrip-{}.cw",
        std::process::id()
    ));
    let mut world = ClassicWorld::new(16, 8, 16);
    world.name = "OnDisk".to_string();
    world.set_block(3, 4, 5, 49);
    world.save(&path).unwrap();

    let loaded = ClassicWorld::from_path(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded.name, "OnDisk");
    assert_eq!(loaded.get_block(3, 4, 5), Some(49));
    assert_eq!(loaded.blocks.iter().filter(|&&b| b != 0).count(), 1);
}
