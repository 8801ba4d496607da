use classicworld::{ClassicWorld, ClassicWorldOptions};
use console::style;
use std::collections::BTreeMap;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .expect("Usage: inspect_classicworld <map.cw> [options.json]");
    let options = match args.next() {
        Some(options_path) => {
            let json = std::fs::read_to_string(&options_path).expect("Failed to read options");
            ClassicWorldOptions::from_json(&json).expect("Invalid options")
        }
        None => ClassicWorldOptions::default(),
    };

    let data = std::fs::read(&path).expect("Failed to read file");
    let world = match ClassicWorld::from_bytes_with_options(&data, options) {
        Ok(world) => world,
        Err(e) => {
            eprintln!("{} {}", style("error:").red().bold(), e);
            std::process::exit(1);
        }
    };
    tracing::info!(path = %path, bytes = data.len(), "map loaded");

    println!("=== {} ===", style(&world.name).bold());
    println!(
        "UUID: {}",
        world
            .uuid
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<String>()
    );
    println!("Size: {}x{}x{}", world.size_x, world.size_y, world.size_z);
    println!(
        "Spawn: ({}, {}, {}) heading {} pitch {}",
        world.spawn.x, world.spawn.y, world.spawn.z, world.spawn.heading, world.spawn.pitch
    );
    if let Some(created_by) = &world.created_by {
        println!("Created by: {} on {}", created_by.username, created_by.service);
    }
    if let Some(generator) = &world.map_generator {
        println!("Generator: {} ({})", generator.generator_name, generator.software);
    }
    for (label, time) in [
        ("Created", world.time_created),
        ("Last accessed", world.last_accessed),
        ("Last modified", world.last_modified),
    ] {
        let text = chrono::DateTime::from_timestamp(time, 0)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| time.to_string());
        println!("{}: {}", label, text);
    }

    if let Some(cpe) = world.cpe() {
        println!("\n{}", style("CPE").cyan().bold());
        if cpe.click_distance_version > 0 {
            println!("  ClickDistance v{}: {}", cpe.click_distance_version, cpe.click_distance);
        }
        if cpe.custom_blocks_version > 0 {
            println!(
                "  CustomBlocks v{}: level {}, {} fallback entries",
                cpe.custom_blocks_version,
                cpe.custom_blocks_level,
                cpe.custom_blocks_fallback.len()
            );
        }
        if cpe.env_colors_version > 0 {
            println!(
                "  EnvColors v{}: sky {:?} cloud {:?} fog {:?} ambient {:?} sunlight {:?}",
                cpe.env_colors_version,
                cpe.sky_color,
                cpe.cloud_color,
                cpe.fog_color,
                cpe.ambient_color,
                cpe.sunlight_color
            );
        }
        if cpe.env_map_appearance_version > 0 {
            println!(
                "  EnvMapAppearance v{}: {} side {} edge {} level {}",
                cpe.env_map_appearance_version,
                cpe.texture_url,
                cpe.side_block,
                cpe.edge_block,
                cpe.side_level
            );
        }
        if let Some(weather) = cpe.weather {
            println!("  EnvWeatherType: {}", weather);
        }
    }

    if !world.foreign_meta.is_empty() {
        println!("\n{}", style("Foreign metadata").yellow().bold());
        for name in world.foreign_meta.names() {
            println!("  {}", name);
        }
    }

    // Sort by count
    let mut counts: BTreeMap<u8, usize> = BTreeMap::new();
    for &block in &world.blocks {
        *counts.entry(block).or_insert(0) += 1;
    }
    let mut sorted: Vec<_> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1));
    println!("\nBlocks ({} ids, {} cells):", sorted.len(), world.blocks.len());
    for (id, count) in sorted.iter().take(16) {
        println!("  {:>3}: {}", id, count);
    }
}
