//! Octree builder binary: builds and flattens a world and reports its size.
//!
//! Usage: cargo run --release --bin build_octree -- [OPTIONS]
//!
//! Options:
//!   --config <PATH>          JSON world config (other options override it)
//!   --size <CELLS>           World edge length, power of 2 (default: 32)
//!   --shape <NAME>           sphere | tiled | checkerboard | terrain | solid | empty
//!   --parallel-depth <N>     Tree levels built in parallel (default: 2)
//!   --jobs <N>               Worker threads (default: all cores)

use std::path::PathBuf;

use sparsevox::core::Result;
use sparsevox::world::{self, WorldConfig, WorldShape};

fn main() -> Result<()> {
    sparsevox::core::logging::init();

    let args: Vec<String> = std::env::args().collect();

    let mut config = match parse_str_arg(&args, "--config") {
        Some(path) => WorldConfig::load(&PathBuf::from(path))?,
        None => WorldConfig::default(),
    };
    if let Some(size) = parse_u32_arg(&args, "--size") {
        config.size = size;
    }
    if let Some(name) = parse_str_arg(&args, "--shape") {
        config.shape = WorldShape::from_name(&name, config.size)?;
    }
    if let Some(depth) = parse_u32_arg(&args, "--parallel-depth") {
        config.parallel_depth = depth;
    }
    if let Some(jobs) = parse_u32_arg(&args, "--jobs") {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs as usize)
            .build_global()?;
    }

    println!("=== Sparse Voxel Octree Builder ===");
    println!("Size:  {}^3", config.size);
    println!("Shape: {:?}", config.shape);
    println!("Parallel depth: {}", config.parallel_depth);
    println!("Threads: {}", rayon::current_num_threads());
    println!();

    let start = std::time::Instant::now();
    let flat = world::generate(&config)?;
    let elapsed = start.elapsed();

    let stats = flat.stats();
    let dense_bytes = config.size as u64 * config.size as u64 * config.size as u64;
    println!("Nodes:     {} ({} internal, {} leaves)", stats.node_count, stats.internal_count, stats.leaf_count);
    println!("Buffer:    {} bytes", stats.byte_size);
    println!("Dense:     {} bytes (1 byte/cell)", dense_bytes);
    println!("Time:      {:.1}ms", elapsed.as_secs_f64() * 1000.0);

    Ok(())
}

fn parse_str_arg(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn parse_u32_arg(args: &[String], name: &str) -> Option<u32> {
    parse_str_arg(args, name).and_then(|v| v.parse().ok())
}
