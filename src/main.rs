use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;

use slab_generator::catalog::Catalog;
use slab_generator::codec;
use slab_generator::export;
use slab_generator::generator::Generator;
use slab_generator::settings::{GenerationSpec, GeneratorConfig};

#[derive(Parser, Debug)]
#[command(name = "slab_generator")]
#[command(about = "Generate tabletop terrain slabs from noise fields")]
struct Args {
    /// Random seed (uses a random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Block width in tiles
    #[arg(short = 'x', long, default_value = "10")]
    width: usize,

    /// Block depth in tiles
    #[arg(short = 'y', long, default_value = "10")]
    depth: usize,

    /// Linear height scale
    #[arg(short = 'z', long, default_value = "10")]
    height_scale: f64,

    /// Redistribution exponent
    #[arg(long, default_value = "1.3")]
    exponent: f64,

    /// Octave weights, comma separated
    #[arg(long, default_value = "1,0.5,0.25,0.125", value_delimiter = ',')]
    octaves: Vec<f64>,

    /// Octave scale divisors, comma separated
    #[arg(long, default_value = "1,2,4,8", value_delimiter = ',')]
    scales: Vec<f64>,

    /// Fold elevation into ridge noise (good for deserts)
    #[arg(long)]
    ridge: bool,

    /// Drop an anchor tile at the field minimum (enable when lining up
    /// more than one block)
    #[arg(long)]
    precise_height: bool,

    /// Distribute terrain assets by height band instead of density share
    #[arg(long)]
    height_based_placement: bool,

    /// Blocks to generate along X
    #[arg(long, default_value = "1")]
    blocks_x: usize,

    /// Blocks to generate along Y
    #[arg(long, default_value = "1")]
    blocks_y: usize,

    /// Asset catalog JSON file
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Generation spec JSON (terrain + scatter asset settings)
    #[arg(short = 'g', long)]
    spec: Option<PathBuf>,

    /// Dump the elevation field to a PNG for inspection
    #[arg(long)]
    export_heightfield: Option<PathBuf>,

    /// Decode a slab string from a file and print its contents instead of
    /// generating
    #[arg(long)]
    decode: Option<PathBuf>,
}

fn main() {
    if let Err(e) = run(Args::parse()) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    if let Some(path) = &args.decode {
        return decode_file(path);
    }

    let catalog_path = args
        .catalog
        .as_ref()
        .ok_or("--catalog is required when generating")?;
    let spec_path = args
        .spec
        .as_ref()
        .ok_or("--spec is required when generating")?;

    let mut catalog = Catalog::load(catalog_path)?;
    let spec: GenerationSpec = serde_json::from_str(&fs::read_to_string(spec_path)?)?;

    let seed = args.seed.unwrap_or_else(rand::random);
    let config = GeneratorConfig {
        x: args.width,
        y: args.depth,
        z: args.height_scale,
        exponent: args.exponent,
        seed,
        octaves: args.octaves.clone(),
        scales: args.scales.clone(),
        use_ridge_noise: args.ridge,
        precise_height: args.precise_height,
        height_based_placement: args.height_based_placement,
    };

    let generator = Generator::new(config);
    println!("Generating with seed: {}", seed);
    println!(
        "Block size: {}x{} tiles, {}x{} blocks",
        args.width, args.depth, args.blocks_x, args.blocks_y
    );
    println!(
        "{} terrain asset(s), {} scatter asset(s) from {}",
        spec.terrain.len(),
        spec.scatter.len(),
        catalog_path.display()
    );

    let report = generator.generate(
        &mut catalog,
        &spec.terrain,
        &spec.scatter,
        (args.blocks_x, args.blocks_y),
    )?;

    if let Some(path) = &args.export_heightfield {
        export::export_heightfield(&report.elevation, &path.to_string_lossy())?;
        println!("Elevation field written to {}", path.display());
    }

    for block in &report.blocks {
        if block.encoded == codec::OVERSIZED_SENTINEL {
            println!(
                "Block {},{}: exceeds the client slab size limit; lower density or block size",
                block.x + 1,
                block.y + 1
            );
            continue;
        }
        println!("Block {},{}:", block.x + 1, block.y + 1);
        println!("{}", block.encoded);
    }

    Ok(())
}

fn decode_file(path: &PathBuf) -> Result<(), Box<dyn Error>> {
    let text = fs::read_to_string(path)?;
    let document = codec::decode(text.trim())?;

    println!("{} unique asset(s)", document.unique_asset_count);
    for bucket in document.buckets() {
        println!("  {} x{}", bucket.id, bucket.instance_count);
        for instance in &bucket.instances {
            println!(
                "    x: {} y: {} z: {} rot: {}",
                instance.x, instance.y, instance.z, instance.rot
            );
        }
    }
    Ok(())
}
