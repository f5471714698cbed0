use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::info;
use std::path::Path;
use std::time::Instant;

use roadgen::{
    config::GeneratorConfig,
    generation::{Big, GenerateParameter},
    persistence::MapData,
    world::World,
};

#[derive(Parser)]
#[command(name = "roadgen")]
#[command(about = "Procedural road-network generation by randomized block placement")]
struct Args {
    /// Generator configuration file
    #[arg(short, long, default_value = "roadgen.toml")]
    config: String,

    /// Random seed for reproducible maps
    #[arg(short, long)]
    seed: Option<u64>,

    /// Block count (e.g. 7) or a sequence of block type codes (e.g. CrTRXOS)
    #[arg(short, long, default_value = "7")]
    map: String,

    /// Placement world
    #[arg(short, long, value_enum, default_value_t = WorldKind::Collision)]
    world: WorldKind,

    /// Write the generated map as JSON
    #[arg(short, long)]
    output: Option<String>,

    /// Enable verbose logging of every search step
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum WorldKind {
    /// Reject overlapping blocks
    Collision,
    /// Accept every placement
    Permissive,
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info })
        .init();

    let mut config = if Path::new(&args.config).exists() {
        info!("Loading generator configuration from: {}", &args.config);
        GeneratorConfig::load_from_file(&args.config)?
    } else {
        info!("No configuration at {}, using defaults", &args.config);
        GeneratorConfig::default()
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let world = match args.world {
        WorldKind::Collision => World::new_collision(),
        WorldKind::Permissive => World::new_permissive(),
    };

    let parameter = GenerateParameter::parse(&args.map);
    let started = Instant::now();
    let mut big = Big::new(&config, world)?;
    info!("Seed: {}", big.seed());
    big.generate(parameter.method(), parameter)?;

    let network = big.network();
    info!(
        "Generated {} blocks: {} nodes, {} bundles, {} lanes in {:.1?}",
        big.blocks().len() - 1,
        network.nodes().len(),
        network.bundle_count(),
        network.lane_count(),
        started.elapsed()
    );
    if let Some(bounds) = network.bounding_box() {
        info!("Extent: {:.1}m x {:.1}m", bounds.width(), bounds.height());
    }

    let recipe = big.recipe();
    info!("Sequence: {}", recipe.sequence());
    if let Some(output) = &args.output {
        MapData::from_network(recipe, network).save_json(output)?;
        info!("Map written to {}", output);
    }

    Ok(())
}
