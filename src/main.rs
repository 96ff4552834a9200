//! # Terrasim Demo Entry Point
//!
//! Generates a world, building or cave from a seed and prints it, optionally
//! with an A* route drawn over the terrain.

use clap::{Parser, ValueEnum};
use terrasim::{
    generation::utils::create_rng, BuildingGenerator, CaveGenerator, Coordinate, Environment, GenerationConfig,
    Generator, GridKind, Pathfinder, TerraResult, TileKind, WorldGenerator,
};
#[cfg(feature = "dev-tools")]
use tracing::{info, Level};

#[cfg(not(feature = "dev-tools"))]
use log::info;

/// Output format for generated environments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Ascii,
    Json,
}

/// Command line arguments for the Terrasim demo.
#[derive(Parser, Debug)]
#[command(name = "terrasim")]
#[command(about = "Deterministic procedural terrain, placement and pathfinding")]
#[command(version)]
struct Args {
    /// Random seed for generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Environment to generate (world, building, cave)
    #[arg(short, long, default_value = "world")]
    kind: String,

    /// JSON file overriding generation settings
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// How to print the result
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Ascii)]
    format: OutputFormat,

    /// Route to plan on the first level, as x1,y1,x2,y2
    #[arg(short, long, value_parser = parse_route)]
    path: Option<(Coordinate, Coordinate)>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> TerraResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level)?;

    info!("Starting Terrasim v{}", terrasim::VERSION);

    let kind: GridKind = args.kind.parse()?;

    let mut config = match &args.config {
        Some(path) => GenerationConfig::from_json_file(path)?,
        None => GenerationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.validate()?;

    info!("Generating {} with seed {}", kind.name(), config.seed);
    let mut rng = create_rng(&config);

    match kind {
        GridKind::World => {
            let generator = WorldGenerator::new();
            let world = generator.generate(&config, &mut rng)?;
            generator.validate(&world, &config)?;
            print_levels(std::slice::from_ref(&world.overworld), &args)?;
            if args.format == OutputFormat::Ascii {
                for object in world.overworld.static_objects() {
                    println!("{:>8} at {} ({}x{})", object.kind.label(), object.position, object.width, object.height);
                }
            }
        }
        GridKind::Building => {
            let generator = BuildingGenerator::new(config.max_building_floors);
            let building = generator.generate(&config, &mut rng)?;
            generator.validate(&building, &config)?;
            print_levels(&building.levels, &args)?;
        }
        GridKind::Cave => {
            let generator = CaveGenerator::new(config.max_cave_levels);
            let cave = generator.generate(&config, &mut rng)?;
            generator.validate(&cave, &config)?;
            print_levels(&cave.levels, &args)?;
        }
    }

    Ok(())
}

/// Initializes the logging system based on the specified log level.
fn initialize_logging(log_level: &str) -> TerraResult<()> {
    #[cfg(feature = "dev-tools")]
    {
        let level = match log_level.to_lowercase().as_str() {
            "error" => Level::ERROR,
            "warn" => Level::WARN,
            "info" => Level::INFO,
            "debug" => Level::DEBUG,
            "trace" => Level::TRACE,
            _ => Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .init();
    }

    #[cfg(not(feature = "dev-tools"))]
    {
        let filter = log_level
            .parse::<log::LevelFilter>()
            .unwrap_or(log::LevelFilter::Warn);
        env_logger::Builder::new().filter_level(filter).init();
    }

    Ok(())
}

fn print_levels<T: TileKind>(levels: &[Environment<T>], args: &Args) -> TerraResult<()> {
    let route = match (args.path, levels.first()) {
        (Some((start, target)), Some(first)) => {
            let route = Pathfinder::new().find_path(first.grid(), start, target, T::MAX_WALKABLE);
            if route.is_empty() {
                eprintln!("no path from {start} to {target}");
            } else {
                eprintln!("path from {start} to {target}: {} tiles", route.len());
            }
            route
        }
        _ => Vec::new(),
    };

    match args.format {
        OutputFormat::Json => {
            let snapshots: Vec<_> = levels.iter().map(Environment::snapshot).collect();
            println!("{}", serde_json::to_string_pretty(&snapshots)?);
        }
        OutputFormat::Ascii => {
            for (index, level) in levels.iter().enumerate() {
                println!("{} {}:", level.kind().name(), index);
                let overlay = if index == 0 { route.as_slice() } else { &[] };
                print!("{}", draw(level, overlay));
            }
        }
    }
    Ok(())
}

/// Renders a level with route tiles drawn as `*`.
fn draw<T: TileKind>(level: &Environment<T>, route: &[Coordinate]) -> String {
    let grid = level.grid();
    let mut rows: Vec<Vec<char>> = grid.to_ascii().lines().map(|line| line.chars().collect()).collect();
    for c in route {
        if let Some(cell) = rows.get_mut(c.y as usize).and_then(|row| row.get_mut(c.x as usize)) {
            *cell = '*';
        }
    }
    rows.into_iter()
        .map(|row| row.into_iter().collect::<String>() + "\n")
        .collect()
}

fn parse_route(s: &str) -> Result<(Coordinate, Coordinate), String> {
    let parts: Vec<i32> = s
        .split(',')
        .map(|part| part.trim().parse::<i32>().map_err(|e| format!("{part:?}: {e}")))
        .collect::<Result<_, _>>()?;
    match parts.as_slice() {
        [x1, y1, x2, y2] => Ok((Coordinate::new(*x1, *y1), Coordinate::new(*x2, *y2))),
        _ => Err(format!("expected x1,y1,x2,y2, got {s:?}")),
    }
}
