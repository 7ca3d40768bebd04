use std::error::Error;

use clap::Parser;

use islandgen::cancel::CancelToken;
use islandgen::diamond_square::{self, DiamondSquareParams};
use islandgen::erosion::{self, ErosionPreset};
use islandgen::export;
use islandgen::grid::Grid;
use islandgen::island::{self, FeaturePointMode, IslandParams};
use islandgen::noise::{
    CellularNoise, DistanceMetric, DomainWarp, FractalField, FractalMode, GradientNoise,
    NoiseFieldParams, ValueNoise,
};
use islandgen::placement::{
    self, AltitudeBand, CompositeRule, LayerPlan, MoistureGradedRadius, PlacementParams, SlopeBand,
};
use islandgen::seeds::MapSeeds;
use islandgen::snapshot::WorldSnapshot;
use islandgen::terrain::TerrainState;
use islandgen::world::WorldContext;

#[derive(Parser, Debug)]
#[command(name = "islandgen")]
#[command(about = "Generate island heightmaps with erosion and tree placement")]
struct Args {
    /// Map width in cells (ignored by diamond-square)
    #[arg(short = 'W', long, default_value = "256")]
    width: usize,

    /// Map height in cells (ignored by diamond-square)
    #[arg(short = 'H', long, default_value = "256")]
    height: usize,

    /// Master seed (random if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Base generator: gradient, value, cellular, or diamond-square
    #[arg(short, long, default_value = "gradient")]
    generator: String,

    /// Grid size exponent for diamond-square (map is 2^power + 1)
    #[arg(long, default_value = "8")]
    power: u32,

    /// Initial diamond-square perturbation magnitude
    #[arg(long, default_value = "0.6")]
    roughness: f32,

    /// Base noise frequency (lower = larger features)
    #[arg(long, default_value = "0.02")]
    frequency: f64,

    /// Number of noise octaves (1-10)
    #[arg(long, default_value = "5")]
    octaves: u32,

    /// Amplitude falloff per octave
    #[arg(long, default_value = "0.5")]
    persistence: f64,

    /// Frequency growth per octave
    #[arg(long, default_value = "2.0")]
    lacunarity: f64,

    /// Fractal mode: fbm or ridged
    #[arg(long, default_value = "fbm")]
    fractal: String,

    /// Domain warp strength (0 disables warping)
    #[arg(long, default_value = "0.0")]
    warp: f64,

    /// Feature points for cellular noise
    #[arg(long, default_value = "24")]
    cell_points: usize,

    /// Distance metric for cellular noise and island shaping
    #[arg(long, default_value = "euclidean")]
    metric: String,

    /// Skip the island radial shaping pass
    #[arg(long)]
    no_island: bool,

    /// Island falloff radius as a fraction of the map's smaller side
    #[arg(long, default_value = "0.45")]
    island_radius: f32,

    /// Minimum island falloff factor
    #[arg(long, default_value = "0.02")]
    island_floor: f32,

    /// Sea level in [0, 1]
    #[arg(long, default_value = "0.35")]
    sea_level: f32,

    /// Erosion preset: none, minimal, normal, or dramatic
    #[arg(long, default_value = "normal")]
    erosion: String,

    /// Skip tree placement
    #[arg(long)]
    no_trees: bool,

    /// Tree spacing far from water, in occupancy cells
    #[arg(long, default_value = "6.0")]
    tree_spacing: f32,

    /// Output PNG path
    #[arg(short, long, default_value = "island.png")]
    output: String,

    /// Write a world snapshot JSON to this path
    #[arg(long)]
    snapshot: Option<String>,
}

fn main() {
    if let Err(err) = run(Args::parse()) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let master = args.seed.unwrap_or_else(rand::random);
    let seeds = MapSeeds::from_master(master);
    println!("Master seed: {}", master);

    let fractal_mode: FractalMode = args.fractal.parse()?;
    let metric: DistanceMetric = args.metric.parse()?;

    // Stage 1: base heightmap.
    println!("Generating base heightmap ({})...", args.generator);
    let mut heights = generate_base(&args, &seeds, fractal_mode, metric)?;
    let (w, h) = (heights.width, heights.height);
    println!("  {}x{} cells", w, h);

    // Stage 2: island shaping.
    if !args.no_island {
        println!("Shaping island falloff...");
        let radius = w.min(h) as f32 * args.island_radius;
        let params = IslandParams {
            mode: FeaturePointMode::Center,
            radius,
            floor: args.island_floor,
            metric,
            strength: 1.0,
            seed: seeds.island,
            ..IslandParams::default()
        };
        island::shape(&mut heights, &params);
    }

    // Stage 3: hydraulic erosion.
    let preset: ErosionPreset = match args.erosion.as_str() {
        "none" => ErosionPreset::None,
        "minimal" => ErosionPreset::Minimal,
        "normal" => ErosionPreset::Normal,
        "dramatic" => ErosionPreset::Dramatic,
        other => return Err(format!("unknown erosion preset '{}'", other).into()),
    };
    let erosion_params = preset.params(seeds.erosion);
    if erosion_params.iterations > 0 {
        println!(
            "Eroding ({} iterations, {})...",
            erosion_params.iterations, preset
        );
        let mut observer = |iteration: usize, _heights: &Grid<f32>| {
            if (iteration + 1) % 100 == 0 {
                println!("  iteration {}", iteration + 1);
            }
        };
        let outcome = erosion::erode(
            &mut heights,
            args.sea_level,
            &erosion_params,
            &CancelToken::new(),
            Some(&mut observer),
        );
        println!(
            "  {} iterations, {:.3} rain injected",
            outcome.iterations_completed, outcome.rain_injected
        );
    }

    // Stage 4: world assembly and tree placement.
    let mut world = WorldContext::new(TerrainState::new(heights), args.sea_level);
    world.terrain_mut().refresh_slope();
    world.derive_moisture(16);

    if !args.no_trees {
        println!("Placing trees...");
        let rule = CompositeRule::new()
            .with(AltitudeBand {
                min: 0.01,
                max: 0.45,
            })
            .with(SlopeBand {
                min: 0.0,
                max: 0.08,
            });
        let radius = MoistureGradedRadius {
            near: (args.tree_spacing * 0.4).max(1.0),
            far: args.tree_spacing,
        };
        let plan = LayerPlan::new("trees", rule, Box::new(radius));
        let outcome = placement::scatter(
            &world,
            &[plan],
            &PlacementParams {
                seed: seeds.placement,
                ..PlacementParams::default()
            },
            &CancelToken::new(),
        )?;
        for layer in outcome.layers {
            let count = layer.cells.iter().filter(|(_, _, &v)| v).count();
            println!("  layer '{}': {} points", layer.id, count);
            world.insert_layer(layer)?;
        }
    }

    // Stage 5: outputs.
    export::export_with_layers(
        world.terrain().heights(),
        world.sea_level(),
        world.layers(),
        &args.output,
    )?;
    println!("Saved {}", args.output);

    if let Some(path) = &args.snapshot {
        let config = serde_json::json!({
            "master_seed": master,
            "generator": args.generator,
            "fractal": fractal_mode,
            "metric": metric,
            "erosion": erosion_params,
            "sea_level": args.sea_level,
        });
        let snapshot = WorldSnapshot::capture(&world, config);
        std::fs::write(path, snapshot.to_json()?)?;
        println!("Saved {}", path);
    }

    Ok(())
}

fn generate_base(
    args: &Args,
    seeds: &MapSeeds,
    mode: FractalMode,
    metric: DistanceMetric,
) -> Result<Grid<f32>, Box<dyn Error>> {
    let warp = if args.warp > 0.0 {
        Some(DomainWarp {
            strength: args.warp,
            scale: 0.5,
        })
    } else {
        None
    };
    let params = NoiseFieldParams {
        seed: seeds.heightmap,
        frequency: args.frequency,
        octaves: args.octaves,
        persistence: args.persistence,
        lacunarity: args.lacunarity,
        mode,
        warp,
        ..NoiseFieldParams::default()
    };

    match args.generator.as_str() {
        "gradient" => Ok(
            FractalField::new(GradientNoise::new(seeds.heightmap), params)
                .generate_map(args.width, args.height),
        ),
        "value" => Ok(FractalField::new(ValueNoise::new(seeds.heightmap), params)
            .generate_map(args.width, args.height)),
        "cellular" => {
            let source = CellularNoise::new(
                seeds.heightmap,
                args.cell_points,
                (args.width as f64, args.height as f64),
                metric,
                true,
            );
            // Cellular feature points live in map space.
            let params = NoiseFieldParams {
                frequency: 1.0,
                octaves: 1,
                warp: None,
                ..params
            };
            Ok(FractalField::new(source, params).generate_map(args.width, args.height))
        }
        "diamond-square" => Ok(diamond_square::generate(&DiamondSquareParams {
            power: args.power,
            roughness: args.roughness,
            seed: seeds.heightmap,
        })),
        other => Err(format!("unknown generator '{}'", other).into()),
    }
}
