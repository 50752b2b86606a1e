use anyhow::Result;
use clap::Parser;
use fire_graph_analyzer::config::Config;
use fire_graph_analyzer::{data, pipeline, storage};

#[derive(Parser, Debug)]
#[clap(
    name = "fire-graph-analyzer",
    about = "Multi-resolution proximity graphs and robustness analysis of fire detections"
)]
struct Cli {
    /// Path to input CSV or Parquet file with Latitude, Longitude and FRP columns
    #[clap(long)]
    input: String,

    /// Output directory for results
    #[clap(long, default_value = "graph_results")]
    output_dir: String,

    /// Optional JSON config file; flags below override its values
    #[clap(long)]
    config: Option<String>,

    /// Merge distance in km
    #[clap(long)]
    merge_distance_km: Option<f64>,

    /// Edge distance for the first level in km
    #[clap(long)]
    edge_distance_km_level1: Option<f64>,

    /// Edge distance for the coarsened level in km
    #[clap(long)]
    edge_distance_km_level2: Option<f64>,

    /// Seed for the random removal strategy
    #[clap(long)]
    seed: Option<u64>,

    /// Removal strategies to run (targeted, random)
    #[clap(long, value_delimiter = ',')]
    strategies: Option<Vec<String>>,

    /// Skip robustness analysis
    #[clap(long)]
    skip_robustness: bool,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

impl Cli {
    fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)?,
            None => Config::default(),
        };

        if let Some(value) = self.merge_distance_km {
            config.merge_distance_km = value;
        }
        if let Some(value) = self.edge_distance_km_level1 {
            config.edge_distance_km_level1 = value;
        }
        if let Some(value) = self.edge_distance_km_level2 {
            config.edge_distance_km_level2 = value;
        }
        if let Some(seed) = self.seed {
            config.robustness_seed = seed;
        }
        if let Some(strategies) = &self.strategies {
            config.robustness_strategies = strategies.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Cli::parse();

    // Configure logging
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    // Set number of threads
    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        // If threads = 0, use all available cores
        num_cpus::get()
    };

    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    let config = args.resolve_config()?;

    log::info!("Starting fire graph analysis");
    log::info!("Input: {}", args.input);
    log::info!("Output: {}", args.output_dir);
    log::debug!("Config: {:?}", config);

    // 1. Load records
    let records = data::table::load_event_table(&args.input)?;

    // 2. Build both resolution levels
    let levels = pipeline::build_levels(&records, &config)?;

    // 3. Communities of the final graph
    let communities = pipeline::detect_communities(&levels.regional, &config);

    // 4. Robustness of the final graph
    let reports = if args.skip_robustness {
        Vec::new()
    } else {
        pipeline::analyze(&levels.regional, &config)?
    };

    for report in &reports {
        log::info!(
            "{}: robustness index {:.4}",
            report.strategy,
            report.robustness_index()
        );
    }

    // 5. Save results
    storage::save_results(&levels, &communities, &reports, &args.output_dir)?;

    log::info!("Analysis complete. Results saved to {}", args.output_dir);

    Ok(())
}
