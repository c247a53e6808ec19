use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use gn_community::config::{Algorithm, RunConfig};
use gn_community::loader::{describe_partition, load_edge_list, unescape_delimiter, write_results};
use gn_community::logger::init_logger;
use gn_community::{best_partition, modularity, run_exact, run_incremental, run_sampling_detection};

/// Girvan-Newman community detection on an edge list.
#[derive(Debug, Parser)]
#[command(name = "gn-community", version)]
struct Cli {
    /// Input edge list, two vertex names per line.
    #[arg(short, long)]
    input: PathBuf,

    /// Token delimiter of the edge list (`\t` and `\s` are understood).
    #[arg(short, long)]
    delimiter: Option<String>,

    /// Output prefix, results go to <prefix>_partition.txt and <prefix>_metrics.txt.
    #[arg(short, long)]
    output: Option<String>,

    /// Betweenness backend.
    #[arg(short, long, value_enum)]
    algorithm: Option<Algorithm>,

    /// YAML run configuration, flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sampling accuracy, in (0, 1).
    #[arg(long)]
    epsilon: Option<f64>,

    /// Sampling failure probability, in (0, 1).
    #[arg(long)]
    delta: Option<f64>,

    /// Sample size scaling constant.
    #[arg(long)]
    c: Option<f64>,

    /// Known vertex diameter, skips the estimation.
    #[arg(long)]
    vertex_diameter: Option<u32>,

    /// Samples used to estimate the vertex diameter.
    #[arg(long)]
    vd_samples: Option<u32>,

    /// Seed of the random source, entropy when absent.
    #[arg(long)]
    seed: Option<u64>,

    /// Directory of the log file.
    #[arg(long)]
    log_dir: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<(PathBuf, RunConfig)> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_yaml_file(path)?,
            None => RunConfig::default(),
        };
        if let Some(delimiter) = self.delimiter {
            config.delimiter = delimiter;
        }
        if let Some(output) = self.output {
            config.output_prefix = output;
        }
        if let Some(algorithm) = self.algorithm {
            config.algorithm = algorithm;
        }
        if let Some(log_dir) = self.log_dir {
            config.log_dir = log_dir;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        let sampling = &mut config.sampling;
        if let Some(epsilon) = self.epsilon {
            sampling.epsilon = epsilon;
        }
        if let Some(delta) = self.delta {
            sampling.delta = delta;
        }
        if let Some(c) = self.c {
            sampling.c = c;
        }
        if self.vertex_diameter.is_some() {
            sampling.vertex_diameter = self.vertex_diameter;
        }
        if let Some(vd_samples) = self.vd_samples {
            sampling.vd_samples = vd_samples;
        }
        Ok((self.input, config))
    }
}

fn main() -> Result<()> {
    let (input, config) = Cli::parse().into_config()?;
    init_logger(&config.log_dir)?;
    info!("Run config: {:?}", config);

    let delimiter = unescape_delimiter(&config.delimiter);
    let graph = load_edge_list(&input, &delimiter)?;
    info!(
        "Loaded {}: {} vertices, {} edges",
        input.display(),
        graph.get_vertex_count(),
        graph.get_edge_count()
    );

    let partitions = match config.algorithm {
        Algorithm::Gn => run_exact(&graph),
        Algorithm::GnIncremental => run_incremental(&graph),
        Algorithm::Bsa => {
            let rng = match config.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            run_sampling_detection(&graph, &config.sampling, rng)
                .context("betweenness sampling failed")?
        }
    };

    // Keep the highest modularity cut rather than the last, usually trivial, one.
    let (partition, q) = match best_partition(&graph, &partitions)? {
        Some((partition, q)) => (partition.clone(), q),
        None => {
            info!("No partitions produced, the graph has no edges");
            let components = graph.connected_components();
            let q = modularity(&graph, &components)?;
            (components, q)
        }
    };
    info!(
        "Best partition: {} communities, modularity {}",
        partition.community_count(),
        q
    );
    debug!("Communities:\n{}", describe_partition(&graph, &partition));

    let (partition_path, metrics_path) = write_results(&config.output_prefix, &graph, &partition, q)?;
    println!("Wrote {} and {}", partition_path, metrics_path);
    Ok(())
}
