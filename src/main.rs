//! CodonSoup - CLI Entry Point
//!
//! Runs generations of the genome soup against a local gene pool.

use clap::{Parser, Subcommand};
use codonsoup::evolution::{Evolution, GenePool, Offline, Submission};
use codonsoup::genetics::{express, gene_report};
use codonsoup::{benchmark, Config, Genome};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "codonsoup")]
#[command(version)]
#[command(about = "Artificial-life soup of bacteria with emergent, circular genomes")]
struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Quiet mode: only warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run generations of the simulation
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Number of generations to run
        #[arg(short, long)]
        generations: Option<u32>,

        /// Simulation ticks per generation
        #[arg(short, long)]
        ticks: Option<u64>,

        /// Initial population size
        #[arg(short, long)]
        population: Option<usize>,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Genome (JSON array) that founds the first generation
        #[arg(long)]
        genome: Option<PathBuf>,

        /// Gene pool file, loaded if present and saved after the run
        #[arg(long)]
        pool: Option<PathBuf>,

        /// Maximum genomes kept in the pool
        #[arg(long, default_value = "10000")]
        pool_size: usize,

        /// Write the best submission of the run as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Run without a gene pool; generations after the first use the starter genome
        #[arg(long)]
        offline: bool,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of ticks
        #[arg(short, long, default_value = "1000")]
        ticks: u64,

        /// Population size
        #[arg(short, long, default_value = "30")]
        population: usize,
    },

    /// Show the genes, proteins and phenotype of a genome
    Inspect {
        /// Genome file (JSON array); the starter genome when omitted
        genome: Option<PathBuf>,
    },
}

fn init_logging(level: &str, quiet: bool) {
    // Quiet always wins over the requested level
    let level = if quiet { "warn" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    log::debug!("Logging configured (level={}, quiet={})", level, quiet);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            generations,
            ticks,
            population,
            seed,
            genome,
            pool,
            pool_size,
            output,
            offline,
        } => {
            let mut config = if config.exists() {
                Config::from_file(&config)?
            } else {
                Config::default()
            };
            init_logging(
                cli.log_level.as_deref().unwrap_or(&config.logging.log_level),
                cli.quiet,
            );

            if let Some(g) = generations {
                config.run.generations = g;
            }
            if let Some(t) = ticks {
                config.run.ticks_per_generation = t;
            }
            if let Some(p) = population {
                config.run.initial_population = p;
            }
            if seed.is_some() {
                config.run.seed = seed;
            }
            config.validate()?;

            let options = RunOptions {
                genome,
                pool,
                pool_size,
                output,
                offline,
                quiet: cli.quiet,
            };
            run_generations(config, options)
        }

        Commands::Init { output } => {
            init_logging(cli.log_level.as_deref().unwrap_or("info"), cli.quiet);
            generate_config(output)
        }

        Commands::Benchmark { ticks, population } => {
            init_logging(cli.log_level.as_deref().unwrap_or("info"), cli.quiet);
            run_benchmark(ticks, population)
        }

        Commands::Inspect { genome } => {
            init_logging(cli.log_level.as_deref().unwrap_or("info"), cli.quiet);
            inspect_genome(genome)
        }
    }
}

struct RunOptions {
    genome: Option<PathBuf>,
    pool: Option<PathBuf>,
    pool_size: usize,
    output: Option<PathBuf>,
    offline: bool,
    quiet: bool,
}

fn run_generations(config: Config, options: RunOptions) -> Result<(), Box<dyn std::error::Error>> {
    let generations = config.run.generations;

    log::info!("CodonSoup starting");
    log::info!("  Generations: {}", generations);
    log::info!("  Ticks/gen: {}", config.run.ticks_per_generation);
    log::info!("  Initial pop: {}", config.run.initial_population);
    log::info!("  Grid size: {}x{}", config.world.grid_size, config.world.grid_size);

    let mut pool = match &options.pool {
        Some(path) if path.exists() => {
            let pool = GenePool::load_json(path)?;
            log::info!("Loaded gene pool from {:?} ({} genomes)", path, pool.len());
            pool
        }
        _ => GenePool::new(options.pool_size),
    };

    let mut evolution = Evolution::new(config);
    if let Some(path) = &options.genome {
        let genome = Genome::load_json(path)?;
        log::info!("Seeding first generation from {:?} (length: {})", path, genome.len());
        evolution = evolution.with_seed_genome(genome);
    }
    let mut best: Option<Submission> = None;
    let start = Instant::now();

    for _ in 0..generations {
        let report = if options.offline {
            evolution.run_generation(&mut Offline)
        } else {
            evolution.run_generation(&mut pool)
        };

        if !options.quiet {
            println!("Gen {:4} | {}", report.generation, report.stats.summary());
        }

        if let Some(fittest) = report.fittest {
            if best.as_ref().map_or(true, |b| fittest.fitness > b.fitness) {
                best = Some(fittest);
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("=== Evolution Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Generations: {}", evolution.generation());

    if !options.offline {
        let status = pool.status();
        println!(
            "Pool: {} genomes, avg fitness {:.2}, top fitness {:.2}, avg length {:.1}",
            status.total_genomes, status.avg_fitness, status.top_fitness, status.avg_length
        );
        if let Some(path) = &options.pool {
            pool.save_json(path)?;
            println!("Gene pool: {:?}", path);
        }
    }

    match (&best, &options.output) {
        (Some(submission), Some(path)) => {
            submission.save_json(path)?;
            println!("Best genome (fitness {:.2}): {:?}", submission.fitness, path);
        }
        (Some(submission), None) => {
            println!(
                "Best fitness: {:.2} (genome length {})",
                submission.fitness,
                submission.genome.len()
            );
        }
        (None, _) => println!("Every generation collapsed"),
    }

    Ok(())
}

fn run_benchmark(ticks: u64, population: usize) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== CodonSoup Benchmark ===");
    println!("Ticks: {}", ticks);
    println!("Population: {}", population);
    println!();

    let result = benchmark(ticks, population);
    println!("{}", result);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}

fn inspect_genome(path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let genome = match &path {
        Some(p) => Genome::load_json(p)?,
        None => Genome::starter(),
    };

    println!("=== Genome ===");
    match &path {
        Some(p) => println!("File: {:?}", p),
        None => println!("Starter genome"),
    }
    println!("Length: {}", genome.len());
    println!();

    let report = gene_report(&genome);
    println!("Genes at base threshold: {}", report.len());
    for entry in &report {
        println!(
            "  @{:4} len {:2} -> {:?} {:+.3}{}",
            entry.gene.start,
            entry.protein.length,
            entry.protein.target,
            entry.protein.magnitude,
            if entry.protein.regulatory { " (regulatory)" } else { "" }
        );
    }

    let expression = express(genome.codons());
    let p = expression.phenotype;
    println!();
    println!("Expression threshold: {:.3}", expression.threshold);
    println!("Active genes: {}", expression.active_genes);
    println!(
        "Phenotype: speed={:.2}, turn={:.2}, photo={:.2}, eff={:.2}",
        p.speed, p.turn_rate, p.phototaxis, p.efficiency
    );

    Ok(())
}
