use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::PathBuf,
    process::ExitCode,
};

use cachesim::{
    CacheConfig, CacheSystem,
    error::{ConfigError, SimError},
    replay,
};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

/// Replays a memory trace through an exclusive L1/L2 cache and writes the
/// per-access outcome codes.
#[derive(Parser, Debug)]
#[command(about)]
struct Args {
    /// Cache config with `L1:` and `L2:` records
    config: PathBuf,
    /// Trace of `R`/`W` accesses with hex addresses
    trace: PathBuf,
    /// Output file, defaults to `<trace>.out`
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn run(args: &Args) -> Result<(), SimError> {
    let config = CacheConfig::load(&args.config)?;
    let (l1, l2) = config.geometries()?;
    for (name, g) in [("L1", &l1), ("L2", &l2)] {
        info!(
            "{name}: {} B blocks, {} sets x {} ways ({} tag / {} index / {} offset bits)",
            g.block_size(),
            g.num_sets(),
            g.ways(),
            g.tag_bits(),
            g.index_bits(),
            g.offset_bits()
        );
    }

    let output = args.output.clone().unwrap_or_else(|| {
        let mut name = args.trace.clone().into_os_string();
        name.push(".out");
        PathBuf::from(name)
    });
    let reader = BufReader::new(File::open(&args.trace)?);
    let writer = BufWriter::new(File::create(&output)?);

    let mut system = CacheSystem::new(l1, l2);
    let stats = replay(&mut system, reader, writer)?;
    info!("{stats}");
    info!("results written to {}", output.display());
    Ok(())
}

fn main() -> ExitCode {
    fmt::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e @ SimError::Config(ConfigError::BlockSizeMismatch { .. })) => {
            error!("{e}");
            ExitCode::from(1)
        }
        Err(e) => {
            error!("{e}");
            ExitCode::from(2)
        }
    }
}
