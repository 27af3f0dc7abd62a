use std::path::PathBuf;

use clap::Parser;
use common::{
    plot::{DEFAULT_OUTPUT_DIR, plot_benchmarks},
    render::PngRenderer,
};
use eyre::{Context, Result};
use tracing::error;
use tracing_subscriber::{
    EnvFilter,
    fmt::{layer, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const USAGE: &str = "Usage: bench-plot <csv_file> [output_dir]";

/// Render one bar chart per benchmark from a results CSV
#[derive(Parser)]
#[command(version, override_usage = "bench-plot <csv_file> [output_dir]")]
struct Cli {
    /// CSV with benchmark_name, setting, dataset and benchmark_time columns
    csv_file: Option<PathBuf>,
    /// Directory the PNG files are written to
    output_dir: Option<PathBuf>,
    /// Extra tracing filter directives, ie. common=debug
    #[arg(short, long)]
    log: Vec<String>,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_logging(&args.log)?;

    let Some(csv_file) = args.csv_file else {
        println!("{USAGE}");
        std::process::exit(1);
    };
    let output_dir = args
        .output_dir
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

    let saved_in = match plot_benchmarks(&csv_file, &output_dir, &mut PngRenderer::default())
        .with_context(|| format!("Plotting {csv_file:?}"))
    {
        Ok(dir) => dir,
        Err(err) => {
            error!("{err:#}");
            return Err(err);
        }
    };
    println!("Plots saved in: {}", saved_in.display());
    Ok(())
}

fn init_logging(directives: &[String]) -> Result<()> {
    let log_level = std::env::var("RUST_LOG").unwrap_or("warn".to_owned());
    let mut env_filter = EnvFilter::new(format!("bench_plot={log_level}"));
    if !directives.iter().any(|x| x.starts_with("common")) {
        env_filter = env_filter.add_directive(format!("common={log_level}").parse()?);
    }
    for directive in directives {
        env_filter = env_filter.add_directive(directive.parse()?);
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            layer()
                .with_timer(ChronoLocal::new("%v %k:%M:%S %z".to_owned()))
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
    Ok(())
}
