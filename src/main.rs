use anyhow::Result;
use clap::Parser;
use debdeps::{
    config::Config,
    introspect::BinutilsIntrospector,
    locator::DpkgLocator,
    output::{render, OutputFormat},
    resolver::DependencyResolver,
    scanner::BinaryScanner,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "debdeps")]
#[command(
    author,
    version,
    about = "Compute Debian package dependencies for compiled binaries"
)]
struct Cli {
    /// Files or directories to scan for ELF binaries
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Output format (oneline, multiline, json, table)
    #[arg(short, long)]
    format: Option<String>,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// With --output, also print to stdout
    #[arg(long, requires = "output")]
    tee: bool,

    /// Enable debug-level diagnostics on stderr
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load().unwrap_or_default();
    let format_str = cli.format.unwrap_or(config.default_format.clone());
    let format = OutputFormat::from_str(&format_str).map_err(|e| anyhow::anyhow!(e))?;
    // keep machine-readable formats free of progress noise
    let is_interactive = format == OutputFormat::Table;

    let mut locator = DpkgLocator::new();
    if let Some(dir) = config.symbols_dir {
        locator = locator.with_symbols_dir(dir);
    }
    if let Some(architecture) = config.architecture {
        locator = locator.with_architecture(architecture);
    }
    let introspector = BinutilsIntrospector::new();

    let progress = if is_interactive {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Scanning binaries...");
        Some(pb)
    } else {
        None
    };

    let mut scanner = BinaryScanner::new(&introspector);
    scanner.scan(&cli.paths).await?;
    let state = scanner.into_state();

    if let Some(ref pb) = progress {
        pb.set_message(format!(
            "Resolving dependencies of {} binaries...",
            state.scanned_count()
        ));
    }

    let resolver = DependencyResolver::new(&locator, &introspector);
    let dependencies = resolver.resolve(&state).await?;

    if let Some(pb) = progress {
        pb.finish_with_message(format!(
            "Resolved {} package dependencies",
            dependencies.len()
        ));
    }

    let rendered = render(&dependencies, format)?;
    if let Some(path) = cli.output {
        std::fs::write(&path, &rendered)?;
        if is_interactive && !cli.tee {
            println!("Results written to: {}", path.display());
        }
        if cli.tee && !rendered.is_empty() {
            println!("{}", rendered);
        }
    } else if !rendered.is_empty() {
        println!("{}", rendered);
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debdeps=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
