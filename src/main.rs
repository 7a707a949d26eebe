use cardcrop::imaging::{CardTarget, FitMode, ImageSize, plan_card};
use cardcrop::{manifest, output, process};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cardcrop")]
#[command(version)]
#[command(about = "Batch-generate fixed-size social preview card images")]
#[command(long_about = "\
Batch-generate fixed-size social preview card images

Every source image, whatever its size or aspect ratio, becomes an opaque PNG
of exactly the target size. Sources and targets are listed in a TOML manifest:

  source_dir = \"blog/assets/blog-images\"
  output_dir = \"blog/assets/blog-images\"

  [[cards]]
  source = \"calm the storm.png\"
  output = \"twitter-calm-the-storm.png\"
  target = \"twitter\"               # stock: twitter 1200x628, og 1200x630

Fit modes:
  crop   center-crop to the target ratio, then resize
  fill   resize to cover the target, then center-crop the overflow

Run 'cardcrop gen-manifest' to print a documented manifest.")]
struct Cli {
    /// Log per-card geometry to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct RunArgs {
    /// Manifest listing the cards to generate
    #[arg(long, default_value = "cards.toml")]
    manifest: PathBuf,

    /// Override the manifest's source_dir (relative to the current directory)
    #[arg(long)]
    source_dir: Option<PathBuf>,

    /// Override the manifest's output_dir (relative to the current directory)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Print the batch report as JSON instead of progress lines
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct PlanArgs {
    /// Source size as WIDTHxHEIGHT, e.g. 2000x800
    #[arg(value_parser = parse_size)]
    size: ImageSize,

    /// Target name from the manifest (or the stock targets)
    #[arg(long, default_value = "twitter")]
    target: String,

    /// Manifest to read targets from
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Override the target's fit mode
    #[arg(long, value_enum)]
    mode: Option<FitMode>,
}

#[derive(Subcommand)]
enum Command {
    /// Generate every card in a manifest
    Run(RunArgs),
    /// Show the crop/resize steps for a source size without touching any file
    Plan(PlanArgs),
    /// Print a stock cards.toml with all options documented
    GenManifest,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Run(args) => {
            let report = run(args)?;
            if !report.is_success() {
                std::process::exit(1);
            }
        }
        Command::Plan(args) => {
            let target = resolve_target(&args)?;
            let plan = plan_card(args.size, &target)?;
            output::print_plan(args.size, target.size, &plan);
        }
        Command::GenManifest => {
            print!("{}", manifest::stock_manifest_toml());
        }
    }

    Ok(())
}

fn run(args: RunArgs) -> Result<process::BatchReport, Box<dyn std::error::Error>> {
    let mut cards = manifest::load_manifest(&args.manifest)?;
    if let Some(dir) = &args.source_dir {
        cards.source_dir = std::path::absolute(dir)?.to_string_lossy().into_owned();
    }
    if let Some(dir) = &args.output_dir {
        cards.output_dir = std::path::absolute(dir)?.to_string_lossy().into_owned();
    }

    let config = cards.card_config();
    let items = cards.items(&manifest::manifest_base(&args.manifest));

    if args.json {
        let report = process::process(&items, &config, None);
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(report);
    }

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_process_event(&event) {
                println!("{}", line);
            }
        }
    });
    let report = process::process(&items, &config, Some(tx));
    printer
        .join()
        .map_err(|_| "progress printer thread panicked")?;

    println!();
    output::print_summary(&report);
    Ok(report)
}

fn resolve_target(args: &PlanArgs) -> Result<CardTarget, Box<dyn std::error::Error>> {
    let targets = match &args.manifest {
        Some(path) => manifest::load_manifest(path)?.targets,
        None => manifest::Manifest::default().targets,
    };
    let mut target = targets
        .get(&args.target)
        .map(|t| t.card_target())
        .ok_or_else(|| format!("unknown target {:?}", args.target))?;
    if let Some(mode) = args.mode {
        target.mode = mode;
    }
    Ok(target)
}

/// Parse `WIDTHxHEIGHT`.
fn parse_size(s: &str) -> Result<ImageSize, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid dimension {v:?}: {e}"))
    };
    Ok(ImageSize::new(parse(w)?, parse(h)?))
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "cardcrop=debug" } else { "cardcrop=error" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
