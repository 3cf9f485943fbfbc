use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::Parser;
use log::{LevelFilter, debug, info};

use plantdraw::drawio::inspect;
use plantdraw::{Config, convert};

/// Convert PlantUML or C4 diagram text into a draw.io document
#[derive(Parser, Debug)]
#[command(name = "plantdraw")]
#[command(version)]
#[command(about = "Compile PlantUML-style diagram text into draw.io XML", long_about = None)]
struct Args {
    /// Input diagram file (use "-" for stdin)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output .drawio file (stdout when omitted)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Embed the diagram as base64-encoded raw deflate
    #[arg(short, long)]
    compressed: bool,

    /// Configuration file (TOML or YAML)
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Print a cell summary of the generated document instead of the XML
    #[arg(long)]
    inspect: bool,
}

fn read_source(input: &Path) -> Result<String, String> {
    if input.to_str() == Some("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(input).map_err(|e| format!("Failed to read input file: {}", e))
    }
}

fn main() -> Result<(), String> {
    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {}. Using 'warn' instead.", args.log_level);
        LevelFilter::Warn
    });
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();
    debug!(args:?; "Parsed arguments");

    let config = match &args.config {
        Some(path) => Config::load(path).map_err(|e| format!("{}: {}", path.display(), e))?,
        None => Config::default(),
    };
    let mut options = config.convert_options();
    options.compressed |= args.compressed;

    let source = read_source(&args.input)?;
    let document = convert(&source, &options).map_err(|e| e.to_string())?;

    if args.inspect {
        let summary = inspect(&document).map_err(|e| format!("Failed to read document: {}", e))?;
        println!(
            "diagrams: {}  compressed: {}  vertices: {}  edges: {}",
            summary.diagrams,
            summary.compressed,
            summary.vertices().count(),
            summary.edges().count()
        );
        for cell in summary.vertices() {
            println!("  {}  {}", cell.id, cell.value.as_deref().unwrap_or_default().replace('\n', " "));
        }
        for cell in summary.edges() {
            println!(
                "  {} -> {}  {}",
                cell.source.as_deref().unwrap_or("?"),
                cell.target.as_deref().unwrap_or("?"),
                cell.value.as_deref().unwrap_or_default()
            );
        }
        return Ok(());
    }

    match &args.output {
        Some(path) => {
            std::fs::write(path, &document).map_err(|e| format!("Failed to write output: {}", e))?;
            info!(path:? = path; "Document written");
            eprintln!("Diagram saved to: {}", path.display());
        }
        None => println!("{}", document),
    }

    Ok(())
}
