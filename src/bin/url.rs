use std::io::Read;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, ValueEnum};
use log::{LevelFilter, debug};

use plantdraw::encode::{mermaid_url, plantuml_url};
use plantdraw::{Config, ImageFormat};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Service {
    Plantuml,
    Mermaid,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Svg,
    Png,
}

/// Print an image-service URL for a PlantUML or Mermaid source
#[derive(Parser, Debug)]
#[command(name = "plantdraw-url")]
#[command(version)]
#[command(about = "Encode a PlantUML or Mermaid diagram into a rendering-service URL", long_about = None)]
struct Args {
    /// Which service to encode for
    #[arg(value_enum)]
    service: Service,

    /// Input diagram file (use "-" for stdin)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Theme injected into the source
    #[arg(short, long)]
    theme: Option<String>,

    /// Requested image format
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    /// Configuration file (TOML or YAML)
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
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

    let mut config = match &args.config {
        Some(path) => Config::load(path).map_err(|e| format!("{}: {}", path.display(), e))?,
        None => Config::default(),
    };
    if args.theme.is_some() {
        config.theme = args.theme.clone();
    }
    if let Some(format) = args.format {
        config.image_format = match format {
            Format::Svg => ImageFormat::Svg,
            Format::Png => ImageFormat::Png,
        };
    }

    let source = if args.input.to_str() == Some("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        buffer
    } else {
        std::fs::read_to_string(&args.input)
            .map_err(|e| format!("Failed to read input file: {}", e))?
    };
    if source.trim().is_empty() {
        return Err("Diagram source is empty".to_string());
    }

    let url = match args.service {
        Service::Plantuml => plantuml_url(&source, &config),
        Service::Mermaid => mermaid_url(source.trim(), &config),
    }
    .map_err(|e| e.to_string())?;

    println!("{}", url);
    Ok(())
}
