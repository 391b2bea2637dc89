use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

use crate::config::DocumentationConfig;
use crate::generator::{group_endpoints, Generator};
use crate::response::ResponseResolver;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file, Documentation};
use crate::source::SourceReflector;

const DEFAULT_CONFIG_FILES: [&str; 3] = ["apidoc.yaml", "apidoc.yml", "apidoc.json"];

/// Extract endpoint documentation from annotated Rust route handlers
#[derive(Parser, Debug)]
#[command(name = "apidoc-extract")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the Rust project directory
    #[arg(value_name = "PROJECT_PATH")]
    pub project_path: PathBuf,

    /// Configuration file (defaults to apidoc.yaml, apidoc.yml or apidoc.json in the project)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_path: Option<PathBuf>,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Validate and log already-parsed arguments
pub fn validate_args(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.project_path.is_dir() {
        anyhow::bail!(
            "Project path is not a directory: {}",
            args.project_path.display()
        );
    }
    if let Some(config) = &args.config_path {
        if !config.is_file() {
            anyhow::bail!("Configuration file does not exist: {}", config.display());
        }
    }

    info!("Project path: {}", args.project_path.display());
    info!("Output format: {:?}", args.output_format);
    match &args.output_path {
        Some(output) => info!("Output file: {}", output.display()),
        None => info!("Output: stdout"),
    }

    Ok(args)
}

/// Finds the configuration file: the explicit one, else a default name in the project.
fn locate_config(args: &CliArgs) -> Option<PathBuf> {
    if let Some(path) = &args.config_path {
        return Some(path.clone());
    }
    DEFAULT_CONFIG_FILES
        .iter()
        .map(|name| args.project_path.join(name))
        .find(|path| path.is_file())
}

fn load_config(args: &CliArgs) -> Result<DocumentationConfig> {
    let config = match locate_config(args) {
        Some(path) => {
            info!("Configuration: {}", path.display());
            DocumentationConfig::load(&path)?
        }
        None => {
            warn!("No configuration file found, using defaults");
            DocumentationConfig::default()
        }
    };
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Runs the whole extraction and returns the rendered document.
pub fn generate(project_path: &Path, config: &DocumentationConfig, format: OutputFormat) -> Result<String> {
    let sources = config.sources_root(project_path);
    info!("Indexing sources under {}", sources.display());
    let reflector = SourceReflector::from_project(&sources, &config.exclude_dirs)?;

    let responses = ResponseResolver::standard(config.fixtures_root(project_path), None, None);
    debug!("Response strategies: {:?}", responses.strategy_names());

    let generator = Generator::new(config, &reflector, responses);
    let endpoints = generator.process_routes(&config.routes);
    let doc = Documentation::new(group_endpoints(endpoints));
    info!(
        "Documented {} endpoint(s) in {} group(s)",
        doc.endpoint_count(),
        doc.groups.len()
    );

    match format {
        OutputFormat::Yaml => serialize_yaml(&doc),
        OutputFormat::Json => serialize_json(&doc),
    }
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    let config = load_config(&args)?;

    if config.routes.is_empty() {
        warn!("The configuration lists no routes");
    }

    let content = generate(&args.project_path, &config, args.output_format)?;

    if let Some(output_path) = &args.output_path {
        write_to_file(&content, output_path)?;
        info!("Wrote documentation to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    Ok(())
}
