//! apidoc-extract - Command-line tool for extracting endpoint documentation.
//!
//! Reads the route manifest from the project's configuration file, indexes the project's Rust
//! sources, and writes the documented endpoints, grouped, as YAML or JSON.
//!
//! # Usage
//!
//! ```bash
//! apidoc-extract [OPTIONS] <PROJECT_PATH>
//! ```
//!
//! # Examples
//!
//! Write YAML documentation using `./my-api/apidoc.yaml`:
//! ```bash
//! apidoc-extract ./my-api -o docs/endpoints.yaml
//! ```
//!
//! JSON output with an explicit configuration file and debug logging:
//! ```bash
//! apidoc-extract ./my-api -c docs.json -f json -v
//! ```

use anyhow::Result;
use apidoc_extract::cli;
use clap::Parser;
use log::info;

fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .parse_default_env()
        .init();

    info!("apidoc-extract starting...");

    let args = cli::validate_args(args)?;
    cli::run(args)?;

    info!("Documentation extraction completed successfully");

    Ok(())
}
