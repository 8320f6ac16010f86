//! localca CLI application.
//!
//! Reads a YAML configuration, builds a local root CA if one is not already
//! present, and issues server and client certificates signed by it.

use anyhow::Result;
use clap::Parser;
use localca::configs::IssuerConfig;
use localca::issuance;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "localca")]
#[command(about = "Build a local certificate authority and issue server and client certificates", long_about = None)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yml")]
    config: PathBuf,

    /// Path to the CSR-configuration template
    #[arg(long, default_value = "templates/csr_template.conf.j2")]
    template: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = IssuerConfig::from_file(&cli.config)?;
    issuance::run(&config, &cli.template)
}
