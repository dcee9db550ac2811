use anyhow::{Context, Result};
use catex_core::{Config, pipeline};
use clap::Parser;
use colored::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "catex")]
#[command(about = "Extract product records and images from catalog spreadsheets", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the catalog workbook (overrides the configured source)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Directory for extracted images
    #[arg(long, value_name = "DIR")]
    image_dir: Option<PathBuf>,

    /// Output JSON path
    #[arg(short, long, value_name = "OUT")]
    output: Option<PathBuf>,

    /// Column letter checked for image anchors
    #[arg(long, value_name = "COL")]
    image_column: Option<String>,

    /// Suppress log output (the summary is still printed)
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if !cli.quiet {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "catex=info,catex_core=info".into()),
            )
            .init();
    }

    // Load configuration
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        // Try to load default config from current directory if it exists
        let default_config_path = PathBuf::from("catex.toml");
        if default_config_path.exists() {
            Config::from_file(&default_config_path).with_context(|| {
                format!(
                    "Failed to load config from {}",
                    default_config_path.display()
                )
            })?
        } else {
            Config::default()
        }
    };

    // CLI flags override the config file
    if let Some(file) = cli.file {
        config.source = file;
    }
    if let Some(dir) = cli.image_dir {
        config.image_dir = dir;
    }
    if let Some(output) = cli.output {
        config.output = output;
    }
    if let Some(column) = cli.image_column {
        config.image_column = column;
    }

    let summary = pipeline::run(&config)
        .with_context(|| format!("Failed to extract catalog: {}", config.source.display()))?;

    print_summary(&config, &summary);

    Ok(())
}

fn print_summary(config: &Config, summary: &pipeline::ExtractSummary) {
    println!(
        "{}",
        format!("Catalog: {}", config.source.display()).bold()
    );
    println!("  Sheets processed: {}", summary.sheets);
    println!("  Product records: {}", summary.records);
    println!("  Images extracted: {}", summary.images_written);
    println!("  Placeholder references: {}", summary.placeholders);

    if summary.output_written {
        println!(
            "{}",
            format!("✓ Wrote {}", config.output.display()).green().bold()
        );
    } else {
        println!(
            "{}",
            format!(
                "⚠ Failed to write {}; extracted images were kept",
                config.output.display()
            )
            .yellow()
            .bold()
        );
    }
}
