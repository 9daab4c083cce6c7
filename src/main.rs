//! sitaware - attribute treemap and breakdown table for a threat-intelligence feed.
//!
//! Usage:
//!   sitaware --input events.json
//!   sitaware --input events.json --days 7 --tag "tlp:(white|green)"
//!   sitaware --input events.json --begin 2023-01-01 --end "March 1, 2023" --treemap out.svg

use anyhow::Context;
use clap::Parser;
use sitaware::config::ReportConfig;
use sitaware::pipeline::{self, AnalysisRequest};
use sitaware::report::ColourScheme;
use sitaware::window::SystemClock;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sitaware")]
#[command(about = "Attribute treemap and breakdown table for a threat-intelligence event feed")]
struct Args {
    /// Feed file: one or more concatenated JSON documents
    #[arg(short, long)]
    input: PathBuf,

    /// Begin of the date window (any common date format)
    #[arg(short, long)]
    begin: Option<String>,

    /// End of the date window (defaults to now)
    #[arg(short, long)]
    end: Option<String>,

    /// Only consider the last N days
    #[arg(short, long)]
    days: Option<u32>,

    /// Keep only events with a tag matching this regular expression
    #[arg(short, long)]
    tag: Option<String>,

    /// JSON report configuration; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Treemap output path
    #[arg(long)]
    treemap: Option<PathBuf>,

    /// HTML table output path
    #[arg(long)]
    table: Option<PathBuf>,

    /// Chart title
    #[arg(long)]
    title: Option<String>,

    /// Stylesheet linked from the HTML table
    #[arg(long)]
    stylesheet: Option<String>,

    /// Chart width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Chart height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Category colours (comma-separated, e.g. "#1f77b4,#ff7f0e"); hashed from names when absent
    #[arg(long)]
    palette: Option<String>,
}

impl Args {
    fn report_config(&self) -> anyhow::Result<ReportConfig> {
        let mut config = match &self.config {
            Some(path) => ReportConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => ReportConfig::default(),
        };

        if let Some(path) = &self.treemap {
            config.treemap_path = path.clone();
        }
        if let Some(path) = &self.table {
            config.table_path = path.clone();
        }
        if let Some(title) = &self.title {
            config.title = title.clone();
        }
        if let Some(stylesheet) = &self.stylesheet {
            config.stylesheet = stylesheet.clone();
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(palette) = &self.palette {
            config.colours = ColourScheme::Palette(
                palette.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect(),
            );
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args = Args::parse();
    let config = args.report_config()?;
    let request = AnalysisRequest {
        begin: args.begin.clone(),
        end: args.end.clone(),
        last_days: args.days,
        tag: args.tag.clone(),
    };

    let summary = pipeline::run(&args.input, &request, &config, &SystemClock)
        .with_context(|| format!("building report from {}", args.input.display()))?;

    println!("Window:     {} .. {}", summary.window.begin, summary.window.end);
    println!("Events:     {}", summary.events);
    println!("Attributes: {} in {} categories", summary.attributes, summary.categories);
    println!("Tags:       {}", summary.tags);
    for (name, count) in summary.tag_counts.iter() {
        println!("  {:<40} {}", name.join("/"), count);
    }
    println!("Treemap:    {}", config.treemap_path.display());
    println!("Table:      {}", config.table_path.display());

    Ok(())
}
