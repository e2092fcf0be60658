//! chord-categorize: sort a directory of chord set MIDI files into the
//! nine tempo × complexity folders and query the resulting catalog.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chordconf::ChordConfig;
use chordsets::{list_chord_sets, process_chord_sets, telemetry, ChordSetFilter};
use clap::{ArgAction, CommandFactory, Parser};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "chord-categorize")]
#[command(version, about = "Categorize chord set MIDI files by tempo and chord count")]
struct Cli {
    /// Categorize every MIDI file in the source directory
    #[arg(long, conflicts_with = "list")]
    process: bool,

    /// List catalogued chord sets
    #[arg(long)]
    list: bool,

    /// Only list categories containing this text, e.g. "fast" or "slow-progressions/simple"
    #[arg(long, requires = "list")]
    category: Option<String>,

    /// Minimum tempo (inclusive); needs --tempo-max
    #[arg(long, requires = "list")]
    tempo_min: Option<f64>,

    /// Maximum tempo (inclusive); needs --tempo-min
    #[arg(long, requires = "list")]
    tempo_max: Option<f64>,

    /// Config file (replaces ./chordsets.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Storage tree root (overrides config)
    #[arg(long, value_name = "DIR")]
    storage: Option<PathBuf>,

    /// Directory of MIDI files to categorize (overrides config)
    #[arg(long, value_name = "DIR")]
    source: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let (mut config, sources) = ChordConfig::load_with_sources_from(cli.config.as_deref())
        .context("loading configuration")?;
    if let Some(storage) = &cli.storage {
        config.paths.storage_dir = storage.clone();
    }
    if let Some(source) = &cli.source {
        config.paths.source_dir = source.clone();
    }

    telemetry::init(&config.telemetry.log_level, cli.verbose, cli.quiet);
    debug!(files = ?sources.files, env = ?sources.env_overrides, "configuration loaded");

    let library_dir = config.paths.library_dir();

    if cli.process {
        config.paths.ensure_storage_tree().with_context(|| {
            format!("creating storage tree under {}", config.paths.storage_dir.display())
        })?;
        let run = process_chord_sets(&config.paths.source_dir, &library_dir).with_context(|| {
            format!(
                "processing chord sets from {}",
                config.paths.source_dir.display()
            )
        })?;
        let summary = &run.summary;

        println!("Processing Summary:");
        println!("   Total files: {}", summary.total_files);
        println!("   Successfully processed: {}", summary.processed);
        println!("   Failed: {}", summary.failed);
        println!("   Categories created: {}", summary.per_category.len());
        for (category, count) in &summary.per_category {
            println!("   - {category}: {count} chord sets");
        }
        println!("Catalog saved to: {}", summary.catalog_path.display());
        return Ok(ExitCode::SUCCESS);
    }

    if cli.list {
        let filter = ChordSetFilter {
            category: cli.category.clone(),
            tempo_range: cli.tempo_min.zip(cli.tempo_max),
        };
        let chord_sets = list_chord_sets(&library_dir, &filter).context("reading catalog")?;

        println!("Chord Sets Library ({} found)", chord_sets.len());
        for entry in &chord_sets {
            let analysis = &entry.analysis;
            println!();
            println!("{}", analysis.filename);
            println!("   Category: {}", entry.category);
            println!("   Tempo: {} BPM", analysis.estimated_tempo);
            println!("   Key: {}", analysis.estimated_key);
            println!("   Chords: {}", analysis.chord_count);
            println!("   Duration: {:.2}s", analysis.length);
        }
        return Ok(ExitCode::SUCCESS);
    }

    Cli::command().print_help()?;
    Ok(ExitCode::SUCCESS)
}
