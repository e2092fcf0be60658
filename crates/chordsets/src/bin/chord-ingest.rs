//! chord-ingest: turn chord set archives into JSON artifacts, and render
//! chord symbols to MIDI.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chordconf::ChordConfig;
use chordsets::generate::generate_midi_from_chords;
use chordsets::{process_chord_zip, telemetry, DEMO_PROGRESSION};
use clap::{ArgAction, CommandFactory, Parser};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "chord-ingest")]
#[command(version, about = "Process chord set archives and generate MIDI from chord symbols")]
struct Cli {
    /// Chord set archive (.zip) to process
    #[arg(long, value_name = "ZIP", conflicts_with = "generate_midi")]
    process_zip: Option<PathBuf>,

    /// Generate a MIDI file from a chord progression
    #[arg(long, value_name = "PATH")]
    generate_midi: Option<PathBuf>,

    /// Chord symbols separated by spaces or commas (default: C Am F G C)
    #[arg(long, requires = "generate_midi")]
    chords: Option<String>,

    /// Tempo of the generated file in bpm
    #[arg(long, default_value_t = 120.0, value_parser = parse_tempo, requires = "generate_midi")]
    tempo: f64,

    /// Output file (default: <storage>/generated/chord_progression_<N>_chords.mid)
    #[arg(long, requires = "generate_midi")]
    output: Option<PathBuf>,

    /// Config file (replaces ./chordsets.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Storage tree root (overrides config)
    #[arg(long, value_name = "DIR")]
    storage: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn parse_tempo(s: &str) -> Result<f64, String> {
    let bpm: f64 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if bpm.is_finite() && bpm > 0.0 {
        Ok(bpm)
    } else {
        Err(format!("tempo must be a positive number of bpm, got {s}"))
    }
}

fn split_symbols(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let (mut config, sources) = ChordConfig::load_with_sources_from(cli.config.as_deref())
        .context("loading configuration")?;
    if let Some(storage) = &cli.storage {
        config.paths.storage_dir = storage.clone();
    }

    telemetry::init(&config.telemetry.log_level, cli.verbose, cli.quiet);
    debug!(files = ?sources.files, env = ?sources.env_overrides, "configuration loaded");

    if cli.process_zip.is_some() || cli.generate_midi.is_some() {
        config.paths.ensure_storage_tree().with_context(|| {
            format!("creating storage tree under {}", config.paths.storage_dir.display())
        })?;
    }

    if let Some(archive) = &cli.process_zip {
        let report = process_chord_zip(archive, &config.paths.ingest_dir());
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(if report.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    if let Some(source) = &cli.generate_midi {
        info!(path = %source.display(), "progression file argument is not read");
        let symbols = match &cli.chords {
            Some(text) => split_symbols(text),
            None => DEMO_PROGRESSION.iter().map(|s| s.to_string()).collect(),
        };

        let path = generate_midi_from_chords(
            &symbols,
            cli.tempo,
            cli.output.as_deref(),
            &config.paths.generated_dir(),
        )
        .context("generating MIDI")?;
        println!("Generated MIDI: {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    Cli::command().print_help()?;
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn symbols_split_on_spaces_and_commas() {
        assert_eq!(split_symbols("C, Am  F,G"), vec!["C", "Am", "F", "G"]);
        assert!(split_symbols(" , ").is_empty());
    }

    #[test]
    fn tempo_must_be_positive() {
        assert_eq!(parse_tempo("96"), Ok(96.0));
        assert!(parse_tempo("0").is_err());
        assert!(parse_tempo("fast").is_err());
    }
}
