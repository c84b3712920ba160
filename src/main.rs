// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;

use anyhow::{anyhow, Context, Result};
use tracing::Level;

use harmonize::{Harmonization, Harmonizer, HarmonizerConfig, Melody, Mode, Surprise};

fn print_usage() {
    println!("harmonize - Jazz chord progressions for a melody");
    println!();
    println!("Usage: harmonize --melody <TEXT> [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --melody <TEXT>     Melody as PITCH[:BEATS] tokens, R for rests (e.g. \"C4:1 E4 R:2 G4\")");
    println!("  --repeat <N>        Play the melody N times end to end");
    println!("  --key <NOTE>        Tonic to use instead of inferring the key");
    println!("  --mode <MODE>       Mode for --key (default major)");
    println!("  --surprise <S>      0.0 (predictable) to 1.0 (anything goes)");
    println!("  --seed <N>          Seed for reproducible progressions");
    println!("  --config <FILE>     YAML or TOML configuration file");
    println!("  --json              Print the full result as JSON");
    println!("  --verbose           Log each window and chord choice");
    println!("  --list-modes        List available modes");
    println!("  --help              Show this help message");
}

fn list_modes() {
    println!("Available modes:");
    for mode in Mode::ALL {
        let intervals: Vec<String> = mode.intervals().iter().map(|i| i.to_string()).collect();
        println!("  {:<14} {}", mode.name(), intervals.join(" "));
    }
}

/// Command-line options
#[derive(Debug, Default)]
struct Options {
    melody: Option<String>,
    repeat: usize,
    key: Option<String>,
    mode: Option<String>,
    surprise: Option<String>,
    seed: Option<u64>,
    config: Option<String>,
    json: bool,
    verbose: bool,
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("{} requires a value", flag))
}

fn parse_options(args: &[String]) -> Result<Options> {
    let mut options = Options {
        repeat: 1,
        ..Options::default()
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--melody" => options.melody = Some(value(args, i, "--melody")?.to_string()),
            "--repeat" => {
                let text = value(args, i, "--repeat")?;
                options.repeat = text
                    .parse()
                    .map_err(|_| anyhow!("Invalid repeat count: {}", text))?;
            }
            "--key" => options.key = Some(value(args, i, "--key")?.to_string()),
            "--mode" => options.mode = Some(value(args, i, "--mode")?.to_string()),
            "--surprise" => options.surprise = Some(value(args, i, "--surprise")?.to_string()),
            "--seed" => {
                let text = value(args, i, "--seed")?;
                options.seed = Some(text.parse().map_err(|_| anyhow!("Invalid seed: {}", text))?);
            }
            "--config" => options.config = Some(value(args, i, "--config")?.to_string()),
            "--json" => {
                options.json = true;
                i += 1;
                continue;
            }
            "--verbose" | "-v" => {
                options.verbose = true;
                i += 1;
                continue;
            }
            other => return Err(anyhow!("Unknown option: {}", other)),
        }
        i += 2;
    }

    Ok(options)
}

fn run(options: Options) -> Result<()> {
    let mut config = match &options.config {
        Some(path) => HarmonizerConfig::load(path)?,
        None => HarmonizerConfig::default(),
    };
    if let Some(key) = &options.key {
        config.harmony.key = Some(key.clone());
    }
    if let Some(mode) = &options.mode {
        config.harmony.mode = mode.clone();
    }
    if options.mode.is_some() && config.harmony.key.is_none() {
        return Err(anyhow!("--mode needs a key (--key or harmony.key in the config)"));
    }

    let harmonizer = Harmonizer::new(config).context("Invalid settings")?;

    let text = options
        .melody
        .as_deref()
        .ok_or_else(|| anyhow!("--melody is required (see --help)"))?;
    let melody = Melody::parse(text).context("Failed to parse melody")?;
    let melody = if options.repeat > 1 {
        melody.repeated(options.repeat)
    } else {
        melody
    };

    let mut request = harmonizer.request(melody)?;
    if let Some(surprise) = &options.surprise {
        request = request.with_surprise(surprise.parse::<Surprise>()?);
    }
    if let Some(seed) = options.seed {
        request = request.with_seed(seed);
    }

    let result = harmonizer.harmonize(&request)?;
    if options.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Failed to serialize result")?
        );
    } else {
        print_result(&result);
    }
    Ok(())
}

fn print_result(result: &Harmonization) {
    let origin = if result.key_declared { "declared" } else { "inferred" };
    println!(
        "Key: {} ({}, fit {:.2})",
        result.key, origin, result.key_confidence
    );
    println!("Seed: {}  Surprise: {}", result.seed, result.surprise);
    println!();
    println!("{:<4} {:<9} {:<5} {:<7} {:>6}  Voicing", "Bar", "Chord", "Role", "Source", "Score");

    for (bar, voicing) in result
        .progression
        .bars()
        .iter()
        .zip(result.arrangement.voicings())
    {
        let notes: Vec<String> = voicing.notes.iter().map(|n| n.to_string()).collect();
        println!(
            "{:<4} {:<9} {:<5} {:<7} {:>6.2}  {} ({})",
            bar.index + 1,
            bar.chord.symbol(),
            bar.role.abbreviation(),
            bar.source.to_string(),
            bar.score,
            notes.join(" "),
            voicing.style
        );
    }

    println!();
    println!("{}", result.progression);
    println!(
        "{} events over {} beats ({:.1}s at {} BPM)",
        result.arrangement.events().len(),
        result.arrangement.span(),
        result.arrangement.duration_seconds(),
        result.arrangement.tempo()
    );
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("harmonize - Jazz chord progressions for a melody");
        println!("Run with --help for usage information");
        return Ok(());
    }

    match args[1].as_str() {
        "--help" | "-h" => {
            print_usage();
            return Ok(());
        }
        "--list-modes" => {
            list_modes();
            return Ok(());
        }
        _ => {}
    }

    let options = match parse_options(&args) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("Error: {}", err);
            print_usage();
            std::process::exit(1);
        }
    };

    let level = if options.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    run(options)
}
