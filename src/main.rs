use crate::config::{Config, Rules};
use crate::document::{DocumentStore, LineIndex};
use crate::error::AnalyzerError;
use crate::inspector::{inspect, InspectResult};
use crate::types::{Diagnostic, Position, Severity};
use clap::{Parser as ClapParser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

mod checker;
mod config;
mod document;
mod error;
mod hover;
mod inspector;
mod lexer;
mod parser;
mod token;
mod types;

#[derive(ClapParser)]
#[command(author, version, about = "VNScript Analyzer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze VNScript files and report diagnostics
    Check {
        /// Files to analyze (defaults to every .vns file in the scripts directory)
        files: Vec<PathBuf>,
        /// Enforce an upper bound on volume values
        #[arg(long)]
        max_volume: Option<f64>,
        /// Use the historical duplicate-play lookup
        #[arg(long)]
        legacy_music_lookup: bool,
    },
    /// Print the validated event list of a script as JSON
    Events {
        file: PathBuf,
        #[arg(long)]
        max_volume: Option<f64>,
        #[arg(long)]
        legacy_music_lookup: bool,
    },
    /// Describe the script element at a position (zero-based line/character)
    Hover {
        file: PathBuf,
        line: u32,
        character: u32,
    },
    /// Manage the analyzer configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the current configuration
    Show,
    /// Initialize a config file with defaults
    Init,
    /// Print the config file location
    Path,
}

fn get_vns_files(config: &Config) -> Result<Vec<PathBuf>, AnalyzerError> {
    let scripts_path = &config.scripts_dir;

    if !scripts_path.exists() {
        return Err(AnalyzerError::FileNotFound(format!(
            "Scripts directory not found: {}\n\nTo fix this:\n1. Create the directory and add your .vns files there\n2. Or pass file paths to `vnsa check` directly\n3. Or set VNSA_SCRIPTS_DIR",
            scripts_path.display()
        )));
    }

    if !scripts_path.is_dir() {
        return Err(AnalyzerError::FileNotFound(format!(
            "Expected {} to be a directory",
            scripts_path.display()
        )));
    }

    let mut found_scripts: Vec<PathBuf> = Vec::new();
    let files = fs::read_dir(scripts_path).map_err(|e| {
        AnalyzerError::FileNotFound(format!(
            "Cannot access scripts directory: {}\nError: {}",
            scripts_path.display(),
            e
        ))
    })?;

    for entry in files.flatten() {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("vns") {
            found_scripts.push(path);
        }
    }

    if found_scripts.is_empty() {
        return Err(AnalyzerError::FileNotFound(format!(
            "No .vns files found in: {}",
            scripts_path.display()
        )));
    }

    found_scripts.sort();
    Ok(found_scripts)
}

fn apply_overrides(mut rules: Rules, max_volume: Option<f64>, legacy_music_lookup: bool) -> Rules {
    if max_volume.is_some() {
        rules.max_volume = max_volume;
    }
    if legacy_music_lookup {
        rules.legacy_music_duplicate_lookup = true;
    }
    rules
}

fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}

fn analyze_file(path: &Path, rules: &Rules) -> Result<InspectResult, AnalyzerError> {
    let text = fs::read_to_string(path)?;
    let index = LineIndex::new(&text);
    Ok(inspect(&file_uri(path), &text, &index, rules))
}

fn print_diagnostics(path: &Path, diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        println!(
            "{}: {}\n  --> {}:{}:{}",
            diagnostic.severity,
            diagnostic.message,
            path.display(),
            diagnostic.range.start.line + 1,
            diagnostic.range.start.character + 1,
        );
        for related in diagnostic.related_information.iter().flatten() {
            println!(
                "  note: {}\n    --> {}:{}:{}",
                related.message,
                path.display(),
                related.range.start.line + 1,
                related.range.start.character + 1,
            );
        }
    }
}

fn check_files(
    files: &[PathBuf],
    rules: &Rules,
) -> Result<(usize, usize), Box<dyn std::error::Error>> {
    let mut error_count = 0;
    let mut warning_count = 0;

    for path in files {
        let result = analyze_file(path, rules)?;
        print_diagnostics(path, &result.diagnostics);
        error_count += result
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count();
        warning_count += result
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count();
    }

    Ok((error_count, warning_count))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load();

    match cli.command {
        Commands::Check {
            files,
            max_volume,
            legacy_music_lookup,
        } => {
            let rules = apply_overrides(config.rules.clone(), max_volume, legacy_music_lookup);
            let files = if files.is_empty() {
                match get_vns_files(&config) {
                    Ok(files) => files,
                    Err(AnalyzerError::FileNotFound(msg)) => {
                        println!("Error: {}", msg);
                        println!("\nCurrent configuration:");
                        println!("  Environment: {}", config.env_name);
                        println!("  Scripts directory: {}", config.scripts_dir.display());
                        return Ok(());
                    }
                    Err(e) => return Err(Box::new(e)),
                }
            } else {
                files
            };

            let (errors, warnings) = check_files(&files, &rules)?;
            println!(
                "Checked {} file(s): {} error(s), {} warning(s)",
                files.len(),
                errors,
                warnings
            );
            if errors > 0 {
                std::process::exit(1);
            }
        }
        Commands::Events {
            file,
            max_volume,
            legacy_music_lookup,
        } => {
            let rules = apply_overrides(config.rules.clone(), max_volume, legacy_music_lookup);
            let result = analyze_file(&file, &rules)?;
            for diagnostic in &result.diagnostics {
                eprint!(
                    "{}: {} ({}:{})\n",
                    diagnostic.severity,
                    diagnostic.message,
                    diagnostic.range.start.line + 1,
                    diagnostic.range.start.character + 1,
                );
            }
            match result.events {
                Some(events) => println!("{}", serde_json::to_string_pretty(&events)?),
                None => {
                    eprintln!("No events: the script has syntax errors.");
                    std::process::exit(1);
                }
            }
        }
        Commands::Hover {
            file,
            line,
            character,
        } => {
            let result = analyze_file(&file, &config.rules)?;
            let uri = file_uri(&file);
            let mut store = DocumentStore::new();
            store.update(&uri, result.events.unwrap_or_default());
            match store.hover(&uri, Position::new(line, character)) {
                Some(text) => println!("{}", text),
                None => println!("No information for {}:{}:{}", file.display(), line, character),
            }
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
            ConfigCommands::Init => {
                let config_path = Config::get_config_path();
                if config_path.exists() {
                    println!("Config file already exists at: {}", config_path.display());
                } else {
                    Config::default().save()?;
                    println!("Initialized new config file at: {}", config_path.display());
                }
            }
            ConfigCommands::Path => {
                println!("{}", Config::get_config_path().display());
            }
        },
    }

    Ok(())
}
