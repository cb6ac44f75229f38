use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use rubystyle::{Config, Engine, FixOutcome};
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "rubystyle")]
#[command(about = "Style checker for Ruby with in-file style inference", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report style offenses without modifying files
    Check {
        /// Files or directories to inspect
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Path to a rubystyle.toml config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Apply safe corrections to files
    Fix {
        /// Files or directories to fix
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Path to a rubystyle.toml config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Dry run - show what would be changed without modifying files
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// List the rules this build knows about
    Rules,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            paths,
            config,
            format,
        } => cmd_check(paths, config, format),

        Commands::Fix {
            paths,
            config,
            dry_run,
        } => cmd_fix(paths, config, dry_run),

        Commands::Rules => cmd_rules(),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => {
            Config::load_from_path(&path).with_context(|| format!("loading {}", path.display()))
        }
        None => Ok(Config::default()),
    }
}

/// Collect `.rb` files from the given paths, descending into directories.
fn discover_ruby_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        for entry in WalkDir::new(path) {
            let entry = entry?;
            if entry.file_type().is_file()
                && entry.path().extension().and_then(|s| s.to_str()) == Some("rb")
            {
                files.push(entry.path().to_path_buf());
            }
        }
    }

    files.sort();
    Ok(files)
}

fn cmd_check(paths: Vec<PathBuf>, config: Option<PathBuf>, format: Format) -> Result<()> {
    let engine = Engine::new(load_config(config)?)?;
    let files = discover_ruby_files(&paths)?;

    let mut total_offenses = 0usize;
    let mut json_files = Vec::new();

    for file in &files {
        let source =
            fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
        let analysis = engine.analyze(&source);
        total_offenses += analysis.offenses.len();

        match format {
            Format::Text => {
                for offense in &analysis.offenses {
                    println!(
                        "{}:{}:{}: {} {}",
                        file.display(),
                        offense.line(),
                        offense.column(),
                        offense.rule_id.yellow(),
                        offense.message
                    );
                }
            }
            Format::Json => {
                let offenses: Vec<_> = analysis
                    .offenses
                    .iter()
                    .map(|o| serde_json::to_value(o.to_record()))
                    .collect::<Result<_, _>>()?;
                json_files.push(serde_json::json!({
                    "path": file.display().to_string(),
                    "offenses": offenses,
                }));
            }
        }
    }

    match format {
        Format::Text => {
            let summary = format!(
                "{} file(s) inspected, {} offense(s) detected",
                files.len(),
                total_offenses
            );
            if total_offenses == 0 {
                println!("{}", summary.green());
            } else {
                println!("{}", summary.red());
            }
        }
        Format::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({ "files": json_files }))?
            );
        }
    }

    if total_offenses > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_fix(paths: Vec<PathBuf>, config: Option<PathBuf>, dry_run: bool) -> Result<()> {
    let engine = Engine::new(load_config(config)?)?;
    let files = discover_ruby_files(&paths)?;

    let mut fixed = 0usize;
    let mut conflicts = 0usize;

    for file in &files {
        let source =
            fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
        let analysis = engine.analyze(&source);

        match analysis.fix(&source) {
            FixOutcome::NothingToFix => {}
            FixOutcome::Fixed(patched) => {
                fixed += 1;
                if dry_run {
                    println!("{}", format!("would fix {}", file.display()).cyan());
                    print_diff(&source, &patched);
                } else {
                    atomic_write(file, patched.as_bytes())
                        .with_context(|| format!("writing {}", file.display()))?;
                    println!("{}", format!("fixed {}", file.display()).green());
                }
            }
            FixOutcome::Conflict(conflict) => {
                // Distinct from "nothing to fix": fixes exist but are
                // unsafe to apply together.
                conflicts += 1;
                eprintln!(
                    "{}",
                    format!(
                        "{}: conflicting corrections at {} and {}; no fixes applied",
                        file.display(),
                        conflict.first,
                        conflict.second
                    )
                    .yellow()
                );
            }
        }
    }

    println!(
        "{} file(s) {}, {} conflict(s)",
        fixed,
        if dry_run { "would be fixed" } else { "fixed" },
        conflicts
    );
    Ok(())
}

fn cmd_rules() -> Result<()> {
    for id in rubystyle::rules::ALL_RULE_IDS {
        println!("{}", id);
    }
    Ok(())
}

fn print_diff(original: &str, patched: &str) {
    let diff = TextDiff::from_lines(original, patched);
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Delete => print!("{}", format!("-{}", change).red()),
            ChangeTag::Insert => print!("{}", format!("+{}", change).green()),
            ChangeTag::Equal => print!(" {}", change),
        }
    }
}

/// Atomic file write: tempfile + fsync + rename.
fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
