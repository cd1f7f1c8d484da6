use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use marker_overlay::atomic::{atomic_write, read_source};
use marker_overlay::{
    load_from_path, split_embedded, Overlay, OverlayConfig, OverlayError, OverlayOutput,
    ValidatedMarkerSet,
};
use similar::{ChangeTag, TextDiff};
use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use walkdir::WalkDir;

const CONFIG_ENV: &str = "MARKER_OVERLAY_CONFIG";
const CONFIG_FILE: &str = "marker-overlay.toml";

#[derive(Parser)]
#[command(name = "marker-overlay")]
#[command(about = "Apply line-anchored marker overlays to text files", long_about = None)]
#[command(version)]
struct Cli {
    /// Overlay config file (defaults to $MARKER_OVERLAY_CONFIG or ./marker-overlay.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply markers to a file
    Apply {
        /// Base document, or a file carrying an embedded marker block
        file: PathBuf,

        /// Marker specification file (otherwise read from the end of FILE)
        #[arg(short, long)]
        markers: Option<PathBuf>,

        /// Write the patched document here instead of stdout
        #[arg(short, long, conflicts_with = "in_place")]
        output: Option<PathBuf>,

        /// Replace FILE with the patched document
        #[arg(short, long)]
        in_place: bool,

        /// Dry run - report what would change without writing anything
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show a line diff of the changes on stderr
        #[arg(short, long)]
        diff: bool,
    },

    /// Parse and validate markers without applying them
    Check {
        /// Base document, or a file carrying an embedded marker block
        file: PathBuf,

        /// Marker specification file (otherwise read from the end of FILE)
        #[arg(short, long)]
        markers: Option<PathBuf>,
    },

    /// List files under a directory that carry an embedded marker block
    Scan {
        /// Directory to walk
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let config = resolve_config(cli.config)?;
    let overlay = Overlay::from_config(&config);

    match cli.command {
        Commands::Apply {
            file,
            markers,
            output,
            in_place,
            dry_run,
            diff,
        } => cmd_apply(&overlay, &file, markers, output, in_place, dry_run, diff),

        Commands::Check { file, markers } => cmd_check(&overlay, &file, markers),

        Commands::Scan { dir } => cmd_scan(&overlay, &dir),
    }
}

/// Log to stderr so stdout stays reserved for patched output.
fn init_logger(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("marker_overlay=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("marker_overlay=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

/// Resolve the overlay config.
///
/// Priority order:
/// 1. Explicit --config flag
/// 2. MARKER_OVERLAY_CONFIG environment variable
/// 3. ./marker-overlay.toml if present
/// 4. Built-in defaults
fn resolve_config(cli_config: Option<PathBuf>) -> Result<OverlayConfig> {
    if let Some(path) = cli_config {
        return Ok(load_from_path(&path)?);
    }

    if let Ok(env_path) = env::var(CONFIG_ENV) {
        let path = PathBuf::from(&env_path);
        if path.exists() {
            return Ok(load_from_path(&path)?);
        }
        eprintln!(
            "{}",
            format!(
                "Warning: {} is set but path doesn't exist: {}",
                CONFIG_ENV, env_path
            )
            .yellow()
        );
    }

    let local = PathBuf::from(CONFIG_FILE);
    if local.exists() {
        tracing::debug!(path = %local.display(), "using local config");
        return Ok(load_from_path(&local)?);
    }

    Ok(OverlayConfig::default())
}

fn run_overlay(overlay: &Overlay, file: &Path, markers: Option<&Path>) -> Result<OverlayOutput> {
    let content = read_source(file).with_context(|| format!("failed to read {}", file.display()))?;

    let result = match markers {
        Some(spec_path) => {
            let spec = read_source(spec_path)
                .with_context(|| format!("failed to read {}", spec_path.display()))?;
            overlay.apply(&content, &spec)
        }
        None => overlay.apply_embedded(&content),
    };

    result.map_err(|e| report_overlay_error(file, e))
}

fn run_check(overlay: &Overlay, file: &Path, markers: Option<&Path>) -> Result<ValidatedMarkerSet> {
    let content = read_source(file).with_context(|| format!("failed to read {}", file.display()))?;

    let result = match markers {
        Some(spec_path) => {
            let spec = read_source(spec_path)
                .with_context(|| format!("failed to read {}", spec_path.display()))?;
            overlay.check(&content, &spec)
        }
        None => overlay.check_embedded(&content),
    };

    result.map_err(|e| report_overlay_error(file, e))
}

/// Print every issue of a failed overlay, then hand the error back.
fn report_overlay_error(file: &Path, error: OverlayError) -> anyhow::Error {
    eprintln!(
        "{} {}: {} stage failed",
        "✗".red(),
        file.display(),
        error.stage()
    );

    match &error {
        OverlayError::Validation(validation) => {
            for issue in &validation.issues {
                eprintln!("  - {}", issue);
            }
        }
        OverlayError::Markers(malformed) => {
            eprintln!("  {}", malformed);
        }
        OverlayError::NoMarkerBlock { .. } => {
            eprintln!("  {}", error);
            eprintln!("  Pass the marker specification explicitly with --markers <FILE>");
        }
    }

    anyhow::Error::new(error).context(format!("failed to apply markers to {}", file.display()))
}

/// Helper: Show a line diff between original and patched content
fn display_diff(file: &Path, original: &str, modified: &str) {
    eprintln!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    eprintln!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        eprint!("{}", sign);
        if change.missing_newline() {
            eprintln!();
        }
    }
}

fn cmd_apply(
    overlay: &Overlay,
    file: &Path,
    markers: Option<PathBuf>,
    output: Option<PathBuf>,
    in_place: bool,
    dry_run: bool,
    show_diff: bool,
) -> Result<()> {
    let result = run_overlay(overlay, file, markers.as_deref())?;
    let patched = result.to_bytes();

    if show_diff {
        display_diff(
            file,
            &result.base.serialize(),
            &result.document().serialize(),
        );
    }

    let target = if in_place {
        Some(file.to_path_buf())
    } else {
        output
    };

    if dry_run {
        eprintln!("{}", "[DRY RUN - nothing written]".cyan());
    } else {
        match &target {
            Some(path) => atomic_write(path, &patched)
                .with_context(|| format!("failed to write {}", path.display()))?,
            None => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(&patched)?;
                stdout.flush()?;
            }
        }
    }

    let status = if result.changed() {
        "applied".green()
    } else {
        "unchanged".yellow()
    };
    eprintln!(
        "{} {}: {} marker(s) {}, {} -> {} lines",
        "✓".green(),
        file.display(),
        result.patch.applied.len(),
        status,
        result.base.len(),
        result.document().len()
    );
    if let Some(path) = target.filter(|_| !dry_run) {
        eprintln!("  Written to {}", path.display());
    }

    Ok(())
}

fn cmd_check(overlay: &Overlay, file: &Path, markers: Option<PathBuf>) -> Result<()> {
    match run_check(overlay, file, markers.as_deref()) {
        Ok(validated) => {
            println!(
                "{} {}: {} marker(s) valid against {} lines",
                "✓".green(),
                file.display(),
                validated.len(),
                validated.doc_len()
            );
            for marker in validated.markers() {
                println!("  - {}", marker);
            }
            Ok(())
        }
        // Issues were already printed; anything else (I/O) propagates.
        Err(e) if e.downcast_ref::<OverlayError>().is_some() => std::process::exit(1),
        Err(e) => Err(e),
    }
}

fn cmd_scan(overlay: &Overlay, dir: &Path) -> Result<()> {
    let mut found = 0;

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(content) = read_source(entry.path()) else {
            tracing::debug!(path = %entry.path().display(), "skipping unreadable file");
            continue;
        };
        let text = String::from_utf8_lossy(&content);
        // Standalone marker files have nothing before the block.
        match split_embedded(&text, overlay.syntax()) {
            Some(embedded) if !embedded.base.is_empty() => {}
            _ => continue,
        }

        found += 1;
        match overlay.check_embedded(&content) {
            Ok(validated) => println!(
                "{} {} ({} markers)",
                "✓".green(),
                entry.path().display(),
                validated.len()
            ),
            Err(e) => println!("{} {} ({})", "✗".red(), entry.path().display(), e),
        }
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} file(s) with marker blocks", format!("{}", found).green());

    Ok(())
}
