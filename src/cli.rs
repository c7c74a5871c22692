// ============================================================================
// Transpalentor CLI: headless chroma-key and erase via command-line arguments
// ============================================================================
//
// Usage examples:
//   transpalentor key -i photo.png --color 255,255,255 -o cut.png
//   transpalentor key -i "shots/*.jpg" --color 0,255,0 --color 0,200,0 -t 40 --output-dir out/
//   transpalentor erase -i cut.png --strokes "[[50,50],[51,50]]" --brush 12 -o cut.png
//   transpalentor erase -i cut.png --strokes @strokes.json
//   transpalentor session new photo.jpg
//   transpalentor session key --session <ID> --file photo.jpg --color 255,0,0
//   transpalentor session erase --session <ID> --file photo_processed.png --strokes @s.json
//   transpalentor session clean <ID>
//
// Output is always PNG so keyed/erased alpha is preserved.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};

use crate::config::Config;
use crate::error::{Result, TranspalentorError};
use crate::io::{load_raster, save_png};
use crate::ops::{self, Stroke, TargetColorSet};
use crate::storage::{self, SessionStore};
use crate::validation;

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// Transpalentor: make image regions transparent by colour or by brush.
#[derive(Parser, Debug)]
#[command(name = "transpalentor", version, about = "Chroma-key and erase image regions to transparency")]
pub struct CliArgs {
    /// JSON config file. Environment variables override it.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print per-file timing information.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Zero the alpha of pixels close to one of up to three colours.
    Key(KeyArgs),
    /// Zero the alpha under a circular brush at each stroke point.
    Erase(EraseArgs),
    /// Work on images kept in a session directory.
    #[command(subcommand)]
    Session(SessionCommand),
}

#[derive(Args, Debug, Clone)]
pub struct ColorArgs {
    /// Target colour as r,g,b (repeatable, max 3), or a JSON list [[r,g,b],...].
    #[arg(short, long = "color", required = true, value_name = "R,G,B")]
    pub colors: Vec<String>,

    /// Colour distance tolerance, 0 = exact match only.
    #[arg(short, long, default_value_t = 0, value_name = "0-255")]
    pub threshold: i64,
}

#[derive(Args, Debug, Clone)]
pub struct StrokeArgs {
    /// JSON list of [x,y] points, or @path to a file containing one.
    #[arg(short, long, value_name = "JSON|@FILE")]
    pub strokes: String,

    /// Brush diameter in pixels.
    #[arg(short, long, default_value_t = 10, value_name = "PX")]
    pub brush: i64,
}

#[derive(Args, Debug)]
pub struct KeyArgs {
    /// Input file(s). Glob patterns accepted (e.g. "*.png", "shots/*.jpg").
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<String>,

    #[command(flatten)]
    pub color: ColorArgs,

    /// Output file path. Only valid for single-file input.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct EraseArgs {
    #[arg(short, long)]
    pub input: PathBuf,

    #[command(flatten)]
    pub stroke: StrokeArgs,

    /// Output file path. Defaults to `<stem>_erased.png` next to the input.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    /// Validate and store an image in a fresh session; prints the session id.
    New {
        file: PathBuf,
    },
    /// Chroma-key a stored image, saving `<stem>_processed.png` in the session.
    Key {
        #[arg(long)]
        session: String,
        #[arg(long)]
        file: String,
        #[command(flatten)]
        color: ColorArgs,
    },
    /// Erase strokes from a stored image, overwriting it in place.
    Erase {
        #[arg(long)]
        session: String,
        #[arg(long)]
        file: String,
        #[command(flatten)]
        stroke: StrokeArgs,
    },
    /// Delete a session directory.
    Clean {
        session: String,
    },
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run the parsed command and return an OS exit code.
/// `0` = everything succeeded, `1` = one or more inputs failed.
pub fn run(args: CliArgs, config: &Config) -> ExitCode {
    let outcome = match args.command {
        Command::Key(key) => return run_key(key, args.verbose),
        Command::Erase(erase) => run_erase(erase, config),
        Command::Session(cmd) => run_session(cmd, config),
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{} ({})", e, e.error_code());
            ExitCode::FAILURE
        }
    }
}

// ============================================================================
// key
// ============================================================================

fn run_key(args: KeyArgs, verbose: bool) -> ExitCode {
    let (targets, threshold) = match resolve_color_args(&args.color) {
        Ok(v) => v,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() {
        log::error!("no input files matched the given pattern(s)");
        return ExitCode::FAILURE;
    }

    let plan = match plan_outputs(&inputs, args.output.as_deref(), args.output_dir.as_deref(), "processed") {
        Ok(plan) => plan,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(dir) = &args.output_dir
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        log::error!("could not create output directory '{}': {}", dir.display(), e);
        return ExitCode::FAILURE;
    }

    let total = inputs.len();
    let multi = total > 1;
    let mut any_failure = false;

    for (idx, (input_path, output_path)) in plan.iter().enumerate() {
        if multi || verbose {
            println!("[{}/{}] {}", idx + 1, total, input_path.display());
        }
        let file_start = Instant::now();

        let result = load_raster(input_path).and_then(|raster| {
            let out = ops::make_transparent(&raster, &targets, threshold);
            save_png(&out, output_path)
        });

        match result {
            Ok(()) => {
                if verbose || multi {
                    println!(
                        "  → {} ({:.0}ms)",
                        output_path.display(),
                        file_start.elapsed().as_secs_f64() * 1000.0
                    );
                }
            }
            Err(e) => {
                log::error!("{}: {}", input_path.display(), e);
                any_failure = true;
            }
        }
    }

    if any_failure { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

// ============================================================================
// erase
// ============================================================================

fn run_erase(args: EraseArgs, config: &Config) -> Result<()> {
    let (strokes, brush) = resolve_stroke_args(&args.stroke, config)?;
    let output = match args.output {
        Some(p) => p,
        None => build_output_path(&args.input, None, None, "erased").ok_or_else(|| {
            TranspalentorError::InvalidParameter(format!(
                "cannot determine output path for '{}'",
                args.input.display()
            ))
        })?,
    };

    let raster = load_raster(&args.input)?;
    let (out, report) = ops::erase_with_report(&raster, &strokes, brush);
    save_png(&out, &output)?;
    println!(
        "{} ({} stroke(s), {} skipped)",
        output.display(),
        report.applied,
        report.skipped
    );
    Ok(())
}

// ============================================================================
// session
// ============================================================================

fn run_session(cmd: SessionCommand, config: &Config) -> Result<()> {
    let store = SessionStore::new(&config.storage_root);
    match cmd {
        SessionCommand::New { file } => {
            let bytes = std::fs::read(&file)?;
            let format = validation::upload(&bytes, config)?;
            let original = file
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("image");
            let name = storage::with_extension(
                &storage::sanitize_filename(original),
                validation::extension_for(format),
            );
            let session_id = storage::generate_session_id();
            store.save_upload(&session_id, &name, &bytes)?;
            println!("{} {}", session_id, name);
        }
        SessionCommand::Key { session, file, color } => {
            let (targets, threshold) = resolve_color_args(&color)?;
            let raster = store.load_raster(&session, &file)?;
            let out = ops::make_transparent(&raster, &targets, threshold);
            let name = storage::processed_name(&file);
            store.persist_raster(&session, &name, &out)?;
            println!("{}", name);
        }
        SessionCommand::Erase { session, file, stroke } => {
            let (strokes, brush) = resolve_stroke_args(&stroke, config)?;
            let raster = store.load_raster(&session, &file)?;
            let out = ops::erase_at_coordinates(&raster, &strokes, brush);
            store.persist_raster(&session, &file, &out)?;
            println!("{}", file);
        }
        SessionCommand::Clean { session } => {
            store.cleanup(&session)?;
        }
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Merge every `--color` value into one target set and range-check the
/// threshold.
pub fn resolve_color_args(args: &ColorArgs) -> Result<(TargetColorSet, ops::Threshold)> {
    let mut colors = Vec::new();
    for value in &args.colors {
        colors.extend_from_slice(validation::parse_target_colors(value)?.as_slice());
    }
    let targets = TargetColorSet::new(colors)?;
    let threshold = validation::threshold(args.threshold)?;
    Ok((targets, threshold))
}

/// Read strokes (inline JSON or `@file`) and range-check them with the brush.
pub fn resolve_stroke_args(args: &StrokeArgs, config: &Config) -> Result<(Vec<Stroke>, ops::BrushDiameter)> {
    let src = match args.strokes.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)?,
        None => args.strokes.clone(),
    };
    let strokes = validation::parse_strokes(&src)?;
    validation::strokes(&strokes, config)?;
    let brush = validation::brush_diameter(args.brush, config)?;
    Ok((strokes, brush))
}

/// Expand glob patterns and literal paths into a deduplicated, ordered list.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let as_path = Path::new(pattern);

        if as_path.exists() {
            if !result.iter().any(|p| p.as_path() == as_path) {
                result.push(as_path.to_path_buf());
            }
            continue;
        }

        match glob::glob(pattern) {
            Ok(entries) => {
                let mut matched = false;
                for entry in entries.flatten() {
                    if !result.contains(&entry) {
                        result.push(entry);
                    }
                    matched = true;
                }
                if !matched {
                    log::warn!("pattern '{}' matched no files", pattern);
                }
            }
            Err(e) => {
                log::warn!("invalid glob '{}': {}", pattern, e);
            }
        }
    }

    result
}

/// Pair every input with its output path, refusing any plan in which two
/// inputs would be written to the same file.
///
/// `--output` names one file, so it is rejected for multi-file runs even
/// when `--output-dir` is also given.
fn plan_outputs(
    inputs: &[PathBuf],
    output: Option<&Path>,
    output_dir: Option<&Path>,
    suffix: &str,
) -> Result<Vec<(PathBuf, PathBuf)>> {
    if inputs.len() > 1 && output.is_some() {
        return Err(TranspalentorError::InvalidParameter(format!(
            "{} input files given but --output only accepts a single file path; use --output-dir",
            inputs.len()
        )));
    }

    let mut plan: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(inputs.len());
    for input in inputs {
        let out = build_output_path(input, output, output_dir, suffix).ok_or_else(|| {
            TranspalentorError::InvalidParameter(format!(
                "cannot determine output path for '{}'",
                input.display()
            ))
        })?;
        if let Some((other, _)) = plan.iter().find(|(_, taken)| *taken == out) {
            return Err(TranspalentorError::InvalidParameter(format!(
                "'{}' and '{}' would both be written to '{}'",
                other.display(),
                input.display(),
                out.display()
            )));
        }
        plan.push((input.clone(), out));
    }
    Ok(plan)
}

/// Compute the output path for a single input file.
///
/// Priority:
/// 1. `--output` (explicit path, used for single-file input)
/// 2. `--output-dir` (batch directory, derives filename from input stem)
/// 3. Fallback: next to the input as `<stem>_<suffix>.png`
fn build_output_path(
    input: &Path,
    output: Option<&Path>,
    output_dir: Option<&Path>,
    suffix: &str,
) -> Option<PathBuf> {
    if let Some(out) = output {
        return Some(out.to_path_buf());
    }

    let stem = input.file_stem()?.to_string_lossy().into_owned();

    if let Some(dir) = output_dir {
        return Some(dir.join(format!("{}.png", stem)));
    }

    let parent = input.parent().unwrap_or(Path::new("."));
    Some(parent.join(format!("{}_{}.png", stem, suffix)))
}
