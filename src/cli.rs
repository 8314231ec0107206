use crate::batch::{BatchReport, list_inputs, render_inputs};
use crate::config::{Config, load_config};
use crate::engine::{ElkEngine, LayoutEngine, PrelaidEngine};
use crate::render_json;
use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use futures::executor::block_on;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const FIELDS_HELP: &str = "\
Colors: action, external, decision, user, success, negative, neutral, data, container
Legacy colors: core, provider, tool, output, context, state, highlight, model, graph, step
Node fields: id, width, height, label, color, subtitle, fontSize, children, containerColor
Edge fields: id, sources, targets, labels, edgeColor, dashed, strokeWidth
Graph fields: title, legend, layoutOptions, children, edges";

#[derive(Parser, Debug)]
#[command(
    name = "elk-svg",
    version,
    about = "Render ELK JSON graphs to SVG",
    after_help = FIELDS_HELP
)]
pub struct Args {
    /// Input ELK JSON file, or '-' for stdin
    #[arg(conflicts_with = "dir")]
    pub input: Option<PathBuf>,

    /// Output SVG file. Defaults to stdout.
    #[arg(conflicts_with = "dir")]
    pub output: Option<PathBuf>,

    /// Render every .json file in FOLDER into FOLDER/svg/
    #[arg(long, value_name = "FOLDER")]
    pub dir: Option<PathBuf>,

    /// Also convert each SVG to PNG (directory mode)
    #[arg(long, requires = "dir")]
    pub png: bool,

    /// Input already carries coordinates; skip the layout engine
    #[arg(long)]
    pub prelaid: bool,

    /// Config file (JSON or JSON5)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    let config = load_config(args.config.as_deref())?;

    if args.prelaid {
        return run_with(&args, &PrelaidEngine, &config);
    }
    let engine = ElkEngine::locate(&config.engine)?;
    run_with(&args, &engine, &config)
}

fn run_with<E: LayoutEngine>(args: &Args, engine: &E, config: &Config) -> Result<()> {
    if let Some(dir) = args.dir.as_deref() {
        let report = run_batch(dir, args.png, engine, config)?;
        println!(
            "\nDone: {} rendered, {} failed. Output in {}/",
            report.succeeded(),
            report.failed(),
            report.output_dir.display()
        );
        return Ok(());
    }

    let input = read_input(args.input.as_deref())?;
    let svg = block_on(render_json(&input, engine, config))
        .with_context(|| format!("failed to render {}", describe_input(args.input.as_deref())))?;
    write_output_svg(&svg, args.output.as_deref())?;
    Ok(())
}

fn run_batch<E: LayoutEngine>(dir: &Path, png: bool, engine: &E, config: &Config) -> Result<BatchReport> {
    let inputs =
        list_inputs(dir).with_context(|| format!("cannot render directory {}", dir.display()))?;
    println!("{}\n", batch_header(inputs.len(), dir));
    let report = block_on(render_inputs(dir, inputs, engine, config, png, |file| {
        println!("{file}")
    }))
    .with_context(|| format!("cannot render directory {}", dir.display()))?;
    Ok(report)
}

fn batch_header(count: usize, dir: &Path) -> String {
    let noun = if count == 1 { "diagram" } else { "diagrams" };
    format!("Rendering {count} {noun} from {}", dir.display())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()));
    }
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("cannot read stdin")?;
    Ok(buf)
}

fn describe_input(path: Option<&Path>) -> String {
    match path {
        Some(path) if path != Path::new("-") => path.display().to_string(),
        _ => "stdin".to_string(),
    }
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg).with_context(|| format!("cannot write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(svg.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
