use crate::config::{Config, load_config};
use crate::render::{render_svg, write_output_svg};
use crate::route_dump::write_route_dump;
use crate::routing::{ConnectionStyle, validate_tolerance};
use crate::scene::{RoutedConnection, parse_scene, route_scene};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "conroute", version, about = "Route connections between node ports")]
pub struct Args {
    /// Scene file (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config file (JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Draw every connection in this style (straight, step, bezier)
    #[arg(short = 's', long = "style")]
    pub style: Option<ConnectionStyle>,

    /// Overlay hit-test rectangles on the SVG
    #[arg(long = "hit-rects")]
    pub hit_rects: bool,

    /// Hit-test tolerance
    #[arg(long = "tolerance")]
    pub tolerance: Option<f32>,

    /// Minimum canvas width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Minimum canvas height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Log routing decisions to stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    let config = build_config(&args)?;

    let input = read_input(args.input.as_deref())?;
    let scene = parse_scene(&input)?;
    let routed = route_scene(&scene, &config, args.style)?;
    info!(connections = routed.len(), "routed scene");

    write_output(&routed, &config, args.output_format, args.output.as_deref())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if verbose {
        filter = filter.add_directive(tracing::Level::DEBUG.into());
    }
    // Already initialised when run twice in one process.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn build_config(args: &Args) -> Result<Config> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }
    if args.hit_rects {
        config.render.show_hit_rects = true;
    }
    if let Some(tolerance) = args.tolerance {
        validate_tolerance(tolerance)?;
        config.routing.hit_tolerance = tolerance;
    }
    Ok(config)
}

fn write_output(
    routed: &[RoutedConnection],
    config: &Config,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    match format {
        OutputFormat::Svg => {
            let svg = render_svg(routed, &config.theme, &config.render);
            write_output_svg(&svg, output)
        }
        OutputFormat::Json => write_route_dump(output, routed),
        OutputFormat::Png => {
            let output = ensure_output(output, "png")?;
            write_png(routed, config, output)
        }
    }
}

#[cfg(feature = "png")]
fn write_png(routed: &[RoutedConnection], config: &Config, output: &Path) -> Result<()> {
    let svg = render_svg(routed, &config.theme, &config.render);
    crate::render::write_output_png(&svg, output, &config.render)
}

#[cfg(not(feature = "png"))]
fn write_png(_routed: &[RoutedConnection], _config: &Config, _output: &Path) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output<'a>(output: Option<&'a Path>, ext: &str) -> Result<&'a Path> {
    output.ok_or_else(|| anyhow::anyhow!("Output path required for {} output", ext))
}
