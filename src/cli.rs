use crate::render::{render_alluvial, render_heat_matrix, write_output_svg};
use crate::settings::load_settings;
use crate::table::{CanvasSize, DataTable};
use crate::theme::Theme;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "alluvial", version, about = "Alluvial and heat-matrix SVG renderer")]
pub struct Args {
    /// Input table file (JSON/JSON5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Chart type
    #[arg(short = 'k', long = "chart", value_enum, default_value = "alluvial")]
    pub chart: ChartKind,

    /// Settings JSON file (host option overrides)
    #[arg(short = 's', long = "settingsFile")]
    pub settings: Option<PathBuf>,

    /// Theme name (report, modern)
    #[arg(short = 't', long = "theme", default_value = "report")]
    pub theme: String,

    /// Width
    #[arg(short = 'w', long = "width", default_value_t = 1200.0)]
    pub width: f32,

    /// Height
    #[arg(short = 'H', long = "height", default_value_t = 800.0)]
    pub height: f32,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ChartKind {
    Alluvial,
    Heatmatrix,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let settings = load_settings(args.settings.as_deref())?;
    let table = read_table(args.input.as_deref())?;
    let theme = resolve_theme(&args.theme);
    let canvas = CanvasSize {
        width: args.width,
        height: args.height,
    };

    let svg = match args.chart {
        ChartKind::Alluvial => render_alluvial(&table, &settings, &theme, canvas),
        ChartKind::Heatmatrix => render_heat_matrix(&table, &settings, &theme, canvas),
    };

    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            #[cfg(feature = "png")]
            {
                let output = ensure_output(&args.output, "png")?;
                crate::render::write_output_png(&svg, &output, canvas)?;
            }
            #[cfg(not(feature = "png"))]
            {
                return Err(anyhow::anyhow!(
                    "PNG output requires the 'png' feature"
                ));
            }
        }
    }
    Ok(())
}

fn resolve_theme(name: &str) -> Theme {
    if name.eq_ignore_ascii_case("modern") {
        Theme::modern()
    } else {
        Theme::report()
    }
}

fn read_table(path: Option<&Path>) -> Result<DataTable> {
    let contents = match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)?,
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let table: DataTable = json5::from_str(&contents)?;
    Ok(table)
}

#[cfg(feature = "png")]
fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
