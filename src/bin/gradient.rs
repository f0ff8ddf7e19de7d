use clap::Parser;
use std::fs;
use std::path::PathBuf;
use anyhow::{Context, Result};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gradient_wallpaper::{codec, pipeline, Direction, PipelineConfig, Quantizer, Swatch};

/// Build a two-color gradient wallpaper from an image's dominant colors.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input image path
    input: PathBuf,

    /// Gradient direction: a CSS keyword ("to right") or left-to-right,
    /// top-to-bottom, diagonal-down-right, diagonal-up-right
    #[arg(short, long, default_value = "left-to-right")]
    direction: Direction,

    /// JSON file with pipeline settings; explicit flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of palette colors to extract
    #[arg(short = 'k', long)]
    n_colors: Option<usize>,

    /// Maximum number of pixels sampled from the input
    #[arg(short = 's', long)]
    max_samples: Option<usize>,

    /// Output width in pixels
    #[arg(short = 'W', long)]
    width: Option<u32>,

    /// Output height in pixels
    #[arg(short = 'H', long)]
    height: Option<u32>,

    /// Cluster with k-means in Lab space instead of median cut
    #[arg(long)]
    kmeans: bool,

    /// Where to write the PNG
    #[arg(short, long, default_value = "gradient-wallpaper.png")]
    output: PathBuf,

    /// Print a JSON report instead of plain text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    palette: &'a [Swatch],
    css: String,
    direction: Direction,
    width: u32,
    height: u32,
    output: &'a std::path::Path,
}

fn load_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => PipelineConfig::default(),
    };

    if let Some(k) = args.n_colors {
        config.palette_size = k;
    }
    if let Some(n) = args.max_samples {
        config.max_samples = n;
    }
    if let Some(w) = args.width {
        config.width = w;
    }
    if let Some(h) = args.height {
        config.height = h;
    }
    if args.kmeans {
        config.quantizer = Quantizer::kmeans();
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gradient_wallpaper=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let bytes = fs::read(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let image = codec::decode(&bytes).context("decoding input image")?;
    let rendered = pipeline::generate(&image, args.direction, &config)
        .context("gradient generation failed")?;
    let png = codec::encode_png(&rendered.buffer)?;

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(&args.output, png)
        .with_context(|| format!("writing {}", args.output.display()))?;

    if args.json {
        let report = Report {
            palette: rendered.palette.swatches(),
            css: rendered.css(),
            direction: args.direction,
            width: config.width,
            height: config.height,
            output: &args.output,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for swatch in rendered.palette.swatches() {
            println!("{}  ({} samples)", swatch.color, swatch.population);
        }
        println!("{}", rendered.css());
        println!("Saved → {}", args.output.display());
    }

    Ok(())
}
